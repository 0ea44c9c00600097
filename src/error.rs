use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("could not determine data directory")]
    NoDataDir,
}

pub type Result<T> = std::result::Result<T, Error>;
