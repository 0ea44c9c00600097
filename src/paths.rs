//! Cross-platform application paths
//!
//! - Linux: ~/.local/share/treasure_boxes/
//! - Windows: %APPDATA%\treasure_boxes\
//! - MacOS: ~/Library/Application Support/treasure_boxes/

use crate::error::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct AppPaths {
    data_dir: PathBuf,
}

impl AppPaths {
    pub fn new() -> Result<Self> {
        let data_dir = Self::default_data_dir()?;
        Self::at(data_dir)
    }

    /// Use an explicit root instead of the OS data directory.
    pub fn at(data_dir: impl Into<PathBuf>) -> Result<Self> {
        let data_dir = data_dir.into();
        fs::create_dir_all(&data_dir)?;
        Ok(Self { data_dir })
    }

    pub fn default_data_dir() -> Result<PathBuf> {
        let base = dirs::data_dir().ok_or(Error::NoDataDir)?;
        Ok(base.join("treasure_boxes"))
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Where per-click session snapshots are kept.
    pub fn sessions_dir(&self) -> PathBuf {
        self.data_dir.join("sessions")
    }

    pub fn exports_dir(&self) -> PathBuf {
        self.data_dir.join("exports")
    }

    pub fn config_file(&self) -> PathBuf {
        self.data_dir.join("config.json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subdirectories_hang_off_the_root() {
        let root = std::env::temp_dir().join(format!("treasure_boxes_paths_{}", std::process::id()));
        let p = AppPaths::at(&root).unwrap();
        assert!(root.is_dir());
        assert_eq!(p.sessions_dir(), root.join("sessions"));
        assert_eq!(p.exports_dir(), root.join("exports"));
        assert_eq!(p.config_file(), root.join("config.json"));
        let _ = fs::remove_dir_all(&root);
    }
}
