//! Treasure Boxes: a four-container curiosity task.
//!
//! Participants open one of four treasure boxes per round: five learning
//! rounds, then twenty testing rounds. Box A always pays 10, B pays 3, C pays
//! 1, and D pays a fresh random 0–5 every time. Every click is logged, and the
//! log is scored for exploitation, exploration breadth and preference for the
//! mystery box.
//!
//! Rendering and audio live outside this crate; [`session::Session`] exposes
//! the state they need.

#[path = "core/clock.rs"]
pub mod clock;

#[path = "core/prng.rs"]
pub mod prng;

pub mod chest;
pub mod config;
pub mod error;
pub mod export;
pub mod layout;
pub mod logger;
pub mod paths;
pub mod round;
pub mod session;
pub mod stats;
pub mod storage;

pub use chest::ContainerId;
pub use config::SessionConfig;
pub use error::{Error, Result};
pub use session::{Session, SessionBuilder};
