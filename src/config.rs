use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

fn default_learning_rounds() -> u32 {
    5
}

fn default_test_rounds() -> u32 {
    20
}

fn default_reward_duration_ms() -> u32 {
    1_500
}

fn default_max_frame_ms() -> u32 {
    100
}

/// Session pacing and length.
///
/// Loaded from JSON; any missing field falls back to the standard protocol
/// (5 learning rounds, 20 testing rounds, 1.5 s reward display).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_learning_rounds")]
    pub learning_rounds: u32,
    #[serde(default = "default_test_rounds")]
    pub test_rounds: u32,
    /// How long the reward screen stays up before the next round.
    #[serde(default = "default_reward_duration_ms")]
    pub reward_duration_ms: u32,
    /// Upper bound on a single frame delta passed to `tick`.
    #[serde(default = "default_max_frame_ms")]
    pub max_frame_ms: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            learning_rounds: default_learning_rounds(),
            test_rounds: default_test_rounds(),
            reward_duration_ms: default_reward_duration_ms(),
            max_frame_ms: default_max_frame_ms(),
        }
    }
}

impl SessionConfig {
    pub fn total_rounds(&self) -> u32 {
        self.learning_rounds.saturating_add(self.test_rounds)
    }

    pub fn from_json_str(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Like `load`, but a missing file means the standard protocol.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }
}
