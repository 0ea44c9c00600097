//! Round/phase state machine.
//!
//! `intro → playing → reward → playing → … → reward → complete`
//!
//! The whole session's progression lives in one [`RoundState`] value owned by
//! the caller. Time only moves through [`RoundState::tick`], so the reward
//! display can be simulated frame by frame without real delays.

use crate::chest::{container, ContainerId};
use crate::config::SessionConfig;
use crate::prng::RandomSource;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Learning,
    Testing,
}

impl Phase {
    pub fn for_round(round_index: u32, learning_rounds: u32) -> Self {
        if round_index < learning_rounds {
            Phase::Learning
        } else {
            Phase::Testing
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Learning => "learning",
            Phase::Testing => "testing",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Screen {
    Intro,
    Playing,
    Reward,
    Complete,
}

/// An accepted container choice, ready to be logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub round_index: u32,
    pub phase: Phase,
    pub container: ContainerId,
    pub reward: u32,
    pub total_rounds: u32,
}

/// Emitted when the reward display ends and the session moves on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundAdvance {
    pub round_index: u32,
    pub phase: Phase,
    pub completed: bool,
}

#[derive(Debug, Clone)]
pub struct RoundState {
    round_index: u32,
    phase: Phase,
    total_reward: u32,
    screen: Screen,

    selected: Option<ContainerId>,
    last_reward: u32,

    // Per-screen elapsed time. The reward one drives the round advance; the
    // others are only read by renderers for entry/celebration animations.
    intro_elapsed_ms: u32,
    reward_elapsed_ms: u32,
    complete_elapsed_ms: u32,

    learning_rounds: u32,
    total_rounds: u32,
    reward_duration_ms: u32,
    max_frame_ms: u32,
}

impl RoundState {
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            round_index: 0,
            phase: Phase::for_round(0, config.learning_rounds),
            total_reward: 0,
            screen: Screen::Intro,
            selected: None,
            last_reward: 0,
            intro_elapsed_ms: 0,
            reward_elapsed_ms: 0,
            complete_elapsed_ms: 0,
            learning_rounds: config.learning_rounds,
            total_rounds: config.total_rounds(),
            reward_duration_ms: config.reward_duration_ms,
            max_frame_ms: config.max_frame_ms.max(1),
        }
    }

    pub fn round_index(&self) -> u32 {
        self.round_index
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn total_reward(&self) -> u32 {
        self.total_reward
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn total_rounds(&self) -> u32 {
        self.total_rounds
    }

    /// Container opened in the current (or just finished) round.
    pub fn selected(&self) -> Option<ContainerId> {
        self.selected
    }

    pub fn last_reward(&self) -> u32 {
        self.last_reward
    }

    pub fn intro_elapsed_ms(&self) -> u32 {
        self.intro_elapsed_ms
    }

    pub fn reward_elapsed_ms(&self) -> u32 {
        self.reward_elapsed_ms
    }

    pub fn complete_elapsed_ms(&self) -> u32 {
        self.complete_elapsed_ms
    }

    /// Fraction of the reward display already shown, in `[0, 1]`.
    pub fn reward_progress(&self) -> f32 {
        if self.reward_duration_ms == 0 {
            return 1.0;
        }
        (self.reward_elapsed_ms as f32 / self.reward_duration_ms as f32).min(1.0)
    }

    pub fn is_complete(&self) -> bool {
        self.screen == Screen::Complete
    }

    /// Returns true if this call left the intro screen. A session with no
    /// rounds goes straight to `Complete`.
    pub fn dismiss_intro(&mut self) -> bool {
        if self.screen != Screen::Intro {
            return false;
        }
        if self.round_index >= self.total_rounds {
            // Nothing to play.
            self.screen = Screen::Complete;
            self.complete_elapsed_ms = 0;
        } else {
            self.screen = Screen::Playing;
        }
        debug!(round = self.round_index, screen = ?self.screen, "intro dismissed");
        true
    }

    /// Open a container. Ignored unless the screen is `Playing`.
    pub fn select_container(
        &mut self,
        id: ContainerId,
        rng: &mut dyn RandomSource,
    ) -> Option<Selection> {
        if self.screen != Screen::Playing || self.round_index >= self.total_rounds {
            return None;
        }

        let reward = container(id).open(rng);
        self.total_reward = self.total_reward.saturating_add(reward);
        self.selected = Some(id);
        self.last_reward = reward;
        self.reward_elapsed_ms = 0;
        self.screen = Screen::Reward;

        debug!(
            round = self.round_index,
            phase = self.phase.as_str(),
            container = id.label(),
            reward,
            "container opened"
        );

        Some(Selection {
            round_index: self.round_index,
            phase: self.phase,
            container: id,
            reward,
            total_rounds: self.total_rounds,
        })
    }

    /// End the reward display and move to the next round (or finish).
    /// Ignored unless the screen is `Reward`.
    pub fn advance_after_reward(&mut self) -> Option<RoundAdvance> {
        if self.screen != Screen::Reward {
            return None;
        }

        self.round_index += 1;
        self.phase = Phase::for_round(self.round_index, self.learning_rounds);
        self.reward_elapsed_ms = 0;

        let completed = self.round_index >= self.total_rounds;
        if completed {
            self.screen = Screen::Complete;
            self.complete_elapsed_ms = 0;
        } else {
            self.screen = Screen::Playing;
            self.selected = None;
        }

        debug!(
            round = self.round_index,
            phase = self.phase.as_str(),
            completed,
            "round advanced"
        );

        Some(RoundAdvance {
            round_index: self.round_index,
            phase: self.phase,
            completed,
        })
    }

    /// Advance screen timers by one frame. Returns the advance if the reward
    /// display ran out during this frame.
    pub fn tick(&mut self, dt_ms: u32) -> Option<RoundAdvance> {
        let dt = dt_ms.min(self.max_frame_ms);
        match self.screen {
            Screen::Intro => {
                self.intro_elapsed_ms = self.intro_elapsed_ms.saturating_add(dt);
                None
            }
            Screen::Playing => None,
            Screen::Reward => {
                self.reward_elapsed_ms = self.reward_elapsed_ms.saturating_add(dt);
                if self.reward_elapsed_ms >= self.reward_duration_ms {
                    self.advance_after_reward()
                } else {
                    None
                }
            }
            Screen::Complete => {
                self.complete_elapsed_ms = self.complete_elapsed_ms.saturating_add(dt);
                None
            }
        }
    }
}
