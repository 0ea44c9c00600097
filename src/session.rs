//! One participant's run through the experiment.
//!
//! A [`Session`] wires the round state machine to the click log: every
//! accepted selection is logged exactly once, and only the reward timer moves
//! the session to the next round.

use crate::chest::ContainerId;
use crate::clock::{Clock, SystemClock};
use crate::config::SessionConfig;
use crate::export::SessionRecord;
use crate::layout::ContainerLayout;
use crate::logger::{new_session_id, ClickEvent, EventLog};
use crate::prng::{Prng, RandomSource};
use crate::round::{RoundAdvance, RoundState, Screen};
use crate::stats::SessionSummary;
use crate::storage::{NullStore, SummarySink};
use tracing::info;

/// Injected collaborators. Anything left unset gets a production default.
pub struct SessionBuilder {
    config: SessionConfig,
    rng: Option<Box<dyn RandomSource>>,
    clock: Option<Box<dyn Clock>>,
    sink: Option<Box<dyn SummarySink>>,
    session_id: Option<String>,
    viewport: Option<(f32, f32)>,
}

impl SessionBuilder {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            rng: None,
            clock: None,
            sink: None,
            session_id: None,
            viewport: None,
        }
    }

    pub fn rng(mut self, rng: impl RandomSource + 'static) -> Self {
        self.rng = Some(Box::new(rng));
        self
    }

    pub fn seed(self, seed: u64) -> Self {
        self.rng(Prng::new(seed))
    }

    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Some(Box::new(clock));
        self
    }

    pub fn sink(mut self, sink: impl SummarySink + 'static) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    pub fn session_id(mut self, id: impl Into<String>) -> Self {
        self.session_id = Some(id.into());
        self
    }

    pub fn viewport(mut self, width: f32, height: f32) -> Self {
        self.viewport = Some((width, height));
        self
    }

    pub fn build(self) -> Session {
        let mut rng = self
            .rng
            .unwrap_or_else(|| Box::new(Prng::from_entropy()));
        let session_id = self
            .session_id
            .unwrap_or_else(|| new_session_id(rng.as_mut()));
        let clock = self.clock.unwrap_or_else(|| Box::new(SystemClock));
        let sink = self.sink.unwrap_or_else(|| Box::new(NullStore));
        let layout = self.viewport.map(|(w, h)| ContainerLayout::compute(w, h));

        info!(
            session = %session_id,
            rounds = self.config.total_rounds(),
            "session started"
        );

        Session {
            round: RoundState::new(&self.config),
            log: EventLog::new(session_id, clock, sink),
            config: self.config,
            rng,
            layout,
        }
    }
}

pub struct Session {
    config: SessionConfig,
    round: RoundState,
    log: EventLog,
    rng: Box<dyn RandomSource>,
    layout: Option<ContainerLayout>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("config", &self.config)
            .field("round", &self.round)
            .field("log", &self.log)
            .field("layout", &self.layout)
            .finish_non_exhaustive()
    }
}

impl Session {
    pub fn builder(config: SessionConfig) -> SessionBuilder {
        SessionBuilder::new(config)
    }

    pub fn session_id(&self) -> &str {
        self.log.session_id()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn round(&self) -> &RoundState {
        &self.round
    }

    pub fn screen(&self) -> Screen {
        self.round.screen()
    }

    pub fn events(&self) -> &[ClickEvent] {
        self.log.events()
    }

    pub fn layout(&self) -> Option<&ContainerLayout> {
        self.layout.as_ref()
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.layout = Some(ContainerLayout::compute(width, height));
    }

    pub fn dismiss_intro(&mut self) -> bool {
        self.round.dismiss_intro()
    }

    /// Open a container and log the click. `None` when the click is ignored.
    pub fn select_container(&mut self, id: ContainerId) -> Option<ClickEvent> {
        let sel = self.round.select_container(id, self.rng.as_mut())?;
        Some(self.log.record(
            sel.round_index,
            sel.phase,
            sel.container,
            sel.reward,
            sel.total_rounds,
        ))
    }

    /// Route a pointer press at `(x, y)`.
    ///
    /// Dismisses the intro, ignores presses on the complete screen or outside
    /// every container, and otherwise opens the container under the pointer.
    pub fn handle_pointer(&mut self, x: f32, y: f32) -> Option<ClickEvent> {
        match self.round.screen() {
            Screen::Intro => {
                self.round.dismiss_intro();
                None
            }
            Screen::Playing => {
                let id = self.layout.as_ref()?.hit_test(x, y)?;
                self.select_container(id)
            }
            Screen::Reward | Screen::Complete => None,
        }
    }

    pub fn tick(&mut self, dt_ms: u32) -> Option<RoundAdvance> {
        let adv = self.round.tick(dt_ms)?;
        if adv.completed {
            let summary = self.log.summarize();
            info!(
                session = %self.log.session_id(),
                total_reward = self.round.total_reward(),
                exploitation_rate = summary.exploitation_rate,
                mystery_preference = summary.mystery_preference,
                "session complete"
            );
        }
        Some(adv)
    }

    pub fn summary(&self) -> SessionSummary {
        self.log.summarize()
    }

    pub fn record(&self) -> SessionRecord {
        self.log.session_record()
    }
}
