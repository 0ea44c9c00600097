use crate::chest::ContainerId;
use crate::clock::Clock;
use crate::export::SessionRecord;
use crate::prng::RandomSource;
use crate::round::Phase;
use crate::stats::{summarize, SessionSummary};
use crate::storage::SummarySink;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Storage key prefix for persisted session records.
pub const STORAGE_KEY_PREFIX: &str = "treasure_boxes_";

/// One accepted container click. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClickEvent {
    pub session_id: String,
    pub round_index: u32,
    pub total_rounds: u32,
    pub phase: Phase,
    pub container_id: ContainerId,
    pub reward_amount: u32,
    /// Wall-clock time of the click, Unix epoch milliseconds.
    pub timestamp_ms: u64,
    /// Time since the session started.
    pub elapsed_ms: u64,
    /// Time since the previous click (or since session start for the first).
    pub inter_arrival_ms: u64,
}

/// Random v4-format UUID drawn from `rng`.
pub fn new_session_id(rng: &mut dyn RandomSource) -> String {
    let mut bytes = [0u8; 16];
    rng.fill_bytes(&mut bytes);
    uuid::Builder::from_random_bytes(bytes)
        .into_uuid()
        .hyphenated()
        .to_string()
}

/// Append-only click log for a single session.
///
/// Every recorded click also pushes the latest [`SessionRecord`] to the
/// configured sink. Sink failures are dropped; logging always succeeds.
pub struct EventLog {
    session_id: String,
    start_ms: u64,
    last_ms: u64,
    events: Vec<ClickEvent>,
    clock: Box<dyn Clock>,
    sink: Box<dyn SummarySink>,
}

impl EventLog {
    pub fn new(session_id: String, clock: Box<dyn Clock>, sink: Box<dyn SummarySink>) -> Self {
        let start_ms = clock.now_ms();
        Self {
            session_id,
            start_ms,
            last_ms: start_ms,
            events: Vec::with_capacity(32),
            clock,
            sink,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn start_ms(&self) -> u64 {
        self.start_ms
    }

    pub fn events(&self) -> &[ClickEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn storage_key(&self) -> String {
        format!("{STORAGE_KEY_PREFIX}{}", self.session_id)
    }

    pub fn record(
        &mut self,
        round_index: u32,
        phase: Phase,
        container_id: ContainerId,
        reward_amount: u32,
        total_rounds: u32,
    ) -> ClickEvent {
        let now = self.clock.now_ms();
        let event = ClickEvent {
            session_id: self.session_id.clone(),
            round_index,
            total_rounds,
            phase,
            container_id,
            reward_amount,
            timestamp_ms: now,
            elapsed_ms: now.saturating_sub(self.start_ms),
            inter_arrival_ms: now.saturating_sub(self.last_ms),
        };
        self.events.push(event.clone());
        self.last_ms = now;

        self.persist();
        event
    }

    pub fn summarize(&self) -> SessionSummary {
        summarize(&self.events)
    }

    pub fn session_record(&self) -> SessionRecord {
        SessionRecord::new(&self.session_id, self.start_ms, self.events.clone())
    }

    fn persist(&mut self) {
        let key = self.storage_key();
        let record = self.session_record();
        if let Err(e) = self.sink.persist(&key, &record) {
            debug!(key = %key, error = %e, "session persistence failed; continuing");
        }
    }
}

impl std::fmt::Debug for EventLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventLog")
            .field("session_id", &self.session_id)
            .field("start_ms", &self.start_ms)
            .field("events", &self.events.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::error::{Error, Result};
    use crate::prng::{Prng, ScriptedRandom};
    use crate::storage::{MemoryStore, NullStore};

    struct BrokenStore;

    impl SummarySink for BrokenStore {
        fn persist(&mut self, _key: &str, _record: &SessionRecord) -> Result<()> {
            Err(Error::NoDataDir)
        }
    }

    #[test]
    fn record_stamps_timing_fields() {
        let clock = ManualClock::new(10_000);
        let mut log = EventLog::new("s1".into(), Box::new(clock.clone()), Box::new(NullStore));

        clock.advance(1_200);
        let first = log.record(0, Phase::Learning, ContainerId::A, 10, 25);
        assert_eq!(first.timestamp_ms, 11_200);
        assert_eq!(first.elapsed_ms, 1_200);
        assert_eq!(first.inter_arrival_ms, 1_200);

        clock.advance(700);
        let second = log.record(1, Phase::Learning, ContainerId::D, 4, 25);
        assert_eq!(second.elapsed_ms, 1_900);
        assert_eq!(second.inter_arrival_ms, 700);
        assert_eq!(log.len(), 2);
        assert_eq!(log.events()[1], second);
    }

    #[test]
    fn every_record_is_persisted_under_the_session_key() {
        let store = MemoryStore::new();
        let mut log = EventLog::new(
            "abc".into(),
            Box::new(ManualClock::new(0)),
            Box::new(store.clone()),
        );
        log.record(0, Phase::Learning, ContainerId::B, 3, 25);
        log.record(1, Phase::Learning, ContainerId::A, 10, 25);

        let saved = store.load("treasure_boxes_abc").expect("record saved");
        assert_eq!(saved.total_events, 2);
        assert!(saved.metrics.discovered_optimal);
    }

    #[test]
    fn persistence_failures_do_not_block_logging() {
        let mut log = EventLog::new(
            "x".into(),
            Box::new(ManualClock::new(0)),
            Box::new(BrokenStore),
        );
        log.record(0, Phase::Learning, ContainerId::C, 1, 25);
        log.record(1, Phase::Learning, ContainerId::C, 1, 25);
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn clock_going_backwards_saturates() {
        let clock = ManualClock::new(5_000);
        let mut log = EventLog::new("s".into(), Box::new(clock.clone()), Box::new(NullStore));
        clock.set(4_000);
        let e = log.record(0, Phase::Learning, ContainerId::A, 10, 25);
        assert_eq!(e.elapsed_ms, 0);
        assert_eq!(e.inter_arrival_ms, 0);
    }

    #[test]
    fn session_ids_are_uuid_shaped_and_reproducible() {
        let a = new_session_id(&mut Prng::new(8));
        let b = new_session_id(&mut Prng::new(8));
        assert_eq!(a, b);
        assert_eq!(a.len(), 36);
        assert_eq!(a.as_bytes()[14], b'4');

        let c = new_session_id(&mut ScriptedRandom::new(vec![1, 2, 3, 4]));
        assert_ne!(a, c);
    }

    #[test]
    fn event_json_uses_camel_case() {
        let e = ClickEvent {
            session_id: "s".into(),
            round_index: 5,
            total_rounds: 25,
            phase: Phase::Testing,
            container_id: ContainerId::D,
            reward_amount: 2,
            timestamp_ms: 1,
            elapsed_ms: 1,
            inter_arrival_ms: 1,
        };
        let v = serde_json::to_value(&e).unwrap();
        assert_eq!(v["roundIndex"], 5);
        assert_eq!(v["phase"], "testing");
        assert_eq!(v["containerId"], "D");
        assert_eq!(v["interArrivalMs"], 1);
    }
}
