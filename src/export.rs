use crate::error::Result;
use crate::logger::ClickEvent;
use crate::stats::{summarize, SessionSummary};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

/// Full session record: what gets persisted after each click and what the
/// export produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub session_id: String,
    /// ISO-8601, UTC, millisecond precision.
    pub start_time: String,
    pub total_events: usize,
    pub events: Vec<ClickEvent>,
    pub metrics: SessionSummary,
}

pub fn iso8601_from_ms(ms: u64) -> String {
    DateTime::<Utc>::from_timestamp_millis(ms as i64)
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
        .unwrap_or_default()
}

impl SessionRecord {
    pub fn new(session_id: &str, start_ms: u64, events: Vec<ClickEvent>) -> Self {
        Self {
            session_id: session_id.to_string(),
            start_time: iso8601_from_ms(start_ms),
            total_events: events.len(),
            metrics: summarize(&events),
            events,
        }
    }

    /// Recompute the metrics from the stored events, ignoring whatever
    /// `metrics` was saved alongside them.
    pub fn resummarize(&self) -> SessionSummary {
        summarize(&self.events)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json_str(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn file_name(&self, now_ms: u64) -> String {
        format!("curiosity_game_{}_{}.json", self.session_id, now_ms)
    }

    /// Write the pretty-printed record into `dir`, returning the file path.
    pub fn write_to_dir(&self, dir: &Path, now_ms: u64) -> Result<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(self.file_name(now_ms));
        std::fs::write(&path, self.to_json_pretty()?)?;
        info!(path = %path.display(), events = self.total_events, "session exported");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chest::ContainerId;
    use crate::round::Phase;

    fn sample() -> SessionRecord {
        let events = vec![
            ClickEvent {
                session_id: "sid".into(),
                round_index: 0,
                total_rounds: 25,
                phase: Phase::Learning,
                container_id: ContainerId::A,
                reward_amount: 10,
                timestamp_ms: 1_700_000_001_000,
                elapsed_ms: 1_000,
                inter_arrival_ms: 1_000,
            },
            ClickEvent {
                session_id: "sid".into(),
                round_index: 5,
                total_rounds: 25,
                phase: Phase::Testing,
                container_id: ContainerId::D,
                reward_amount: 3,
                timestamp_ms: 1_700_000_003_000,
                elapsed_ms: 3_000,
                inter_arrival_ms: 2_000,
            },
        ];
        SessionRecord::new("sid", 1_700_000_000_000, events)
    }

    #[test]
    fn start_time_is_iso8601_utc() {
        assert_eq!(iso8601_from_ms(0), "1970-01-01T00:00:00.000Z");
        assert_eq!(sample().start_time, "2023-11-14T22:13:20.000Z");
    }

    #[test]
    fn export_schema_field_names() {
        let v = serde_json::to_value(sample()).unwrap();
        assert_eq!(v["sessionId"], "sid");
        assert_eq!(v["totalEvents"], 2);
        assert_eq!(v["events"].as_array().unwrap().len(), 2);
        assert_eq!(v["metrics"]["mysteryPreference"], 1.0);
        assert_eq!(v["metrics"]["discoveredOptimal"], true);
        assert_eq!(v["metrics"]["testCounts"]["D"], 1);
    }

    #[test]
    fn exported_json_loads_and_resummarizes() {
        let rec = sample();
        let text = rec.to_json_pretty().unwrap();
        assert!(text.contains("\n  \"sessionId\""));

        let back = SessionRecord::from_json_str(&text).unwrap();
        assert_eq!(back, rec);
        assert_eq!(back.resummarize(), rec.metrics);
    }

    #[test]
    fn file_name_carries_session_and_time() {
        assert_eq!(sample().file_name(42), "curiosity_game_sid_42.json");
    }

    #[test]
    fn write_to_dir_creates_the_file() {
        let dir = std::env::temp_dir().join(format!("treasure_boxes_export_{}", std::process::id()));
        let path = sample().write_to_dir(&dir, 7).unwrap();
        let loaded = SessionRecord::load(&path).unwrap();
        assert_eq!(loaded.total_events, 2);
        let _ = std::fs::remove_dir_all(&dir);
    }
}
