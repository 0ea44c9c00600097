use crate::chest::ContainerId;
use crate::logger::ClickEvent;
use crate::round::Phase;
use serde::{Deserialize, Serialize};

/// Per-container click tally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ContainerCounts {
    #[serde(rename = "A")]
    pub a: u32,
    #[serde(rename = "B")]
    pub b: u32,
    #[serde(rename = "C")]
    pub c: u32,
    #[serde(rename = "D")]
    pub d: u32,
}

impl ContainerCounts {
    pub fn get(&self, id: ContainerId) -> u32 {
        match id {
            ContainerId::A => self.a,
            ContainerId::B => self.b,
            ContainerId::C => self.c,
            ContainerId::D => self.d,
        }
    }

    pub fn increment(&mut self, id: ContainerId) {
        let slot = match id {
            ContainerId::A => &mut self.a,
            ContainerId::B => &mut self.b,
            ContainerId::C => &mut self.c,
            ContainerId::D => &mut self.d,
        };
        *slot += 1;
    }

    pub fn total(&self) -> u32 {
        self.a + self.b + self.c + self.d
    }

    /// Number of containers clicked at least once.
    pub fn distinct(&self) -> u32 {
        ContainerId::ALL.iter().filter(|&&id| self.get(id) > 0).count() as u32
    }
}

/// Behavioural metrics derived from a session's click history.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    /// Share of testing clicks on the optimal container.
    pub exploitation_rate: f64,
    /// Share of the four containers sampled at least once during testing.
    pub exploration_breadth: f64,
    /// Share of testing clicks on the mystery container.
    pub mystery_preference: f64,
    pub learning_counts: ContainerCounts,
    pub test_counts: ContainerCounts,
    /// At least one learning-phase click found the optimal container.
    pub discovered_optimal: bool,
    pub avg_inter_arrival_ms: f64,
}

/// Recompute every metric from scratch. Never fails; an empty history gives
/// zeroed ratios.
pub fn summarize(events: &[ClickEvent]) -> SessionSummary {
    let mut learning_counts = ContainerCounts::default();
    let mut test_counts = ContainerCounts::default();

    for e in events {
        match e.phase {
            Phase::Learning => learning_counts.increment(e.container_id),
            Phase::Testing => test_counts.increment(e.container_id),
        }
    }

    let test_total = test_counts.total().max(1) as f64;

    // The first event's gap is measured from session start and is included,
    // but a single event is not enough to call it a rate.
    let avg_inter_arrival_ms = if events.len() > 1 {
        let sum: u64 = events.iter().map(|e| e.inter_arrival_ms).sum();
        sum as f64 / events.len() as f64
    } else {
        0.0
    };

    SessionSummary {
        exploitation_rate: test_counts.get(ContainerId::OPTIMAL) as f64 / test_total,
        exploration_breadth: test_counts.distinct() as f64 / ContainerId::ALL.len() as f64,
        mystery_preference: test_counts.get(ContainerId::MYSTERY) as f64 / test_total,
        discovered_optimal: learning_counts.get(ContainerId::OPTIMAL) > 0,
        learning_counts,
        test_counts,
        avg_inter_arrival_ms,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ev(round_index: u32, phase: Phase, container_id: ContainerId, gap: u64) -> ClickEvent {
        ClickEvent {
            session_id: "s".to_string(),
            round_index,
            total_rounds: 25,
            phase,
            container_id,
            reward_amount: 0,
            timestamp_ms: 0,
            elapsed_ms: 0,
            inter_arrival_ms: gap,
        }
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn empty_history_is_all_zero() {
        let s = summarize(&[]);
        assert_eq!(s.exploitation_rate, 0.0);
        assert_eq!(s.exploration_breadth, 0.0);
        assert_eq!(s.mystery_preference, 0.0);
        assert_eq!(s.avg_inter_arrival_ms, 0.0);
        assert!(!s.discovered_optimal);
        assert_eq!(s.test_counts.total(), 0);
    }

    #[test]
    fn testing_mix_scores_as_expected() {
        use ContainerId::*;
        let events: Vec<_> = [A, A, B, D, D]
            .iter()
            .enumerate()
            .map(|(i, &c)| ev(5 + i as u32, Phase::Testing, c, 100))
            .collect();

        let s = summarize(&events);
        assert_eq!(
            s.test_counts,
            ContainerCounts {
                a: 2,
                b: 1,
                c: 0,
                d: 2
            }
        );
        assert!(close(s.exploitation_rate, 0.4));
        assert!(close(s.exploration_breadth, 0.75));
        assert!(close(s.mystery_preference, 0.4));
        assert_eq!(s.learning_counts.total(), 0);
    }

    #[test]
    fn discovered_optimal_needs_a_learning_click_on_a() {
        let hit = summarize(&[ev(0, Phase::Learning, ContainerId::A, 0)]);
        assert!(hit.discovered_optimal);

        let miss = summarize(&[
            ev(0, Phase::Learning, ContainerId::B, 0),
            ev(1, Phase::Learning, ContainerId::D, 0),
            ev(5, Phase::Testing, ContainerId::A, 0),
        ]);
        assert!(!miss.discovered_optimal);
    }

    #[test]
    fn learning_clicks_do_not_affect_ratios() {
        let s = summarize(&[
            ev(0, Phase::Learning, ContainerId::A, 0),
            ev(1, Phase::Learning, ContainerId::A, 0),
        ]);
        assert_eq!(s.exploitation_rate, 0.0);
        assert_eq!(s.learning_counts.a, 2);
    }

    #[test]
    fn inter_arrival_mean_needs_two_events() {
        let one = summarize(&[ev(0, Phase::Learning, ContainerId::C, 800)]);
        assert_eq!(one.avg_inter_arrival_ms, 0.0);

        let two = summarize(&[
            ev(0, Phase::Learning, ContainerId::C, 800),
            ev(1, Phase::Learning, ContainerId::C, 400),
        ]);
        assert!(close(two.avg_inter_arrival_ms, 600.0));
    }

    #[test]
    fn counts_serialize_with_container_letters() {
        let json = serde_json::to_value(ContainerCounts {
            a: 1,
            b: 0,
            c: 0,
            d: 3,
        })
        .unwrap();
        assert_eq!(json["A"], 1);
        assert_eq!(json["D"], 3);
    }
}
