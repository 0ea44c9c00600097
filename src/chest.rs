use crate::prng::RandomSource;
use serde::{Deserialize, Serialize};
use std::fmt;

// ─────────────────────────────────────────────────────────────────────────
// Treasure containers: three fixed payouts and one mystery box.
// ─────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ContainerId {
    A,
    B,
    C,
    D,
}

impl ContainerId {
    pub const ALL: [ContainerId; 4] = [ContainerId::A, ContainerId::B, ContainerId::C, ContainerId::D];

    /// The container with the highest expected payout.
    pub const OPTIMAL: ContainerId = ContainerId::A;

    /// The container with a randomized payout.
    pub const MYSTERY: ContainerId = ContainerId::D;

    pub fn index(self) -> usize {
        match self {
            ContainerId::A => 0,
            ContainerId::B => 1,
            ContainerId::C => 2,
            ContainerId::D => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ContainerId::A => "A",
            ContainerId::B => "B",
            ContainerId::C => "C",
            ContainerId::D => "D",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "A" => Some(ContainerId::A),
            "B" => Some(ContainerId::B),
            "C" => Some(ContainerId::C),
            "D" => Some(ContainerId::D),
            _ => None,
        }
    }
}

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Payout {
    Fixed(u32),
    /// Uniform integer in `[min, max]`, resampled on every opening.
    Uniform { min: u32, max: u32 },
}

impl Payout {
    pub fn sample(&self, rng: &mut dyn RandomSource) -> u32 {
        match *self {
            Payout::Fixed(v) => v,
            Payout::Uniform { min, max } => rng.gen_range_u32(min, max.saturating_add(1)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Container {
    pub id: ContainerId,
    pub payout: Payout,
}

impl Container {
    pub fn open(&self, rng: &mut dyn RandomSource) -> u32 {
        self.payout.sample(rng)
    }
}

pub const CONTAINERS: [Container; 4] = [
    Container {
        id: ContainerId::A,
        payout: Payout::Fixed(10),
    },
    Container {
        id: ContainerId::B,
        payout: Payout::Fixed(3),
    },
    Container {
        id: ContainerId::C,
        payout: Payout::Fixed(1),
    },
    Container {
        id: ContainerId::D,
        payout: Payout::Uniform { min: 0, max: 5 },
    },
];

pub fn container(id: ContainerId) -> &'static Container {
    &CONTAINERS[id.index()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prng::{Prng, ScriptedRandom};

    #[test]
    fn fixed_payouts_never_vary() {
        let mut rng = Prng::new(11);
        for _ in 0..100 {
            assert_eq!(container(ContainerId::A).open(&mut rng), 10);
            assert_eq!(container(ContainerId::B).open(&mut rng), 3);
            assert_eq!(container(ContainerId::C).open(&mut rng), 1);
        }
    }

    #[test]
    fn mystery_payout_covers_zero_to_five() {
        let mut rng = Prng::new(99);
        let mut seen = [false; 6];
        for _ in 0..2000 {
            let v = container(ContainerId::D).open(&mut rng);
            assert!(v <= 5);
            seen[v as usize] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn mystery_payout_is_resampled_each_time() {
        let mut rng = ScriptedRandom::new(vec![0, 4, 5]);
        let d = container(ContainerId::D);
        assert_eq!(d.open(&mut rng), 0);
        assert_eq!(d.open(&mut rng), 4);
        assert_eq!(d.open(&mut rng), 5);
    }

    #[test]
    fn table_order_matches_ids() {
        for (i, c) in CONTAINERS.iter().enumerate() {
            assert_eq!(c.id.index(), i);
        }
        assert_eq!(ContainerId::parse(" d"), Some(ContainerId::D));
        assert_eq!(ContainerId::parse("E"), None);
    }
}
