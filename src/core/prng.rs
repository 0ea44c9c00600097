// Minimal PRNG (no external crates).
//
// This is NOT cryptographically secure.
// It drives the mystery container payout and session ids, and is seedable so
// recorded sessions can be replayed exactly.

use crate::clock::{Clock, SystemClock};

/// Source of randomness injected into a session.
///
/// Everything random in a session (container D's payout, the session id)
/// draws from one of these, so tests can supply a fixed sequence.
pub trait RandomSource {
    fn next_u32(&mut self) -> u32;

    /// Uniform integer in `[low, high)`. Returns `low` for an empty range.
    fn gen_range_u32(&mut self, low: u32, high: u32) -> u32 {
        if high <= low {
            return low;
        }
        low + self.next_u32() % (high - low)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(4) {
            let bytes = self.next_u32().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }
}

impl<R: RandomSource + ?Sized> RandomSource for Box<R> {
    fn next_u32(&mut self) -> u32 {
        (**self).next_u32()
    }

    fn gen_range_u32(&mut self, low: u32, high: u32) -> u32 {
        (**self).gen_range_u32(low, high)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        (**self).fill_bytes(dest)
    }
}

#[derive(Debug, Clone)]
pub struct Prng {
    state: u64,
}

impl Prng {
    pub fn new(seed: u64) -> Self {
        // Avoid a zero state.
        let seed = if seed == 0 { 0x9E3779B97F4A7C15 } else { seed };
        Self { state: seed }
    }

    /// Seed from the system clock. Used when no explicit seed is configured.
    pub fn from_entropy() -> Self {
        Self::from_clock(&SystemClock)
    }

    pub fn from_clock(clock: &dyn Clock) -> Self {
        Self::new(clock.now_ms() ^ 0xB4A7_1D2B_0000_0000)
    }

    #[inline]
    fn next_u64(&mut self) -> u64 {
        // xorshift64*
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545F4914F6CDD1D)
    }
}

impl RandomSource for Prng {
    #[inline]
    fn next_u32(&mut self) -> u32 {
        (self.next_u64() >> 32) as u32
    }
}

/// Replays a fixed list of values, cycling when exhausted.
#[derive(Debug, Clone)]
pub struct ScriptedRandom {
    values: Vec<u32>,
    idx: usize,
}

impl ScriptedRandom {
    pub fn new(values: Vec<u32>) -> Self {
        Self { values, idx: 0 }
    }
}

impl RandomSource for ScriptedRandom {
    fn next_u32(&mut self) -> u32 {
        if self.values.is_empty() {
            return 0;
        }
        let v = self.values[self.idx % self.values.len()];
        self.idx = self.idx.wrapping_add(1);
        v
    }
}
