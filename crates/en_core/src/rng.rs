// crates/en_core/src/rng.rs
//
// Random source for reporting-schedule jitter.
//
// Two sources of "randomness" exist in the engine and they are kept apart:
// • Party bias is pure: `crate::hash::unit_hash` keyed on district|party.
// • Schedule timing is intentionally random and comes only from a `UnitSource`
//   handed to the schedule assigner. `ScheduleRng` is the production source
//   (ChaCha20, seeded from a u64 or from OS entropy); tests pass fixed streams.

use rand_chacha::ChaCha20Rng;
use rand_core::{RngCore, SeedableRng};

/// Anything that can hand out uniform draws in `[0, 1)`.
pub trait UnitSource {
    fn next_unit(&mut self) -> f64;
}

/// ChaCha20 stream for schedule jitter.
///
/// The mapping from a `u64` seed to the 32-byte ChaCha seed is explicit:
/// `seed.to_le_bytes()` into the first 8 bytes, the remaining 24 bytes zero.
#[derive(Debug, Clone)]
pub struct ScheduleRng {
    rng: ChaCha20Rng,
}

impl ScheduleRng {
    #[inline]
    pub fn from_seed_u64(seed: u64) -> Self {
        let mut seed32 = [0u8; 32];
        seed32[..8].copy_from_slice(&seed.to_le_bytes());
        Self { rng: ChaCha20Rng::from_seed(seed32) }
    }

    /// Non-reproducible stream seeded from the operating system.
    pub fn from_entropy() -> Self {
        Self { rng: ChaCha20Rng::from_entropy() }
    }

    /// Seeded when `seed` is given, entropy otherwise.
    pub fn from_optional_seed(seed: Option<u64>) -> Self {
        match seed {
            Some(s) => Self::from_seed_u64(s),
            None => Self::from_entropy(),
        }
    }
}

impl UnitSource for ScheduleRng {
    /// Top 53 bits of the next word, scaled to `[0, 1)`.
    #[inline]
    fn next_unit(&mut self) -> f64 {
        let x = self.rng.next_u64() >> 11;
        x as f64 * (1.0 / (1u64 << 53) as f64)
    }
}

/// Replays a fixed list of draws, cycling when exhausted. Values are clamped
/// into `[0, 1)`; an empty list always yields 0.5.
#[derive(Debug, Clone)]
pub struct FixedUnits {
    values: Vec<f64>,
    idx: usize,
}

impl FixedUnits {
    pub fn new(values: impl Into<Vec<f64>>) -> Self {
        Self { values: values.into(), idx: 0 }
    }
}

impl UnitSource for FixedUnits {
    fn next_unit(&mut self) -> f64 {
        if self.values.is_empty() {
            return 0.5;
        }
        let v = self.values[self.idx % self.values.len()];
        self.idx = self.idx.wrapping_add(1);
        if v.is_finite() { v.clamp(0.0, 1.0 - f64::EPSILON) } else { 0.5 }
    }
}

impl<S: UnitSource + ?Sized> UnitSource for &mut S {
    #[inline]
    fn next_unit(&mut self) -> f64 {
        (**self).next_unit()
    }
}
