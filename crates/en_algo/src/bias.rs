//! Per-district party bias vector.
//!
//! Raw value per party: `unit_hash("<district>|<party>") - 0.5`, in
//! `[-0.5, 0.5)`. The vector is centred (zero mean), divided by its largest
//! magnitude and scaled by `amp`, so every entry lies in `[-amp, amp]` and
//! the entries sum to ~0. Bias only redistributes votes between parties.

use std::collections::BTreeMap;

use en_core::hash::unit_hash;
use en_core::ids::PartyKey;

/// Guard for the max-magnitude divisor.
pub const BIAS_EPSILON: f64 = 1e-9;

/// Deterministic bias for each party in `parties` (iterated in given order).
pub fn bias_vector(district: &str, parties: &[PartyKey], amp: f64) -> BTreeMap<PartyKey, f64> {
    if parties.is_empty() {
        return BTreeMap::new();
    }

    let raw: Vec<f64> = parties
        .iter()
        .map(|p| unit_hash(&format!("{district}|{}", p.as_str())) - 0.5)
        .collect();
    let mean = raw.iter().sum::<f64>() / raw.len() as f64;
    let centred: Vec<f64> = raw.iter().map(|r| r - mean).collect();
    let max_abs = centred.iter().fold(0.0f64, |m, c| m.max(c.abs()));
    let scale = amp / max_abs.max(BIAS_EPSILON);

    parties
        .iter()
        .cloned()
        .zip(centred.into_iter().map(|c| c * scale))
        .collect()
}
