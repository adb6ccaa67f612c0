//! Early-reporting weight.
//!
//! `influence = (1 - clamp(phase, 0, 1))^alpha`, `weight = 1 + bias * influence`,
//! floored at `MIN_WEIGHT`. Strongest at phase 0; exactly 1 at phase 1.

pub const DEFAULT_ALPHA: f64 = 1.25;
pub const MIN_WEIGHT: f64 = 0.2;

#[inline]
pub fn early_weight(bias: f64, phase: f64, alpha: f64) -> f64 {
    early_weight_with_floor(bias, phase, alpha, MIN_WEIGHT)
}

/// Same as `early_weight` with an explicit floor. A non-finite bias or phase
/// yields the neutral weight 1.
pub fn early_weight_with_floor(bias: f64, phase: f64, alpha: f64, floor: f64) -> f64 {
    if !bias.is_finite() || !phase.is_finite() {
        return 1.0;
    }
    let p = phase.clamp(0.0, 1.0);
    if p >= 1.0 {
        // 0^0 would be 1 in powf; full reporting carries no residual bias.
        return 1.0;
    }
    let influence = (1.0 - p).powf(alpha);
    (1.0 + bias * influence).max(floor)
}
