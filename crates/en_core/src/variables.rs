//! variables.rs: Simulation parameters with safe defaults and domain checks.
//!
//! Every field is optional on the wire; absent fields take the defaults
//! below. `validate_params` must pass before a session is built.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::entities::CallRule;
use crate::errors::CoreError;

/// Built-in call rules (phase, lead in percentage points), any one suffices.
pub const DEFAULT_CALL_RULES: [CallRule; 4] = [
    CallRule::new(0.99, 0.5),
    CallRule::new(0.92, 12.0),
    CallRule::new(0.85, 18.0),
    CallRule::new(0.75, 25.0),
];

pub fn default_call_rules() -> Vec<CallRule> {
    DEFAULT_CALL_RULES.to_vec()
}

/// Geography heuristic: districts whose name contains `pattern`
/// (case-insensitive) get `bias` as their base reporting-start fraction.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GeoBiasRule {
    pub pattern: String,
    pub bias: f64,
}

impl GeoBiasRule {
    pub fn new(pattern: impl Into<String>, bias: f64) -> Self {
        Self { pattern: pattern.into(), bias }
    }
}

/// Urban and capital districts count fast, islands and remote areas late.
pub fn default_geo_bias_rules() -> Vec<GeoBiasRule> {
    vec![
        GeoBiasRule::new("capital", 0.2),
        GeoBiasRule::new("city", 0.3),
        GeoBiasRule::new("urban", 0.3),
        GeoBiasRule::new("metro", 0.3),
        GeoBiasRule::new("island", 0.8),
        GeoBiasRule::new("highland", 0.75),
        GeoBiasRule::new("rural", 0.7),
        GeoBiasRule::new("north", 0.65),
    ]
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct SimParams {
    /// Party bias amplitude, `(0, 1]`.
    pub bias_amp: f64,
    /// Early-weight decay exponent, `> 0`.
    pub early_alpha: f64,
    /// Floor for early weights, `(0, 1]`.
    pub min_weight: f64,
    /// Phase at which any positive lead resolves a race.
    pub full_report_phase: f64,
    /// Lead (pp) at which an uncalled race is labelled "lean".
    pub lean_lead_pp: f64,
    pub tick_interval_ms: u64,
    pub fallback_window_ms: u64,
    /// ± jitter applied to the geographic base fraction.
    pub start_jitter: f64,
    pub start_frac_min: f64,
    pub start_frac_max: f64,
    /// Reporting span band, as fractions of the count window.
    pub span_min: f64,
    pub span_max: f64,
    /// Smallest allowed span (fraction of the window).
    pub min_span_frac: f64,
    pub neutral_geo_bias: f64,
    /// First match wins.
    pub geo_bias_rules: Vec<GeoBiasRule>,
    /// Reproducible schedules when set; entropy otherwise.
    pub schedule_seed: Option<u64>,
}

impl Default for SimParams {
    fn default() -> Self {
        Self {
            bias_amp: 0.2,
            early_alpha: 1.25,
            min_weight: 0.2,
            full_report_phase: 0.999,
            lean_lead_pp: 4.0,
            tick_interval_ms: 2_000,
            fallback_window_ms: 5 * 60 * 1_000,
            start_jitter: 0.15,
            start_frac_min: 0.05,
            start_frac_max: 0.9,
            span_min: 0.25,
            span_max: 0.50,
            min_span_frac: 0.05,
            neutral_geo_bias: 0.5,
            geo_bias_rules: default_geo_bias_rules(),
            schedule_seed: None,
        }
    }
}

impl SimParams {
    /// Base reporting-start fraction for a district name.
    pub fn geo_bias_for(&self, district: &str) -> f64 {
        let lower = district.to_lowercase();
        self.geo_bias_rules
            .iter()
            .find(|r| !r.pattern.is_empty() && lower.contains(&r.pattern.to_lowercase()))
            .map(|r| r.bias)
            .unwrap_or(self.neutral_geo_bias)
    }
}

/// Longest synthesized count window: one week.
pub const MAX_FALLBACK_WINDOW_MS: u64 = 7 * 24 * 60 * 60 * 1_000;

#[inline]
fn unit_closed(v: f64) -> bool {
    v.is_finite() && (0.0..=1.0).contains(&v)
}

#[inline]
fn unit_open(v: f64) -> bool {
    v.is_finite() && v > 0.0 && v < 1.0
}

/// Check every parameter domain; the first violation is reported.
pub fn validate_params(p: &SimParams) -> Result<(), CoreError> {
    use CoreError::DomainOutOfRange as D;

    if !(p.bias_amp.is_finite() && p.bias_amp > 0.0 && p.bias_amp <= 1.0) {
        return Err(D("bias_amp"));
    }
    if !(p.early_alpha.is_finite() && p.early_alpha > 0.0) {
        return Err(D("early_alpha"));
    }
    if !(p.min_weight.is_finite() && p.min_weight > 0.0 && p.min_weight <= 1.0) {
        return Err(D("min_weight"));
    }
    if !unit_closed(p.full_report_phase) {
        return Err(D("full_report_phase"));
    }
    if !(p.lean_lead_pp.is_finite() && p.lean_lead_pp >= 0.0) {
        return Err(D("lean_lead_pp"));
    }
    if p.tick_interval_ms == 0 {
        return Err(D("tick_interval_ms"));
    }
    if p.fallback_window_ms == 0 || p.fallback_window_ms > MAX_FALLBACK_WINDOW_MS {
        return Err(D("fallback_window_ms"));
    }
    if !unit_closed(p.start_jitter) {
        return Err(D("start_jitter"));
    }
    if !unit_closed(p.start_frac_min) || !unit_closed(p.start_frac_max) || p.start_frac_min > p.start_frac_max {
        return Err(D("start_frac_min/start_frac_max"));
    }
    if !unit_closed(p.span_min) || !unit_closed(p.span_max) || p.span_min > p.span_max {
        return Err(D("span_min/span_max"));
    }
    if !unit_closed(p.min_span_frac) {
        return Err(D("min_span_frac"));
    }
    if !unit_open(p.neutral_geo_bias) {
        return Err(D("neutral_geo_bias"));
    }
    if p.geo_bias_rules.iter().any(|r| !unit_open(r.bias)) {
        return Err(D("geo_bias_rules.bias"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(validate_params(&SimParams::default()), Ok(()));
    }

    #[test]
    fn rejects_out_of_domain() {
        let mut p = SimParams::default();
        p.bias_amp = 0.0;
        assert_eq!(validate_params(&p), Err(CoreError::DomainOutOfRange("bias_amp")));

        let mut p = SimParams::default();
        p.span_min = 0.6;
        assert!(validate_params(&p).is_err());

        let mut p = SimParams::default();
        p.geo_bias_rules.push(GeoBiasRule::new("x", 1.0));
        assert_eq!(validate_params(&p), Err(CoreError::DomainOutOfRange("geo_bias_rules.bias")));
    }

    #[test]
    fn fallback_window_is_bounded() {
        let mut p = SimParams::default();
        p.fallback_window_ms = MAX_FALLBACK_WINDOW_MS;
        assert_eq!(validate_params(&p), Ok(()));
        p.fallback_window_ms = i64::MAX as u64;
        assert_eq!(validate_params(&p), Err(CoreError::DomainOutOfRange("fallback_window_ms")));
        p.fallback_window_ms = 0;
        assert_eq!(validate_params(&p), Err(CoreError::DomainOutOfRange("fallback_window_ms")));
    }

    #[test]
    fn geo_bias_first_match_case_insensitive() {
        let p = SimParams::default();
        assert_eq!(p.geo_bias_for("Capital City"), 0.2);
        assert_eq!(p.geo_bias_for("Outer ISLANDS"), 0.8);
        assert_eq!(p.geo_bias_for("Midlands"), 0.5);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn partial_json_takes_defaults() {
        let p: SimParams = serde_json::from_str(r#"{"bias_amp":0.1,"schedule_seed":7}"#).unwrap();
        assert_eq!(p.bias_amp, 0.1);
        assert_eq!(p.schedule_seed, Some(7));
        assert_eq!(p.tick_interval_ms, 2_000);
        assert!(serde_json::from_str::<SimParams>(r#"{"nope":1}"#).is_err());
    }
}
