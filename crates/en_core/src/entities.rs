//! Core entities shared by every stage.
//!
//! - `DistrictFinal`: immutable final totals per district (loaded once)
//! - `CountWindow`: global `[start_ms, end_ms]` driving every phase
//! - `ScheduleEntry`: per-district reporting sub-interval
//! - `CallRule` / `CallEntry`: race-call thresholds and the stored decision
//! - `PartyMeta`: display metadata passed explicitly to presentation code
//!
//! Timestamps are epoch milliseconds (`i64`).

use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;
use crate::ids::{DistrictId, PartyKey};

/* -------------------------------------------------------------------------- */
/*                               District records                             */
/* -------------------------------------------------------------------------- */

/// Final per-district record. Missing or malformed numbers are `None`
/// ("no data"); every consumer reads them as zero.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DistrictFinal {
    pub district_id: DistrictId,
    pub eligible_voters_est: Option<f64>,
    /// Turnout percent (0..=100); `turnout`, falling back to `turnout_est`.
    pub turnout_pct: Option<f64>,
    /// Final vote count per known party key.
    pub votes: BTreeMap<PartyKey, Option<u64>>,
}

impl DistrictFinal {
    pub fn new(district_id: DistrictId) -> Self {
        Self {
            district_id,
            eligible_voters_est: None,
            turnout_pct: None,
            votes: BTreeMap::new(),
        }
    }

    /// Builder-style helper used by loaders and tests.
    pub fn with_votes(mut self, party: PartyKey, votes: u64) -> Self {
        self.votes.insert(party, Some(votes));
        self
    }

    /// Final votes for `party`; absent or "no data" reads as 0.
    #[inline]
    pub fn final_votes(&self, party: &PartyKey) -> u64 {
        self.votes.get(party).copied().flatten().unwrap_or(0)
    }

    /// Sum of final votes over `parties`.
    pub fn total_final(&self, parties: &[PartyKey]) -> u64 {
        parties
            .iter()
            .fold(0u64, |acc, p| acc.saturating_add(self.final_votes(p)))
    }

    /// Eligible voters as a finite non-negative number, if known.
    #[inline]
    pub fn eligible(&self) -> Option<f64> {
        self.eligible_voters_est.filter(|v| v.is_finite() && *v >= 0.0)
    }

    /// Turnout percent as a finite number, if known.
    #[inline]
    pub fn turnout(&self) -> Option<f64> {
        self.turnout_pct.filter(|v| v.is_finite())
    }
}

/* -------------------------------------------------------------------------- */
/*                                 Count window                               */
/* -------------------------------------------------------------------------- */

/// Global counting window. Invariant once constructed: `end_ms > start_ms`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct CountWindow {
    pub start_ms: i64,
    pub end_ms: i64,
}

impl CountWindow {
    pub fn new(start_ms: i64, end_ms: i64) -> Result<Self, CoreError> {
        if end_ms > start_ms {
            Ok(Self { start_ms, end_ms })
        } else {
            Err(CoreError::InvalidWindow)
        }
    }

    /// Window starting at `now` lasting `duration_ms` (at least 1 ms).
    pub fn starting_at(now_ms: i64, duration_ms: i64) -> Self {
        let end_ms = now_ms.saturating_add(duration_ms.max(1));
        Self { start_ms: now_ms, end_ms }
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        self.end_ms > self.start_ms
    }

    #[inline]
    pub fn span_ms(&self) -> i64 {
        self.end_ms.saturating_sub(self.start_ms)
    }

    /// Map a fraction onto the window (linear, rounded to whole ms). The
    /// result always lies in `[start_ms, end_ms]`.
    #[inline]
    pub fn at_fraction(&self, frac: f64) -> i64 {
        let frac = if frac.is_finite() { frac.clamp(0.0, 1.0) } else { 0.0 };
        // `as` saturates on f64 → i64.
        let offset = (frac * self.span_ms() as f64).round() as i64;
        self.start_ms.saturating_add(offset).clamp(self.start_ms, self.end_ms.max(self.start_ms))
    }

    /// Elapsed fraction of the window at `now`, clamped to `[0, 1]`.
    pub fn progress(&self, now_ms: i64) -> f64 {
        if !self.is_valid() {
            return 1.0;
        }
        (now_ms.saturating_sub(self.start_ms) as f64 / self.span_ms() as f64).clamp(0.0, 1.0)
    }

    /// Window has fully elapsed at `now`.
    #[inline]
    pub fn has_elapsed(&self, now_ms: i64) -> bool {
        now_ms >= self.end_ms
    }
}

/* -------------------------------------------------------------------------- */
/*                               Reporting schedule                           */
/* -------------------------------------------------------------------------- */

/// Per-district reporting interval, `report_start < report_end`.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ScheduleEntry {
    pub district_id: DistrictId,
    pub report_start: i64,
    pub report_end: i64,
}

impl ScheduleEntry {
    /// Reporting phase at `now`: 0 before start, 1 after end, linear between.
    pub fn phase_at(&self, now_ms: i64) -> f64 {
        if now_ms <= self.report_start {
            0.0
        } else if now_ms >= self.report_end {
            1.0
        } else {
            (now_ms - self.report_start) as f64 / (self.report_end - self.report_start) as f64
        }
    }
}

/* -------------------------------------------------------------------------- */
/*                                 Race calls                                 */
/* -------------------------------------------------------------------------- */

/// A race may be called once phase and lead (percentage points) both reach
/// the rule's thresholds.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CallRule {
    pub phase: f64,
    pub lead: f64,
}

impl CallRule {
    pub const fn new(phase: f64, lead: f64) -> Self {
        Self { phase, lead }
    }

    #[inline]
    pub fn is_satisfied(&self, phase: f64, lead: f64) -> bool {
        phase >= self.phase && lead >= self.lead
    }

    /// Finite phase in `[0, 1]` and finite non-negative lead.
    pub fn is_well_formed(&self) -> bool {
        self.phase.is_finite()
            && (0.0..=1.0).contains(&self.phase)
            && self.lead.is_finite()
            && self.lead >= 0.0
    }
}

/// Stored, permanent call for a district.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CallEntry {
    pub winner: PartyKey,
    pub at: i64,
}

/* -------------------------------------------------------------------------- */
/*                               Party metadata                               */
/* -------------------------------------------------------------------------- */

/// Display metadata for a party. Colour strings are passed through untouched.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PartyMeta {
    #[cfg_attr(feature = "serde", serde(default))]
    pub name: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub color: Option<String>,
}

/* ---------------------------------- Tests --------------------------------- */

#[cfg(test)]
mod tests {
    use super::*;

    fn did(s: &str) -> DistrictId { s.parse().unwrap() }
    fn pk(s: &str) -> PartyKey { s.parse().unwrap() }

    #[test]
    fn missing_votes_read_as_zero() {
        let mut d = DistrictFinal::new(did("D1")).with_votes(pk("A"), 10);
        d.votes.insert(pk("B"), None);
        let parties = vec![pk("A"), pk("B"), pk("C")];
        assert_eq!(d.final_votes(&pk("B")), 0);
        assert_eq!(d.final_votes(&pk("C")), 0);
        assert_eq!(d.total_final(&parties), 10);
    }

    #[test]
    fn non_finite_numbers_are_absent() {
        let mut d = DistrictFinal::new(did("D1"));
        d.eligible_voters_est = Some(f64::NAN);
        d.turnout_pct = Some(f64::INFINITY);
        assert_eq!(d.eligible(), None);
        assert_eq!(d.turnout(), None);
    }

    #[test]
    fn window_shape_and_progress() {
        assert_eq!(CountWindow::new(10, 10), Err(CoreError::InvalidWindow));
        let w = CountWindow::new(1_000, 2_000).unwrap();
        assert_eq!(w.at_fraction(0.5), 1_500);
        assert_eq!(w.progress(500), 0.0);
        assert_eq!(w.progress(1_250), 0.25);
        assert_eq!(w.progress(9_000), 1.0);
        assert!(w.has_elapsed(2_000));
    }

    #[test]
    fn huge_windows_map_fractions_without_overflow() {
        let w = CountWindow::starting_at(1_700_000_000_000, i64::MAX);
        assert_eq!(w.end_ms, i64::MAX);
        for frac in [0.0, 0.5, 0.99, 0.999_999_9, 1.0, 7.0] {
            let t = w.at_fraction(frac);
            assert!(t >= w.start_ms && t <= w.end_ms, "{frac} -> {t}");
        }
        assert_eq!(w.at_fraction(1.0), i64::MAX);
        assert_eq!(w.at_fraction(f64::NAN), w.start_ms);

        let wide = CountWindow::new(i64::MIN, i64::MAX).unwrap();
        let mid = wide.at_fraction(0.5);
        assert!(mid > wide.start_ms && mid <= wide.end_ms);
    }

    #[test]
    fn phase_is_piecewise_linear() {
        let e = ScheduleEntry { district_id: did("D1"), report_start: 100, report_end: 200 };
        assert_eq!(e.phase_at(50), 0.0);
        assert_eq!(e.phase_at(100), 0.0);
        assert_eq!(e.phase_at(150), 0.5);
        assert_eq!(e.phase_at(200), 1.0);
        assert_eq!(e.phase_at(10_000), 1.0);
    }

    #[test]
    fn rule_thresholds_are_inclusive() {
        let r = CallRule::new(0.92, 12.0);
        assert!(r.is_satisfied(0.92, 12.0));
        assert!(!r.is_satisfied(0.91, 30.0));
        assert!(!CallRule::new(1.5, 1.0).is_well_formed());
        assert!(!CallRule::new(0.5, -1.0).is_well_formed());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn window_wire_names_are_camel_case() {
        let w = CountWindow::new(1, 2).unwrap();
        assert_eq!(serde_json::to_string(&w).unwrap(), r#"{"startMs":1,"endMs":2}"#);
    }
}
