//! Race-call decision helpers (pure half of the call engine).
//!
//! Leader/runner-up selection is a single linear scan over parties in the
//! canonical (sorted) order; on equal shares the first party seen keeps the
//! leader slot. The stateful part (the call registry) lives in the pipeline.

use en_core::ids::PartyKey;
use en_core::variables::DEFAULT_CALL_RULES;
use en_core::CallRule;

/// Top two parties by share, and the lead between them in percentage points.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Standing {
    pub leader: Option<(PartyKey, f64)>,
    pub runner_up: Option<(PartyKey, f64)>,
    /// `leader_share - runner_up_share`; 0 when either is missing.
    pub lead: f64,
}

impl Standing {
    pub fn leader_key(&self) -> Option<&PartyKey> {
        self.leader.as_ref().map(|(k, _)| k)
    }
}

/// Scan `(party, share)` pairs in the given order. `None` shares are skipped.
pub fn leader_and_runner_up<'a, I>(shares: I) -> Standing
where
    I: IntoIterator<Item = (&'a PartyKey, Option<f64>)>,
{
    let mut leader: Option<(PartyKey, f64)> = None;
    let mut runner_up: Option<(PartyKey, f64)> = None;

    for (key, share) in shares {
        let Some(s) = share.filter(|v| v.is_finite()) else { continue };
        if leader.as_ref().map_or(true, |(_, ls)| s > *ls) {
            runner_up = leader.take();
            leader = Some((key.clone(), s));
        } else if runner_up.as_ref().map_or(true, |(_, rs)| s > *rs) {
            runner_up = Some((key.clone(), s));
        }
    }

    let lead = match (&leader, &runner_up) {
        (Some((_, l)), Some((_, r))) => l - r,
        _ => 0.0,
    };
    Standing { leader, runner_up, lead }
}

/// Whether `(phase, lead)` warrants a call.
///
/// At or beyond `full_report_phase` any positive lead resolves the race and
/// the rule list is not consulted. Below it, any satisfied rule is enough.
/// An empty rule list means the built-in defaults.
pub fn should_call(phase: f64, lead: f64, rules: &[CallRule], full_report_phase: f64) -> bool {
    if !phase.is_finite() || !lead.is_finite() {
        return false;
    }
    if phase >= full_report_phase {
        return lead > 0.0;
    }
    let rules = if rules.is_empty() { &DEFAULT_CALL_RULES[..] } else { rules };
    rules.iter().any(|r| r.is_satisfied(phase, lead))
}

/// Display label for a district race.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RaceStatus {
    /// No votes counted yet.
    Unreported,
    Tossup,
    Lean,
    Called,
}

impl RaceStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            RaceStatus::Unreported => "unreported",
            RaceStatus::Tossup => "tossup",
            RaceStatus::Lean => "lean",
            RaceStatus::Called => "called",
        }
    }
}

impl core::fmt::Display for RaceStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn classify(called: bool, lead: f64, lean_lead: f64, has_votes: bool) -> RaceStatus {
    if called {
        RaceStatus::Called
    } else if !has_votes {
        RaceStatus::Unreported
    } else if lead >= lean_lead {
        RaceStatus::Lean
    } else {
        RaceStatus::Tossup
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pk(s: &str) -> PartyKey {
        s.parse().unwrap()
    }

    #[test]
    fn first_party_wins_exact_tie() {
        let (a, b, c) = (pk("A"), pk("B"), pk("C"));
        let st = leader_and_runner_up([(&a, Some(40.0)), (&b, Some(40.0)), (&c, Some(20.0))]);
        assert_eq!(st.leader_key(), Some(&a));
        assert_eq!(st.runner_up.as_ref().map(|(k, _)| k), Some(&b));
        assert_eq!(st.lead, 0.0);
    }

    #[test]
    fn later_higher_share_displaces_leader() {
        let (a, b, c) = (pk("A"), pk("B"), pk("C"));
        let st = leader_and_runner_up([(&a, Some(30.0)), (&b, Some(25.0)), (&c, Some(45.0))]);
        assert_eq!(st.leader_key(), Some(&c));
        assert_eq!(st.runner_up, Some((a, 30.0)));
        assert!((st.lead - 15.0).abs() < 1e-12);
    }

    #[test]
    fn missing_shares_give_zero_lead() {
        let (a, b) = (pk("A"), pk("B"));
        let st = leader_and_runner_up([(&a, None), (&b, None)]);
        assert_eq!(st, Standing::default());
        let st = leader_and_runner_up([(&a, Some(100.0)), (&b, None)]);
        assert_eq!(st.leader_key(), Some(&a));
        assert_eq!(st.lead, 0.0);
    }

    #[test]
    fn default_rules_apply_when_list_empty() {
        assert!(should_call(0.99, 0.5, &[], 0.999));
        assert!(should_call(0.75, 25.0, &[], 0.999));
        assert!(!should_call(0.75, 24.9, &[], 0.999));
        assert!(!should_call(0.0, 100.0, &[], 0.999));
    }

    #[test]
    fn full_reporting_needs_only_positive_lead() {
        let strict = [CallRule::new(1.0, 99.0)];
        assert!(should_call(0.999, 0.01, &strict, 0.999));
        assert!(!should_call(1.0, 0.0, &strict, 0.999));
    }

    #[test]
    fn custom_rules_replace_defaults() {
        let rules = [CallRule::new(0.5, 10.0)];
        assert!(should_call(0.5, 10.0, &rules, 0.999));
        assert!(!should_call(0.95, 9.0, &rules, 0.999));
    }

    #[test]
    fn labels() {
        assert_eq!(classify(true, 0.0, 4.0, true), RaceStatus::Called);
        assert_eq!(classify(false, 0.0, 4.0, false), RaceStatus::Unreported);
        assert_eq!(classify(false, 4.0, 4.0, true), RaceStatus::Lean);
        assert_eq!(classify(false, 3.9, 4.0, true), RaceStatus::Tossup);
        assert_eq!(RaceStatus::Lean.to_string(), "lean");
    }
}
