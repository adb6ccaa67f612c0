//! AGGREGATE stage: national totals, percentages and phase-weighted turnout.
//!
//! Works over anything implementing `ReportingUnit`: live rows of a tick, or
//! plain final records (no phase; weight 1 when the record has votes).
//!
//! Turnout: `Σ(turnout · eligible · phase) / Σ(eligible · phase)`, 0 when no
//! weight accumulates. Districts missing turnout or eligible voters are left
//! out of both sums.

use std::collections::BTreeMap;

use en_core::determinism::rank_by_total_desc;
use en_core::entities::DistrictFinal;
use en_core::ids::PartyKey;

use crate::scale::LiveDistrictRow;

/// Read access the aggregator needs from a district.
pub trait ReportingUnit {
    fn live_votes(&self, party: &PartyKey) -> u64;
    /// `None` when the unit carries no reporting phase.
    fn reported_phase(&self) -> Option<f64>;
    fn eligible(&self) -> Option<f64>;
    fn turnout(&self) -> Option<f64>;
    fn has_votes(&self) -> bool;
}

impl ReportingUnit for LiveDistrictRow {
    fn live_votes(&self, party: &PartyKey) -> u64 {
        self.votes_live(party)
    }
    fn reported_phase(&self) -> Option<f64> {
        Some(self.phase)
    }
    fn eligible(&self) -> Option<f64> {
        self.eligible_voters_est
    }
    fn turnout(&self) -> Option<f64> {
        self.turnout_pct
    }
    fn has_votes(&self) -> bool {
        self.total_votes > 0
    }
}

impl ReportingUnit for DistrictFinal {
    fn live_votes(&self, party: &PartyKey) -> u64 {
        self.final_votes(party)
    }
    fn reported_phase(&self) -> Option<f64> {
        None
    }
    fn eligible(&self) -> Option<f64> {
        DistrictFinal::eligible(self)
    }
    fn turnout(&self) -> Option<f64> {
        DistrictFinal::turnout(self)
    }
    fn has_votes(&self) -> bool {
        self.votes.values().any(|v| v.unwrap_or(0) > 0)
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct NationalAggregate {
    pub totals: BTreeMap<PartyKey, u64>,
    /// Percent of `ballots`; all zero when `ballots == 0`.
    pub nat_pct: BTreeMap<PartyKey, f64>,
    pub ballots: u64,
    pub nat_turnout: f64,
    /// Parties by descending total; ties keep canonical order.
    pub ordered: Vec<PartyKey>,
}

pub fn aggregate_national<U: ReportingUnit>(units: &[U], parties: &[PartyKey]) -> NationalAggregate {
    let mut totals: BTreeMap<PartyKey, u64> = parties.iter().map(|p| (p.clone(), 0)).collect();
    let mut weighted_turnout = 0.0f64;
    let mut weight = 0.0f64;

    for u in units {
        for p in parties {
            if let Some(t) = totals.get_mut(p) {
                *t = t.saturating_add(u.live_votes(p));
            }
        }

        let phase = match u.reported_phase() {
            Some(ph) if ph.is_finite() => ph.clamp(0.0, 1.0),
            Some(_) => 0.0,
            None => {
                if u.has_votes() {
                    1.0
                } else {
                    0.0
                }
            }
        };
        if let (Some(turnout), Some(eligible)) = (u.turnout(), u.eligible()) {
            let w = eligible * phase;
            weighted_turnout += turnout * w;
            weight += w;
        }
    }

    let ballots: u64 = totals.values().fold(0u64, |a, v| a.saturating_add(*v));
    let nat_pct = totals
        .iter()
        .map(|(p, &v)| {
            let pct = if ballots > 0 { v as f64 / ballots as f64 * 100.0 } else { 0.0 };
            (p.clone(), pct)
        })
        .collect();
    let nat_turnout = if weight > 0.0 { weighted_turnout / weight } else { 0.0 };
    let ordered = rank_by_total_desc(parties, &totals);

    NationalAggregate { totals, nat_pct, ballots, nat_turnout, ordered }
}
