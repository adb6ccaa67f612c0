//! SCALE stage: turn final records into the live rows of one tick.
//!
//! Per district:
//! - `phase` from its schedule entry at `now`
//! - `reported = round(total_final * phase)`
//! - weights `final_votes[p] * early_weight(bias[p], phase)`
//! - `reported` apportioned over those weights (largest remainder)
//!
//! Live votes always sum exactly to `total_votes`. Shares are percentages, or
//! `None` for every party while nothing is reported.

use std::collections::BTreeMap;

use en_algo::calls::{RaceStatus, Standing};
use en_algo::{apportion, bias_vector, early_weight_with_floor};
use en_core::entities::{CallEntry, DistrictFinal, ScheduleEntry};
use en_core::ids::{DistrictId, PartyKey};
use en_core::variables::SimParams;
use log::debug;

/// Live count for one party in one district.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PartyLive {
    pub votes: u64,
    /// Percent of the district's live total; `None` while the total is 0.
    pub share: Option<f64>,
}

/// One district at one tick. Rebuilt from scratch every tick; the call fields
/// are filled in by the call stage.
#[derive(Clone, Debug, PartialEq)]
pub struct LiveDistrictRow {
    pub district_id: DistrictId,
    /// Reporting phase in `[0, 1]`.
    pub phase: f64,
    pub eligible_voters_est: Option<f64>,
    pub turnout_pct: Option<f64>,
    /// Every known party, canonical order.
    pub parties: BTreeMap<PartyKey, PartyLive>,
    pub total_votes: u64,
    pub call: Option<CallEntry>,
    pub standing: Standing,
    pub status: RaceStatus,
}

impl LiveDistrictRow {
    #[inline]
    pub fn votes_live(&self, party: &PartyKey) -> u64 {
        self.parties.get(party).map_or(0, |p| p.votes)
    }

    #[inline]
    pub fn share(&self, party: &PartyKey) -> Option<f64> {
        self.parties.get(party).and_then(|p| p.share)
    }

    #[inline]
    pub fn is_called(&self) -> bool {
        self.call.is_some()
    }
}

/// Scale one district at `now`.
pub fn scale_row(
    record: &DistrictFinal,
    entry: &ScheduleEntry,
    parties: &[PartyKey],
    now_ms: i64,
    params: &SimParams,
) -> LiveDistrictRow {
    scale_at_phase(record, entry.phase_at(now_ms), parties, params)
}

/// Scale every record that has a schedule entry. Records without one stay at
/// phase 0.
pub fn scale_rows_by_schedule(
    records: &[DistrictFinal],
    schedule: &[ScheduleEntry],
    parties: &[PartyKey],
    now_ms: i64,
    params: &SimParams,
) -> Vec<LiveDistrictRow> {
    let by_id: BTreeMap<&DistrictId, &ScheduleEntry> =
        schedule.iter().map(|e| (&e.district_id, e)).collect();

    records
        .iter()
        .map(|r| match by_id.get(&r.district_id) {
            Some(entry) => scale_row(r, entry, parties, now_ms, params),
            None => {
                debug!("no schedule entry for {}; holding at phase 0", r.district_id);
                scale_at_phase(r, 0.0, parties, params)
            }
        })
        .collect()
}

pub(crate) fn scale_at_phase(
    record: &DistrictFinal,
    phase: f64,
    parties: &[PartyKey],
    params: &SimParams,
) -> LiveDistrictRow {
    let phase = if phase.is_finite() { phase.clamp(0.0, 1.0) } else { 0.0 };

    let finals: Vec<u64> = parties.iter().map(|p| record.final_votes(p)).collect();
    let total_final: u64 = finals.iter().fold(0u64, |a, v| a.saturating_add(*v));
    let reported = ((total_final as f64 * phase).round() as u64).min(total_final);

    let bias = bias_vector(record.district_id.as_str(), parties, params.bias_amp);
    let weights: Vec<f64> = parties
        .iter()
        .zip(&finals)
        .map(|(p, &f)| {
            let b = bias.get(p).copied().unwrap_or(0.0);
            f as f64 * early_weight_with_floor(b, phase, params.early_alpha, params.min_weight)
        })
        .collect();
    let alloc = apportion(reported, &weights);
    let total_votes: u64 = alloc.iter().sum();

    let party_rows = parties
        .iter()
        .zip(alloc)
        .map(|(p, votes)| {
            let share = (total_votes > 0).then(|| votes as f64 / total_votes as f64 * 100.0);
            (p.clone(), PartyLive { votes, share })
        })
        .collect();

    LiveDistrictRow {
        district_id: record.district_id.clone(),
        phase,
        eligible_voters_est: record.eligible(),
        turnout_pct: record.turnout(),
        parties: party_rows,
        total_votes,
        call: None,
        standing: Standing::default(),
        status: if total_votes > 0 { RaceStatus::Tossup } else { RaceStatus::Unreported },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pk(s: &str) -> PartyKey {
        s.parse().unwrap()
    }

    fn entry(start: i64, end: i64) -> ScheduleEntry {
        ScheduleEntry { district_id: "D1".parse().unwrap(), report_start: start, report_end: end }
    }

    fn record() -> DistrictFinal {
        DistrictFinal::new("D1".parse().unwrap())
            .with_votes(pk("A"), 600)
            .with_votes(pk("B"), 400)
    }

    #[test]
    fn before_start_nothing_is_reported() {
        let parties = [pk("A"), pk("B")];
        let row = scale_row(&record(), &entry(100, 200), &parties, 50, &SimParams::default());
        assert_eq!(row.phase, 0.0);
        assert_eq!(row.total_votes, 0);
        assert!(row.parties.values().all(|p| p.votes == 0 && p.share.is_none()));
        assert_eq!(row.status, RaceStatus::Unreported);
    }

    #[test]
    fn partial_phase_sums_exactly() {
        let parties = [pk("A"), pk("B")];
        let row = scale_row(&record(), &entry(0, 1_000), &parties, 333, &SimParams::default());
        assert_eq!(row.total_votes, 333);
        assert_eq!(row.votes_live(&pk("A")) + row.votes_live(&pk("B")), 333);
        let shares: f64 = row.parties.values().filter_map(|p| p.share).sum();
        assert!((shares - 100.0).abs() < 1e-9);
    }

    #[test]
    fn missing_votes_and_unknown_parties_read_as_zero() {
        let parties = [pk("A"), pk("B"), pk("Z")];
        let mut rec = record();
        rec.votes.insert(pk("B"), None);
        let row = scale_row(&rec, &entry(0, 10), &parties, 10, &SimParams::default());
        assert_eq!(row.votes_live(&pk("A")), 600);
        assert_eq!(row.votes_live(&pk("B")), 0);
        assert_eq!(row.share(&pk("Z")), Some(0.0));
    }

    #[test]
    fn empty_party_list_gives_empty_row() {
        let row = scale_row(&record(), &entry(0, 10), &[], 10, &SimParams::default());
        assert!(row.parties.is_empty());
        assert_eq!(row.total_votes, 0);
    }

    #[test]
    fn unscheduled_records_hold_at_zero() {
        let parties = [pk("A"), pk("B")];
        let rows = scale_rows_by_schedule(&[record()], &[], &parties, 1_000, &SimParams::default());
        assert_eq!(rows[0].phase, 0.0);
        assert_eq!(rows[0].total_votes, 0);
    }
}
