//! Report model for one tick.
//!
//! Party display names and colours come from the metadata map passed in by
//! the caller; a party without metadata is shown under its key.

use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat};
use en_core::entities::PartyMeta;
use en_core::ids::PartyKey;
use en_pipeline::TickOutput;

use crate::ReportError;

const DEFAULT_TITLE: &str = "Election Night";

#[derive(Clone, Debug, PartialEq)]
pub struct ReportModel {
    pub title: String,
    pub tick: u64,
    pub now_ms: i64,
    /// RFC 3339, millisecond precision, `Z`.
    pub timestamp_utc: String,
    pub complete: bool,
    pub status: StatusLine,
    pub national: NationalPanel,
    pub districts: Vec<DistrictView>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct StatusLine {
    pub called: usize,
    pub total: usize,
    pub reporting: usize,
    pub complete: usize,
    pub progress_pct_1dp: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NationalPanel {
    pub ballots: u64,
    pub turnout_pct_1dp: String,
    /// Descending by votes.
    pub parties: Vec<PartyLine>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PartyLine {
    pub key: String,
    pub name: String,
    pub color: Option<String>,
    pub votes: u64,
    pub pct_1dp: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DistrictView {
    pub district_id: String,
    pub phase_pct_1dp: String,
    pub total_votes: u64,
    /// "unreported" | "tossup" | "lean" | "called"
    pub status: String,
    pub leader: Option<String>,
    pub lead_pp_1dp: String,
    pub call: Option<CallView>,
    /// Canonical party order.
    pub parties: Vec<DistrictPartyView>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CallView {
    pub winner: String,
    pub winner_name: String,
    pub at_ms: i64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DistrictPartyView {
    pub key: String,
    pub votes: u64,
    /// `None` while the district has no votes.
    pub share_1dp: Option<String>,
}

/// Build the report model for `out`.
pub fn build_model(
    out: &TickOutput,
    party_meta: &BTreeMap<PartyKey, PartyMeta>,
    title: Option<&str>,
) -> Result<ReportModel, ReportError> {
    let timestamp_utc = DateTime::from_timestamp_millis(out.now_ms)
        .ok_or(ReportError::MissingField("timestamp_utc"))?
        .to_rfc3339_opts(SecondsFormat::Millis, true);

    let name_of = |k: &PartyKey| -> String {
        party_meta
            .get(k)
            .and_then(|m| m.name.clone())
            .unwrap_or_else(|| k.as_str().to_owned())
    };

    let national = NationalPanel {
        ballots: out.national.ballots,
        turnout_pct_1dp: pct_1dp(out.national.nat_turnout),
        parties: out
            .national
            .ordered
            .iter()
            .map(|k| PartyLine {
                key: k.as_str().to_owned(),
                name: name_of(k),
                color: party_meta.get(k).and_then(|m| m.color.clone()),
                votes: out.national.totals.get(k).copied().unwrap_or(0),
                pct_1dp: pct_1dp(out.national.nat_pct.get(k).copied().unwrap_or(0.0)),
            })
            .collect(),
    };

    let districts = out
        .rows
        .iter()
        .map(|r| DistrictView {
            district_id: r.district_id.as_str().to_owned(),
            phase_pct_1dp: pct_1dp(r.phase * 100.0),
            total_votes: r.total_votes,
            status: r.status.as_str().to_owned(),
            leader: r.standing.leader_key().map(|k| k.as_str().to_owned()),
            lead_pp_1dp: pct_1dp(r.standing.lead),
            call: r.call.as_ref().map(|c| CallView {
                winner: c.winner.as_str().to_owned(),
                winner_name: name_of(&c.winner),
                at_ms: c.at,
            }),
            parties: r
                .parties
                .iter()
                .map(|(k, p)| DistrictPartyView {
                    key: k.as_str().to_owned(),
                    votes: p.votes,
                    share_1dp: p.share.map(pct_1dp),
                })
                .collect(),
        })
        .collect();

    Ok(ReportModel {
        title: title.filter(|t| !t.trim().is_empty()).unwrap_or(DEFAULT_TITLE).to_owned(),
        tick: out.tick,
        now_ms: out.now_ms,
        timestamp_utc,
        complete: out.complete,
        status: StatusLine {
            called: out.counts.districts_called,
            total: out.counts.districts_total,
            reporting: out.counts.districts_reporting,
            complete: out.counts.districts_complete,
            progress_pct_1dp: pct_1dp(out.counts.global_progress_pct),
        },
        national,
        districts,
    })
}

/// One decimal, no sign on zero.
pub(crate) fn pct_1dp(x: f64) -> String {
    if !x.is_finite() {
        return "0.0".to_owned();
    }
    let s = format!("{x:.1}");
    if s == "-0.0" { "0.0".to_owned() } else { s }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use en_core::entities::{CountWindow, DistrictFinal, ScheduleEntry};
    use en_core::variables::SimParams;
    use en_pipeline::SimulationSession;

    pub fn pk(s: &str) -> PartyKey {
        s.parse().unwrap()
    }

    /// Two districts: "Alpha <1>" fully reported, "Beta" not started.
    pub fn tick() -> TickOutput {
        let mut a = DistrictFinal::new("Alpha <1>".parse().unwrap())
            .with_votes(pk("A"), 600)
            .with_votes(pk("B"), 400);
        a.eligible_voters_est = Some(1000.0);
        a.turnout_pct = Some(70.0);
        let b = DistrictFinal::new("Beta".parse().unwrap())
            .with_votes(pk("A"), 100)
            .with_votes(pk("B"), 300);
        let schedule = vec![
            ScheduleEntry { district_id: "Alpha <1>".parse().unwrap(), report_start: 0, report_end: 1_000 },
            ScheduleEntry { district_id: "Beta".parse().unwrap(), report_start: 5_000, report_end: 9_000 },
        ];
        let mut s = SimulationSession::with_schedule(
            vec![pk("A"), pk("B")],
            vec![a, b],
            schedule,
            CountWindow::new(0, 10_000).unwrap(),
            vec![],
            SimParams::default(),
        )
        .unwrap();
        s.tick(2_000)
    }

    pub fn meta() -> BTreeMap<PartyKey, PartyMeta> {
        let mut m = BTreeMap::new();
        m.insert(pk("A"), PartyMeta { name: Some("Alpha & Co".into()), color: Some("#c00".into()) });
        m
    }
}
