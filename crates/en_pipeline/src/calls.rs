//! CALLS stage: race calls with a monotonic registry.
//!
//! A district enters the registry at most once and is never removed or
//! overwritten. Every later live row for that district carries the stored
//! `{winner, at}`, whatever the recomputed lead says.

use std::collections::btree_map::{self, BTreeMap};

use en_algo::calls::{classify, leader_and_runner_up, should_call};
use en_core::entities::{CallEntry, CallRule};
use en_core::ids::DistrictId;
use en_core::variables::SimParams;
use log::info;

use crate::scale::LiveDistrictRow;

/// Session-wide call memory. Insert-only.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CallRegistry {
    entries: BTreeMap<DistrictId, CallEntry>,
}

impl CallRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn get(&self, district: &DistrictId) -> Option<&CallEntry> {
        self.entries.get(district)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, DistrictId, CallEntry> {
        self.entries.iter()
    }

    /// Store `entry` unless the district already has one; either way the
    /// stored entry is returned.
    pub fn record(&mut self, district: DistrictId, entry: CallEntry) -> &CallEntry {
        self.entries.entry(district).or_insert(entry)
    }
}

/// Evaluate one row. Fills `standing`, `call` and `status`; returns `true`
/// when this evaluation created a new registry entry.
pub fn evaluate_call(
    row: &mut LiveDistrictRow,
    registry: &mut CallRegistry,
    rules: &[CallRule],
    params: &SimParams,
    now_ms: i64,
) -> bool {
    let standing = leader_and_runner_up(row.parties.iter().map(|(k, p)| (k, p.share)));
    let mut newly_called = false;

    let call = match registry.get(&row.district_id) {
        Some(stored) => Some(stored.clone()),
        None => match standing.leader_key() {
            Some(leader) if should_call(row.phase, standing.lead, rules, params.full_report_phase) => {
                let entry = CallEntry { winner: leader.clone(), at: now_ms };
                info!(
                    "called {} for {} (phase {:.3}, lead {:.2} pts)",
                    row.district_id, leader, row.phase, standing.lead
                );
                newly_called = true;
                Some(registry.record(row.district_id.clone(), entry).clone())
            }
            _ => None,
        },
    };

    row.status = classify(call.is_some(), standing.lead, params.lean_lead_pp, row.total_votes > 0);
    row.call = call;
    row.standing = standing;
    newly_called
}

/// Evaluate every row of a tick; returns how many districts were newly called.
pub fn apply_calls(
    rows: &mut [LiveDistrictRow],
    registry: &mut CallRegistry,
    rules: &[CallRule],
    params: &SimParams,
    now_ms: i64,
) -> usize {
    let mut newly_called = 0;
    for row in rows.iter_mut() {
        if evaluate_call(row, registry, rules, params, now_ms) {
            newly_called += 1;
        }
    }
    newly_called
}
