//! Determinism utilities: canonical party order and stable rankings.
//!
//! Party keys are always iterated in ascending (lexicographic) order. Every
//! tie-break downstream ("first party encountered wins") is defined against
//! this order, never against map or hash iteration order.

use std::collections::{BTreeMap, BTreeSet};

use crate::ids::PartyKey;

/// Deduplicate and sort party keys into canonical order.
pub fn canonical_parties<I>(keys: I) -> Vec<PartyKey>
where
    I: IntoIterator<Item = PartyKey>,
{
    keys.into_iter().collect::<BTreeSet<_>>().into_iter().collect()
}

/// Rank `parties` by `totals` descending. The sort is stable, so equal totals
/// keep the order of `parties`. Parties missing from `totals` rank as 0.
pub fn rank_by_total_desc(parties: &[PartyKey], totals: &BTreeMap<PartyKey, u64>) -> Vec<PartyKey> {
    let mut out = parties.to_vec();
    out.sort_by(|a, b| {
        let ta = totals.get(a).copied().unwrap_or(0);
        let tb = totals.get(b).copied().unwrap_or(0);
        tb.cmp(&ta)
    });
    out
}

/* ---------------------------------- Tests --------------------------------- */
