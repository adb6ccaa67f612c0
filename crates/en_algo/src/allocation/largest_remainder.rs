//! Largest Remainder (LR) apportionment of an integer total over real weights.
//!
//! Contract:
//! - Ideal share i = total * w_i / Σw; floors are taken first.
//! - Leftover units go one each to the largest fractional remainders
//!   (tie keys: remainder ↓, then original index ↑).
//! - If floating rounding makes the floors overshoot, trim from the smallest
//!   remainders (remainder ↑, then original index ↑).
//! - Non-finite or negative weights count as 0 and never receive units.
//! - `total == 0` or Σw ≤ 0 → all zeros.
//!
//! Invariant: the output has `weights.len()` entries summing exactly to `total`
//! (or to 0 in the degenerate cases above).

use core::cmp::Ordering;

/// Distribute `total` across `weights` (same order as the parties).
pub fn apportion(total: u64, weights: &[f64]) -> Vec<u64> {
    let n = weights.len();
    if total == 0 || n == 0 {
        return vec![0; n];
    }

    let clean: Vec<f64> = weights
        .iter()
        .map(|&w| if w.is_finite() && w > 0.0 { w } else { 0.0 })
        .collect();
    let sum: f64 = clean.iter().sum();
    if !(sum.is_finite() && sum > 0.0) {
        return vec![0; n];
    }

    let (mut alloc, remainders) = floors_and_remainders(total, &clean, sum);

    let given: u128 = alloc.iter().map(|&v| v as u128).sum();
    if given < total as u128 {
        let needed = (total as u128 - given) as u64;
        distribute_leftovers(needed, &mut alloc, &remainders, &clean);
    } else if given > total as u128 {
        trim_over_allocation(total, &mut alloc, &remainders);
    }

    debug_assert_eq!(alloc.iter().map(|&v| v as u128).sum::<u128>(), total as u128);
    alloc
}

/// Floors and fractional remainders of the ideal shares.
fn floors_and_remainders(total: u64, weights: &[f64], sum: f64) -> (Vec<u64>, Vec<f64>) {
    let t = total as f64;
    let mut floors = Vec::with_capacity(weights.len());
    let mut rems = Vec::with_capacity(weights.len());

    for &w in weights {
        let ideal = t * (w / sum);
        let f = ideal.floor().clamp(0.0, t);
        floors.push(f as u64);
        rems.push((ideal - f).max(0.0));
    }

    (floors, rems)
}

/// Assign `target_extra` units by largest remainder among positive weights.
/// The ranking is built once and reused cyclically.
fn distribute_leftovers(target_extra: u64, alloc: &mut [u64], remainders: &[f64], weights: &[f64]) {
    let mut ranking: Vec<usize> = (0..alloc.len()).filter(|&i| weights[i] > 0.0).collect();
    if ranking.is_empty() {
        return;
    }

    // Stable sort: equal remainders keep their original order.
    ranking.sort_by(|&a, &b| remainders[b].partial_cmp(&remainders[a]).unwrap_or(Ordering::Equal));

    let n = ranking.len();
    let mut given = 0u64;
    let mut idx = 0usize;
    while given < target_extra {
        alloc[ranking[idx]] += 1;
        given += 1;
        idx += 1;
        if idx == n {
            idx = 0;
        }
    }
}

/// Remove units when floors over-allocate, smallest remainder first.
fn trim_over_allocation(target: u64, alloc: &mut [u64], remainders: &[f64]) {
    let mut total: u128 = alloc.iter().map(|&v| v as u128).sum();
    if total <= target as u128 {
        return;
    }

    let mut ranking: Vec<usize> = (0..alloc.len()).filter(|&i| alloc[i] > 0).collect();
    ranking.sort_by(|&a, &b| remainders[a].partial_cmp(&remainders[b]).unwrap_or(Ordering::Equal));
    if ranking.is_empty() {
        return;
    }

    let mut idx = 0usize;
    while total > target as u128 {
        let i = ranking[idx];
        if alloc[i] > 0 {
            alloc[i] -= 1;
            total -= 1;
        }
        idx += 1;
        if idx == ranking.len() {
            idx = 0;
        }
    }
}
