// crates/en_algo/tests/properties.rs
// Property checks for apportionment, bias and early weights.

use en_algo::{apportion, bias_vector, early_weight};
use en_core::PartyKey;
use proptest::prelude::*;

fn parties(n: usize) -> Vec<PartyKey> {
    (0..n).map(|i| format!("P{i}").parse().unwrap()).collect()
}

proptest! {
    #[test]
    fn apportion_sums_to_total(total in 0u64..5_000_000, weights in prop::collection::vec(0.0f64..1e6, 1..12)) {
        let out = apportion(total, &weights);
        prop_assert_eq!(out.len(), weights.len());
        let positive = weights.iter().any(|&w| w > 0.0);
        let expected = if positive { total } else { 0 };
        prop_assert_eq!(out.iter().sum::<u64>(), expected);
    }

    #[test]
    fn apportion_zero_total_is_all_zero(weights in prop::collection::vec(0.0f64..1e3, 0..10)) {
        let out = apportion(0, &weights);
        prop_assert!(out.iter().all(|&v| v == 0));
        prop_assert_eq!(out.len(), weights.len());
    }

    #[test]
    fn apportion_stays_within_one_of_ideal(total in 1u64..100_000, weights in prop::collection::vec(0.01f64..100.0, 1..8)) {
        let out = apportion(total, &weights);
        let sum: f64 = weights.iter().sum();
        for (got, w) in out.iter().zip(&weights) {
            let ideal = total as f64 * w / sum;
            prop_assert!((*got as f64 - ideal).abs() < 1.0 + 1e-6);
        }
    }

    #[test]
    fn bias_is_zero_mean_and_bounded(district in "[A-Za-z ]{1,24}", n in 2usize..9, amp in 0.01f64..1.0) {
        let b = bias_vector(&district, &parties(n), amp);
        let sum: f64 = b.values().sum();
        prop_assert!(sum.abs() < 1e-9);
        prop_assert!(b.values().all(|v| v.abs() <= amp + 1e-12));
    }

    #[test]
    fn bias_is_repeatable(district in "\\PC{1,16}", n in 1usize..6) {
        let ps = parties(n);
        let a = bias_vector(&district, &ps, 0.2);
        let b = bias_vector(&district, &ps, 0.2);
        for (x, y) in a.values().zip(b.values()) {
            prop_assert_eq!(x.to_bits(), y.to_bits());
        }
    }

    #[test]
    fn weight_converges_at_full_phase(bias in -10.0f64..10.0, alpha in 0.0f64..5.0) {
        prop_assert_eq!(early_weight(bias, 1.0, alpha), 1.0);
    }
}

#[test]
fn apportion_all_zero_weights() {
    assert_eq!(apportion(123, &[0.0, 0.0, 0.0]), vec![0, 0, 0]);
}
