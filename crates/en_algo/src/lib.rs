// crates/en_algo/src/lib.rs
#![forbid(unsafe_code)]

//! Pure math behind the live simulation. No clocks, no I/O, no state.
//!
//! - `bias`: zero-mean, amplitude-bounded per-party bias (deterministic)
//! - `weight`: early-reporting weight that fades to 1 at full reporting
//! - `allocation::largest_remainder`: integer apportionment with exact sums
//! - `calls`: leader/runner-up selection, call rules, race status labels

pub mod bias;
pub mod calls;
pub mod weight;

pub mod allocation {
    pub mod largest_remainder;

    pub use largest_remainder::apportion;
}

pub use allocation::apportion;
pub use bias::{bias_vector, BIAS_EPSILON};
pub use calls::{classify, leader_and_runner_up, should_call, RaceStatus, Standing};
pub use weight::{early_weight, early_weight_with_floor, DEFAULT_ALPHA, MIN_WEIGHT};
