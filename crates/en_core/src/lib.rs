//! en_core: Core types, domains, ordering helpers, deterministic hashing and
//! the schedule RNG.
//!
//! This crate is **I/O-free**. It defines the stable types shared across the
//! engine (`en_algo`, `en_io`, `en_pipeline`, `en_report`, `en_cli`).
//!
//! - Registry tokens: `DistrictId`, `PartyKey`
//! - Entities: final district records, count window, schedule entries,
//!   call rules and call entries, party display metadata
//! - `SimParams` with safe defaults and domain validation
//! - Deterministic string hash to the unit interval (party bias source)
//! - Seedable ChaCha20 stream for schedule jitter (the only random source)
//!
//! Serialization derives are gated behind the `serde` feature.

#![forbid(unsafe_code)]

pub mod determinism;
pub mod entities;
pub mod errors;
pub mod hash;
pub mod ids;
pub mod rng;
pub mod variables;

pub use entities::{CallEntry, CallRule, CountWindow, DistrictFinal, PartyMeta, ScheduleEntry};
pub use errors::CoreError;
pub use ids::{DistrictId, PartyKey};
pub use variables::SimParams;
