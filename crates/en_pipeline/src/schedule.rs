//! SCHEDULE stage: give every district its own reporting interval inside the
//! count window.
//!
//! - base start fraction from the geography heuristics (`SimParams::geo_bias_for`)
//! - `start = clamp(base ± start_jitter, start_frac_min, start_frac_max)`
//! - `end = min(max(start + U(span_min, span_max), start + min_span_frac), 1)`
//! - both fractions mapped onto the window, rounded to whole ms
//!
//! The jitter is the one intentionally random input of the simulation and is
//! drawn from the injected `UnitSource`, two draws per district in row order.

use en_core::entities::{CountWindow, DistrictFinal, ScheduleEntry};
use en_core::ids::DistrictId;
use en_core::rng::UnitSource;
use en_core::variables::SimParams;
use log::debug;

/// One entry per row, in row order.
pub fn assign_schedule<R>(
    rows: &[DistrictFinal],
    window: &CountWindow,
    params: &SimParams,
    rng: &mut R,
) -> Vec<ScheduleEntry>
where
    R: UnitSource + ?Sized,
{
    let out: Vec<ScheduleEntry> = rows
        .iter()
        .map(|r| schedule_entry(&r.district_id, window, params, rng))
        .collect();
    debug!("assigned {} reporting intervals", out.len());
    out
}

pub fn schedule_entry<R>(
    district: &DistrictId,
    window: &CountWindow,
    params: &SimParams,
    rng: &mut R,
) -> ScheduleEntry
where
    R: UnitSource + ?Sized,
{
    let base = params.geo_bias_for(district.as_str());
    let jitter = (rng.next_unit() - 0.5) * 2.0 * params.start_jitter;
    let start_frac = (base + jitter).clamp(params.start_frac_min, params.start_frac_max);

    let span = params.span_min + rng.next_unit() * (params.span_max - params.span_min);
    let end_frac = (start_frac + span)
        .max(start_frac + params.min_span_frac)
        .min(1.0);

    let (report_start, report_end) = to_interval(window, start_frac, end_frac);
    ScheduleEntry { district_id: district.clone(), report_start, report_end }
}

/// Map fractions onto the window, keeping `start < end <= window.end_ms`
/// even when rounding collapses a very short window.
fn to_interval(window: &CountWindow, start_frac: f64, end_frac: f64) -> (i64, i64) {
    let mut start = window.at_fraction(start_frac.clamp(0.0, 1.0));
    let mut end = window.at_fraction(end_frac.clamp(0.0, 1.0));
    if end <= start {
        if start >= window.end_ms {
            start = window.end_ms - 1;
        }
        end = start + 1;
    }
    (start.max(window.start_ms), end)
}
