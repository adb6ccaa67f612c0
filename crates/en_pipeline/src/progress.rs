//! Reporting counts for status displays, and the end-of-simulation test.

use en_core::entities::{CountWindow, ScheduleEntry};

use crate::scale::LiveDistrictRow;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ReportingCounts {
    pub districts_called: usize,
    pub districts_total: usize,
    /// Phase > 0.
    pub districts_reporting: usize,
    /// Phase == 1.
    pub districts_complete: usize,
    /// Elapsed share of the count window, 0..=100.
    pub global_progress_pct: f64,
}

pub fn reporting_counts(rows: &[LiveDistrictRow], window: &CountWindow, now_ms: i64) -> ReportingCounts {
    ReportingCounts {
        districts_called: rows.iter().filter(|r| r.is_called()).count(),
        districts_total: rows.len(),
        districts_reporting: rows.iter().filter(|r| r.phase > 0.0).count(),
        districts_complete: rows.iter().filter(|r| r.phase >= 1.0).count(),
        global_progress_pct: window.progress(now_ms) * 100.0,
    }
}

/// No phase can change any more: the window has fully elapsed and every
/// district's reporting interval has ended.
pub fn is_resolved(schedule: &[ScheduleEntry], window: &CountWindow, now_ms: i64) -> bool {
    window.has_elapsed(now_ms) && schedule.iter().all(|e| e.report_end <= now_ms)
}
