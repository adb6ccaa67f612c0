//! The simulation session: immutable inputs, the fixed schedule and the call
//! registry, owned by whoever drives the ticks.
//!
//! A session is built once, then `tick(now)` is called repeatedly. Each tick
//! rebuilds every live row from scratch; the registry is the only state that
//! carries over.

use en_core::entities::{CallRule, CountWindow, DistrictFinal, ScheduleEntry};
use en_core::ids::PartyKey;
use en_core::rng::UnitSource;
use en_core::variables::{validate_params, SimParams};
use log::{debug, info};

use crate::aggregate::{aggregate_national, NationalAggregate};
use crate::calls::{apply_calls, CallRegistry};
use crate::progress::{is_resolved, reporting_counts, ReportingCounts};
use crate::scale::{scale_rows_by_schedule, LiveDistrictRow};
use crate::schedule::assign_schedule;
use crate::PipelineError;

/// Everything one tick produces.
#[derive(Clone, Debug, PartialEq)]
pub struct TickOutput {
    pub now_ms: i64,
    /// 1-based tick number within the session.
    pub tick: u64,
    pub rows: Vec<LiveDistrictRow>,
    pub national: NationalAggregate,
    pub counts: ReportingCounts,
    pub newly_called: usize,
    /// No further phase change is possible.
    pub complete: bool,
}

#[derive(Debug, Clone)]
pub struct SimulationSession {
    parties: Vec<PartyKey>,
    records: Vec<DistrictFinal>,
    schedule: Vec<ScheduleEntry>,
    window: CountWindow,
    rules: Vec<CallRule>,
    params: SimParams,
    registry: CallRegistry,
    ticks: u64,
}

impl SimulationSession {
    /// Build a session, drawing the schedule from `rng`. An empty `rules`
    /// list means the built-in defaults.
    pub fn new<R>(
        parties: Vec<PartyKey>,
        records: Vec<DistrictFinal>,
        window: CountWindow,
        rules: Vec<CallRule>,
        params: SimParams,
        rng: &mut R,
    ) -> Result<Self, PipelineError>
    where
        R: UnitSource + ?Sized,
    {
        validate_params(&params)?;
        let schedule = assign_schedule(&records, &window, &params, rng);
        Self::with_schedule(parties, records, schedule, window, rules, params)
    }

    /// Build a session around a schedule fixed by the caller.
    pub fn with_schedule(
        parties: Vec<PartyKey>,
        records: Vec<DistrictFinal>,
        schedule: Vec<ScheduleEntry>,
        window: CountWindow,
        rules: Vec<CallRule>,
        params: SimParams,
    ) -> Result<Self, PipelineError> {
        validate_params(&params)?;
        if !window.is_valid() {
            return Err(PipelineError::Window("count window end must be after start".into()));
        }
        if let Some(bad) = schedule.iter().find(|e| e.report_end <= e.report_start) {
            return Err(PipelineError::Validate(format!(
                "schedule entry for {} ends before it starts",
                bad.district_id
            )));
        }
        info!(
            "session ready: {} districts, {} parties, window {}..{}",
            records.len(),
            parties.len(),
            window.start_ms,
            window.end_ms
        );
        Ok(Self {
            parties,
            records,
            schedule,
            window,
            rules,
            params,
            registry: CallRegistry::new(),
            ticks: 0,
        })
    }

    pub fn tick(&mut self, now_ms: i64) -> TickOutput {
        self.ticks += 1;

        let mut rows =
            scale_rows_by_schedule(&self.records, &self.schedule, &self.parties, now_ms, &self.params);
        let newly_called = apply_calls(&mut rows, &mut self.registry, &self.rules, &self.params, now_ms);
        let national = aggregate_national(&rows, &self.parties);
        let counts = reporting_counts(&rows, &self.window, now_ms);
        let complete = self.is_complete(now_ms);

        debug!(
            "tick {} at {now_ms}: {} ballots, {}/{} called, progress {:.1}%",
            self.ticks, national.ballots, counts.districts_called, counts.districts_total, counts.global_progress_pct
        );
        if complete {
            info!("simulation resolved at tick {}", self.ticks);
        }

        TickOutput { now_ms, tick: self.ticks, rows, national, counts, newly_called, complete }
    }

    /// Global progress has reached 100% and every reporting interval has ended.
    pub fn is_complete(&self, now_ms: i64) -> bool {
        is_resolved(&self.schedule, &self.window, now_ms)
    }

    /// National aggregate of the final records, independent of the clock.
    pub fn final_results(&self) -> NationalAggregate {
        aggregate_national(&self.records, &self.parties)
    }

    pub fn parties(&self) -> &[PartyKey] {
        &self.parties
    }

    pub fn records(&self) -> &[DistrictFinal] {
        &self.records
    }

    pub fn schedule(&self) -> &[ScheduleEntry] {
        &self.schedule
    }

    pub fn window(&self) -> &CountWindow {
        &self.window
    }

    pub fn rules(&self) -> &[CallRule] {
        &self.rules
    }

    pub fn params(&self) -> &SimParams {
        &self.params
    }

    pub fn registry(&self) -> &CallRegistry {
        &self.registry
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}
