//! Timer-driven ticking.
//!
//! One tick runs to completion before the next is scheduled; there is no
//! overlap and no concurrency. The loop stops once the session is resolved,
//! or after `max_ticks` if set.

use std::thread;
use std::time::Duration;

use chrono::Utc;
use log::debug;

use crate::session::{SimulationSession, TickOutput};

pub trait Clock {
    fn now_ms(&self) -> i64;
    fn sleep_ms(&mut self, ms: u64);
}

/// Wall clock; sleeps for real.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        Utc::now().timestamp_millis()
    }

    fn sleep_ms(&mut self, ms: u64) {
        thread::sleep(Duration::from_millis(ms));
    }
}

/// Simulated clock: sleeping advances time instantly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManualClock {
    now: i64,
}

impl ManualClock {
    pub fn new(start_ms: i64) -> Self {
        Self { now: start_ms }
    }

    pub fn advance(&mut self, ms: i64) {
        self.now = self.now.saturating_add(ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.now
    }

    fn sleep_ms(&mut self, ms: u64) {
        self.advance(i64::try_from(ms).unwrap_or(i64::MAX));
    }
}

/// Why the ticker stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickerStop {
    Resolved { ticks: u64 },
    MaxTicks { ticks: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticker {
    pub interval_ms: u64,
    pub max_ticks: Option<u64>,
}

impl Ticker {
    pub fn new(interval_ms: u64) -> Self {
        Self { interval_ms: interval_ms.max(1), max_ticks: None }
    }

    pub fn with_max_ticks(mut self, max: Option<u64>) -> Self {
        self.max_ticks = max;
        self
    }

    /// Tick until resolved (or the tick cap), handing each output to
    /// `on_tick`. An error from `on_tick` stops the loop and is returned.
    pub fn run<C, F, E>(&self, session: &mut SimulationSession, clock: &mut C, mut on_tick: F) -> Result<TickerStop, E>
    where
        C: Clock + ?Sized,
        F: FnMut(&TickOutput) -> Result<(), E>,
    {
        let mut ticks = 0u64;
        loop {
            let out = session.tick(clock.now_ms());
            ticks += 1;
            on_tick(&out)?;

            if out.complete {
                return Ok(TickerStop::Resolved { ticks });
            }
            if self.max_ticks.is_some_and(|m| ticks >= m) {
                debug!("tick cap {ticks} reached");
                return Ok(TickerStop::MaxTicks { ticks });
            }
            clock.sleep_ms(self.interval_ms);
        }
    }
}
