//! en_pipeline: election-night simulation surface
//! (load → resolve window → schedule → per tick: scale → calls → aggregate → counts).
//!
//! Stages are plain functions over typed inputs. The only mutable state is the
//! `SimulationSession` owned by the caller: it holds the immutable inputs, the
//! schedule and the call registry, and produces one `TickOutput` per tick.
//! File access goes through `en_io`; math lives in `en_algo`.

#![forbid(unsafe_code)]

use core::fmt;

pub mod aggregate;
pub mod calls;
pub mod load;
pub mod progress;
pub mod scale;
pub mod schedule;
pub mod session;
pub mod ticker;
pub mod window;

pub use aggregate::{aggregate_national, NationalAggregate, ReportingUnit};
pub use calls::{apply_calls, CallRegistry};
pub use load::{load_inputs, LoadedInputs};
pub use progress::{reporting_counts, ReportingCounts};
pub use scale::{scale_row, scale_rows_by_schedule, LiveDistrictRow, PartyLive};
pub use schedule::{assign_schedule, schedule_entry};
pub use session::{SimulationSession, TickOutput};
pub use ticker::{Clock, ManualClock, SystemClock, Ticker, TickerStop};
pub use window::{resolve_count_window, ResolvedWindow, WindowSource};

/// Single error surface for loading and session construction. Ticking itself
/// never fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    Io(String),
    Schema(String),
    Validate(String),
    Window(String),
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::Io(m) => write!(f, "io: {m}"),
            PipelineError::Schema(m) => write!(f, "schema: {m}"),
            PipelineError::Validate(m) => write!(f, "validate: {m}"),
            PipelineError::Window(m) => write!(f, "window: {m}"),
        }
    }
}

impl std::error::Error for PipelineError {}

impl From<en_io::IoError> for PipelineError {
    fn from(e: en_io::IoError) -> Self {
        use en_io::IoError;
        // Stable buckets; the CLI maps these to exit codes.
        match e {
            IoError::Path(m) => PipelineError::Io(format!("path: {m}")),
            IoError::Json { pointer, msg } => PipelineError::Schema(format!("json {pointer}: {msg}")),
            IoError::Invalid(m) => PipelineError::Validate(m),
            IoError::Date(m) => PipelineError::Window(m),
        }
    }
}

impl From<en_core::CoreError> for PipelineError {
    fn from(e: en_core::CoreError) -> Self {
        match e {
            en_core::CoreError::InvalidWindow => PipelineError::Window(e.to_string()),
            other => PipelineError::Validate(other.to_string()),
        }
    }
}
