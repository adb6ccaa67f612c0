// crates/en_cli/src/main.rs
//
// Drives one election-night run:
//   load inputs → apply flag overrides → resolve count window → draw schedule
//   → tick (once, on the wall clock, or on a simulated clock) → render each tick.
//
// Logging goes to stderr through env_logger (`RUST_LOG` overrides the level);
// rendered reports go to stdout or `--out`.

mod args;

mod exitcodes {
    pub const OK: i32 = 0;
    pub const VALIDATION: i32 = 2;
    pub const IO: i32 = 4;
    pub const WINDOW: i32 = 5;
}

use std::io::Write as _;
use std::process::ExitCode;

use args::{parse_and_validate as parse_cli, Args};

use en_core::rng::ScheduleRng;
use en_core::variables::validate_params;
use en_io::canonical_json::write_bytes_atomic;
use en_io::loader::ElectionMeta;
use en_io::window_store::{FileWindowStore, MemoryWindowStore, WindowStore};
use en_pipeline::{
    load_inputs, resolve_count_window, Clock, ManualClock, PipelineError, SimulationSession, SystemClock,
    TickOutput, Ticker, TickerStop,
};
use en_report::{build_model, render_html, render_json, render_text, ReportError};
use log::{debug, info};

/// Central error type for CLI → exit-code mapping.
#[derive(Debug)]
enum MainError {
    /// Input shape or parameter problems
    Validation(String),
    /// Read/write/path failures
    Io(String),
    /// Domain violations (count window)
    Window(String),
    /// Report build or output
    Render(String),
}

impl std::fmt::Display for MainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MainError::Validation(m) => write!(f, "validation: {m}"),
            MainError::Io(m) => write!(f, "io: {m}"),
            MainError::Window(m) => write!(f, "window: {m}"),
            MainError::Render(m) => write!(f, "render: {m}"),
        }
    }
}

impl From<PipelineError> for MainError {
    fn from(e: PipelineError) -> Self {
        match e {
            PipelineError::Io(m) => MainError::Io(m),
            PipelineError::Schema(m) | PipelineError::Validate(m) => MainError::Validation(m),
            PipelineError::Window(m) => MainError::Window(m),
        }
    }
}

impl From<ReportError> for MainError {
    fn from(e: ReportError) -> Self {
        MainError::Render(e.to_string())
    }
}

impl From<en_io::IoError> for MainError {
    fn from(e: en_io::IoError) -> Self {
        MainError::Io(e.to_string())
    }
}

fn main() -> ExitCode {
    let args = match parse_cli() {
        Ok(a) => a,
        Err(e) => {
            eprintln!("election-night: error: {e}");
            return ExitCode::from(exitcodes::VALIDATION as u8);
        }
    };

    init_logging(args.quiet);

    let rc = match run(&args) {
        Ok(()) => exitcodes::OK,
        Err(e) => {
            eprintln!("election-night: error: {e}");
            map_error(&e)
        }
    };
    ExitCode::from(rc as u8)
}

fn init_logging(quiet: bool) {
    let default = if quiet { "warn" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .format_timestamp_millis()
        .init();
}

fn map_error(e: &MainError) -> i32 {
    use exitcodes::*;
    match e {
        MainError::Validation(_) => VALIDATION,
        MainError::Io(_) => IO,
        MainError::Window(_) => WINDOW,
        MainError::Render(_) => IO,
    }
}

fn run(args: &Args) -> Result<(), MainError> {
    let inputs = load_inputs(&args.rows, args.meta.as_deref(), args.params.as_deref())?;
    let meta = inputs.meta;
    let mut params = inputs.params;

    if let Some(seed) = args.seed {
        params.schedule_seed = Some(seed);
    }
    if let Some(ms) = args.tick_ms {
        params.tick_interval_ms = ms;
    }
    validate_params(&params).map_err(|e| MainError::Validation(e.to_string()))?;

    let start_ms = args.now.unwrap_or_else(|| SystemClock.now_ms());

    let mut store: Box<dyn WindowStore> = if args.no_persist {
        Box::new(MemoryWindowStore::new())
    } else {
        Box::new(FileWindowStore::new(args.state_file.clone()))
    };
    let resolved = resolve_count_window(meta.count_bounds_ms(), start_ms, params.fallback_window_ms, store.as_mut());
    debug!("count window source: {}", resolved.source.as_str());

    let mut rng = ScheduleRng::from_optional_seed(params.schedule_seed);
    let interval = params.tick_interval_ms;
    let mut session = SimulationSession::new(
        inputs.rows.parties,
        inputs.rows.rows,
        resolved.window,
        meta.call_rules.clone(),
        params,
        &mut rng,
    )?;

    let mut emit = |out: &TickOutput| emit_tick(args, &meta, out);

    if args.once {
        let out = session.tick(start_ms);
        emit(&out)?;
        info!("single tick rendered; {}/{} districts called", out.counts.districts_called, out.counts.districts_total);
        return Ok(());
    }

    let ticker = Ticker::new(interval).with_max_ticks(args.max_ticks);
    let stop = if args.simulated {
        let mut clock = ManualClock::new(start_ms);
        ticker.run(&mut session, &mut clock, &mut emit)?
    } else {
        let mut clock = SystemClock;
        ticker.run(&mut session, &mut clock, &mut emit)?
    };

    match stop {
        TickerStop::Resolved { ticks } => info!("all districts resolved after {ticks} ticks"),
        TickerStop::MaxTicks { ticks } => info!("stopped at tick cap ({ticks} ticks)"),
    }
    let finals = session.final_results();
    for p in &finals.ordered {
        let votes = finals.totals.get(p).copied().unwrap_or(0);
        debug!("final {p}: {votes}");
    }
    Ok(())
}

fn emit_tick(args: &Args, meta: &ElectionMeta, out: &TickOutput) -> Result<(), MainError> {
    let model = build_model(out, &meta.parties, meta.title.as_deref())?;
    let body = match args.render.as_str() {
        "json" => {
            let mut s = render_json(&model)?;
            s.push('\n');
            s
        }
        "html" => render_html(&model),
        _ => render_text(&model),
    };

    match &args.out {
        Some(path) => write_bytes_atomic(path, body.as_bytes())?,
        None => {
            let stdout = std::io::stdout();
            let mut lock = stdout.lock();
            lock.write_all(body.as_bytes())
                .and_then(|_| lock.flush())
                .map_err(|e| MainError::Io(format!("stdout: {e}")))?;
        }
    }
    debug!("tick {} emitted", out.tick);
    Ok(())
}
