// crates/en_cli/src/args.rs
//
// CLI argument surface and the checks that run before anything is loaded.
//
// - `--rows` is required; `--meta` and `--params` are optional
// - local paths only (no `scheme://`), input files must exist
// - `--now` pins the start time; it needs `--once` or `--simulated`, since the
//   live ticker reads the wall clock
// - `--seed` accepts a decimal u64 or 0x-hex (up to 16 digits)

use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;

pub const DEFAULT_STATE_FILE: &str = ".election_night_window.json";

#[derive(Debug, Parser, Clone)]
#[command(
    name = "election-night",
    disable_help_subcommand = true,
    about = "Simulate live election-night results from final district totals"
)]
pub struct Args {
    /// Final district rows (JSON array).
    #[arg(long)]
    pub rows: PathBuf,
    /// Election metadata: count window, call rules, party names/colours.
    #[arg(long)]
    pub meta: Option<PathBuf>,
    /// Simulation parameters (JSON; absent fields take defaults).
    #[arg(long)]
    pub params: Option<PathBuf>,

    /// Where the fallback count window is persisted.
    #[arg(long, default_value = DEFAULT_STATE_FILE)]
    pub state_file: PathBuf,
    /// Keep the fallback window in memory only.
    #[arg(long)]
    pub no_persist: bool,

    /// Schedule seed (overrides `schedule_seed` in the parameters).
    #[arg(long, value_parser = parse_seed)]
    pub seed: Option<u64>,
    /// Tick interval in milliseconds (overrides `tick_interval_ms`).
    #[arg(long)]
    pub tick_ms: Option<u64>,
    /// Start time: epoch milliseconds or an ISO-8601 timestamp.
    #[arg(long, value_parser = parse_now)]
    pub now: Option<i64>,

    /// Render a single tick and exit.
    #[arg(long, conflicts_with = "simulated")]
    pub once: bool,
    /// Advance a simulated clock by one interval per tick instead of sleeping.
    #[arg(long)]
    pub simulated: bool,
    /// Stop after this many ticks even if the simulation is unresolved.
    #[arg(long)]
    pub max_ticks: Option<u64>,

    /// Output format.
    #[arg(long, value_parser = ["text", "json", "html"], default_value = "text")]
    pub render: String,
    /// Write each tick's report to this file (replaced every tick) instead of stdout.
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Only log warnings and errors.
    #[arg(long)]
    pub quiet: bool,
}

/// Errors surfaced by argument validation. Messages are short and stable.
#[derive(Debug, PartialEq, Eq)]
pub enum CliError {
    BadCombo(&'static str),
    NonLocalPath(String),
    NotFound(String),
    BadValue(&'static str),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::BadCombo(s) => write!(f, "invalid flag combination: {s}"),
            CliError::NonLocalPath(p) => write!(f, "path must be a local file (no scheme): {p}"),
            CliError::NotFound(p) => write!(f, "file not found: {p}"),
            CliError::BadValue(s) => write!(f, "invalid value: {s}"),
        }
    }
}

impl std::error::Error for CliError {}

pub fn parse_and_validate() -> Result<Args, CliError> {
    validate(Args::parse())
}

pub fn validate(args: Args) -> Result<Args, CliError> {
    for p in [
        Some(args.rows.as_path()),
        args.meta.as_deref(),
        args.params.as_deref(),
        Some(args.state_file.as_path()),
        args.out.as_deref(),
    ]
    .into_iter()
    .flatten()
    {
        ensure_local_path(p)?;
    }

    ensure_exists(&args.rows, "--rows")?;
    if let Some(m) = &args.meta {
        ensure_exists(m, "--meta")?;
    }
    if let Some(p) = &args.params {
        ensure_exists(p, "--params")?;
    }

    if args.now.is_some() && !(args.once || args.simulated) {
        return Err(CliError::BadCombo("--now needs --once or --simulated"));
    }
    if args.tick_ms == Some(0) {
        return Err(CliError::BadValue("--tick-ms must be positive"));
    }
    if args.max_ticks == Some(0) {
        return Err(CliError::BadValue("--max-ticks must be positive"));
    }
    Ok(args)
}

/// Decimal u64 or 0x-hex (1..=16 digits).
pub fn parse_seed(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty seed".into());
    }
    if let Some(rest) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        if rest.is_empty() || rest.len() > 16 || !rest.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err("hex seed must be 1..16 hex digits".into());
        }
        u64::from_str_radix(rest, 16).map_err(|_| "hex seed out of range".into())
    } else {
        s.parse::<u64>().map_err(|_| "decimal seed must be a valid u64".into())
    }
}

/// Epoch milliseconds, or any timestamp the metadata loader accepts.
pub fn parse_now(s: &str) -> Result<i64, String> {
    let t = s.trim();
    if let Ok(ms) = t.parse::<i64>() {
        return Ok(ms);
    }
    en_io::dates::parse_timestamp_ms(t).map_err(|e| e.to_string())
}

#[inline]
fn has_scheme(s: &str) -> bool {
    s.trim().contains("://")
}

fn ensure_local_path(p: &Path) -> Result<(), CliError> {
    match p.to_str() {
        Some(s) if has_scheme(s) => Err(CliError::NonLocalPath(s.to_string())),
        _ => Ok(()),
    }
}

fn ensure_exists(p: &Path, label: &'static str) -> Result<(), CliError> {
    match fs::metadata(p) {
        Ok(m) if m.is_file() => Ok(()),
        _ => Err(CliError::NotFound(format!("{label} {}", p.display()))),
    }
}
