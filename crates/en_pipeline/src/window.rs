//! Count-window resolution.
//!
//! Order of preference:
//! 1. `count_start` / `count_end` from the election metadata, if both parse
//!    and `end > start`;
//! 2. a previously persisted fallback window that has not yet elapsed;
//! 3. a fresh window `[now, now + fallback_window_ms]`, persisted so later
//!    runs reuse it.
//!
//! Resolution never fails; store errors are logged and skipped.

use en_core::CountWindow;
use en_io::window_store::WindowStore;
use log::{info, warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WindowSource {
    Metadata,
    Persisted,
    Fallback,
}

impl WindowSource {
    pub const fn as_str(self) -> &'static str {
        match self {
            WindowSource::Metadata => "metadata",
            WindowSource::Persisted => "persisted",
            WindowSource::Fallback => "fallback",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResolvedWindow {
    pub window: CountWindow,
    pub source: WindowSource,
}

pub fn resolve_count_window<S>(
    declared: (Option<i64>, Option<i64>),
    now_ms: i64,
    fallback_window_ms: u64,
    store: &mut S,
) -> ResolvedWindow
where
    S: WindowStore + ?Sized,
{
    match declared {
        (Some(start), Some(end)) => match CountWindow::new(start, end) {
            Ok(window) => {
                info!("count window from metadata: {start}..{end}");
                return ResolvedWindow { window, source: WindowSource::Metadata };
            }
            Err(_) => warn!("metadata count window {start}..{end} is empty or reversed; falling back"),
        },
        (None, None) => {}
        _ => warn!("metadata count window is incomplete; falling back"),
    }

    match store.load() {
        Ok(Some(window)) if window.end_ms > now_ms => {
            info!("reusing persisted count window {}..{}", window.start_ms, window.end_ms);
            return ResolvedWindow { window, source: WindowSource::Persisted };
        }
        Ok(_) => {}
        Err(e) => warn!("ignoring persisted count window: {e}"),
    }

    let duration = i64::try_from(fallback_window_ms).unwrap_or(i64::MAX);
    let window = CountWindow::starting_at(now_ms, duration);
    if let Err(e) = store.save(&window) {
        warn!("could not persist fallback count window: {e}");
    }
    info!("synthesized fallback count window {}..{}", window.start_ms, window.end_ms);
    ResolvedWindow { window, source: WindowSource::Fallback }
}
