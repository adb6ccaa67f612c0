//! crates/en_io/src/lib.rs
//! Local file I/O for the election-night engine. No network.
//!
//! - `loader`: final rows (party keys discovered from column names), election
//!   metadata, simulation parameters
//! - `dates`: ISO-8601 count window strings to epoch milliseconds
//! - `canonical_json`: sorted-key compact JSON and atomic file writes
//! - `window_store`: persisted fallback count window
//!
//! All fallible operations return `IoError`.

#![forbid(unsafe_code)]

use thiserror::Error;

/// Unified error for en_io.
#[derive(Debug, Error)]
pub enum IoError {
    /// Filesystem / path errors (open, create_dir_all, rename, fsync, ...)
    #[error("io/path error: {0}")]
    Path(String),

    /// JSON parse or shape errors, with a JSON Pointer to the offending value.
    #[error("json error at {pointer}: {msg}")]
    Json { pointer: String, msg: String },

    /// Well-formed input that breaks a domain rule.
    #[error("invalid: {0}")]
    Invalid(String),

    /// Unparseable date/time string.
    #[error("date error: {0}")]
    Date(String),
}

pub type IoResult<T> = Result<T, IoError>;

impl From<std::io::Error> for IoError {
    fn from(e: std::io::Error) -> Self {
        IoError::Path(e.to_string())
    }
}

impl From<serde_json::Error> for IoError {
    fn from(e: serde_json::Error) -> Self {
        // serde_json does not track a pointer; report the document root.
        IoError::Json { pointer: "/".to_string(), msg: e.to_string() }
    }
}

pub mod canonical_json;
pub mod dates;
pub mod loader;
pub mod window_store;

pub mod prelude {
    pub use crate::{IoError, IoResult};

    pub use crate::canonical_json::{to_canonical_json_bytes, write_bytes_atomic, write_canonical_file};
    pub use crate::loader::{
        load_election_meta, load_final_rows, load_params, ElectionMeta, FinalRows,
    };
    pub use crate::window_store::{FileWindowStore, MemoryWindowStore, WindowStore};
}
