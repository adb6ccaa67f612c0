//! en_report: presentation-neutral report model + renderers (JSON/text/HTML).
//!
//! Determinism rules:
//! - No I/O here. Callers hand over a finished tick and the party metadata.
//! - Percentages are pre-formatted to one decimal in the model, so every
//!   renderer prints the same digits.
//! - Stable section order and field names.

#![deny(unsafe_code)]

use core::fmt;

pub mod model;
pub mod render_html;
pub mod render_json;
pub mod render_text;

pub use model::{build_model, ReportModel};
pub use render_html::render_html;
pub use render_json::{render_json, report_json};
pub use render_text::render_text;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportError {
    MissingField(&'static str),
    Serialize(String),
}

impl fmt::Display for ReportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportError::MissingField(m) => write!(f, "missing field: {m}"),
            ReportError::Serialize(m) => write!(f, "serialize error: {m}"),
        }
    }
}

impl std::error::Error for ReportError {}
