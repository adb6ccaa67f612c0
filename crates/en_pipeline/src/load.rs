//! LOAD stage: read rows, optional metadata and optional parameters, and
//! validate them once, up front. Nothing is retried.

use std::path::Path;

use en_core::variables::{validate_params, SimParams};
use en_io::loader::{self, ElectionMeta, FinalRows};
use log::info;

use crate::PipelineError;

/// Everything a session needs from disk.
#[derive(Debug, Clone)]
pub struct LoadedInputs {
    pub rows: FinalRows,
    pub meta: ElectionMeta,
    pub params: SimParams,
}

pub fn load_inputs(
    rows_path: &Path,
    meta_path: Option<&Path>,
    params_path: Option<&Path>,
) -> Result<LoadedInputs, PipelineError> {
    let rows = loader::load_final_rows(rows_path)?;
    let meta = match meta_path {
        Some(p) => loader::load_election_meta(p)?,
        None => ElectionMeta::default(),
    };
    let params = match params_path {
        Some(p) => loader::load_params(p)?,
        None => SimParams::default(),
    };
    validate_params(&params)?;

    info!(
        "loaded {} districts, {} parties, {} call rules",
        rows.rows.len(),
        rows.parties.len(),
        meta.call_rules.len()
    );
    Ok(LoadedInputs { rows, meta, params })
}
