//! Loader: read local JSON inputs (final rows, election metadata, parameters)
//! and normalize them into core types. No network I/O.
//!
//! Final rows are a JSON array of flat objects, one per district:
//! `district_id`, `eligible_voters_est`, `turnout` (or `turnout_est`) and
//! `<party>_votes` / `<party>_share` columns. The party key set is the union
//! of those column prefixes across all rows, sorted.
//!
//! Numbers may arrive as JSON numbers or numeric strings (CSV exports).
//! Anything else reads as "no data" and never fails the load.

#![forbid(unsafe_code)]

use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use en_core::determinism::canonical_parties;
use en_core::entities::{CallRule, DistrictFinal, PartyMeta};
use en_core::ids::{DistrictId, PartyKey};
use en_core::variables::{validate_params, SimParams};
use log::{debug, warn};
use serde_json::{Map, Value};

use crate::dates::parse_timestamp_ms;
use crate::{IoError, IoResult};

/// Upper bound on any single input file.
pub const MAX_INPUT_BYTES: u64 = 64 * 1024 * 1024;

const VOTES_SUFFIX: &str = "_votes";
const SHARE_SUFFIX: &str = "_share";
const LIVE_SUFFIX: &str = "_votes_live";
/// Column prefixes that look like parties but are aggregates.
const RESERVED_PREFIXES: [&str; 3] = ["total", "valid", "invalid"];
const DISTRICT_FIELDS: [&str; 2] = ["district_id", "district"];

// ----------------------------- Public types -----------------------------

/// Loaded final records plus the discovered party key set.
#[derive(Debug, Clone, Default)]
pub struct FinalRows {
    /// Sorted, de-duplicated.
    pub parties: Vec<PartyKey>,
    /// In file order.
    pub rows: Vec<DistrictFinal>,
}

/// Election metadata. Every field is optional on the wire.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ElectionMeta {
    pub title: Option<String>,
    pub count_start: Option<String>,
    pub count_end: Option<String>,
    /// Well-formed rules only; empty means "use the defaults".
    pub call_rules: Vec<CallRule>,
    pub parties: BTreeMap<PartyKey, PartyMeta>,
}

impl ElectionMeta {
    /// `count_start` / `count_end` as epoch ms. Unparseable strings read as
    /// absent (with a warning) so the caller falls back to another window.
    pub fn count_bounds_ms(&self) -> (Option<i64>, Option<i64>) {
        (parse_bound("count_start", &self.count_start), parse_bound("count_end", &self.count_end))
    }
}

fn parse_bound(field: &str, raw: &Option<String>) -> Option<i64> {
    let s = raw.as_deref()?;
    match parse_timestamp_ms(s) {
        Ok(ms) => Some(ms),
        Err(e) => {
            warn!("ignoring {field}: {e}");
            None
        }
    }
}

// ----------------------------- File entry points -----------------------------

pub fn load_final_rows(path: &Path) -> IoResult<FinalRows> {
    parse_final_rows(&read_json_value_with_limits(path)?)
}

pub fn load_election_meta(path: &Path) -> IoResult<ElectionMeta> {
    parse_election_meta(&read_json_value_with_limits(path)?)
}

/// Parameters file → validated `SimParams` (absent fields take defaults).
pub fn load_params(path: &Path) -> IoResult<SimParams> {
    let v = read_json_value_with_limits(path)?;
    let params: SimParams = serde_json::from_value(v)?;
    validate_params(&params).map_err(|e| IoError::Invalid(format!("parameter domain error: {e}")))?;
    Ok(params)
}

/// Read and parse one JSON file, refusing anything above `MAX_INPUT_BYTES`.
pub fn read_json_value_with_limits(path: &Path) -> IoResult<Value> {
    let f = File::open(path).map_err(|e| IoError::Path(format!("{}: {e}", path.display())))?;
    let mut buf = Vec::new();
    f.take(MAX_INPUT_BYTES + 1).read_to_end(&mut buf)?;
    if buf.len() as u64 > MAX_INPUT_BYTES {
        return Err(IoError::Invalid(format!("{} exceeds {MAX_INPUT_BYTES} bytes", path.display())));
    }
    Ok(serde_json::from_slice(&buf)?)
}

// ----------------------------- Final rows -----------------------------

pub fn parse_final_rows(v: &Value) -> IoResult<FinalRows> {
    let items = v.as_array().ok_or_else(|| IoError::Json {
        pointer: "/".into(),
        msg: "expected an array of district rows".into(),
    })?;

    let mut objects = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        let obj = item.as_object().ok_or_else(|| IoError::Json {
            pointer: format!("/{i}"),
            msg: "expected an object".into(),
        })?;
        objects.push(obj);
    }

    let parties = canonical_parties(objects.iter().flat_map(|o| discover_party_keys(o)));
    debug!("discovered {} parties over {} rows", parties.len(), objects.len());

    let mut seen = BTreeSet::new();
    let mut rows = Vec::with_capacity(objects.len());
    for (i, obj) in objects.into_iter().enumerate() {
        let row = parse_row(i, obj, &parties)?;
        if !seen.insert(row.district_id.clone()) {
            return Err(IoError::Invalid(format!("duplicate district_id {:?}", row.district_id.as_str())));
        }
        rows.push(row);
    }

    Ok(FinalRows { parties, rows })
}

/// Party keys named by one row's columns.
pub fn discover_party_keys(obj: &Map<String, Value>) -> Vec<PartyKey> {
    obj.keys()
        .filter_map(|k| party_prefix(k))
        .filter_map(|p| p.parse::<PartyKey>().ok())
        .collect()
}

fn party_prefix(column: &str) -> Option<&str> {
    if column.ends_with(LIVE_SUFFIX) {
        return None;
    }
    let prefix = column
        .strip_suffix(VOTES_SUFFIX)
        .or_else(|| column.strip_suffix(SHARE_SUFFIX))?;
    if prefix.is_empty() || prefix.starts_with('_') {
        return None;
    }
    if RESERVED_PREFIXES.iter().any(|r| prefix.eq_ignore_ascii_case(r)) {
        return None;
    }
    Some(prefix)
}

fn parse_row(i: usize, obj: &Map<String, Value>, parties: &[PartyKey]) -> IoResult<DistrictFinal> {
    let raw_id = DISTRICT_FIELDS
        .iter()
        .find_map(|f| obj.get(*f))
        .and_then(id_text)
        .ok_or_else(|| IoError::Json {
            pointer: format!("/{i}/district_id"),
            msg: "missing district_id".into(),
        })?;
    let district_id: DistrictId = raw_id.parse().map_err(|e| IoError::Json {
        pointer: format!("/{i}/district_id"),
        msg: format!("{e}"),
    })?;

    let mut row = DistrictFinal::new(district_id);
    row.eligible_voters_est = number(obj.get("eligible_voters_est")).filter(|v| *v >= 0.0);
    row.turnout_pct = number(obj.get("turnout")).or_else(|| number(obj.get("turnout_est")));
    for p in parties {
        let col = format!("{}{VOTES_SUFFIX}", p.as_str());
        row.votes.insert(p.clone(), vote_count(obj.get(&col)));
    }
    Ok(row)
}

fn id_text(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Finite number from a JSON number or a numeric string.
fn number(v: Option<&Value>) -> Option<f64> {
    let x = match v? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    x.is_finite().then_some(x)
}

/// Non-negative vote count; fractional values are rounded.
fn vote_count(v: Option<&Value>) -> Option<u64> {
    if let Some(Value::Number(n)) = v {
        if let Some(u) = n.as_u64() {
            return Some(u);
        }
    }
    number(v).filter(|x| *x >= 0.0).map(|x| x.round() as u64)
}

// ----------------------------- Election metadata -----------------------------

pub fn parse_election_meta(v: &Value) -> IoResult<ElectionMeta> {
    let obj = v.as_object().ok_or_else(|| IoError::Json {
        pointer: "/".into(),
        msg: "expected an object".into(),
    })?;

    let text = |k: &str| obj.get(k).and_then(Value::as_str).map(str::to_owned);
    let mut meta = ElectionMeta {
        title: text("title"),
        count_start: text("count_start"),
        count_end: text("count_end"),
        ..ElectionMeta::default()
    };

    match obj.get("call_rules") {
        None | Some(Value::Null) => {}
        Some(Value::Array(items)) => meta.call_rules = parse_call_rules(items),
        Some(_) => {
            return Err(IoError::Json { pointer: "/call_rules".into(), msg: "expected an array".into() })
        }
    }

    match obj.get("parties") {
        None | Some(Value::Null) => {}
        Some(Value::Object(map)) => {
            for (k, pv) in map {
                let key: PartyKey = k.parse().map_err(|e| IoError::Json {
                    pointer: format!("/parties/{k}"),
                    msg: format!("{e}"),
                })?;
                let pm: PartyMeta = serde_json::from_value(pv.clone()).map_err(|e| IoError::Json {
                    pointer: format!("/parties/{k}"),
                    msg: e.to_string(),
                })?;
                meta.parties.insert(key, pm);
            }
        }
        Some(_) => {
            return Err(IoError::Json { pointer: "/parties".into(), msg: "expected an object".into() })
        }
    }

    Ok(meta)
}

/// Keep well-formed `{phase, lead}` rules in order; drop the rest with a warning.
fn parse_call_rules(items: &[Value]) -> Vec<CallRule> {
    let mut rules = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        let phase = number(item.get("phase"));
        let lead = number(item.get("lead"));
        match (phase, lead) {
            (Some(phase), Some(lead)) if CallRule::new(phase, lead).is_well_formed() => {
                rules.push(CallRule::new(phase, lead));
            }
            _ => warn!("dropping malformed call rule /call_rules/{i}: {item}"),
        }
    }
    if rules.is_empty() && !items.is_empty() {
        warn!("no usable call rules in metadata; using the built-in defaults");
    }
    rules
}
