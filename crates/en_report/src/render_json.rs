//! render_json.rs: report JSON (meta → status → national → districts).
//!
//! Key order is the insertion order of `serde_json::Map`, which the workspace
//! builds with `preserve_order`.

use serde_json::{Map as JsonMap, Value};

use crate::model::{DistrictView, NationalPanel, ReportModel, StatusLine};
use crate::ReportError;

/// Pretty-printed report document.
pub fn render_json(m: &ReportModel) -> Result<String, ReportError> {
    serde_json::to_string_pretty(&report_json(m)).map_err(|e| ReportError::Serialize(e.to_string()))
}

pub fn report_json(m: &ReportModel) -> Value {
    let mut root = obj();
    root.insert("title".into(), Value::String(m.title.clone()));
    root.insert("tick".into(), Value::from(m.tick));
    root.insert("now_ms".into(), Value::from(m.now_ms));
    root.insert("timestamp_utc".into(), Value::String(m.timestamp_utc.clone()));
    root.insert("complete".into(), Value::Bool(m.complete));
    root.insert("status".into(), status_json(&m.status));
    root.insert("national".into(), national_json(&m.national));
    root.insert("districts".into(), Value::Array(m.districts.iter().map(district_json).collect()));
    Value::Object(root)
}

/* ----------------------------- sections ----------------------------- */

fn status_json(s: &StatusLine) -> Value {
    let mut o = obj();
    o.insert("districts_called".into(), Value::from(s.called));
    o.insert("districts_total".into(), Value::from(s.total));
    o.insert("districts_reporting".into(), Value::from(s.reporting));
    o.insert("districts_complete".into(), Value::from(s.complete));
    o.insert("global_progress_pct".into(), Value::String(s.progress_pct_1dp.clone()));
    Value::Object(o)
}

fn national_json(n: &NationalPanel) -> Value {
    let mut o = obj();
    o.insert("ballots".into(), Value::from(n.ballots));
    o.insert("turnout_pct".into(), Value::String(n.turnout_pct_1dp.clone()));
    let parties = n
        .parties
        .iter()
        .map(|p| {
            let mut po = obj();
            po.insert("key".into(), Value::String(p.key.clone()));
            po.insert("name".into(), Value::String(p.name.clone()));
            if let Some(c) = &p.color {
                po.insert("color".into(), Value::String(c.clone()));
            }
            po.insert("votes".into(), Value::from(p.votes));
            po.insert("pct".into(), Value::String(p.pct_1dp.clone()));
            Value::Object(po)
        })
        .collect();
    o.insert("ordered".into(), Value::Array(parties));
    Value::Object(o)
}

fn district_json(d: &DistrictView) -> Value {
    let mut o = obj();
    o.insert("district_id".into(), Value::String(d.district_id.clone()));
    o.insert("phase_pct".into(), Value::String(d.phase_pct_1dp.clone()));
    o.insert("total_votes".into(), Value::from(d.total_votes));
    o.insert("status".into(), Value::String(d.status.clone()));
    o.insert("leader".into(), d.leader.clone().map_or(Value::Null, Value::String));
    o.insert("lead_pp".into(), Value::String(d.lead_pp_1dp.clone()));

    let call = match &d.call {
        Some(c) => {
            let mut co = obj();
            co.insert("winner".into(), Value::String(c.winner.clone()));
            co.insert("winner_name".into(), Value::String(c.winner_name.clone()));
            co.insert("at".into(), Value::from(c.at_ms));
            Value::Object(co)
        }
        None => Value::Null,
    };
    o.insert("call".into(), call);

    let mut parties = obj();
    for p in &d.parties {
        let mut po = obj();
        po.insert("votes".into(), Value::from(p.votes));
        po.insert("share".into(), p.share_1dp.clone().map_or(Value::Null, Value::String));
        parties.insert(p.key.clone(), Value::Object(po));
    }
    o.insert("parties".into(), Value::Object(parties));
    Value::Object(o)
}

#[inline]
fn obj() -> JsonMap<String, Value> {
    JsonMap::new()
}
