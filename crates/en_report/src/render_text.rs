//! Plain-text status output for terminals and logs.

use std::fmt::Write as _;

use crate::model::ReportModel;

pub fn render_text(m: &ReportModel) -> String {
    let mut out = String::with_capacity(256 + m.districts.len() * 64);
    let _ = writeln!(
        out,
        "{} | tick {} | {} | called {}/{} | reporting {} | progress {}%{}",
        m.title,
        m.tick,
        m.timestamp_utc,
        m.status.called,
        m.status.total,
        m.status.reporting,
        m.status.progress_pct_1dp,
        if m.complete { " | final" } else { "" }
    );
    let _ = writeln!(out, "national: {} ballots, turnout {}%", m.national.ballots, m.national.turnout_pct_1dp);
    for p in &m.national.parties {
        let _ = writeln!(out, "  {:<24} {:>12} {:>6}%", p.name, p.votes, p.pct_1dp);
    }
    for d in &m.districts {
        let call = match &d.call {
            Some(c) => format!("CALLED {}", c.winner_name),
            None => d.status.to_uppercase(),
        };
        let _ = writeln!(
            out,
            "  {:<32} {:>6}% {:>10} votes  lead {:>5} pp  {}",
            d.district_id, d.phase_pct_1dp, d.total_votes, d.lead_pp_1dp, call
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::build_model;
    use crate::model::fixtures::{meta, tick};

    #[test]
    fn header_and_rows() {
        let m = build_model(&tick(), &meta(), Some("Night")).unwrap();
        let s = render_text(&m);
        let first = s.lines().next().unwrap();
        assert!(first.starts_with("Night | tick 1 |"));
        assert!(first.contains("called 1/2"));
        assert!(s.contains("CALLED Alpha & Co"));
        assert!(s.contains("UNREPORTED"));
    }
}
