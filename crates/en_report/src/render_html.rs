// crates/en_report/src/render_html.rs
//
// Static, asset-free HTML results panel: header + status line, national
// table (ordered by votes, with party colour swatches), district table.
// All text is HTML-escaped; integers carry a narrow no-break space as the
// thousands separator.

use std::fmt::Write as _;

use crate::model::{DistrictView, NationalPanel, ReportModel, StatusLine};

/// Escape text for HTML (minimal, deterministic).
fn esc(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Thousands grouping with U+202F.
fn fmt_int(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 * 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('\u{202F}');
        }
        out.push(ch);
    }
    out
}

/// Only `#rgb` / `#rrggbb` colours reach the style attribute.
fn safe_color(c: Option<&str>) -> &str {
    match c {
        Some(s)
            if s.starts_with('#')
                && matches!(s.len(), 4 | 7)
                && s[1..].bytes().all(|b| b.is_ascii_hexdigit()) =>
        {
            s
        }
        _ => "#999",
    }
}

pub struct HtmlBuilder {
    buf: String,
}

impl HtmlBuilder {
    pub fn new() -> Self {
        Self { buf: String::with_capacity(16 * 1024) }
    }

    pub fn start(&mut self, title: &str) {
        let _ = write!(
            self.buf,
            "<!doctype html><html lang=\"en\"><head><meta charset=\"utf-8\">\
             <meta name=\"viewport\" content=\"width=device-width,initial-scale=1\">\
             <title>{}</title>\
             <style>\
             body{{font-family:system-ui,-apple-system,Segoe UI,Roboto,Ubuntu,Arial,sans-serif;margin:24px;}}\
             h1,h2{{margin:0.2em 0;}}\
             .muted{{opacity:0.8}}\
             .sw{{display:inline-block;width:.8em;height:.8em;margin-right:.4em;border-radius:2px}}\
             .pill{{display:inline-block;padding:.1em .5em;border-radius:9999px;background:#eee}}\
             .called{{background:#cfc}}.lean{{background:#ffd}}\
             table{{border-collapse:collapse}}\
             td,th{{padding:4px 8px;border-bottom:1px solid #ddd;text-align:left}}\
             td.n{{text-align:right}}\
             </style></head><body>",
            esc(title)
        );
    }

    pub fn finish(mut self) -> String {
        self.buf.push_str("</body></html>");
        self.buf
    }

    pub fn section_header(&mut self, title: &str, timestamp: &str, tick: u64, status: &StatusLine, complete: bool) {
        let _ = write!(
            self.buf,
            "<h1>{}</h1><p class=\"muted\">{} · tick {}{}</p>\
             <p>Called <b>{}</b> of {} · reporting {} · complete {} · progress {}%</p>",
            esc(title),
            esc(timestamp),
            tick,
            if complete { " · final" } else { "" },
            status.called,
            status.total,
            status.reporting,
            status.complete,
            esc(&status.progress_pct_1dp),
        );
    }

    pub fn section_national(&mut self, n: &NationalPanel) {
        let _ = write!(
            self.buf,
            "<h2>National</h2><p>Ballots {} · turnout {}%</p>\
             <table><tr><th>Party</th><th>Votes</th><th>%</th></tr>",
            fmt_int(n.ballots),
            esc(&n.turnout_pct_1dp)
        );
        for p in &n.parties {
            let _ = write!(
                self.buf,
                "<tr><td><span class=\"sw\" style=\"background:{}\"></span>{}</td><td class=\"n\">{}</td><td class=\"n\">{}</td></tr>",
                safe_color(p.color.as_deref()),
                esc(&p.name),
                fmt_int(p.votes),
                esc(&p.pct_1dp)
            );
        }
        self.buf.push_str("</table>");
    }

    pub fn section_districts(&mut self, districts: &[DistrictView]) {
        self.buf.push_str(
            "<h2>Districts</h2><table><tr><th>District</th><th>Reporting</th>\
             <th>Votes</th><th>Leader</th><th>Lead (pp)</th><th>Status</th></tr>",
        );
        for d in districts {
            let status = match &d.call {
                Some(c) => format!("called: {}", c.winner_name),
                None => d.status.clone(),
            };
            let _ = write!(
                self.buf,
                "<tr><td>{}</td><td class=\"n\">{}%</td><td class=\"n\">{}</td><td>{}</td>\
                 <td class=\"n\">{}</td><td><span class=\"pill {}\">{}</span></td></tr>",
                esc(&d.district_id),
                esc(&d.phase_pct_1dp),
                fmt_int(d.total_votes),
                esc(d.leader.as_deref().unwrap_or("-")),
                esc(&d.lead_pp_1dp),
                esc(&d.status),
                esc(&status)
            );
        }
        self.buf.push_str("</table>");
    }
}

impl Default for HtmlBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub fn render_html(m: &ReportModel) -> String {
    let mut h = HtmlBuilder::new();
    h.start(&m.title);
    h.section_header(&m.title, &m.timestamp_utc, m.tick, &m.status, m.complete);
    h.section_national(&m.national);
    h.section_districts(&m.districts);
    h.finish()
}
