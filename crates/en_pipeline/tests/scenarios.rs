// crates/en_pipeline/tests/scenarios.rs
// End-to-end behaviour of the live simulation over small fixed inputs.

use en_algo::calls::RaceStatus;
use en_core::entities::{CallEntry, CountWindow, DistrictFinal, ScheduleEntry};
use en_core::ids::PartyKey;
use en_core::variables::SimParams;
use en_io::window_store::FileWindowStore;
use en_pipeline::{
    aggregate_national, apply_calls, load_inputs, resolve_count_window, scale_row, scale_rows_by_schedule,
    CallRegistry, SimulationSession, WindowSource,
};

const T0: i64 = 1_700_000_000_000;

fn pk(s: &str) -> PartyKey {
    s.parse().unwrap()
}

fn district(name: &str, a: u64, b: u64, eligible: f64, turnout: f64) -> DistrictFinal {
    let mut d = DistrictFinal::new(name.parse().unwrap())
        .with_votes(pk("A"), a)
        .with_votes(pk("B"), b);
    d.eligible_voters_est = Some(eligible);
    d.turnout_pct = Some(turnout);
    d
}

fn entry(name: &str, start: i64, end: i64) -> ScheduleEntry {
    ScheduleEntry { district_id: name.parse().unwrap(), report_start: start, report_end: end }
}

fn session(records: Vec<DistrictFinal>, schedule: Vec<ScheduleEntry>) -> SimulationSession {
    SimulationSession::with_schedule(
        vec![pk("A"), pk("B")],
        records,
        schedule,
        CountWindow::new(T0, T0 + 100).unwrap(),
        vec![],
        SimParams::default(),
    )
    .unwrap()
}

#[test]
fn scenario_a_full_reporting_matches_finals_and_calls_leader() {
    let mut s = session(vec![district("D1", 600, 400, 1000.0, 70.0)], vec![entry("D1", T0, T0 + 100)]);

    let out = s.tick(T0 + 100);
    let row = &out.rows[0];
    assert_eq!(row.phase, 1.0);
    assert_eq!(row.votes_live(&pk("A")), 600);
    assert_eq!(row.votes_live(&pk("B")), 400);
    assert!((row.share(&pk("A")).unwrap() - 60.0).abs() < 1e-9);
    assert!((row.share(&pk("B")).unwrap() - 40.0).abs() < 1e-9);
    assert_eq!(row.call, Some(CallEntry { winner: pk("A"), at: T0 + 100 }));
    assert_eq!(row.status, RaceStatus::Called);
}

#[test]
fn scenario_a_half_reporting_sums_exactly() {
    let mut s = session(vec![district("D1", 600, 400, 1000.0, 70.0)], vec![entry("D1", T0, T0 + 100)]);

    let out = s.tick(T0 + 50);
    let row = &out.rows[0];
    assert_eq!(row.phase, 0.5);
    assert_eq!(row.total_votes, 500);
    assert_eq!(row.votes_live(&pk("A")) + row.votes_live(&pk("B")), 500);
}

#[test]
fn scenario_b_exact_tie_is_never_called() {
    let mut s = session(vec![district("D1", 500, 500, 1000.0, 70.0)], vec![entry("D1", T0, T0 + 100)]);

    for now in [T0 + 100, T0 + 200, T0 + 10_000] {
        let out = s.tick(now);
        let row = &out.rows[0];
        assert_eq!(row.standing.lead, 0.0);
        assert_eq!(row.call, None);
        assert_eq!(row.status, RaceStatus::Tossup);
    }
    assert!(s.registry().is_empty());
}

#[test]
fn scenario_c_turnout_ignores_unreported_district() {
    let records = vec![district("Full", 500, 300, 1000.0, 80.0), district("Late", 100, 100, 500.0, 20.0)];
    let schedule = vec![entry("Full", T0, T0 + 10), entry("Late", T0 + 50, T0 + 100)];
    let parties = [pk("A"), pk("B")];
    let rows = scale_rows_by_schedule(&records, &schedule, &parties, T0 + 20, &SimParams::default());
    assert_eq!(rows[0].phase, 1.0);
    assert_eq!(rows[1].phase, 0.0);

    let nat = aggregate_national(&rows, &parties);
    assert_eq!(nat.nat_turnout, 80.0);
    assert_eq!(nat.ballots, 800);
    assert_eq!(nat.ordered, vec![pk("A"), pk("B")]);
}

#[test]
fn phase_never_decreases_over_time() {
    let rec = district("D1", 6_123, 3_877, 20_000.0, 50.0);
    let e = entry("D1", T0 + 1_000, T0 + 61_000);
    let parties = [pk("A"), pk("B")];
    let params = SimParams::default();

    let mut last_phase = -1.0;
    let mut last_total = 0;
    for step in 0..=80 {
        let row = scale_row(&rec, &e, &parties, T0 + step * 1_000, &params);
        assert!(row.phase >= last_phase);
        assert!(row.total_votes >= last_total);
        assert_eq!(row.votes_live(&pk("A")) + row.votes_live(&pk("B")), row.total_votes);
        last_phase = row.phase;
        last_total = row.total_votes;
    }
    assert_eq!(last_phase, 1.0);
    assert_eq!(last_total, 10_000);
}

#[test]
fn calls_are_permanent_whatever_the_later_rows_say() {
    let params = SimParams::default();
    let parties = [pk("A"), pk("B")];
    let mut registry = CallRegistry::new();

    let leading_a = district("D1", 900, 100, 1000.0, 60.0);
    let e = entry("D1", T0, T0 + 100);
    let mut rows = vec![scale_row(&leading_a, &e, &parties, T0 + 80, &params)];
    assert_eq!(apply_calls(&mut rows, &mut registry, &[], &params, T0 + 80), 1);
    let stored = registry.get(&"D1".parse().unwrap()).cloned().unwrap();
    assert_eq!(stored.winner, pk("A"));

    let leading_b = district("D1", 10, 990, 1000.0, 60.0);
    for now in [T0 + 90, T0 + 100, T0 + 5_000] {
        let mut later = vec![scale_row(&leading_b, &e, &parties, now, &params)];
        assert_eq!(apply_calls(&mut later, &mut registry, &[], &params, now), 0);
        assert_eq!(later[0].call.as_ref(), Some(&stored));
        assert_eq!(later[0].status, RaceStatus::Called);
    }
    assert_eq!(registry.len(), 1);
}

#[test]
fn inputs_and_window_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let rows = dir.path().join("rows.json");
    std::fs::write(
        &rows,
        r#"[{"district_id": "Metro", "A_votes": 10, "B_votes": 5, "eligible_voters_est": 30, "turnout": 50}]"#,
    )
    .unwrap();
    let meta = dir.path().join("meta.json");
    std::fs::write(&meta, r#"{"count_start": "2024-11-05T20:00:00Z", "count_end": "2024-11-05T19:00:00Z"}"#)
        .unwrap();

    let loaded = load_inputs(&rows, Some(&meta), None).unwrap();
    assert_eq!(loaded.rows.parties, vec![pk("A"), pk("B")]);

    // Reversed metadata bounds fall back to a persisted window.
    let mut store = FileWindowStore::new(dir.path().join("state").join("window.json"));
    let first = resolve_count_window(loaded.meta.count_bounds_ms(), T0, 300_000, &mut store);
    assert_eq!(first.source, WindowSource::Fallback);

    let again = resolve_count_window(loaded.meta.count_bounds_ms(), T0 + 1_000, 300_000, &mut store);
    assert_eq!(again.source, WindowSource::Persisted);
    assert_eq!(again.window, first.window);

    let expired = resolve_count_window((None, None), T0 + 300_000, 300_000, &mut store);
    assert_eq!(expired.source, WindowSource::Fallback);
    assert_eq!(expired.window.start_ms, T0 + 300_000);
}
