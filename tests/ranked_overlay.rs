use chrono::NaiveDate;
use epiview::overlay::{build_model, format_si, MIN_CROSSHAIR_HEIGHT, ROW_STRIDE};
use epiview::{CaseRecord, ChartFrame, ColorDomain, ColorRegistry, DateAxis, PointerInversion};

fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn frame() -> ChartFrame {
    ChartFrame::new(90.0, 600.0, 15.0, 426.0)
}

#[test]
fn two_country_scenario_reads_us_then_ca() {
    // Full chain: pointer -> snapped date -> ranked overlay lines.
    let records = [
        CaseRecord::new("CA", "CA", d("2021-06-01"), 50_000.0),
        CaseRecord::new("US", "US", d("2021-06-01"), 90_000.0),
    ];
    let refs: Vec<&CaseRecord> = records.iter().collect();
    let axis = DateAxis::new(d("2021-06-01"), d("2021-06-01"), 90.0, 600.0);
    let eng = PointerInversion::new(axis, frame());

    let query = eng.resolve(300.0, 100.0, &refs).unwrap();
    assert_eq!(query.date, d("2021-06-01"));

    let registry = ColorRegistry::assign(ColorDomain::Countries, ["CA", "US"]);
    let model = build_model(&query, &registry, &frame(), 300.0);
    let labels: Vec<&str> = model.rows.iter().map(|r| r.label.as_str()).collect();
    assert_eq!(labels, vec!["US: 90.0k", "CA: 50.0k"]);
}

#[test]
fn ranking_is_non_increasing_and_stable_across_calls() {
    let rows = vec![
        CaseRecord::new("AA", "Alpha", d("2021-06-01"), 70.0),
        CaseRecord::new("BB", "Beta", d("2021-06-01"), 70.0),
        CaseRecord::new("CC", "Gamma", d("2021-06-01"), 90.0),
        CaseRecord::new("DD", "Delta", d("2021-06-01"), 70.0),
    ];
    let query = epiview::OverlayQuery {
        date: d("2021-06-01"),
        rows,
    };
    let registry = ColorRegistry::assign(ColorDomain::Countries, ["AA", "BB", "CC", "DD"]);

    let mut first: Option<Vec<String>> = None;
    for _ in 0..5 {
        let model = build_model(&query, &registry, &frame(), 200.0);
        for pair in model.rows.windows(2) {
            assert!(pair[0].value >= pair[1].value, "must be non-increasing");
        }
        let codes: Vec<String> = model.rows.iter().map(|r| r.code.clone()).collect();
        assert_eq!(codes, vec!["CC", "AA", "BB", "DD"], "ties keep input order");
        match &first {
            None => first = Some(codes),
            Some(prev) => assert_eq!(prev, &codes, "order must be deterministic"),
        }
    }
}

#[test]
fn zero_matches_render_no_lines_and_minimal_crosshair() {
    let query = epiview::OverlayQuery {
        date: d("2021-06-01"),
        rows: Vec::new(),
    };
    let registry = ColorRegistry::empty(ColorDomain::Continents);
    let model = build_model(&query, &registry, &frame(), 200.0);
    assert!(model.rows.is_empty());
    let height = model.crosshair_bottom - model.crosshair_top;
    assert!((height - MIN_CROSSHAIR_HEIGHT).abs() < f32::EPSILON);
}

#[test]
fn crosshair_height_respects_the_boundary_date() {
    let make = |date: &str| epiview::OverlayQuery {
        date: d(date),
        rows: vec![
            CaseRecord::new("OWID_EUR", "Europe", d(date), 10.0),
            CaseRecord::new("OWID_AFR", "Africa", d(date), 5.0),
            CaseRecord::new("OWID_ASI", "Asia", d(date), 1.0),
        ],
    };
    let registry =
        ColorRegistry::assign(ColorDomain::Continents, ["OWID_EUR", "OWID_AFR", "OWID_ASI"]);

    let early = build_model(&make("2020-12-31"), &registry, &frame(), 200.0);
    assert_eq!(early.crosshair_top, frame().top + 3.0 * ROW_STRIDE);

    let late = build_model(&make("2021-01-01"), &registry, &frame(), 200.0);
    assert_eq!(late.crosshair_top, frame().top, "full height on/after boundary");
}

#[test]
fn si_formatting_matches_source_readouts() {
    assert_eq!(format_si(90_000.0), "90.0k");
    assert_eq!(format_si(50_000.0), "50.0k");
    assert_eq!(format_si(660_000.0), "660k");
    assert_eq!(format_si(2_500_000.0), "2.50M");
}

#[test]
fn overlay_colors_come_from_the_active_registry() {
    let query = epiview::OverlayQuery {
        date: d("2021-06-01"),
        rows: vec![
            CaseRecord::new("US", "US", d("2021-06-01"), 2.0),
            CaseRecord::new("CA", "CA", d("2021-06-01"), 1.0),
        ],
    };
    let registry = ColorRegistry::assign(ColorDomain::Countries, ["US", "CA"]);
    let model = build_model(&query, &registry, &frame(), 200.0);
    assert_eq!(model.rows[0].color, registry.color_for("US").unwrap());
    assert_eq!(model.rows[1].color, registry.color_for("CA").unwrap());
}
