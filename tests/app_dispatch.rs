use std::sync::Arc;

use chrono::NaiveDate;
use epiview::{
    ChartFrame, ColorDomain, Controllers, Dataset, DateAxis, EpiViewApp, EpiViewConfig,
    EventController, EventFilter, EventKind, InputEvent, PointerInversion, WorldMap,
};

fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn sample_dataset() -> Arc<Dataset> {
    let csv = "\
iso_code,location,date,total_cases_per_million
OWID_EUR,Europe,2021-06-01,120000
OWID_AFR,Africa,2021-06-01,40000
US,United States,2021-06-01,90000
US,United States,2021-06-02,91000
CA,Canada,2021-06-01,50000
";
    Arc::new(Dataset::from_csv_reader(csv.as_bytes()).unwrap())
}

fn app() -> EpiViewApp {
    EpiViewApp::new(
        sample_dataset(),
        Arc::new(WorldMap::new(Vec::new())),
        EpiViewConfig::default(),
    )
}

fn app_with_events() -> (EpiViewApp, EventController) {
    let ctrl = EventController::new();
    let config = EpiViewConfig {
        controllers: Controllers {
            event: Some(ctrl.clone()),
        },
        ..Default::default()
    };
    let app = EpiViewApp::new(sample_dataset(), Arc::new(WorldMap::new(Vec::new())), config);
    (app, ctrl)
}

#[test]
fn starts_in_default_mode_with_continent_lines() {
    let mut app = app();
    app.chart_mut().refresh_if_dirty();
    assert!(!app.chart().is_filtered());
    assert_eq!(app.chart().group_codes(), vec!["OWID_EUR", "OWID_AFR"]);
    assert_eq!(app.chart().registry().domain(), ColorDomain::Continents);
    assert_eq!(app.chart().y_max(), 350_000.0);
}

#[test]
fn map_click_switches_to_filtered_mode_showing_only_that_country() {
    let mut app = app();
    app.chart_mut().refresh_if_dirty();

    app.on_map_region_clicked("US");
    assert_eq!(app.selection().codes(), vec!["US".to_string()]);

    assert!(app.chart_mut().refresh_if_dirty(), "click must dirty the chart");
    assert!(app.chart().is_filtered());
    assert_eq!(app.chart().group_codes(), vec!["US"]);
    assert_eq!(app.chart().registry().domain(), ColorDomain::Countries);
    // Y domain fits the filtered rows, rounded up to a nice bound.
    assert_eq!(app.chart().y_max(), 100_000.0);
}

#[test]
fn second_click_on_same_country_restores_default_mode() {
    let mut app = app();
    app.on_map_region_clicked("US");
    app.on_map_region_clicked("US");
    assert!(app.selection().is_empty());

    app.chart_mut().refresh_if_dirty();
    assert!(!app.chart().is_filtered());
    assert_eq!(app.chart().group_codes(), vec!["OWID_EUR", "OWID_AFR"]);
}

#[test]
fn clear_restores_default_mode_from_any_selection() {
    let mut app = app();
    app.on_map_region_clicked("US");
    app.on_map_region_clicked("CA");
    assert_eq!(app.selection().len(), 2);

    app.on_selection_cleared();
    assert!(app.selection().is_empty());

    app.chart_mut().refresh_if_dirty();
    assert!(!app.chart().is_filtered());
    assert_eq!(app.chart().registry().domain(), ColorDomain::Continents);
    assert_eq!(app.chart().y_max(), 350_000.0);
}

#[test]
fn refresh_without_notification_is_a_noop() {
    let mut app = app();
    assert!(app.chart_mut().refresh_if_dirty(), "initial derive");
    assert!(!app.chart_mut().refresh_if_dirty(), "no change, no work");
}

#[test]
fn click_emits_selection_and_mode_events() {
    let (mut app, ctrl) = app_with_events();
    let rx = ctrl.subscribe_all();

    app.dispatch(InputEvent::RegionClicked {
        code: "US".to_string(),
    });
    let ev = rx.try_recv().unwrap();
    assert!(ev.kinds.contains(EventKind::REGION_CLICKED));
    assert!(ev.kinds.contains(EventKind::SELECTION_CHANGED));
    assert!(ev.kinds.contains(EventKind::MODE_CHANGED), "empty -> non-empty");
    let click = ev.click.unwrap();
    assert_eq!(click.code, "US");
    assert!(click.now_selected);
    let sel = ev.selection.unwrap();
    assert!(sel.filtered);
    assert_eq!(sel.codes, vec!["US".to_string()]);

    // A second country does not flip the mode again.
    app.dispatch(InputEvent::RegionClicked {
        code: "CA".to_string(),
    });
    let ev = rx.try_recv().unwrap();
    assert!(!ev.kinds.contains(EventKind::MODE_CHANGED));
}

#[test]
fn clear_emits_cleared_event_with_empty_selection() {
    let (mut app, ctrl) = app_with_events();
    let rx = ctrl.subscribe(EventFilter::only(EventKind::SELECTION_CLEARED));

    app.on_map_region_clicked("US");
    assert!(rx.try_recv().is_err(), "filter must drop the click event");

    app.on_selection_cleared();
    let ev = rx.try_recv().unwrap();
    assert!(ev.kinds.contains(EventKind::SELECTION_CLEARED));
    assert!(ev.kinds.contains(EventKind::MODE_CHANGED));
    let sel = ev.selection.unwrap();
    assert!(!sel.filtered);
    assert!(sel.codes.is_empty());
}

#[test]
fn pointer_move_before_first_render_emits_unresolved_hover() {
    // The inversion engine only exists after a render has produced a plot
    // frame, so a synthetic pointer event must degrade to an unresolved hover.
    let (mut app, ctrl) = app_with_events();
    let rx = ctrl.subscribe_all();

    app.on_chart_pointer_move(200.0, 100.0);
    let ev = rx.try_recv().unwrap();
    assert!(ev.kinds.contains(EventKind::HOVER_MOVED));
    assert!(!ev.kinds.contains(EventKind::HOVER_RESOLVED));
    let hover = ev.hover.unwrap();
    assert_eq!(hover.date, None);
    assert_eq!(hover.row_count, 0);
}

#[test]
fn synchronizer_notifies_map_before_chart() {
    let app = app();
    assert_eq!(app.synchronizer().order(), vec!["map", "chart"]);
}

#[test]
fn leaving_the_plot_keeps_the_last_overlay_drawn() {
    let mut app = app();
    app.chart_mut().refresh_if_dirty();

    // Headless render substitute: install the engine a UI pass would build.
    let frame = ChartFrame::new(90.0, 600.0, 15.0, 426.0);
    let axis = DateAxis::new(d("2021-06-01"), d("2021-06-02"), frame.left, frame.right);
    app.chart_mut().set_inversion(PointerInversion::new(axis, frame));

    app.on_chart_pointer_move(100.0, 200.0);
    assert!(app.chart().is_hovering());
    let drawn = app.chart().last_overlay().cloned().expect("in-range move draws");
    assert_eq!(drawn.date, d("2021-06-01"));
    assert_eq!(drawn.rows.len(), 2, "both continents observed that day");

    // Out-of-range move: back to idle, overlay untouched.
    app.on_chart_pointer_move(2000.0, 200.0);
    assert!(!app.chart().is_hovering());
    assert_eq!(app.chart().last_overlay(), Some(&drawn));

    // The next in-range move replaces it.
    app.on_chart_pointer_move(600.0, 200.0);
    assert!(app.chart().is_hovering());
    assert_eq!(app.chart().last_overlay().unwrap().date, d("2021-06-02"));
}

#[test]
fn click_raises_both_view_dirty_flags() {
    let mut app = app();
    let map_flag = app.map().dirty_flag();
    let chart_flag = app.chart().dirty_flag();
    chart_flag.take(); // consume the initial-derive notification

    app.on_map_region_clicked("CA");
    assert!(map_flag.is_raised());
    assert!(chart_flag.is_raised());
}
