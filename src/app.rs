//! Application shell: owns the shared state, both views, and the single
//! event dispatch handler.
//!
//! All interaction funnels through [`EpiViewApp::dispatch`] as an
//! [`InputEvent`], so every event kind is handled by one exhaustive match.
//! Selection mutations notify the synchronizer, which raises the views'
//! dirty flags in fixed order — map first, then chart.

use std::sync::Arc;

use crate::config::EpiViewConfig;
use crate::data::dataset::Dataset;
use crate::events::{
    ClickMeta, EventController, EventKind, HoverMeta, InputEvent, LinkEvent, SelectionMeta,
};
use crate::selection::{SharedSelection, ViewSynchronizer};
use crate::views::chart::LineChartView;
use crate::views::map::{MapView, WorldMap};

/// The linked-views application.
pub struct EpiViewApp {
    dataset: Arc<Dataset>,
    selection: SharedSelection,
    sync: ViewSynchronizer,
    map: MapView,
    chart: LineChartView,
    config: EpiViewConfig,
    events: Option<EventController>,
}

impl EpiViewApp {
    /// Build the app from a loaded dataset and world geometry.
    ///
    /// The dataset is shared read-only; the selection starts empty and is
    /// shared read-write through handles. Registration order with the
    /// synchronizer fixes the notification order: map before chart.
    pub fn new(dataset: Arc<Dataset>, world: Arc<WorldMap>, config: EpiViewConfig) -> Self {
        let selection = SharedSelection::new();
        let map = MapView::new(&dataset, world, selection.clone());
        let chart = LineChartView::new(dataset.clone(), selection.clone(), config.default_y_max);

        let mut sync = ViewSynchronizer::new();
        sync.register("map", map.dirty_flag());
        sync.register("chart", chart.dirty_flag());

        let events = config.controllers.event.clone();
        Self {
            dataset,
            selection,
            sync,
            map,
            chart,
            config,
            events,
        }
    }

    pub fn dataset(&self) -> &Arc<Dataset> {
        &self.dataset
    }

    pub fn selection(&self) -> &SharedSelection {
        &self.selection
    }

    pub fn synchronizer(&self) -> &ViewSynchronizer {
        &self.sync
    }

    pub fn map(&self) -> &MapView {
        &self.map
    }

    pub fn chart(&self) -> &LineChartView {
        &self.chart
    }

    pub fn chart_mut(&mut self) -> &mut LineChartView {
        &mut self.chart
    }

    fn emit(&self, event: LinkEvent) {
        if let Some(ctrl) = &self.events {
            ctrl.emit(event);
        }
    }

    /// Handle one input event. The only write path into the selection.
    pub fn dispatch(&mut self, event: InputEvent) {
        match event {
            InputEvent::RegionClicked { code } => {
                let was_empty = self.selection.is_empty();
                let now_selected = self.selection.toggle(&code);
                self.sync.notify_all();

                let mut kinds = EventKind::REGION_CLICKED | EventKind::SELECTION_CHANGED;
                if was_empty != self.selection.is_empty() {
                    kinds |= EventKind::MODE_CHANGED;
                }
                let mut ev = LinkEvent::new(kinds);
                ev.click = Some(ClickMeta { code, now_selected });
                ev.selection = Some(SelectionMeta {
                    codes: self.selection.codes(),
                    filtered: !self.selection.is_empty(),
                });
                self.emit(ev);
            }
            InputEvent::ClearRequested => {
                let was_empty = self.selection.is_empty();
                self.selection.clear();
                self.sync.notify_all();

                let mut kinds = EventKind::SELECTION_CLEARED | EventKind::SELECTION_CHANGED;
                if !was_empty {
                    kinds |= EventKind::MODE_CHANGED;
                }
                let mut ev = LinkEvent::new(kinds);
                ev.selection = Some(SelectionMeta {
                    codes: Vec::new(),
                    filtered: false,
                });
                self.emit(ev);
            }
            InputEvent::PointerMoved { x, y } => {
                let resolved = self.chart.handle_pointer_move(x, y);
                let mut kinds = EventKind::HOVER_MOVED;
                if resolved.is_some() {
                    kinds |= EventKind::HOVER_RESOLVED;
                }
                let mut ev = LinkEvent::new(kinds);
                ev.hover = Some(HoverMeta {
                    x,
                    y,
                    date: resolved.map(|(d, _)| d),
                    row_count: resolved.map(|(_, n)| n).unwrap_or(0),
                });
                self.emit(ev);
            }
        }
    }

    // ── Shell operations ─────────────────────────────────────────────────

    /// A country was clicked on the map.
    pub fn on_map_region_clicked(&mut self, code: impl Into<String>) {
        self.dispatch(InputEvent::RegionClicked { code: code.into() });
    }

    /// The clear-selection action was triggered.
    pub fn on_selection_cleared(&mut self) {
        self.dispatch(InputEvent::ClearRequested);
    }

    /// The pointer moved over the chart (screen pixels).
    pub fn on_chart_pointer_move(&mut self, x: f32, y: f32) {
        self.dispatch(InputEvent::PointerMoved { x, y });
    }
}

impl eframe::App for EpiViewApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let mut pending: Vec<InputEvent> = Vec::new();
        let cfg = self.config.clone();

        egui::CentralPanel::default().show(ctx, |ui| {
            match (cfg.features.map, cfg.features.chart) {
                (true, true) => {
                    // Map on top, chart below, matching the source layout.
                    let half = ui.available_height() / 2.0;
                    ui.allocate_ui(egui::Vec2::new(ui.available_width(), half), |ui| {
                        pending.extend(self.map.ui(ui, &cfg));
                    });
                    ui.separator();
                    pending.extend(self.chart.ui(ui, &cfg));
                }
                (true, false) => pending.extend(self.map.ui(ui, &cfg)),
                (false, true) => pending.extend(self.chart.ui(ui, &cfg)),
                (false, false) => {
                    ui.label("All views disabled.");
                }
            }
        });

        // Events are processed strictly in arrival order, each handler
        // running to completion before the next.
        for event in pending {
            self.dispatch(event);
        }
    }
}

/// Launch the linked views in a native window with default configuration.
pub fn run(dataset: Arc<Dataset>, world: Arc<WorldMap>) -> Result<(), String> {
    run_with_config(dataset, world, EpiViewConfig::default())
}

/// Launch the linked views in a native window.
pub fn run_with_config(
    dataset: Arc<Dataset>,
    world: Arc<WorldMap>,
    config: EpiViewConfig,
) -> Result<(), String> {
    let native_options = config.native_options.clone().unwrap_or_else(|| {
        eframe::NativeOptions {
            viewport: egui::ViewportBuilder::default().with_inner_size([900.0, 980.0]),
            ..Default::default()
        }
    });
    let title = config.title.clone();
    eframe::run_native(
        &title,
        native_options,
        Box::new(move |_cc| Ok(Box::new(EpiViewApp::new(dataset, world, config)))),
    )
    .map_err(|e| e.to_string())
}
