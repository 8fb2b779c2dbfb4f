//! Line chart view with the ranked hover overlay.
//!
//! Default mode draws one line per continent aggregate against a fixed Y
//! domain; filtered mode draws one line per selected country and fits the Y
//! domain to the filtered rows. Mode is decided at the start of every
//! re-derive from `SelectionState::is_empty()`. The hover overlay persists
//! when the pointer leaves the valid X range — there is no explicit clear on
//! hover exit (preserved source behavior).

use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use egui::Color32;
use egui_plot::{Legend, Line, Plot};

use crate::color::{ColorDomain, ColorRegistry};
use crate::config::EpiViewConfig;
use crate::data::dataset::{CaseRecord, Dataset};
use crate::data::date_axis::DateAxis;
use crate::events::InputEvent;
use crate::hover::{ChartFrame, PointerInversion};
use crate::overlay::{self, OverlayModel, ROW_STRIDE};
use crate::selection::{DirtyFlag, SharedSelection};

/// One plotted line: a location group with pre-projected points
/// (`[days since domain start, metric]`).
#[derive(Debug, Clone)]
struct ChartGroup {
    code: String,
    name: String,
    points: Vec<[f64; 2]>,
}

/// The chart view. Holds handles to the shared dataset and selection; all
/// derived state (groups, colors, Y domain) is rebuilt when the dirty flag
/// raised by the synchronizer is consumed.
pub struct LineChartView {
    dataset: Arc<Dataset>,
    selection: SharedSelection,
    dirty: DirtyFlag,
    default_y_max: f64,

    // Derived per mode.
    filtered: bool,
    registry: ColorRegistry,
    groups: Vec<ChartGroup>,
    visible_rows: Vec<CaseRecord>,
    y_max: f64,

    // Hover machinery, rebuilt from the plot frame every render.
    engine: Option<PointerInversion>,
    last_overlay: Option<OverlayModel>,
    hovering: bool,
}

impl LineChartView {
    pub fn new(dataset: Arc<Dataset>, selection: SharedSelection, default_y_max: f64) -> Self {
        let dirty = DirtyFlag::new();
        // First render derives from scratch.
        dirty.raise();
        Self {
            dataset,
            selection,
            dirty,
            default_y_max,
            filtered: false,
            registry: ColorRegistry::empty(ColorDomain::Continents),
            groups: Vec::new(),
            visible_rows: Vec::new(),
            y_max: default_y_max,
            engine: None,
            last_overlay: None,
            hovering: false,
        }
    }

    /// The flag the synchronizer raises to invalidate this view.
    pub fn dirty_flag(&self) -> DirtyFlag {
        self.dirty.clone()
    }

    pub fn is_filtered(&self) -> bool {
        self.filtered
    }

    pub fn is_hovering(&self) -> bool {
        self.hovering
    }

    pub fn registry(&self) -> &ColorRegistry {
        &self.registry
    }

    /// Plotted group codes, in first-seen (color assignment) order.
    pub fn group_codes(&self) -> Vec<&str> {
        self.groups.iter().map(|g| g.code.as_str()).collect()
    }

    pub fn last_overlay(&self) -> Option<&OverlayModel> {
        self.last_overlay.as_ref()
    }

    pub fn y_max(&self) -> f64 {
        self.y_max
    }

    /// Re-derive groups, colors and the Y domain if notified. Re-deriving
    /// with an unchanged selection produces identical state.
    pub fn refresh_if_dirty(&mut self) -> bool {
        if !self.dirty.take() {
            return false;
        }
        let codes = self.selection.codes();
        self.filtered = !codes.is_empty();
        let rows: Vec<&CaseRecord> = if self.filtered {
            self.dataset.rows_for_codes(&codes)
        } else {
            self.dataset.continent_rows()
        };

        let grouped = Dataset::group_by_code(&rows);
        let domain = if self.filtered {
            ColorDomain::Countries
        } else {
            ColorDomain::Continents
        };
        // A mode switch replaces the registry wholesale; nothing is merged
        // from the previous domain.
        self.registry = ColorRegistry::assign(domain, grouped.iter().map(|(c, _)| c.clone()));

        let start = self.dataset.date_extent().map(|(s, _)| s);
        self.groups = grouped
            .into_iter()
            .map(|(code, rows)| {
                let name = rows.first().map(|r| r.name.clone()).unwrap_or_else(|| code.clone());
                let points = match start {
                    Some(start) => rows
                        .iter()
                        .map(|r| {
                            [
                                (r.date - start).num_days() as f64,
                                r.cases_per_million,
                            ]
                        })
                        .collect(),
                    None => Vec::new(),
                };
                ChartGroup { code, name, points }
            })
            .collect();

        self.y_max = if self.filtered {
            let max = rows
                .iter()
                .map(|r| r.cases_per_million)
                .fold(0.0, f64::max);
            nice_max(max)
        } else {
            self.default_y_max
        };

        self.visible_rows = rows.into_iter().cloned().collect();
        true
    }

    /// Install the pointer inversion engine for the current plot geometry.
    ///
    /// The render pass installs one from the live plot frame every frame;
    /// hosts driving the view headlessly install their own so that
    /// [`handle_pointer_move`](Self::handle_pointer_move) can resolve.
    pub fn set_inversion(&mut self, engine: PointerInversion) {
        self.engine = Some(engine);
    }

    /// Handle a pointer move in screen coordinates.
    ///
    /// Inside the valid X range the overlay is recomputed and fully replaces
    /// the previous one; outside it the view drops back to idle but the last
    /// overlay stays drawn. Returns the snapped date and match count when the
    /// position resolved.
    pub fn handle_pointer_move(&mut self, x: f32, y: f32) -> Option<(NaiveDate, usize)> {
        let engine = self.engine.as_ref()?;
        let refs: Vec<&CaseRecord> = self.visible_rows.iter().collect();
        match engine.resolve(x, y, &refs) {
            Some(query) => {
                self.hovering = true;
                let resolved = (query.date, query.rows.len());
                self.last_overlay =
                    Some(overlay::build_model(&query, &self.registry, engine.frame(), x));
                Some(resolved)
            }
            None => {
                self.hovering = false;
                None
            }
        }
    }

    /// Render the chart and return the input events it produced this frame.
    pub fn ui(&mut self, ui: &mut egui::Ui, cfg: &EpiViewConfig) -> Vec<InputEvent> {
        self.refresh_if_dirty();
        let mut events = Vec::new();

        let Some((start, end)) = self.dataset.date_extent() else {
            ui.label("No data loaded.");
            return events;
        };
        let span_days = (end - start).num_days().max(1);
        let y_max = self.y_max.max(1.0);

        let mut plot = Plot::new("epiview_chart")
            .allow_scroll(false)
            .allow_zoom(false)
            .allow_drag(false)
            .allow_boxed_zoom(false)
            .x_axis_formatter(move |x, _range| {
                let day = x.value.round() as i64;
                (start + Duration::days(day.clamp(0, span_days)))
                    .format("%b %y")
                    .to_string()
            });
        if cfg.features.chart_legend {
            plot = plot.legend(Legend::default());
        }
        if cfg.features.axis_labels {
            plot = plot
                .x_axis_label(cfg.x_label.clone())
                .y_axis_label(cfg.metric_label.clone());
        }

        let groups = self.groups.clone();
        let registry = self.registry.clone();
        let resp = plot.show(ui, |plot_ui| {
            plot_ui.set_plot_bounds_x(0.0..=span_days as f64);
            plot_ui.set_plot_bounds_y(0.0..=y_max);
            for g in &groups {
                if g.points.is_empty() {
                    continue;
                }
                let color = registry.color_for(&g.code).unwrap_or(Color32::GRAY);
                plot_ui.line(
                    Line::new(&g.name, g.points.clone())
                        .color(color)
                        .width(1.5),
                );
            }
        });

        // The plot frame covers exactly the pinned bounds, so the date axis
        // maps the full domain onto it.
        let frame_rect = *resp.transform.frame();
        let frame = ChartFrame::new(
            frame_rect.left(),
            frame_rect.right(),
            frame_rect.top(),
            frame_rect.bottom(),
        );
        let axis = DateAxis::new(start, end, frame.left, frame.right);
        self.set_inversion(PointerInversion::new(axis, frame));

        if let Some(pos) = resp.response.hover_pos() {
            events.push(InputEvent::PointerMoved { x: pos.x, y: pos.y });
        }

        if let Some(model) = &self.last_overlay {
            let painter = ui.painter_at(frame_rect);
            painter.line_segment(
                [
                    egui::Pos2::new(model.crosshair_x, model.crosshair_bottom),
                    egui::Pos2::new(model.crosshair_x, model.crosshair_top),
                ],
                egui::Stroke::new(1.0, Color32::BLACK),
            );
            let font = egui::FontId::proportional(13.0);
            for (i, row) in model.rows.iter().enumerate() {
                painter.text(
                    egui::Pos2::new(frame.left + 2.0, frame.top + i as f32 * ROW_STRIDE),
                    egui::Align2::LEFT_TOP,
                    &row.label,
                    font.clone(),
                    row.color,
                );
            }
        }

        events
    }
}

/// Round a maximum up to a "nice" axis bound (1/2/2.5/5 times a power of ten).
pub fn nice_max(value: f64) -> f64 {
    if !(value > 0.0) {
        return 1.0;
    }
    let pow10 = 10f64.powf(value.log10().floor());
    for m in [1.0, 2.0, 2.5, 5.0, 10.0] {
        let candidate = m * pow10;
        if candidate >= value {
            return candidate;
        }
    }
    10.0 * pow10
}
