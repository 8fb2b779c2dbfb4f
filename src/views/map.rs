//! Choropleth world map view.
//!
//! Country polygons come from a GeoJSON feature collection keyed by the same
//! location codes as the dataset. Fill color is a sequential white-to-red
//! ramp over each country's maximum observed metric; clicking a country emits
//! [`InputEvent::RegionClicked`] for the app's dispatch handler. The view
//! self-queries the shared selection when its dirty flag is raised.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use egui::{Color32, Pos2, Rect, Sense, Stroke, StrokeKind, Vec2};
use geojson::{GeoJson, Value};

use crate::config::EpiViewConfig;
use crate::data::dataset::Dataset;
use crate::events::InputEvent;
use crate::overlay::format_si;
use crate::selection::{DirtyFlag, SharedSelection};

// ─────────────────────────────────────────────────────────────────────────────
// WorldMap – country boundary geometry
// ─────────────────────────────────────────────────────────────────────────────

/// One country's boundary: all rings (outer boundaries and holes) of all its
/// polygons, in lon/lat degrees.
#[derive(Debug, Clone)]
pub struct CountryShape {
    pub code: String,
    pub name: String,
    pub rings: Vec<Vec<[f64; 2]>>,
}

impl CountryShape {
    /// Even-odd point-in-polygon over all rings. Works for multi-polygons
    /// and holes alike because crossings toggle.
    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        let mut inside = false;
        for ring in &self.rings {
            let n = ring.len();
            if n < 3 {
                continue;
            }
            let mut j = n - 1;
            for i in 0..n {
                let (xi, yi) = (ring[i][0], ring[i][1]);
                let (xj, yj) = (ring[j][0], ring[j][1]);
                if ((yi > lat) != (yj > lat))
                    && (lon < (xj - xi) * (lat - yi) / (yj - yi) + xi)
                {
                    inside = !inside;
                }
                j = i;
            }
        }
        inside
    }
}

/// Country boundary collection loaded from GeoJSON.
pub struct WorldMap {
    shapes: Vec<CountryShape>,
}

impl WorldMap {
    pub fn new(shapes: Vec<CountryShape>) -> Self {
        Self { shapes }
    }

    /// Parse a GeoJSON feature collection. Features without usable geometry
    /// or an identifier are skipped; an entirely empty collection is valid.
    pub fn from_geojson_str(text: &str) -> Result<Self, String> {
        let gj: GeoJson = text.parse().map_err(|e: geojson::Error| e.to_string())?;
        let GeoJson::FeatureCollection(fc) = gj else {
            return Err("expected a GeoJSON FeatureCollection".to_string());
        };
        let mut shapes = Vec::new();
        for feature in fc.features {
            let Some(code) = feature_code(&feature) else {
                continue;
            };
            let name = feature_name(&feature).unwrap_or_else(|| code.clone());
            let Some(geometry) = &feature.geometry else {
                continue;
            };
            let rings = match &geometry.value {
                Value::Polygon(poly) => polygon_rings(poly),
                Value::MultiPolygon(multi) => {
                    multi.iter().flat_map(|poly| polygon_rings(poly)).collect()
                }
                _ => continue,
            };
            if rings.is_empty() {
                continue;
            }
            shapes.push(CountryShape { code, name, rings });
        }
        Ok(Self::new(shapes))
    }

    pub fn from_geojson_path(path: &Path) -> Result<Self, String> {
        let text = std::fs::read_to_string(path).map_err(|e| e.to_string())?;
        Self::from_geojson_str(&text)
    }

    pub fn shapes(&self) -> &[CountryShape] {
        &self.shapes
    }

    /// Topmost country containing the given lon/lat, if any.
    pub fn hit_test(&self, lon: f64, lat: f64) -> Option<&CountryShape> {
        self.shapes.iter().find(|s| s.contains(lon, lat))
    }
}

fn feature_code(feature: &geojson::Feature) -> Option<String> {
    if let Some(geojson::feature::Id::String(id)) = &feature.id {
        return Some(id.clone());
    }
    let props = feature.properties.as_ref()?;
    for key in ["id", "iso_a3", "ISO_A3", "adm0_a3"] {
        if let Some(serde_json::Value::String(s)) = props.get(key) {
            return Some(s.clone());
        }
    }
    None
}

fn feature_name(feature: &geojson::Feature) -> Option<String> {
    let props = feature.properties.as_ref()?;
    for key in ["name", "NAME", "admin", "ADMIN"] {
        if let Some(serde_json::Value::String(s)) = props.get(key) {
            return Some(s.clone());
        }
    }
    None
}

fn polygon_rings(poly: &[Vec<Vec<f64>>]) -> Vec<Vec<[f64; 2]>> {
    poly.iter()
        .map(|ring| {
            ring.iter()
                .filter(|pos| pos.len() >= 2)
                .map(|pos| [pos[0], pos[1]])
                .collect()
        })
        .collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Projection and color ramp
// ─────────────────────────────────────────────────────────────────────────────

/// Equirectangular projection of lon/lat into a screen rect.
pub fn project(rect: &Rect, lon: f64, lat: f64) -> Pos2 {
    let x = rect.left() + (((lon + 180.0) / 360.0) as f32) * rect.width();
    let y = rect.top() + (((90.0 - lat) / 180.0) as f32) * rect.height();
    Pos2::new(x, y)
}

/// Inverse of [`project`].
pub fn unproject(rect: &Rect, pos: Pos2) -> (f64, f64) {
    let lon = ((pos.x - rect.left()) / rect.width()) as f64 * 360.0 - 180.0;
    let lat = 90.0 - ((pos.y - rect.top()) / rect.height()) as f64 * 180.0;
    (lon, lat)
}

/// Sequential white-to-dark-red ramp, `t` in `[0, 1]`.
pub fn ramp_color(t: f64) -> Color32 {
    let t = t.clamp(0.0, 1.0) as f32;
    let lerp = |a: u8, b: u8| -> u8 { (a as f32 + (b as f32 - a as f32) * t).round() as u8 };
    Color32::from_rgb(lerp(255, 103), lerp(245, 0), lerp(240, 13))
}

// ─────────────────────────────────────────────────────────────────────────────
// MapView
// ─────────────────────────────────────────────────────────────────────────────

/// The map view: renders the choropleth and translates clicks into input
/// events. Holds handles to the shared dataset and selection, never copies.
pub struct MapView {
    world: Arc<WorldMap>,
    selection: SharedSelection,
    dirty: DirtyFlag,
    // Derived once from the immutable dataset.
    max_by_code: HashMap<String, f64>,
    global_max: f64,
    // Selection snapshot, refreshed on notification (pull-on-notify).
    selected: Vec<String>,
}

impl MapView {
    pub fn new(dataset: &Dataset, world: Arc<WorldMap>, selection: SharedSelection) -> Self {
        let max_by_code = dataset.max_cases_by_code();
        let global_max = dataset.global_max();
        let selected = selection.codes();
        Self {
            world,
            selection,
            dirty: DirtyFlag::new(),
            max_by_code,
            global_max,
            selected,
        }
    }

    /// The flag the synchronizer raises to invalidate this view.
    pub fn dirty_flag(&self) -> DirtyFlag {
        self.dirty.clone()
    }

    pub fn selected(&self) -> &[String] {
        &self.selected
    }

    /// Re-derive selection-dependent state if notified. Idempotent: without a
    /// raised flag the snapshot is left untouched, so re-rendering with an
    /// unchanged selection yields the same output.
    pub fn refresh_if_dirty(&mut self) -> bool {
        if self.dirty.take() {
            self.selected = self.selection.codes();
            true
        } else {
            false
        }
    }

    /// Fill color for one country code.
    fn fill_for(&self, code: &str) -> Color32 {
        let max = self.max_by_code.get(code).copied().unwrap_or(0.0);
        let t = if self.global_max > 0.0 {
            max / self.global_max
        } else {
            0.0
        };
        ramp_color(t)
    }

    /// Render the map and return the input events it produced this frame.
    pub fn ui(&mut self, ui: &mut egui::Ui, cfg: &EpiViewConfig) -> Vec<InputEvent> {
        self.refresh_if_dirty();
        let mut events = Vec::new();

        if cfg.features.clear_button && ui.button("Clear Selected Countries").clicked() {
            events.push(InputEvent::ClearRequested);
        }

        // Keep the 2:1 aspect of the equirectangular projection.
        let avail = ui.available_size();
        let width = avail.x.max(50.0);
        let height = (width / 2.0).min(avail.y.max(50.0));
        let (rect, response) =
            ui.allocate_exact_size(Vec2::new(width, height), Sense::click());
        let painter = ui.painter_at(rect);
        painter.rect_filled(rect, 0.0, Color32::from_rgb(15, 30, 60));

        if cfg.features.graticules {
            self.draw_graticules(&painter, &rect);
        }

        for shape in self.world.shapes() {
            let fill = self.fill_for(&shape.code);
            let selected = self.selected.iter().any(|c| c == &shape.code);
            let stroke = if selected {
                Stroke::new(2.0, Color32::from_rgb(70, 130, 240))
            } else {
                Stroke::new(0.5, Color32::from_gray(60))
            };
            for ring in &shape.rings {
                if ring.len() < 3 {
                    continue;
                }
                let points: Vec<Pos2> = ring
                    .iter()
                    .map(|&[lon, lat]| project(&rect, lon, lat))
                    .collect();
                painter.add(egui::Shape::Path(egui::epaint::PathShape {
                    points,
                    closed: true,
                    fill,
                    stroke: stroke.into(),
                }));
            }
        }

        if response.clicked() {
            if let Some(pos) = response.interact_pointer_pos() {
                let (lon, lat) = unproject(&rect, pos);
                if let Some(shape) = self.world.hit_test(lon, lat) {
                    events.push(InputEvent::RegionClicked {
                        code: shape.code.clone(),
                    });
                }
            }
        }

        if cfg.features.map_legend {
            self.draw_legend(&painter, &rect);
        }

        events
    }

    fn draw_graticules(&self, painter: &egui::Painter, rect: &Rect) {
        let stroke = Stroke::new(0.3, Color32::from_gray(110));
        let mut lon = -180.0_f64;
        while lon <= 180.0 {
            let a = project(rect, lon, 90.0);
            let b = project(rect, lon, -90.0);
            painter.line_segment([a, b], stroke);
            lon += 30.0;
        }
        let mut lat = -90.0_f64;
        while lat <= 90.0 {
            let a = project(rect, -180.0, lat);
            let b = project(rect, 180.0, lat);
            painter.line_segment([a, b], stroke);
            lat += 30.0;
        }
    }

    fn draw_legend(&self, painter: &egui::Painter, rect: &Rect) {
        let width = 150.0_f32;
        let height = 14.0_f32;
        let origin = Pos2::new(rect.left() + 8.0, rect.bottom() - height - 8.0);
        let steps = 40;
        let step_w = width / steps as f32;
        for i in 0..steps {
            let t = i as f64 / (steps - 1) as f64;
            let slice = Rect::from_min_size(
                Pos2::new(origin.x + i as f32 * step_w, origin.y),
                Vec2::new(step_w + 0.5, height),
            );
            painter.rect_filled(slice, 0.0, ramp_color(t));
        }
        painter.rect_stroke(
            Rect::from_min_size(origin, Vec2::new(width, height)),
            0.0,
            Stroke::new(0.5, Color32::from_gray(200)),
            StrokeKind::Outside,
        );
        let font = egui::FontId::proportional(11.0);
        painter.text(
            Pos2::new(origin.x, origin.y - 3.0),
            egui::Align2::LEFT_BOTTOM,
            "0",
            font.clone(),
            Color32::WHITE,
        );
        painter.text(
            Pos2::new(origin.x + width, origin.y - 3.0),
            egui::Align2::RIGHT_BOTTOM,
            format_si(self.global_max),
            font,
            Color32::WHITE,
        );
    }
}
