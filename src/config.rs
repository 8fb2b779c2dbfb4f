//! Configuration types shared across the linked views.

use crate::events::EventController;

// ─────────────────────────────────────────────────────────────────────────────
// Feature flags
// ─────────────────────────────────────────────────────────────────────────────

/// Toggle individual UI features on or off.
///
/// All features default to `true`. Disable features to embed a minimal,
/// focused pair of views in a host dashboard.
#[derive(Clone, Debug)]
pub struct FeatureFlags {
    /// Show the choropleth map view.
    pub map: bool,
    /// Show the line chart view.
    pub chart: bool,
    /// Show the map's color-ramp legend.
    pub map_legend: bool,
    /// Draw graticule lines on the map.
    pub graticules: bool,
    /// Show the clear-selection button.
    pub clear_button: bool,
    /// Show chart axis labels.
    pub axis_labels: bool,
    /// Show the chart legend.
    pub chart_legend: bool,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            map: true,
            chart: true,
            map_legend: true,
            graticules: true,
            clear_button: true,
            axis_labels: true,
            chart_legend: true,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Controllers sub-config
// ─────────────────────────────────────────────────────────────────────────────

/// Optional programmatic controllers attached to the app.
#[derive(Clone, Default)]
pub struct Controllers {
    pub event: Option<EventController>,
}

// ─────────────────────────────────────────────────────────────────────────────
// EpiViewConfig
// ─────────────────────────────────────────────────────────────────────────────

/// Top-level configuration for the linked views.
pub struct EpiViewConfig {
    /// Native window title.
    pub title: String,
    /// Y-axis label for the chart.
    pub metric_label: String,
    /// X-axis label for the chart.
    pub x_label: String,
    /// Fixed Y-axis maximum used in default (continent) mode.
    ///
    /// Filtered mode ignores this and fits to the selected rows instead.
    pub default_y_max: f64,
    /// Toggle individual UI features on/off.
    pub features: FeatureFlags,
    /// Optional eframe native-window options.
    pub native_options: Option<eframe::NativeOptions>,
    /// External controllers for programmatic interaction.
    pub controllers: Controllers,
}

impl Default for EpiViewConfig {
    fn default() -> Self {
        Self {
            title: "EpiView".to_string(),
            metric_label: "Cases Per Million".to_string(),
            x_label: "Date".to_string(),
            default_y_max: 350_000.0,
            features: FeatureFlags::default(),
            native_options: None,
            controllers: Controllers::default(),
        }
    }
}

impl Clone for EpiViewConfig {
    fn clone(&self) -> Self {
        Self {
            title: self.title.clone(),
            metric_label: self.metric_label.clone(),
            x_label: self.x_label.clone(),
            default_y_max: self.default_y_max,
            features: self.features.clone(),
            native_options: self.native_options.clone(),
            controllers: self.controllers.clone(),
        }
    }
}
