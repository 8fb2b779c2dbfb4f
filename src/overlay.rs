//! Ranked hover overlay: sorted per-location readout plus crosshair geometry.
//!
//! Matched rows are sorted descending by metric with a stable sort, so ties
//! keep their input order and repeated renders of the same query are
//! byte-identical. Each render fully replaces the previous overlay model;
//! rows never accumulate across pointer moves.

use chrono::NaiveDate;
use egui::Color32;
use once_cell::sync::Lazy;

use crate::color::ColorRegistry;
use crate::hover::{ChartFrame, OverlayQuery};

/// Vertical stride between overlay text rows, in pixels.
pub const ROW_STRIDE: f32 = 20.0;

/// Minimum crosshair height when no rows match the snapped day.
pub const MIN_CROSSHAIR_HEIGHT: f32 = 4.0;

/// Day boundary before which the crosshair stops below the text block.
///
/// This is a fixed constant tied to a discontinuity in the underlying
/// real-world event the dataset tracks, not something derived from data.
pub static CROSSHAIR_CAP_DATE: Lazy<NaiveDate> =
    Lazy::new(|| NaiveDate::from_ymd_opt(2021, 1, 1).unwrap());

/// Fallback color for rows whose code misses the active registry.
const UNASSIGNED_COLOR: Color32 = Color32::GRAY;

/// One rendered overlay line.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayRow {
    /// Location code, the row's identity across re-renders.
    pub code: String,
    /// Display text, `"<name>: <value>"` with the value in SI notation.
    pub label: String,
    /// Color from the active registry (gray on a registry miss).
    pub color: Color32,
    /// Raw metric value, for hosts that want to re-format.
    pub value: f64,
}

/// Complete overlay state for one pointer position.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayModel {
    /// Snapped day the overlay describes.
    pub date: NaiveDate,
    /// Ranked rows, descending by metric.
    pub rows: Vec<OverlayRow>,
    /// Crosshair X in screen pixels.
    pub crosshair_x: f32,
    /// Crosshair top edge (the line runs from here down to `crosshair_bottom`).
    pub crosshair_top: f32,
    /// Crosshair bottom edge (the plot's bottom edge).
    pub crosshair_bottom: f32,
}

/// Sort rows descending by metric. Stable: equal values keep input order.
pub fn rank_rows(query: &OverlayQuery) -> Vec<&crate::data::dataset::CaseRecord> {
    let mut ranked: Vec<_> = query.rows.iter().collect();
    ranked.sort_by(|a, b| {
        b.cases_per_million
            .partial_cmp(&a.cases_per_million)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    ranked
}

/// Format a value with three significant digits and an SI suffix,
/// e.g. `90000.0` → `"90.0k"`, `1_234_567.0` → `"1.23M"`.
pub fn format_si(value: f64) -> String {
    let magnitude = value.abs();
    let (scaled, suffix) = if magnitude >= 1e9 {
        (value / 1e9, "G")
    } else if magnitude >= 1e6 {
        (value / 1e6, "M")
    } else if magnitude >= 1e3 {
        (value / 1e3, "k")
    } else {
        (value, "")
    };
    let digits = if scaled.abs() >= 100.0 {
        0
    } else if scaled.abs() >= 10.0 {
        1
    } else {
        2
    };
    format!("{scaled:.digits$}{suffix}")
}

/// Build the overlay model for one resolved query.
///
/// Crosshair rule: the line always starts at the plot's bottom edge. For
/// snapped days before [`CROSSHAIR_CAP_DATE`] its top stops one row stride
/// per matched group below the plot top (leaving the text block clear); on or
/// after the boundary it runs the full plot height. Zero matched rows produce
/// zero text lines and a minimal-height crosshair.
pub fn build_model(
    query: &OverlayQuery,
    registry: &ColorRegistry,
    frame: &ChartFrame,
    pointer_x: f32,
) -> OverlayModel {
    let ranked = rank_rows(query);
    let rows: Vec<OverlayRow> = ranked
        .iter()
        .map(|r| OverlayRow {
            code: r.code.clone(),
            label: format!("{}: {}", r.name, format_si(r.cases_per_million)),
            color: registry.color_for(&r.code).unwrap_or(UNASSIGNED_COLOR),
            value: r.cases_per_million,
        })
        .collect();

    let group_count = {
        let mut seen: Vec<&str> = Vec::new();
        for r in &ranked {
            if !seen.contains(&r.code.as_str()) {
                seen.push(&r.code);
            }
        }
        seen.len()
    };

    let crosshair_top = if rows.is_empty() {
        frame.bottom - MIN_CROSSHAIR_HEIGHT
    } else if query.date < *CROSSHAIR_CAP_DATE {
        (frame.top + ROW_STRIDE * group_count as f32).min(frame.bottom)
    } else {
        frame.top
    };

    OverlayModel {
        date: query.date,
        rows,
        crosshair_x: pointer_x.clamp(frame.left, frame.right),
        crosshair_top,
        crosshair_bottom: frame.bottom,
    }
}
