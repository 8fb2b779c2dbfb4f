//! Horizontal calendar-day scale with pixel inversion and day snapping.
//!
//! The chart's X axis maps a closed day range onto a closed pixel range. The
//! inverse mapping is what drives the hover overlay: a pointer X coordinate
//! inverts to a continuous position along the domain and is then *snapped* to
//! a whole calendar day, matching the dataset's own day-granular keys. No
//! interpolation between days ever happens.

use chrono::{Duration, NaiveDate};

use crate::data::dataset::Dataset;

/// Linear time scale from `[start, end]` (calendar days) to `[left, right]`
/// (pixels).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DateAxis {
    start: NaiveDate,
    end: NaiveDate,
    left: f32,
    right: f32,
}

impl DateAxis {
    /// Build an axis over the given domain and pixel range.
    ///
    /// A reversed domain is swapped into order; a degenerate single-day
    /// domain is allowed and maps every in-range pixel to that day.
    pub fn new(start: NaiveDate, end: NaiveDate, left: f32, right: f32) -> Self {
        let (start, end) = if end < start { (end, start) } else { (start, end) };
        Self {
            start,
            end,
            left,
            right,
        }
    }

    /// Axis over the full date extent of a dataset. `None` for an empty dataset.
    pub fn from_dataset(dataset: &Dataset, left: f32, right: f32) -> Option<Self> {
        let (start, end) = dataset.date_extent()?;
        Some(Self::new(start, end, left, right))
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Number of whole days spanned by the domain.
    pub fn span_days(&self) -> i64 {
        (self.end - self.start).num_days()
    }

    /// Whether a pixel X coordinate lies inside the horizontal plot bounds.
    pub fn contains_x(&self, x: f32) -> bool {
        x >= self.left && x <= self.right
    }

    /// Forward mapping: day to pixel X.
    pub fn date_to_x(&self, date: NaiveDate) -> f32 {
        let span = self.span_days();
        if span == 0 {
            return self.left;
        }
        let offset = (date - self.start).num_days() as f64 / span as f64;
        self.left + (offset as f32) * (self.right - self.left)
    }

    /// Inverse mapping with day snapping.
    ///
    /// Returns `None` for pixels outside the plot bounds. In-range pixels
    /// invert to a continuous domain position whose whole-day part is the
    /// snapped date; the result is therefore always one of the domain's exact
    /// calendar days.
    pub fn x_to_date(&self, x: f32) -> Option<NaiveDate> {
        if !self.contains_x(x) {
            return None;
        }
        let span = self.span_days();
        if span == 0 {
            return Some(self.start);
        }
        let width = (self.right - self.left) as f64;
        let t = if width > 0.0 {
            ((x - self.left) as f64 / width).clamp(0.0, 1.0)
        } else {
            0.0
        };
        // Tiny epsilon so a day boundary that lands exactly on a pixel does
        // not truncate to the previous day through float error.
        let day_offset = (t * span as f64 + 1e-6).floor() as i64;
        Some(self.start + Duration::days(day_offset.clamp(0, span)))
    }
}
