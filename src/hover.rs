//! Pointer inversion: screen position to snapped date to matched rows.
//!
//! `resolve` is a total function over its domain: every pointer position maps
//! to a defined output — `None` outside the horizontal plot bounds, an empty
//! match list on a gap day — never an error. The vertical coordinate is
//! accepted but does not participate in row filtering; it only decides
//! whether a crosshair gets drawn at all.

use chrono::NaiveDate;

use crate::data::dataset::CaseRecord;
use crate::data::date_axis::DateAxis;

/// Pixel rectangle of the chart's plot area (axes excluded).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartFrame {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

impl ChartFrame {
    pub fn new(left: f32, right: f32, top: f32, bottom: f32) -> Self {
        Self {
            left,
            right,
            top,
            bottom,
        }
    }
}

/// Result of one pointer resolution: the snapped day and the rows observed on
/// exactly that day. Transient — recomputed on every pointer move, never
/// persisted.
#[derive(Debug, Clone)]
pub struct OverlayQuery {
    pub date: NaiveDate,
    pub rows: Vec<CaseRecord>,
}

/// Converts pointer positions into [`OverlayQuery`]s against the currently
/// visible row set.
#[derive(Debug, Clone, Copy)]
pub struct PointerInversion {
    axis: DateAxis,
    frame: ChartFrame,
}

impl PointerInversion {
    pub fn new(axis: DateAxis, frame: ChartFrame) -> Self {
        Self { axis, frame }
    }

    pub fn axis(&self) -> &DateAxis {
        &self.axis
    }

    pub fn frame(&self) -> &ChartFrame {
        &self.frame
    }

    /// Resolve a pointer position against the visible rows.
    ///
    /// Returns `None` when `x` lies outside the horizontal plot bounds.
    /// Otherwise the snapped day is matched exactly against row dates; a day
    /// with no observations yields an empty `rows` list.
    pub fn resolve(&self, x: f32, _y: f32, visible: &[&CaseRecord]) -> Option<OverlayQuery> {
        let date = self.axis.x_to_date(x)?;
        let rows = visible
            .iter()
            .filter(|r| r.date == date)
            .map(|r| (*r).clone())
            .collect();
        Some(OverlayQuery { date, rows })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::dataset::CaseRecord;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn engine() -> PointerInversion {
        let axis = DateAxis::new(d("2021-06-01"), d("2021-06-30"), 100.0, 600.0);
        let frame = ChartFrame::new(100.0, 600.0, 10.0, 400.0);
        PointerInversion::new(axis, frame)
    }

    #[test]
    fn out_of_bounds_x_resolves_to_none() {
        let rows = [CaseRecord::new("US", "United States", d("2021-06-01"), 1.0)];
        let refs: Vec<&CaseRecord> = rows.iter().collect();
        let eng = engine();
        assert!(eng.resolve(99.0, 200.0, &refs).is_none());
        assert!(eng.resolve(601.0, 200.0, &refs).is_none());
    }

    #[test]
    fn gap_day_yields_empty_rows_not_error() {
        let rows = [CaseRecord::new("US", "United States", d("2021-06-01"), 1.0)];
        let refs: Vec<&CaseRecord> = rows.iter().collect();
        // x = 600.0 snaps to the last domain day, which has no observation.
        let q = engine().resolve(600.0, 200.0, &refs).unwrap();
        assert_eq!(q.date, d("2021-06-30"));
        assert!(q.rows.is_empty());
    }

    #[test]
    fn exact_day_match_collects_all_rows() {
        let rows = [
            CaseRecord::new("US", "United States", d("2021-06-01"), 90000.0),
            CaseRecord::new("CA", "Canada", d("2021-06-01"), 50000.0),
            CaseRecord::new("US", "United States", d("2021-06-02"), 91000.0),
        ];
        let refs: Vec<&CaseRecord> = rows.iter().collect();
        let q = engine().resolve(100.0, 200.0, &refs).unwrap();
        assert_eq!(q.date, d("2021-06-01"));
        assert_eq!(q.rows.len(), 2);
    }

    #[test]
    fn vertical_position_never_filters_rows() {
        let rows = [CaseRecord::new("US", "United States", d("2021-06-01"), 1.0)];
        let refs: Vec<&CaseRecord> = rows.iter().collect();
        let eng = engine();
        let above = eng.resolve(100.0, -500.0, &refs).unwrap();
        let below = eng.resolve(100.0, 9000.0, &refs).unwrap();
        assert_eq!(above.rows.len(), below.rows.len());
    }
}
