//! The immutable case-count dataset and its derived groupings.
//!
//! Records are ingested once (leniently: a metric that fails to parse becomes
//! `0.0`, never an error) and shared read-only by all views afterwards.
//! Groupings by location code are derived views computed on demand; they are
//! never stored or mutated independently of the flat record sequence.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use serde::Deserialize;

/// Reserved code prefix marking continent aggregate rows (e.g. `OWID_EUR`).
pub const CONTINENT_PREFIX: &str = "OWID";

/// One time-stamped observation for one location.
#[derive(Debug, Clone, PartialEq)]
pub struct CaseRecord {
    /// Stable location identifier (ISO country code or continent aggregate).
    pub code: String,
    /// Human-readable location name.
    pub name: String,
    /// Observation day. All dataset keys are day-granular.
    pub date: NaiveDate,
    /// Cumulative cases per million inhabitants. Always `>= 0`.
    pub cases_per_million: f64,
}

impl CaseRecord {
    pub fn new(
        code: impl Into<String>,
        name: impl Into<String>,
        date: NaiveDate,
        cases_per_million: f64,
    ) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            date,
            // Invariant: the metric is non-negative. Negative or non-finite
            // inputs normalize to zero, same as missing values at ingest.
            cases_per_million: if cases_per_million.is_finite() {
                cases_per_million.max(0.0)
            } else {
                0.0
            },
        }
    }

    /// Whether this row belongs to a continent aggregate rather than a country.
    pub fn is_continent(&self) -> bool {
        self.code.starts_with(CONTINENT_PREFIX)
    }
}

/// CSV row layout of the source data (OWID export).
#[derive(Debug, Deserialize)]
struct RawRecord {
    iso_code: String,
    location: String,
    date: String,
    #[serde(default)]
    total_cases_per_million: String,
}

/// Flat, ordered, immutable-after-load sequence of [`CaseRecord`]s.
pub struct Dataset {
    records: Vec<CaseRecord>,
}

impl Dataset {
    pub fn new(records: Vec<CaseRecord>) -> Self {
        Self { records }
    }

    /// Ingest the OWID CSV layout from any reader.
    ///
    /// Lenient-ingest policy: a metric cell that fails to parse numerically is
    /// coerced to `0.0`. Rows whose date fails to parse are skipped, since a
    /// record without a day-granular key cannot participate in any view.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, String> {
        let mut rdr = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(reader);
        let mut records = Vec::new();
        for row in rdr.deserialize::<RawRecord>() {
            let raw = row.map_err(|e| e.to_string())?;
            let Ok(date) = NaiveDate::parse_from_str(raw.date.trim(), "%Y-%m-%d") else {
                continue;
            };
            records.push(CaseRecord::new(
                raw.iso_code.trim(),
                raw.location.trim(),
                date,
                parse_metric(&raw.total_cases_per_million),
            ));
        }
        Ok(Self::new(records))
    }

    /// Load a dataset from a CSV file on disk.
    pub fn from_csv_path(path: &Path) -> Result<Self, String> {
        let file = std::fs::File::open(path).map_err(|e| e.to_string())?;
        Self::from_csv_reader(std::io::BufReader::new(file))
    }

    pub fn records(&self) -> &[CaseRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// First and last observation day across all records.
    pub fn date_extent(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = self.records.iter().map(|r| r.date).min()?;
        let last = self.records.iter().map(|r| r.date).max()?;
        Some((first, last))
    }

    /// All continent aggregate rows, in dataset order.
    pub fn continent_rows(&self) -> Vec<&CaseRecord> {
        self.records.iter().filter(|r| r.is_continent()).collect()
    }

    /// All rows whose code is in `codes`, in dataset order.
    pub fn rows_for_codes<'a>(&'a self, codes: &[String]) -> Vec<&'a CaseRecord> {
        self.records
            .iter()
            .filter(|r| codes.iter().any(|c| c == &r.code))
            .collect()
    }

    /// Group rows by location code, preserving first-seen code order.
    ///
    /// This is a derived view; the order is what drives first-seen color
    /// assignment downstream, so it must be deterministic.
    pub fn group_by_code<'a>(rows: &[&'a CaseRecord]) -> Vec<(String, Vec<&'a CaseRecord>)> {
        let mut order: Vec<String> = Vec::new();
        let mut groups: HashMap<String, Vec<&CaseRecord>> = HashMap::new();
        for row in rows {
            if !groups.contains_key(&row.code) {
                order.push(row.code.clone());
            }
            groups.entry(row.code.clone()).or_default().push(row);
        }
        order
            .into_iter()
            .map(|code| {
                let rows = groups.remove(&code).unwrap_or_default();
                (code, rows)
            })
            .collect()
    }

    /// Maximum observed metric per location code (all locations).
    pub fn max_cases_by_code(&self) -> HashMap<String, f64> {
        let mut max: HashMap<String, f64> = HashMap::new();
        for r in &self.records {
            let entry = max.entry(r.code.clone()).or_insert(0.0);
            if r.cases_per_million > *entry {
                *entry = r.cases_per_million;
            }
        }
        max
    }

    /// Maximum observed metric across the whole dataset.
    pub fn global_max(&self) -> f64 {
        self.records
            .iter()
            .map(|r| r.cases_per_million)
            .fold(0.0, f64::max)
    }
}

fn parse_metric(raw: &str) -> f64 {
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => v.max(0.0),
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn metric_parse_is_lenient() {
        assert_eq!(parse_metric("123.5"), 123.5);
        assert_eq!(parse_metric(""), 0.0);
        assert_eq!(parse_metric("n/a"), 0.0);
        assert_eq!(parse_metric("-4.0"), 0.0);
        assert_eq!(parse_metric("inf"), 0.0);
    }

    #[test]
    fn record_normalizes_negative_metric() {
        let r = CaseRecord::new("US", "United States", d("2021-06-01"), -1.0);
        assert_eq!(r.cases_per_million, 0.0);
    }

    #[test]
    fn group_order_is_first_seen() {
        let rows = vec![
            CaseRecord::new("CA", "Canada", d("2021-01-01"), 1.0),
            CaseRecord::new("US", "United States", d("2021-01-01"), 2.0),
            CaseRecord::new("CA", "Canada", d("2021-01-02"), 3.0),
        ];
        let refs: Vec<&CaseRecord> = rows.iter().collect();
        let groups = Dataset::group_by_code(&refs);
        let codes: Vec<&str> = groups.iter().map(|(c, _)| c.as_str()).collect();
        assert_eq!(codes, vec!["CA", "US"]);
        assert_eq!(groups[0].1.len(), 2);
    }
}
