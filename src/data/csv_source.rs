//! CSV record source.
//!
//! Reads a delimited export of the metric table. Only two columns matter to the
//! pipeline (business date and metric value); every other column is carried along as a
//! dimension. Values are handed over untouched so the cleaner sees exactly what the
//! file contained.

use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};

use csv::StringRecord;

use crate::data::RecordSource;
use crate::domain::{RawDate, RawRecord, RawScalar};
use crate::error::AppError;

pub const DEFAULT_DATE_COLUMN: &str = "business_date";
pub const DEFAULT_METRIC_COLUMN: &str = "metric_value";

#[derive(Debug, Clone)]
pub struct CsvSource {
    path: PathBuf,
    date_column: String,
    metric_column: String,
}

impl CsvSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            date_column: DEFAULT_DATE_COLUMN.to_string(),
            metric_column: DEFAULT_METRIC_COLUMN.to_string(),
        }
    }

    pub fn with_columns(mut self, date_column: impl AsRef<str>, metric_column: impl AsRef<str>) -> Self {
        self.date_column = normalize_header_name(date_column.as_ref());
        self.metric_column = normalize_header_name(metric_column.as_ref());
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordSource for CsvSource {
    fn describe(&self) -> String {
        format!("csv:{}", self.path.display())
    }

    fn fetch(&self) -> Result<Vec<RawRecord>, AppError> {
        let file = File::open(&self.path).map_err(|e| {
            AppError::new(2, format!("Failed to open CSV '{}': {e}", self.path.display()))
        })?;

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(file);

        let headers = reader
            .headers()
            .map_err(|e| AppError::new(2, format!("Failed to read CSV headers: {e}")))?
            .clone();
        let header_map = build_header_map(&headers);

        let date_idx = *header_map
            .get(&self.date_column)
            .ok_or_else(|| AppError::new(2, format!("Missing required column: `{}`", self.date_column)))?;
        let metric_idx = *header_map
            .get(&self.metric_column)
            .ok_or_else(|| AppError::new(2, format!("Missing required column: `{}`", self.metric_column)))?;

        let dimension_cols: Vec<(usize, String)> = headers
            .iter()
            .enumerate()
            .filter(|(idx, _)| *idx != date_idx && *idx != metric_idx)
            .map(|(idx, name)| (idx, normalize_header_name(name)))
            .collect();

        let mut rows = Vec::new();
        for (idx, result) in reader.records().enumerate() {
            // Header is line 1.
            let line = idx + 2;
            let record = result.map_err(|e| AppError::new(2, format!("CSV parse error on line {line}: {e}")))?;
            rows.push(to_raw_record(&record, date_idx, metric_idx, &dimension_cols));
        }

        tracing::info!(rows = rows.len(), path = %self.path.display(), "read csv source");
        Ok(rows)
    }
}

fn to_raw_record(
    record: &StringRecord,
    date_idx: usize,
    metric_idx: usize,
    dimension_cols: &[(usize, String)],
) -> RawRecord {
    let business_date = match record.get(date_idx) {
        Some(s) if !s.is_empty() => RawDate::Text(s.to_string()),
        _ => RawDate::Missing,
    };
    let metric_value = match record.get(metric_idx) {
        Some(s) if !s.is_empty() => RawScalar::Text(s.to_string()),
        _ => RawScalar::Missing,
    };
    let dimensions = dimension_cols
        .iter()
        .filter_map(|(idx, name)| record.get(*idx).map(|v| (name.clone(), v.to_string())))
        .collect();

    RawRecord {
        business_date,
        metric_value,
        dimensions,
    }
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports often prefix the first header with a UTF-8 BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(contents: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        f
    }

    #[test]
    fn reads_rows_and_dimensions() {
        let f = write_csv("\u{feff}Business_Date,Region,Metric_Value\n2024-01-15,EU,10.5\n2024-02-03,US,N/A\n,EU,\n");
        let rows = CsvSource::new(f.path()).fetch().unwrap();

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].business_date, RawDate::Text("2024-01-15".into()));
        assert_eq!(rows[0].metric_value, RawScalar::Text("10.5".into()));
        assert_eq!(rows[0].dimensions.get("region").map(String::as_str), Some("EU"));
        assert_eq!(rows[1].metric_value, RawScalar::Text("N/A".into()));
        assert_eq!(rows[2].business_date, RawDate::Missing);
        assert_eq!(rows[2].metric_value, RawScalar::Missing);
    }

    #[test]
    fn custom_column_names() {
        let f = write_csv("day,revenue\n2024-01-01,3\n");
        let rows = CsvSource::new(f.path())
            .with_columns("Day", "REVENUE")
            .fetch()
            .unwrap();
        assert_eq!(rows[0].metric_value, RawScalar::Text("3".into()));
        assert!(rows[0].dimensions.is_empty());
    }

    #[test]
    fn missing_column_is_a_config_error() {
        let f = write_csv("date,value\n2024-01-01,3\n");
        let err = CsvSource::new(f.path()).fetch().unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("business_date"));
    }

    #[test]
    fn missing_file_is_a_config_error() {
        let err = CsvSource::new("/nonexistent/metric.csv").fetch().unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
