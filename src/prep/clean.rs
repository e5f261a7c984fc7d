//! Record cleaning: date/metric coercion and metric imputation.
//!
//! Rules:
//! - a record whose `business_date` does not parse is removed (dates are never imputed)
//! - a record whose `metric_value` does not parse is invalid; with `ImputePolicy::Mean`
//!   it is kept and filled with the mean of all parsed metrics in the batch, with
//!   `ImputePolicy::Drop` it is removed
//! - per-record parse failures never leave this module; they only show up in the
//!   `CleanReport` counts

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::domain::{CleanRecord, CleanReport, ImputePolicy, RawDate, RawRecord, RawScalar};
use crate::error::ForecastError;
use crate::math::mean;

const DATETIME_FMTS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

// ISO first; the remaining formats show up in spreadsheet exports.
const DATE_FMTS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y", "%d-%m-%Y"];

/// Clean a batch of raw records.
///
/// The output preserves input order. Its length is at most the input length.
pub fn clean_records(raw: &[RawRecord], policy: ImputePolicy) -> (Vec<CleanRecord>, CleanReport) {
    let mut report = CleanReport {
        rows_read: raw.len(),
        ..CleanReport::default()
    };

    // First pass: coerce both fields, keep only rows with a valid date.
    let mut dated: Vec<(NaiveDate, Option<f64>)> = Vec::with_capacity(raw.len());
    for (idx, record) in raw.iter().enumerate() {
        let date = match parse_business_date(&record.business_date) {
            Ok(d) => d,
            Err(e) => {
                tracing::debug!(row = idx, error = %e, "dropping record with unparseable date");
                report.nan_dates += 1;
                continue;
            }
        };
        match parse_metric(&record.metric_value) {
            Ok(v) => {
                report.parsed_ok += 1;
                dated.push((date, Some(v)));
            }
            Err(e) => {
                tracing::debug!(row = idx, error = %e, "invalid metric");
                report.nan_metrics += 1;
                dated.push((date, None));
            }
        }
    }

    let fill_value = match policy {
        ImputePolicy::Drop => None,
        ImputePolicy::Mean => {
            let parsed: Vec<f64> = dated.iter().filter_map(|(_, v)| *v).collect();
            mean(&parsed)
        }
    };
    report.fill_value = fill_value;

    if policy == ImputePolicy::Mean && fill_value.is_none() && report.nan_metrics > 0 {
        tracing::warn!(
            invalid = report.nan_metrics,
            "no metric parsed in this batch; invalid metrics cannot be imputed and are dropped"
        );
    }

    let mut out = Vec::with_capacity(dated.len());
    for (business_date, value) in dated {
        let metric_value = match (value, fill_value) {
            (Some(v), _) => v,
            (None, Some(fill)) => {
                report.imputed += 1;
                fill
            }
            (None, None) => continue,
        };
        out.push(CleanRecord {
            business_date,
            metric_value,
        });
    }
    report.dropped = report.rows_read - out.len();

    tracing::info!(
        rows_read = report.rows_read,
        kept = out.len(),
        nan_dates = report.nan_dates,
        nan_metrics = report.nan_metrics,
        imputed = report.imputed,
        "cleaned records"
    );

    (out, report)
}

/// Coerce a raw date into a calendar date. Time-of-day is discarded.
pub fn parse_business_date(raw: &RawDate) -> Result<NaiveDate, ForecastError> {
    let text = match raw {
        RawDate::Date(d) => return Ok(*d),
        RawDate::DateTime(dt) => return Ok(dt.date()),
        RawDate::Missing => return Err(parse_error("business_date", "")),
        RawDate::Text(s) => s.trim(),
    };
    if text.is_empty() {
        return Err(parse_error("business_date", text));
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Ok(dt.date_naive());
    }
    for fmt in DATETIME_FMTS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, fmt) {
            return Ok(dt.date());
        }
    }
    for fmt in DATE_FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(text, fmt) {
            return Ok(d);
        }
    }
    Err(parse_error("business_date", text))
}

/// Coerce a raw metric into a finite real number.
pub fn parse_metric(raw: &RawScalar) -> Result<f64, ForecastError> {
    let value = match raw {
        RawScalar::Number(v) => *v,
        RawScalar::Text(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| parse_error("metric_value", s))?,
        RawScalar::Missing => return Err(parse_error("metric_value", "")),
    };
    if value.is_finite() {
        Ok(value)
    } else {
        Err(parse_error("metric_value", &value.to_string()))
    }
}

fn parse_error(field: &'static str, value: &str) -> ForecastError {
    ForecastError::Parse {
        field,
        value: value.to_string(),
    }
}
