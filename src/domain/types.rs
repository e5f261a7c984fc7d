//! Shared domain types.
//!
//! These types are value objects: each pipeline run builds them fresh from the
//! record source and hands them from stage to stage without mutation.

use std::collections::BTreeMap;

use chrono::{Datelike, Months, NaiveDate, NaiveDateTime};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::{ForecastError, Stage};

/// Raw `business_date` as delivered by a record source.
#[derive(Debug, Clone, PartialEq)]
pub enum RawDate {
    Text(String),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Missing,
}

impl From<&str> for RawDate {
    fn from(value: &str) -> Self {
        RawDate::Text(value.to_string())
    }
}

impl From<String> for RawDate {
    fn from(value: String) -> Self {
        RawDate::Text(value)
    }
}

impl From<NaiveDate> for RawDate {
    fn from(value: NaiveDate) -> Self {
        RawDate::Date(value)
    }
}

impl From<NaiveDateTime> for RawDate {
    fn from(value: NaiveDateTime) -> Self {
        RawDate::DateTime(value)
    }
}

/// Raw `metric_value`: a number, a numeric-like string, or nothing.
#[derive(Debug, Clone, PartialEq)]
pub enum RawScalar {
    Number(f64),
    Text(String),
    Missing,
}

impl From<f64> for RawScalar {
    fn from(value: f64) -> Self {
        RawScalar::Number(value)
    }
}

impl From<&str> for RawScalar {
    fn from(value: &str) -> Self {
        RawScalar::Text(value.to_string())
    }
}

impl From<String> for RawScalar {
    fn from(value: String) -> Self {
        RawScalar::Text(value)
    }
}

/// One row as read from the record source.
///
/// Dimension fields are carried along for reporting but never used by forecasting.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    pub business_date: RawDate,
    pub metric_value: RawScalar,
    pub dimensions: BTreeMap<String, String>,
}

impl RawRecord {
    pub fn new(business_date: impl Into<RawDate>, metric_value: impl Into<RawScalar>) -> Self {
        Self {
            business_date: business_date.into(),
            metric_value: metric_value.into(),
            dimensions: BTreeMap::new(),
        }
    }

    pub fn with_dimension(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.dimensions.insert(name.into(), value.into());
        self
    }
}

/// A record whose date and metric are both valid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CleanRecord {
    pub business_date: NaiveDate,
    pub metric_value: f64,
}

/// Counts collected while cleaning. Informational only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CleanReport {
    pub rows_read: usize,
    /// Rows whose date and metric both parsed.
    pub parsed_ok: usize,
    pub nan_dates: usize,
    pub nan_metrics: usize,
    /// Invalid metrics replaced by `fill_value`.
    pub imputed: usize,
    /// Rows removed for any reason (bad date, or bad metric without a fill value).
    pub dropped: usize,
    pub fill_value: Option<f64>,
}

/// How to treat records whose metric does not parse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ImputePolicy {
    /// Keep the record and replace its metric with the batch mean.
    #[default]
    Mean,
    /// Remove the record.
    Drop,
}

/// Calendar bucket used by the aggregator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    #[default]
    Month,
    Quarter,
    Year,
}

impl Frequency {
    /// Number of calendar months in one period.
    pub fn months(self) -> u32 {
        match self {
            Frequency::Month => 1,
            Frequency::Quarter => 3,
            Frequency::Year => 12,
        }
    }

    /// Natural seasonal cycle length in periods.
    pub fn default_seasonal_period(self) -> usize {
        match self {
            Frequency::Month => 12,
            Frequency::Quarter => 4,
            Frequency::Year => 1,
        }
    }

    /// First day of the bucket containing `date`.
    pub fn period_start(self, date: NaiveDate) -> NaiveDate {
        let month0 = date.month0();
        let bucket_month0 = month0 - month0 % self.months();
        // Day 1 of an existing month in an existing year is always valid.
        NaiveDate::from_ymd_opt(date.year(), bucket_month0 + 1, 1).unwrap_or(date)
    }

    /// Start of the period `steps` buckets after `start`.
    pub fn advance(self, start: NaiveDate, steps: usize) -> Option<NaiveDate> {
        let months = u32::try_from(steps).ok()?.checked_mul(self.months())?;
        start.checked_add_months(Months::new(months))
    }

    pub fn label(self) -> &'static str {
        match self {
            Frequency::Month => "month",
            Frequency::Quarter => "quarter",
            Frequency::Year => "year",
        }
    }
}

/// Mean metric value of one calendar bucket.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeriodAggregate {
    pub period_start: NaiveDate,
    pub mean_value: f64,
    /// Number of clean records averaged into this bucket.
    pub count: usize,
}

/// Non-empty, strictly increasing sequence of period aggregates.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    frequency: Frequency,
    periods: Vec<PeriodAggregate>,
}

impl Series {
    pub fn new(frequency: Frequency, periods: Vec<PeriodAggregate>) -> Result<Self, ForecastError> {
        if periods.is_empty() {
            return Err(ForecastError::EmptySeries {
                stage: Stage::Aggregate,
                rows_read: 0,
                rows_clean: 0,
            });
        }
        for p in &periods {
            if frequency.period_start(p.period_start) != p.period_start {
                return Err(ForecastError::Config(format!(
                    "period {} is not the start of a {}",
                    p.period_start,
                    frequency.label()
                )));
            }
        }
        if periods.windows(2).any(|w| w[0].period_start >= w[1].period_start) {
            return Err(ForecastError::Config(
                "series periods must be strictly increasing".to_string(),
            ));
        }
        Ok(Self { frequency, periods })
    }

    /// Build a contiguous series from plain values, one per period from `start`.
    pub fn from_values(frequency: Frequency, start: NaiveDate, values: &[f64]) -> Result<Self, ForecastError> {
        let start = frequency.period_start(start);
        let periods = values
            .iter()
            .enumerate()
            .map(|(i, &v)| {
                let period_start = frequency
                    .advance(start, i)
                    .ok_or_else(|| ForecastError::Config("period date out of range".to_string()))?;
                Ok(PeriodAggregate {
                    period_start,
                    mean_value: v,
                    count: 1,
                })
            })
            .collect::<Result<Vec<_>, ForecastError>>()?;
        Self::new(frequency, periods)
    }

    pub fn frequency(&self) -> Frequency {
        self.frequency
    }

    pub fn periods(&self) -> &[PeriodAggregate] {
        &self.periods
    }

    pub fn len(&self) -> usize {
        self.periods.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }

    pub fn values(&self) -> Vec<f64> {
        self.periods.iter().map(|p| p.mean_value).collect()
    }

    pub fn last(&self) -> &PeriodAggregate {
        // Non-empty by construction.
        &self.periods[self.periods.len() - 1]
    }
}

/// Training prefix and test suffix of a series.
#[derive(Debug, Clone, PartialEq)]
pub struct Split {
    pub train: Series,
    pub test: Vec<PeriodAggregate>,
}

impl Split {
    pub fn frequency(&self) -> Frequency {
        self.train.frequency()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub period_start: NaiveDate,
    pub forecast_value: f64,
}

/// Point forecasts for the periods immediately after the training window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    pub frequency: Frequency,
    pub points: Vec<ForecastPoint>,
}

impl ForecastResult {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Second-to-last horizon point.
    pub fn current_period(&self) -> Option<&ForecastPoint> {
        let n = self.points.len();
        if n < 2 { None } else { self.points.get(n - 2) }
    }

    /// Last horizon point.
    pub fn next_period(&self) -> Option<&ForecastPoint> {
        self.points.last()
    }
}

/// Smoothing coefficients of a fitted model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SmoothingParams {
    /// Level.
    pub alpha: f64,
    /// Trend.
    pub beta: f64,
    /// Seasonal (only when a seasonal component is fitted).
    pub gamma: Option<f64>,
}

/// A full run's configuration as understood by the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastConfig {
    pub train_fraction: f64,
    pub seasonal_enabled: bool,
    pub seasonal_period: usize,
    pub extra_forecast_periods: usize,
    pub aggregation_frequency: Frequency,
    pub impute_policy: ImputePolicy,
    /// Points per parameter axis of the coarse search grid.
    pub grid_steps: usize,
    /// Number of zoomed refinement passes after the coarse grid.
    pub refine_rounds: usize,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            train_fraction: 0.7,
            seasonal_enabled: false,
            seasonal_period: 12,
            extra_forecast_periods: 2,
            aggregation_frequency: Frequency::Month,
            impute_policy: ImputePolicy::Mean,
            grid_steps: 20,
            refine_rounds: 3,
        }
    }
}

impl ForecastConfig {
    pub fn validate(&self) -> Result<(), ForecastError> {
        if !(self.train_fraction.is_finite() && self.train_fraction > 0.0 && self.train_fraction <= 1.0) {
            return Err(ForecastError::Config(format!(
                "train_fraction must be in (0, 1], got {}",
                self.train_fraction
            )));
        }
        if self.seasonal_enabled && self.seasonal_period < 2 {
            return Err(ForecastError::Config(format!(
                "seasonal_period must be >= 2 when seasonality is enabled, got {}",
                self.seasonal_period
            )));
        }
        if self.grid_steps < 2 {
            return Err(ForecastError::Config("grid_steps must be >= 2".to_string()));
        }
        Ok(())
    }

    /// Seasonal cycle length, if a seasonal component is requested.
    pub fn seasonal(&self) -> Option<usize> {
        self.seasonal_enabled.then_some(self.seasonal_period)
    }

    /// Fewest training points the configured model can be fit on.
    pub fn min_train_len(&self) -> usize {
        match self.seasonal() {
            Some(m) => 2 * m,
            None => 2,
        }
    }
}
