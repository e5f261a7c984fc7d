//! Synthetic metric source.
//!
//! Generates a daily metric with a linear trend, an optional yearly cycle and Gaussian
//! noise. A share of rows gets an unparseable metric (`N/A`) or date so that demos and
//! tests exercise the cleaner. The output depends only on the configuration (seeded RNG).

use std::f64::consts::TAU;

use chrono::{Datelike, Duration, NaiveDate};
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::data::RecordSource;
use crate::domain::{RawDate, RawRecord, RawScalar};
use crate::error::AppError;

#[derive(Debug, Clone, PartialEq)]
pub struct SampleConfig {
    pub seed: u64,
    pub start: NaiveDate,
    pub days: usize,
    /// Metric level on `start`.
    pub base: f64,
    pub trend_per_day: f64,
    /// Amplitude of the yearly sine cycle (0 disables it).
    pub seasonal_amplitude: f64,
    pub noise_sd: f64,
    /// Share of rows whose metric is written as `N/A`.
    pub missing_metric_share: f64,
    /// Share of rows whose date cannot be parsed.
    pub bad_date_share: f64,
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            start: NaiveDate::from_ymd_opt(2021, 1, 1).unwrap_or_default(),
            days: 3 * 365,
            base: 1000.0,
            trend_per_day: 0.5,
            seasonal_amplitude: 80.0,
            noise_sd: 25.0,
            missing_metric_share: 0.02,
            bad_date_share: 0.01,
        }
    }
}

impl SampleConfig {
    fn validate(&self) -> Result<(), AppError> {
        if self.days == 0 {
            return Err(AppError::new(2, "Sample day count must be > 0."));
        }
        for (name, share) in [
            ("missing metric share", self.missing_metric_share),
            ("bad date share", self.bad_date_share),
        ] {
            if !(share.is_finite() && (0.0..=1.0).contains(&share)) {
                return Err(AppError::new(2, format!("Sample {name} must be in [0, 1], got {share}.")));
            }
        }
        if !(self.noise_sd.is_finite() && self.noise_sd >= 0.0) {
            return Err(AppError::new(2, "Sample noise must be finite and >= 0."));
        }
        if !(self.base.is_finite() && self.trend_per_day.is_finite() && self.seasonal_amplitude.is_finite()) {
            return Err(AppError::new(2, "Sample level, trend and amplitude must be finite."));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct SampleSource {
    config: SampleConfig,
}

impl SampleSource {
    pub fn new(config: SampleConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SampleConfig {
        &self.config
    }
}

impl RecordSource for SampleSource {
    fn describe(&self) -> String {
        format!("sample:seed={},days={}", self.config.seed, self.config.days)
    }

    fn fetch(&self) -> Result<Vec<RawRecord>, AppError> {
        generate_sample(&self.config)
    }
}

pub fn generate_sample(config: &SampleConfig) -> Result<Vec<RawRecord>, AppError> {
    config.validate()?;

    let mut rng = StdRng::seed_from_u64(config.seed);
    let noise = Normal::new(0.0, config.noise_sd)
        .map_err(|e| AppError::new(2, format!("Noise distribution error: {e}")))?;

    let mut rows = Vec::with_capacity(config.days);
    for day in 0..config.days {
        let date = config
            .start
            .checked_add_signed(Duration::days(day as i64))
            .ok_or_else(|| AppError::new(2, "Sample date range overflows the calendar."))?;

        let cycle = (TAU * f64::from(date.ordinal0()) / 365.25).sin();
        let value = config.base
            + config.trend_per_day * day as f64
            + config.seasonal_amplitude * cycle
            + noise.sample(&mut rng);

        let metric_roll: f64 = rng.r#gen();
        let date_roll: f64 = rng.r#gen();

        let metric_value = if metric_roll < config.missing_metric_share {
            RawScalar::Text("N/A".to_string())
        } else {
            RawScalar::Text(format!("{value:.2}"))
        };
        let business_date = if date_roll < config.bad_date_share {
            RawDate::Text(format!("{}-13-45", date.year()))
        } else {
            RawDate::Text(date.format("%Y-%m-%d").to_string())
        };

        let region = if day % 2 == 0 { "north" } else { "south" };
        rows.push(
            RawRecord {
                business_date,
                metric_value,
                dimensions: Default::default(),
            }
            .with_dimension("region", region),
        );
    }

    tracing::info!(rows = rows.len(), seed = config.seed, "generated sample rows");
    Ok(rows)
}
