//! From a train/test split to dated point forecasts.
//!
//! The model itself is position-indexed. Here we fix the horizon
//! (`|test| + extra_forecast_periods`) and attach calendar periods, starting with the
//! period right after the last training period.

use crate::domain::{ForecastConfig, ForecastPoint, ForecastResult, Split};
use crate::error::ForecastError;
use crate::fit::fitter::{fit_holt, FitOptions, HoltFit};

/// Fitted model plus its dated forecasts.
#[derive(Debug, Clone)]
pub struct ForecastRun {
    pub model: HoltFit,
    pub forecast: ForecastResult,
}

/// Number of forecast points produced for `split`.
pub fn horizon(split: &Split, extra_forecast_periods: usize) -> usize {
    split.test.len() + extra_forecast_periods
}

/// Fit on `split.train` and forecast the test window plus the extra periods.
pub fn forecast_split(split: &Split, config: &ForecastConfig) -> Result<ForecastRun, ForecastError> {
    let values = split.train.values();
    let model = fit_holt(&values, &FitOptions::from(config))?;

    let h = horizon(split, config.extra_forecast_periods);
    let frequency = split.frequency();
    let last_train = split.train.last().period_start;

    let points = model
        .forecast(h)
        .into_iter()
        .enumerate()
        .map(|(i, forecast_value)| {
            if !forecast_value.is_finite() {
                return Err(ForecastError::fit(format!(
                    "non-finite forecast at horizon step {}",
                    i + 1
                )));
            }
            let period_start = frequency
                .advance(last_train, i + 1)
                .ok_or_else(|| ForecastError::fit("forecast period date out of range"))?;
            Ok(ForecastPoint {
                period_start,
                forecast_value,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    tracing::info!(horizon = h, train = split.train.len(), "forecast complete");

    Ok(ForecastRun {
        model,
        forecast: ForecastResult { frequency, points },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Frequency, Series};
    use crate::prep::split_series;
    use chrono::NaiveDate;

    fn d(y: i32, m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, 1).unwrap()
    }

    #[test]
    fn forecast_points_are_contiguous_after_train() {
        for n in 3..=40usize {
            let values: Vec<f64> = (0..n).map(|i| 10.0 + (i % 5) as f64).collect();
            let series = Series::from_values(Frequency::Month, d(2020, 11), &values).unwrap();
            let split = split_series(&series, 0.7).unwrap();
            let run = forecast_split(&split, &ForecastConfig::default()).unwrap();

            let points = &run.forecast.points;
            assert_eq!(points.len(), split.test.len() + 2, "n={n}");
            let mut expected = Frequency::Month.advance(split.train.last().period_start, 1).unwrap();
            for p in points {
                assert_eq!(p.period_start, expected, "n={n}");
                expected = Frequency::Month.advance(expected, 1).unwrap();
            }
            // Forecast dates for the test window line up with the test periods.
            for (p, t) in points.iter().zip(&split.test) {
                assert_eq!(p.period_start, t.period_start);
            }
        }
    }

    #[test]
    fn quarterly_dates() {
        let series = Series::from_values(Frequency::Quarter, d(2023, 1), &[1.0, 2.0, 3.0, 4.0]).unwrap();
        let split = split_series(&series, 0.5).unwrap();
        let config = ForecastConfig {
            aggregation_frequency: Frequency::Quarter,
            extra_forecast_periods: 1,
            ..ForecastConfig::default()
        };
        let run = forecast_split(&split, &config).unwrap();
        let starts: Vec<NaiveDate> = run.forecast.points.iter().map(|p| p.period_start).collect();
        assert_eq!(starts, vec![d(2023, 7), d(2023, 10), d(2024, 1)]);
        assert!((run.forecast.points[2].forecast_value - 5.0).abs() < 1e-6);
    }

    #[test]
    fn extra_periods_zero_and_no_test_gives_empty_forecast() {
        let series = Series::from_values(Frequency::Month, d(2024, 1), &[1.0, 2.0]).unwrap();
        let split = split_series(&series, 1.0).unwrap();
        let config = ForecastConfig {
            train_fraction: 1.0,
            extra_forecast_periods: 0,
            ..ForecastConfig::default()
        };
        let run = forecast_split(&split, &config).unwrap();
        assert!(run.forecast.is_empty());
    }
}
