//! Shared forecast pipeline used by both CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! fetch -> clean -> aggregate -> split -> fit/forecast -> holdout evaluation
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).

use crate::data::RecordSource;
use crate::domain::{CleanReport, ForecastConfig, ForecastResult, RawRecord, Series, Split};
use crate::error::{AppError, ForecastError, Stage};
use crate::fit::{forecast_split, HoltFit};
use crate::prep::{aggregate, clean_records, split_series};
use crate::report::{evaluate_holdout, Accuracy, ForecastSummary};

/// All computed outputs of a single forecast run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub clean_report: CleanReport,
    pub series: Series,
    pub split: Split,
    pub model: HoltFit,
    pub forecast: ForecastResult,
    pub accuracy: Option<Accuracy>,
    pub summary: ForecastSummary,
}

/// Fetch rows from `source` and run the pipeline on them.
pub fn run_forecast(source: &dyn RecordSource, config: &ForecastConfig) -> Result<(Vec<RawRecord>, RunOutput), AppError> {
    let records = source.fetch()?;
    tracing::info!(source = %source.describe(), rows = records.len(), "fetched records");
    let run = run_pipeline(&records, config)?;
    Ok((records, run))
}

/// Execute the full pipeline on already-fetched rows.
///
/// This is useful for the TUI where we want to refit without re-fetching.
pub fn run_pipeline(records: &[RawRecord], config: &ForecastConfig) -> Result<RunOutput, ForecastError> {
    config.validate()?;

    let (clean, clean_report) = clean_records(records, config.impute_policy);
    let series = aggregate(&clean, config.aggregation_frequency).map_err(|e| e.with_rows_read(records.len()))?;
    let split = split_series(&series, config.train_fraction)?;

    let required = config.min_train_len();
    if split.train.len() < required {
        return Err(ForecastError::InsufficientTrainingData {
            stage: Stage::Fit,
            series_len: series.len(),
            train_len: split.train.len(),
            required,
        });
    }

    let run = forecast_split(&split, config)?;
    let accuracy = evaluate_holdout(&split.test, &run.forecast);
    let summary = ForecastSummary::from_forecast(&run.forecast);

    Ok(RunOutput {
        clean_report,
        series,
        split,
        model: run.model,
        forecast: run.forecast,
        accuracy,
        summary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::MemorySource;
    use crate::domain::{Frequency, ImputePolicy, RawScalar};

    fn monthly(values: &[f64]) -> Vec<RawRecord> {
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| RawRecord::new(format!("{}-{:02}-15", 2023 + i / 12, i % 12 + 1), v))
            .collect()
    }

    #[test]
    fn constant_series_forecasts_flat() {
        let run = run_pipeline(&monthly(&[5.0; 10]), &ForecastConfig::default()).unwrap();
        assert_eq!(run.split.train.len(), 7);
        assert_eq!(run.forecast.len(), 5);
        for p in &run.forecast.points {
            assert!((p.forecast_value - 5.0).abs() < 1e-6, "{}", p.forecast_value);
        }
        let acc = run.accuracy.unwrap();
        assert_eq!(acc.n, 3);
        assert!(acc.mae < 1e-6);
    }

    #[test]
    fn linear_series_continues_trend_from_train() {
        let values: Vec<f64> = (1..=10).map(f64::from).collect();
        let run = run_pipeline(&monthly(&values), &ForecastConfig::default()).unwrap();

        assert_eq!(run.split.train.values(), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
        assert_eq!(run.split.test.len(), 3);
        let got: Vec<f64> = run.forecast.points.iter().map(|p| p.forecast_value).collect();
        for (g, want) in got.iter().zip([8.0, 9.0, 10.0, 11.0, 12.0]) {
            assert!((g - want).abs() < 1e-6, "{g} vs {want}");
        }
        // Forecasts over the test window match the actuals.
        assert!(run.accuracy.unwrap().rmse < 1e-6);

        let (current, next) = run.summary.display_values();
        assert_eq!((current.as_str(), next.as_str()), ("11.00", "12.00"));
    }

    #[test]
    fn na_metric_is_imputed_with_mean() {
        let mut records = monthly(&[10.0, 20.0, 30.0, 40.0]);
        // Second record of January, unparseable metric.
        records.push(RawRecord::new("2023-01-20", "N/A"));
        let config = ForecastConfig {
            train_fraction: 1.0,
            ..ForecastConfig::default()
        };
        let run = run_pipeline(&records, &config).unwrap();

        assert_eq!(run.clean_report.imputed, 1);
        assert_eq!(run.clean_report.fill_value, Some(25.0));
        let jan = run.series.periods()[0];
        assert_eq!(jan.count, 2);
        assert!((jan.mean_value - 17.5).abs() < 1e-12);
    }

    #[test]
    fn na_metric_dropped_under_drop_policy() {
        let mut records = monthly(&[10.0, 20.0, 30.0, 40.0]);
        records.push(RawRecord::new("2023-01-20", RawScalar::Text("N/A".into())));
        let config = ForecastConfig {
            train_fraction: 1.0,
            impute_policy: ImputePolicy::Drop,
            ..ForecastConfig::default()
        };
        let run = run_pipeline(&records, &config).unwrap();
        let jan = run.series.periods()[0];
        assert_eq!(jan.count, 1);
        assert_eq!(jan.mean_value, 10.0);
        assert_eq!(run.clean_report.dropped, 1);
    }

    #[test]
    fn empty_input_fails_before_split() {
        let err = run_pipeline(&[], &ForecastConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            ForecastError::EmptySeries {
                stage: Stage::Aggregate,
                rows_read: 0,
                rows_clean: 0
            }
        ));
    }

    #[test]
    fn all_invalid_rows_report_rows_read() {
        let records = vec![RawRecord::new("garbage", 1.0), RawRecord::new("2024-01-01", "N/A")];
        let err = run_pipeline(&records, &ForecastConfig::default()).unwrap_err();
        assert!(matches!(err, ForecastError::EmptySeries { rows_read: 2, .. }), "{err}");
    }

    #[test]
    fn two_periods_are_not_enough_to_train() {
        let err = run_pipeline(&monthly(&[1.0, 2.0]), &ForecastConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            ForecastError::InsufficientTrainingData {
                train_len: 1,
                required: 2,
                ..
            }
        ));
        assert_eq!(AppError::from(err).exit_code(), 3);
    }

    #[test]
    fn seasonal_needs_two_cycles_in_train() {
        let values: Vec<f64> = (0..30).map(f64::from).collect();
        let config = ForecastConfig {
            seasonal_enabled: true,
            ..ForecastConfig::default()
        };
        let err = run_pipeline(&monthly(&values), &config).unwrap_err();
        assert!(matches!(
            err,
            ForecastError::InsufficientTrainingData {
                stage: Stage::Fit,
                train_len: 21,
                required: 24,
                ..
            }
        ));
    }

    #[test]
    fn seasonal_run_on_enough_history() {
        let pattern = [5.0, 3.0, 0.0, -2.0, -4.0, -2.0];
        let values: Vec<f64> = (0..36).map(|t| 100.0 + t as f64 + pattern[t % 6]).collect();
        let config = ForecastConfig {
            seasonal_enabled: true,
            seasonal_period: 6,
            grid_steps: 8,
            refine_rounds: 1,
            ..ForecastConfig::default()
        };
        let run = run_pipeline(&monthly(&values), &config).unwrap();
        assert_eq!(run.model.seasonal_period(), Some(6));
        assert_eq!(run.forecast.len(), run.split.test.len() + 2);
        assert!(run.accuracy.unwrap().mape.unwrap() < 5.0);
    }

    #[test]
    fn quarterly_aggregation() {
        let values: Vec<f64> = (0..24).map(f64::from).collect();
        let config = ForecastConfig {
            aggregation_frequency: Frequency::Quarter,
            ..ForecastConfig::default()
        };
        let run = run_pipeline(&monthly(&values), &config).unwrap();
        assert_eq!(run.series.len(), 8);
        assert_eq!(run.series.periods()[0].count, 3);
    }

    #[test]
    fn long_refinement_completes() {
        let values: Vec<f64> = (0..40).map(|t| 100.0 + 1.5 * t as f64 + ((t * 37) % 7) as f64).collect();
        let config = ForecastConfig {
            refine_rounds: 30,
            ..ForecastConfig::default()
        };
        let run = run_pipeline(&monthly(&values), &config).unwrap();
        assert_eq!(run.forecast.len(), 12 + 2);
    }

    #[test]
    fn pipeline_is_idempotent() {
        let values: Vec<f64> = (0..40).map(|t| 50.0 + (t * 37 % 11) as f64).collect();
        let records = monthly(&values);
        let a = run_pipeline(&records, &ForecastConfig::default()).unwrap();
        let b = run_pipeline(&records, &ForecastConfig::default()).unwrap();
        assert_eq!(a.forecast, b.forecast);
        assert_eq!(a.model.params, b.model.params);
    }

    #[test]
    fn invalid_config_rejected() {
        let config = ForecastConfig {
            train_fraction: 0.0,
            ..ForecastConfig::default()
        };
        let err = run_pipeline(&monthly(&[1.0, 2.0, 3.0]), &config).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn run_forecast_fetches_from_source() {
        let values: Vec<f64> = (1..=10).map(f64::from).collect();
        let source = MemorySource::new("fixture", monthly(&values));
        let (records, run) = run_forecast(&source, &ForecastConfig::default()).unwrap();
        assert_eq!(records.len(), 10);
        assert_eq!(run.series.len(), 10);
    }
}
