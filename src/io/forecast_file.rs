//! Read/write forecast JSON files.
//!
//! The forecast file is the "portable" representation of a run:
//! - the aggregated history the model saw
//! - the fitted smoothing parameters and holdout accuracy
//! - the dated forecast points and the headline summary
//!
//! It is a report, not a model: `mf plot --file` re-renders it, nothing refits from it.

use std::fs::File;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::app::pipeline::RunOutput;
use crate::domain::{ForecastConfig, ForecastResult, PeriodAggregate, SmoothingParams};
use crate::error::AppError;
use crate::report::{Accuracy, ForecastSummary};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastFile {
    pub tool: String,
    pub source: String,
    pub train_fraction: f64,
    pub train_len: usize,
    pub seasonal_period: Option<usize>,
    pub params: SmoothingParams,
    pub accuracy: Option<Accuracy>,
    pub summary: ForecastSummary,
    pub history: Vec<PeriodAggregate>,
    pub forecast: ForecastResult,
}

impl ForecastFile {
    pub fn from_run(source: &str, run: &RunOutput, config: &ForecastConfig) -> Self {
        Self {
            tool: "mf".to_string(),
            source: source.to_string(),
            train_fraction: config.train_fraction,
            train_len: run.split.train.len(),
            seasonal_period: run.model.seasonal_period(),
            params: run.model.params,
            accuracy: run.accuracy,
            summary: run.summary.clone(),
            history: run.series.periods().to_vec(),
            forecast: run.forecast.clone(),
        }
    }
}

/// Write a forecast JSON file.
pub fn write_forecast_json(path: &Path, file: &ForecastFile) -> Result<(), AppError> {
    let out = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create forecast JSON '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(out, file)
        .map_err(|e| AppError::new(2, format!("Failed to write forecast JSON: {e}")))?;
    tracing::info!(path = %path.display(), "wrote forecast json");
    Ok(())
}

/// Read a forecast JSON file.
pub fn read_forecast_json(path: &Path) -> Result<ForecastFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open forecast JSON '{}': {e}", path.display())))?;
    serde_json::from_reader(file).map_err(|e| AppError::new(2, format!("Invalid forecast JSON: {e}")))
}
