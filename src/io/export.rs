//! Export the run to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream scripts.
//! One row per period: training periods carry the in-sample one-step prediction, test
//! and future periods carry the forecast.

use std::path::Path;

use serde::Serialize;

use crate::app::pipeline::RunOutput;
use crate::error::AppError;

#[derive(Debug, Serialize)]
struct ExportRow {
    period_start: String,
    actual: Option<String>,
    forecast: String,
    kind: &'static str,
}

/// Write the per-period results of `run` to a CSV file.
pub fn write_forecast_csv(path: &Path, run: &RunOutput) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;

    let train = run.split.train.periods().iter().zip(&run.model.fitted).map(|(p, fitted)| ExportRow {
        period_start: p.period_start.to_string(),
        actual: Some(format!("{:.4}", p.mean_value)),
        forecast: format!("{fitted:.4}"),
        kind: "train",
    });
    let horizon = run.forecast.points.iter().enumerate().map(|(i, p)| {
        let actual = run.split.test.get(i).map(|t| format!("{:.4}", t.mean_value));
        ExportRow {
            period_start: p.period_start.to_string(),
            kind: if actual.is_some() { "test" } else { "future" },
            actual,
            forecast: format!("{:.4}", p.forecast_value),
        }
    });

    for row in train.chain(horizon) {
        writer
            .serialize(row)
            .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
    }
    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush export CSV: {e}")))?;

    tracing::info!(path = %path.display(), "wrote forecast csv");
    Ok(())
}
