//! Error types.
//!
//! Two layers:
//!
//! - `ForecastError`: typed failures of the core pipeline stages (clean, aggregate,
//!   split, fit). These carry enough context to diagnose a run without re-running it.
//! - `AppError`: what the binary reports. It pairs a message with a process exit code
//!   and is also used by I/O, record sources and the TUI.

use std::fmt;

/// Pipeline stage that produced an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Source,
    Clean,
    Aggregate,
    Split,
    Fit,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Source => "source",
            Stage::Clean => "clean",
            Stage::Aggregate => "aggregate",
            Stage::Split => "split",
            Stage::Fit => "fit",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ForecastError {
    /// A single field could not be coerced. Handled inside the cleaner.
    #[error("could not parse {field} value '{value}'")]
    Parse { field: &'static str, value: String },

    #[error("{stage}: series is empty ({rows_read} rows read, {rows_clean} clean records)")]
    EmptySeries {
        stage: Stage,
        rows_read: usize,
        rows_clean: usize,
    },

    #[error(
        "{stage}: insufficient training data ({train_len} of {series_len} periods in train, need at least {required})"
    )]
    InsufficientTrainingData {
        stage: Stage,
        series_len: usize,
        train_len: usize,
        required: usize,
    },

    #[error("{stage}: model fit failed: {reason}")]
    ModelFit { stage: Stage, reason: String },

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ForecastError {
    pub(crate) fn fit(reason: impl Into<String>) -> Self {
        ForecastError::ModelFit {
            stage: Stage::Fit,
            reason: reason.into(),
        }
    }

    /// Attach the number of raw rows to an `EmptySeries` error.
    ///
    /// The aggregator only sees clean records; the pipeline knows how many rows the
    /// source returned.
    pub fn with_rows_read(self, rows: usize) -> Self {
        match self {
            ForecastError::EmptySeries {
                stage, rows_clean, ..
            } => ForecastError::EmptySeries {
                stage,
                rows_read: rows,
                rows_clean,
            },
            other => other,
        }
    }

    /// Process exit code used when this error aborts the binary.
    pub fn exit_code(&self) -> u8 {
        match self {
            ForecastError::Parse { .. } | ForecastError::Config(_) => 2,
            ForecastError::EmptySeries { .. } | ForecastError::InsufficientTrainingData { .. } => 3,
            ForecastError::ModelFit { .. } => 4,
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<ForecastError> for AppError {
    fn from(err: ForecastError) -> Self {
        AppError::new(err.exit_code(), err.to_string())
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl fmt::Debug for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_series_carries_rows_read() {
        let err = ForecastError::EmptySeries {
            stage: Stage::Aggregate,
            rows_read: 0,
            rows_clean: 0,
        }
        .with_rows_read(12);
        assert_eq!(
            err.to_string(),
            "aggregate: series is empty (12 rows read, 0 clean records)"
        );
    }

    #[test]
    fn exit_codes_follow_error_kind() {
        let app: AppError = ForecastError::fit("diverged").into();
        assert_eq!(app.exit_code(), 4);
        assert_eq!(app.to_string(), "fit: model fit failed: diverged");

        let app: AppError = ForecastError::InsufficientTrainingData {
            stage: Stage::Split,
            series_len: 1,
            train_len: 0,
            required: 1,
        }
        .into();
        assert_eq!(app.exit_code(), 3);
    }
}
