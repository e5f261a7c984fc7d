//! Reporting utilities: holdout accuracy and the forecast summary.

pub mod format;

pub use format::*;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{ForecastResult, PeriodAggregate};
use crate::math::{mae, mape, rmse};

/// Forecast error over the test window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Accuracy {
    /// Number of test periods compared.
    pub n: usize,
    pub mae: f64,
    pub rmse: f64,
    /// Percent; absent when some actual value is zero.
    pub mape: Option<f64>,
}

/// Compare the first `test.len()` forecast points with the test actuals.
///
/// `None` when there is no test window.
pub fn evaluate_holdout(test: &[PeriodAggregate], forecast: &ForecastResult) -> Option<Accuracy> {
    let n = test.len().min(forecast.len());
    if n == 0 {
        return None;
    }
    let actual: Vec<f64> = test[..n].iter().map(|p| p.mean_value).collect();
    let predicted: Vec<f64> = forecast.points[..n].iter().map(|p| p.forecast_value).collect();

    Some(Accuracy {
        n,
        mae: mae(&actual, &predicted)?,
        rmse: rmse(&actual, &predicted)?,
        mape: mape(&actual, &predicted),
    })
}

/// Headline numbers shown to the user: the last two horizon points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSummary {
    pub current_period: Option<NaiveDate>,
    pub current_value: Option<f64>,
    pub next_period: Option<NaiveDate>,
    pub next_value: Option<f64>,
}

impl ForecastSummary {
    pub fn from_forecast(forecast: &ForecastResult) -> Self {
        let current = forecast.current_period();
        let next = forecast.next_period();
        Self {
            current_period: current.map(|p| p.period_start),
            current_value: current.map(|p| p.forecast_value),
            next_period: next.map(|p| p.period_start),
            next_value: next.map(|p| p.forecast_value),
        }
    }

    /// `(current, next)` rendered with two decimals, `-` when absent.
    pub fn display_values(&self) -> (String, String) {
        (fmt_opt(self.current_value), fmt_opt(self.next_value))
    }
}

/// Two-decimal rendering used for every user-facing metric value.
pub fn fmt_value(v: f64) -> String {
    format!("{v:.2}")
}

fn fmt_opt(v: Option<f64>) -> String {
    v.map(fmt_value).unwrap_or_else(|| "-".to_string())
}
