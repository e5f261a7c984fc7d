//! Holt / additive Holt-Winters recursions.
//!
//! Error-correction form, with `m` the seasonal period:
//!
//! ```text
//! ŷ_t = l_{t-1} + b_{t-1} + s_{t-m}
//! l_t = α (y_t - s_{t-m}) + (1 - α)(l_{t-1} + b_{t-1})
//! b_t = β (l_t - l_{t-1}) + (1 - β) b_{t-1}
//! s_t = γ (y_t - l_{t-1} - b_{t-1}) + (1 - γ) s_{t-m}
//! ŷ_{T+h} = l_T + h b_T + s_{T+h-m(k+1)}
//! ```
//!
//! Without a seasonal component every `s` term is zero. The model only sees positions
//! `0..n`; calendar dates are attached by the caller.

use serde::{Deserialize, Serialize};

use crate::domain::SmoothingParams;
use crate::error::ForecastError;
use crate::math::fit_line;

/// Level, trend and seasonal state.
///
/// `seasonal[j]` holds the latest seasonal estimate for positions `t` with `t % m == j`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoltState {
    pub level: f64,
    pub trend: f64,
    pub seasonal: Vec<f64>,
}

/// Result of running the recursion over a series.
#[derive(Debug, Clone)]
pub struct FilterOutput {
    pub state: HoltState,
    /// One-step-ahead predictions, aligned with the input.
    pub fitted: Vec<f64>,
    pub sse: f64,
}

/// Number of leading observations used to seed a non-seasonal model.
const INIT_WINDOW: usize = 10;

/// Pre-sample state (the state "at t = -1").
///
/// - non-seasonal: least squares line over the first few observations; with exactly
///   two points this reduces to `b = y1 - y0`, `l = y0 - b`
/// - seasonal: trend from the difference of the first two cycle means, level from the
///   first cycle mean, seasonal indices as the mean detrended value per position,
///   centered to sum to 0
pub fn initial_state(values: &[f64], seasonal_period: Option<usize>) -> Result<HoltState, ForecastError> {
    let n = values.len();
    let Some(m) = seasonal_period else {
        if n < 2 {
            return Err(ForecastError::fit(format!(
                "additive trend needs at least 2 observations, got {n}"
            )));
        }
        let window = &values[..n.min(INIT_WINDOW)];
        let xs: Vec<f64> = (0..window.len()).map(|i| i as f64).collect();
        let (intercept, slope) = fit_line(&xs, window)
            .ok_or_else(|| ForecastError::fit("could not initialize level/trend"))?;
        return Ok(HoltState {
            level: intercept - slope,
            trend: slope,
            seasonal: Vec::new(),
        });
    };

    if m < 2 {
        return Err(ForecastError::fit(format!("seasonal period must be >= 2, got {m}")));
    }
    if n < 2 * m {
        return Err(ForecastError::fit(format!(
            "seasonal period {m} needs at least {} observations (two full cycles), got {n}",
            2 * m
        )));
    }

    let mf = m as f64;
    let mean_1 = values[..m].iter().sum::<f64>() / mf;
    let mean_2 = values[m..2 * m].iter().sum::<f64>() / mf;
    let trend = (mean_2 - mean_1) / mf;
    // `mean_1` is the level at the middle of the first cycle.
    let mid = (mf - 1.0) / 2.0;
    let line = |t: usize| mean_1 + trend * (t as f64 - mid);

    let mut seasonal: Vec<f64> = (0..m)
        .map(|j| ((values[j] - line(j)) + (values[j + m] - line(j + m))) / 2.0)
        .collect();
    let center = seasonal.iter().sum::<f64>() / mf;
    for s in &mut seasonal {
        *s -= center;
    }

    Ok(HoltState {
        level: line(0) - trend,
        trend,
        seasonal,
    })
}

/// Run the recursion from `init` over `values`.
pub fn filter(values: &[f64], init: &HoltState, params: &SmoothingParams) -> FilterOutput {
    let alpha = params.alpha;
    let beta = params.beta;
    let gamma = params.gamma.unwrap_or(0.0);
    let m = init.seasonal.len();

    let mut level = init.level;
    let mut trend = init.trend;
    let mut seasonal = init.seasonal.clone();
    let mut fitted = Vec::with_capacity(values.len());
    let mut sse = 0.0;

    for (t, &y) in values.iter().enumerate() {
        let s = if m > 0 { seasonal[t % m] } else { 0.0 };
        let y_hat = level + trend + s;
        fitted.push(y_hat);
        let err = y - y_hat;
        sse += err * err;

        let level_prev = level;
        let trend_prev = trend;
        level = alpha * (y - s) + (1.0 - alpha) * (level_prev + trend_prev);
        trend = beta * (level - level_prev) + (1.0 - beta) * trend_prev;
        if m > 0 {
            seasonal[t % m] = gamma * (y - level_prev - trend_prev) + (1.0 - gamma) * s;
        }
    }

    FilterOutput {
        state: HoltState {
            level,
            trend,
            seasonal,
        },
        fitted,
        sse,
    }
}

/// Point forecasts for positions `n_obs .. n_obs + horizon`.
pub fn project(state: &HoltState, n_obs: usize, horizon: usize) -> Vec<f64> {
    let m = state.seasonal.len();
    (1..=horizon)
        .map(|h| {
            let s = if m > 0 { state.seasonal[(n_obs + h - 1) % m] } else { 0.0 };
            state.level + h as f64 * state.trend + s
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(alpha: f64, beta: f64, gamma: Option<f64>) -> SmoothingParams {
        SmoothingParams { alpha, beta, gamma }
    }

    #[test]
    fn linear_series_is_tracked_exactly() {
        let values: Vec<f64> = (1..=7).map(|v| v as f64).collect();
        let init = initial_state(&values, None).unwrap();
        let out = filter(&values, &init, &params(0.4, 0.2, None));

        assert!(out.sse < 1e-20);
        let fc = project(&out.state, values.len(), 3);
        for (got, want) in fc.iter().zip([8.0, 9.0, 10.0]) {
            assert!((got - want).abs() < 1e-9, "{got} vs {want}");
        }
    }

    #[test]
    fn two_points_seed_exact_trend() {
        let init = initial_state(&[3.0, 5.0], None).unwrap();
        assert!((init.trend - 2.0).abs() < 1e-12);
        assert!((init.level - 1.0).abs() < 1e-12);
    }

    #[test]
    fn non_seasonal_needs_two_points() {
        let err = initial_state(&[1.0], None).unwrap_err();
        assert!(matches!(err, ForecastError::ModelFit { .. }));
    }

    #[test]
    fn seasonal_needs_two_cycles() {
        let values = vec![1.0; 23];
        let err = initial_state(&values, Some(12)).unwrap_err();
        assert!(err.to_string().contains("two full cycles"));
    }

    #[test]
    fn seasonal_init_recovers_pattern() {
        let pattern = [3.0, -1.0, -2.0, 0.0];
        let values: Vec<f64> = (0..12).map(|t| 10.0 + 0.5 * t as f64 + pattern[t % 4]).collect();
        let init = initial_state(&values, Some(4)).unwrap();

        assert!((init.trend - 0.5).abs() < 1e-9, "trend {}", init.trend);
        for (got, want) in init.seasonal.iter().zip(pattern) {
            assert!((got - want).abs() < 1e-9, "{got} vs {want}");
        }
        // One-step prediction at t = 0 is level + trend + s_0.
        assert!((init.level + init.trend + init.seasonal[0] - values[0]).abs() < 1e-9);
    }

    #[test]
    fn seasonal_projection_repeats_pattern() {
        let state = HoltState {
            level: 10.0,
            trend: 0.0,
            seasonal: vec![1.0, -1.0, 0.0],
        };
        // Six observations seen: next position is 6, which has phase 0.
        let fc = project(&state, 6, 4);
        assert_eq!(fc, vec![11.0, 9.0, 10.0, 11.0]);
    }
}
