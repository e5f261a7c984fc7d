//! Parameter estimation for the Holt / Holt-Winters model.
//!
//! Given a training series `y_0..y_{n-1}` we:
//! - build the pre-sample state (`holt::initial_state`)
//! - evaluate one-step-ahead SSE on a coarse (α, β[, γ]) grid (parallel)
//! - zoom into the best cell a few times
//!
//! and keep the lowest-SSE candidate. Ties go to the earliest grid index, so the
//! result does not depend on thread scheduling.

use rayon::prelude::*;

use crate::domain::{ForecastConfig, SmoothingParams};
use crate::error::ForecastError;
use crate::fit::holt::{filter, initial_state, project, HoltState};
use crate::fit::param_grid::{coarse_grid, zoom_grid, PARAM_MAX, PARAM_MIN};

const MIN_ZOOM_HALF_WIDTH: f64 = 1e-12;

/// Options that affect how the model is calibrated.
#[derive(Debug, Clone, PartialEq)]
pub struct FitOptions {
    /// Additive seasonal component with this period, if any.
    pub seasonal_period: Option<usize>,
    /// Points per axis of the coarse grid.
    pub grid_steps: usize,
    /// Zoom passes after the coarse grid.
    pub refine_rounds: usize,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            seasonal_period: None,
            grid_steps: 20,
            refine_rounds: 3,
        }
    }
}

impl From<&ForecastConfig> for FitOptions {
    fn from(config: &ForecastConfig) -> Self {
        Self {
            seasonal_period: config.seasonal(),
            grid_steps: config.grid_steps,
            refine_rounds: config.refine_rounds,
        }
    }
}

/// A fitted model: coefficients, final state and in-sample diagnostics.
#[derive(Debug, Clone)]
pub struct HoltFit {
    pub params: SmoothingParams,
    pub state: HoltState,
    pub n_obs: usize,
    pub sse: f64,
    pub rmse: f64,
    pub fitted: Vec<f64>,
}

impl HoltFit {
    pub fn seasonal_period(&self) -> Option<usize> {
        (!self.state.seasonal.is_empty()).then_some(self.state.seasonal.len())
    }

    /// Point forecasts for the `horizon` positions after the training data.
    pub fn forecast(&self, horizon: usize) -> Vec<f64> {
        project(&self.state, self.n_obs, horizon)
    }
}

#[derive(Debug, Clone)]
struct Candidate {
    idx: usize,
    params: Vec<f64>,
    sse: f64,
}

/// Fit the model on `values` (ordered, position-indexed).
pub fn fit_holt(values: &[f64], opts: &FitOptions) -> Result<HoltFit, ForecastError> {
    if values.iter().any(|v| !v.is_finite()) {
        return Err(ForecastError::fit("training series contains non-finite values"));
    }
    if opts.grid_steps < 2 {
        return Err(ForecastError::fit("grid steps must be >= 2"));
    }

    let init = initial_state(values, opts.seasonal_period)?;
    let dims = if opts.seasonal_period.is_some() { 3 } else { 2 };

    let grid = coarse_grid(dims, opts.grid_steps)?;
    let mut best = search(values, &init, &grid).ok_or_else(|| {
        ForecastError::fit("no parameter combination produced a finite error")
    })?;

    let mut half_width = (PARAM_MAX - PARAM_MIN) / (opts.grid_steps as f64 - 1.0);
    for round in 0..opts.refine_rounds {
        // Past this width the zoom window collapses to a point in f64.
        if half_width < MIN_ZOOM_HALF_WIDTH {
            tracing::debug!(round, "zoom window exhausted; stopping refinement");
            break;
        }
        let grid = zoom_grid(&best.params, half_width, opts.grid_steps)?;
        if let Some(c) = search(values, &init, &grid) {
            // Only move on strict improvement so exact fits keep the coarse winner.
            if c.sse < best.sse {
                best = c;
            }
        }
        half_width = 2.0 * half_width / (opts.grid_steps as f64 - 1.0);
    }

    let params = to_params(&best.params);
    let out = filter(values, &init, &params);
    let n = values.len();
    let rmse = (out.sse / n as f64).sqrt();

    tracing::debug!(
        alpha = params.alpha,
        beta = params.beta,
        gamma = ?params.gamma,
        sse = out.sse,
        n,
        "fitted smoothing parameters"
    );

    Ok(HoltFit {
        params,
        state: out.state,
        n_obs: n,
        sse: out.sse,
        rmse,
        fitted: out.fitted,
    })
}

fn search(values: &[f64], init: &HoltState, grid: &[Vec<f64>]) -> Option<Candidate> {
    let candidates: Vec<Candidate> = grid
        .par_iter()
        .enumerate()
        .filter_map(|(idx, p)| {
            let sse = filter(values, init, &to_params(p)).sse;
            sse.is_finite().then(|| Candidate {
                idx,
                params: p.clone(),
                sse,
            })
        })
        .collect();

    // Deterministic selection: pick the minimum SSE; break ties by grid index.
    let mut iter = candidates.into_iter();
    let mut best = iter.next()?;
    for c in iter {
        if c.sse < best.sse || (c.sse == best.sse && c.idx < best.idx) {
            best = c;
        }
    }
    Some(best)
}

fn to_params(p: &[f64]) -> SmoothingParams {
    SmoothingParams {
        alpha: p[0],
        beta: p[1],
        gamma: p.get(2).copied(),
    }
}
