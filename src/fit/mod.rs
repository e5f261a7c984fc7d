//! Model fitting and forecasting.
//!
//! Responsibilities:
//!
//! - Holt / additive Holt-Winters recursions (`holt`)
//! - smoothing parameter grids (`param_grid`)
//! - deterministic parameter estimation (`fitter`)
//! - horizon arithmetic and calendar alignment of forecasts (`forecaster`)

pub mod fitter;
pub mod forecaster;
pub mod holt;
pub mod param_grid;

pub use fitter::*;
pub use forecaster::*;
pub use holt::*;
pub use param_grid::*;
