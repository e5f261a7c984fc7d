//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - raw and cleaned records (`RawRecord`, `CleanRecord`)
//! - the aggregated series and its split (`Series`, `Split`)
//! - forecast outputs and run configuration (`ForecastResult`, `ForecastConfig`)

pub mod types;

pub use types::*;
