//! Data preparation stages ahead of model fitting.
//!
//! - record cleaning + imputation (`clean`)
//! - calendar bucketing (`aggregate`)
//! - train/test partitioning (`split`)

pub mod aggregate;
pub mod clean;
pub mod split;

pub use aggregate::*;
pub use clean::*;
pub use split::*;
