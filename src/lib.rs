//! `metric-forecast` library crate.
//!
//! The binary (`mf`) is a thin wrapper around this library so that:
//!
//! - the pipeline is testable without spawning processes
//! - record sources can be swapped (CSV, HTTP, in-memory, synthetic)
//! - presentation (terminal report, TUI) stays out of the forecasting code

pub mod app;
pub mod cli;
pub mod data;
pub mod debug;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod plot;
pub mod prep;
pub mod report;
pub mod tui;
