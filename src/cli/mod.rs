//! Command-line parsing for the metric forecaster.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the forecasting code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{Frequency, ImputePolicy};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "mf", version, about = "Single-metric Holt-Winters forecaster")]
pub struct Cli {
    /// Log pipeline stages to stderr (debug level). `RUST_LOG` takes precedence.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch the metric, fit the model, print the forecast and optionally plot/export.
    Forecast(ForecastArgs),
    /// Plot a previously exported forecast JSON.
    Plot(PlotArgs),
    /// Launch the interactive TUI.
    ///
    /// This uses the same underlying pipeline as `mf forecast`, but renders results
    /// in a terminal UI using Ratatui.
    Tui(ForecastArgs),
}

/// Where the raw rows come from. Exactly one of these (or none: the sample source).
#[derive(Debug, Args, Clone, Default)]
#[group(multiple = false)]
pub struct SourceArgs {
    /// Read rows from a CSV file.
    #[arg(long, value_name = "FILE")]
    pub csv: Option<PathBuf>,

    /// Fetch rows as JSON over HTTP (falls back to METRIC_SOURCE_URL when given without a value).
    #[arg(long, value_name = "URL", num_args = 0..=1, default_missing_value = "")]
    pub url: Option<String>,

    /// Use the built-in synthetic sample (the default when no source is given).
    #[arg(long)]
    pub sample: bool,
}

/// Common options for forecasting.
#[derive(Debug, Args, Clone)]
pub struct ForecastArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Name of the date column.
    #[arg(long, default_value = "business_date")]
    pub date_column: String,

    /// Name of the metric column.
    #[arg(long, default_value = "metric_value")]
    pub metric_column: String,

    /// Seed for the synthetic sample.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Number of days in the synthetic sample.
    #[arg(long, default_value_t = 1095)]
    pub sample_days: usize,

    /// Leading share of periods used for training, in (0, 1].
    #[arg(short = 't', long, default_value_t = 0.7)]
    pub train_fraction: f64,

    /// Fit an additive seasonal component.
    #[arg(long)]
    pub seasonal: bool,

    /// Seasonal cycle length in periods (defaults to the frequency's natural cycle).
    #[arg(long)]
    pub seasonal_period: Option<usize>,

    /// Forecast periods beyond the test window.
    #[arg(short = 'e', long, default_value_t = 2)]
    pub extra_periods: usize,

    /// Calendar bucket for aggregation.
    #[arg(short = 'f', long, value_enum, default_value_t = Frequency::Month)]
    pub frequency: Frequency,

    /// How to treat rows whose metric does not parse.
    #[arg(long, value_enum, default_value_t = ImputePolicy::Mean)]
    pub impute: ImputePolicy,

    /// Points per axis of the parameter search grid.
    #[arg(long, default_value_t = 20)]
    pub grid_steps: usize,

    /// Zoomed refinement passes after the coarse grid.
    #[arg(long, default_value_t = 3)]
    pub refine_rounds: usize,

    /// Render an ASCII plot in the terminal (enabled by default).
    #[arg(long, default_value_t = true)]
    pub plot: bool,

    /// Disable the terminal plot.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,

    /// Export per-period results to CSV.
    #[arg(long = "export-csv")]
    pub export_csv: Option<PathBuf>,

    /// Export the forecast (history + params + points) to JSON.
    #[arg(long = "export-json")]
    pub export_json: Option<PathBuf>,

    /// Write a markdown debug bundle under `./debug`.
    #[arg(long)]
    pub debug: bool,
}

/// Options for plotting a saved forecast.
#[derive(Debug, Args)]
pub struct PlotArgs {
    /// Forecast JSON file produced by `mf forecast --export-json`.
    #[arg(long, value_name = "JSON")]
    pub file: PathBuf,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,
}
