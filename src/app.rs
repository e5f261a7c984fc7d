//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and sets up logging
//! - builds the record source
//! - runs the forecast pipeline
//! - prints reports/plots
//! - writes optional exports

use std::path::Path;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cli::{Command, ForecastArgs, PlotArgs};
use crate::data::{CsvSource, HttpSource, RecordSource, SampleConfig, SampleSource};
use crate::domain::ForecastConfig;
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `mf` binary.
pub fn run() -> Result<(), AppError> {
    let cli = crate::cli::Cli::parse();

    let is_tui = matches!(cli.command, Command::Tui(_));
    init_tracing(cli.verbose, is_tui);

    match cli.command {
        Command::Forecast(args) => handle_forecast(args),
        Command::Plot(args) => handle_plot(args),
        Command::Tui(args) => crate::tui::run(args),
    }
}

/// Logs go to stderr. The TUI owns the terminal, so it only logs when `RUST_LOG` asks.
fn init_tracing(verbose: bool, is_tui: bool) {
    let from_env = EnvFilter::try_from_default_env().ok();
    if is_tui && from_env.is_none() {
        return;
    }
    let filter = from_env.unwrap_or_else(|| EnvFilter::new(if verbose { "debug" } else { "warn" }));

    // A second init (tests, embedding) is harmless; keep the first subscriber.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false).with_writer(std::io::stderr))
        .try_init();
}

fn handle_forecast(args: ForecastArgs) -> Result<(), AppError> {
    let config = fit_config_from_args(&args);
    config.validate()?;

    let source = build_source(&args)?;
    let source_label = source.describe();
    let (_, run) = pipeline::run_forecast(source.as_ref(), &config)?;

    println!("{}", crate::report::format_run_summary(&source_label, &run, &config));
    println!("{}", crate::report::format_forecast_table(&run));

    if args.plot && !args.no_plot {
        let plot = crate::plot::render_ascii_plot(run.series.periods(), &run.forecast, args.width, args.height);
        println!("{plot}");
    }

    // Optional exports.
    if let Some(path) = &args.export_csv {
        crate::io::write_forecast_csv(path, &run)?;
    }
    if let Some(path) = &args.export_json {
        let file = crate::io::ForecastFile::from_run(&source_label, &run, &config);
        crate::io::write_forecast_json(path, &file)?;
    }
    if args.debug {
        let path = crate::debug::write_debug_bundle(Path::new("debug"), &source_label, &run, &config)?;
        eprintln!("Debug bundle written to {}", path.display());
    }

    Ok(())
}

fn handle_plot(args: PlotArgs) -> Result<(), AppError> {
    let file = crate::io::read_forecast_json(&args.file)?;

    let (current, next) = file.summary.display_values();
    println!("Source: {} | current={current} next={next}", file.source);
    let plot = crate::plot::render_ascii_plot(&file.history, &file.forecast, args.width, args.height);
    println!("{plot}");
    Ok(())
}

/// Build the record source selected on the command line.
pub fn build_source(args: &ForecastArgs) -> Result<Box<dyn RecordSource>, AppError> {
    if let Some(path) = &args.source.csv {
        let source = CsvSource::new(path).with_columns(&args.date_column, &args.metric_column);
        return Ok(Box::new(source));
    }
    if let Some(url) = &args.source.url {
        let url = (!url.is_empty()).then(|| url.clone());
        let source = HttpSource::from_env(url)?.with_columns(args.date_column.clone(), args.metric_column.clone());
        return Ok(Box::new(source));
    }
    Ok(Box::new(SampleSource::new(SampleConfig {
        seed: args.seed,
        days: args.sample_days,
        ..SampleConfig::default()
    })))
}

pub fn fit_config_from_args(args: &ForecastArgs) -> ForecastConfig {
    ForecastConfig {
        train_fraction: args.train_fraction,
        seasonal_enabled: args.seasonal,
        seasonal_period: args
            .seasonal_period
            .unwrap_or_else(|| args.frequency.default_seasonal_period()),
        extra_forecast_periods: args.extra_periods,
        aggregation_frequency: args.frequency,
        impute_policy: args.impute,
        grid_steps: args.grid_steps,
        refine_rounds: args.refine_rounds,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use crate::domain::Frequency;

    fn forecast_args(argv: &[&str]) -> ForecastArgs {
        let mut full = vec!["mf", "forecast"];
        full.extend_from_slice(argv);
        match Cli::try_parse_from(full).unwrap().command {
            Command::Forecast(args) => args,
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn config_from_default_args_matches_default_config() {
        assert_eq!(fit_config_from_args(&forecast_args(&[])), ForecastConfig::default());
    }

    #[test]
    fn seasonal_period_follows_frequency() {
        let config = fit_config_from_args(&forecast_args(&["--seasonal", "-f", "quarter"]));
        assert_eq!(config.aggregation_frequency, Frequency::Quarter);
        assert_eq!(config.seasonal(), Some(4));

        let config = fit_config_from_args(&forecast_args(&["--seasonal", "--seasonal-period", "6"]));
        assert_eq!(config.seasonal(), Some(6));
    }

    #[test]
    fn source_selection() {
        assert!(build_source(&forecast_args(&[])).unwrap().describe().starts_with("sample:"));
        let csv = build_source(&forecast_args(&["--csv", "metrics.csv"])).unwrap();
        assert_eq!(csv.describe(), "csv:metrics.csv");
        let http = build_source(&forecast_args(&["--url", "http://localhost:9/rows"])).unwrap();
        assert_eq!(http.describe(), "http:http://localhost:9/rows");
    }
}
