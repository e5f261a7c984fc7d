//! Debug bundle writer for inspecting one forecast run end to end.
//!
//! The bundle is a markdown file with cleaning counts, every period aggregate, the
//! train/test boundary, the fitted state and the forecast points.

use std::fmt::Write as _;
use std::fs::create_dir_all;
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::app::pipeline::RunOutput;
use crate::domain::ForecastConfig;
use crate::error::AppError;
use crate::report::fmt_value;

/// Write the bundle under `dir` and return its path.
pub fn write_debug_bundle(dir: &Path, source: &str, run: &RunOutput, config: &ForecastConfig) -> Result<PathBuf, AppError> {
    create_dir_all(dir).map_err(|e| AppError::new(4, format!("Failed to create debug dir: {e}")))?;

    let ts = Local::now().format("%Y%m%d_%H%M%S");
    let path = dir.join(format!("mf_debug_{}_{ts}.md", run.series.last().period_start.format("%Y%m%d")));

    let text = render_debug_bundle(source, run, config);
    std::fs::write(&path, text).map_err(|e| AppError::new(4, format!("Failed to write debug file: {e}")))?;
    tracing::info!(path = %path.display(), "wrote debug bundle");
    Ok(path)
}

/// Markdown body of the bundle.
pub fn render_debug_bundle(source: &str, run: &RunOutput, config: &ForecastConfig) -> String {
    let mut s = String::new();
    // Writing to a String cannot fail.
    let _ = write_body(&mut s, source, run, config);
    s
}

fn write_body(s: &mut String, source: &str, run: &RunOutput, config: &ForecastConfig) -> std::fmt::Result {
    writeln!(s, "# mf debug bundle")?;
    writeln!(s, "- generated: {}", Local::now().to_rfc3339())?;
    writeln!(s, "- source: {source}")?;
    writeln!(
        s,
        "- config: train_fraction={} seasonal={} period={} extra_periods={} frequency={} impute={:?} grid_steps={} refine_rounds={}",
        config.train_fraction,
        config.seasonal_enabled,
        config.seasonal_period,
        config.extra_forecast_periods,
        config.aggregation_frequency.label(),
        config.impute_policy,
        config.grid_steps,
        config.refine_rounds
    )?;

    let r = &run.clean_report;
    writeln!(s, "\n## Cleaning")?;
    writeln!(s, "| rows_read | parsed_ok | nan_dates | nan_metrics | imputed | dropped | fill_value |")?;
    writeln!(s, "| - | - | - | - | - | - | - |")?;
    writeln!(
        s,
        "| {} | {} | {} | {} | {} | {} | {} |",
        r.rows_read,
        r.parsed_ok,
        r.nan_dates,
        r.nan_metrics,
        r.imputed,
        r.dropped,
        r.fill_value.map(fmt_value).unwrap_or_else(|| "-".to_string())
    )?;

    writeln!(s, "\n## Period aggregates")?;
    writeln!(s, "| period_start | mean_value | count | set |")?;
    writeln!(s, "| - | - | - | - |")?;
    let train_len = run.split.train.len();
    for (i, p) in run.series.periods().iter().enumerate() {
        let set = if i < train_len { "train" } else { "test" };
        writeln!(s, "| {} | {:.4} | {} | {set} |", p.period_start, p.mean_value, p.count)?;
    }

    let m = &run.model;
    writeln!(s, "\n## Model")?;
    writeln!(s, "- alpha: {:.6}", m.params.alpha)?;
    writeln!(s, "- beta: {:.6}", m.params.beta)?;
    if let Some(g) = m.params.gamma {
        writeln!(s, "- gamma: {g:.6}")?;
    }
    writeln!(s, "- level: {:.6}", m.state.level)?;
    writeln!(s, "- trend: {:.6}", m.state.trend)?;
    if !m.state.seasonal.is_empty() {
        let parts: Vec<String> = m.state.seasonal.iter().map(|v| format!("{v:.6}")).collect();
        writeln!(s, "- seasonal: [{}]", parts.join(", "))?;
    }
    writeln!(s, "- sse: {:.6}, rmse: {:.6}, n: {}", m.sse, m.rmse, m.n_obs)?;
    if let Some(acc) = &run.accuracy {
        writeln!(
            s,
            "- holdout: n={} mae={:.6} rmse={:.6} mape={}",
            acc.n,
            acc.mae,
            acc.rmse,
            acc.mape.map(|v| format!("{v:.4}%")).unwrap_or_else(|| "n/a".to_string())
        )?;
    }

    writeln!(s, "\n## Forecast")?;
    writeln!(s, "| step | period_start | forecast | actual |")?;
    writeln!(s, "| - | - | - | - |")?;
    for (i, p) in run.forecast.points.iter().enumerate() {
        let actual = run
            .split
            .test
            .get(i)
            .map(|t| format!("{:.4}", t.mean_value))
            .unwrap_or_else(|| "-".to_string());
        writeln!(s, "| {} | {} | {:.4} | {actual} |", i + 1, p.period_start, p.forecast_value)?;
    }
    Ok(())
}
