//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the fitting code stays clean and testable
//! - output changes are localized (the golden tests below pin the layout)

use crate::app::pipeline::RunOutput;
use crate::domain::ForecastConfig;
use crate::report::fmt_value;

/// Format the full run summary (cleaning, split, model, accuracy, headline forecast).
pub fn format_run_summary(source: &str, run: &RunOutput, config: &ForecastConfig) -> String {
    let mut out = String::new();
    let r = &run.clean_report;

    out.push_str("=== mf - Metric Forecast ===\n");
    out.push_str(&format!("Source: {source}\n"));
    out.push_str(&format!(
        "Rows: read={} ok={} bad_dates={} bad_metrics={} imputed={} dropped={}\n",
        r.rows_read, r.parsed_ok, r.nan_dates, r.nan_metrics, r.imputed, r.dropped
    ));
    if let Some(fill) = r.fill_value {
        out.push_str(&format!("Fill value: {}\n", fmt_value(fill)));
    }

    let periods = run.series.periods();
    let first = periods.first().map(|p| p.period_start.to_string()).unwrap_or_default();
    out.push_str(&format!(
        "Series: {} {}s from {} to {}\n",
        run.series.len(),
        run.series.frequency().label(),
        first,
        run.series.last().period_start
    ));
    out.push_str(&format!(
        "Split: train={} test={} (train_fraction={})\n",
        run.split.train.len(),
        run.split.test.len(),
        config.train_fraction
    ));

    out.push_str("\nModel:\n");
    let kind = match run.model.seasonal_period() {
        Some(m) => format!("additive trend + additive seasonal (m={m})"),
        None => "additive trend".to_string(),
    };
    out.push_str(&format!("- {kind}\n"));
    let p = &run.model.params;
    match p.gamma {
        Some(g) => out.push_str(&format!("- alpha={:.4} beta={:.4} gamma={:.4}\n", p.alpha, p.beta, g)),
        None => out.push_str(&format!("- alpha={:.4} beta={:.4}\n", p.alpha, p.beta)),
    }
    out.push_str(&format!(
        "- in-sample SSE={} RMSE={}\n",
        fmt_value(run.model.sse),
        fmt_value(run.model.rmse)
    ));

    if let Some(acc) = &run.accuracy {
        let mape = acc.mape.map(|m| format!("{}%", fmt_value(m))).unwrap_or_else(|| "n/a".to_string());
        out.push_str(&format!(
            "- holdout n={} MAE={} RMSE={} MAPE={mape}\n",
            acc.n,
            fmt_value(acc.mae),
            fmt_value(acc.rmse)
        ));
    }

    let (current, next) = run.summary.display_values();
    out.push_str("\nForecast:\n");
    if let Some(d) = run.summary.current_period {
        out.push_str(&format!("- current period ({d}): {current}\n"));
    }
    if let Some(d) = run.summary.next_period {
        out.push_str(&format!("- next period ({d}): {next}\n"));
    }
    out.push('\n');

    out
}

/// Forecast table: one row per horizon point, with the actual value where known.
pub fn format_forecast_table(run: &RunOutput) -> String {
    let mut out = String::new();
    out.push_str(format!("{:<12} {:>12} {:>12} {:<6}\n", "period", "actual", "forecast", "kind").trim_end());
    out.push('\n');
    out.push_str(format!("{:-<12} {:-<12} {:-<12} {:-<6}\n", "", "", "", "").trim_end());
    out.push('\n');

    for (i, p) in run.forecast.points.iter().enumerate() {
        let (actual, kind) = match run.split.test.get(i) {
            Some(t) => (fmt_value(t.mean_value), "test"),
            None => ("".to_string(), "future"),
        };
        out.push_str(
            format!(
                "{:<12} {:>12} {:>12} {:<6}\n",
                p.period_start.to_string(),
                actual,
                fmt_value(p.forecast_value),
                kind
            )
            .trim_end(),
        );
        out.push('\n');
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::pipeline::run_pipeline;
    use crate::domain::RawRecord;

    fn run() -> RunOutput {
        let records: Vec<RawRecord> = (1..=10)
            .map(|m| RawRecord::new(format!("2024-{m:02}-10"), f64::from(m)))
            .collect();
        run_pipeline(&records, &ForecastConfig::default()).unwrap()
    }

    #[test]
    fn forecast_table_layout() {
        let table = format_forecast_table(&run());
        let expected = "\
period             actual     forecast kind
------------ ------------ ------------ ------
2024-08-01           8.00         8.00 test
2024-09-01           9.00         9.00 test
2024-10-01          10.00        10.00 test
2024-11-01                       11.00 future
2024-12-01                       12.00 future
";
        assert_eq!(table, expected);
    }

    #[test]
    fn summary_mentions_split_and_forecast() {
        let text = format_run_summary("fixture", &run(), &ForecastConfig::default());
        assert!(text.contains("Source: fixture"));
        assert!(text.contains("Series: 10 months from 2024-01-01 to 2024-10-01"));
        assert!(text.contains("Split: train=7 test=3"));
        assert!(text.contains("- current period (2024-11-01): 11.00"));
        assert!(text.contains("- next period (2024-12-01): 12.00"));
        assert!(!text.contains("gamma"));
    }
}
