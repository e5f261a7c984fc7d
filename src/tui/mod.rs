//! Ratatui-based terminal UI.
//!
//! The TUI fetches the metric rows once, then lets the user change the train
//! fraction, seasonality, forecast length and aggregation frequency. Every change refits
//! from the rows already in memory.

use std::io;
use std::time::Duration;

use chrono::{Datelike, NaiveDate};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
    Terminal,
};

use crate::app::pipeline::{run_pipeline, RunOutput};
use crate::cli::ForecastArgs;
use crate::data::RecordSource;
use crate::domain::{ForecastConfig, Frequency, RawRecord};
use crate::error::AppError;
use crate::report::fmt_value;

mod plotters_chart;

use plotters_chart::ForecastChart;

const FIELD_COUNT: usize = 4;
const TRAIN_FRACTION_STEP: f64 = 0.05;
const MAX_EXTRA_PERIODS: usize = 36;

/// Start the TUI.
pub fn run(args: ForecastArgs) -> Result<(), AppError> {
    let config = crate::app::fit_config_from_args(&args);
    config.validate()?;
    let source = crate::app::build_source(&args)?;

    // Fetch before taking over the terminal so source errors print normally.
    let records = source.fetch()?;
    let mut app = App::new(source.describe(), records, config);

    let _guard = TerminalGuard::new()?;
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(4, format!("Failed to initialize terminal: {e}")))?;

    app.source = Some(source);
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::new(4, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::new(4, format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

struct App {
    config: ForecastConfig,
    source_label: String,
    source: Option<Box<dyn RecordSource>>,
    records: Vec<RawRecord>,
    selected_field: usize,
    status: String,
    run: Option<RunOutput>,
}

impl App {
    fn new(source_label: String, records: Vec<RawRecord>, config: ForecastConfig) -> Self {
        let mut app = Self {
            config,
            source_label,
            source: None,
            records,
            selected_field: 0,
            status: String::new(),
            run: None,
        };
        app.refit();
        app
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(4, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::new(4, format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::new(4, format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Returns true when the user asked to quit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Up => {
                self.selected_field = self.selected_field.saturating_sub(1);
            }
            KeyCode::Down => {
                if self.selected_field + 1 < FIELD_COUNT {
                    self.selected_field += 1;
                }
            }
            KeyCode::Left => self.adjust_field(-1),
            KeyCode::Right => self.adjust_field(1),
            KeyCode::Char('s') => {
                if self.toggle_seasonal() {
                    self.refit();
                }
            }
            KeyCode::Char('r') => self.refetch(),
            KeyCode::Char('d') => self.write_debug(),
            _ => {}
        }
        false
    }

    fn adjust_field(&mut self, delta: i32) {
        match self.selected_field {
            0 => {
                let step = if delta >= 0 { TRAIN_FRACTION_STEP } else { -TRAIN_FRACTION_STEP };
                let next = (self.config.train_fraction + step).clamp(TRAIN_FRACTION_STEP, 1.0);
                // Keep the value on the 0.05 grid.
                self.config.train_fraction = (next * 100.0).round() / 100.0;
            }
            1 => {
                if !self.toggle_seasonal() {
                    return;
                }
            }
            2 => {
                self.config.extra_forecast_periods = if delta >= 0 {
                    (self.config.extra_forecast_periods + 1).min(MAX_EXTRA_PERIODS)
                } else {
                    self.config.extra_forecast_periods.saturating_sub(1)
                };
            }
            3 => {
                let freq = if delta >= 0 {
                    next_frequency(self.config.aggregation_frequency)
                } else {
                    prev_frequency(self.config.aggregation_frequency)
                };
                self.config.aggregation_frequency = freq;
                self.config.seasonal_period = freq.default_seasonal_period();
                if self.config.seasonal_period < 2 {
                    self.config.seasonal_enabled = false;
                }
            }
            _ => return,
        }
        self.refit();
    }

    /// Flip seasonality. Returns false when the current frequency has no cycle to model.
    fn toggle_seasonal(&mut self) -> bool {
        if !self.config.seasonal_enabled && self.config.seasonal_period < 2 {
            self.status = format!(
                "no seasonal cycle at {} frequency",
                self.config.aggregation_frequency.label()
            );
            return false;
        }
        self.config.seasonal_enabled = !self.config.seasonal_enabled;
        true
    }

    fn refit(&mut self) {
        match run_pipeline(&self.records, &self.config) {
            Ok(run) => {
                let (current, next) = run.summary.display_values();
                self.status = format!("current={current} next={next}");
                self.run = Some(run);
            }
            Err(err) => {
                tracing::warn!(error = %err, "refit failed");
                self.status = err.to_string();
                self.run = None;
            }
        }
    }

    fn refetch(&mut self) {
        let Some(source) = &self.source else {
            self.status = "No source to refresh.".to_string();
            return;
        };
        match source.fetch() {
            Ok(records) => {
                self.records = records;
                self.refit();
            }
            Err(err) => self.status = format!("Fetch failed: {err}"),
        }
    }

    fn write_debug(&mut self) {
        let Some(run) = &self.run else {
            self.status = "No forecast to dump.".to_string();
            return;
        };
        match crate::debug::write_debug_bundle(std::path::Path::new("debug"), &self.source_label, run, &self.config) {
            Ok(path) => self.status = format!("Wrote debug bundle: {}", path.display()),
            Err(err) => self.status = format!("Debug write failed: {err}"),
        }
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(5), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let mut lines: Vec<Line> = Vec::new();
        lines.push(Line::from(vec![
            Span::styled("mf", Style::default().fg(Color::Cyan)),
            Span::raw(format!(" metric forecast | {}", self.source_label)),
        ]));

        if let Some(run) = &self.run {
            let r = &run.clean_report;
            lines.push(Line::from(Span::styled(
                format!(
                    "rows={} imputed={} dropped={} | periods={} train={} test={}",
                    r.rows_read,
                    r.imputed,
                    r.dropped,
                    run.series.len(),
                    run.split.train.len(),
                    run.split.test.len()
                ),
                Style::default().fg(Color::Gray),
            )));

            let p = &run.model.params;
            let gamma = p.gamma.map(|g| format!(" gamma={g:.3}")).unwrap_or_default();
            let accuracy = run
                .accuracy
                .map(|a| format!(" | holdout MAE={} RMSE={}", fmt_value(a.mae), fmt_value(a.rmse)))
                .unwrap_or_default();
            lines.push(Line::from(Span::styled(
                format!("alpha={:.3} beta={:.3}{gamma}{accuracy}", p.alpha, p.beta),
                Style::default().fg(Color::Gray),
            )));
        }

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(0), Constraint::Length(30)])
            .split(area);

        self.draw_chart(frame, chunks[0]);

        let side = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(6), Constraint::Min(0)])
            .split(chunks[1]);
        self.draw_settings(frame, side[0]);
        self.draw_forecast_list(frame, side[1]);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Forecast").borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let Some(run) = &self.run else {
            let msg = Paragraph::new("No forecast (see status line).").style(Style::default().fg(Color::Yellow));
            frame.render_widget(msg, inner);
            return;
        };

        let data = chart_series(run);
        let widget = ForecastChart {
            history: &data.history,
            forecast: &data.forecast,
            split_at: data.split_at,
            x_bounds: data.x_bounds,
            y_bounds: data.y_bounds,
            x_label: "period",
            y_label: "metric".to_string(),
            fmt_x: fmt_axis_month,
            fmt_y: fmt_axis_y,
        };
        frame.render_widget(widget, inner);
    }

    fn draw_settings(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let seasonal = if self.config.seasonal_enabled {
            format!("on (m={})", self.config.seasonal_period)
        } else {
            "off".to_string()
        };
        let items = vec![
            ListItem::new(format!("Train: {:.2}", self.config.train_fraction)),
            ListItem::new(format!("Seasonal: {seasonal}")),
            ListItem::new(format!("Extra periods: {}", self.config.extra_forecast_periods)),
            ListItem::new(format!("Frequency: {}", self.config.aggregation_frequency.label())),
        ];

        let list = List::new(items)
            .block(Block::default().title("Settings").borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ratatui::widgets::ListState::default();
        state.select(Some(self.selected_field));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_forecast_list(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let items: Vec<ListItem> = self
            .run
            .as_ref()
            .map(|run| {
                run.forecast
                    .points
                    .iter()
                    .map(|p| ListItem::new(format!("{}  {:>12}", p.period_start, fmt_value(p.forecast_value))))
                    .collect()
            })
            .unwrap_or_default();
        let list = List::new(items).block(Block::default().title("Points").borders(Borders::ALL));
        frame.render_widget(list, area);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "↑/↓ select  ←/→ adjust  s seasonal  r refetch  d debug  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

/// Chart-ready series for one run.
#[derive(Debug, Clone, PartialEq)]
struct ChartData {
    history: Vec<(f64, f64)>,
    forecast: Vec<(f64, f64)>,
    split_at: Option<f64>,
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
}

fn chart_series(run: &RunOutput) -> ChartData {
    let history: Vec<(f64, f64)> = run
        .series
        .periods()
        .iter()
        .map(|p| (month_index(p.period_start), p.mean_value))
        .collect();
    let forecast: Vec<(f64, f64)> = run
        .forecast
        .points
        .iter()
        .map(|p| (month_index(p.period_start), p.forecast_value))
        .collect();
    let split_at = run.split.test.first().map(|p| month_index(p.period_start));

    let (mut x_min, mut x_max) = (f64::INFINITY, f64::NEG_INFINITY);
    let (mut y_min, mut y_max) = (f64::INFINITY, f64::NEG_INFINITY);
    for &(x, y) in history.iter().chain(forecast.iter()) {
        x_min = x_min.min(x);
        x_max = x_max.max(x);
        y_min = y_min.min(y);
        y_max = y_max.max(y);
    }

    if !x_min.is_finite() || !x_max.is_finite() || x_max <= x_min {
        x_max = x_min + 1.0;
    }
    if !y_min.is_finite() || !y_max.is_finite() {
        y_min = 0.0;
        y_max = 1.0;
    } else if y_max <= y_min {
        y_min -= 1.0;
        y_max += 1.0;
    }
    let pad = ((y_max - y_min).abs() * 0.05).max(1e-12);

    ChartData {
        history,
        forecast,
        split_at,
        x_bounds: [x_min, x_max],
        y_bounds: [y_min - pad, y_max + pad],
    }
}

fn month_index(d: NaiveDate) -> f64 {
    f64::from(d.year()) * 12.0 + f64::from(d.month0())
}

fn fmt_axis_month(v: f64) -> String {
    let idx = v.round() as i64;
    format!("{}-{:02}", idx.div_euclid(12), idx.rem_euclid(12) + 1)
}

fn fmt_axis_y(v: f64) -> String {
    format!("{v:.1}")
}

fn next_frequency(cur: Frequency) -> Frequency {
    match cur {
        Frequency::Month => Frequency::Quarter,
        Frequency::Quarter => Frequency::Year,
        Frequency::Year => Frequency::Month,
    }
}

fn prev_frequency(cur: Frequency) -> Frequency {
    match cur {
        Frequency::Month => Frequency::Year,
        Frequency::Quarter => Frequency::Month,
        Frequency::Year => Frequency::Quarter,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records(n: u32) -> Vec<RawRecord> {
        (0..n)
            .map(|i| RawRecord::new(format!("{}-{:02}-01", 2020 + i / 12, i % 12 + 1), 10.0 + f64::from(i)))
            .collect()
    }

    fn app(n: u32) -> App {
        App::new("fixture".to_string(), records(n), ForecastConfig::default())
    }

    #[test]
    fn initial_fit_runs() {
        let app = app(20);
        let run = app.run.as_ref().unwrap();
        assert_eq!(run.split.train.len(), 14);
        assert!(app.status.starts_with("current="));
    }

    #[test]
    fn train_fraction_steps_and_clamps() {
        let mut app = app(20);
        app.handle_key(KeyCode::Right);
        assert_eq!(app.config.train_fraction, 0.75);
        for _ in 0..10 {
            app.handle_key(KeyCode::Right);
        }
        assert_eq!(app.config.train_fraction, 1.0);
        assert!(app.run.as_ref().unwrap().split.test.is_empty());
    }

    #[test]
    fn extra_periods_refit_horizon() {
        let mut app = app(20);
        app.handle_key(KeyCode::Down);
        app.handle_key(KeyCode::Down);
        app.handle_key(KeyCode::Right);
        assert_eq!(app.config.extra_forecast_periods, 3);
        assert_eq!(app.run.as_ref().unwrap().forecast.len(), 6 + 3);
    }

    #[test]
    fn seasonal_on_short_history_reports_error() {
        let mut app = app(20);
        assert!(!app.handle_key(KeyCode::Char('s')));
        assert!(app.config.seasonal_enabled);
        assert!(app.run.is_none());
        assert!(app.status.contains("insufficient training data"), "{}", app.status);
    }

    #[test]
    fn frequency_cycle_resets_seasonal_period() {
        let mut app = app(36);
        app.selected_field = 3;
        app.handle_key(KeyCode::Right);
        assert_eq!(app.config.aggregation_frequency, Frequency::Quarter);
        assert_eq!(app.config.seasonal_period, 4);
        assert_eq!(app.run.as_ref().unwrap().series.len(), 12);
        app.handle_key(KeyCode::Left);
        assert_eq!(app.config.aggregation_frequency, Frequency::Month);
    }

    #[test]
    fn yearly_frequency_turns_seasonality_off() {
        let mut app = app(36);
        app.config.seasonal_enabled = true;
        app.selected_field = 3;
        app.handle_key(KeyCode::Left);
        assert_eq!(app.config.aggregation_frequency, Frequency::Year);
        assert!(!app.config.seasonal_enabled);
        assert!(app.run.is_some(), "{}", app.status);

        assert!(!app.handle_key(KeyCode::Char('s')));
        assert!(!app.config.seasonal_enabled);
        assert!(app.status.contains("no seasonal cycle"), "{}", app.status);
    }

    #[test]
    fn quit_keys() {
        let mut app = app(10);
        assert!(app.handle_key(KeyCode::Char('q')));
        assert!(app.handle_key(KeyCode::Esc));
    }

    #[test]
    fn chart_series_bounds_cover_history_and_forecast() {
        let app = app(10);
        let data = chart_series(app.run.as_ref().unwrap());
        assert_eq!(data.history.len(), 10);
        assert_eq!(data.forecast.len(), 5);
        assert_eq!(data.x_bounds[0], 2020.0 * 12.0);
        assert_eq!(data.x_bounds[1], 2020.0 * 12.0 + 11.0);
        assert_eq!(data.split_at, Some(2020.0 * 12.0 + 7.0));
        assert!(data.y_bounds[0] < 10.0 && data.y_bounds[1] > 21.0);
    }

    #[test]
    fn axis_month_labels() {
        assert_eq!(fmt_axis_month(2024.0 * 12.0), "2024-01");
        assert_eq!(fmt_axis_month(2024.0 * 12.0 + 11.0), "2024-12");
    }
}
