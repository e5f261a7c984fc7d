//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - observed period aggregates: `o`
//! - forecast points: `*`, joined by a `-` line
//!
//! The x axis is calendar time in months, so history and forecast line up for any
//! aggregation frequency.

use chrono::{Datelike, NaiveDate};

use crate::domain::{ForecastResult, PeriodAggregate};

/// Render history and forecast on one grid.
pub fn render_ascii_plot(
    history: &[PeriodAggregate],
    forecast: &ForecastResult,
    width: usize,
    height: usize,
) -> String {
    let history: Vec<(NaiveDate, f64)> = history.iter().map(|p| (p.period_start, p.mean_value)).collect();
    let forecast: Vec<(NaiveDate, f64)> = forecast
        .points
        .iter()
        .map(|p| (p.period_start, p.forecast_value))
        .collect();
    render_plot(&history, &forecast, width, height)
}

fn render_plot(history: &[(NaiveDate, f64)], forecast: &[(NaiveDate, f64)], width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let all = || history.iter().chain(forecast.iter());
    let Some(first) = all().map(|(d, _)| *d).min() else {
        return "Plot: (no data)\n".to_string();
    };
    let last = all().map(|(d, _)| *d).max().unwrap_or(first);

    let (x_min, x_max) = x_range(month_index(first), month_index(last));
    let (y_min, y_max) = y_range(all().map(|(_, v)| *v)).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];
    let to_cell = |(d, v): &(NaiveDate, f64)| {
        (
            map_x(month_index(*d), x_min, x_max, width),
            map_y(*v, y_min, y_max, height),
        )
    };

    // Forecast line first so markers overlay it.
    let cells: Vec<(usize, usize)> = forecast.iter().map(to_cell).collect();
    for w in cells.windows(2) {
        draw_line(&mut grid, w[0].0, w[0].1, w[1].0, w[1].1, '-');
    }
    for &(x, y) in &cells {
        grid[y][x] = '*';
    }
    for p in history {
        let (x, y) = to_cell(p);
        grid[y][x] = 'o';
    }

    let mut out = String::new();
    out.push_str(&format!("Plot: {first} .. {last} | y=[{y_min:.2}, {y_max:.2}]\n"));
    for row in grid {
        out.push_str(row.into_iter().collect::<String>().trim_end());
        out.push('\n');
    }
    out
}

fn month_index(d: NaiveDate) -> f64 {
    f64::from(d.year()) * 12.0 + f64::from(d.month0())
}

fn x_range(min: f64, max: f64) -> (f64, f64) {
    if max > min { (min, max) } else { (min, min + 1.0) }
}

fn y_range(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for v in values {
        min_y = min_y.min(v);
        max_y = max_y.max(v);
    }
    if !(min_y.is_finite() && max_y.is_finite()) {
        return None;
    }
    if max_y > min_y {
        Some((min_y, max_y))
    } else {
        Some((min_y - 1.0, max_y + 1.0))
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(t: f64, t_min: f64, t_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((t - t_min) / (t_max - t_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // Row 0 is the top of the plot.
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

/// Integer line drawing (Bresenham). Only fills empty cells.
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}
