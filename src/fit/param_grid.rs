//! Smoothing parameter grids.
//!
//! Smoothing coefficients are estimated with a deterministic grid search followed by
//! a few zoomed-in grids around the incumbent. Same input, same grid, same answer.

use crate::error::ForecastError;

/// Lower bound for every smoothing coefficient.
pub const PARAM_MIN: f64 = 0.01;
/// Upper bound for every smoothing coefficient.
pub const PARAM_MAX: f64 = 0.99;

/// Generate `steps` evenly spaced points between `min` and `max` (inclusive).
pub fn linear_space(min: f64, max: f64, steps: usize) -> Result<Vec<f64>, ForecastError> {
    if !(min.is_finite() && max.is_finite() && max > min) {
        return Err(ForecastError::Config(format!(
            "invalid parameter range: min={min}, max={max} (must be finite and max>min)"
        )));
    }
    if steps < 2 {
        return Err(ForecastError::Config("grid steps must be >= 2".to_string()));
    }

    let step = (max - min) / (steps as f64 - 1.0);
    Ok((0..steps).map(|i| min + step * i as f64).collect())
}

/// Cartesian product of per-parameter axes, first axis varying slowest.
pub fn cartesian(axes: &[Vec<f64>]) -> Vec<Vec<f64>> {
    let mut out: Vec<Vec<f64>> = vec![Vec::new()];
    for axis in axes {
        let mut next = Vec::with_capacity(out.len() * axis.len());
        for prefix in &out {
            for &v in axis {
                let mut p = prefix.clone();
                p.push(v);
                next.push(p);
            }
        }
        out = next;
    }
    out
}

/// Full coarse grid over `dims` parameters, each in `[PARAM_MIN, PARAM_MAX]`.
pub fn coarse_grid(dims: usize, steps: usize) -> Result<Vec<Vec<f64>>, ForecastError> {
    let axis = linear_space(PARAM_MIN, PARAM_MAX, steps)?;
    Ok(cartesian(&vec![axis; dims]))
}

/// Grid of `steps` points per axis within `center ± half_width`, clipped to bounds.
pub fn zoom_grid(center: &[f64], half_width: f64, steps: usize) -> Result<Vec<Vec<f64>>, ForecastError> {
    let axes = center
        .iter()
        .map(|&c| {
            let lo = (c - half_width).max(PARAM_MIN);
            let hi = (c + half_width).min(PARAM_MAX);
            linear_space(lo, hi, steps)
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(cartesian(&axes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_space_includes_endpoints() {
        let v = linear_space(0.01, 0.99, 5).unwrap();
        assert_eq!(v.len(), 5);
        assert!((v[0] - 0.01).abs() < 1e-12);
        assert!((v[4] - 0.99).abs() < 1e-12);
    }

    #[test]
    fn linear_space_rejects_bad_ranges() {
        assert!(linear_space(0.5, 0.5, 3).is_err());
        assert!(linear_space(0.1, 0.9, 1).is_err());
    }

    #[test]
    fn cartesian_orders_first_axis_slowest() {
        let grid = cartesian(&[vec![1.0, 2.0], vec![10.0, 20.0, 30.0]]);
        assert_eq!(grid.len(), 6);
        assert_eq!(grid[0], vec![1.0, 10.0]);
        assert_eq!(grid[2], vec![1.0, 30.0]);
        assert_eq!(grid[3], vec![2.0, 10.0]);
    }

    #[test]
    fn zoom_grid_stays_in_bounds() {
        let grid = zoom_grid(&[PARAM_MIN, 0.5], 0.1, 4).unwrap();
        assert_eq!(grid.len(), 16);
        for p in grid {
            assert!(p.iter().all(|v| (PARAM_MIN..=PARAM_MAX).contains(v)));
        }
    }
}
