//! Forecast error metrics.

/// Mean absolute error. `None` for empty or mismatched inputs.
pub fn mae(actual: &[f64], predicted: &[f64]) -> Option<f64> {
    paired_mean(actual, predicted, |a, p| (a - p).abs())
}

/// Root mean squared error.
pub fn rmse(actual: &[f64], predicted: &[f64]) -> Option<f64> {
    paired_mean(actual, predicted, |a, p| (a - p) * (a - p)).map(f64::sqrt)
}

/// Mean absolute percentage error, in percent.
///
/// Undefined (returns `None`) when any actual value is zero.
pub fn mape(actual: &[f64], predicted: &[f64]) -> Option<f64> {
    if actual.iter().any(|a| *a == 0.0) {
        return None;
    }
    paired_mean(actual, predicted, |a, p| ((a - p) / a).abs()).map(|v| v * 100.0)
}

/// Arithmetic mean of `values`. `None` when empty.
///
/// Finite inputs give a finite mean: if the plain sum overflows, each term is scaled by
/// `1/n` before summing.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let n = values.len() as f64;
    let sum: f64 = values.iter().sum();
    if sum.is_finite() {
        Some(sum / n)
    } else {
        Some(values.iter().map(|v| v / n).sum())
    }
}

fn paired_mean(actual: &[f64], predicted: &[f64], f: impl Fn(f64, f64) -> f64) -> Option<f64> {
    if actual.is_empty() || actual.len() != predicted.len() {
        return None;
    }
    let sum: f64 = actual.iter().zip(predicted).map(|(&a, &p)| f(a, p)).sum();
    Some(sum / actual.len() as f64)
}
