//! Train/test partitioning of an aggregated series.

use crate::domain::{Series, Split};
use crate::error::{ForecastError, Stage};

/// Guards the floor against products like `0.7 * 70 = 48.999…` in binary floating point.
const FLOOR_EPS: f64 = 1e-9;

/// Number of leading periods that go into the training set.
pub fn train_size(n: usize, train_fraction: f64) -> usize {
    let raw = (train_fraction * n as f64 + FLOOR_EPS).floor();
    if raw <= 0.0 { 0 } else { (raw as usize).min(n) }
}

/// Split `series` into a training prefix and a test suffix.
pub fn split_series(series: &Series, train_fraction: f64) -> Result<Split, ForecastError> {
    if !(train_fraction.is_finite() && train_fraction > 0.0 && train_fraction <= 1.0) {
        return Err(ForecastError::Config(format!(
            "train_fraction must be in (0, 1], got {train_fraction}"
        )));
    }

    let n = series.len();
    let k = train_size(n, train_fraction);
    if k == 0 {
        return Err(ForecastError::InsufficientTrainingData {
            stage: Stage::Split,
            series_len: n,
            train_len: 0,
            required: 1,
        });
    }

    let (train, test) = series.periods().split_at(k);
    tracing::info!(train = train.len(), test = test.len(), "split series");

    Ok(Split {
        train: Series::new(series.frequency(), train.to_vec())?,
        test: test.to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Frequency;
    use chrono::NaiveDate;

    fn series(n: usize) -> Series {
        let values: Vec<f64> = (0..n).map(|i| i as f64).collect();
        Series::from_values(Frequency::Month, NaiveDate::from_ymd_opt(2015, 1, 1).unwrap(), &values).unwrap()
    }

    #[test]
    fn split_sizes_for_lengths_1_to_120() {
        for n in 1..=120usize {
            let expected = n * 7 / 10;
            let s = series(n);
            match split_series(&s, 0.7) {
                Ok(split) => {
                    assert_eq!(split.train.len(), expected, "n={n}");
                    assert_eq!(split.train.len() + split.test.len(), n, "n={n}");
                }
                Err(ForecastError::InsufficientTrainingData { train_len, .. }) => {
                    assert_eq!(expected, 0, "n={n}");
                    assert_eq!(train_len, 0);
                }
                Err(other) => panic!("unexpected error for n={n}: {other}"),
            }
        }
    }

    #[test]
    fn split_preserves_order_without_gaps() {
        let s = series(10);
        let split = split_series(&s, 0.7).unwrap();
        let mut joined = split.train.periods().to_vec();
        joined.extend(split.test.iter().copied());
        assert_eq!(joined, s.periods());
    }

    #[test]
    fn single_period_has_empty_train() {
        let err = split_series(&series(1), 0.7).unwrap_err();
        assert!(matches!(
            err,
            ForecastError::InsufficientTrainingData {
                stage: Stage::Split,
                series_len: 1,
                ..
            }
        ));
    }

    #[test]
    fn full_fraction_leaves_empty_test() {
        let split = split_series(&series(5), 1.0).unwrap();
        assert_eq!(split.train.len(), 5);
        assert!(split.test.is_empty());
    }

    #[test]
    fn floor_is_exact_for_awkward_products() {
        assert_eq!(train_size(70, 0.7), 49);
        assert_eq!(train_size(10, 0.7), 7);
        assert_eq!(train_size(3, 0.7), 2);
    }
}
