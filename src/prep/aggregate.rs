//! Calendar bucketing of clean records.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::domain::{CleanRecord, Frequency, PeriodAggregate, Series};
use crate::error::{ForecastError, Stage};
use crate::math::mean;

/// Group records into calendar buckets and average each bucket.
///
/// Input order does not matter. Buckets without records are absent from the output
/// (never zero-filled). Every record of a bucket contributes to its mean, including
/// same-day duplicates.
pub fn aggregate(records: &[CleanRecord], frequency: Frequency) -> Result<Series, ForecastError> {
    if records.is_empty() {
        return Err(ForecastError::EmptySeries {
            stage: Stage::Aggregate,
            rows_read: 0,
            rows_clean: 0,
        });
    }

    // Sort first so the summation order is chronological and independent of how the
    // source happened to order its rows.
    let mut sorted = records.to_vec();
    sorted.sort_by_key(|r| r.business_date);

    let mut buckets: BTreeMap<NaiveDate, Vec<f64>> = BTreeMap::new();
    for r in &sorted {
        buckets
            .entry(frequency.period_start(r.business_date))
            .or_default()
            .push(r.metric_value);
    }

    let periods: Vec<PeriodAggregate> = buckets
        .into_iter()
        .filter_map(|(period_start, values)| {
            Some(PeriodAggregate {
                period_start,
                mean_value: mean(&values)?,
                count: values.len(),
            })
        })
        .collect();

    tracing::info!(
        records = records.len(),
        periods = periods.len(),
        frequency = frequency.label(),
        "aggregated series"
    );

    Series::new(frequency, periods)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(y: i32, m: u32, day: u32, v: f64) -> CleanRecord {
        CleanRecord {
            business_date: NaiveDate::from_ymd_opt(y, m, day).unwrap(),
            metric_value: v,
        }
    }

    fn d(y: i32, m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, 1).unwrap()
    }

    #[test]
    fn monthly_means_in_chronological_order() {
        let records = vec![
            rec(2024, 3, 2, 10.0),
            rec(2024, 1, 31, 3.0),
            rec(2024, 1, 1, 1.0),
            rec(2024, 3, 2, 20.0),
            rec(2024, 3, 30, 30.0),
        ];
        let series = aggregate(&records, Frequency::Month).unwrap();
        let periods = series.periods();

        assert_eq!(periods.len(), 2, "February has no records and must be absent");
        assert_eq!(periods[0].period_start, d(2024, 1));
        assert!((periods[0].mean_value - 2.0).abs() < 1e-12);
        assert_eq!(periods[0].count, 2);
        assert_eq!(periods[1].period_start, d(2024, 3));
        assert!((periods[1].mean_value - 20.0).abs() < 1e-12);
        assert_eq!(periods[1].count, 3);
    }

    #[test]
    fn quarterly_buckets() {
        let records = vec![rec(2023, 12, 31, 4.0), rec(2024, 2, 1, 1.0), rec(2024, 3, 31, 3.0)];
        let series = aggregate(&records, Frequency::Quarter).unwrap();
        let starts: Vec<NaiveDate> = series.periods().iter().map(|p| p.period_start).collect();
        assert_eq!(starts, vec![d(2023, 10), d(2024, 1)]);
        assert!((series.periods()[1].mean_value - 2.0).abs() < 1e-12);
    }

    #[test]
    fn empty_input_is_an_error() {
        let err = aggregate(&[], Frequency::Month).unwrap_err();
        assert!(matches!(
            err,
            ForecastError::EmptySeries {
                stage: Stage::Aggregate,
                ..
            }
        ));
    }

    #[test]
    fn huge_values_average_without_overflow() {
        let records = vec![rec(2024, 1, 1, 1e308), rec(2024, 1, 1, 1e308), rec(2024, 2, 1, 5.0)];
        let series = aggregate(&records, Frequency::Month).unwrap();
        assert_eq!(series.periods()[0].mean_value, 1e308);
        assert_eq!(series.periods()[0].count, 2);
        assert_eq!(series.periods()[1].mean_value, 5.0);
    }

    #[test]
    fn input_order_does_not_change_result() {
        let a = vec![rec(2024, 1, 3, 0.1), rec(2024, 1, 9, 0.2), rec(2024, 2, 1, 0.3)];
        let mut b = a.clone();
        b.reverse();
        assert_eq!(
            aggregate(&a, Frequency::Month).unwrap(),
            aggregate(&b, Frequency::Month).unwrap()
        );
    }
}
