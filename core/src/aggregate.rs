//! Date-bucketed aggregation for trend charts.
//!
//! Buckets are keyed by explicit `NaiveDate`s, never locale-formatted
//! strings, so grouping is deterministic across locales and timezones.
//! Weeks start on Sunday (day index 0); changing that would silently shift
//! every weekly series.

use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    Day,
    Week,
    Month,
}

#[derive(Debug, Clone, Serialize)]
pub struct Bucket {
    /// Canonical bucket date: the day itself, the containing Sunday, or the
    /// first of the month.
    pub key: NaiveDate,
    pub label: String,
    pub value: f64,
}

/// Canonical bucket date for an entry date at the given granularity.
#[must_use]
pub fn bucket_key(date: NaiveDate, granularity: Granularity) -> NaiveDate {
    match granularity {
        Granularity::Day => date,
        Granularity::Week => {
            date - Duration::days(i64::from(date.weekday().num_days_from_sunday()))
        }
        Granularity::Month => date.with_day(1).unwrap_or(date),
    }
}

#[must_use]
pub fn bucket_label(key: NaiveDate, granularity: Granularity) -> String {
    match granularity {
        Granularity::Day | Granularity::Week => key.format("%Y-%m-%d").to_string(),
        Granularity::Month => key.format("%Y-%m").to_string(),
    }
}

/// Sum `value_of` over entries grouped into calendar buckets.
///
/// Every bucket in `[start, end]` inclusive is present in chronological
/// order, pre-seeded to 0.0, so charts render continuous axes. Entries
/// outside the window, or whose date cannot be parsed, are ignored.
pub fn aggregate<T>(
    entries: &[T],
    date_of: impl Fn(&T) -> Option<NaiveDate>,
    value_of: impl Fn(&T) -> f64,
    start: NaiveDate,
    end: NaiveDate,
    granularity: Granularity,
) -> Vec<Bucket> {
    let mut sums: std::collections::BTreeMap<NaiveDate, f64> = std::collections::BTreeMap::new();

    let mut day = start;
    while day <= end {
        sums.entry(bucket_key(day, granularity)).or_insert(0.0);
        day += Duration::days(1);
    }

    for entry in entries {
        let Some(date) = date_of(entry) else { continue };
        if date < start || date > end {
            continue;
        }
        if let Some(sum) = sums.get_mut(&bucket_key(date, granularity)) {
            *sum += value_of(entry);
        }
    }

    sums.into_iter()
        .map(|(key, value)| Bucket {
            key,
            label: bucket_label(key, granularity),
            value,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct E {
        date: NaiveDate,
        value: f64,
    }

    fn e(y: i32, m: u32, d: u32, value: f64) -> E {
        E {
            date: NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            value,
        }
    }

    fn run(entries: &[E], start: NaiveDate, end: NaiveDate, g: Granularity) -> Vec<Bucket> {
        aggregate(entries, |x| Some(x.date), |x| x.value, start, end, g)
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_day_bucket_count_and_order() {
        let buckets = run(&[], d(2024, 6, 1), d(2024, 6, 10), Granularity::Day);
        assert_eq!(buckets.len(), 10); // (end-start).days + 1
        for (i, b) in buckets.iter().enumerate() {
            assert_eq!(b.key, d(2024, 6, 1) + Duration::days(i as i64));
            assert!((b.value - 0.0).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn test_day_sums_and_zero_fill() {
        let entries = vec![e(2024, 6, 2, 100.0), e(2024, 6, 2, 50.0), e(2024, 6, 4, 30.0)];
        let buckets = run(&entries, d(2024, 6, 1), d(2024, 6, 5), Granularity::Day);
        assert_eq!(buckets.len(), 5);
        assert!((buckets[0].value - 0.0).abs() < f64::EPSILON);
        assert!((buckets[1].value - 150.0).abs() < f64::EPSILON);
        assert!((buckets[2].value - 0.0).abs() < f64::EPSILON);
        assert!((buckets[3].value - 30.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_entries_outside_window_ignored() {
        let entries = vec![e(2024, 5, 31, 999.0), e(2024, 6, 6, 999.0), e(2024, 6, 3, 10.0)];
        let buckets = run(&entries, d(2024, 6, 1), d(2024, 6, 5), Granularity::Day);
        let total: f64 = buckets.iter().map(|b| b.value).sum();
        assert!((total - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_week_starts_on_sunday() {
        // 2024-06-15 is a Saturday; its week bucket is Sunday 2024-06-09.
        assert_eq!(bucket_key(d(2024, 6, 15), Granularity::Week), d(2024, 6, 9));
        // A Sunday is its own bucket key.
        assert_eq!(bucket_key(d(2024, 6, 9), Granularity::Week), d(2024, 6, 9));
        // Monday belongs to the same week as the preceding Sunday.
        assert_eq!(bucket_key(d(2024, 6, 10), Granularity::Week), d(2024, 6, 9));
    }

    #[test]
    fn test_week_aggregation_groups_across_sunday_boundary() {
        // Sat 2024-06-08 and Sun 2024-06-09 land in different weeks.
        let entries = vec![e(2024, 6, 8, 100.0), e(2024, 6, 9, 200.0), e(2024, 6, 12, 50.0)];
        let buckets = run(&entries, d(2024, 6, 2), d(2024, 6, 15), Granularity::Week);
        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0].key, d(2024, 6, 2));
        assert!((buckets[0].value - 100.0).abs() < f64::EPSILON);
        assert_eq!(buckets[1].key, d(2024, 6, 9));
        assert!((buckets[1].value - 250.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_month_buckets_inclusive_of_last_day() {
        let entries = vec![e(2024, 1, 31, 10.0), e(2024, 2, 29, 20.0)];
        let buckets = run(&entries, d(2024, 1, 1), d(2024, 2, 29), Granularity::Month);
        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0].label, "2024-01");
        assert!((buckets[0].value - 10.0).abs() < f64::EPSILON);
        assert_eq!(buckets[1].label, "2024-02");
        assert!((buckets[1].value - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_partial_month_window_still_buckets() {
        let buckets = run(&[], d(2024, 6, 10), d(2024, 7, 5), Granularity::Month);
        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0].key, d(2024, 6, 1));
        assert_eq!(buckets[1].key, d(2024, 7, 1));
    }

    #[test]
    fn test_unparseable_dates_skipped() {
        struct Raw {
            date: &'static str,
            value: f64,
        }
        let entries = vec![
            Raw { date: "2024-06-03T08:00:00+00:00", value: 5.0 },
            Raw { date: "garbage", value: 99.0 },
        ];
        let buckets = aggregate(
            &entries,
            |r| crate::models::entry_date(r.date),
            |r| r.value,
            d(2024, 6, 1),
            d(2024, 6, 5),
            Granularity::Day,
        );
        let total: f64 = buckets.iter().map(|b| b.value).sum();
        assert!((total - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_single_day_window() {
        let buckets = run(&[e(2024, 6, 1, 7.0)], d(2024, 6, 1), d(2024, 6, 1), Granularity::Day);
        assert_eq!(buckets.len(), 1);
        assert!((buckets[0].value - 7.0).abs() < f64::EPSILON);
        assert_eq!(buckets[0].label, "2024-06-01");
    }
}
