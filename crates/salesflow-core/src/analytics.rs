//! Aggregations over already-loaded sales values. Nothing here touches the
//! filesystem; the report stage feeds these and persists the results.

use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate, Weekday};
use polars::prelude::*;

/// Ordered mapping from a categorical key to an aggregated value.
#[derive(Debug, Clone, PartialEq)]
pub struct Breakdown {
    pub key_column: &'static str,
    pub value_column: &'static str,
    pub entries: Vec<(String, Option<f64>)>,
}

impl Breakdown {
    pub fn new(
        key_column: &'static str,
        value_column: &'static str,
        entries: Vec<(String, Option<f64>)>,
    ) -> Self {
        Self {
            key_column,
            value_column,
            entries,
        }
    }

    pub fn from_totals(
        key_column: &'static str,
        value_column: &'static str,
        totals: Vec<(String, f64)>,
    ) -> Self {
        let entries = totals
            .into_iter()
            .map(|(key, value)| (key, Some(value)))
            .collect();
        Self::new(key_column, value_column, entries)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> Vec<&str> {
        self.entries.iter().map(|(key, _)| key.as_str()).collect()
    }

    pub fn values(&self) -> Vec<Option<f64>> {
        self.entries.iter().map(|(_, value)| *value).collect()
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(candidate, _)| candidate == key)
            .and_then(|(_, value)| *value)
    }

    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        DataFrame::new(vec![
            Series::new(self.key_column.into(), self.keys()).into(),
            Series::new(self.value_column.into(), self.values()).into(),
        ])
    }
}

/// Sums values per key with a grouped aggregation; the result is ordered by key.
pub fn sum_by_key<K, I>(pairs: I) -> PolarsResult<Vec<(String, f64)>>
where
    K: AsRef<str>,
    I: IntoIterator<Item = (K, f64)>,
{
    let (keys, values): (Vec<String>, Vec<f64>) = pairs
        .into_iter()
        .map(|(key, value)| (key.as_ref().to_string(), value))
        .unzip();

    let grouped = df!("key" => keys, "value" => values)?
        .lazy()
        .group_by([col("key")])
        .agg([col("value").sum()])
        .sort(["key"], SortMultipleOptions::default())
        .collect()?;

    let keys = grouped.column("key")?.str()?;
    let totals = grouped.column("value")?.f64()?;
    Ok(keys
        .into_iter()
        .zip(totals)
        .filter_map(|(key, total)| Some((key?.to_string(), total.unwrap_or(0.0))))
        .collect())
}

/// Plain sum seeded with `0.0`, so an empty input gives `0.0` rather than `-0.0`.
pub fn total(values: impl IntoIterator<Item = f64>) -> f64 {
    values.into_iter().fold(0.0, |acc, value| acc + value)
}

/// Largest value first. Equal values keep key order so output is stable run to run.
pub fn sort_descending(entries: &mut [(String, f64)]) {
    entries.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
}

/// Each value as a percentage of `total`; `None` when `total` is zero.
pub fn share_percent(entries: &[(String, f64)], total: f64) -> Vec<(String, Option<f64>)> {
    entries
        .iter()
        .map(|(key, value)| {
            let share = (total != 0.0).then(|| value * 100.0 / total);
            (key.clone(), share)
        })
        .collect()
}

/// Period-over-period change in percent. The first period, and any period
/// following a zero, has no defined change.
pub fn percent_change(values: &[f64]) -> Vec<Option<f64>> {
    let mut changes = Vec::with_capacity(values.len());
    let mut previous: Option<f64> = None;
    for &current in values {
        let change = match previous {
            Some(prev) if prev != 0.0 => Some((current - prev) * 100.0 / prev),
            _ => None,
        };
        changes.push(change);
        previous = Some(current);
    }
    changes
}

/// Running share of `total` (as a fraction) for entries already sorted descending.
pub fn cumulative_shares(sorted: &[(String, f64)], total: f64) -> Vec<(String, Option<f64>)> {
    let mut running = 0.0;
    sorted
        .iter()
        .map(|(key, value)| {
            running += value;
            (key.clone(), (total != 0.0).then(|| running / total))
        })
        .collect()
}

/// Keys needed to reach `threshold` of `total`, counting the key at which the
/// running share first exceeds it. A key is kept while the share accumulated
/// before it is at most `threshold`.
pub fn pareto_set(sorted: &[(String, f64)], total: f64, threshold: f64) -> Vec<String> {
    if total <= 0.0 {
        return Vec::new();
    }
    let mut before = 0.0;
    let mut keys = Vec::new();
    for (key, value) in sorted {
        if before / total > threshold {
            break;
        }
        keys.push(key.clone());
        before += value;
    }
    keys
}

/// Keys whose running share of `total` stays at or below `limit`.
pub fn cumulative_share_within(sorted: &[(String, f64)], total: f64, limit: f64) -> Vec<String> {
    cumulative_shares(sorted, total)
        .into_iter()
        .filter(|(_, share)| share.is_some_and(|share| share <= limit))
        .map(|(key, _)| key)
        .collect()
}

/// Trailing mean over `window` samples; positions with fewer samples are `None`.
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; values.len()];
    }
    (0..values.len())
        .map(|idx| {
            (idx + 1 >= window).then(|| {
                let slice = &values[idx + 1 - window..=idx];
                slice.iter().sum::<f64>() / window as f64
            })
        })
        .collect()
}

pub const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Totals per weekday in Monday→Sunday order. Weekdays with no sales stay in
/// the output with no value.
pub fn weekday_totals<I>(pairs: I) -> Vec<(String, Option<f64>)>
where
    I: IntoIterator<Item = (NaiveDate, f64)>,
{
    let mut totals: [Option<f64>; 7] = [None; 7];
    for (date, value) in pairs {
        let slot = &mut totals[date.weekday().num_days_from_monday() as usize];
        *slot = Some(slot.unwrap_or(0.0) + value);
    }
    WEEKDAYS
        .iter()
        .zip(totals)
        .map(|(day, total)| (weekday_name(*day).to_string(), total))
        .collect()
}

pub fn distinct_count<T: Ord, I: IntoIterator<Item = T>>(values: I) -> usize {
    values.into_iter().collect::<BTreeSet<_>>().len()
}

pub fn average_order_value(total_revenue: i64, orders: usize) -> i64 {
    if orders == 0 {
        0
    } else {
        total_revenue / orders as i64
    }
}

/// Equal-width bins as `(lower, upper, count)`. The last bin includes its
/// upper edge.
pub fn histogram_bins(values: &[f64], bins: usize) -> Vec<(f64, f64, usize)> {
    if values.is_empty() || bins == 0 {
        return Vec::new();
    }
    let mut min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let mut max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if min == max {
        min -= 0.5;
        max += 0.5;
    }
    let width = (max - min) / bins as f64;

    let mut counts = vec![0usize; bins];
    for &value in values {
        let idx = (((value - min) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }
    counts
        .into_iter()
        .enumerate()
        .map(|(idx, count)| {
            let lower = min + width * idx as f64;
            (lower, lower + width, count)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(values: &[(&str, f64)]) -> Vec<(String, f64)> {
        values.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    fn assert_close(actual: Option<f64>, expected: f64) {
        let value = actual.expect("expected a value");
        assert!(
            (value - expected).abs() < 1e-9,
            "expected {expected}, got {value}"
        );
    }

    #[test]
    fn sums_group_by_key_in_key_order() {
        let totals = sum_by_key(vec![("05", 10.0), ("04", 1.0), ("05", 2.5)]).unwrap();
        assert_eq!(totals, entries(&[("04", 1.0), ("05", 12.5)]));
        assert!(sum_by_key(Vec::<(&str, f64)>::new()).unwrap().is_empty());
    }

    #[test]
    fn empty_total_is_positive_zero() {
        let empty = total(Vec::new());
        assert_eq!(empty, 0.0);
        assert!(empty.is_sign_positive());
        assert_eq!(total(vec![1.5, 2.5]), 4.0);
    }

    #[test]
    fn descending_sort_breaks_ties_by_key() {
        let mut values = entries(&[("b", 5.0), ("c", 9.0), ("a", 5.0)]);
        sort_descending(&mut values);
        assert_eq!(values, entries(&[("c", 9.0), ("a", 5.0), ("b", 5.0)]));
    }

    #[test]
    fn monthly_growth_matches_percent_change() {
        let growth = percent_change(&[100.0, 150.0, 90.0]);
        assert_eq!(growth[0], None);
        assert_close(growth[1], 50.0);
        assert_close(growth[2], -40.0);

        assert_eq!(percent_change(&[0.0, 10.0]), vec![None, None]);
        assert!(percent_change(&[]).is_empty());
    }

    #[test]
    fn pareto_set_includes_the_crossing_key() {
        let sorted = entries(&[("a", 50.0), ("b", 30.0), ("c", 15.0), ("d", 5.0)]);
        assert_eq!(pareto_set(&sorted, 100.0, 0.8), vec!["a", "b", "c"]);

        let single = entries(&[("a", 90.0), ("b", 10.0)]);
        assert_eq!(pareto_set(&single, 100.0, 0.8), vec!["a"]);
        assert!(pareto_set(&sorted, 0.0, 0.8).is_empty());
    }

    #[test]
    fn top_share_stays_within_limit() {
        let sorted = entries(&[("a", 10.0), ("b", 10.0), ("c", 30.0), ("d", 50.0)]);
        assert_eq!(cumulative_share_within(&sorted, 100.0, 0.2), vec!["a", "b"]);

        let dominant = entries(&[("a", 60.0), ("b", 40.0)]);
        assert!(cumulative_share_within(&dominant, 100.0, 0.2).is_empty());
    }

    #[test]
    fn rolling_mean_needs_a_full_window() {
        let values: Vec<f64> = (1..=10).map(f64::from).collect();
        let rolled = rolling_mean(&values, 7);

        assert_eq!(rolled.len(), 10);
        assert!(rolled[..6].iter().all(Option::is_none));
        assert_close(rolled[6], 4.0);
        assert_close(rolled[9], 7.0);
        assert!(rolling_mean(&values[..3], 7).iter().all(Option::is_none));
    }

    #[test]
    fn weekday_totals_keep_every_day() {
        let monday = NaiveDate::from_ymd_opt(2022, 5, 2).unwrap();
        let wednesday = NaiveDate::from_ymd_opt(2022, 5, 4).unwrap();
        let totals = weekday_totals(vec![(monday, 10.0), (wednesday, 4.0), (monday, 5.0)]);

        let names: Vec<&str> = totals.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(
            names,
            ["Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday", "Sunday"]
        );
        assert_eq!(totals[0].1, Some(15.0));
        assert_eq!(totals[1].1, None);
        assert_eq!(totals[2].1, Some(4.0));
    }

    #[test]
    fn average_order_value_handles_zero_orders() {
        assert_eq!(average_order_value(1000, 10), 100);
        assert_eq!(average_order_value(1000, 0), 0);
    }

    #[test]
    fn shares_and_distinct_counts() {
        let shares = share_percent(&entries(&[("x", 25.0), ("y", 75.0)]), 100.0);
        assert_eq!(shares[0], ("x".to_string(), Some(25.0)));
        assert_eq!(share_percent(&entries(&[("x", 1.0)]), 0.0)[0].1, None);
        assert_eq!(distinct_count(vec!["a", "b", "a"]), 2);
    }

    #[test]
    fn histogram_counts_every_value_once() {
        let values = [1.0, 2.0, 2.0, 3.0, 10.0];
        let bins = histogram_bins(&values, 3);
        assert_eq!(bins.len(), 3);
        assert_eq!(bins.iter().map(|(_, _, c)| c).sum::<usize>(), values.len());
        assert_eq!(bins[2].2, 1);

        let flat = histogram_bins(&[4.0, 4.0], 2);
        assert_eq!(flat.iter().map(|(_, _, c)| c).sum::<usize>(), 2);
    }

    #[test]
    fn breakdown_frame_has_key_and_value_columns() {
        let breakdown = Breakdown::from_totals("month", "revenue", entries(&[("04", 1.0)]));
        let df = breakdown.to_dataframe().unwrap();
        assert_eq!(df.get_column_names_str(), ["month", "revenue"]);
        assert_eq!(df.height(), 1);
        assert_eq!(breakdown.get("04"), Some(1.0));
    }
}
