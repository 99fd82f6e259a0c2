use std::collections::BTreeMap;

use polars::prelude::*;
use tracing::{info, warn};

use crate::config::PipelinePaths;
use crate::error::{Result, Stage, StageContext, StageError};
use crate::table::{
    date_column, format_order_date, number_column, read_table, text_column, write_table,
};

/// Columns appended to the master schema by the clean stage.
pub const DATE_PART_COLUMNS: [&str; 3] = ["year", "month", "day"];

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CleanSummary {
    pub rows_in: usize,
    pub rows_out: usize,
    pub imputed_dates: usize,
    pub imputed_quantities: usize,
    pub imputed_revenues: usize,
}

/// Segments of a `YYYY-MM-DD` rendering. Missing segments are `None`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DateParts {
    pub year: Option<String>,
    pub month: Option<String>,
    pub day: Option<String>,
}

pub fn split_date_parts(text: &str) -> DateParts {
    let mut segments = text
        .split('-')
        .map(|segment| Some(segment.to_string()).filter(|s| !s.is_empty()));
    DateParts {
        year: segments.next().flatten(),
        month: segments.next().flatten(),
        day: segments.next().flatten(),
    }
}

/// Most frequent value; ties resolve to the smallest value.
pub fn mode_of<T: Ord>(values: impl IntoIterator<Item = T>) -> Option<T> {
    let mut counts: BTreeMap<T, usize> = BTreeMap::new();
    for value in values {
        *counts.entry(value).or_insert(0) += 1;
    }

    let mut best: Option<(T, usize)> = None;
    for (value, count) in counts {
        if best.as_ref().map_or(true, |(_, top)| count > *top) {
            best = Some((value, count));
        }
    }
    best.map(|(value, _)| value)
}

/// [`mode_of`] for floats, ordered with `total_cmp`.
pub fn mode_f64(values: &[f64]) -> Option<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mut best: Option<(f64, usize)> = None;
    let mut idx = 0;
    while idx < sorted.len() {
        let value = sorted[idx];
        let mut end = idx + 1;
        while end < sorted.len() && sorted[end] == value {
            end += 1;
        }
        let count = end - idx;
        if best.map_or(true, |(_, top)| count > top) {
            best = Some((value, count));
        }
        idx = end;
    }
    best.map(|(value, _)| value)
}

pub fn mean_of(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

fn fill_missing<T: Clone>(values: &mut [Option<T>], fill: Option<T>) -> usize {
    let Some(fill) = fill else {
        return 0;
    };
    let mut filled = 0;
    for value in values.iter_mut().filter(|value| value.is_none()) {
        *value = Some(fill.clone());
        filled += 1;
    }
    filled
}

fn null_count<T>(values: &[Option<T>]) -> usize {
    values.iter().filter(|value| value.is_none()).count()
}

/// Coerces, imputes, derives date parts and drops invalid rows.
pub fn clean_frame(master: &DataFrame) -> Result<(DataFrame, CleanSummary)> {
    let mut order_date = date_column(master, "order_date")?;
    let sku = text_column(master, "sku")?;
    let mut quantity = number_column(master, "quantity")?;
    let mut revenue = number_column(master, "revenue")?;
    let country = text_column(master, "country")?;
    let source = text_column(master, "source")?;

    info!(
        order_date = null_count(&order_date),
        sku = null_count(&sku),
        quantity = null_count(&quantity),
        revenue = null_count(&revenue),
        country = null_count(&country),
        "null counts before imputation"
    );

    let date_mode = mode_of(order_date.iter().flatten().copied());
    let present_quantities: Vec<f64> = quantity.iter().flatten().copied().collect();
    let present_revenues: Vec<f64> = revenue.iter().flatten().copied().collect();
    let quantity_mode = mode_f64(&present_quantities);
    let revenue_mean = mean_of(&present_revenues);

    let imputed_dates = fill_missing(&mut order_date, date_mode);
    let imputed_quantities = fill_missing(&mut quantity, quantity_mode);
    let imputed_revenues = fill_missing(&mut revenue, revenue_mean);
    if date_mode.is_none() || quantity_mode.is_none() || revenue_mean.is_none() {
        warn!("a column had no values to impute from; its gaps were left empty");
    }

    let order_date_text: Vec<Option<String>> = order_date
        .iter()
        .map(|date| date.map(format_order_date))
        .collect();
    let parts: Vec<DateParts> = order_date_text
        .iter()
        .map(|text| text.as_deref().map(split_date_parts).unwrap_or_default())
        .collect();

    let year: Vec<Option<String>> = parts.iter().map(|p| p.year.clone()).collect();
    let month: Vec<Option<String>> = parts.iter().map(|p| p.month.clone()).collect();
    let day: Vec<Option<String>> = parts.iter().map(|p| p.day.clone()).collect();

    let df = DataFrame::new(vec![
        Series::new("order_date".into(), order_date_text).into(),
        Series::new("sku".into(), sku).into(),
        Series::new("quantity".into(), quantity).into(),
        Series::new("revenue".into(), revenue).into(),
        Series::new("country".into(), country).into(),
        Series::new("source".into(), source).into(),
        Series::new(DATE_PART_COLUMNS[0].into(), year).into(),
        Series::new(DATE_PART_COLUMNS[1].into(), month).into(),
        Series::new(DATE_PART_COLUMNS[2].into(), day).into(),
    ])?;

    let cleaned = df
        .lazy()
        .filter(
            col("revenue")
                .gt(lit(0.0))
                .and(col("quantity").gt(lit(0.0)))
                .and(col("sku").is_not_null()),
        )
        .collect()?;

    let summary = CleanSummary {
        rows_in: master.height(),
        rows_out: cleaned.height(),
        imputed_dates,
        imputed_quantities,
        imputed_revenues,
    };
    Ok((cleaned, summary))
}

pub fn run(paths: &PipelinePaths) -> std::result::Result<CleanSummary, StageError> {
    info!(path = %paths.master_sales.display(), "loading master sales");
    let master = read_table(&paths.master_sales).in_stage(Stage::Clean)?;

    let (mut cleaned, summary) = clean_frame(&master).in_stage(Stage::Clean)?;
    info!(
        rows_in = summary.rows_in,
        rows_out = summary.rows_out,
        imputed_dates = summary.imputed_dates,
        imputed_quantities = summary.imputed_quantities,
        imputed_revenues = summary.imputed_revenues,
        "master sales cleaned"
    );

    write_table(&mut cleaned, &paths.cleaned_sales).in_stage(Stage::Clean)?;
    info!(path = %paths.cleaned_sales.display(), "cleaned sales saved");
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_parts_follow_separator_positions() {
        let parts = split_date_parts("2022-04-30");
        assert_eq!(parts.year.as_deref(), Some("2022"));
        assert_eq!(parts.month.as_deref(), Some("04"));
        assert_eq!(parts.day.as_deref(), Some("30"));

        let short = split_date_parts("2022");
        assert_eq!(short.year.as_deref(), Some("2022"));
        assert_eq!(short.month, None);
        assert_eq!(short.day, None);
    }

    #[test]
    fn mode_prefers_smallest_on_ties() {
        assert_eq!(mode_of(vec![3, 1, 3, 1, 2]), Some(1));
        assert_eq!(mode_of(vec!["b", "a", "b"]), Some("b"));
        assert_eq!(mode_of(Vec::<i32>::new()), None);

        assert_eq!(mode_f64(&[2.0, 1.0, 2.0, 1.0]), Some(1.0));
        assert_eq!(mode_f64(&[5.0, 1.0, 5.0]), Some(5.0));
        assert_eq!(mode_f64(&[]), None);
    }

    #[test]
    fn mean_of_empty_is_none() {
        assert_eq!(mean_of(&[]), None);
        assert_eq!(mean_of(&[1.0, 2.0, 6.0]), Some(3.0));
    }
}
