use std::fs::{self, File};
use std::path::Path;

use chrono::NaiveDate;
use polars::prelude::*;
use salesflow_parser::coerce::{coerce_number, coerce_text};
use salesflow_parser::ORDER_DATE_FORMAT;
use tracing::debug;

use crate::error::Result;

/// Reads a CSV table with every column as text. Stages coerce the columns they
/// need explicitly.
pub fn read_table(path: &Path) -> Result<DataFrame> {
    let file = File::open(path)?;
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .into_reader_with_file_handle(file)
        .finish()?;
    debug!(path = %path.display(), rows = df.height(), columns = df.width(), "table loaded");
    Ok(df)
}

/// Creates the directory that will hold `path`.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// Writes `df` with a header row, replacing any existing file.
pub fn write_table(df: &mut DataFrame, path: &Path) -> Result<()> {
    ensure_parent_dir(path)?;
    let mut file = File::create(path)?;
    CsvWriter::new(&mut file).include_header(true).finish(df)?;
    debug!(path = %path.display(), rows = df.height(), "table written");
    Ok(())
}

fn with_text<R>(
    df: &DataFrame,
    name: &str,
    convert: impl Fn(&str) -> Option<R>,
) -> Result<Vec<Option<R>>> {
    let column = df.column(name)?.cast(&DataType::String)?;
    let values = column.str()?;
    Ok(values
        .into_iter()
        .map(|value| value.and_then(&convert))
        .collect())
}

pub fn text_column(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    with_text(df, name, coerce_text)
}

pub fn number_column(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    with_text(df, name, coerce_number)
}

/// Dates are read back with the same explicit format they were written with.
pub fn date_column(df: &DataFrame, name: &str) -> Result<Vec<Option<NaiveDate>>> {
    with_text(df, name, parse_order_date)
}

pub fn parse_order_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), ORDER_DATE_FORMAT).ok()
}

pub fn format_order_date(date: NaiveDate) -> String {
    date.format(ORDER_DATE_FORMAT).to_string()
}
