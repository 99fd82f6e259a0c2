//! Report stage: KPI summary, breakdown tables and charts over the cleaned
//! sales table.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use polars::prelude::*;
use salesflow_parser::SaleSource;
use tracing::{error, info, warn};

use crate::analytics::{total, Breakdown};
use crate::config::{OutputGroup, PipelinePaths};
use crate::error::{Result, Stage, StageContext, StageError};
use crate::table::{date_column, number_column, read_table, text_column, write_table};

pub mod advanced;
pub mod geographic;
pub mod monthly;
pub mod product;
pub mod revenue;

pub use revenue::KpiSummary;

/// One row of the cleaned table, typed.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanSale {
    pub order_date: Option<NaiveDate>,
    pub sku: String,
    pub quantity: f64,
    pub revenue: f64,
    pub country: Option<String>,
    pub source: Option<SaleSource>,
    pub month: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct SalesTable {
    rows: Vec<CleanSale>,
}

impl SalesTable {
    pub fn new(rows: Vec<CleanSale>) -> Self {
        Self { rows }
    }

    /// Rows without a sku, quantity or revenue are skipped; the clean stage
    /// never writes them.
    pub fn from_frame(df: &DataFrame) -> Result<Self> {
        let order_date = date_column(df, "order_date")?;
        let sku = text_column(df, "sku")?;
        let quantity = number_column(df, "quantity")?;
        let revenue = number_column(df, "revenue")?;
        let country = text_column(df, "country")?;
        let source = text_column(df, "source")?;
        let month = text_column(df, "month")?;

        let mut rows = Vec::with_capacity(df.height());
        let mut skipped = 0usize;
        for idx in 0..df.height() {
            let (Some(sku), Some(quantity), Some(revenue)) =
                (sku[idx].clone(), quantity[idx], revenue[idx])
            else {
                skipped += 1;
                continue;
            };
            rows.push(CleanSale {
                order_date: order_date[idx],
                sku,
                quantity,
                revenue,
                country: country[idx].clone(),
                source: source[idx]
                    .as_deref()
                    .and_then(|tag| SaleSource::try_from(tag).ok()),
                month: month[idx].clone(),
            });
        }
        if skipped > 0 {
            warn!(skipped, "cleaned table rows missing sku, quantity or revenue");
        }
        Ok(Self { rows })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let df = read_table(path)?;
        Self::from_frame(&df)
    }

    pub fn rows(&self) -> &[CleanSale] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn total_revenue(&self) -> f64 {
        total(self.rows.iter().map(|row| row.revenue))
    }

    pub fn total_quantity(&self) -> f64 {
        total(self.rows.iter().map(|row| row.quantity))
    }
}

/// Writes the files of one output group and records each path once written.
pub(crate) struct GroupWriter<'a> {
    paths: &'a PipelinePaths,
    group: OutputGroup,
    files: &'a mut Vec<PathBuf>,
}

impl<'a> GroupWriter<'a> {
    pub(crate) fn new(
        paths: &'a PipelinePaths,
        group: OutputGroup,
        files: &'a mut Vec<PathBuf>,
    ) -> Self {
        Self {
            paths,
            group,
            files,
        }
    }

    pub(crate) fn write_with(
        &mut self,
        file_name: &str,
        write: impl FnOnce(&Path) -> Result<()>,
    ) -> Result<()> {
        let path = self.paths.output(self.group, file_name);
        write(&path)?;
        self.files.push(path);
        Ok(())
    }

    pub(crate) fn breakdown(&mut self, file_name: &str, data: &Breakdown) -> Result<()> {
        self.write_with(file_name, |path| {
            let mut df = data.to_dataframe()?;
            write_table(&mut df, path)
        })
    }

    /// Single-column listing, used for SKU sets.
    pub(crate) fn key_list(
        &mut self,
        file_name: &str,
        column: &str,
        keys: &[String],
    ) -> Result<()> {
        self.write_with(file_name, |path| {
            let values: Vec<&str> = keys.iter().map(String::as_str).collect();
            let mut df = DataFrame::new(vec![Series::new(column.into(), values).into()])?;
            write_table(&mut df, path)
        })
    }
}

#[derive(Debug, Clone)]
pub struct ReportSummary {
    pub kpis: KpiSummary,
    pub files: Vec<PathBuf>,
}

/// Builds every report artifact in a fixed order, stopping at the first failure.
pub fn run(paths: &PipelinePaths) -> std::result::Result<ReportSummary, StageError> {
    info!(path = %paths.cleaned_sales.display(), "loading cleaned sales");
    let table = SalesTable::load(&paths.cleaned_sales).in_stage(Stage::Report)?;
    info!(rows = table.len(), "cleaned sales loaded");

    let mut files = Vec::new();
    let kpis = revenue::write(&table, paths, &mut files).in_stage(Stage::Report)?;
    monthly::write(&table, paths, &mut files).in_stage(Stage::Report)?;
    product::write(&table, paths, &mut files).in_stage(Stage::Report)?;
    geographic::write(&table, paths, &mut files).in_stage(Stage::Report)?;
    advanced::write(&table, paths, &mut files).in_stage(Stage::Report)?;

    info!(
        files = files.len(),
        kpi_dir = %paths.kpi_dir.display(),
        "report generated"
    );
    Ok(ReportSummary { kpis, files })
}

/// Runs the report stage; a failure is logged and never returned.
pub fn generate(paths: &PipelinePaths) -> Option<ReportSummary> {
    match run(paths) {
        Ok(summary) => Some(summary),
        Err(err) => {
            error!(error = %err, "report generation failed");
            None
        }
    }
}

#[cfg(test)]
pub(crate) fn sale(
    date: &str,
    sku: &str,
    quantity: f64,
    revenue: f64,
    country: &str,
    source: &str,
) -> CleanSale {
    CleanSale {
        order_date: crate::table::parse_order_date(date),
        sku: sku.to_string(),
        quantity,
        revenue,
        country: Some(country.to_string()),
        source: SaleSource::try_from(source).ok(),
        month: crate::clean::split_date_parts(date).month,
    }
}
