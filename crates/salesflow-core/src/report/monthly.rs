use std::path::PathBuf;

use tracing::info;

use super::{CleanSale, GroupWriter, SalesTable};
use crate::analytics::{percent_change, sum_by_key, Breakdown};
use crate::charts::{render_grid, Chart};
use crate::config::{OutputGroup, PipelinePaths};
use crate::error::Result;

/// Sales grouped by the `month` segment of the order date. Months from
/// different years share a key.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyAnalysis {
    pub revenue: Breakdown,
    pub quantity: Breakdown,
    pub growth: Breakdown,
}

pub fn analyze(table: &SalesTable) -> Result<MonthlyAnalysis> {
    let by_month = |value: fn(&CleanSale) -> f64| {
        sum_by_key(
            table
                .rows()
                .iter()
                .filter_map(|row| row.month.as_deref().map(|month| (month, value(row)))),
        )
    };
    let revenue = by_month(|row| row.revenue)?;
    let quantity = by_month(|row| row.quantity)?;

    let revenue_values: Vec<f64> = revenue.iter().map(|(_, value)| *value).collect();
    let growth = revenue
        .iter()
        .map(|(month, _)| month.clone())
        .zip(percent_change(&revenue_values))
        .collect();

    Ok(MonthlyAnalysis {
        revenue: Breakdown::from_totals("month", "revenue", revenue),
        quantity: Breakdown::from_totals("month", "quantity", quantity),
        growth: Breakdown::new("month", "revenue_growth_pct", growth),
    })
}

pub(super) fn write(
    table: &SalesTable,
    paths: &PipelinePaths,
    files: &mut Vec<PathBuf>,
) -> Result<()> {
    let mut out = GroupWriter::new(paths, OutputGroup::MonthlyAnalysis, files);
    let analysis = analyze(table)?;
    info!(months = analysis.revenue.len(), "monthly analysis computed");

    out.breakdown("monthly_revenue.csv", &analysis.revenue)?;
    out.breakdown("monthly_quantity_sold.csv", &analysis.quantity)?;
    out.breakdown("monthly_growth.csv", &analysis.growth)?;
    out.write_with("revenue_trend.svg", |path| {
        render_grid(
            path,
            &[
                Chart::bar("Monthly Revenue", "Month", "Revenue", &analysis.revenue),
                Chart::bar(
                    "Monthly Quantity Sold",
                    "Month",
                    "Quantity Sold",
                    &analysis.quantity,
                ),
                Chart::bar("Monthly Growth (%)", "Month", "Growth (%)", &analysis.growth),
                Chart::line("Revenue Trend Over Months", "Month", "Revenue", &analysis.revenue),
            ],
        )
    })
}
