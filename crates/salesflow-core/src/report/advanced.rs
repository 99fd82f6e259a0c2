use std::path::PathBuf;

use tracing::info;

use super::product::sku_revenue;
use super::{GroupWriter, SalesTable};
use crate::analytics::{
    cumulative_share_within, rolling_mean, sum_by_key, weekday_totals, Breakdown,
};
use crate::charts::{render_chart, render_distribution, Chart};
use crate::config::{OutputGroup, PipelinePaths};
use crate::error::Result;
use crate::table::format_order_date;

pub const ROLLING_WINDOW: usize = 7;
pub const TOP_SHARE_LIMIT: f64 = 0.2;

#[derive(Debug, Clone, PartialEq)]
pub struct AdvancedAnalysis {
    pub revenue_by_weekday: Breakdown,
    pub rolling_revenue: Breakdown,
    pub revenues: Vec<f64>,
    pub top_share_skus: Vec<String>,
}

/// Daily revenue totals keyed by ISO date, so key order is date order. Rows
/// without a date are left out.
pub fn daily_revenue(table: &SalesTable) -> Result<Vec<(String, f64)>> {
    let totals = sum_by_key(table.rows().iter().filter_map(|row| {
        row.order_date.map(|date| (format_order_date(date), row.revenue))
    }))?;
    Ok(totals)
}

pub fn analyze(table: &SalesTable) -> Result<AdvancedAnalysis> {
    let revenue_by_weekday = Breakdown::new(
        "day_of_week",
        "revenue",
        weekday_totals(
            table
                .rows()
                .iter()
                .filter_map(|row| row.order_date.map(|date| (date, row.revenue))),
        ),
    );

    let daily = daily_revenue(table)?;
    let daily_values: Vec<f64> = daily.iter().map(|(_, value)| *value).collect();
    let rolling = daily
        .into_iter()
        .map(|(date, _)| date)
        .zip(rolling_mean(&daily_values, ROLLING_WINDOW))
        .collect();

    Ok(AdvancedAnalysis {
        revenue_by_weekday,
        rolling_revenue: Breakdown::new("order_date", "revenue", rolling),
        revenues: table.rows().iter().map(|row| row.revenue).collect(),
        top_share_skus: cumulative_share_within(
            &sku_revenue(table)?,
            table.total_revenue(),
            TOP_SHARE_LIMIT,
        ),
    })
}

pub(super) fn write(
    table: &SalesTable,
    paths: &PipelinePaths,
    files: &mut Vec<PathBuf>,
) -> Result<()> {
    let mut out = GroupWriter::new(paths, OutputGroup::AdvancedAnalyticalFeatures, files);
    let analysis = analyze(table)?;
    info!(
        days = analysis.rolling_revenue.len(),
        top_share_skus = analysis.top_share_skus.len(),
        "advanced analytics computed"
    );

    out.breakdown("revenue_by_day_of_week.csv", &analysis.revenue_by_weekday)?;
    out.write_with("revenue_by_day_of_week.svg", |path| {
        render_chart(
            path,
            &Chart::bar(
                "Revenue by Day of Week",
                "Day of Week",
                "Revenue",
                &analysis.revenue_by_weekday,
            ),
        )
    })?;

    out.breakdown("rolling_7_day_revenue.csv", &analysis.rolling_revenue)?;
    out.write_with("rolling_7_day_revenue.svg", |path| {
        render_chart(
            path,
            &Chart::line(
                "Rolling 7-Day Average Revenue",
                "Date",
                "Rolling 7-Day Average Revenue",
                &analysis.rolling_revenue,
            ),
        )
    })?;

    out.write_with("revenue_distribution.svg", |path| {
        render_distribution(path, &analysis.revenues)
    })?;
    out.key_list("top_20_percent_skus.csv", "sku", &analysis.top_share_skus)
}
