use std::path::PathBuf;

use tracing::info;

use super::{GroupWriter, SalesTable};
use crate::analytics::{
    cumulative_shares, pareto_set, share_percent, sort_descending, sum_by_key, Breakdown,
};
use crate::charts::{render_grid, Chart};
use crate::config::{OutputGroup, PipelinePaths};
use crate::error::Result;

pub const TOP_SKU_COUNT: usize = 10;
pub const PARETO_THRESHOLD: f64 = 0.8;

#[derive(Debug, Clone, PartialEq)]
pub struct ProductAnalysis {
    pub top_by_revenue: Breakdown,
    pub top_by_quantity: Breakdown,
    pub revenue_contribution: Breakdown,
    pub cumulative_share: Breakdown,
    pub pareto_skus: Vec<String>,
}

/// Revenue per SKU, largest first.
pub fn sku_revenue(table: &SalesTable) -> Result<Vec<(String, f64)>> {
    let mut totals = sum_by_key(table.rows().iter().map(|row| (&row.sku, row.revenue)))?;
    sort_descending(&mut totals);
    Ok(totals)
}

pub fn analyze(table: &SalesTable) -> Result<ProductAnalysis> {
    let total = table.total_revenue();
    let revenue = sku_revenue(table)?;

    let mut quantity = sum_by_key(table.rows().iter().map(|row| (&row.sku, row.quantity)))?;
    sort_descending(&mut quantity);

    let mut contribution = share_percent(&revenue, total);
    contribution.truncate(TOP_SKU_COUNT);

    Ok(ProductAnalysis {
        top_by_revenue: Breakdown::from_totals(
            "sku",
            "revenue",
            revenue.iter().take(TOP_SKU_COUNT).cloned().collect(),
        ),
        top_by_quantity: Breakdown::from_totals(
            "sku",
            "quantity",
            quantity.into_iter().take(TOP_SKU_COUNT).collect(),
        ),
        revenue_contribution: Breakdown::new("sku", "revenue_pct", contribution),
        cumulative_share: Breakdown::new(
            "sku",
            "cumulative_share",
            cumulative_shares(&revenue, total),
        ),
        pareto_skus: pareto_set(&revenue, total, PARETO_THRESHOLD),
    })
}

pub(super) fn write(
    table: &SalesTable,
    paths: &PipelinePaths,
    files: &mut Vec<PathBuf>,
) -> Result<()> {
    let mut out = GroupWriter::new(paths, OutputGroup::ProductAnalytics, files);
    let analysis = analyze(table)?;
    info!(
        skus = analysis.cumulative_share.len(),
        pareto_skus = analysis.pareto_skus.len(),
        "product analytics computed"
    );

    out.breakdown("top_skus_by_revenue.csv", &analysis.top_by_revenue)?;
    out.breakdown("top_skus_by_quantity.csv", &analysis.top_by_quantity)?;
    out.breakdown("product_revenue_contribution.csv", &analysis.revenue_contribution)?;
    out.key_list("pareto_skus.csv", "sku", &analysis.pareto_skus)?;
    out.write_with("product_analytics.svg", |path| {
        render_grid(
            path,
            &[
                Chart::bar(
                    "Top 10 SKUs by Revenue",
                    "SKU",
                    "Revenue",
                    &analysis.top_by_revenue,
                ),
                Chart::bar(
                    "Top 10 SKUs by Quantity Sold",
                    "SKU",
                    "Quantity Sold",
                    &analysis.top_by_quantity,
                ),
                Chart::bar(
                    "Top 10 SKUs by Revenue Contribution (%)",
                    "SKU",
                    "Revenue Contribution (%)",
                    &analysis.revenue_contribution,
                ),
                Chart::line(
                    "Cumulative Revenue Percentage (Pareto Analysis)",
                    "SKU",
                    "Cumulative Revenue Percentage",
                    &analysis.cumulative_share,
                ),
            ],
        )
    })
}
