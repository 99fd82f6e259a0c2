use std::path::PathBuf;

use tracing::info;

use super::{CleanSale, GroupWriter, SalesTable};
use crate::analytics::{share_percent, sort_descending, sum_by_key, Breakdown};
use crate::charts::{render_grid, Chart};
use crate::config::{OutputGroup, PipelinePaths};
use crate::error::Result;

#[derive(Debug, Clone, PartialEq)]
pub struct GeographicAnalysis {
    pub revenue: Breakdown,
    pub quantity: Breakdown,
    pub revenue_share: Breakdown,
}

pub fn analyze(table: &SalesTable) -> Result<GeographicAnalysis> {
    let by_country = |value: fn(&CleanSale) -> f64| -> Result<Vec<(String, f64)>> {
        let mut totals = sum_by_key(
            table
                .rows()
                .iter()
                .filter_map(|row| row.country.as_deref().map(|country| (country, value(row)))),
        )?;
        sort_descending(&mut totals);
        Ok(totals)
    };
    let revenue = by_country(|row| row.revenue)?;
    let quantity = by_country(|row| row.quantity)?;
    let shares = share_percent(&revenue, table.total_revenue());

    Ok(GeographicAnalysis {
        revenue: Breakdown::from_totals("country", "revenue", revenue),
        quantity: Breakdown::from_totals("country", "quantity", quantity),
        revenue_share: Breakdown::new("country", "revenue_pct", shares),
    })
}

pub(super) fn write(
    table: &SalesTable,
    paths: &PipelinePaths,
    files: &mut Vec<PathBuf>,
) -> Result<()> {
    let mut out = GroupWriter::new(paths, OutputGroup::GeographicAnalysis, files);
    let analysis = analyze(table)?;
    info!(countries = analysis.revenue.len(), "geographic analysis computed");

    out.breakdown("revenue_by_country.csv", &analysis.revenue)?;
    out.breakdown("quantity_by_country.csv", &analysis.quantity)?;
    out.breakdown("revenue_percentage_by_country.csv", &analysis.revenue_share)?;
    out.write_with("geographic_analysis.svg", |path| {
        render_grid(
            path,
            &[
                Chart::bar("Revenue by Country", "Country", "Revenue", &analysis.revenue),
                Chart::bar(
                    "Quantity Sold by Country",
                    "Country",
                    "Quantity Sold",
                    &analysis.quantity,
                ),
                Chart::bar(
                    "Revenue % Contribution by Country",
                    "Country",
                    "Revenue % Contribution",
                    &analysis.revenue_share,
                ),
            ],
        )
    })
}
