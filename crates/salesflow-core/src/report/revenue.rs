use std::fs::File;
use std::path::PathBuf;

use salesflow_parser::SaleSource;
use serde::Serialize;
use tracing::info;

use super::{GroupWriter, SalesTable};
use crate::analytics::{average_order_value, distinct_count, sum_by_key, total, Breakdown};
use crate::charts::{render_chart, Chart};
use crate::config::{OutputGroup, PipelinePaths};
use crate::error::Result;
use crate::table::ensure_parent_dir;

/// Single-row headline metrics. Field names are the CSV header.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiSummary {
    pub total_revenue: i64,
    pub total_order: usize,
    pub total_quantity_sold: i64,
    #[serde(rename = "Average_Order_Value")]
    pub average_order_value: i64,
    pub revenue_by_amazon: f64,
    pub revenue_by_international: f64,
}

pub fn kpi_summary(table: &SalesTable) -> KpiSummary {
    let total_revenue = table.total_revenue().trunc() as i64;
    let total_order = distinct_count(table.rows().iter().filter_map(|row| row.order_date));
    let revenue_for = |source: SaleSource| -> f64 {
        total(
            table
                .rows()
                .iter()
                .filter(|row| row.source == Some(source))
                .map(|row| row.revenue),
        )
    };

    KpiSummary {
        total_revenue,
        total_order,
        total_quantity_sold: table.total_quantity().trunc() as i64,
        average_order_value: average_order_value(total_revenue, total_order),
        revenue_by_amazon: revenue_for(SaleSource::Domestic),
        revenue_by_international: revenue_for(SaleSource::International),
    }
}

pub fn revenue_by_source(table: &SalesTable) -> Result<Breakdown> {
    let totals = sum_by_key(
        table
            .rows()
            .iter()
            .filter_map(|row| row.source.map(|source| (source.as_str(), row.revenue))),
    )?;
    Ok(Breakdown::from_totals("source", "revenue", totals))
}

pub(super) fn write(
    table: &SalesTable,
    paths: &PipelinePaths,
    files: &mut Vec<PathBuf>,
) -> Result<KpiSummary> {
    let mut out = GroupWriter::new(paths, OutputGroup::RevenueMetrics, files);

    let kpis = kpi_summary(table);
    info!(
        total_revenue = kpis.total_revenue,
        total_order = kpis.total_order,
        total_quantity_sold = kpis.total_quantity_sold,
        average_order_value = kpis.average_order_value,
        "revenue metrics computed"
    );
    out.write_with("Revenue_Metrics.csv", |path| {
        ensure_parent_dir(path)?;
        let mut writer = csv::Writer::from_writer(File::create(path)?);
        writer.serialize(&kpis)?;
        writer.flush()?;
        Ok(())
    })?;

    let by_source = revenue_by_source(table)?;
    out.breakdown("revenue_by_source.csv", &by_source)?;
    out.write_with("revenue_by_source.svg", |path| {
        let chart = Chart::bar("Revenue by Source", "Source", "Revenue", &by_source);
        render_chart(path, &chart)
    })?;
    Ok(kpis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::sale;

    fn sample() -> SalesTable {
        SalesTable::new(vec![
            sale("2022-04-30", "A", 2.0, 400.5, "IN", "domestic"),
            sale("2022-04-30", "B", 1.0, 300.0, "IN", "domestic"),
            sale("2022-05-01", "A", 3.0, 299.9, "International", "international"),
        ])
    }

    #[test]
    fn kpis_truncate_totals_and_split_by_source() {
        let kpis = kpi_summary(&sample());
        assert_eq!(kpis.total_revenue, 1000);
        assert_eq!(kpis.total_order, 2);
        assert_eq!(kpis.total_quantity_sold, 6);
        assert_eq!(kpis.average_order_value, 500);
        assert!((kpis.revenue_by_amazon - 700.5).abs() < 1e-9);
        assert!((kpis.revenue_by_international - 299.9).abs() < 1e-9);
    }

    #[test]
    fn empty_table_has_zero_order_value() {
        let kpis = kpi_summary(&SalesTable::default());
        assert_eq!(kpis.total_order, 0);
        assert_eq!(kpis.average_order_value, 0);
        assert!(kpis.revenue_by_amazon.is_sign_positive());
        assert!(kpis.revenue_by_international.is_sign_positive());
    }

    #[test]
    fn missing_source_reports_positive_zero() {
        let table = SalesTable::new(vec![sale("2022-04-30", "A", 1.0, 100.0, "IN", "domestic")]);
        let kpis = kpi_summary(&table);
        assert_eq!(kpis.revenue_by_amazon, 100.0);
        assert_eq!(kpis.revenue_by_international, 0.0);
        assert!(kpis.revenue_by_international.is_sign_positive());
    }

    #[test]
    fn revenue_by_source_is_keyed_by_tag() {
        let breakdown = revenue_by_source(&sample()).expect("grouped revenue");
        assert_eq!(breakdown.keys(), vec!["domestic", "international"]);
        assert_eq!(breakdown.get("international"), Some(299.9));
    }
}
