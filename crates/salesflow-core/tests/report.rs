use std::fs;
use std::path::{Path, PathBuf};

use salesflow_core::config::OutputGroup;
use salesflow_core::report;
use salesflow_core::table::{read_table, text_column};
use salesflow_core::{clean, merge, PipelinePaths, Stage};
use tempfile::TempDir;

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../salesflow-parser/tests/data")
        .join(name)
}

const KPI_HEADER: &str = "total_revenue,total_order,total_quantity_sold,\
Average_Order_Value,revenue_by_amazon,revenue_by_international";

fn read_kpi_csv(paths: &PipelinePaths) -> String {
    fs::read_to_string(paths.output(OutputGroup::RevenueMetrics, "Revenue_Metrics.csv"))
        .expect("read KPI table")
}

fn cleaned_workspace() -> (TempDir, PipelinePaths) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let data_dir = dir.path().join("DATA");
    fs::create_dir_all(&data_dir).expect("create data dir");
    let paths = PipelinePaths::from_dirs(&data_dir, dir.path().join("KPI"));
    fs::copy(fixture("domestic_sample.csv"), &paths.domestic_sales).expect("copy domestic");
    fs::copy(fixture("international_sample.csv"), &paths.international_sales)
        .expect("copy international");
    merge::run(&paths).expect("merge succeeds");
    clean::run(&paths).expect("clean succeeds");
    (dir, paths)
}

#[test]
fn report_computes_kpis_from_cleaned_table() {
    let (_dir, paths) = cleaned_workspace();

    let summary = report::run(&paths).expect("report succeeds");
    let kpis = &summary.kpis;
    assert_eq!(kpis.total_revenue, 6903);
    assert_eq!(kpis.total_order, 5);
    assert_eq!(kpis.total_quantity_sold, 13);
    assert_eq!(kpis.average_order_value, 1380);
    assert!(kpis.revenue_by_amazon > 3046.0 && kpis.revenue_by_amazon < 3047.0);
    assert!(kpis.revenue_by_international > 3856.0 && kpis.revenue_by_international < 3857.0);

    let kpi_csv = read_kpi_csv(&paths);
    let mut lines = kpi_csv.lines();
    assert_eq!(lines.next(), Some(KPI_HEADER));
    assert!(lines.next().expect("KPI row").starts_with("6903,5,13,1380,"));
    assert_eq!(lines.next(), None);
}

#[test]
fn kpi_row_reports_zero_for_a_source_without_rows() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let data_dir = dir.path().join("DATA");
    fs::create_dir_all(&data_dir).expect("create data dir");
    let paths = PipelinePaths::from_dirs(&data_dir, dir.path().join("KPI"));
    fs::write(
        &paths.domestic_sales,
        "Date,SKU,Qty,Amount,ship-country\n05-02-22,ab-1,1,100,IN\n",
    )
    .expect("write domestic");
    fs::write(&paths.international_sales, "DATE,SKU,PCS,GROSS AMT\n").expect("write international");

    merge::run(&paths).expect("merge succeeds");
    clean::run(&paths).expect("clean succeeds");
    let summary = report::run(&paths).expect("report succeeds");
    assert!(summary.kpis.revenue_by_international.is_sign_positive());

    let kpi_csv = read_kpi_csv(&paths);
    let mut lines = kpi_csv.lines();
    assert_eq!(lines.next(), Some(KPI_HEADER));
    let row = lines.next().expect("KPI row");
    assert!(row.ends_with(",0.0"), "unexpected KPI row {row}");
    assert_eq!(row, "100,1,1,100,100.0,0.0");
}

#[test]
fn report_writes_every_group() {
    let (_dir, paths) = cleaned_workspace();
    let summary = report::run(&paths).expect("report succeeds");

    let expected = [
        (OutputGroup::RevenueMetrics, "Revenue_Metrics.csv"),
        (OutputGroup::RevenueMetrics, "revenue_by_source.csv"),
        (OutputGroup::RevenueMetrics, "revenue_by_source.svg"),
        (OutputGroup::MonthlyAnalysis, "monthly_revenue.csv"),
        (OutputGroup::MonthlyAnalysis, "monthly_quantity_sold.csv"),
        (OutputGroup::MonthlyAnalysis, "monthly_growth.csv"),
        (OutputGroup::MonthlyAnalysis, "revenue_trend.svg"),
        (OutputGroup::ProductAnalytics, "top_skus_by_revenue.csv"),
        (OutputGroup::ProductAnalytics, "top_skus_by_quantity.csv"),
        (OutputGroup::ProductAnalytics, "product_revenue_contribution.csv"),
        (OutputGroup::ProductAnalytics, "pareto_skus.csv"),
        (OutputGroup::ProductAnalytics, "product_analytics.svg"),
        (OutputGroup::GeographicAnalysis, "revenue_by_country.csv"),
        (OutputGroup::GeographicAnalysis, "quantity_by_country.csv"),
        (OutputGroup::GeographicAnalysis, "revenue_percentage_by_country.csv"),
        (OutputGroup::GeographicAnalysis, "geographic_analysis.svg"),
        (OutputGroup::AdvancedAnalyticalFeatures, "revenue_by_day_of_week.csv"),
        (OutputGroup::AdvancedAnalyticalFeatures, "revenue_by_day_of_week.svg"),
        (OutputGroup::AdvancedAnalyticalFeatures, "rolling_7_day_revenue.csv"),
        (OutputGroup::AdvancedAnalyticalFeatures, "rolling_7_day_revenue.svg"),
        (OutputGroup::AdvancedAnalyticalFeatures, "revenue_distribution.svg"),
        (OutputGroup::AdvancedAnalyticalFeatures, "top_20_percent_skus.csv"),
    ];

    assert_eq!(summary.files.len(), expected.len());
    for (group, name) in expected {
        let path = paths.output(group, name);
        assert!(path.is_file(), "missing {}", path.display());
        assert!(summary.files.contains(&path));
    }

    let svg = fs::read_to_string(paths.output(OutputGroup::MonthlyAnalysis, "revenue_trend.svg"))
        .expect("read chart");
    assert!(svg.contains("<svg"));
}

#[test]
fn breakdown_tables_follow_their_orderings() {
    let (_dir, paths) = cleaned_workspace();
    report::run(&paths).expect("report succeeds");

    let monthly = read_table(&paths.output(OutputGroup::MonthlyAnalysis, "monthly_growth.csv"))
        .expect("read monthly growth");
    let months = text_column(&monthly, "month").expect("month column");
    let growth = text_column(&monthly, "revenue_growth_pct").expect("growth column");
    assert_eq!(
        months,
        vec![Some("04".to_string()), Some("05".to_string()), Some("06".to_string())]
    );
    assert_eq!(growth[0], None);

    let weekdays = read_table(&paths.output(
        OutputGroup::AdvancedAnalyticalFeatures,
        "revenue_by_day_of_week.csv",
    ))
    .expect("read weekday table");
    let days = text_column(&weekdays, "day_of_week").expect("day column");
    assert_eq!(days.len(), 7);
    assert_eq!(days[0].as_deref(), Some("Monday"));
    assert_eq!(days[6].as_deref(), Some("Sunday"));

    let countries = read_table(&paths.output(
        OutputGroup::GeographicAnalysis,
        "revenue_by_country.csv",
    ))
    .expect("read country table");
    let names = text_column(&countries, "country").expect("country column");
    assert_eq!(
        names,
        vec![
            Some("International".to_string()),
            Some("IN".to_string()),
            Some("US".to_string())
        ]
    );

    let pareto = read_table(&paths.output(OutputGroup::ProductAnalytics, "pareto_skus.csv"))
        .expect("read pareto table");
    assert_eq!(pareto.get_column_names_str(), ["sku"]);
    assert!(pareto.height() > 0);
}

#[test]
fn report_failure_is_logged_not_returned() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let paths = PipelinePaths::from_dirs(dir.path().join("DATA"), dir.path().join("KPI"));

    let err = report::run(&paths).expect_err("no cleaned table");
    assert_eq!(err.stage, Stage::Report);
    assert!(report::generate(&paths).is_none());
    assert!(!paths.kpi_dir.exists());
}
