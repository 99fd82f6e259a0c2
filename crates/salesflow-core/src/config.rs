use std::path::{Path, PathBuf};

pub const DEFAULT_DATA_DIR: &str = "DATA";
pub const DEFAULT_KPI_DIR: &str = "KPI";

const DOMESTIC_SALES_FILE: &str = "Amazon Sale Report.csv";
const INTERNATIONAL_SALES_FILE: &str = "International Sale Report.csv";
const MASTER_SALES_FILE: &str = "master_sales.csv";
const CLEANED_SALES_FILE: &str = "cleaned_master_sales.csv";

/// Every file location the pipeline reads or writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelinePaths {
    pub domestic_sales: PathBuf,
    pub international_sales: PathBuf,
    pub master_sales: PathBuf,
    pub cleaned_sales: PathBuf,
    pub kpi_dir: PathBuf,
}

impl Default for PipelinePaths {
    fn default() -> Self {
        Self::from_dirs(DEFAULT_DATA_DIR, DEFAULT_KPI_DIR)
    }
}

impl PipelinePaths {
    pub fn from_dirs(data_dir: impl AsRef<Path>, kpi_dir: impl AsRef<Path>) -> Self {
        let data_dir = data_dir.as_ref();
        Self {
            domestic_sales: data_dir.join(DOMESTIC_SALES_FILE),
            international_sales: data_dir.join(INTERNATIONAL_SALES_FILE),
            master_sales: data_dir.join(MASTER_SALES_FILE),
            cleaned_sales: data_dir.join(CLEANED_SALES_FILE),
            kpi_dir: kpi_dir.as_ref().to_path_buf(),
        }
    }

    pub fn group_dir(&self, group: OutputGroup) -> PathBuf {
        self.kpi_dir.join(group.dir_name())
    }

    pub fn output(&self, group: OutputGroup, file_name: &str) -> PathBuf {
        self.group_dir(group).join(file_name)
    }
}

/// Named output folders under the KPI directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputGroup {
    RevenueMetrics,
    MonthlyAnalysis,
    ProductAnalytics,
    GeographicAnalysis,
    AdvancedAnalyticalFeatures,
}

impl OutputGroup {
    pub const ALL: [OutputGroup; 5] = [
        OutputGroup::RevenueMetrics,
        OutputGroup::MonthlyAnalysis,
        OutputGroup::ProductAnalytics,
        OutputGroup::GeographicAnalysis,
        OutputGroup::AdvancedAnalyticalFeatures,
    ];

    pub fn dir_name(&self) -> &'static str {
        match self {
            OutputGroup::RevenueMetrics => "Revenue_Metrics",
            OutputGroup::MonthlyAnalysis => "Monthly_Analysis",
            OutputGroup::ProductAnalytics => "Product_Analytics",
            OutputGroup::GeographicAnalysis => "Geographic_Analysis",
            OutputGroup::AdvancedAnalyticalFeatures => "Advanced_Analytical_Features",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_layout_matches_fixed_paths() {
        let paths = PipelinePaths::default();
        assert_eq!(
            paths.domestic_sales,
            PathBuf::from("DATA/Amazon Sale Report.csv")
        );
        assert_eq!(
            paths.international_sales,
            PathBuf::from("DATA/International Sale Report.csv")
        );
        assert_eq!(paths.master_sales, PathBuf::from("DATA/master_sales.csv"));
        assert_eq!(
            paths.cleaned_sales,
            PathBuf::from("DATA/cleaned_master_sales.csv")
        );
        assert_eq!(
            paths.output(OutputGroup::ProductAnalytics, "pareto_skus.csv"),
            PathBuf::from("KPI/Product_Analytics/pareto_skus.csv")
        );
    }

    #[test]
    fn output_groups_live_under_kpi_dir() {
        let paths = PipelinePaths::from_dirs("in", "out");
        let dirs: Vec<PathBuf> = OutputGroup::ALL
            .iter()
            .map(|group| paths.group_dir(*group))
            .collect();
        assert_eq!(dirs[0], PathBuf::from("out/Revenue_Metrics"));
        assert_eq!(dirs[4], PathBuf::from("out/Advanced_Analytical_Features"));
        assert!(dirs.iter().all(|dir| dir.starts_with("out")));
    }
}
