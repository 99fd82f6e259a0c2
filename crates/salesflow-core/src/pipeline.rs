use tracing::{info, warn};

use crate::clean::{self, CleanSummary};
use crate::config::PipelinePaths;
use crate::error::StageError;
use crate::merge::{self, MergeSummary};
use crate::report::{self, ReportSummary};

#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub merge: MergeSummary,
    pub clean: CleanSummary,
    /// `None` when the report stage failed; the failure has already been logged.
    pub report: Option<ReportSummary>,
}

/// Merge, then clean, then report. A merge or clean failure aborts the run
/// before any later stage starts.
pub fn run_pipeline(paths: &PipelinePaths) -> Result<PipelineOutcome, StageError> {
    info!("pipeline started");
    let merge = merge::run(paths)?;
    let clean = clean::run(paths)?;
    info!("merge and clean completed");

    let report = report::generate(paths);
    if report.is_none() {
        warn!("pipeline finished without a complete report");
    } else {
        info!("pipeline completed");
    }
    Ok(PipelineOutcome {
        merge,
        clean,
        report,
    })
}
