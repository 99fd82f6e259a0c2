use std::collections::HashSet;

use salesflow_parser::{
    parse_report_file, records_to_dataframe, NormalizedSale, SaleSource, SourceFrame,
};
use tracing::info;

use crate::config::PipelinePaths;
use crate::error::{Stage, StageContext, StageError};
use crate::table::write_table;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeSummary {
    pub domestic_rows: usize,
    pub international_rows: usize,
    pub duplicates_removed: usize,
    pub rows: usize,
    pub columns: usize,
}

/// Concatenates the two sources (domestic first) and drops exact duplicates,
/// keeping the first occurrence of each.
pub fn merge_frames(domestic: SourceFrame, international: SourceFrame) -> Vec<NormalizedSale> {
    let mut seen = HashSet::new();
    domestic
        .records
        .into_iter()
        .chain(international.records)
        .filter(|record| seen.insert(record.dedup_key()))
        .collect()
}

/// Loads both exports, writes the master table and returns its shape.
pub fn run(paths: &PipelinePaths) -> Result<MergeSummary, StageError> {
    info!(
        domestic = %paths.domestic_sales.display(),
        international = %paths.international_sales.display(),
        "loading source reports"
    );
    let domestic =
        parse_report_file(&paths.domestic_sales, SaleSource::Domestic).in_stage(Stage::Merge)?;
    let international = parse_report_file(&paths.international_sales, SaleSource::International)
        .in_stage(Stage::Merge)?;

    let domestic_rows = domestic.height();
    let international_rows = international.height();
    info!(domestic_rows, international_rows, "source reports normalized");

    let merged = merge_frames(domestic, international);
    let duplicates_removed = domestic_rows + international_rows - merged.len();
    info!(rows = merged.len(), duplicates_removed, "sources concatenated and deduplicated");

    let mut master = records_to_dataframe(&merged).in_stage(Stage::Merge)?;
    write_table(&mut master, &paths.master_sales).in_stage(Stage::Merge)?;

    let (rows, columns) = master.shape();
    info!(
        rows,
        columns,
        path = %paths.master_sales.display(),
        "master sales table saved"
    );

    Ok(MergeSummary {
        domestic_rows,
        international_rows,
        duplicates_removed,
        rows,
        columns,
    })
}
