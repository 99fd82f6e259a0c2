// crates/salesflow-core/src/error.rs

use std::fmt;
use std::panic::Location;

use plotters::drawing::DrawingAreaErrorKind;
use salesflow_parser::ParserError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars operation failed: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Source report could not be parsed: {0}")]
    Parser(#[from] ParserError),

    #[error("Chart rendering failed: {0}")]
    Chart(#[from] DrawingAreaErrorKind<std::io::Error>),
}

pub type Result<T> = std::result::Result<T, PipelineError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Merge,
    Clean,
    Report,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Merge => "merge",
            Stage::Clean => "clean",
            Stage::Report => "report",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A pipeline failure tagged with the stage and the source location that
/// observed it.
#[derive(Error, Debug)]
#[error("{stage} stage failed in [{file}] line [{line}]: {source}")]
pub struct StageError {
    pub stage: Stage,
    pub file: &'static str,
    pub line: u32,
    #[source]
    pub source: PipelineError,
}

impl StageError {
    pub fn new(stage: Stage, source: PipelineError, location: &'static Location<'static>) -> Self {
        Self {
            stage,
            file: location.file(),
            line: location.line(),
            source,
        }
    }
}

pub trait StageContext<T> {
    /// Wraps the error with `stage` and the caller's file and line.
    fn in_stage(self, stage: Stage) -> std::result::Result<T, StageError>;
}

impl<T, E> StageContext<T> for std::result::Result<T, E>
where
    E: Into<PipelineError>,
{
    #[track_caller]
    fn in_stage(self, stage: Stage) -> std::result::Result<T, StageError> {
        match self {
            Ok(value) => Ok(value),
            Err(err) => Err(StageError::new(stage, err.into(), Location::caller())),
        }
    }
}
