pub mod analytics;
pub mod charts;
pub mod clean;
pub mod config;
pub mod error;
pub mod merge;
pub mod pipeline;
pub mod report;
pub mod table;

pub use config::{OutputGroup, PipelinePaths};
pub use error::{PipelineError, Result, Stage, StageContext, StageError};
pub use pipeline::{run_pipeline, PipelineOutcome};
