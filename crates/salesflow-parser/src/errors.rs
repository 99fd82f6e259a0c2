use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParserError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{parser} CSV error: {source}")]
    Csv {
        parser: &'static str,
        #[source]
        source: csv::Error,
    },

    #[error("{parser} header row is empty")]
    EmptyHeader { parser: &'static str },

    #[error("{parser} is missing required column '{column}'")]
    MissingColumn {
        parser: &'static str,
        column: &'static str,
    },
}
