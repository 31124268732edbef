use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("line {line} is not a valid JSON object: {message}")]
    CorruptRecord { line: usize, message: String },

    #[error("polars operation failed: {0}")]
    Polars(#[from] polars::error::PolarsError),
}
