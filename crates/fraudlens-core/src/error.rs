// crates/fraudlens-core/src/error.rs

use fraudlens_parser::LoaderError;
use thiserror::Error;

use crate::flatten::FlattenError;
use crate::masking::MaskingError;
use crate::summary::SummaryError;
use crate::timestamp_normalizer::TimestampError;
use crate::unnest::UnnestError;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Loading source failed: {0}")]
    Load(#[from] LoaderError),

    #[error("Polars operation failed: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("Nested JSON decoding failed: {0}")]
    Unnest(#[from] UnnestError),

    #[error("Flattening failed: {0}")]
    Flatten(#[from] FlattenError),

    #[error("Timestamp normalization failed: {0}")]
    Timestamp(#[from] TimestampError),

    #[error("Masking failed: {0}")]
    Masking(#[from] MaskingError),

    #[error("Summary failed: {0}")]
    Summary(#[from] SummaryError),

    #[error("stage {stage} changed the row count from {expected} to {found}")]
    RowCountChanged {
        stage: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("output columns {found:?} do not match the expected layout {expected:?}")]
    SchemaMismatch {
        expected: Vec<String>,
        found: Vec<String>,
    },
}

pub type Result<T> = std::result::Result<T, PipelineError>;
