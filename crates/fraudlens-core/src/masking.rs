use fraudlens_parser::schema::{CC_NUM, CC_NUM_MASKED};
use polars::prelude::{DataFrame, DataType, NamedFrom, PolarsError, Series};
use sha2::{Digest, Sha256};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MaskingError {
    #[error("polars operation failed: {0}")]
    Polars(#[from] PolarsError),
}

/// Lowercase hex SHA-256 of `value`.
pub fn sha256_hex(value: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Adds `cc_num_masked`, the SHA-256 of the canonical string form of `cc_num`.
///
/// `cc_num` itself is left in place for the output projection to remove.
pub fn mask_card_numbers(df: &DataFrame) -> Result<DataFrame, MaskingError> {
    let canonical = df.column(CC_NUM)?.cast(&DataType::String)?;
    let masked: Vec<Option<String>> = canonical
        .str()?
        .into_iter()
        .map(|value| value.map(sha256_hex))
        .collect();

    let mut output = df.clone();
    output.with_column(Series::new(CC_NUM_MASKED.into(), masked))?;
    Ok(output)
}
