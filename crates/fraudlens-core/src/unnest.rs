//! Decoding of the JSON documents carried inside string columns into struct columns.

use fraudlens_parser::decode_json_records;
use fraudlens_parser::schema::{
    ADDRESS_FIELDS, ADDRESS_JSON, PERSONAL_DETAIL, PERSONAL_DETAIL_FIELDS, PERSONAL_DETAIL_JSON,
};
use polars::lazy::dsl::{as_struct, col};
use polars::prelude::*;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum UnnestError {
    #[error("required column {0} is missing")]
    MissingColumn(&'static str),
    #[error(transparent)]
    Polars(#[from] PolarsError),
}

/// Replaces the `personal_detail` JSON string with the `personal_detail_json` struct column.
///
/// Rows whose string is null, invalid JSON or not an object get a struct with every field null.
pub fn parse_personal_detail(df: &DataFrame) -> Result<DataFrame, UnnestError> {
    if df.get_column_index(PERSONAL_DETAIL).is_none() {
        return Err(UnnestError::MissingColumn(PERSONAL_DETAIL));
    }

    let source = df.column(PERSONAL_DETAIL)?.cast(&DataType::String)?;
    let texts = source.str()?;
    let decoded = decode_json_records(texts, &PERSONAL_DETAIL_FIELDS);
    let undecoded = undecoded_rows(texts, &decoded);
    debug!(rows = df.height(), undecoded, "decoded personal_detail");
    let nested = build_struct_column(PERSONAL_DETAIL_JSON, &PERSONAL_DETAIL_FIELDS, decoded)?;

    let mut output = df.drop(PERSONAL_DETAIL)?;
    output.with_column(nested)?;
    Ok(output)
}

/// Adds `address_json`, decoded from `personal_detail_json.address`, next to
/// `personal_detail_json`.
pub fn parse_address(df: &DataFrame) -> Result<DataFrame, UnnestError> {
    if df.get_column_index(PERSONAL_DETAIL_JSON).is_none() {
        return Err(UnnestError::MissingColumn(PERSONAL_DETAIL_JSON));
    }

    let fields = struct_fields(df, PERSONAL_DETAIL_JSON, &["address"])?;
    let texts = fields.column("address")?.str()?;
    let decoded = decode_json_records(texts, &ADDRESS_FIELDS);
    let undecoded = undecoded_rows(texts, &decoded);
    debug!(rows = df.height(), undecoded, "decoded address");
    let nested = build_struct_column(ADDRESS_JSON, &ADDRESS_FIELDS, decoded)?;

    let mut output = df.clone();
    output.with_column(nested)?;
    Ok(output)
}

/// Projects the named fields of a struct column into a DataFrame of top-level columns.
pub(crate) fn struct_fields(
    df: &DataFrame,
    struct_column: &str,
    fields: &[&str],
) -> Result<DataFrame, PolarsError> {
    let exprs: Vec<Expr> = fields
        .iter()
        .map(|field| col(struct_column).struct_().field_by_name(field).alias(*field))
        .collect();
    df.clone().lazy().select(exprs).collect()
}

fn build_struct_column(
    name: &str,
    fields: &[&str],
    values: Vec<Vec<Option<String>>>,
) -> Result<Column, PolarsError> {
    let columns: Vec<Column> = fields
        .iter()
        .zip(values)
        .map(|(field, column_values)| Series::new((*field).into(), column_values).into())
        .collect();

    let nested = DataFrame::new(columns)?
        .lazy()
        .select([as_struct(fields.iter().map(|field| col(*field)).collect()).alias(name)])
        .collect()?;

    Ok(nested.column(name)?.clone())
}

/// Rows with a source string whose decoded record has no non-null field.
fn undecoded_rows(texts: &StringChunked, decoded: &[Vec<Option<String>>]) -> usize {
    texts
        .into_iter()
        .enumerate()
        .filter(|(idx, text)| {
            text.is_some() && decoded.iter().all(|column| column[*idx].is_none())
        })
        .count()
}
