use fraudlens_parser::schema::{
    ADDRESS_FIELDS, ADDRESS_JSON, PERSONAL_DETAIL_FIELDS, PERSONAL_DETAIL_JSON,
};
use polars::prelude::{Column, DataFrame, NamedFrom, PolarsError, Series};
use thiserror::Error;

use crate::unnest::struct_fields;

/// Characters that separate the first and last name inside `person_name`.
pub const NAME_DELIMITERS: [char; 3] = [',', '@', '/'];

#[derive(Debug, Error)]
pub enum FlattenError {
    #[error("column length mismatch for {column}: expected {expected}, found {found}")]
    LengthMismatch {
        column: &'static str,
        expected: usize,
        found: usize,
    },
    #[error(transparent)]
    Polars(#[from] PolarsError),
}

/// Projects the decoded personal detail and address structs into flat, typed columns and
/// drops both struct columns.
///
/// Added columns, in order: `first, last, gender, dob, street, city, state, zip, lat, long,
/// city_pop, job`. Failed numeric casts and missing name segments are null.
pub fn flatten_transaction_fields(df: &DataFrame) -> Result<DataFrame, FlattenError> {
    let rows = df.height();
    let person = struct_fields(df, PERSONAL_DETAIL_JSON, &PERSONAL_DETAIL_FIELDS)?;
    let address = struct_fields(df, ADDRESS_JSON, &ADDRESS_FIELDS)?;

    for (column, frame) in [(PERSONAL_DETAIL_JSON, &person), (ADDRESS_JSON, &address)] {
        if frame.height() != rows {
            return Err(FlattenError::LengthMismatch {
                column,
                expected: rows,
                found: frame.height(),
            });
        }
    }

    let (first, last): (Vec<Option<String>>, Vec<Option<String>>) = person
        .column("person_name")?
        .str()?
        .into_iter()
        .map(|name| name.map(split_person_name).unwrap_or((None, None)))
        .unzip();

    let lat: Vec<Option<f64>> = person
        .column("lat")?
        .str()?
        .into_iter()
        .map(|value| value.and_then(parse_double))
        .collect();
    let long: Vec<Option<f64>> = person
        .column("long")?
        .str()?
        .into_iter()
        .map(|value| value.and_then(parse_double))
        .collect();
    let city_pop: Vec<Option<i64>> = person
        .column("city_pop")?
        .str()?
        .into_iter()
        .map(|value| value.and_then(parse_integer))
        .collect();

    let columns: Vec<Column> = vec![
        Series::new("first".into(), first).into(),
        Series::new("last".into(), last).into(),
        person.column("gender")?.clone(),
        person.column("dob")?.clone(),
        address.column("street")?.clone(),
        address.column("city")?.clone(),
        address.column("state")?.clone(),
        address.column("zip")?.clone(),
        Series::new("lat".into(), lat).into(),
        Series::new("long".into(), long).into(),
        Series::new("city_pop".into(), city_pop).into(),
        person.column("job")?.clone(),
    ];

    let mut output = df.drop(PERSONAL_DETAIL_JSON)?.drop(ADDRESS_JSON)?;
    for column in columns {
        output.with_column(column)?;
    }

    Ok(output)
}

/// Splits a combined name on any of [`NAME_DELIMITERS`] and returns segments 0 and 1.
pub fn split_person_name(name: &str) -> (Option<String>, Option<String>) {
    let mut segments = name.split(|c: char| NAME_DELIMITERS.contains(&c));
    let first = segments.next().map(str::to_string);
    let last = segments.next().map(str::to_string);
    (first, last)
}

pub fn parse_double(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok()
}

/// Integer cast of a decimal string. A fractional part is truncated; anything else that is not
/// plain digits (exponents, separators, overflow) is `None`.
pub fn parse_integer(text: &str) -> Option<i64> {
    let text = text.trim();
    let (whole, fraction) = match text.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (text, None),
    };

    if let Some(fraction) = fraction {
        if !fraction.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
    }

    let digits = whole.strip_prefix(|c: char| c == '+' || c == '-').unwrap_or(whole);
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    whole.parse::<i64>().ok()
}
