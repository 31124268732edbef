use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use blake3::Hasher;
use polars::prelude::{Column, DataFrame, NamedFrom, Series};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::errors::LoaderError;
use crate::model::{CorruptRecordMode, LoadReport, LoadedSource};
use crate::nested::value_to_text;
use crate::schema::RAW_COLUMNS;

type JsonRecord = Map<String, Value>;

/// Column type inferred from every value seen under one key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InferredKind {
    Null,
    Boolean,
    Integer,
    Float,
    Text,
}

impl InferredKind {
    fn of(value: &Value) -> Self {
        match value {
            Value::Null => InferredKind::Null,
            Value::Bool(_) => InferredKind::Boolean,
            Value::Number(number) if number.is_i64() => InferredKind::Integer,
            // wider than i64 (19-digit card numbers); kept as exact digits
            Value::Number(number) if number.is_u64() => InferredKind::Text,
            Value::Number(_) => InferredKind::Float,
            Value::String(_) | Value::Array(_) | Value::Object(_) => InferredKind::Text,
        }
    }

    fn merge(self, other: Self) -> Self {
        use InferredKind::*;
        match (self, other) {
            (a, b) if a == b => a,
            (Null, kind) | (kind, Null) => kind,
            (Integer, Float) | (Float, Integer) => Float,
            _ => Text,
        }
    }
}

/// Reads a newline-delimited JSON file into a DataFrame with an inferred schema.
///
/// An unreadable file is fatal; corrupt lines follow `mode`.
pub fn load_json_lines(
    path: impl AsRef<Path>,
    mode: CorruptRecordMode,
) -> Result<LoadedSource, LoaderError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| LoaderError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_json_lines_from_str(&content, mode, &path.display().to_string())
}

pub fn load_json_lines_from_str(
    content: &str,
    mode: CorruptRecordMode,
    source: &str,
) -> Result<LoadedSource, LoaderError> {
    let mut records: Vec<Option<JsonRecord>> = Vec::new();
    let mut corrupt_lines = Vec::new();
    let mut total_lines = 0usize;

    for (idx, line) in content.lines().enumerate() {
        let line_number = idx + 1;
        if line.trim().is_empty() {
            continue;
        }
        total_lines += 1;

        match parse_record(line) {
            Ok(record) => records.push(Some(record)),
            Err(message) => match mode {
                CorruptRecordMode::FailFast => {
                    return Err(LoaderError::CorruptRecord {
                        line: line_number,
                        message,
                    });
                }
                CorruptRecordMode::Permissive => {
                    warn!(line = line_number, %message, "corrupt record kept as null row");
                    corrupt_lines.push(line_number);
                    records.push(None);
                }
                CorruptRecordMode::DropMalformed => {
                    warn!(line = line_number, %message, "corrupt record dropped");
                    corrupt_lines.push(line_number);
                }
            },
        }
    }

    let frame = build_frame(&records)?;
    debug!(
        columns = frame.width(),
        rows = frame.height(),
        "inferred json lines schema"
    );

    let report = LoadReport {
        source: source.to_string(),
        content_hash: compute_hash(content.as_bytes()),
        mode,
        total_lines,
        loaded_rows: frame.height(),
        corrupt_lines,
    };
    info!(
        source = %report.source,
        rows = report.loaded_rows,
        corrupt = report.corrupt_lines.len(),
        "loaded json lines source"
    );

    Ok(LoadedSource { frame, report })
}

fn parse_record(line: &str) -> Result<JsonRecord, String> {
    match serde_json::from_str::<Value>(line) {
        Ok(Value::Object(record)) => Ok(record),
        Ok(other) => Err(format!("expected a JSON object, found {}", json_type_name(&other))),
        Err(err) => Err(err.to_string()),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Top-level columns come out sorted by name, one per key seen anywhere in the file plus
/// every [`RAW_COLUMNS`] entry. The frame always has one row per entry of `records`.
fn build_frame(records: &[Option<JsonRecord>]) -> Result<DataFrame, LoaderError> {
    let mut kinds: BTreeMap<&str, InferredKind> = RAW_COLUMNS
        .iter()
        .map(|name| (*name, InferredKind::Null))
        .collect();
    for record in records.iter().flatten() {
        for (key, value) in record {
            let kind = InferredKind::of(value);
            kinds
                .entry(key.as_str())
                .and_modify(|existing| *existing = existing.merge(kind))
                .or_insert(kind);
        }
    }

    let mut columns: Vec<Column> = Vec::with_capacity(kinds.len());
    for (name, kind) in &kinds {
        columns.push(build_column(name, *kind, records));
    }

    Ok(DataFrame::new(columns)?)
}

fn build_column(name: &str, kind: InferredKind, records: &[Option<JsonRecord>]) -> Column {
    let values = records
        .iter()
        .map(|record| record.as_ref().and_then(|fields| fields.get(name)));

    let series = match kind {
        InferredKind::Boolean => Series::new(
            name.into(),
            values
                .map(|value| value.and_then(Value::as_bool))
                .collect::<Vec<Option<bool>>>(),
        ),
        InferredKind::Integer => Series::new(
            name.into(),
            values
                .map(|value| value.and_then(Value::as_i64))
                .collect::<Vec<Option<i64>>>(),
        ),
        InferredKind::Float => Series::new(
            name.into(),
            values
                .map(|value| value.and_then(Value::as_f64))
                .collect::<Vec<Option<f64>>>(),
        ),
        InferredKind::Null | InferredKind::Text => Series::new(
            name.into(),
            values
                .map(|value| value.and_then(value_to_text))
                .collect::<Vec<Option<String>>>(),
        ),
    };

    series.into()
}

fn compute_hash(contents: &[u8]) -> String {
    let mut hasher = Hasher::new();
    hasher.update(contents);
    let hash = hasher.finalize();
    hash.to_hex().to_string()
}
