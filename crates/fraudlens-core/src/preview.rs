use chrono::TimeZone as _;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};
use polars::prelude::{AnyValue, DataFrame, PolarsError};

use crate::timestamp_normalizer::TARGET_TZ;

/// Formats the first `rows` rows of `df` as a table. Nulls print as `null` and timestamps as
/// wall clocks in the target zone.
pub fn preview_table(df: &DataFrame, rows: usize) -> Result<Table, PolarsError> {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(
        df.get_column_names()
            .iter()
            .map(|name| name.to_string())
            .collect::<Vec<String>>(),
    );

    for idx in 0..rows.min(df.height()) {
        let mut cells = Vec::with_capacity(df.width());
        for column in df.get_columns() {
            cells.push(format_value(&column.get(idx)?));
        }
        table.add_row(cells);
    }

    Ok(table)
}

fn format_value(value: &AnyValue<'_>) -> String {
    match value {
        AnyValue::Null => "null".to_string(),
        AnyValue::String(text) => text.to_string(),
        AnyValue::StringOwned(text) => text.to_string(),
        AnyValue::Datetime(micros, _, _) => format_timestamp(*micros),
        AnyValue::DatetimeOwned(micros, _, _) => format_timestamp(*micros),
        other => other.to_string(),
    }
}

fn format_timestamp(micros: i64) -> String {
    match TARGET_TZ.timestamp_micros(micros).single() {
        Some(local) => local.format("%Y-%m-%d %H:%M:%S%.6f %Z").to_string(),
        None => micros.to_string(),
    }
}
