use chrono::offset::LocalResult;
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Offset, TimeZone as _, Utc};
use chrono_tz::Tz;
use fraudlens_parser::schema::{EPOCH_MICROS_COLUMNS, TRANS_DATE_TRANS_TIME};
use polars::prelude::{Column, DataFrame, DataType, NamedFrom, PolarsError, Series, TimeUnit};
use thiserror::Error;
use tracing::debug;

/// Zone every normalized timestamp is labelled with.
pub const TARGET_TIMEZONE: &str = "Asia/Kuala_Lumpur";
pub const TARGET_TZ: Tz = chrono_tz::Asia::Kuala_Lumpur;

const OFFSET_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
];

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

#[derive(Debug, Error)]
pub enum TimestampError {
    #[error("polars operation failed: {0}")]
    Polars(#[from] PolarsError),
    #[error("time zone {0} is not known to polars")]
    UnknownTimeZone(&'static str),
}

/// `Datetime[μs, Asia/Kuala_Lumpur]`.
pub fn target_datetime_dtype() -> Result<DataType, TimestampError> {
    let tz = polars::prelude::TimeZone::opt_try_new(Some(TARGET_TIMEZONE))?
        .ok_or(TimestampError::UnknownTimeZone(TARGET_TIMEZONE))?;
    Ok(DataType::Datetime(TimeUnit::Microseconds, Some(tz)))
}

/// Replaces `trans_date_trans_time` and the epoch-microsecond merchant columns with
/// timestamps labelled in [`TARGET_TIMEZONE`]. Column names and positions are kept.
///
/// Epoch values are read as a UTC wall clock and that wall clock is relabelled into the
/// target zone, so `1609459200000000` reads `2021-01-01 00:00:00` in Kuala Lumpur.
pub fn normalize_timestamps(df: &DataFrame) -> Result<DataFrame, TimestampError> {
    let dtype = target_datetime_dtype()?;
    let mut output = df.clone();

    let text = df.column(TRANS_DATE_TRANS_TIME)?.cast(&DataType::String)?;
    let parsed: Vec<Option<i64>> = text
        .str()?
        .into_iter()
        .map(|value| value.and_then(parse_transaction_time))
        .collect();
    debug!(
        column = TRANS_DATE_TRANS_TIME,
        unparsed = parsed.iter().filter(|v| v.is_none()).count(),
        "parsed transaction timestamps"
    );
    output.with_column(datetime_column(TRANS_DATE_TRANS_TIME, parsed, &dtype)?)?;

    for name in EPOCH_MICROS_COLUMNS {
        let raw = df.column(name)?.cast(&DataType::Int64)?;
        let relabelled: Vec<Option<i64>> = raw
            .i64()?
            .into_iter()
            .map(|value| value.and_then(relabel_epoch_micros))
            .collect();
        output.with_column(datetime_column(name, relabelled, &dtype)?)?;
    }

    Ok(output)
}

fn datetime_column(
    name: &str,
    micros: Vec<Option<i64>>,
    dtype: &DataType,
) -> Result<Column, PolarsError> {
    let series = Series::new(name.into(), micros).cast(dtype)?;
    Ok(series.into())
}

/// Parses a transaction timestamp string and returns the instant in UTC microseconds.
///
/// Strings carrying an offset are true instants. Naive strings are wall clocks in the target
/// zone. Unrecognized input is `None`.
pub fn parse_transaction_time(text: &str) -> Option<i64> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.timestamp_micros());
    }
    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(text, format) {
            return Some(dt.timestamp_micros());
        }
    }
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(localize_wall_clock(naive, TARGET_TZ));
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| localize_wall_clock(naive, TARGET_TZ))
}

/// Reads epoch microseconds as a UTC wall clock and relabels it into the target zone.
pub fn relabel_epoch_micros(value: i64) -> Option<i64> {
    naive_from_micros(value).map(|naive| localize_wall_clock(naive, TARGET_TZ))
}

/// UTC microseconds of `naive` read as a wall clock in `tz`.
///
/// Ambiguous readings take the earliest instant; readings inside a gap use the offset in effect
/// at the same UTC reading.
pub fn localize_wall_clock(naive: NaiveDateTime, tz: Tz) -> i64 {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => dt.timestamp_micros(),
        LocalResult::Ambiguous(earliest, _) => earliest.timestamp_micros(),
        LocalResult::None => {
            let offset = tz.offset_from_utc_datetime(&naive).fix().local_minus_utc();
            (naive - Duration::seconds(i64::from(offset)))
                .and_utc()
                .timestamp_micros()
        }
    }
}

/// Wall clock of a normalized timestamp in the target zone.
pub fn target_wall_clock(micros: i64) -> Option<NaiveDateTime> {
    TARGET_TZ
        .timestamp_micros(micros)
        .single()
        .map(|dt| dt.naive_local())
}

fn naive_from_micros(value: i64) -> Option<NaiveDateTime> {
    let secs = value.div_euclid(1_000_000);
    let micros = value.rem_euclid(1_000_000) as u32;
    DateTime::<Utc>::from_timestamp(secs, micros * 1_000).map(|dt| dt.naive_utc())
}
