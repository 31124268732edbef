use anyhow::Result;
use fraudlens_core::preview::preview_table;
use fraudlens_core::timestamp_normalizer::target_datetime_dtype;
use polars::prelude::*;

#[test]
fn preview_limits_rows_and_prints_nulls() -> Result<()> {
    let df = df![
        "category" => [Some("grocery"), None, Some("travel")],
        "amt" => [Some(1.5), Some(2.0), None],
    ]?;

    let table = preview_table(&df, 2)?;
    let rendered = table.to_string();

    assert_eq!(table.row_iter().count(), 2);
    assert!(rendered.contains("grocery"));
    assert!(rendered.contains("null"));
    assert!(!rendered.contains("travel"));
    Ok(())
}

#[test]
fn preview_renders_timestamps_in_the_target_zone() -> Result<()> {
    // 2021-01-01 00:00:00 in Kuala Lumpur
    let micros = Series::new("merch_eff_time".into(), [1_609_430_400_000_000i64])
        .cast(&target_datetime_dtype()?)?;
    let df = DataFrame::new(vec![micros.into()])?;

    let rendered = preview_table(&df, 20)?.to_string();
    assert!(rendered.contains("2021-01-01 00:00:00.000000 +08"), "{rendered}");
    Ok(())
}
