use std::fs;
use std::path::PathBuf;

use polars::prelude::DataType;

use crate::errors::LoaderError;
use crate::model::CorruptRecordMode;
use crate::nested::{decode_json_record, decode_json_records};
use crate::schema::{ADDRESS_FIELDS, PERSONAL_DETAIL_FIELDS, RAW_COLUMNS};
use crate::{load_json_lines, load_json_lines_from_str};

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/data")
        .join(name)
}

fn fixture(name: &str) -> String {
    let full_path = fixture_path(name);
    fs::read_to_string(&full_path)
        .unwrap_or_else(|err| panic!("failed to read fixture {}: {}", full_path.display(), err))
}

#[test]
fn loads_fixture_with_sorted_inferred_schema() {
    let loaded = load_json_lines(fixture_path("transactions.jsonl"), CorruptRecordMode::Permissive)
        .expect("load failed");
    let df = &loaded.frame;

    assert_eq!(df.height(), 5);
    assert_eq!(
        df.get_column_names(),
        [
            "amt",
            "category",
            "cc_num",
            "is_fraud",
            "merch_eff_time",
            "merch_last_update_time",
            "personal_detail",
            "trans_date_trans_time",
        ]
    );
    assert_eq!(df.column("amt").unwrap().dtype(), &DataType::Float64);
    assert_eq!(df.column("is_fraud").unwrap().dtype(), &DataType::Int64);
    assert_eq!(df.column("merch_eff_time").unwrap().dtype(), &DataType::Int64);
    assert_eq!(df.column("cc_num").unwrap().dtype(), &DataType::String);

    assert_eq!(loaded.report.total_lines, 5);
    assert_eq!(loaded.report.loaded_rows, 5);
    assert!(loaded.report.corrupt_lines.is_empty());
    assert_eq!(loaded.report.content_hash.len(), 64);
}

#[test]
fn content_hash_tracks_file_contents() {
    let content = fixture("transactions.jsonl");
    let first = load_json_lines_from_str(&content, CorruptRecordMode::Permissive, "a").unwrap();
    let second = load_json_lines_from_str(&content, CorruptRecordMode::Permissive, "b").unwrap();
    let trimmed = content.lines().take(2).collect::<Vec<_>>().join("\n");
    let third = load_json_lines_from_str(&trimmed, CorruptRecordMode::Permissive, "c").unwrap();

    assert_eq!(first.report.content_hash, second.report.content_hash);
    assert_ne!(first.report.content_hash, third.report.content_hash);
}

#[test]
fn mixed_numbers_widen_to_float_and_mixed_types_to_string() {
    let content = "{\"a\": 1, \"b\": 1, \"c\": null}\n{\"a\": 2.5, \"b\": \"x\", \"c\": null}\n";
    let loaded = load_json_lines_from_str(content, CorruptRecordMode::Permissive, "inline").unwrap();
    let df = loaded.frame;

    assert_eq!(df.column("a").unwrap().dtype(), &DataType::Float64);
    assert_eq!(df.column("b").unwrap().dtype(), &DataType::String);
    assert_eq!(df.column("c").unwrap().dtype(), &DataType::String);

    let b = df.column("b").unwrap().str().unwrap();
    assert_eq!(b.get(0), Some("1"));
    assert_eq!(b.get(1), Some("x"));
    assert_eq!(df.column("c").unwrap().null_count(), 2);
}

#[test]
fn missing_keys_become_nulls_and_nested_objects_keep_json_text() {
    let content = "{\"a\": 1, \"nested\": {\"k\": true}}\n\n{\"a\": 2}\n";
    let loaded = load_json_lines_from_str(content, CorruptRecordMode::Permissive, "inline").unwrap();
    let df = loaded.frame;

    assert_eq!(loaded.report.total_lines, 2);
    assert_eq!(df.height(), 2);
    let nested = df.column("nested").unwrap().str().unwrap();
    assert_eq!(nested.get(0), Some("{\"k\":true}"));
    assert_eq!(nested.get(1), None);
}

#[test]
fn permissive_mode_keeps_corrupt_lines_as_null_rows() {
    let content = "{\"a\": 1}\nnot json at all\n[1, 2]\n{\"a\": 4}\n";
    let loaded = load_json_lines_from_str(content, CorruptRecordMode::Permissive, "inline").unwrap();

    assert_eq!(loaded.frame.height(), 4);
    assert_eq!(loaded.report.corrupt_lines, vec![2, 3]);
    let a = loaded.frame.column("a").unwrap().i64().unwrap();
    assert_eq!(a.get(0), Some(1));
    assert_eq!(a.get(1), None);
    assert_eq!(a.get(2), None);
    assert_eq!(a.get(3), Some(4));
}

#[test]
fn integers_wider_than_i64_keep_their_exact_digits() {
    let content = "{\"cc_num\": 4111111111111111}\n{\"cc_num\": 9999999999999999991}\n{\"cc_num\": 9999999999999999992}\n";
    let loaded = load_json_lines_from_str(content, CorruptRecordMode::Permissive, "inline").unwrap();
    let cc_num = loaded.frame.column("cc_num").unwrap();

    assert_eq!(cc_num.dtype(), &DataType::String);
    let cc_num = cc_num.str().unwrap();
    assert_eq!(cc_num.get(0), Some("4111111111111111"));
    assert_eq!(cc_num.get(1), Some("9999999999999999991"));
    assert_eq!(cc_num.get(2), Some("9999999999999999992"));
}

#[test]
fn empty_source_yields_empty_frame_with_feed_columns() {
    let loaded = load_json_lines_from_str("", CorruptRecordMode::Permissive, "inline").unwrap();

    assert_eq!(loaded.frame.height(), 0);
    assert_eq!(loaded.report.total_lines, 0);
    for name in RAW_COLUMNS {
        assert_eq!(loaded.frame.column(name).unwrap().dtype(), &DataType::String);
    }
}

#[test]
fn all_corrupt_permissive_source_keeps_one_null_row_per_line() {
    let content = "garbage\n[1]\n";
    let loaded = load_json_lines_from_str(content, CorruptRecordMode::Permissive, "inline").unwrap();

    assert_eq!(loaded.frame.height(), 2);
    assert_eq!(loaded.report.loaded_rows, 2);
    assert_eq!(loaded.report.corrupt_lines, vec![1, 2]);
    assert_eq!(loaded.frame.width(), RAW_COLUMNS.len());
    assert_eq!(loaded.frame.column("personal_detail").unwrap().null_count(), 2);
}

#[test]
fn drop_malformed_mode_skips_corrupt_lines() {
    let content = "{\"a\": 1}\nnot json at all\n{\"a\": 3}\n";
    let loaded =
        load_json_lines_from_str(content, CorruptRecordMode::DropMalformed, "inline").unwrap();

    assert_eq!(loaded.frame.height(), 2);
    assert_eq!(loaded.report.total_lines, 3);
    assert_eq!(loaded.report.loaded_rows, 2);
    assert_eq!(loaded.report.corrupt_lines, vec![2]);
}

#[test]
fn fail_fast_mode_reports_the_first_corrupt_line() {
    let content = "{\"a\": 1}\n{\"a\": \n";
    let err = load_json_lines_from_str(content, CorruptRecordMode::FailFast, "inline")
        .expect_err("fail fast should abort");

    match err {
        LoaderError::CorruptRecord { line, .. } => assert_eq!(line, 2),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn unreadable_source_is_an_io_error() {
    let err = load_json_lines(fixture_path("does_not_exist.jsonl"), CorruptRecordMode::Permissive)
        .expect_err("missing file should fail");
    assert!(matches!(err, LoaderError::Io { .. }));
}

#[test]
fn corrupt_record_mode_parses_cli_spellings() {
    assert_eq!("permissive".parse(), Ok(CorruptRecordMode::Permissive));
    assert_eq!("drop-malformed".parse(), Ok(CorruptRecordMode::DropMalformed));
    assert_eq!("FAIL_FAST".parse(), Ok(CorruptRecordMode::FailFast));
    assert!("lenient".parse::<CorruptRecordMode>().is_err());
}

#[test]
fn decodes_personal_detail_schema() {
    let text = r#"{"person_name":"Doe,John","gender":"M","address":"{}","lat":"3.1","long":"101.6","city_pop":"10000","job":"Engineer","dob":"1990-01-01"}"#;
    let values = decode_json_record(Some(text), &PERSONAL_DETAIL_FIELDS).expect("decoded");

    assert_eq!(values.len(), PERSONAL_DETAIL_FIELDS.len());
    assert_eq!(values[0].as_deref(), Some("Doe,John"));
    assert_eq!(values[2].as_deref(), Some("{}"));
    assert_eq!(values[7].as_deref(), Some("1990-01-01"));
}

#[test]
fn decode_stringifies_non_string_scalars_and_ignores_unknown_fields() {
    let text = r#"{"street":"1 Main St","zip":50000,"city":null,"country":"MY"}"#;
    let values = decode_json_record(Some(text), &ADDRESS_FIELDS).expect("decoded");

    assert_eq!(
        values,
        vec![Some("1 Main St".to_string()), None, None, Some("50000".to_string())]
    );
}

#[test]
fn decode_rejects_malformed_and_non_object_documents() {
    assert!(decode_json_record(Some("{not json"), &ADDRESS_FIELDS).is_none());
    assert!(decode_json_record(Some("[\"a\"]"), &ADDRESS_FIELDS).is_none());
    assert!(decode_json_record(Some("\"street\""), &ADDRESS_FIELDS).is_none());
    assert!(decode_json_record(None, &ADDRESS_FIELDS).is_none());
}

#[test]
fn decode_records_is_column_major_with_null_rows() {
    let texts = vec![
        Some(r#"{"street":"a","city":"b","state":"c","zip":"d"}"#),
        Some("garbage"),
        None,
    ];
    let columns = decode_json_records(texts, &ADDRESS_FIELDS);

    assert_eq!(columns.len(), 4);
    for column in &columns {
        assert_eq!(column.len(), 3);
        assert!(column[1].is_none());
        assert!(column[2].is_none());
    }
    assert_eq!(columns[1][0].as_deref(), Some("b"));
}
