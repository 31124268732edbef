use fraudlens_core::flatten::{
    flatten_transaction_fields, parse_double, parse_integer, split_person_name,
};
use fraudlens_core::unnest::{parse_address, parse_personal_detail};
use polars::prelude::*;
use serde_json::json;

fn personal_detail(name: &str, lat: &str, city_pop: &str) -> String {
    json!({
        "person_name": name,
        "gender": "F",
        "address": json!({"street": "22 Jalan Ampang", "city": "Kuala Lumpur", "state": "WP", "zip": "50450"}).to_string(),
        "lat": lat,
        "long": "101.713",
        "city_pop": city_pop,
        "job": "Teacher",
        "dob": "1985-06-15",
    })
    .to_string()
}

fn flattened(details: Vec<Option<String>>) -> DataFrame {
    let amounts: Vec<f64> = (0..details.len()).map(|idx| idx as f64).collect();
    let df = df![
        "amt" => amounts,
        "personal_detail" => details,
    ]
    .expect("df");
    let nested = parse_address(&parse_personal_detail(&df).expect("personal detail"))
        .expect("address");
    flatten_transaction_fields(&nested).expect("flatten")
}

#[test]
fn split_uses_each_delimiter() {
    assert_eq!(
        split_person_name("Doe,John"),
        (Some("Doe".to_string()), Some("John".to_string()))
    );
    assert_eq!(
        split_person_name("Tan@Mei Ling"),
        (Some("Tan".to_string()), Some("Mei Ling".to_string()))
    );
    assert_eq!(
        split_person_name("Lee/Ah Kow/Jr"),
        (Some("Lee".to_string()), Some("Ah Kow".to_string()))
    );
    assert_eq!(split_person_name("OnlyOneName"), (Some("OnlyOneName".to_string()), None));
    assert_eq!(
        split_person_name(",John"),
        (Some(String::new()), Some("John".to_string()))
    );
}

#[test]
fn numeric_parsers_return_none_on_failure() {
    assert_eq!(parse_double(" 3.1 "), Some(3.1));
    assert_eq!(parse_double("not_a_lat"), None);
    assert_eq!(parse_integer("10000"), Some(10000));
    assert_eq!(parse_integer(" -42 "), Some(-42));
    assert_eq!(parse_integer("1790000.75"), Some(1790000));
    assert_eq!(parse_integer("not_a_number"), None);
    assert_eq!(parse_integer("1e3"), None);
    assert_eq!(parse_integer(""), None);
    assert_eq!(parse_integer("99999999999999999999"), None);
}

#[test]
fn flatten_adds_typed_columns_in_order_and_drops_structs() {
    let df = flattened(vec![Some(personal_detail("Tan@Mei Ling", "3.158", "1790000"))]);

    assert_eq!(
        df.get_column_names(),
        [
            "amt", "first", "last", "gender", "dob", "street", "city", "state", "zip", "lat",
            "long", "city_pop", "job",
        ]
    );
    assert_eq!(df.column("lat").unwrap().dtype(), &DataType::Float64);
    assert_eq!(df.column("long").unwrap().dtype(), &DataType::Float64);
    assert_eq!(df.column("city_pop").unwrap().dtype(), &DataType::Int64);

    assert_eq!(df.column("first").unwrap().str().unwrap().get(0), Some("Tan"));
    assert_eq!(df.column("last").unwrap().str().unwrap().get(0), Some("Mei Ling"));
    assert_eq!(df.column("city").unwrap().str().unwrap().get(0), Some("Kuala Lumpur"));
    assert_eq!(df.column("lat").unwrap().f64().unwrap().get(0), Some(3.158));
    assert_eq!(df.column("city_pop").unwrap().i64().unwrap().get(0), Some(1_790_000));
    assert_eq!(df.column("job").unwrap().str().unwrap().get(0), Some("Teacher"));
}

#[test]
fn cast_failures_and_short_names_become_nulls() {
    let df = flattened(vec![
        Some(personal_detail("OnlyOneName", "not_a_lat", "not_a_number")),
        Some("{broken".to_string()),
    ]);

    assert_eq!(df.height(), 2);
    let first = df.column("first").unwrap().str().unwrap();
    let last = df.column("last").unwrap().str().unwrap();
    assert_eq!(first.get(0), Some("OnlyOneName"));
    assert_eq!(last.get(0), None);
    assert_eq!(df.column("lat").unwrap().f64().unwrap().get(0), None);
    assert_eq!(df.column("long").unwrap().f64().unwrap().get(0), Some(101.713));
    assert_eq!(df.column("city_pop").unwrap().i64().unwrap().get(0), None);

    for name in ["first", "last", "gender", "street", "lat", "city_pop", "job"] {
        let column = df.column(name).unwrap();
        assert!(column.get(1).unwrap().is_null(), "{name} should be null");
    }
}
