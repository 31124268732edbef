//! Schema-driven decoding of JSON documents embedded in string columns.

use serde_json::Value;

/// String form of a JSON value for a string-typed field. Nested objects and arrays keep their
/// JSON text.
pub fn value_to_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

/// Decodes one JSON object against a fixed list of string fields.
///
/// Returns `None` when the input is null, is not valid JSON, or is not an object. Fields
/// absent from the object are `None`.
pub fn decode_json_record(text: Option<&str>, fields: &[&str]) -> Option<Vec<Option<String>>> {
    let Value::Object(object) = serde_json::from_str::<Value>(text?).ok()? else {
        return None;
    };

    Some(
        fields
            .iter()
            .map(|field| object.get(*field).and_then(value_to_text))
            .collect(),
    )
}

/// Decodes a column of JSON strings into one value vector per field.
///
/// Rows that fail to decode contribute a null to every field.
pub fn decode_json_records<'a, I>(texts: I, fields: &[&str]) -> Vec<Vec<Option<String>>>
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    let texts = texts.into_iter();
    let mut columns: Vec<Vec<Option<String>>> = fields
        .iter()
        .map(|_| Vec::with_capacity(texts.size_hint().0))
        .collect();

    for text in texts {
        match decode_json_record(text, fields) {
            Some(values) => {
                for (column, value) in columns.iter_mut().zip(values) {
                    column.push(value);
                }
            }
            None => {
                for column in columns.iter_mut() {
                    column.push(None);
                }
            }
        }
    }

    columns
}
