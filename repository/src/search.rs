//! Client-side helpers over an already fetched page of records.
//!
//! These never call the backend. Lookup values (`{Id, Name}` objects) match
//! by `Name` for text search and by `Id` for equality.

use std::collections::BTreeMap;

use crm_record_client::Record;
use crm_schema::ID_FIELD;
use serde_json::Value;

/// Records where any of `fields` contains `text`, ignoring case.
///
/// Blank `text` matches everything.
pub fn search<'a>(records: &'a [Record], fields: &[&str], text: &str) -> Vec<&'a Record> {
    let needle = text.trim().to_lowercase();
    if needle.is_empty() {
        return records.iter().collect();
    }
    records
        .iter()
        .filter(|record| {
            fields.iter().any(|field| {
                field_text(record, field)
                    .is_some_and(|value| value.to_lowercase().contains(&needle))
            })
        })
        .collect()
}

/// Records whose `field` equals `value`. Numbers compare numerically, so
/// `"3"` matches `3`.
pub fn filter_eq<'a>(records: &'a [Record], field: &str, value: &Value) -> Vec<&'a Record> {
    records
        .iter()
        .filter(|record| field_key(record, field).is_some_and(|k| loose_eq(&k, value)))
        .collect()
}

/// Number of records per distinct value of `field`. Records without a
/// value are not counted.
pub fn count_by(records: &[Record], field: &str) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for text in records.iter().filter_map(|r| field_text(r, field)) {
        *counts.entry(text).or_insert(0) += 1;
    }
    counts
}

/// Sum of a numeric field; missing or non-numeric values count as 0.
pub fn sum_field(records: &[Record], field: &str) -> f64 {
    records
        .iter()
        .filter_map(|r| r.get_f64(field))
        .fold(0.0, |acc, v| acc + v)
}

fn field_text(record: &Record, field: &str) -> Option<String> {
    if field == ID_FIELD {
        return Some(record.id.to_string());
    }
    match record.get(field)? {
        Value::String(s) => Some(s.clone()),
        Value::Object(_) => record.reference_name(field).map(str::to_string),
        Value::Array(_) => None,
        other => Some(other.to_string()),
    }
}

fn field_key(record: &Record, field: &str) -> Option<Value> {
    if field == ID_FIELD {
        return Some(Value::from(record.id));
    }
    match record.get(field)? {
        Value::Object(obj) => obj.get(ID_FIELD).cloned(),
        other => Some(other.clone()),
    }
}

fn loose_eq(actual: &Value, expected: &Value) -> bool {
    let as_number = |v: &Value| match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match (as_number(actual), as_number(expected)) {
        (Some(a), Some(b)) => a == b,
        _ => actual == expected,
    }
}
