//! Field value coercion.
//!
//! Empty values (`None`, `null`, blank strings) are never sent to the
//! backend: every coercion returns `None` for them, whatever the field kind.

use serde_json::{Map, Number, Value};

use crate::ID_FIELD;
use crate::field::FieldKind;
use crate::registry::EntitySchema;

/// Coerce a raw value for `field` of `schema`.
///
/// Returns `None` when the field is not declared writable by the schema or
/// when the value is empty or unparseable for the field's kind.
pub fn coerce(schema: &EntitySchema, field: &str, raw: Option<&Value>) -> Option<Value> {
    let descriptor = schema.get_field(field).filter(|f| f.is_writable())?;
    coerce_value(descriptor.kind, raw)
}

/// Coerce a raw value according to `kind` alone.
pub fn coerce_value(kind: FieldKind, raw: Option<&Value>) -> Option<Value> {
    let raw = raw?;
    if is_empty(raw) {
        return None;
    }

    match kind {
        FieldKind::String => Some(match raw {
            Value::Number(n) => Value::String(n.to_string()),
            Value::Bool(b) => Value::String(b.to_string()),
            other => other.clone(),
        }),
        FieldKind::Date | FieldKind::Boolean => Some(raw.clone()),
        FieldKind::Number => parse_integer(raw).map(Value::from),
        FieldKind::Decimal => parse_decimal(raw)
            .and_then(Number::from_f64)
            .map(Value::Number),
        FieldKind::Reference => match raw {
            Value::Object(obj) => obj.get(ID_FIELD).and_then(parse_integer).map(Value::from),
            other => parse_integer(other).map(Value::from),
        },
    }
}

/// Build a backend payload from caller-supplied fields.
///
/// Iterates the schema's writable fields in declaration order; names the
/// schema does not declare are ignored.
pub fn build_payload(schema: &EntitySchema, fields: &Map<String, Value>) -> Map<String, Value> {
    schema
        .writable_fields()
        .filter_map(|descriptor| {
            coerce_value(descriptor.kind, fields.get(&descriptor.name))
                .map(|value| (descriptor.name.clone(), value))
        })
        .collect()
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// Integer parse with leading-prefix semantics: `"42abc"` is 42, `"3.9"`
/// is 3, `"abc"` is `None`. Floats are truncated toward zero.
fn parse_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::String(s) => {
            let s = s.trim_start();
            let (sign, digits) = match s.as_bytes().first() {
                Some(b'-') => (-1, &s[1..]),
                Some(b'+') => (1, &s[1..]),
                _ => (1, s),
            };
            let end = digits
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(digits.len());
            digits[..end].parse::<i64>().ok().map(|n| sign * n)
        }
        _ => None,
    }
}

/// Float parse with leading-prefix semantics: `"12.5kg"` is 12.5.
fn parse_decimal(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|f| f.is_finite()),
        Value::String(s) => {
            let s = s.trim_start();
            let end = s
                .find(|c: char| !(c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E')))
                .unwrap_or(s.len());
            let candidate = &s[..end];
            // Longest prefix that is a valid float ("1.5e" -> "1.5").
            (1..=candidate.len())
                .rev()
                .find_map(|len| candidate[..len].parse::<f64>().ok())
                .filter(|f| f.is_finite())
        }
        _ => None,
    }
}
