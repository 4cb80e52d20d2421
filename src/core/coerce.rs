//! Purpose: Turn JSON values into plain-text query parameter entries.
//! Exports: `Coerced`, `coerce_entries`, `coerce_object`.
//! Role: Decode-direction value rules, kept apart from parsing and rendering.
//! Invariants: Every `serde_json::Value` shape is handled by an exhaustive match.
//! Invariants: Arrays yield one entry per element in order; strings are never quoted.
use serde_json::{Map, Number, Value};

use super::error::{Error, ErrorKind};
use super::values::Values;

/// Shape of a value found under a top-level key.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Coerced<'a> {
    Many(&'a [Value]),
    Text(&'a str),
    Other(&'a Value),
}

impl<'a> Coerced<'a> {
    pub fn classify(value: &'a Value) -> Self {
        match value {
            Value::Array(items) => Coerced::Many(items),
            Value::String(text) => Coerced::Text(text),
            Value::Null | Value::Bool(_) | Value::Number(_) | Value::Object(_) => {
                Coerced::Other(value)
            }
        }
    }
}

pub fn coerce_entries(value: &Value) -> Result<Vec<String>, Error> {
    match Coerced::classify(value) {
        Coerced::Many(items) => items.iter().map(element_text).collect(),
        Coerced::Text(text) => Ok(vec![text.to_string()]),
        Coerced::Other(other) => canonical_json(other).map(|text| vec![text]),
    }
}

pub fn coerce_object(object: &Map<String, Value>) -> Result<Values, Error> {
    let mut values = Values::new();
    for (key, value) in object {
        for entry in coerce_entries(value)? {
            values.append(key.as_str(), entry);
        }
    }
    Ok(values)
}

fn element_text(value: &Value) -> Result<String, Error> {
    match value {
        Value::String(text) => Ok(text.clone()),
        Value::Number(number) => Ok(number_text(number)),
        Value::Bool(flag) => Ok(flag.to_string()),
        Value::Null => Ok("null".to_string()),
        Value::Array(_) | Value::Object(_) => canonical_json(value),
    }
}

// Integers print as-is; floats use the shortest round-trip form, so 1.0 prints as 1.
fn number_text(number: &Number) -> String {
    if let Some(value) = number.as_i64() {
        return value.to_string();
    }
    if let Some(value) = number.as_u64() {
        return value.to_string();
    }
    match number.as_f64() {
        Some(value) => value.to_string(),
        None => number.to_string(),
    }
}

fn canonical_json(value: &Value) -> Result<String, Error> {
    serde_json::to_string(value).map_err(|err| {
        Error::new(ErrorKind::Serialize)
            .with_message("failed to serialize value as json text")
            .with_source(err)
    })
}
