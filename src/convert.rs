//! Purpose: The two conversion entrypoints between query strings and JSON objects.
//! Exports: `encode`, `decode`, `Direction`.
//! Role: Stateless transforms called once per input unit by the CLI driver.
//! Invariants: Each call writes exactly one newline-terminated line on success.
//! Invariants: Errors are returned to the caller; nothing is logged or swallowed here.
use std::io::Write;

use serde_json::Value;

use crate::core::coerce::coerce_object;
use crate::core::error::{Error, ErrorKind};
use crate::core::query::{parse_query, render_query};
use crate::json::parse;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Direction {
    Encode,
    Decode,
}

impl Direction {
    pub fn label(self) -> &'static str {
        match self {
            Direction::Encode => "encode",
            Direction::Decode => "decode",
        }
    }

    pub fn convert<W: Write>(self, input: &[u8], out: &mut W) -> Result<(), Error> {
        match self {
            Direction::Encode => encode(input, out),
            Direction::Decode => decode(input, out),
        }
    }
}

/// Query string in, one-line JSON object of string arrays out.
pub fn encode<W: Write>(input: &[u8], out: &mut W) -> Result<(), Error> {
    let values = parse_query(input)?;
    serde_json::to_writer(&mut *out, &values).map_err(|err| {
        if err.is_io() {
            write_error(err.into())
        } else {
            Error::new(ErrorKind::Serialize)
                .with_message("failed to encode values as json")
                .with_source(err)
        }
    })?;
    out.write_all(b"\n").map_err(write_error)
}

/// JSON object in, form-encoded `key=value` pairs joined by `&` out, keys ascending.
pub fn decode<W: Write>(input: &[u8], out: &mut W) -> Result<(), Error> {
    let value: Value = parse::from_slice(input).map_err(|err| {
        let hint = parse::hint_for_error(&err, "decode input");
        Error::new(ErrorKind::Parse)
            .with_message("invalid json input")
            .with_hint(hint)
            .with_source(err)
    })?;
    let Value::Object(object) = value else {
        return Err(Error::new(ErrorKind::Parse)
            .with_message(format!(
                "expected a json object at top level, got {}",
                value_kind(&value)
            ))
            .with_hint("Provide a single JSON object (e.g. '{\"foo\":[\"bar\"]}')."));
    };
    let values = coerce_object(&object)?;
    writeln!(out, "{}", render_query(&values)).map_err(write_error)
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn write_error(err: std::io::Error) -> Error {
    Error::new(ErrorKind::Io)
        .with_message("failed to write output")
        .with_source(err)
}
