//! Purpose: Parse and render URL query strings for the conversion core.
//! Exports: `parse_query`, `render_query`.
//! Role: Strict front end over `form_urlencoded`, which itself never rejects input.
//! Invariants: Malformed percent escapes and `;` separators are errors, not passthrough.
//! Invariants: Rendering form-encodes keys and values, so `parse_query` reads them back.
use url::form_urlencoded;

use super::error::{Error, ErrorKind};
use super::values::Values;

pub fn parse_query(input: &[u8]) -> Result<Values, Error> {
    validate_query(input)?;
    Ok(form_urlencoded::parse(input).into_owned().collect())
}

pub fn render_query(values: &Values) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in values.pairs() {
        serializer.append_pair(key, value);
    }
    serializer.finish()
}

fn validate_query(input: &[u8]) -> Result<(), Error> {
    for segment in input.split(|b| *b == b'&') {
        if segment.contains(&b';') {
            return Err(Error::new(ErrorKind::Parse)
                .with_message("invalid semicolon separator in query")
                .with_hint("Separate parameters with `&`, or escape `;` as %3B."));
        }
        validate_escapes(segment)?;
    }
    Ok(())
}

fn validate_escapes(segment: &[u8]) -> Result<(), Error> {
    let mut idx = 0;
    while idx < segment.len() {
        if segment[idx] != b'%' {
            idx += 1;
            continue;
        }
        let escape = &segment[idx..segment.len().min(idx + 3)];
        if escape.len() < 3 || !escape[1..].iter().all(u8::is_ascii_hexdigit) {
            return Err(invalid_escape(escape));
        }
        idx += 3;
    }
    Ok(())
}

fn invalid_escape(escape: &[u8]) -> Error {
    Error::new(ErrorKind::Parse)
        .with_message(format!(
            "invalid URL escape {:?}",
            String::from_utf8_lossy(escape)
        ))
        .with_hint("Percent escapes need two hex digits (e.g. %20); write a literal % as %25.")
}
