//! Purpose: Split stdin into conversion units with explicit, testable modes.
//! Exports: `StreamMode`, `StreamConfig`, `StreamOutcome`, `StreamFailure`, `run_stream`.
//! Role: Input driver used by the CLI; isolates reading and error policy from main.
//! Invariants: Whole mode converts once and any error is fatal.
//! Invariants: Line mode converts each line before reading the next and skips failed lines.
//! Invariants: Read errors and output (Io) errors are fatal in every mode.
use std::io::{self, BufReader, Read};

use bstr::ByteSlice;
use bstr::io::BufReadExt;
use ujsonize::core::error::{Error, ErrorKind};

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum StreamMode {
    Whole,
    Lines,
}

#[derive(Copy, Clone, Debug)]
pub struct StreamConfig {
    pub mode: StreamMode,
    pub trim: bool,
    pub max_snippet_bytes: usize,
}

#[derive(Copy, Clone, Debug, Default)]
pub struct StreamOutcome {
    pub records_total: u64,
    pub ok: u64,
    pub failed: u64,
}

#[derive(Clone, Debug)]
pub struct StreamFailure {
    pub line: u64,
    pub error_kind: ErrorKind,
    pub message: String,
    pub hint: Option<String>,
    pub snippet: String,
}

fn io_error(err: io::Error, message: &str) -> Error {
    Error::new(ErrorKind::Io)
        .with_message(message)
        .with_source(err)
}

pub fn run_stream<R, F, N>(
    reader: R,
    config: StreamConfig,
    mut on_unit: F,
    mut on_failure: N,
) -> Result<StreamOutcome, Error>
where
    R: Read,
    F: FnMut(&[u8]) -> Result<(), Error>,
    N: FnMut(StreamFailure),
{
    match config.mode {
        StreamMode::Whole => run_whole(reader, config, &mut on_unit),
        StreamMode::Lines => run_lines(reader, config, &mut on_unit, &mut on_failure),
    }
}

fn run_whole<R, F>(
    mut reader: R,
    config: StreamConfig,
    on_unit: &mut F,
) -> Result<StreamOutcome, Error>
where
    R: Read,
    F: FnMut(&[u8]) -> Result<(), Error>,
{
    let mut buf = Vec::new();
    reader
        .read_to_end(&mut buf)
        .map_err(|err| io_error(err, "failed to read stdin"))?;
    on_unit(prepare_unit(&buf, config.trim))?;
    Ok(StreamOutcome {
        records_total: 1,
        ok: 1,
        failed: 0,
    })
}

fn run_lines<R, F, N>(
    reader: R,
    config: StreamConfig,
    on_unit: &mut F,
    on_failure: &mut N,
) -> Result<StreamOutcome, Error>
where
    R: Read,
    F: FnMut(&[u8]) -> Result<(), Error>,
    N: FnMut(StreamFailure),
{
    let mut outcome = StreamOutcome::default();
    for (idx, line) in BufReader::new(reader).byte_lines().enumerate() {
        let line = line.map_err(|err| io_error(err, "failed to read stdin"))?;
        let line_no = idx as u64 + 1;
        outcome.records_total += 1;
        let unit = prepare_unit(&line, config.trim);
        tracing::debug!(line = line_no, bytes = unit.len(), "converting line");
        match on_unit(unit) {
            Ok(()) => outcome.ok += 1,
            Err(err) if err.kind() == ErrorKind::Io => return Err(err),
            Err(err) => {
                outcome.failed += 1;
                on_failure(StreamFailure {
                    line: line_no,
                    error_kind: err.kind(),
                    message: err.message().unwrap_or("conversion failed").to_string(),
                    hint: err.hint().map(str::to_string),
                    snippet: truncate_snippet(unit, config.max_snippet_bytes),
                });
            }
        }
    }
    Ok(outcome)
}

fn prepare_unit(input: &[u8], trim: bool) -> &[u8] {
    if trim { input.trim() } else { input }
}

fn truncate_snippet(input: &[u8], max: usize) -> String {
    let text = input.to_str_lossy();
    if text.len() <= max {
        return text.into_owned();
    }
    let suffix = "...";
    if max <= suffix.len() {
        return suffix[..max].to_string();
    }
    let mut take = max - suffix.len();
    while !text.is_char_boundary(take) {
        take -= 1;
    }
    format!("{}{suffix}", &text[..take])
}
