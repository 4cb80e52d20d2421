//! Purpose: Conversion core used by the `ujsonize` CLI and tests.
//! Exports: `core` (values, query syntax, coercion, errors), `convert` (encode/decode).
//! Role: Library backing the binary; the CLI owns stdin/stdout and logging.
//! Invariants: Conversions are pure per call; output goes only to the provided sink.
//! Invariants: Core modules prefer explicit inputs/outputs over hidden state.
pub mod convert;
pub mod core;
mod json;
