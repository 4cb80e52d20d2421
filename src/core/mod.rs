// Core modules implementing the value model, query syntax, coercion, and errors.
pub mod coerce;
pub mod error;
pub mod query;
pub mod values;
