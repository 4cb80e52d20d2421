//! Purpose: Install the stderr tracing subscriber from an explicit configuration value.
//! Exports: `LogConfig`, `init_tracing`.
//! Role: Only place the binary touches global subscriber state.
//! Invariants: Diagnostics go to stderr; stdout carries converted output only.
//! Invariants: An unparsable `--log-level` is a usage error, never silently replaced.
use tracing_subscriber::EnvFilter;
use ujsonize::core::error::{Error, ErrorKind};

const DEFAULT_FILTER: &str = "warn";

#[derive(Clone, Debug, Default)]
pub struct LogConfig {
    /// Filter directives from `--log-level`; falls back to `RUST_LOG`, then `warn`.
    pub filter: Option<String>,
}

impl LogConfig {
    fn env_filter(&self) -> Result<EnvFilter, Error> {
        match &self.filter {
            Some(filter) => EnvFilter::try_new(filter).map_err(|err| {
                Error::new(ErrorKind::Usage)
                    .with_message(format!("invalid --log-level filter {filter:?}"))
                    .with_hint("Use a level (e.g. debug) or directives like `ujsonize=debug`.")
                    .with_source(err)
            }),
            None => Ok(EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))),
        }
    }
}

pub fn init_tracing(config: &LogConfig) -> Result<(), Error> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(config.env_filter()?)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
    Ok(())
}
