//! Log output for the command-line programs.
//!
//! The library code only emits events.  Each binary calls
//! [`init_logging`] once, before doing anything else.  Which events
//! are printed is controlled by `RUST_LOG`; see
//! <https://docs.rs/tracing-subscriber/latest/tracing_subscriber/fmt/index.html#filtering-events-with-environment-variables>.
use std::io;

use tracing_subscriber::filter::{EnvFilter, ParseError};
use tracing_subscriber::prelude::*;

/// Used when `RUST_LOG` is unset or cannot be parsed.
const DEFAULT_FILTER: &str = "info";

/// Install a global subscriber which writes events, with their
/// targets, on standard error.  Standard output is left for the
/// programs' own results.
///
/// # Errors
///
/// Fails if the default filter cannot be parsed.
///
/// # Panics
///
/// Panics if a global subscriber was already installed.
pub fn init_logging() -> Result<(), ParseError> {
    let filter_layer =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(DEFAULT_FILTER))?;
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_writer(io::stderr);
    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();
    Ok(())
}

#[test]
fn test_default_filter_parses() {
    assert!(EnvFilter::try_new(DEFAULT_FILTER).is_ok());
}
