//! Logging initialisation shared by the cerebrum binaries.
//!
//! Output always goes to stderr: stdout carries JSON payloads and the
//! JSON-RPC stream.

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::{Error, Result};

/// Environment variable holding the log filter override
pub const LOG_ENV: &str = "CEREBRUM_LOG";

/// Build the filter from `CEREBRUM_LOG`, then `RUST_LOG`, then `default`.
pub fn filter(default: &str) -> Result<EnvFilter> {
    let directive = std::env::var(LOG_ENV)
        .or_else(|_| std::env::var(EnvFilter::DEFAULT_ENV))
        .unwrap_or_else(|_| default.to_string());
    EnvFilter::try_new(&directive).map_err(|e| Error::LogFilter {
        directive,
        message: e.to_string(),
    })
}

/// Install the global subscriber.
pub fn init(default: &str) -> Result<()> {
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .compact();

    tracing_subscriber::registry()
        .with(filter(default)?)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| Error::LoggingInit(e.to_string()))
}
