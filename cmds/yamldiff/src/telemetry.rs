//! Logging setup.
//!
//! Logs always go to stderr: stdout carries the comparison output only.

use std::io::IsTerminal;

use anyhow::{Context, Result};
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Build the level filter.
///
/// Priority:
/// 1. `log_level` argument (from the --log-level CLI flag)
/// 2. `rust_log`, the value of the `RUST_LOG` environment variable
/// 3. Default: warn, so a successful run prints nothing but its result
fn filter(log_level: Option<Level>, rust_log: Option<&str>) -> EnvFilter {
	match log_level {
		Some(level) => EnvFilter::new(level.as_str()),
		None => EnvFilter::builder()
			.with_default_directive(Level::WARN.into())
			.parse_lossy(rust_log.unwrap_or_default()),
	}
}

/// Install the global tracing subscriber.
///
/// Pretty format if stderr is a terminal, JSON otherwise.
pub fn init(log_level: Option<Level>) -> Result<()> {
	let fmt_layer = if std::io::stderr().is_terminal() {
		tracing_subscriber::fmt::layer()
			.with_writer(std::io::stderr)
			.pretty()
			.boxed()
	} else {
		tracing_subscriber::fmt::layer()
			.with_writer(std::io::stderr)
			.json()
			.boxed()
	};

	tracing_subscriber::registry()
		.with(filter(log_level, std::env::var("RUST_LOG").ok().as_deref()))
		.with(fmt_layer)
		.try_init()
		.context("failed to install tracing subscriber")
}
