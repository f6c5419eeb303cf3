//! Log output setup for the relayer.
//!
//! One process-wide subscriber: an `EnvFilter`-driven fmt layer, either
//! compact lines for an operator terminal or JSON lines for a log shipper.
//! Per-module directives let an operator turn up one subsystem (say,
//! repayment selection) without drowning in gas-simulation chatter.

use anyhow::{anyhow, Context, Result};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable holding the log filter, e.g.
/// `info,relayer_inventory=debug`.
pub const LOG_FILTER_ENV: &str = "RELAYER_LOG";

/// How the relayer writes its logs.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
	/// Filter directives; supports per-crate overrides such as
	/// `warn,relayer_pricing=trace`.
	pub filter: String,
	/// Emit JSON lines for a log shipper instead of terminal output.
	pub json: bool,
	/// Include the emitting module path on each line.
	pub show_targets: bool,
}

impl TelemetryConfig {
	/// Compact terminal output at the given filter.
	pub fn terminal(filter: &str) -> Self {
		Self {
			filter: filter.to_string(),
			json: false,
			show_targets: true,
		}
	}

	/// JSON output for deployments running behind a log shipper. Targets
	/// are dropped since the shipper indexes structured fields anyway.
	pub fn shipper(filter: &str) -> Self {
		Self {
			filter: filter.to_string(),
			json: true,
			show_targets: false,
		}
	}

	/// Terminal output filtered by `RELAYER_LOG`, or `info` when unset.
	pub fn from_env() -> Self {
		let filter = std::env::var(LOG_FILTER_ENV).unwrap_or_else(|_| "info".to_string());
		Self::terminal(&filter)
	}
}

/// Installs the process-wide subscriber. Call once at startup; later calls
/// fail because the first subscriber stays installed for the process
/// lifetime.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<()> {
	let filter = EnvFilter::try_new(&config.filter)
		.with_context(|| format!("bad log filter directive {:?}", config.filter))?;
	let base = tracing_subscriber::registry().with(filter);

	let installed = if config.json {
		base.with(
			fmt::layer()
				.json()
				.flatten_event(true)
				.with_target(config.show_targets),
		)
		.try_init()
	} else {
		base.with(fmt::layer().compact().with_target(config.show_targets))
			.try_init()
	};
	installed.map_err(|e| anyhow!("log subscriber already installed: {e}"))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_presets() {
		let terminal = TelemetryConfig::terminal("info,relayer_inventory=debug");
		assert!(!terminal.json);
		assert!(terminal.show_targets);
		assert_eq!(terminal.filter, "info,relayer_inventory=debug");

		let shipper = TelemetryConfig::shipper("warn");
		assert!(shipper.json);
		assert!(!shipper.show_targets);
	}

	#[test]
	fn test_from_env_defaults_to_info() {
		std::env::remove_var(LOG_FILTER_ENV);
		let config = TelemetryConfig::from_env();
		assert_eq!(config.filter, "info");
		assert!(!config.json);
	}

	#[test]
	fn test_bad_filter_directive_is_rejected() {
		let config = TelemetryConfig::terminal("relayer=broken=directive");
		assert!(init_telemetry(&config).is_err());
	}

	#[test]
	fn test_only_first_init_wins() {
		let config = TelemetryConfig::shipper("info");
		// Whichever test thread installs first owns the subscriber; the
		// second attempt must report that instead of panicking.
		let _ = init_telemetry(&config);
		assert!(init_telemetry(&config).is_err());
	}
}
