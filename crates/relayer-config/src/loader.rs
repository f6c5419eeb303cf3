//! Configuration loading from files.

use crate::types::RelayerConfig;
use anyhow::{Context, Result};
use relayer_types::amount::fixed_point;
use std::path::Path;
use tracing::info;

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
	/// Load configuration from file
	pub fn from_file<P: AsRef<Path>>(path: P) -> Result<RelayerConfig> {
		let path = path.as_ref();
		info!("Loading configuration from {:?}", path);

		let contents = std::fs::read_to_string(path)
			.with_context(|| format!("Failed to read config file: {:?}", path))?;

		let mut config = match path.extension().and_then(|s| s.to_str()) {
			Some("toml") => Self::from_toml(&contents)?,
			Some("json") => Self::from_json(&contents)?,
			_ => anyhow::bail!("Unsupported config format: {:?}", path),
		};
		Self::apply_env_overrides(&mut config)?;

		Self::validate(&config)?;
		Ok(config)
	}

	/// Environment overrides for values operators commonly set outside the
	/// config file.
	pub fn apply_env_overrides(config: &mut RelayerConfig) -> Result<()> {
		if config.simulation_recipient.is_none() {
			if let Ok(raw) = std::env::var("RELAYER_FILL_SIMULATION_ADDRESS") {
				let address = raw.parse().map_err(|e| {
					anyhow::anyhow!("Invalid RELAYER_FILL_SIMULATION_ADDRESS {raw}: {e}")
				})?;
				config.simulation_recipient = Some(address);
			}
		}
		Ok(())
	}

	/// Load from TOML string
	pub fn from_toml(contents: &str) -> Result<RelayerConfig> {
		toml::from_str(contents).map_err(|e| anyhow::anyhow!("Failed to parse TOML: {}", e))
	}

	/// Load from JSON string
	pub fn from_json(contents: &str) -> Result<RelayerConfig> {
		serde_json::from_str(contents).context("Failed to parse JSON")
	}

	/// Validate operator-supplied values. Violations here are operator
	/// mistakes that must be fixed before the relayer runs, so they fail
	/// loading outright.
	pub fn validate(config: &RelayerConfig) -> Result<()> {
		let one = fixed_point();

		if config.gas_padding < one || config.gas_padding > one * 3 {
			anyhow::bail!(
				"gas_padding must be within [1.0, 3.0], got {}",
				config.gas_padding
			);
		}
		for (name, multiplier) in [
			("gas_multiplier", config.gas_multiplier),
			("message_gas_multiplier", config.message_gas_multiplier),
		] {
			if multiplier > one * 4 {
				anyhow::bail!("{} must be within [0, 4.0], got {}", name, multiplier);
			}
		}

		if config.enabled_chains.is_empty() {
			anyhow::bail!("enabled_chains must not be empty");
		}
		if config.enabled_chains.contains(&config.hub_chain) {
			anyhow::bail!("enabled_chains lists spoke chains; the hub chain is implicit");
		}

		if let Some(recipient) = &config.simulation_recipient {
			if *recipient == config.relayer_address {
				anyhow::bail!(
					"simulation_recipient must differ from relayer_address (self-fills have special semantics)"
				);
			}
		}

		for (l1_token, entry) in &config.inventory.tokens {
			let chain_maps = std::iter::once(&entry.chains)
				.chain(entry.aliases.values().map(|alias| &alias.chains));
			for chains in chain_maps {
				for (chain, token_config) in chains {
					Self::validate_token_config(l1_token.to_native().as_str(), chain.0, token_config)?;
				}
			}
		}

		Ok(())
	}

	fn validate_token_config(
		l1_token: &str,
		chain: u64,
		config: &crate::types::TokenBalanceConfig,
	) -> Result<()> {
		if config.threshold_pct > config.target_pct {
			anyhow::bail!(
				"token {} chain {}: threshold_pct {} exceeds target_pct {}",
				l1_token,
				chain,
				config.threshold_pct,
				config.target_pct
			);
		}
		if config.target_overage_buffer < fixed_point() {
			anyhow::bail!(
				"token {} chain {}: target_overage_buffer must be at least 1.0",
				l1_token,
				chain
			);
		}
		match (config.unwrap_weth_threshold, config.unwrap_weth_target) {
			(Some(threshold), Some(target)) if target < threshold => {
				anyhow::bail!(
					"token {} chain {}: unwrap_weth_target below unwrap_weth_threshold",
					l1_token,
					chain
				);
			}
			(Some(_), None) | (None, Some(_)) => {
				anyhow::bail!(
					"token {} chain {}: unwrap_weth_threshold and unwrap_weth_target must be set together",
					l1_token,
					chain
				);
			}
			_ => {}
		}
		if config.withdraw_excess_period == Some(0) {
			anyhow::bail!(
				"token {} chain {}: withdraw_excess_period must be positive",
				l1_token,
				chain
			);
		}
		Ok(())
	}
}
