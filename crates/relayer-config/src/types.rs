//! Configuration types for the relayer.

use crate::serde_helpers::{
	deserialize_chain_id_map, deserialize_fp, deserialize_opt_fp, serialize_chain_id_map,
	serialize_fp, serialize_opt_fp,
};
use relayer_types::amount::fixed_point;
use relayer_types::{Address, ChainId, U256};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

fn default_overage_buffer() -> U256 {
	// 1.5x
	fixed_point() * 3 / 2
}

fn default_gas_padding() -> U256 {
	// 1.1x
	fixed_point() * 11 / 10
}

fn default_gas_multiplier() -> U256 {
	fixed_point()
}

fn default_min_relayer_fee_pct() -> U256 {
	// 1 bp
	U256::exp10(14)
}

fn default_true() -> bool {
	true
}

fn default_slow_withdrawal_chains() -> Vec<ChainId> {
	vec![ChainId::ARBITRUM, ChainId::OPTIMISM, ChainId::BASE]
}

fn default_update_interval() -> u64 {
	60
}

/// Inventory targets for one L1 token on one chain, optionally scoped to a
/// single L2 deployment via the alias table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TokenBalanceConfig {
	/// Desired share of the token's cumulative balance on this chain.
	#[serde(deserialize_with = "deserialize_fp", serialize_with = "serialize_fp")]
	pub target_pct: U256,
	/// Allocation below which an L1 -> L2 rebalance fires.
	#[serde(deserialize_with = "deserialize_fp", serialize_with = "serialize_fp")]
	pub threshold_pct: U256,
	/// Multiplier on `target_pct` when judging repayment eligibility.
	#[serde(
		default = "default_overage_buffer",
		deserialize_with = "deserialize_fp",
		serialize_with = "serialize_fp"
	)]
	pub target_overage_buffer: U256,
	/// Native balance floor below which WETH is unwrapped.
	#[serde(
		default,
		deserialize_with = "deserialize_opt_fp",
		serialize_with = "serialize_opt_fp"
	)]
	pub unwrap_weth_threshold: Option<U256>,
	/// Native balance to refill to when unwrapping.
	#[serde(
		default,
		deserialize_with = "deserialize_opt_fp",
		serialize_with = "serialize_opt_fp"
	)]
	pub unwrap_weth_target: Option<U256>,
	/// Rate-limit window (seconds) for L2 -> L1 excess withdrawals; absent
	/// means excess withdrawal is disabled for this pair.
	#[serde(default)]
	pub withdraw_excess_period: Option<u64>,
}

/// Chain-keyed balance configs for one L1 token, with optional per-L2-alias
/// overrides for chains that carry several equivalent deployments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct TokenConfigEntry {
	#[serde(
		default,
		deserialize_with = "deserialize_chain_id_map",
		serialize_with = "serialize_chain_id_map"
	)]
	pub chains: HashMap<ChainId, TokenBalanceConfig>,
	#[serde(default)]
	pub aliases: HashMap<Address, AliasConfigEntry>,
}

/// Balance configs for one specific L2 deployment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct AliasConfigEntry {
	#[serde(
		default,
		deserialize_with = "deserialize_chain_id_map",
		serialize_with = "serialize_chain_id_map"
	)]
	pub chains: HashMap<ChainId, TokenBalanceConfig>,
}

/// Native-token wrap settings for one chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct WrapConfig {
	#[serde(deserialize_with = "deserialize_fp", serialize_with = "serialize_fp")]
	pub threshold: U256,
	#[serde(deserialize_with = "deserialize_fp", serialize_with = "serialize_fp")]
	pub target: U256,
}

/// Inventory-management configuration. An empty token table disables
/// inventory management entirely.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct InventoryConfig {
	/// Balance targets keyed by L1 token address.
	#[serde(default)]
	pub tokens: HashMap<Address, TokenConfigEntry>,
	/// Wrap surplus native token above this threshold...
	#[serde(
		default,
		deserialize_with = "deserialize_opt_fp",
		serialize_with = "serialize_opt_fp"
	)]
	pub wrap_ether_threshold: Option<U256>,
	/// ...down to this target.
	#[serde(
		default,
		deserialize_with = "deserialize_opt_fp",
		serialize_with = "serialize_opt_fp"
	)]
	pub wrap_ether_target: Option<U256>,
	#[serde(
		default,
		deserialize_with = "deserialize_chain_id_map",
		serialize_with = "serialize_chain_id_map"
	)]
	pub wrap_ether_overrides: HashMap<ChainId, WrapConfig>,
	/// Prefer repayment on over-allocated slow-withdrawal chains.
	#[serde(default = "default_true")]
	pub prioritize_utilization: bool,
	#[serde(default = "default_slow_withdrawal_chains")]
	pub slow_withdrawal_chains: Vec<ChainId>,
	/// Chains from which inventory can be rebalanced quickly through an
	/// external on/off-ramp; forced-origin repayment is accepted
	/// unconditionally from these.
	#[serde(default)]
	pub fast_rebalance_chains: Vec<ChainId>,
}

impl InventoryConfig {
	pub fn is_inventory_management_enabled(&self) -> bool {
		!self.tokens.is_empty()
	}

	/// Balance config for (`l1_token`, `chain`), preferring the alias entry
	/// when an L2 deployment is given and configured. `None` means the pair
	/// is not managed on that chain.
	pub fn token_config(
		&self,
		l1_token: &Address,
		chain: ChainId,
		l2_token: Option<&Address>,
	) -> Option<&TokenBalanceConfig> {
		let entry = self.tokens.get(l1_token)?;
		if let Some(l2) = l2_token {
			if let Some(alias) = entry.aliases.get(l2) {
				return alias.chains.get(&chain);
			}
		}
		entry.chains.get(&chain)
	}

	/// Chains on which `l1_token` carries any balance config.
	pub fn configured_chains(&self, l1_token: &Address) -> Vec<ChainId> {
		let Some(entry) = self.tokens.get(l1_token) else {
			return Vec::new();
		};
		let mut chains: Vec<ChainId> = entry
			.chains
			.keys()
			.chain(entry.aliases.values().flat_map(|a| a.chains.keys()))
			.copied()
			.collect();
		chains.sort();
		chains.dedup();
		chains
	}

	/// Wrap settings for `chain`, if wrapping is configured globally or for
	/// the chain specifically.
	pub fn wrap_config(&self, chain: ChainId) -> Option<WrapConfig> {
		if let Some(cfg) = self.wrap_ether_overrides.get(&chain) {
			return Some(*cfg);
		}
		match (self.wrap_ether_threshold, self.wrap_ether_target) {
			(Some(threshold), Some(target)) => Some(WrapConfig { threshold, target }),
			_ => None,
		}
	}
}

/// Complete relayer configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RelayerConfig {
	/// The hub chain; canonical token identities live here.
	pub hub_chain: ChainId,
	/// Spoke chains the relayer operates on.
	pub enabled_chains: Vec<ChainId>,
	/// The relayer's own address.
	pub relayer_address: Address,
	/// Recipient used for synthetic gas-simulation deposits. Must hold no
	/// token balance and must differ from the relayer address.
	#[serde(default)]
	pub simulation_recipient: Option<Address>,
	/// Safety margin on simulated gas, 1.0 - 3.0.
	#[serde(
		default = "default_gas_padding",
		deserialize_with = "deserialize_fp",
		serialize_with = "serialize_fp"
	)]
	pub gas_padding: U256,
	/// Scaling on the token-denominated gas cost, 0 - 4.
	#[serde(
		default = "default_gas_multiplier",
		deserialize_with = "deserialize_fp",
		serialize_with = "serialize_fp"
	)]
	pub gas_multiplier: U256,
	/// Separate token-cost scaling for message-carrying deposits.
	#[serde(
		default = "default_gas_multiplier",
		deserialize_with = "deserialize_fp",
		serialize_with = "serialize_fp"
	)]
	pub message_gas_multiplier: U256,
	/// Fallback minimum relayer fee when no env override matches.
	#[serde(
		default = "default_min_relayer_fee_pct",
		deserialize_with = "deserialize_fp",
		serialize_with = "serialize_fp"
	)]
	pub default_min_relayer_fee_pct: U256,
	#[serde(default)]
	pub inventory: InventoryConfig,
	#[serde(default = "default_update_interval")]
	pub update_interval_secs: u64,
}
