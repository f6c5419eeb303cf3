//! Multi-chain virtual balance accounting.
//!
//! Every aggregate here is expressed in the L1 token's decimals: per-chain
//! balances are converted at ingestion so cross-chain sums never mix units.

use relayer_config::InventoryConfig;
use relayer_types::amount::{as_pct_fp, convert_decimals};
use relayer_types::{
	Address, BalanceClient, ChainId, CrossChainTransferClient, HubPoolClient, RelayerError,
	Result, TokenRegistry, U256,
};
use std::collections::HashMap;
use std::sync::Arc;

/// Read-only view over the relayer's token inventory across all chains:
/// on-chain balances plus pending inbound bridge transfers, shortfall-aware
/// allocation percentages, and the full distribution snapshot.
pub struct BalanceAccountant {
	relayer: Address,
	enabled_chains: Vec<ChainId>,
	balances: Arc<dyn BalanceClient>,
	transfers: Arc<dyn CrossChainTransferClient>,
	hub: Arc<dyn HubPoolClient>,
	registry: Arc<TokenRegistry>,
	config: InventoryConfig,
}

impl BalanceAccountant {
	pub fn new(
		relayer: Address,
		enabled_chains: Vec<ChainId>,
		balances: Arc<dyn BalanceClient>,
		transfers: Arc<dyn CrossChainTransferClient>,
		hub: Arc<dyn HubPoolClient>,
		registry: Arc<TokenRegistry>,
		config: InventoryConfig,
	) -> Self {
		Self {
			relayer,
			enabled_chains,
			balances,
			transfers,
			hub,
			registry,
			config,
		}
	}

	pub fn relayer(&self) -> &Address {
		&self.relayer
	}

	pub fn hub_chain(&self) -> ChainId {
		self.hub.hub_chain()
	}

	/// The spoke chains this accountant aggregates over.
	pub fn enabled_chains(&self) -> &[ChainId] {
		&self.enabled_chains
	}

	pub fn config(&self) -> &InventoryConfig {
		&self.config
	}

	/// L1 tokens under management: the configured set when a token config
	/// is present, the hub's full token list when it is absent or empty.
	pub fn l1_tokens(&self) -> Vec<Address> {
		if self.config.is_inventory_management_enabled() {
			self.config.tokens.keys().copied().collect()
		} else {
			self.hub.l1_tokens()
		}
	}

	/// L2 deployments of `l1_token` on `chain`: alias-configured tokens
	/// when the operator scoped the chain by alias, the pool-route mapping
	/// otherwise. Empty means the (token, chain) pair is disabled.
	pub fn l2_tokens_for(&self, l1_token: &Address, chain: ChainId) -> Vec<Address> {
		if chain == self.hub.hub_chain() {
			return vec![*l1_token];
		}
		if let Some(entry) = self.config.tokens.get(l1_token) {
			let aliased: Vec<Address> = entry
				.aliases
				.iter()
				.filter(|(_, alias)| alias.chains.contains_key(&chain))
				.map(|(l2_token, _)| *l2_token)
				.collect();
			if !aliased.is_empty() {
				return aliased;
			}
		}
		self.registry.l2_tokens_for(l1_token, chain)
	}

	/// A token the config or routing table names but the hub cannot
	/// describe is an operator mistake; accounting against it must fail
	/// loudly rather than read as a zero balance.
	fn l1_decimals(&self, l1_token: &Address) -> Result<u8> {
		self.hub
			.get_token_info_for_address(l1_token, self.hub.hub_chain())
			.map(|info| info.decimals)
			.ok_or_else(|| {
				RelayerError::Config(format!("no hub token info for L1 token {l1_token}"))
			})
	}

	fn l2_decimals(&self, l2_token: &Address, chain: ChainId) -> Result<u8> {
		self.hub
			.get_token_info_for_address(l2_token, chain)
			.map(|info| info.decimals)
			.ok_or_else(|| {
				RelayerError::Config(format!(
					"no token info for L2 token {l2_token} on chain {chain}"
				))
			})
	}

	/// Effective balance of `l1_token` on `chain`, optionally narrowed to
	/// one L2 deployment: on-chain balance converted to L1 decimals, plus
	/// the pending inbound cross-chain transfer total.
	pub fn effective_balance(
		&self,
		chain: ChainId,
		l1_token: &Address,
		l2_token: Option<&Address>,
	) -> Result<U256> {
		let l1_decimals = self.l1_decimals(l1_token)?;

		let l2_tokens = match l2_token {
			Some(token) => vec![*token],
			None => self.l2_tokens_for(l1_token, chain),
		};

		let mut total = U256::zero();
		for token in &l2_tokens {
			let l2_decimals = self.l2_decimals(token, chain)?;
			let balance = self.balances.get_balance(chain, token);
			total = total.saturating_add(convert_decimals(l2_decimals, l1_decimals, balance));
		}

		let pending = self.transfers.get_outstanding_cross_chain_transfer_amount(
			&self.relayer,
			chain,
			l1_token,
			l2_token,
		);
		Ok(total.saturating_add(pending))
	}

	/// Sum of effective balances across the hub chain and every enabled
	/// spoke, in L1 decimals.
	pub fn cumulative_balance(&self, l1_token: &Address) -> Result<U256> {
		let hub_chain = self.hub.hub_chain();
		let mut total = U256::zero();
		for chain in std::iter::once(hub_chain).chain(self.enabled_chains.iter().copied()) {
			total = total.saturating_add(self.effective_balance(chain, l1_token, None)?);
		}
		Ok(total)
	}

	/// Outstanding fill-commitment shortfall for (`chain`, token),
	/// normalized to L1 decimals.
	pub fn shortfall(
		&self,
		chain: ChainId,
		l1_token: &Address,
		l2_token: Option<&Address>,
	) -> Result<U256> {
		let l1_decimals = self.l1_decimals(l1_token)?;
		let l2_tokens = match l2_token {
			Some(token) => vec![*token],
			None => self.l2_tokens_for(l1_token, chain),
		};
		let mut total = U256::zero();
		for token in &l2_tokens {
			let l2_decimals = self.l2_decimals(token, chain)?;
			let shortfall = self.balances.get_shortfall_total_requirement(chain, token);
			total = total.saturating_add(convert_decimals(l2_decimals, l1_decimals, shortfall));
		}
		Ok(total)
	}

	/// Shortfall-adjusted share of the cumulative balance sitting on
	/// `chain`, as an 18-decimal fraction. Zero when the cumulative
	/// balance is zero.
	pub fn current_allocation_pct(
		&self,
		l1_token: &Address,
		chain: ChainId,
		l2_token: Option<&Address>,
	) -> Result<U256> {
		let cumulative = self.cumulative_balance(l1_token)?;
		if cumulative.is_zero() {
			return Ok(U256::zero());
		}
		let effective = self.effective_balance(chain, l1_token, l2_token)?;
		let shortfall = self.shortfall(chain, l1_token, l2_token)?;
		Ok(as_pct_fp(effective.saturating_sub(shortfall), cumulative))
	}

	/// Materialized allocation snapshot:
	/// `l1 token -> chain -> l2 token -> allocation fraction`.
	/// Tokens with a zero cumulative balance are omitted.
	pub fn token_distribution_per_l1_token(
		&self,
	) -> Result<HashMap<Address, HashMap<ChainId, HashMap<Address, U256>>>> {
		let mut distribution = HashMap::new();
		for l1_token in self.l1_tokens() {
			let cumulative = self.cumulative_balance(&l1_token)?;
			if cumulative.is_zero() {
				continue;
			}
			let mut per_chain: HashMap<ChainId, HashMap<Address, U256>> = HashMap::new();
			for chain in self.enabled_chains.iter().copied() {
				for l2_token in self.l2_tokens_for(&l1_token, chain) {
					let effective = self.effective_balance(chain, &l1_token, Some(&l2_token))?;
					per_chain
						.entry(chain)
						.or_default()
						.insert(l2_token, as_pct_fp(effective, cumulative));
				}
			}
			distribution.insert(l1_token, per_chain);
		}
		Ok(distribution)
	}
}
