//! Rebalance planning and execution.
//!
//! Three planners share one pattern: compute the desired action per
//! (chain, token), filter against the current budget, then execute
//! sequentially through the adapter manager. Submissions share a signing
//! nonce and the hub-chain balance, so they are never parallelized.

use crate::balances::BalanceAccountant;
use relayer_config::InventoryConfig;
use relayer_types::amount::{convert_decimals, fixed_point, mul_frac};
use relayer_types::{
	Address, AdapterManager, BalanceClient, ChainId, CrossChainTransferClient, HubPoolClient,
	Rebalance, RelayerError, Result, TokenRegistry, U256,
};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Discount on the repayment-refusal line so withdrawals trigger slightly
/// below it: 0.95 in fixed point.
fn excess_withdraw_discount() -> U256 {
	U256::exp10(16) * 95
}

/// Plans and executes L1 -> L2 rebalances, native-token unwraps, and
/// L2 -> L1 excess withdrawals.
pub struct RebalancePlanner {
	relayer: Address,
	accountant: Arc<BalanceAccountant>,
	balances: Arc<dyn BalanceClient>,
	transfers: Arc<dyn CrossChainTransferClient>,
	adapters: Arc<dyn AdapterManager>,
	hub: Arc<dyn HubPoolClient>,
	registry: Arc<TokenRegistry>,
	config: InventoryConfig,
}

impl RebalancePlanner {
	#[allow(clippy::too_many_arguments)]
	pub fn new(
		relayer: Address,
		accountant: Arc<BalanceAccountant>,
		balances: Arc<dyn BalanceClient>,
		transfers: Arc<dyn CrossChainTransferClient>,
		adapters: Arc<dyn AdapterManager>,
		hub: Arc<dyn HubPoolClient>,
		registry: Arc<TokenRegistry>,
		config: InventoryConfig,
	) -> Self {
		Self {
			relayer,
			accountant,
			balances,
			transfers,
			adapters,
			hub,
			registry,
			config,
		}
	}

	/// Transfers that would bring under-threshold chains back to target,
	/// in deposit order. Amounts are in L1 decimals. A managed token the
	/// hub cannot describe fails planning outright.
	pub fn get_possible_rebalances(&self) -> Result<Vec<Rebalance>> {
		let mut rebalances = Vec::new();
		for l1_token in self.accountant.l1_tokens() {
			let cumulative = self.accountant.cumulative_balance(&l1_token)?;
			if cumulative.is_zero() {
				continue;
			}
			for chain in self.accountant.enabled_chains().to_vec() {
				for l2_token in self.accountant.l2_tokens_for(&l1_token, chain) {
					let Some(token_config) =
						self.config.token_config(&l1_token, chain, Some(&l2_token))
					else {
						continue;
					};
					let current_pct = self.accountant.current_allocation_pct(
						&l1_token,
						chain,
						Some(&l2_token),
					)?;
					if current_pct >= token_config.threshold_pct {
						continue;
					}
					let deficit_pct = token_config.target_pct.saturating_sub(current_pct);
					let amount = mul_frac(cumulative, deficit_pct, fixed_point());
					rebalances.push(Rebalance {
						chain_id: chain,
						l1_token,
						l2_token,
						current_alloc_pct: current_pct,
						target_pct: token_config.target_pct,
						threshold_pct: token_config.threshold_pct,
						balance: self.accountant.effective_balance(
							chain,
							&l1_token,
							Some(&l2_token),
						)?,
						cumulative_balance: cumulative,
						amount,
					});
				}
			}
		}
		Ok(rebalances)
	}

	/// Executes the possible rebalances sequentially until the hub-chain
	/// balance is exhausted. Failures are logged with full plan context and
	/// never abort the pass; the next tick retries.
	pub async fn rebalance_inventory_if_necessary(&self) {
		let hub_chain = self.hub.hub_chain();
		let possible = match self.get_possible_rebalances() {
			Ok(possible) => possible,
			Err(e) => {
				error!(error = %e, "rebalance planning failed");
				return;
			}
		};
		if possible.is_empty() {
			return;
		}

		let mut executed: Vec<Rebalance> = Vec::new();
		let mut unexecutable: Vec<Rebalance> = Vec::new();
		let mut abandoned: Vec<Rebalance> = Vec::new();

		for plan in possible.iter() {
			// Budget check against the locally reserved balance.
			let cached_balance = self.balances.get_balance(hub_chain, &plan.l1_token);
			if plan.amount > cached_balance {
				debug!(
					chain = %plan.chain_id,
					token = %plan.l1_token,
					amount = %plan.amount,
					available = %cached_balance,
					"rebalance exceeds remaining hub balance"
				);
				unexecutable.push(plan.clone());
				continue;
			}

			// Another process may have spent the hub balance since the
			// cache was populated; verify before sending.
			match self.balances.fetch_balance(hub_chain, &plan.l1_token).await {
				Ok(onchain) if onchain != cached_balance => {
					warn!(
						token = %plan.l1_token,
						cached = %cached_balance,
						onchain = %onchain,
						"hub balance drifted, skipping rebalance until next tick"
					);
					unexecutable.push(plan.clone());
					continue;
				}
				Ok(_) => {}
				Err(e) => {
					warn!(token = %plan.l1_token, error = %e, "hub balance re-read failed");
					unexecutable.push(plan.clone());
					continue;
				}
			}

			match self
				.adapters
				.send_token_cross_chain(
					&self.relayer,
					plan.chain_id,
					&plan.l1_token,
					plan.amount,
					Some(&plan.l2_token),
				)
				.await
			{
				Ok(()) => {
					self.balances
						.decrement_local_balance(hub_chain, &plan.l1_token, plan.amount);
					self.transfers.increase_outstanding_transfer(
						&self.relayer,
						&plan.l1_token,
						&plan.l2_token,
						plan.amount,
						plan.chain_id,
					);
					info!(
						chain = %plan.chain_id,
						token = %plan.l1_token,
						amount = %plan.amount,
						current_pct = %plan.current_alloc_pct,
						target_pct = %plan.target_pct,
						"rebalance confirmed"
					);
					executed.push(plan.clone());
				}
				Err(e) => {
					error!(
						chain = %plan.chain_id,
						token = %plan.l1_token,
						amount = %plan.amount,
						balance = %plan.balance,
						cumulative = %plan.cumulative_balance,
						error = %e,
						"rebalance submission failed, abandoning plan"
					);
					abandoned.push(plan.clone());
				}
			}
		}

		debug!(
			required = possible.len(),
			executed = executed.len(),
			unexecutable = unexecutable.len(),
			abandoned = abandoned.len(),
			"rebalance pass complete"
		);
	}

	/// Unwraps WETH into native gas token on chains whose native balance
	/// fell below the configured floor.
	pub async fn unwrap_weth_if_necessary(&self) {
		let Some(weth_l1) = self.registry.l1_address("WETH") else {
			return;
		};
		for chain in self.accountant.enabled_chains().to_vec() {
			if self.registry.native_gas_symbol(chain) != "ETH" {
				continue;
			}
			let Some(weth_l2) = self.registry.address_on("WETH", chain) else {
				continue;
			};
			let Some(token_config) = self.config.token_config(&weth_l1, chain, Some(&weth_l2))
			else {
				continue;
			};
			let (Some(threshold), Some(target)) = (
				token_config.unwrap_weth_threshold,
				token_config.unwrap_weth_target,
			) else {
				continue;
			};

			let native_balance = self.balances.get_balance(chain, &Address::zero());
			if native_balance >= threshold {
				continue;
			}
			let amount = target.saturating_sub(native_balance);
			let weth_balance = self.balances.get_balance(chain, &weth_l2);
			if weth_balance < amount {
				warn!(
					chain = %chain,
					needed = %amount,
					weth_balance = %weth_balance,
					"insufficient WETH to refill native balance"
				);
				continue;
			}

			match self
				.adapters
				.unwrap_native_token(chain, &weth_l2, amount)
				.await
			{
				Ok(()) => {
					self.balances.decrement_local_balance(chain, &weth_l2, amount);
					info!(chain = %chain, amount = %amount, "unwrapped WETH into native balance");
				}
				Err(e) => {
					error!(chain = %chain, amount = %amount, error = %e, "WETH unwrap failed");
				}
			}
		}
	}

	/// Wraps surplus native token on chains with a wrap config.
	pub async fn wrap_native_tokens_if_necessary(&self) {
		for chain in self.accountant.enabled_chains().to_vec() {
			let Some(wrap) = self.config.wrap_config(chain) else {
				continue;
			};
			if let Err(e) = self
				.adapters
				.wrap_native_token_if_above_threshold(chain, wrap.threshold, wrap.target)
				.await
			{
				error!(chain = %chain, error = %e, "native token wrap failed");
			}
		}
	}

	/// Withdraws excess inventory back to the hub from chains that sit
	/// above the discounted repayment-refusal line, rate-limited per the
	/// configured period.
	pub async fn withdraw_excess_balances(&self) {
		for l1_token in self.accountant.l1_tokens() {
			for chain in self.accountant.enabled_chains().to_vec() {
				for l2_token in self.accountant.l2_tokens_for(&l1_token, chain) {
					let Some(token_config) =
						self.config.token_config(&l1_token, chain, Some(&l2_token))
					else {
						continue;
					};
					let Some(period) = token_config.withdraw_excess_period else {
						continue;
					};
					if let Err(e) = self
						.try_withdraw_excess(&l1_token, chain, &l2_token, token_config, period)
						.await
					{
						error!(
							chain = %chain,
							token = %l2_token,
							error = %e,
							"excess withdrawal failed"
						);
					}
				}
			}
		}
	}

	async fn try_withdraw_excess(
		&self,
		l1_token: &Address,
		chain: ChainId,
		l2_token: &Address,
		token_config: &relayer_config::TokenBalanceConfig,
		period: u64,
	) -> Result<()> {
		let fp = fixed_point();
		// target * overage * 0.95: trigger slightly below the line at
		// which the repayment selector starts refusing this chain.
		let withdraw_threshold_pct = mul_frac(
			mul_frac(token_config.target_pct, token_config.target_overage_buffer, fp),
			excess_withdraw_discount(),
			fp,
		);

		let current_pct = self
			.accountant
			.current_allocation_pct(l1_token, chain, Some(l2_token))?;
		if current_pct < withdraw_threshold_pct {
			return Ok(());
		}

		let hub_chain = self.hub.hub_chain();
		let l1_decimals = self
			.hub
			.get_token_info_for_address(l1_token, hub_chain)
			.ok_or_else(|| {
				RelayerError::Config(format!("no token info for L1 token {l1_token}"))
			})?
			.decimals;
		let l2_decimals = self
			.hub
			.get_token_info_for_address(l2_token, chain)
			.ok_or_else(|| {
				RelayerError::Config(format!(
					"no token info for L2 token {l2_token} on chain {chain}"
				))
			})?
			.decimals;

		let cumulative_l2 = convert_decimals(
			l1_decimals,
			l2_decimals,
			self.accountant.cumulative_balance(l1_token)?,
		);
		let withdraw_pct = current_pct.saturating_sub(token_config.target_pct);
		let amount = mul_frac(cumulative_l2, withdraw_pct, fp);
		if amount.is_zero() {
			return Ok(());
		}

		// One read feeds both the log line and the decision.
		let pending = self
			.adapters
			.get_l2_pending_withdrawal_amount(period, chain, l2_token)
			.await?;
		let max_period_volume = mul_frac(
			cumulative_l2,
			withdraw_threshold_pct.saturating_sub(token_config.target_pct),
			fp,
		);
		debug!(
			chain = %chain,
			token = %l2_token,
			amount = %amount,
			pending = %pending,
			max_period_volume = %max_period_volume,
			"excess withdrawal considered"
		);
		if pending >= max_period_volume {
			warn!(
				chain = %chain,
				token = %l2_token,
				pending = %pending,
				max_period_volume = %max_period_volume,
				"excess withdrawal rate limit reached"
			);
			return Ok(());
		}

		self.adapters
			.withdraw_token_from_l2(chain, l2_token, amount)
			.await?;
		self.balances.decrement_local_balance(chain, l2_token, amount);
		info!(chain = %chain, token = %l2_token, amount = %amount, "excess withdrawal submitted");
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::mocks::{
		AdapterCall, MockAdapterManager, MockBalanceClient, MockCrossChainTransferClient,
		MockHubPoolClient,
	};
	use relayer_config::{TokenBalanceConfig, TokenConfigEntry};

	const UNIT: u64 = 1_000_000; // one whole USDC

	fn registry() -> Arc<TokenRegistry> {
		Arc::new(TokenRegistry::mainnet_defaults())
	}

	fn token_config(target_pct: U256) -> TokenBalanceConfig {
		TokenBalanceConfig {
			target_pct,
			threshold_pct: target_pct,
			target_overage_buffer: fixed_point() * 3 / 2,
			unwrap_weth_threshold: None,
			unwrap_weth_target: None,
			withdraw_excess_period: None,
		}
	}

	struct Fixture {
		registry: Arc<TokenRegistry>,
		usdc_l1: Address,
	}

	impl Fixture {
		fn new() -> Self {
			let registry = registry();
			let usdc_l1 = registry.l1_address("USDC").unwrap();
			Self { registry, usdc_l1 }
		}

		fn usdc_on(&self, chain: ChainId) -> Address {
			self.registry.l2_tokens_for(&self.usdc_l1, chain)[0]
		}

		fn planner(
			&self,
			balances: MockBalanceClient,
			adapters: Arc<MockAdapterManager>,
			config: InventoryConfig,
			enabled_chains: Vec<ChainId>,
		) -> RebalancePlanner {
			let relayer = Address::evm([0xee; 20]);
			let balances: Arc<dyn BalanceClient> = Arc::new(balances);
			let hub = Arc::new(MockHubPoolClient::new(self.registry.clone(), ChainId::ETHEREUM));
			let accountant = Arc::new(BalanceAccountant::new(
				relayer,
				enabled_chains,
				balances.clone(),
				Arc::new(MockCrossChainTransferClient::default()),
				hub.clone(),
				self.registry.clone(),
				config.clone(),
			));
			RebalancePlanner::new(
				relayer,
				accountant,
				balances,
				Arc::new(MockCrossChainTransferClient::default()),
				adapters,
				hub,
				self.registry.clone(),
				config,
			)
		}
	}

	/// USDC configured on three spokes with targets 5% / 4% / 3% so the
	/// planned amounts against a 1000-unit cumulative come out 50 / 40 / 30.
	fn three_plan_config(f: &Fixture) -> InventoryConfig {
		let mut entry = TokenConfigEntry::default();
		entry
			.chains
			.insert(ChainId::OPTIMISM, token_config(U256::exp10(16) * 5));
		entry
			.chains
			.insert(ChainId::ARBITRUM, token_config(U256::exp10(16) * 4));
		entry
			.chains
			.insert(ChainId::BASE, token_config(U256::exp10(16) * 3));
		let mut config = InventoryConfig::default();
		config.tokens.insert(f.usdc_l1, entry);
		config
	}

	/// Hub holds 80, a parking chain holds 920: cumulative 1000, budget 80.
	fn three_plan_balances(f: &Fixture) -> MockBalanceClient {
		MockBalanceClient::default()
			.with_balance(ChainId::ETHEREUM, f.usdc_l1, U256::from(80 * UNIT))
			.with_balance(
				ChainId::POLYGON,
				f.usdc_on(ChainId::POLYGON),
				U256::from(920 * UNIT),
			)
	}

	fn three_plan_chains() -> Vec<ChainId> {
		vec![
			ChainId::OPTIMISM,
			ChainId::ARBITRUM,
			ChainId::BASE,
			ChainId::POLYGON,
		]
	}

	#[tokio::test]
	async fn test_budget_exhaustion_executes_in_order() {
		let f = Fixture::new();
		let adapters = Arc::new(MockAdapterManager::default());
		let planner = f.planner(
			three_plan_balances(&f),
			adapters.clone(),
			three_plan_config(&f),
			three_plan_chains(),
		);

		let plans = planner.get_possible_rebalances().unwrap();
		assert_eq!(
			plans.iter().map(|p| p.amount).collect::<Vec<_>>(),
			vec![
				U256::from(50 * UNIT),
				U256::from(40 * UNIT),
				U256::from(30 * UNIT)
			]
		);

		planner.rebalance_inventory_if_necessary().await;

		// 50 fits the 80 budget, 40 exceeds the remaining 30, 30 fits.
		assert_eq!(
			adapters.sent_amounts(),
			vec![U256::from(50 * UNIT), U256::from(30 * UNIT)]
		);
	}

	#[tokio::test]
	async fn test_balance_drift_skips_rebalance() {
		let f = Fixture::new();
		let adapters = Arc::new(MockAdapterManager::default());
		let balances = three_plan_balances(&f).with_onchain_override(
			ChainId::ETHEREUM,
			f.usdc_l1,
			U256::from(25 * UNIT),
		);
		let planner = f.planner(
			balances,
			adapters.clone(),
			three_plan_config(&f),
			three_plan_chains(),
		);

		planner.rebalance_inventory_if_necessary().await;
		assert!(adapters.sent_amounts().is_empty());
	}

	#[tokio::test]
	async fn test_failed_submission_does_not_abort_the_pass() {
		let f = Fixture::new();
		let adapters =
			Arc::new(MockAdapterManager::default().with_failing_sends_to(ChainId::OPTIMISM));
		let planner = f.planner(
			three_plan_balances(&f),
			adapters.clone(),
			three_plan_config(&f),
			three_plan_chains(),
		);

		planner.rebalance_inventory_if_necessary().await;

		// The Optimism plan is abandoned without consuming budget; the
		// remaining two both fit into the untouched 80.
		assert_eq!(
			adapters.sent_amounts(),
			vec![U256::from(40 * UNIT), U256::from(30 * UNIT)]
		);
	}

	#[tokio::test]
	async fn test_unwrap_refills_native_balance() {
		let f = Fixture::new();
		let registry = f.registry.clone();
		let weth_l1 = registry.l1_address("WETH").unwrap();
		let weth_op = registry.address_on("WETH", ChainId::OPTIMISM).unwrap();

		let mut entry = TokenConfigEntry::default();
		entry.chains.insert(
			ChainId::OPTIMISM,
			TokenBalanceConfig {
				target_pct: U256::exp10(17),
				threshold_pct: U256::exp10(16),
				target_overage_buffer: fixed_point() * 3 / 2,
				unwrap_weth_threshold: Some(fixed_point()),     // 1 ETH floor
				unwrap_weth_target: Some(fixed_point() * 2),    // refill to 2
				withdraw_excess_period: None,
			},
		);
		let mut config = InventoryConfig::default();
		config.tokens.insert(weth_l1, entry);

		let balances = MockBalanceClient::default()
			.with_balance(ChainId::OPTIMISM, Address::zero(), fixed_point() / 2)
			.with_balance(ChainId::OPTIMISM, weth_op, fixed_point() * 10);
		let adapters = Arc::new(MockAdapterManager::default());
		let planner = f.planner(balances, adapters.clone(), config, vec![ChainId::OPTIMISM]);

		planner.unwrap_weth_if_necessary().await;

		assert_eq!(
			adapters.calls(),
			vec![AdapterCall::UnwrapNativeToken {
				chain: ChainId::OPTIMISM,
				wrapped_token: weth_op,
				amount: fixed_point() * 3 / 2,
			}]
		);
	}

	#[tokio::test]
	async fn test_unwrap_requires_covering_weth_balance() {
		let f = Fixture::new();
		let registry = f.registry.clone();
		let weth_l1 = registry.l1_address("WETH").unwrap();
		let weth_op = registry.address_on("WETH", ChainId::OPTIMISM).unwrap();

		let mut entry = TokenConfigEntry::default();
		entry.chains.insert(
			ChainId::OPTIMISM,
			TokenBalanceConfig {
				target_pct: U256::exp10(17),
				threshold_pct: U256::exp10(16),
				target_overage_buffer: fixed_point() * 3 / 2,
				unwrap_weth_threshold: Some(fixed_point()),
				unwrap_weth_target: Some(fixed_point() * 2),
				withdraw_excess_period: None,
			},
		);
		let mut config = InventoryConfig::default();
		config.tokens.insert(weth_l1, entry);

		// WETH cannot cover the refill: nothing happens.
		let balances = MockBalanceClient::default()
			.with_balance(ChainId::OPTIMISM, Address::zero(), fixed_point() / 2)
			.with_balance(ChainId::OPTIMISM, weth_op, fixed_point());
		let adapters = Arc::new(MockAdapterManager::default());
		let planner = f.planner(balances, adapters.clone(), config, vec![ChainId::OPTIMISM]);

		planner.unwrap_weth_if_necessary().await;
		assert!(adapters.calls().is_empty());
	}

	fn withdraw_config(f: &Fixture) -> InventoryConfig {
		let mut entry = TokenConfigEntry::default();
		entry.chains.insert(
			ChainId::OPTIMISM,
			TokenBalanceConfig {
				target_pct: U256::exp10(17),        // 10%
				threshold_pct: U256::exp10(16) * 5, // 5%
				target_overage_buffer: fixed_point() * 3 / 2,
				unwrap_weth_threshold: None,
				unwrap_weth_target: None,
				withdraw_excess_period: Some(3600),
			},
		);
		let mut config = InventoryConfig::default();
		config.tokens.insert(f.usdc_l1, entry);
		config
	}

	#[tokio::test]
	async fn test_excess_withdrawal_above_discounted_threshold() {
		let f = Fixture::new();
		// 200 of 1000 on Optimism: 20% against a 14.25% trigger
		// (10% target x 1.5 overage x 0.95 discount).
		let balances = MockBalanceClient::default()
			.with_balance(ChainId::ETHEREUM, f.usdc_l1, U256::from(800 * UNIT))
			.with_balance(
				ChainId::OPTIMISM,
				f.usdc_on(ChainId::OPTIMISM),
				U256::from(200 * UNIT),
			);
		let adapters = Arc::new(MockAdapterManager::default());
		let planner = f.planner(
			balances,
			adapters.clone(),
			withdraw_config(&f),
			vec![ChainId::OPTIMISM],
		);

		planner.withdraw_excess_balances().await;

		// Withdraw back to target: (20% - 10%) of 1000.
		assert_eq!(
			adapters.calls(),
			vec![AdapterCall::WithdrawTokenFromL2 {
				chain: ChainId::OPTIMISM,
				l2_token: f.usdc_on(ChainId::OPTIMISM),
				amount: U256::from(100 * UNIT),
			}]
		);
	}

	#[tokio::test]
	async fn test_excess_withdrawal_rate_limited() {
		let f = Fixture::new();
		let balances = MockBalanceClient::default()
			.with_balance(ChainId::ETHEREUM, f.usdc_l1, U256::from(800 * UNIT))
			.with_balance(
				ChainId::OPTIMISM,
				f.usdc_on(ChainId::OPTIMISM),
				U256::from(200 * UNIT),
			);
		// Period cap is (14.25% - 10%) of 1000 = 42.5; 50 already pending.
		let adapters = Arc::new(
			MockAdapterManager::default().with_pending_withdrawal(
				ChainId::OPTIMISM,
				f.usdc_on(ChainId::OPTIMISM),
				U256::from(50 * UNIT),
			),
		);
		let planner = f.planner(
			balances,
			adapters.clone(),
			withdraw_config(&f),
			vec![ChainId::OPTIMISM],
		);

		planner.withdraw_excess_balances().await;
		assert!(adapters.calls().is_empty());
	}

	#[tokio::test]
	async fn test_withdrawal_below_threshold_is_a_noop() {
		let f = Fixture::new();
		// 12% allocation: below the 14.25% trigger.
		let balances = MockBalanceClient::default()
			.with_balance(ChainId::ETHEREUM, f.usdc_l1, U256::from(880 * UNIT))
			.with_balance(
				ChainId::OPTIMISM,
				f.usdc_on(ChainId::OPTIMISM),
				U256::from(120 * UNIT),
			);
		let adapters = Arc::new(MockAdapterManager::default());
		let planner = f.planner(
			balances,
			adapters.clone(),
			withdraw_config(&f),
			vec![ChainId::OPTIMISM],
		);

		planner.withdraw_excess_balances().await;
		assert!(adapters.calls().is_empty());
	}

	#[tokio::test]
	async fn test_wrap_native_tokens_uses_overrides() {
		let f = Fixture::new();
		let mut config = InventoryConfig {
			wrap_ether_threshold: Some(fixed_point() * 2),
			wrap_ether_target: Some(fixed_point()),
			..Default::default()
		};
		config.wrap_ether_overrides.insert(
			ChainId::BASE,
			relayer_config::WrapConfig {
				threshold: fixed_point() * 5,
				target: fixed_point() * 4,
			},
		);
		// Inventory management itself can stay disabled; wrapping is
		// driven purely by the wrap config.
		let adapters = Arc::new(MockAdapterManager::default());
		let planner = f.planner(
			MockBalanceClient::default(),
			adapters.clone(),
			config,
			vec![ChainId::OPTIMISM, ChainId::BASE],
		);

		planner.wrap_native_tokens_if_necessary().await;

		assert_eq!(
			adapters.calls(),
			vec![
				AdapterCall::WrapNativeToken {
					chain: ChainId::OPTIMISM,
					threshold: fixed_point() * 2,
					target: fixed_point(),
				},
				AdapterCall::WrapNativeToken {
					chain: ChainId::BASE,
					threshold: fixed_point() * 5,
					target: fixed_point() * 4,
				},
			]
		);
	}
}
