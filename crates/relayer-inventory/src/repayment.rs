//! Repayment chain selection.
//!
//! For one deposit, produces the ordered set of chains on which the relayer
//! may safely claim repayment. An empty result means "do not fill".

use crate::balances::BalanceAccountant;
use futures::future::{BoxFuture, Shared};
use futures::FutureExt;
use relayer_config::InventoryConfig;
use relayer_types::amount::{as_pct_fp, convert_decimals, fixed_point, mul_frac};
use relayer_types::{
	Address, BundleDataClient, ChainId, ConfigStoreClient, Deposit, HubPoolClient, RelayerError,
	Result, TokenRegistry, U256,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// A per-tick memoized chain map: concurrent callers during one tick all
/// await the same in-flight future.
type SharedChainMap = Shared<BoxFuture<'static, Arc<HashMap<ChainId, U256>>>>;

/// Everything the async projections need, clonable into 'static futures.
#[derive(Clone)]
struct SelectorContext {
	relayer: Address,
	hub: Arc<dyn HubPoolClient>,
	bundles: Arc<dyn BundleDataClient>,
	config_store: Arc<dyn ConfigStoreClient>,
	registry: Arc<TokenRegistry>,
	config: InventoryConfig,
	enabled_chains: Vec<ChainId>,
}

/// Decides the ordered repayment venues for a deposit, honoring allocation
/// targets, lite-chain constraints, and slow-withdrawal prioritization.
pub struct RepaymentSelector {
	ctx: SelectorContext,
	accountant: Arc<BalanceAccountant>,
	refund_futures: Mutex<HashMap<Address, SharedChainMap>>,
	excess_futures: Mutex<HashMap<Address, SharedChainMap>>,
}

impl RepaymentSelector {
	pub fn new(
		relayer: Address,
		accountant: Arc<BalanceAccountant>,
		hub: Arc<dyn HubPoolClient>,
		bundles: Arc<dyn BundleDataClient>,
		config_store: Arc<dyn ConfigStoreClient>,
		registry: Arc<TokenRegistry>,
		config: InventoryConfig,
		enabled_chains: Vec<ChainId>,
	) -> Self {
		Self {
			ctx: SelectorContext {
				relayer,
				hub,
				bundles,
				config_store,
				registry,
				config,
				enabled_chains,
			},
			accountant,
			refund_futures: Mutex::new(HashMap::new()),
			excess_futures: Mutex::new(HashMap::new()),
		}
	}

	/// Drops the per-tick memoized projections. Called once per update
	/// cycle so the next tick re-reads live data.
	pub async fn clear_tick_state(&self) {
		self.refund_futures.lock().await.clear();
		self.excess_futures.lock().await.clear();
	}

	/// Chains a repayment could conceivably land on for this deposit. Any
	/// selector output outside this set is a bug, not a data problem.
	pub fn get_possible_repayment_chain_ids(&self, deposit: &Deposit) -> Vec<ChainId> {
		let mut chains = vec![
			deposit.destination_chain,
			deposit.origin_chain,
			self.ctx.hub.hub_chain(),
		];
		chains.extend(self.ctx.config.slow_withdrawal_chains.iter().copied());
		chains.sort();
		chains.dedup();
		chains
	}

	/// The ordered repayment venues for `deposit`, highest preference
	/// first. Empty means the deposit has no safe repayment venue and must
	/// not be filled.
	pub async fn determine_refund_chains(&self, deposit: &Deposit) -> Result<Vec<ChainId>> {
		let origin = deposit.origin_chain;
		let destination = deposit.destination_chain;
		let hub_chain = self.ctx.hub.hub_chain();

		// An output token the hub cannot classify rules the deposit out
		// before any inventory logic runs.
		if self
			.ctx
			.hub
			.get_token_info_for_address(&deposit.output_token, destination)
			.is_none()
		{
			warn!(
				deposit_id = %deposit.deposit_id,
				output_token = %deposit.output_token,
				"unclassifiable output token, skipping deposit"
			);
			return Ok(Vec::new());
		}

		let destination_valid = self.destination_repayment_valid(deposit);

		if !self.ctx.config.is_inventory_management_enabled() {
			return Ok(vec![if destination_valid { destination } else { origin }]);
		}

		// A classified-but-inequivalent output is an operator mistake, not
		// a deposit to skip.
		if !self.ctx.hub.are_tokens_equivalent(
			&deposit.input_token,
			origin,
			&deposit.output_token,
			destination,
		) {
			return Err(RelayerError::OutputTokenMismatch {
				input: deposit.input_token.to_native(),
				output: deposit.output_token.to_native(),
				origin: origin.0,
				destination: destination.0,
			});
		}

		let (l1_token, input_l1_amount) = self.l1_token_and_amount(deposit)?;
		let force_origin = deposit.from_lite_chain;

		// Origin repayment from the hub or a fast on/off-ramp chain can be
		// rebalanced away cheaply, so a forced origin is accepted without
		// inspecting allocations.
		if force_origin
			&& (origin == hub_chain || self.ctx.config.fast_rebalance_chains.contains(&origin))
		{
			return Ok(vec![origin]);
		}

		let mut candidates: Vec<ChainId> = Vec::new();
		if force_origin {
			candidates.push(origin);
		} else {
			if self.ctx.config.prioritize_utilization {
				let pcts = self
					.excess_running_balance_pcts(&l1_token, input_l1_amount)
					.await;
				let mut over: Vec<(ChainId, U256)> = pcts
					.iter()
					.filter(|(_, pct)| !pct.is_zero())
					.map(|(chain, pct)| (*chain, *pct))
					.collect();
				over.sort_by(|a, b| b.1.cmp(&a.1));
				candidates.extend(over.into_iter().map(|(chain, _)| chain));
			}
			if deposit.to_lite_chain {
				// Take repayment off the lite destination wherever we can.
				candidates.insert(0, origin);
			}
			if destination_valid
				&& self
					.ctx
					.hub
					.l2_token_enabled_for_l1_token(&l1_token, destination)
			{
				candidates.push(destination);
			}
			if origin != hub_chain && self.ctx.hub.l2_token_enabled_for_l1_token(&l1_token, origin)
			{
				candidates.push(origin);
			}
		}
		dedup_preserving_order(&mut candidates);

		let refunds = self.bundle_refunds(&l1_token).await;
		let total_refunds = refunds
			.values()
			.fold(U256::zero(), |acc, x| acc.saturating_add(*x));
		let cumulative = self.accountant.cumulative_balance(&l1_token)?;
		let denominator = cumulative.saturating_add(total_refunds);

		let mut eligible: Vec<ChainId> = Vec::new();
		for chain in candidates {
			let Some(token_config) = self.ctx.config.token_config(&l1_token, chain, None) else {
				debug!(chain = %chain, token = %l1_token, "no balance config, candidate dropped");
				continue;
			};

			let expected = self.expected_post_relay_allocation(
				deposit,
				&l1_token,
				chain,
				input_l1_amount,
				&refunds,
				denominator,
			)?;

			// A lite destination gets no overage allowance: anything above
			// the bare target refuses repayment there.
			let effective_target = if deposit.to_lite_chain && chain == destination {
				token_config.target_pct
			} else {
				mul_frac(
					token_config.target_pct,
					token_config.target_overage_buffer,
					fixed_point(),
				)
			};

			debug!(
				deposit_id = %deposit.deposit_id,
				chain = %chain,
				expected_alloc = %expected,
				effective_target = %effective_target,
				"repayment candidate evaluated"
			);
			if expected <= effective_target {
				eligible.push(chain);
			}
		}

		if force_origin {
			// Repayment must land exactly on the origin; anything else
			// would strand inventory on a chain we cannot drain.
			if eligible == vec![origin] {
				return Ok(eligible);
			}
			return Ok(Vec::new());
		}

		if !eligible.contains(&hub_chain) {
			eligible.push(hub_chain);
		}

		let possible = self.get_possible_repayment_chain_ids(deposit);
		for chain in &eligible {
			if !possible.contains(chain) {
				return Err(RelayerError::Inventory(format!(
					"selected repayment chain {chain} is not a possible repayment chain for deposit {}",
					deposit.deposit_id
				)));
			}
		}

		Ok(eligible)
	}

	/// Expected allocation on `chain` after filling the deposit and taking
	/// repayment there, as a fraction of the refund-inclusive cumulative.
	fn expected_post_relay_allocation(
		&self,
		deposit: &Deposit,
		l1_token: &Address,
		chain: ChainId,
		input_l1_amount: U256,
		refunds: &HashMap<ChainId, U256>,
		denominator: U256,
	) -> Result<U256> {
		let effective = self.accountant.effective_balance(chain, l1_token, None)?;
		let shortfall = self.accountant.shortfall(chain, l1_token, None)?;

		// Repaying on the destination with the same token nets the spent
		// output against the incoming input; elsewhere the input arrives on
		// top of the current balance.
		let same_token = self.ctx.hub.are_tokens_equivalent(
			&deposit.input_token,
			deposit.origin_chain,
			&deposit.output_token,
			deposit.destination_chain,
		);
		let inbound = if chain == deposit.destination_chain && same_token {
			U256::zero()
		} else {
			input_l1_amount
		};

		let numerator = effective
			.saturating_sub(shortfall)
			.saturating_add(inbound)
			.saturating_add(refunds.get(&chain).copied().unwrap_or_default());
		Ok(as_pct_fp(numerator, denominator))
	}

	/// Whether repayment may be taken on the destination chain at all: the
	/// output token either has a pool rebalance route or is covered by the
	/// equivalence mapping.
	fn destination_repayment_valid(&self, deposit: &Deposit) -> bool {
		if self
			.ctx
			.hub
			.l2_token_has_pool_rebalance_route(&deposit.output_token, deposit.destination_chain)
		{
			return true;
		}
		self.ctx
			.registry
			.info_for_address(&deposit.output_token, deposit.destination_chain)
			.map(|info| self.ctx.registry.resolve(&info.symbol).is_some())
			.unwrap_or(false)
	}

	/// The deposit's canonical token identity and input amount in L1
	/// decimals.
	fn l1_token_and_amount(&self, deposit: &Deposit) -> Result<(Address, U256)> {
		let input_info = self
			.ctx
			.hub
			.get_token_info_for_address(&deposit.input_token, deposit.origin_chain)
			.ok_or_else(|| {
				RelayerError::Config(format!(
					"unknown input token {} on chain {}",
					deposit.input_token, deposit.origin_chain
				))
			})?;
		let l1_token = self
			.ctx
			.registry
			.l1_address(&input_info.symbol)
			.ok_or_else(|| {
				RelayerError::Config(format!(
					"no hub-chain identity for token {}",
					input_info.symbol
				))
			})?;
		let l1_decimals = self
			.ctx
			.hub
			.get_token_info_for_address(&l1_token, self.ctx.hub.hub_chain())
			.map(|info| info.decimals)
			.unwrap_or(input_info.decimals);
		let amount = convert_decimals(input_info.decimals, l1_decimals, deposit.input_amount);
		Ok((l1_token, amount))
	}

	/// Upcoming refunds to the relayer per chain (validated-pending plus
	/// next bundle), in L1 decimals. Memoized per L1 token for the tick.
	pub async fn bundle_refunds(&self, l1_token: &Address) -> Arc<HashMap<ChainId, U256>> {
		let future = {
			let mut futures = self.refund_futures.lock().await;
			futures
				.entry(*l1_token)
				.or_insert_with(|| {
					let ctx = self.ctx.clone();
					let l1_token = *l1_token;
					async move { Arc::new(compute_bundle_refunds(ctx, l1_token).await) }
						.boxed()
						.shared()
				})
				.clone()
		};
		future.await
	}

	/// Excess running balance percentages per slow-withdrawal chain,
	/// post-relay (the refund amount of the first caller in the tick is
	/// already subtracted). Memoized per L1 token for the tick.
	pub async fn excess_running_balance_pcts(
		&self,
		l1_token: &Address,
		refund_amount: U256,
	) -> Arc<HashMap<ChainId, U256>> {
		let future = {
			let mut futures = self.excess_futures.lock().await;
			futures
				.entry(*l1_token)
				.or_insert_with(|| {
					let ctx = self.ctx.clone();
					let l1_token = *l1_token;
					async move {
						Arc::new(compute_excess_running_balance_pcts(ctx, l1_token, refund_amount).await)
					}
					.boxed()
					.shared()
				})
				.clone()
		};
		future.await
	}
}

fn dedup_preserving_order(chains: &mut Vec<ChainId>) {
	let mut seen = Vec::with_capacity(chains.len());
	chains.retain(|chain| {
		if seen.contains(chain) {
			false
		} else {
			seen.push(*chain);
			true
		}
	});
}

/// Total refund owed to the relayer per chain across pending valid bundles
/// and the next bundle, normalized to L1 decimals. Projection failures
/// degrade to "no refunds" with a warning; repayment selection then simply
/// leans conservative.
async fn compute_bundle_refunds(ctx: SelectorContext, l1_token: Address) -> HashMap<ChainId, U256> {
	let mut bundles = match ctx.bundles.get_pending_refunds_from_valid_bundles().await {
		Ok(bundles) => bundles,
		Err(e) => {
			warn!(error = %e, "pending refund projection failed");
			Vec::new()
		}
	};
	match ctx.bundles.get_next_bundle_refunds().await {
		Ok(next) => bundles.push(next),
		Err(e) => warn!(error = %e, "next bundle refund projection failed"),
	}

	let hub_chain = ctx.hub.hub_chain();
	let l1_decimals = ctx
		.hub
		.get_token_info_for_address(&l1_token, hub_chain)
		.map(|info| info.decimals)
		.unwrap_or(18);

	let mut refunds = HashMap::new();
	for chain in std::iter::once(hub_chain).chain(ctx.enabled_chains.iter().copied()) {
		let mut total = U256::zero();
		let l2_tokens = if chain == hub_chain {
			vec![l1_token]
		} else {
			ctx.registry.l2_tokens_for(&l1_token, chain)
		};
		for l2_token in l2_tokens {
			let amount =
				ctx.bundles
					.get_total_refund(&bundles, &ctx.relayer, chain, &l2_token);
			if amount.is_zero() {
				continue;
			}
			let l2_decimals = ctx
				.hub
				.get_token_info_for_address(&l2_token, chain)
				.map(|info| info.decimals)
				.unwrap_or(l1_decimals);
			total = total.saturating_add(convert_decimals(l2_decimals, l1_decimals, amount));
		}
		if !total.is_zero() {
			refunds.insert(chain, total);
		}
	}
	refunds
}

/// Excess running balance percentage per slow-withdrawal chain.
///
/// A chain's validated running balance, minus deposits since the bundle's
/// end block, plus its next-bundle refunds, is the hub's net position; a
/// negative position means the hub is over-allocated to the spoke and the
/// magnitude is the excess.
async fn compute_excess_running_balance_pcts(
	ctx: SelectorContext,
	l1_token: Address,
	refund_amount: U256,
) -> HashMap<ChainId, U256> {
	use relayer_types::I256;

	let hub_chain = ctx.hub.hub_chain();
	let l1_decimals = ctx
		.hub
		.get_token_info_for_address(&l1_token, hub_chain)
		.map(|info| info.decimals)
		.unwrap_or(18);

	let next_refunds = match ctx.bundles.get_next_bundle_refunds().await {
		Ok(next) => vec![next],
		Err(e) => {
			warn!(error = %e, "next bundle refund projection failed");
			Vec::new()
		}
	};

	let mut pcts = HashMap::new();
	for chain in ctx.config.slow_withdrawal_chains.iter().copied() {
		let Some(bundle) =
			ctx.hub
				.get_latest_executed_root_bundle_containing_l1_token(&l1_token, chain)
		else {
			continue;
		};
		let Some(l2_token) = ctx.registry.l2_tokens_for(&l1_token, chain).first().copied() else {
			continue;
		};
		let l2_decimals = ctx
			.hub
			.get_token_info_for_address(&l2_token, chain)
			.map(|info| info.decimals)
			.unwrap_or(l1_decimals);

		let running_balance = match ctx
			.hub
			.get_running_balance_before_block_for_chain(&l1_token, chain, bundle.end_block)
			.await
		{
			Ok(balance) => balance,
			Err(e) => {
				warn!(chain = %chain, error = %e, "running balance fetch failed");
				continue;
			}
		};
		let deposits = match ctx
			.bundles
			.get_upcoming_deposit_amount(chain, &l2_token, bundle.end_block)
			.await
		{
			Ok(amount) => convert_decimals(l2_decimals, l1_decimals, amount),
			Err(e) => {
				warn!(chain = %chain, error = %e, "upcoming deposit fetch failed");
				continue;
			}
		};
		let refunds = convert_decimals(
			l2_decimals,
			l1_decimals,
			ctx.bundles
				.get_total_refund(&next_refunds, &ctx.relayer, chain, &l2_token),
		);

		let net = running_balance - I256::from_raw(deposits) + I256::from_raw(refunds);
		let excess = if net.is_negative() {
			net.unsigned_abs()
		} else {
			U256::zero()
		};
		let post_relay_excess = excess.saturating_sub(refund_amount);

		let target = ctx
			.config_store
			.get_spoke_target_balances(&l1_token, chain)
			.target;
		let pct = if target >= post_relay_excess {
			U256::zero()
		} else if target.is_zero() {
			U256::MAX
		} else {
			as_pct_fp(post_relay_excess - target, target)
		};
		debug!(
			chain = %chain,
			token = %l1_token,
			excess = %excess,
			post_relay_excess = %post_relay_excess,
			target = %target,
			pct = %pct,
			"excess running balance computed"
		);
		pcts.insert(chain, pct);
	}
	pcts
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::mocks::{
		MockBalanceClient, MockBundleDataClient, MockConfigStoreClient,
		MockCrossChainTransferClient, MockHubPoolClient,
	};
	use relayer_config::{TokenBalanceConfig, TokenConfigEntry};
	use relayer_types::{EthBytes, I256};

	const UNIT: u64 = 1_000_000; // one whole USDC
	const RELAYER: [u8; 20] = [0xee; 20];

	fn registry() -> Arc<TokenRegistry> {
		Arc::new(TokenRegistry::mainnet_defaults())
	}

	fn enabled_chains() -> Vec<ChainId> {
		vec![
			ChainId::OPTIMISM,
			ChainId::ARBITRUM,
			ChainId::BASE,
			ChainId::POLYGON,
			ChainId::ZKSYNC,
		]
	}

	/// USDC targeted at 10% (threshold 5%, default 1.5x overage) on the
	/// given chains.
	fn usdc_config(chains: &[ChainId], fast_rebalance_chains: Vec<ChainId>) -> InventoryConfig {
		let mut entry = TokenConfigEntry::default();
		for chain in chains {
			entry.chains.insert(
				*chain,
				TokenBalanceConfig {
					target_pct: U256::exp10(17),      // 10%
					threshold_pct: U256::exp10(16) * 5, // 5%
					target_overage_buffer: fixed_point() * 3 / 2,
					unwrap_weth_threshold: None,
					unwrap_weth_target: None,
					withdraw_excess_period: None,
				},
			);
		}
		let mut config = InventoryConfig {
			fast_rebalance_chains,
			..Default::default()
		};
		config
			.tokens
			.insert(registry().l1_address("USDC").unwrap(), entry);
		config
	}

	fn usdc_deposit(origin: ChainId, destination: ChainId, input_units: u64) -> Deposit {
		let registry = registry();
		Deposit {
			deposit_id: U256::from(42),
			origin_chain: origin,
			destination_chain: destination,
			input_token: registry.address_on("USDC", origin).unwrap(),
			input_amount: U256::from(input_units * UNIT),
			output_token: registry.address_on("USDC", destination).unwrap(),
			output_amount: U256::from(input_units * UNIT * 99 / 100),
			updated_output_amount: None,
			message: EthBytes::default(),
			fill_deadline: u64::MAX,
			exclusivity_deadline: 0,
			exclusive_relayer: Address::zero(),
			from_lite_chain: false,
			to_lite_chain: false,
			depositor: Address::evm([3; 20]),
			recipient: Address::evm([4; 20]),
			quote_timestamp: 0,
		}
	}

	/// Balances expressed as whole USDC per chain, applied to the first
	/// deployment on each chain (plus the hub's canonical token).
	fn balances_from(per_chain: &[(ChainId, u64)]) -> MockBalanceClient {
		let registry = registry();
		let usdc_l1 = registry.l1_address("USDC").unwrap();
		let mut client = MockBalanceClient::default();
		for (chain, units) in per_chain {
			let token = if *chain == ChainId::ETHEREUM {
				usdc_l1
			} else {
				registry.l2_tokens_for(&usdc_l1, *chain)[0]
			};
			client = client.with_balance(*chain, token, U256::from(units * UNIT));
		}
		client
	}

	fn build_selector(
		balances: MockBalanceClient,
		hub: MockHubPoolClient,
		bundles: MockBundleDataClient,
		store: MockConfigStoreClient,
		config: InventoryConfig,
	) -> RepaymentSelector {
		let registry = registry();
		let relayer = Address::evm(RELAYER);
		let hub = Arc::new(hub);
		let accountant = Arc::new(BalanceAccountant::new(
			relayer,
			enabled_chains(),
			Arc::new(balances),
			Arc::new(MockCrossChainTransferClient::default()),
			hub.clone(),
			registry.clone(),
			config.clone(),
		));
		RepaymentSelector::new(
			relayer,
			accountant,
			hub,
			Arc::new(bundles),
			Arc::new(store),
			registry,
			config,
			enabled_chains(),
		)
	}

	fn default_hub() -> MockHubPoolClient {
		MockHubPoolClient::new(registry(), ChainId::ETHEREUM)
	}

	#[tokio::test]
	async fn test_under_allocated_destination_and_origin_with_hub_fallback() {
		let config = usdc_config(&enabled_chains(), vec![]);
		let selector = build_selector(
			balances_from(&[(ChainId::ETHEREUM, 900), (ChainId::OPTIMISM, 50)]),
			default_hub(),
			MockBundleDataClient::default(),
			MockConfigStoreClient::default(),
			config,
		);

		let deposit = usdc_deposit(ChainId::POLYGON, ChainId::OPTIMISM, 10);
		let chains = selector.determine_refund_chains(&deposit).await.unwrap();
		assert_eq!(
			chains,
			vec![ChainId::OPTIMISM, ChainId::POLYGON, ChainId::ETHEREUM]
		);
	}

	#[tokio::test]
	async fn test_hub_is_sole_fallback_when_everything_is_over_allocated() {
		let config = usdc_config(&enabled_chains(), vec![]);
		let selector = build_selector(
			balances_from(&[
				(ChainId::ETHEREUM, 100),
				(ChainId::OPTIMISM, 200),
				(ChainId::POLYGON, 200),
			]),
			default_hub(),
			MockBundleDataClient::default(),
			MockConfigStoreClient::default(),
			config,
		);

		let deposit = usdc_deposit(ChainId::POLYGON, ChainId::OPTIMISM, 10);
		let chains = selector.determine_refund_chains(&deposit).await.unwrap();
		assert_eq!(chains, vec![ChainId::ETHEREUM]);
	}

	#[tokio::test]
	async fn test_forced_origin_on_fast_rebalance_chain_ignores_allocation() {
		// Origin is over-allocated, but it supports fast rebalancing, so
		// the forced origin repayment is accepted unconditionally.
		let config = usdc_config(&enabled_chains(), vec![ChainId::ZKSYNC]);
		let selector = build_selector(
			balances_from(&[(ChainId::ETHEREUM, 100), (ChainId::ZKSYNC, 400)]),
			default_hub(),
			MockBundleDataClient::default(),
			MockConfigStoreClient::default(),
			config,
		);

		let mut deposit = usdc_deposit(ChainId::ZKSYNC, ChainId::OPTIMISM, 10);
		deposit.from_lite_chain = true;
		let chains = selector.determine_refund_chains(&deposit).await.unwrap();
		assert_eq!(chains, vec![ChainId::ZKSYNC]);
	}

	#[tokio::test]
	async fn test_forced_origin_without_fast_rebalance_is_origin_or_nothing() {
		let config = usdc_config(&enabled_chains(), vec![]);

		// Under target: the origin is the one and only venue.
		let selector = build_selector(
			balances_from(&[(ChainId::ETHEREUM, 900), (ChainId::POLYGON, 20)]),
			default_hub(),
			MockBundleDataClient::default(),
			MockConfigStoreClient::default(),
			config.clone(),
		);
		let mut deposit = usdc_deposit(ChainId::POLYGON, ChainId::OPTIMISM, 10);
		deposit.from_lite_chain = true;
		let chains = selector.determine_refund_chains(&deposit).await.unwrap();
		assert_eq!(chains, vec![ChainId::POLYGON]);

		// Over target: refusing beats over-allocating a chain we cannot
		// drain. No hub fallback for forced-origin deposits.
		let selector = build_selector(
			balances_from(&[(ChainId::ETHEREUM, 100), (ChainId::POLYGON, 400)]),
			default_hub(),
			MockBundleDataClient::default(),
			MockConfigStoreClient::default(),
			config,
		);
		let chains = selector.determine_refund_chains(&deposit).await.unwrap();
		assert!(chains.is_empty());
	}

	#[tokio::test]
	async fn test_slow_withdrawal_chains_are_prioritized_by_excess() {
		let usdc_l1 = registry().l1_address("USDC").unwrap();
		// Arbitrum runs a 20% post-relay excess, Optimism 5%.
		let hub = default_hub()
			.with_running_balance(usdc_l1, ChainId::ARBITRUM, 100, I256::from(-130_000_000i64))
			.with_running_balance(usdc_l1, ChainId::OPTIMISM, 100, I256::from(-115_000_000i64));
		let store = MockConfigStoreClient::default()
			.with_target(usdc_l1, ChainId::ARBITRUM, U256::from(100 * UNIT))
			.with_target(usdc_l1, ChainId::OPTIMISM, U256::from(100 * UNIT));

		let config = usdc_config(&enabled_chains(), vec![]);
		let selector = build_selector(
			balances_from(&[
				(ChainId::ETHEREUM, 10_000),
				(ChainId::OPTIMISM, 100),
				(ChainId::ARBITRUM, 100),
				(ChainId::BASE, 100),
				(ChainId::POLYGON, 100),
			]),
			hub,
			MockBundleDataClient::default(),
			store,
			config,
		);

		let deposit = usdc_deposit(ChainId::POLYGON, ChainId::BASE, 10);
		let chains = selector.determine_refund_chains(&deposit).await.unwrap();
		assert_eq!(
			chains,
			vec![
				ChainId::ARBITRUM,
				ChainId::OPTIMISM,
				ChainId::BASE,
				ChainId::POLYGON,
				ChainId::ETHEREUM,
			]
		);
	}

	#[tokio::test]
	async fn test_excess_pct_saturates_when_target_is_zero() {
		let usdc_l1 = registry().l1_address("USDC").unwrap();
		let hub = default_hub().with_running_balance(
			usdc_l1,
			ChainId::ARBITRUM,
			100,
			I256::from(-50_000_000i64),
		);
		let config = usdc_config(&enabled_chains(), vec![]);
		let selector = build_selector(
			balances_from(&[(ChainId::ETHEREUM, 100)]),
			hub,
			MockBundleDataClient::default(),
			MockConfigStoreClient::default(),
			config,
		);

		let pcts = selector
			.excess_running_balance_pcts(&usdc_l1, U256::zero())
			.await;
		assert_eq!(pcts.get(&ChainId::ARBITRUM), Some(&U256::MAX));
	}

	#[tokio::test]
	async fn test_lite_destination_prepends_origin_and_drops_overage() {
		// Destination sits at 12%: inside the 15% overage room, but a lite
		// destination gets no overage, so 12% > 10% refuses repayment.
		let config = usdc_config(&enabled_chains(), vec![]);
		let selector = build_selector(
			balances_from(&[(ChainId::ETHEREUM, 880), (ChainId::OPTIMISM, 120)]),
			default_hub(),
			MockBundleDataClient::default(),
			MockConfigStoreClient::default(),
			config,
		);

		let mut deposit = usdc_deposit(ChainId::POLYGON, ChainId::OPTIMISM, 10);
		deposit.to_lite_chain = true;
		let chains = selector.determine_refund_chains(&deposit).await.unwrap();
		assert_eq!(chains, vec![ChainId::POLYGON, ChainId::ETHEREUM]);
	}

	#[tokio::test]
	async fn test_disabled_inventory_returns_destination() {
		let selector = build_selector(
			balances_from(&[]),
			default_hub(),
			MockBundleDataClient::default(),
			MockConfigStoreClient::default(),
			InventoryConfig::default(),
		);

		let deposit = usdc_deposit(ChainId::POLYGON, ChainId::OPTIMISM, 10);
		let chains = selector.determine_refund_chains(&deposit).await.unwrap();
		assert_eq!(chains, vec![ChainId::OPTIMISM]);
	}

	#[tokio::test]
	async fn test_unclassifiable_output_token_skips_deposit() {
		let config = usdc_config(&enabled_chains(), vec![]);
		let selector = build_selector(
			balances_from(&[(ChainId::ETHEREUM, 100)]),
			default_hub(),
			MockBundleDataClient::default(),
			MockConfigStoreClient::default(),
			config,
		);

		let mut deposit = usdc_deposit(ChainId::POLYGON, ChainId::OPTIMISM, 10);
		deposit.output_token = Address::evm([0x99; 20]);
		let chains = selector.determine_refund_chains(&deposit).await.unwrap();
		assert!(chains.is_empty());
	}

	#[tokio::test]
	async fn test_inequivalent_output_token_is_a_configuration_bug() {
		let config = usdc_config(&enabled_chains(), vec![]);
		let selector = build_selector(
			balances_from(&[(ChainId::ETHEREUM, 100)]),
			default_hub(),
			MockBundleDataClient::default(),
			MockConfigStoreClient::default(),
			config,
		);

		let mut deposit = usdc_deposit(ChainId::POLYGON, ChainId::OPTIMISM, 10);
		deposit.output_token = registry().address_on("DAI", ChainId::OPTIMISM).unwrap();
		let result = selector.determine_refund_chains(&deposit).await;
		assert!(matches!(
			result,
			Err(RelayerError::OutputTokenMismatch { .. })
		));
	}

	#[tokio::test]
	async fn test_upcoming_refunds_raise_expected_allocation() {
		let registry = registry();
		let usdc_l1 = registry.l1_address("USDC").unwrap();
		let usdc_op = registry.l2_tokens_for(&usdc_l1, ChainId::OPTIMISM)[0];
		// 140 USDC of refunds are already headed to Optimism: 50 held +
		// 140 incoming = 190 of a 1140 denominator, just under 16.7%,
		// above the 15% effective target.
		let bundles = MockBundleDataClient::default().with_pending_refund(
			ChainId::OPTIMISM,
			usdc_op,
			Address::evm(RELAYER),
			U256::from(140 * UNIT),
		);
		let config = usdc_config(&enabled_chains(), vec![]);
		let selector = build_selector(
			balances_from(&[(ChainId::ETHEREUM, 950), (ChainId::OPTIMISM, 50)]),
			default_hub(),
			bundles,
			MockConfigStoreClient::default(),
			config,
		);

		let deposit = usdc_deposit(ChainId::POLYGON, ChainId::OPTIMISM, 10);
		let chains = selector.determine_refund_chains(&deposit).await.unwrap();
		assert!(!chains.contains(&ChainId::OPTIMISM));
		assert_eq!(chains.last(), Some(&ChainId::ETHEREUM));
	}

	#[tokio::test]
	async fn test_projections_are_memoized_per_tick() {
		let usdc_l1 = registry().l1_address("USDC").unwrap();
		let config = usdc_config(&enabled_chains(), vec![]);
		let selector = build_selector(
			balances_from(&[(ChainId::ETHEREUM, 100)]),
			default_hub(),
			MockBundleDataClient::default(),
			MockConfigStoreClient::default(),
			config,
		);

		let first = selector.bundle_refunds(&usdc_l1).await;
		let second = selector.bundle_refunds(&usdc_l1).await;
		assert!(Arc::ptr_eq(&first, &second));

		selector.clear_tick_state().await;
		let third = selector.bundle_refunds(&usdc_l1).await;
		assert!(!Arc::ptr_eq(&first, &third));
	}

	#[tokio::test]
	async fn test_disabled_route_removes_destination_candidate() {
		let usdc_l1 = registry().l1_address("USDC").unwrap();
		let hub = default_hub().with_disabled_route(usdc_l1, ChainId::OPTIMISM);
		let config = usdc_config(&enabled_chains(), vec![]);
		let selector = build_selector(
			balances_from(&[(ChainId::ETHEREUM, 900), (ChainId::OPTIMISM, 50)]),
			hub,
			MockBundleDataClient::default(),
			MockConfigStoreClient::default(),
			config,
		);

		let deposit = usdc_deposit(ChainId::POLYGON, ChainId::OPTIMISM, 10);
		let chains = selector.determine_refund_chains(&deposit).await.unwrap();
		assert_eq!(chains, vec![ChainId::POLYGON, ChainId::ETHEREUM]);
	}
}
