//! Mock collaborators for inventory tests.

use async_trait::async_trait;
use relayer_types::{
	Address, AdapterManager, BalanceClient, BundleDataClient, BundleRefunds, ChainId,
	ConfigStoreClient, CrossChainTransfer, CrossChainTransferClient, ExecutedRootBundle,
	HubPoolClient, I256, RelayerError, Result, SpokeTargetBalances, TokenInfo, TokenRegistry,
	TransferStatus, U256,
};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

/// Balance client backed by in-memory maps. `fetch_balance` reads the same
/// map as `get_balance` unless an on-chain override is planted to simulate
/// drift.
#[derive(Default)]
pub struct MockBalanceClient {
	balances: Mutex<HashMap<(ChainId, Address), U256>>,
	shortfalls: HashMap<(ChainId, Address), U256>,
	onchain_overrides: HashMap<(ChainId, Address), U256>,
}

impl MockBalanceClient {
	pub fn with_balance(self, chain: ChainId, token: Address, amount: U256) -> Self {
		self.balances
			.lock()
			.unwrap()
			.insert((chain, token), amount);
		self
	}

	pub fn with_shortfall(mut self, chain: ChainId, token: Address, amount: U256) -> Self {
		self.shortfalls.insert((chain, token), amount);
		self
	}

	/// Makes the authoritative read disagree with the cached balance.
	pub fn with_onchain_override(mut self, chain: ChainId, token: Address, amount: U256) -> Self {
		self.onchain_overrides.insert((chain, token), amount);
		self
	}
}

#[async_trait]
impl BalanceClient for MockBalanceClient {
	fn get_balance(&self, chain: ChainId, token: &Address) -> U256 {
		self.balances
			.lock()
			.unwrap()
			.get(&(chain, *token))
			.copied()
			.unwrap_or_default()
	}

	fn get_shortfall_total_requirement(&self, chain: ChainId, token: &Address) -> U256 {
		self.shortfalls
			.get(&(chain, *token))
			.copied()
			.unwrap_or_default()
	}

	fn decrement_local_balance(&self, chain: ChainId, token: &Address, amount: U256) {
		let mut balances = self.balances.lock().unwrap();
		let entry = balances.entry((chain, *token)).or_default();
		*entry = entry.saturating_sub(amount);
	}

	async fn fetch_balance(&self, chain: ChainId, token: &Address) -> Result<U256> {
		if let Some(amount) = self.onchain_overrides.get(&(chain, *token)) {
			return Ok(*amount);
		}
		Ok(self.get_balance(chain, token))
	}
}

/// Hub-pool client deriving token info and equivalence from a registry,
/// with route enablement and running balances planted per test.
pub struct MockHubPoolClient {
	registry: Arc<TokenRegistry>,
	hub_chain: ChainId,
	disabled_routes: HashSet<(Address, ChainId)>,
	running_balances: HashMap<(Address, ChainId), I256>,
	executed_bundles: HashMap<(Address, ChainId), ExecutedRootBundle>,
}

impl MockHubPoolClient {
	pub fn new(registry: Arc<TokenRegistry>, hub_chain: ChainId) -> Self {
		Self {
			registry,
			hub_chain,
			disabled_routes: HashSet::new(),
			running_balances: HashMap::new(),
			executed_bundles: HashMap::new(),
		}
	}

	pub fn with_disabled_route(mut self, l1_token: Address, chain: ChainId) -> Self {
		self.disabled_routes.insert((l1_token, chain));
		self
	}

	pub fn with_running_balance(
		mut self,
		l1_token: Address,
		chain: ChainId,
		end_block: u64,
		balance: I256,
	) -> Self {
		self.executed_bundles
			.insert((l1_token, chain), ExecutedRootBundle { end_block });
		self.running_balances.insert((l1_token, chain), balance);
		self
	}

}

#[async_trait]
impl HubPoolClient for MockHubPoolClient {
	fn hub_chain(&self) -> ChainId {
		self.hub_chain
	}

	fn get_token_info_for_address(&self, token: &Address, chain: ChainId) -> Option<TokenInfo> {
		self.registry.info_for_address(token, chain)
	}

	fn l2_token_has_pool_rebalance_route(&self, l2_token: &Address, chain: ChainId) -> bool {
		self.registry.info_for_address(l2_token, chain).is_some()
	}

	fn l2_token_enabled_for_l1_token(&self, l1_token: &Address, chain: ChainId) -> bool {
		if self.disabled_routes.contains(&(*l1_token, chain)) {
			return false;
		}
		!self.registry.l2_tokens_for(l1_token, chain).is_empty()
	}

	fn are_tokens_equivalent(
		&self,
		token_a: &Address,
		chain_a: ChainId,
		token_b: &Address,
		chain_b: ChainId,
	) -> bool {
		match (
			self.registry.info_for_address(token_a, chain_a),
			self.registry.info_for_address(token_b, chain_b),
		) {
			(Some(a), Some(b)) => a.symbol == b.symbol,
			_ => false,
		}
	}

	fn l1_tokens(&self) -> Vec<Address> {
		["WETH", "USDC", "USDT", "DAI", "WBTC"]
			.iter()
			.filter_map(|symbol| self.registry.l1_address(symbol))
			.collect()
	}

	fn get_latest_executed_root_bundle_containing_l1_token(
		&self,
		l1_token: &Address,
		chain: ChainId,
	) -> Option<ExecutedRootBundle> {
		self.executed_bundles.get(&(*l1_token, chain)).copied()
	}

	async fn get_running_balance_before_block_for_chain(
		&self,
		l1_token: &Address,
		chain: ChainId,
		_block: u64,
	) -> Result<I256> {
		Ok(self
			.running_balances
			.get(&(*l1_token, chain))
			.copied()
			.unwrap_or_default())
	}
}

/// Config-store client with planted spoke targets.
#[derive(Default)]
pub struct MockConfigStoreClient {
	targets: HashMap<(Address, ChainId), SpokeTargetBalances>,
}

impl MockConfigStoreClient {
	pub fn with_target(mut self, l1_token: Address, chain: ChainId, target: U256) -> Self {
		self.targets.insert(
			(l1_token, chain),
			SpokeTargetBalances {
				target,
				threshold: target / 2,
			},
		);
		self
	}
}

impl ConfigStoreClient for MockConfigStoreClient {
	fn get_spoke_target_balances(&self, l1_token: &Address, chain: ChainId) -> SpokeTargetBalances {
		self.targets
			.get(&(*l1_token, chain))
			.copied()
			.unwrap_or_default()
	}
}

/// Bundle-data client with planted refund and deposit projections.
#[derive(Default)]
pub struct MockBundleDataClient {
	pending_refunds: Vec<BundleRefunds>,
	next_refunds: BundleRefunds,
	upcoming_deposits: HashMap<(ChainId, Address), U256>,
}

impl MockBundleDataClient {
	pub fn with_pending_refund(
		mut self,
		chain: ChainId,
		l2_token: Address,
		relayer: Address,
		amount: U256,
	) -> Self {
		let mut bundle = BundleRefunds::new();
		bundle
			.entry(chain)
			.or_default()
			.entry(l2_token)
			.or_default()
			.insert(relayer, amount);
		self.pending_refunds.push(bundle);
		self
	}

	pub fn with_next_refund(
		mut self,
		chain: ChainId,
		l2_token: Address,
		relayer: Address,
		amount: U256,
	) -> Self {
		self.next_refunds
			.entry(chain)
			.or_default()
			.entry(l2_token)
			.or_default()
			.insert(relayer, amount);
		self
	}

	pub fn with_upcoming_deposits(mut self, chain: ChainId, l2_token: Address, amount: U256) -> Self {
		self.upcoming_deposits.insert((chain, l2_token), amount);
		self
	}
}

#[async_trait]
impl BundleDataClient for MockBundleDataClient {
	async fn get_pending_refunds_from_valid_bundles(&self) -> Result<Vec<BundleRefunds>> {
		Ok(self.pending_refunds.clone())
	}

	async fn get_next_bundle_refunds(&self) -> Result<BundleRefunds> {
		Ok(self.next_refunds.clone())
	}

	async fn get_upcoming_deposit_amount(
		&self,
		chain: ChainId,
		l2_token: &Address,
		_from_block: u64,
	) -> Result<U256> {
		Ok(self
			.upcoming_deposits
			.get(&(chain, *l2_token))
			.copied()
			.unwrap_or_default())
	}
}

/// Transfer client over an in-memory transfer list; only pending entries
/// count toward outstanding totals.
#[derive(Default)]
pub struct MockCrossChainTransferClient {
	transfers: Mutex<Vec<CrossChainTransfer>>,
}

impl MockCrossChainTransferClient {
	pub fn with_outstanding(
		self,
		chain: ChainId,
		l1_token: Address,
		l2_token: Address,
		amount: U256,
	) -> Self {
		self.transfers.lock().unwrap().push(CrossChainTransfer {
			address: Address::zero(),
			l1_token,
			l2_token,
			chain_id: chain,
			amount,
			status: TransferStatus::Pending,
		});
		self
	}

	pub fn with_finalized(
		self,
		chain: ChainId,
		l1_token: Address,
		l2_token: Address,
		amount: U256,
	) -> Self {
		self.transfers.lock().unwrap().push(CrossChainTransfer {
			address: Address::zero(),
			l1_token,
			l2_token,
			chain_id: chain,
			amount,
			status: TransferStatus::Finalized,
		});
		self
	}
}

impl CrossChainTransferClient for MockCrossChainTransferClient {
	fn get_outstanding_cross_chain_transfer_amount(
		&self,
		_relayer: &Address,
		chain: ChainId,
		l1_token: &Address,
		l2_token: Option<&Address>,
	) -> U256 {
		let transfers = self.transfers.lock().unwrap();
		transfers
			.iter()
			.filter(|transfer| {
				transfer.status == TransferStatus::Pending
					&& transfer.chain_id == chain
					&& transfer.l1_token == *l1_token
					&& l2_token.map_or(true, |t| transfer.l2_token == *t)
			})
			.fold(U256::zero(), |acc, transfer| {
				acc.saturating_add(transfer.amount)
			})
	}

	fn increase_outstanding_transfer(
		&self,
		relayer: &Address,
		l1_token: &Address,
		l2_token: &Address,
		amount: U256,
		chain: ChainId,
	) {
		self.transfers.lock().unwrap().push(CrossChainTransfer {
			address: *relayer,
			l1_token: *l1_token,
			l2_token: *l2_token,
			chain_id: chain,
			amount,
			status: TransferStatus::Pending,
		});
	}
}

/// Records every adapter call; individual operations can be made to fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdapterCall {
	SendTokenCrossChain {
		chain: ChainId,
		l1_token: Address,
		l2_token: Option<Address>,
		amount: U256,
	},
	WithdrawTokenFromL2 {
		chain: ChainId,
		l2_token: Address,
		amount: U256,
	},
	WrapNativeToken {
		chain: ChainId,
		threshold: U256,
		target: U256,
	},
	UnwrapNativeToken {
		chain: ChainId,
		wrapped_token: Address,
		amount: U256,
	},
	SetL1TokenApprovals {
		l1_tokens: Vec<Address>,
	},
}

#[derive(Default)]
pub struct MockAdapterManager {
	recorded: Mutex<Vec<AdapterCall>>,
	fail_sends_to: HashSet<ChainId>,
	pending_withdrawals: HashMap<(ChainId, Address), U256>,
}

impl MockAdapterManager {
	pub fn with_failing_sends_to(mut self, chain: ChainId) -> Self {
		self.fail_sends_to.insert(chain);
		self
	}

	pub fn with_pending_withdrawal(mut self, chain: ChainId, l2_token: Address, amount: U256) -> Self {
		self.pending_withdrawals.insert((chain, l2_token), amount);
		self
	}

	pub fn calls(&self) -> Vec<AdapterCall> {
		self.recorded.lock().unwrap().clone()
	}

	pub fn sent_amounts(&self) -> Vec<U256> {
		self.calls()
			.into_iter()
			.filter_map(|call| match call {
				AdapterCall::SendTokenCrossChain { amount, .. } => Some(amount),
				_ => None,
			})
			.collect()
	}
}

#[async_trait]
impl AdapterManager for MockAdapterManager {
	async fn send_token_cross_chain(
		&self,
		_to: &Address,
		chain: ChainId,
		l1_token: &Address,
		amount: U256,
		l2_token: Option<&Address>,
	) -> Result<()> {
		if self.fail_sends_to.contains(&chain) {
			return Err(RelayerError::Bridge(format!(
				"send to chain {chain} rejected"
			)));
		}
		self.recorded
			.lock()
			.unwrap()
			.push(AdapterCall::SendTokenCrossChain {
				chain,
				l1_token: *l1_token,
				l2_token: l2_token.copied(),
				amount,
			});
		Ok(())
	}

	async fn withdraw_token_from_l2(
		&self,
		chain: ChainId,
		l2_token: &Address,
		amount: U256,
	) -> Result<()> {
		self.recorded
			.lock()
			.unwrap()
			.push(AdapterCall::WithdrawTokenFromL2 {
				chain,
				l2_token: *l2_token,
				amount,
			});
		Ok(())
	}

	async fn get_l2_pending_withdrawal_amount(
		&self,
		_period_secs: u64,
		chain: ChainId,
		l2_token: &Address,
	) -> Result<U256> {
		Ok(self
			.pending_withdrawals
			.get(&(chain, *l2_token))
			.copied()
			.unwrap_or_default())
	}

	async fn wrap_native_token_if_above_threshold(
		&self,
		chain: ChainId,
		threshold: U256,
		target: U256,
	) -> Result<()> {
		self.recorded.lock().unwrap().push(AdapterCall::WrapNativeToken {
			chain,
			threshold,
			target,
		});
		Ok(())
	}

	async fn unwrap_native_token(
		&self,
		chain: ChainId,
		wrapped_token: &Address,
		amount: U256,
	) -> Result<()> {
		self.recorded
			.lock()
			.unwrap()
			.push(AdapterCall::UnwrapNativeToken {
				chain,
				wrapped_token: *wrapped_token,
				amount,
			});
		Ok(())
	}

	async fn set_l1_token_approvals(&self, l1_tokens: &[Address]) -> Result<()> {
		self.recorded
			.lock()
			.unwrap()
			.push(AdapterCall::SetL1TokenApprovals {
				l1_tokens: l1_tokens.to_vec(),
			});
		Ok(())
	}
}
