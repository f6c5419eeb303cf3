//! The inventory manager: the one coordinator holding strong references to
//! the accountant, selector, and planner. Everything else sees read-only
//! capabilities.

use crate::balances::BalanceAccountant;
use crate::rebalance::RebalancePlanner;
use crate::repayment::RepaymentSelector;
use relayer_config::InventoryConfig;
use relayer_types::{
	Address, AdapterManager, BalanceClient, BundleDataClient, ChainId, ConfigStoreClient,
	CrossChainTransferClient, Deposit, HubPoolClient, Result, TokenRegistry, U256,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

/// External collaborators the manager wires together.
pub struct InventoryClients {
	pub balances: Arc<dyn BalanceClient>,
	pub transfers: Arc<dyn CrossChainTransferClient>,
	pub hub: Arc<dyn HubPoolClient>,
	pub bundles: Arc<dyn BundleDataClient>,
	pub config_store: Arc<dyn ConfigStoreClient>,
	pub adapters: Arc<dyn AdapterManager>,
}

/// Facade over balance accounting, repayment selection, and rebalance
/// planning.
pub struct InventoryManager {
	accountant: Arc<BalanceAccountant>,
	selector: RepaymentSelector,
	planner: RebalancePlanner,
	adapters: Arc<dyn AdapterManager>,
}

impl InventoryManager {
	pub fn new(
		relayer: Address,
		enabled_chains: Vec<ChainId>,
		registry: Arc<TokenRegistry>,
		config: InventoryConfig,
		clients: InventoryClients,
	) -> Self {
		let accountant = Arc::new(BalanceAccountant::new(
			relayer,
			enabled_chains.clone(),
			clients.balances.clone(),
			clients.transfers.clone(),
			clients.hub.clone(),
			registry.clone(),
			config.clone(),
		));
		let selector = RepaymentSelector::new(
			relayer,
			accountant.clone(),
			clients.hub.clone(),
			clients.bundles.clone(),
			clients.config_store.clone(),
			registry.clone(),
			config.clone(),
			enabled_chains,
		);
		let planner = RebalancePlanner::new(
			relayer,
			accountant.clone(),
			clients.balances.clone(),
			clients.transfers.clone(),
			clients.adapters.clone(),
			clients.hub.clone(),
			registry,
			config,
		);
		Self {
			accountant,
			selector,
			planner,
			adapters: clients.adapters,
		}
	}

	pub fn accountant(&self) -> &BalanceAccountant {
		&self.accountant
	}

	pub fn l1_tokens(&self) -> Vec<Address> {
		self.accountant.l1_tokens()
	}

	/// Ordered repayment venues for one deposit; empty means do not fill.
	pub async fn determine_refund_chains(&self, deposit: &Deposit) -> Result<Vec<ChainId>> {
		self.selector.determine_refund_chains(deposit).await
	}

	pub fn get_possible_repayment_chain_ids(&self, deposit: &Deposit) -> Vec<ChainId> {
		self.selector.get_possible_repayment_chain_ids(deposit)
	}

	/// Allocation snapshot: l1 token -> chain -> l2 token -> fraction.
	pub fn get_token_distribution_per_l1_token(
		&self,
	) -> Result<HashMap<Address, HashMap<ChainId, HashMap<Address, U256>>>> {
		self.accountant.token_distribution_per_l1_token()
	}

	/// One full inventory pass: wrap, rebalance, unwrap, withdraw. Each
	/// stage tolerates failures and carries on; plan submissions inside
	/// each stage remain sequential.
	pub async fn run_rebalance_pass(&self) {
		self.planner.wrap_native_tokens_if_necessary().await;
		self.planner.rebalance_inventory_if_necessary().await;
		self.planner.unwrap_weth_if_necessary().await;
		self.planner.withdraw_excess_balances().await;
	}

	/// Ensures the bridge adapters can move the managed tokens.
	pub async fn set_l1_token_approvals(&self) -> Result<()> {
		let tokens = self.l1_tokens();
		info!(tokens = tokens.len(), "setting L1 token approvals");
		self.adapters.set_l1_token_approvals(&tokens).await
	}

	/// Drops per-tick memoized projections; called once per update cycle.
	pub async fn clear_tick_state(&self) {
		self.selector.clear_tick_state().await;
	}
}
