//! Deposit decision flow and tick orchestration.

use relayer_inventory::InventoryManager;
use relayer_pricing::ProfitEngine;
use relayer_types::{ChainId, Deposit, FillProfit, Result, U256};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

/// Why a deposit was not handed to the fill path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
	/// Selector produced no safe repayment venue (or could not classify
	/// the output token).
	NoEligibleRepaymentChain,
	/// Priced below the route's minimum relayer fee, or unpriceable.
	Unprofitable,
}

/// Outcome of evaluating one deposit. Actually filling (or not) is the
/// caller's concern; the engine only decides.
#[derive(Debug, Clone)]
pub enum FillDecision {
	Fill {
		/// Allowed repayment venues, highest preference first.
		repayment_chains: Vec<ChainId>,
		profit: FillProfit,
	},
	Skip { reason: SkipReason },
}

/// Coordinates the profit engine and inventory manager through the shared
/// update tick and evaluates deposits against both.
pub struct RelayerEngine {
	profit: Arc<ProfitEngine>,
	inventory: Arc<InventoryManager>,
	enabled_chains: Vec<ChainId>,
}

impl RelayerEngine {
	pub fn new(
		profit: Arc<ProfitEngine>,
		inventory: Arc<InventoryManager>,
		enabled_chains: Vec<ChainId>,
	) -> Self {
		Self {
			profit,
			inventory,
			enabled_chains,
		}
	}

	pub fn profit(&self) -> &ProfitEngine {
		&self.profit
	}

	pub fn inventory(&self) -> &InventoryManager {
		&self.inventory
	}

	/// One-time startup work: bridge approvals for every managed token.
	pub async fn start(&self) -> Result<()> {
		info!("starting relayer engine");
		self.inventory.set_l1_token_approvals().await
	}

	/// One refresh tick: drops per-tick memoization, then refreshes token
	/// prices and gas costs together. Consumers observe either both
	/// updated or both old, never a mix from different ticks.
	pub async fn update(&self) -> Result<()> {
		self.inventory.clear_tick_state().await;
		self.profit
			.update(&self.inventory.l1_tokens(), &self.enabled_chains)
			.await
	}

	/// Walks one deposit through validation, repayment selection, and
	/// profitability, producing a fill decision.
	///
	/// Configuration bugs (inequivalent output tokens, unknown tokens in
	/// the profit path) propagate as errors; everything else lands in a
	/// decision.
	pub async fn evaluate_deposit(
		&self,
		deposit: &Deposit,
		lp_fee_pct: U256,
	) -> Result<FillDecision> {
		let repayment_chains = self.inventory.determine_refund_chains(deposit).await?;
		if repayment_chains.is_empty() {
			debug!(
				deposit_id = %deposit.deposit_id,
				origin = %deposit.origin_chain,
				"no eligible repayment chain, skipping"
			);
			return Ok(FillDecision::Skip {
				reason: SkipReason::NoEligibleRepaymentChain,
			});
		}

		let (profitable, profit) = self.profit.is_fill_profitable(deposit, lp_fee_pct).await?;
		if !profitable {
			self.profit
				.capture_unprofitable_fill(deposit.clone(), profit);
			return Ok(FillDecision::Skip {
				reason: SkipReason::Unprofitable,
			});
		}

		debug!(
			deposit_id = %deposit.deposit_id,
			repayment_chains = ?repayment_chains,
			net_fee_pct = %profit.net_relayer_fee_pct,
			"deposit accepted for fill"
		);
		Ok(FillDecision::Fill {
			repayment_chains,
			profit,
		})
	}

	/// One inventory pass: wrap, rebalance, unwrap, withdraw. Never fails;
	/// the planners log and carry their own errors.
	pub async fn run_rebalance_pass(&self) {
		self.inventory.run_rebalance_pass().await;
	}

	/// Drives the engine until shutdown: every tick refreshes the caches
	/// and runs an inventory pass. A failed refresh leaves the previous
	/// tick's data in place and the loop carries on.
	pub async fn run(&self, update_interval: Duration, mut shutdown_rx: broadcast::Receiver<()>) {
		let mut interval = tokio::time::interval(update_interval);
		loop {
			tokio::select! {
				_ = interval.tick() => {
					if let Err(e) = self.update().await {
						warn!(error = %e, "cache refresh failed, continuing with stale data");
					}
					self.run_rebalance_pass().await;
				}
				_ = shutdown_rx.recv() => {
					info!("relayer engine received shutdown signal");
					break;
				}
			}
		}
	}
}
