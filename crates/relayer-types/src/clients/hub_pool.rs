//! Hub-pool and config-store client capabilities.

use crate::address::Address;
use crate::chains::ChainId;
use crate::common::{BlockNumber, I256, U256};
use crate::errors::Result;
use crate::tokens::TokenInfo;
use async_trait::async_trait;

/// An executed root bundle, as far as the engine cares about it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutedRootBundle {
	/// Last block on the spoke chain covered by the bundle.
	pub end_block: BlockNumber,
}

/// View of the protocol hub: token routing, equivalence, and validated
/// running balances.
#[async_trait]
pub trait HubPoolClient: Send + Sync {
	fn hub_chain(&self) -> ChainId;

	/// Token metadata for `token` as deployed on `chain`.
	fn get_token_info_for_address(&self, token: &Address, chain: ChainId) -> Option<TokenInfo>;

	/// Whether `l2_token` on `chain` has a pool rebalance route.
	fn l2_token_has_pool_rebalance_route(&self, l2_token: &Address, chain: ChainId) -> bool;

	/// Whether `l1_token` is enabled for bridging to `chain`.
	fn l2_token_enabled_for_l1_token(&self, l1_token: &Address, chain: ChainId) -> bool;

	/// Cross-chain equivalence between two token deployments.
	fn are_tokens_equivalent(
		&self,
		token_a: &Address,
		chain_a: ChainId,
		token_b: &Address,
		chain_b: ChainId,
	) -> bool;

	/// All L1 tokens the hub knows about.
	fn l1_tokens(&self) -> Vec<Address>;

	/// Latest executed root bundle whose leaves touch `l1_token` on `chain`.
	fn get_latest_executed_root_bundle_containing_l1_token(
		&self,
		l1_token: &Address,
		chain: ChainId,
	) -> Option<ExecutedRootBundle>;

	/// Validated running balance of `l1_token` on `chain` as of `block`.
	/// Negative means the hub owes the spoke.
	async fn get_running_balance_before_block_for_chain(
		&self,
		l1_token: &Address,
		chain: ChainId,
		block: BlockNumber,
	) -> Result<I256>;
}

/// Protocol-configured spoke targets for a token on a chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SpokeTargetBalances {
	pub target: U256,
	pub threshold: U256,
}

/// View of the protocol config store.
pub trait ConfigStoreClient: Send + Sync {
	fn get_spoke_target_balances(&self, l1_token: &Address, chain: ChainId) -> SpokeTargetBalances;
}
