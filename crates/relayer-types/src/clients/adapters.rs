//! Adapter-manager capability: the only path through which the engine
//! causes on-chain effects.

use crate::address::Address;
use crate::chains::ChainId;
use crate::common::U256;
use crate::errors::Result;
use async_trait::async_trait;

/// Per-chain bridge adapters behind one dispatching facade.
#[async_trait]
pub trait AdapterManager: Send + Sync {
	/// Bridges `amount` of `l1_token` (L1 decimals) from the hub chain to
	/// `chain`, optionally into a specific L2 deployment. Resolves once the
	/// submission is confirmed.
	async fn send_token_cross_chain(
		&self,
		to: &Address,
		chain: ChainId,
		l1_token: &Address,
		amount: U256,
		l2_token: Option<&Address>,
	) -> Result<()>;

	/// Withdraws `amount` of `l2_token` (L2 decimals) from `chain` back to
	/// the hub chain.
	async fn withdraw_token_from_l2(
		&self,
		chain: ChainId,
		l2_token: &Address,
		amount: U256,
	) -> Result<()>;

	/// Volume of withdrawals of `l2_token` from `chain` submitted within
	/// the trailing `period_secs` window.
	async fn get_l2_pending_withdrawal_amount(
		&self,
		period_secs: u64,
		chain: ChainId,
		l2_token: &Address,
	) -> Result<U256>;

	/// Wraps surplus native token on `chain` above `threshold`, down to
	/// `target`.
	async fn wrap_native_token_if_above_threshold(
		&self,
		chain: ChainId,
		threshold: U256,
		target: U256,
	) -> Result<()>;

	/// Unwraps `amount` of the wrapped gas token into native on `chain`.
	async fn unwrap_native_token(
		&self,
		chain: ChainId,
		wrapped_token: &Address,
		amount: U256,
	) -> Result<()>;

	/// Ensures the bridge contracts are approved to move the given L1
	/// tokens on behalf of the relayer.
	async fn set_l1_token_approvals(&self, l1_tokens: &[Address]) -> Result<()>;
}
