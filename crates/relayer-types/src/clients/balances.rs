//! Token-balance client capability.

use crate::address::Address;
use crate::chains::ChainId;
use crate::common::U256;
use crate::errors::Result;
use async_trait::async_trait;

/// Read-through view of the relayer's token balances.
///
/// `get_balance` and the shortfall/reservation calls serve from the client's
/// cache and never suspend; `fetch_balance` is the authoritative on-chain
/// re-read used before spending a cached balance.
#[async_trait]
pub trait BalanceClient: Send + Sync {
	/// Cached balance of `token` held by the relayer on `chain`, in the
	/// token's own decimals.
	fn get_balance(&self, chain: ChainId, token: &Address) -> U256;

	/// Total amount of `token` the relayer has committed to fills on
	/// `chain` but does not currently hold.
	fn get_shortfall_total_requirement(&self, chain: ChainId, token: &Address) -> U256;

	/// Reserves `amount` out of the cached balance so later planning in the
	/// same pass sees it as spent.
	fn decrement_local_balance(&self, chain: ChainId, token: &Address, amount: U256);

	/// Authoritative on-chain balance read.
	async fn fetch_balance(&self, chain: ChainId, token: &Address) -> Result<U256>;
}
