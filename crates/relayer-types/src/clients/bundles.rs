//! Bundle-data client capability: projections of future refund flows.

use crate::address::Address;
use crate::chains::ChainId;
use crate::common::{BlockNumber, U256};
use crate::errors::Result;
use async_trait::async_trait;
use std::collections::HashMap;

/// Refunds owed per chain, per L2 token, per refund recipient.
pub type BundleRefunds = HashMap<ChainId, HashMap<Address, HashMap<Address, U256>>>;

/// Projections over pending and upcoming root bundles.
#[async_trait]
pub trait BundleDataClient: Send + Sync {
	/// Refunds from bundles that are validated but not yet executed.
	async fn get_pending_refunds_from_valid_bundles(&self) -> Result<Vec<BundleRefunds>>;

	/// Refunds the next (not yet proposed) bundle would pay out.
	async fn get_next_bundle_refunds(&self) -> Result<BundleRefunds>;

	/// Total refund owed to `relayer` for `l2_token` on `chain` across the
	/// given bundle projections.
	fn get_total_refund(
		&self,
		refunds: &[BundleRefunds],
		relayer: &Address,
		chain: ChainId,
		l2_token: &Address,
	) -> U256 {
		refunds
			.iter()
			.filter_map(|bundle| bundle.get(&chain)?.get(l2_token)?.get(relayer))
			.fold(U256::zero(), |acc, amount| acc.saturating_add(*amount))
	}

	/// Sum of deposits of `l2_token` on `chain` after `from_block`.
	async fn get_upcoming_deposit_amount(
		&self,
		chain: ChainId,
		l2_token: &Address,
		from_block: BlockNumber,
	) -> Result<U256>;
}
