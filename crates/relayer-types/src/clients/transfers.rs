//! Cross-chain transfer client capability.

use crate::address::Address;
use crate::chains::ChainId;
use crate::common::U256;

/// Tracks the relayer's in-flight inbound bridge transfers.
pub trait CrossChainTransferClient: Send + Sync {
	/// Aggregate pending inbound amount for (`relayer`, `l1_token`) on
	/// `chain`, optionally narrowed to one L2 deployment. L1 decimals.
	fn get_outstanding_cross_chain_transfer_amount(
		&self,
		relayer: &Address,
		chain: ChainId,
		l1_token: &Address,
		l2_token: Option<&Address>,
	) -> U256;

	/// Mirrors a transfer the engine just submitted so balance accounting
	/// sees it before the next on-chain refresh.
	fn increase_outstanding_transfer(
		&self,
		relayer: &Address,
		l1_token: &Address,
		l2_token: &Address,
		amount: U256,
		chain: ChainId,
	);
}
