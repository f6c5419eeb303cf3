//! Chain-read capabilities for block metadata and bridge events.

use crate::address::Address;
use crate::chains::ChainId;
use crate::common::{BlockNumber, Timestamp, TxHash};
use crate::deposit::{BridgeFinalization, BridgeInitiation};
use crate::errors::Result;
use async_trait::async_trait;
use std::collections::HashSet;

/// Read-only block metadata access across chains.
#[async_trait]
pub trait ChainReader: Send + Sync {
	async fn latest_block(&self, chain: ChainId) -> Result<BlockNumber>;

	async fn block_timestamp(&self, chain: ChainId, block: BlockNumber) -> Result<Timestamp>;
}

/// Bridge event queries used by the finalization matcher.
#[async_trait]
pub trait BridgeEventClient: Send + Sync {
	/// Initiation events on `chain` within `[from_block, to_block]` whose
	/// recipient is `recipient`.
	async fn get_initiation_events(
		&self,
		chain: ChainId,
		from_block: BlockNumber,
		to_block: BlockNumber,
		recipient: &Address,
	) -> Result<Vec<BridgeInitiation>>;

	/// Finalization events on `chain` within `[from_block, to_block]`
	/// restricted to the given message hashes.
	async fn get_finalization_events(
		&self,
		chain: ChainId,
		from_block: BlockNumber,
		to_block: BlockNumber,
		message_hashes: &HashSet<TxHash>,
	) -> Result<Vec<BridgeFinalization>>;
}
