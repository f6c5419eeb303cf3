//! Pairs bridge initiation events on the hub chain with their finalization
//! events on a destination chain.
//!
//! The two event streams live on different chains and share nothing but an
//! opaque message hash, so the destination block range is first translated
//! into a hub-chain range through block timestamps.

use relayer_types::{
	Address, BlockNumber, BridgeEventClient, BridgeInitiation, ChainId, ChainReader,
	MatchedBridgeEvent, Result, Timestamp, TxHash,
};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::debug;

/// Correlates hub-chain initiations with destination-chain finalizations by
/// message hash within a translated time window.
pub struct FinalizationMatcher {
	reader: Arc<dyn ChainReader>,
	events: Arc<dyn BridgeEventClient>,
	hub_chain: ChainId,
}

impl FinalizationMatcher {
	pub fn new(
		reader: Arc<dyn ChainReader>,
		events: Arc<dyn BridgeEventClient>,
		hub_chain: ChainId,
	) -> Self {
		Self {
			reader,
			events,
			hub_chain,
		}
	}

	/// Matched finalizations for `recipient` within the destination block
	/// range, keyed by L2 token. Each match carries the initiation's value
	/// and the finalization's on-chain coordinates.
	///
	/// Finalizations whose initiation falls outside the translated lookback
	/// window are dropped; that is the expected consequence of a bounded
	/// search, not an error.
	pub async fn matched_finalizations(
		&self,
		destination: ChainId,
		from_block: BlockNumber,
		to_block: BlockNumber,
		recipient: &Address,
	) -> Result<HashMap<Address, Vec<MatchedBridgeEvent>>> {
		let from_timestamp = self.reader.block_timestamp(destination, from_block).await?;
		let to_timestamp = self.reader.block_timestamp(destination, to_block).await?;

		let hub_from = self
			.find_block_at_or_after(self.hub_chain, from_timestamp)
			.await?;
		let hub_to = self
			.find_block_at_or_before(self.hub_chain, to_timestamp)
			.await?;
		if hub_from > hub_to {
			return Ok(HashMap::new());
		}

		let initiations = self
			.events
			.get_initiation_events(self.hub_chain, hub_from, hub_to, recipient)
			.await?;
		if initiations.is_empty() {
			return Ok(HashMap::new());
		}

		// Zero-value initiations are administrative messages, not token
		// movements.
		let initiations: HashMap<TxHash, BridgeInitiation> = initiations
			.into_iter()
			.filter(|event| !event.amount.is_zero())
			.map(|event| (event.message_hash, event))
			.collect();
		if initiations.is_empty() {
			return Ok(HashMap::new());
		}

		let hashes: HashSet<TxHash> = initiations.keys().copied().collect();
		let finalizations = self
			.events
			.get_finalization_events(destination, from_block, to_block, &hashes)
			.await?;

		let mut matched: HashMap<Address, Vec<MatchedBridgeEvent>> = HashMap::new();
		for finalization in finalizations {
			let Some(initiation) = initiations.get(&finalization.message_hash) else {
				debug!(
					hash = %finalization.message_hash,
					"finalization without initiation in window, dropping"
				);
				continue;
			};
			matched
				.entry(initiation.l2_token)
				.or_default()
				.push(MatchedBridgeEvent {
					l2_token: initiation.l2_token,
					amount: initiation.amount,
					block_number: finalization.block_number,
					tx_hash: finalization.tx_hash,
					log_index: finalization.log_index,
				});
		}
		Ok(matched)
	}

	/// Smallest block on `chain` whose timestamp is at or after `target`.
	async fn find_block_at_or_after(
		&self,
		chain: ChainId,
		target: Timestamp,
	) -> Result<BlockNumber> {
		let mut low = 1;
		let mut high = self.reader.latest_block(chain).await?;
		while low < high {
			let mid = (low + high) / 2;
			if self.reader.block_timestamp(chain, mid).await? >= target {
				high = mid;
			} else {
				low = mid + 1;
			}
		}
		Ok(low)
	}

	/// Largest block on `chain` whose timestamp is at or before `target`.
	async fn find_block_at_or_before(
		&self,
		chain: ChainId,
		target: Timestamp,
	) -> Result<BlockNumber> {
		let mut low = 1;
		let mut high = self.reader.latest_block(chain).await?;
		while low < high {
			let mid = (low + high).div_ceil(2);
			if self.reader.block_timestamp(chain, mid).await? <= target {
				low = mid;
			} else {
				high = mid - 1;
			}
		}
		Ok(low)
	}
}
