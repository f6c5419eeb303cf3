//! Deposit and plan records shared across the engine.

use crate::address::Address;
use crate::chains::ChainId;
use crate::common::{BlockNumber, EthBytes, I256, Timestamp, TxHash, U256};
use serde::{Deserialize, Serialize};

/// A deposit observed on an origin chain, awaiting a fill on its
/// destination chain. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deposit {
	pub deposit_id: U256,
	pub origin_chain: ChainId,
	pub destination_chain: ChainId,
	pub input_token: Address,
	pub input_amount: U256,
	pub output_token: Address,
	pub output_amount: U256,
	/// Speed-up replacement for `output_amount`; used when smaller.
	pub updated_output_amount: Option<U256>,
	pub message: EthBytes,
	pub fill_deadline: Timestamp,
	pub exclusivity_deadline: Timestamp,
	pub exclusive_relayer: Address,
	/// Repayment is forced onto the origin chain.
	pub from_lite_chain: bool,
	/// Destination is a lite chain; repayment preference shifts off it.
	pub to_lite_chain: bool,
	pub depositor: Address,
	pub recipient: Address,
	pub quote_timestamp: Timestamp,
}

impl Deposit {
	/// The amount the fill must deliver: the updated output amount when a
	/// speed-up lowered it, otherwise the original.
	pub fn effective_output_amount(&self) -> U256 {
		match self.updated_output_amount {
			Some(updated) if updated < self.output_amount => updated,
			_ => self.output_amount,
		}
	}

	pub fn has_message(&self) -> bool {
		!self.message.0.is_empty()
	}
}

/// Profitability breakdown for one candidate fill. All USD quantities are
/// 18-decimal integers; fee fractions are 18-decimal fixed point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FillProfit {
	pub input_token_price_usd: U256,
	pub input_amount_usd: U256,
	pub output_token_price_usd: U256,
	pub output_amount_usd: U256,
	/// (input - output) / input; negative when the deposit pays a bonus.
	pub total_fee_pct: I256,
	pub lp_fee_usd: U256,
	pub gross_relayer_fee_usd: I256,
	/// max(0, gross / input).
	pub gross_relayer_fee_pct: U256,
	pub native_gas_cost: U256,
	pub token_gas_cost: U256,
	pub gas_price: U256,
	pub gas_padding: U256,
	pub gas_multiplier: U256,
	pub gas_cost_usd: U256,
	pub net_relayer_fee_usd: I256,
	/// net USD fee over output USD value; zero when output value is zero.
	pub net_relayer_fee_pct: I256,
	pub min_relayer_fee_pct: U256,
	pub profitable: bool,
}

/// A planned L1 -> L2 inventory transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rebalance {
	pub chain_id: ChainId,
	pub l1_token: Address,
	pub l2_token: Address,
	pub current_alloc_pct: U256,
	pub target_pct: U256,
	pub threshold_pct: U256,
	/// Effective balance on the target chain, L1 decimals.
	pub balance: U256,
	pub cumulative_balance: U256,
	/// Transfer size, L1 decimals.
	pub amount: U256,
}

/// Status of a tracked cross-chain transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransferStatus {
	Pending,
	Finalized,
}

/// A cross-chain inventory transfer as tracked by the transfer client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossChainTransfer {
	pub address: Address,
	pub l1_token: Address,
	pub l2_token: Address,
	pub chain_id: ChainId,
	pub amount: U256,
	pub status: TransferStatus,
}

/// A bridge initiation event observed on the hub chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeInitiation {
	pub message_hash: TxHash,
	pub l2_token: Address,
	pub amount: U256,
	pub block_number: BlockNumber,
	pub tx_hash: TxHash,
	pub log_index: u64,
}

/// A bridge finalization event observed on a destination chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeFinalization {
	pub message_hash: TxHash,
	pub block_number: BlockNumber,
	pub tx_hash: TxHash,
	pub log_index: u64,
}

/// An initiation joined with its finalization, reported against the
/// finalization's on-chain coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedBridgeEvent {
	pub l2_token: Address,
	pub amount: U256,
	pub block_number: BlockNumber,
	pub tx_hash: TxHash,
	pub log_index: u64,
}

#[cfg(test)]
mod tests {
	use super::*;

	fn deposit() -> Deposit {
		Deposit {
			deposit_id: U256::from(1),
			origin_chain: ChainId::ETHEREUM,
			destination_chain: ChainId::ARBITRUM,
			input_token: Address::evm([1; 20]),
			input_amount: U256::from(100),
			output_token: Address::evm([2; 20]),
			output_amount: U256::from(99),
			updated_output_amount: None,
			message: EthBytes::default(),
			fill_deadline: 1_700_000_000,
			exclusivity_deadline: 0,
			exclusive_relayer: Address::zero(),
			from_lite_chain: false,
			to_lite_chain: false,
			depositor: Address::evm([3; 20]),
			recipient: Address::evm([4; 20]),
			quote_timestamp: 1_699_999_000,
		}
	}

	#[test]
	fn test_effective_output_amount_prefers_smaller_update() {
		let mut d = deposit();
		assert_eq!(d.effective_output_amount(), U256::from(99));

		d.updated_output_amount = Some(U256::from(98));
		assert_eq!(d.effective_output_amount(), U256::from(98));

		// A larger update never raises the obligation.
		d.updated_output_amount = Some(U256::from(120));
		assert_eq!(d.effective_output_amount(), U256::from(99));
	}

	#[test]
	fn test_has_message() {
		let mut d = deposit();
		assert!(!d.has_message());
		d.message = EthBytes::from(vec![0x01, 0x02]);
		assert!(d.has_message());
	}
}
