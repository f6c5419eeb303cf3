//! Price-feed and gas-simulation capabilities.

use crate::address::Address;
use crate::common::U256;
use crate::deposit::Deposit;
use crate::errors::Result;
use async_trait::async_trait;
use std::collections::HashMap;

/// Aggregated USD price source. Implementations consult their configured
/// sources in order and return the first defined price per address.
#[async_trait]
pub trait PriceFeed: Send + Sync {
	/// Batched USD prices, 18-decimal integers, keyed by hub-chain address.
	/// Addresses the aggregator cannot price are absent from the result.
	async fn get_prices_by_address(
		&self,
		addresses: &[Address],
		currency: &str,
	) -> Result<HashMap<Address, U256>>;
}

/// Raw (unscaled) cost of filling a deposit on its destination chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulatedGasCost {
	/// Gas units consumed by the fill.
	pub native_gas_cost: U256,
	/// Cost in the destination gas token's smallest unit.
	pub token_gas_cost: U256,
	/// Wei-unit gas price used by the simulation.
	pub gas_price: U256,
}

/// Per-chain fill simulator.
#[async_trait]
pub trait GasSimulator: Send + Sync {
	/// Simulates `relayer` filling `deposit` on the destination chain.
	async fn get_gas_costs(&self, deposit: &Deposit, relayer: &Address)
		-> Result<SimulatedGasCost>;
}
