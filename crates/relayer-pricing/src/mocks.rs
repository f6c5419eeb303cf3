//! Mock collaborators for pricing tests.

use async_trait::async_trait;
use relayer_types::{
	Address, ChainId, Deposit, GasSimulator, PriceFeed, RelayerError, Result, SimulatedGasCost,
	U256,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Price feed backed by a fixed map, optionally failing every call.
#[derive(Default)]
pub struct MockPriceFeed {
	prices: HashMap<Address, U256>,
	fail: bool,
}

impl MockPriceFeed {
	pub fn failing() -> Self {
		Self {
			fail: true,
			..Default::default()
		}
	}

	pub fn with_price(mut self, address: Address, price: U256) -> Self {
		self.prices.insert(address, price);
		self
	}
}

#[async_trait]
impl PriceFeed for MockPriceFeed {
	async fn get_prices_by_address(
		&self,
		addresses: &[Address],
		_currency: &str,
	) -> Result<HashMap<Address, U256>> {
		if self.fail {
			return Err(RelayerError::PriceFeed("feed unavailable".to_string()));
		}
		Ok(addresses
			.iter()
			.filter_map(|a| self.prices.get(a).map(|p| (*a, *p)))
			.collect())
	}
}

/// Gas simulator returning a fixed cost per destination chain, counting
/// calls so tests can assert cache behavior.
pub struct MockGasSimulator {
	costs: HashMap<ChainId, SimulatedGasCost>,
	calls: AtomicUsize,
}

impl MockGasSimulator {
	pub fn new() -> Self {
		Self {
			costs: HashMap::new(),
			calls: AtomicUsize::new(0),
		}
	}

	pub fn with_cost(mut self, chain: ChainId, cost: SimulatedGasCost) -> Self {
		self.costs.insert(chain, cost);
		self
	}

	pub fn call_count(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}
}

impl Default for MockGasSimulator {
	fn default() -> Self {
		Self::new()
	}
}

#[async_trait]
impl GasSimulator for MockGasSimulator {
	async fn get_gas_costs(
		&self,
		deposit: &Deposit,
		_relayer: &Address,
	) -> Result<SimulatedGasCost> {
		self.calls.fetch_add(1, Ordering::SeqCst);
		self.costs
			.get(&deposit.destination_chain)
			.copied()
			.ok_or_else(|| {
				RelayerError::Simulation(format!(
					"no simulation target on chain {}",
					deposit.destination_chain
				))
			})
	}
}
