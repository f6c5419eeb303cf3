//! Simulated fill-cost estimation per destination chain.

use futures::future::join_all;
use relayer_types::amount::{fixed_point, mul_frac};
use relayer_types::{
	Address, ChainId, Deposit, EthBytes, GasSimulator, RelayerError, Result, SimulatedGasCost,
	TokenRegistry, U256,
};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::{debug, warn};

/// The sentinel triple returned when simulation fails: callers read it as
/// "unprofitable, unknown cost".
fn failed_simulation() -> SimulatedGasCost {
	SimulatedGasCost {
		native_gas_cost: U256::MAX,
		token_gas_cost: U256::MAX,
		gas_price: U256::MAX,
	}
}

/// Test output token per chain for the synthetic template deposit: USDC on
/// mainnet chains, WETH on testnets, with overrides for chains lacking a
/// canonical USDC deployment.
fn template_token_symbol(chain: ChainId) -> &'static str {
	if chain.is_testnet() {
		return "WETH";
	}
	match chain {
		ChainId::ZKSYNC => "USDC.e",
		ChainId::LINEA => "WETH",
		_ => "USDC",
	}
}

/// Estimates the cost of filling deposits, one cached simulation per
/// destination chain for messageless fills.
///
/// Messages make fill execution arbitrary, so message-carrying deposits are
/// simulated per call; messageless fills are stable enough to cache.
pub struct GasCostEstimator {
	simulator: Arc<dyn GasSimulator>,
	registry: Arc<TokenRegistry>,
	relayer: Address,
	/// Recipient of the synthetic deposit. Must hold no balance of the test
	/// token and must not be the relayer (self-fills short-circuit).
	simulation_recipient: Address,
	gas_padding: U256,
	gas_multiplier: U256,
	message_gas_multiplier: U256,
	/// Raw (unscaled) per-chain cost of a messageless template fill.
	cache: RwLock<HashMap<ChainId, SimulatedGasCost>>,
}

impl GasCostEstimator {
	#[allow(clippy::too_many_arguments)]
	pub fn new(
		simulator: Arc<dyn GasSimulator>,
		registry: Arc<TokenRegistry>,
		relayer: Address,
		simulation_recipient: Address,
		gas_padding: U256,
		gas_multiplier: U256,
		message_gas_multiplier: U256,
	) -> Result<Self> {
		let one = fixed_point();
		if gas_padding < one || gas_padding > one * 3 {
			return Err(RelayerError::Config(format!(
				"gas padding {gas_padding} outside [1.0, 3.0]"
			)));
		}
		for multiplier in [gas_multiplier, message_gas_multiplier] {
			if multiplier > one * 4 {
				return Err(RelayerError::Config(format!(
					"gas multiplier {multiplier} outside [0, 4.0]"
				)));
			}
		}
		if simulation_recipient == relayer {
			return Err(RelayerError::Config(
				"simulation recipient must not be the relayer".to_string(),
			));
		}
		Ok(Self {
			simulator,
			registry,
			relayer,
			simulation_recipient,
			gas_padding,
			gas_multiplier,
			message_gas_multiplier,
			cache: RwLock::new(HashMap::new()),
		})
	}

	pub fn gas_padding(&self) -> U256 {
		self.gas_padding
	}

	pub fn gas_multiplier_for(&self, deposit: &Deposit) -> U256 {
		if deposit.has_message() {
			self.message_gas_multiplier
		} else {
			self.gas_multiplier
		}
	}

	/// Refreshes the per-chain template cost cache, simulating all chains
	/// concurrently. Failures are cached as the sentinel triple.
	pub async fn update(&self, destination_chains: &[ChainId]) {
		let simulations = destination_chains.iter().map(|chain| async {
			(*chain, self.simulate_template(*chain).await)
		});
		let results = join_all(simulations).await;

		let mut cache = self.cache.write().expect("gas cache lock poisoned");
		for (chain, cost) in results {
			cache.insert(chain, cost);
		}
		debug!(chains = destination_chains.len(), "gas cost cache updated");
	}

	/// Scaled fill cost for one deposit: cached for messageless deposits,
	/// freshly simulated when a message makes execution arbitrary.
	pub async fn total_gas_cost(&self, deposit: &Deposit) -> SimulatedGasCost {
		let raw = if deposit.has_message() {
			match self.simulator.get_gas_costs(deposit, &self.relayer).await {
				Ok(cost) => cost,
				Err(e) => {
					warn!(
						deposit_id = %deposit.deposit_id,
						chain = %deposit.destination_chain,
						error = %e,
						"message fill simulation failed"
					);
					failed_simulation()
				}
			}
		} else {
			let cached = {
				let cache = self.cache.read().expect("gas cache lock poisoned");
				cache.get(&deposit.destination_chain).copied()
			};
			match cached {
				Some(cost) => cost,
				None => {
					let cost = self.simulate_template(deposit.destination_chain).await;
					self.cache
						.write()
						.expect("gas cache lock poisoned")
						.insert(deposit.destination_chain, cost);
					cost
				}
			}
		};

		self.scale(raw, self.gas_multiplier_for(deposit))
	}

	/// Applies padding to both costs and the multiplier to the token cost
	/// only. The native cost feeds the transaction gas limit directly, so
	/// multiplying it would waste gas allowance.
	fn scale(&self, raw: SimulatedGasCost, multiplier: U256) -> SimulatedGasCost {
		if raw.native_gas_cost == U256::MAX {
			return raw;
		}
		SimulatedGasCost {
			native_gas_cost: mul_frac(raw.native_gas_cost, self.gas_padding, fixed_point()),
			token_gas_cost: mul_frac(
				mul_frac(raw.token_gas_cost, self.gas_padding, fixed_point()),
				multiplier,
				fixed_point(),
			),
			gas_price: raw.gas_price,
		}
	}

	async fn simulate_template(&self, chain: ChainId) -> SimulatedGasCost {
		let Some(deposit) = self.template_deposit(chain) else {
			warn!(chain = %chain, "no template token for chain, cannot estimate gas");
			return failed_simulation();
		};
		match self.simulator.get_gas_costs(&deposit, &self.relayer).await {
			Ok(cost) => cost,
			Err(e) => {
				warn!(chain = %chain, error = %e, "template fill simulation failed");
				failed_simulation()
			}
		}
	}

	/// A minimal synthetic deposit against the chain's test token: a known
	/// zero-balance recipient and a tiny non-zero amount.
	fn template_deposit(&self, chain: ChainId) -> Option<Deposit> {
		let symbol = template_token_symbol(chain);
		let output_token = self.registry.address_on(symbol, chain)?;
		let input_token = self.registry.l1_address(symbol)?;
		let amount = U256::from(100);

		Some(Deposit {
			deposit_id: U256::zero(),
			origin_chain: self.registry.hub_chain(),
			destination_chain: chain,
			input_token,
			input_amount: amount,
			output_token,
			output_amount: amount,
			updated_output_amount: None,
			message: EthBytes::default(),
			fill_deadline: u64::MAX,
			exclusivity_deadline: 0,
			exclusive_relayer: Address::zero(),
			from_lite_chain: false,
			to_lite_chain: false,
			depositor: self.simulation_recipient,
			recipient: self.simulation_recipient,
			quote_timestamp: 0,
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::mocks::MockGasSimulator;

	fn registry() -> Arc<TokenRegistry> {
		Arc::new(TokenRegistry::mainnet_defaults())
	}

	fn estimator(simulator: MockGasSimulator, padding: U256, multiplier: U256) -> GasCostEstimator {
		GasCostEstimator::new(
			Arc::new(simulator),
			registry(),
			Address::evm([1; 20]),
			Address::evm([2; 20]),
			padding,
			multiplier,
			multiplier,
		)
		.unwrap()
	}

	fn raw_cost() -> SimulatedGasCost {
		SimulatedGasCost {
			native_gas_cost: U256::from(100_000),
			token_gas_cost: U256::from(2_000_000u64),
			gas_price: U256::from(20_000_000_000u64),
		}
	}

	fn messageless_deposit(chain: ChainId) -> Deposit {
		Deposit {
			deposit_id: U256::one(),
			origin_chain: ChainId::ETHEREUM,
			destination_chain: chain,
			input_token: Address::evm([3; 20]),
			input_amount: U256::from(1000),
			output_token: Address::evm([4; 20]),
			output_amount: U256::from(990),
			updated_output_amount: None,
			message: EthBytes::default(),
			fill_deadline: u64::MAX,
			exclusivity_deadline: 0,
			exclusive_relayer: Address::zero(),
			from_lite_chain: false,
			to_lite_chain: false,
			depositor: Address::evm([5; 20]),
			recipient: Address::evm([6; 20]),
			quote_timestamp: 0,
		}
	}

	#[test]
	fn test_padding_and_multiplier_bounds_are_fatal() {
		let one = fixed_point();
		assert!(GasCostEstimator::new(
			Arc::new(MockGasSimulator::new()),
			registry(),
			Address::evm([1; 20]),
			Address::evm([2; 20]),
			one / 2,
			one,
			one,
		)
		.is_err());

		assert!(GasCostEstimator::new(
			Arc::new(MockGasSimulator::new()),
			registry(),
			Address::evm([1; 20]),
			Address::evm([2; 20]),
			one,
			one * 5,
			one,
		)
		.is_err());
	}

	#[tokio::test]
	async fn test_scaling_law() {
		// padding 2.0, multiplier 3.0
		let padding = fixed_point() * 2;
		let multiplier = fixed_point() * 3;
		let simulator = MockGasSimulator::new().with_cost(ChainId::OPTIMISM, raw_cost());
		let estimator = estimator(simulator, padding, multiplier);

		let cost = estimator
			.total_gas_cost(&messageless_deposit(ChainId::OPTIMISM))
			.await;

		// native = raw * padding; token = raw * padding * multiplier.
		assert_eq!(cost.native_gas_cost, U256::from(200_000));
		assert_eq!(cost.token_gas_cost, U256::from(12_000_000u64));
		assert_eq!(cost.gas_price, raw_cost().gas_price);
	}

	#[tokio::test]
	async fn test_messageless_cost_is_cached() {
		let simulator = Arc::new(MockGasSimulator::new().with_cost(ChainId::OPTIMISM, raw_cost()));
		let estimator = GasCostEstimator::new(
			simulator.clone(),
			registry(),
			Address::evm([1; 20]),
			Address::evm([2; 20]),
			fixed_point(),
			fixed_point(),
			fixed_point(),
		)
		.unwrap();
		estimator.update(&[ChainId::OPTIMISM]).await;
		assert_eq!(simulator.call_count(), 1);

		let deposit = messageless_deposit(ChainId::OPTIMISM);
		estimator.total_gas_cost(&deposit).await;
		estimator.total_gas_cost(&deposit).await;

		// One template simulation at update(), none per deposit.
		assert_eq!(simulator.call_count(), 1);
	}

	#[tokio::test]
	async fn test_simulation_failure_returns_sentinel() {
		// No cost configured for the chain: every simulation fails.
		let estimator = estimator(MockGasSimulator::new(), fixed_point(), fixed_point());
		let cost = estimator
			.total_gas_cost(&messageless_deposit(ChainId::BASE))
			.await;
		assert_eq!(cost.native_gas_cost, U256::MAX);
		assert_eq!(cost.token_gas_cost, U256::MAX);
		assert_eq!(cost.gas_price, U256::MAX);
	}

	#[tokio::test]
	async fn test_message_deposit_simulated_per_call() {
		let simulator = Arc::new(MockGasSimulator::new().with_cost(ChainId::OPTIMISM, raw_cost()));
		let estimator = GasCostEstimator::new(
			simulator.clone(),
			registry(),
			Address::evm([1; 20]),
			Address::evm([2; 20]),
			fixed_point(),
			fixed_point(),
			fixed_point() * 2,
		)
		.unwrap();

		let mut deposit = messageless_deposit(ChainId::OPTIMISM);
		deposit.message = EthBytes::from(vec![0xde, 0xad]);

		estimator.total_gas_cost(&deposit).await;
		estimator.total_gas_cost(&deposit).await;
		assert_eq!(simulator.call_count(), 2);

		// Message deposits use the message multiplier.
		let cost = estimator.total_gas_cost(&deposit).await;
		assert_eq!(cost.token_gas_cost, raw_cost().token_gas_cost * 2);
	}
}
