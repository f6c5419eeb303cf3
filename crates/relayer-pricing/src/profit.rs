//! Per-deposit profitability in USD.

use crate::gas::GasCostEstimator;
use crate::prices::PriceCache;
use relayer_types::amount::{convert_decimals, fixed_point, mul_frac};
use relayer_types::{
	Address, ChainId, Deposit, FillProfit, I256, RelayerError, Result, TokenRegistry, U256,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use tracing::{debug, warn};

/// A deposit the engine declined to fill, kept for reporting.
#[derive(Debug, Clone)]
pub struct UnprofitableFill {
	pub deposit: Deposit,
	pub profit: FillProfit,
}

/// `a * numer / denom` where `a` carries a sign.
fn mul_frac_signed(a: I256, numer: U256, denom: U256) -> I256 {
	let (sign, abs) = a.into_sign_and_abs();
	let scaled = mul_frac(abs, numer, denom);
	I256::checked_from_sign_and_abs(sign, scaled).unwrap_or(I256::MAX)
}

/// Computes `FillProfit` records and decides profitability against the
/// per-route minimum relayer fee.
pub struct ProfitEngine {
	prices: PriceCache,
	gas: GasCostEstimator,
	registry: Arc<TokenRegistry>,
	default_min_relayer_fee_pct: U256,
	min_fee_cache: RwLock<HashMap<(String, ChainId, ChainId), U256>>,
	unprofitable: Mutex<HashMap<ChainId, Vec<UnprofitableFill>>>,
	testnet: bool,
}

impl ProfitEngine {
	pub fn new(
		prices: PriceCache,
		gas: GasCostEstimator,
		registry: Arc<TokenRegistry>,
		default_min_relayer_fee_pct: U256,
		testnet: bool,
	) -> Self {
		Self {
			prices,
			gas,
			registry,
			default_min_relayer_fee_pct,
			min_fee_cache: RwLock::new(HashMap::new()),
			unprofitable: Mutex::new(HashMap::new()),
			testnet,
		}
	}

	pub fn price_cache(&self) -> &PriceCache {
		&self.prices
	}

	pub fn gas_estimator(&self) -> &GasCostEstimator {
		&self.gas
	}

	/// Refreshes token prices and per-chain gas costs concurrently and
	/// awaits both, so consumers never observe one updated without the
	/// other. A price-feed failure is surfaced after both finish.
	pub async fn update(&self, l1_tokens: &[Address], destination_chains: &[ChainId]) -> Result<()> {
		let native_symbols: Vec<String> = destination_chains
			.iter()
			.map(|chain| self.registry.native_gas_symbol(*chain).to_string())
			.collect();

		let (price_result, ()) = tokio::join!(
			self.prices.update(l1_tokens, &native_symbols),
			self.gas.update(destination_chains),
		);
		price_result
	}

	/// Minimum relayer fee fraction for a route, consulting environment
	/// overrides `MIN_RELAYER_FEE_PCT_<SYMBOL>_<src>_<dst>` then
	/// `MIN_RELAYER_FEE_PCT_<SYMBOL>` before the configured default.
	pub fn min_relayer_fee_pct(
		&self,
		symbol: &str,
		origin: ChainId,
		destination: ChainId,
	) -> U256 {
		let key = (symbol.to_uppercase(), origin, destination);
		if let Some(cached) = self
			.min_fee_cache
			.read()
			.expect("min fee lock poisoned")
			.get(&key)
		{
			return *cached;
		}

		let route_var = format!("MIN_RELAYER_FEE_PCT_{}_{}_{}", key.0, origin, destination);
		let token_var = format!("MIN_RELAYER_FEE_PCT_{}", key.0);
		let min_fee = std::env::var(&route_var)
			.ok()
			.or_else(|| std::env::var(&token_var).ok())
			.and_then(|raw| relayer_types::amount::parse_fp(&raw))
			.unwrap_or(self.default_min_relayer_fee_pct);

		self.min_fee_cache
			.write()
			.expect("min fee lock poisoned")
			.insert(key, min_fee);
		min_fee
	}

	/// Full profitability breakdown for one deposit given the externally
	/// computed LP fee fraction. Pure over the current caches: repeated
	/// calls with unchanged caches yield identical results.
	pub async fn calculate_fill_profit(
		&self,
		deposit: &Deposit,
		lp_fee_pct: U256,
	) -> Result<FillProfit> {
		let input_info = self
			.registry
			.info_for_address(&deposit.input_token, deposit.origin_chain)
			.ok_or_else(|| {
				RelayerError::Config(format!(
					"unknown input token {} on chain {}",
					deposit.input_token, deposit.origin_chain
				))
			})?;
		let output_info = self
			.registry
			.info_for_address(&deposit.output_token, deposit.destination_chain)
			.ok_or_else(|| {
				RelayerError::Config(format!(
					"unknown output token {} on chain {}",
					deposit.output_token, deposit.destination_chain
				))
			})?;

		let input_price = self.prices.get_price_for_symbol(&input_info.symbol);
		let output_price = self.prices.get_price_for_symbol(&output_info.symbol);

		let fp = fixed_point();
		let input_scaled = convert_decimals(input_info.decimals, 18, deposit.input_amount);
		let input_usd = mul_frac(input_scaled, input_price, fp);

		let output_scaled =
			convert_decimals(output_info.decimals, 18, deposit.effective_output_amount());
		let output_usd = mul_frac(output_scaled, output_price, fp);

		let spread_usd = I256::from_raw(input_usd) - I256::from_raw(output_usd);
		let total_fee_pct = if input_usd.is_zero() {
			I256::zero()
		} else {
			mul_frac_signed(spread_usd, fp, input_usd)
		};

		let lp_fee_usd = mul_frac(mul_frac(input_scaled, lp_fee_pct, fp), input_price, fp);
		let gross_relayer_fee_usd = spread_usd - I256::from_raw(lp_fee_usd);
		let gross_relayer_fee_pct = if gross_relayer_fee_usd.is_negative() || input_usd.is_zero() {
			U256::zero()
		} else {
			mul_frac(gross_relayer_fee_usd.into_raw(), fp, input_usd)
		};

		let gas = self.gas.total_gas_cost(deposit).await;
		let min_relayer_fee_pct = self.min_relayer_fee_pct(
			&input_info.symbol,
			deposit.origin_chain,
			deposit.destination_chain,
		);

		if gas.native_gas_cost == U256::MAX {
			// Simulation failed: cost is unknown, so the fill cannot be
			// judged profitable.
			return Ok(FillProfit {
				input_token_price_usd: input_price,
				input_amount_usd: input_usd,
				output_token_price_usd: output_price,
				output_amount_usd: output_usd,
				total_fee_pct,
				lp_fee_usd,
				gross_relayer_fee_usd,
				gross_relayer_fee_pct,
				native_gas_cost: gas.native_gas_cost,
				token_gas_cost: gas.token_gas_cost,
				gas_price: gas.gas_price,
				gas_padding: self.gas.gas_padding(),
				gas_multiplier: self.gas.gas_multiplier_for(deposit),
				gas_cost_usd: U256::MAX,
				net_relayer_fee_usd: I256::MIN,
				net_relayer_fee_pct: I256::MIN,
				min_relayer_fee_pct,
				profitable: false,
			});
		}

		let gas_symbol = self.registry.native_gas_symbol(deposit.destination_chain);
		let gas_token_price = self.prices.get_price_for_symbol(gas_symbol);
		let gas_token_decimals = self.registry.native_gas_decimals(deposit.destination_chain);
		let gas_cost_usd = mul_frac(
			gas.token_gas_cost,
			gas_token_price,
			U256::exp10(gas_token_decimals as usize),
		);

		let net_relayer_fee_usd = gross_relayer_fee_usd - I256::from_raw(gas_cost_usd);
		let net_relayer_fee_pct = if output_usd.is_zero() {
			I256::zero()
		} else {
			mul_frac_signed(net_relayer_fee_usd, fp, output_usd)
		};

		let priced = !input_price.is_zero() && !output_price.is_zero();
		let profitable = priced
			&& !output_usd.is_zero()
			&& net_relayer_fee_pct >= I256::from_raw(min_relayer_fee_pct);

		Ok(FillProfit {
			input_token_price_usd: input_price,
			input_amount_usd: input_usd,
			output_token_price_usd: output_price,
			output_amount_usd: output_usd,
			total_fee_pct,
			lp_fee_usd,
			gross_relayer_fee_usd,
			gross_relayer_fee_pct,
			native_gas_cost: gas.native_gas_cost,
			token_gas_cost: gas.token_gas_cost,
			gas_price: gas.gas_price,
			gas_padding: self.gas.gas_padding(),
			gas_multiplier: self.gas.gas_multiplier_for(deposit),
			gas_cost_usd,
			net_relayer_fee_usd,
			net_relayer_fee_pct,
			min_relayer_fee_pct,
			profitable,
		})
	}

	/// Profitability decision for one deposit. On testnets the computed
	/// margin is ignored (prices there are unreliable) and any deposit
	/// whose simulation succeeded is accepted.
	pub async fn is_fill_profitable(
		&self,
		deposit: &Deposit,
		lp_fee_pct: U256,
	) -> Result<(bool, FillProfit)> {
		let profit = self.calculate_fill_profit(deposit, lp_fee_pct).await?;
		let decision = if self.testnet {
			profit.native_gas_cost < U256::MAX
		} else {
			profit.profitable
		};
		debug!(
			deposit_id = %deposit.deposit_id,
			origin = %deposit.origin_chain,
			destination = %deposit.destination_chain,
			net_fee_pct = %profit.net_relayer_fee_pct,
			min_fee_pct = %profit.min_relayer_fee_pct,
			profitable = decision,
			"fill profitability computed"
		);
		Ok((decision, profit))
	}

	/// Records an unprofitable deposit for later reporting.
	pub fn capture_unprofitable_fill(&self, deposit: Deposit, profit: FillProfit) {
		warn!(
			deposit_id = %deposit.deposit_id,
			origin = %deposit.origin_chain,
			net_fee_usd = %profit.net_relayer_fee_usd,
			"capturing unprofitable fill"
		);
		self.unprofitable
			.lock()
			.expect("unprofitable lock poisoned")
			.entry(deposit.origin_chain)
			.or_default()
			.push(UnprofitableFill { deposit, profit });
	}

	/// Drains the captured unprofitable deposits, keyed by origin chain.
	pub fn take_unprofitable_fills(&self) -> HashMap<ChainId, Vec<UnprofitableFill>> {
		std::mem::take(&mut self.unprofitable.lock().expect("unprofitable lock poisoned"))
	}
}
