//! USD price cache keyed by hub-chain token address.

use relayer_types::{
	Address, PriceFeed, RelayerError, Result, TokenRegistry, U256,
};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};
use tracing::{debug, warn};

/// Cached 18-decimal USD prices for the tokens the relayer touches.
///
/// Reads are synchronous and never suspend; the map is only written by
/// `update`, which collects feed results before taking the lock.
pub struct PriceCache {
	feed: Arc<dyn PriceFeed>,
	registry: Arc<TokenRegistry>,
	prices: RwLock<HashMap<Address, U256>>,
	testnet: bool,
}

impl PriceCache {
	pub fn new(feed: Arc<dyn PriceFeed>, registry: Arc<TokenRegistry>, testnet: bool) -> Self {
		Self {
			feed,
			registry,
			prices: RwLock::new(HashMap::new()),
			testnet,
		}
	}

	/// USD price of a token by display symbol; equivalence remapping is the
	/// fallback lookup. Unknown tokens price at zero.
	pub fn get_price_for_symbol(&self, symbol: &str) -> U256 {
		match self.registry.l1_address(symbol) {
			Some(address) => self.get_price_for_address(&address),
			None => {
				warn!(symbol, "no hub-chain address for symbol, pricing at zero");
				U256::zero()
			}
		}
	}

	/// USD price of a token by hub-chain address. Unknown addresses price
	/// at zero.
	pub fn get_price_for_address(&self, address: &Address) -> U256 {
		let prices = self.prices.read().expect("price lock poisoned");
		match prices.get(address) {
			Some(price) => *price,
			None => {
				warn!(token = %address, "no cached price for token, pricing at zero");
				U256::zero()
			}
		}
	}

	/// Refreshes prices for the union of the given L1 tokens and the hub
	/// addresses of the given native gas symbols, in one batched feed call.
	///
	/// Best-effort: a feed failure keeps every previously cached price and
	/// surfaces the error so the tick can decide what to do with stale data.
	pub async fn update(&self, l1_tokens: &[Address], native_symbols: &[String]) -> Result<()> {
		let mut addresses: HashSet<Address> = l1_tokens.iter().copied().collect();
		for symbol in native_symbols {
			match self.registry.l1_address(symbol) {
				Some(address) => {
					addresses.insert(address);
				}
				None if self.testnet => {
					// Testnet deployments often lack their own feed entry;
					// the wrapped mainnet gas token is the stand-in.
					if let Some(address) = self.registry.l1_address("WETH") {
						addresses.insert(address);
					}
				}
				None => {
					warn!(symbol, "native gas symbol has no hub-chain address");
				}
			}
		}

		let addresses: Vec<Address> = addresses.into_iter().collect();
		match self.feed.get_prices_by_address(&addresses, "usd").await {
			Ok(fetched) => {
				for address in &addresses {
					if !fetched.contains_key(address) {
						warn!(token = %address, "price feed returned no price");
					}
				}
				let count = fetched.len();
				self.prices
					.write()
					.expect("price lock poisoned")
					.extend(fetched);
				debug!(tokens = count, "token prices updated");
				Ok(())
			}
			Err(e) => {
				let stale: Vec<String> = {
					let prices = self.prices.read().expect("price lock poisoned");
					addresses
						.iter()
						.map(|a| format!("{}={}", a, prices.get(a).copied().unwrap_or_default()))
						.collect()
				};
				warn!(error = %e, ?stale, "price update failed, continuing with stale prices");
				Err(RelayerError::PriceFeed(e.to_string()))
			}
		}
	}
}
