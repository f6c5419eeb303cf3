//! Token registry: symbol metadata, per-chain addresses, and equivalence
//! remapping between display symbols and their canonical variants.

use crate::address::Address;
use crate::chains::ChainId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::warn;

/// Metadata for one token as seen on one chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenInfo {
	pub symbol: String,
	pub decimals: u8,
	pub address: Address,
}

/// One symbol's entry in the registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenEntry {
	pub decimals: u8,
	/// Deployed addresses keyed by chain. A chain may carry more than one
	/// equivalent deployment (native plus bridged variants).
	pub addresses: HashMap<ChainId, Vec<Address>>,
}

/// Symbol- and address-indexed view of the tokens the relayer understands.
#[derive(Debug, Clone, Default)]
pub struct TokenRegistry {
	symbols: HashMap<String, TokenEntry>,
	/// Display symbol -> canonical symbol (e.g. the native gas symbol maps
	/// to its wrapped variant, bridged USDC variants map to USDC).
	equivalence_remapping: HashMap<String, String>,
	/// Native gas token symbol per chain; chains absent here use ETH.
	native_gas_symbols: HashMap<ChainId, String>,
	hub_chain: ChainId,
}

impl TokenRegistry {
	pub fn new(hub_chain: ChainId) -> Self {
		Self {
			hub_chain,
			..Default::default()
		}
	}

	pub fn hub_chain(&self) -> ChainId {
		self.hub_chain
	}

	pub fn insert(&mut self, symbol: &str, entry: TokenEntry) {
		self.symbols.insert(symbol.to_string(), entry);
	}

	pub fn remap(&mut self, display: &str, canonical: &str) {
		self.equivalence_remapping
			.insert(display.to_string(), canonical.to_string());
	}

	pub fn set_native_gas_symbol(&mut self, chain: ChainId, symbol: &str) {
		self.native_gas_symbols.insert(chain, symbol.to_string());
	}

	/// Resolves a display symbol to its registry entry, following the
	/// equivalence remapping as a fallback lookup.
	pub fn resolve(&self, symbol: &str) -> Option<(&str, &TokenEntry)> {
		if let Some((key, entry)) = self.symbols.get_key_value(symbol) {
			return Some((key.as_str(), entry));
		}
		let canonical = self.equivalence_remapping.get(symbol)?;
		self.symbols
			.get_key_value(canonical)
			.map(|(key, entry)| (key.as_str(), entry))
	}

	pub fn decimals(&self, symbol: &str) -> Option<u8> {
		self.resolve(symbol).map(|(_, e)| e.decimals)
	}

	/// First deployed address of `symbol` on `chain`.
	pub fn address_on(&self, symbol: &str, chain: ChainId) -> Option<Address> {
		let (_, entry) = self.resolve(symbol)?;
		entry.addresses.get(&chain).and_then(|v| v.first()).copied()
	}

	/// Hub-chain address of `symbol`: the token's canonical identity.
	pub fn l1_address(&self, symbol: &str) -> Option<Address> {
		self.address_on(symbol, self.hub_chain)
	}

	/// Symbol owning the given hub-chain address.
	pub fn symbol_for_l1_address(&self, l1_token: &Address) -> Option<&str> {
		self.symbols.iter().find_map(|(symbol, entry)| {
			entry
				.addresses
				.get(&self.hub_chain)
				.is_some_and(|addrs| addrs.contains(l1_token))
				.then_some(symbol.as_str())
		})
	}

	/// All spoke-chain deployments equivalent to the given L1 token.
	/// Empty when the (token, chain) pair has no mapping.
	pub fn l2_tokens_for(&self, l1_token: &Address, chain: ChainId) -> Vec<Address> {
		let Some(symbol) = self.symbol_for_l1_address(l1_token) else {
			warn!(l1_token = %l1_token, "unknown L1 token in registry lookup");
			return Vec::new();
		};
		self.symbols
			.get(symbol)
			.and_then(|entry| entry.addresses.get(&chain))
			.cloned()
			.unwrap_or_default()
	}

	/// Token info for an address on a chain, searching all symbols.
	pub fn info_for_address(&self, token: &Address, chain: ChainId) -> Option<TokenInfo> {
		self.symbols.iter().find_map(|(symbol, entry)| {
			entry
				.addresses
				.get(&chain)
				.is_some_and(|addrs| addrs.contains(token))
				.then(|| TokenInfo {
					symbol: symbol.clone(),
					decimals: entry.decimals,
					address: *token,
				})
		})
	}

	/// The symbol of the chain's native gas token (ETH unless overridden).
	pub fn native_gas_symbol(&self, chain: ChainId) -> &str {
		self.native_gas_symbols
			.get(&chain)
			.map(String::as_str)
			.unwrap_or("ETH")
	}

	/// Decimals of the chain's gas token; gas tokens without a registry
	/// entry (after remapping) default to 18.
	pub fn native_gas_decimals(&self, chain: ChainId) -> u8 {
		self.decimals(self.native_gas_symbol(chain)).unwrap_or(18)
	}

	/// Seeds the registry with the common mainnet tokens and remappings.
	pub fn mainnet_defaults() -> Self {
		fn addr(s: &str) -> Address {
			s.parse().expect("static address")
		}

		let mut registry = Self::new(ChainId::ETHEREUM);

		let mut weth = TokenEntry {
			decimals: 18,
			addresses: HashMap::new(),
		};
		weth.addresses.insert(
			ChainId::ETHEREUM,
			vec![addr("0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2")],
		);
		weth.addresses.insert(
			ChainId::OPTIMISM,
			vec![addr("0x4200000000000000000000000000000000000006")],
		);
		weth.addresses.insert(
			ChainId::BASE,
			vec![addr("0x4200000000000000000000000000000000000006")],
		);
		weth.addresses.insert(
			ChainId::ARBITRUM,
			vec![addr("0x82af49447d8a07e3bd95bd0d56f35241523fbab1")],
		);
		weth.addresses.insert(
			ChainId::POLYGON,
			vec![addr("0x7ceb23fd6bc0add59e62ac25578270cff1b9f619")],
		);
		weth.addresses.insert(
			ChainId::ZKSYNC,
			vec![addr("0x5aea5775959fbc2557cc8789bc1bf90a239d9a91")],
		);
		weth.addresses.insert(
			ChainId::LINEA,
			vec![addr("0xe5d7c2a44ffddf6b295a15c148167daaaf5cf34f")],
		);
		registry.insert("WETH", weth);

		let mut usdc = TokenEntry {
			decimals: 6,
			addresses: HashMap::new(),
		};
		usdc.addresses.insert(
			ChainId::ETHEREUM,
			vec![addr("0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48")],
		);
		usdc.addresses.insert(
			ChainId::OPTIMISM,
			vec![
				addr("0x0b2c639c533813f4aa9d7837caf62653d097ff85"),
				addr("0x7f5c764cbc14f9669b88837ca1490cca17c31607"),
			],
		);
		usdc.addresses.insert(
			ChainId::BASE,
			vec![addr("0x833589fcd6edb6e08f4c7c32d4f71b54bda02913")],
		);
		usdc.addresses.insert(
			ChainId::ARBITRUM,
			vec![
				addr("0xaf88d065e77c8cc2239327c5edb3a432268e5831"),
				addr("0xff970a61a04b1ca14834a43f5de4533ebddb5cc8"),
			],
		);
		usdc.addresses.insert(
			ChainId::POLYGON,
			vec![addr("0x3c499c542cef5e3811e1192ce70d8cc03d5c3359")],
		);
		usdc.addresses.insert(
			ChainId::ZKSYNC,
			vec![addr("0x3355df6d4c9c3035724fd0e3914de96a5a83aaf4")],
		);
		registry.insert("USDC", usdc);

		let mut usdt = TokenEntry {
			decimals: 6,
			addresses: HashMap::new(),
		};
		usdt.addresses.insert(
			ChainId::ETHEREUM,
			vec![addr("0xdac17f958d2ee523a2206206994597c13d831ec7")],
		);
		usdt.addresses.insert(
			ChainId::OPTIMISM,
			vec![addr("0x94b008aa00579c1307b0ef2c499ad98a8ce58e58")],
		);
		usdt.addresses.insert(
			ChainId::ARBITRUM,
			vec![addr("0xfd086bc7cd5c481dcc9c85ebe478a1c0b69fcbb9")],
		);
		registry.insert("USDT", usdt);

		let mut dai = TokenEntry {
			decimals: 18,
			addresses: HashMap::new(),
		};
		dai.addresses.insert(
			ChainId::ETHEREUM,
			vec![addr("0x6b175474e89094c44da98b954eedeac495271d0f")],
		);
		dai.addresses.insert(
			ChainId::OPTIMISM,
			vec![addr("0xda10009cbd5d07dd0cecc66161fc93d7c9000da1")],
		);
		dai.addresses.insert(
			ChainId::ARBITRUM,
			vec![addr("0xda10009cbd5d07dd0cecc66161fc93d7c9000da1")],
		);
		registry.insert("DAI", dai);

		let mut wbtc = TokenEntry {
			decimals: 8,
			addresses: HashMap::new(),
		};
		wbtc.addresses.insert(
			ChainId::ETHEREUM,
			vec![addr("0x2260fac5e5542a773aa44fbcfedf7c193bc2c599")],
		);
		wbtc.addresses.insert(
			ChainId::ARBITRUM,
			vec![addr("0x2f2a2543b76a4166549f7aab2e75bef0aefc5b0f")],
		);
		registry.insert("WBTC", wbtc);

		let mut wmatic = TokenEntry {
			decimals: 18,
			addresses: HashMap::new(),
		};
		wmatic.addresses.insert(
			ChainId::POLYGON,
			vec![addr("0x0d500b1d8e8ef31e21c99d1db9a6444d3adf1270")],
		);
		registry.insert("WMATIC", wmatic);

		registry.remap("ETH", "WETH");
		registry.remap("USDC.e", "USDC");
		registry.remap("USDbC", "USDC");
		registry.remap("MATIC", "WMATIC");
		registry.remap("POL", "WMATIC");
		registry.set_native_gas_symbol(ChainId::POLYGON, "MATIC");

		registry
	}
}
