//! Chain-related types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Chain identifier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChainId(pub u64);

impl ChainId {
	pub const ETHEREUM: Self = Self(1);
	pub const OPTIMISM: Self = Self(10);
	pub const POLYGON: Self = Self(137);
	pub const ZKSYNC: Self = Self(324);
	pub const BASE: Self = Self(8453);
	pub const ARBITRUM: Self = Self(42161);
	pub const LINEA: Self = Self(59144);
	pub const SOLANA: Self = Self(34268394551451);
	pub const SEPOLIA: Self = Self(11155111);
	pub const BASE_SEPOLIA: Self = Self(84532);
	pub const ARBITRUM_SEPOLIA: Self = Self(421614);

	/// Address family used by accounts and tokens on this chain.
	pub fn family(&self) -> ChainFamily {
		match *self {
			Self::SOLANA => ChainFamily::Svm,
			_ => ChainFamily::Evm,
		}
	}

	pub fn is_testnet(&self) -> bool {
		matches!(
			*self,
			Self::SEPOLIA | Self::BASE_SEPOLIA | Self::ARBITRUM_SEPOLIA
		)
	}
}

impl fmt::Display for ChainId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl FromStr for ChainId {
	type Err = std::num::ParseIntError;

	fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
		Ok(ChainId(s.parse()?))
	}
}

/// Address family of a chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChainFamily {
	Evm,
	Svm,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_chain_family() {
		assert_eq!(ChainId::ETHEREUM.family(), ChainFamily::Evm);
		assert_eq!(ChainId::BASE.family(), ChainFamily::Evm);
		assert_eq!(ChainId::SOLANA.family(), ChainFamily::Svm);
	}

	#[test]
	fn test_testnet_detection() {
		assert!(ChainId::SEPOLIA.is_testnet());
		assert!(ChainId::BASE_SEPOLIA.is_testnet());
		assert!(!ChainId::ETHEREUM.is_testnet());
		assert!(!ChainId::ARBITRUM.is_testnet());
	}

	#[test]
	fn test_chain_id_display_and_parse() {
		assert_eq!(ChainId(42161).to_string(), "42161");
		assert_eq!("324".parse::<ChainId>().unwrap(), ChainId::ZKSYNC);
	}
}
