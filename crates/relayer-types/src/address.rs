//! Chain-family-tagged addresses.
//!
//! Cross-chain maps key by the canonical string form (`to_native`), but every
//! address carries its family so a lookup against the wrong chain family can
//! be rejected instead of silently matching.

use crate::chains::ChainFamily;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// An account or token address, tagged with the chain family it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Address {
	/// 20-byte EVM address.
	Evm([u8; 20]),
	/// 32-byte SVM account key.
	Svm([u8; 32]),
}

impl Address {
	pub const fn zero() -> Self {
		Self::Evm([0u8; 20])
	}

	pub fn evm(bytes: [u8; 20]) -> Self {
		Self::Evm(bytes)
	}

	pub fn svm(bytes: [u8; 32]) -> Self {
		Self::Svm(bytes)
	}

	pub fn kind(&self) -> ChainFamily {
		match self {
			Self::Evm(_) => ChainFamily::Evm,
			Self::Svm(_) => ChainFamily::Svm,
		}
	}

	/// Canonical string form: 0x-prefixed lowercase hex of the native bytes.
	pub fn to_native(&self) -> String {
		match self {
			Self::Evm(b) => format!("0x{}", hex::encode(b)),
			Self::Svm(b) => format!("0x{}", hex::encode(b)),
		}
	}

	pub fn is_zero(&self) -> bool {
		match self {
			Self::Evm(b) => b.iter().all(|x| *x == 0),
			Self::Svm(b) => b.iter().all(|x| *x == 0),
		}
	}
}

impl fmt::Display for Address {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.to_native())
	}
}

impl FromStr for Address {
	type Err = String;

	/// Parses a 0x-prefixed hex string; 20 bytes decode as EVM, 32 as SVM.
	fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
		let stripped = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(s);
		let bytes = hex::decode(stripped).map_err(|e| format!("invalid hex address {s}: {e}"))?;
		match bytes.len() {
			20 => {
				let mut out = [0u8; 20];
				out.copy_from_slice(&bytes);
				Ok(Self::Evm(out))
			}
			32 => {
				let mut out = [0u8; 32];
				out.copy_from_slice(&bytes);
				Ok(Self::Svm(out))
			}
			n => Err(format!("address {s} has {n} bytes, expected 20 or 32")),
		}
	}
}

impl Serialize for Address {
	fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
		serializer.serialize_str(&self.to_native())
	}
}

impl<'de> Deserialize<'de> for Address {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
		let s = String::deserialize(deserializer)?;
		s.parse().map_err(de::Error::custom)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_native_round_trip() {
		let addr = Address::evm([0xab; 20]);
		let parsed: Address = addr.to_native().parse().unwrap();
		assert_eq!(addr, parsed);
		assert_eq!(addr.kind(), ChainFamily::Evm);

		let svm = Address::svm([0x11; 32]);
		let parsed: Address = svm.to_native().parse().unwrap();
		assert_eq!(svm, parsed);
		assert_eq!(svm.kind(), ChainFamily::Svm);
	}

	#[test]
	fn test_families_never_compare_equal() {
		let mut evm_padded = [0u8; 32];
		evm_padded[12..].copy_from_slice(&[0xab; 20]);
		assert_ne!(Address::evm([0xab; 20]), Address::svm(evm_padded));
	}

	#[test]
	fn test_rejects_bad_lengths() {
		assert!("0xdeadbeef".parse::<Address>().is_err());
		assert!("not hex".parse::<Address>().is_err());
	}

	#[test]
	fn test_serde_string_form() {
		let addr = Address::evm([0x01; 20]);
		let json = serde_json::to_string(&addr).unwrap();
		assert_eq!(json, format!("\"{}\"", addr.to_native()));
		let back: Address = serde_json::from_str(&json).unwrap();
		assert_eq!(addr, back);
	}
}
