//! Serde helpers for configuration deserialization.
//!
//! TOML and JSON map keys are strings, so chain-id-keyed maps round-trip
//! through string keys, and fixed-point fractions are written as decimal
//! strings ("0.08") rather than raw 18-decimal integers.

use relayer_types::amount::{fixed_point, parse_fp};
use relayer_types::{ChainId, U256};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;

/// Deserializes `HashMap<ChainId, T>` from string keys.
pub fn deserialize_chain_id_map<'de, D, T>(
	deserializer: D,
) -> Result<HashMap<ChainId, T>, D::Error>
where
	D: Deserializer<'de>,
	T: Deserialize<'de>,
{
	let map = HashMap::<String, T>::deserialize(deserializer)?;

	map.into_iter()
		.map(|(k, v)| {
			k.parse::<u64>()
				.map(|id| (ChainId(id), v))
				.map_err(|_| serde::de::Error::custom(format!("Invalid chain ID: {}", k)))
		})
		.collect()
}

/// Serializes `HashMap<ChainId, T>` with string keys.
pub fn serialize_chain_id_map<S, T>(
	map: &HashMap<ChainId, T>,
	serializer: S,
) -> Result<S::Ok, S::Error>
where
	S: Serializer,
	T: Serialize,
{
	let string_map: HashMap<String, &T> = map.iter().map(|(k, v)| (k.0.to_string(), v)).collect();

	string_map.serialize(serializer)
}

/// Deserializes an 18-decimal fixed-point value from a decimal string.
pub fn deserialize_fp<'de, D>(deserializer: D) -> Result<U256, D::Error>
where
	D: Deserializer<'de>,
{
	let s = String::deserialize(deserializer)?;
	parse_fp(&s).ok_or_else(|| serde::de::Error::custom(format!("Invalid decimal value: {}", s)))
}

/// Serializes an 18-decimal fixed-point value as a decimal string.
pub fn serialize_fp<S>(value: &U256, serializer: S) -> Result<S::Ok, S::Error>
where
	S: Serializer,
{
	let whole = value / fixed_point();
	let frac = value % fixed_point();
	if frac.is_zero() {
		serializer.serialize_str(&whole.to_string())
	} else {
		let frac = format!("{:0>18}", frac);
		serializer.serialize_str(format!("{}.{}", whole, frac.trim_end_matches('0')).as_str())
	}
}

/// Deserializes an optional fixed-point decimal string.
pub fn deserialize_opt_fp<'de, D>(deserializer: D) -> Result<Option<U256>, D::Error>
where
	D: Deserializer<'de>,
{
	let s = Option::<String>::deserialize(deserializer)?;
	match s {
		None => Ok(None),
		Some(s) => parse_fp(&s)
			.map(Some)
			.ok_or_else(|| serde::de::Error::custom(format!("Invalid decimal value: {}", s))),
	}
}

/// Serializes an optional fixed-point value as a decimal string.
pub fn serialize_opt_fp<S>(value: &Option<U256>, serializer: S) -> Result<S::Ok, S::Error>
where
	S: Serializer,
{
	match value {
		None => serializer.serialize_none(),
		Some(v) => serialize_fp(v, serializer),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[derive(Debug, Deserialize, Serialize)]
	struct TestStruct {
		#[serde(
			deserialize_with = "deserialize_chain_id_map",
			serialize_with = "serialize_chain_id_map"
		)]
		targets: HashMap<ChainId, String>,
		#[serde(deserialize_with = "deserialize_fp", serialize_with = "serialize_fp")]
		pct: U256,
	}

	#[test]
	fn test_chain_id_map_round_trip() {
		let toml = r#"
            pct = "0.08"

            [targets]
            10 = "optimism"
            42161 = "arbitrum"
        "#;

		let parsed: TestStruct = toml::from_str(toml).unwrap();
		assert_eq!(parsed.targets.get(&ChainId(10)).unwrap(), "optimism");
		assert_eq!(parsed.pct, U256::exp10(16) * 8);

		let serialized = toml::to_string(&parsed).unwrap();
		let reparsed: TestStruct = toml::from_str(&serialized).unwrap();
		assert_eq!(reparsed.pct, parsed.pct);
		assert_eq!(reparsed.targets.len(), 2);
	}

	#[test]
	fn test_fp_serialization_trims_zeros() {
		let mut targets = HashMap::new();
		targets.insert(ChainId(1), "hub".to_string());
		let value = TestStruct {
			targets,
			pct: U256::exp10(17) * 15, // 1.5
		};
		let serialized = toml::to_string(&value).unwrap();
		assert!(serialized.contains("pct = \"1.5\""));
	}

	#[test]
	fn test_invalid_chain_key_rejected() {
		let toml = r#"
            pct = "1"

            [targets]
            mainnet = "nope"
        "#;
		assert!(toml::from_str::<TestStruct>(toml).is_err());
	}
}
