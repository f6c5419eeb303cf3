//! Common types used throughout the relayer system.

// Re-export commonly used ethereum types
pub use ethers_core::types::{Bytes as EthBytes, H256 as Bytes32, I256, U256, U512};

/// Transaction hash
pub type TxHash = Bytes32;

/// Block number
pub type BlockNumber = u64;

/// Timestamp (Unix seconds)
pub type Timestamp = u64;
