//! Error types for the relayer system.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, RelayerError>;

#[derive(Error, Debug)]
pub enum RelayerError {
	#[error("Configuration error: {0}")]
	Config(String),

	#[error("Price feed error: {0}")]
	PriceFeed(String),

	#[error("Simulation error: {0}")]
	Simulation(String),

	#[error("Inventory error: {0}")]
	Inventory(String),

	#[error("Bridge error: {0}")]
	Bridge(String),

	#[error("Chain error: {0}")]
	Chain(String),

	#[error("Output token {output} on chain {destination} is not equivalent to input token {input} on chain {origin}")]
	OutputTokenMismatch {
		input: String,
		output: String,
		origin: u64,
		destination: u64,
	},

	#[error(transparent)]
	Other(#[from] anyhow::Error),
}
