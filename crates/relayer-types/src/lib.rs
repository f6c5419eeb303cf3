//! Shared types for the relayer decision engine.
//!
//! Everything the engine crates agree on lives here: chain identifiers,
//! the chain-family-tagged address, fixed-point helpers, the token registry,
//! deposit and plan records, error types, and the async capability traits
//! through which the engine talks to its external collaborators.

pub mod address;
pub mod amount;
pub mod chains;
pub mod clients;
pub mod common;
pub mod deposit;
pub mod errors;
pub mod tokens;

pub use address::*;
pub use chains::*;
pub use clients::*;
pub use common::*;
pub use deposit::*;
pub use errors::*;
pub use tokens::*;
