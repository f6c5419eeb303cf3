//! Capability traits for the external collaborators the engine consumes.
//!
//! The engine never holds concrete collaborator types; constructors take
//! these read-only interfaces so client cycles cannot form.

pub mod adapters;
pub mod balances;
pub mod bundles;
pub mod chain;
pub mod feeds;
pub mod hub_pool;
pub mod transfers;

pub use adapters::*;
pub use balances::*;
pub use bundles::*;
pub use chain::*;
pub use feeds::*;
pub use hub_pool::*;
pub use transfers::*;
