//! Relayer configuration: types, serde helpers, and the file loader.

pub mod loader;
pub mod serde_helpers;
pub mod types;

pub use loader::ConfigLoader;
pub use types::*;
