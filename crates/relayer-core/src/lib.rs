//! The relayer engine: wires the profit and inventory sides together and
//! drives the per-tick refresh cycle.

pub mod engine;

pub use engine::{FillDecision, RelayerEngine, SkipReason};
