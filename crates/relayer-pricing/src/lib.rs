//! Pricing side of the relayer decision engine: USD price cache, simulated
//! gas-cost estimation, and per-deposit profitability.

pub mod gas;
pub mod mocks;
pub mod prices;
pub mod profit;

pub use gas::GasCostEstimator;
pub use prices::PriceCache;
pub use profit::{ProfitEngine, UnprofitableFill};
