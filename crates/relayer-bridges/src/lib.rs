//! Bridge finalization matching.

pub mod matcher;

pub use matcher::FinalizationMatcher;
