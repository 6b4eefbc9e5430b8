//! Hourly input series: production profiles, market data and a synthetic generator.

pub mod series;
/// Seeded synthetic profiles.
pub mod synthetic;

pub use series::{InputError, MarketRow, MarketTable, ProductionProfile, ProfileSet};
