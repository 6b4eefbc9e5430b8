//! Storage assets and the dispatch-ordered fleet built from configuration.

/// Stationary storage asset with per-source attribution.
pub mod asset;
/// Fleet construction and dispatch ordering.
pub mod fleet;
pub mod types;

pub use asset::{ENERGY_EPSILON, StorageAsset};
pub use fleet::{create_bess_fleet, create_storages};
pub use types::{ChargeResult, DischargeResult, StorageUnit};
