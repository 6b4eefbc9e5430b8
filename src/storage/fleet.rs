use std::cmp::Ordering;

use log::{debug, warn};

use super::asset::StorageAsset;
use super::types::StorageUnit;
use crate::config::{DispatchPriority, StorageConfig};

/// Name given to the pumped hydro unit.
pub const HYDRO_NAME: &str = "Pumped hydro";

/// Builds one battery per non-zero entry and sorts them into dispatch order.
///
/// # Arguments
///
/// * `entries` - `(duration_h, power_mw)` pairs; energy capacity is `power * duration`
/// * `efficiency` - Shared round-trip efficiency
/// * `priority` - Ordering rule for the resulting fleet
///
/// Entries with zero power are omitted.
pub fn create_bess_fleet(
    entries: &[(u32, f64)],
    efficiency: f64,
    priority: DispatchPriority,
) -> Vec<StorageAsset> {
    let mut fleet: Vec<StorageAsset> = entries
        .iter()
        .filter_map(|&(duration_h, power_mw)| {
            if power_mw <= 0.0 {
                warn!("Omitting BESS {duration_h}h: power rating is zero");
                return None;
            }
            Some(StorageAsset::new(
                format!("BESS {duration_h}h"),
                power_mw,
                power_mw * f64::from(duration_h),
                efficiency,
            ))
        })
        .collect();

    fleet.sort_by(|a, b| dispatch_order(a, b, priority));
    fleet
}

/// Builds the full fleet: batteries in priority order, then pumped hydro last.
pub fn create_storages(config: &StorageConfig, priority: DispatchPriority) -> Vec<StorageAsset> {
    let entries: Vec<(u32, f64)> = config
        .bess
        .iter()
        .map(|b| (b.duration_h, b.power_mw))
        .collect();
    let mut fleet = create_bess_fleet(&entries, config.efficiency, priority);

    if let Some(hydro) = &config.hydro {
        if hydro.power_mw > 0.0 {
            fleet.push(StorageAsset::new(
                HYDRO_NAME,
                hydro.power_mw,
                hydro.energy_mwh,
                hydro.efficiency,
            ));
        } else {
            warn!("Omitting pumped hydro: power rating is zero");
        }
    }

    for unit in &fleet {
        debug!(
            "Storage {}: {} MW / {} MWh, efficiency {}",
            unit.name(),
            unit.power_mw,
            unit.energy_mwh,
            unit.efficiency
        );
    }

    fleet
}

/// Total order: power (direction per `priority`), then energy ascending, then name.
fn dispatch_order(a: &StorageAsset, b: &StorageAsset, priority: DispatchPriority) -> Ordering {
    let by_power = a.power_mw.total_cmp(&b.power_mw);
    let by_power = match priority {
        DispatchPriority::PowerDescending => by_power.reverse(),
        DispatchPriority::PowerAscending => by_power,
    };
    by_power
        .then(a.energy_mwh.total_cmp(&b.energy_mwh))
        .then_with(|| a.name().cmp(b.name()))
}
