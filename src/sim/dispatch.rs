//! Hourly dispatch step: surplus or shortfall handling across the storage fleet.

use chrono::NaiveDateTime;
use log::trace;

use super::metrics::YearlyMetrics;
use super::types::{HourInput, HourOutcome};
use crate::storage::{ENERGY_EPSILON, StorageUnit};

/// Splits `amount` between wind and solar in proportion to their outputs.
///
/// Returns `(0.0, 0.0)` when both outputs are zero.
pub fn share_allocation(wind: f64, solar: f64, amount: f64) -> (f64, f64) {
    let total = wind + solar;
    if total <= 0.0 {
        return (0.0, 0.0);
    }
    (amount * wind / total, amount * solar / total)
}

/// Totals from offering a surplus to the fleet.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FleetCharge {
    pub remaining_wind: f64,
    pub remaining_solar: f64,
    pub accepted: f64,
    pub cycle_loss: f64,
}

/// Totals from asking the fleet to cover a shortfall.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FleetDischarge {
    pub delivered: f64,
    pub wind_delivered: f64,
    pub solar_delivered: f64,
    pub cycle_loss: f64,
}

/// Offers the surplus to each unit in order, passing on whatever it rejects.
pub fn charge_fleet<S: StorageUnit>(
    storages: &mut [S],
    wind_surplus: f64,
    solar_surplus: f64,
) -> FleetCharge {
    let mut result = FleetCharge {
        remaining_wind: wind_surplus.max(0.0),
        remaining_solar: solar_surplus.max(0.0),
        ..FleetCharge::default()
    };

    for storage in storages.iter_mut() {
        if result.remaining_wind + result.remaining_solar <= ENERGY_EPSILON {
            break;
        }
        let charge = storage.charge(result.remaining_wind, result.remaining_solar);
        result.remaining_wind = charge.rejected_wind_mwh;
        result.remaining_solar = charge.rejected_solar_mwh;
        result.accepted += charge.accepted_mwh;
        result.cycle_loss += charge.cycle_loss_mwh;
    }

    result
}

/// Asks each unit in order to cover what is still missing.
pub fn discharge_fleet<S: StorageUnit>(
    storages: &mut [S],
    shortfall: f64,
    timestamp: NaiveDateTime,
) -> FleetDischarge {
    let mut result = FleetDischarge::default();
    let mut remaining = shortfall;

    for storage in storages.iter_mut() {
        if remaining <= ENERGY_EPSILON {
            break;
        }
        let discharge = storage.discharge(remaining, timestamp);
        result.delivered += discharge.delivered_mwh;
        result.wind_delivered += discharge.wind_delivered_mwh;
        result.solar_delivered += discharge.solar_delivered_mwh;
        result.cycle_loss += discharge.cycle_loss_mwh;
        remaining -= discharge.delivered_mwh;
    }

    result
}

/// Runs one hour of dispatch and updates the yearly accumulator.
///
/// When wind plus solar covers the target, the target is served directly and
/// the surplus goes to storage, then to export (up to the grid limit), and the
/// rest is redundant. Otherwise storage covers as much of the shortfall as it
/// can and the remainder is recorded as missing energy.
///
/// # Arguments
///
/// * `input` - Production and target for the hour
/// * `storages` - Fleet in dispatch order
/// * `metrics` - Running totals for the current year
pub fn simulate_hour<S: StorageUnit>(
    input: &HourInput,
    storages: &mut [S],
    metrics: &mut YearlyMetrics,
) -> HourOutcome {
    let wind = input.wind_mw;
    let solar = input.solar_mw;
    let baseload = input.baseload_mw;
    let total_generation = input.total_generation();

    metrics.total_wind += wind;
    metrics.total_solar += solar;

    let outcome = if total_generation >= baseload {
        let (wind_in_baseload, solar_in_baseload) = share_allocation(wind, solar, baseload);
        metrics.wind_in_baseload += wind_in_baseload;
        metrics.solar_in_baseload += solar_in_baseload;
        metrics.produced_to_baseload += baseload;
        metrics.hours_met += 1;

        let (wind_surplus, solar_surplus) =
            share_allocation(wind, solar, total_generation - baseload);
        let charge = charge_fleet(storages, wind_surplus, solar_surplus);
        metrics.charged_wind += wind_surplus - charge.remaining_wind;
        metrics.charged_solar += solar_surplus - charge.remaining_solar;

        let remaining = charge.remaining_wind + charge.remaining_solar;
        let exportable = match input.grid_connection_mw {
            Some(grid) => remaining.min((grid - baseload).max(0.0)),
            None => remaining,
        };
        let (excess_wind, excess_solar) =
            share_allocation(charge.remaining_wind, charge.remaining_solar, exportable);
        metrics.excess_wind += excess_wind;
        metrics.excess_solar += excess_solar;
        metrics.redundant_wind += charge.remaining_wind - excess_wind;
        metrics.redundant_solar += charge.remaining_solar - excess_solar;
        metrics.cycle_loss_total += charge.cycle_loss;

        HourOutcome {
            charged_mwh: charge.accepted,
            excess_mwh: excess_wind + excess_solar,
            redundant_mwh: remaining - excess_wind - excess_solar,
            cycle_loss_mwh: charge.cycle_loss,
            met: true,
            ..HourOutcome::default()
        }
    } else {
        let shortfall = baseload - total_generation;
        let discharge = discharge_fleet(storages, shortfall, input.timestamp);

        let produced = total_generation + discharge.delivered;
        metrics.wind_in_baseload += wind + discharge.wind_delivered;
        metrics.solar_in_baseload += solar + discharge.solar_delivered;
        metrics.produced_to_baseload += produced;
        metrics.cycle_loss_total += discharge.cycle_loss;

        let met = produced >= baseload - ENERGY_EPSILON;
        let missing = if met { 0.0 } else { baseload - produced };
        if met {
            metrics.hours_met += 1;
        } else {
            metrics.missing_energy += missing;
        }

        HourOutcome {
            discharged_mwh: discharge.delivered,
            missing_mwh: missing,
            cycle_loss_mwh: discharge.cycle_loss,
            met,
            ..HourOutcome::default()
        }
    };

    trace!(
        "{}: wind={:.3} solar={:.3} target={:.3} -> {:?}",
        input.timestamp, wind, solar, baseload, outcome
    );
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::StorageAsset;
    use chrono::NaiveDate;
    use float_cmp::assert_approx_eq;
    use rstest::rstest;

    fn hour(wind: f64, solar: f64, baseload: f64) -> HourInput {
        HourInput {
            timestamp: NaiveDate::from_ymd_opt(2023, 3, 1)
                .unwrap()
                .and_hms_opt(10, 0, 0)
                .unwrap(),
            wind_mw: wind,
            solar_mw: solar,
            baseload_mw: baseload,
            grid_connection_mw: None,
        }
    }

    #[rstest]
    #[case(3.0, 1.0, 8.0, 6.0, 2.0)]
    #[case(0.0, 5.0, 2.0, 0.0, 2.0)]
    #[case(0.0, 0.0, 2.0, 0.0, 0.0)]
    fn test_share_allocation(
        #[case] wind: f64,
        #[case] solar: f64,
        #[case] amount: f64,
        #[case] expected_wind: f64,
        #[case] expected_solar: f64,
    ) {
        let (w, s) = share_allocation(wind, solar, amount);
        assert_approx_eq!(f64, w, expected_wind);
        assert_approx_eq!(f64, s, expected_solar);
    }

    #[test]
    fn test_surplus_without_storage_is_excess() {
        let mut metrics = YearlyMetrics::new();
        let mut storages: Vec<StorageAsset> = Vec::new();
        let outcome = simulate_hour(&hour(15.0, 0.0, 10.0), &mut storages, &mut metrics);

        assert!(outcome.met);
        assert_approx_eq!(f64, outcome.excess_mwh, 5.0);
        assert_eq!(outcome.missing_mwh, 0.0);
        assert_approx_eq!(f64, metrics.wind_in_baseload, 10.0);
        assert_eq!(metrics.hours_met, 1);
        assert_eq!(metrics.missing_energy, 0.0);
    }

    #[test]
    fn test_shortfall_with_empty_storage_is_missing() {
        let mut metrics = YearlyMetrics::new();
        let mut storages = vec![StorageAsset::new("BESS 2h", 5.0, 10.0, 0.86)];
        let outcome = simulate_hour(&hour(4.0, 0.0, 10.0), &mut storages, &mut metrics);

        assert!(!outcome.met);
        assert_approx_eq!(f64, outcome.missing_mwh, 6.0);
        assert_approx_eq!(f64, metrics.missing_energy, 6.0);
        assert_eq!(metrics.hours_met, 0);
        assert_eq!(storages[0].zero_hours(), 1);
    }

    #[test]
    fn test_surplus_conserves_energy() {
        let mut metrics = YearlyMetrics::new();
        let mut storages = vec![
            StorageAsset::new("BESS 1h", 2.0, 2.0, 0.86),
            StorageAsset::new("BESS 2h", 1.0, 2.0, 0.86),
        ];
        let mut input = hour(12.0, 6.0, 10.0);
        input.grid_connection_mw = Some(12.0);
        let outcome = simulate_hour(&input, &mut storages, &mut metrics);

        // 8 surplus: 3 charged, 2 exported (grid 12 - baseload 10), 3 redundant
        assert_approx_eq!(f64, outcome.charged_mwh, 3.0);
        assert_approx_eq!(f64, outcome.excess_mwh, 2.0, epsilon = 1e-12);
        assert_approx_eq!(f64, outcome.redundant_mwh, 3.0, epsilon = 1e-12);
        let balance = 10.0 + outcome.charged_mwh + outcome.excess_mwh + outcome.redundant_mwh;
        assert_approx_eq!(f64, balance, 18.0, epsilon = 1e-9);

        // Source split follows the 2:1 production ratio
        assert_approx_eq!(f64, metrics.charged_wind, 2.0, epsilon = 1e-12);
        assert_approx_eq!(f64, metrics.excess_solar, 2.0 / 3.0, epsilon = 1e-12);
        assert_approx_eq!(f64, metrics.redundant_wind, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_grid_cap_below_target_exports_nothing() {
        let mut metrics = YearlyMetrics::new();
        let mut storages: Vec<StorageAsset> = Vec::new();
        let mut input = hour(20.0, 0.0, 10.0);
        input.grid_connection_mw = Some(8.0);
        let outcome = simulate_hour(&input, &mut storages, &mut metrics);
        assert_eq!(outcome.excess_mwh, 0.0);
        assert_approx_eq!(f64, outcome.redundant_mwh, 10.0);
    }

    #[test]
    fn test_charge_passes_rejected_surplus_down_the_fleet() {
        let mut storages = vec![
            StorageAsset::new("first", 2.0, 4.0, 1.0),
            StorageAsset::new("second", 5.0, 10.0, 1.0),
        ];
        let result = charge_fleet(&mut storages, 6.0, 0.0);
        assert_approx_eq!(f64, result.accepted, 6.0);
        assert_approx_eq!(f64, storages[0].soc_mwh(), 2.0);
        assert_approx_eq!(f64, storages[1].soc_mwh(), 4.0);
        assert!(result.remaining_wind < 1e-12);
    }

    #[test]
    fn test_charge_stops_when_surplus_used() {
        let mut storages = vec![
            StorageAsset::new("first", 10.0, 10.0, 1.0),
            StorageAsset::new("second", 10.0, 10.0, 1.0),
        ];
        charge_fleet(&mut storages, 3.0, 1.0);
        assert_eq!(storages[1].soc_mwh(), 0.0);
    }

    #[test]
    fn test_discharge_accumulates_attribution_over_units() {
        let mut storages = vec![
            StorageAsset::new("wind store", 2.0, 2.0, 1.0),
            StorageAsset::new("solar store", 2.0, 2.0, 1.0),
        ];
        storages[0].charge(2.0, 0.0);
        storages[1].charge(0.0, 2.0);

        let mut metrics = YearlyMetrics::new();
        let outcome = simulate_hour(&hour(1.0, 0.0, 5.0), &mut storages, &mut metrics);

        assert!(outcome.met);
        assert_approx_eq!(f64, outcome.discharged_mwh, 4.0);
        assert_approx_eq!(f64, metrics.wind_in_baseload, 3.0);
        assert_approx_eq!(f64, metrics.solar_in_baseload, 2.0);
        assert_approx_eq!(f64, metrics.produced_to_baseload, 5.0);
    }

    #[test]
    fn test_discharge_skips_units_once_covered() {
        let mut storages = vec![
            StorageAsset::new("first", 5.0, 5.0, 1.0),
            StorageAsset::new("second", 5.0, 5.0, 1.0),
        ];
        let mut metrics = YearlyMetrics::new();
        storages[0].charge(5.0, 0.0);
        simulate_hour(&hour(8.0, 0.0, 10.0), &mut storages, &mut metrics);

        // The second unit was never asked, so it has no zero hour
        assert_eq!(storages[1].zero_hours(), 0);
        assert_approx_eq!(f64, storages[0].soc_mwh(), 3.0);
    }

    #[test]
    fn test_partial_cover_records_remaining_missing() {
        let mut storages = vec![StorageAsset::new("small", 1.0, 4.0, 0.81)];
        for _ in 0..4 {
            storages[0].charge(1.0, 0.0);
        }
        let mut metrics = YearlyMetrics::new();
        let outcome = simulate_hour(&hour(5.0, 0.0, 10.0), &mut storages, &mut metrics);

        // Power limit: 1 MWh raw, 0.9 delivered
        assert_approx_eq!(f64, outcome.discharged_mwh, 0.9, epsilon = 1e-12);
        assert_approx_eq!(f64, outcome.missing_mwh, 4.1, epsilon = 1e-12);
        assert_approx_eq!(f64, outcome.cycle_loss_mwh, 0.1, epsilon = 1e-12);
        assert!(!outcome.met);
    }

    #[test]
    fn test_no_generation_surplus_branch_with_zero_target() {
        let mut metrics = YearlyMetrics::new();
        let mut storages: Vec<StorageAsset> = Vec::new();
        let outcome = simulate_hour(&hour(0.0, 0.0, 0.0), &mut storages, &mut metrics);
        assert!(outcome.met);
        assert_eq!(outcome.excess_mwh, 0.0);
        assert_eq!(metrics.wind_in_baseload, 0.0);
    }
}
