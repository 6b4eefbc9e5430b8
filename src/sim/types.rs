//! Core simulation types: hourly inputs, hourly records and per-storage statistics.

use std::fmt;

use chrono::NaiveDateTime;

/// Production and target for one hour, as seen by the dispatch step.
#[derive(Debug, Clone, Copy)]
pub struct HourInput {
    /// Start of the hour.
    pub timestamp: NaiveDateTime,
    /// Wind output (MW, rounded to 3 decimals).
    pub wind_mw: f64,
    /// Solar output (MW, rounded to 3 decimals).
    pub solar_mw: f64,
    /// Baseload target for this hour (MW).
    pub baseload_mw: f64,
    /// Grid connection limit (MW); export is capped at `grid - baseload` when set.
    pub grid_connection_mw: Option<f64>,
}

impl HourInput {
    /// Wind plus solar (MWh for a one-hour step).
    pub fn total_generation(&self) -> f64 {
        self.wind_mw + self.solar_mw
    }
}

/// Energy flows decided by the dispatch step for one hour.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HourOutcome {
    /// Raw energy accepted by the fleet (MWh).
    pub charged_mwh: f64,
    /// Energy delivered by the fleet to the baseload (MWh).
    pub discharged_mwh: f64,
    /// Baseload energy left uncovered (MWh).
    pub missing_mwh: f64,
    /// Surplus exported to the grid (MWh).
    pub excess_mwh: f64,
    /// Surplus neither stored nor exported (MWh).
    pub redundant_mwh: f64,
    /// Charge and discharge losses (MWh).
    pub cycle_loss_mwh: f64,
    /// Whether the baseload target was fully met.
    pub met: bool,
}

/// Complete record of one simulated hour.
#[derive(Debug, Clone, PartialEq)]
pub struct HourlyRecord {
    /// Start of the hour.
    pub timestamp: NaiveDateTime,
    /// Wind output used by the dispatch (MW).
    pub wind_mw: f64,
    /// Solar output used by the dispatch (MW).
    pub solar_mw: f64,
    /// Baseload target (MW).
    pub baseload_mw: f64,
    /// Energy delivered by storage (MWh).
    pub storage_discharged_mwh: f64,
    /// Raw energy sent into storage (MWh).
    pub storage_charged_mwh: f64,
    /// Uncovered baseload energy (MWh).
    pub missing_energy_mwh: f64,
    /// Exported surplus (MWh).
    pub excess_energy_mwh: f64,
    /// Wasted surplus (MWh).
    pub redundant_energy_mwh: f64,
    /// Storage losses (MWh).
    pub cycle_loss_mwh: f64,
    /// Day-ahead spot price (EUR/MWh).
    pub spot: f64,
    /// Whether the baseload target was fully met.
    pub met: bool,
}

impl HourlyRecord {
    /// Combines the dispatch input and its outcome with the hour's spot price.
    pub fn new(input: &HourInput, outcome: &HourOutcome, spot: f64) -> Self {
        Self {
            timestamp: input.timestamp,
            wind_mw: input.wind_mw,
            solar_mw: input.solar_mw,
            baseload_mw: input.baseload_mw,
            storage_discharged_mwh: outcome.discharged_mwh,
            storage_charged_mwh: outcome.charged_mwh,
            missing_energy_mwh: outcome.missing_mwh,
            excess_energy_mwh: outcome.excess_mwh,
            redundant_energy_mwh: outcome.redundant_mwh,
            cycle_loss_mwh: outcome.cycle_loss_mwh,
            spot,
            met: outcome.met,
        }
    }

    /// Wind plus solar output (MW).
    pub fn produced_mw(&self) -> f64 {
        self.wind_mw + self.solar_mw
    }
}

impl fmt::Display for HourlyRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | wind={:.3} solar={:.3} target={:.3} | charge={:.3} discharge={:.3} \
             | missing={:.3} excess={:.3} redundant={:.3} | spot={:.2} met={}",
            self.timestamp,
            self.wind_mw,
            self.solar_mw,
            self.baseload_mw,
            self.storage_charged_mwh,
            self.storage_discharged_mwh,
            self.missing_energy_mwh,
            self.excess_energy_mwh,
            self.redundant_energy_mwh,
            self.spot,
            self.met,
        )
    }
}

/// Yearly statistics for one storage unit.
#[derive(Debug, Clone, PartialEq)]
pub struct StorageYearStats {
    /// Unit name, e.g. `"BESS 4h"`.
    pub name: String,
    /// Rated power (MW).
    pub power_mw: f64,
    /// Energy capacity (MWh).
    pub energy_mwh: f64,
    /// Full-equivalent cycles per day, rounded to 2 decimals.
    pub avg_daily_cycles: f64,
    /// Share of the year's hours in which the unit delivered nothing when asked (%).
    pub zero_hours_pct: f64,
}
