//! Common types and the capability trait shared by all storage units.

use chrono::NaiveDateTime;

/// Outcome of offering surplus energy to a storage unit for one hour.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ChargeResult {
    /// Raw (pre-efficiency) energy accepted from the surplus (MWh).
    pub accepted_mwh: f64,
    /// Wind surplus the unit could not take (MWh).
    pub rejected_wind_mwh: f64,
    /// Solar surplus the unit could not take (MWh).
    pub rejected_solar_mwh: f64,
    /// Energy lost on the charge leg (MWh).
    pub cycle_loss_mwh: f64,
}

/// Outcome of asking a storage unit to cover a shortfall for one hour.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DischargeResult {
    /// Energy delivered to the baseload after efficiency losses (MWh).
    pub delivered_mwh: f64,
    /// Part of `delivered_mwh` that originated from wind (MWh).
    pub wind_delivered_mwh: f64,
    /// Part of `delivered_mwh` that originated from solar (MWh).
    pub solar_delivered_mwh: f64,
    /// Energy lost on the discharge leg (MWh).
    pub cycle_loss_mwh: f64,
}

/// Trait defining a storage asset that the hourly dispatch can charge and discharge.
///
/// Round-trip efficiency is applied as its square root on each leg, so a
/// full charge/discharge cycle loses `1 - efficiency` of the energy.
pub trait StorageUnit {
    /// Stable identifying name, e.g. `"BESS 4h"`.
    fn name(&self) -> &str;

    /// Charge/discharge limit per hour (MW).
    fn power_mw(&self) -> f64;

    /// Energy capacity (MWh).
    fn energy_mwh(&self) -> f64;

    /// Current state of charge (MWh).
    fn soc_mwh(&self) -> f64;

    /// Stored energy that originated from wind (MWh).
    fn wind_soc_mwh(&self) -> f64;

    /// Stored energy that originated from solar (MWh).
    fn solar_soc_mwh(&self) -> f64;

    /// Offers a per-source surplus to the unit.
    ///
    /// # Arguments
    ///
    /// * `wind_surplus_mwh` - Wind energy available this hour
    /// * `solar_surplus_mwh` - Solar energy available this hour
    fn charge(&mut self, wind_surplus_mwh: f64, solar_surplus_mwh: f64) -> ChargeResult;

    /// Asks the unit to cover `shortfall_mwh` during the hour starting at `timestamp`.
    ///
    /// The calendar date of `timestamp` drives the daily discharge quota.
    fn discharge(&mut self, shortfall_mwh: f64, timestamp: NaiveDateTime) -> DischargeResult;

    /// Full-equivalent cycles discharged so far this year.
    fn average_cycles_per_year(&self) -> f64;

    /// Hours this year in which the unit was asked to discharge but delivered nothing.
    fn zero_hours(&self) -> u32;

    /// Clears the yearly discharged-energy counter.
    fn reset_yearly_energy(&mut self);

    /// Clears the yearly zero-hour counter.
    fn reset_yearly_zero_hours(&mut self);

    /// Empties the unit, dropping all stored energy and its attribution.
    fn empty(&mut self);
}
