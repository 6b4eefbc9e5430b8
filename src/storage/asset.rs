use chrono::{NaiveDate, NaiveDateTime};

use super::types::{ChargeResult, DischargeResult, StorageUnit};

/// Energy amounts at or below this are treated as zero (MWh).
pub const ENERGY_EPSILON: f64 = 1e-9;

/// Daily discharge quota expressed in full-capacity equivalents.
const DAILY_QUOTA_CYCLES: f64 = 2.0;

/// A storage asset (battery or pumped hydro) with per-source energy attribution.
///
/// `StorageAsset` tracks how much of its stored energy came from wind and how
/// much from solar. The total state of charge is always the sum of the two, and
/// discharge draws both down in proportion to their current share.
#[derive(Debug, Clone)]
pub struct StorageAsset {
    name: String,

    /// Maximum charge/discharge energy per hour (MW).
    pub power_mw: f64,

    /// Energy capacity (MWh).
    pub energy_mwh: f64,

    /// Round-trip efficiency (0..1.0).
    pub efficiency: f64,

    /// Efficiency applied on each leg, `sqrt(efficiency)`.
    leg_efficiency: f64,

    wind_soc_mwh: f64,
    solar_soc_mwh: f64,

    /// Raw energy discharged since the last yearly reset (MWh).
    yearly_discharged_mwh: f64,

    /// Raw energy discharged on `current_day` (MWh).
    daily_discharged_mwh: f64,
    current_day: Option<NaiveDate>,

    zero_hours: u32,
}

impl StorageAsset {
    /// Creates an empty storage asset.
    ///
    /// # Arguments
    ///
    /// * `name` - Identifying name used in reports
    /// * `power_mw` - Charge/discharge limit per hour
    /// * `energy_mwh` - Energy capacity
    /// * `efficiency` - Round-trip efficiency (0..1.0)
    ///
    /// # Panics
    ///
    /// Panics if power or energy is negative, or efficiency is outside (0, 1].
    pub fn new(name: impl Into<String>, power_mw: f64, energy_mwh: f64, efficiency: f64) -> Self {
        assert!(power_mw >= 0.0 && energy_mwh >= 0.0);
        assert!(efficiency > 0.0 && efficiency <= 1.0);

        Self {
            name: name.into(),
            power_mw,
            energy_mwh,
            efficiency,
            leg_efficiency: efficiency.sqrt(),
            wind_soc_mwh: 0.0,
            solar_soc_mwh: 0.0,
            yearly_discharged_mwh: 0.0,
            daily_discharged_mwh: 0.0,
            current_day: None,
            zero_hours: 0,
        }
    }

    /// Maximum raw energy that may be discharged in one calendar day.
    pub fn daily_quota_mwh(&self) -> f64 {
        DAILY_QUOTA_CYCLES * self.energy_mwh
    }

    /// Raw energy discharged so far on the current calendar day.
    pub fn daily_discharged_mwh(&self) -> f64 {
        self.daily_discharged_mwh
    }

    fn roll_day(&mut self, day: NaiveDate) {
        if self.current_day != Some(day) {
            self.current_day = Some(day);
            self.daily_discharged_mwh = 0.0;
        }
    }
}

impl StorageUnit for StorageAsset {
    fn name(&self) -> &str {
        &self.name
    }

    fn power_mw(&self) -> f64 {
        self.power_mw
    }

    fn energy_mwh(&self) -> f64 {
        self.energy_mwh
    }

    fn soc_mwh(&self) -> f64 {
        self.wind_soc_mwh + self.solar_soc_mwh
    }

    fn wind_soc_mwh(&self) -> f64 {
        self.wind_soc_mwh
    }

    fn solar_soc_mwh(&self) -> f64 {
        self.solar_soc_mwh
    }

    /// Accepts at most `min(requested, power, headroom / sqrt(eta))` raw energy,
    /// split between sources in proportion to the request.
    fn charge(&mut self, wind_surplus_mwh: f64, solar_surplus_mwh: f64) -> ChargeResult {
        let wind = wind_surplus_mwh.max(0.0);
        let solar = solar_surplus_mwh.max(0.0);
        let requested = wind + solar;
        if requested <= 0.0 {
            return ChargeResult::default();
        }

        let headroom = (self.energy_mwh - self.soc_mwh()).max(0.0);
        let raw_headroom = headroom / self.leg_efficiency;
        let accepted = requested.min(self.power_mw).min(raw_headroom);

        let wind_accepted = accepted * (wind / requested);
        let solar_accepted = accepted - wind_accepted;

        self.wind_soc_mwh += wind_accepted * self.leg_efficiency;
        self.solar_soc_mwh += solar_accepted * self.leg_efficiency;

        // Keep rounding noise from pushing the store past its capacity
        let soc = self.soc_mwh();
        if soc > self.energy_mwh && soc > 0.0 {
            let scale = self.energy_mwh / soc;
            self.wind_soc_mwh *= scale;
            self.solar_soc_mwh *= scale;
        }

        let stored = accepted * self.leg_efficiency;
        ChargeResult {
            accepted_mwh: accepted,
            rejected_wind_mwh: (wind - wind_accepted).max(0.0),
            rejected_solar_mwh: (solar - solar_accepted).max(0.0),
            cycle_loss_mwh: accepted - stored,
        }
    }

    /// Draws down both source trackers in proportion to their share of the SOC.
    fn discharge(&mut self, shortfall_mwh: f64, timestamp: NaiveDateTime) -> DischargeResult {
        self.roll_day(timestamp.date());

        let soc = self.soc_mwh();
        let quota_left = (self.daily_quota_mwh() - self.daily_discharged_mwh).max(0.0);
        if quota_left <= ENERGY_EPSILON || soc <= ENERGY_EPSILON {
            self.zero_hours += 1;
            return DischargeResult::default();
        }

        let raw = self
            .power_mw
            .min(soc)
            .min(shortfall_mwh.max(0.0) / self.leg_efficiency)
            .min(quota_left);
        let delivered = raw * self.leg_efficiency;
        if delivered <= 0.0 {
            self.zero_hours += 1;
            return DischargeResult::default();
        }

        let wind_share = self.wind_soc_mwh / soc;
        let wind_drawn = raw * wind_share;
        let solar_drawn = raw - wind_drawn;
        self.wind_soc_mwh = (self.wind_soc_mwh - wind_drawn).max(0.0);
        self.solar_soc_mwh = (self.solar_soc_mwh - solar_drawn).max(0.0);

        self.daily_discharged_mwh += raw;
        self.yearly_discharged_mwh += raw;

        let wind_delivered = delivered * wind_share;
        DischargeResult {
            delivered_mwh: delivered,
            wind_delivered_mwh: wind_delivered,
            solar_delivered_mwh: delivered - wind_delivered,
            cycle_loss_mwh: raw - delivered,
        }
    }

    fn average_cycles_per_year(&self) -> f64 {
        if self.energy_mwh > 0.0 {
            self.yearly_discharged_mwh / self.energy_mwh
        } else {
            0.0
        }
    }

    fn zero_hours(&self) -> u32 {
        self.zero_hours
    }

    fn reset_yearly_energy(&mut self) {
        self.yearly_discharged_mwh = 0.0;
    }

    fn reset_yearly_zero_hours(&mut self) {
        self.zero_hours = 0;
    }

    fn empty(&mut self) {
        self.wind_soc_mwh = 0.0;
        self.solar_soc_mwh = 0.0;
    }
}
