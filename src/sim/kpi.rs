//! Yearly KPI compilation from the accumulator and the hourly records.

use std::fmt;

use log::warn;

use super::metrics::YearlyMetrics;
use super::types::{HourlyRecord, StorageYearStats};
use crate::config::ScenarioConfig;
use crate::finance::{
    ProductionCost, baseload_delivered_cost, break_even_price, excess_revenue,
    overproduction_share, round_to, vwap,
};

fn spot_vwap(records: &[HourlyRecord], energy: impl Fn(&HourlyRecord) -> f64) -> f64 {
    vwap(records.iter().map(|r| (energy(r), r.spot)))
}

/// Volume-weighted prices and the average spot price of one year.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PriceAggregates {
    /// VWAP of missing energy (EUR/MWh).
    pub missing_vwap: f64,
    /// VWAP of exported excess energy (EUR/MWh).
    pub excess_vwap: f64,
    /// VWAP of wind production (EUR/MWh).
    pub wind_vwap: f64,
    /// VWAP of solar production (EUR/MWh).
    pub solar_vwap: f64,
    /// Unweighted mean spot price (EUR/MWh).
    pub avg_spot: f64,
}

impl PriceAggregates {
    /// Computes all price aggregates from one year's hourly records.
    pub fn from_records(records: &[HourlyRecord]) -> Self {
        let avg_spot = if records.is_empty() {
            0.0
        } else {
            records.iter().map(|r| r.spot).sum::<f64>() / records.len() as f64
        };

        Self {
            missing_vwap: spot_vwap(records, |r| r.missing_energy_mwh),
            excess_vwap: spot_vwap(records, |r| r.excess_energy_mwh),
            wind_vwap: spot_vwap(records, |r| r.wind_mw),
            solar_vwap: spot_vwap(records, |r| r.solar_mw),
            avg_spot: round_to(avg_spot, 2),
        }
    }
}

/// Compiled, read-only results of one simulated year.
///
/// Energies are in MWh, prices in EUR/MWh and shares in percent. Economic
/// values are rounded to 2 decimals and VWAPs to 4.
#[derive(Debug, Clone, PartialEq)]
pub struct YearlyResult {
    pub simulation_id: u32,
    pub year: i32,
    pub hours: usize,

    pub wind_capacity_mw: f64,
    pub solar_capacity_mw: f64,
    pub baseload_mw: f64,
    /// Grid connection limit, 0 when unlimited.
    pub grid_connection_mw: f64,

    pub total_wind_mwh: f64,
    pub total_solar_mwh: f64,
    /// Contracted energy: `baseload_mw * hours`.
    pub baseload_energy_mwh: f64,
    pub produced_to_baseload_mwh: f64,
    pub wind_in_baseload_mwh: f64,
    pub solar_in_baseload_mwh: f64,
    pub excess_wind_mwh: f64,
    pub excess_solar_mwh: f64,
    pub redundant_wind_mwh: f64,
    pub redundant_solar_mwh: f64,
    pub charged_wind_mwh: f64,
    pub charged_solar_mwh: f64,
    pub missing_energy_mwh: f64,
    pub cycle_loss_mwh: f64,

    /// Hours in which the baseload target was fully met.
    pub green_hours: u32,
    pub green_hours_pct: f64,
    /// Energy delivered to the baseload over contracted energy.
    pub res_share_pct: f64,
    pub redundant_share_pct: f64,
    pub overproduction_share_pct: f64,

    pub prices: PriceAggregates,

    /// Delivered cost with missing energy at the fixed price.
    pub baseload_cost_fixed: f64,
    /// Delivered cost with missing energy at its VWAP.
    pub baseload_cost_vwap: f64,
    /// Break-even with fixed excess prices and fixed missing price.
    pub break_even_fixed: f64,
    /// Break-even with fixed excess prices and missing energy at its VWAP.
    pub break_even_vwap: f64,
    /// Break-even with excess and missing energy both at their VWAPs.
    pub break_even_market: f64,

    pub storage: Vec<StorageYearStats>,
}

impl YearlyResult {
    /// Compiles the yearly result.
    ///
    /// # Arguments
    ///
    /// * `year` - Calendar year
    /// * `records` - The year's hourly records, in order
    /// * `metrics` - Closed accumulator for the year (see [`YearlyMetrics::finish`])
    /// * `config` - Scenario the year was simulated with
    /// * `storage` - Per-unit statistics read before the yearly reset
    pub fn compile(
        year: i32,
        records: &[HourlyRecord],
        metrics: &YearlyMetrics,
        config: &ScenarioConfig,
        storage: Vec<StorageYearStats>,
    ) -> Self {
        let hours = records.len();
        let baseload_mw = config.baseload.mw;
        let baseload_energy = baseload_mw * hours as f64;
        let prices = PriceAggregates::from_records(records);
        let p = &config.prices;
        let storage_payments = config.storage.annual_payments();

        if hours > 0 && metrics.total_production() <= 0.0 {
            warn!("Year {year}: no wind or solar production, production shares reported as 0");
        }

        let percent_of = |value: f64, total: f64| {
            if total > 0.0 {
                round_to(value / total * 100.0, 2)
            } else {
                0.0
            }
        };
        // Contracted energy is zero only for an empty year
        let per_mwh = |value: f64| {
            if baseload_energy > 0.0 {
                round_to(value, 2)
            } else {
                0.0
            }
        };

        let in_baseload = ProductionCost {
            wind_mwh: metrics.wind_in_baseload,
            wind_price: p.wind_price,
            solar_mwh: metrics.solar_in_baseload,
            solar_price: p.solar_price,
            storage_payments,
        };
        let all_production = ProductionCost {
            wind_mwh: metrics.total_wind,
            solar_mwh: metrics.total_solar,
            ..in_baseload
        };
        let fixed_revenue = excess_revenue(
            metrics.excess_wind,
            p.wind_excess_price,
            metrics.excess_solar,
            p.solar_excess_price,
        );
        let market_revenue = metrics.excess_energy() * prices.excess_vwap;
        let missing = metrics.missing_energy;

        Self {
            simulation_id: config.simulation.id,
            year,
            hours,
            wind_capacity_mw: config.plant.wind_capacity_mw,
            solar_capacity_mw: config.plant.solar_capacity_mw,
            baseload_mw,
            grid_connection_mw: config.plant.grid_connection_mw.unwrap_or(0.0),
            total_wind_mwh: metrics.total_wind,
            total_solar_mwh: metrics.total_solar,
            baseload_energy_mwh: baseload_energy,
            produced_to_baseload_mwh: metrics.produced_to_baseload,
            wind_in_baseload_mwh: metrics.wind_in_baseload,
            solar_in_baseload_mwh: metrics.solar_in_baseload,
            excess_wind_mwh: metrics.excess_wind,
            excess_solar_mwh: metrics.excess_solar,
            redundant_wind_mwh: metrics.redundant_wind,
            redundant_solar_mwh: metrics.redundant_solar,
            charged_wind_mwh: metrics.charged_wind,
            charged_solar_mwh: metrics.charged_solar,
            missing_energy_mwh: missing,
            cycle_loss_mwh: metrics.cycle_loss_total,
            green_hours: metrics.hours_met,
            green_hours_pct: percent_of(f64::from(metrics.hours_met), hours as f64),
            res_share_pct: percent_of(metrics.produced_to_baseload, baseload_energy),
            redundant_share_pct: percent_of(metrics.redundant_energy(), metrics.total_production()),
            overproduction_share_pct: overproduction_share(
                metrics.excess_energy(),
                metrics.total_wind,
                metrics.total_solar,
            ),
            prices,
            baseload_cost_fixed: per_mwh(baseload_delivered_cost(
                &in_baseload,
                missing,
                p.missing_energy_price,
                baseload_energy,
            )),
            baseload_cost_vwap: per_mwh(baseload_delivered_cost(
                &in_baseload,
                missing,
                prices.missing_vwap,
                baseload_energy,
            )),
            break_even_fixed: per_mwh(break_even_price(
                &all_production,
                fixed_revenue,
                missing,
                p.missing_energy_price,
                baseload_energy,
            )),
            break_even_vwap: per_mwh(break_even_price(
                &all_production,
                fixed_revenue,
                missing,
                prices.missing_vwap,
                baseload_energy,
            )),
            break_even_market: per_mwh(break_even_price(
                &all_production,
                market_revenue,
                missing,
                prices.missing_vwap,
                baseload_energy,
            )),
            storage,
        }
    }

    pub fn excess_energy_mwh(&self) -> f64 {
        self.excess_wind_mwh + self.excess_solar_mwh
    }

    pub fn redundant_energy_mwh(&self) -> f64 {
        self.redundant_wind_mwh + self.redundant_solar_mwh
    }
}

/// Storage unit names across all results, in order of first appearance.
pub fn storage_names(results: &[YearlyResult]) -> Vec<&str> {
    let mut names: Vec<&str> = Vec::new();
    for s in results.iter().flat_map(|r| &r.storage) {
        if !names.contains(&s.name.as_str()) {
            names.push(&s.name);
        }
    }
    names
}

impl fmt::Display for YearlyResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Year {} (simulation {}) ---", self.year, self.simulation_id)?;
        writeln!(
            f,
            "Production:            wind {:.1} MWh, solar {:.1} MWh",
            self.total_wind_mwh, self.total_solar_mwh
        )?;
        writeln!(
            f,
            "Baseload delivered:    {:.1} of {:.1} MWh ({:.2}%)",
            self.produced_to_baseload_mwh, self.baseload_energy_mwh, self.res_share_pct
        )?;
        writeln!(
            f,
            "Green hours:           {} of {} ({:.2}%)",
            self.green_hours, self.hours, self.green_hours_pct
        )?;
        writeln!(
            f,
            "Missing energy:        {:.1} MWh (VWAP {:.4} EUR/MWh)",
            self.missing_energy_mwh, self.prices.missing_vwap
        )?;
        writeln!(
            f,
            "Excess energy:         {:.1} MWh (VWAP {:.4} EUR/MWh, {:.2}% of production)",
            self.excess_energy_mwh(),
            self.prices.excess_vwap,
            self.overproduction_share_pct
        )?;
        writeln!(
            f,
            "Redundant energy:      {:.1} MWh ({:.2}% of production)",
            self.redundant_energy_mwh(),
            self.redundant_share_pct
        )?;
        writeln!(
            f,
            "Baseload cost:         {:.2} EUR/MWh fixed, {:.2} EUR/MWh VWAP",
            self.baseload_cost_fixed, self.baseload_cost_vwap
        )?;
        write!(
            f,
            "Break-even:            {:.2} fixed, {:.2} VWAP, {:.2} market (EUR/MWh)",
            self.break_even_fixed, self.break_even_vwap, self.break_even_market
        )?;
        for s in &self.storage {
            write!(
                f,
                "\n{:<22} {:.2} cycles/day, {:.2}% zero hours",
                format!("{}:", s.name),
                s.avg_daily_cycles,
                s.zero_hours_pct
            )?;
        }
        Ok(())
    }
}
