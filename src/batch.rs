//! Batch mode: one scenario per row of a batch table, run against shared profiles.

use anyhow::{Context, Result, bail};
use log::info;
use serde::Deserialize;

use crate::config::{BessConfig, HydroConfig, ScenarioConfig};
use crate::profiles::ProfileSet;
use crate::sim::{YearlyResult, simulate_scenario};

/// Battery durations that have their own batch columns.
pub const BATCH_DURATIONS: [u32; 5] = [1, 2, 4, 6, 8];

/// One row of a batch table. Empty or absent cells count as zero.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct BatchRow {
    pub grid_connection: Option<f64>,
    pub wind_cap: Option<f64>,
    pub solar_cap: Option<f64>,
    pub baseload: Option<f64>,
    pub wind_price: Option<f64>,
    pub solar_price: Option<f64>,
    pub battery_1h_mw: Option<f64>,
    pub battery_2h_mw: Option<f64>,
    pub battery_4h_mw: Option<f64>,
    pub battery_6h_mw: Option<f64>,
    pub battery_8h_mw: Option<f64>,
    pub battery_1h_price: Option<f64>,
    pub battery_2h_price: Option<f64>,
    pub battery_4h_price: Option<f64>,
    pub battery_6h_price: Option<f64>,
    pub battery_8h_price: Option<f64>,
    pub hydro_mw: Option<f64>,
    pub hydro_storage_price: Option<f64>,
    pub missing_energy_price: Option<f64>,
    pub wind_excess_price: Option<f64>,
    pub solar_excess_price: Option<f64>,
}

fn cell(value: Option<f64>) -> f64 {
    value.unwrap_or(0.0)
}

impl BatchRow {
    /// `(duration_h, power_mw, annual_payment)` for each battery column group.
    fn batteries(&self) -> [(u32, f64, f64); BATCH_DURATIONS.len()] {
        [
            (1, cell(self.battery_1h_mw), cell(self.battery_1h_price)),
            (2, cell(self.battery_2h_mw), cell(self.battery_2h_price)),
            (4, cell(self.battery_4h_mw), cell(self.battery_4h_price)),
            (6, cell(self.battery_6h_mw), cell(self.battery_6h_price)),
            (8, cell(self.battery_8h_mw), cell(self.battery_8h_price)),
        ]
    }

    /// Builds the scenario for this row on top of `base`.
    ///
    /// The row replaces the plant, baseload level, storage fleet and prices;
    /// efficiencies, baseload shape, dispatch priority and SOC carry-over come
    /// from `base`. A zero grid connection means no export limit, and storage
    /// columns that are all zero leave the unit out.
    pub fn to_scenario(&self, base: &ScenarioConfig, id: u32) -> ScenarioConfig {
        let mut config = base.clone();
        config.simulation.id = id;

        config.plant.wind_capacity_mw = cell(self.wind_cap);
        config.plant.solar_capacity_mw = cell(self.solar_cap);
        config.plant.grid_connection_mw = self.grid_connection.filter(|g| *g > 0.0);
        config.baseload.mw = cell(self.baseload);

        config.storage.bess = self
            .batteries()
            .into_iter()
            .filter(|&(_, power_mw, annual_payment)| power_mw != 0.0 || annual_payment != 0.0)
            .map(|(duration_h, power_mw, annual_payment)| BessConfig {
                duration_h,
                power_mw,
                annual_payment,
            })
            .collect();

        let (hydro_mw, hydro_payment) = (cell(self.hydro_mw), cell(self.hydro_storage_price));
        config.storage.hydro = (hydro_mw != 0.0 || hydro_payment != 0.0).then(|| HydroConfig {
            power_mw: hydro_mw,
            annual_payment: hydro_payment,
            ..base.storage.hydro.clone().unwrap_or_default()
        });

        let prices = &mut config.prices;
        prices.wind_price = cell(self.wind_price);
        prices.solar_price = cell(self.solar_price);
        prices.missing_energy_price = cell(self.missing_energy_price);
        prices.wind_excess_price = cell(self.wind_excess_price);
        prices.solar_excess_price = cell(self.solar_excess_price);

        config
    }
}

/// Runs every batch row against the same per-MW profiles and concatenates the yearly results.
///
/// Rows are numbered from 1 and the number becomes the simulation id.
///
/// # Errors
///
/// Returns an error naming the row if its scenario is invalid or the
/// simulation fails.
pub fn run_batch(
    rows: &[BatchRow],
    base: &ScenarioConfig,
    profiles: &ProfileSet,
) -> Result<Vec<YearlyResult>> {
    let mut results = Vec::new();
    for (i, row) in rows.iter().enumerate() {
        let id = u32::try_from(i + 1).context("too many batch rows")?;
        let config = row.to_scenario(base, id);

        let errors = config.validate();
        if !errors.is_empty() {
            let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
            bail!("batch row {id} is invalid:\n  {}", messages.join("\n  "));
        }

        info!("Running batch row {id} of {}", rows.len());
        let output = simulate_scenario(profiles, &config)
            .with_context(|| format!("batch row {id} failed"))?;
        results.extend(output.yearly);
    }
    Ok(results)
}
