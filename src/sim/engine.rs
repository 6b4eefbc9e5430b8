//! Multi-year orchestration over the storage fleet.

use log::debug;

use super::calendar::YearSpans;
use super::kpi::YearlyResult;
use super::types::HourlyRecord;
use super::year::{YearInput, simulate_year};
use crate::config::ScenarioConfig;
use crate::profiles::{InputError, MarketTable, ProductionProfile, ProfileSet};
use crate::storage::{StorageAsset, StorageUnit, create_storages};

/// Rejects a scenario that fails [`ScenarioConfig::validate`] before any
/// storage is built from it.
fn check_config(config: &ScenarioConfig) -> Result<(), InputError> {
    let errors = config.validate();
    if errors.is_empty() {
        Ok(())
    } else {
        Err(InputError::InvalidScenario {
            errors: errors.iter().map(ToString::to_string).collect(),
        })
    }
}

/// Results of a full run: one row per calendar year plus every simulated hour.
#[derive(Debug, Clone, Default)]
pub struct SimulationOutput {
    pub yearly: Vec<YearlyResult>,
    pub hourly: Vec<HourlyRecord>,
}

/// Simulation engine owning the storage fleet and scenario.
///
/// Generic over `S: StorageUnit` for static dispatch. The fleet is kept
/// across years; yearly counters are reset after each year is reported and
/// stored energy is emptied at the start of a year unless
/// `simulation.carry_over_soc` is set.
pub struct Engine<'a, S: StorageUnit> {
    config: &'a ScenarioConfig,
    storages: Vec<S>,
}

impl<'a, S: StorageUnit> Engine<'a, S> {
    /// Creates an engine with a fleet already in dispatch order.
    pub fn new(config: &'a ScenarioConfig, storages: Vec<S>) -> Self {
        Self { config, storages }
    }

    pub fn storages(&self) -> &[S] {
        &self.storages
    }

    /// Simulates one year and performs the year-boundary bookkeeping.
    ///
    /// # Errors
    ///
    /// Returns an `InputError` on misaligned or incomplete input.
    pub fn run_year(
        &mut self,
        input: &YearInput<'_>,
        market: &MarketTable,
    ) -> Result<(YearlyResult, Vec<HourlyRecord>), InputError> {
        if !self.config.simulation.carry_over_soc {
            self.storages.iter_mut().for_each(S::empty);
        }

        let output = simulate_year(input, market, self.config, &mut self.storages)?;

        for storage in &mut self.storages {
            storage.reset_yearly_energy();
            storage.reset_yearly_zero_hours();
        }
        Ok(output)
    }

    /// Simulates every calendar year present in `production` (MW), in order.
    ///
    /// # Errors
    ///
    /// Returns an `InputError` if the scenario is invalid or any year fails;
    /// nothing is returned for the years before it.
    pub fn run(
        &mut self,
        production: &ProductionProfile,
        market: &MarketTable,
    ) -> Result<SimulationOutput, InputError> {
        check_config(self.config)?;
        if production.is_empty() {
            return Err(InputError::Empty);
        }

        let mut output = SimulationOutput::default();
        for (year, range) in YearSpans::new(production.timestamps()) {
            debug!("Simulating {year}: {} hours", range.len());
            let input = YearInput {
                year,
                timestamps: &production.timestamps()[range.clone()],
                wind_mw: &production.wind()[range.clone()],
                solar_mw: &production.solar()[range],
            };
            let (result, records) = self.run_year(&input, market)?;
            output.yearly.push(result);
            output.hourly.extend(records);
        }
        Ok(output)
    }
}

/// Runs the dispatch simulation for production already expressed in MW.
///
/// # Errors
///
/// Returns an `InputError` on an invalid scenario or on misaligned or
/// incomplete input.
pub fn simulate_dispatch(
    production: &ProductionProfile,
    market: &MarketTable,
    config: &ScenarioConfig,
) -> Result<SimulationOutput, InputError> {
    check_config(config)?;
    let storages: Vec<StorageAsset> = create_storages(&config.storage, config.simulation.priority);
    Engine::new(config, storages).run(production, market)
}

/// Scales per-MW profiles by the installed capacities and runs the simulation.
///
/// # Errors
///
/// Returns an `InputError` on misaligned or incomplete input.
pub fn simulate_scenario(
    profiles: &ProfileSet,
    config: &ScenarioConfig,
) -> Result<SimulationOutput, InputError> {
    let production = profiles.production.scaled(
        config.plant.wind_capacity_mw,
        config.plant.solar_capacity_mw,
    );
    simulate_dispatch(&production, &profiles.market, config)
}
