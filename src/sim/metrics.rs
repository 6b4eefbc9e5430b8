//! Running yearly totals updated by the hourly dispatch step.

/// Mutable accumulator scoped to one simulated year (all values MWh unless noted).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct YearlyMetrics {
    /// Total wind production.
    pub total_wind: f64,
    /// Total solar production.
    pub total_solar: f64,
    /// Energy delivered to the baseload, direct and from storage.
    pub produced_to_baseload: f64,
    /// Hours in which the target was fully met.
    pub hours_met: u32,
    /// Wind energy in the baseload, direct and via storage.
    pub wind_in_baseload: f64,
    /// Solar energy in the baseload, direct and via storage.
    pub solar_in_baseload: f64,
    /// Wind surplus neither stored nor exported.
    pub redundant_wind: f64,
    /// Solar surplus neither stored nor exported.
    pub redundant_solar: f64,
    /// Exported wind surplus.
    pub excess_wind: f64,
    /// Exported solar surplus.
    pub excess_solar: f64,
    /// Uncovered baseload energy.
    pub missing_energy: f64,
    /// Raw wind energy sent into storage.
    pub charged_wind: f64,
    /// Raw solar energy sent into storage.
    pub charged_solar: f64,
    /// Charge and discharge losses.
    pub cycle_loss_total: f64,
}

impl YearlyMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn excess_energy(&self) -> f64 {
        self.excess_wind + self.excess_solar
    }

    pub fn redundant_energy(&self) -> f64 {
        self.redundant_wind + self.redundant_solar
    }

    pub fn total_production(&self) -> f64 {
        self.total_wind + self.total_solar
    }

    pub fn charged_energy(&self) -> f64 {
        self.charged_wind + self.charged_solar
    }

    /// Closes the year: storage losses are netted against missing energy, floored at zero.
    pub fn finish(&mut self) {
        self.missing_energy = (self.missing_energy - self.cycle_loss_total).max(0.0);
    }
}
