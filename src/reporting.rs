//! Human-readable console report for yearly results.

use std::fmt::{self, Write as _};

use crate::finance::round_to;
use crate::sim::YearlyResult;
use crate::sim::kpi::storage_names;
use crate::sim::types::StorageYearStats;

/// Mean of every numeric yearly field over several years.
///
/// Counts (hours, green hours) become fractional means. Storage statistics are
/// averaged per unit name over the years in which that unit appears.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct YearlyMean {
    pub years: usize,
    pub hours: f64,
    pub wind_capacity_mw: f64,
    pub solar_capacity_mw: f64,
    pub baseload_mw: f64,
    pub grid_connection_mw: f64,
    pub total_wind_mwh: f64,
    pub total_solar_mwh: f64,
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
    pub green_hours: f64,
    pub green_hours_pct: f64,
    pub res_share_pct: f64,
    pub redundant_share_pct: f64,
    pub overproduction_share_pct: f64,
    pub missing_vwap: f64,
    pub excess_vwap: f64,
    pub wind_vwap: f64,
    pub solar_vwap: f64,
    pub avg_spot: f64,
    pub baseload_cost_fixed: f64,
    pub baseload_cost_vwap: f64,
    pub break_even_fixed: f64,
    pub break_even_vwap: f64,
    pub break_even_market: f64,
    pub storage: Vec<StorageYearStats>,
}

fn mean_of(values: impl Iterator<Item = f64>, decimals: i32) -> f64 {
    let (sum, n) = values.fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    if n == 0 {
        0.0
    } else {
        round_to(sum / n as f64, decimals)
    }
}

impl YearlyMean {
    /// Averages `results`; `None` when there is nothing to average.
    pub fn from_results(results: &[YearlyResult]) -> Option<Self> {
        if results.is_empty() {
            return None;
        }
        let mean = |f: fn(&YearlyResult) -> f64| mean_of(results.iter().map(f), 2);
        let mean_vwap = |f: fn(&YearlyResult) -> f64| mean_of(results.iter().map(f), 4);

        let storage = storage_names(results)
            .into_iter()
            .map(|name| {
                let units = || {
                    results
                        .iter()
                        .flat_map(|r| &r.storage)
                        .filter(move |s| s.name == name)
                };
                StorageYearStats {
                    name: name.to_string(),
                    power_mw: mean_of(units().map(|s| s.power_mw), 3),
                    energy_mwh: mean_of(units().map(|s| s.energy_mwh), 3),
                    avg_daily_cycles: mean_of(units().map(|s| s.avg_daily_cycles), 2),
                    zero_hours_pct: mean_of(units().map(|s| s.zero_hours_pct), 2),
                }
            })
            .collect();

        Some(Self {
            years: results.len(),
            hours: mean(|r| r.hours as f64),
            wind_capacity_mw: mean(|r| r.wind_capacity_mw),
            solar_capacity_mw: mean(|r| r.solar_capacity_mw),
            baseload_mw: mean(|r| r.baseload_mw),
            grid_connection_mw: mean(|r| r.grid_connection_mw),
            total_wind_mwh: mean(|r| r.total_wind_mwh),
            total_solar_mwh: mean(|r| r.total_solar_mwh),
            baseload_energy_mwh: mean(|r| r.baseload_energy_mwh),
            produced_to_baseload_mwh: mean(|r| r.produced_to_baseload_mwh),
            wind_in_baseload_mwh: mean(|r| r.wind_in_baseload_mwh),
            solar_in_baseload_mwh: mean(|r| r.solar_in_baseload_mwh),
            excess_wind_mwh: mean(|r| r.excess_wind_mwh),
            excess_solar_mwh: mean(|r| r.excess_solar_mwh),
            redundant_wind_mwh: mean(|r| r.redundant_wind_mwh),
            redundant_solar_mwh: mean(|r| r.redundant_solar_mwh),
            charged_wind_mwh: mean(|r| r.charged_wind_mwh),
            charged_solar_mwh: mean(|r| r.charged_solar_mwh),
            missing_energy_mwh: mean(|r| r.missing_energy_mwh),
            cycle_loss_mwh: mean(|r| r.cycle_loss_mwh),
            green_hours: mean(|r| f64::from(r.green_hours)),
            green_hours_pct: mean(|r| r.green_hours_pct),
            res_share_pct: mean(|r| r.res_share_pct),
            redundant_share_pct: mean(|r| r.redundant_share_pct),
            overproduction_share_pct: mean(|r| r.overproduction_share_pct),
            missing_vwap: mean_vwap(|r| r.prices.missing_vwap),
            excess_vwap: mean_vwap(|r| r.prices.excess_vwap),
            wind_vwap: mean_vwap(|r| r.prices.wind_vwap),
            solar_vwap: mean_vwap(|r| r.prices.solar_vwap),
            avg_spot: mean(|r| r.prices.avg_spot),
            baseload_cost_fixed: mean(|r| r.baseload_cost_fixed),
            baseload_cost_vwap: mean(|r| r.baseload_cost_vwap),
            break_even_fixed: mean(|r| r.break_even_fixed),
            break_even_vwap: mean(|r| r.break_even_vwap),
            break_even_market: mean(|r| r.break_even_market),
            storage,
        })
    }

    pub fn excess_energy_mwh(&self) -> f64 {
        self.excess_wind_mwh + self.excess_solar_mwh
    }

    pub fn redundant_energy_mwh(&self) -> f64 {
        self.redundant_wind_mwh + self.redundant_solar_mwh
    }
}

impl fmt::Display for YearlyMean {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Mean over {} years ---", self.years)?;
        writeln!(
            f,
            "Production:            wind {:.1} MWh, solar {:.1} MWh",
            self.total_wind_mwh, self.total_solar_mwh
        )?;
        writeln!(
            f,
            "Baseload delivered:    {:.1} of {:.1} MWh ({:.2}%), green hours {:.2}%",
            self.produced_to_baseload_mwh,
            self.baseload_energy_mwh,
            self.res_share_pct,
            self.green_hours_pct
        )?;
        writeln!(
            f,
            "Missing energy:        {:.1} MWh (VWAP {:.4} EUR/MWh)",
            self.missing_energy_mwh, self.missing_vwap
        )?;
        writeln!(
            f,
            "Excess energy:         {:.1} MWh (VWAP {:.4} EUR/MWh, {:.2}% of production)",
            self.excess_energy_mwh(),
            self.excess_vwap,
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
            "Spot:                  {:.2} average, {:.4} wind VWAP, {:.4} solar VWAP (EUR/MWh)",
            self.avg_spot, self.wind_vwap, self.solar_vwap
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

/// Renders every yearly result followed by the multi-year mean (only when
/// there is more than one year).
pub fn format_report(results: &[YearlyResult]) -> String {
    let mut out = String::new();
    for r in results {
        // Writing to a String cannot fail
        let _ = writeln!(out, "{r}\n");
    }
    if results.len() > 1 {
        if let Some(mean) = YearlyMean::from_results(results) {
            let _ = writeln!(out, "{mean}");
        }
    }
    out
}

/// Prints the report to stdout.
pub fn print_report(results: &[YearlyResult]) {
    print!("{}", format_report(results));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScenarioConfig;
    use crate::sim::metrics::YearlyMetrics;
    use float_cmp::assert_approx_eq;

    fn unit(name: &str, cycles: f64, zero_pct: f64) -> StorageYearStats {
        StorageYearStats {
            name: name.to_string(),
            power_mw: 10.0,
            energy_mwh: 40.0,
            avg_daily_cycles: cycles,
            zero_hours_pct: zero_pct,
        }
    }

    fn result(year: i32, wind: f64, green_pct: f64, storage: Vec<StorageYearStats>) -> YearlyResult {
        let mut r = YearlyResult::compile(
            year,
            &[],
            &YearlyMetrics::new(),
            &ScenarioConfig::default(),
            storage,
        );
        r.total_wind_mwh = wind;
        r.green_hours_pct = green_pct;
        r.excess_wind_mwh = wind / 10.0;
        r.prices.missing_vwap = wind / 3.0;
        r
    }

    #[test]
    fn mean_of_nothing_is_none() {
        assert!(YearlyMean::from_results(&[]).is_none());
    }

    #[test]
    fn mean_averages_numeric_fields() {
        let mean = YearlyMean::from_results(&[
            result(2023, 100.0, 50.0, vec![unit("BESS 4h", 0.5, 10.0)]),
            result(
                2024,
                300.0,
                75.0,
                vec![unit("BESS 4h", 1.0, 20.0), unit("BESS 1h", 2.0, 5.0)],
            ),
        ])
        .unwrap();
        assert_eq!(mean.years, 2);
        assert_approx_eq!(f64, mean.total_wind_mwh, 200.0);
        assert_approx_eq!(f64, mean.green_hours_pct, 62.5);
        assert_approx_eq!(f64, mean.excess_wind_mwh, 20.0);
        assert_approx_eq!(f64, mean.excess_energy_mwh(), 20.0);
        // (33.3333 + 100) / 2, kept at 4 decimals
        assert_approx_eq!(f64, mean.missing_vwap, 66.6667, epsilon = 1e-9);

        let names: Vec<&str> = mean.storage.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["BESS 4h", "BESS 1h"]);
        assert_approx_eq!(f64, mean.storage[0].avg_daily_cycles, 0.75);
        assert_approx_eq!(f64, mean.storage[0].zero_hours_pct, 15.0);
        // Only present in one year
        assert_approx_eq!(f64, mean.storage[1].avg_daily_cycles, 2.0);
    }

    #[test]
    fn report_includes_mean_only_for_several_years() {
        let single = format_report(&[result(2023, 100.0, 50.0, Vec::new())]);
        assert!(single.contains("Year 2023"));
        assert!(!single.contains("Mean over"));

        let both = format_report(&[
            result(2023, 100.0, 50.0, Vec::new()),
            result(2024, 300.0, 75.0, vec![unit("BESS 2h", 1.0, 0.0)]),
        ]);
        assert!(both.contains("Year 2024"));
        assert!(both.contains("Mean over 2 years"));
        assert!(both.contains("BESS 2h:"));
    }
}
