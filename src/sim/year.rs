//! Yearly driver: runs the hourly dispatch over one calendar year.

use chrono::NaiveDateTime;
use log::{debug, info};

use super::dispatch::simulate_hour;
use super::kpi::YearlyResult;
use super::metrics::YearlyMetrics;
use super::types::{HourInput, HourlyRecord, StorageYearStats};
use crate::config::{BaseloadShape, ScenarioConfig};
use crate::finance::round_to;
use crate::profiles::{InputError, MarketTable};
use crate::storage::StorageUnit;

/// Decimal places kept from hourly production readings.
const PRODUCTION_DECIMALS: i32 = 3;

/// Production of one calendar year, in MW, on a chronological hourly index.
#[derive(Debug, Clone, Copy)]
pub struct YearInput<'a> {
    pub year: i32,
    pub timestamps: &'a [NaiveDateTime],
    pub wind_mw: &'a [f64],
    pub solar_mw: &'a [f64],
}

impl YearInput<'_> {
    pub fn hours(&self) -> usize {
        self.timestamps.len()
    }
}

/// Hourly baseload targets for the year.
///
/// Flat targets equal `baseload.mw`. Consumption-shaped targets are
/// `baseload.mw * consumption / mean(consumption)` over the year.
///
/// # Errors
///
/// Returns an `InputError` if a market row or, in consumption mode, a
/// consumption value is missing, or the yearly mean consumption is zero.
pub fn baseload_targets(
    input: &YearInput<'_>,
    market: &MarketTable,
    config: &ScenarioConfig,
) -> Result<Vec<f64>, InputError> {
    let mw = config.baseload.mw;
    match config.baseload.shape {
        BaseloadShape::Flat => Ok(vec![mw; input.hours()]),
        BaseloadShape::Consumption => {
            let consumption = input
                .timestamps
                .iter()
                .map(|&timestamp| {
                    market
                        .lookup(timestamp)?
                        .consumption
                        .ok_or(InputError::MissingConsumption { timestamp })
                })
                .collect::<Result<Vec<f64>, _>>()?;

            let mean = consumption.iter().sum::<f64>() / consumption.len().max(1) as f64;
            if mean <= 0.0 {
                return Err(InputError::ZeroConsumption { year: input.year });
            }
            Ok(consumption.iter().map(|c| mw * c / mean).collect())
        }
    }
}

/// Reads per-unit statistics for the year; call before resetting yearly counters.
pub fn storage_stats<S: StorageUnit>(storages: &[S], hours: usize) -> Vec<StorageYearStats> {
    let hours = hours as f64;
    storages
        .iter()
        .map(|s| {
            let (avg_daily_cycles, zero_hours_pct) = if hours > 0.0 {
                (
                    round_to(s.average_cycles_per_year() / (hours / 24.0), 2),
                    round_to(f64::from(s.zero_hours()) / hours * 100.0, 2),
                )
            } else {
                (0.0, 0.0)
            };
            StorageYearStats {
                name: s.name().to_string(),
                power_mw: s.power_mw(),
                energy_mwh: s.energy_mwh(),
                avg_daily_cycles,
                zero_hours_pct,
            }
        })
        .collect()
}

/// Simulates one calendar year hour by hour.
///
/// Market rows and baseload targets are resolved for every hour before any
/// storage state changes, so an input error leaves the fleet untouched.
///
/// # Arguments
///
/// * `input` - The year's production in MW
/// * `market` - Spot prices (and consumption) by timestamp
/// * `config` - Scenario parameters
/// * `storages` - Fleet in dispatch order; mutated hour by hour
///
/// # Errors
///
/// Returns an `InputError` on misaligned or incomplete input.
pub fn simulate_year<S: StorageUnit>(
    input: &YearInput<'_>,
    market: &MarketTable,
    config: &ScenarioConfig,
    storages: &mut [S],
) -> Result<(YearlyResult, Vec<HourlyRecord>), InputError> {
    if input.wind_mw.len() != input.hours() || input.solar_mw.len() != input.hours() {
        return Err(InputError::LengthMismatch {
            timestamps: input.hours(),
            wind: input.wind_mw.len(),
            solar: input.solar_mw.len(),
        });
    }
    if input.hours() == 0 {
        return Err(InputError::Empty);
    }

    let spots = input
        .timestamps
        .iter()
        .map(|&t| market.lookup(t).map(|row| row.spot))
        .collect::<Result<Vec<f64>, _>>()?;
    let targets = baseload_targets(input, market, config)?;

    let mut metrics = YearlyMetrics::new();
    let mut records = Vec::with_capacity(input.hours());
    for (i, &timestamp) in input.timestamps.iter().enumerate() {
        let hour = HourInput {
            timestamp,
            wind_mw: round_to(input.wind_mw[i], PRODUCTION_DECIMALS),
            solar_mw: round_to(input.solar_mw[i], PRODUCTION_DECIMALS),
            baseload_mw: targets[i],
            grid_connection_mw: config.plant.grid_connection_mw,
        };
        let outcome = simulate_hour(&hour, storages, &mut metrics);
        records.push(HourlyRecord::new(&hour, &outcome, spots[i]));
    }

    metrics.finish();
    debug!("Year {} accumulators: {:?}", input.year, metrics);

    let stats = storage_stats(storages, input.hours());
    let result = YearlyResult::compile(input.year, &records, &metrics, config, stats);

    info!(
        "Year {}: {}/{} hours met, missing {:.1} MWh, excess {:.1} MWh, break-even {:.2} EUR/MWh",
        result.year,
        result.green_hours,
        result.hours,
        result.missing_energy_mwh,
        result.excess_energy_mwh(),
        result.break_even_fixed
    );

    Ok((result, records))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profiles::MarketRow;
    use crate::storage::StorageAsset;
    use chrono::{Duration, NaiveDate};
    use float_cmp::assert_approx_eq;

    struct Fixture {
        timestamps: Vec<NaiveDateTime>,
        wind: Vec<f64>,
        solar: Vec<f64>,
        market: MarketTable,
    }

    impl Fixture {
        fn new(wind: Vec<f64>, spot: f64, consumption: Option<f64>) -> Self {
            let start = NaiveDate::from_ymd_opt(2023, 6, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap();
            let timestamps: Vec<_> = (0..wind.len())
                .map(|h| start + Duration::hours(h as i64))
                .collect();
            let market = MarketTable::from_rows(
                timestamps
                    .iter()
                    .map(|&t| (t, MarketRow { spot, consumption })),
            )
            .unwrap();
            Self {
                solar: vec![0.0; wind.len()],
                timestamps,
                wind,
                market,
            }
        }

        fn input(&self) -> YearInput<'_> {
            YearInput {
                year: 2023,
                timestamps: &self.timestamps,
                wind_mw: &self.wind,
                solar_mw: &self.solar,
            }
        }
    }

    fn config(baseload: f64) -> ScenarioConfig {
        let mut config = ScenarioConfig::default();
        config.baseload.mw = baseload;
        config
    }

    #[test]
    fn test_flat_targets() {
        let fx = Fixture::new(vec![1.0; 3], 10.0, None);
        let targets = baseload_targets(&fx.input(), &fx.market, &config(5.0)).unwrap();
        assert_eq!(targets, vec![5.0; 3]);
    }

    #[test]
    fn test_consumption_targets_keep_mean() {
        let mut fx = Fixture::new(vec![1.0; 2], 10.0, None);
        fx.market = MarketTable::from_rows([
            (
                fx.timestamps[0],
                MarketRow {
                    spot: 10.0,
                    consumption: Some(1.0),
                },
            ),
            (
                fx.timestamps[1],
                MarketRow {
                    spot: 10.0,
                    consumption: Some(3.0),
                },
            ),
        ])
        .unwrap();
        let mut cfg = config(10.0);
        cfg.baseload.shape = BaseloadShape::Consumption;
        let targets = baseload_targets(&fx.input(), &fx.market, &cfg).unwrap();
        assert_approx_eq!(f64, targets[0], 5.0);
        assert_approx_eq!(f64, targets[1], 15.0);
    }

    #[test]
    fn test_consumption_required() {
        let fx = Fixture::new(vec![1.0; 2], 10.0, None);
        let mut cfg = config(10.0);
        cfg.baseload.shape = BaseloadShape::Consumption;
        let err = baseload_targets(&fx.input(), &fx.market, &cfg).unwrap_err();
        assert!(matches!(err, InputError::MissingConsumption { .. }));
    }

    #[test]
    fn test_zero_consumption_rejected() {
        let fx = Fixture::new(vec![1.0; 2], 10.0, Some(0.0));
        let mut cfg = config(10.0);
        cfg.baseload.shape = BaseloadShape::Consumption;
        let err = baseload_targets(&fx.input(), &fx.market, &cfg).unwrap_err();
        assert_eq!(err, InputError::ZeroConsumption { year: 2023 });
    }

    #[test]
    fn test_missing_market_row_fails_before_dispatch() {
        let mut fx = Fixture::new(vec![20.0; 3], 10.0, None);
        fx.market = MarketTable::from_rows(fx.timestamps[..2].iter().map(|&t| {
            (
                t,
                MarketRow {
                    spot: 10.0,
                    consumption: None,
                },
            )
        }))
        .unwrap();
        let mut storages = vec![StorageAsset::new("BESS 1h", 5.0, 5.0, 1.0)];
        let err = simulate_year(&fx.input(), &fx.market, &config(10.0), &mut storages).unwrap_err();
        assert_eq!(
            err,
            InputError::Alignment {
                timestamp: fx.timestamps[2]
            }
        );
        assert_eq!(storages[0].soc_mwh(), 0.0);
    }

    #[test]
    fn test_rounds_production_to_three_decimals() {
        let fx = Fixture::new(vec![10.00049, 9.99951], 10.0, None);
        let mut storages: Vec<StorageAsset> = Vec::new();
        let (result, records) =
            simulate_year(&fx.input(), &fx.market, &config(10.0), &mut storages).unwrap();
        assert_eq!(records[0].wind_mw, 10.0);
        assert_eq!(records[1].wind_mw, 10.0);
        assert_eq!(result.green_hours, 2);
        assert_eq!(result.missing_energy_mwh, 0.0);
    }

    #[test]
    fn test_year_with_storage_cycle() {
        // Surplus hour charges, shortfall hour discharges
        let fx = Fixture::new(vec![14.0, 6.0], 50.0, None);
        let mut storages = vec![StorageAsset::new("BESS 4h", 4.0, 16.0, 0.81)];
        let (result, records) =
            simulate_year(&fx.input(), &fx.market, &config(10.0), &mut storages).unwrap();

        assert_approx_eq!(f64, records[0].storage_charged_mwh, 4.0);
        // 3.6 stored, 3.24 delivered
        assert_approx_eq!(f64, records[1].storage_discharged_mwh, 3.24, epsilon = 1e-12);
        assert_approx_eq!(f64, records[1].missing_energy_mwh, 0.76, epsilon = 1e-12);

        // Yearly missing energy is netted against both legs' losses (0.4 + 0.36)
        assert_approx_eq!(f64, result.cycle_loss_mwh, 0.76, epsilon = 1e-12);
        assert!(result.missing_energy_mwh < 1e-9);
        assert_eq!(result.green_hours, 1);
        assert_eq!(result.storage.len(), 1);
        // 3.6 MWh raw over 16 MWh capacity across 2/24 of a day
        assert_approx_eq!(f64, result.storage[0].avg_daily_cycles, 2.7);
    }

    #[test]
    fn test_storage_stats_percentages() {
        let mut storage = StorageAsset::new("BESS 1h", 1.0, 1.0, 1.0);
        let t = NaiveDate::from_ymd_opt(2023, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        storage.discharge(1.0, t);
        let stats = storage_stats(&[storage], 8);
        assert_approx_eq!(f64, stats[0].zero_hours_pct, 12.5);
        assert_eq!(stats[0].avg_daily_cycles, 0.0);
        assert_eq!(stats[0].name, "BESS 1h");
    }
}
