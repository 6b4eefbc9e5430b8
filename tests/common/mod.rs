//! Shared test fixtures for integration tests.
#![allow(dead_code)]

use baseload_sim::config::{BessConfig, ScenarioConfig};
use baseload_sim::profiles::{MarketRow, MarketTable, ProfileSet, synthetic};
use chrono::{Duration, NaiveDate, NaiveDateTime};

/// Seeded synthetic per-MW profiles starting on 1 January 2023.
pub fn synthetic_profiles(years: u32) -> ProfileSet {
    synthetic::generate(2023, years, 42).unwrap()
}

/// `n` consecutive hourly timestamps starting at `start`.
pub fn hourly_timestamps(start: NaiveDateTime, n: usize) -> Vec<NaiveDateTime> {
    (0..n as i64).map(|h| start + Duration::hours(h)).collect()
}

/// Midnight of the given date.
pub fn midnight(year: i32, month: u32, day: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

/// Market table with the same spot price for every timestamp and no consumption.
pub fn flat_market(timestamps: &[NaiveDateTime], spot: f64) -> MarketTable {
    MarketTable::from_rows(timestamps.iter().map(|&t| {
        (
            t,
            MarketRow {
                spot,
                consumption: None,
            },
        )
    }))
    .unwrap()
}

/// Scenario with a flat baseload and one battery per `(duration_h, power_mw)`.
pub fn scenario(baseload_mw: f64, bess: &[(u32, f64)]) -> ScenarioConfig {
    let mut config = ScenarioConfig::default();
    config.baseload.mw = baseload_mw;
    config.storage.bess = bess
        .iter()
        .map(|&(duration_h, power_mw)| BessConfig {
            duration_h,
            power_mw,
            annual_payment: 100_000.0 * f64::from(duration_h),
        })
        .collect();
    config
}
