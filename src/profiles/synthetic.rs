//! Seeded synthetic hourly profiles for running without input files.
//!
//! Wind follows an AR(1) process around a seasonal mean, solar is a daylight
//! sinusoid whose length and height follow the season and which is dimmed by
//! an AR(1) cloud multiplier, and spot prices combine a daily shape with a
//! merit-order dip when wind is high.

use std::f64::consts::PI;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Timelike};
use rand::{Rng, SeedableRng, rngs::StdRng};

use super::series::{InputError, MarketRow, MarketTable, ProductionProfile, ProfileSet};

/// AR(1) persistence of the wind capacity factor.
const WIND_ALPHA: f64 = 0.95;
/// Innovation noise of the wind capacity factor.
const WIND_NOISE_STD: f64 = 0.05;
/// Mean wind capacity factor over the year.
const WIND_MEAN: f64 = 0.35;

/// AR(1) persistence of the cloud multiplier.
const CLOUD_ALPHA: f64 = 0.9;
const CLOUD_NOISE_STD: f64 = 0.2;
const CLOUD_MIN: f64 = 0.2;
const CLOUD_MAX: f64 = 1.0;

const SPOT_BASE: f64 = 60.0;
const SPOT_NOISE_STD: f64 = 8.0;
/// Price drop per unit of wind capacity factor above the mean (EUR/MWh).
const SPOT_WIND_SENSITIVITY: f64 = 40.0;

/// Gaussian noise via the Box-Muller transform.
fn gaussian_noise(rng: &mut StdRng, std_dev: f64) -> f64 {
    if std_dev <= 0.0 {
        return 0.0;
    }

    let u1: f64 = rng.random::<f64>().clamp(1e-9, 1.0);
    let u2: f64 = rng.random::<f64>();
    (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos() * std_dev
}

/// +1 in mid-January, -1 in mid-July.
fn season(timestamp: NaiveDateTime) -> f64 {
    let day = f64::from(timestamp.ordinal0());
    (2.0 * PI * (day - 15.0) / 365.0).cos()
}

/// Clear-sky solar capacity factor for the hour starting at `timestamp`.
fn clear_sky(timestamp: NaiveDateTime, season: f64) -> f64 {
    let day_length = 12.0 - 4.0 * season;
    let sunrise = 12.0 - day_length / 2.0;
    let hour = f64::from(timestamp.hour()) + 0.5;
    if hour <= sunrise || hour >= sunrise + day_length {
        return 0.0;
    }
    let peak = 0.55 - 0.25 * season;
    peak * (PI * (hour - sunrise) / day_length).sin()
}

/// Generates `years` full calendar years of hourly data starting on 1 January of `start_year`.
///
/// The same seed always produces the same profiles.
///
/// # Errors
///
/// Returns [`InputError::Empty`] if `years` is zero or the years are out of range.
pub fn generate(start_year: i32, years: u32, seed: u64) -> Result<ProfileSet, InputError> {
    let end_year = i32::try_from(years)
        .ok()
        .and_then(|y| start_year.checked_add(y))
        .ok_or(InputError::Empty)?;
    let midnight = |year| NaiveDate::from_ymd_opt(year, 1, 1).and_then(|d| d.and_hms_opt(0, 0, 0));
    let (Some(start), Some(end)) = (midnight(start_year), midnight(end_year)) else {
        return Err(InputError::Empty);
    };

    let mut rng = StdRng::seed_from_u64(seed);
    let mut wind_level = WIND_MEAN;
    let mut cloud = 1.0;

    let mut timestamps = Vec::new();
    let mut wind = Vec::new();
    let mut solar = Vec::new();
    let mut market = Vec::new();

    let mut timestamp = start;
    while timestamp < end {
        let season = season(timestamp);
        let hour = f64::from(timestamp.hour());

        let wind_mean = WIND_MEAN + 0.1 * season;
        wind_level = WIND_ALPHA * wind_level
            + (1.0 - WIND_ALPHA) * wind_mean
            + gaussian_noise(&mut rng, WIND_NOISE_STD);
        wind_level = wind_level.clamp(0.0, 1.0);

        cloud = CLOUD_ALPHA * cloud
            + (1.0 - CLOUD_ALPHA) * (1.0 + gaussian_noise(&mut rng, CLOUD_NOISE_STD));
        cloud = cloud.clamp(CLOUD_MIN, CLOUD_MAX);
        let solar_level = (clear_sky(timestamp, season) * cloud).clamp(0.0, 1.0);

        // Morning and evening peaks, midday solar dip
        let daily_shape = 10.0 * (2.0 * PI * (hour - 6.0) / 12.0).sin().max(0.0)
            - 8.0 * solar_level;
        let spot = SPOT_BASE + 15.0 * season + daily_shape
            - SPOT_WIND_SENSITIVITY * (wind_level - WIND_MEAN)
            + gaussian_noise(&mut rng, SPOT_NOISE_STD);

        let consumption = (1.0
            + 0.15 * season
            + 0.2 * (2.0 * PI * (hour - 8.0) / 24.0).sin()
            + gaussian_noise(&mut rng, 0.03))
        .max(0.05);

        timestamps.push(timestamp);
        wind.push(wind_level);
        solar.push(solar_level);
        market.push((
            timestamp,
            MarketRow {
                spot,
                consumption: Some(consumption),
            },
        ));

        timestamp += Duration::hours(1);
    }

    Ok(ProfileSet {
        production: ProductionProfile::new(timestamps, wind, solar)?,
        market: MarketTable::from_rows(market)?,
    })
}
