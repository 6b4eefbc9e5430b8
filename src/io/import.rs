//! CSV import for hourly profiles and batch tables.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result, bail};
use chrono::NaiveDateTime;
use serde::Deserialize;

use crate::batch::BatchRow;
use crate::profiles::{MarketRow, MarketTable, ProductionProfile, ProfileSet};

/// Timestamp layouts accepted in profile files.
const TIMESTAMP_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// One row of a profile file. Wind and solar are per-MW capacity factors.
#[derive(Debug, Deserialize)]
struct ProfileRow {
    timestamp: String,
    wind: f64,
    solar: f64,
    spot: f64,
    #[serde(default)]
    consumption: Option<f64>,
}

/// Parses an hourly timestamp in any of the accepted layouts.
///
/// # Errors
///
/// Returns an error if no layout matches.
pub fn parse_timestamp(s: &str) -> Result<NaiveDateTime> {
    let s = s.trim();
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(s, format).ok())
        .with_context(|| format!("invalid timestamp \"{s}\""))
}

/// Reads a profile CSV file.
///
/// Expected columns: `timestamp, wind, solar, spot` and an optional
/// `consumption` column.
///
/// # Errors
///
/// Returns an error if the file cannot be read or its contents are invalid.
pub fn load_profiles(path: &Path) -> Result<ProfileSet> {
    let file = File::open(path).with_context(|| format!("cannot open \"{}\"", path.display()))?;
    read_profiles(file).with_context(|| format!("invalid profile file \"{}\"", path.display()))
}

/// Reads profile CSV data from any reader.
///
/// # Errors
///
/// Returns an error on malformed rows or invalid series.
pub fn read_profiles(reader: impl Read) -> Result<ProfileSet> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

    let mut timestamps = Vec::new();
    let mut wind = Vec::new();
    let mut solar = Vec::new();
    let mut market = Vec::new();
    for (i, row) in rdr.deserialize::<ProfileRow>().enumerate() {
        // Header is line 1
        let line = i + 2;
        let row = row.with_context(|| format!("line {line}"))?;
        let timestamp = parse_timestamp(&row.timestamp).with_context(|| format!("line {line}"))?;

        timestamps.push(timestamp);
        wind.push(row.wind);
        solar.push(row.solar);
        market.push((
            timestamp,
            MarketRow {
                spot: row.spot,
                consumption: row.consumption,
            },
        ));
    }

    Ok(ProfileSet {
        production: ProductionProfile::new(timestamps, wind, solar)?,
        market: MarketTable::from_rows(market)?,
    })
}

/// Reads a batch CSV file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or has no rows.
pub fn load_batch(path: &Path) -> Result<Vec<BatchRow>> {
    let file = File::open(path).with_context(|| format!("cannot open \"{}\"", path.display()))?;
    read_batch(file).with_context(|| format!("invalid batch file \"{}\"", path.display()))
}

/// Reads batch CSV data from any reader. Empty cells are read as zero.
///
/// # Errors
///
/// Returns an error on malformed rows or an empty table.
pub fn read_batch(reader: impl Read) -> Result<Vec<BatchRow>> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let rows = rdr
        .deserialize::<BatchRow>()
        .enumerate()
        .map(|(i, row)| row.with_context(|| format!("line {}", i + 2)))
        .collect::<Result<Vec<_>>>()?;

    if rows.is_empty() {
        bail!("batch table has no rows");
    }
    Ok(rows)
}
