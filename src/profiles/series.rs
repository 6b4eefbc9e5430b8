//! In-memory hourly input series and their validation.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDateTime;

/// Problems with hourly input data.
#[derive(Debug, Clone, PartialEq)]
pub enum InputError {
    /// A production timestamp has no matching market row.
    Alignment { timestamp: NaiveDateTime },
    /// Production series have different lengths.
    LengthMismatch {
        timestamps: usize,
        wind: usize,
        solar: usize,
    },
    /// Timestamps are not strictly increasing.
    NotChronological { timestamp: NaiveDateTime },
    /// A physical quantity is below zero.
    NegativeValue {
        series: &'static str,
        timestamp: NaiveDateTime,
    },
    /// A value is NaN or infinite.
    NonFinite {
        series: &'static str,
        timestamp: NaiveDateTime,
    },
    /// Consumption-shaped baseload needs a consumption value for this hour.
    MissingConsumption { timestamp: NaiveDateTime },
    /// Consumption averages to zero over a year, so it cannot shape the baseload.
    ZeroConsumption { year: i32 },
    /// No hours to simulate.
    Empty,
    /// The scenario failed validation; one message per failed check.
    InvalidScenario { errors: Vec<String> },
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Alignment { timestamp } => write!(
                f,
                "input alignment error: no market row for production hour {timestamp}"
            ),
            Self::LengthMismatch {
                timestamps,
                wind,
                solar,
            } => write!(
                f,
                "input alignment error: {timestamps} timestamps but {wind} wind and {solar} solar values"
            ),
            Self::NotChronological { timestamp } => {
                write!(f, "timestamps not strictly increasing at {timestamp}")
            }
            Self::NegativeValue { series, timestamp } => {
                write!(f, "negative {series} value at {timestamp}")
            }
            Self::NonFinite { series, timestamp } => {
                write!(f, "non-finite {series} value at {timestamp}")
            }
            Self::MissingConsumption { timestamp } => {
                write!(f, "missing consumption value at {timestamp}")
            }
            Self::ZeroConsumption { year } => {
                write!(f, "mean consumption for {year} is zero")
            }
            Self::Empty => write!(f, "no hourly data"),
            Self::InvalidScenario { errors } => {
                write!(f, "invalid scenario: {}", errors.join("; "))
            }
        }
    }
}

impl std::error::Error for InputError {}

fn check_value(series: &'static str, value: f64, timestamp: NaiveDateTime) -> Result<(), InputError> {
    if !value.is_finite() {
        return Err(InputError::NonFinite { series, timestamp });
    }
    if value < 0.0 {
        return Err(InputError::NegativeValue { series, timestamp });
    }
    Ok(())
}

/// Hourly wind and solar output on a shared, strictly increasing index.
///
/// Depending on context the values are either per-MW profiles (0..1) or
/// absolute production in MW; see [`ProductionProfile::scaled`].
#[derive(Debug, Clone, PartialEq)]
pub struct ProductionProfile {
    timestamps: Vec<NaiveDateTime>,
    wind: Vec<f64>,
    solar: Vec<f64>,
}

impl ProductionProfile {
    /// Builds a validated profile.
    ///
    /// # Errors
    ///
    /// Returns an `InputError` if the series are empty, differ in length, are
    /// out of order, or contain negative or non-finite values.
    pub fn new(
        timestamps: Vec<NaiveDateTime>,
        wind: Vec<f64>,
        solar: Vec<f64>,
    ) -> Result<Self, InputError> {
        if timestamps.len() != wind.len() || timestamps.len() != solar.len() {
            return Err(InputError::LengthMismatch {
                timestamps: timestamps.len(),
                wind: wind.len(),
                solar: solar.len(),
            });
        }
        if timestamps.is_empty() {
            return Err(InputError::Empty);
        }

        for (i, &timestamp) in timestamps.iter().enumerate() {
            if i > 0 && timestamps[i - 1] >= timestamp {
                return Err(InputError::NotChronological { timestamp });
            }
            check_value("wind", wind[i], timestamp)?;
            check_value("solar", solar[i], timestamp)?;
        }

        Ok(Self {
            timestamps,
            wind,
            solar,
        })
    }

    /// Multiplies per-MW profiles by installed capacity, giving production in MW.
    pub fn scaled(&self, wind_capacity_mw: f64, solar_capacity_mw: f64) -> Self {
        Self {
            timestamps: self.timestamps.clone(),
            wind: self.wind.iter().map(|w| w * wind_capacity_mw).collect(),
            solar: self.solar.iter().map(|s| s * solar_capacity_mw).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn timestamps(&self) -> &[NaiveDateTime] {
        &self.timestamps
    }

    pub fn wind(&self) -> &[f64] {
        &self.wind
    }

    pub fn solar(&self) -> &[f64] {
        &self.solar
    }
}

/// Market data for one hour.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarketRow {
    /// Day-ahead spot price (EUR/MWh); may be negative.
    pub spot: f64,
    /// Consumption used to shape the baseload, if known.
    pub consumption: Option<f64>,
}

/// Market rows indexed by hourly timestamp.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarketTable {
    rows: BTreeMap<NaiveDateTime, MarketRow>,
}

impl MarketTable {
    /// Builds a validated table; later rows replace earlier ones with the same timestamp.
    ///
    /// # Errors
    ///
    /// Returns an `InputError` for a non-finite spot price or a negative or
    /// non-finite consumption value.
    pub fn from_rows(
        rows: impl IntoIterator<Item = (NaiveDateTime, MarketRow)>,
    ) -> Result<Self, InputError> {
        let mut table = Self::default();
        for (timestamp, row) in rows {
            if !row.spot.is_finite() {
                return Err(InputError::NonFinite {
                    series: "spot",
                    timestamp,
                });
            }
            if let Some(consumption) = row.consumption {
                check_value("consumption", consumption, timestamp)?;
            }
            table.rows.insert(timestamp, row);
        }
        Ok(table)
    }

    /// Looks up the row for `timestamp`.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::Alignment`] when the table has no such row.
    pub fn lookup(&self, timestamp: NaiveDateTime) -> Result<&MarketRow, InputError> {
        self.rows
            .get(&timestamp)
            .ok_or(InputError::Alignment { timestamp })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Per-MW production profiles together with the market table on the same index.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileSet {
    pub production: ProductionProfile,
    pub market: MarketTable,
}
