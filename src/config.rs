//! TOML-based scenario configuration and preset definitions.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::Deserialize;

/// Top-level scenario configuration parsed from TOML.
///
/// All fields have defaults matching the baseline scenario. Load from
/// TOML with [`ScenarioConfig::from_toml_file`] or use
/// [`ScenarioConfig::baseline`] for the built-in default.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    /// Run identity and global parameters.
    #[serde(default)]
    pub simulation: SimulationConfig,
    /// Installed generation and grid connection.
    #[serde(default)]
    pub plant: PlantConfig,
    /// Contracted delivery target.
    #[serde(default)]
    pub baseload: BaseloadConfig,
    /// Batteries and pumped hydro.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Contract and settlement prices.
    #[serde(default)]
    pub prices: PriceConfig,
}

/// Order in which storage units are offered surplus and shortfall each hour.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchPriority {
    /// Largest power rating first.
    #[default]
    PowerDescending,
    /// Smallest power rating first.
    PowerAscending,
}

/// How the hourly baseload target is derived from `baseload.mw`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BaseloadShape {
    /// Constant target every hour.
    #[default]
    Flat,
    /// Target follows the consumption profile, normalised to its yearly mean.
    Consumption,
}

/// Run identity and global parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Identifier written to every yearly result row.
    pub id: u32,
    /// Seed for synthetic demo profiles.
    pub seed: u64,
    /// Number of calendar years of synthetic profiles to generate.
    pub years: u32,
    /// First calendar year of synthetic profiles.
    pub start_year: i32,
    /// Keep stored energy across year boundaries.
    pub carry_over_soc: bool,
    /// Storage dispatch order.
    pub priority: DispatchPriority,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            id: 1,
            seed: 42,
            years: 1,
            start_year: 2023,
            carry_over_soc: true,
            priority: DispatchPriority::default(),
        }
    }
}

/// Installed generation and grid connection.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlantConfig {
    /// Installed wind capacity (MW).
    pub wind_capacity_mw: f64,
    /// Installed solar capacity (MW).
    pub solar_capacity_mw: f64,
    /// Grid connection limit (MW); caps hourly export when set.
    pub grid_connection_mw: Option<f64>,
}

impl Default for PlantConfig {
    fn default() -> Self {
        Self {
            wind_capacity_mw: 100.0,
            solar_capacity_mw: 50.0,
            grid_connection_mw: None,
        }
    }
}

/// Contracted delivery target.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BaseloadConfig {
    /// Contracted power (MW, must be > 0).
    pub mw: f64,
    /// Flat or consumption-shaped target.
    pub shape: BaseloadShape,
}

impl Default for BaseloadConfig {
    fn default() -> Self {
        Self {
            mw: 30.0,
            shape: BaseloadShape::Flat,
        }
    }
}

/// One battery type in the fleet.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BessConfig {
    /// Storage duration (hours at rated power).
    pub duration_h: u32,
    /// Rated charge/discharge power (MW).
    pub power_mw: f64,
    /// Fixed yearly payment for the asset (EUR).
    pub annual_payment: f64,
}

/// Pumped hydro storage parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HydroConfig {
    /// Rated pump/turbine power (MW).
    pub power_mw: f64,
    /// Reservoir volume (MWh).
    pub energy_mwh: f64,
    /// Round-trip efficiency (0..1.0).
    pub efficiency: f64,
    /// Fixed yearly payment (EUR).
    pub annual_payment: f64,
}

impl Default for HydroConfig {
    fn default() -> Self {
        Self {
            power_mw: 0.0,
            energy_mwh: 2000.0,
            efficiency: 0.9,
            annual_payment: 0.0,
        }
    }
}

/// Batteries and pumped hydro.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageConfig {
    /// Round-trip efficiency shared by all batteries.
    pub efficiency: f64,
    /// Battery types, one per duration.
    pub bess: Vec<BessConfig>,
    /// Optional pumped hydro unit.
    pub hydro: Option<HydroConfig>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            efficiency: 0.86,
            bess: Vec::new(),
            hydro: None,
        }
    }
}

impl StorageConfig {
    /// Sum of all yearly storage payments (EUR).
    pub fn annual_payments(&self) -> f64 {
        let bess: f64 = self.bess.iter().map(|b| b.annual_payment).sum();
        bess + self.hydro.as_ref().map_or(0.0, |h| h.annual_payment)
    }

    /// Rated power of the battery with the given duration, or 0.
    pub fn bess_power_mw(&self, duration_h: u32) -> f64 {
        self.bess
            .iter()
            .filter(|b| b.duration_h == duration_h)
            .map(|b| b.power_mw)
            .sum()
    }

    /// Rated pumped hydro power, or 0 when absent.
    pub fn hydro_power_mw(&self) -> f64 {
        self.hydro.as_ref().map_or(0.0, |h| h.power_mw)
    }
}

/// Contract and settlement prices (EUR/MWh).
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PriceConfig {
    /// Pay-as-produced price for wind.
    pub wind_price: f64,
    /// Pay-as-produced price for solar.
    pub solar_price: f64,
    /// Fixed price paid for undelivered baseload energy.
    pub missing_energy_price: f64,
    /// Fixed price received for exported wind.
    pub wind_excess_price: f64,
    /// Fixed price received for exported solar.
    pub solar_excess_price: f64,
}

impl Default for PriceConfig {
    fn default() -> Self {
        Self {
            wind_price: 55.0,
            solar_price: 45.0,
            missing_energy_price: 120.0,
            wind_excess_price: 30.0,
            solar_excess_price: 25.0,
        }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug)]
pub struct ConfigError {
    /// Dotted field path (e.g., `"baseload.mw"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "config error: {}: {}", self.field, self.message)
    }
}

impl std::error::Error for ConfigError {}

impl ScenarioConfig {
    /// Returns the baseline scenario: a mixed park with two mid-sized batteries.
    pub fn baseline() -> Self {
        Self {
            storage: StorageConfig {
                bess: vec![
                    BessConfig {
                        duration_h: 2,
                        power_mw: 10.0,
                        annual_payment: 600_000.0,
                    },
                    BessConfig {
                        duration_h: 4,
                        power_mw: 10.0,
                        annual_payment: 1_000_000.0,
                    },
                ],
                ..StorageConfig::default()
            },
            ..Self::default()
        }
    }

    /// Returns the wind-heavy preset: large wind park, small solar, grid-limited export.
    pub fn wind_heavy() -> Self {
        Self {
            plant: PlantConfig {
                wind_capacity_mw: 200.0,
                solar_capacity_mw: 20.0,
                grid_connection_mw: Some(80.0),
            },
            baseload: BaseloadConfig {
                mw: 40.0,
                ..BaseloadConfig::default()
            },
            storage: StorageConfig {
                bess: vec![BessConfig {
                    duration_h: 1,
                    power_mw: 20.0,
                    annual_payment: 700_000.0,
                }],
                ..StorageConfig::default()
            },
            ..Self::default()
        }
    }

    /// Returns the storage-heavy preset: full battery ladder plus pumped hydro.
    pub fn storage_heavy() -> Self {
        let bess = [
            (1, 5.0, 250_000.0),
            (2, 10.0, 600_000.0),
            (4, 10.0, 1_000_000.0),
            (8, 5.0, 900_000.0),
        ]
        .into_iter()
        .map(|(duration_h, power_mw, annual_payment)| BessConfig {
            duration_h,
            power_mw,
            annual_payment,
        })
        .collect();

        Self {
            plant: PlantConfig {
                wind_capacity_mw: 120.0,
                solar_capacity_mw: 80.0,
                grid_connection_mw: Some(60.0),
            },
            storage: StorageConfig {
                bess,
                hydro: Some(HydroConfig {
                    power_mw: 20.0,
                    annual_payment: 2_000_000.0,
                    ..HydroConfig::default()
                }),
                ..StorageConfig::default()
            },
            prices: PriceConfig {
                missing_energy_price: 150.0,
                ..PriceConfig::default()
            },
            ..Self::default()
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["baseline", "wind_heavy", "storage_heavy"];

    /// Loads a scenario from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "baseline" => Ok(Self::baseline()),
            "wind_heavy" => Ok(Self::wind_heavy()),
            "storage_heavy" => Ok(Self::storage_heavy()),
            _ => Err(ConfigError {
                field: "preset".to_string(),
                message: format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            }),
        }
    }

    /// Parses a scenario from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError {
            field: "scenario".to_string(),
            message: format!("cannot read \"{}\": {e}", path.display()),
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a scenario from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError {
            field: "toml".to_string(),
            message: e.to_string(),
        })
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let mut check = |ok: bool, field: &str, message: &str| {
            if !ok {
                errors.push(ConfigError {
                    field: field.into(),
                    message: message.into(),
                });
            }
        };

        check(self.simulation.years > 0, "simulation.years", "must be > 0");

        let plant = &self.plant;
        check(
            plant.wind_capacity_mw >= 0.0,
            "plant.wind_capacity_mw",
            "must be >= 0",
        );
        check(
            plant.solar_capacity_mw >= 0.0,
            "plant.solar_capacity_mw",
            "must be >= 0",
        );
        check(self.baseload.mw > 0.0, "baseload.mw", "must be > 0");
        if let Some(grid) = plant.grid_connection_mw {
            check(
                grid >= self.baseload.mw,
                "plant.grid_connection_mw",
                "must be >= baseload.mw",
            );
        }

        let storage = &self.storage;
        check(
            storage.efficiency > 0.0 && storage.efficiency <= 1.0,
            "storage.efficiency",
            "must be in (0.0, 1.0]",
        );
        for (i, bess) in storage.bess.iter().enumerate() {
            check(
                bess.duration_h > 0,
                &format!("storage.bess[{i}].duration_h"),
                "must be > 0",
            );
            check(
                bess.power_mw >= 0.0,
                &format!("storage.bess[{i}].power_mw"),
                "must be >= 0",
            );
            check(
                bess.power_mw <= 0.0 || bess.annual_payment >= 0.0,
                &format!("storage.bess[{i}].annual_payment"),
                "must be >= 0",
            );
            check(
                !storage.bess[..i]
                    .iter()
                    .any(|other| other.duration_h == bess.duration_h),
                &format!("storage.bess[{i}].duration_h"),
                &format!("duplicate duration {}h", bess.duration_h),
            );
        }

        if let Some(hydro) = &storage.hydro {
            check(hydro.power_mw >= 0.0, "storage.hydro.power_mw", "must be >= 0");
            check(
                hydro.energy_mwh >= 0.0,
                "storage.hydro.energy_mwh",
                "must be >= 0",
            );
            check(
                hydro.efficiency > 0.0 && hydro.efficiency <= 1.0,
                "storage.hydro.efficiency",
                "must be in (0.0, 1.0]",
            );
            check(
                hydro.power_mw <= 0.0 || hydro.annual_payment >= 0.0,
                "storage.hydro.annual_payment",
                "must be >= 0",
            );
        }

        errors
    }
}
