//! The command line interface for the simulator.
use crate::batch::run_batch;
use crate::config::ScenarioConfig;
use crate::io::export::{export_hourly_csv, export_price_bins_csv, export_yearly_csv};
use crate::io::import::{load_batch, load_profiles};
use crate::log;
use crate::profiles::{ProfileSet, synthetic};
use crate::reporting::print_report;
use crate::sim::price_bins::summarize;
use crate::sim::{SimulationOutput, YearlyResult, simulate_scenario};
use ::log::info;
use anyhow::{Context, Result, bail};
use clap::{Args, CommandFactory, Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};

/// Output file names written by the `run` command.
pub const YEARLY_RESULTS_FILE: &str = "yearly_results.csv";
pub const HOURLY_DETAIL_FILE: &str = "hourly_detail.csv";
pub const PRICE_BINS_FILE: &str = "price_bins.csv";
/// Output file written by the `batch` command.
pub const BATCH_RESULTS_FILE: &str = "batch_results.csv";

/// Hourly renewable dispatch against a baseload contract with a storage fleet.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Where the scenario comes from. Defaults to the `baseline` preset.
#[derive(Args, Debug, Default)]
pub struct ScenarioSource {
    /// Path to a TOML scenario file
    #[arg(long, conflicts_with = "preset")]
    pub scenario: Option<PathBuf>,
    /// Name of a built-in preset
    #[arg(long)]
    pub preset: Option<String>,
}

/// Options for the run command
#[derive(Args, Debug)]
pub struct RunOpts {
    #[command(flatten)]
    pub source: ScenarioSource,
    /// Per-MW profile CSV (timestamp, wind, solar, spot[, consumption]); synthetic if omitted
    #[arg(long)]
    pub profiles: Option<PathBuf>,
    /// Years of synthetic profiles to generate
    #[arg(long)]
    pub years: Option<u32>,
    /// Seed for synthetic profiles
    #[arg(long)]
    pub seed: Option<u64>,
    /// Directory for output files
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,
    /// Width of the spot-price bins (EUR/MWh)
    #[arg(long, default_value_t = 5.0)]
    pub price_step: f64,
    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long)]
    pub log_level: Option<String>,
}

/// Options for the batch command
#[derive(Args, Debug)]
pub struct BatchOpts {
    /// Batch CSV with one configuration per row
    #[arg(long)]
    pub batch: PathBuf,
    /// Per-MW profile CSV; synthetic if omitted
    #[arg(long)]
    pub profiles: Option<PathBuf>,
    #[command(flatten)]
    pub source: ScenarioSource,
    /// Directory for output files
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,
    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long)]
    pub log_level: Option<String>,
}

/// The available commands.
#[derive(Subcommand)]
enum Commands {
    /// Simulate one scenario.
    Run(RunOpts),
    /// Simulate every row of a batch file.
    Batch(BatchOpts),
    /// List the built-in presets.
    Presets,
}

impl Commands {
    /// Execute the supplied CLI command
    fn execute(self) -> Result<()> {
        match self {
            Self::Run(opts) => handle_run_command(&opts),
            Self::Batch(opts) => handle_batch_command(&opts),
            Self::Presets => {
                for name in ScenarioConfig::PRESETS {
                    println!("{name}");
                }
                Ok(())
            }
        }
    }
}

/// Parse CLI arguments and run the requested command
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        let help_str = Cli::command().render_long_help().to_string();
        println!("{help_str}");
        return Ok(());
    };

    command.execute()
}

/// Load the scenario named by `source` and reject it if it fails validation.
///
/// Every validation error is printed before failing.
pub fn load_scenario(source: &ScenarioSource) -> Result<ScenarioConfig> {
    let config = match (&source.scenario, &source.preset) {
        (Some(path), _) => ScenarioConfig::from_toml_file(path)?,
        (None, Some(name)) => ScenarioConfig::from_preset(name)?,
        (None, None) => ScenarioConfig::baseline(),
    };
    check_scenario(&config)?;
    Ok(config)
}

fn check_scenario(config: &ScenarioConfig) -> Result<()> {
    let errors = config.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        bail!("Scenario has {} configuration error(s)", errors.len());
    }
    Ok(())
}

/// Per-MW profiles from `path`, or synthetic ones following the scenario's
/// `start_year`, `years` and `seed`.
fn profiles_for(path: Option<&Path>, config: &ScenarioConfig) -> Result<ProfileSet> {
    match path {
        Some(path) => {
            let profiles = load_profiles(path)?;
            info!("Loaded {} hours from {}", profiles.production.len(), path.display());
            Ok(profiles)
        }
        None => {
            let s = &config.simulation;
            info!(
                "Generating {} year(s) of synthetic profiles from {} (seed {})",
                s.years, s.start_year, s.seed
            );
            Ok(synthetic::generate(s.start_year, s.years, s.seed)?)
        }
    }
}

fn create_output_dir(dir: Option<&Path>) -> Result<()> {
    if let Some(dir) = dir {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;
    }
    Ok(())
}

/// Handle the `run` command.
pub fn handle_run_command(opts: &RunOpts) -> Result<()> {
    create_output_dir(opts.output_dir.as_deref())?;
    log::init(opts.log_level.as_deref(), opts.output_dir.as_deref())
        .context("Failed to initialise logging.")?;

    let output = execute_run(opts)?;
    print_report(&output.yearly);
    info!("Simulation complete!");
    Ok(())
}

/// Loads inputs, simulates and writes the output files for the `run`
/// command. Does not touch the logger.
pub fn execute_run(opts: &RunOpts) -> Result<SimulationOutput> {
    let mut config = load_scenario(&opts.source)?;
    if let Some(years) = opts.years {
        config.simulation.years = years;
    }
    if let Some(seed) = opts.seed {
        config.simulation.seed = seed;
    }
    check_scenario(&config)?;

    let profiles = profiles_for(opts.profiles.as_deref(), &config)?;
    let output = simulate_scenario(&profiles, &config).context("Simulation failed.")?;
    let bins = summarize(&output.hourly, opts.price_step)?;

    if let Some(dir) = opts.output_dir.as_deref() {
        create_output_dir(Some(dir))?;
        let path = dir.join(YEARLY_RESULTS_FILE);
        export_yearly_csv(&output.yearly, &path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        let path = dir.join(HOURLY_DETAIL_FILE);
        export_hourly_csv(&output.hourly, &path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        let path = dir.join(PRICE_BINS_FILE);
        export_price_bins_csv(&bins, &path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!("Output folder: {}", dir.display());
    }

    Ok(output)
}

/// Handle the `batch` command.
pub fn handle_batch_command(opts: &BatchOpts) -> Result<()> {
    create_output_dir(opts.output_dir.as_deref())?;
    log::init(opts.log_level.as_deref(), opts.output_dir.as_deref())
        .context("Failed to initialise logging.")?;

    let results = execute_batch(opts)?;
    print_report(&results);
    info!("Batch complete!");
    Ok(())
}

/// Loads inputs, runs every batch row and writes `batch_results.csv` for
/// the `batch` command. Does not touch the logger.
pub fn execute_batch(opts: &BatchOpts) -> Result<Vec<YearlyResult>> {
    let base = load_scenario(&opts.source)?;
    let rows = load_batch(&opts.batch)?;
    info!("Loaded {} batch rows from {}", rows.len(), opts.batch.display());

    let profiles = profiles_for(opts.profiles.as_deref(), &base)?;
    let results = run_batch(&rows, &base, &profiles)?;

    if let Some(dir) = opts.output_dir.as_deref() {
        create_output_dir(Some(dir))?;
        let path = dir.join(BATCH_RESULTS_FILE);
        export_yearly_csv(&results, &path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("baseload-sim").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn run_options_parse() {
        let cli = parse(&[
            "run",
            "--preset",
            "wind_heavy",
            "--years",
            "2",
            "--price-step",
            "2.5",
            "-o",
            "out",
        ]);
        let Some(Commands::Run(opts)) = cli.command else {
            panic!("expected run command");
        };
        assert_eq!(opts.source.preset.as_deref(), Some("wind_heavy"));
        assert_eq!(opts.years, Some(2));
        assert_eq!(opts.price_step, 2.5);
        assert_eq!(opts.output_dir, Some(PathBuf::from("out")));
    }

    #[test]
    fn price_step_defaults_to_five() {
        let Some(Commands::Run(opts)) = parse(&["run"]).command else {
            panic!("expected run command");
        };
        assert_eq!(opts.price_step, 5.0);
        assert!(opts.source.scenario.is_none());
    }

    #[test]
    fn scenario_and_preset_conflict() {
        let result = Cli::try_parse_from([
            "baseload-sim",
            "run",
            "--scenario",
            "a.toml",
            "--preset",
            "baseline",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn batch_requires_file() {
        assert!(Cli::try_parse_from(["baseload-sim", "batch"]).is_err());
        let Some(Commands::Batch(opts)) = parse(&["batch", "--batch", "rows.csv"]).command else {
            panic!("expected batch command");
        };
        assert_eq!(opts.batch, PathBuf::from("rows.csv"));
    }

    #[test]
    fn unknown_preset_is_an_error() {
        let source = ScenarioSource {
            scenario: None,
            preset: Some("nope".into()),
        };
        let err = load_scenario(&source).unwrap_err();
        assert!(err.to_string().contains("unknown preset"));
    }

    #[test]
    fn run_writes_output_files() {
        let dir = tempfile::tempdir().unwrap();
        let opts = RunOpts {
            source: ScenarioSource::default(),
            profiles: None,
            years: Some(1),
            seed: Some(7),
            output_dir: Some(dir.path().to_path_buf()),
            price_step: 20.0,
            log_level: None,
        };
        let output = execute_run(&opts).unwrap();
        assert_eq!(output.yearly.len(), 1);
        for file in [YEARLY_RESULTS_FILE, HOURLY_DETAIL_FILE, PRICE_BINS_FILE] {
            assert!(dir.path().join(file).exists(), "{file} missing");
        }
        let hourly = fs::read_to_string(dir.path().join(HOURLY_DETAIL_FILE)).unwrap();
        assert_eq!(hourly.lines().count(), 8761);
    }

    #[test]
    fn run_rejects_bad_price_step() {
        let opts = RunOpts {
            source: ScenarioSource::default(),
            profiles: None,
            years: None,
            seed: None,
            output_dir: None,
            price_step: 0.0,
            log_level: None,
        };
        assert!(execute_run(&opts).is_err());
    }
}
