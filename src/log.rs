//! Logger initialisation for the command-line tool.
//!
//! Messages go through the `log` facade and are dispatched by `fern`: info and below to stdout,
//! warnings and errors to stderr, colourised when the stream is a terminal. When an output
//! directory is given, a plain-text copy of every message at info level or above is written there
//! as well.
use anyhow::{Context, Result, anyhow, bail};
use chrono::Local;
use fern::colors::{Color, ColoredLevelConfig};
use fern::{Dispatch, FormatCallback};
use log::{LevelFilter, Record};
use std::env;
use std::fmt::{Arguments, Display};
use std::fs::OpenOptions;
use std::io::IsTerminal;
use std::path::Path;
use std::sync::OnceLock;

/// Set once the global logger has been installed
static LOGGER_INIT: OnceLock<()> = OnceLock::new();

/// Environment variable overriding the log level
pub const LOG_LEVEL_ENV: &str = "BASELOAD_SIM_LOG_LEVEL";

/// Used when neither the environment nor the command line names a level
const DEFAULT_LOG_LEVEL: &str = "info";

/// Log file written into the output directory
const LOG_FILE_NAME: &str = "baseload_sim.log";

/// Whether the program logger has been initialised
pub fn is_logger_initialised() -> bool {
    LOGGER_INIT.get().is_some()
}

/// Parse a level name (case-insensitive) into a [`LevelFilter`].
pub fn parse_level(level: &str) -> Result<LevelFilter> {
    let filter = match level.to_lowercase().as_str() {
        "off" => LevelFilter::Off,
        "error" => LevelFilter::Error,
        "warn" => LevelFilter::Warn,
        "info" => LevelFilter::Info,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        unknown => bail!("Unknown log level: {unknown}"),
    };
    Ok(filter)
}

/// Initialise the program logger.
///
/// The level comes from the `BASELOAD_SIM_LOG_LEVEL` environment variable if set, otherwise from
/// `log_level_from_cli`, otherwise `info`.
///
/// # Arguments
///
/// * `log_level_from_cli`: The level given with `--log-level`
/// * `log_file_dir`: Directory for the log file (no file is written if `None`)
///
/// # Errors
///
/// Fails on an unknown level name, if the log file cannot be created, or if a logger has already
/// been installed.
pub fn init(log_level_from_cli: Option<&str>, log_file_dir: Option<&Path>) -> Result<()> {
    let log_level = env::var(LOG_LEVEL_ENV)
        .unwrap_or_else(|_| log_level_from_cli.unwrap_or(DEFAULT_LOG_LEVEL).to_string());
    let log_level = parse_level(&log_level)?;

    let colours = ColoredLevelConfig::new()
        .error(Color::Red)
        .warn(Color::Yellow)
        .info(Color::Green)
        .debug(Color::Blue)
        .trace(Color::Magenta);

    let use_colour_stdout = std::io::stdout().is_terminal();
    let use_colour_stderr = std::io::stderr().is_terminal();

    let mut dispatch = Dispatch::new()
        .chain(
            Dispatch::new()
                .filter(|metadata| metadata.level() > LevelFilter::Warn)
                .format(move |out, message, record| {
                    write_log_colour(out, message, record, use_colour_stdout, &colours);
                })
                .level(log_level)
                .chain(std::io::stdout()),
        )
        .chain(
            Dispatch::new()
                .format(move |out, message, record| {
                    write_log_colour(out, message, record, use_colour_stderr, &colours);
                })
                .level(log_level.min(LevelFilter::Warn))
                .chain(std::io::stderr()),
        );

    if let Some(dir) = log_file_dir {
        let path = dir.join(LOG_FILE_NAME);
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)
            .with_context(|| format!("Failed to create log file {}", path.display()))?;
        dispatch = dispatch.chain(
            Dispatch::new()
                .format(write_log_plain)
                .level(log_level.max(LevelFilter::Info))
                .chain(file),
        );
    }

    dispatch.apply().context("Logger already initialised")?;
    LOGGER_INIT
        .set(())
        .map_err(|()| anyhow!("Logger already initialised"))?;

    Ok(())
}

fn write_log<T: Display>(out: FormatCallback, level: T, target: &str, message: &Arguments) {
    let timestamp = Local::now().format("%H:%M:%S");

    out.finish(format_args!("[{timestamp} {level} {target}] {message}"));
}

fn write_log_plain(out: FormatCallback, message: &Arguments, record: &Record) {
    write_log(out, record.level(), record.target(), message);
}

fn write_log_colour(
    out: FormatCallback,
    message: &Arguments,
    record: &Record,
    use_colour: bool,
    colours: &ColoredLevelConfig,
) {
    if use_colour {
        write_log(out, colours.color(record.level()), record.target(), message);
    } else {
        write_log_plain(out, message, record);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("off", LevelFilter::Off)]
    #[case("ERROR", LevelFilter::Error)]
    #[case("Warn", LevelFilter::Warn)]
    #[case("info", LevelFilter::Info)]
    #[case("debug", LevelFilter::Debug)]
    #[case("trace", LevelFilter::Trace)]
    fn known_levels(#[case] name: &str, #[case] expected: LevelFilter) {
        assert_eq!(parse_level(name).unwrap(), expected);
    }

    #[test]
    fn unknown_level_rejected() {
        let err = parse_level("chatty").unwrap_err();
        assert_eq!(err.to_string(), "Unknown log level: chatty");
    }
}
