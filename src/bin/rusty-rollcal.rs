//! rusty-rollcal CLI - build and check futures roll calendars
//!
//! ## Example Usage
//!
//! ```bash
//! # Build a roll calendar from per-contract prices and write it out
//! rusty-rollcal build AUD
//!
//! # Build calendars for every configured instrument in parallel
//! rusty-rollcal build-all
//!
//! # Check a stored calendar against prices
//! rusty-rollcal check AUD --json
//!
//! # Back out a calendar from legacy carry data
//! rusty-rollcal back-out AUD --input legacy/AUD_carrydata.csv
//! ```

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use rusty_rollcal::data::roll_config::RollConfig;
use rusty_rollcal::data::{load_contract_prices, load_forward_series, ContractPriceFormat};
use rusty_rollcal::prices::ContractPriceMap;
use rusty_rollcal::roll_calendar::csv_io::contract_rolls_from_csv;
use rusty_rollcal::roll_calendar::{add_carry_calendar, RollCalendar, ValidationReport};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

/// rusty-rollcal: futures roll calendar builder
#[derive(Parser)]
#[command(name = "rusty-rollcal")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = "Robert Fall")]
#[command(about = "Build and check futures roll calendars", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a roll calendar from individual contract prices
    Build {
        /// Instrument code
        #[arg(value_name = "INSTRUMENT")]
        instrument: String,

        /// Output file (default: <calendars_dir>/<INSTRUMENT>.csv)
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,

        /// Check the calendar before writing it
        #[arg(long)]
        check: bool,
    },

    /// Build roll calendars for every configured instrument
    BuildAll {
        /// Show progress
        #[arg(short = 'p', long)]
        show_progress: bool,
    },

    /// Check a stored roll calendar against prices
    Check {
        #[arg(value_name = "INSTRUMENT")]
        instrument: String,

        /// Calendar file (default: <calendars_dir>/<INSTRUMENT>.csv)
        #[arg(long)]
        calendar: Option<PathBuf>,

        /// Print findings as JSON
        #[arg(long)]
        json: bool,
    },

    /// Back out a roll calendar from a stitched current/forward series
    BackOut {
        #[arg(value_name = "INSTRUMENT")]
        instrument: String,

        /// Stitched series CSV
        #[arg(short = 'i', long)]
        input: PathBuf,

        #[arg(short = 'o', long)]
        output: Option<PathBuf>,
    },

    /// Add carry contracts to a calendar that only has current/next contracts
    AddCarry {
        #[arg(value_name = "INSTRUMENT")]
        instrument: String,

        /// Calendar without a carry column
        #[arg(long)]
        calendar: PathBuf,

        #[arg(short = 'o', long)]
        output: Option<PathBuf>,
    },

    /// Show configuration
    Info,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Config {
    #[serde(default = "default_prices_dir")]
    prices_dir: PathBuf,
    #[serde(default = "default_roll_config")]
    roll_config: PathBuf,
    #[serde(default = "default_calendars_dir")]
    calendars_dir: PathBuf,
}

fn base_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".rusty-rollcal")
}

fn default_prices_dir() -> PathBuf {
    base_dir().join("prices")
}

fn default_roll_config() -> PathBuf {
    base_dir().join("rollconfig.csv")
}

fn default_calendars_dir() -> PathBuf {
    base_dir().join("roll_calendars")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            prices_dir: default_prices_dir(),
            roll_config: default_roll_config(),
            calendars_dir: default_calendars_dir(),
        }
    }
}

impl Config {
    fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => {
                let default_path = base_dir().join("config.toml");
                if !default_path.exists() {
                    return Ok(Config::default());
                }
                default_path
            }
        };

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        toml::from_str(&contents).with_context(|| format!("Failed to parse config {}", path.display()))
    }

    fn calendar_path(&self, instrument: &str) -> PathBuf {
        self.calendars_dir.join(format!("{}.csv", instrument))
    }

    fn roll_config(&self) -> anyhow::Result<RollConfig> {
        Ok(RollConfig::from_csv(&self.roll_config)?)
    }

    fn prices(&self, instrument: &str) -> anyhow::Result<ContractPriceMap> {
        Ok(load_contract_prices(
            &self.prices_dir,
            instrument,
            &ContractPriceFormat::default(),
        )?)
    }
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let result = Config::load(cli.config.as_deref()).and_then(|config| {
        if cli.verbose {
            println!(
                "{} v{}",
                "rusty-rollcal".cyan().bold(),
                env!("CARGO_PKG_VERSION")
            );
            println!("Prices dir: {}", config.prices_dir.display().to_string().dimmed());
        }

        match cli.command {
            Commands::Build {
                instrument,
                output,
                check,
            } => build_calendar(&config, &instrument, output, check),
            Commands::BuildAll { show_progress } => build_all(&config, show_progress),
            Commands::Check {
                instrument,
                calendar,
                json,
            } => check_calendar(&config, &instrument, calendar, json),
            Commands::BackOut {
                instrument,
                input,
                output,
            } => back_out(&config, &instrument, &input, output),
            Commands::AddCarry {
                instrument,
                calendar,
                output,
            } => add_carry(&config, &instrument, &calendar, output),
            Commands::Info => show_info(&config),
        }
    });

    if let Err(e) = result {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        process::exit(1);
    }
}

fn write_calendar(calendar: &RollCalendar, path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    calendar
        .to_csv(path)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!(
        "  {} {} rolls to {}",
        "✓".green(),
        calendar.len(),
        path.display()
    );
    Ok(())
}

fn print_report(report: &ValidationReport, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    if report.is_ok() {
        println!("  {} No problems found", "✓".green());
    } else {
        for finding in &report.findings {
            println!("  {} {}", "✗".red(), finding);
        }
        println!("  {} {} problems", "Total:".bold(), report.findings.len());
    }
    Ok(())
}

fn build_one(config: &Config, roll_config: &RollConfig, instrument: &str) -> anyhow::Result<RollCalendar> {
    let parameters = roll_config.get(instrument)?;
    let prices = config.prices(instrument)?;

    let adjusted = RollCalendar::create_from_prices(&prices, parameters)
        .with_context(|| format!("Failed to build roll calendar for {}", instrument))?;

    if let Some(stop) = &adjusted.early_stop {
        log::info!("{}: stopped at row {}: {}", instrument, stop.row_index, stop);
    }

    Ok(adjusted.into_calendar())
}

fn build_calendar(config: &Config, instrument: &str, output: Option<PathBuf>, check: bool) -> anyhow::Result<()> {
    println!("{} {}", "Building roll calendar for".cyan().bold(), instrument);

    let roll_config = config.roll_config()?;
    let calendar = build_one(config, &roll_config, instrument)?;

    if check {
        let prices = config.prices(instrument)?;
        let report = calendar.validate(&prices);
        print_report(&report, false)?;
        if !report.is_ok() {
            bail!("Roll calendar for {} failed checks, not written", instrument);
        }
    }

    let path = output.unwrap_or_else(|| config.calendar_path(instrument));
    write_calendar(&calendar, &path)
}

fn build_all(config: &Config, show_progress: bool) -> anyhow::Result<()> {
    let roll_config = config.roll_config()?;
    let instruments: Vec<&str> = roll_config.instruments().collect();

    let pb = if show_progress {
        ProgressBar::new(instruments.len() as u64)
    } else {
        ProgressBar::hidden()
    };
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let results: Vec<(&str, anyhow::Result<RollCalendar>)> = instruments
        .par_iter()
        .map(|instrument| {
            let result = build_one(config, &roll_config, instrument);
            pb.inc(1);
            (*instrument, result)
        })
        .collect();

    pb.finish_with_message("done");

    let mut failures = 0;
    for (instrument, result) in results {
        match result.and_then(|calendar| write_calendar(&calendar, &config.calendar_path(instrument))) {
            Ok(()) => {}
            Err(e) => {
                failures += 1;
                eprintln!("  {} {}: {:#}", "✗".red(), instrument, e);
            }
        }
    }

    if failures > 0 {
        bail!("{} of {} instruments failed", failures, instruments.len());
    }
    Ok(())
}

fn check_calendar(config: &Config, instrument: &str, calendar: Option<PathBuf>, json: bool) -> anyhow::Result<()> {
    let path = calendar.unwrap_or_else(|| config.calendar_path(instrument));
    let calendar = RollCalendar::from_csv(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let prices = config.prices(instrument)?;

    if !json {
        println!(
            "{} {} ({} rolls)",
            "Checking roll calendar for".cyan().bold(),
            instrument,
            calendar.len()
        );
    }

    let report = calendar.validate(&prices);
    print_report(&report, json)?;

    if !report.is_ok() {
        bail!("{} problems in roll calendar for {}", report.findings.len(), instrument);
    }
    Ok(())
}

fn back_out(config: &Config, instrument: &str, input: &Path, output: Option<PathBuf>) -> anyhow::Result<()> {
    println!("{} {}", "Backing out roll calendar for".cyan().bold(), instrument);

    let series = load_forward_series(input)?;
    let calendar = RollCalendar::back_out_from_current_and_forward_data(&series)?;

    let report = calendar.check_if_date_index_monotonic();
    print_report(&report, false)?;

    let path = output.unwrap_or_else(|| config.calendar_path(instrument));
    write_calendar(&calendar, &path)
}

fn add_carry(config: &Config, instrument: &str, calendar: &Path, output: Option<PathBuf>) -> anyhow::Result<()> {
    let roll_config = config.roll_config()?;
    let parameters = roll_config.get(instrument)?;
    let prices = config.prices(instrument)?;
    let rolls = contract_rolls_from_csv(calendar)
        .with_context(|| format!("Failed to read {}", calendar.display()))?;

    let with_carry = add_carry_calendar(&rolls, parameters, &prices)?;
    if with_carry.len() < rolls.len() {
        println!(
            "  {} First roll dropped: carry contract not in prices",
            "!".yellow()
        );
    }

    let path = output.unwrap_or_else(|| config.calendar_path(instrument));
    write_calendar(&with_carry, &path)
}

fn show_info(config: &Config) -> anyhow::Result<()> {
    println!("{}", "rusty-rollcal configuration".cyan().bold());
    println!("  {} {}", "Prices dir:".bold(), config.prices_dir.display());
    println!("  {} {}", "Roll config:".bold(), config.roll_config.display());
    println!("  {} {}", "Calendars dir:".bold(), config.calendars_dir.display());

    if config.roll_config.exists() {
        let roll_config = config.roll_config()?;
        println!("  {} {}", "Instruments:".bold(), roll_config.len());
        for instrument in roll_config.instruments() {
            let parameters = roll_config.get(instrument)?;
            println!(
                "    {:<12} hold {:<12} priced {:<12} roll {:>4}d carry {:+}",
                instrument,
                parameters.hold_rollcycle.to_string(),
                parameters.priced_rollcycle.to_string(),
                parameters.roll_offset_day,
                parameters.carry_offset
            );
        }
    } else {
        println!("  {}", "Roll config not found".yellow());
    }
    Ok(())
}
