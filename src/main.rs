use chrono::{DateTime, Utc};
use clap::Parser;
use eyre::{Context, Result};
use fav_dates_export::apple_time::parse_min_date;
use fav_dates_export::utils::{DEFAULT_DB_PATH, DEFAULT_OUT_PATH};
use fav_dates_export::{DatabaseNotFound, ExportConfig};
use serde::Deserialize;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// sysexits.h `EX_NOINPUT`: the input database does not exist.
const EXIT_DB_NOT_FOUND: u8 = 66;

/// Export ISO-8601 creation dates of favorite Photos items to CSV.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to Photos.sqlite.
    /// Defaults to db_copy/Photos.sqlite if not set in config.
    #[arg(long, value_name = "PATH")]
    db: Option<PathBuf>,

    /// Output CSV path.
    /// Defaults to fav_dates.csv if not set in config.
    #[arg(long, value_name = "PATH")]
    out: Option<PathBuf>,

    /// Include favorites that are videos (skip the image-only filter).
    #[arg(long, overrides_with = "no_include_videos")]
    include_videos: bool,

    /// Export images only, even if the config file enables videos.
    #[arg(long, overrides_with = "include_videos")]
    no_include_videos: bool,

    /// Only export items created on or after this date (YYYY-MM-DD or RFC 3339).
    #[arg(long, value_name = "DATE", value_parser = parse_date_arg)]
    min_date: Option<DateTime<Utc>>,

    /// Do not verify that the database file exists before opening it.
    #[arg(long, overrides_with = "check_db")]
    skip_db_check: bool,

    /// Verify that the database file exists, even if the config file disables it.
    #[arg(long, overrides_with = "skip_db_check")]
    check_db: bool,

    /// Read from a temporary copy of the database (safe while Photos is running).
    #[arg(long, overrides_with = "no_snapshot")]
    snapshot: bool,

    /// Read the database in place, even if the config file enables snapshots.
    #[arg(long, overrides_with = "snapshot")]
    no_snapshot: bool,

    /// Path to a specific configuration file.
    /// Defaults to $XDG_CONFIG_HOME/fav-dates-export/config.toml
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Print what is being read and how many rows match.
    #[arg(short, long)]
    verbose: bool,

    /// Suppress the final summary.
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    db_path: Option<PathBuf>,
    out_path: Option<PathBuf>,
    include_videos: Option<bool>,
    min_date: Option<String>,
    check_db_exists: Option<bool>,
    snapshot: Option<bool>,
}

fn parse_date_arg(value: &str) -> Result<DateTime<Utc>, String> {
    parse_min_date(value).map_err(|e| e.to_string())
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("fav-dates-export").join("config.toml"))
}

/// Read the TOML config. Only the default location may be absent.
fn load_file_config(explicit_path: Option<&Path>) -> Result<FileConfig> {
    let Some(path) = explicit_path
        .map(Path::to_path_buf)
        .or_else(default_config_path)
    else {
        return Ok(FileConfig::default());
    };

    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound && explicit_path.is_none() => {
            return Ok(FileConfig::default());
        }
        Err(e) => {
            return Err(e)
                .wrap_err_with(|| format!("Failed to read config: {}", path.display()));
        }
    };
    toml::from_str(&content)
        .wrap_err_with(|| format!("Failed to parse config: {}", path.display()))
}

/// `--flag` / `--no-flag` pair: `None` when neither was given.
fn cli_switch(on: bool, off: bool) -> Option<bool> {
    match (on, off) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

/// CLI > config file > built-in default.
fn resolve_config(cli: Cli, file_cfg: FileConfig) -> Result<ExportConfig> {
    let min_date = match cli.min_date {
        Some(d) => Some(d),
        None => file_cfg
            .min_date
            .as_deref()
            .map(parse_min_date)
            .transpose()
            .wrap_err("Invalid min_date in config")?,
    };

    Ok(ExportConfig {
        db_path: cli
            .db
            .or(file_cfg.db_path)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_PATH)),
        out_path: cli
            .out
            .or(file_cfg.out_path)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUT_PATH)),
        include_videos: cli_switch(cli.include_videos, cli.no_include_videos)
            .or(file_cfg.include_videos)
            .unwrap_or(false),
        min_date,
        check_db_exists: cli_switch(cli.check_db, cli.skip_db_check)
            .or(file_cfg.check_db_exists)
            .unwrap_or(true),
        snapshot: cli_switch(cli.snapshot, cli.no_snapshot)
            .or(file_cfg.snapshot)
            .unwrap_or(false),
        verbose: cli.verbose,
        quiet: cli.quiet,
    })
}

fn run(cli: Cli) -> Result<()> {
    let file_cfg = load_file_config(cli.config.as_deref())?;
    let config = resolve_config(cli, file_cfg)?;

    if config.verbose {
        eprintln!(
            "Reading {} -> {}",
            config.db_path.display(),
            config.out_path.display()
        );
    }

    fav_dates_export::execute(&config)?;
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if e.downcast_ref::<DatabaseNotFound>().is_some() => {
            eprintln!("Error: {}.", e);
            ExitCode::from(EXIT_DB_NOT_FOUND)
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
