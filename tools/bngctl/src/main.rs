//! bngctl - British National Grid reference tool
//!
//! Validates and converts grid references and replays record tiles through
//! the BNG <-> GeoJSON sync functions.

mod config;
mod convert;
mod settings;
mod sync;

use anyhow::Result;
use bng_codec::GridRefCodec;
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

use crate::settings::Settings;

#[derive(Parser)]
#[command(name = "bngctl")]
#[command(about = "British National Grid reference tool")]
#[command(long_about = "British National Grid reference tool

Commands:
  validate    Check a stored value the way the record validator does
  to-point    Grid reference -> WGS84 longitude/latitude
  to-ref      WGS84 longitude/latitude -> grid reference
  sync        Replay tiles through the configured sync functions
  config      Manage settings files

Examples:
  bngctl validate NT1234567890
  bngctl validate --json 1233445
  bngctl to-point 'sp 86512 33928' --geojson
  bngctl to-ref -- -0.7413205 51.9970648
  bngctl -c bngctl.toml sync --tiles tiles.json")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Settings file (default: config/ directory plus BNGCTL_* variables)
    #[arg(short = 'c', long = "config", global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a value as a grid reference
    Validate {
        value: String,

        /// Parse VALUE as a JSON literal instead of a plain string
        #[arg(long)]
        json: bool,
    },

    /// Convert a grid reference to a WGS84 point
    ToPoint {
        reference: String,

        /// Print a GeoJSON FeatureCollection
        #[arg(long)]
        geojson: bool,
    },

    /// Convert a WGS84 point to a grid reference
    ToRef {
        #[arg(allow_negative_numbers = true)]
        longitude: f64,
        #[arg(allow_negative_numbers = true)]
        latitude: f64,
    },

    /// Commit tiles from a JSON file through the configured sync functions
    Sync {
        /// JSON array of tiles
        #[arg(long)]
        tiles: PathBuf,
    },

    /// Manage settings files
    #[command(about = "Create or inspect settings files")]
    Config {
        #[command(subcommand)]
        command: config::ConfigCommands,
    },
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("{} {:#}", "ERROR".red(), e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    let mut settings = Settings::load(cli.config.as_deref())?;
    if cli.verbose {
        settings.log.level = "debug".to_string();
    }
    if cli.no_color {
        settings.log.ansi = false;
    }
    let _log_guard = common::init_logging(&settings.log)?;

    let codec = GridRefCodec::new(settings.resolution);
    match cli.command {
        Commands::Validate { value, json } => convert::handle_validate(codec, &value, json)?,
        Commands::ToPoint { reference, geojson } => {
            convert::handle_to_point(codec, &reference, geojson)?
        },
        Commands::ToRef {
            longitude,
            latitude,
        } => convert::handle_to_ref(codec, longitude, latitude)?,
        Commands::Sync { tiles } => sync::handle_sync(&settings, &tiles).await?,
        Commands::Config { command } => config::handle_command(command, &settings)?,
    }

    Ok(())
}
