//! Settings file management

use anyhow::{bail, Result};
use clap::Subcommand;
use colored::Colorize;
use std::path::{Path, PathBuf};

use crate::settings::Settings;

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Write an example settings file
    #[command(about = "Write an example settings file (.toml, .yaml or .json)")]
    Init {
        /// Destination path
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Print the effective settings
    Show,
}

pub fn handle_command(cmd: ConfigCommands, settings: &Settings) -> Result<()> {
    match cmd {
        ConfigCommands::Init { path, force } => handle_init(&path, force),
        ConfigCommands::Show => {
            println!("{}", serde_json::to_string_pretty(settings)?);
            Ok(())
        },
    }
}

fn handle_init(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }

    common::save_config_to_file(&Settings::example(), path)?;
    println!("{} {}", "Wrote".green(), path.display());
    Ok(())
}
