//! Config Commands

use anyhow::{bail, Result};
use clap::Subcommand;
use std::path::Path;

use crate::config::CliConfig;
use crate::output::{print_json, print_success, OutputFormat};

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Write a config file with default values
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the effective configuration
    Show,
}

pub fn execute(cmd: ConfigCommands, path: &Path, effective: &CliConfig, format: OutputFormat) -> Result<()> {
    match cmd {
        ConfigCommands::Init { force } => {
            if path.exists() && !force {
                bail!("{} already exists (use --force to overwrite)", path.display());
            }
            CliConfig::default().save(path)?;
            print_success(&format!("Wrote {}", path.display()));
        }

        ConfigCommands::Show => match format {
            OutputFormat::Json => print_json(effective),
            _ => {
                println!("# {}", path.display());
                print!("{}", toml::to_string_pretty(effective)?);
            }
        },
    }
    Ok(())
}
