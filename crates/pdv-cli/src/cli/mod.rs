//! CLI for PDV, the Pulp download verifier.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use commands::{run_bug_status, run_config_path, run_fetch, run_verify};

/// Top-level CLI for PDV.
#[derive(Debug, Parser)]
#[command(name = "pdv")]
#[command(about = "PDV: verify that Pulp serves published content intact", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Publish a synced repository and compare served content with the origin.
    Verify {
        /// Config file to use instead of the default location.
        #[arg(long, value_name = "PATH")]
        config: Option<PathBuf>,
        /// Seed for picking the content unit, for reproducible runs.
        #[arg(long, value_name = "N")]
        seed: Option<u64>,
    },

    /// Show whether the fix for a tracked bug can be asserted.
    BugStatus {
        /// Issue number (default: every tracked bug).
        id: Option<u32>,
        /// Service version to check against (default: configured version).
        #[arg(long, value_name = "V")]
        version: Option<String>,
    },

    /// Download a URL and print its SHA-256.
    Fetch {
        url: String,
        /// Do not verify TLS certificates.
        #[arg(long)]
        insecure: bool,
    },

    /// Print the location of the config file.
    ConfigPath,
}

impl CliCommand {
    pub fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        match cli.command {
            CliCommand::Verify { config, seed } => run_verify(config.as_deref(), seed)?,
            CliCommand::BugStatus { id, version } => run_bug_status(id, version.as_deref())?,
            CliCommand::Fetch { url, insecure } => run_fetch(&url, insecure)?,
            CliCommand::ConfigPath => run_config_path()?,
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests;
