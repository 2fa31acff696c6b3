use crate::utils::error::Result;
use crate::utils::validation::{validate_path, Validate};
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "ipa-import")]
#[command(about = "Synchronize FreeIPA users and groups with a CSV personnel export")]
#[command(version)]
pub struct CliConfig {
    /// CSV export to import; the first row is skipped as header
    pub csv_file: PathBuf,

    /// TOML settings file (columns, default groups, separators, ipa binary)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit log lines as JSON
    #[arg(long)]
    pub log_json: bool,

    /// Accept the computed changes without asking
    #[arg(short = 'y', long)]
    pub yes: bool,

    /// Print the computed changes and exit without applying them
    #[arg(long, conflicts_with = "yes")]
    pub dry_run: bool,

    /// Exit with status 3 if any directory command fails while applying changes
    #[arg(long)]
    pub strict: bool,
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_path("csv_file", &self.csv_file.to_string_lossy())?;
        if let Some(config) = &self.config {
            validate_path("config", &config.to_string_lossy())?;
        }
        Ok(())
    }
}
