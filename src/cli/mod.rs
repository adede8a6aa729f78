//! Command-line interface for ystr-matcher.
//!
//! This module implements the CLI using clap. Available commands:
//!
//! - **search**: Rank database kits by genetic distance to a query kit
//! - **compare**: Show the distance figures for two kits
//! - **panels**: List the markers and thresholds of each panel
//! - **worker**: Serve the batch protocol as JSON lines over stdio
//!
//! ## Usage
//!
//! ```text
//! # Closest 37-marker matches for a kit already in the database
//! ystr-matcher search --database ftdna.csv.gz --query-kit 123456 --panel 37 --mode standard
//!
//! # Query profile from its own file, JSON report
//! ystr-matcher search --database ftdna.csv --query me.json --panel 67 --mode extended --format json
//!
//! # Two kits side by side
//! ystr-matcher compare --database ftdna.csv 123456 654321 --panel 111 --mode extended
//!
//! # Drive the engine from another process
//! ystr-matcher worker < messages.jsonl
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::core::profile::StrProfile;
use crate::core::types::{CalculationMode, PanelSize};
use crate::parsing::profiles::{load_profiles, load_profiles_as, ProfileFormat};

pub mod compare;
pub mod panels;
pub mod search;
pub mod worker;

#[derive(Parser)]
#[command(name = "ystr-matcher")]
#[command(version)]
#[command(about = "Find genetic-distance matches between Y-STR profiles")]
#[command(
    long_about = "ystr-matcher compares a Y-STR profile against a database of kits on a fixed marker panel (12, 37, 67 or 111 markers).\n\nIt reports:\n- Genetic distance per candidate, in standard or extended mode\n- The closest matches, ranked by distance then kit number\n- Marker coverage for each match"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Rank database kits by genetic distance to a query profile
    Search(search::SearchArgs),

    /// Compare two kits from a database
    Compare(compare::CompareArgs),

    /// List marker panels
    Panels(panels::PanelsArgs),

    /// Run the batch protocol over stdin/stdout
    Worker(worker::WorkerArgs),
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Tsv,
}

/// Arguments shared by every command that computes distances
#[derive(clap::Args, Clone, Debug)]
pub struct DatabaseArgs {
    /// Profile database (JSON, JSON lines, CSV or TSV; optionally gzipped)
    #[arg(short, long)]
    pub database: PathBuf,

    /// Database format (detected from the extension by default)
    #[arg(long, value_enum)]
    pub database_format: Option<ProfileFormat>,

    /// Marker panel: 12, 37, 67 or 111
    #[arg(short, long)]
    pub panel: PanelSize,

    /// How multi-copy markers are scored
    #[arg(short, long, value_enum)]
    pub mode: CalculationMode,
}

impl DatabaseArgs {
    /// Load the database named by `--database`
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(&self, verbose: bool) -> anyhow::Result<Vec<StrProfile>> {
        let profiles = match self.database_format {
            Some(format) => load_profiles_as(&self.database, format)?,
            None => load_profiles(&self.database)?,
        };
        if verbose {
            eprintln!(
                "Loaded {} profiles from {}",
                profiles.len(),
                self.database.display()
            );
        }
        Ok(profiles)
    }
}

/// Find a kit in a loaded database
///
/// # Errors
///
/// Returns an error naming the kit if it is absent.
pub fn find_kit<'a>(profiles: &'a [StrProfile], kit_number: &str) -> anyhow::Result<&'a StrProfile> {
    profiles
        .iter()
        .find(|p| p.kit_number == kit_number)
        .ok_or_else(|| anyhow::anyhow!("Kit '{kit_number}' not found in database"))
}
