mod execute;
mod output;

use std::path::PathBuf;

use clap::Args;
use serde::Serialize;

pub use execute::GenerateResult;

use super::validate_file_exists;

/// Compile a definition into DDL and Rust statement code
#[derive(Args, Debug)]
#[command(after_help = "\
Examples:
  spanner_gen generate -d shop.json                 # Write into the configured output directory
  spanner_gen generate -d shop.json -o src/db       # Write into src/db
  spanner_gen --format json generate -d shop.json   # Summary as JSON")]
pub struct GenerateCmd {
    /// Path to the database definition JSON file
    #[arg(short, long, value_parser = validate_file_exists)]
    pub definition: PathBuf,
    /// Output directory (overrides the configuration file)
    #[arg(short, long)]
    pub out_dir: Option<PathBuf>,
}

/// One written file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WrittenFile {
    pub path: String,
    pub bytes: usize,
}
