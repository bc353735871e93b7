mod execute;
mod output;

use std::path::PathBuf;

use clap::Args;

pub use execute::DdlResult;

use super::validate_file_exists;

/// Print the DDL a definition compiles to
#[derive(Args, Debug)]
#[command(after_help = "\
Examples:
  spanner_gen ddl -d shop.json                 # One statement per line
  spanner_gen --format json ddl -d shop.json   # The DDL artifact as JSON")]
pub struct DdlCmd {
    /// Path to the database definition JSON file
    #[arg(short, long, value_parser = validate_file_exists)]
    pub definition: PathBuf,
}
