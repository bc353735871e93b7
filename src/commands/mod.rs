//! Command definitions and implementations.
//!
//! Each command is defined in its own module with:
//! - The command struct with clap attributes for CLI parsing
//! - An `Execute` implementation producing an `Outputable` result

mod ddl;
mod generate;

pub use ddl::{DdlCmd, DdlResult};
pub use generate::{GenerateCmd, GenerateResult};

use clap::Subcommand;
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::db::schema::DatabaseDefinition;
use crate::output::{OutputFormat, Outputable};

/// Trait for executing commands with command-specific result types.
pub trait Execute {
    type Output: Outputable;

    fn execute(self, config: &Config) -> Result<Self::Output, Box<dyn Error>>;
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compile a definition into DDL and Rust statement code
    Generate(GenerateCmd),

    /// Print the DDL a definition compiles to
    Ddl(DdlCmd),

    /// Catch-all for unknown commands
    #[command(external_subcommand)]
    Unknown(Vec<String>),
}

impl Command {
    /// Execute the command and return formatted output
    pub fn run(self, config: &Config, format: OutputFormat) -> Result<String, Box<dyn Error>> {
        match self {
            Command::Generate(cmd) => {
                let result = cmd.execute(config)?;
                Ok(result.format(format))
            }
            Command::Ddl(cmd) => {
                let result = cmd.execute(config)?;
                Ok(result.format(format))
            }
            Command::Unknown(args) => {
                Err(format!("Unknown command: {}", args.first().map(String::as_str).unwrap_or_default()).into())
            }
        }
    }
}

fn validate_file_exists(s: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(s);
    if path.exists() {
        Ok(path)
    } else {
        Err(format!("File not found: {}", path.display()))
    }
}

/// Read and parse a definition file.
pub fn load_definition(path: &Path) -> Result<DatabaseDefinition, Box<dyn Error>> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    let definition = DatabaseDefinition::from_json_str(&content)
        .map_err(|e| format!("Invalid definition in {}: {}", path.display(), e))?;
    Ok(definition)
}
