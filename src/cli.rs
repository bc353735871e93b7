//! CLI argument definitions.
//!
//! This module contains the top-level CLI structure and shared types.
//! Individual command definitions are in the `commands` module.

use clap::Parser;
use std::path::PathBuf;

use crate::commands::Command;
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Configuration file (defaults to ./.spanner_gen.json when present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log compiler progress to stderr
    #[arg(short, long, default_value_t = false, global = true)]
    pub verbose: bool,

    /// Output format (overrides the configuration file)
    #[arg(long, value_enum, global = true)]
    pub format: Option<OutputFormat>,

    #[command(subcommand)]
    pub command: Command,
}
