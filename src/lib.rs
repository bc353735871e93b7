//! spanner_gen library - Spanner schema and statement compiler
//!
//! Compiles a declarative database definition into Spanner DDL and Rust
//! statement code, and provides the small runtime that generated code uses.

pub mod cli;
pub mod codegen;
pub mod commands;
pub mod config;
pub mod db;
pub mod generator;
pub mod logging;
pub mod output;
pub mod runtime;
pub mod sink;

#[macro_use]
pub mod test_macros;

#[cfg(test)]
pub mod fixtures;

#[cfg(test)]
pub mod test_utils;
