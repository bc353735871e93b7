//! Runtime support for generated statement code.
//!
//! Generated builders return a [`Statement`]; generated select functions run it
//! through a [`QueryRunner`] and parse each [`Row`] with the conversion helpers
//! re-exported here.

mod convert;
mod runner;
mod wire;

pub use convert::{
    array_from_wire, array_to_wire, bool_from_wire, bool_to_wire, enum_from_wire, enum_to_wire,
    float_from_wire, float_to_wire, int_from_wire, int_to_wire, message_from_wire,
    message_to_wire, nullable_from_wire, nullable_to_wire, string_from_wire, string_to_wire,
    timestamp_from_wire, timestamp_to_wire, WireEnum, WireMessage,
};
pub use runner::{run_select, QueryRunner};
pub use wire::{Row, Statement, WireType, WireValue};

use thiserror::Error;

/// Runtime error types
#[derive(Error, Debug)]
pub enum Error {
    #[error("Query failed: {message}")]
    Query { message: String },

    #[error("Conversion failed: {message}")]
    Conversion { message: String },

    #[error("Row has {len} cells, cell {index} requested")]
    MissingCell { index: usize, len: usize },
}
