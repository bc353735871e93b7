//! Rendering of compiled statements to Rust source.

mod rust;

pub use rust::{check_identifiers, RenderedStatement, RustRenderer};
