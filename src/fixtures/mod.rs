//! Test fixtures for compiler and command tests.
//!
//! Fixtures are loaded at compile time using `include_str!`.
//!
//! ## Available Fixtures
//!
//! - [`SHOP`] - a complete database definition

/// Shop database definition.
///
/// Contains:
/// - `Items` with primitive, array, nullable, enum, message and commit
///   timestamp columns, an index, a search column/index, a column group and
///   derived insert/get/delete statements
/// - `Reviews` interleaved in `Items`
/// - `Restocks`, a task table
/// - one insert, update and delete, and two selects (join, search)
pub const SHOP: &str = include_str!("shop.json");

/// Number of statements the shop definition produces, derived ones included.
pub const SHOP_STATEMENT_COUNT: usize = 11;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shop_is_valid_json() {
        let _: serde_json::Value = serde_json::from_str(SHOP).expect("SHOP should be valid JSON");
    }
}
