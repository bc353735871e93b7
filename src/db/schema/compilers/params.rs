//! Deterministic parameter naming and allocation.

use heck::{ToLowerCamelCase, ToUpperCamelCase};

use crate::db::schema::types::ColumnType;
use crate::db::CompileError;

/// A named statement parameter and the column type its value is marshalled as.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundParam {
    pub name: String,
    pub column_type: ColumnType,
}

/// Builds `<lowerCamel alias><UpperCamel column><suffix>`.
pub fn param_name(alias: &str, column: &str, suffix: &str) -> String {
    format!(
        "{}{}{}",
        alias.to_lower_camel_case(),
        column.to_upper_camel_case(),
        suffix
    )
}

/// Collects parameters in first-binding order.
///
/// Binding a name twice with the same wire type yields the same parameter, so
/// two leaves comparing one column with one operator read a single value. A
/// leaf's `paramName` gives it a parameter of its own. Binding a name with a
/// different wire type is an error.
#[derive(Debug, Default)]
pub struct ParamAllocator {
    params: Vec<BoundParam>,
}

impl ParamAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the SQL placeholder for the parameter.
    pub fn bind(&mut self, name: impl Into<String>, column_type: ColumnType) -> Result<String, CompileError> {
        let name = name.into();
        if name.is_empty() {
            return Err(CompileError::missing("paramName"));
        }
        if let Some(existing) = self.params.iter().find(|p| p.name == name) {
            if existing.column_type.wire_type() != column_type.wire_type() {
                return Err(CompileError::invalid(format!(
                    "parameter {} is bound as both {} and {}.",
                    name,
                    existing.column_type.wire_type(),
                    column_type.wire_type()
                )));
            }
        } else {
            tracing::trace!(param = %name, wire_type = %column_type.wire_type(), "bound parameter");
            self.params.push(BoundParam {
                name: name.clone(),
                column_type,
            });
        }
        Ok(format!("@{}", name))
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn into_params(self) -> Vec<BoundParam> {
        self.params
    }
}
