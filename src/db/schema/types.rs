//! Type catalog.
//!
//! Maps column types to their DDL type, Rust host type and wire type, and
//! produces the conversion expressions generated code uses to move a value
//! between host and wire representation.
//!
//! | Kind      | DDL type    | Host type       | Wire type |
//! |-----------|-------------|-----------------|-----------|
//! | bool      | BOOL        | `bool`          | bool      |
//! | int64     | INT64       | `i64`           | int64     |
//! | float64   | FLOAT64     | `f64`           | float64   |
//! | timestamp | TIMESTAMP   | `DateTime<Utc>` | timestamp |
//! | string    | STRING(MAX) | `String`        | string    |
//! | enum      | FLOAT64     | enum name       | float64   |
//! | message   | BYTES(MAX)  | message name    | bytes     |

use std::collections::HashMap;

use super::definition::{ColumnDefinition, DefinitionKind, ExternalDefinition};
use crate::db::CompileError;
use crate::runtime::WireType;

/// Primitive column types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    Bool,
    Int64,
    Float64,
    Timestamp,
    String,
}

impl PrimitiveType {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "bool" => Some(PrimitiveType::Bool),
            "int64" | "int" => Some(PrimitiveType::Int64),
            "float64" | "float" => Some(PrimitiveType::Float64),
            "timestamp" => Some(PrimitiveType::Timestamp),
            "string" => Some(PrimitiveType::String),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PrimitiveType::Bool => "bool",
            PrimitiveType::Int64 => "int64",
            PrimitiveType::Float64 => "float64",
            PrimitiveType::Timestamp => "timestamp",
            PrimitiveType::String => "string",
        }
    }

    fn ddl_type(&self) -> &'static str {
        match self {
            PrimitiveType::Bool => "BOOL",
            PrimitiveType::Int64 => "INT64",
            PrimitiveType::Float64 => "FLOAT64",
            PrimitiveType::Timestamp => "TIMESTAMP",
            PrimitiveType::String => "STRING(MAX)",
        }
    }

    fn host_type(&self) -> &'static str {
        match self {
            PrimitiveType::Bool => "bool",
            PrimitiveType::Int64 => "i64",
            PrimitiveType::Float64 => "f64",
            PrimitiveType::Timestamp => "DateTime<Utc>",
            PrimitiveType::String => "String",
        }
    }

    fn wire_type(&self) -> WireType {
        match self {
            PrimitiveType::Bool => WireType::Bool,
            PrimitiveType::Int64 => WireType::Int64,
            PrimitiveType::Float64 => WireType::Float64,
            PrimitiveType::Timestamp => WireType::Timestamp,
            PrimitiveType::String => WireType::String,
        }
    }

    fn helper(&self) -> &'static str {
        match self {
            PrimitiveType::Bool => "bool",
            PrimitiveType::Int64 => "int",
            PrimitiveType::Float64 => "float",
            PrimitiveType::Timestamp => "timestamp",
            PrimitiveType::String => "string",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnKind {
    Primitive(PrimitiveType),
    Enum,
    Message,
}

/// A resolved column type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColumnType {
    pub kind: ColumnKind,
    /// Primitive name or enum/message type name.
    pub name: String,
    /// Module path enum/message types are imported from.
    pub import: Option<String>,
    pub is_array: bool,
    pub nullable: bool,
}

impl ColumnType {
    pub fn primitive(primitive: PrimitiveType) -> Self {
        Self {
            kind: ColumnKind::Primitive(primitive),
            name: primitive.name().to_string(),
            import: None,
            is_array: false,
            nullable: false,
        }
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Same element type, neither array nor nullable.
    pub fn scalar(&self) -> Self {
        Self {
            is_array: false,
            nullable: false,
            ..self.clone()
        }
    }

    /// Non-nullable array of the scalar element type.
    pub fn array_of_scalar(&self) -> Self {
        Self {
            is_array: true,
            nullable: false,
            ..self.clone()
        }
    }

    pub fn is_primitive(&self, primitive: PrimitiveType) -> bool {
        self.kind == ColumnKind::Primitive(primitive)
    }

    /// Same kind, type name and array-ness; nullability and import are ignored.
    pub fn same_value_type(&self, other: &ColumnType) -> bool {
        self.kind == other.kind && self.name == other.name && self.is_array == other.is_array
    }

    pub fn ddl_type(&self) -> String {
        let base = match self.kind {
            ColumnKind::Primitive(p) => p.ddl_type(),
            ColumnKind::Enum => "FLOAT64",
            ColumnKind::Message => "BYTES(MAX)",
        };
        if self.is_array {
            format!("Array<{}>", base)
        } else {
            base.to_string()
        }
    }

    pub fn host_type(&self) -> String {
        let base = match self.kind {
            ColumnKind::Primitive(p) => p.host_type().to_string(),
            ColumnKind::Enum | ColumnKind::Message => self.name.clone(),
        };
        let base = if self.is_array {
            format!("Vec<{}>", base)
        } else {
            base
        };
        if self.nullable {
            format!("Option<{}>", base)
        } else {
            base
        }
    }

    pub fn wire_type(&self) -> WireType {
        let base = match self.kind {
            ColumnKind::Primitive(p) => p.wire_type(),
            ColumnKind::Enum => WireType::Float64,
            ColumnKind::Message => WireType::Bytes,
        };
        if self.is_array {
            WireType::array(base)
        } else {
            base
        }
    }

    /// Use-paths the host type needs in generated code.
    pub fn host_imports(&self) -> Vec<String> {
        match (&self.kind, &self.import) {
            (ColumnKind::Primitive(PrimitiveType::Timestamp), _) => {
                vec!["chrono::{DateTime, Utc}".to_string()]
            }
            (ColumnKind::Enum | ColumnKind::Message, Some(import)) => {
                vec![format!("{}::{}", import, self.name)]
            }
            _ => vec![],
        }
    }

    fn helper(&self) -> &'static str {
        match self.kind {
            ColumnKind::Primitive(p) => p.helper(),
            ColumnKind::Enum => "enum",
            ColumnKind::Message => "message",
        }
    }

    /// Expression converting the owned variable `var` into a `WireValue`.
    pub fn marshal_expr(&self, var: &str) -> String {
        let helper = self.helper();
        let element = |v: &str| format!("runtime::{}_to_wire({})", helper, v);
        match (self.nullable, self.is_array) {
            (false, false) => element(&format!("&{}", var)),
            (false, true) => format!("runtime::array_to_wire(&{}, |v| {})", var, element("v")),
            (true, false) => format!(
                "runtime::nullable_to_wire({}.as_ref(), |v| {})",
                var,
                element("v")
            ),
            (true, true) => format!(
                "runtime::nullable_to_wire({}.as_ref(), |v| runtime::array_to_wire(v, |v| {}))",
                var,
                element("v")
            ),
        }
    }

    /// Expression converting the `&WireValue` expression `cell` into the host type.
    ///
    /// The expression evaluates to a `Result`; callers append `?`.
    pub fn unmarshal_expr(&self, cell: &str) -> String {
        let helper = self.helper();
        let element = |v: &str| format!("runtime::{}_from_wire({})", helper, v);
        let value = |v: &str| {
            if self.is_array {
                format!("runtime::array_from_wire({}, |v| {})", v, element("v"))
            } else {
                element(v)
            }
        };
        if self.nullable {
            format!("runtime::nullable_from_wire({}, |v| {})", cell, value("v"))
        } else {
            value(cell)
        }
    }
}

/// Looks up enum/message/service definitions produced outside the database
/// definition.
pub trait DefinitionResolver {
    fn resolve(&self, context: &str, type_name: &str, import: Option<&str>) -> Option<ExternalDefinition>;
}

/// Resolver over a fixed list of definitions, keyed by type name.
#[derive(Debug, Default)]
pub struct StaticResolver {
    definitions: HashMap<String, ExternalDefinition>,
}

impl StaticResolver {
    pub fn new(definitions: &[ExternalDefinition]) -> Self {
        Self {
            definitions: definitions
                .iter()
                .map(|d| (d.name.clone(), d.clone()))
                .collect(),
        }
    }
}

impl DefinitionResolver for StaticResolver {
    fn resolve(&self, context: &str, type_name: &str, import: Option<&str>) -> Option<ExternalDefinition> {
        let found = self.definitions.get(type_name).cloned();
        tracing::trace!(context, type_name, ?import, found = found.is_some(), "resolved definition");
        found
    }
}

/// Resolves column definitions into [`ColumnType`]s.
pub struct TypeCatalog<'r> {
    resolver: &'r dyn DefinitionResolver,
}

impl<'r> TypeCatalog<'r> {
    pub fn new(resolver: &'r dyn DefinitionResolver) -> Self {
        Self { resolver }
    }

    /// `context` names the owner of the column (e.g. the table) in errors.
    pub fn resolve_column(&self, context: &str, column: &ColumnDefinition) -> Result<ColumnType, CompileError> {
        if let Some(primitive) = PrimitiveType::parse(&column.type_name) {
            return Ok(ColumnType {
                is_array: column.is_array,
                nullable: column.nullable,
                ..ColumnType::primitive(primitive)
            });
        }

        let definition = self
            .resolver
            .resolve(context, &column.type_name, column.import.as_deref())
            .ok_or_else(|| {
                CompileError::not_found(
                    "type",
                    column.type_name.clone(),
                    format!(" for column {} of {}", column.name, context),
                )
            })?;

        let kind = match definition.kind {
            DefinitionKind::Enum => ColumnKind::Enum,
            DefinitionKind::Message => ColumnKind::Message,
            DefinitionKind::Service => {
                return Err(CompileError::invalid(format!(
                    "type {} of column {} of {} is neither an enum nor a message.",
                    column.type_name, column.name, context
                )));
            }
        };

        Ok(ColumnType {
            kind,
            name: column.type_name.clone(),
            import: column.import.clone().or(definition.import),
            is_array: column.is_array,
            nullable: column.nullable,
        })
    }
}
