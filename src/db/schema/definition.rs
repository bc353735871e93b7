//! Table and database definition types.
//!
//! This is the input model of a generation pass, deserialized from the JSON
//! definition file. Fields stay close to what the author wrote; validation
//! happens in the compilers so that failures carry a context chain.

use serde::{Deserialize, Serialize};

use super::statement::{DeleteDefinition, InsertDefinition, SelectDefinition, UpdateDefinition};

/// Root of a definition file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseDefinition {
    pub name: String,

    /// Output path of the DDL artifact, relative to the output directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_ddl: Option<String>,

    /// Output path of the generated Rust source, relative to the output directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_sql: Option<String>,

    /// Enum and message types produced by the descriptor generator.
    #[serde(default)]
    pub definitions: Vec<ExternalDefinition>,

    #[serde(default)]
    pub tables: Vec<TableDefinition>,

    #[serde(default)]
    pub inserts: Vec<InsertDefinition>,

    #[serde(default)]
    pub updates: Vec<UpdateDefinition>,

    #[serde(default)]
    pub deletes: Vec<DeleteDefinition>,

    #[serde(default)]
    pub selects: Vec<SelectDefinition>,
}

impl DatabaseDefinition {
    pub fn from_json_str(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }
}

/// Kind of a type declared outside of the database definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DefinitionKind {
    Enum,
    Message,
    Service,
}

/// A named enum, message or service declared by the descriptor generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalDefinition {
    pub name: String,
    pub kind: DefinitionKind,
    /// Module path the type is imported from in generated code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub import: Option<String>,
}

/// A single column of a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDefinition {
    pub name: String,

    /// Primitive name (`bool`, `int64`, `float64`, `timestamp`, `string`) or
    /// the name of an enum/message definition.
    #[serde(rename = "type")]
    pub type_name: String,

    #[serde(default)]
    pub is_array: bool,

    #[serde(default)]
    pub nullable: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub import: Option<String>,

    #[serde(default)]
    pub allow_commit_timestamp: bool,
}

impl ColumnDefinition {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            is_array: false,
            nullable: false,
            import: None,
            allow_commit_timestamp: false,
        }
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn array(mut self) -> Self {
        self.is_array = true;
        self
    }
}

/// A key column reference: a bare name (ascending) or `{ name, desc }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KeyColumn {
    Name(String),
    Entry {
        name: String,
        #[serde(default)]
        desc: bool,
    },
}

impl KeyColumn {
    pub fn name(&self) -> &str {
        match self {
            KeyColumn::Name(name) => name,
            KeyColumn::Entry { name, .. } => name,
        }
    }

    pub fn desc(&self) -> bool {
        match self {
            KeyColumn::Name(_) => false,
            KeyColumn::Entry { desc, .. } => *desc,
        }
    }
}

impl From<&str> for KeyColumn {
    fn from(name: &str) -> Self {
        KeyColumn::Name(name.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterleaveDefinition {
    pub parent_table: String,
    #[serde(default)]
    pub cascade_on_delete: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexDefinition {
    pub name: String,
    pub columns: Vec<KeyColumn>,
    #[serde(default)]
    pub unique: bool,
    #[serde(default)]
    pub null_filtered: bool,
}

/// A hidden TOKENLIST column tokenizing one or more string columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchColumnDefinition {
    pub name: String,
    pub source_columns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchIndexDefinition {
    pub name: String,
    /// Search columns covered by the index.
    pub columns: Vec<String>,
    #[serde(default)]
    pub partition_by_columns: Vec<String>,
    #[serde(default)]
    pub order_by_columns: Vec<String>,
}

/// A named subset of columns, selectable as a unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnGroupDefinition {
    pub name: String,
    pub columns: Vec<String>,
}

/// Statement names generated for a task table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskTableOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list_pending: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub get_metadata: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_metadata: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableDefinition {
    pub name: String,

    #[serde(default)]
    pub columns: Vec<ColumnDefinition>,

    #[serde(default)]
    pub primary_keys: Vec<KeyColumn>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interleave: Option<InterleaveDefinition>,

    #[serde(default)]
    pub indexes: Vec<IndexDefinition>,

    #[serde(default)]
    pub search_columns: Vec<SearchColumnDefinition>,

    #[serde(default)]
    pub search_indexes: Vec<SearchIndexDefinition>,

    #[serde(default)]
    pub column_groups: Vec<ColumnGroupDefinition>,

    /// Name of the derived insert statement, if requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insert: Option<String>,

    /// Name of the derived get-by-primary-key statement, if requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub get: Option<String>,

    /// Name of the derived delete-by-primary-key statement, if requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete: Option<String>,

    /// Name of the derived update-by-primary-key statement, if requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update: Option<String>,

    /// Marks the table as a task table.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task: Option<TaskTableOptions>,
}
