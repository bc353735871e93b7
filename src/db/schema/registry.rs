//! Schema registry.
//!
//! Holds every table compiled so far in a generation pass, in declaration
//! order. Statements are compiled against the registry, so a table must be
//! declared before any statement that references it.

use indexmap::IndexMap;

use super::definition::TableDefinition;
use super::types::ColumnType;
use crate::db::CompileError;

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub column_type: ColumnType,
    pub allow_commit_timestamp: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPart {
    pub name: String,
    pub desc: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchColumn {
    pub name: String,
    pub source_columns: Vec<String>,
}

/// A validated table.
#[derive(Debug, Clone)]
pub struct Table {
    pub name: String,
    pub columns: IndexMap<String, Column>,
    pub primary_keys: Vec<KeyPart>,
    pub search_columns: IndexMap<String, SearchColumn>,
    pub column_groups: IndexMap<String, Vec<String>>,
    /// The definition the table was compiled from, task columns included.
    pub definition: TableDefinition,
}

impl Table {
    pub fn column(&self, name: &str) -> Result<&Column, CompileError> {
        self.columns
            .get(name)
            .ok_or_else(|| CompileError::not_found("column", name, format!(" in table {}", self.name)))
    }

    pub fn search_column(&self, name: &str) -> Result<&SearchColumn, CompileError> {
        self.search_columns.get(name).ok_or_else(|| {
            CompileError::not_found("search column", name, format!(" in table {}", self.name))
        })
    }

    pub fn column_group(&self, name: &str) -> Result<&[String], CompileError> {
        self.column_groups
            .get(name)
            .map(Vec::as_slice)
            .ok_or_else(|| {
                CompileError::not_found("column group", name, format!(" in table {}", self.name))
            })
    }

    pub fn is_primary_key(&self, name: &str) -> bool {
        self.primary_keys.iter().any(|k| k.name == name)
    }
}

#[derive(Debug, Default)]
pub struct SchemaRegistry {
    tables: IndexMap<String, Table>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, table: Table) -> Result<(), CompileError> {
        if self.tables.contains_key(&table.name) {
            return Err(CompileError::invalid(format!(
                "table {} is declared more than once.",
                table.name
            )));
        }
        self.tables.insert(table.name.clone(), table);
        Ok(())
    }

    pub fn table(&self, name: &str) -> Result<&Table, CompileError> {
        self.tables
            .get(name)
            .ok_or_else(|| CompileError::not_found("table", name, ""))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    /// Tables in declaration order.
    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.tables.values()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}
