//! Derived CRUD statements and the task table extension.
//!
//! A table definition may request generated insert/get/delete/update
//! statements by name. They are expressed in the ordinary statement
//! vocabulary and compiled like any other definition, keyed on the table's
//! primary key.
//!
//! A task table is a work queue: three nullable bookkeeping columns are
//! appended to the declared ones, execution time is indexed, and three
//! statements are generated to list due tasks and to read and reschedule a
//! single task.

use crate::db::schema::definition::{ColumnDefinition, IndexDefinition, KeyColumn, TableDefinition};
use crate::db::schema::statement::{
    ColumnRef, DeleteDefinition, Expr, GetColumn, InsertDefinition, OrderBy, SelectDefinition,
    UpdateDefinition,
};
use crate::db::CompileError;

pub const RETRY_COUNT: &str = "retryCount";
pub const EXECUTION_TIME: &str = "executionTime";
pub const CREATED_TIME: &str = "createdTime";

const TASK_COLUMNS: [&str; 3] = [RETRY_COUNT, EXECUTION_TIME, CREATED_TIME];

/// Statement definitions generated for one table.
#[derive(Debug, Clone, Default)]
pub struct DerivedStatements {
    pub inserts: Vec<InsertDefinition>,
    pub updates: Vec<UpdateDefinition>,
    pub deletes: Vec<DeleteDefinition>,
    pub selects: Vec<SelectDefinition>,
}

impl DerivedStatements {
    pub fn is_empty(&self) -> bool {
        self.inserts.is_empty() && self.updates.is_empty() && self.deletes.is_empty() && self.selects.is_empty()
    }

    pub fn len(&self) -> usize {
        self.inserts.len() + self.updates.len() + self.deletes.len() + self.selects.len()
    }
}

/// Returns the definition with task bookkeeping columns and index appended.
///
/// Definitions that are not task tables are returned unchanged.
pub fn augment_task_table(def: &TableDefinition) -> Result<TableDefinition, CompileError> {
    if def.task.is_none() {
        return Ok(def.clone());
    }
    if let Some(reserved) = def.columns.iter().find(|c| TASK_COLUMNS.contains(&c.name.as_str())) {
        return Err(CompileError::invalid(format!(
            "column {} is reserved for task tables.",
            reserved.name
        )));
    }

    let mut augmented = def.clone();
    augmented.columns.push(ColumnDefinition::new(RETRY_COUNT, "float64").nullable());
    augmented.columns.push(ColumnDefinition::new(EXECUTION_TIME, "timestamp").nullable());
    augmented.columns.push(ColumnDefinition::new(CREATED_TIME, "timestamp").nullable());
    augmented.indexes.push(IndexDefinition {
        name: format!("{}ByExecutionTime", def.name),
        columns: vec![KeyColumn::from(EXECUTION_TIME)],
        unique: false,
        null_filtered: false,
    });
    Ok(augmented)
}

/// Builds the statement definitions a (possibly augmented) table requests.
pub fn derive_statements(def: &TableDefinition) -> Result<DerivedStatements, CompileError> {
    let mut derived = DerivedStatements::default();
    let all_columns: Vec<String> = def.columns.iter().map(|c| c.name.clone()).collect();

    if let Some(name) = &def.insert {
        derived.inserts.push(InsertDefinition {
            name: name.clone(),
            table: def.name.clone(),
            set_columns: all_columns.clone(),
            on_conflict: None,
        });
    }

    if let Some(name) = &def.get {
        derived.selects.push(SelectDefinition {
            name: name.clone(),
            from_table: def.name.clone(),
            alias: None,
            joins: vec![],
            where_expr: Some(primary_key_match(def)?),
            order_by: vec![],
            limit: false,
            offset: false,
            get_columns: vec![GetColumn::All { table: None }],
        });
    }

    if let Some(name) = &def.delete {
        derived.deletes.push(DeleteDefinition {
            name: name.clone(),
            table: def.name.clone(),
            where_expr: Some(primary_key_match(def)?),
        });
    }

    if let Some(name) = &def.update {
        let set_columns: Vec<String> = all_columns
            .iter()
            .filter(|c| !def.primary_keys.iter().any(|k| k.name() == c.as_str()))
            .cloned()
            .collect();
        if set_columns.is_empty() {
            return Err(CompileError::invalid(format!(
                "table {} has no columns besides its primary keys to update.",
                def.name
            )));
        }
        derived.updates.push(UpdateDefinition {
            name: name.clone(),
            table: def.name.clone(),
            set_columns,
            where_expr: Some(primary_key_match(def)?),
        });
    }

    if let Some(task) = &def.task {
        let declared = def
            .columns
            .iter()
            .filter(|c| !TASK_COLUMNS.contains(&c.name.as_str()))
            .map(|c| GetColumn::Column {
                name: c.name.clone(),
                table: None,
            })
            .collect();

        derived.selects.push(SelectDefinition {
            name: task
                .list_pending
                .clone()
                .unwrap_or_else(|| format!("ListPending{}", def.name)),
            from_table: def.name.clone(),
            alias: None,
            joins: vec![],
            where_expr: Some(Expr::leaf(ColumnRef::new(EXECUTION_TIME), "<=")),
            order_by: vec![OrderBy::Column {
                name: EXECUTION_TIME.to_string(),
                table: None,
                desc: false,
            }],
            limit: true,
            offset: false,
            get_columns: declared,
        });

        derived.selects.push(SelectDefinition {
            name: task
                .get_metadata
                .clone()
                .unwrap_or_else(|| format!("Get{}Metadata", def.name)),
            from_table: def.name.clone(),
            alias: None,
            joins: vec![],
            where_expr: Some(primary_key_match(def)?),
            order_by: vec![],
            limit: false,
            offset: false,
            get_columns: [RETRY_COUNT, EXECUTION_TIME]
                .iter()
                .map(|name| GetColumn::Column {
                    name: name.to_string(),
                    table: None,
                })
                .collect(),
        });

        derived.updates.push(UpdateDefinition {
            name: task
                .update_metadata
                .clone()
                .unwrap_or_else(|| format!("Update{}Metadata", def.name)),
            table: def.name.clone(),
            set_columns: vec![RETRY_COUNT.to_string(), EXECUTION_TIME.to_string()],
            where_expr: Some(primary_key_match(def)?),
        });
    }

    Ok(derived)
}

/// `pk1 = @.. AND pk2 = @..`; a bare leaf for single-column keys.
fn primary_key_match(def: &TableDefinition) -> Result<Expr, CompileError> {
    let mut leaves: Vec<Expr> = def
        .primary_keys
        .iter()
        .map(|k| Expr::leaf(ColumnRef::new(k.name()), "="))
        .collect();
    match leaves.len() {
        0 => Err(CompileError::missing("primaryKeys")),
        1 => Ok(leaves.remove(0)),
        _ => Ok(Expr::and(leaves)),
    }
}
