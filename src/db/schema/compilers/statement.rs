//! Statement compiler.
//!
//! Compiles insert, update, delete and select definitions against the
//! [`SchemaRegistry`] into a [`CompiledStatement`]: SQL text, the bound
//! parameters in first-binding order and, for selects, the output row fields.

use std::collections::HashSet;

use heck::ToUpperCamelCase;
use serde::Serialize;

use super::expr::{compile_on, compile_where, Scope, SqlFunction};
use super::params::{param_name, BoundParam, ParamAllocator};
use crate::db::schema::registry::{Column, SchemaRegistry, Table};
use crate::db::schema::statement::{
    DeleteDefinition, GetColumn, InsertDefinition, JoinDefinition, OrderBy, SelectDefinition,
    UpdateDefinition,
};
use crate::db::schema::types::{ColumnType, PrimitiveType};
use crate::db::{CompileError, ResultExt};

const COMMIT_TIMESTAMP: &str = "PENDING_COMMIT_TIMESTAMP()";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatementKind {
    Insert,
    Update,
    Delete,
    Select,
}

impl std::fmt::Display for StatementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            StatementKind::Insert => "insert",
            StatementKind::Update => "update",
            StatementKind::Delete => "delete",
            StatementKind::Select => "select",
        };
        write!(f, "{}", name)
    }
}

/// A field of a select output row, in SELECT list order.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputField {
    pub name: String,
    pub column_type: ColumnType,
}

#[derive(Debug, Clone)]
pub struct CompiledStatement {
    pub name: String,
    pub kind: StatementKind,
    pub sql: String,
    pub params: Vec<BoundParam>,
    pub outputs: Vec<OutputField>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConflictMode {
    Ignore,
    Update,
}

impl ConflictMode {
    fn parse(mode: &str) -> Result<Self, CompileError> {
        match mode {
            "IGNORE" => Ok(ConflictMode::Ignore),
            "UPDATE" => Ok(ConflictMode::Update),
            other => Err(CompileError::unsupported("on conflict mode", other)),
        }
    }

    fn sql(&self) -> &'static str {
        match self {
            ConflictMode::Ignore => "INSERT OR IGNORE",
            ConflictMode::Update => "INSERT OR UPDATE",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum JoinType {
    Inner,
    Cross,
    Full,
    Left,
    Right,
}

impl JoinType {
    fn parse(join_type: &str) -> Result<Self, CompileError> {
        match join_type {
            "INNER" => Ok(JoinType::Inner),
            "CROSS" => Ok(JoinType::Cross),
            "FULL" => Ok(JoinType::Full),
            "LEFT" => Ok(JoinType::Left),
            "RIGHT" => Ok(JoinType::Right),
            other => Err(CompileError::unsupported("join type", other)),
        }
    }

    fn sql(&self) -> &'static str {
        match self {
            JoinType::Inner => "INNER JOIN",
            JoinType::Cross => "CROSS JOIN",
            JoinType::Full => "FULL JOIN",
            JoinType::Left => "LEFT JOIN",
            JoinType::Right => "RIGHT JOIN",
        }
    }
}

/// Compiles statement definitions against the tables registered so far.
pub struct StatementCompiler<'a> {
    registry: &'a SchemaRegistry,
}

impl<'a> StatementCompiler<'a> {
    pub fn new(registry: &'a SchemaRegistry) -> Self {
        Self { registry }
    }

    pub fn compile_insert(&self, def: &InsertDefinition) -> Result<CompiledStatement, CompileError> {
        let label = format!("When generating {}", def.name);
        let statement = self.insert(def).context(label)?;
        log_compiled(&statement);
        Ok(statement)
    }

    pub fn compile_update(&self, def: &UpdateDefinition) -> Result<CompiledStatement, CompileError> {
        let label = format!("When generating {}", def.name);
        let statement = self.update(def).context(label)?;
        log_compiled(&statement);
        Ok(statement)
    }

    pub fn compile_delete(&self, def: &DeleteDefinition) -> Result<CompiledStatement, CompileError> {
        let label = format!("When generating {}", def.name);
        let statement = self.delete(def).context(label)?;
        log_compiled(&statement);
        Ok(statement)
    }

    pub fn compile_select(&self, def: &SelectDefinition) -> Result<CompiledStatement, CompileError> {
        let label = format!("When generating {}", def.name);
        let statement = self.select(def).context(label)?;
        log_compiled(&statement);
        Ok(statement)
    }

    fn insert(&self, def: &InsertDefinition) -> Result<CompiledStatement, CompileError> {
        require(&def.name, "name")?;
        require(&def.table, "table")?;
        if def.set_columns.is_empty() {
            return Err(CompileError::missing("setColumns"));
        }
        let table = self.registry.table(&def.table)?;
        let verb = match &def.on_conflict {
            Some(mode) => ConflictMode::parse(mode)?.sql(),
            None => "INSERT",
        };

        let mut params = ParamAllocator::new();
        let mut values = Vec::with_capacity(def.set_columns.len());
        for column in set_columns(table, &def.set_columns)? {
            if column.allow_commit_timestamp {
                values.push(COMMIT_TIMESTAMP.to_string());
            } else {
                values.push(params.bind(column.name.clone(), column.column_type.clone())?);
            }
        }

        Ok(CompiledStatement {
            name: def.name.clone(),
            kind: StatementKind::Insert,
            sql: format!(
                "{} {} ({}) VALUES ({})",
                verb,
                table.name,
                def.set_columns.join(", "),
                values.join(", ")
            ),
            params: params.into_params(),
            outputs: vec![],
        })
    }

    fn update(&self, def: &UpdateDefinition) -> Result<CompiledStatement, CompileError> {
        require(&def.name, "name")?;
        require(&def.table, "table")?;
        if def.set_columns.is_empty() {
            return Err(CompileError::missing("setColumns"));
        }
        let where_expr = def.where_expr.as_ref().ok_or_else(|| CompileError::missing("where"))?;
        let table = self.registry.table(&def.table)?;

        let mut params = ParamAllocator::new();
        let mut assignments = Vec::with_capacity(def.set_columns.len());
        for column in set_columns(table, &def.set_columns)? {
            if table.is_primary_key(&column.name) {
                return Err(CompileError::invalid(format!(
                    "primary key column {} cannot be updated.",
                    column.name
                )));
            }
            let value = if column.allow_commit_timestamp {
                COMMIT_TIMESTAMP.to_string()
            } else {
                params.bind(
                    format!("set{}", column.name.to_upper_camel_case()),
                    column.column_type.clone(),
                )?
            };
            assignments.push(format!("{} = {}", column.name, value));
        }

        let scope = Scope::new(table.name.clone(), table);
        let where_sql = compile_where(where_expr, &scope, &mut params).context("and when generating where")?;

        Ok(CompiledStatement {
            name: def.name.clone(),
            kind: StatementKind::Update,
            sql: format!(
                "UPDATE {} SET {} WHERE {}",
                table.name,
                assignments.join(", "),
                where_sql
            ),
            params: params.into_params(),
            outputs: vec![],
        })
    }

    fn delete(&self, def: &DeleteDefinition) -> Result<CompiledStatement, CompileError> {
        require(&def.name, "name")?;
        require(&def.table, "table")?;
        let where_expr = def.where_expr.as_ref().ok_or_else(|| CompileError::missing("where"))?;
        let table = self.registry.table(&def.table)?;

        let mut params = ParamAllocator::new();
        let scope = Scope::new(table.name.clone(), table);
        let where_sql = compile_where(where_expr, &scope, &mut params).context("and when generating where")?;

        Ok(CompiledStatement {
            name: def.name.clone(),
            kind: StatementKind::Delete,
            sql: format!("DELETE FROM {} WHERE {}", table.name, where_sql),
            params: params.into_params(),
            outputs: vec![],
        })
    }

    fn select(&self, def: &SelectDefinition) -> Result<CompiledStatement, CompileError> {
        require(&def.name, "name")?;
        require(&def.from_table, "fromTable")?;
        if def.get_columns.is_empty() {
            return Err(CompileError::missing("getColumns"));
        }
        let from = self.registry.table(&def.from_table)?;
        let alias = def.alias.clone().unwrap_or_else(|| from.name.clone());

        let mut scope = Scope::new(alias.clone(), from);
        let mut params = ParamAllocator::new();
        // Aliases whose columns may be NULL because of an outer join.
        let mut outer: HashSet<String> = HashSet::new();
        let mut sql_joins = String::new();

        for join in &def.joins {
            let join_alias = join.alias.clone().unwrap_or_else(|| join.table.clone());
            let clause = self
                .join(join, &join_alias, &mut scope, &mut outer, &mut params)
                .with_context(|| format!("and when joining {}", join_alias))?;
            sql_joins.push_str(&clause);
        }

        let where_sql = match &def.where_expr {
            Some(expr) => Some(compile_where(expr, &scope, &mut params).context("and when generating where")?),
            None => None,
        };

        let mut columns = Vec::new();
        let mut outputs: Vec<OutputField> = Vec::new();
        for get in &def.get_columns {
            let expanded = expand_get_column(get, &scope, &outer, &mut params)
                .with_context(|| format!("and when generating column {}", describe_get(get)))?;
            for (sql, field) in expanded {
                if outputs.iter().any(|o| o.name == field.name) {
                    return Err(CompileError::invalid(format!(
                        "output field {} is selected more than once.",
                        field.name
                    )));
                }
                columns.push(sql);
                outputs.push(field);
            }
        }

        let order_by = def
            .order_by
            .iter()
            .map(|o| compile_order_by(o, &scope, &mut params))
            .collect::<Result<Vec<_>, _>>()
            .context("and when generating order by")?;

        let mut sql = format!("SELECT {} FROM {}", columns.join(", "), from.name);
        if alias != from.name {
            sql.push_str(&format!(" AS {}", alias));
        }
        sql.push_str(&sql_joins);
        if let Some(where_sql) = where_sql {
            sql.push_str(&format!(" WHERE {}", where_sql));
        }
        if !order_by.is_empty() {
            sql.push_str(&format!(" ORDER BY {}", order_by.join(", ")));
        }
        if def.offset && !def.limit {
            return Err(CompileError::invalid("offset requires limit."));
        }
        let int64 = ColumnType::primitive(PrimitiveType::Int64);
        if def.limit {
            sql.push_str(&format!(" LIMIT {}", params.bind("limit", int64.clone())?));
        }
        if def.offset {
            sql.push_str(&format!(" OFFSET {}", params.bind("offset", int64)?));
        }

        Ok(CompiledStatement {
            name: def.name.clone(),
            kind: StatementKind::Select,
            sql,
            params: params.into_params(),
            outputs,
        })
    }

    fn join(
        &self,
        join: &JoinDefinition,
        alias: &str,
        scope: &mut Scope<'a>,
        outer: &mut HashSet<String>,
        params: &mut ParamAllocator,
    ) -> Result<String, CompileError> {
        require(&join.table, "table")?;
        let join_type = JoinType::parse(&join.join_type)?;
        let table = self.registry.table(&join.table)?;
        let previous: Vec<String> = scope.aliases().map(str::to_string).collect();
        scope.add(alias, table)?;

        match join_type {
            JoinType::Left => {
                outer.insert(alias.to_string());
            }
            JoinType::Right => outer.extend(previous),
            JoinType::Full => {
                outer.extend(previous);
                outer.insert(alias.to_string());
            }
            JoinType::Inner | JoinType::Cross => {}
        }

        let mut clause = format!(" {} {}", join_type.sql(), table.name);
        if alias != table.name {
            clause.push_str(&format!(" AS {}", alias));
        }
        match (join_type, &join.on) {
            (JoinType::Cross, Some(_)) => {
                return Err(CompileError::invalid("CROSS JOIN takes no join condition."));
            }
            (JoinType::Cross, None) => {}
            (_, None) => return Err(CompileError::missing("on")),
            (_, Some(expr)) => {
                clause.push_str(&format!(" ON {}", compile_on(expr, scope, params)?));
            }
        }
        Ok(clause)
    }
}

fn log_compiled(statement: &CompiledStatement) {
    tracing::debug!(
        statement = %statement.name,
        kind = %statement.kind,
        params = statement.params.len(),
        outputs = statement.outputs.len(),
        "compiled statement"
    );
}

fn require(value: &str, field: &str) -> Result<(), CompileError> {
    if value.is_empty() {
        return Err(CompileError::missing(field));
    }
    Ok(())
}

fn set_columns<'t>(table: &'t Table, names: &[String]) -> Result<Vec<&'t Column>, CompileError> {
    let mut columns: Vec<&Column> = Vec::with_capacity(names.len());
    for name in names {
        let column = table.column(name)?;
        if columns.iter().any(|c| c.name == column.name) {
            return Err(CompileError::invalid(format!(
                "column {} is set more than once.",
                name
            )));
        }
        columns.push(column);
    }
    Ok(columns)
}

fn output_column(alias: &str, column: &Column, outer: &HashSet<String>) -> (String, OutputField) {
    let mut column_type = column.column_type.clone();
    if outer.contains(alias) {
        column_type.nullable = true;
    }
    (
        format!("{}.{}", alias, column.name),
        OutputField {
            name: param_name(alias, &column.name, ""),
            column_type,
        },
    )
}

fn expand_get_column(
    get: &GetColumn,
    scope: &Scope<'_>,
    outer: &HashSet<String>,
    params: &mut ParamAllocator,
) -> Result<Vec<(String, OutputField)>, CompileError> {
    match get {
        GetColumn::Column { name, table } => {
            let (alias, table) = scope.table(table.as_deref())?;
            Ok(vec![output_column(alias, table.column(name)?, outer)])
        }
        GetColumn::All { table } => {
            let (alias, table) = scope.table(table.as_deref())?;
            Ok(table
                .columns
                .values()
                .map(|c| output_column(alias, c, outer))
                .collect())
        }
        GetColumn::Group { name, table } => {
            let (alias, table) = scope.table(table.as_deref())?;
            table
                .column_group(name)?
                .iter()
                .map(|c| -> Result<_, CompileError> { Ok(output_column(alias, table.column(c)?, outer)) })
                .collect()
        }
        GetColumn::Func { func, name, table } => {
            let func = SqlFunction::parse(func)?;
            let (alias, table) = scope.table(table.as_deref())?;
            let search = table.search_column(name)?;
            let sql = func.compile_call(alias, search, params)?;
            let mut column_type = func.result_type();
            if outer.contains(alias) {
                column_type.nullable = true;
            }
            Ok(vec![(
                sql,
                OutputField {
                    name: func.field_name(alias, &search.name),
                    column_type,
                },
            )])
        }
    }
}

fn compile_order_by(
    order: &OrderBy,
    scope: &Scope<'_>,
    params: &mut ParamAllocator,
) -> Result<String, CompileError> {
    let (expr, desc) = match order {
        OrderBy::Column { name, table, desc } => {
            let (alias, table) = scope.table(table.as_deref())?;
            let column = table.column(name)?;
            if column.column_type.is_array {
                return Err(CompileError::invalid(format!(
                    "column {} is an array and cannot be ordered by.",
                    name
                )));
            }
            (format!("{}.{}", alias, column.name), *desc)
        }
        OrderBy::Func { func, name, table, desc } => {
            let func = SqlFunction::parse(func)?;
            let (alias, table) = scope.table(table.as_deref())?;
            (func.compile_call(alias, table.search_column(name)?, params)?, *desc)
        }
    };
    Ok(format!("{} {}", expr, if desc { "DESC" } else { "ASC" }))
}

fn describe_get(get: &GetColumn) -> String {
    let qualify = |table: &Option<String>, name: &str| match table {
        Some(table) => format!("{}.{}", table, name),
        None => name.to_string(),
    };
    match get {
        GetColumn::Column { name, table } | GetColumn::Group { name, table } => qualify(table, name),
        GetColumn::All { table } => qualify(table, "*"),
        GetColumn::Func { func, name, table } => format!("{}({})", func, qualify(table, name)),
    }
}
