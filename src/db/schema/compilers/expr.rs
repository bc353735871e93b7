//! WHERE and JOIN ON expression compiler.
//!
//! Compiles an [`Expr`] tree into SQL by structural recursion. Every `AND`/`OR`
//! node produces exactly one pair of parentheses and leaves are emitted bare,
//! so the nesting of the SQL mirrors the nesting of the tree.

use indexmap::IndexMap;

use super::params::{param_name, ParamAllocator};
use crate::db::schema::registry::{Column, SearchColumn, Table};
use crate::db::schema::statement::{ColumnRef, ConcatExpr, Expr, LeafExpr};
use crate::db::schema::types::{ColumnType, PrimitiveType};
use crate::db::{CompileError, ResultExt};

/// Leaf operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
    IsNull,
    IsNotNull,
    In,
    Search,
}

impl Operator {
    pub fn parse(op: &str) -> Result<Self, CompileError> {
        match op {
            "=" => Ok(Operator::Eq),
            "!=" => Ok(Operator::Ne),
            ">" => Ok(Operator::Gt),
            ">=" => Ok(Operator::Ge),
            "<" => Ok(Operator::Lt),
            "<=" => Ok(Operator::Le),
            "IS NULL" => Ok(Operator::IsNull),
            "IS NOT NULL" => Ok(Operator::IsNotNull),
            "IN" => Ok(Operator::In),
            "SEARCH" => Ok(Operator::Search),
            other => Err(CompileError::unsupported("operator", other)),
        }
    }

    pub fn sql(&self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Ne => "!=",
            Operator::Gt => ">",
            Operator::Ge => ">=",
            Operator::Lt => "<",
            Operator::Le => "<=",
            Operator::IsNull => "IS NULL",
            Operator::IsNotNull => "IS NOT NULL",
            Operator::In => "IN",
            Operator::Search => "SEARCH",
        }
    }

    /// Parameter name suffix.
    pub fn suffix(&self) -> &'static str {
        match self {
            Operator::Eq => "Eq",
            Operator::Ne => "Ne",
            Operator::Gt => "Gt",
            Operator::Ge => "Ge",
            Operator::Lt => "Lt",
            Operator::Le => "Le",
            Operator::IsNull => "IsNull",
            Operator::IsNotNull => "IsNotNull",
            Operator::In => "In",
            Operator::Search => "Search",
        }
    }

    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            Operator::Eq | Operator::Ne | Operator::Gt | Operator::Ge | Operator::Lt | Operator::Le
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConcatOp {
    And,
    Or,
}

impl ConcatOp {
    pub fn parse(op: &str) -> Result<Self, CompileError> {
        match op {
            "AND" => Ok(ConcatOp::And),
            "OR" => Ok(ConcatOp::Or),
            other => Err(CompileError::unsupported("operator", other)),
        }
    }

    fn separator(&self) -> &'static str {
        match self {
            ConcatOp::And => " AND ",
            ConcatOp::Or => " OR ",
        }
    }
}

/// Functions usable in WHERE leaves, select columns and ORDER BY.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlFunction {
    /// `SCORE(search_column, @query)`, a float64 relevance score.
    Score,
}

impl SqlFunction {
    pub fn parse(name: &str) -> Result<Self, CompileError> {
        match name {
            "SCORE" => Ok(SqlFunction::Score),
            other => Err(CompileError::unsupported("function", other)),
        }
    }

    pub fn result_type(&self) -> ColumnType {
        match self {
            SqlFunction::Score => ColumnType::primitive(PrimitiveType::Float64),
        }
    }

    /// Compiles the call over `alias.column`, binding its argument.
    pub fn compile_call(
        &self,
        alias: &str,
        column: &SearchColumn,
        params: &mut ParamAllocator,
    ) -> Result<String, CompileError> {
        match self {
            SqlFunction::Score => {
                let query = params.bind(
                    param_name(alias, &column.name, "ScoreQuery"),
                    ColumnType::primitive(PrimitiveType::String),
                )?;
                Ok(format!("SCORE({}.{}, {})", alias, column.name, query))
            }
        }
    }

    /// Output field name of the call over `alias.column`.
    pub fn field_name(&self, alias: &str, column: &str) -> String {
        match self {
            SqlFunction::Score => param_name(alias, column, "Score"),
        }
    }

    fn allows(&self, op: Operator) -> bool {
        match self {
            SqlFunction::Score => matches!(
                op,
                Operator::Eq | Operator::Gt | Operator::Ge | Operator::Lt | Operator::Le
            ),
        }
    }
}

/// Table aliases visible to a statement.
#[derive(Debug, Clone)]
pub struct Scope<'a> {
    default_alias: String,
    tables: IndexMap<String, &'a Table>,
}

impl<'a> Scope<'a> {
    pub fn new(alias: impl Into<String>, table: &'a Table) -> Self {
        let alias = alias.into();
        let mut tables = IndexMap::new();
        tables.insert(alias.clone(), table);
        Self {
            default_alias: alias,
            tables,
        }
    }

    pub fn add(&mut self, alias: impl Into<String>, table: &'a Table) -> Result<(), CompileError> {
        let alias = alias.into();
        if self.tables.contains_key(&alias) {
            return Err(CompileError::invalid(format!(
                "table alias {} is used more than once.",
                alias
            )));
        }
        self.tables.insert(alias, table);
        Ok(())
    }

    pub fn default_alias(&self) -> &str {
        &self.default_alias
    }

    /// Aliases in the order they entered the scope.
    pub fn aliases(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    /// Resolves an optional alias, defaulting to the statement's primary alias.
    pub fn table(&self, alias: Option<&str>) -> Result<(&str, &'a Table), CompileError> {
        let alias = alias.unwrap_or(&self.default_alias);
        self.tables
            .get_key_value(alias)
            .map(|(a, t)| (a.as_str(), *t))
            .ok_or_else(|| CompileError::not_found("table alias", alias, ""))
    }

    pub fn column(&self, column: &ColumnRef) -> Result<(&str, &'a Column), CompileError> {
        let (alias, table) = self.table(column.table.as_deref())?;
        Ok((alias, table.column(&column.name)?))
    }

    pub fn search_column(&self, column: &ColumnRef) -> Result<(&str, &'a SearchColumn), CompileError> {
        let (alias, table) = self.table(column.table.as_deref())?;
        Ok((alias, table.search_column(&column.name)?))
    }
}

/// Compiles a WHERE clause.
pub fn compile_where(expr: &Expr, scope: &Scope<'_>, params: &mut ParamAllocator) -> Result<String, CompileError> {
    match expr {
        Expr::Concat(concat) => compile_concat(concat, |e| compile_where(e, scope, params)),
        Expr::Leaf(leaf) => compile_where_leaf(leaf, scope, params)
            .with_context(|| format!("and when comparing {}", describe(&leaf.left_column))),
    }
}

/// Compiles a JOIN ON clause.
pub fn compile_on(expr: &Expr, scope: &Scope<'_>, params: &mut ParamAllocator) -> Result<String, CompileError> {
    match expr {
        Expr::Concat(concat) => compile_concat(concat, |e| compile_on(e, scope, params)),
        Expr::Leaf(leaf) => compile_on_leaf(leaf, scope, params)
            .with_context(|| format!("and when comparing {}", describe(&leaf.left_column))),
    }
}

fn compile_concat<F>(concat: &ConcatExpr, mut child: F) -> Result<String, CompileError>
where
    F: FnMut(&Expr) -> Result<String, CompileError>,
{
    let op = ConcatOp::parse(&concat.op)?;
    if concat.exprs.is_empty() {
        return Err(CompileError::missing(format!("exprs of {}", concat.op)));
    }
    let parts = concat
        .exprs
        .iter()
        .map(&mut child)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(format!("({})", parts.join(op.separator())))
}

fn compile_where_leaf(leaf: &LeafExpr, scope: &Scope<'_>, params: &mut ParamAllocator) -> Result<String, CompileError> {
    let op = Operator::parse(&leaf.op)?;
    if leaf.right_column.is_some() {
        return Err(CompileError::invalid(
            "rightColumn is only allowed in join conditions.",
        ));
    }

    if let Some(func) = &leaf.func {
        let func = SqlFunction::parse(func)?;
        if !func.allows(op) {
            return Err(CompileError::invalid(format!(
                "operator {} cannot be applied to {}.",
                op.sql(),
                leaf.func.as_deref().unwrap_or_default()
            )));
        }
        let (alias, search) = scope.search_column(&leaf.left_column)?;
        let call = func.compile_call(alias, search, params)?;
        let name = leaf
            .param_name
            .clone()
            .unwrap_or_else(|| param_name(alias, &search.name, &format!("Score{}", op.suffix())));
        let value = params.bind(name, func.result_type())?;
        return Ok(format!("{} {} {}", call, op.sql(), value));
    }

    if op == Operator::Search {
        let (alias, search) = scope.search_column(&leaf.left_column)?;
        let name = leaf
            .param_name
            .clone()
            .unwrap_or_else(|| param_name(alias, &search.name, op.suffix()));
        let query = params.bind(name, ColumnType::primitive(PrimitiveType::String))?;
        return Ok(format!("SEARCH({}.{}, {})", alias, search.name, query));
    }

    let (alias, column) = scope.column(&leaf.left_column)?;
    let qualified = format!("{}.{}", alias, column.name);
    match op {
        Operator::IsNull | Operator::IsNotNull => {
            if !column.column_type.nullable {
                return Err(CompileError::invalid(format!(
                    "column {} is not nullable and cannot be used with {}.",
                    column.name,
                    op.sql()
                )));
            }
            Ok(format!("{} {}", qualified, op.sql()))
        }
        Operator::In => {
            reject_array(column, op)?;
            let name = leaf
                .param_name
                .clone()
                .unwrap_or_else(|| param_name(alias, &column.name, op.suffix()));
            let placeholder = params.bind(name, column.column_type.array_of_scalar())?;
            Ok(format!("{} IN UNNEST({})", qualified, placeholder))
        }
        _ => {
            reject_array(column, op)?;
            let name = leaf
                .param_name
                .clone()
                .unwrap_or_else(|| param_name(alias, &column.name, op.suffix()));
            let placeholder = params.bind(name, column.column_type.scalar())?;
            Ok(format!("{} {} {}", qualified, op.sql(), placeholder))
        }
    }
}

fn compile_on_leaf(leaf: &LeafExpr, scope: &Scope<'_>, params: &mut ParamAllocator) -> Result<String, CompileError> {
    let op = Operator::parse(&leaf.op)?;
    if !op.is_comparison() {
        return Err(CompileError::invalid(format!(
            "operator {} is not allowed in a join condition.",
            op.sql()
        )));
    }
    if leaf.func.is_some() {
        return Err(CompileError::invalid(
            "functions are not allowed in a join condition.",
        ));
    }

    let (left_alias, left) = scope.column(&leaf.left_column)?;
    reject_array(left, op)?;

    match &leaf.right_column {
        Some(right_ref) => {
            let (right_alias, right) = scope
                .column(right_ref)
                .with_context(|| format!("and when comparing with {}", describe(right_ref)))?;
            reject_array(right, op)?;
            if !left.column_type.same_value_type(&right.column_type) {
                return Err(CompileError::invalid(format!(
                    "column {}.{} of type {} cannot be compared with column {}.{} of type {}.",
                    left_alias,
                    left.name,
                    left.column_type.ddl_type(),
                    right_alias,
                    right.name,
                    right.column_type.ddl_type()
                )));
            }
            Ok(format!(
                "{}.{} {} {}.{}",
                left_alias,
                left.name,
                op.sql(),
                right_alias,
                right.name
            ))
        }
        None => {
            let name = leaf
                .param_name
                .clone()
                .unwrap_or_else(|| param_name(left_alias, &left.name, op.suffix()));
            let placeholder = params.bind(name, left.column_type.scalar())?;
            Ok(format!("{}.{} {} {}", left_alias, left.name, op.sql(), placeholder))
        }
    }
}

fn reject_array(column: &Column, op: Operator) -> Result<(), CompileError> {
    if column.column_type.is_array {
        return Err(CompileError::invalid(format!(
            "column {} is an array and cannot be used with {}.",
            column.name,
            op.sql()
        )));
    }
    Ok(())
}

fn describe(column: &ColumnRef) -> String {
    match &column.table {
        Some(table) => format!("{}.{}", table, column.name),
        None => column.name.clone(),
    }
}
