//! Statement and expression definition types.
//!
//! Operators, join types and conflict modes are kept as the strings the
//! author wrote and parsed by the compilers.

use serde::{Deserialize, Serialize};

/// A column, optionally qualified by a table alias.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnRef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
}

impl ColumnRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            table: None,
        }
    }

    pub fn qualified(table: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            table: Some(table.into()),
        }
    }
}

/// Boolean predicate tree used by WHERE and JOIN ON clauses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Expr {
    Concat(ConcatExpr),
    Leaf(LeafExpr),
}

/// `AND`/`OR` over child expressions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConcatExpr {
    pub op: String,
    pub exprs: Vec<Expr>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeafExpr {
    pub op: String,

    pub left_column: ColumnRef,

    /// Only valid in JOIN ON clauses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right_column: Option<ColumnRef>,

    /// Function applied to the left column, e.g. `SCORE`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub func: Option<String>,

    /// Overrides the generated parameter name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub param_name: Option<String>,
}

impl Expr {
    pub fn and(exprs: Vec<Expr>) -> Self {
        Expr::Concat(ConcatExpr {
            op: "AND".to_string(),
            exprs,
        })
    }

    pub fn or(exprs: Vec<Expr>) -> Self {
        Expr::Concat(ConcatExpr {
            op: "OR".to_string(),
            exprs,
        })
    }

    pub fn leaf(column: ColumnRef, op: &str) -> Self {
        Expr::Leaf(LeafExpr {
            op: op.to_string(),
            left_column: column,
            right_column: None,
            func: None,
            param_name: None,
        })
    }

    pub fn columns(left: ColumnRef, op: &str, right: ColumnRef) -> Self {
        Expr::Leaf(LeafExpr {
            op: op.to_string(),
            left_column: left,
            right_column: Some(right),
            func: None,
            param_name: None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertDefinition {
    pub name: String,
    pub table: String,
    #[serde(default)]
    pub set_columns: Vec<String>,
    /// `IGNORE` or `UPDATE`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_conflict: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDefinition {
    pub name: String,
    pub table: String,
    #[serde(default)]
    pub set_columns: Vec<String>,
    #[serde(default, rename = "where", skip_serializing_if = "Option::is_none")]
    pub where_expr: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteDefinition {
    pub name: String,
    pub table: String,
    #[serde(default, rename = "where", skip_serializing_if = "Option::is_none")]
    pub where_expr: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinDefinition {
    /// `INNER`, `CROSS`, `FULL`, `LEFT` or `RIGHT`.
    #[serde(rename = "type")]
    pub join_type: String,
    pub table: String,
    #[serde(default, rename = "as", skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on: Option<Expr>,
}

/// An entry of a select column list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum GetColumn {
    Column {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        table: Option<String>,
    },
    /// Every column of the table.
    All {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        table: Option<String>,
    },
    Group {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        table: Option<String>,
    },
    Func {
        func: String,
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        table: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum OrderBy {
    Column {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        table: Option<String>,
        #[serde(default)]
        desc: bool,
    },
    Func {
        func: String,
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        table: Option<String>,
        #[serde(default)]
        desc: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectDefinition {
    pub name: String,
    pub from_table: String,
    #[serde(default, rename = "as", skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(default)]
    pub joins: Vec<JoinDefinition>,
    #[serde(default, rename = "where", skip_serializing_if = "Option::is_none")]
    pub where_expr: Option<Expr>,
    #[serde(default)]
    pub order_by: Vec<OrderBy>,
    #[serde(default)]
    pub limit: bool,
    #[serde(default)]
    pub offset: bool,
    #[serde(default)]
    pub get_columns: Vec<GetColumn>,
}
