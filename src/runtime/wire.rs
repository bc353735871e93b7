//! Wire representation of statement parameters and result rows.

use std::collections::BTreeMap;
use std::fmt;

use super::Error;

/// Type of a bound parameter as declared to the query protocol.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum WireType {
    Bool,
    Int64,
    Float64,
    /// RFC 3339 string.
    Timestamp,
    String,
    Bytes,
    Array(Box<WireType>),
}

impl WireType {
    pub fn array(child: WireType) -> Self {
        WireType::Array(Box::new(child))
    }
}

impl fmt::Display for WireType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WireType::Bool => write!(f, "bool"),
            WireType::Int64 => write!(f, "int64"),
            WireType::Float64 => write!(f, "float64"),
            WireType::Timestamp => write!(f, "timestamp"),
            WireType::String => write!(f, "string"),
            WireType::Bytes => write!(f, "bytes"),
            WireType::Array(child) => write!(f, "array<{}>", child),
        }
    }
}

/// A parameter or cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum WireValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Bytes(Vec<u8>),
    Array(Vec<WireValue>),
}

impl WireValue {
    /// Short name used in conversion errors.
    pub fn kind(&self) -> &'static str {
        match self {
            WireValue::Null => "null",
            WireValue::Bool(_) => "bool",
            WireValue::Int(_) => "int",
            WireValue::Float(_) => "float",
            WireValue::String(_) => "string",
            WireValue::Bytes(_) => "bytes",
            WireValue::Array(_) => "array",
        }
    }
}

/// SQL text plus named parameters and their declared types.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: BTreeMap<String, WireValue>,
    pub types: BTreeMap<String, WireType>,
}

impl Statement {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: BTreeMap::new(),
            types: BTreeMap::new(),
        }
    }

    pub fn bind(mut self, name: impl Into<String>, wire_type: WireType, value: WireValue) -> Self {
        let name = name.into();
        self.types.insert(name.clone(), wire_type);
        self.params.insert(name, value);
        self
    }
}

/// One result row, cells in select-list order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    cells: Vec<WireValue>,
}

impl Row {
    pub fn new(cells: Vec<WireValue>) -> Self {
        Self { cells }
    }

    pub fn cell(&self, index: usize) -> Result<&WireValue, Error> {
        self.cells.get(index).ok_or(Error::MissingCell {
            index,
            len: self.cells.len(),
        })
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}
