//! Declarative schema definitions and their compilation.
//!
//! # Overview
//!
//! 1. **Input model** (`definition.rs`, `statement.rs`):
//!    - `DatabaseDefinition` - the root of a definition file
//!    - `TableDefinition` - columns, keys, interleave, indexes, search columns
//!    - `InsertDefinition`, `UpdateDefinition`, `DeleteDefinition`, `SelectDefinition`
//!    - `Expr` - WHERE/ON predicate trees
//!
//! 2. **Type catalog** (`types.rs`): resolves column types and maps them to
//!    DDL, host and wire types.
//!
//! 3. **Schema registry** (`registry.rs`): tables compiled so far.
//!
//! 4. **Compilers** (`compilers/`): DDL, expressions, statements and
//!    derived statements.

pub mod compilers;
pub mod definition;
pub mod registry;
pub mod statement;
pub mod types;

pub use definition::{
    ColumnDefinition, ColumnGroupDefinition, DatabaseDefinition, DefinitionKind, ExternalDefinition,
    IndexDefinition, InterleaveDefinition, KeyColumn, SearchColumnDefinition, SearchIndexDefinition,
    TableDefinition, TaskTableOptions,
};
pub use registry::{Column, KeyPart, SchemaRegistry, SearchColumn, Table};
pub use statement::{
    ColumnRef, ConcatExpr, DeleteDefinition, Expr, GetColumn, InsertDefinition, JoinDefinition,
    LeafExpr, OrderBy, SelectDefinition, UpdateDefinition,
};
pub use types::{ColumnKind, ColumnType, DefinitionResolver, PrimitiveType, StaticResolver, TypeCatalog};
