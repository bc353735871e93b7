//! Schema compilers.
//!
//! Turn validated definitions into Spanner DDL and compiled statements.
//! `ddl` registers tables; `statement` compiles against the registered
//! tables, using `expr` for WHERE/ON trees and `params` for parameter names.

pub mod ddl;
pub mod derived;
pub mod expr;
pub mod params;
pub mod statement;

pub use ddl::{ColumnDdl, DdlArtifact, DdlCompiler, IndexDdl, TableDdl};
pub use derived::{augment_task_table, derive_statements, DerivedStatements};
pub use expr::{compile_on, compile_where, ConcatOp, Operator, Scope, SqlFunction};
pub use params::{param_name, BoundParam, ParamAllocator};
pub use statement::{CompiledStatement, OutputField, StatementCompiler, StatementKind};
