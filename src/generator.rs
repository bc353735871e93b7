//! One generation pass over a database definition.
//!
//! Tables are compiled first, in declaration order, each followed by the
//! statements it derives; then inserts, updates, deletes and selects. Every
//! pass owns a fresh [`SchemaRegistry`], so independent definitions never
//! share state.

use std::collections::HashSet;

use heck::ToSnakeCase;

use crate::codegen::{check_identifiers, RustRenderer};
use crate::db::schema::compilers::{
    augment_task_table, derive_statements, CompiledStatement, DdlArtifact, DdlCompiler,
    DerivedStatements, StatementCompiler,
};
use crate::db::schema::{DatabaseDefinition, DefinitionResolver, SchemaRegistry, TypeCatalog};
use crate::db::{CompileError, ResultExt};
use crate::sink::OutputRegistry;

/// Everything a pass produced, before rendering.
#[derive(Debug)]
pub struct GeneratedDatabase {
    pub name: String,
    pub ddl: DdlArtifact,
    pub statements: Vec<CompiledStatement>,
}

impl GeneratedDatabase {
    /// Output path of the DDL artifact, relative to the output directory.
    pub fn ddl_path(&self, def: &DatabaseDefinition) -> String {
        def.output_ddl
            .clone()
            .unwrap_or_else(|| format!("{}_ddl.json", self.name.to_snake_case()))
    }

    /// Output path of the generated Rust source, relative to the output directory.
    pub fn sql_path(&self, def: &DatabaseDefinition) -> String {
        def.output_sql
            .clone()
            .unwrap_or_else(|| format!("{}_sql.rs", self.name.to_snake_case()))
    }

    /// Render the DDL artifact and statement code into the sink.
    pub fn emit(
        &self,
        def: &DatabaseDefinition,
        renderer: &RustRenderer,
        sink: &mut OutputRegistry,
    ) -> Result<(), serde_json::Error> {
        let ddl = sink.file(self.ddl_path(def));
        sink.push(ddl, self.ddl.to_json()?);

        let sql = sink.file(self.sql_path(def));
        sink.set_header(
            sql,
            format!("//! Statements for {}. Generated by spanner_gen; do not edit.", self.name),
        );
        sink.import(sql, renderer.runtime_import());
        for statement in &self.statements {
            let rendered = renderer.render(statement);
            for import in rendered.imports {
                sink.import(sql, import);
            }
            sink.push(sql, rendered.code);
        }

        tracing::debug!(database = %self.name, files = sink.len(), "emitted database");
        Ok(())
    }
}

/// Drives a generation pass.
pub struct DatabaseGenerator<'r> {
    resolver: &'r dyn DefinitionResolver,
}

impl<'r> DatabaseGenerator<'r> {
    pub fn new(resolver: &'r dyn DefinitionResolver) -> Self {
        Self { resolver }
    }

    pub fn generate(&self, def: &DatabaseDefinition) -> Result<GeneratedDatabase, CompileError> {
        if def.name.is_empty() {
            return Err(CompileError::missing("name")).context("When generating database");
        }

        let catalog = TypeCatalog::new(self.resolver);
        let mut registry = SchemaRegistry::new();
        let mut ddl = DdlArtifact::default();
        let mut statements = Vec::new();

        for table in &def.tables {
            let label = format!("When generating table {}", table.name);
            let table = augment_task_table(table).context(label.clone())?;
            ddl.tables.push(DdlCompiler::compile_table(&table, &catalog, &mut registry)?);
            let derived = derive_statements(&table).context(label)?;
            compile_all(&StatementCompiler::new(&registry), &derived, &mut statements)?;
        }

        let requested = DerivedStatements {
            inserts: def.inserts.clone(),
            updates: def.updates.clone(),
            deletes: def.deletes.clone(),
            selects: def.selects.clone(),
        };
        compile_all(&StatementCompiler::new(&registry), &requested, &mut statements)?;

        let mut names = HashSet::new();
        for statement in &statements {
            if !names.insert(statement.name.as_str()) {
                return Err(CompileError::invalid(format!(
                    "statement {} is declared more than once.",
                    statement.name
                )))
                .context(format!("When generating {}", statement.name));
            }
        }
        check_identifiers(&statements)?;

        tracing::info!(
            database = %def.name,
            tables = ddl.tables.len(),
            statements = statements.len(),
            "generated database"
        );

        Ok(GeneratedDatabase {
            name: def.name.clone(),
            ddl,
            statements,
        })
    }
}

fn compile_all(
    compiler: &StatementCompiler<'_>,
    defs: &DerivedStatements,
    out: &mut Vec<CompiledStatement>,
) -> Result<(), CompileError> {
    for insert in &defs.inserts {
        out.push(compiler.compile_insert(insert)?);
    }
    for update in &defs.updates {
        out.push(compiler.compile_update(update)?);
    }
    for delete in &defs.deletes {
        out.push(compiler.compile_delete(delete)?);
    }
    for select in &defs.selects {
        out.push(compiler.compile_select(select)?);
    }
    Ok(())
}
