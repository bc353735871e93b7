//! Shared test utilities for compiler and command tests.

use std::io::Write;

use tempfile::NamedTempFile;

use crate::db::schema::compilers::{augment_task_table, DdlCompiler};
use crate::db::schema::{DatabaseDefinition, SchemaRegistry, StaticResolver, TypeCatalog};
use crate::fixtures;

/// Create a temporary file containing the given content.
pub fn create_temp_json_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(content.as_bytes())
        .expect("Failed to write temp file");
    file
}

/// Parse the shop fixture.
pub fn shop_definition() -> DatabaseDefinition {
    DatabaseDefinition::from_json_str(fixtures::SHOP).expect("SHOP should deserialize")
}

/// Resolver over the shop fixture's enum and message definitions.
pub fn shop_resolver() -> StaticResolver {
    StaticResolver::new(&shop_definition().definitions)
}

/// A registry holding every shop table, task columns included.
///
/// Use for: statement and expression compiler tests
pub fn shop_registry() -> SchemaRegistry {
    let definition = shop_definition();
    let resolver = StaticResolver::new(&definition.definitions);
    let catalog = TypeCatalog::new(&resolver);
    let mut registry = SchemaRegistry::new();
    for table in &definition.tables {
        let table = augment_task_table(table).expect("Task augmentation should succeed");
        DdlCompiler::compile_table(&table, &catalog, &mut registry).expect("Table should compile");
    }
    registry
}
