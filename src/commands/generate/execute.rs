use std::error::Error;

use serde::Serialize;

use super::{GenerateCmd, WrittenFile};
use crate::codegen::RustRenderer;
use crate::commands::{load_definition, Execute};
use crate::config::Config;
use crate::db::schema::StaticResolver;
use crate::generator::DatabaseGenerator;
use crate::sink::OutputRegistry;

/// Summary of a generation run.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateResult {
    pub database: String,
    pub tables: usize,
    pub statements: Vec<String>,
    pub files: Vec<WrittenFile>,
}

impl Execute for GenerateCmd {
    type Output = GenerateResult;

    fn execute(self, config: &Config) -> Result<Self::Output, Box<dyn Error>> {
        let definition = load_definition(&self.definition)?;
        let resolver = StaticResolver::new(&definition.definitions);
        let generated = DatabaseGenerator::new(&resolver).generate(&definition)?;

        let renderer = RustRenderer::new(config.runtime_path.clone());
        let mut sink = OutputRegistry::new();
        generated.emit(&definition, &renderer, &mut sink)?;

        let out_dir = self.out_dir.unwrap_or_else(|| config.out_dir.clone());
        let sizes: Vec<usize> = sink.render_all().iter().map(|(_, content)| content.len()).collect();
        let written = sink
            .write_all(&out_dir)
            .map_err(|e| format!("Failed to write to {}: {}", out_dir.display(), e))?;

        Ok(GenerateResult {
            database: generated.name,
            tables: generated.ddl.tables.len(),
            statements: generated.statements.into_iter().map(|s| s.name).collect(),
            files: written
                .into_iter()
                .zip(sizes)
                .map(|(path, bytes)| WrittenFile {
                    path: path.display().to_string(),
                    bytes,
                })
                .collect(),
        })
    }
}
