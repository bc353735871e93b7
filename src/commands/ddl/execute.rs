use std::error::Error;

use serde::Serialize;

use super::DdlCmd;
use crate::commands::{load_definition, Execute};
use crate::config::Config;
use crate::db::schema::compilers::DdlArtifact;
use crate::db::schema::StaticResolver;
use crate::generator::DatabaseGenerator;

/// The DDL artifact; serializes exactly as the file `generate` writes.
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct DdlResult {
    pub artifact: DdlArtifact,
}

impl Execute for DdlCmd {
    type Output = DdlResult;

    fn execute(self, _config: &Config) -> Result<Self::Output, Box<dyn Error>> {
        let definition = load_definition(&self.definition)?;
        let resolver = StaticResolver::new(&definition.definitions);
        let generated = DatabaseGenerator::new(&resolver).generate(&definition)?;
        Ok(DdlResult {
            artifact: generated.ddl,
        })
    }
}
