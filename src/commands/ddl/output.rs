//! Output formatting for ddl command results.

use super::DdlResult;
use crate::output::Outputable;

impl Outputable for DdlResult {
    fn to_table(&self) -> String {
        let mut lines = Vec::new();
        for table in &self.artifact.tables {
            lines.push(format!("{};", table.create_table_ddl));
            for index in &table.indexes {
                lines.push(format!("{};", index.create_index_ddl));
            }
        }
        lines.join("\n")
    }
}
