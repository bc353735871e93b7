//! Output formatting for generate command results.

use super::GenerateResult;
use crate::output::Outputable;

impl Outputable for GenerateResult {
    fn to_table(&self) -> String {
        let mut output = String::new();
        output.push_str(&format!("Generated {}:\n", self.database));
        output.push_str(&format!("  Tables: {}\n", self.tables));
        output.push_str(&format!("  Statements: {}\n", self.statements.len()));
        for name in &self.statements {
            output.push_str(&format!("    {}\n", name));
        }
        output.push_str("  Files:\n");
        for file in &self.files {
            output.push_str(&format!("    {} ({} bytes)\n", file.path, file.bytes));
        }
        output
    }
}
