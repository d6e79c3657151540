//! JSONL (JSON Lines) output formatter for sockaudit
use crate::error::AuditError;
use crate::formats::traits::{rule_rows, OutputFormatter};
use crate::rules::RuleSet;
use crate::scan::FlaggedConnection;

/// JSONL formatter that outputs data as JSON objects, one per line
pub struct JsonlFormatter;

impl OutputFormatter for JsonlFormatter {
    fn format_connections(&self, connections: &[FlaggedConnection]) -> Result<String, AuditError> {
        let mut output = String::new();

        for conn in connections {
            let line = serde_json::to_string(conn)?;
            output.push_str(&line);
            output.push('\n');
        }

        Ok(output)
    }

    fn format_rules(&self, rules: &RuleSet) -> Result<String, AuditError> {
        let mut output = String::new();

        for row in rule_rows(rules) {
            let line = serde_json::to_string(&row)?;
            output.push_str(&line);
            output.push('\n');
        }

        Ok(output)
    }
}
