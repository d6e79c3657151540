//! JSON output formatter for sockaudit
use crate::error::AuditError;
use crate::formats::traits::{rule_rows, OutputFormatter};
use crate::rules::RuleSet;
use crate::scan::FlaggedConnection;

#[derive(serde::Serialize)]
struct OutputWrapper<T> {
    report: String,
    timestamp: String,
    count: usize,
    results: Vec<T>,
}

/// JSON formatter that outputs data in JSON format with metadata
pub struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn format_connections(&self, connections: &[FlaggedConnection]) -> Result<String, AuditError> {
        let wrapper = OutputWrapper {
            report: "connections".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            count: connections.len(),
            results: connections.to_vec(),
        };

        let json = serde_json::to_string_pretty(&wrapper)?;
        Ok(json)
    }

    fn format_rules(&self, rules: &RuleSet) -> Result<String, AuditError> {
        let rows = rule_rows(rules);
        let wrapper = OutputWrapper {
            report: "rules".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            count: rows.len(),
            results: rows,
        };

        let json = serde_json::to_string_pretty(&wrapper)?;
        Ok(json)
    }
}
