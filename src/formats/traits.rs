//! Output format traits for sockaudit
use crate::error::AuditError;
use crate::rules::{BlacklistRule, RuleSet};
use crate::scan::FlaggedConnection;
use serde::Serialize;

/// Trait for output formatters
pub trait OutputFormatter: Send + Sync {
    fn format_connections(&self, connections: &[FlaggedConnection]) -> Result<String, AuditError>;
    fn format_rules(&self, rules: &RuleSet) -> Result<String, AuditError>;
}

/// One rule with its port, shaped like an entry of the rule file.
#[derive(Debug, Serialize)]
pub struct RuleRow<'a> {
    pub port: u16,
    #[serde(flatten)]
    pub rule: &'a BlacklistRule,
}

pub fn rule_rows(rules: &RuleSet) -> Vec<RuleRow<'_>> {
    rules.iter().map(|(port, rule)| RuleRow { port, rule }).collect()
}

/// Enum for output format types
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputFormat {
    Text,
    Csv,
    Json,
    Jsonl,
}

/// Enum for output destination
#[derive(Debug, Clone)]
pub enum OutputDestination {
    Stdout,
    File(std::path::PathBuf),
}

/// Output writer that combines format and destination
pub struct OutputWriter {
    formatter: Box<dyn OutputFormatter>,
    destination: OutputDestination,
}

impl OutputWriter {
    /// Create a new output writer
    pub fn new(format: OutputFormat, destination: OutputDestination) -> Self {
        let formatter: Box<dyn OutputFormatter> = match format {
            OutputFormat::Text => Box::new(crate::formats::text::TextFormatter),
            OutputFormat::Csv => Box::new(crate::formats::csv::CsvFormatter),
            OutputFormat::Json => Box::new(crate::formats::json::JsonFormatter),
            OutputFormat::Jsonl => Box::new(crate::formats::jsonl::JsonlFormatter),
        };

        Self {
            formatter,
            destination,
        }
    }

    /// Write flagged connections to the configured destination
    pub fn write_connections(&self, connections: &[FlaggedConnection]) -> Result<(), AuditError> {
        let content = self.formatter.format_connections(connections)?;
        self.emit(content)
    }

    /// Write the effective rule set to the configured destination
    pub fn write_rules(&self, rules: &RuleSet) -> Result<(), AuditError> {
        let content = self.formatter.format_rules(rules)?;
        self.emit(content)
    }

    fn emit(&self, content: String) -> Result<(), AuditError> {
        match &self.destination {
            OutputDestination::Stdout => {
                println!("{}", content);
            }
            OutputDestination::File(path) => {
                std::fs::write(path, content)?;
            }
        }

        Ok(())
    }
}
