//! Loading of the JSON rule file
//!
//! The file is an array of `{"port", "type", "port_type", "reason"}` objects.
//! Unknown `type`/`port_type` values are widened to `all`, unusable entries
//! are skipped, and a file that yields no rules falls back to the built-in set.
use crate::error::AuditError;
use crate::rules::{BlacklistRule, DirectionScope, ProtocolScope, RuleSet};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// One entry of the rule file, before normalization.
#[derive(Debug, Deserialize)]
pub struct ConfigItem {
    pub port: i64,
    #[serde(rename = "type", default)]
    pub protocol: String,
    #[serde(default)]
    pub port_type: String,
    #[serde(default)]
    pub reason: String,
}

/// Load rules from `path`. Read and parse failures are fatal.
pub fn load_rules(path: &Path) -> Result<RuleSet, AuditError> {
    let content = fs::read_to_string(path)
        .map_err(|e| AuditError::ConfigError(format!("cannot read {}: {}", path.display(), e)))?;

    let rules = parse_rules(&content)?;
    if rules.is_empty() {
        log::warn!(
            "Config {} contains no usable rules, loading built-in rules",
            path.display()
        );
        return Ok(RuleSet::builtin());
    }

    log::info!("Loaded {} rules from {}", rules.len(), path.display());
    Ok(rules)
}

/// Parse and normalize the rule file content. May return an empty set.
pub fn parse_rules(content: &str) -> Result<RuleSet, AuditError> {
    let items: Vec<ConfigItem> = serde_json::from_str(content)
        .map_err(|e| AuditError::ConfigError(format!("invalid rule file: {}", e)))?;

    let mut rules = RuleSet::new();
    for item in items {
        let Some((port, rule)) = normalize(item) else {
            continue;
        };
        if rules.insert(port, rule).is_some() {
            log::warn!("Duplicate rule for port {}, keeping the later one", port);
        }
    }

    Ok(rules)
}

fn normalize(item: ConfigItem) -> Option<(u16, BlacklistRule)> {
    let Ok(port) = u16::try_from(item.port) else {
        log::warn!("Port {} in config is out of range, skipping rule", item.port);
        return None;
    };

    if item.reason.is_empty() {
        log::warn!("Rule for port {} has no reason, skipping it", port);
        return None;
    }

    let protocol = ProtocolScope::parse(&item.protocol).unwrap_or_else(|| {
        log::warn!(
            "Wrong type \"{}\" in config for port {}, using \"all\"",
            item.protocol,
            port
        );
        ProtocolScope::All
    });

    let direction = DirectionScope::parse(&item.port_type).unwrap_or_else(|| {
        log::warn!(
            "Wrong port_type \"{}\" in config for port {}, using \"all\"",
            item.port_type,
            port
        );
        DirectionScope::All
    });

    Some((
        port,
        BlacklistRule {
            protocol,
            direction,
            reason: item.reason,
        },
    ))
}
