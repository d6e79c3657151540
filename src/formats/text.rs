//! Text output formatter for sockaudit
use crate::error::AuditError;
use crate::formats::traits::OutputFormatter;
use crate::rules::RuleSet;
use crate::scan::FlaggedConnection;
use prettytable::{Cell, Row, Table};

/// Text formatter: one key/value block per flagged connection
pub struct TextFormatter;

impl TextFormatter {
    fn connection_table(conn: &FlaggedConnection) -> Table {
        let c = &conn.connection;
        let p = &conn.process;

        let mut table = Table::new();
        table.set_format(*prettytable::format::consts::FORMAT_CLEAN);
        table.set_titles(Row::new(vec![Cell::new(&format!(
            "Conn: {}:{} - {}:{}",
            c.local_addr, c.local_port, c.remote_addr, c.remote_port
        ))
        .style_spec("bH2")]));

        let fields = [
            ("Type", c.protocol.to_string()),
            ("Inode", c.inode.to_string()),
            ("LocalPortDetect", conn.is_local().to_string()),
            ("Reason", format!("\"{}\"", conn.reason)),
            ("CTID", p.ctid.to_string()),
            ("Pid", p.pid.to_string()),
            ("Process Name", p.name.clone()),
            ("Uid", p.uid.to_string()),
            ("Gid", p.gid.to_string()),
            ("CmdLine", p.cmdline.clone()),
        ];
        for (key, value) in fields {
            table.add_row(Row::new(vec![Cell::new(key), Cell::new(&value)]));
        }

        table
    }
}

impl OutputFormatter for TextFormatter {
    fn format_connections(&self, connections: &[FlaggedConnection]) -> Result<String, AuditError> {
        if connections.is_empty() {
            return Ok("No suspicious connections found.".to_string());
        }

        let mut output = format!("Found {} suspicious connections\n\n", connections.len());
        for conn in connections {
            output.push_str(&Self::connection_table(conn).to_string());
            output.push('\n');
        }

        Ok(output)
    }

    fn format_rules(&self, rules: &RuleSet) -> Result<String, AuditError> {
        let mut table = Table::new();
        table.set_format(*prettytable::format::consts::FORMAT_NO_LINESEP_WITH_TITLE);

        table.set_titles(Row::new(vec![
            Cell::new("PORT").style_spec("c"),
            Cell::new("TYPE").style_spec("c"),
            Cell::new("PORT_TYPE").style_spec("c"),
            Cell::new("REASON").style_spec("c"),
        ]));

        for (port, rule) in rules.iter() {
            table.add_row(Row::new(vec![
                Cell::new(&port.to_string()),
                Cell::new(rule.protocol.as_str()),
                Cell::new(rule.direction.as_str()),
                Cell::new(&rule.reason),
            ]));
        }

        Ok(table.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::{ConnectionRecord, Protocol};
    use crate::rules::Direction;

    #[test]
    fn test_connection_block_contains_fields() {
        let mut conn = FlaggedConnection::new(
            ConnectionRecord {
                protocol: Protocol::Tcp6,
                local_addr: "::".to_string(),
                local_port: 6667,
                remote_addr: "2001:db8::1".to_string(),
                remote_port: 40000,
                inode: 1234,
            },
            Direction::Local,
            "irc alternative",
        );
        conn.process.pid = 99;
        conn.process.name = "ircd".to_string();

        let text = TextFormatter.format_connections(&[conn]).unwrap();
        assert!(text.contains("Found 1 suspicious connections"));
        assert!(text.contains("Conn: :::6667 - 2001:db8::1:40000"));
        assert!(text.contains("tcp6"));
        assert!(text.contains("\"irc alternative\""));
        assert!(text.contains("ircd"));
        assert!(text.contains("99"));
    }

    #[test]
    fn test_clean_report_message() {
        let text = TextFormatter.format_connections(&[]).unwrap();
        assert_eq!(text, "No suspicious connections found.");
    }

    #[test]
    fn test_rules_table() {
        let text = TextFormatter.format_rules(&RuleSet::builtin()).unwrap();
        assert!(text.contains("9050"));
        assert!(text.contains("tor"));
        assert!(text.contains("remote"));
    }
}
