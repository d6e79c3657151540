//! CSV output formatter for sockaudit
use crate::error::AuditError;
use crate::formats::traits::OutputFormatter;
use crate::rules::RuleSet;
use crate::scan::FlaggedConnection;
use csv::Writer;

/// CSV formatter that outputs data in comma-separated values format
pub struct CsvFormatter;

impl OutputFormatter for CsvFormatter {
    fn format_connections(&self, connections: &[FlaggedConnection]) -> Result<String, AuditError> {
        let mut wtr = Writer::from_writer(vec![]);

        // Write header
        wtr.write_record(&[
            "type",
            "ip_local",
            "port_local",
            "ip_remote",
            "port_remote",
            "inode",
            "direction",
            "reason",
            "pid",
            "pid_name",
            "ctid",
            "uid",
            "gid",
            "cmd_line",
        ])?;

        // Write data rows
        for conn in connections {
            let c = &conn.connection;
            let p = &conn.process;
            wtr.write_record(&[
                c.protocol.to_string(),
                c.local_addr.clone(),
                c.local_port.to_string(),
                c.remote_addr.clone(),
                c.remote_port.to_string(),
                c.inode.to_string(),
                conn.direction.to_string(),
                conn.reason.clone(),
                p.pid.to_string(),
                p.name.clone(),
                p.ctid.to_string(),
                p.uid.to_string(),
                p.gid.to_string(),
                p.cmdline.clone(),
            ])?;
        }

        wtr.flush()?;
        let data = wtr.into_inner()?;
        Ok(String::from_utf8(data)?)
    }

    fn format_rules(&self, rules: &RuleSet) -> Result<String, AuditError> {
        let mut wtr = Writer::from_writer(vec![]);

        wtr.write_record(&["port", "type", "port_type", "reason"])?;
        for (port, rule) in rules.iter() {
            wtr.write_record(&[
                port.to_string(),
                rule.protocol.as_str().to_string(),
                rule.direction.as_str().to_string(),
                rule.reason.clone(),
            ])?;
        }

        wtr.flush()?;
        let data = wtr.into_inner()?;
        Ok(String::from_utf8(data)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::{ConnectionRecord, Protocol};
    use crate::rules::Direction;

    #[test]
    fn test_csv_quotes_reason_with_comma() {
        let conn = FlaggedConnection::new(
            ConnectionRecord {
                protocol: Protocol::Udp,
                local_addr: "0.0.0.0".to_string(),
                local_port: 1337,
                remote_addr: "0.0.0.0".to_string(),
                remote_port: 0,
                inode: 55,
            },
            Direction::Local,
            "leet, probably",
        );

        let out = CsvFormatter.format_connections(&[conn]).unwrap();
        let mut lines = out.lines();
        assert!(lines.next().unwrap().starts_with("type,ip_local,port_local"));
        assert_eq!(
            lines.next().unwrap(),
            "udp,0.0.0.0,1337,0.0.0.0,0,55,local,\"leet, probably\",0,,0,0,0,"
        );
    }

    #[test]
    fn test_csv_rules() {
        let out = CsvFormatter.format_rules(&RuleSet::builtin()).unwrap();
        assert!(out.contains("9050,tcp,local,tor"));
        assert_eq!(out.lines().count(), 6);
    }
}
