//! Reader for the whitespace-separated /proc/net/{tcp,udp,tcp6,udp6} tables
use crate::error::AuditError;
use crate::net::address::decode_endpoint;
use crate::net::{ConnectionRecord, Protocol};
use std::fs;
use std::path::Path;

/// Rows shorter than this are partial or trailing lines and are dropped.
const MIN_FIELDS: usize = 13;

const LOCAL_FIELD: usize = 1;
const REMOTE_FIELD: usize = 2;
const INODE_FIELD: usize = 9;

/// Read and parse one connection table from disk.
pub fn read_table(path: &Path, protocol: Protocol) -> Result<Vec<ConnectionRecord>, AuditError> {
    let raw = fs::read_to_string(path).map_err(|source| AuditError::SourceReadError {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(parse_table(&raw, protocol))
}

/// Parse the raw text of a connection table. The first line is the header.
///
/// Malformed rows are skipped; they never abort the parse.
pub fn parse_table(raw: &str, protocol: Protocol) -> Vec<ConnectionRecord> {
    raw.lines()
        .skip(1)
        .filter_map(|line| match parse_row(line, protocol) {
            Ok(record) => record,
            Err(e) => {
                log::trace!("dropping {} row '{}': {}", protocol, line.trim(), e);
                None
            }
        })
        .collect()
}

/// `Ok(None)` for short rows, `Err` for rows that fail to decode.
fn parse_row(line: &str, protocol: Protocol) -> Result<Option<ConnectionRecord>, AuditError> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < MIN_FIELDS {
        return Ok(None);
    }

    let (local_addr, local_port) = decode_endpoint(fields[LOCAL_FIELD])?;
    let (remote_addr, remote_port) = decode_endpoint(fields[REMOTE_FIELD])?;
    let inode = fields[INODE_FIELD].parse::<u64>().map_err(|e| {
        AuditError::FormatError(format!("bad inode '{}': {}", fields[INODE_FIELD], e))
    })?;

    Ok(Some(ConnectionRecord {
        protocol,
        local_addr,
        local_port,
        remote_addr,
        remote_port,
        inode,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const TCP_HEADER: &str = "  sl  local_address rem_address   st tx_queue rx_queue tr tm->when retrnsmt   uid  timeout inode";

    #[test]
    fn test_parse_tcp_rows() {
        let raw = format!(
            "{}\n{}\n{}\n",
            TCP_HEADER,
            "   0: 0100007F:235A 00000000:0000 0A 00000000:00000000 00:00000000 00000000   106        0 24811 1 0000000000000000 100 0 0 10 0",
            "   1: 0A01A8C0:D2F4 5DB8D822:01BB 01 00000000:00000000 02:00000A3B 00000000  1000        0 99123 2 0000000000000000 20 4 30 10 -1",
        );

        let records = parse_table(&raw, Protocol::Tcp);
        assert_eq!(records.len(), 2);

        assert_eq!(records[0].local_addr, "127.0.0.1");
        assert_eq!(records[0].local_port, 9050);
        assert_eq!(records[0].remote_addr, "0.0.0.0");
        assert_eq!(records[0].remote_port, 0);
        assert_eq!(records[0].inode, 24811);
        assert_eq!(records[0].protocol, Protocol::Tcp);

        assert_eq!(records[1].local_addr, "192.168.1.10");
        assert_eq!(records[1].local_port, 0xD2F4);
        assert_eq!(records[1].remote_addr, "34.216.184.93");
        assert_eq!(records[1].remote_port, 443);
        assert_eq!(records[1].inode, 99123);
    }

    #[test]
    fn test_short_rows_are_dropped() {
        let raw = format!(
            "{}\n{}\n{}\n\n",
            TCP_HEADER,
            "   0: 0100007F:235A 00000000:0000 0A 00000000:00000000 00:00000000 00000000   106        0 24811 1",
            "   1: 0100007F:1A0B 00000000:0000 0A 00000000:00000000 00:00000000 00000000   106        0 555 1 0000000000000000 100 0 0 10 0",
        );

        let records = parse_table(&raw, Protocol::Tcp);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].inode, 555);
    }

    #[test]
    fn test_bad_row_does_not_abort_parse() {
        let raw = format!(
            "{}\n{}\n{}\n",
            TCP_HEADER,
            "   0: 0100007F-235A 00000000:0000 0A 00000000:00000000 00:00000000 00000000   106        0 24811 1 0000000000000000 100 0 0 10 0",
            "   1: 0100007F:0016 00000000:0000 0A 00000000:00000000 00:00000000 00000000     0        0 777 1 0000000000000000 100 0 0 10 0",
        );

        let records = parse_table(&raw, Protocol::Tcp);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].local_port, 22);
    }

    #[test]
    fn test_non_ascii_address_drops_only_that_row() {
        let raw = format!(
            "{}\n{}\n{}\n",
            "  sl  local_address                         remote_address                        st tx_queue rx_queue tr tm->when retrnsmt   uid  timeout inode ref pointer drops",
            "    0: 0000000000000000FFFF000\u{e9}1234567:1A0B 00000000000000000000000000000000:0000 07 00000000:00000000 00:00000000 00000000     0        0 900 2 0000000000000000 0",
            "    1: 00000000000000000000000001000000:0035 00000000000000000000000000000000:0000 07 00000000:00000000 00:00000000 00000000   101        0 901 2 0000000000000000 0",
        );

        let records = parse_table(&raw, Protocol::Tcp6);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].inode, 901);
        assert_eq!(records[0].local_addr, "::1");
    }

    #[test]
    fn test_header_only_table() {
        assert!(parse_table(TCP_HEADER, Protocol::Udp).is_empty());
        assert!(parse_table("", Protocol::Udp).is_empty());
    }

    #[test]
    fn test_parse_udp6_row() {
        let raw = format!(
            "{}\n{}\n",
            "  sl  local_address                         remote_address                        st tx_queue rx_queue tr tm->when retrnsmt   uid  timeout inode ref pointer drops",
            "  512: 00000000000000000000000001000000:0035 00000000000000000000000000000000:0000 07 00000000:00000000 00:00000000 00000000   101        0 31337 2 0000000000000000 0",
        );

        let records = parse_table(&raw, Protocol::Udp6);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].local_addr, "::1");
        assert_eq!(records[0].local_port, 53);
        assert_eq!(records[0].remote_addr, "::");
        assert_eq!(records[0].protocol, Protocol::Udp6);
    }

    #[test]
    fn test_read_table_from_file() -> Result<(), Box<dyn std::error::Error>> {
        let mut temp_file = NamedTempFile::new()?;
        writeln!(temp_file, "{}", TCP_HEADER)?;
        writeln!(
            temp_file,
            "   0: 0100007F:1A0B 00000000:0000 0A 00000000:00000000 00:00000000 00000000   106        0 42 1 0000000000000000 100 0 0 10 0"
        )?;
        temp_file.flush()?;

        let records = read_table(temp_file.path(), Protocol::Tcp)?;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].inode, 42);
        Ok(())
    }

    #[test]
    fn test_read_missing_table_is_source_error() {
        let err = read_table(Path::new("/nonexistent/net/tcp"), Protocol::Tcp).unwrap_err();
        assert!(matches!(err, AuditError::SourceReadError { .. }));
    }
}
