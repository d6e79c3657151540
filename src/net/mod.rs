//! Kernel connection table parsing module
use serde::Serialize;
use std::fmt;

pub mod address;
pub mod table;

/// One of the four connection tables exposed under `/proc/net`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Tcp,
    Udp,
    Tcp6,
    Udp6,
}

impl Protocol {
    /// Scan order used when merging table results.
    pub const ALL: [Protocol; 4] = [Protocol::Tcp, Protocol::Udp, Protocol::Tcp6, Protocol::Udp6];

    /// Label as it appears in reports, e.g. "tcp6".
    pub fn label(&self) -> &'static str {
        match self {
            Protocol::Tcp => "tcp",
            Protocol::Udp => "udp",
            Protocol::Tcp6 => "tcp6",
            Protocol::Udp6 => "udp6",
        }
    }

    /// Transport name: the first three characters of the label.
    pub fn transport(&self) -> &'static str {
        &self.label()[..3]
    }

    /// File name of the table relative to `<proc_root>/net`.
    pub fn table_name(&self) -> &'static str {
        self.label()
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Structure to hold one decoded row of a connection table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionRecord {
    #[serde(rename = "type")]
    pub protocol: Protocol,
    #[serde(rename = "ip_local")]
    pub local_addr: String,
    #[serde(rename = "port_local")]
    pub local_port: u16,
    #[serde(rename = "ip_remote")]
    pub remote_addr: String,
    #[serde(rename = "port_remote")]
    pub remote_port: u16,
    pub inode: u64,
}
