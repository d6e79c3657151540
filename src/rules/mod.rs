//! Port blacklist rules and matching
use crate::net::ConnectionRecord;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

pub mod config;

/// Which transports a rule applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProtocolScope {
    Tcp,
    Udp,
    All,
}

impl ProtocolScope {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "tcp" => Some(ProtocolScope::Tcp),
            "udp" => Some(ProtocolScope::Udp),
            "all" => Some(ProtocolScope::All),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProtocolScope::Tcp => "tcp",
            ProtocolScope::Udp => "udp",
            ProtocolScope::All => "all",
        }
    }

    fn permits(&self, transport: &str) -> bool {
        match self {
            ProtocolScope::Tcp => transport == "tcp",
            ProtocolScope::Udp => transport == "udp",
            ProtocolScope::All => true,
        }
    }
}

/// Which endpoint of a connection a rule applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DirectionScope {
    Local,
    Remote,
    All,
}

impl DirectionScope {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "local" => Some(DirectionScope::Local),
            "remote" => Some(DirectionScope::Remote),
            "all" => Some(DirectionScope::All),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DirectionScope::Local => "local",
            DirectionScope::Remote => "remote",
            DirectionScope::All => "all",
        }
    }

    fn permits(&self, direction: Direction) -> bool {
        matches!(
            (self, direction),
            (DirectionScope::All, _)
                | (DirectionScope::Local, Direction::Local)
                | (DirectionScope::Remote, Direction::Remote)
        )
    }
}

/// Endpoint on which a blacklisted port was seen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Local,
    Remote,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Local => f.write_str("local"),
            Direction::Remote => f.write_str("remote"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlacklistRule {
    #[serde(rename = "type")]
    pub protocol: ProtocolScope,
    #[serde(rename = "port_type")]
    pub direction: DirectionScope,
    pub reason: String,
}

impl BlacklistRule {
    pub fn new(protocol: ProtocolScope, direction: DirectionScope, reason: &str) -> Self {
        Self {
            protocol,
            direction,
            reason: reason.to_string(),
        }
    }
}

/// Rules keyed by port. Inserting a second rule for a port replaces the first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSet {
    rules: BTreeMap<u16, BlacklistRule>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Built-in rules used when no config is given or the config is empty.
    pub fn builtin() -> Self {
        use DirectionScope::*;
        use ProtocolScope::Tcp;

        let mut set = Self::new();
        set.insert(6666, BlacklistRule::new(Tcp, All, "irc"));
        set.insert(6667, BlacklistRule::new(Tcp, All, "irc alternative"));
        set.insert(9050, BlacklistRule::new(Tcp, Local, "tor"));
        set.insert(36008, BlacklistRule::new(Tcp, Remote, "botnet melinda & bill gates"));
        set.insert(
            4443,
            BlacklistRule::new(Tcp, Local, "/tmp/.estbuild/lib/ld-linux.so.2 rooted"),
        );
        set
    }

    /// Returns the rule previously stored for `port`, if any.
    pub fn insert(&mut self, port: u16, rule: BlacklistRule) -> Option<BlacklistRule> {
        self.rules.insert(port, rule)
    }

    pub fn get(&self, port: u16) -> Option<&BlacklistRule> {
        self.rules.get(&port)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u16, &BlacklistRule)> {
        self.rules.iter().map(|(port, rule)| (*port, rule))
    }

    /// Match a connection against the rules.
    ///
    /// The local port is checked first, so a connection whose local and
    /// remote ports are both blacklisted is reported as a local match.
    /// A rule with an empty reason never matches.
    pub fn evaluate(&self, record: &ConnectionRecord) -> Option<(Direction, &str)> {
        let transport = record.protocol.transport();

        [
            (record.local_port, Direction::Local),
            (record.remote_port, Direction::Remote),
        ]
        .into_iter()
        .find_map(|(port, direction)| {
            let rule = self.get(port)?;
            (!rule.reason.is_empty()
                && rule.protocol.permits(transport)
                && rule.direction.permits(direction))
                .then_some((direction, rule.reason.as_str()))
        })
    }
}
