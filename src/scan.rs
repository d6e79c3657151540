//! Scan orchestration: table fan-out, ownership index, enrichment
use crate::error::AuditError;
use crate::net::table::read_table;
use crate::net::{ConnectionRecord, Protocol};
use crate::process::identity;
use crate::process::ownership::{partition, OwnershipIndex, OwnershipScanner};
use crate::process::{list_pids, ProcessIdentity};
use crate::rules::{Direction, RuleSet};
use serde::Serialize;
use std::path::PathBuf;
use std::thread;

pub const DEFAULT_PROC_ROOT: &str = "/proc";
pub const DEFAULT_WORKERS: usize = 4;

/// A connection that matched a blacklist rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlaggedConnection {
    #[serde(flatten)]
    pub connection: ConnectionRecord,
    pub direction: Direction,
    pub reason: String,
    pub process: ProcessIdentity,
}

impl FlaggedConnection {
    pub fn new(connection: ConnectionRecord, direction: Direction, reason: &str) -> Self {
        Self {
            connection,
            direction,
            reason: reason.to_string(),
            process: ProcessIdentity::default(),
        }
    }

    pub fn is_local(&self) -> bool {
        self.direction == Direction::Local
    }
}

/// Everything one scan pass needs.
#[derive(Debug, Clone)]
pub struct ScanContext {
    pub proc_root: PathBuf,
    pub rules: RuleSet,
    /// Number of ownership workers, at least 1
    pub workers: usize,
    /// Warn and continue instead of failing when a table cannot be read
    pub skip_unreadable_tables: bool,
}

impl ScanContext {
    pub fn new(rules: RuleSet) -> Self {
        Self {
            proc_root: PathBuf::from(DEFAULT_PROC_ROOT),
            rules,
            workers: DEFAULT_WORKERS,
            skip_unreadable_tables: false,
        }
    }
}

/// Result of a full scan, in table order (tcp, udp, tcp6, udp6).
#[derive(Debug, Clone, Default)]
pub struct ScanReport {
    pub flagged: Vec<FlaggedConnection>,
}

impl ScanReport {
    pub fn is_clean(&self) -> bool {
        self.flagged.is_empty()
    }
}

pub struct Scanner {
    context: ScanContext,
}

impl Scanner {
    pub fn new(context: ScanContext) -> Self {
        Self { context }
    }

    pub fn context(&self) -> &ScanContext {
        &self.context
    }

    /// Run all stages. Ownership is only resolved when something was flagged.
    pub fn run(&self) -> Result<ScanReport, AuditError> {
        self.run_with(|_| {})
    }

    /// Like [`Scanner::run`], calling `on_resolve` with the number of flagged
    /// connections before ownership resolution starts. Not called on a clean scan.
    pub fn run_with<F>(&self, on_resolve: F) -> Result<ScanReport, AuditError>
    where
        F: FnOnce(usize),
    {
        let mut flagged = self.scan_tables()?;
        if flagged.is_empty() {
            return Ok(ScanReport::default());
        }

        on_resolve(flagged.len());
        let index = self.build_ownership_index()?;
        self.enrich(&mut flagged, &index);

        Ok(ScanReport { flagged })
    }

    /// Read the four connection tables in parallel and keep rule matches.
    pub fn scan_tables(&self) -> Result<Vec<FlaggedConnection>, AuditError> {
        let results: Vec<(Protocol, thread::Result<Result<Vec<FlaggedConnection>, AuditError>>)> =
            thread::scope(|s| {
                let handles: Vec<_> = Protocol::ALL
                    .iter()
                    .map(|&protocol| (protocol, s.spawn(move || self.scan_table(protocol))))
                    .collect();

                handles
                    .into_iter()
                    .map(|(protocol, handle)| (protocol, handle.join()))
                    .collect()
            });

        let mut flagged = Vec::new();
        for (protocol, result) in results {
            let result = result.map_err(|_| {
                AuditError::WorkerError(format!("{} table scanner panicked", protocol))
            })?;

            match result {
                Ok(matches) => flagged.extend(matches),
                Err(e) if self.context.skip_unreadable_tables => {
                    log::warn!("Skipping {} table: {}", protocol, e);
                }
                Err(e) => return Err(e),
            }
        }

        log::info!("Found {} suspicious connections", flagged.len());
        Ok(flagged)
    }

    fn scan_table(&self, protocol: Protocol) -> Result<Vec<FlaggedConnection>, AuditError> {
        let path = self
            .context
            .proc_root
            .join("net")
            .join(protocol.table_name());
        let records = read_table(&path, protocol)?;
        log::debug!("{}: {} connections", path.display(), records.len());

        Ok(records
            .into_iter()
            .filter_map(|record| {
                let (direction, reason) = self.context.rules.evaluate(&record)?;
                Some(FlaggedConnection::new(record, direction, reason))
            })
            .collect())
    }

    /// Map every socket inode on the host to its owning pid.
    ///
    /// Pids are split into contiguous chunks, one worker per chunk. Partial
    /// indexes are merged in chunk order.
    pub fn build_ownership_index(&self) -> Result<OwnershipIndex, AuditError> {
        let pids = list_pids(&self.context.proc_root)?;
        let scanner = OwnershipScanner::new()?;
        let proc_root = self.context.proc_root.as_path();
        let chunks = partition(pids.len(), self.context.workers);
        log::debug!(
            "Indexing sockets of {} processes with {} workers",
            pids.len(),
            chunks.len()
        );

        let partials: Vec<thread::Result<OwnershipIndex>> = thread::scope(|s| {
            let handles: Vec<_> = chunks
                .into_iter()
                .map(|range| {
                    let chunk = &pids[range];
                    let scanner = &scanner;
                    s.spawn(move || scanner.index_pids(proc_root, chunk))
                })
                .collect();

            handles.into_iter().map(|handle| handle.join()).collect()
        });

        let mut index = OwnershipIndex::new();
        for partial in partials {
            let partial = partial
                .map_err(|_| AuditError::WorkerError("ownership worker panicked".to_string()))?;
            index.merge(partial);
        }

        log::info!("Indexed {} sockets", index.len());
        Ok(index)
    }

    /// Attach process identity to each flagged connection that has an owner.
    pub fn enrich(&self, flagged: &mut [FlaggedConnection], index: &OwnershipIndex) {
        for conn in flagged.iter_mut() {
            match index.owner(conn.connection.inode) {
                Some(pid) => conn.process = identity::resolve(&self.context.proc_root, pid),
                None => log::debug!(
                    "No owner found for inode {} ({})",
                    conn.connection.inode,
                    conn.connection.protocol
                ),
            }
        }
    }
}
