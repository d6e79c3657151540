//! Socket inode to owning pid index, built from `/proc/<pid>/fd`
use crate::error::AuditError;
use regex::Regex;
use std::collections::HashMap;
use std::fs;
use std::ops::Range;
use std::path::Path;

/// Point-in-time map from socket inode to the pid holding it.
///
/// A socket shared by several processes (inherited across fork, passed over
/// a unix socket) is attributed to whichever pid was indexed last.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OwnershipIndex {
    owners: HashMap<u64, u64>,
}

impl OwnershipIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, inode: u64, pid: u64) {
        self.owners.insert(inode, pid);
    }

    pub fn owner(&self, inode: u64) -> Option<u64> {
        self.owners.get(&inode).copied()
    }

    pub fn len(&self) -> usize {
        self.owners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }

    /// Fold a partial index into this one; entries in `other` win.
    pub fn merge(&mut self, other: OwnershipIndex) {
        self.owners.extend(other.owners);
    }
}

/// Scans fd directories for `socket:[<inode>]` links.
pub struct OwnershipScanner {
    socket_link: Regex,
}

impl OwnershipScanner {
    pub fn new() -> Result<Self, AuditError> {
        Ok(Self {
            socket_link: Regex::new(r"^socket:\[(\d+)\]$")?,
        })
    }

    /// Index every socket held by `pids`.
    ///
    /// Processes that exit or deny access mid-scan are skipped.
    pub fn index_pids(&self, proc_root: &Path, pids: &[u64]) -> OwnershipIndex {
        let mut index = OwnershipIndex::new();
        for &pid in pids {
            self.index_pid(proc_root, pid, &mut index);
        }
        index
    }

    fn index_pid(&self, proc_root: &Path, pid: u64, index: &mut OwnershipIndex) {
        let fd_dir = proc_root.join(pid.to_string()).join("fd");
        let entries = match fs::read_dir(&fd_dir) {
            Ok(entries) => entries,
            Err(e) => {
                log::trace!("skipping pid {}: {}", pid, e);
                return;
            }
        };

        for entry in entries.flatten() {
            let Ok(target) = fs::read_link(entry.path()) else {
                continue;
            };
            if let Some(inode) = self.socket_inode(&target.to_string_lossy()) {
                index.insert(inode, pid);
            }
        }
    }

    fn socket_inode(&self, link: &str) -> Option<u64> {
        self.socket_link
            .captures(link)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse().ok())
    }
}

/// Split `len` items into at most `workers` contiguous ranges.
///
/// Every range holds `len / workers` items except the last, which also takes
/// the remainder. The worker count is clamped to `1..=len`.
pub fn partition(len: usize, workers: usize) -> Vec<Range<usize>> {
    if len == 0 {
        return Vec::new();
    }

    let workers = workers.clamp(1, len);
    let chunk = len / workers;

    (0..workers)
        .map(|i| {
            let start = i * chunk;
            let end = if i + 1 == workers { len } else { start + chunk };
            start..end
        })
        .collect()
}
