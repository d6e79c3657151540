//! Process-side lookups under the proc filesystem
use crate::error::AuditError;
use serde::Serialize;
use std::fs;
use std::path::Path;

pub mod identity;
pub mod ownership;

/// Identity of the process owning a flagged socket.
///
/// All fields are zero/empty when no owner was found.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProcessIdentity {
    pub pid: u64,
    #[serde(rename = "pid_name")]
    pub name: String,
    /// Container id (`envID` on OpenVZ kernels), 0 elsewhere
    pub ctid: u32,
    pub uid: u64,
    pub gid: u64,
    #[serde(rename = "cmd_line")]
    pub cmdline: String,
}

impl ProcessIdentity {
    pub fn is_empty(&self) -> bool {
        self.pid == 0
    }
}

/// List every numeric directory under `proc_root`, sorted by pid.
pub fn list_pids(proc_root: &Path) -> Result<Vec<u64>, AuditError> {
    let mut pids: Vec<u64> = fs::read_dir(proc_root)?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().map(|t| t.is_dir()).unwrap_or(false))
        .filter_map(|entry| entry.file_name().to_str()?.parse::<u64>().ok())
        .collect();

    pids.sort_unstable();
    Ok(pids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_list_pids_only_numeric_dirs() -> Result<(), Box<dyn std::error::Error>> {
        let root = TempDir::new()?;
        for dir in ["1", "42", "7", "self", "net", "sys"] {
            fs::create_dir(root.path().join(dir))?;
        }
        fs::write(root.path().join("99"), "not a directory")?;

        assert_eq!(list_pids(root.path())?, vec![1, 7, 42]);
        Ok(())
    }

    #[test]
    fn test_list_pids_missing_root() {
        assert!(list_pids(Path::new("/nonexistent/proc")).is_err());
    }
}
