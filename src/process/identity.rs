//! Process identity from `/proc/<pid>/status` and `/proc/<pid>/cmdline`
use crate::process::ProcessIdentity;
use std::fs;
use std::path::Path;

/// Resolve the identity of `pid`.
///
/// A process that exited since it was indexed yields an identity carrying
/// only the pid. This never fails.
pub fn resolve(proc_root: &Path, pid: u64) -> ProcessIdentity {
    let pid_dir = proc_root.join(pid.to_string());

    let status = match fs::read_to_string(pid_dir.join("status")) {
        Ok(status) => status,
        Err(e) => {
            log::debug!("cannot read status of pid {}: {}", pid, e);
            return ProcessIdentity {
                pid,
                ..Default::default()
            };
        }
    };

    let mut identity = parse_status(&status);
    identity.pid = pid;

    match fs::read(pid_dir.join("cmdline")) {
        Ok(raw) => identity.cmdline = format_cmdline(&raw),
        Err(e) => log::debug!("cannot read cmdline of pid {}: {}", pid, e),
    }

    identity
}

/// Extract name, container id, uid and gid from a status block.
///
/// Missing or malformed values stay at zero. `pid` and `cmdline` are left
/// for the caller to fill in.
pub fn parse_status(status: &str) -> ProcessIdentity {
    let mut identity = ProcessIdentity::default();

    for line in status.lines() {
        let Some((label, rest)) = line.split_once(':') else {
            continue;
        };
        let first = rest.split_whitespace().next();

        match label {
            "Name" => identity.name = first.unwrap_or_default().to_string(),
            "envID" => identity.ctid = first.and_then(|v| v.parse().ok()).unwrap_or(0),
            "Uid" => identity.uid = first.and_then(|v| v.parse().ok()).unwrap_or(0),
            "Gid" => identity.gid = first.and_then(|v| v.parse().ok()).unwrap_or(0),
            _ => {}
        }
    }

    identity
}

/// Arguments are NUL separated; each NUL becomes a space.
fn format_cmdline(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).replace('\0', " ")
}
