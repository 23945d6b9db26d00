use futures::future::join_all;
use serde::Serialize;
use tracing::{debug, warn};

use crate::{port::ConnectionRecord, system::SystemTools, Result};

/// Name reported when the process table has no usable entry for a PID.
pub const UNKNOWN_PROCESS_NAME: &str = "---";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessName {
    pub pid: String,
    pub name: String,
}

/// Result of one termination request.
#[derive(Debug, Clone)]
pub struct TerminateOutcome {
    pub pid: String,
    pub result: Result<()>,
}

impl TerminateOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

pub struct ProcessManager<T> {
    tools: T,
}

impl<T: SystemTools> ProcessManager<T> {
    pub fn new(tools: T) -> Self {
        Self { tools }
    }

    /// Name of the process owning `pid`, or `"---"` if the process table has no
    /// entry for it (it may have exited since the port query).
    pub async fn resolve_process_name(&self, pid: &str) -> Result<ProcessName> {
        let output = self
            .tools
            .list_process_by_pid(pid)
            .await
            .map_err(|source| crate::Error::ResolveFailed {
                pid: pid.to_string(),
                source,
            })?;

        let name = parse_process_name(&output, pid)
            .unwrap_or_else(|| UNKNOWN_PROCESS_NAME.to_string());
        debug!(pid = %pid, name = %name, "Resolved process name");

        Ok(ProcessName {
            pid: pid.to_string(),
            name,
        })
    }

    pub async fn terminate(&self, pid: &str) -> Result<()> {
        debug!(pid = %pid, "Force killing process");

        self.tools
            .terminate_process(pid)
            .await
            .map_err(|source| {
                warn!(pid = %pid, error = %source, "Failed to kill process");
                crate::Error::TerminateFailed {
                    pid: pid.to_string(),
                    source,
                }
            })
    }

    /// Kill every PID once, all requests in flight together.
    ///
    /// Outcomes come back in first-seen order; a failure for one PID has no
    /// effect on the others. Nothing checks that a process actually exited.
    pub async fn terminate_all<I, S>(&self, pids: I) -> Vec<TerminateOutcome>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();
        for pid in pids {
            let pid = pid.into();
            if !unique.contains(&pid) {
                unique.push(pid);
            }
        }

        let results = join_all(unique.iter().map(|pid| self.terminate(pid))).await;

        unique
            .into_iter()
            .zip(results)
            .map(|(pid, result)| TerminateOutcome { pid, result })
            .collect()
    }
}

/// Process name from process-table text such as `tasklist` or `ps -o comm=,pid=`.
///
/// The entry is the first line that carries `pid` as a column after the first
/// one; the name is everything before that column.
///
/// ```text
/// Image Name                     PID Session Name        Session#    Mem Usage
/// ========================= ======== ================ =========== ============
/// node.exe                      4521 Console                    1     45,000 K
/// ```
pub fn parse_process_name(output: &str, pid: &str) -> Option<String> {
    if pid.is_empty() {
        return None;
    }

    output.lines().find_map(|line| {
        let fields: Vec<&str> = line.split_whitespace().collect();
        let column = fields.iter().skip(1).position(|field| *field == pid)? + 1;
        Some(fields[..column].join(" "))
    })
}

/// Distinct PIDs of `records`, in the order they first appear.
pub fn unique_pids(records: &[ConnectionRecord]) -> Vec<String> {
    let mut pids: Vec<String> = Vec::new();
    for record in records {
        if !record.pid.is_empty() && !pids.contains(&record.pid) {
            pids.push(record.pid.clone());
        }
    }
    pids
}
