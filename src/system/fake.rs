use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use tokio::sync::Barrier;

use super::SystemTools;
use crate::error::ToolError;

/// Scripted `SystemTools` for unit tests. Records every call it receives.
#[derive(Debug, Default)]
pub(crate) struct FakeTools {
    connections: String,
    listing_error: Option<ToolError>,
    processes: HashMap<String, String>,
    lookup_errors: HashSet<String>,
    kill_errors: HashSet<String>,
    listing_gate: Option<Barrier>,
    lookup_gate: Option<Barrier>,
    kill_gate: Option<Barrier>,
    calls: Mutex<Vec<String>>,
}

impl FakeTools {
    pub(crate) fn new(connections: &str) -> Self {
        Self {
            connections: connections.to_string(),
            ..Self::default()
        }
    }

    pub(crate) fn with_process(mut self, pid: &str, name: &str) -> Self {
        self.processes.insert(pid.to_string(), name.to_string());
        self
    }

    pub(crate) fn failing_listing(mut self, stderr: &str) -> Self {
        self.listing_error = Some(ToolError::new("netstat", Some(1), stderr));
        self
    }

    /// The listing tool cannot be spawned at all.
    pub(crate) fn missing_listing_tool(mut self, tool: &str) -> Self {
        self.listing_error = Some(ToolError::new(tool, None, "No such file or directory"));
        self
    }

    pub(crate) fn failing_lookup(mut self, pid: &str) -> Self {
        self.lookup_errors.insert(pid.to_string());
        self
    }

    pub(crate) fn failing_kill(mut self, pid: &str) -> Self {
        self.kill_errors.insert(pid.to_string());
        self
    }

    /// Every listing call blocks until `count` of them are waiting at once.
    pub(crate) fn gate_listing(mut self, count: usize) -> Self {
        self.listing_gate = Some(Barrier::new(count));
        self
    }

    /// Every lookup call blocks until `count` of them are waiting at once.
    pub(crate) fn gate_lookup(mut self, count: usize) -> Self {
        self.lookup_gate = Some(Barrier::new(count));
        self
    }

    /// Every kill call blocks until `count` of them are waiting at once.
    pub(crate) fn gate_kill(mut self, count: usize) -> Self {
        self.kill_gate = Some(Barrier::new(count));
        self
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn record(&self, call: String) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }
}

async fn pass(gate: &Option<Barrier>) {
    if let Some(barrier) = gate {
        barrier.wait().await;
    }
}

impl SystemTools for FakeTools {
    async fn list_connections(&self, filter: &str) -> Result<String, ToolError> {
        self.record(format!("list {filter}"));
        pass(&self.listing_gate).await;
        if let Some(err) = &self.listing_error {
            return Err(err.clone());
        }
        Ok(super::filter_lines(&self.connections, filter))
    }

    async fn list_process_by_pid(&self, pid: &str) -> Result<String, ToolError> {
        self.record(format!("lookup {pid}"));
        pass(&self.lookup_gate).await;
        if self.lookup_errors.contains(pid) {
            return Err(ToolError::new("tasklist", Some(1), "lookup failed"));
        }
        Ok(match self.processes.get(pid) {
            Some(name) => format!(
                "\r\nImage Name                     PID Session Name        Session#    Mem Usage\r\n\
                 ========================= ======== ================ =========== ============\r\n\
                 {name}    {pid} Console                    1     12,345 K\r\n"
            ),
            None => "INFO: No tasks are running which match the specified criteria.\r\n".to_string(),
        })
    }

    async fn terminate_process(&self, pid: &str) -> Result<(), ToolError> {
        self.record(format!("kill {pid}"));
        pass(&self.kill_gate).await;
        if self.kill_errors.contains(pid) {
            return Err(ToolError::new(
                "taskkill",
                Some(128),
                format!("ERROR: The process \"{pid}\" not found."),
            ));
        }
        Ok(())
    }
}
