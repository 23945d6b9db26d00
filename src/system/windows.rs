//! `netstat -ano` already prints the canonical column layout, so rows are
//! passed through untouched apart from the substring filter.

use super::{filter_lines, lenient_stdout, run_tool, strict_status, NativeTools, SystemTools};
use crate::error::ToolError;

impl SystemTools for NativeTools {
    async fn list_connections(&self, filter: &str) -> Result<String, ToolError> {
        let output = run_tool("netstat", &["-ano"]).await?;
        let stdout = lenient_stdout("netstat", &output)?;
        Ok(filter_lines(&stdout, filter))
    }

    async fn list_process_by_pid(&self, pid: &str) -> Result<String, ToolError> {
        let criteria = format!("PID eq {pid}");
        let output = run_tool("tasklist", &["/FI", &criteria]).await?;
        lenient_stdout("tasklist", &output)
    }

    async fn terminate_process(&self, pid: &str) -> Result<(), ToolError> {
        let output = run_tool("taskkill", &["/F", "/PID", pid]).await?;
        strict_status("taskkill", &output)
    }
}
