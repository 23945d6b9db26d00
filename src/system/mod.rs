//! Access to the OS tools that report sockets, look up processes and kill them.
//!
//! Every platform adapter hands the core plain text in one canonical shape, the
//! one printed by Windows `netstat -ano`:
//!
//! ```text
//! TCP    127.0.0.1:3023    0.0.0.0:0    LISTENING    4521
//! UDP    0.0.0.0:5353      *:*                       8820
//! ```
//!
//! Columns are protocol, local address, remote address, an optional state and
//! the owning PID. A PID of `0` means no owning process is visible.

use std::process::Output;

use tokio::process::Command as TokioCommand;
use tracing::debug;

use crate::error::ToolError;

#[cfg(not(target_os = "windows"))]
mod unix;
#[cfg(target_os = "windows")]
mod windows;

#[cfg(test)]
pub(crate) mod fake;

/// The OS facilities the core depends on.
///
/// Implementations return raw tool output; parsing stays in the core so that it
/// can be exercised with scripted text.
#[allow(async_fn_in_trait)]
pub trait SystemTools {
    /// Connection table rows containing `filter` as a substring.
    async fn list_connections(&self, filter: &str) -> Result<String, ToolError>;

    /// Process table text for a single PID.
    async fn list_process_by_pid(&self, pid: &str) -> Result<String, ToolError>;

    /// Forcefully terminate `pid`.
    async fn terminate_process(&self, pid: &str) -> Result<(), ToolError>;
}

impl<T: SystemTools + ?Sized> SystemTools for &T {
    async fn list_connections(&self, filter: &str) -> Result<String, ToolError> {
        (**self).list_connections(filter).await
    }

    async fn list_process_by_pid(&self, pid: &str) -> Result<String, ToolError> {
        (**self).list_process_by_pid(pid).await
    }

    async fn terminate_process(&self, pid: &str) -> Result<(), ToolError> {
        (**self).terminate_process(pid).await
    }
}

/// `SystemTools` backed by the command-line tools of the host OS.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeTools;

impl NativeTools {
    pub fn new() -> Self {
        Self
    }
}

/// Spawn `program` and wait for it. Only a failure to spawn is an error here.
pub(crate) async fn run_tool(program: &str, args: &[&str]) -> Result<Output, ToolError> {
    debug!(tool = program, args = ?args, "Spawning tool");

    let output = TokioCommand::new(program)
        .args(args)
        .output()
        .await
        .map_err(|e| ToolError::new(program, None, e.to_string()))?;

    debug!(
        tool = program,
        status = ?output.status.code(),
        stdout_len = output.stdout.len(),
        "Tool exited"
    );
    Ok(output)
}

/// Stdout of a listing or lookup tool.
///
/// A non-zero exit only counts as a failure when the tool also wrote to stderr;
/// filters such as `findstr`, `lsof` and `ps` exit non-zero when nothing matched.
pub(crate) fn lenient_stdout(program: &str, output: &Output) -> Result<String, ToolError> {
    if output.status.success() {
        return Ok(String::from_utf8_lossy(&output.stdout).into_owned());
    }

    let stderr = String::from_utf8_lossy(&output.stderr);
    if stderr.trim().is_empty() {
        Ok(String::new())
    } else {
        Err(ToolError::new(program, output.status.code(), stderr))
    }
}

/// Any non-zero exit is a failure. The message falls back to stdout because
/// `taskkill` reports some errors there.
pub(crate) fn strict_status(program: &str, output: &Output) -> Result<(), ToolError> {
    if output.status.success() {
        return Ok(());
    }

    let stderr = String::from_utf8_lossy(&output.stderr);
    let message = if stderr.trim().is_empty() {
        String::from_utf8_lossy(&output.stdout).into_owned()
    } else {
        stderr.into_owned()
    };
    Err(ToolError::new(program, output.status.code(), message))
}

/// Keep only the lines containing `filter`, the way `findstr` would.
pub(crate) fn filter_lines(text: &str, filter: &str) -> String {
    text.lines()
        .filter(|line| line.contains(filter))
        .fold(String::new(), |mut acc, line| {
            acc.push_str(line);
            acc.push('\n');
            acc
        })
}
