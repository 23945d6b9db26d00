use std::fmt;

/// Failure of one external tool invocation (`netstat`, `ss`, `tasklist`, `kill`, ...).
///
/// `code` is `None` when the tool could not be spawned at all or was killed by a
/// signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolError {
    pub tool: String,
    pub code: Option<i32>,
    pub stderr: String,
}

impl ToolError {
    pub fn new(tool: impl Into<String>, code: Option<i32>, stderr: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            code,
            stderr: stderr.into(),
        }
    }
}

impl fmt::Display for ToolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stderr = self.stderr.trim();
        match self.code {
            Some(code) => write!(f, "{} exited with status {code}", self.tool)?,
            None => write!(f, "{} could not be run", self.tool)?,
        }
        if !stderr.is_empty() {
            write!(f, ": {stderr}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ToolError {}

/// Error types for portwho.
#[derive(Debug, Clone)]
pub enum Error {
    /// Failed to parse data
    ParseError(String),
    /// The port argument is not a valid port number
    InvalidPort(String),
    /// Listing connections for a port failed
    QueryFailed { port: String, source: ToolError },
    /// No process is bound to any of the requested ports
    NoMatch(Vec<String>),
    /// Looking up the process table entry for a PID failed
    ResolveFailed { pid: String, source: ToolError },
    /// Terminating a PID failed
    TerminateFailed { pid: String, source: ToolError },
    /// Other generic error
    Other(String),
}

impl Error {
    /// Whether this is the benign "nothing found" outcome rather than a failure.
    pub fn is_no_match(&self) -> bool {
        matches!(self, Error::NoMatch(_))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::ParseError(msg) => write!(f, "Parse error: {msg}"),
            Error::InvalidPort(msg) => {
                write!(f, "Invalid port: {msg}. Port must be between 1 and 65535")
            }
            Error::QueryFailed { port, source } => {
                write!(f, "Failed to list connections for port {port}: {source}")?;
                if source.code.is_none() {
                    write!(f, ". Make sure required system tools are installed")?;
                }
                Ok(())
            }
            Error::NoMatch(ports) => {
                write!(f, "No process bound to port(s) {}", ports.join(", "))
            }
            Error::ResolveFailed { pid, source } => {
                write!(f, "Failed to look up process {pid}: {source}")
            }
            Error::TerminateFailed { pid, source } => {
                write!(f, "Failed to kill process {pid}: {source}")
            }
            Error::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::QueryFailed { source, .. }
            | Error::ResolveFailed { source, .. }
            | Error::TerminateFailed { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<anyhow::Error> for Error {
    fn from(e: anyhow::Error) -> Self {
        Error::Other(e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::ParseError(e.to_string())
    }
}

impl From<dialoguer::Error> for Error {
    fn from(e: dialoguer::Error) -> Self {
        Error::Other(e.to_string())
    }
}

/// A specialized `Result` type for portwho operations.
pub type Result<T> = std::result::Result<T, Error>;
