use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::{system::SystemTools, Result};

pub mod pipeline;

/// One row of the OS connection table.
///
/// Every field is kept as the text the OS tool printed. `name` stays empty until
/// the record goes through [`PortScanner::collect_and_enrich`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionRecord {
    pub protocol: String,
    pub local_address: String,
    pub local_port: String,
    pub remote_address: String,
    pub remote_port: String,
    pub state: String,
    pub pid: String,
    pub name: String,
}

impl ConnectionRecord {
    /// Parse one `PROTO LOCAL REMOTE [STATE] PID` row.
    ///
    /// A row with exactly four columns has no state (UDP). Rows with fewer than
    /// four columns are not connection rows and yield `None`.
    pub fn parse(line: &str) -> Option<Self> {
        let mut fields: Vec<&str> = line.split_whitespace().collect();
        match fields.len() {
            0..=3 => return None,
            4 => fields.insert(3, ""),
            _ => {}
        }

        Some(Self {
            protocol: fields[0].to_string(),
            local_address: fields[1].to_string(),
            local_port: extract_port(fields[1]).to_string(),
            remote_address: fields[2].to_string(),
            remote_port: extract_port(fields[2]).to_string(),
            state: fields[3].to_string(),
            pid: fields[4].to_string(),
            name: String::new(),
        })
    }

    pub fn matches(&self, query: &PortQuery) -> bool {
        if self.local_address.is_empty() {
            return false;
        }

        let candidate = if query.match_local {
            &self.local_port
        } else {
            &self.remote_port
        };

        if query.exact {
            *candidate == query.port
        } else {
            candidate.contains(query.port.as_str())
        }
    }

    /// The address shown to the user for the given match side.
    pub fn address(&self, local: bool) -> &str {
        if local {
            &self.local_address
        } else {
            &self.remote_address
        }
    }

    /// PID `0` marks rows with no owning process, e.g. `TIME_WAIT` sockets.
    pub fn has_owner(&self) -> bool {
        self.pid != "0"
    }
}

/// Trailing `:<digits>` of an address, or `""` when there is none.
///
/// `"127.0.0.1:3023"` gives `"3023"`, `"[::1]:631"` gives `"631"` and `"*:*"`
/// gives `""`.
pub fn extract_port(address: &str) -> &str {
    match address.rfind(':') {
        Some(colon) => {
            let port = &address[colon + 1..];
            if !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit()) {
                port
            } else {
                ""
            }
        }
        None => "",
    }
}

/// One port lookup: which port, which side of the connection, and how strictly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PortQuery {
    pub port: String,
    pub match_local: bool,
    pub exact: bool,
}

impl PortQuery {
    pub fn new(port: impl Into<String>, match_local: bool, exact: bool) -> Self {
        Self {
            port: port.into(),
            match_local,
            exact,
        }
    }
}

/// Parse every non-blank line of connection table text and keep the rows that
/// satisfy `query`. Unparseable lines are skipped.
pub fn parse_connections(output: &str, query: &PortQuery) -> Vec<ConnectionRecord> {
    output
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| {
            let record = ConnectionRecord::parse(line);
            if record.is_none() {
                trace!(line, "Skipping unparseable connection line");
            }
            record
        })
        .filter(|record| record.matches(query))
        .collect()
}

/// Looks up which connections use a port.
pub struct PortScanner<T> {
    tools: T,
}

impl<T: SystemTools> PortScanner<T> {
    pub fn new(tools: T) -> Self {
        Self { tools }
    }

    pub fn tools(&self) -> &T {
        &self.tools
    }

    /// Connections whose local (or remote) port equals, or with `exact == false`
    /// contains, `port`.
    ///
    /// Runs the listing tool exactly once. An empty vector means nothing matched;
    /// an error means the tool itself failed.
    pub async fn query_port(
        &self,
        port: &str,
        match_local: bool,
        exact: bool,
    ) -> Result<Vec<ConnectionRecord>> {
        self.query(&PortQuery::new(port, match_local, exact)).await
    }

    pub async fn query(&self, query: &PortQuery) -> Result<Vec<ConnectionRecord>> {
        if query.port.is_empty() {
            return Err(crate::Error::InvalidPort(
                "Port must not be empty".to_string(),
            ));
        }

        let output = self
            .tools
            .list_connections(&query.port)
            .await
            .map_err(|source| crate::Error::QueryFailed {
                port: query.port.clone(),
                source,
            })?;

        let records = parse_connections(&output, query);
        debug!(
            port = %query.port,
            exact = query.exact,
            local = query.match_local,
            matched = records.len(),
            "Port query finished"
        );
        Ok(records)
    }
}
