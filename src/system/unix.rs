//! Linux and macOS have no `netstat -ano`. `lsof` is asked first and `ss` is
//! the fallback; either way each socket row is rewritten into the canonical
//! `PROTO LOCAL REMOTE [STATE] PID` layout before the substring filter runs.

use tracing::debug;

use super::{filter_lines, lenient_stdout, run_tool, strict_status, NativeTools, SystemTools};
use crate::error::ToolError;

impl SystemTools for NativeTools {
    async fn list_connections(&self, filter: &str) -> Result<String, ToolError> {
        let rows = match self.try_lsof().await {
            Ok(rows) => rows,
            Err(e) => {
                debug!(error = %e, "lsof unavailable, falling back to ss");
                self.try_ss().await?
            }
        };
        Ok(filter_lines(&rows, filter))
    }

    async fn list_process_by_pid(&self, pid: &str) -> Result<String, ToolError> {
        let output = run_tool("ps", &["-p", pid, "-o", "comm=", "-o", "pid="]).await?;
        lenient_stdout("ps", &output)
    }

    async fn terminate_process(&self, pid: &str) -> Result<(), ToolError> {
        let output = run_tool("kill", &["-KILL", pid]).await?;
        strict_status("kill", &output)
    }
}

impl NativeTools {
    async fn try_lsof(&self) -> Result<String, ToolError> {
        // -n: no host names, -P: numeric ports
        let output = run_tool("lsof", &["-nP", "-i"]).await?;
        let stdout = lenient_stdout("lsof", &output)?;
        Ok(normalize_lsof_output(&stdout))
    }

    async fn try_ss(&self) -> Result<String, ToolError> {
        let output = run_tool("ss", &["-H", "-a", "-n", "-p", "-t", "-u"]).await?;
        let stdout = lenient_stdout("ss", &output)?;
        Ok(normalize_ss_output(&stdout))
    }
}

fn push_row(
    out: &mut String,
    protocol: &str,
    local: &str,
    remote: &str,
    state: Option<&str>,
    pid: &str,
) {
    let row = match state {
        Some(state) if !state.is_empty() => {
            format!("{protocol}    {local}    {remote}    {state}    {pid}\n")
        }
        _ => format!("{protocol}    {local}    {remote}    {pid}\n"),
    };
    out.push_str(&row);
}

/// Spell TCP states the way `netstat -ano` does.
fn netstat_state(state: &str) -> String {
    match state {
        "LISTEN" => "LISTENING".to_string(),
        "ESTAB" => "ESTABLISHED".to_string(),
        other => other.replace('-', "_"),
    }
}

/// Rewrite `lsof -nP -i` output.
///
/// ```text
/// COMMAND   PID USER   FD   TYPE DEVICE SIZE/OFF NODE NAME
/// node     4521 dev    20u  IPv4  81234      0t0  TCP 127.0.0.1:3023 (LISTEN)
/// node     4521 dev    21u  IPv4  81240      0t0  TCP 127.0.0.1:3023->127.0.0.1:50522 (ESTABLISHED)
/// mDNSResp  812 root    9u  IPv4  13377      0t0  UDP *:5353
/// ```
pub(crate) fn normalize_lsof_output(output: &str) -> String {
    let mut rows = String::new();

    for line in output.lines() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 9 {
            continue;
        }

        let pid = fields[1];
        if pid.is_empty() || !pid.bytes().all(|b| b.is_ascii_digit()) {
            // header row
            continue;
        }

        let protocol = fields[7];
        if protocol != "TCP" && protocol != "UDP" {
            continue;
        }

        let (local, remote) = fields[8].split_once("->").unwrap_or((fields[8], "*:*"));
        let state = match (protocol, fields.get(9)) {
            ("TCP", Some(state)) => Some(netstat_state(state.trim_matches(&['(', ')'][..]))),
            _ => None,
        };

        push_row(&mut rows, protocol, local, remote, state.as_deref(), pid);
    }

    rows
}

/// Rewrite `ss -H -a -n -p -t -u` output. Sockets shared by several processes
/// become one row per PID; sockets whose owner is not visible get PID `0`.
///
/// ```text
/// tcp   LISTEN 0      4096   127.0.0.1:3023   0.0.0.0:*   users:(("node",pid=4521,fd=20))
/// udp   UNCONN 0      0        0.0.0.0:5353   0.0.0.0:*
/// ```
pub(crate) fn normalize_ss_output(output: &str) -> String {
    let mut rows = String::new();

    for line in output.lines() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 6 || fields[0] == "Netid" {
            continue;
        }

        let protocol = fields[0].to_uppercase();
        let state = if protocol == "TCP" {
            Some(netstat_state(fields[1]))
        } else {
            None
        };
        let (local, remote) = (fields[4], fields[5]);

        let process = fields[6..].join(" ");
        let mut pids = ss_pids(&process);
        if pids.is_empty() {
            pids.push("0");
        }

        for pid in pids {
            push_row(&mut rows, &protocol, local, remote, state.as_deref(), pid);
        }
    }

    rows
}

/// PIDs out of a `users:(("nginx",pid=10,fd=6),("nginx",pid=11,fd=6))` column.
fn ss_pids(process: &str) -> Vec<&str> {
    let mut pids = Vec::new();
    let mut rest = process;

    while let Some(start) = rest.find("pid=") {
        let tail = &rest[start + 4..];
        let end = tail
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(tail.len());
        let pid = &tail[..end];
        if !pid.is_empty() && !pids.contains(&pid) {
            pids.push(pid);
        }
        rest = &tail[end..];
    }

    pids
}

#[cfg(test)]
mod tests {
    use super::*;

    const LSOF_OUTPUT: &str = "\
COMMAND     PID USER   FD   TYPE DEVICE SIZE/OFF NODE NAME
node       4521 dev    20u  IPv4  81234      0t0  TCP 127.0.0.1:3023 (LISTEN)
node       4521 dev    21u  IPv4  81240      0t0  TCP 127.0.0.1:3023->127.0.0.1:50522 (ESTABLISHED)
mDNSResp    812 root    9u  IPv4  13377      0t0  UDP *:5353
java       9001 dev    55u  IPv6  99881      0t0  TCP [::1]:8080 (LISTEN)
";

    const SS_OUTPUT: &str = "\
tcp   LISTEN     0      4096       127.0.0.1:3023        0.0.0.0:*     users:((\"node\",pid=4521,fd=20))
tcp   ESTAB      0      0          10.0.0.5:51234    140.82.112.4:443   users:((\"firefox\",pid=3030,fd=88))
tcp   TIME-WAIT  0      0          10.0.0.5:51200    140.82.112.4:443
udp   UNCONN     0      0            0.0.0.0:5353        0.0.0.0:*     users:((\"avahi\",pid=812,fd=12))
tcp   LISTEN     0      511          0.0.0.0:80          0.0.0.0:*     users:((\"nginx\",pid=10,fd=6),(\"nginx\",pid=11,fd=6),(\"nginx\",pid=10,fd=7))
";

    fn rows(text: &str) -> Vec<Vec<String>> {
        text.lines()
            .map(|l| l.split_whitespace().map(str::to_string).collect())
            .collect()
    }

    #[test]
    fn test_normalize_lsof_listening_and_established() {
        let rows = rows(&normalize_lsof_output(LSOF_OUTPUT));
        assert_eq!(rows.len(), 4);

        assert_eq!(
            rows[0],
            ["TCP", "127.0.0.1:3023", "*:*", "LISTENING", "4521"]
        );
        assert_eq!(
            rows[1],
            ["TCP", "127.0.0.1:3023", "127.0.0.1:50522", "ESTABLISHED", "4521"]
        );
        assert_eq!(rows[3], ["TCP", "[::1]:8080", "*:*", "LISTENING", "9001"]);
    }

    #[test]
    fn test_normalize_lsof_udp_has_no_state() {
        let rows = rows(&normalize_lsof_output(LSOF_OUTPUT));
        assert_eq!(rows[2], ["UDP", "*:5353", "*:*", "812"]);
    }

    #[test]
    fn test_normalize_lsof_skips_header_and_short_lines() {
        let text = "COMMAND PID USER FD TYPE DEVICE SIZE/OFF NODE NAME\ngarbage line\n";
        assert_eq!(normalize_lsof_output(text), "");
    }

    #[test]
    fn test_normalize_ss_states() {
        let rows = rows(&normalize_ss_output(SS_OUTPUT));

        assert_eq!(
            rows[0],
            ["TCP", "127.0.0.1:3023", "0.0.0.0:*", "LISTENING", "4521"]
        );
        assert_eq!(rows[1][3], "ESTABLISHED");
        assert_eq!(rows[2][3], "TIME_WAIT");
    }

    #[test]
    fn test_normalize_ss_unowned_socket_gets_pid_zero() {
        let rows = rows(&normalize_ss_output(SS_OUTPUT));
        assert_eq!(rows[2].last().map(String::as_str), Some("0"));
    }

    #[test]
    fn test_normalize_ss_udp_drops_state() {
        let rows = rows(&normalize_ss_output(SS_OUTPUT));
        assert_eq!(rows[3], ["UDP", "0.0.0.0:5353", "0.0.0.0:*", "812"]);
    }

    #[test]
    fn test_normalize_ss_one_row_per_owner() {
        let rows = rows(&normalize_ss_output(SS_OUTPUT));
        let nginx: Vec<&str> = rows[4..].iter().map(|r| r[4].as_str()).collect();
        assert_eq!(nginx, ["10", "11"]);
    }

    #[test]
    fn test_ss_pids() {
        assert_eq!(ss_pids("users:((\"a\",pid=1,fd=2))"), ["1"]);
        assert!(ss_pids("").is_empty());
        assert!(ss_pids("users:((\"a\",pid=,fd=2))").is_empty());
    }
}
