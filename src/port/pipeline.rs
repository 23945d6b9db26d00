use std::collections::HashMap;

use futures::future::{join_all, try_join_all};
use tracing::{debug, warn};

use super::{ConnectionRecord, PortQuery, PortScanner};
use crate::{process::ProcessManager, system::SystemTools, Result};

impl<T: SystemTools> PortScanner<T> {
    /// Run every query concurrently, drop ownerless rows and attach process names.
    ///
    /// The first failing query fails the whole call. An empty result is reported
    /// as [`crate::Error::NoMatch`]. Name lookups never fail the call: a record
    /// whose lookup errored keeps an empty name.
    pub async fn collect_and_enrich(
        &self,
        queries: &[PortQuery],
    ) -> Result<Vec<ConnectionRecord>> {
        let results = try_join_all(queries.iter().map(|query| self.query(query))).await?;

        let mut records: Vec<ConnectionRecord> = results
            .into_iter()
            .flatten()
            .filter(ConnectionRecord::has_owner)
            .collect();

        if records.is_empty() {
            return Err(crate::Error::NoMatch(
                queries.iter().map(|q| q.port.clone()).collect(),
            ));
        }

        let names = self.resolve_names(&records).await;
        for record in &mut records {
            if let Some(name) = names.get(&record.pid) {
                record.name.clone_from(name);
            }
        }

        Ok(records)
    }

    /// Look up each distinct non-empty PID once, all lookups in flight together.
    async fn resolve_names(&self, records: &[ConnectionRecord]) -> HashMap<String, String> {
        let mut pids: Vec<&str> = Vec::new();
        for record in records {
            if !record.pid.is_empty() && !pids.contains(&record.pid.as_str()) {
                pids.push(&record.pid);
            }
        }

        let manager = ProcessManager::new(self.tools());
        let lookups = join_all(pids.iter().map(|pid| manager.resolve_process_name(pid))).await;

        let names: HashMap<String, String> = pids
            .iter()
            .zip(lookups)
            .map(|(pid, lookup)| {
                let name = match lookup {
                    Ok(process) => process.name,
                    Err(e) => {
                        warn!(pid = %pid, error = %e, "Process name lookup failed");
                        String::new()
                    }
                };
                ((*pid).to_string(), name)
            })
            .collect();

        debug!(resolved = names.len(), "Process names resolved");
        names
    }
}
