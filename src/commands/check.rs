use colored::Colorize;
use dialoguer::{Confirm, MultiSelect};

use super::KillCommand;
use crate::{
    cli::Cli,
    port::{ConnectionRecord, PortQuery, PortScanner},
    process::{unique_pids, TerminateOutcome},
    system::SystemTools,
    utils::{validate_ports, Locale, Messages},
    Result,
};

/// Everything the check command needs, resolved from the command line.
#[derive(Debug, Clone)]
pub struct CheckOptions {
    pub ports: Vec<String>,
    pub local: bool,
    pub exact: bool,
    pub kill: bool,
    pub interactive: bool,
    pub quiet: bool,
    pub json: bool,
    pub locale: Locale,
}

impl CheckOptions {
    pub fn from_cli(cli: Cli, locale: Locale) -> Self {
        Self {
            ports: cli.ports,
            local: !cli.remote,
            exact: !cli.fuzzy,
            kill: cli.kill,
            interactive: cli.interactive,
            quiet: cli.quiet,
            json: cli.json,
            locale,
        }
    }

    pub fn queries(&self) -> Vec<PortQuery> {
        self.ports
            .iter()
            .map(|port| PortQuery::new(port.as_str(), self.local, self.exact))
            .collect()
    }
}

pub struct CheckCommand;

impl CheckCommand {
    pub async fn execute<T: SystemTools>(tools: &T, options: &CheckOptions) -> Result<()> {
        let messages = options.locale.messages();

        if options.ports.is_empty() {
            if !options.quiet {
                Self::print_missing_ports(messages);
            }
            return Ok(());
        }
        validate_ports(&options.ports, options.exact)?;

        let scanner = PortScanner::new(tools);
        let records = match scanner.collect_and_enrich(&options.queries()).await {
            Ok(records) => records,
            Err(e) if e.is_no_match() => {
                if options.json {
                    let report = Self::build_report(options, &[], &[]);
                    println!("{}", serde_json::to_string_pretty(&report)?);
                } else if !options.quiet {
                    println!();
                    println!("\t{}", messages.warn_no_match.bold().green());
                }
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        if !options.json && !options.quiet {
            Self::print_table(&records, options.local, messages);
        }

        let outcomes = if options.kill {
            let pids = if options.interactive {
                Self::select_pids(&records, options.quiet)?
            } else {
                unique_pids(&records)
            };
            KillCommand::execute(tools, pids, options.quiet || options.json, messages).await
        } else {
            Vec::new()
        };

        if options.json {
            let report = Self::build_report(options, &records, &outcomes);
            println!("{}", serde_json::to_string_pretty(&report)?);
        }

        KillCommand::into_result(outcomes)
    }

    pub(crate) fn build_report(
        options: &CheckOptions,
        records: &[ConnectionRecord],
        outcomes: &[TerminateOutcome],
    ) -> serde_json::Value {
        let killed: Vec<serde_json::Value> = outcomes
            .iter()
            .map(|outcome| match &outcome.result {
                Ok(()) => serde_json::json!({
                    "pid": outcome.pid,
                    "status": "killed",
                }),
                Err(e) => serde_json::json!({
                    "pid": outcome.pid,
                    "status": "failed",
                    "error": e.to_string(),
                }),
            })
            .collect();

        serde_json::json!({
            "scanned_at": chrono::Utc::now().to_rfc3339(),
            "ports": options.ports,
            "mode": {
                "exact": options.exact,
                "local": options.local,
            },
            "matches": records,
            "killed": killed,
        })
    }

    fn print_missing_ports(messages: &Messages) {
        println!();
        println!(
            "\t{} {}",
            messages.miss_args.bright_black(),
            messages.warn_no_port.bold().on_red()
        );
    }

    pub(crate) fn format_row(record: &ConnectionRecord, local: bool) -> String {
        format!(
            "{:<10}{:<14}{:<25}{}",
            record.pid,
            record.state,
            record.address(local),
            record.name
        )
    }

    fn print_table(records: &[ConnectionRecord], local: bool, messages: &Messages) {
        println!();
        println!("\t{}", messages.result.on_green().bold());

        let header = format!("{:<10}{:<14}{:<25}{:<16}", "PID", "State", "Address", "Name");
        println!("\t{}", header.bright_black().bold().underline());

        for record in records {
            println!("\t{}", Self::format_row(record, local).white());
        }
    }

    /// Let the user pick which PIDs to kill. An empty selection kills nothing.
    fn select_pids(records: &[ConnectionRecord], quiet: bool) -> Result<Vec<String>> {
        let pids = unique_pids(records);
        let options: Vec<String> = pids
            .iter()
            .map(|pid| {
                let name = records
                    .iter()
                    .find(|r| &r.pid == pid)
                    .map(|r| r.name.as_str())
                    .unwrap_or_default();
                format!("{} ({})", pid.blue(), name.yellow())
            })
            .collect();

        let defaults = vec![true; options.len()];
        let selections = match MultiSelect::new()
            .with_prompt("Select processes (Space: select, Enter: confirm, Esc/q: cancel)")
            .items(&options)
            .defaults(&defaults)
            .interact_opt()?
        {
            Some(selected) if !selected.is_empty() => selected,
            _ => {
                if !quiet {
                    println!("{} Operation cancelled", "×".yellow());
                }
                return Ok(Vec::new());
            }
        };

        let confirmed = Confirm::new()
            .with_prompt(format!("Kill {} process(es)?", selections.len()))
            .default(false)
            .interact()?;

        if !confirmed {
            if !quiet {
                println!("{} Operation cancelled", "×".yellow());
            }
            return Ok(Vec::new());
        }

        Ok(selections.into_iter().map(|idx| pids[idx].clone()).collect())
    }
}
