use colored::Colorize;

use crate::{
    process::{ProcessManager, TerminateOutcome},
    system::SystemTools,
    utils::Messages,
    Result,
};

pub struct KillCommand;

impl KillCommand {
    /// Force kill `pids` and print one line per PID once every request settled.
    pub async fn execute<T: SystemTools>(
        tools: &T,
        pids: Vec<String>,
        quiet: bool,
        messages: &Messages,
    ) -> Vec<TerminateOutcome> {
        if pids.is_empty() {
            return Vec::new();
        }

        if !quiet {
            println!();
            println!("\t{}", messages.kill_process.on_green().bold());
        }

        let outcomes = ProcessManager::new(tools).terminate_all(pids).await;

        if !quiet {
            for outcome in &outcomes {
                Self::print_outcome(outcome);
            }
        }

        outcomes
    }

    fn print_outcome(outcome: &TerminateOutcome) {
        let pid = format!("{:<10}", outcome.pid);
        match &outcome.result {
            Ok(()) => println!("\t{}\t{}", pid.bold().white(), "√".bold().green()),
            Err(e) => println!("\t{}\t{} {}", pid.bold().white(), "×".bold().red(), e),
        }
    }

    /// The first failure among `outcomes`, once all of them have been reported.
    pub fn into_result(outcomes: Vec<TerminateOutcome>) -> Result<()> {
        match outcomes.into_iter().find_map(|outcome| outcome.result.err()) {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
