use crate::domain::model::{Category, ChangeSet, MutationCommand};
use crate::domain::ports::DirectoryClient;
use std::io::Write;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutcome {
    pub category: Category,
    pub primary_key: String,
    pub success: bool,
    pub exit_code: Option<i32>,
    pub output: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitReport {
    pub outcomes: Vec<CommandOutcome>,
}

impl CommitReport {
    pub fn attempted(&self) -> usize {
        self.outcomes.len()
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.success).count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &CommandOutcome> {
        self.outcomes.iter().filter(|o| !o.success)
    }

    pub fn has_failures(&self) -> bool {
        self.failures().next().is_some()
    }

    pub fn write_summary<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        writeln!(
            out,
            "Applied {} of {} changes",
            self.succeeded(),
            self.attempted()
        )?;
        for failure in self.failures() {
            let status = failure
                .exit_code
                .map(|code| format!("exit status {}", code))
                .unwrap_or_else(|| "not started".to_string());
            writeln!(
                out,
                "  ! {} {} failed ({}): {}",
                failure.category,
                failure.primary_key,
                status,
                failure.output.trim()
            )?;
        }
        Ok(())
    }
}

/// Applies a change set one command at a time, categories in commit order.
///
/// A failing command does not stop the run; its outcome is recorded and the
/// next command is issued.
pub struct Committer<'a, D: DirectoryClient + ?Sized> {
    client: &'a D,
}

impl<'a, D: DirectoryClient + ?Sized> Committer<'a, D> {
    pub fn new(client: &'a D) -> Self {
        Self { client }
    }

    pub async fn commit(&self, changes: &ChangeSet) -> CommitReport {
        let mut report = CommitReport::default();

        for command in changes.commands() {
            let outcome = self.run(&command).await;
            report.outcomes.push(outcome);
        }

        tracing::info!(
            "Commit finished: {} succeeded, {} failed",
            report.succeeded(),
            report.attempted() - report.succeeded()
        );
        report
    }

    async fn run(&self, command: &MutationCommand) -> CommandOutcome {
        tracing::debug!(
            "Running {} {} {:?}",
            command.category,
            command.primary_key,
            command.args
        );

        let (success, exit_code, output) = match self.client.apply(command).await {
            Ok(outcome) => (outcome.success, outcome.exit_code, outcome.output),
            Err(e) => (false, None, e.to_string()),
        };

        if success {
            tracing::info!("{} {}: ok", command.category, command.primary_key);
        } else {
            tracing::warn!(
                "{} {} failed (exit code {:?}): {}",
                command.category,
                command.primary_key,
                exit_code,
                output.trim()
            );
        }

        CommandOutcome {
            category: command.category,
            primary_key: command.primary_key.clone(),
            success,
            exit_code,
            output,
        }
    }
}
