use crate::config::SyncSettings;
use crate::core::commit::{CommitReport, Committer};
use crate::core::differ::Differ;
use crate::core::group_check::find_missing_groups;
use crate::core::loader::load_entries;
use crate::core::normalize::Normalizer;
use crate::core::review::{review, write_details, write_summary, ReviewState};
use crate::domain::model::{
    ChangeSet, DirectoryRecord, GroupDescriptions, RawEntry, SourceRecord,
};
use crate::domain::ports::{AnswerSource, DirectoryClient};
use crate::utils::error::Result;
use std::collections::HashSet;
use std::io::Write;
use std::path::Path;

/// How changes get confirmed once they are computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmMode {
    Interactive,
    AutoAccept,
    DryRun,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    NoChanges,
    DryRun,
    Aborted,
    Committed(CommitReport),
}

/// Everything computed before the first mutating command.
#[derive(Debug, Clone)]
pub struct Plan {
    pub records: Vec<SourceRecord>,
    pub descriptions: GroupDescriptions,
    pub changes: ChangeSet,
}

pub struct Reconciler<D: DirectoryClient> {
    client: D,
    settings: SyncSettings,
}

impl<D: DirectoryClient> Reconciler<D> {
    pub fn new(client: D, settings: SyncSettings) -> Self {
        Self { client, settings }
    }

    pub async fn plan<P: AsRef<Path>>(&self, csv_path: P) -> Result<Plan> {
        let entries = load_entries(&csv_path, &self.settings.columns)?;
        tracing::info!(
            "Read {} rows from {}",
            entries.len(),
            csv_path.as_ref().display()
        );

        let entries = unique_logins(entries);
        let (records, descriptions) = Normalizer::new(&self.settings).normalize(entries);

        let current = self.query_directory(&records).await?;

        let mut changes = Differ::new(&self.settings.default_groups).diff(&records, &current)?;
        changes.group_add = find_missing_groups(&self.client, &changes, &descriptions).await?;

        tracing::info!(
            "Planned {} changes ({} new users, {} modified users, {} new groups)",
            changes.total(),
            changes.user_add.len(),
            changes.user_mod.len(),
            changes.group_add.len()
        );

        Ok(Plan {
            records,
            descriptions,
            changes,
        })
    }

    /// Looks users up one by one, in record order.
    async fn query_directory(&self, records: &[SourceRecord]) -> Result<Vec<DirectoryRecord>> {
        let mut current = Vec::with_capacity(records.len());
        for record in records {
            let found = self.client.show_user(&record.login).await?;
            if found.is_absent() {
                tracing::debug!("User {} not found in directory", record.login);
            }
            current.push(found);
        }
        Ok(current)
    }

    pub async fn commit(&self, changes: &ChangeSet) -> CommitReport {
        Committer::new(&self.client).commit(changes).await
    }

    /// Plans, reports and, once confirmed, applies the changes.
    pub async fn run<P, A, W>(
        &self,
        csv_path: P,
        mode: ConfirmMode,
        answers: &mut A,
        out: &mut W,
    ) -> Result<RunOutcome>
    where
        P: AsRef<Path>,
        A: AnswerSource + ?Sized,
        W: Write,
    {
        let plan = self.plan(csv_path).await?;
        let changes = &plan.changes;

        if changes.is_empty() {
            writeln!(out, "No changes.")?;
            return Ok(RunOutcome::NoChanges);
        }

        write_summary(out, changes)?;

        let state = match mode {
            ConfirmMode::DryRun => {
                write_details(out, changes)?;
                return Ok(RunOutcome::DryRun);
            }
            ConfirmMode::AutoAccept => ReviewState::Committing,
            ConfirmMode::Interactive => review(changes, answers, out)?,
        };

        if state == ReviewState::Aborted {
            tracing::info!("Changes rejected, nothing applied");
            return Ok(RunOutcome::Aborted);
        }

        let report = self.commit(changes).await;
        report.write_summary(out)?;
        Ok(RunOutcome::Committed(report))
    }
}

/// Drops rows without a login and repeats of a login already seen, before
/// any of their values (group labels included) are used.
fn unique_logins(entries: Vec<RawEntry>) -> Vec<RawEntry> {
    let mut seen = HashSet::new();
    entries
        .into_iter()
        .filter(|entry| {
            let login = entry.login.trim();
            if login.is_empty() {
                tracing::warn!("Skipping row {} without a login", entry.line);
                return false;
            }
            if !seen.insert(login.to_string()) {
                tracing::warn!(
                    "Login {} appears more than once, ignoring row {}",
                    login,
                    entry.line
                );
                return false;
            }
            true
        })
        .collect()
}
