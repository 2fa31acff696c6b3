use crate::domain::model::{ChangeSet, DirectoryRecord, SourceRecord, TrackedField};
use crate::utils::error::{Result, SyncError};
use std::collections::BTreeSet;

/// Compares desired CSV state with current directory state.
pub struct Differ<'a> {
    default_groups: &'a [String],
}

impl<'a> Differ<'a> {
    pub fn new(default_groups: &'a [String]) -> Self {
        Self { default_groups }
    }

    /// `records` and `current` are paired by position, so both must come in
    /// the same order and have the same length.
    pub fn diff(&self, records: &[SourceRecord], current: &[DirectoryRecord]) -> Result<ChangeSet> {
        if records.len() != current.len() {
            return Err(SyncError::ProcessingError {
                message: format!(
                    "{} CSV records but {} directory lookups",
                    records.len(),
                    current.len()
                ),
            });
        }

        let mut changes = ChangeSet::default();
        for (new, old) in records.iter().zip(current) {
            self.diff_user(new, old, &mut changes);
        }
        Ok(changes)
    }

    fn diff_user(&self, new: &SourceRecord, old: &DirectoryRecord, changes: &mut ChangeSet) {
        let login = &new.login;

        if old.is_absent() {
            let args = TrackedField::ALL
                .iter()
                .map(|field| field.argument(new.field(*field).trim()))
                .collect();
            changes.user_add.insert(login.clone(), args);
        } else {
            let args: Vec<String> = TrackedField::ALL
                .iter()
                .filter_map(|field| {
                    let new_val = new.field(*field).trim();
                    let old_val = old.field(*field).trim();
                    (new_val != old_val).then(|| field.argument(new_val))
                })
                .collect();
            if !args.is_empty() {
                changes.user_mod.insert(login.clone(), args);
            }
        }

        let old_groups: BTreeSet<&str> = old.groups().collect();
        let new_groups: BTreeSet<&str> = new
            .groups
            .iter()
            .chain(self.default_groups)
            .map(String::as_str)
            .filter(|g| !g.is_empty())
            .collect();

        let member_arg = format!("--users={}", login);
        for group in new_groups.difference(&old_groups) {
            changes
                .group_add_member
                .entry(group.to_string())
                .or_default()
                .push(member_arg.clone());
        }
        for group in old_groups.difference(&new_groups) {
            changes
                .group_remove_member
                .entry(group.to_string())
                .or_default()
                .push(member_arg.clone());
        }
    }
}
