use crate::domain::model::{DirectoryRecord, MutationCommand, MutationOutcome};
use crate::domain::ports::DirectoryClient;
use crate::utils::error::{Result, SyncError};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::process::Stdio;
use tokio::process::Command;

/// Talks to FreeIPA through its `ipa` command line client.
#[derive(Debug, Clone)]
pub struct IpaCli {
    binary: String,
}

impl IpaCli {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    fn command(&self) -> Command {
        let mut command = Command::new(&self.binary);
        command.stdin(Stdio::null());
        command
    }

    fn spawn_error(&self, source: std::io::Error) -> SyncError {
        SyncError::CommandSpawn {
            program: self.binary.clone(),
            source,
        }
    }
}

/// Parses `Key: Value` lines of `ipa user-show --all` into a record.
///
/// Keys are lower-cased with whitespace runs replaced by `_`; values are
/// trimmed. Lines without a colon are ignored.
pub fn parse_show_output(output: &str) -> DirectoryRecord {
    let mut fields = BTreeMap::new();
    for line in output.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("_")
            .to_lowercase();
        if key.is_empty() {
            continue;
        }
        fields.insert(key, value.trim().to_string());
    }
    DirectoryRecord::from_fields(fields)
}

pub fn mutation_args(command: &MutationCommand) -> Vec<String> {
    let mut args = vec![
        "--no-prompt".to_string(),
        command.category.as_str().to_string(),
        command.primary_key.clone(),
    ];
    args.extend(command.args.iter().cloned());
    args
}

#[async_trait]
impl DirectoryClient for IpaCli {
    async fn show_user(&self, login: &str) -> Result<DirectoryRecord> {
        let output = self
            .command()
            .args(["user-show", "--all", login])
            .output()
            .await
            .map_err(|e| self.spawn_error(e))?;

        if !output.status.success() {
            tracing::debug!(
                "user-show {} exited with {}: {}",
                login,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
            return Ok(DirectoryRecord::absent());
        }

        Ok(parse_show_output(&String::from_utf8_lossy(&output.stdout)))
    }

    async fn group_exists(&self, group: &str) -> Result<bool> {
        let status = self
            .command()
            .args(["group-show", group])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map_err(|e| self.spawn_error(e))?;

        Ok(status.success())
    }

    async fn apply(&self, command: &MutationCommand) -> Result<MutationOutcome> {
        let output = self
            .command()
            .args(mutation_args(command))
            .output()
            .await
            .map_err(|e| self.spawn_error(e))?;

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));

        if output.status.success() {
            Ok(MutationOutcome::succeeded(text))
        } else {
            Ok(MutationOutcome::failed(output.status.code(), text))
        }
    }
}
