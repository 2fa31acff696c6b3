use crate::domain::model::{DirectoryRecord, MutationCommand, MutationOutcome};
use crate::utils::error::Result;
use async_trait::async_trait;

/// The identity directory, reached through an external client tool.
#[async_trait]
pub trait DirectoryClient: Send + Sync {
    /// Current record for `login`, or [`DirectoryRecord::absent`] when the lookup misses.
    async fn show_user(&self, login: &str) -> Result<DirectoryRecord>;

    /// Whether `group` exists. A failed probe counts as "does not exist".
    async fn group_exists(&self, group: &str) -> Result<bool>;

    /// Run one mutating command. `Err` is reserved for commands that could not be started.
    async fn apply(&self, command: &MutationCommand) -> Result<MutationOutcome>;
}

/// One line of interactive input per call; `None` at end of input.
pub trait AnswerSource {
    fn next_answer(&mut self, prompt: &str) -> Result<Option<String>>;
}
