pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::{IpaCli, LineAnswers};
pub use config::{CliConfig, SyncSettings};
pub use crate::core::engine::{ConfirmMode, Reconciler, RunOutcome};
pub use utils::error::{Result, SyncError};
