pub mod cli;
pub mod settings;
pub mod toml_config;

pub use cli::CliConfig;
pub use settings::{ColumnMap, SyncSettings};
