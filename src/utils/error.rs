use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Row on line {line} has {found} columns, at least {required} required")]
    MalformedRow {
        line: u64,
        required: usize,
        found: usize,
    },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Failed to run '{program}': {source}")]
    CommandSpawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Configuration,
    Directory,
    System,
}

impl SyncError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            SyncError::CsvError(_) | SyncError::MalformedRow { .. } => ErrorCategory::Input,
            SyncError::ConfigError { .. } | SyncError::InvalidConfigValueError { .. } => {
                ErrorCategory::Configuration
            }
            SyncError::CommandSpawn { .. } => ErrorCategory::Directory,
            SyncError::IoError(_)
            | SyncError::SerializationError(_)
            | SyncError::ProcessingError { .. } => ErrorCategory::System,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            SyncError::IoError(e) => format!("Could not read input: {}", e),
            SyncError::CsvError(e) => format!("The CSV file could not be parsed: {}", e),
            SyncError::MalformedRow {
                line,
                required,
                found,
            } => format!(
                "Line {} of the CSV file has only {} columns ({} needed); nothing was changed",
                line, found, required
            ),
            SyncError::CommandSpawn { program, .. } => {
                format!("The directory tool '{}' could not be started", program)
            }
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Input => "Check the CSV export: delimiter, header row and column layout",
            ErrorCategory::Configuration => "Fix the settings file or command line options",
            ErrorCategory::Directory => {
                "Make sure the ipa client is installed, on PATH, and you hold a Kerberos ticket"
            }
            ErrorCategory::System => "Re-run with --verbose for more detail",
        }
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;
