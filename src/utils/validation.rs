use crate::utils::error::{Result, SyncError};
use std::collections::HashMap;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(SyncError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(SyncError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(SyncError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_separator(field_name: &str, value: char) -> Result<()> {
    if value.is_whitespace() || value.is_control() {
        return Err(SyncError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.escape_default().to_string(),
            reason: "Separator must be a visible character".to_string(),
        });
    }
    Ok(())
}

/// Fails on the first index that is claimed by more than one name.
pub fn validate_distinct_indices(field_name: &str, indices: &[(&str, usize)]) -> Result<()> {
    let mut seen: HashMap<usize, &str> = HashMap::new();
    for (name, index) in indices {
        if let Some(previous) = seen.insert(*index, *name) {
            return Err(SyncError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: index.to_string(),
                reason: format!("Column {} is used by both {} and {}", index, previous, name),
            });
        }
    }
    Ok(())
}
