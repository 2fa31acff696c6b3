use crate::core::normalize::normalize_group_token;
use crate::utils::error::{Result, SyncError};
use crate::utils::validation::{
    validate_distinct_indices, validate_non_empty_string, validate_separator, Validate,
};
use serde::{Deserialize, Serialize};

/// Zero-based CSV column positions of the fields we read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnMap {
    pub login: usize,
    pub first_name: usize,
    pub last_name: usize,
    pub email: usize,
    pub phone: usize,
    pub mobile: usize,
    pub groups: usize,
}

impl Default for ColumnMap {
    fn default() -> Self {
        Self {
            login: 5,
            first_name: 6,
            last_name: 7,
            email: 8,
            phone: 9,
            mobile: 10,
            groups: 12,
        }
    }
}

impl ColumnMap {
    pub fn named(&self) -> [(&'static str, usize); 7] {
        [
            ("login", self.login),
            ("first_name", self.first_name),
            ("last_name", self.last_name),
            ("email", self.email),
            ("phone", self.phone),
            ("mobile", self.mobile),
            ("groups", self.groups),
        ]
    }

    /// Minimum number of columns a row needs.
    pub fn required_width(&self) -> usize {
        self.named()
            .iter()
            .map(|(_, index)| *index)
            .max()
            .unwrap_or(0)
            + 1
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncSettings {
    /// Directory client executable.
    pub ipa_binary: String,
    /// Groups every imported user belongs to, whatever the CSV says.
    pub default_groups: Vec<String>,
    pub group_separator: char,
    pub email_separator: char,
    pub columns: ColumnMap,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            ipa_binary: "ipa".to_string(),
            default_groups: vec!["ipausers".to_string()],
            group_separator: '/',
            email_separator: ';',
            columns: ColumnMap::default(),
        }
    }
}

impl Validate for SyncSettings {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("ipa_binary", &self.ipa_binary)?;
        validate_separator("group_separator", self.group_separator)?;
        validate_separator("email_separator", self.email_separator)?;

        if self.group_separator == self.email_separator {
            return Err(SyncError::InvalidConfigValueError {
                field: "email_separator".to_string(),
                value: self.email_separator.to_string(),
                reason: "Must differ from group_separator".to_string(),
            });
        }

        for group in &self.default_groups {
            validate_non_empty_string("default_groups", group)?;
            if normalize_group_token(group) != *group {
                return Err(SyncError::InvalidConfigValueError {
                    field: "default_groups".to_string(),
                    value: group.clone(),
                    reason: "Group names may only contain A-Z, a-z, 0-9, '_', '/' and '-'"
                        .to_string(),
                });
            }
        }

        validate_distinct_indices("columns", &self.columns.named())
    }
}
