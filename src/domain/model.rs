use serde::Serialize;
use std::collections::BTreeMap;

/// One CSV row as read from disk, before normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawEntry {
    pub line: u64,
    pub login: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub mobile: String,
    pub groups: String,
}

/// A normalized CSV row: the desired state of one directory user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceRecord {
    pub login: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub mobile: String,
    pub groups: Vec<String>,
}

impl SourceRecord {
    pub fn field(&self, field: TrackedField) -> &str {
        match field {
            TrackedField::FirstName => &self.first_name,
            TrackedField::LastName => &self.last_name,
            TrackedField::Email => &self.email,
            TrackedField::Phone => &self.phone,
            TrackedField::Mobile => &self.mobile,
        }
    }
}

/// User attributes kept in sync, in the order their arguments are emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackedField {
    FirstName,
    LastName,
    Email,
    Phone,
    Mobile,
}

impl TrackedField {
    pub const ALL: [TrackedField; 5] = [
        TrackedField::FirstName,
        TrackedField::LastName,
        TrackedField::Email,
        TrackedField::Phone,
        TrackedField::Mobile,
    ];

    /// Flag name understood by `ipa user-add` / `ipa user-mod`.
    pub fn flag(self) -> &'static str {
        match self {
            TrackedField::FirstName => "first",
            TrackedField::LastName => "last",
            TrackedField::Email => "email",
            TrackedField::Phone => "phone",
            TrackedField::Mobile => "mobile",
        }
    }

    /// Key of the field in parsed `ipa user-show --all` output.
    pub fn directory_key(self) -> &'static str {
        match self {
            TrackedField::FirstName => "first_name",
            TrackedField::LastName => "last_name",
            TrackedField::Email => "email_address",
            TrackedField::Phone => "telephone_number",
            TrackedField::Mobile => "mobile_telephone_number",
        }
    }

    pub fn argument(self, value: &str) -> String {
        format!("--{}={}", self.flag(), value)
    }
}

pub const GROUPS_KEY: &str = "member_of_groups";

/// The directory's current view of a user.
///
/// A record with no keys at all means the user does not exist yet. An existing
/// user with blank attributes still carries those keys with empty values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DirectoryRecord {
    fields: BTreeMap<String, String>,
}

impl DirectoryRecord {
    pub fn absent() -> Self {
        Self::default()
    }

    pub fn from_fields(fields: BTreeMap<String, String>) -> Self {
        Self { fields }
    }

    pub fn is_absent(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    pub fn field(&self, field: TrackedField) -> &str {
        self.get(field.directory_key()).unwrap_or("")
    }

    /// Group memberships, parsed from the comma separated `member_of_groups` value.
    pub fn groups(&self) -> impl Iterator<Item = &str> {
        self.get(GROUPS_KEY)
            .unwrap_or("")
            .split(", ")
            .map(str::trim)
            .filter(|g| !g.is_empty())
    }
}

/// Normalized group token -> human readable label from the CSV.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GroupDescriptions {
    labels: BTreeMap<String, String>,
}

impl GroupDescriptions {
    /// Later labels for the same token overwrite earlier ones.
    pub fn record(&mut self, token: &str, label: &str) {
        self.labels.insert(token.to_string(), label.to_string());
    }

    pub fn label(&self, token: &str) -> Option<&str> {
        self.labels.get(token).map(String::as_str)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Category {
    #[serde(rename = "user-add")]
    UserAdd,
    #[serde(rename = "user-mod")]
    UserMod,
    #[serde(rename = "group-add")]
    GroupAdd,
    #[serde(rename = "group-add-member")]
    GroupAddMember,
    #[serde(rename = "group-remove-member")]
    GroupRemoveMember,
}

impl Category {
    /// Users must exist before they join groups, groups before they get members.
    pub const COMMIT_ORDER: [Category; 5] = [
        Category::UserAdd,
        Category::UserMod,
        Category::GroupAdd,
        Category::GroupAddMember,
        Category::GroupRemoveMember,
    ];

    /// Subcommand name of the directory tool.
    pub fn as_str(self) -> &'static str {
        match self {
            Category::UserAdd => "user-add",
            Category::UserMod => "user-mod",
            Category::GroupAdd => "group-add",
            Category::GroupAddMember => "group-add-member",
            Category::GroupRemoveMember => "group-remove-member",
        }
    }

    pub fn summary_label(self) -> &'static str {
        match self {
            Category::UserAdd => "Added users",
            Category::UserMod => "Modified users",
            Category::GroupAdd => "Added groups",
            Category::GroupAddMember => "Adding users to groups",
            Category::GroupRemoveMember => "Removing users from groups",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub type Entries = BTreeMap<String, Vec<String>>;

/// Pending directory mutations, keyed by login or group token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChangeSet {
    #[serde(rename = "user-add")]
    pub user_add: Entries,
    #[serde(rename = "user-mod")]
    pub user_mod: Entries,
    #[serde(rename = "group-add")]
    pub group_add: Entries,
    #[serde(rename = "group-add-member")]
    pub group_add_member: Entries,
    #[serde(rename = "group-remove-member")]
    pub group_remove_member: Entries,
}

impl ChangeSet {
    pub fn entries(&self, category: Category) -> &Entries {
        match category {
            Category::UserAdd => &self.user_add,
            Category::UserMod => &self.user_mod,
            Category::GroupAdd => &self.group_add,
            Category::GroupAddMember => &self.group_add_member,
            Category::GroupRemoveMember => &self.group_remove_member,
        }
    }

    pub fn count(&self, category: Category) -> usize {
        self.entries(category).len()
    }

    pub fn is_empty(&self) -> bool {
        Category::COMMIT_ORDER
            .iter()
            .all(|category| self.entries(*category).is_empty())
    }

    pub fn total(&self) -> usize {
        Category::COMMIT_ORDER
            .iter()
            .map(|category| self.count(*category))
            .sum()
    }

    /// One command per entry, categories in commit order.
    pub fn commands(&self) -> Vec<MutationCommand> {
        Category::COMMIT_ORDER
            .iter()
            .flat_map(|category| {
                self.entries(*category)
                    .iter()
                    .map(move |(key, args)| MutationCommand {
                        category: *category,
                        primary_key: key.clone(),
                        args: args.clone(),
                    })
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationCommand {
    pub category: Category,
    pub primary_key: String,
    pub args: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationOutcome {
    pub success: bool,
    pub exit_code: Option<i32>,
    pub output: String,
}

impl MutationOutcome {
    pub fn succeeded(output: impl Into<String>) -> Self {
        Self {
            success: true,
            exit_code: Some(0),
            output: output.into(),
        }
    }

    pub fn failed(exit_code: Option<i32>, output: impl Into<String>) -> Self {
        Self {
            success: false,
            exit_code,
            output: output.into(),
        }
    }
}
