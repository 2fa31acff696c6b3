use anyhow::Result;
use async_trait::async_trait;
use ipa_import::core::{AnswerSource, DirectoryClient};
use ipa_import::domain::model::{Category, DirectoryRecord, MutationCommand, MutationOutcome};
use ipa_import::{ConfirmMode, Reconciler, RunOutcome, SyncError, SyncSettings};
use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};
use std::io::Write;
use std::sync::Arc;
use tempfile::NamedTempFile;
use tokio::sync::Mutex;

const HEADER: &str = "id,dept,site,title,cost,login,first,last,email,phone,mobile,room,groups";

#[derive(Clone, Default)]
struct FakeDirectory {
    users: HashMap<String, DirectoryRecord>,
    groups: BTreeSet<String>,
    lookups: Arc<Mutex<Vec<String>>>,
    issued: Arc<Mutex<Vec<MutationCommand>>>,
}

impl FakeDirectory {
    fn with_groups(groups: &[&str]) -> Self {
        Self {
            groups: groups.iter().map(|g| g.to_string()).collect(),
            ..Self::default()
        }
    }

    fn add_user(&mut self, login: &str, fields: &[(&str, &str)]) {
        let mut map: BTreeMap<String, String> = fields
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        map.insert("user_login".to_string(), login.to_string());
        self.users
            .insert(login.to_string(), DirectoryRecord::from_fields(map));
    }
}

#[async_trait]
impl DirectoryClient for FakeDirectory {
    async fn show_user(&self, login: &str) -> ipa_import::Result<DirectoryRecord> {
        self.lookups.lock().await.push(login.to_string());
        Ok(self
            .users
            .get(login)
            .cloned()
            .unwrap_or_else(DirectoryRecord::absent))
    }

    async fn group_exists(&self, group: &str) -> ipa_import::Result<bool> {
        Ok(self.groups.contains(group))
    }

    async fn apply(&self, command: &MutationCommand) -> ipa_import::Result<MutationOutcome> {
        self.issued.lock().await.push(command.clone());
        Ok(MutationOutcome::succeeded(""))
    }
}

struct Scripted(VecDeque<String>);

impl Scripted {
    fn new(answers: &[&str]) -> Self {
        Self(answers.iter().map(|a| format!("{}\n", a)).collect())
    }

    fn none() -> Self {
        Self(VecDeque::new())
    }
}

impl AnswerSource for Scripted {
    fn next_answer(&mut self, _prompt: &str) -> ipa_import::Result<Option<String>> {
        Ok(self.0.pop_front())
    }
}

fn csv_file(rows: &[&str]) -> Result<NamedTempFile> {
    let mut file = NamedTempFile::new()?;
    writeln!(file, "{}", HEADER)?;
    for row in rows {
        writeln!(file, "{}", row)?;
    }
    file.flush()?;
    Ok(file)
}

const JDOE_ROW: &str =
    "1,Sales,HQ,Rep,100,jdoe,John,Doe,a@x.com;b@x.com,0,0151 222,R1,Sales/Marketing";

fn jdoe_in_directory(directory: &mut FakeDirectory, phone: &str) {
    directory.add_user(
        "jdoe",
        &[
            ("first_name", "John"),
            ("last_name", "Doe"),
            ("email_address", "a@x.com"),
            ("telephone_number", phone),
            ("mobile_telephone_number", "0151 222"),
            ("member_of_groups", "ipausers, Sales, Marketing"),
        ],
    );
}

#[tokio::test]
async fn test_new_user_is_created_and_joined_to_groups() -> Result<()> {
    let csv = csv_file(&[JDOE_ROW])?;
    let directory = FakeDirectory::with_groups(&["ipausers", "Sales"]);
    let reconciler = Reconciler::new(directory.clone(), SyncSettings::default());

    let plan = reconciler.plan(csv.path()).await?;
    let changes = &plan.changes;

    assert_eq!(
        changes.user_add["jdoe"],
        vec![
            "--first=John",
            "--last=Doe",
            "--email=a@x.com",
            "--phone=",
            "--mobile=0151 222"
        ]
    );
    assert!(changes.user_mod.is_empty());
    for group in ["Sales", "Marketing", "ipausers"] {
        assert_eq!(changes.group_add_member[group], vec!["--users=jdoe"]);
    }
    assert_eq!(changes.group_add.len(), 1);
    assert_eq!(changes.group_add["Marketing"], vec!["--desc=Marketing"]);
    Ok(())
}

#[tokio::test]
async fn test_changed_phone_is_the_only_modification() -> Result<()> {
    let csv = csv_file(&[JDOE_ROW])?;
    let mut directory = FakeDirectory::with_groups(&["ipausers", "Sales", "Marketing"]);
    jdoe_in_directory(&mut directory, "555-1234");
    let reconciler = Reconciler::new(directory, SyncSettings::default());

    let plan = reconciler.plan(csv.path()).await?;

    assert_eq!(plan.changes.user_mod["jdoe"], vec!["--phone="]);
    assert!(plan.changes.user_add.is_empty());
    assert!(plan.changes.group_add_member.is_empty());
    assert!(plan.changes.group_remove_member.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_in_sync_directory_reports_no_changes() -> Result<()> {
    let csv = csv_file(&[JDOE_ROW])?;
    let mut directory = FakeDirectory::with_groups(&["ipausers", "Sales", "Marketing"]);
    jdoe_in_directory(&mut directory, "");
    let reconciler = Reconciler::new(directory.clone(), SyncSettings::default());

    let mut out = Vec::new();
    let outcome = reconciler
        .run(csv.path(), ConfirmMode::Interactive, &mut Scripted::none(), &mut out)
        .await?;

    assert_eq!(outcome, RunOutcome::NoChanges);
    assert_eq!(String::from_utf8(out)?, "No changes.\n");
    assert!(directory.issued.lock().await.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_abort_applies_nothing() -> Result<()> {
    let csv = csv_file(&[JDOE_ROW])?;
    let directory = FakeDirectory::with_groups(&["ipausers"]);
    let reconciler = Reconciler::new(directory.clone(), SyncSettings::default());

    let mut out = Vec::new();
    let outcome = reconciler
        .run(
            csv.path(),
            ConfirmMode::Interactive,
            &mut Scripted::new(&["n"]),
            &mut out,
        )
        .await?;

    assert_eq!(outcome, RunOutcome::Aborted);
    let text = String::from_utf8(out)?;
    assert!(text.contains("  - Added users: 1\n"));
    assert!(text.contains("  - Added groups: 2\n"));
    assert!(directory.issued.lock().await.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_details_then_accept_commits_in_order() -> Result<()> {
    let csv = csv_file(&[
        JDOE_ROW,
        "2,Ops,HQ,Lead,200,bob,Bob,Stone,bob@x.com,0,0,R2,Operations",
    ])?;
    let mut directory = FakeDirectory::with_groups(&["ipausers", "Legacy"]);
    directory.add_user(
        "bob",
        &[
            ("first_name", "Robert"),
            ("last_name", "Stone"),
            ("email_address", "bob@x.com"),
            ("telephone_number", ""),
            ("mobile_telephone_number", ""),
            ("member_of_groups", "ipausers, Legacy"),
        ],
    );
    let reconciler = Reconciler::new(directory.clone(), SyncSettings::default());

    let mut out = Vec::new();
    let outcome = reconciler
        .run(
            csv.path(),
            ConfirmMode::Interactive,
            &mut Scripted::new(&["d", "Y"]),
            &mut out,
        )
        .await?;

    let report = match outcome {
        RunOutcome::Committed(report) => report,
        other => panic!("expected commit, got {:?}", other),
    };
    assert!(!report.has_failures());

    let issued = directory.issued.lock().await;
    let sequence: Vec<(Category, &str)> = issued
        .iter()
        .map(|c| (c.category, c.primary_key.as_str()))
        .collect();
    assert_eq!(
        sequence,
        vec![
            (Category::UserAdd, "jdoe"),
            (Category::UserMod, "bob"),
            (Category::GroupAdd, "Marketing"),
            (Category::GroupAdd, "Operations"),
            (Category::GroupAdd, "Sales"),
            (Category::GroupAddMember, "Marketing"),
            (Category::GroupAddMember, "Operations"),
            (Category::GroupAddMember, "Sales"),
            (Category::GroupAddMember, "ipausers"),
            (Category::GroupRemoveMember, "Legacy"),
        ]
    );
    assert_eq!(issued[1].args, vec!["--first=Bob"]);

    let text = String::from_utf8(out)?;
    assert!(text.contains("\"group-remove-member\""));
    assert!(text.contains("Applied 10 of 10 changes"));
    Ok(())
}

#[tokio::test]
async fn test_dry_run_prints_details_without_committing() -> Result<()> {
    let csv = csv_file(&[JDOE_ROW])?;
    let directory = FakeDirectory::with_groups(&["ipausers"]);
    let reconciler = Reconciler::new(directory.clone(), SyncSettings::default());

    let mut out = Vec::new();
    let outcome = reconciler
        .run(csv.path(), ConfirmMode::DryRun, &mut Scripted::none(), &mut out)
        .await?;

    assert_eq!(outcome, RunOutcome::DryRun);
    let text = String::from_utf8(out)?;
    assert!(text.contains("\"--users=jdoe\""));
    assert!(directory.issued.lock().await.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_malformed_row_aborts_before_any_lookup() -> Result<()> {
    let csv = csv_file(&[JDOE_ROW, "2,Ops,HQ,Lead,200,bob,Bob"])?;
    let directory = FakeDirectory::default();
    let reconciler = Reconciler::new(directory.clone(), SyncSettings::default());

    let err = reconciler.plan(csv.path()).await.unwrap_err();

    assert!(matches!(err, SyncError::MalformedRow { line: 3, .. }));
    assert!(directory.lookups.lock().await.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_lookups_follow_csv_order_once_per_login() -> Result<()> {
    let csv = csv_file(&[
        "1,a,a,a,a,zoe,Zoe,Z,,,,,",
        "2,a,a,a,a,adam,Adam,A,,,,,",
        "3,a,a,a,a,zoe,Zoe,Again,,,,,",
        "4,a,a,a,a,,No,Login,,,,,",
    ])?;
    let directory = FakeDirectory::with_groups(&["ipausers"]);
    let reconciler = Reconciler::new(directory.clone(), SyncSettings::default());

    let plan = reconciler.plan(csv.path()).await?;

    assert_eq!(*directory.lookups.lock().await, vec!["zoe", "adam"]);
    assert_eq!(plan.changes.user_add["zoe"][1], "--last=Z");
    assert_eq!(
        plan.changes.group_add_member["ipausers"],
        vec!["--users=zoe", "--users=adam"]
    );
    Ok(())
}

#[tokio::test]
async fn test_custom_settings_change_columns_and_defaults() -> Result<()> {
    let settings = SyncSettings::from_toml_str(
        r#"
default_groups = ["ipausers", "staff"]
group_separator = "|"

[columns]
login = 0
first_name = 1
last_name = 2
email = 3
phone = 4
mobile = 5
groups = 6
"#,
    )?;
    let mut file = NamedTempFile::new()?;
    writeln!(file, "login,first,last,email,phone,mobile,groups")?;
    writeln!(file, "kim,Kim,Lee,kim@x.com,,,Qualität | R&D")?;
    file.flush()?;

    let directory = FakeDirectory::with_groups(&["ipausers", "staff"]);
    let reconciler = Reconciler::new(directory, settings);

    let plan = reconciler.plan(file.path()).await?;

    let groups: Vec<&str> = plan
        .changes
        .group_add_member
        .keys()
        .map(String::as_str)
        .collect();
    assert_eq!(groups, vec!["Qualitaet", "RD", "ipausers", "staff"]);
    assert_eq!(plan.changes.group_add["Qualitaet"], vec!["--desc=Qualität"]);
    assert_eq!(plan.changes.group_add["RD"], vec!["--desc=R&D"]);
    Ok(())
}

#[tokio::test]
async fn test_skipped_rows_do_not_describe_groups() -> Result<()> {
    let csv = csv_file(&[
        "1,a,a,a,a,jdoe,John,Doe,,,,,Sales Team",
        "2,a,a,a,a,,No,Login,,,,,Sales Team!",
        "3,a,a,a,a,jdoe,John,Again,,,,,Sales  Team",
    ])?;
    let directory = FakeDirectory::with_groups(&["ipausers"]);
    let reconciler = Reconciler::new(directory, SyncSettings::default());

    let plan = reconciler.plan(csv.path()).await?;

    assert_eq!(plan.records.len(), 1);
    assert_eq!(plan.descriptions.label("Sales_Team"), Some("Sales Team"));
    assert_eq!(plan.changes.group_add["Sales_Team"], vec!["--desc=Sales Team"]);
    Ok(())
}
