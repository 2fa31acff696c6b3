use crate::domain::model::{ChangeSet, Entries, GroupDescriptions};
use crate::domain::ports::DirectoryClient;
use crate::utils::error::Result;

/// Probes every group that is about to gain members and returns creation
/// arguments for the ones the directory does not know yet.
pub async fn find_missing_groups<D: DirectoryClient + ?Sized>(
    client: &D,
    changes: &ChangeSet,
    descriptions: &GroupDescriptions,
) -> Result<Entries> {
    let mut missing = Entries::new();

    for group in changes.group_add_member.keys() {
        if client.group_exists(group).await? {
            continue;
        }
        tracing::debug!("Group {} does not exist yet", group);
        let args = descriptions
            .label(group)
            .map(|label| vec![format!("--desc={}", label)])
            .unwrap_or_default();
        missing.insert(group.clone(), args);
    }

    Ok(missing)
}
