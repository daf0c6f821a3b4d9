use super::{keys, GroupStorage};
use tracing::debug;
use veil_types::{IdentityGroup, VeilError, VeilResult};

impl GroupStorage {
    /// Register a new identity group. The insert is conditional on the id
    /// being unused; a taken id is a conflict, not an overwrite.
    pub fn create_group(&self, group: &IdentityGroup) -> VeilResult<()> {
        if group.identity_group.is_empty() {
            return Err(VeilError::Validation("identity group id is empty".into()));
        }
        if group.identity_group.contains('#') {
            return Err(VeilError::Validation(
                "identity group id must not contain '#'".into(),
            ));
        }

        let key = keys::group_key(&group.identity_group);
        let bytes = bincode::serialize(group)
            .map_err(|e| VeilError::Serialization(format!("Failed to serialize group: {}", e)))?;

        self.metrics.bump_writes();
        match self.groups.compare_and_swap(key, None as Option<&[u8]>, Some(bytes)) {
            Ok(Ok(())) => {
                debug!("Created identity group {}", group.identity_group);
                Ok(())
            }
            Ok(Err(_)) => {
                self.metrics.bump_conflicts();
                Err(VeilError::Conflict(format!(
                    "identity group {} already exists",
                    group.identity_group
                )))
            }
            Err(e) => {
                self.metrics.bump_errors();
                Err(VeilError::Storage(format!("Failed to store group: {}", e)))
            }
        }
    }

    pub fn get_group(&self, identity_group: &str) -> VeilResult<Option<IdentityGroup>> {
        self.metrics.bump_reads();

        match self
            .groups
            .get(keys::group_key(identity_group))
            .map_err(|e| VeilError::Storage(format!("Failed to load group: {}", e)))?
        {
            Some(bytes) => {
                let group: IdentityGroup = bincode::deserialize(&bytes).map_err(|e| {
                    self.metrics.bump_errors();
                    VeilError::Serialization(format!("Failed to deserialize group: {}", e))
                })?;
                Ok(Some(group))
            }
            None => Ok(None),
        }
    }

    pub fn group_exists(&self, identity_group: &str) -> VeilResult<bool> {
        self.metrics.bump_reads();
        self.groups
            .contains_key(keys::group_key(identity_group))
            .map_err(|e| VeilError::Storage(format!("Failed to check group: {}", e)))
    }
}
