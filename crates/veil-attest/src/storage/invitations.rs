use super::{keys, GroupStorage};
use sled::Batch;
use tracing::debug;
use veil_types::{Invitation, VeilError, VeilResult};

// Invitations are stored as JSON rather than bincode: the state enum is
// internally tagged and needs a self-describing format.

impl GroupStorage {
    /// Insert a cohort of invitations as one all-or-nothing batch.
    pub fn insert_invitations(&self, invitations: &[Invitation]) -> VeilResult<()> {
        let mut batch = Batch::default();

        for invitation in invitations {
            let key = keys::invitation_key(&invitation.identity_group, &invitation.code);
            let bytes = serde_json::to_vec(invitation).map_err(|e| {
                VeilError::Serialization(format!("Failed to serialize invitation: {}", e))
            })?;
            batch.insert(key, bytes);
        }

        self.metrics.bump_writes();
        self.invitations.apply_batch(batch).map_err(|e| {
            self.metrics.bump_errors();
            VeilError::Storage(format!("Failed to store invitations: {}", e))
        })?;

        debug!("Inserted {} invitations", invitations.len());
        Ok(())
    }

    pub fn get_invitation(
        &self,
        identity_group: &str,
        code: &str,
    ) -> VeilResult<Option<Invitation>> {
        self.metrics.bump_reads();

        match self
            .invitations
            .get(keys::invitation_key(identity_group, code))
            .map_err(|e| VeilError::Storage(format!("Failed to load invitation: {}", e)))?
        {
            Some(bytes) => {
                let invitation: Invitation = serde_json::from_slice(&bytes).map_err(|e| {
                    self.metrics.bump_errors();
                    VeilError::Serialization(format!("Failed to deserialize invitation: {}", e))
                })?;
                Ok(Some(invitation))
            }
            None => Ok(None),
        }
    }

    pub fn list_invitations(&self, identity_group: &str) -> VeilResult<Vec<Invitation>> {
        let mut results = Vec::new();

        for entry in self
            .invitations
            .scan_prefix(keys::invitation_prefix(identity_group))
        {
            let (_, value) = entry.map_err(|e| {
                self.metrics.bump_errors();
                VeilError::Storage(format!("Failed to iterate invitations: {}", e))
            })?;

            self.metrics.bump_reads();
            let invitation: Invitation = serde_json::from_slice(&value).map_err(|e| {
                VeilError::Serialization(format!("Failed to deserialize invitation: {}", e))
            })?;
            results.push(invitation);
        }

        Ok(results)
    }

    /// Transition an invitation Unconsumed -> Consumed in a single
    /// conditional swap against the bytes that were read. A lost race
    /// means someone else consumed the code first; that is a conflict,
    /// the transition never repeats and never reverses.
    pub fn consume_invitation(
        &self,
        identity_group: &str,
        code: &str,
        consumed_by: &str,
    ) -> VeilResult<Invitation> {
        let key = keys::invitation_key(identity_group, code);

        self.metrics.bump_reads();
        let current_bytes = self
            .invitations
            .get(&key)
            .map_err(|e| VeilError::Storage(format!("Failed to load invitation: {}", e)))?
            .ok_or_else(|| {
                VeilError::NotFound(format!("invitation {} does not exist", code))
            })?;

        let invitation: Invitation = serde_json::from_slice(&current_bytes).map_err(|e| {
            self.metrics.bump_errors();
            VeilError::Serialization(format!("Failed to deserialize invitation: {}", e))
        })?;

        if invitation.state.is_consumed() {
            return Err(VeilError::Conflict(format!(
                "invitation {} already consumed",
                code
            )));
        }

        let consumed = invitation.consumed_by(consumed_by);
        let new_bytes = serde_json::to_vec(&consumed).map_err(|e| {
            VeilError::Serialization(format!("Failed to serialize invitation: {}", e))
        })?;

        self.metrics.bump_writes();
        match self
            .invitations
            .compare_and_swap(key, Some(current_bytes), Some(new_bytes))
        {
            Ok(Ok(())) => {
                debug!("Invitation {} consumed by {}", code, consumed_by);
                Ok(consumed)
            }
            Ok(Err(_)) => {
                self.metrics.bump_conflicts();
                Err(VeilError::Conflict(format!(
                    "invitation {} already consumed",
                    code
                )))
            }
            Err(e) => {
                self.metrics.bump_errors();
                Err(VeilError::Storage(format!(
                    "Failed to update invitation: {}",
                    e
                )))
            }
        }
    }
}
