use std::sync::Arc;
use tracing::{debug, info};
use veil_types::{IdentityCommitment, Invitation, VeilError, VeilResult};

use crate::storage::GroupStorage;

/// One requested invitation in a cohort.
#[derive(Clone, Debug)]
pub struct InvitationRequest {
    pub name: String,
    pub email: String,
}

/// Invitation issuance and redemption. Issuance writes a whole cohort in
/// one atomic batch; redemption consumes the single-use code and appends
/// the new member's commitment. The code's conditional state transition
/// is the serialization point, so a contended code enrolls exactly one
/// member.
pub struct EnrollmentService {
    storage: Arc<GroupStorage>,
}

impl EnrollmentService {
    pub fn new(storage: Arc<GroupStorage>) -> Self {
        Self { storage }
    }

    pub async fn issue_invitations(
        &self,
        identity_group: &str,
        requests: Vec<InvitationRequest>,
    ) -> VeilResult<Vec<Invitation>> {
        if requests.is_empty() {
            return Err(VeilError::Validation("no invitations requested".into()));
        }
        if !self.storage.group_exists(identity_group)? {
            return Err(VeilError::NotFound(format!(
                "identity group {} does not exist",
                identity_group
            )));
        }

        let created = chrono::Utc::now().timestamp();
        let invitations: Vec<Invitation> = requests
            .into_iter()
            .map(|r| Invitation::new(identity_group, r.name, r.email, created))
            .collect();

        self.storage.insert_invitations(&invitations)?;
        info!(
            "Issued {} invitations for group {}",
            invitations.len(),
            identity_group
        );
        Ok(invitations)
    }

    /// Redeem an invitation code and enroll the member's commitment.
    ///
    /// The commitment append happens only after the code's transition
    /// succeeds. A crash in between leaves a consumed code with no leaf,
    /// which an operator can reconcile; the reverse order could enroll
    /// the same code twice and is never acceptable.
    pub async fn redeem(
        &self,
        identity_group: &str,
        code: &str,
        identity_commitment: &str,
        consumed_by: &str,
    ) -> VeilResult<Invitation> {
        if identity_commitment.is_empty() {
            return Err(VeilError::Validation("identity commitment is empty".into()));
        }
        if !self.storage.group_exists(identity_group)? {
            return Err(VeilError::NotFound(format!(
                "identity group {} does not exist",
                identity_group
            )));
        }

        let consumed = self
            .storage
            .consume_invitation(identity_group, code, consumed_by)?;

        let leaf_index = self.storage.append_commitment(&IdentityCommitment::new(
            identity_group,
            identity_commitment,
        ))?;

        debug!(
            "Enrolled member into group {} at leaf index {} via invitation {}",
            identity_group, leaf_index, code
        );
        Ok(consumed)
    }
}
