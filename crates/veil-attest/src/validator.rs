use std::sync::Arc;
use tracing::{debug, info, warn};
use veil_crypto::MerkleRootComputer;
use veil_types::{Claim, ClaimRequest, VeilError, VeilResult};

use crate::storage::GroupStorage;
use crate::verifier::{ClaimSignals, ProofVerifier};

/// The claim-submission state machine. Each gate fails closed; nothing is
/// written before the single conditional commit at the end, so an
/// abandoned submission leaves no trace and a retried one either wins
/// once or observes the prior winner as a conflict.
pub struct ClaimValidator {
    storage: Arc<GroupStorage>,
    verifier: Arc<dyn ProofVerifier>,
    root_computer: MerkleRootComputer,
}

impl ClaimValidator {
    pub fn new(
        storage: Arc<GroupStorage>,
        verifier: Arc<dyn ProofVerifier>,
        root_computer: MerkleRootComputer,
    ) -> Self {
        Self {
            storage,
            verifier,
            root_computer,
        }
    }

    /// Validate and commit one claim submission.
    ///
    /// Gate order: shape check, group existence, root consistency,
    /// nullifier fast-fail, proof verification, conditional commit. The
    /// root check runs before the verifier so a stale-root claim is never
    /// handed to the proof system; the nullifier fast-fail is advisory
    /// only and the commit re-checks absence atomically.
    pub async fn submit(&self, request: ClaimRequest) -> VeilResult<Claim> {
        request.validate()?;

        let identity_group = request.identity_group.clone();
        debug!(
            "Claim submission for group {} external nullifier {}",
            identity_group, request.external_nullifier
        );

        if !self.storage.group_exists(&identity_group)? {
            return Err(VeilError::NotFound(format!(
                "identity group {} does not exist",
                identity_group
            )));
        }

        let commitments = self.storage.list_commitments(&identity_group)?;
        let current_root = self.root_computer.compute(&commitments)?;
        if current_root != request.proof.merkle_root {
            warn!(
                "Stale merkle root for group {}: claim built against {}, current is {}",
                identity_group, request.proof.merkle_root, current_root
            );
            return Err(VeilError::Conflict("stale merkle root".into()));
        }

        if self.storage.claim_exists(
            &identity_group,
            &request.external_nullifier,
            &request.nullifier,
        )? {
            return Err(VeilError::Conflict("nullifier already consumed".into()));
        }

        let verified = self
            .verifier
            .verify(ClaimSignals {
                merkle_root: &request.proof.merkle_root,
                nullifier: &request.nullifier,
                external_nullifier: &request.external_nullifier,
                message: &request.message,
                snark_proof: &request.proof.snark_proof,
            })
            .await?;
        if !verified {
            return Err(VeilError::ProofVerification(
                "snark proof did not verify".into(),
            ));
        }

        let claim = request.into_claim(chrono::Utc::now().timestamp());
        self.storage.insert_claim_if_absent(&claim)?;

        info!(
            "Accepted claim for group {} external nullifier {}",
            identity_group, claim.external_nullifier
        );
        Ok(claim)
    }
}
