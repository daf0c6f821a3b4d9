use super::{keys, GroupStorage};
use tracing::debug;
use veil_types::{Claim, VeilError, VeilResult};

impl GroupStorage {
    /// Advisory existence check for the fast-fail gate of the claim
    /// pipeline. The binding uniqueness guarantee is the conditional
    /// insert below, never this read.
    pub fn claim_exists(
        &self,
        identity_group: &str,
        external_nullifier: &str,
        nullifier: &str,
    ) -> VeilResult<bool> {
        self.metrics.bump_reads();
        self.claims
            .contains_key(keys::claim_key(identity_group, external_nullifier, nullifier))
            .map_err(|e| VeilError::Storage(format!("Failed to check claim: {}", e)))
    }

    pub fn get_claim(
        &self,
        identity_group: &str,
        external_nullifier: &str,
        nullifier: &str,
    ) -> VeilResult<Option<Claim>> {
        self.metrics.bump_reads();

        match self
            .claims
            .get(keys::claim_key(identity_group, external_nullifier, nullifier))
            .map_err(|e| VeilError::Storage(format!("Failed to load claim: {}", e)))?
        {
            Some(bytes) => {
                let claim: Claim = bincode::deserialize(&bytes).map_err(|e| {
                    self.metrics.bump_errors();
                    VeilError::Serialization(format!("Failed to deserialize claim: {}", e))
                })?;
                Ok(Some(claim))
            }
            None => Ok(None),
        }
    }

    /// The single conditional commit of the claim pipeline: one
    /// compare-and-swap on the nullifier key, succeeding only if the key
    /// is absent at write time. Exactly one of any set of racing
    /// submissions for the same triple can win; the rest observe a
    /// conflict.
    pub fn insert_claim_if_absent(&self, claim: &Claim) -> VeilResult<()> {
        let key = keys::claim_key(
            &claim.identity_group,
            &claim.external_nullifier,
            &claim.nullifier,
        );
        let bytes = bincode::serialize(claim)
            .map_err(|e| VeilError::Serialization(format!("Failed to serialize claim: {}", e)))?;

        self.metrics.bump_writes();
        match self.claims.compare_and_swap(key, None as Option<&[u8]>, Some(bytes)) {
            Ok(Ok(())) => {
                debug!(
                    "Recorded claim for group {} external nullifier {}",
                    claim.identity_group, claim.external_nullifier
                );
                Ok(())
            }
            Ok(Err(_)) => {
                self.metrics.bump_conflicts();
                Err(VeilError::Conflict("nullifier already consumed".into()))
            }
            Err(e) => {
                self.metrics.bump_errors();
                Err(VeilError::Storage(format!("Failed to store claim: {}", e)))
            }
        }
    }

    /// All accepted claims of a group, in key order.
    pub fn list_claims(&self, identity_group: &str) -> VeilResult<Vec<Claim>> {
        let mut results = Vec::new();

        for entry in self.claims.scan_prefix(keys::claim_prefix(identity_group)) {
            let (_, value) = entry.map_err(|e| {
                self.metrics.bump_errors();
                VeilError::Storage(format!("Failed to iterate claims: {}", e))
            })?;

            self.metrics.bump_reads();
            let claim: Claim = bincode::deserialize(&value).map_err(|e| {
                VeilError::Serialization(format!("Failed to deserialize claim: {}", e))
            })?;
            results.push(claim);
        }

        Ok(results)
    }
}
