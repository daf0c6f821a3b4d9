use super::{keys, GroupStorage};
use tracing::debug;
use veil_types::{IdentityCommitment, VeilError, VeilResult};

impl GroupStorage {
    /// Append a member's commitment at the end of the group's leaf
    /// sequence. Indexes come from the database's monotonic id generator,
    /// so appends never reorder earlier leaves.
    pub fn append_commitment(&self, commitment: &IdentityCommitment) -> VeilResult<u64> {
        let index = self
            .db
            .generate_id()
            .map_err(|e| VeilError::Storage(format!("Failed to allocate leaf index: {}", e)))?;

        let key = keys::commitment_key(&commitment.identity_group, index);
        let bytes = bincode::serialize(commitment).map_err(|e| {
            VeilError::Serialization(format!("Failed to serialize commitment: {}", e))
        })?;

        self.metrics.bump_writes();
        self.commitments.insert(key, bytes).map_err(|e| {
            self.metrics.bump_errors();
            VeilError::Storage(format!("Failed to store commitment: {}", e))
        })?;

        debug!(
            "Appended commitment to {} at leaf index {}",
            commitment.identity_group, index
        );
        Ok(index)
    }

    /// All commitments of a group in original append order, complete.
    /// This sequence is the canonical input to the root computer.
    pub fn list_commitments(&self, identity_group: &str) -> VeilResult<Vec<IdentityCommitment>> {
        let mut results = Vec::new();

        for entry in self.commitments.scan_prefix(keys::commitment_prefix(identity_group)) {
            let (_, value) = entry.map_err(|e| {
                self.metrics.bump_errors();
                VeilError::Storage(format!("Failed to iterate commitments: {}", e))
            })?;

            self.metrics.bump_reads();
            let commitment: IdentityCommitment = bincode::deserialize(&value).map_err(|e| {
                VeilError::Serialization(format!("Failed to deserialize commitment: {}", e))
            })?;
            results.push(commitment);
        }

        Ok(results)
    }

    pub fn commitment_count(&self, identity_group: &str) -> VeilResult<usize> {
        let mut count = 0;
        for entry in self.commitments.scan_prefix(keys::commitment_prefix(identity_group)) {
            entry.map_err(|e| VeilError::Storage(format!("Failed to iterate commitments: {}", e)))?;
            count += 1;
        }
        Ok(count)
    }
}
