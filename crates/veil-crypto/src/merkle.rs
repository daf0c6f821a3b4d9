//! Fixed-depth Poseidon membership accumulator.
//!
//! The root is a pure function of the ordered commitment list: leaves are
//! laid out in insertion order, the level is padded with precomputed zero
//! values, and adjacent pairs are folded upward. Reordering or editing any
//! leaf changes the root.

use ark_bn254::Fr;
use veil_types::{IdentityCommitment, VeilError, VeilResult};

use crate::poseidon::{field_to_decimal, leaf_from_commitment, poseidon_hash2_fr, poseidon_hash_bytes};

/// Default accumulator depth, supporting 2^20 members per group.
pub const DEFAULT_MERKLE_DEPTH: usize = 20;

/// Upper bound on accumulator depth. Deeper trees address more leaves
/// than any group here will hold and risk shift overflow in the
/// capacity arithmetic.
pub const MAX_MERKLE_DEPTH: usize = 32;

pub struct MerkleRootComputer {
    depth: usize,
    zero_values: Vec<Fr>,
}

impl MerkleRootComputer {
    /// Depths above [`MAX_MERKLE_DEPTH`] are clamped.
    pub fn new(depth: usize) -> Self {
        let depth = depth.min(MAX_MERKLE_DEPTH);
        let mut zero_values = Vec::with_capacity(depth + 1);

        // Zero leaf is H(0); each level's filler is the hash of two
        // fillers from the level below.
        let zero_leaf = poseidon_hash_bytes(&[0u8]);
        zero_values.push(zero_leaf);

        let mut current = zero_leaf;
        for _ in 0..depth {
            current = poseidon_hash2_fr(current, current);
            zero_values.push(current);
        }

        Self { depth, zero_values }
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Maximum number of leaves this accumulator can hold.
    pub fn capacity(&self) -> usize {
        1usize.checked_shl(self.depth as u32).unwrap_or(usize::MAX)
    }

    /// Deterministic root over the ordered commitment sequence, rendered
    /// as a decimal string.
    pub fn compute(&self, commitments: &[IdentityCommitment]) -> VeilResult<String> {
        Ok(field_to_decimal(self.compute_field(commitments)?))
    }

    fn compute_field(&self, commitments: &[IdentityCommitment]) -> VeilResult<Fr> {
        if commitments.len() > self.capacity() {
            return Err(VeilError::Crypto(format!(
                "{} commitments exceed accumulator capacity {}",
                commitments.len(),
                self.capacity()
            )));
        }

        if commitments.is_empty() {
            return Ok(self.zero_values[self.depth]);
        }

        let mut level: Vec<Fr> = commitments
            .iter()
            .map(|c| leaf_from_commitment(&c.identity_commitment))
            .collect();

        for zero in self.zero_values.iter().take(self.depth) {
            if level.len() % 2 == 1 {
                level.push(*zero);
            }
            level = level
                .chunks(2)
                .map(|pair| poseidon_hash2_fr(pair[0], pair[1]))
                .collect();
        }

        debug_assert_eq!(level.len(), 1);
        Ok(level[0])
    }
}

impl Default for MerkleRootComputer {
    fn default() -> Self {
        Self::new(DEFAULT_MERKLE_DEPTH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn commitments(values: &[&str]) -> Vec<IdentityCommitment> {
        values
            .iter()
            .map(|v| IdentityCommitment::new("G1", *v))
            .collect()
    }

    #[test]
    fn test_root_is_deterministic() {
        let computer = MerkleRootComputer::new(8);
        let leaves = commitments(&["1", "2", "3"]);
        assert_eq!(
            computer.compute(&leaves).unwrap(),
            computer.compute(&leaves).unwrap()
        );
    }

    #[test]
    fn test_reorder_changes_root() {
        let computer = MerkleRootComputer::new(8);
        let root = computer.compute(&commitments(&["1", "2", "3"])).unwrap();
        let reordered = computer.compute(&commitments(&["2", "1", "3"])).unwrap();
        assert_ne!(root, reordered);
    }

    #[test]
    fn test_append_changes_root() {
        let computer = MerkleRootComputer::new(8);
        let root = computer.compute(&commitments(&["1", "2"])).unwrap();
        let appended = computer.compute(&commitments(&["1", "2", "3"])).unwrap();
        assert_ne!(root, appended);
    }

    #[test]
    fn test_empty_group_has_stable_root() {
        let computer = MerkleRootComputer::new(8);
        let empty = computer.compute(&[]).unwrap();
        assert_eq!(empty, MerkleRootComputer::new(8).compute(&[]).unwrap());
        assert_ne!(empty, computer.compute(&commitments(&["1"])).unwrap());
    }

    #[test]
    fn test_capacity_overflow_rejected() {
        let computer = MerkleRootComputer::new(2);
        let too_many = commitments(&["1", "2", "3", "4", "5"]);
        assert!(matches!(
            computer.compute(&too_many),
            Err(VeilError::Crypto(_))
        ));
    }

    #[test]
    fn test_excessive_depth_clamped() {
        let computer = MerkleRootComputer::new(640);
        assert_eq!(computer.depth(), MAX_MERKLE_DEPTH);
        assert_eq!(
            computer.compute(&[]).unwrap(),
            MerkleRootComputer::new(MAX_MERKLE_DEPTH).compute(&[]).unwrap()
        );
        assert!(computer.capacity() >= 1 << 31);
    }

    #[test]
    fn test_depth_affects_root() {
        let leaves = commitments(&["1", "2"]);
        let shallow = MerkleRootComputer::new(4).compute(&leaves).unwrap();
        let deep = MerkleRootComputer::new(8).compute(&leaves).unwrap();
        assert_ne!(shallow, deep);
    }

    proptest! {
        #[test]
        fn prop_any_single_leaf_edit_changes_root(
            values in proptest::collection::vec(1u64..1_000_000, 2..16),
            edit in 0usize..16,
        ) {
            let computer = MerkleRootComputer::new(8);
            let leaves: Vec<IdentityCommitment> = values
                .iter()
                .map(|v| IdentityCommitment::new("G1", v.to_string()))
                .collect();
            let root = computer.compute(&leaves).unwrap();

            let mut edited = leaves.clone();
            let idx = edit % edited.len();
            edited[idx].identity_commitment = format!("{}", values[idx] + 1_000_000);
            prop_assert_ne!(root, computer.compute(&edited).unwrap());
        }
    }
}
