use serde::{Deserialize, Serialize};

/// A named collection of enrolled members sharing one membership
/// accumulator. Immutable once created.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityGroup {
    pub identity_group: String,
    pub name: String,
}

/// One enrolled member's public commitment, a leaf of the group's
/// accumulator. Append-only; insertion order is the canonical leaf order
/// and must never change.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityCommitment {
    pub identity_group: String,
    pub identity_commitment: String,
}

impl IdentityCommitment {
    pub fn new(identity_group: impl Into<String>, identity_commitment: impl Into<String>) -> Self {
        Self {
            identity_group: identity_group.into(),
            identity_commitment: identity_commitment.into(),
        }
    }
}
