//! Composite key schema shared by every tree.
//!
//! Every entity is addressed by `IDENTITY_GROUP#{group}` plus a
//! type-specific sort suffix, so one prefix scan retrieves all of a
//! group's commitments, claims or invitations. Commitment sort keys end
//! in a big-endian u64 index, which keeps lexicographic key order equal
//! to append order. Group ids must not contain `#` (enforced at group
//! creation) or partition prefixes would be ambiguous. Nullifiers are
//! user-controlled and may contain `#`, so claim sort keys length-prefix
//! the external nullifier instead of joining the pair with a delimiter.

pub const PARTITION_PREFIX: &str = "IDENTITY_GROUP#";
const SORT_GROUP: &str = "#GROUP";
const SORT_COMMITMENT: &str = "#COMMITMENT#";
const SORT_CLAIM: &str = "#CLAIM#";
const SORT_INVITATION: &str = "#INVITATION#";

fn partition(identity_group: &str) -> String {
    format!("{}{}", PARTITION_PREFIX, identity_group)
}

pub fn group_key(identity_group: &str) -> Vec<u8> {
    format!("{}{}", partition(identity_group), SORT_GROUP).into_bytes()
}

pub fn commitment_key(identity_group: &str, index: u64) -> Vec<u8> {
    let mut key = commitment_prefix(identity_group);
    key.extend_from_slice(&index.to_be_bytes());
    key
}

pub fn commitment_prefix(identity_group: &str) -> Vec<u8> {
    format!("{}{}", partition(identity_group), SORT_COMMITMENT).into_bytes()
}

pub fn claim_key(identity_group: &str, external_nullifier: &str, nullifier: &str) -> Vec<u8> {
    let mut key = claim_prefix(identity_group);
    key.extend_from_slice(&(external_nullifier.len() as u32).to_be_bytes());
    key.extend_from_slice(external_nullifier.as_bytes());
    key.extend_from_slice(nullifier.as_bytes());
    key
}

pub fn claim_prefix(identity_group: &str) -> Vec<u8> {
    format!("{}{}", partition(identity_group), SORT_CLAIM).into_bytes()
}

pub fn invitation_key(identity_group: &str, code: &str) -> Vec<u8> {
    format!("{}{}{}", partition(identity_group), SORT_INVITATION, code).into_bytes()
}

pub fn invitation_prefix(identity_group: &str) -> Vec<u8> {
    format!("{}{}", partition(identity_group), SORT_INVITATION).into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commitment_keys_sort_by_index() {
        let earlier = commitment_key("G1", 41);
        let later = commitment_key("G1", 42);
        let much_later = commitment_key("G1", 1 << 33);
        assert!(earlier < later);
        assert!(later < much_later);
    }

    #[test]
    fn test_prefixes_scope_to_group() {
        assert!(claim_key("G1", "e1", "n1").starts_with(&claim_prefix("G1")));
        assert!(!claim_key("G2", "e1", "n1").starts_with(&claim_prefix("G1")));
        assert!(invitation_key("G1", "code").starts_with(&invitation_prefix("G1")));
    }

    #[test]
    fn test_claim_key_separates_nullifiers() {
        assert_ne!(claim_key("G1", "e1", "n1"), claim_key("G1", "e1", "n2"));
        assert_ne!(claim_key("G1", "e1", "n1"), claim_key("G1", "e2", "n1"));
    }

    #[test]
    fn test_claim_key_unambiguous_with_hash_in_nullifiers() {
        // Without the length prefix these distinct triples would share
        // one key.
        assert_ne!(
            claim_key("G1", "e1#x", "n1"),
            claim_key("G1", "e1", "x#n1")
        );
        assert_ne!(claim_key("G1", "e1#", "n1"), claim_key("G1", "e1", "#n1"));
        assert_ne!(claim_key("G1", "", "e1#n1"), claim_key("G1", "e1", "n1"));
    }
}
