use super::*;
use veil_types::{Claim, ClaimProof, IdentityCommitment, IdentityGroup, Invitation, SnarkProof};

fn storage() -> GroupStorage {
    GroupStorage::in_memory().unwrap()
}

fn group(id: &str) -> IdentityGroup {
    IdentityGroup {
        identity_group: id.to_string(),
        name: format!("{} group", id),
    }
}

fn claim(group: &str, external: &str, nullifier: &str, message: &str) -> Claim {
    Claim {
        identity_group: group.to_string(),
        nullifier: nullifier.to_string(),
        external_nullifier: external.to_string(),
        message: message.to_string(),
        proof: ClaimProof {
            merkle_root: "42".to_string(),
            snark_proof: SnarkProof {
                pi_a: vec!["1".into(), "2".into(), "1".into()],
                pi_b: vec![
                    vec!["1".into(), "2".into()],
                    vec!["3".into(), "4".into()],
                    vec!["1".into(), "0".into()],
                ],
                pi_c: vec!["5".into(), "6".into(), "1".into()],
            },
        },
        timestamp: 1_700_000_000,
    }
}

#[test]
fn test_group_create_and_lookup() {
    let storage = storage();
    assert!(!storage.group_exists("G1").unwrap());

    storage.create_group(&group("G1")).unwrap();
    assert!(storage.group_exists("G1").unwrap());

    let loaded = storage.get_group("G1").unwrap().unwrap();
    assert_eq!(loaded.name, "G1 group");
    assert!(storage.get_group("G2").unwrap().is_none());
}

#[test]
fn test_duplicate_group_is_conflict() {
    let storage = storage();
    storage.create_group(&group("G1")).unwrap();
    assert!(matches!(
        storage.create_group(&group("G1")),
        Err(veil_types::VeilError::Conflict(_))
    ));
}

#[test]
fn test_group_id_with_hash_rejected() {
    let storage = storage();
    assert!(matches!(
        storage.create_group(&group("bad#id")),
        Err(veil_types::VeilError::Validation(_))
    ));
    assert!(matches!(
        storage.create_group(&group("")),
        Err(veil_types::VeilError::Validation(_))
    ));
}

#[test]
fn test_commitments_preserve_append_order() {
    let storage = storage();

    for value in ["c1", "c2", "c3"] {
        storage
            .append_commitment(&IdentityCommitment::new("G1", value))
            .unwrap();
    }

    let listed = storage.list_commitments("G1").unwrap();
    let values: Vec<&str> = listed
        .iter()
        .map(|c| c.identity_commitment.as_str())
        .collect();
    assert_eq!(values, vec!["c1", "c2", "c3"]);
    assert_eq!(storage.commitment_count("G1").unwrap(), 3);
}

#[test]
fn test_commitments_are_group_scoped() {
    let storage = storage();
    storage
        .append_commitment(&IdentityCommitment::new("G1", "c1"))
        .unwrap();
    storage
        .append_commitment(&IdentityCommitment::new("G2", "other"))
        .unwrap();
    storage
        .append_commitment(&IdentityCommitment::new("G1", "c2"))
        .unwrap();

    let listed = storage.list_commitments("G1").unwrap();
    assert_eq!(listed.len(), 2);
    assert!(listed.iter().all(|c| c.identity_group == "G1"));
}

#[test]
fn test_claim_conditional_insert() {
    let storage = storage();
    let first = claim("G1", "e1", "n1", "vote-yes");

    assert!(!storage.claim_exists("G1", "e1", "n1").unwrap());
    storage.insert_claim_if_absent(&first).unwrap();
    assert!(storage.claim_exists("G1", "e1", "n1").unwrap());

    // Same triple, different message: the insert must lose.
    let second = claim("G1", "e1", "n1", "vote-no");
    assert!(matches!(
        storage.insert_claim_if_absent(&second),
        Err(veil_types::VeilError::Conflict(_))
    ));

    let stored = storage.get_claim("G1", "e1", "n1").unwrap().unwrap();
    assert_eq!(stored.message, "vote-yes");
}

#[test]
fn test_nullifiers_containing_hash_do_not_collide() {
    let storage = storage();
    storage
        .insert_claim_if_absent(&claim("G1", "e1#x", "n1", "first"))
        .unwrap();

    // A different triple whose concatenation reads the same must still
    // be free to commit.
    assert!(!storage.claim_exists("G1", "e1", "x#n1").unwrap());
    storage
        .insert_claim_if_absent(&claim("G1", "e1", "x#n1", "second"))
        .unwrap();

    assert_eq!(
        storage.get_claim("G1", "e1#x", "n1").unwrap().unwrap().message,
        "first"
    );
    assert_eq!(
        storage.get_claim("G1", "e1", "x#n1").unwrap().unwrap().message,
        "second"
    );
}

#[test]
fn test_same_nullifier_different_context_allowed() {
    let storage = storage();
    storage
        .insert_claim_if_absent(&claim("G1", "e1", "n1", "a"))
        .unwrap();
    storage
        .insert_claim_if_absent(&claim("G1", "e2", "n1", "b"))
        .unwrap();
    storage
        .insert_claim_if_absent(&claim("G2", "e1", "n1", "c"))
        .unwrap();

    assert_eq!(storage.list_claims("G1").unwrap().len(), 2);
    assert_eq!(storage.list_claims("G2").unwrap().len(), 1);
}

#[test]
fn test_invitation_batch_and_lookup() {
    let storage = storage();
    let invitations = vec![
        Invitation::new("G1", "alice", "alice@example.com", 1_700_000_000),
        Invitation::new("G1", "bob", "bob@example.com", 1_700_000_000),
    ];

    storage.insert_invitations(&invitations).unwrap();

    let listed = storage.list_invitations("G1").unwrap();
    assert_eq!(listed.len(), 2);
    assert!(listed.iter().all(|i| !i.state.is_consumed()));

    let fetched = storage
        .get_invitation("G1", &invitations[0].code)
        .unwrap()
        .unwrap();
    assert_eq!(fetched.name, invitations[0].name);
    assert!(storage.get_invitation("G1", "missing").unwrap().is_none());
}

#[test]
fn test_invitation_single_use() {
    let storage = storage();
    let invitation = Invitation::new("G1", "alice", "alice@example.com", 1_700_000_000);
    storage.insert_invitations(&[invitation.clone()]).unwrap();

    let consumed = storage
        .consume_invitation("G1", &invitation.code, "member-1")
        .unwrap();
    assert!(consumed.state.is_consumed());

    assert!(matches!(
        storage.consume_invitation("G1", &invitation.code, "member-2"),
        Err(veil_types::VeilError::Conflict(_))
    ));

    // The stored state reflects the first consumer only.
    let stored = storage
        .get_invitation("G1", &invitation.code)
        .unwrap()
        .unwrap();
    match stored.state {
        veil_types::InvitationState::Consumed { consumed_by } => {
            assert_eq!(consumed_by, "member-1");
        }
        veil_types::InvitationState::Unconsumed => panic!("expected consumed"),
    }
}

#[test]
fn test_consume_missing_invitation_is_not_found() {
    let storage = storage();
    assert!(matches!(
        storage.consume_invitation("G1", "no-such-code", "member-1"),
        Err(veil_types::VeilError::NotFound(_))
    ));
}

#[test]
fn test_tree_sizes_and_metrics() {
    let storage = storage();
    storage.create_group(&group("G1")).unwrap();
    storage
        .append_commitment(&IdentityCommitment::new("G1", "c1"))
        .unwrap();
    storage
        .insert_claim_if_absent(&claim("G1", "e1", "n1", "m"))
        .unwrap();

    let sizes = storage.tree_sizes();
    assert_eq!(sizes.groups, 1);
    assert_eq!(sizes.commitments, 1);
    assert_eq!(sizes.claims, 1);
    assert_eq!(sizes.invitations, 0);

    let metrics = storage.storage_metrics().snapshot();
    assert!(metrics.writes >= 3);
    assert_eq!(metrics.errors, 0);

    storage.flush().unwrap();
    assert!(storage.storage_metrics().snapshot().flushes >= 1);
    assert!(storage.is_in_memory());
}
