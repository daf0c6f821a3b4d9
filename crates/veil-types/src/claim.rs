use serde::{Deserialize, Serialize};

use crate::error::{VeilError, VeilResult};
use crate::{PROOF_G1_LEN, PROOF_G2_LEN};

/// Opaque Groth16 proof blob in snarkjs decimal-string encoding. The core
/// never interprets the coordinates; only the external verifier does.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnarkProof {
    pub pi_a: Vec<String>,
    pub pi_b: Vec<Vec<String>>,
    pub pi_c: Vec<String>,
}

impl SnarkProof {
    /// Shape check only. Coordinate parsing is the verifier's business.
    pub fn is_well_formed(&self) -> bool {
        self.pi_a.len() == PROOF_G1_LEN
            && self.pi_c.len() == PROOF_G1_LEN
            && self.pi_b.len() == PROOF_G2_LEN
            && self.pi_b.iter().all(|pair| pair.len() == 2)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimProof {
    pub merkle_root: String,
    pub snark_proof: SnarkProof,
}

/// A validated, anonymous, one-time assertion of membership plus an
/// attached message. Created exactly once per accepted submission and
/// immutable thereafter. No two stored claims share the same
/// `(identity_group, external_nullifier, nullifier)` triple.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    pub identity_group: String,
    pub nullifier: String,
    pub external_nullifier: String,
    pub message: String,
    pub proof: ClaimProof,
    pub timestamp: i64,
}

/// A claim submission as handed over by the transport layer, before any
/// storage access.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimRequest {
    pub proof: ClaimProof,
    pub nullifier: String,
    pub identity_group: String,
    pub external_nullifier: String,
    pub message: String,
}

impl ClaimRequest {
    /// Parse-and-shape gate of the claim pipeline. Fails before the request
    /// touches storage.
    pub fn validate(&self) -> VeilResult<()> {
        if self.identity_group.is_empty() {
            return Err(VeilError::Validation("identity group is empty".into()));
        }
        if self.nullifier.is_empty() {
            return Err(VeilError::Validation("nullifier is empty".into()));
        }
        if self.external_nullifier.is_empty() {
            return Err(VeilError::Validation("external nullifier is empty".into()));
        }
        if self.message.is_empty() {
            return Err(VeilError::Validation("message is empty".into()));
        }
        if self.proof.merkle_root.is_empty() {
            return Err(VeilError::Validation("merkle root is empty".into()));
        }
        if !self.proof.snark_proof.is_well_formed() {
            return Err(VeilError::Validation("malformed snark proof".into()));
        }
        Ok(())
    }

    /// Materialize the stored claim for this request at the given commit
    /// time.
    pub fn into_claim(self, timestamp: i64) -> Claim {
        Claim {
            identity_group: self.identity_group,
            nullifier: self.nullifier,
            external_nullifier: self.external_nullifier,
            message: self.message,
            proof: self.proof,
            timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn well_formed_proof() -> SnarkProof {
        SnarkProof {
            pi_a: vec!["1".into(), "2".into(), "1".into()],
            pi_b: vec![
                vec!["1".into(), "2".into()],
                vec!["3".into(), "4".into()],
                vec!["1".into(), "0".into()],
            ],
            pi_c: vec!["5".into(), "6".into(), "1".into()],
        }
    }

    fn request() -> ClaimRequest {
        ClaimRequest {
            proof: ClaimProof {
                merkle_root: "42".into(),
                snark_proof: well_formed_proof(),
            },
            nullifier: "n1".into(),
            identity_group: "G1".into(),
            external_nullifier: "e1".into(),
            message: "vote-yes".into(),
        }
    }

    #[test]
    fn test_valid_request_passes() {
        assert!(request().validate().is_ok());
    }

    #[test]
    fn test_empty_fields_rejected() {
        for mutate in [
            (|r: &mut ClaimRequest| r.identity_group.clear()) as fn(&mut ClaimRequest),
            |r| r.nullifier.clear(),
            |r| r.external_nullifier.clear(),
            |r| r.message.clear(),
            |r| r.proof.merkle_root.clear(),
        ] {
            let mut req = request();
            mutate(&mut req);
            assert!(matches!(req.validate(), Err(VeilError::Validation(_))));
        }
    }

    #[test]
    fn test_malformed_proof_rejected() {
        let mut req = request();
        req.proof.snark_proof.pi_a.pop();
        assert!(matches!(req.validate(), Err(VeilError::Validation(_))));

        let mut req = request();
        req.proof.snark_proof.pi_b[1].push("9".into());
        assert!(matches!(req.validate(), Err(VeilError::Validation(_))));
    }

    #[test]
    fn test_request_round_trips_through_json() {
        let req = request();
        let json = serde_json::to_string(&req).unwrap();
        let back: ClaimRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(req, back);
    }
}
