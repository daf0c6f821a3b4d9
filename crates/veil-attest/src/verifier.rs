use async_trait::async_trait;
use std::path::Path;
use tracing::debug;
use veil_crypto::{verify_claim_signals, ClaimVerifyingKey};
use veil_types::{SnarkProof, VeilError, VeilResult};

/// The public signals a claim proof is verified against. The merkle root
/// is the one the prover built against, never a freshly computed
/// substitute; the pipeline guarantees both are equal before this seam
/// is crossed.
pub struct ClaimSignals<'a> {
    pub merkle_root: &'a str,
    pub nullifier: &'a str,
    pub external_nullifier: &'a str,
    pub message: &'a str,
    pub snark_proof: &'a SnarkProof,
}

/// External proof-verification collaborator. `Ok(false)` means a
/// well-formed proof that does not verify; errors are malformed input or
/// infrastructure trouble. Implementations must never report failure as
/// success.
#[async_trait]
pub trait ProofVerifier: Send + Sync {
    async fn verify(&self, signals: ClaimSignals<'_>) -> VeilResult<bool>;
}

/// Production verifier: Groth16 over BN254 with a snarkjs verifying key
/// loaded once at construction.
pub struct Groth16ProofVerifier {
    key: ClaimVerifyingKey,
}

impl Groth16ProofVerifier {
    pub fn from_key_file(path: impl AsRef<Path>) -> VeilResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            VeilError::Config(format!("Failed to read verifying key {:?}: {}", path, e))
        })?;
        Self::from_key_json(&json)
    }

    pub fn from_key_json(json: &str) -> VeilResult<Self> {
        let key = ClaimVerifyingKey::from_json(json)?;
        debug!("Loaded claim verifying key ({} public inputs)", key.public_input_len());
        Ok(Self { key })
    }
}

#[async_trait]
impl ProofVerifier for Groth16ProofVerifier {
    async fn verify(&self, signals: ClaimSignals<'_>) -> VeilResult<bool> {
        verify_claim_signals(
            &self.key,
            signals.snark_proof,
            signals.merkle_root,
            signals.nullifier,
            signals.external_nullifier,
            signals.message,
        )
    }
}
