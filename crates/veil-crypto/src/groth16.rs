//! Groth16 claim-proof verification over BN254.
//!
//! Proofs and verifying keys arrive in the snarkjs JSON encoding (decimal
//! coordinate strings); they are parsed into arkworks points once and
//! verified with a prepared verifying key. The circuit's public inputs
//! are, in order: merkle root, nullifier, signal hash, external nullifier.

use ark_bn254::{Bn254, Fq, Fq2, Fr, G1Affine, G2Affine};
use ark_ec::AffineRepr;
use ark_groth16::{Groth16, PreparedVerifyingKey, Proof, VerifyingKey};
use ark_snark::SNARK;
use serde::Deserialize;
use std::str::FromStr;

use veil_types::{SnarkProof, VeilError, VeilResult};

use crate::poseidon::signal_hash;

/// snarkjs `verification_key.json` layout. Unknown fields (protocol,
/// curve, precomputed pairings) are ignored.
#[derive(Debug, Deserialize)]
pub struct VerifyingKeyJson {
    pub vk_alpha_1: Vec<String>,
    pub vk_beta_2: Vec<Vec<String>>,
    pub vk_gamma_2: Vec<Vec<String>>,
    pub vk_delta_2: Vec<Vec<String>>,
    #[serde(rename = "IC")]
    pub ic: Vec<Vec<String>>,
}

/// A prepared verifying key for the claim circuit.
pub struct ClaimVerifyingKey {
    pvk: PreparedVerifyingKey<Bn254>,
}

impl ClaimVerifyingKey {
    /// Parse a snarkjs verification key from its JSON rendering.
    pub fn from_json(json: &str) -> VeilResult<Self> {
        let raw: VerifyingKeyJson = serde_json::from_str(json)
            .map_err(|e| VeilError::Crypto(format!("Malformed verifying key: {}", e)))?;
        Self::from_parts(&raw)
    }

    pub fn from_parts(raw: &VerifyingKeyJson) -> VeilResult<Self> {
        let gamma_abc_g1 = raw
            .ic
            .iter()
            .map(|coords| parse_g1(coords))
            .collect::<VeilResult<Vec<_>>>()?;

        let vk = VerifyingKey::<Bn254> {
            alpha_g1: parse_g1(&raw.vk_alpha_1)?,
            beta_g2: parse_g2(&raw.vk_beta_2)?,
            gamma_g2: parse_g2(&raw.vk_gamma_2)?,
            delta_g2: parse_g2(&raw.vk_delta_2)?,
            gamma_abc_g1,
        };

        let pvk = Groth16::<Bn254>::process_vk(&vk)
            .map_err(|e| VeilError::Crypto(format!("Failed to prepare verifying key: {}", e)))?;

        Ok(Self { pvk })
    }

    /// Number of public inputs the key expects.
    pub fn public_input_len(&self) -> usize {
        self.pvk.vk.gamma_abc_g1.len().saturating_sub(1)
    }
}

/// Parse a snarkjs proof blob into an arkworks proof. Malformed
/// coordinates or off-curve points are `Crypto` errors.
pub fn parse_snark_proof(proof: &SnarkProof) -> VeilResult<Proof<Bn254>> {
    Ok(Proof {
        a: parse_g1(&proof.pi_a)?,
        b: parse_g2(&proof.pi_b)?,
        c: parse_g1(&proof.pi_c)?,
    })
}

/// Verify a claim proof against its public signals. A well-formed but
/// invalid proof is `Ok(false)`; only malformed input is an error.
pub fn verify_claim_signals(
    key: &ClaimVerifyingKey,
    proof: &SnarkProof,
    merkle_root: &str,
    nullifier: &str,
    external_nullifier: &str,
    message: &str,
) -> VeilResult<bool> {
    let proof = parse_snark_proof(proof)?;

    let public_inputs = [
        parse_field(merkle_root, "merkle root")?,
        parse_field(nullifier, "nullifier")?,
        signal_hash(message),
        parse_field(external_nullifier, "external nullifier")?,
    ];

    if key.public_input_len() != public_inputs.len() {
        return Err(VeilError::Crypto(format!(
            "Verifying key expects {} public inputs, claim has {}",
            key.public_input_len(),
            public_inputs.len()
        )));
    }

    Groth16::<Bn254>::verify_with_processed_vk(&key.pvk, &public_inputs, &proof)
        .map_err(|e| VeilError::Crypto(format!("Pairing check failed: {}", e)))
}

fn parse_field(value: &str, label: &str) -> VeilResult<Fr> {
    Fr::from_str(value)
        .map_err(|_| VeilError::Crypto(format!("Invalid field element for {}: {}", label, value)))
}

fn parse_fq(value: &str) -> VeilResult<Fq> {
    Fq::from_str(value)
        .map_err(|_| VeilError::Crypto(format!("Invalid base field coordinate: {}", value)))
}

fn parse_g1(coords: &[String]) -> VeilResult<G1Affine> {
    if coords.len() != 3 {
        return Err(VeilError::Crypto(format!(
            "G1 point needs 3 coordinates, got {}",
            coords.len()
        )));
    }

    // snarkjs renders affine points in projective form with z in {0, 1}.
    if coords[2] == "0" {
        return Ok(G1Affine::identity());
    }

    let point = G1Affine::new_unchecked(parse_fq(&coords[0])?, parse_fq(&coords[1])?);
    if !point.is_on_curve() || !point.is_in_correct_subgroup_assuming_on_curve() {
        return Err(VeilError::Crypto("G1 point is not on the curve".into()));
    }
    Ok(point)
}

fn parse_g2(coords: &[Vec<String>]) -> VeilResult<G2Affine> {
    if coords.len() != 3 || coords.iter().any(|pair| pair.len() != 2) {
        return Err(VeilError::Crypto("G2 point needs 3 coordinate pairs".into()));
    }

    if coords[2][0] == "0" && coords[2][1] == "0" {
        return Ok(G2Affine::identity());
    }

    let x = Fq2::new(parse_fq(&coords[0][0])?, parse_fq(&coords[0][1])?);
    let y = Fq2::new(parse_fq(&coords[1][0])?, parse_fq(&coords[1][1])?);

    let point = G2Affine::new_unchecked(x, y);
    if !point.is_on_curve() || !point.is_in_correct_subgroup_assuming_on_curve() {
        return Err(VeilError::Crypto("G2 point is not on the curve".into()));
    }
    Ok(point)
}
