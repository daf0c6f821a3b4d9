#![deny(unsafe_code)]
#![warn(clippy::all)]

//! Cryptographic collaborators of the Veil attestation core: the Poseidon
//! membership accumulator and Groth16 claim-proof verification over BN254.
//!
//! The claim pipeline treats both as black boxes behind small interfaces;
//! everything field-element-shaped lives in this crate.

pub mod groth16;
pub mod merkle;
pub mod poseidon;

pub use groth16::{ClaimVerifyingKey, parse_snark_proof, verify_claim_signals};
pub use merkle::{MerkleRootComputer, DEFAULT_MERKLE_DEPTH, MAX_MERKLE_DEPTH};
pub use poseidon::{
    field_to_decimal, leaf_from_commitment, poseidon_hash_bytes, poseidon_hash2_fr,
    signal_hash,
};
