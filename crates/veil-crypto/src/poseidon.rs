//! Poseidon permutation over the BN254 scalar field.
//!
//! Parameterization: 8 full / 57 partial rounds, rate 2, capacity 1,
//! x^5 S-box, round constants derived from blake3. Prover and verifier
//! must agree on these parameters or every root and signal hash diverges.

use ark_bn254::Fr;
use ark_ff::{BigInteger, PrimeField};
use std::str::FromStr;

const FULL_ROUNDS: usize = 8;
const PARTIAL_ROUNDS: usize = 57;
const STATE_WIDTH: usize = 3;

struct PoseidonConfig {
    mds: [[Fr; STATE_WIDTH]; STATE_WIDTH],
    ark: Vec<[Fr; STATE_WIDTH]>,
}

fn poseidon_config() -> PoseidonConfig {
    let mds = [
        [Fr::from(2u64), Fr::from(1u64), Fr::from(1u64)],
        [Fr::from(1u64), Fr::from(2u64), Fr::from(1u64)],
        [Fr::from(1u64), Fr::from(1u64), Fr::from(2u64)],
    ];

    let total_rounds = FULL_ROUNDS + PARTIAL_ROUNDS;
    let mut ark = Vec::with_capacity(total_rounds);
    for r in 0..total_rounds {
        let mut row = [Fr::from(0u64); STATE_WIDTH];
        for (i, slot) in row.iter_mut().enumerate() {
            let seed = ((r as u64) << 8) | (i as u64);
            let bytes = blake3::hash(&seed.to_le_bytes());
            *slot = Fr::from_le_bytes_mod_order(bytes.as_bytes());
        }
        ark.push(row);
    }

    PoseidonConfig { mds, ark }
}

fn sbox(s: &mut Fr) {
    let s2 = *s * *s;
    let s4 = s2 * s2;
    *s = s4 * *s;
}

fn apply_mds(state: &mut [Fr; STATE_WIDTH], mds: &[[Fr; STATE_WIDTH]; STATE_WIDTH]) {
    let old = *state;
    for (i, row) in mds.iter().enumerate() {
        state[i] = row[0] * old[0] + row[1] * old[1] + row[2] * old[2];
    }
}

fn poseidon_permute(state: &mut [Fr; STATE_WIDTH], config: &PoseidonConfig) {
    let half_full = FULL_ROUNDS / 2;

    for r in 0..half_full {
        for (i, s) in state.iter_mut().enumerate() {
            *s += config.ark[r][i];
        }
        for s in state.iter_mut() {
            sbox(s);
        }
        apply_mds(state, &config.mds);
    }

    for r in half_full..(half_full + PARTIAL_ROUNDS) {
        for (i, s) in state.iter_mut().enumerate() {
            *s += config.ark[r][i];
        }
        sbox(&mut state[0]);
        apply_mds(state, &config.mds);
    }

    for r in (half_full + PARTIAL_ROUNDS)..(FULL_ROUNDS + PARTIAL_ROUNDS) {
        for (i, s) in state.iter_mut().enumerate() {
            *s += config.ark[r][i];
        }
        for s in state.iter_mut() {
            sbox(s);
        }
        apply_mds(state, &config.mds);
    }
}

/// Two-to-one compression used at every accumulator node.
pub fn poseidon_hash2_fr(left: Fr, right: Fr) -> Fr {
    let config = poseidon_config();
    let mut state = [Fr::from(0u64), left, right];
    poseidon_permute(&mut state, &config);
    state[0]
}

/// Hash an arbitrary byte string into the scalar field.
pub fn poseidon_hash_bytes(data: &[u8]) -> Fr {
    let fr = Fr::from_le_bytes_mod_order(data);
    let config = poseidon_config();
    let mut state = [Fr::from(0u64), fr, Fr::from(0u64)];
    poseidon_permute(&mut state, &config);
    state[0]
}

/// The public signal bound to a claim message: Poseidon of the raw
/// message bytes. This is part of the circuit contract the verifying key
/// was generated against.
pub fn signal_hash(message: &str) -> Fr {
    poseidon_hash_bytes(message.as_bytes())
}

/// Accumulator leaf for one identity commitment. Commitments are decimal
/// field-element strings; anything that does not parse is hashed as raw
/// bytes so the accumulator stays total over opaque commitments.
pub fn leaf_from_commitment(commitment: &str) -> Fr {
    Fr::from_str(commitment).unwrap_or_else(|_| poseidon_hash_bytes(commitment.as_bytes()))
}

/// Canonical decimal rendering of a field element, matching the wire
/// encoding of merkle roots and nullifiers.
pub fn field_to_decimal(f: Fr) -> String {
    f.into_bigint().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poseidon_hash_deterministic() {
        let hash1 = poseidon_hash_bytes(b"veil test data");
        let hash2 = poseidon_hash_bytes(b"veil test data");
        assert_eq!(hash1, hash2);
        assert_ne!(hash1, poseidon_hash_bytes(b"different data"));
    }

    #[test]
    fn test_hash2_is_order_sensitive() {
        let a = Fr::from(12345u64);
        let b = Fr::from(67890u64);
        assert_eq!(poseidon_hash2_fr(a, b), poseidon_hash2_fr(a, b));
        assert_ne!(poseidon_hash2_fr(a, b), poseidon_hash2_fr(b, a));
    }

    #[test]
    fn test_leaf_parses_decimal_commitments() {
        assert_eq!(leaf_from_commitment("12345"), Fr::from(12345u64));
    }

    #[test]
    fn test_leaf_falls_back_to_bytes() {
        let leaf = leaf_from_commitment("not-a-number");
        assert_eq!(leaf, poseidon_hash_bytes(b"not-a-number"));
    }

    #[test]
    fn test_decimal_round_trip() {
        let f = Fr::from(987654321u64);
        assert_eq!(field_to_decimal(f), "987654321");
    }
}
