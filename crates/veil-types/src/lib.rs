#![forbid(unsafe_code)]
#![warn(clippy::all)]

//! Shared data model for the Veil anonymous group-membership attestation
//! service: identity groups, commitments, claims, invitations and the
//! error taxonomy every crate in the workspace speaks.

mod claim;
mod error;
mod group;
mod invitation;

pub use claim::{Claim, ClaimProof, ClaimRequest, SnarkProof};
pub use error::{VeilError, VeilResult};
pub use group::{IdentityCommitment, IdentityGroup};
pub use invitation::{Invitation, InvitationState};

/// Number of elements in a Groth16 `pi_a` / `pi_c` coordinate vector.
pub const PROOF_G1_LEN: usize = 3;

/// Number of coordinate pairs in a Groth16 `pi_b` vector.
pub const PROOF_G2_LEN: usize = 3;
