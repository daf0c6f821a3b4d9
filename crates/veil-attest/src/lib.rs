#![forbid(unsafe_code)]
#![warn(clippy::all)]

//! Veil attestation core.
//!
//! A user proves membership of a registered identity group with a
//! zero-knowledge proof and submits a one-time claim bound to a
//! context-specific nullifier. This crate owns the claim validation
//! pipeline, the sled-backed ledgers that make claims replay-safe, and
//! the invitation-based enrollment path.

pub mod config;
pub mod enrollment;
pub mod logging;
pub mod storage;
pub mod validator;
pub mod verifier;

pub use config::{LogLevel, LoggingConfig, ServiceConfig, VerifierConfig};
pub use enrollment::{EnrollmentService, InvitationRequest};
pub use storage::{GroupStorage, StorageConfig, StorageMetrics, StorageMetricsSnapshot, TreeSizes};
pub use validator::ClaimValidator;
pub use verifier::{ClaimSignals, Groth16ProofVerifier, ProofVerifier};
