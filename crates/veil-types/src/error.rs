use thiserror::Error;

#[derive(Error, Debug)]
pub enum VeilError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Proof verification failed: {0}")]
    ProofVerification(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Cryptographic error: {0}")]
    Crypto(String),
}

impl VeilError {
    /// Only infrastructure failures are worth a blind retry; the semantic
    /// rejections require the caller to change its input or refresh state.
    pub fn is_retryable(&self) -> bool {
        matches!(self, VeilError::Storage(_))
    }
}

pub type VeilResult<T> = Result<T, VeilError>;
