//! Error types for the Ideamark scoring core.
//!
//! All errors are strongly typed and propagated without panicking.
//! Private key material is never included in error messages.

/// Error types covering every scoring, provenance, and storage operation.
#[derive(Debug, thiserror::Error)]
pub enum ScoringError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Proof already exists for subject {subject}: {reason}")]
    DuplicateProof { subject: String, reason: String },

    #[error("Integrity check failed for {subject}: expected {expected}, computed {actual}")]
    Integrity {
        subject: String,
        expected: String,
        actual: String,
    },

    #[error("Certificate expired: {0}")]
    ExpiredCertificate(String),

    #[error("External dependency failed: {0}")]
    ExternalDependency(String),

    #[error("Invalid status transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Signature verification failed")]
    SignatureInvalid,

    #[error("Key derivation failed: {0}")]
    DerivationFailed(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid file format: {0}")]
    InvalidFileFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result alias.
pub type Result<T> = std::result::Result<T, ScoringError>;
