//! Ed25519 key pairs.
//!
//! The service root key signs certificates and the system witness
//! attestation. Extra witness keys are derived from it.

use ed25519_dalek::{SigningKey, VerifyingKey};
use zeroize::Zeroize;

use crate::error::{Result, ScoringError};

/// An Ed25519 key pair for signing operations.
///
/// The signing key is zeroized on drop to prevent private key leakage.
pub struct Ed25519KeyPair {
    signing_key: SigningKey,
    verifying_key: VerifyingKey,
}

impl Ed25519KeyPair {
    /// Generate a new random Ed25519 key pair.
    pub fn generate() -> Self {
        let signing_key = SigningKey::generate(&mut rand::thread_rng());
        Self::from_signing_key(signing_key)
    }

    /// Wrap an existing signing key.
    pub fn from_signing_key(signing_key: SigningKey) -> Self {
        let verifying_key = signing_key.verifying_key();
        Self {
            signing_key,
            verifying_key,
        }
    }

    /// Reconstruct a key pair from raw signing key bytes.
    pub fn from_signing_key_bytes(bytes: &[u8; 32]) -> Self {
        Self::from_signing_key(SigningKey::from_bytes(bytes))
    }

    /// Reconstruct a key pair from a base64-encoded signing key.
    pub fn from_base64(encoded: &str) -> Result<Self> {
        let mut raw = base64::Engine::decode(
            &base64::engine::general_purpose::STANDARD,
            encoded.trim(),
        )
        .map_err(|e| ScoringError::InvalidKey(format!("invalid base64 key: {e}")))?;

        let bytes: [u8; 32] = raw
            .as_slice()
            .try_into()
            .map_err(|_| ScoringError::InvalidKey("signing key must be 32 bytes".into()))?;
        raw.zeroize();

        let mut bytes = bytes;
        let pair = Self::from_signing_key_bytes(&bytes);
        bytes.zeroize();
        Ok(pair)
    }

    /// Reconstruct a verifying key from raw bytes.
    pub fn verifying_key_from_bytes(bytes: &[u8; 32]) -> Result<VerifyingKey> {
        VerifyingKey::from_bytes(bytes)
            .map_err(|e| ScoringError::InvalidKey(format!("invalid verifying key: {e}")))
    }

    /// Decode a base64 verifying key.
    pub fn verifying_key_from_base64(encoded: &str) -> Result<VerifyingKey> {
        let raw = base64::Engine::decode(&base64::engine::general_purpose::STANDARD, encoded)
            .map_err(|e| ScoringError::InvalidKey(format!("invalid public key: {e}")))?;
        let bytes: [u8; 32] = raw
            .try_into()
            .map_err(|_| ScoringError::InvalidKey("public key must be 32 bytes".into()))?;
        Self::verifying_key_from_bytes(&bytes)
    }

    /// Return a reference to the signing key.
    pub fn signing_key(&self) -> &SigningKey {
        &self.signing_key
    }

    /// Return the verifying (public) key.
    pub fn verifying_key(&self) -> &VerifyingKey {
        &self.verifying_key
    }

    /// Return the signing key bytes. Caller must zeroize after use.
    pub fn signing_key_bytes(&self) -> [u8; 32] {
        self.signing_key.to_bytes()
    }

    /// Return the signing key as base64. Caller must zeroize after use.
    pub fn signing_key_base64(&self) -> String {
        let mut bytes = self.signing_key_bytes();
        let encoded = base64::Engine::encode(&base64::engine::general_purpose::STANDARD, bytes);
        bytes.zeroize();
        encoded
    }

    /// Return the verifying key as base64.
    pub fn public_key_base64(&self) -> String {
        base64::Engine::encode(
            &base64::engine::general_purpose::STANDARD,
            self.verifying_key.to_bytes(),
        )
    }
}

impl Drop for Ed25519KeyPair {
    fn drop(&mut self) {
        let mut bytes = self.signing_key.to_bytes();
        bytes.zeroize();
    }
}
