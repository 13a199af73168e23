//! Ed25519 signing and verification.
//!
//! Signatures travel as base64 strings next to the base64 public key that
//! produced them, so stored proofs can be re-checked without a key registry.

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};

use crate::crypto::keys::Ed25519KeyPair;
use crate::error::{Result, ScoringError};

/// Sign a message with an Ed25519 signing key.
pub fn sign(signing_key: &SigningKey, message: &[u8]) -> Signature {
    signing_key.sign(message)
}

/// Verify an Ed25519 signature against a public key and message.
pub fn verify(verifying_key: &VerifyingKey, message: &[u8], signature: &Signature) -> Result<()> {
    verifying_key
        .verify(message, signature)
        .map_err(|_| ScoringError::SignatureInvalid)
}

/// Sign a message and return the signature as a base64-encoded string.
pub fn sign_to_base64(signing_key: &SigningKey, message: &[u8]) -> String {
    let sig = sign(signing_key, message);
    base64::Engine::encode(&base64::engine::general_purpose::STANDARD, sig.to_bytes())
}

/// Verify a base64-encoded signature.
pub fn verify_from_base64(
    verifying_key: &VerifyingKey,
    message: &[u8],
    signature_b64: &str,
) -> Result<()> {
    let sig_bytes =
        base64::Engine::decode(&base64::engine::general_purpose::STANDARD, signature_b64)
            .map_err(|e| ScoringError::InvalidKey(format!("invalid base64 signature: {e}")))?;

    let sig_array: [u8; 64] = sig_bytes
        .try_into()
        .map_err(|_| ScoringError::InvalidKey("signature must be 64 bytes".into()))?;

    let signature = Signature::from_bytes(&sig_array);
    verify(verifying_key, message, &signature)
}

/// Verify a base64 signature against a base64 public key.
pub fn verify_with_public_key(public_key_b64: &str, message: &[u8], signature_b64: &str) -> Result<()> {
    let verifying_key = Ed25519KeyPair::verifying_key_from_base64(public_key_b64)?;
    verify_from_base64(&verifying_key, message, signature_b64)
}
