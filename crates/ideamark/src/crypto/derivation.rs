//! Key derivation using HKDF-SHA256.
//!
//! Additional witnesses sign with child keys derived from the service
//! root key, so a single persisted secret backs every witness.

use ed25519_dalek::SigningKey;
use hkdf::Hkdf;
use sha2::Sha256;
use zeroize::Zeroize;

use crate::error::{Result, ScoringError};

/// Derive a 32-byte child key from a root key and context string.
///
/// Uses HKDF-SHA256 (RFC 5869) with the root key as IKM and
/// the context as info.
pub fn derive_key(root_key_bytes: &[u8; 32], context: &str) -> Result<[u8; 32]> {
    let hk = Hkdf::<Sha256>::new(None, root_key_bytes);
    let mut output = [0u8; 32];
    hk.expand(context.as_bytes(), &mut output)
        .map_err(|e| ScoringError::DerivationFailed(format!("HKDF expand failed: {e}")))?;
    Ok(output)
}

/// Derive an Ed25519 signing key from a root key and context.
pub fn derive_signing_key(root_key_bytes: &[u8; 32], context: &str) -> Result<SigningKey> {
    let mut derived = derive_key(root_key_bytes, context)?;
    let key = SigningKey::from_bytes(&derived);
    derived.zeroize();
    Ok(key)
}

/// Build a derivation path string for the n-th additional witness.
pub fn witness_context(index: usize) -> String {
    format!("ideamark/witness/{index}")
}
