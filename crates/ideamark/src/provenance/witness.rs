//! Witness signatures over content hashes.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::crypto::derivation;
use crate::crypto::keys::Ed25519KeyPair;
use crate::crypto::signing;
use crate::error::Result;

/// Identifier of a witness, derived from its public key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WitnessId(pub String);

impl WitnessId {
    /// `wit_` + base58 of the first 16 bytes of SHA-256(public key).
    pub fn from_public_key(public_key: &[u8; 32]) -> Self {
        let hash = Sha256::digest(public_key);
        Self(format!("wit_{}", bs58::encode(&hash[..16]).into_string()))
    }
}

impl std::fmt::Display for WitnessId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Something that can attest to a content hash.
pub trait WitnessSigner: Send + Sync {
    fn witness_id(&self) -> WitnessId;

    /// Base64 public key used to check signatures.
    fn public_key(&self) -> String;

    /// Base64 signature over `message`.
    fn sign(&self, message: &[u8]) -> String;
}

/// Ed25519-backed witness.
pub struct Ed25519WitnessSigner {
    key_pair: Ed25519KeyPair,
    id: WitnessId,
}

impl Ed25519WitnessSigner {
    /// Generate a signer with a fresh random key.
    pub fn generate() -> Self {
        Self::from_key_pair(Ed25519KeyPair::generate())
    }

    pub fn from_key_pair(key_pair: Ed25519KeyPair) -> Self {
        let id = WitnessId::from_public_key(&key_pair.verifying_key().to_bytes());
        Self { key_pair, id }
    }

    /// Load a signer from a base64-encoded signing key.
    pub fn from_base64(encoded: &str) -> Result<Self> {
        Ok(Self::from_key_pair(Ed25519KeyPair::from_base64(encoded)?))
    }

    /// Derive the `index`-th additional witness from this signer's key.
    pub fn derive(&self, index: usize) -> Result<Self> {
        let mut root = self.key_pair.signing_key_bytes();
        let derived =
            derivation::derive_signing_key(&root, &derivation::witness_context(index));
        zeroize::Zeroize::zeroize(&mut root);
        Ok(Self::from_key_pair(Ed25519KeyPair::from_signing_key(derived?)))
    }

    pub fn key_pair(&self) -> &Ed25519KeyPair {
        &self.key_pair
    }
}

impl WitnessSigner for Ed25519WitnessSigner {
    fn witness_id(&self) -> WitnessId {
        self.id.clone()
    }

    fn public_key(&self) -> String {
        self.key_pair.public_key_base64()
    }

    fn sign(&self, message: &[u8]) -> String {
        signing::sign_to_base64(self.key_pair.signing_key(), message)
    }
}

/// A witness signature on a content hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WitnessSignature {
    pub witness: WitnessId,
    pub witness_key: String,
    pub witnessed_at: u64,
    pub signature: String,
}

impl WitnessSignature {
    /// The message a witness signs.
    pub fn payload(witness: &WitnessId, content_hash: &str, witnessed_at: u64) -> String {
        format!("witness:{}:{content_hash}:{witnessed_at}", witness.0)
    }

    /// Sign `content_hash` with `signer` at time `now`.
    pub fn create(signer: &dyn WitnessSigner, content_hash: &str, now: u64) -> Self {
        let witness = signer.witness_id();
        let signature = signer.sign(Self::payload(&witness, content_hash, now).as_bytes());
        Self {
            witness,
            witness_key: signer.public_key(),
            witnessed_at: now,
            signature,
        }
    }

    /// Check the signature against `content_hash` and that the witness id
    /// matches the embedded key.
    pub fn verify(&self, content_hash: &str) -> bool {
        let Ok(key) = Ed25519KeyPair::verifying_key_from_base64(&self.witness_key) else {
            return false;
        };
        if WitnessId::from_public_key(&key.to_bytes()) != self.witness {
            return false;
        }
        let payload = Self::payload(&self.witness, content_hash, self.witnessed_at);
        signing::verify_from_base64(&key, payload.as_bytes(), &self.signature).is_ok()
    }
}
