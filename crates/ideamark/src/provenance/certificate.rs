//! Originality certificates.
//!
//! The issuer signs the certificate's identifying fields. The chain of
//! custody travels with the certificate but is not covered by the
//! signature, so lifecycle entries can be appended without re-issuing.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::crypto::random;
use crate::crypto::signing;

use super::custody::ChainOfCustodyEntry;
use super::proof::SubjectId;
use super::witness::WitnessSigner;

/// Unique identifier for a certificate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CertificateId(pub String);

impl std::fmt::Display for CertificateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Certificate attached to an originality proof.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Certificate {
    pub id: CertificateId,
    pub subject_id: SubjectId,
    pub content_hash: String,
    pub issued_at: u64,
    pub expires_at: Option<u64>,
    pub issuer: String,
    pub issuer_key: String,
    pub signature: String,
    pub chain_of_custody: Vec<ChainOfCustodyEntry>,
}

impl Certificate {
    /// Issue and sign a certificate whose chain opens with `genesis`.
    pub fn issue(
        signer: &dyn WitnessSigner,
        issuer: &str,
        subject_id: &SubjectId,
        content_hash: &str,
        issued_at: u64,
        expires_at: Option<u64>,
        genesis: ChainOfCustodyEntry,
    ) -> Self {
        let nonce = hex::encode(random::random_nonce_16());
        let id_input = format!("certificate:{}:{content_hash}:{issued_at}:{nonce}", subject_id.0);
        let id_hash = Sha256::digest(id_input.as_bytes());
        let id = CertificateId(format!(
            "ocrt_{}",
            bs58::encode(&id_hash[..16]).into_string()
        ));

        let mut cert = Self {
            id,
            subject_id: subject_id.clone(),
            content_hash: content_hash.to_string(),
            issued_at,
            expires_at,
            issuer: issuer.to_string(),
            issuer_key: signer.public_key(),
            signature: String::new(),
            chain_of_custody: vec![genesis],
        };
        cert.signature = signer.sign(cert.signing_payload().as_bytes());
        cert
    }

    /// The message covered by the issuer signature.
    pub fn signing_payload(&self) -> String {
        format!(
            "certificate:{}:{}:{}:{}:{}:{}",
            self.id.0,
            self.subject_id.0,
            self.content_hash,
            self.issued_at,
            match self.expires_at {
                Some(at) => format!("some:{at}"),
                None => "none".to_string(),
            },
            self.issuer
        )
    }

    /// Check the issuer signature against the embedded issuer key.
    pub fn verify_signature(&self) -> bool {
        signing::verify_with_public_key(
            &self.issuer_key,
            self.signing_payload().as_bytes(),
            &self.signature,
        )
        .is_ok()
    }

    pub fn is_expired(&self, now: u64) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }

    /// Most recent custody entry.
    pub fn last_custody(&self) -> Option<&ChainOfCustodyEntry> {
        self.chain_of_custody.last()
    }
}
