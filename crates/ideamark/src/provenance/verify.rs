//! Proof verification.
//!
//! Verification is read-only: it loads a proof, re-derives what can be
//! re-derived, and reports every problem found with a confidence score.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::storage::ProvenanceStore;

use super::custody;
use super::proof::{OriginalityProof, SubjectId};

/// Category of a verification problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    ProofMissing,
    /// Stored hash differs from the hash of the stored snapshot.
    Integrity,
    NoWitnesses,
    InvalidWitness,
    CertificateExpired,
    /// Bad issuer signature, issuer key not trusted, or certificate hash mismatch.
    CertificateSignature,
    EmptyCustody,
    BrokenCustody,
}

impl IssueKind {
    /// Confidence points deducted for this issue.
    pub fn penalty(&self) -> u8 {
        match self {
            Self::ProofMissing => 50,
            Self::Integrity => 30,
            Self::NoWitnesses | Self::InvalidWitness => 20,
            Self::CertificateExpired | Self::CertificateSignature => 15,
            Self::EmptyCustody | Self::BrokenCustody => 10,
        }
    }
}

/// One problem found during verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationIssue {
    pub kind: IssueKind,
    pub message: String,
}

impl VerificationIssue {
    fn new(kind: IssueKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Result of verifying a proof.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProofVerification {
    pub subject_id: SubjectId,
    pub is_valid: bool,
    pub issues: Vec<VerificationIssue>,
    /// 0-100.
    pub confidence: u8,
    pub verified_at: u64,
}

impl ProofVerification {
    fn from_issues(subject_id: SubjectId, issues: Vec<VerificationIssue>, now: u64) -> Self {
        let penalty: u32 = issues.iter().map(|i| u32::from(i.kind.penalty())).sum();
        let confidence = 100u32.saturating_sub(penalty) as u8;
        Self {
            subject_id,
            is_valid: issues.is_empty(),
            issues,
            confidence,
            verified_at: now,
        }
    }

    pub fn has_issue(&self, kind: IssueKind) -> bool {
        self.issues.iter().any(|i| i.kind == kind)
    }
}

/// Checks stored proofs without modifying them.
pub struct ProofVerifier {
    store: Arc<dyn ProvenanceStore>,
    trusted_issuer_key: Option<String>,
}

impl ProofVerifier {
    pub fn new(store: Arc<dyn ProvenanceStore>) -> Self {
        Self {
            store,
            trusted_issuer_key: None,
        }
    }

    /// Only accept certificates signed with this base64 public key.
    pub fn with_trusted_issuer(mut self, public_key: impl Into<String>) -> Self {
        self.trusted_issuer_key = Some(public_key.into());
        self
    }

    /// Verify the proof stored for `subject_id` as of now.
    pub fn verify(&self, subject_id: &SubjectId) -> Result<ProofVerification> {
        self.verify_at(subject_id, crate::time::now_micros())
    }

    /// Verify as of `now`. Fails only when the store cannot be read.
    pub fn verify_at(&self, subject_id: &SubjectId, now: u64) -> Result<ProofVerification> {
        let verification = match self.store.load_proof(subject_id)? {
            Some(proof) => inspect(&proof, self.trusted_issuer_key.as_deref(), now),
            None => ProofVerification::from_issues(
                subject_id.clone(),
                vec![VerificationIssue::new(
                    IssueKind::ProofMissing,
                    format!("no proof stored for {subject_id}"),
                )],
                now,
            ),
        };

        if verification.is_valid {
            log::debug!("proof for {subject_id} verified");
        } else {
            log::warn!(
                "proof for {subject_id} failed verification: {} issue(s), confidence {}",
                verification.issues.len(),
                verification.confidence
            );
        }
        Ok(verification)
    }
}

/// Check a proof value. Witnesses, certificate and custody are checked
/// against the stored content hash.
pub fn inspect(
    proof: &OriginalityProof,
    trusted_issuer_key: Option<&str>,
    now: u64,
) -> ProofVerification {
    let mut issues = Vec::new();

    let computed = proof.recompute_hash();
    if computed != proof.content_hash {
        issues.push(VerificationIssue::new(
            IssueKind::Integrity,
            format!(
                "content hash mismatch: stored {}, computed {computed}",
                proof.content_hash
            ),
        ));
    }

    if proof.witness_signatures.is_empty() {
        issues.push(VerificationIssue::new(
            IssueKind::NoWitnesses,
            "proof carries no witness signatures",
        ));
    } else {
        let invalid: Vec<&str> = proof
            .witness_signatures
            .iter()
            .filter(|w| !w.verify(&proof.content_hash))
            .map(|w| w.witness.0.as_str())
            .collect();
        if !invalid.is_empty() {
            issues.push(VerificationIssue::new(
                IssueKind::InvalidWitness,
                format!("invalid witness signature(s): {}", invalid.join(", ")),
            ));
        }
    }

    let cert = &proof.certificate;
    if cert.is_expired(now) {
        issues.push(VerificationIssue::new(
            IssueKind::CertificateExpired,
            format!(
                "certificate {} expired at {}",
                cert.id,
                crate::time::micros_to_rfc3339(cert.expires_at.unwrap_or(0))
            ),
        ));
    }

    let cert_problem = if cert.content_hash != proof.content_hash || cert.subject_id != proof.subject_id {
        Some(format!("certificate {} does not match the proof", cert.id))
    } else if trusted_issuer_key.is_some_and(|key| key != cert.issuer_key) {
        Some(format!("certificate {} was not issued by a trusted key", cert.id))
    } else if !cert.verify_signature() {
        Some(format!("certificate {} signature is invalid", cert.id))
    } else {
        None
    };
    if let Some(message) = cert_problem {
        issues.push(VerificationIssue::new(IssueKind::CertificateSignature, message));
    }

    if cert.chain_of_custody.is_empty() {
        issues.push(VerificationIssue::new(
            IssueKind::EmptyCustody,
            "chain of custody is empty",
        ));
    } else if let Err(e) = custody::verify_custody(&cert.chain_of_custody, &proof.content_hash) {
        issues.push(VerificationIssue::new(
            IssueKind::BrokenCustody,
            format!("chain of custody is broken: {e}"),
        ));
    }

    ProofVerification::from_issues(proof.subject_id.clone(), issues, now)
}
