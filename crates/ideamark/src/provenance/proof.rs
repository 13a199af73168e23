//! Originality proofs and their lifecycle status.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::content::{ContentDraft, UserId};
use crate::error::{Result, ScoringError};

use super::certificate::Certificate;
use super::custody::{ChainOfCustodyEntry, CustodyAction};
use super::hash;
use super::witness::WitnessSignature;

/// The content item a proof is about.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SubjectId(pub String);

impl SubjectId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl std::fmt::Display for SubjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a proof.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProofId(pub String);

impl ProofId {
    /// `oprf_` + base58 of the first 16 bytes of SHA-256 over the proof's key fields.
    pub fn derive(subject_id: &SubjectId, content_hash: &str, timestamp: u64) -> Self {
        let input = format!("proof:{}:{content_hash}:{timestamp}", subject_id.0);
        let hash = Sha256::digest(input.as_bytes());
        Self(format!("oprf_{}", bs58::encode(&hash[..16]).into_string()))
    }
}

impl std::fmt::Display for ProofId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle status of a proof.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    Pending,
    Verified,
    Disputed,
    Resolved,
}

impl VerificationStatus {
    pub fn as_tag(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Verified => "verified",
            Self::Disputed => "disputed",
            Self::Resolved => "resolved",
        }
    }

    /// Move to `to`, or fail with `InvalidTransition`.
    ///
    /// Allowed: pending → verified, pending | verified → disputed,
    /// disputed → resolved.
    pub fn transition(self, to: VerificationStatus) -> Result<VerificationStatus> {
        use VerificationStatus::*;
        match (self, to) {
            (Pending, Verified) | (Pending, Disputed) | (Verified, Disputed) | (Disputed, Resolved) => {
                Ok(to)
            }
            _ => Err(ScoringError::InvalidTransition {
                from: self.as_tag().into(),
                to: to.as_tag().into(),
            }),
        }
    }

    /// The custody action recorded when entering this status.
    pub fn custody_action(&self) -> CustodyAction {
        match self {
            Self::Pending => CustodyAction::Created,
            Self::Verified => CustodyAction::Verified,
            Self::Disputed => CustodyAction::Disputed,
            Self::Resolved => CustodyAction::Resolved,
        }
    }
}

impl std::fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_tag())
    }
}

/// The content exactly as it was hashed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentSnapshot {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl ContentSnapshot {
    pub fn from_draft(draft: &ContentDraft) -> Self {
        Self {
            title: draft.title.clone(),
            description: draft.description.clone(),
            tags: draft.tags.clone(),
        }
    }

    pub fn content_hash(&self) -> String {
        hash::content_hash(&self.title, &self.description, &self.tags)
    }
}

/// Options for proof generation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofOptions {
    /// Number of additional witnesses beyond the system witness.
    #[serde(default)]
    pub extra_witnesses: usize,
    /// Certificate validity; falls back to the configured default.
    #[serde(default)]
    pub expires_in_days: Option<u64>,
}

/// A durable, tamper-evident record of authorship.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OriginalityProof {
    pub id: ProofId,
    pub subject_id: SubjectId,
    pub author_id: UserId,
    pub content_hash: String,
    pub snapshot: ContentSnapshot,
    pub submission_timestamp: u64,
    pub witness_signatures: Vec<WitnessSignature>,
    pub certificate: Certificate,
    pub verification_status: VerificationStatus,
}

impl OriginalityProof {
    /// Hash of the stored snapshot, for comparison with `content_hash`.
    pub fn recompute_hash(&self) -> String {
        self.snapshot.content_hash()
    }

    pub fn custody(&self) -> &[ChainOfCustodyEntry] {
        &self.certificate.chain_of_custody
    }

    /// Build (but do not append) the next custody entry.
    pub fn next_custody(
        &self,
        action: CustodyAction,
        timestamp: u64,
        actor: &str,
        detail: &str,
    ) -> Result<ChainOfCustodyEntry> {
        let last = self.certificate.last_custody().ok_or_else(|| ScoringError::Integrity {
            subject: self.subject_id.0.clone(),
            expected: "non-empty chain of custody".into(),
            actual: "empty".into(),
        })?;
        Ok(ChainOfCustodyEntry::next(last, action, timestamp, actor, detail))
    }

    /// Append `entry` and set `status`, checking the entry links to the chain head.
    ///
    /// Only custody and status change; hash, snapshot, witnesses and
    /// certificate fields stay as issued.
    pub fn apply_custody(
        &mut self,
        entry: ChainOfCustodyEntry,
        status: VerificationStatus,
    ) -> Result<()> {
        let head = self.certificate.last_custody().map(|e| e.current_hash.as_str());
        if entry.previous_hash.as_deref() != head {
            return Err(ScoringError::Storage(format!(
                "custody entry for {} does not extend the current chain head",
                self.subject_id
            )));
        }
        self.certificate.chain_of_custody.push(entry);
        self.verification_status = status;
        Ok(())
    }
}
