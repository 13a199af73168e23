//! Originality disputes.
//!
//! A dispute is opened by a submitter against an existing proof and later
//! closed with an outcome decided outside the core.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::content::UserId;
use crate::crypto::random;
use crate::error::{Result, ScoringError};

use super::proof::SubjectId;

/// Unique identifier for a dispute.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DisputeId(pub String);

impl DisputeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    fn generate(original: &SubjectId, disputing: &SubjectId, submitted_at: u64) -> Self {
        let nonce = hex::encode(random::random_nonce_16());
        let input = format!("dispute:{}:{}:{submitted_at}:{nonce}", original.0, disputing.0);
        let hash = Sha256::digest(input.as_bytes());
        Self(format!("odsp_{}", bs58::encode(&hash[..16]).into_string()))
    }
}

impl std::fmt::Display for DisputeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Grounds for a dispute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisputeType {
    Plagiarism,
    PriorArt,
    SimultaneousInvention,
    Attribution,
}

impl std::str::FromStr for DisputeType {
    type Err = ScoringError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "plagiarism" => Ok(Self::Plagiarism),
            "prior_art" => Ok(Self::PriorArt),
            "simultaneous_invention" => Ok(Self::SimultaneousInvention),
            "attribution" => Ok(Self::Attribution),
            other => Err(ScoringError::Validation(format!("unknown dispute type: {other}"))),
        }
    }
}

/// Decision recorded when a dispute is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisputeOutcome {
    OriginalUpheld,
    DisputeUpheld,
    BothOriginal,
    InsufficientEvidence,
}

impl DisputeOutcome {
    pub fn as_tag(&self) -> &'static str {
        match self {
            Self::OriginalUpheld => "original_upheld",
            Self::DisputeUpheld => "dispute_upheld",
            Self::BothOriginal => "both_original",
            Self::InsufficientEvidence => "insufficient_evidence",
        }
    }
}

impl std::str::FromStr for DisputeOutcome {
    type Err = ScoringError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "original_upheld" => Ok(Self::OriginalUpheld),
            "dispute_upheld" => Ok(Self::DisputeUpheld),
            "both_original" => Ok(Self::BothOriginal),
            "insufficient_evidence" => Ok(Self::InsufficientEvidence),
            other => Err(ScoringError::Validation(format!("unknown dispute outcome: {other}"))),
        }
    }
}

/// One piece of supporting evidence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisputeEvidence {
    pub description: String,
    /// URL, document reference, or content id backing the claim.
    #[serde(default)]
    pub reference: Option<String>,
}

impl DisputeEvidence {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            reference: None,
        }
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }
}

/// Where a dispute stands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum DisputeStatus {
    Open,
    Resolved {
        outcome: DisputeOutcome,
        resolver: String,
        resolved_at: u64,
        notes: String,
    },
}

/// A claim that one submission copies or predates another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dispute {
    pub id: DisputeId,
    pub original_id: SubjectId,
    pub disputing_id: SubjectId,
    pub dispute_type: DisputeType,
    pub evidence: Vec<DisputeEvidence>,
    pub submitted_by: UserId,
    pub submitted_at: u64,
    pub status: DisputeStatus,
}

impl Dispute {
    /// Open a dispute after validating its inputs.
    pub fn open(
        original_id: &SubjectId,
        disputing_id: &SubjectId,
        dispute_type: DisputeType,
        evidence: Vec<DisputeEvidence>,
        submitted_by: &UserId,
        submitted_at: u64,
    ) -> Result<Self> {
        if original_id == disputing_id {
            return Err(ScoringError::Validation(
                "a subject cannot dispute itself".into(),
            ));
        }
        if evidence.iter().all(|e| e.description.trim().is_empty()) {
            return Err(ScoringError::Validation(
                "a dispute needs at least one piece of evidence".into(),
            ));
        }

        Ok(Self {
            id: DisputeId::generate(original_id, disputing_id, submitted_at),
            original_id: original_id.clone(),
            disputing_id: disputing_id.clone(),
            dispute_type,
            evidence,
            submitted_by: submitted_by.clone(),
            submitted_at,
            status: DisputeStatus::Open,
        })
    }

    pub fn is_open(&self) -> bool {
        self.status == DisputeStatus::Open
    }

    /// Close the dispute. Fails if it is already resolved.
    pub fn resolve(
        &mut self,
        outcome: DisputeOutcome,
        resolver: &str,
        notes: &str,
        resolved_at: u64,
    ) -> Result<()> {
        if !self.is_open() {
            return Err(ScoringError::InvalidTransition {
                from: "resolved".into(),
                to: "resolved".into(),
            });
        }
        self.status = DisputeStatus::Resolved {
            outcome,
            resolver: resolver.to_string(),
            resolved_at: resolved_at.max(self.submitted_at),
            notes: notes.to_string(),
        };
        Ok(())
    }
}
