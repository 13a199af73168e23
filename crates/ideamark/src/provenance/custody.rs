//! Chain of custody.
//!
//! Each entry commits to the one before it: `current_hash` is SHA-256 over
//! the previous hash and the entry's own fields. The first entry records
//! creation and carries the content hash itself.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{Result, ScoringError};

/// What happened to a proof.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CustodyAction {
    Created,
    Modified,
    Verified,
    Disputed,
    Resolved,
}

impl CustodyAction {
    pub fn as_tag(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Modified => "modified",
            Self::Verified => "verified",
            Self::Disputed => "disputed",
            Self::Resolved => "resolved",
        }
    }
}

/// One link in the chain of custody.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainOfCustodyEntry {
    pub action: CustodyAction,
    pub timestamp: u64,
    pub actor: String,
    pub detail: String,
    pub previous_hash: Option<String>,
    pub current_hash: String,
}

impl ChainOfCustodyEntry {
    /// The `created` entry that opens a chain.
    pub fn genesis(content_hash: &str, timestamp: u64, actor: &str, detail: &str) -> Self {
        Self {
            action: CustodyAction::Created,
            timestamp,
            actor: actor.to_string(),
            detail: detail.to_string(),
            previous_hash: None,
            current_hash: content_hash.to_string(),
        }
    }

    /// Build the entry that follows `previous`.
    ///
    /// Timestamps never go backwards; an earlier clock reading is raised to
    /// the previous entry's timestamp.
    pub fn next(
        previous: &ChainOfCustodyEntry,
        action: CustodyAction,
        timestamp: u64,
        actor: &str,
        detail: &str,
    ) -> Self {
        let timestamp = timestamp.max(previous.timestamp);
        let current_hash =
            link_hash(&previous.current_hash, action, timestamp, actor, detail);
        Self {
            action,
            timestamp,
            actor: actor.to_string(),
            detail: detail.to_string(),
            previous_hash: Some(previous.current_hash.clone()),
            current_hash,
        }
    }
}

/// Hash linking an entry to its predecessor.
pub fn link_hash(
    previous_hash: &str,
    action: CustodyAction,
    timestamp: u64,
    actor: &str,
    detail: &str,
) -> String {
    let input = format!(
        "{previous_hash}:{}:{timestamp}:{actor}:{detail}",
        action.as_tag()
    );
    hex::encode(Sha256::digest(input.as_bytes()))
}

/// Verify a chain (oldest first) against the content hash it was opened with.
///
/// Returns the first defect found as an `Integrity` error naming the entry.
pub fn verify_custody(chain: &[ChainOfCustodyEntry], content_hash: &str) -> Result<()> {
    let Some(first) = chain.first() else {
        return Ok(());
    };

    if first.action != CustodyAction::Created || first.previous_hash.is_some() {
        return Err(ScoringError::Integrity {
            subject: "custody entry 0".into(),
            expected: "created entry without predecessor".into(),
            actual: first.action.as_tag().into(),
        });
    }
    if first.current_hash != content_hash {
        return Err(ScoringError::Integrity {
            subject: "custody entry 0".into(),
            expected: content_hash.into(),
            actual: first.current_hash.clone(),
        });
    }

    for (i, pair) in chain.windows(2).enumerate() {
        let (prev, entry) = (&pair[0], &pair[1]);
        let index = i + 1;

        if entry.previous_hash.as_deref() != Some(prev.current_hash.as_str()) {
            return Err(ScoringError::Integrity {
                subject: format!("custody entry {index}"),
                expected: prev.current_hash.clone(),
                actual: entry.previous_hash.clone().unwrap_or_default(),
            });
        }
        if entry.timestamp < prev.timestamp {
            return Err(ScoringError::Integrity {
                subject: format!("custody entry {index}"),
                expected: format!("timestamp >= {}", prev.timestamp),
                actual: entry.timestamp.to_string(),
            });
        }
        let expected = link_hash(
            &prev.current_hash,
            entry.action,
            entry.timestamp,
            &entry.actor,
            &entry.detail,
        );
        if entry.current_hash != expected {
            return Err(ScoringError::Integrity {
                subject: format!("custody entry {index}"),
                expected,
                actual: entry.current_hash.clone(),
            });
        }
    }

    Ok(())
}
