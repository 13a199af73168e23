//! Configuration for the scoring core.
//!
//! Every field has a default matching the documented scoring constants,
//! so an empty JSON object (`{}`) is a valid configuration file.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScoringError};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// Originality classifier settings.
    pub originality: OriginalityConfig,
    /// Feed ranking settings.
    pub feed: FeedConfig,
    /// Proof issuance settings.
    pub provenance: ProvenanceConfig,
}

impl CoreConfig {
    /// Parse a configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| ScoringError::Serialization(e.to_string()))
    }

    /// Load a configuration from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text).map_err(|e| {
            ScoringError::InvalidFileFormat(format!("{}: {e}", path.display()))
        })
    }
}

/// Originality classifier configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OriginalityConfig {
    /// Results strictly above this similarity are reported as similar ideas.
    pub similar_threshold: f64,
    /// Scores at or above this similarity classify as duplicate.
    pub duplicate_threshold: f64,
    /// Maximum number of similar ideas reported.
    pub max_similar: usize,
    /// Upper bound on a prior-art lookup, in milliseconds.
    pub prior_art_timeout_ms: u64,
}

impl Default for OriginalityConfig {
    fn default() -> Self {
        Self {
            similar_threshold: 30.0,
            duplicate_threshold: 70.0,
            max_similar: 5,
            prior_art_timeout_ms: 2_000,
        }
    }
}

/// Feed ranking configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Maximum entries per facet.
    pub facet_size: usize,
    /// Number of recent views excluded from recommendations.
    pub recent_view_window: usize,
    /// Window for the trending facet, in days.
    pub trending_window_days: f64,
    /// Window for the "new in your categories" facet, in days.
    pub new_content_window_days: f64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            facet_size: 6,
            recent_view_window: 10,
            trending_window_days: 7.0,
            new_content_window_days: 3.0,
        }
    }
}

/// What happens when a proof is requested for a subject that already has one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Identical content returns the stored proof unchanged.
    #[default]
    ReturnExisting,
    /// Any second request fails with `ScoringError::DuplicateProof`.
    Reject,
}

/// Proof issuance configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvenanceConfig {
    /// Issuer name embedded in certificates.
    pub issuer: String,
    /// Certificate lifetime in days; `None` issues non-expiring certificates.
    pub certificate_validity_days: Option<u64>,
    /// Behaviour on repeated generation for the same subject.
    pub duplicate_policy: DuplicatePolicy,
    /// Number of derived witnesses available beyond the system witness.
    pub max_extra_witnesses: usize,
}

impl Default for ProvenanceConfig {
    fn default() -> Self {
        Self {
            issuer: "ideamark-provenance".to_string(),
            certificate_validity_days: None,
            duplicate_policy: DuplicatePolicy::ReturnExisting,
            max_extra_witnesses: 4,
        }
    }
}
