//! Data structures for originality verdicts.

use serde::{Deserialize, Serialize};

use crate::similarity::SimilarityResult;

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Outcome of the duplicate threshold test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    Original,
    Duplicate,
}

impl Classification {
    /// Classify a maximum similarity score against a duplicate threshold.
    pub fn from_score(score: f64, duplicate_threshold: f64) -> Self {
        if score < duplicate_threshold {
            Self::Original
        } else {
            Self::Duplicate
        }
    }
}

// ---------------------------------------------------------------------------
// Prior art
// ---------------------------------------------------------------------------

/// Kind of prior-art reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriorArtSource {
    Patent,
    Publication,
    Product,
    Idea,
}

/// A reference to pre-existing work returned by a prior-art provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriorArtRef {
    pub source: PriorArtSource,
    pub title: String,
    /// Patent number, DOI, or URL.
    pub reference: String,
    /// Provider-reported relevance, 0-100.
    pub relevance: f64,
}

/// How the prior-art part of a verdict was obtained.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum PriorArtLookup {
    /// The provider answered within the timeout.
    Complete,
    /// No provider was configured.
    Skipped,
    /// The provider failed or timed out; the verdict is corpus-only.
    Unavailable(String),
}

// ---------------------------------------------------------------------------
// Verdict
// ---------------------------------------------------------------------------

/// Result of an originality check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OriginalityVerdict {
    pub classification: Classification,
    /// Highest similarity against any corpus item, 0 for an empty corpus.
    pub similarity_score: f64,
    /// Most similar items above the reporting threshold, highest first.
    pub similar_ideas: Vec<SimilarityResult>,
    pub prior_art: Vec<PriorArtRef>,
    pub recommended_actions: Vec<String>,
    pub prior_art_lookup: PriorArtLookup,
}

impl OriginalityVerdict {
    pub fn is_original(&self) -> bool {
        self.classification == Classification::Original
    }

    /// Whether the prior-art lookup failed and the verdict is corpus-only.
    pub fn is_partial(&self) -> bool {
        matches!(self.prior_art_lookup, PriorArtLookup::Unavailable(_))
    }
}
