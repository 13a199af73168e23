//! Lexical similarity between two content drafts.
//!
//! Each draft becomes a token set (lower-cased whitespace tokens of the
//! title and description, plus lower-cased tags) and the two sets are
//! compared with the Jaccard index scaled to 0-100. The comparison is a pure
//! function and symmetric in its arguments.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::content::{ContentDraft, ContentId};

/// Identifier used for drafts that have not been stored yet.
pub const DRAFT_ID: &str = "draft";

/// Pairwise similarity between two items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityResult {
    pub item_a: ContentId,
    pub item_b: ContentId,
    /// Jaccard similarity of the token sets, 0-100.
    pub similarity: f64,
    /// Overlapping title words and tags, for display only.
    pub matching_elements: Vec<String>,
}

/// Split text into lower-cased whitespace tokens.
pub fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split_whitespace().map(str::to_lowercase)
}

/// Build the combined token set of a draft.
pub fn token_set(draft: &ContentDraft) -> BTreeSet<String> {
    tokenize(&draft.title)
        .chain(tokenize(&draft.description))
        .chain(draft.tags.iter().map(|t| t.trim().to_lowercase()))
        .filter(|t| !t.is_empty())
        .collect()
}

/// Jaccard index of two sets, scaled to 0-100. Two empty sets score 0.
pub fn jaccard_percent(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    intersection as f64 / union as f64 * 100.0
}

/// Compare two drafts.
pub fn compare(a: &ContentDraft, b: &ContentDraft) -> SimilarityResult {
    let similarity = jaccard_percent(&token_set(a), &token_set(b));

    let mut matching_elements = Vec::new();

    let title_a: BTreeSet<String> = tokenize(&a.title).collect();
    let title_b: BTreeSet<String> = tokenize(&b.title).collect();
    let shared_title: Vec<&str> = title_a.intersection(&title_b).map(String::as_str).collect();
    if !shared_title.is_empty() {
        matching_elements.push(format!("Similar title words: {}", shared_title.join(", ")));
    }

    let tags_a: BTreeSet<String> = a.tags.iter().map(|t| t.trim().to_lowercase()).collect();
    let tags_b: BTreeSet<String> = b.tags.iter().map(|t| t.trim().to_lowercase()).collect();
    let shared_tags: Vec<&str> = tags_a
        .intersection(&tags_b)
        .map(String::as_str)
        .filter(|t| !t.is_empty())
        .collect();
    if !shared_tags.is_empty() {
        matching_elements.push(format!("Common tags: {}", shared_tags.join(", ")));
    }

    SimilarityResult {
        item_a: draft_id(a),
        item_b: draft_id(b),
        similarity,
        matching_elements,
    }
}

fn draft_id(draft: &ContentDraft) -> ContentId {
    draft
        .id
        .clone()
        .unwrap_or_else(|| ContentId::new(DRAFT_ID))
}
