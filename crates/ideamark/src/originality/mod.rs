//! Originality checks: classify a draft against the existing corpus.
//!
//! The originality module provides:
//! - Corpus-wide similarity scoring with a duplicate threshold
//! - Pluggable prior-art lookup behind an async, timeout-bounded trait
//! - A deterministic table of recommended follow-up actions

pub mod classifier;
pub mod prior_art;
pub mod types;

pub use classifier::{check_originality_local, OriginalityClassifier};
pub use prior_art::{
    DisabledPriorArtProvider, KeywordPriorArtProvider, KeywordRule, PriorArtProvider,
};
pub use types::{Classification, OriginalityVerdict, PriorArtLookup, PriorArtRef, PriorArtSource};
