//! Prior-art lookup.
//!
//! The classifier depends only on the `PriorArtProvider` trait, so a real
//! patent or publication search can replace the keyword table shipped here
//! without touching classification logic.

use std::time::Duration;

use async_trait::async_trait;

use crate::content::ContentDraft;
use crate::error::{Result, ScoringError};
use crate::similarity::token_set;

use super::types::{PriorArtLookup, PriorArtRef, PriorArtSource};

/// A source of prior-art references for a draft.
///
/// Implementations report failures as `ScoringError::ExternalDependency`.
#[async_trait]
pub trait PriorArtProvider: Send + Sync {
    /// Provider identifier, used in logs.
    fn name(&self) -> &str;

    /// Return references relevant to `draft`, most relevant first.
    async fn search(&self, draft: &ContentDraft) -> Result<Vec<PriorArtRef>>;
}

/// A keyword that triggers a fixed reference.
#[derive(Debug, Clone)]
pub struct KeywordRule {
    pub keyword: String,
    pub reference: PriorArtRef,
}

impl KeywordRule {
    pub fn new(
        keyword: impl Into<String>,
        source: PriorArtSource,
        title: impl Into<String>,
        reference: impl Into<String>,
        relevance: f64,
    ) -> Self {
        Self {
            keyword: keyword.into().to_lowercase(),
            reference: PriorArtRef {
                source,
                title: title.into(),
                reference: reference.into(),
                relevance,
            },
        }
    }
}

/// Deterministic provider that matches draft tokens against a keyword table.
pub struct KeywordPriorArtProvider {
    rules: Vec<KeywordRule>,
}

impl KeywordPriorArtProvider {
    /// Create a provider with a custom rule table.
    pub fn new(rules: Vec<KeywordRule>) -> Self {
        Self { rules }
    }

    /// Number of rules in the table.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for KeywordPriorArtProvider {
    fn default() -> Self {
        Self::new(vec![
            KeywordRule::new(
                "blockchain",
                PriorArtSource::Publication,
                "Bitcoin: A Peer-to-Peer Electronic Cash System",
                "https://bitcoin.org/bitcoin.pdf",
                85.0,
            ),
            KeywordRule::new(
                "drone",
                PriorArtSource::Patent,
                "Unmanned aerial vehicle delivery system",
                "US9573684B2",
                70.0,
            ),
            KeywordRule::new(
                "solar",
                PriorArtSource::Patent,
                "Portable solar-powered charging device",
                "US8853886B2",
                60.0,
            ),
            KeywordRule::new(
                "irrigation",
                PriorArtSource::Product,
                "Networked soil-moisture irrigation controller",
                "https://www.rachio.com",
                55.0,
            ),
        ])
    }
}

#[async_trait]
impl PriorArtProvider for KeywordPriorArtProvider {
    fn name(&self) -> &str {
        "keyword"
    }

    async fn search(&self, draft: &ContentDraft) -> Result<Vec<PriorArtRef>> {
        let tokens = token_set(draft);
        let mut hits: Vec<PriorArtRef> = self
            .rules
            .iter()
            .filter(|rule| tokens.contains(&rule.keyword))
            .map(|rule| rule.reference.clone())
            .collect();
        hits.sort_by(|a, b| b.relevance.total_cmp(&a.relevance));
        Ok(hits)
    }
}

/// Provider for deployments without a prior-art backend.
///
/// Every search fails, so verdicts carry an `Unavailable` lookup and ask
/// for the check to be repeated later.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledPriorArtProvider;

#[async_trait]
impl PriorArtProvider for DisabledPriorArtProvider {
    fn name(&self) -> &str {
        "disabled"
    }

    async fn search(&self, _draft: &ContentDraft) -> Result<Vec<PriorArtRef>> {
        Err(ScoringError::ExternalDependency(
            "prior-art lookup is disabled".into(),
        ))
    }
}

/// Run a provider under a timeout, degrading to an `Unavailable` lookup.
pub async fn lookup(
    provider: &dyn PriorArtProvider,
    draft: &ContentDraft,
    timeout: Duration,
) -> (Vec<PriorArtRef>, PriorArtLookup) {
    match tokio::time::timeout(timeout, provider.search(draft)).await {
        Ok(Ok(refs)) => {
            log::debug!("prior-art provider '{}' returned {} hits", provider.name(), refs.len());
            (refs, PriorArtLookup::Complete)
        }
        Ok(Err(e)) => {
            log::warn!("prior-art provider '{}' failed: {e}", provider.name());
            (Vec::new(), PriorArtLookup::Unavailable(e.to_string()))
        }
        Err(_) => {
            let reason = format!(
                "prior-art provider '{}' timed out after {} ms",
                provider.name(),
                timeout.as_millis()
            );
            log::warn!("{reason}");
            (Vec::new(), PriorArtLookup::Unavailable(reason))
        }
    }
}
