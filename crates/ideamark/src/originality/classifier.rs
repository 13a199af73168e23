//! Originality classifier: corpus similarity plus threshold policy.

use std::time::Duration;

use crate::config::OriginalityConfig;
use crate::content::{ContentDraft, ContentItem};
use crate::error::Result;
use crate::similarity::{self, SimilarityResult};

use super::prior_art::{self, PriorArtProvider};
use super::types::{Classification, OriginalityVerdict, PriorArtLookup, PriorArtRef};

/// Applies the similarity engine across a corpus and classifies the result.
#[derive(Debug, Clone, Default)]
pub struct OriginalityClassifier {
    config: OriginalityConfig,
}

impl OriginalityClassifier {
    pub fn new(config: OriginalityConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &OriginalityConfig {
        &self.config
    }

    /// Classify a draft using the corpus and an already-resolved prior-art lookup.
    pub fn classify(
        &self,
        candidate: &ContentDraft,
        corpus: &[ContentItem],
        prior_art: Vec<PriorArtRef>,
        prior_art_lookup: PriorArtLookup,
    ) -> Result<OriginalityVerdict> {
        candidate.validate()?;

        let mut results: Vec<SimilarityResult> = corpus
            .iter()
            .filter(|item| candidate.id.as_ref() != Some(&item.id))
            .map(|item| similarity::compare(candidate, &item.as_draft()))
            .collect();

        let similarity_score = results
            .iter()
            .map(|r| r.similarity)
            .fold(0.0_f64, f64::max);

        results.retain(|r| r.similarity > self.config.similar_threshold);
        // Stable sort: equal scores keep corpus order.
        results.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
        results.truncate(self.config.max_similar);

        let classification =
            Classification::from_score(similarity_score, self.config.duplicate_threshold);
        let recommended_actions =
            recommended_actions(classification, &results, &prior_art, &prior_art_lookup);

        log::debug!(
            "originality check: {:?} (max similarity {:.1}, {} similar, {} prior art)",
            classification,
            similarity_score,
            results.len(),
            prior_art.len()
        );

        Ok(OriginalityVerdict {
            classification,
            similarity_score,
            similar_ideas: results,
            prior_art,
            recommended_actions,
            prior_art_lookup,
        })
    }

    /// Check a draft, consulting `provider` for prior art when one is given.
    ///
    /// A failing or slow provider never fails the check; the verdict is then
    /// computed from the corpus alone and marked partial.
    pub async fn check(
        &self,
        candidate: &ContentDraft,
        corpus: &[ContentItem],
        provider: Option<&dyn PriorArtProvider>,
    ) -> Result<OriginalityVerdict> {
        candidate.validate()?;

        let (prior_art, lookup) = match provider {
            Some(provider) => {
                let timeout = Duration::from_millis(self.config.prior_art_timeout_ms);
                prior_art::lookup(provider, candidate, timeout).await
            }
            None => (Vec::new(), PriorArtLookup::Skipped),
        };

        self.classify(candidate, corpus, prior_art, lookup)
    }
}

/// Check a draft against the corpus with default thresholds and no prior-art lookup.
pub fn check_originality_local(
    candidate: &ContentDraft,
    corpus: &[ContentItem],
) -> Result<OriginalityVerdict> {
    OriginalityClassifier::default().classify(candidate, corpus, Vec::new(), PriorArtLookup::Skipped)
}

fn recommended_actions(
    classification: Classification,
    similar: &[SimilarityResult],
    prior_art: &[PriorArtRef],
    lookup: &PriorArtLookup,
) -> Vec<String> {
    let mut actions = Vec::new();

    match classification {
        Classification::Duplicate => {
            actions.push(
                "Differentiate your idea from the most similar existing submissions".to_string(),
            );
            actions.push("Review the similar ideas listed before submitting".to_string());
        }
        Classification::Original if similar.is_empty() => {
            actions.push("Your idea appears to be original".to_string());
        }
        Classification::Original => {
            actions.push("Highlight what sets your idea apart from related submissions".to_string());
        }
    }

    if !prior_art.is_empty() {
        actions.push("Review the prior art references for overlapping claims".to_string());
    }

    if let PriorArtLookup::Unavailable(_) = lookup {
        actions.push("Prior-art search was unavailable; run the check again before filing".to_string());
    }

    actions
}
