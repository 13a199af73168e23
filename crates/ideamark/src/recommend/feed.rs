//! Feed assembly: four ranked facets from one profile snapshot.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::config::FeedConfig;
use crate::content::ContentItem;
use crate::profile::UserInterestProfile;

use super::scorer::{sort_by_score, RecommendationScore, RecommendationScorer};
use super::trending::rank_trending;

const SIMILAR_TOP_CATEGORIES: usize = 2;
const SIMILAR_TOP_TAGS: usize = 5;
const NEW_TOP_CATEGORIES: usize = 3;

/// Ranked facets for one user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Recommendations {
    pub for_you: Vec<RecommendationScore>,
    pub trending: Vec<RecommendationScore>,
    pub similar: Vec<RecommendationScore>,
    pub new_in_categories: Vec<RecommendationScore>,
}

impl Recommendations {
    pub fn is_empty(&self) -> bool {
        self.for_you.is_empty()
            && self.trending.is_empty()
            && self.similar.is_empty()
            && self.new_in_categories.is_empty()
    }
}

/// Compute every facet for `profile` over `corpus` as of `now`.
///
/// Pure: nothing is mutated, and an empty corpus or profile yields empty
/// or generic facets rather than an error.
pub fn compute_recommendations(
    profile: &UserInterestProfile,
    corpus: &[ContentItem],
    now: u64,
    config: &FeedConfig,
) -> Recommendations {
    let scorer = RecommendationScorer::new(profile, now);
    let candidates: Vec<&ContentItem> = corpus.iter().filter(|i| scorer.is_candidate(i)).collect();

    let for_you = {
        let mut scored: Vec<RecommendationScore> =
            candidates.iter().map(|item| scorer.recommend(item)).collect();
        sort_by_score(&mut scored);
        scored.truncate(config.facet_size);
        scored
    };

    let trending = rank_trending(
        corpus,
        profile,
        now,
        config.trending_window_days,
        config.facet_size,
    );

    let similar = {
        let top_categories: BTreeSet<&str> =
            profile.top_categories(SIMILAR_TOP_CATEGORIES).into_iter().collect();
        let top_tags: BTreeSet<&str> = profile.top_tags(SIMILAR_TOP_TAGS).into_iter().collect();

        let mut scored: Vec<RecommendationScore> = candidates
            .iter()
            .filter_map(|item| {
                let tags: BTreeSet<String> =
                    item.tags.iter().map(|t| t.trim().to_lowercase()).collect();
                let overlap = usize::from(top_categories.contains(item.category.as_str()))
                    + tags.iter().filter(|t| top_tags.contains(t.as_str())).count();
                (overlap > 0).then(|| RecommendationScore {
                    item_id: item.id.clone(),
                    score: overlap as f64,
                    reasons: scorer.reasons(item),
                })
            })
            .collect();
        sort_by_score(&mut scored);
        scored.truncate(config.facet_size);
        scored
    };

    let new_in_categories: Vec<RecommendationScore> = {
        let top_categories: BTreeSet<&str> =
            profile.top_categories(NEW_TOP_CATEGORIES).into_iter().collect();
        let mut fresh: Vec<&ContentItem> = candidates
            .iter()
            .copied()
            .filter(|item| top_categories.contains(item.category.as_str()))
            .filter(|item| {
                crate::time::age_days(item.created_at, now) <= config.new_content_window_days
            })
            .collect();
        fresh.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        fresh
            .into_iter()
            .take(config.facet_size)
            .map(|item| scorer.recommend(item))
            .collect()
    };

    log::debug!(
        "feed for {}: {} candidates, {}/{}/{}/{} entries",
        profile.user_id,
        candidates.len(),
        for_you.len(),
        trending.len(),
        similar.len(),
        new_in_categories.len()
    );

    Recommendations {
        for_you,
        trending,
        similar,
        new_in_categories,
    }
}
