//! Personalized item scoring.
//!
//! ```text
//! score = category_weight × 10
//!       + Σ tag_weight × 5
//!       + quality × 15
//!       + novelty          (10 when novelty_score > 80)
//!       + engagement       (min(20, comments × 2 + views × 0.1))
//!       + recency          (max(0, 7 − age_days) × 2)
//! ```
//!
//! Conservative voters see items with quality below 0.5 scaled by 0.7;
//! liberal voters get a flat +5.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::content::{ContentId, ContentItem};
use crate::profile::{UserInterestProfile, VotingPattern};

const CATEGORY_FACTOR: f64 = 10.0;
const TAG_FACTOR: f64 = 5.0;
const QUALITY_FACTOR: f64 = 15.0;
const NOVELTY_BONUS: f64 = 10.0;
const NOVELTY_THRESHOLD: f64 = 80.0;
const ENGAGEMENT_CAP: f64 = 20.0;
const RECENCY_DAYS: f64 = 7.0;
const RECENCY_FACTOR: f64 = 2.0;
const CONSERVATIVE_QUALITY_FLOOR: f64 = 0.5;
const CONSERVATIVE_PENALTY: f64 = 0.7;
const LIBERAL_BONUS: f64 = 5.0;
const MAX_REASONS: usize = 3;

/// A scored recommendation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationScore {
    pub item_id: ContentId,
    pub score: f64,
    /// Up to three human-readable reasons, most specific first.
    pub reasons: Vec<String>,
}

/// Net approval in [-1, 1].
pub fn quality(item: &ContentItem) -> f64 {
    let up = item.counters.upvotes as f64;
    let down = item.counters.downvotes as f64;
    (up - down) / (up + down).max(1.0)
}

/// Uncapped discussion activity.
pub fn activity(item: &ContentItem) -> f64 {
    item.counters.comment_count as f64 * 2.0 + item.counters.view_count as f64 * 0.1
}

fn distinct_tags(item: &ContentItem) -> BTreeSet<String> {
    item.tags
        .iter()
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Scores items for one profile at one instant.
#[derive(Debug, Clone, Copy)]
pub struct RecommendationScorer<'a> {
    profile: &'a UserInterestProfile,
    now: u64,
}

impl<'a> RecommendationScorer<'a> {
    pub fn new(profile: &'a UserInterestProfile, now: u64) -> Self {
        Self { profile, now }
    }

    /// Whether `item` may be recommended: not voted on, not recently
    /// viewed, and not the user's own.
    pub fn is_candidate(&self, item: &ContentItem) -> bool {
        !self.profile.has_voted(&item.id)
            && !self.profile.recently_viewed(&item.id)
            && item.author_id != self.profile.user_id
    }

    pub fn score(&self, item: &ContentItem) -> f64 {
        let category = self.profile.category_weight(&item.category) * CATEGORY_FACTOR;
        let tags: f64 = distinct_tags(item)
            .iter()
            .map(|t| self.profile.tag_weight(t) * TAG_FACTOR)
            .sum();
        let quality = quality(item);
        let novelty = match item.novelty_score {
            Some(n) if n > NOVELTY_THRESHOLD => NOVELTY_BONUS,
            _ => 0.0,
        };
        let engagement = activity(item).min(ENGAGEMENT_CAP);
        let age = crate::time::age_days(item.created_at, self.now);
        let recency = (RECENCY_DAYS - age).max(0.0) * RECENCY_FACTOR;

        let mut score = category + tags + quality * QUALITY_FACTOR + novelty + engagement + recency;

        match self.profile.voting_pattern {
            VotingPattern::Conservative if quality < CONSERVATIVE_QUALITY_FLOOR => {
                score *= CONSERVATIVE_PENALTY;
            }
            VotingPattern::Liberal => score += LIBERAL_BONUS,
            _ => {}
        }
        score
    }

    /// Up to three reasons, in a fixed priority order.
    pub fn reasons(&self, item: &ContentItem) -> Vec<String> {
        let mut reasons = Vec::with_capacity(MAX_REASONS);

        if self.profile.category_weight(&item.category) > 0.0 {
            reasons.push(format!("Matches your interest in {}", item.category));
        }

        let best_tag = distinct_tags(item)
            .into_iter()
            .map(|t| {
                let w = self.profile.tag_weight(&t);
                (t, w)
            })
            .filter(|(_, w)| *w > 0.0)
            .fold(None::<(String, f64)>, |best, (t, w)| match best {
                Some((_, bw)) if bw >= w => best,
                _ => Some((t, w)),
            });
        if let Some((tag, _)) = best_tag {
            reasons.push(format!("Related to {tag}"));
        }

        if quality(item) > 0.7 {
            reasons.push("Highly rated by the community".to_string());
        }
        if item.novelty_score.is_some_and(|n| n > NOVELTY_THRESHOLD) {
            reasons.push("Highly novel idea".to_string());
        }
        if crate::time::age_days(item.created_at, self.now) < 2.0 {
            reasons.push("Recently posted".to_string());
        }
        if activity(item) >= 10.0 {
            reasons.push("Active discussion".to_string());
        }

        reasons.truncate(MAX_REASONS);
        reasons
    }

    pub fn recommend(&self, item: &ContentItem) -> RecommendationScore {
        RecommendationScore {
            item_id: item.id.clone(),
            score: self.score(item),
            reasons: self.reasons(item),
        }
    }
}

/// Stable sort by score, highest first. Equal scores keep their order.
pub fn sort_by_score(scores: &mut [RecommendationScore]) {
    scores.sort_by(|a, b| b.score.total_cmp(&a.score));
}
