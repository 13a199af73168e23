//! Time-decayed popularity.

use crate::content::ContentItem;
use crate::profile::UserInterestProfile;

use super::scorer::{sort_by_score, RecommendationScore};

/// Popularity with linear decay over `window_days`; older items score nothing.
///
/// `score = (upvotes + comments × 2 + views × 0.1) × max(0, 1 − age_days / window_days)`
pub fn trending_score(item: &ContentItem, now: u64, window_days: f64) -> Option<f64> {
    let age = crate::time::age_days(item.created_at, now);
    if age > window_days || window_days <= 0.0 {
        return None;
    }
    let age_weight = (1.0 - age / window_days).max(0.0);
    let c = &item.counters;
    let popularity =
        c.upvotes as f64 + c.comment_count as f64 * 2.0 + c.view_count as f64 * 0.1;
    Some(popularity * age_weight)
}

/// Rank items by trending score, skipping those the user voted on.
///
/// Ranking is otherwise independent of the profile. Ties keep corpus order.
pub fn rank_trending(
    corpus: &[ContentItem],
    profile: &UserInterestProfile,
    now: u64,
    window_days: f64,
    limit: usize,
) -> Vec<RecommendationScore> {
    let mut ranked: Vec<RecommendationScore> = corpus
        .iter()
        .filter(|item| !profile.has_voted(&item.id))
        .filter_map(|item| {
            trending_score(item, now, window_days).map(|score| RecommendationScore {
                item_id: item.id.clone(),
                score,
                reasons: vec![format!(
                    "Trending in the last {} days",
                    window_days.round() as u64
                )],
            })
        })
        .collect();
    sort_by_score(&mut ranked);
    ranked.truncate(limit);
    ranked
}
