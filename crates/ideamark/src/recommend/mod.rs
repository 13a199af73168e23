//! Personalized feeds and trending content.

pub mod feed;
pub mod scorer;
pub mod trending;

pub use feed::{compute_recommendations, Recommendations};
pub use scorer::{RecommendationScore, RecommendationScorer};
pub use trending::{rank_trending, trending_score};
