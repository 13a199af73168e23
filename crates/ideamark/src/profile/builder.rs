//! Interest profile construction.
//!
//! A profile is a fold over a user's interaction events. Each event adds
//! an action weight to the item's category and 0.7 of that weight to each
//! of its tags. The profile keeps the raw counters and exclusion sets it
//! derives its labels from, so it can be updated one event at a time.

use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};

use serde::{Deserialize, Serialize};

use crate::content::{ContentId, ContentItem, InteractionAction, InteractionEvent, UserId};

/// Share of the action weight credited to each tag.
pub const TAG_WEIGHT_FACTOR: f64 = 0.7;

/// Weight an interaction adds to the item's category.
pub fn action_weight(action: InteractionAction) -> f64 {
    match action {
        InteractionAction::Upvote => 1.5,
        InteractionAction::Comment => 1.2,
        InteractionAction::View => 0.3,
        InteractionAction::Downvote => -0.5,
    }
}

// ---------------------------------------------------------------------------
// Labels
// ---------------------------------------------------------------------------

/// How readily a user upvotes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VotingPattern {
    Conservative,
    #[default]
    Balanced,
    Liberal,
}

impl VotingPattern {
    /// Upvote ratio above 0.7 is liberal, below 0.3 conservative. No votes is balanced.
    pub fn from_votes(upvotes: u64, downvotes: u64) -> Self {
        let total = upvotes + downvotes;
        if total == 0 {
            return Self::Balanced;
        }
        let ratio = upvotes as f64 / total as f64;
        if ratio > 0.7 {
            Self::Liberal
        } else if ratio < 0.3 {
            Self::Conservative
        } else {
            Self::Balanced
        }
    }
}

/// How active a user is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngagementLevel {
    #[default]
    Low,
    Medium,
    High,
}

impl EngagementLevel {
    /// Votes plus views above 20 is high, above 5 medium.
    pub fn from_activity(votes: u64, views: u64) -> Self {
        let activity = votes + views;
        if activity > 20 {
            Self::High
        } else if activity > 5 {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

// ---------------------------------------------------------------------------
// Profile
// ---------------------------------------------------------------------------

/// A user's derived interests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserInterestProfile {
    pub user_id: UserId,
    pub category_weights: BTreeMap<String, f64>,
    pub tag_weights: BTreeMap<String, f64>,
    pub voting_pattern: VotingPattern,
    pub engagement_level: EngagementLevel,
    pub upvotes: u64,
    pub downvotes: u64,
    pub views: u64,
    pub comments: u64,
    /// Items the user has voted on, either way.
    pub voted_items: BTreeSet<ContentId>,
    /// Most recently viewed items, oldest first.
    pub recent_views: VecDeque<ContentId>,
    /// Timestamp of the last applied event.
    pub updated_at: u64,
}

impl UserInterestProfile {
    /// An empty profile.
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            category_weights: BTreeMap::new(),
            tag_weights: BTreeMap::new(),
            voting_pattern: VotingPattern::Balanced,
            engagement_level: EngagementLevel::Low,
            upvotes: 0,
            downvotes: 0,
            views: 0,
            comments: 0,
            voted_items: BTreeSet::new(),
            recent_views: VecDeque::new(),
            updated_at: 0,
        }
    }

    /// Fold one event into the profile.
    ///
    /// `item` is the event's content item if known. Unknown items still
    /// update counters and exclusion sets but contribute no weight.
    pub fn apply(
        &mut self,
        event: &InteractionEvent,
        item: Option<&ContentItem>,
        recent_view_window: usize,
    ) {
        match event.action {
            InteractionAction::Upvote => self.upvotes += 1,
            InteractionAction::Downvote => self.downvotes += 1,
            InteractionAction::View => self.views += 1,
            InteractionAction::Comment => self.comments += 1,
        }

        if event.action.is_vote() {
            self.voted_items.insert(event.item_id.clone());
        }
        if event.action == InteractionAction::View {
            self.recent_views.retain(|id| id != &event.item_id);
            self.recent_views.push_back(event.item_id.clone());
            while self.recent_views.len() > recent_view_window {
                self.recent_views.pop_front();
            }
        }

        if let Some(item) = item {
            let weight = action_weight(event.action);
            *self
                .category_weights
                .entry(item.category.clone())
                .or_insert(0.0) += weight;
            let tags: BTreeSet<String> = item
                .tags
                .iter()
                .map(|t| t.trim().to_lowercase())
                .filter(|t| !t.is_empty())
                .collect();
            for tag in tags {
                *self.tag_weights.entry(tag).or_insert(0.0) += weight * TAG_WEIGHT_FACTOR;
            }
        }

        self.voting_pattern = VotingPattern::from_votes(self.upvotes, self.downvotes);
        self.engagement_level =
            EngagementLevel::from_activity(self.upvotes + self.downvotes, self.views);
        self.updated_at = self.updated_at.max(event.timestamp);
    }

    pub fn category_weight(&self, category: &str) -> f64 {
        self.category_weights.get(category).copied().unwrap_or(0.0)
    }

    pub fn tag_weight(&self, tag: &str) -> f64 {
        self.tag_weights
            .get(&tag.trim().to_lowercase())
            .copied()
            .unwrap_or(0.0)
    }

    /// The `n` highest-weighted categories. Ties keep alphabetical order.
    pub fn top_categories(&self, n: usize) -> Vec<&str> {
        top_keys(&self.category_weights, n)
    }

    /// The `n` highest-weighted tags. Ties keep alphabetical order.
    pub fn top_tags(&self, n: usize) -> Vec<&str> {
        top_keys(&self.tag_weights, n)
    }

    pub fn has_voted(&self, item: &ContentId) -> bool {
        self.voted_items.contains(item)
    }

    pub fn recently_viewed(&self, item: &ContentId) -> bool {
        self.recent_views.contains(item)
    }

    /// Whether the user has no interactions at all.
    pub fn is_empty(&self) -> bool {
        self.upvotes + self.downvotes + self.views + self.comments == 0
    }
}

fn top_keys(weights: &BTreeMap<String, f64>, n: usize) -> Vec<&str> {
    let mut entries: Vec<(&String, &f64)> = weights.iter().collect();
    entries.sort_by(|a, b| b.1.total_cmp(a.1));
    entries.into_iter().take(n).map(|(k, _)| k.as_str()).collect()
}

/// Build a profile from scratch.
///
/// Events for other users are ignored; the rest are applied in timestamp
/// order, with ties kept in input order.
pub fn build_profile(
    user_id: &UserId,
    history: &[InteractionEvent],
    corpus: &[ContentItem],
    recent_view_window: usize,
) -> UserInterestProfile {
    let items: HashMap<&ContentId, &ContentItem> =
        corpus.iter().map(|item| (&item.id, item)).collect();

    let mut events: Vec<&InteractionEvent> =
        history.iter().filter(|e| &e.user_id == user_id).collect();
    events.sort_by_key(|e| e.timestamp);

    let mut profile = UserInterestProfile::new(user_id.clone());
    for event in events {
        profile.apply(event, items.get(&event.item_id).copied(), recent_view_window);
    }
    log::debug!(
        "built profile for {user_id}: {} categories, {} tags, {:?}",
        profile.category_weights.len(),
        profile.tag_weights.len(),
        profile.voting_pattern
    );
    profile
}
