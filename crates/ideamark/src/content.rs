//! Content records and interaction events read from the content store.
//!
//! The core never owns these records; it reads snapshots passed in by the
//! caller.

use serde::{Deserialize, Serialize};

/// Unique identifier for a content item (an idea, post, or submission).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContentId(pub String);

impl ContentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl std::fmt::Display for ContentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a platform user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Engagement counters maintained by the content store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngagementCounters {
    pub upvotes: u64,
    pub downvotes: u64,
    pub comment_count: u64,
    pub view_count: u64,
}

/// A published content item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: ContentId,
    pub title: String,
    pub description: String,
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub author_id: UserId,
    /// Creation time (microseconds since Unix epoch).
    pub created_at: u64,
    #[serde(default)]
    pub counters: EngagementCounters,
    /// Novelty estimate (0-100) computed upstream, if available.
    #[serde(default)]
    pub novelty_score: Option<f64>,
}

impl ContentItem {
    /// The draft view of this item, as compared by the similarity engine.
    pub fn as_draft(&self) -> ContentDraft {
        ContentDraft {
            id: Some(self.id.clone()),
            title: self.title.clone(),
            description: self.description.clone(),
            tags: self.tags.clone(),
        }
    }
}

/// Text fields of a submission, possibly not yet published.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentDraft {
    /// Identifier, if the draft already corresponds to a stored item.
    #[serde(default)]
    pub id: Option<ContentId>,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl ContentDraft {
    /// Create a draft without an identifier.
    pub fn new(title: impl Into<String>, description: impl Into<String>, tags: &[&str]) -> Self {
        Self {
            id: None,
            title: title.into(),
            description: description.into(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    /// Attach an identifier.
    pub fn with_id(mut self, id: ContentId) -> Self {
        self.id = Some(id);
        self
    }

    /// Reject drafts with a blank title or description.
    pub fn validate(&self) -> crate::Result<()> {
        if self.title.trim().is_empty() {
            return Err(crate::ScoringError::Validation("title must not be empty".into()));
        }
        if self.description.trim().is_empty() {
            return Err(crate::ScoringError::Validation(
                "description must not be empty".into(),
            ));
        }
        Ok(())
    }
}

/// Kind of user interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionAction {
    View,
    Upvote,
    Downvote,
    Comment,
}

impl InteractionAction {
    /// Return a stable string tag.
    pub fn as_tag(&self) -> &'static str {
        match self {
            Self::View => "view",
            Self::Upvote => "upvote",
            Self::Downvote => "downvote",
            Self::Comment => "comment",
        }
    }

    /// Whether this interaction is a vote.
    pub fn is_vote(&self) -> bool {
        matches!(self, Self::Upvote | Self::Downvote)
    }
}

impl std::str::FromStr for InteractionAction {
    type Err = crate::ScoringError;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_lowercase().as_str() {
            "view" => Ok(Self::View),
            "upvote" | "vote_up" | "up" => Ok(Self::Upvote),
            "downvote" | "vote_down" | "down" => Ok(Self::Downvote),
            "comment" => Ok(Self::Comment),
            other => Err(crate::ScoringError::Validation(format!(
                "unknown interaction action: {other}"
            ))),
        }
    }
}

/// One event from the interaction stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionEvent {
    pub user_id: UserId,
    pub item_id: ContentId,
    pub action: InteractionAction,
    /// Event time (microseconds since Unix epoch).
    pub timestamp: u64,
}

impl InteractionEvent {
    pub fn new(user: &str, item: &str, action: InteractionAction, timestamp: u64) -> Self {
        Self {
            user_id: UserId::new(user),
            item_id: ContentId::new(item),
            action,
            timestamp,
        }
    }
}
