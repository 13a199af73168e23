//! Live per-user profiles.

use crate::content::{ContentItem, InteractionEvent, UserId};
use crate::sync::{lock_slot, KeyedLocks};

use super::builder::{build_profile, UserInterestProfile};

/// Holds one profile per user and applies events as they arrive.
///
/// Updates for one user are serialized; different users proceed in
/// parallel. Readers always receive a cloned snapshot.
pub struct ProfileRegistry {
    profiles: KeyedLocks<UserId, UserInterestProfile>,
    recent_view_window: usize,
}

impl ProfileRegistry {
    pub fn new(recent_view_window: usize) -> Self {
        Self {
            profiles: KeyedLocks::new(),
            recent_view_window,
        }
    }

    /// Apply an event to its user's profile and return the updated snapshot.
    pub fn record(
        &self,
        event: &InteractionEvent,
        item: Option<&ContentItem>,
    ) -> UserInterestProfile {
        let slot = self
            .profiles
            .slot(&event.user_id, || UserInterestProfile::new(event.user_id.clone()));
        let mut profile = lock_slot(&slot);
        profile.apply(event, item, self.recent_view_window);
        log::debug!(
            "profile {} updated by {} on {}",
            event.user_id,
            event.action.as_tag(),
            event.item_id
        );
        profile.clone()
    }

    /// Snapshot of a user's profile; an empty profile for unknown users.
    ///
    /// Reads never add users to the registry.
    pub fn profile(&self, user_id: &UserId) -> UserInterestProfile {
        self.get(user_id)
            .unwrap_or_else(|| UserInterestProfile::new(user_id.clone()))
    }

    /// Snapshot of a user's profile if one exists.
    pub fn get(&self, user_id: &UserId) -> Option<UserInterestProfile> {
        let slot = self.profiles.existing(user_id)?;
        let profile = lock_slot(&slot).clone();
        Some(profile)
    }

    /// Replace a user's profile with one rebuilt from the full event log.
    pub fn rebuild(
        &self,
        user_id: &UserId,
        history: &[InteractionEvent],
        corpus: &[ContentItem],
    ) -> UserInterestProfile {
        let rebuilt = build_profile(user_id, history, corpus, self.recent_view_window);
        let slot = self
            .profiles
            .slot(user_id, || UserInterestProfile::new(user_id.clone()));
        let mut profile = lock_slot(&slot);
        *profile = rebuilt;
        profile.clone()
    }

    /// Number of users with a profile.
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

impl Default for ProfileRegistry {
    fn default() -> Self {
        Self::new(crate::config::FeedConfig::default().recent_view_window)
    }
}
