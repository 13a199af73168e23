//! User interest profiles derived from interaction events.

pub mod builder;
pub mod registry;

pub use builder::{
    action_weight, build_profile, EngagementLevel, UserInterestProfile, VotingPattern,
};
pub use registry::ProfileRegistry;
