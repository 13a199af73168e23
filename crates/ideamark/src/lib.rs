//! Ideamark: content scoring core for an idea-sharing platform.
//!
//! Provides lexical originality checks against a corpus, signed and
//! witnessed proofs of submission with an append-only chain of custody,
//! dispute handling, per-user interest profiles, and personalized feed
//! ranking.

pub mod config;
pub mod content;
pub mod crypto;
pub mod engine;
pub mod error;
pub mod originality;
pub mod profile;
pub mod provenance;
pub mod recommend;
pub mod similarity;
pub mod storage;
pub mod sync;
pub mod time;

// Re-export primary types
pub use engine::ScoringCore;
pub use config::{CoreConfig, DuplicatePolicy, FeedConfig, OriginalityConfig, ProvenanceConfig};
pub use content::{
    ContentDraft, ContentId, ContentItem, EngagementCounters, InteractionAction, InteractionEvent,
    UserId,
};
pub use error::{Result, ScoringError};

// Re-export originality types
pub use originality::{
    Classification, DisabledPriorArtProvider, KeywordPriorArtProvider, OriginalityClassifier,
    OriginalityVerdict, PriorArtLookup, PriorArtProvider, PriorArtRef, PriorArtSource,
};
pub use similarity::SimilarityResult;

// Re-export provenance types
pub use provenance::{
    Certificate, ChainOfCustodyEntry, CustodyAction, Dispute, DisputeEvidence, DisputeId,
    DisputeOutcome, DisputeStatus, DisputeType, OriginalityProof, ProofOptions, ProofVerification,
    SubjectId, VerificationIssue, VerificationStatus,
};
pub use storage::{FileStore, MemoryStore, ProvenanceStore};

// Re-export feed types
pub use profile::{ProfileRegistry, UserInterestProfile};
pub use recommend::{RecommendationScore, Recommendations};
