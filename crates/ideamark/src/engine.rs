//! The scoring engine facade.
//!
//! [`ScoringCore`] wires configuration, the provenance store, the service
//! signer, an optional prior-art provider and the live profile registry,
//! and exposes the operations callers use. It holds no global state; two
//! cores over different stores are fully independent.

use std::path::Path;
use std::sync::Arc;

use crate::config::CoreConfig;
use crate::content::{ContentDraft, ContentItem, InteractionEvent, UserId};
use crate::error::Result;
use crate::originality::{OriginalityClassifier, OriginalityVerdict, PriorArtProvider};
use crate::profile::{build_profile, ProfileRegistry, UserInterestProfile};
use crate::provenance::{
    Dispute, DisputeEvidence, DisputeId, DisputeOutcome, DisputeType, Ed25519WitnessSigner,
    OriginalityProof, ProofOptions, ProofVerification, ProvenanceRecorder, SubjectId,
    WitnessSigner,
};
use crate::recommend::{self, RecommendationScore, Recommendations};
use crate::storage::{self, FileStore, MemoryStore, ProvenanceStore};

/// File name of the service key inside a data directory.
pub const SERVICE_KEY_FILE: &str = "service.key";

/// Entry point for originality checks, proofs and feeds.
pub struct ScoringCore {
    config: CoreConfig,
    classifier: OriginalityClassifier,
    recorder: ProvenanceRecorder,
    prior_art: Option<Arc<dyn PriorArtProvider>>,
    profiles: ProfileRegistry,
}

impl ScoringCore {
    /// Build a core over `store`, signing with `service_key`.
    ///
    /// `config.provenance.max_extra_witnesses` witnesses are derived from the
    /// service key for proofs that request extra attestations.
    pub fn new(
        config: CoreConfig,
        store: Arc<dyn ProvenanceStore>,
        service_key: Ed25519WitnessSigner,
    ) -> Result<Self> {
        let extra = ProvenanceRecorder::derive_witnesses(
            &service_key,
            config.provenance.max_extra_witnesses,
        )?;
        let signer: Arc<dyn WitnessSigner> = Arc::new(service_key);
        let recorder = ProvenanceRecorder::new(store, signer, config.provenance.clone())
            .with_extra_witnesses(extra);

        Ok(Self {
            classifier: OriginalityClassifier::new(config.originality.clone()),
            profiles: ProfileRegistry::new(config.feed.recent_view_window),
            recorder,
            prior_art: None,
            config,
        })
    }

    /// Open a durable core rooted at `data_dir`, creating the directory
    /// layout and the service key on first use.
    pub fn open(data_dir: &Path, config: CoreConfig) -> Result<Self> {
        let service_key = storage::load_or_create_service_key(&data_dir.join(SERVICE_KEY_FILE))?;
        let store = FileStore::new(data_dir)?;
        log::debug!("opened scoring core at {}", data_dir.display());
        Self::new(config, Arc::new(store), service_key)
    }

    /// A core backed by memory with a freshly generated service key.
    pub fn in_memory(config: CoreConfig) -> Result<Self> {
        Self::new(
            config,
            Arc::new(MemoryStore::new()),
            Ed25519WitnessSigner::generate(),
        )
    }

    /// Consult `provider` during originality checks.
    pub fn with_prior_art(mut self, provider: Arc<dyn PriorArtProvider>) -> Self {
        self.prior_art = Some(provider);
        self
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    pub fn recorder(&self) -> &ProvenanceRecorder {
        &self.recorder
    }

    pub fn profiles(&self) -> &ProfileRegistry {
        &self.profiles
    }

    // ── Originality ──────────────────────────────────────────────────────────

    /// Classify `candidate` against `corpus`, with prior art when a provider
    /// is configured.
    pub async fn check_originality(
        &self,
        candidate: &ContentDraft,
        corpus: &[ContentItem],
    ) -> Result<OriginalityVerdict> {
        self.classifier
            .check(candidate, corpus, self.prior_art.as_deref())
            .await
    }

    // ── Provenance ───────────────────────────────────────────────────────────

    pub fn generate_proof(
        &self,
        subject_id: &SubjectId,
        content: &ContentDraft,
        author_id: &UserId,
        options: &ProofOptions,
    ) -> Result<OriginalityProof> {
        self.recorder
            .generate_proof(subject_id, content, author_id, options)
    }

    /// Re-check a stored proof. Never modifies it.
    pub fn verify_proof(&self, subject_id: &SubjectId) -> Result<ProofVerification> {
        self.recorder.verifier().verify(subject_id)
    }

    /// Like [`verify_proof`](Self::verify_proof) at a fixed instant.
    pub fn verify_proof_at(&self, subject_id: &SubjectId, now: u64) -> Result<ProofVerification> {
        self.recorder.verifier().verify_at(subject_id, now)
    }

    pub fn load_proof(&self, subject_id: &SubjectId) -> Result<OriginalityProof> {
        self.recorder.load_proof(subject_id)
    }

    pub fn mark_verified(&self, subject_id: &SubjectId, actor: &str) -> Result<OriginalityProof> {
        self.recorder.mark_verified(subject_id, actor)
    }

    pub fn submit_dispute(
        &self,
        original_id: &SubjectId,
        disputing_id: &SubjectId,
        dispute_type: DisputeType,
        evidence: Vec<DisputeEvidence>,
        submitted_by: &UserId,
    ) -> Result<Dispute> {
        self.recorder
            .submit_dispute(original_id, disputing_id, dispute_type, evidence, submitted_by)
    }

    pub fn resolve_dispute(
        &self,
        dispute_id: &DisputeId,
        outcome: DisputeOutcome,
        resolver: &str,
        notes: &str,
    ) -> Result<Dispute> {
        self.recorder
            .resolve_dispute(dispute_id, outcome, resolver, notes)
    }

    pub fn disputes_for(&self, subject_id: &SubjectId) -> Result<Vec<Dispute>> {
        self.recorder.disputes_for(subject_id)
    }

    // ── Profiles & feeds ─────────────────────────────────────────────────────

    /// Fold one interaction into the live profile of its user.
    pub fn record_interaction(
        &self,
        event: &InteractionEvent,
        item: Option<&ContentItem>,
    ) -> UserInterestProfile {
        self.profiles.record(event, item)
    }

    /// Snapshot of a user's live profile.
    pub fn profile(&self, user_id: &UserId) -> UserInterestProfile {
        self.profiles.profile(user_id)
    }

    /// Rank the four facets for `user_id`.
    ///
    /// A non-empty `history` is folded into a transient profile; otherwise
    /// the live profile is used. Nothing is recorded either way.
    pub fn compute_recommendations(
        &self,
        user_id: &UserId,
        corpus: &[ContentItem],
        history: &[InteractionEvent],
        now: u64,
    ) -> Recommendations {
        let profile = self.profile_for(user_id, corpus, history);
        recommend::compute_recommendations(&profile, corpus, now, &self.config.feed)
    }

    /// Trending items for `user_id`, skipping those they voted on.
    pub fn trending(
        &self,
        user_id: &UserId,
        corpus: &[ContentItem],
        history: &[InteractionEvent],
        now: u64,
    ) -> Vec<RecommendationScore> {
        let profile = self.profile_for(user_id, corpus, history);
        recommend::rank_trending(
            corpus,
            &profile,
            now,
            self.config.feed.trending_window_days,
            self.config.feed.facet_size,
        )
    }

    fn profile_for(
        &self,
        user_id: &UserId,
        corpus: &[ContentItem],
        history: &[InteractionEvent],
    ) -> UserInterestProfile {
        if history.is_empty() {
            self.profiles
                .get(user_id)
                .unwrap_or_else(|| UserInterestProfile::new(user_id.clone()))
        } else {
            build_profile(user_id, history, corpus, self.config.feed.recent_view_window)
        }
    }
}
