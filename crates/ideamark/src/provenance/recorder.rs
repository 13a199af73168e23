//! Proof issuance and lifecycle.
//!
//! All writes for one subject are serialized through a per-subject lock.
//! Uniqueness across subjects (one proof per content hash) is enforced by
//! the store, so concurrent attempts on different subjects with the same
//! content still produce a single certificate.

use std::sync::Arc;

use crate::config::{DuplicatePolicy, ProvenanceConfig};
use crate::content::{ContentDraft, UserId};
use crate::error::{Result, ScoringError};
use crate::storage::ProvenanceStore;
use crate::sync::{lock_slot, KeyedLocks};

use super::certificate::Certificate;
use super::custody::{ChainOfCustodyEntry, CustodyAction};
use super::dispute::{Dispute, DisputeEvidence, DisputeId, DisputeOutcome, DisputeType};
use super::proof::{
    ContentSnapshot, OriginalityProof, ProofId, ProofOptions, SubjectId, VerificationStatus,
};
use super::verify::{self, IssueKind, ProofVerifier};
use super::witness::{Ed25519WitnessSigner, WitnessSignature, WitnessSigner};

/// Issues originality proofs and drives their status.
pub struct ProvenanceRecorder {
    store: Arc<dyn ProvenanceStore>,
    signer: Arc<dyn WitnessSigner>,
    extra_witnesses: Vec<Arc<dyn WitnessSigner>>,
    config: ProvenanceConfig,
    subject_locks: KeyedLocks<SubjectId, ()>,
}

impl ProvenanceRecorder {
    /// Create a recorder. `signer` witnesses every proof and signs certificates.
    pub fn new(
        store: Arc<dyn ProvenanceStore>,
        signer: Arc<dyn WitnessSigner>,
        config: ProvenanceConfig,
    ) -> Self {
        Self {
            store,
            signer,
            extra_witnesses: Vec::new(),
            config,
            subject_locks: KeyedLocks::new(),
        }
    }

    /// Signers available for `ProofOptions::extra_witnesses`, used in order.
    pub fn with_extra_witnesses(mut self, witnesses: Vec<Arc<dyn WitnessSigner>>) -> Self {
        self.extra_witnesses = witnesses;
        self
    }

    /// Derive `count` additional witnesses from a root signer.
    pub fn derive_witnesses(
        root: &Ed25519WitnessSigner,
        count: usize,
    ) -> Result<Vec<Arc<dyn WitnessSigner>>> {
        (0..count)
            .map(|i| root.derive(i).map(|w| Arc::new(w) as Arc<dyn WitnessSigner>))
            .collect()
    }

    pub fn config(&self) -> &ProvenanceConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn ProvenanceStore> {
        &self.store
    }

    /// Base64 public key certificates are signed with.
    pub fn issuer_key(&self) -> String {
        self.signer.public_key()
    }

    /// A verifier over the same store that trusts only this recorder's key.
    pub fn verifier(&self) -> ProofVerifier {
        ProofVerifier::new(self.store.clone()).with_trusted_issuer(self.issuer_key())
    }

    pub fn load_proof(&self, subject_id: &SubjectId) -> Result<OriginalityProof> {
        self.store
            .load_proof(subject_id)?
            .ok_or_else(|| ScoringError::NotFound(format!("proof for {subject_id}")))
    }

    /// Run `f` holding the lock for `subject_id`; the slot is dropped again
    /// once no other caller needs it.
    fn with_subject_lock<T>(
        &self,
        subject_id: &SubjectId,
        f: impl FnOnce() -> Result<T>,
    ) -> Result<T> {
        let slot = self.subject_locks.slot(subject_id, || ());
        let result = {
            let _guard = lock_slot(&slot);
            f()
        };
        drop(slot);
        self.subject_locks.evict_if_idle(subject_id);
        result
    }

    // -----------------------------------------------------------------------
    // Issuance
    // -----------------------------------------------------------------------

    /// Hash, witness, certify and persist a proof for `subject_id`.
    ///
    /// The proof is durable when this returns.
    pub fn generate_proof(
        &self,
        subject_id: &SubjectId,
        content: &ContentDraft,
        author_id: &UserId,
        options: &ProofOptions,
    ) -> Result<OriginalityProof> {
        content.validate()?;
        if subject_id.0.trim().is_empty() {
            return Err(ScoringError::Validation("subject id must not be empty".into()));
        }
        if options.extra_witnesses > self.extra_witnesses.len() {
            return Err(ScoringError::Validation(format!(
                "requested {} extra witnesses, {} available",
                options.extra_witnesses,
                self.extra_witnesses.len()
            )));
        }

        let snapshot = ContentSnapshot::from_draft(content);
        self.with_subject_lock(subject_id, || {
            self.issue_locked(subject_id, snapshot, author_id, options)
        })
    }

    fn issue_locked(
        &self,
        subject_id: &SubjectId,
        snapshot: ContentSnapshot,
        author_id: &UserId,
        options: &ProofOptions,
    ) -> Result<OriginalityProof> {
        let content_hash = snapshot.content_hash();
        if let Some(existing) = self.store.load_proof(subject_id)? {
            return self.resolve_existing(existing, &content_hash);
        }
        if let Some(holder) = self.store.subject_for_hash(&content_hash)? {
            log::warn!("refusing proof for {subject_id}: content already registered under {holder}");
            return Err(ScoringError::DuplicateProof {
                subject: subject_id.0.clone(),
                reason: format!("identical content is already registered under {holder}"),
            });
        }

        let now = crate::time::now_micros();

        let mut witness_signatures = Vec::with_capacity(1 + options.extra_witnesses);
        witness_signatures.push(WitnessSignature::create(self.signer.as_ref(), &content_hash, now));
        for witness in self.extra_witnesses.iter().take(options.extra_witnesses) {
            witness_signatures.push(WitnessSignature::create(witness.as_ref(), &content_hash, now));
        }

        let expires_at = options
            .expires_in_days
            .or(self.config.certificate_validity_days)
            .map(|days| now.saturating_add(crate::time::days_to_micros(days)));

        let genesis = ChainOfCustodyEntry::genesis(
            &content_hash,
            now,
            &author_id.0,
            &format!("proof issued by {}", self.config.issuer),
        );
        let certificate = Certificate::issue(
            self.signer.as_ref(),
            &self.config.issuer,
            subject_id,
            &content_hash,
            now,
            expires_at,
            genesis,
        );

        let proof = OriginalityProof {
            id: ProofId::derive(subject_id, &content_hash, now),
            subject_id: subject_id.clone(),
            author_id: author_id.clone(),
            content_hash,
            snapshot,
            submission_timestamp: now,
            witness_signatures,
            certificate,
            verification_status: VerificationStatus::Pending,
        };

        self.store.insert_proof(&proof)?;
        log::info!(
            "issued proof {} for {} (certificate {}, {} witness(es))",
            proof.id,
            subject_id,
            proof.certificate.id,
            proof.witness_signatures.len()
        );
        Ok(proof)
    }

    fn resolve_existing(
        &self,
        existing: OriginalityProof,
        content_hash: &str,
    ) -> Result<OriginalityProof> {
        let subject = existing.subject_id.0.clone();
        if existing.content_hash != content_hash {
            log::warn!("refusing proof for {subject}: a proof with different content exists");
            return Err(ScoringError::DuplicateProof {
                subject,
                reason: "a proof with different content already exists".into(),
            });
        }
        match self.config.duplicate_policy {
            DuplicatePolicy::ReturnExisting => {
                log::info!("proof for {subject} already exists, returning {}", existing.id);
                Ok(existing)
            }
            DuplicatePolicy::Reject => {
                log::warn!("refusing repeated proof for {subject}");
                Err(ScoringError::DuplicateProof {
                    subject,
                    reason: "a proof for identical content already exists".into(),
                })
            }
        }
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Verify the stored proof and move it from pending to verified.
    pub fn mark_verified(&self, subject_id: &SubjectId, actor: &str) -> Result<OriginalityProof> {
        self.with_subject_lock(subject_id, || self.mark_verified_locked(subject_id, actor))
    }

    fn mark_verified_locked(&self, subject_id: &SubjectId, actor: &str) -> Result<OriginalityProof> {
        let proof = self.load_proof(subject_id)?;
        let status = proof.verification_status.transition(VerificationStatus::Verified)?;

        let now = crate::time::now_micros();
        let check = verify::inspect(&proof, Some(&self.issuer_key()), now);
        if check.has_issue(IssueKind::Integrity) {
            return Err(ScoringError::Integrity {
                subject: subject_id.0.clone(),
                expected: proof.content_hash.clone(),
                actual: proof.recompute_hash(),
            });
        }
        if check.has_issue(IssueKind::CertificateExpired) {
            return Err(ScoringError::ExpiredCertificate(format!(
                "certificate {} for {subject_id}",
                proof.certificate.id
            )));
        }
        if check.has_issue(IssueKind::InvalidWitness)
            || check.has_issue(IssueKind::CertificateSignature)
        {
            return Err(ScoringError::SignatureInvalid);
        }
        if let Some(issue) = check.issues.first() {
            return Err(ScoringError::Integrity {
                subject: subject_id.0.clone(),
                expected: "intact proof".into(),
                actual: issue.message.clone(),
            });
        }

        self.append(&proof, status, CustodyAction::Verified, actor, "all checks passed", now)
    }

    /// Record that `dispute` was accepted against its original subject.
    pub fn record_dispute(&self, dispute: &Dispute) -> Result<OriginalityProof> {
        self.with_subject_lock(&dispute.original_id, || self.record_dispute_locked(dispute))
    }

    fn record_dispute_locked(&self, dispute: &Dispute) -> Result<OriginalityProof> {
        let proof = self.load_proof(&dispute.original_id)?;
        // Further disputes on a disputed proof are logged without a status change.
        let status = match proof.verification_status {
            VerificationStatus::Disputed => VerificationStatus::Disputed,
            current => current.transition(VerificationStatus::Disputed)?,
        };
        let detail = format!(
            "dispute {} opened by {} from {}",
            dispute.id, dispute.submitted_by, dispute.disputing_id
        );
        self.append(
            &proof,
            status,
            CustodyAction::Disputed,
            &dispute.submitted_by.0,
            &detail,
            crate::time::now_micros(),
        )
    }

    /// Record that the last open dispute against `subject_id` was closed.
    pub fn record_resolution(
        &self,
        subject_id: &SubjectId,
        dispute_id: &DisputeId,
        outcome: DisputeOutcome,
        resolver: &str,
    ) -> Result<OriginalityProof> {
        self.with_subject_lock(subject_id, || {
            self.record_resolution_locked(subject_id, dispute_id, outcome, resolver)
        })
    }

    fn record_resolution_locked(
        &self,
        subject_id: &SubjectId,
        dispute_id: &DisputeId,
        outcome: DisputeOutcome,
        resolver: &str,
    ) -> Result<OriginalityProof> {
        let proof = self.load_proof(subject_id)?;
        let status = proof.verification_status.transition(VerificationStatus::Resolved)?;
        let detail = format!("dispute {dispute_id} closed: {}", outcome.as_tag());
        self.append(
            &proof,
            status,
            CustodyAction::Resolved,
            resolver,
            &detail,
            crate::time::now_micros(),
        )
    }

    fn append(
        &self,
        proof: &OriginalityProof,
        status: VerificationStatus,
        action: CustodyAction,
        actor: &str,
        detail: &str,
        now: u64,
    ) -> Result<OriginalityProof> {
        let entry = proof.next_custody(action, now, actor, detail)?;
        let updated = self.store.append_custody(&proof.subject_id, entry, status)?;
        log::info!(
            "proof for {}: {} -> {}",
            proof.subject_id,
            proof.verification_status,
            updated.verification_status
        );
        Ok(updated)
    }

    // -----------------------------------------------------------------------
    // Disputes
    // -----------------------------------------------------------------------

    /// Open a dispute against the proof of `original_id` and mark it disputed.
    pub fn submit_dispute(
        &self,
        original_id: &SubjectId,
        disputing_id: &SubjectId,
        dispute_type: DisputeType,
        evidence: Vec<DisputeEvidence>,
        submitted_by: &UserId,
    ) -> Result<Dispute> {
        let dispute = Dispute::open(
            original_id,
            disputing_id,
            dispute_type,
            evidence,
            submitted_by,
            crate::time::now_micros(),
        )?;

        // Custody before the dispute record, so a stored open dispute always
        // has a disputed proof behind it.
        self.with_subject_lock(original_id, || {
            self.record_dispute_locked(&dispute)?;
            self.store.save_dispute(&dispute)
        })?;
        log::info!(
            "dispute {} ({:?}) opened against {original_id}",
            dispute.id,
            dispute.dispute_type
        );
        Ok(dispute)
    }

    /// Close a dispute with an externally decided outcome.
    ///
    /// The proof moves to resolved once no other dispute against it is open.
    pub fn resolve_dispute(
        &self,
        dispute_id: &DisputeId,
        outcome: DisputeOutcome,
        resolver: &str,
        notes: &str,
    ) -> Result<Dispute> {
        let original_id = self
            .store
            .load_dispute(dispute_id)?
            .ok_or_else(|| ScoringError::NotFound(format!("dispute {dispute_id}")))?
            .original_id;

        self.with_subject_lock(&original_id, || {
            let mut dispute = self
                .store
                .load_dispute(dispute_id)?
                .ok_or_else(|| ScoringError::NotFound(format!("dispute {dispute_id}")))?;
            dispute.resolve(outcome, resolver, notes, crate::time::now_micros())?;

            let still_open = self
                .store
                .disputes_for(&original_id)?
                .iter()
                .any(|d| d.is_open() && d.id != dispute.id);
            let proof = self.load_proof(&original_id)?;
            if still_open {
                log::info!("dispute {dispute_id} resolved; {original_id} still has open disputes");
            } else if proof.verification_status == VerificationStatus::Resolved {
                // Left behind by an earlier attempt whose dispute save failed.
                log::info!("proof for {original_id} already resolved");
            } else {
                self.record_resolution_locked(&original_id, dispute_id, outcome, resolver)?;
            }
            self.store.save_dispute(&dispute)?;
            Ok(dispute)
        })
    }

    /// All disputes filed against `subject_id`, oldest first.
    pub fn disputes_for(&self, subject_id: &SubjectId) -> Result<Vec<Dispute>> {
        self.store.disputes_for(subject_id)
    }
}
