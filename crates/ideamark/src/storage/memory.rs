//! In-memory provenance store.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::{Result, ScoringError};
use crate::provenance::{
    ChainOfCustodyEntry, Dispute, DisputeId, OriginalityProof, SubjectId, VerificationStatus,
};

use super::ProvenanceStore;

#[derive(Default)]
struct State {
    proofs: HashMap<SubjectId, OriginalityProof>,
    by_hash: HashMap<String, SubjectId>,
    disputes: HashMap<DisputeId, Dispute>,
}

/// Map-backed store. Both uniqueness checks and the insert happen under
/// one write lock.
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn proof_count(&self) -> usize {
        self.read().proofs.len()
    }

    fn read(&self) -> RwLockReadGuard<'_, State> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, State> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ProvenanceStore for MemoryStore {
    fn insert_proof(&self, proof: &OriginalityProof) -> Result<()> {
        let mut state = self.write();

        if state.proofs.contains_key(&proof.subject_id) {
            return Err(ScoringError::DuplicateProof {
                subject: proof.subject_id.0.clone(),
                reason: "a proof is already stored for this subject".into(),
            });
        }
        if let Some(holder) = state.by_hash.get(&proof.content_hash) {
            return Err(ScoringError::DuplicateProof {
                subject: proof.subject_id.0.clone(),
                reason: format!("identical content is already registered under {holder}"),
            });
        }

        state
            .by_hash
            .insert(proof.content_hash.clone(), proof.subject_id.clone());
        state.proofs.insert(proof.subject_id.clone(), proof.clone());
        Ok(())
    }

    fn load_proof(&self, subject_id: &SubjectId) -> Result<Option<OriginalityProof>> {
        Ok(self.read().proofs.get(subject_id).cloned())
    }

    fn subject_for_hash(&self, content_hash: &str) -> Result<Option<SubjectId>> {
        Ok(self.read().by_hash.get(content_hash).cloned())
    }

    fn append_custody(
        &self,
        subject_id: &SubjectId,
        entry: ChainOfCustodyEntry,
        status: VerificationStatus,
    ) -> Result<OriginalityProof> {
        let mut state = self.write();
        let proof = state
            .proofs
            .get_mut(subject_id)
            .ok_or_else(|| ScoringError::NotFound(format!("proof for {subject_id}")))?;
        proof.apply_custody(entry, status)?;
        Ok(proof.clone())
    }

    fn list_proofs(&self) -> Result<Vec<SubjectId>> {
        let mut ids: Vec<SubjectId> = self.read().proofs.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }

    fn save_dispute(&self, dispute: &Dispute) -> Result<()> {
        self.write()
            .disputes
            .insert(dispute.id.clone(), dispute.clone());
        Ok(())
    }

    fn load_dispute(&self, id: &DisputeId) -> Result<Option<Dispute>> {
        Ok(self.read().disputes.get(id).cloned())
    }

    fn disputes_for(&self, subject_id: &SubjectId) -> Result<Vec<Dispute>> {
        let mut disputes: Vec<Dispute> = self
            .read()
            .disputes
            .values()
            .filter(|d| &d.original_id == subject_id)
            .cloned()
            .collect();
        disputes.sort_by(|a, b| a.submitted_at.cmp(&b.submitted_at).then_with(|| a.id.cmp(&b.id)));
        Ok(disputes)
    }
}
