//! Storage for proofs, disputes and the service key.
//!
//! The recorder and verifier depend only on the [`ProvenanceStore`] trait.
//! Two implementations ship: [`MemoryStore`] for tests and embedding, and
//! [`FileStore`] for durable JSON-file persistence.
//!
//! # Directory layout
//!
//! By convention the default root is `~/.ideamark/`:
//!
//! ```text
//! ~/.ideamark/
//! ├── service.key
//! ├── proofs/
//! │   └── {subject_id}.json
//! ├── by-hash/
//! │   └── {content_hash}
//! └── disputes/
//!     └── {dispute_id}.json
//! ```
//!
//! # Modules
//!
//! - [`file_store`]: JSON files with a hard-link uniqueness index.
//! - [`memory`]: map-backed store guarded by a single `RwLock`.
//! - [`key_file`]: load or create the base64 service key.

pub mod file_store;
pub mod key_file;
pub mod memory;

pub use file_store::FileStore;
pub use key_file::load_or_create_service_key;
pub use memory::MemoryStore;

use crate::error::Result;
use crate::provenance::{
    ChainOfCustodyEntry, Dispute, DisputeId, OriginalityProof, SubjectId, VerificationStatus,
};

/// Persistence for proofs and disputes.
///
/// Implementations must make `insert_proof` atomic with respect to both
/// keys: at most one proof per subject and at most one subject per content
/// hash, even under concurrent callers.
pub trait ProvenanceStore: Send + Sync {
    /// Persist a new proof. Fails with `DuplicateProof` if the subject or the
    /// content hash is already taken. Durable on return.
    fn insert_proof(&self, proof: &OriginalityProof) -> Result<()>;

    fn load_proof(&self, subject_id: &SubjectId) -> Result<Option<OriginalityProof>>;

    /// Subject currently holding `content_hash`, if any.
    fn subject_for_hash(&self, content_hash: &str) -> Result<Option<SubjectId>>;

    /// Append a custody entry and set the status, returning the updated proof.
    ///
    /// Fails with `NotFound` for an unknown subject and `Storage` if the
    /// entry does not extend the stored chain head.
    fn append_custody(
        &self,
        subject_id: &SubjectId,
        entry: ChainOfCustodyEntry,
        status: VerificationStatus,
    ) -> Result<OriginalityProof>;

    /// Subjects with a stored proof, sorted.
    fn list_proofs(&self) -> Result<Vec<SubjectId>>;

    /// Insert or replace a dispute.
    fn save_dispute(&self, dispute: &Dispute) -> Result<()>;

    fn load_dispute(&self, id: &DisputeId) -> Result<Option<Dispute>>;

    /// Disputes whose original subject is `subject_id`, oldest first.
    fn disputes_for(&self, subject_id: &SubjectId) -> Result<Vec<Dispute>>;
}
