//! Proof persistence as JSON files.
//!
//! Each proof is stored as `proofs/{subject_id}.json`, each dispute as
//! `disputes/{dispute_id}.json`. `by-hash/{content_hash}` holds the subject
//! id that owns a content hash.
//!
//! File format:
//! ```json
//! {
//!     "version": 1,
//!     "proof": { ... OriginalityProof ... }
//! }
//! ```
//!
//! New proofs are written to a synced temp file and then hard-linked into
//! place, so a proof file either does not exist or is complete, and two
//! writers can never both create it. The hash index is claimed first with
//! `create_new`. Updates use a synced temp file and `rename`.
//!
//! A crash between claiming the hash index and linking the proof leaves an
//! orphan `by-hash` entry: the same content then reports `DuplicateProof`
//! naming a subject without a proof until the entry is removed by hand.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::crypto::random;
use crate::error::{Result, ScoringError};
use crate::provenance::{
    ChainOfCustodyEntry, Dispute, DisputeId, OriginalityProof, SubjectId, VerificationStatus,
};

use super::ProvenanceStore;

// ── File format constants ─────────────────────────────────────────────────────

const PROOF_FILE_VERSION: u32 = 1;
const DISPUTE_FILE_VERSION: u32 = 1;

// ── On-disk structures ────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
struct ProofFile {
    version: u32,
    proof: OriginalityProof,
}

#[derive(Debug, Serialize, Deserialize)]
struct DisputeFile {
    version: u32,
    dispute: Dispute,
}

// ── FileStore ─────────────────────────────────────────────────────────────────

/// Filesystem-backed provenance store.
///
/// Proof creation is safe across threads and processes. Custody appends
/// for one subject must be serialized by the caller, which
/// `ProvenanceRecorder` does within a process.
pub struct FileStore {
    base_dir: PathBuf,
}

impl FileStore {
    /// Create a store rooted at `base_dir`, creating the directory tree.
    ///
    /// # Errors
    ///
    /// Returns `ScoringError::Io` if a directory cannot be created.
    pub fn new(base_dir: impl Into<PathBuf>) -> Result<Self> {
        let store = Self {
            base_dir: base_dir.into(),
        };
        std::fs::create_dir_all(store.proofs_dir())?;
        std::fs::create_dir_all(store.hash_dir())?;
        std::fs::create_dir_all(store.disputes_dir())?;
        Ok(store)
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    // ── Internal helpers ──────────────────────────────────────────────────────

    fn proofs_dir(&self) -> PathBuf {
        self.base_dir.join("proofs")
    }

    fn hash_dir(&self) -> PathBuf {
        self.base_dir.join("by-hash")
    }

    fn disputes_dir(&self) -> PathBuf {
        self.base_dir.join("disputes")
    }

    fn proof_path(&self, subject_id: &SubjectId) -> Result<PathBuf> {
        Ok(self
            .proofs_dir()
            .join(format!("{}.json", file_name(&subject_id.0)?)))
    }

    fn hash_path(&self, content_hash: &str) -> Result<PathBuf> {
        if content_hash.is_empty() || !content_hash.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ScoringError::Validation(format!(
                "content hash is not hex: {content_hash}"
            )));
        }
        Ok(self.hash_dir().join(content_hash))
    }

    fn dispute_path(&self, id: &DisputeId) -> Result<PathBuf> {
        Ok(self
            .disputes_dir()
            .join(format!("{}.json", file_name(&id.0)?)))
    }

    fn claim_and_link(&self, proof: &OriginalityProof, tmp: &Path) -> Result<()> {
        let subject = &proof.subject_id;
        let proof_path = self.proof_path(subject)?;
        if proof_path.exists() {
            return Err(duplicate_subject(subject));
        }

        let hash_path = self.hash_path(&proof.content_hash)?;
        match OpenOptions::new().write(true).create_new(true).open(&hash_path) {
            Ok(mut file) => {
                file.write_all(subject.0.as_bytes())?;
                file.sync_all()?;
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                let holder = std::fs::read_to_string(&hash_path).unwrap_or_default();
                return Err(ScoringError::DuplicateProof {
                    subject: subject.0.clone(),
                    reason: format!("identical content is already registered under {holder}"),
                });
            }
            Err(e) => return Err(e.into()),
        }

        if let Err(e) = std::fs::hard_link(tmp, &proof_path) {
            // Release the hash claim so the content can be registered later.
            if let Err(cleanup) = std::fs::remove_file(&hash_path) {
                log::warn!("failed to release hash claim {}: {cleanup}", hash_path.display());
            }
            return Err(if e.kind() == std::io::ErrorKind::AlreadyExists {
                duplicate_subject(subject)
            } else {
                e.into()
            });
        }
        Ok(())
    }

    fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        serde_json::from_slice(&bytes).map(Some).map_err(|e| {
            ScoringError::InvalidFileFormat(format!("failed to parse {}: {e}", path.display()))
        })
    }

    fn load_dispute_file(path: &Path) -> Result<Option<Dispute>> {
        let Some(file) = Self::read_json::<DisputeFile>(path)? else {
            return Ok(None);
        };
        check_version(file.version, DISPUTE_FILE_VERSION, path)?;
        Ok(Some(file.dispute))
    }
}

impl ProvenanceStore for FileStore {
    fn insert_proof(&self, proof: &OriginalityProof) -> Result<()> {
        let name = file_name(&proof.subject_id.0)?;
        let json = to_json(&ProofFile {
            version: PROOF_FILE_VERSION,
            proof: proof.clone(),
        })?;

        let tmp = temp_path(&self.proofs_dir(), name);
        write_synced(&tmp, json.as_bytes())?;
        let result = self.claim_and_link(proof, &tmp);
        if let Err(e) = std::fs::remove_file(&tmp) {
            log::warn!("failed to remove temp file {}: {e}", tmp.display());
        }
        result
    }

    fn load_proof(&self, subject_id: &SubjectId) -> Result<Option<OriginalityProof>> {
        let path = self.proof_path(subject_id)?;
        let Some(file) = Self::read_json::<ProofFile>(&path)? else {
            return Ok(None);
        };
        check_version(file.version, PROOF_FILE_VERSION, &path)?;
        Ok(Some(file.proof))
    }

    fn subject_for_hash(&self, content_hash: &str) -> Result<Option<SubjectId>> {
        let path = self.hash_path(content_hash)?;
        match std::fs::read_to_string(&path) {
            Ok(subject) => Ok(Some(SubjectId(subject.trim().to_string()))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn append_custody(
        &self,
        subject_id: &SubjectId,
        entry: ChainOfCustodyEntry,
        status: VerificationStatus,
    ) -> Result<OriginalityProof> {
        let mut proof = self
            .load_proof(subject_id)?
            .ok_or_else(|| ScoringError::NotFound(format!("proof for {subject_id}")))?;
        proof.apply_custody(entry, status)?;

        let json = to_json(&ProofFile {
            version: PROOF_FILE_VERSION,
            proof: proof.clone(),
        })?;
        replace_synced(&self.proof_path(subject_id)?, json.as_bytes())?;
        Ok(proof)
    }

    fn list_proofs(&self) -> Result<Vec<SubjectId>> {
        let mut ids = Vec::new();
        for entry in std::fs::read_dir(self.proofs_dir())? {
            let entry = entry?;
            let name = entry.file_name();
            let name_str = name.to_string_lossy();
            if name_str.starts_with('.') {
                continue;
            }
            if let Some(stem) = name_str.strip_suffix(".json") {
                ids.push(SubjectId(stem.to_string()));
            }
        }
        ids.sort();
        Ok(ids)
    }

    fn save_dispute(&self, dispute: &Dispute) -> Result<()> {
        let json = to_json(&DisputeFile {
            version: DISPUTE_FILE_VERSION,
            dispute: dispute.clone(),
        })?;
        replace_synced(&self.dispute_path(&dispute.id)?, json.as_bytes())
    }

    fn load_dispute(&self, id: &DisputeId) -> Result<Option<Dispute>> {
        Self::load_dispute_file(&self.dispute_path(id)?)
    }

    fn disputes_for(&self, subject_id: &SubjectId) -> Result<Vec<Dispute>> {
        let mut disputes = Vec::new();
        for entry in std::fs::read_dir(self.disputes_dir())? {
            let path = entry?.path();
            let is_json = path.extension().is_some_and(|ext| ext == "json");
            let hidden = path
                .file_name()
                .is_some_and(|n| n.to_string_lossy().starts_with('.'));
            if !is_json || hidden {
                continue;
            }
            if let Some(dispute) = Self::load_dispute_file(&path)? {
                if &dispute.original_id == subject_id {
                    disputes.push(dispute);
                }
            }
        }
        disputes.sort_by(|a, b| a.submitted_at.cmp(&b.submitted_at).then_with(|| a.id.cmp(&b.id)));
        Ok(disputes)
    }
}

// ── Free helpers ──────────────────────────────────────────────────────────────

/// Reject names that could escape the store directory or collide with
/// temp files.
fn file_name(name: &str) -> Result<&str> {
    let bad = name.is_empty()
        || name.starts_with('.')
        || name.contains(['/', '\\', '\0'])
        || name.contains("..");
    if bad {
        return Err(ScoringError::Validation(format!(
            "identifier cannot be used as a file name: {name:?}"
        )));
    }
    Ok(name)
}

fn duplicate_subject(subject: &SubjectId) -> ScoringError {
    ScoringError::DuplicateProof {
        subject: subject.0.clone(),
        reason: "a proof is already stored for this subject".into(),
    }
}

fn check_version(found: u32, expected: u32, path: &Path) -> Result<()> {
    if found != expected {
        return Err(ScoringError::InvalidFileFormat(format!(
            "unsupported version {found} in {}",
            path.display()
        )));
    }
    Ok(())
}

fn to_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(|e| ScoringError::Serialization(e.to_string()))
}

fn temp_path(dir: &Path, stem: &str) -> PathBuf {
    let nonce = hex::encode(random::random_nonce_16());
    dir.join(format!(".{stem}.{nonce}.tmp"))
}

fn write_synced(path: &Path, data: &[u8]) -> Result<()> {
    let mut file = File::create(path)?;
    file.write_all(data)?;
    file.sync_all()?;
    Ok(())
}

/// Write `data` to `path` via a synced sibling temp file and `rename`.
fn replace_synced(path: &Path, data: &[u8]) -> Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let tmp = temp_path(dir, &stem);
    write_synced(&tmp, data)?;
    if let Err(e) = std::fs::rename(&tmp, path) {
        if let Err(cleanup) = std::fs::remove_file(&tmp) {
            log::warn!("failed to remove temp file {}: {cleanup}", tmp.display());
        }
        return Err(e.into());
    }
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
