//! Originality proofs: hashing, witnesses, certificates, custody and disputes.

pub mod certificate;
pub mod custody;
pub mod dispute;
pub mod hash;
pub mod proof;
pub mod recorder;
pub mod verify;
pub mod witness;

pub use certificate::{Certificate, CertificateId};
pub use custody::{verify_custody, ChainOfCustodyEntry, CustodyAction};
pub use dispute::{
    Dispute, DisputeEvidence, DisputeId, DisputeOutcome, DisputeStatus, DisputeType,
};
pub use hash::content_hash;
pub use proof::{
    ContentSnapshot, OriginalityProof, ProofId, ProofOptions, SubjectId, VerificationStatus,
};
pub use recorder::ProvenanceRecorder;
pub use verify::{inspect, IssueKind, ProofVerification, ProofVerifier, VerificationIssue};
pub use witness::{Ed25519WitnessSigner, WitnessId, WitnessSignature, WitnessSigner};
