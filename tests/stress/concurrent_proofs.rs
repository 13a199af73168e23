//! Stress test: concurrent proof generation must produce at most one
//! certificate per subject and per content hash.

use std::collections::HashSet;
use std::sync::{Arc, Barrier};
use std::thread;

use ideamark::{
    ContentDraft, CoreConfig, DuplicatePolicy, ProofOptions, ScoringCore, ScoringError, SubjectId,
    UserId,
};

fn draft(n: usize) -> ContentDraft {
    ContentDraft::new(format!("Idea {n}"), format!("Description of idea {n}"), &["stress"])
}

#[test]
fn stress_same_subject_16_threads_one_certificate() {
    let dir = tempfile::tempdir().unwrap();
    let core = Arc::new(ScoringCore::open(dir.path(), CoreConfig::default()).unwrap());
    let barrier = Arc::new(Barrier::new(16));

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let core = Arc::clone(&core);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                core.generate_proof(
                    &SubjectId::new("contested"),
                    &draft(0),
                    &UserId::new("author"),
                    &ProofOptions::default(),
                )
                .expect("identical requests return the stored proof")
            })
        })
        .collect();

    let certificates: HashSet<String> = handles
        .into_iter()
        .map(|h| h.join().unwrap().certificate.id.0)
        .collect();
    assert_eq!(certificates.len(), 1, "all callers must see the same certificate");
    assert!(core.verify_proof(&SubjectId::new("contested")).unwrap().is_valid);
}

#[test]
fn stress_same_content_many_subjects_one_winner() {
    let dir = tempfile::tempdir().unwrap();
    let core = Arc::new(ScoringCore::open(dir.path(), CoreConfig::default()).unwrap());
    let barrier = Arc::new(Barrier::new(12));

    let handles: Vec<_> = (0..12)
        .map(|i| {
            let core = Arc::clone(&core);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                core.generate_proof(
                    &SubjectId::new(format!("copy-{i}")),
                    &draft(7),
                    &UserId::new(format!("author-{i}")),
                    &ProofOptions::default(),
                )
            })
        })
        .collect();

    let mut winners = 0;
    for handle in handles {
        match handle.join().unwrap() {
            Ok(_) => winners += 1,
            Err(ScoringError::DuplicateProof { .. }) => {}
            Err(e) => panic!("unexpected error: {e}"),
        }
    }
    assert_eq!(winners, 1, "exactly one subject may hold the content hash");
    assert_eq!(core.recorder().store().list_proofs().unwrap().len(), 1);
}

#[test]
fn stress_reject_policy_under_contention() {
    let mut config = CoreConfig::default();
    config.provenance.duplicate_policy = DuplicatePolicy::Reject;
    let core = Arc::new(ScoringCore::in_memory(config).unwrap());
    let barrier = Arc::new(Barrier::new(8));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let core = Arc::clone(&core);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                core.generate_proof(
                    &SubjectId::new("only-once"),
                    &draft(1),
                    &UserId::new("author"),
                    &ProofOptions::default(),
                )
                .is_ok()
            })
        })
        .collect();

    let successes = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|ok| *ok)
        .count();
    assert_eq!(successes, 1);
}

#[test]
fn stress_distinct_subjects_in_parallel() {
    let dir = tempfile::tempdir().unwrap();
    let core = Arc::new(ScoringCore::open(dir.path(), CoreConfig::default()).unwrap());

    let handles: Vec<_> = (0..8)
        .map(|t| {
            let core = Arc::clone(&core);
            thread::spawn(move || {
                for i in 0..25 {
                    let n = t * 100 + i;
                    core.generate_proof(
                        &SubjectId::new(format!("idea-{n}")),
                        &draft(n),
                        &UserId::new("author"),
                        &ProofOptions {
                            extra_witnesses: 2,
                            expires_in_days: None,
                        },
                    )
                    .expect("distinct content must succeed");
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let subjects = core.recorder().store().list_proofs().unwrap();
    assert_eq!(subjects.len(), 200);
    for subject in &subjects {
        let verification = core.verify_proof(subject).unwrap();
        assert!(verification.is_valid, "{subject} should verify");
        assert_eq!(core.load_proof(subject).unwrap().witness_signatures.len(), 3);
    }
}
