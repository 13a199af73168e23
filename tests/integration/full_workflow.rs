//! Integration test: full end-to-end workflow.
//!
//! Tests the complete lifecycle:
//! 1. Check drafts for originality against a corpus
//! 2. Issue proofs of submission and reissue idempotently
//! 3. Verify, tamper, and re-verify proofs on disk
//! 4. Dispute a proof and resolve the dispute
//! 5. Build profiles from interactions and rank feeds

use std::sync::Arc;

use ideamark::provenance::{verify_custody, CustodyAction, IssueKind};
use ideamark::time::MICROS_PER_DAY;
use ideamark::{
    ContentDraft, ContentId, ContentItem, CoreConfig, DisputeEvidence, DisputeOutcome,
    DisputeType, EngagementCounters, InteractionAction, InteractionEvent, KeywordPriorArtProvider,
    ProofOptions, ScoringCore, ScoringError, SubjectId, UserId, VerificationStatus,
};

const NOW: u64 = 1_000 * MICROS_PER_DAY;

fn item(id: &str, title: &str, description: &str, category: &str, tags: &[&str]) -> ContentItem {
    ContentItem {
        id: ContentId::new(id),
        title: title.into(),
        description: description.into(),
        category: category.into(),
        tags: tags.iter().map(|t| t.to_string()).collect(),
        author_id: UserId::new("someone-else"),
        created_at: NOW - MICROS_PER_DAY,
        counters: EngagementCounters {
            upvotes: 4,
            downvotes: 1,
            comment_count: 1,
            view_count: 20,
        },
        novelty_score: None,
    }
}

#[tokio::test]
async fn originality_scenarios() {
    let core = ScoringCore::in_memory(CoreConfig::default()).expect("core should open");

    // ── Empty corpus: trivially original ────────────────────────────────
    let verdict = core
        .check_originality(&ContentDraft::new("X", "Y", &[]), &[])
        .await
        .expect("check should succeed");
    assert!(verdict.is_original());
    assert_eq!(verdict.similarity_score, 0.0);
    assert!(verdict.similar_ideas.is_empty());

    // ── Shared title and tags: duplicate ────────────────────────────────
    let corpus = vec![item(
        "garden-1",
        "Smart Garden",
        "automated watering",
        "Home",
        &["iot", "garden"],
    )];
    let second = ContentDraft::new("Smart Garden", "automated watering system", &["iot", "garden"]);
    let verdict = core
        .check_originality(&second, &corpus)
        .await
        .expect("check should succeed");
    assert!(!verdict.is_original());
    assert!(verdict.similarity_score > 70.0);
    assert_eq!(verdict.similar_ideas[0].item_b, ContentId::new("garden-1"));
    assert!(verdict
        .similar_ideas[0]
        .matching_elements
        .iter()
        .any(|m| m.contains("garden")));

    // ── Similarity is symmetric ─────────────────────────────────────────
    let a = ContentDraft::new("Solar kettle", "boils water fast", &["energy"]);
    let b = ContentDraft::new("Kettle", "solar water heater", &["energy", "home"]);
    let ab = ideamark::similarity::compare(&a, &b).similarity;
    let ba = ideamark::similarity::compare(&b, &a).similarity;
    assert_eq!(ab, ba);
}

#[tokio::test]
async fn prior_art_is_reported_with_verdict() {
    let core = ScoringCore::in_memory(CoreConfig::default())
        .expect("core should open")
        .with_prior_art(Arc::new(KeywordPriorArtProvider::default()));
    let verdict = core
        .check_originality(
            &ContentDraft::new("Blockchain receipts", "ledger for coffee shops", &[]),
            &[],
        )
        .await
        .expect("check should succeed");
    assert!(verdict.is_original());
    assert!(!verdict.is_partial());
    assert_eq!(verdict.prior_art.len(), 1);
    assert!(verdict
        .recommended_actions
        .iter()
        .any(|a| a.contains("prior art")));
}

#[test]
fn proof_lifecycle_on_disk() {
    let dir = tempfile::tempdir().expect("tempdir");
    let core = ScoringCore::open(dir.path(), CoreConfig::default()).expect("core should open");
    let subject = SubjectId::new("idea-42");
    let draft = ContentDraft::new("Title", "Desc", &["a", "b"]);
    let author = UserId::new("user-1");

    // ── Issue, then reissue idempotently ────────────────────────────────
    let first = core
        .generate_proof(&subject, &draft, &author, &ProofOptions::default())
        .expect("first proof");
    let again = core
        .generate_proof(&subject, &draft, &author, &ProofOptions::default())
        .expect("second call returns the stored proof");
    assert_eq!(first.id, again.id);
    assert_eq!(first.content_hash, again.content_hash);
    assert_eq!(first.certificate.id, again.certificate.id);

    // Tag order does not change the hash.
    let reordered = ContentDraft::new("Title", "Desc", &["b", "a"]);
    let err = core
        .generate_proof(
            &SubjectId::new("idea-43"),
            &reordered,
            &author,
            &ProofOptions::default(),
        )
        .expect_err("same content under another subject is a duplicate");
    assert!(matches!(err, ScoringError::DuplicateProof { .. }));

    // ── Verify and promote ──────────────────────────────────────────────
    let verification = core.verify_proof(&subject).expect("verify");
    assert!(verification.is_valid);
    assert_eq!(verification.confidence, 100);

    let verified = core.mark_verified(&subject, "moderator").expect("mark verified");
    assert_eq!(verified.verification_status, VerificationStatus::Verified);
    assert_eq!(verified.custody().len(), 2);
    verify_custody(verified.custody(), &verified.content_hash).expect("custody links");

    // ── Corrupt the stored hash on disk ─────────────────────────────────
    let path = dir.path().join("proofs").join("idea-42.json");
    let mut file: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).expect("read proof")).expect("json");
    file["proof"]["content_hash"] = serde_json::Value::String("0".repeat(64));
    std::fs::write(&path, serde_json::to_string_pretty(&file).expect("json")).expect("write");

    let tampered = core.verify_proof(&subject).expect("verification reports, never fails");
    assert!(!tampered.is_valid);
    assert!(tampered.has_issue(IssueKind::Integrity));
    assert!(tampered.confidence <= 70);

    // ── Missing proof is reported as data ───────────────────────────────
    let missing = core.verify_proof(&SubjectId::new("nope")).expect("verify");
    assert!(!missing.is_valid);
    assert_eq!(missing.confidence, 50);
}

#[test]
fn dispute_lifecycle() {
    let dir = tempfile::tempdir().expect("tempdir");
    let core = ScoringCore::open(dir.path(), CoreConfig::default()).expect("core should open");
    let original = SubjectId::new("idea-1");
    let copy = SubjectId::new("idea-2");

    core.generate_proof(
        &original,
        &ContentDraft::new("Smart Garden", "automated watering", &["iot"]),
        &UserId::new("alice"),
        &ProofOptions::default(),
    )
    .expect("proof");
    core.mark_verified(&original, "moderator").expect("verified");

    let dispute = core
        .submit_dispute(
            &original,
            &copy,
            DisputeType::Plagiarism,
            vec![DisputeEvidence::new("posted the same idea a week earlier")
                .with_reference("https://example.org/post/1")],
            &UserId::new("bob"),
        )
        .expect("dispute");
    assert!(dispute.id.0.starts_with("odsp_"));
    assert!(dispute.is_open());
    assert_eq!(
        core.load_proof(&original).expect("proof").verification_status,
        VerificationStatus::Disputed
    );

    let resolved = core
        .resolve_dispute(&dispute.id, DisputeOutcome::OriginalUpheld, "panel", "earlier draft")
        .expect("resolve");
    assert!(!resolved.is_open());

    let proof = core.load_proof(&original).expect("proof");
    assert_eq!(proof.verification_status, VerificationStatus::Resolved);
    let actions: Vec<CustodyAction> = proof.custody().iter().map(|e| e.action).collect();
    assert_eq!(
        actions,
        vec![
            CustodyAction::Created,
            CustodyAction::Verified,
            CustodyAction::Disputed,
            CustodyAction::Resolved
        ]
    );
    verify_custody(proof.custody(), &proof.content_hash).expect("custody links");

    // Resolved proofs stay valid and cannot be disputed again.
    assert!(core.verify_proof(&original).expect("verify").is_valid);
    let err = core
        .submit_dispute(
            &original,
            &copy,
            DisputeType::Attribution,
            vec![DisputeEvidence::new("again")],
            &UserId::new("bob"),
        )
        .expect_err("resolved proofs are final");
    assert!(matches!(err, ScoringError::InvalidTransition { .. }));

    // Disputes survive a reopen.
    drop(core);
    let reopened = ScoringCore::open(dir.path(), CoreConfig::default()).expect("reopen");
    assert_eq!(reopened.disputes_for(&original).expect("disputes").len(), 1);
}

#[test]
fn feed_prefers_upvoted_categories() {
    let core = ScoringCore::in_memory(CoreConfig::default()).expect("core should open");
    let user = UserId::new("reader");

    let mut corpus = Vec::new();
    for i in 0..5 {
        corpus.push(item(&format!("tech-seen-{i}"), "Chip", "fast", "Tech", &["tech"]));
    }
    for i in 0..3 {
        corpus.push(item(&format!("health-seen-{i}"), "Run", "daily", "Health", &["health"]));
    }
    for i in 0..4 {
        corpus.push(item(&format!("tech-new-{i}"), "Board", "cheap", "Tech", &["tech"]));
        corpus.push(item(&format!("health-new-{i}"), "Diet", "plan", "Health", &["health"]));
    }

    let mut history = Vec::new();
    for i in 0..5 {
        history.push(InteractionEvent::new(
            "reader",
            &format!("tech-seen-{i}"),
            InteractionAction::Upvote,
            i,
        ));
    }
    for i in 0..3 {
        history.push(InteractionEvent::new(
            "reader",
            &format!("health-seen-{i}"),
            InteractionAction::View,
            10 + i,
        ));
    }

    let recs = core.compute_recommendations(&user, &corpus, &history, NOW);
    assert_eq!(recs.for_you.len(), 6);
    let first_health = recs
        .for_you
        .iter()
        .position(|r| r.item_id.0.starts_with("health"))
        .expect("health items fill the tail");
    assert_eq!(first_health, 4);
    assert!(recs.for_you[..4].iter().all(|r| r.item_id.0.starts_with("tech-new")));
    assert!(recs
        .for_you
        .iter()
        .all(|r| !r.item_id.0.contains("-seen-")));
    assert_eq!(
        recs.for_you[0].reasons.first().map(String::as_str),
        Some("Matches your interest in Tech")
    );

    // Trending skips voted items but keeps viewed ones.
    assert!(recs.trending.iter().all(|r| !r.item_id.0.starts_with("tech-seen")));

    // Live profile path gives the same ranking once the events are recorded.
    for event in &history {
        let target = corpus.iter().find(|i| i.id == event.item_id);
        core.record_interaction(event, target);
    }
    let live = core.compute_recommendations(&user, &corpus, &[], NOW);
    assert_eq!(live.for_you, recs.for_you);
}
