//! Edge cases across scoring, proofs and configuration.

use ideamark::provenance::{content_hash, IssueKind};
use ideamark::similarity::compare;
use ideamark::time::MICROS_PER_DAY;
use ideamark::{
    ContentDraft, ContentId, ContentItem, CoreConfig, DisputeEvidence, DisputeType,
    DuplicatePolicy, EngagementCounters, ProofOptions, ScoringCore, ScoringError, SubjectId,
    UserId,
};

fn item(id: &str, created_at: u64) -> ContentItem {
    ContentItem {
        id: ContentId::new(id),
        title: "t".into(),
        description: "d".into(),
        category: "Misc".into(),
        tags: Vec::new(),
        author_id: UserId::new("author"),
        created_at,
        counters: EngagementCounters::default(),
        novelty_score: None,
    }
}

// ── Similarity and hashing ───────────────────────────────────────────────────

#[test]
fn edge_unicode_and_case_tokens() {
    let a = ContentDraft::new("Café ÜBER Straße", "naïve résumé", &["Zürich"]);
    let b = ContentDraft::new("café über straße", "NAÏVE RÉSUMÉ", &["zürich"]);
    assert_eq!(compare(&a, &b).similarity, 100.0);
}

#[test]
fn edge_hash_ignores_tag_order_case_and_whitespace() {
    let tags_a = vec!["IoT".to_string(), "garden".to_string()];
    let tags_b = vec![" garden ".to_string(), "iot".to_string(), "".to_string()];
    assert_eq!(
        content_hash("Smart  Garden", "Auto\twatering", &tags_a),
        content_hash("smart garden", "auto watering", &tags_b)
    );
    assert_ne!(
        content_hash("Smart Garden", "watering", &tags_a),
        content_hash("Smart Garden", "watering!", &tags_a)
    );
}

#[test]
fn edge_hash_is_lowercase_hex_sha256() {
    let hash = content_hash("a", "b", &[]);
    assert_eq!(hash.len(), 64);
    assert!(hash.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
}

#[test]
fn edge_separators_inside_fields_are_distinct_content() {
    let core = ScoringCore::in_memory(CoreConfig::default()).unwrap();
    let first = core
        .generate_proof(
            &SubjectId::new("s1"),
            &ContentDraft::new("Pump|Valve", "irrigation kit", &[]),
            &UserId::new("u"),
            &ProofOptions::default(),
        )
        .unwrap();
    let second = core
        .generate_proof(
            &SubjectId::new("s2"),
            &ContentDraft::new("Pump", "Valve|irrigation kit", &[]),
            &UserId::new("u"),
            &ProofOptions::default(),
        )
        .expect("text moved across a separator is different content");
    assert_ne!(first.content_hash, second.content_hash);
}

// ── Originality ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn edge_whitespace_only_description_is_rejected() {
    let core = ScoringCore::in_memory(CoreConfig::default()).unwrap();
    let err = core
        .check_originality(&ContentDraft::new("Title", " \n\t ", &[]), &[])
        .await
        .unwrap_err();
    assert!(matches!(err, ScoringError::Validation(_)));
}

#[tokio::test]
async fn edge_custom_thresholds_from_config() {
    let config = CoreConfig::from_json(r#"{"originality": {"duplicate_threshold": 50.0}}"#).unwrap();
    let core = ScoringCore::in_memory(config).unwrap();
    let corpus = vec![ContentItem {
        title: "alpha beta".into(),
        description: "gamma".into(),
        ..item("a", 0)
    }];
    // 3 shared of 5 tokens: 60%
    let verdict = core
        .check_originality(&ContentDraft::new("alpha beta", "gamma delta epsilon", &[]), &corpus)
        .await
        .unwrap();
    assert!((verdict.similarity_score - 60.0).abs() < 1e-9);
    assert!(!verdict.is_original());
}

// ── Proofs ───────────────────────────────────────────────────────────────────

#[test]
fn edge_reject_policy_refuses_second_generation() {
    let mut config = CoreConfig::default();
    config.provenance.duplicate_policy = DuplicatePolicy::Reject;
    let core = ScoringCore::in_memory(config).unwrap();
    let subject = SubjectId::new("s");
    let draft = ContentDraft::new("T", "D", &[]);
    core.generate_proof(&subject, &draft, &UserId::new("u"), &ProofOptions::default())
        .unwrap();
    let err = core
        .generate_proof(&subject, &draft, &UserId::new("u"), &ProofOptions::default())
        .unwrap_err();
    assert!(matches!(err, ScoringError::DuplicateProof { .. }));
}

#[test]
fn edge_changed_content_for_existing_subject_is_duplicate() {
    let core = ScoringCore::in_memory(CoreConfig::default()).unwrap();
    let subject = SubjectId::new("s");
    core.generate_proof(
        &subject,
        &ContentDraft::new("T", "D", &[]),
        &UserId::new("u"),
        &ProofOptions::default(),
    )
    .unwrap();
    let err = core
        .generate_proof(
            &subject,
            &ContentDraft::new("T", "edited", &[]),
            &UserId::new("u"),
            &ProofOptions::default(),
        )
        .unwrap_err();
    assert!(matches!(err, ScoringError::DuplicateProof { .. }));
}

#[test]
fn edge_too_many_extra_witnesses() {
    let core = ScoringCore::in_memory(CoreConfig::default()).unwrap();
    let err = core
        .generate_proof(
            &SubjectId::new("s"),
            &ContentDraft::new("T", "D", &[]),
            &UserId::new("u"),
            &ProofOptions {
                extra_witnesses: 5,
                expires_in_days: None,
            },
        )
        .unwrap_err();
    assert!(matches!(err, ScoringError::Validation(_)));
}

#[test]
fn edge_expired_certificate_lowers_confidence() {
    let core = ScoringCore::in_memory(CoreConfig::default()).unwrap();
    let subject = SubjectId::new("short-lived");
    let proof = core
        .generate_proof(
            &subject,
            &ContentDraft::new("T", "D", &[]),
            &UserId::new("u"),
            &ProofOptions {
                extra_witnesses: 0,
                expires_in_days: Some(1),
            },
        )
        .unwrap();

    let fresh = core.verify_proof_at(&subject, proof.submission_timestamp).unwrap();
    assert!(fresh.is_valid);

    let later = core
        .verify_proof_at(&subject, proof.submission_timestamp + 2 * MICROS_PER_DAY)
        .unwrap();
    assert!(!later.is_valid);
    assert!(later.has_issue(IssueKind::CertificateExpired));
    assert_eq!(later.confidence, 85);

    let marked = core.mark_verified(&subject, "moderator");
    assert!(marked.is_ok(), "mark_verified checks against the current clock");
}

#[test]
fn edge_unsafe_subject_ids_rejected_by_file_store() {
    let dir = tempfile::tempdir().unwrap();
    let core = ScoringCore::open(dir.path(), CoreConfig::default()).unwrap();
    for bad in ["../escape", ".hidden", "a/b", ""] {
        let err = core
            .generate_proof(
                &SubjectId::new(bad),
                &ContentDraft::new("T", format!("D {bad}"), &[]),
                &UserId::new("u"),
                &ProofOptions::default(),
            )
            .unwrap_err();
        assert!(matches!(err, ScoringError::Validation(_)), "{bad:?}");
    }
    assert!(core.recorder().store().list_proofs().unwrap().is_empty());
}

#[test]
fn edge_dispute_needs_evidence_and_a_proof() {
    let core = ScoringCore::in_memory(CoreConfig::default()).unwrap();
    let err = core
        .submit_dispute(
            &SubjectId::new("missing"),
            &SubjectId::new("other"),
            DisputeType::Plagiarism,
            vec![DisputeEvidence::new("copied")],
            &UserId::new("u"),
        )
        .unwrap_err();
    assert!(matches!(err, ScoringError::NotFound(_)));

    core.generate_proof(
        &SubjectId::new("a"),
        &ContentDraft::new("T", "D", &[]),
        &UserId::new("u"),
        &ProofOptions::default(),
    )
    .unwrap();
    let err = core
        .submit_dispute(
            &SubjectId::new("a"),
            &SubjectId::new("b"),
            DisputeType::Plagiarism,
            vec![DisputeEvidence::new("   ")],
            &UserId::new("u"),
        )
        .unwrap_err();
    assert!(matches!(err, ScoringError::Validation(_)));

    let err = core
        .submit_dispute(
            &SubjectId::new("a"),
            &SubjectId::new("a"),
            DisputeType::Plagiarism,
            vec![DisputeEvidence::new("self")],
            &UserId::new("u"),
        )
        .unwrap_err();
    assert!(matches!(err, ScoringError::Validation(_)));
}

// ── Feeds ────────────────────────────────────────────────────────────────────

#[test]
fn edge_trending_window_boundary() {
    let now = 100 * MICROS_PER_DAY;
    let core = ScoringCore::in_memory(CoreConfig::default()).unwrap();
    let mut at_limit = item("seven", now - 7 * MICROS_PER_DAY);
    at_limit.counters.upvotes = 10;
    let mut past_limit = item("past", now - 7 * MICROS_PER_DAY - 1);
    past_limit.counters.upvotes = 10;

    let ranked = core.trending(&UserId::new("u"), &[at_limit, past_limit], &[], now);
    let ids: Vec<&str> = ranked.iter().map(|r| r.item_id.0.as_str()).collect();
    assert_eq!(ids, vec!["seven"]);
    assert_eq!(ranked[0].score, 0.0);
}

#[test]
fn edge_feed_for_unknown_user_on_empty_corpus() {
    let core = ScoringCore::in_memory(CoreConfig::default()).unwrap();
    let recs = core.compute_recommendations(&UserId::new("ghost"), &[], &[], 0);
    assert!(recs.is_empty());
    assert!(core.profiles().is_empty());
}

#[test]
fn edge_facet_size_from_config() {
    let config = CoreConfig::from_json(r#"{"feed": {"facet_size": 2}}"#).unwrap();
    let core = ScoringCore::in_memory(config).unwrap();
    let now = 10 * MICROS_PER_DAY;
    let corpus: Vec<ContentItem> = (0..10).map(|i| item(&format!("i{i}"), now)).collect();
    let recs = core.compute_recommendations(&UserId::new("u"), &corpus, &[], now);
    assert_eq!(recs.for_you.len(), 2);
    assert_eq!(recs.trending.len(), 2);
    // Equal scores keep corpus order.
    assert_eq!(recs.for_you[0].item_id, ContentId::new("i0"));
    assert_eq!(recs.for_you[1].item_id, ContentId::new("i1"));
}

#[test]
fn edge_config_rejects_malformed_json() {
    assert!(matches!(
        CoreConfig::from_json("{ not json"),
        Err(ScoringError::Serialization(_))
    ));
}
