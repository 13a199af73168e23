//! Stress test: originality checks and feed ranking over large corpora.

use std::collections::HashSet;

use ideamark::originality::check_originality_local;
use ideamark::time::MICROS_PER_DAY;
use ideamark::{
    ContentDraft, ContentId, ContentItem, CoreConfig, EngagementCounters, InteractionAction,
    InteractionEvent, ScoringCore, UserId,
};

const NOW: u64 = 10_000 * MICROS_PER_DAY;
const CATEGORIES: [&str; 5] = ["Tech", "Health", "Art", "Food", "Travel"];

fn corpus(size: usize) -> Vec<ContentItem> {
    (0..size)
        .map(|i| ContentItem {
            id: ContentId::new(format!("item-{i}")),
            title: format!("idea number {i} about {}", CATEGORIES[i % 5].to_lowercase()),
            description: format!("word{} word{} word{} shared", i % 97, i % 89, i % 83),
            category: CATEGORIES[i % 5].to_string(),
            tags: vec![format!("tag{}", i % 13), format!("tag{}", i % 7)],
            author_id: UserId::new(format!("author-{}", i % 50)),
            created_at: NOW - (i as u64 % 30) * MICROS_PER_DAY / 2,
            counters: EngagementCounters {
                upvotes: (i % 17) as u64,
                downvotes: (i % 5) as u64,
                comment_count: (i % 11) as u64,
                view_count: (i % 200) as u64,
            },
            novelty_score: Some((i % 100) as f64),
        })
        .collect()
}

#[test]
fn stress_check_against_5000_items() {
    let items = corpus(5_000);
    let candidate = ContentDraft::new("idea number 42 about art", "word42 word42 word42 shared", &[
        "tag3", "tag0",
    ]);
    let verdict = check_originality_local(&candidate, &items).expect("check should succeed");

    assert!(verdict.similar_ideas.len() <= 5);
    for pair in verdict.similar_ideas.windows(2) {
        assert!(pair[0].similarity >= pair[1].similarity);
    }
    assert_eq!(verdict.is_original(), verdict.similarity_score < 70.0);
    let ids: HashSet<&ContentId> = verdict.similar_ideas.iter().map(|r| &r.item_b).collect();
    assert_eq!(ids.len(), verdict.similar_ideas.len());
}

#[test]
fn stress_feed_over_10000_items_respects_exclusions() {
    let core = ScoringCore::in_memory(CoreConfig::default()).unwrap();
    let items = corpus(10_000);
    let user = UserId::new("author-3");

    let mut history = Vec::new();
    for i in 0..200u64 {
        let action = match i % 4 {
            0 => InteractionAction::Upvote,
            1 => InteractionAction::Downvote,
            2 => InteractionAction::Comment,
            _ => InteractionAction::View,
        };
        history.push(InteractionEvent::new(
            "author-3",
            &format!("item-{}", i * 37 % 10_000),
            action,
            i,
        ));
    }

    let recs = core.compute_recommendations(&user, &items, &history, NOW);
    let voted: HashSet<String> = history
        .iter()
        .filter(|e| e.action.is_vote())
        .map(|e| e.item_id.0.clone())
        .collect();
    let recent_views: HashSet<String> = history
        .iter()
        .rev()
        .filter(|e| e.action == InteractionAction::View)
        .take(10)
        .map(|e| e.item_id.0.clone())
        .collect();
    let own: HashSet<String> = items
        .iter()
        .filter(|i| i.author_id == user)
        .map(|i| i.id.0.clone())
        .collect();

    for facet in [&recs.for_you, &recs.similar, &recs.new_in_categories] {
        assert!(facet.len() <= 6);
        for entry in facet {
            assert!(!voted.contains(&entry.item_id.0));
            assert!(!recent_views.contains(&entry.item_id.0));
            assert!(!own.contains(&entry.item_id.0));
        }
    }
    assert_eq!(recs.for_you.len(), 6);
    for entry in &recs.trending {
        assert!(!voted.contains(&entry.item_id.0));
    }

    // Same inputs, same output.
    let again = core.compute_recommendations(&user, &items, &history, NOW);
    assert_eq!(recs, again);
}

#[test]
fn stress_trending_cutoff_over_large_corpus() {
    let core = ScoringCore::in_memory(CoreConfig::default()).unwrap();
    let items = corpus(10_000);
    let ranked = core.trending(&UserId::new("nobody"), &items, &[], NOW);

    assert_eq!(ranked.len(), 6);
    for entry in &ranked {
        let item = items.iter().find(|i| i.id == entry.item_id).unwrap();
        assert!(ideamark::time::age_days(item.created_at, NOW) <= 7.0);
    }
    for pair in ranked.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
}
