//! Recommendation ranking over the in-memory store.

use std::sync::Arc;

use services::RecommendationService;
use storage::repository::Storage;
use trailhead_core::model::{
    CompletionRecord, Difficulty, Identity, Section, SectionId, Slug, Topic, TopicId,
};
use trailhead_core::time::fixed_now;

fn slug(raw: &str) -> Slug {
    Slug::parse(raw).unwrap()
}

fn build_topic(slug_raw: &str, order: u32) -> Topic {
    Topic::new(
        TopicId::new(format!("t-{slug_raw}")),
        slug(slug_raw),
        slug_raw,
        format!("All about {slug_raw}"),
        "",
        order,
    )
    .unwrap()
}

fn build_section(topic_slug: &str, n: usize) -> Section {
    Section::new(
        SectionId::new(format!("s-{topic_slug}-{n}")),
        TopicId::new(format!("t-{topic_slug}")),
        None,
        slug(&format!("{topic_slug}-sec-{n}")),
        format!("{topic_slug} section {n}"),
        u32::try_from(n).unwrap(),
        Difficulty::Beginner,
    )
    .unwrap()
}

/// Seeds the given topics, each with five sections.
async fn seed(storage: &Storage, topic_slugs: &[&str]) {
    for (i, topic_slug) in topic_slugs.iter().enumerate() {
        let topic = build_topic(topic_slug, u32::try_from(i + 1).unwrap());
        storage.content.insert_topic(&topic).await.unwrap();
        for n in 1..=5 {
            let section = build_section(topic_slug, n);
            storage.content.insert_section(&section).await.unwrap();
        }
    }
}

/// Writes `completed` done records and `pending` not-done records against a
/// topic's sections for the identity.
async fn seed_records(storage: &Storage, identity: &Identity, topic_slug: &str, completed: usize, pending: usize) {
    for n in 1..=(completed + pending) {
        let record = CompletionRecord::new(
            identity.storage_key(),
            SectionId::new(format!("s-{topic_slug}-{n}")),
            n <= completed,
            fixed_now(),
        )
        .unwrap();
        storage.completions.upsert(&record).await.unwrap();
    }
}

fn service(storage: &Storage) -> RecommendationService {
    RecommendationService::new(
        Arc::clone(&storage.content),
        Arc::clone(&storage.completions),
    )
}

#[tokio::test]
async fn recommends_unlocked_topics_once_prereqs_pass_half() {
    let storage = Storage::in_memory();
    seed(
        &storage,
        &["javascript", "mongodb", "react", "dsa", "system-design"],
    )
    .await;

    // 3 of 5 javascript records done: 60%, strictly above the 50% gate.
    let user = Identity::Authenticated("alice".to_owned());
    seed_records(&storage, &user, "javascript", 3, 2).await;

    let recs = service(&storage).recommendations(Some(&user)).await.unwrap();
    let slugs: Vec<&str> = recs.iter().map(|r| r.slug.as_str()).collect();

    // javascript is started and excluded; system-design's other prereqs sit
    // at 0%. mongodb and react tie on score and keep topic order; dsa is
    // harder and ranks below.
    assert_eq!(slugs, ["mongodb", "react", "dsa"]);
    assert_eq!(
        recs[0].reason,
        "Great next step • You've completed the prerequisites • Highly in-demand skill"
    );
    assert!(recs[2].reason.contains("Essential for interviews"));
}

#[tokio::test]
async fn any_progress_excludes_a_topic() {
    let storage = Storage::in_memory();
    seed(&storage, &["javascript", "os"]).await;

    // One pending record is enough: the ratio only counts completed ones,
    // so javascript stays at 0% and remains recommendable. One completed
    // record on os pushes it over zero and drops it.
    let user = Identity::Session("sess-9".to_owned());
    seed_records(&storage, &user, "os", 1, 0).await;

    let recs = service(&storage).recommendations(Some(&user)).await.unwrap();
    let slugs: Vec<&str> = recs.iter().map(|r| r.slug.as_str()).collect();
    assert_eq!(slugs, ["javascript"]);
}

#[tokio::test]
async fn vanished_section_records_do_not_count_toward_ratios() {
    let storage = Storage::in_memory();
    seed(&storage, &["javascript", "os"]).await;

    // A completed record whose section no longer exists must not give the
    // topic a nonzero ratio; both topics stay recommendable.
    let user = Identity::Authenticated("alice".to_owned());
    let orphan = CompletionRecord::new(
        user.storage_key(),
        SectionId::new("s-vanished-1"),
        true,
        fixed_now(),
    )
    .unwrap();
    storage.completions.upsert(&orphan).await.unwrap();

    let recs = service(&storage).recommendations(Some(&user)).await.unwrap();
    let slugs: Vec<&str> = recs.iter().map(|r| r.slug.as_str()).collect();
    assert_eq!(slugs, ["javascript", "os"]);
}

#[tokio::test]
async fn fresh_identity_gets_entry_points_only() {
    let storage = Storage::in_memory();
    seed(&storage, &["javascript", "mongodb", "os", "networking"]).await;

    let recs = service(&storage).recommendations(None).await.unwrap();
    let slugs: Vec<&str> = recs.iter().map(|r| r.slug.as_str()).collect();

    // mongodb needs javascript above 50% and gets gated out; the three
    // prereq-free topics rank by difficulty, javascript first.
    assert_eq!(slugs, ["javascript", "os", "networking"]);
    assert_eq!(recs[0].reason, "Perfect for beginners");
    assert_eq!(recs[0].description, "All about javascript");
}

#[tokio::test]
async fn caps_at_three_results() {
    let storage = Storage::in_memory();
    seed(&storage, &["javascript", "os", "networking", "linux", "git"]).await;

    let user = Identity::Anonymous;
    let recs = service(&storage).recommendations(Some(&user)).await.unwrap();
    assert_eq!(recs.len(), 3);
}

#[tokio::test]
async fn empty_catalog_yields_empty_list() {
    let storage = Storage::in_memory();
    let recs = service(&storage)
        .recommendations(Some(&Identity::Anonymous))
        .await
        .unwrap();
    assert!(recs.is_empty());
}
