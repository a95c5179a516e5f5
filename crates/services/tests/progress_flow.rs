//! End-to-end progress flows over the in-memory store: toggling, roll-ups,
//! identity partitioning, and the dashboard.

use std::sync::Arc;

use services::{
    EndSessionRequest, ProgressError, ProgressService, RecordTimeRequest, ToggleSectionRequest,
};
use storage::repository::{CompletionRepository, ContentRepository, Storage, StorageError};
use trailhead_core::model::{
    Category, CategoryId, CompletionRecord, Difficulty, Identity, Section, SectionId, Slug,
    Topic, TopicId,
};
use trailhead_core::time::{fixed_clock, fixed_now};

fn slug(raw: &str) -> Slug {
    Slug::parse(raw).unwrap()
}

fn build_topic(id: &str, slug_raw: &str, order: u32) -> Topic {
    Topic::new(TopicId::new(id), slug(slug_raw), slug_raw, "", "", order).unwrap()
}

fn build_category(id: &str, topic: &TopicId, slug_raw: &str, order: u32) -> Category {
    Category::new(
        CategoryId::new(id),
        topic.clone(),
        slug(slug_raw),
        slug_raw,
        order,
        "",
    )
    .unwrap()
}

fn build_section(
    id: &str,
    topic: &TopicId,
    category: Option<&CategoryId>,
    slug_raw: &str,
    order: u32,
) -> Section {
    Section::new(
        SectionId::new(id),
        topic.clone(),
        category.cloned(),
        slug(slug_raw),
        format!("Section {slug_raw}"),
        order,
        Difficulty::Beginner,
    )
    .unwrap()
}

/// One topic, one category, `count` sections named sec-1..sec-count.
async fn seed_topic(content: &Arc<dyn ContentRepository>, count: usize) {
    let topic = build_topic("t-1", "javascript", 1);
    let category = build_category("c-1", topic.id(), "basics", 1);
    content.insert_topic(&topic).await.unwrap();
    content.insert_category(&category).await.unwrap();
    for n in 1..=count {
        let section = build_section(
            &format!("s-{n}"),
            topic.id(),
            Some(category.id()),
            &format!("sec-{n}"),
            u32::try_from(n).unwrap(),
        );
        content.insert_section(&section).await.unwrap();
    }
}

fn service(storage: &Storage) -> ProgressService {
    ProgressService::new(
        fixed_clock(),
        Arc::clone(&storage.content),
        Arc::clone(&storage.completions),
    )
}

fn toggle(section_slug: &str, completed: bool) -> ToggleSectionRequest {
    ToggleSectionRequest {
        topic_slug: Some("javascript".to_owned()),
        section_slug: Some(section_slug.to_owned()),
        completed,
    }
}

#[tokio::test]
async fn toggle_is_idempotent_and_reversible() {
    let storage = Storage::in_memory();
    seed_topic(&storage.content, 3).await;
    let svc = service(&storage);
    let user = Identity::Authenticated("alice".to_owned());

    let out = svc.toggle_section(&user, &toggle("sec-1", true)).await.unwrap();
    assert!(out.is_completed);

    // Repeating the toggle changes nothing.
    svc.toggle_section(&user, &toggle("sec-1", true)).await.unwrap();
    let view = svc.topic_progress(Some(&user), "javascript").await.unwrap();
    assert_eq!(view.stats.completed_sections, 1);

    let out = svc.toggle_section(&user, &toggle("sec-1", false)).await.unwrap();
    assert!(!out.is_completed);
    let view = svc.topic_progress(Some(&user), "javascript").await.unwrap();
    assert_eq!(view.stats.completed_sections, 0);
}

#[tokio::test]
async fn toggle_rejects_missing_and_unknown_sections() {
    let storage = Storage::in_memory();
    seed_topic(&storage.content, 1).await;
    let svc = service(&storage);
    let user = Identity::Authenticated("alice".to_owned());

    let mut request = toggle("sec-1", true);
    request.section_slug = None;
    let err = svc.toggle_section(&user, &request).await.unwrap_err();
    assert!(matches!(err, ProgressError::MissingField("sectionSlug")));

    let err = svc
        .toggle_section(&user, &toggle("sec-missing", true))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "not_found");
}

#[tokio::test]
async fn percentage_rounds_from_section_counts() {
    let storage = Storage::in_memory();
    seed_topic(&storage.content, 10).await;
    let svc = service(&storage);
    let user = Identity::Authenticated("alice".to_owned());

    for n in 1..=3 {
        svc.toggle_section(&user, &toggle(&format!("sec-{n}"), true))
            .await
            .unwrap();
    }

    let view = svc.topic_progress(Some(&user), "javascript").await.unwrap();
    assert_eq!(view.stats.total_sections, 10);
    assert_eq!(view.stats.completed_sections, 3);
    assert_eq!(view.stats.percentage, 30);
}

#[tokio::test]
async fn category_rollup_flips_only_when_every_section_is_done() {
    let storage = Storage::in_memory();
    seed_topic(&storage.content, 2).await;
    let svc = service(&storage);
    let user = Identity::Authenticated("alice".to_owned());

    svc.toggle_section(&user, &toggle("sec-1", true)).await.unwrap();
    let view = svc.topic_progress(Some(&user), "javascript").await.unwrap();
    assert_eq!(view.progress.get("basics"), Some(&false));

    svc.toggle_section(&user, &toggle("sec-2", true)).await.unwrap();
    let view = svc.topic_progress(Some(&user), "javascript").await.unwrap();
    assert_eq!(view.progress.get("basics"), Some(&true));

    let category = svc
        .category_progress(Some(&user), "javascript", "basics")
        .await
        .unwrap();
    assert_eq!(category.progress.get("sec-1"), Some(&true));
    assert_eq!(category.progress.get("sec-2"), Some(&true));
}

#[tokio::test]
async fn identities_partition_completion_state() {
    let storage = Storage::in_memory();
    seed_topic(&storage.content, 2).await;
    let svc = service(&storage);

    let anonymous = Identity::Anonymous;
    svc.toggle_section(&anonymous, &toggle("sec-1", true))
        .await
        .unwrap();

    // No identity at all: zeroed view, regardless of what the sentinel
    // bucket holds.
    let view = svc.topic_progress(None, "javascript").await.unwrap();
    assert_eq!(view.stats.completed_sections, 0);
    assert_eq!(view.stats.percentage, 0);

    // The anonymous sentinel bucket sees its own prior writes.
    let view = svc
        .topic_progress(Some(&anonymous), "javascript")
        .await
        .unwrap();
    assert_eq!(view.stats.completed_sections, 1);

    // A fresh session partition starts empty.
    let session = Identity::Session("sess-42".to_owned());
    let view = svc
        .topic_progress(Some(&session), "javascript")
        .await
        .unwrap();
    assert_eq!(view.stats.completed_sections, 0);

    // And an authenticated user is isolated from both.
    let user = Identity::Authenticated("alice".to_owned());
    let progress = svc
        .section_progress(Some(&user), "sec-1")
        .await
        .unwrap();
    assert!(!progress.is_completed);
}

#[tokio::test]
async fn dashboard_reports_stats_and_continue_links() {
    let storage = Storage::in_memory();
    seed_topic(&storage.content, 3).await;

    let empty = build_topic("t-2", "react", 2);
    storage.content.insert_topic(&empty).await.unwrap();

    let svc = service(&storage);
    let user = Identity::Authenticated("alice".to_owned());
    svc.toggle_section(&user, &toggle("sec-1", true)).await.unwrap();

    let dashboard = svc.all_topics_progress(Some(&user)).await.unwrap();
    assert_eq!(dashboard.topics.len(), 2);

    let js = &dashboard.topics[0];
    assert_eq!(js.topic_slug, "javascript");
    assert_eq!(js.total_sections, 3);
    assert_eq!(js.completed_sections, 1);
    assert_eq!(js.percentage, 33);
    // First incomplete section in (category order, section order).
    assert_eq!(
        js.continue_link,
        "/topic/javascript/category/basics/section/sec-2"
    );

    let react = &dashboard.topics[1];
    assert_eq!(react.total_sections, 0);
    assert_eq!(react.percentage, 0);
    assert_eq!(react.continue_link, "/topic/react");
}

#[tokio::test]
async fn dashboard_skips_records_for_vanished_sections() {
    let storage = Storage::in_memory();
    seed_topic(&storage.content, 2).await;
    let svc = service(&storage);
    let user = Identity::Authenticated("alice".to_owned());

    svc.toggle_section(&user, &toggle("sec-1", true)).await.unwrap();

    // A record pointing at a section that no longer exists must not count
    // toward any topic.
    let orphan = CompletionRecord::new(
        user.storage_key(),
        SectionId::new("s-gone"),
        true,
        fixed_now(),
    )
    .unwrap();
    storage.completions.upsert(&orphan).await.unwrap();

    let dashboard = svc.all_topics_progress(Some(&user)).await.unwrap();
    assert_eq!(dashboard.topics[0].completed_sections, 1);
}

#[tokio::test]
async fn time_tracking_accumulates_and_sessions_round_up() {
    let storage = Storage::in_memory();
    seed_topic(&storage.content, 1).await;
    let svc = service(&storage);
    let user = Identity::Session("sess-7".to_owned());

    let record_time = |minutes| RecordTimeRequest {
        section_slug: Some("sec-1".to_owned()),
        minutes,
    };
    let spent = svc.record_time(&user, &record_time(10)).await.unwrap();
    assert_eq!(spent.time_spent_minutes, 10);
    let spent = svc.record_time(&user, &record_time(5)).await.unwrap();
    assert_eq!(spent.time_spent_minutes, 15);

    svc.start_study_session(&user, "sec-1").await.unwrap();
    // 90 seconds of study credits two whole minutes.
    let closed = svc
        .end_study_session(&user, &EndSessionRequest {
            section_slug: Some("sec-1".to_owned()),
            duration: 90,
        })
        .await
        .unwrap();
    assert_eq!(closed.session_duration, 2);
    assert_eq!(closed.total_time_spent, 17);
}

#[tokio::test]
async fn aggregate_views_carry_content_and_progress_together() {
    let storage = Storage::in_memory();
    seed_topic(&storage.content, 2).await;
    let svc = service(&storage);
    let curriculum = services::CurriculumService::new(
        Arc::clone(&storage.content),
        Arc::clone(&storage.completions),
    );
    let user = Identity::Authenticated("alice".to_owned());
    svc.toggle_section(&user, &toggle("sec-1", true)).await.unwrap();

    let topic_view = curriculum
        .topic_aggregate(Some(&user), "javascript")
        .await
        .unwrap();
    assert_eq!(topic_view.topic.slug, "javascript");
    assert_eq!(topic_view.categories.len(), 1);
    assert_eq!(topic_view.sections.len(), 2);
    assert_eq!(topic_view.progress.get("basics"), Some(&false));
    assert_eq!(topic_view.stats.percentage, 50);

    let category_view = curriculum
        .category_aggregate(Some(&user), "javascript", "basics")
        .await
        .unwrap();
    assert_eq!(category_view.progress.get("sec-1"), Some(&true));
    assert_eq!(category_view.progress.get("sec-2"), Some(&false));

    let section_view = curriculum
        .section_aggregate(Some(&user), "javascript", "sec-1")
        .await
        .unwrap();
    assert!(section_view.is_completed);
    assert_eq!(section_view.category.as_ref().map(|c| c.slug.as_str()), Some("basics"));
    assert_eq!(section_view.all_topic_sections.len(), 2);

    // Section lookup in the aggregate is topic-scoped.
    let err = curriculum
        .section_aggregate(Some(&user), "javascript", "sec-missing")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "not_found");
}

/// A completion store whose every call fails.
struct BrokenCompletions;

fn broken() -> StorageError {
    StorageError::Connection("socket closed".to_owned())
}

#[async_trait::async_trait]
impl CompletionRepository for BrokenCompletions {
    async fn find(
        &self,
        _user_key: &str,
        _section_id: &SectionId,
    ) -> Result<Option<CompletionRecord>, StorageError> {
        Err(broken())
    }

    async fn list_for_user(
        &self,
        _user_key: &str,
    ) -> Result<Vec<CompletionRecord>, StorageError> {
        Err(broken())
    }

    async fn list_for_sections(
        &self,
        _user_key: &str,
        _section_ids: &[SectionId],
    ) -> Result<Vec<CompletionRecord>, StorageError> {
        Err(broken())
    }

    async fn upsert(&self, _record: &CompletionRecord) -> Result<(), StorageError> {
        Err(broken())
    }
}

#[tokio::test]
async fn store_failures_surface_as_opaque_storage_errors() {
    let storage = Storage::in_memory();
    seed_topic(&storage.content, 1).await;
    let svc = ProgressService::new(
        fixed_clock(),
        Arc::clone(&storage.content),
        Arc::new(BrokenCompletions),
    );
    let user = Identity::Authenticated("alice".to_owned());

    let err = svc
        .topic_progress(Some(&user), "javascript")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "storage");
    assert_eq!(err.to_string(), "storage unavailable");

    // Without an identity there is no completion query to fail.
    let view = svc.topic_progress(None, "javascript").await.unwrap();
    assert_eq!(view.stats.percentage, 0);
}

#[tokio::test]
async fn ending_a_session_without_a_record_fails() {
    let storage = Storage::in_memory();
    seed_topic(&storage.content, 1).await;
    let svc = service(&storage);
    let user = Identity::Authenticated("alice".to_owned());

    let err = svc
        .end_study_session(&user, &EndSessionRequest {
            section_slug: Some("sec-1".to_owned()),
            duration: 60,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ProgressError::SessionNotFound));
}
