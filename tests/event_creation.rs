//! Event creation flow: validation, banner upload, atomic event+tier
//! persistence, and public listing behavior.

mod common;

use chrono::{Duration, Utc};
use rust_decimal::Decimal;

use common::{test_app, upcoming_event};
use pavilion_server::models::{EventStatus, TierKind};
use pavilion_server::services::Banner;
use pavilion_server::store::{EventFilter, EventStore};
use pavilion_server::utils::error::AppError;

#[tokio::test]
async fn rejects_event_starting_in_the_past() {
    let app = test_app();

    let mut new_event = upcoming_event("Yesterday Fair", Decimal::ZERO, Some(10));
    new_event.start_time = Utc::now() - Duration::hours(24);
    new_event.end_time = Utc::now() + Duration::hours(1);

    let err = app.state.events.create_event(new_event).await.unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));

    // Nothing was persisted.
    assert!(app.store.list_all_events().await.unwrap().is_empty());
    assert!(app.store.list_orders().await.unwrap().is_empty());
}

#[tokio::test]
async fn rejects_end_before_start() {
    let app = test_app();

    let mut new_event = upcoming_event("Backwards Conf", Decimal::ZERO, Some(10));
    new_event.end_time = new_event.start_time - Duration::minutes(30);

    let err = app.state.events.create_event(new_event).await.unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));
    assert!(app.store.list_all_events().await.unwrap().is_empty());
}

#[tokio::test]
async fn rejects_virtual_event_without_meeting_link() {
    let app = test_app();

    let mut new_event = upcoming_event("Remote Meetup", Decimal::ZERO, Some(10));
    new_event.is_virtual = true;

    let err = app.state.events.create_event(new_event).await.unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));
}

#[tokio::test]
async fn creates_exactly_one_tier_with_full_remaining() {
    let app = test_app();

    let (event, tier) = app
        .state
        .events
        .create_event(upcoming_event("Launch Night", Decimal::new(2500, 2), Some(50)))
        .await
        .unwrap();

    assert_eq!(event.status, EventStatus::Published);
    assert_eq!(tier.event_id, event.id);
    assert_eq!(tier.quantity, Some(50));
    assert_eq!(tier.remaining, Some(50));
    assert_eq!(tier.kind, TierKind::Paid);

    let tiers = app.store.tiers_for_event(event.id).await.unwrap();
    assert_eq!(tiers.len(), 1);
}

#[tokio::test]
async fn zero_price_derives_free_kind() {
    let app = test_app();

    let (_, tier) = app
        .state
        .events
        .create_event(upcoming_event("Community Day", Decimal::ZERO, None))
        .await
        .unwrap();

    assert_eq!(tier.kind, TierKind::Free);
    assert!(tier.is_unlimited());
    assert_eq!(tier.remaining, None);
}

#[tokio::test]
async fn banner_upload_failure_aborts_the_whole_flow() {
    let app = test_app();
    app.objects.set_put_failure(true);

    let mut new_event = upcoming_event("Poster Night", Decimal::ZERO, Some(10));
    new_event.banner = Some(Banner {
        content_type: "image/png".to_string(),
        bytes: vec![0x89, 0x50, 0x4e, 0x47],
    });

    let err = app.state.events.create_event(new_event).await.unwrap_err();
    assert!(matches!(err, AppError::StorageError(_)));

    // No orphaned event row and no stored object.
    assert!(app.store.list_all_events().await.unwrap().is_empty());
    assert_eq!(app.objects.object_count().await, 0);
}

#[tokio::test]
async fn banner_upload_sets_public_url() {
    let app = test_app();

    let mut new_event = upcoming_event("Poster Night", Decimal::ZERO, Some(10));
    new_event.banner = Some(Banner {
        content_type: "image/jpeg".to_string(),
        bytes: vec![0xff, 0xd8, 0xff],
    });

    let (event, _) = app.state.events.create_event(new_event).await.unwrap();
    let url = event.banner_url.expect("banner url set");
    assert!(url.starts_with("memory://banners/"));
    assert!(url.ends_with(".jpg"));
    assert_eq!(app.objects.object_count().await, 1);
}

#[tokio::test]
async fn rejects_unsupported_banner_content_type() {
    let app = test_app();

    let mut new_event = upcoming_event("Poster Night", Decimal::ZERO, Some(10));
    new_event.banner = Some(Banner {
        content_type: "application/pdf".to_string(),
        bytes: vec![0x25, 0x50, 0x44, 0x46],
    });

    let err = app.state.events.create_event(new_event).await.unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));
    assert_eq!(app.objects.object_count().await, 0);
}

#[tokio::test]
async fn duplicate_titles_get_distinct_slugs() {
    let app = test_app();

    let (first, _) = app
        .state
        .events
        .create_event(upcoming_event("Rust Meetup", Decimal::ZERO, Some(10)))
        .await
        .unwrap();
    let (second, _) = app
        .state
        .events
        .create_event(upcoming_event("Rust Meetup", Decimal::ZERO, Some(10)))
        .await
        .unwrap();

    assert_ne!(first.slug, second.slug);
    assert!(first.slug.starts_with("rust-meetup-"));

    let (found, _) = app.state.events.get_by_slug(&second.slug).await.unwrap();
    assert_eq!(found.id, second.id);
}

#[tokio::test]
async fn drafts_are_not_listed_publicly() {
    let app = test_app();

    let mut draft = upcoming_event("Secret Show", Decimal::ZERO, Some(10));
    draft.publish_immediately = false;
    app.state.events.create_event(draft).await.unwrap();
    app.state
        .events
        .create_event(upcoming_event("Open Show", Decimal::ZERO, Some(10)))
        .await
        .unwrap();

    let listed = app
        .state
        .events
        .list_public(&EventFilter::default())
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].title, "Open Show");

    // The draft still exists for its organizer and administrators.
    assert_eq!(app.store.list_all_events().await.unwrap().len(), 2);
}

#[tokio::test]
async fn listing_filters_compose() {
    let app = test_app();

    let mut music = upcoming_event("Jazz at the Pavilion", Decimal::ZERO, Some(10));
    music.category = "music".to_string();
    music.location = "Bahir Dar Amphitheater".to_string();
    app.state.events.create_event(music).await.unwrap();

    let mut tech = upcoming_event("Systems Programming Night", Decimal::ZERO, Some(10));
    tech.description = Some("Deep dive into async runtimes".to_string());
    app.state.events.create_event(tech).await.unwrap();

    let by_category = app
        .state
        .events
        .list_public(&EventFilter {
            category: Some("music".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(by_category.len(), 1);
    assert_eq!(by_category[0].title, "Jazz at the Pavilion");

    // Free text matches descriptions too.
    let by_search = app
        .state
        .events
        .list_public(&EventFilter {
            search: Some("async".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(by_search.len(), 1);
    assert_eq!(by_search[0].title, "Systems Programming Night");

    let by_location = app
        .state
        .events
        .list_public(&EventFilter {
            location: Some("amphitheater".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(by_location.len(), 1);

    let no_match = app
        .state
        .events
        .list_public(&EventFilter {
            category: Some("music".to_string()),
            search: Some("async".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert!(no_match.is_empty());
}
