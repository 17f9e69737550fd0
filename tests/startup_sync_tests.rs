mod common;

use common::{founders, startup, test_db, FakeUpstream};
use incubator_api::{
    entities::{Founder, Startup},
    error::AppError,
    jobs::{StartupSync, SyncSummary},
    repositories::StartupRepository,
};
use sea_orm::{EntityTrait, PaginatorTrait};

#[tokio::test]
async fn first_run_creates_every_startup() {
    let db = test_db().await;
    let upstream = FakeUpstream::new();
    upstream.put(startup(1, "Acme", "Technology"));
    upstream.put(startup(2, "Bolt", "Energy"));

    let summary = StartupSync::new(&db, upstream.as_ref(), 1000)
        .synchronize()
        .await
        .unwrap();

    assert_eq!(
        summary,
        SyncSummary {
            created: 2,
            updated: 0,
            total: 2,
            failures: 0
        }
    );
    assert_eq!(Startup::find().count(&db).await.unwrap(), 2);
}

#[tokio::test]
async fn second_run_updates_without_duplicating() {
    let db = test_db().await;
    let upstream = FakeUpstream::new();
    upstream.put(startup(1, "Acme", "Technology"));
    upstream.put(startup(2, "Bolt", "Energy"));
    let sync = StartupSync::new(&db, upstream.as_ref(), 1000);

    sync.synchronize().await.unwrap();
    let first_id = StartupRepository::new(&db)
        .find_by_jeb_id(1)
        .await
        .unwrap()
        .unwrap()
        .id;

    let again = sync.synchronize().await.unwrap();
    assert_eq!(again.created, 0);
    assert_eq!(again.updated, 2);
    assert_eq!(Startup::find().count(&db).await.unwrap(), 2);

    let same = StartupRepository::new(&db)
        .find_by_jeb_id(1)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(same.id, first_id, "internal id survives a refresh");
}

#[tokio::test]
async fn refresh_overwrites_descriptive_fields() {
    let db = test_db().await;
    let upstream = FakeUpstream::new();
    upstream.put(startup(7, "Acme", "Technology"));
    let sync = StartupSync::new(&db, upstream.as_ref(), 1000);
    sync.synchronize().await.unwrap();

    let mut renamed = startup(7, "Acme Robotics", "Robotics");
    renamed.website_url = Some("https://acme.example".into());
    upstream.put(renamed);
    sync.synchronize().await.unwrap();

    let stored = StartupRepository::new(&db)
        .find_by_jeb_id(7)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.name, "Acme Robotics");
    assert_eq!(stored.sector, "Robotics");
    assert_eq!(stored.website_url.as_deref(), Some("https://acme.example"));
    assert!(stored.db_updated_at >= stored.db_created_at);
}

#[tokio::test]
async fn founder_set_matches_latest_upstream_list() {
    let db = test_db().await;
    let upstream = FakeUpstream::new();
    let mut acme = startup(1, "Acme", "Technology");
    acme.founders = founders(&[(10, "Ada"), (11, "Grace")]);
    upstream.put(acme.clone());
    let sync = StartupSync::new(&db, upstream.as_ref(), 1000);
    sync.synchronize().await.unwrap();

    acme.founders = founders(&[(12, "Linus")]);
    upstream.put(acme);
    sync.synchronize().await.unwrap();

    let repo = StartupRepository::new(&db);
    let stored = repo.find_by_jeb_id(1).await.unwrap().unwrap();
    let roster = repo.founders_of(&stored.id).await.unwrap();
    assert_eq!(roster.len(), 1);
    assert_eq!(roster[0].jeb_id, 12);
    assert_eq!(roster[0].name, "Linus");
    assert_eq!(roster[0].startup_id, stored.id);
    assert_eq!(roster[0].jeb_startup_id, 1);
    assert_eq!(Founder::find().count(&db).await.unwrap(), 1);
}

#[tokio::test]
async fn missing_founder_list_keeps_stored_founders() {
    let db = test_db().await;
    let upstream = FakeUpstream::new();
    let mut acme = startup(1, "Acme", "Technology");
    acme.founders = founders(&[(10, "Ada")]);
    upstream.put(acme.clone());
    let sync = StartupSync::new(&db, upstream.as_ref(), 1000);
    sync.synchronize().await.unwrap();

    acme.founders = Some(vec![]);
    upstream.put(acme);
    sync.synchronize().await.unwrap();

    assert_eq!(Founder::find().count(&db).await.unwrap(), 1);
}

#[tokio::test]
async fn failed_detail_is_counted_and_skipped() {
    let db = test_db().await;
    let upstream = FakeUpstream::new();
    for id in 1..=3 {
        upstream.put(startup(id, &format!("Startup {}", id), "Technology"));
    }
    upstream.fail_detail(2);

    let summary = StartupSync::new(&db, upstream.as_ref(), 1000)
        .synchronize()
        .await
        .unwrap();

    assert_eq!(summary.created, 2);
    assert_eq!(summary.failures, 1);
    assert_eq!(summary.total, 3);
    assert!(summary.message().ends_with(", 1 errors"));

    let repo = StartupRepository::new(&db);
    assert!(repo.find_by_jeb_id(1).await.unwrap().is_some());
    assert!(repo.find_by_jeb_id(2).await.unwrap().is_none());
    assert!(repo.find_by_jeb_id(3).await.unwrap().is_some());
}

#[tokio::test]
async fn listing_failure_aborts_before_any_write() {
    let db = test_db().await;
    let upstream = FakeUpstream::new();
    upstream.put(startup(1, "Acme", "Technology"));
    upstream.set_listing_down(true);

    let err = StartupSync::new(&db, upstream.as_ref(), 1000)
        .synchronize()
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::UpstreamUnavailable(_)));
    assert_eq!(upstream.detail_calls.load(std::sync::atomic::Ordering::SeqCst), 0);
    assert_eq!(Startup::find().count(&db).await.unwrap(), 0);
}

#[tokio::test]
async fn page_limit_bounds_the_run() {
    let db = test_db().await;
    let upstream = FakeUpstream::new();
    for id in 1..=5 {
        upstream.put(startup(id, &format!("Startup {}", id), "Technology"));
    }

    let summary = StartupSync::new(&db, upstream.as_ref(), 3)
        .synchronize()
        .await
        .unwrap();

    assert_eq!(summary.total, 3);
    assert_eq!(Startup::find().count(&db).await.unwrap(), 3);
}

#[tokio::test]
async fn connection_test_reports_without_writing() {
    let db = test_db().await;
    let upstream = FakeUpstream::new();
    upstream.put(startup(1, "Acme", "Technology"));
    let sync = StartupSync::new(&db, upstream.as_ref(), 1000);

    assert!(sync.test_connection().await.success);
    upstream.set_listing_down(true);
    let down = sync.test_connection().await;
    assert!(!down.success);
    assert!(down.message.contains("503"));
    assert_eq!(Startup::find().count(&db).await.unwrap(), 0);
}
