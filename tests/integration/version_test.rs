//! Integration tests for version history.

mod helpers;

use serde_json::json;

use helpers::{TestApp, article};
use revhub_core::ErrorKind;
use revhub_core::types::{ContentKey, PageRequest};
use revhub_entity::{LineageFilter, VersionFilter, VersionMeta};

#[tokio::test]
async fn test_numbers_are_strictly_increasing_per_item() {
    let app = TestApp::new();
    let other = ContentKey::new("article", "43").expect("key");

    for n in 1..=4 {
        let v = app.publish(&article(), json!({"title": format!("T{n}")})).await;
        assert_eq!(v.version_number, n);
    }
    let v = app.publish(&other, json!({"title": "Other"})).await;
    assert_eq!(v.version_number, 1);

    assert_eq!(app.numbers(&article()).await, vec![4, 3, 2, 1]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_concurrent_creates_never_share_a_number() {
    let app = TestApp::new();
    let key = article();

    let mut handles = Vec::new();
    for n in 0..32 {
        let versions = app.services.versions.clone();
        let key = key.clone();
        handles.push(tokio::spawn(async move {
            versions
                .create_version(&key, helpers::snapshot(json!({"n": n})), VersionMeta::default())
                .await
        }));
    }

    let mut created = 0;
    for handle in handles {
        match handle.await.expect("task panicked") {
            Ok(_) => created += 1,
            Err(err) => assert_eq!(err.kind, ErrorKind::Conflict, "unexpected error: {err}"),
        }
    }

    assert!(created >= 1);
    assert_eq!(app.numbers(&key).await, (1..=created).rev().collect::<Vec<i32>>());
}

#[tokio::test]
async fn test_versions_are_immutable_once_written() {
    let app = TestApp::new();
    let v1 = app
        .create(
            &article(),
            json!({"title": "A", "meta": {"tags": ["x"]}}),
            VersionMeta::current_by(Some(app.user)).with_comment("First draft"),
        )
        .await;
    app.publish(&article(), json!({"title": "B"})).await;
    app.publish(&article(), json!({"title": "C"})).await;

    let reloaded = app.services.versions.get_version(v1.id).await.expect("get");
    assert_eq!(reloaded, v1);
    assert_eq!(reloaded.comment.as_deref(), Some("First draft"));
    assert_eq!(reloaded.author_id, Some(app.user));
}

#[tokio::test]
async fn test_current_version_follows_pointer() {
    let app = TestApp::new();
    app.publish(&article(), json!({"title": "A"})).await;
    app.create(&article(), json!({"title": "B"}), VersionMeta::default())
        .await;

    let current = app.services.versions.current_version(&article()).await.expect("current");
    assert_eq!(current.version_number, 1);
    assert_eq!(current.data["title"], json!("A"));
}

#[tokio::test]
async fn test_listing_filters_by_tag_branch_and_comment() {
    let app = TestApp::new();
    let v1 = app
        .create(
            &article(),
            json!({"title": "A"}),
            VersionMeta::current_by(None).with_tag("launch").with_comment("Initial import"),
        )
        .await;
    app.services
        .branches
        .create_branch(&app.ctx(), &article(), "redesign", v1.id, false)
        .await
        .expect("branch");
    app.create(
        &article(),
        json!({"title": "Redesigned"}),
        VersionMeta::default().on_branch("redesign").with_comment("New layout"),
    )
    .await;
    app.create(
        &article(),
        json!({"title": "B"}),
        VersionMeta::default().with_comment("Fix IMPORT glitch"),
    )
    .await;

    let list = |filter: VersionFilter| {
        let services = app.services.clone();
        async move {
            services
                .versions
                .list_versions(&article(), &filter, &PageRequest::default())
                .await
                .expect("list")
                .items
                .iter()
                .map(|v| v.version_number)
                .collect::<Vec<_>>()
        }
    };

    assert_eq!(list(VersionFilter::default()).await, vec![3, 2, 1]);
    assert_eq!(list(VersionFilter::default().with_tag("launch")).await, vec![1]);
    assert_eq!(
        list(VersionFilter::default().with_branch(LineageFilter::parse("redesign"))).await,
        vec![2]
    );
    assert_eq!(
        list(VersionFilter::default().with_branch(LineageFilter::Main)).await,
        vec![3, 1]
    );
    assert_eq!(list(VersionFilter::default().with_search("import")).await, vec![3, 1]);
}

#[tokio::test]
async fn test_delete_guards_history_invariants() {
    let app = TestApp::new();
    let v1 = app.publish(&article(), json!({"title": "A"})).await;

    let err = app.services.versions.delete_version(v1.id).await.expect_err("sole");
    assert_eq!(err.kind, ErrorKind::InvalidOperation);

    let v2 = app.publish(&article(), json!({"title": "B"})).await;
    let err = app.services.versions.delete_version(v2.id).await.expect_err("current");
    assert_eq!(err.kind, ErrorKind::InvalidOperation);

    app.services.versions.delete_version(v1.id).await.expect("delete");
    assert_eq!(app.numbers(&article()).await, vec![2]);

    let v3 = app.publish(&article(), json!({"title": "C"})).await;
    assert_eq!(v3.version_number, 3);
}
