//! Integration tests for restore, including the full article walkthrough.

mod helpers;

use std::time::Duration;

use serde_json::json;

use helpers::{TestApp, article};
use revhub_core::ErrorKind;
use revhub_core::types::{PageRequest, VersionId};
use revhub_entity::{VersionFilter, VersionMeta};

#[tokio::test]
async fn test_article_walkthrough() {
    let app = TestApp::new();
    let key = article();
    let v1 = app.publish(&key, json!({"title": "A", "body": "Hello"})).await;
    let v2 = app.publish(&key, json!({"title": "A", "body": "Hello world"})).await;

    let cmp = app
        .services
        .comparison
        .compare_versions(v1.id, v2.id)
        .await
        .expect("compare");
    assert_eq!(cmp.stats.insertions, 1);
    assert_eq!(cmp.stats.deletions, 1);
    assert_eq!(cmp.stats.changes, 0);
    assert_eq!(cmp.diff.similarity_percentage, 50.0);

    let v3 = app
        .services
        .restore
        .restore_version(&app.ctx(), v1.id)
        .await
        .expect("restore");
    assert_eq!(v3.version_number, 3);
    assert_eq!(v3.data, v1.data);

    let page = app
        .services
        .versions
        .list_versions(&key, &VersionFilter::default(), &PageRequest::default())
        .await
        .expect("list");
    let ids: Vec<VersionId> = page.items.iter().map(|v| v.id).collect();
    assert_eq!(ids, vec![v3.id, v2.id, v1.id]);

    tokio::time::sleep(Duration::from_millis(10)).await;
    let removed = app
        .services
        .retention
        .purge_older_than(&key, 0)
        .await
        .expect("purge");
    assert_eq!(removed, 1);
    assert_eq!(app.numbers(&key).await, vec![3, 1]);
}

#[tokio::test]
async fn test_restore_appends_and_preserves_history() {
    let app = TestApp::new();
    let key = article();
    let v1 = app.publish(&key, json!({"title": "One"})).await;
    let v2 = app.publish(&key, json!({"title": "Two"})).await;
    let before = app.services.versions.list_all(&key).await.expect("list");

    let restored = app
        .services
        .restore
        .restore_version(&app.ctx(), v1.id)
        .await
        .expect("restore");

    assert_eq!(restored.version_number, 3);
    assert_eq!(restored.author_id, Some(app.user));
    assert_eq!(restored.comment.as_deref(), Some("Restored from version 1"));
    assert_eq!(restored.restored_from, Some(1));

    let after = app.services.versions.list_all(&key).await.expect("list");
    assert_eq!(after.len(), before.len() + 1);
    assert_eq!(&after[1..], &before[..]);

    let current = app.services.versions.current_version(&key).await.expect("current");
    assert_eq!(current.id, restored.id);
    assert_ne!(current.id, v2.id);
}

#[tokio::test]
async fn test_restore_shows_in_timeline() {
    let app = TestApp::new();
    let key = article();
    let v1 = app.publish(&key, json!({"title": "One"})).await;
    app.publish(&key, json!({"title": "Two", "slug": "two"})).await;
    app.services
        .restore
        .restore_version(&app.ctx(), v1.id)
        .await
        .expect("restore");

    let entries = app.services.timeline.timeline(&key).await.expect("timeline");
    let summaries: Vec<&str> = entries.iter().map(|e| e.summary.as_str()).collect();
    assert_eq!(
        summaries,
        vec![
            "Restored from version 1",
            "1 addition, 1 modification",
            "Initial version"
        ]
    );
    assert!(entries[0].is_current);
    assert!(entries[1..].iter().all(|e| !e.is_current));
}

#[tokio::test]
async fn test_restore_unknown_version() {
    let app = TestApp::new();
    let err = app
        .services
        .restore
        .restore_version(&app.ctx(), VersionId::new())
        .await
        .expect_err("missing");
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_restore_item_without_pointer_row() {
    let app = TestApp::new();
    let key = article();
    let v1 = app
        .create(&key, json!({"title": "Draft"}), VersionMeta::default())
        .await;
    app.create(&key, json!({"title": "Draft 2"}), VersionMeta::default())
        .await;
    assert_eq!(app.services.versions.current_number(&key).await.expect("current"), Some(2));

    let restored = app
        .services
        .restore
        .restore_version(&app.ctx(), v1.id)
        .await
        .expect("restore");
    assert_eq!(restored.version_number, 3);
    assert_eq!(restored.restored_from, Some(1));

    let current = app.services.versions.current_version(&key).await.expect("current");
    assert_eq!(current.id, restored.id);
    assert_eq!(current.data, v1.data);
}
