//! Integration tests for comparing versions.

mod helpers;

use serde_json::json;

use helpers::{TestApp, article};
use revhub_core::ErrorKind;
use revhub_core::types::{ContentKey, VersionId};
use revhub_diff::{DiffStatus, FieldDiff, render};

#[tokio::test]
async fn test_article_body_edit() {
    let app = TestApp::new();
    let v1 = app.publish(&article(), json!({"title": "A", "body": "Hello"})).await;
    let v2 = app
        .publish(&article(), json!({"title": "A", "body": "Hello world"}))
        .await;

    let cmp = app
        .services
        .comparison
        .compare_versions(v1.id, v2.id)
        .await
        .expect("compare");

    assert_eq!(cmp.old_version_number, 1);
    assert_eq!(cmp.new_version_number, 2);
    assert_eq!(
        cmp.diff.field("title").map(FieldDiff::status),
        Some(DiffStatus::Unchanged)
    );
    match cmp.diff.field("body") {
        Some(FieldDiff::Text { status, old, new, .. }) => {
            assert_eq!(*status, DiffStatus::Modified);
            assert_eq!(old, "Hello");
            assert_eq!(new, "Hello world");
        }
        other => panic!("expected a text diff for body, got {other:?}"),
    }
    assert_eq!(cmp.stats.insertions, 1);
    assert_eq!(cmp.stats.deletions, 1);
    assert_eq!(cmp.stats.changes, 0);
    assert_eq!(cmp.diff.similarity_percentage, 50.0);
    assert_eq!(cmp.stats.fields_changed, vec!["body".to_string()]);
}

#[tokio::test]
async fn test_identical_versions_are_fully_similar() {
    let app = TestApp::new();
    let data = json!({"title": "Same", "meta": {"seo": {"index": true}}, "tags": [1, 2]});
    let v1 = app.publish(&article(), data.clone()).await;
    let v2 = app.publish(&article(), data).await;

    let cmp = app
        .services
        .comparison
        .compare_versions(v1.id, v2.id)
        .await
        .expect("compare");
    assert!(cmp.diff.is_identical());
    assert!(cmp.stats.is_empty());
    assert_eq!(cmp.diff.similarity_percentage, 100.0);
    assert_eq!(cmp.stats.summary(), "No changes");
}

#[tokio::test]
async fn test_comparison_is_deterministic() {
    let app = TestApp::new();
    let v1 = app
        .publish(&article(), json!({"b": 1, "a": {"x": 1}, "body": "one\ntwo"}))
        .await;
    let v2 = app
        .publish(&article(), json!({"a": {"x": 2, "y": 3}, "c": false, "body": "two\nthree"}))
        .await;

    let first = app.services.comparison.compare_versions(v1.id, v2.id).await.expect("first");
    let second = app.services.comparison.compare_versions(v1.id, v2.id).await.expect("second");
    assert_eq!(first.diff, second.diff);
    assert_eq!(render(&first.diff), render(&second.diff));
}

#[tokio::test]
async fn test_cross_item_comparison_is_rejected() {
    let app = TestApp::new();
    let other = ContentKey::new("article", "43").expect("key");
    let a = app.publish(&article(), json!({"title": "A"})).await;
    let b = app.publish(&other, json!({"title": "A"})).await;

    let err = app
        .services
        .comparison
        .compare_versions(a.id, b.id)
        .await
        .expect_err("different items");
    assert_eq!(err.kind, ErrorKind::Validation);
}

#[tokio::test]
async fn test_missing_version_is_not_found() {
    let app = TestApp::new();
    let v1 = app.publish(&article(), json!({"title": "A"})).await;
    let err = app
        .services
        .comparison
        .compare_versions(v1.id, VersionId::new())
        .await
        .expect_err("missing");
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_compare_with_current_puts_given_version_first() {
    let app = TestApp::new();
    let v1 = app.publish(&article(), json!({"title": "Old"})).await;
    app.publish(&article(), json!({"title": "New", "slug": "new"})).await;

    let cmp = app
        .services
        .comparison
        .compare_with_current(v1.id)
        .await
        .expect("compare");
    assert_eq!(cmp.old_version_number, 1);
    assert_eq!(cmp.new_version_number, 2);
    assert_eq!(cmp.stats.summary(), "1 addition, 1 modification");

    let text = render(&cmp.diff);
    assert!(text.contains("+ slug"));
    assert!(text.contains("~ title"));
}
