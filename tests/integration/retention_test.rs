//! Integration tests for retention.

mod helpers;

use chrono::{Duration, Utc};
use serde_json::json;

use helpers::{TestApp, article};
use revhub_core::config::{AppConfig, RetentionConfig};
use revhub_entity::VersionMeta;

#[tokio::test]
async fn test_purge_never_removes_current_or_first_version() {
    let app = TestApp::new();
    let key = article();
    for n in 1..=5 {
        app.publish(&key, json!({"title": format!("T{n}")})).await;
    }
    let current = app.services.versions.current_number(&key).await.expect("current");
    assert_eq!(current, Some(5));

    let removed = app
        .services
        .retention
        .purge_before(&key, Utc::now() + Duration::minutes(1))
        .await
        .expect("purge");
    assert_eq!(removed, 3);
    assert_eq!(app.numbers(&key).await, vec![5, 1]);

    let removed = app
        .services
        .retention
        .purge_before(&key, Utc::now() + Duration::minutes(1))
        .await
        .expect("purge again");
    assert_eq!(removed, 0);
}

#[tokio::test]
async fn test_current_pointer_is_protected_even_when_not_newest() {
    let app = TestApp::new();
    let key = article();
    app.publish(&key, json!({"title": "A"})).await;
    app.publish(&key, json!({"title": "B"})).await;
    app.create(&key, json!({"title": "C draft"}), VersionMeta::default())
        .await;

    let removed = app
        .services
        .retention
        .purge_before(&key, Utc::now() + Duration::minutes(1))
        .await
        .expect("purge");
    assert_eq!(removed, 1);
    assert_eq!(app.numbers(&key).await, vec![2, 1]);
}

#[tokio::test]
async fn test_branch_bases_survive_purge() {
    let app = TestApp::new();
    let key = article();
    app.publish(&key, json!({"title": "A"})).await;
    let v2 = app.publish(&key, json!({"title": "B"})).await;
    app.publish(&key, json!({"title": "C"})).await;
    app.services
        .branches
        .create_branch(&app.ctx(), &key, "keep-me", v2.id, false)
        .await
        .expect("branch");
    app.publish(&key, json!({"title": "D"})).await;

    let removed = app
        .services
        .retention
        .purge_before(&key, Utc::now() + Duration::minutes(1))
        .await
        .expect("purge");
    assert_eq!(removed, 1);
    assert_eq!(app.numbers(&key).await, vec![4, 2, 1]);
}

#[tokio::test]
async fn test_keep_latest_uses_configured_default() {
    let app = TestApp::with_config(AppConfig {
        retention: RetentionConfig {
            keep_latest: 2,
            ..RetentionConfig::default()
        },
        ..AppConfig::default()
    });
    let key = article();
    for n in 1..=6 {
        app.publish(&key, json!({"n": n})).await;
    }

    let removed = app
        .services
        .retention
        .keep_latest(&key, None)
        .await
        .expect("keep latest");
    assert_eq!(removed, 3);
    assert_eq!(app.numbers(&key).await, vec![6, 5, 1]);

    let removed = app
        .services
        .retention
        .keep_latest(&key, Some(1))
        .await
        .expect("keep one");
    assert_eq!(removed, 1);
    assert_eq!(app.numbers(&key).await, vec![6, 1]);
}

#[tokio::test]
async fn test_purge_of_unknown_item_is_a_no_op() {
    let app = TestApp::new();
    let removed = app
        .services
        .retention
        .purge_older_than(&article(), 30)
        .await
        .expect("purge");
    assert_eq!(removed, 0);
}
