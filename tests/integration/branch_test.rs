//! Integration tests for branches.

mod helpers;

use serde_json::json;

use helpers::{TestApp, article};
use revhub_core::ErrorKind;
use revhub_entity::VersionMeta;

#[tokio::test]
async fn test_branch_lifecycle() {
    let app = TestApp::new();
    let key = article();
    let v1 = app
        .publish(&key, json!({"title": "Spring", "body": "Intro\nPrices"}))
        .await;

    let branch = app
        .services
        .branches
        .create_branch(&app.ctx(), &key, "spring-sale", v1.id, true)
        .await
        .expect("create");
    assert!(branch.is_default);
    assert_eq!(branch.created_by, Some(app.user));

    app.create(
        &key,
        json!({"title": "Spring", "body": "Intro\nPrices -20%"}),
        VersionMeta::default().on_branch("spring-sale"),
    )
    .await;
    app.publish(&key, json!({"title": "Spring!", "body": "Intro\nPrices"}))
        .await;

    let summaries = app.services.branches.list_branches(&key).await.expect("list");
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].base_version.id, v1.id);
    assert_eq!(summaries[0].head().version_number, 2);

    let result = app
        .services
        .branches
        .compare_branch(branch.id)
        .await
        .expect("compare");
    assert_eq!(result.main_version_number, 3);
    assert_eq!(result.head_version_number, 2);
    assert!(!result.has_conflicts());

    let merged = app
        .services
        .branches
        .merge_branch(&app.ctx(), branch.id, true)
        .await
        .expect("merge");
    assert_eq!(merged.version_number, 4);
    assert!(merged.is_main_lineage());
    assert_eq!(merged.data["body"], json!("Intro\nPrices -20%"));

    let current = app.services.versions.current_version(&key).await.expect("current");
    assert_eq!(current.id, merged.id);
    assert!(app.services.branches.list_branches(&key).await.expect("list").is_empty());
    assert_eq!(
        app.services.branches.list_all_branches(&key).await.expect("all").len(),
        1
    );
}

#[tokio::test]
async fn test_branch_rules() {
    let app = TestApp::new();
    let key = article();
    let v1 = app.publish(&key, json!({"title": "A"})).await;
    let branches = &app.services.branches;

    branches
        .create_branch(&app.ctx(), &key, "draft", v1.id, false)
        .await
        .expect("create");
    let err = branches
        .create_branch(&app.ctx(), &key, "draft", v1.id, false)
        .await
        .expect_err("duplicate");
    assert_eq!(err.kind, ErrorKind::Validation);

    let err = app
        .services
        .versions
        .create_version(
            &key,
            helpers::snapshot(json!({"title": "B"})),
            VersionMeta::default().on_branch("missing"),
        )
        .await
        .expect_err("unknown branch");
    assert_eq!(err.kind, ErrorKind::Validation);

    app.publish(&key, json!({"title": "B"})).await;
    let err = app
        .services
        .versions
        .delete_version(v1.id)
        .await
        .expect_err("branch base");
    assert_eq!(err.kind, ErrorKind::InvalidOperation);
}

#[tokio::test]
async fn test_conflicting_edits_are_reported() {
    let app = TestApp::new();
    let key = article();
    let v1 = app.publish(&key, json!({"title": "A", "slug": "a"})).await;
    let branch = app
        .services
        .branches
        .create_branch(&app.ctx(), &key, "rewrite", v1.id, false)
        .await
        .expect("create");
    app.create(
        &key,
        json!({"title": "Branch title", "slug": "a"}),
        VersionMeta::default().on_branch("rewrite"),
    )
    .await;
    app.publish(&key, json!({"title": "Main title", "slug": "a"})).await;

    let result = app
        .services
        .branches
        .compare_branch(branch.id)
        .await
        .expect("compare");
    assert!(result.has_conflicts());
    assert_eq!(result.conflicts[0].field, "title");
    assert_eq!(result.conflicts[0].ours, Some(json!("Main title")));
    assert_eq!(result.conflicts[0].theirs, Some(json!("Branch title")));
}
