// ABOUTME: Integration tests for the storage layers against a migrated in-memory database
// ABOUTME: Covers identity resolution, ownership scoping, upsert semantics, and memory listing

use agentboard_core::{
    AgentMetricUpsert, MemoryEntryInput, MemoryQuery, MetricChange, ProjectCreateInput, Trend,
};
use agentboard_storage::{DbState, StorageError};
use chrono::Utc;
use pretty_assertions::assert_eq;
use serde_json::json;

async fn setup() -> DbState {
    DbState::in_memory(16).await.unwrap()
}

async fn user_with_project(db: &DbState, subject: &str) -> (String, String) {
    let user = db
        .user_storage
        .resolve_identity(subject, Some(&format!("{}@example.com", subject)))
        .await
        .unwrap();
    let project = db
        .project_storage
        .create(
            &user.id,
            ProjectCreateInput {
                name: format!("{} project", subject),
                github_repo: Some("octo/repo".to_string()),
            },
        )
        .await
        .unwrap();
    (user.id, project.id)
}

#[tokio::test]
async fn test_resolve_identity_creates_once() {
    let db = setup().await;

    let first = db
        .user_storage
        .resolve_identity("idp|1", Some("a@example.com"))
        .await
        .unwrap();
    let second = db.user_storage.resolve_identity("idp|1", None).await.unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(second.email, "a@example.com");

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(&db.pool)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn test_resolve_identity_requires_email_for_new_user() {
    let db = setup().await;

    let err = db
        .user_storage
        .resolve_identity("idp|2", Some("  "))
        .await
        .unwrap_err();

    assert!(matches!(err, StorageError::Validation(_)));
    assert_eq!(err.to_string(), "User email not found");
}

#[tokio::test]
async fn test_github_credentials_round_trip() {
    let db = setup().await;
    let user = db
        .user_storage
        .resolve_identity("idp|3", Some("c@example.com"))
        .await
        .unwrap();
    assert!(!user.has_github_token());

    let connected = db
        .user_storage
        .set_github_credentials(&user.id, Some("octocat"), "ghp_token")
        .await
        .unwrap();
    assert_eq!(connected.github_username.as_deref(), Some("octocat"));
    assert!(connected.has_github_token());

    let cleared = db.user_storage.clear_github_credentials(&user.id).await.unwrap();
    assert!(!cleared.has_github_token());
    assert_eq!(cleared.github_username, None);

    let err = db
        .user_storage
        .set_github_credentials(&user.id, None, "   ")
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::Validation(_)));
}

#[tokio::test]
async fn test_projects_are_scoped_to_owner() {
    let db = setup().await;
    let (alice, project_id) = user_with_project(&db, "alice").await;
    let (bob, _) = user_with_project(&db, "bob").await;

    assert!(db.project_storage.get_owned(&alice, &project_id).await.unwrap().is_some());
    assert!(db.project_storage.get_owned(&bob, &project_id).await.unwrap().is_none());
    db.metrics_storage
        .upsert(&project_id, &AgentMetricUpsert::empty("guarded"))
        .await
        .unwrap();
    let mut rx = db.change_feed.subscribe();
    assert!(!db.project_storage.delete_owned(&bob, &project_id).await.unwrap());
    assert!(rx.try_recv().is_err());

    let listed = db.project_storage.list_for_user(&bob).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert!(listed.iter().all(|p| p.user_id == bob));
}

#[tokio::test]
async fn test_projects_listed_newest_first() {
    let db = setup().await;
    let user = db
        .user_storage
        .resolve_identity("idp|order", Some("o@example.com"))
        .await
        .unwrap();

    for name in ["first", "second", "third"] {
        db.project_storage
            .create(
                &user.id,
                ProjectCreateInput {
                    name: name.to_string(),
                    github_repo: None,
                },
            )
            .await
            .unwrap();
    }

    let names: Vec<String> = db
        .project_storage
        .list_for_user(&user.id)
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.name)
        .collect();
    assert_eq!(names, vec!["third", "second", "first"]);
}

#[tokio::test]
async fn test_mark_synced() {
    let db = setup().await;
    let (user_id, project_id) = user_with_project(&db, "sync").await;

    let now = Utc::now();
    db.project_storage.mark_synced(&project_id, now).await.unwrap();

    let project = db
        .project_storage
        .get_owned(&user_id, &project_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        project.last_synced_at.map(|t| t.timestamp_micros()),
        Some(now.timestamp_micros())
    );

    let err = db.project_storage.mark_synced("missing", now).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_upsert_inserts_then_updates_in_place() {
    let db = setup().await;
    let (_, project_id) = user_with_project(&db, "metrics").await;
    let mut rx = db.change_feed.subscribe();

    let mut input = AgentMetricUpsert::empty("reviewer");
    input.total_runs = 10;
    input.successful_runs = 9;
    input.failed_runs = 1;
    input.success_rate = 0.9;
    input.findings = json!({"security": 2});
    let inserted = db.metrics_storage.upsert(&project_id, &input).await.unwrap();

    input.total_runs = 11;
    input.trend = Trend::Improving;
    let updated = db.metrics_storage.upsert(&project_id, &input).await.unwrap();

    assert_eq!(inserted.id, updated.id);
    assert_eq!(updated.total_runs, 11);
    assert_eq!(updated.trend, Trend::Improving);
    assert_eq!(updated.findings, json!({"security": 2}));

    assert!(matches!(rx.recv().await.unwrap(), MetricChange::Insert { .. }));
    assert!(matches!(rx.recv().await.unwrap(), MetricChange::Update { .. }));

    let rows = db.metrics_storage.list_for_project(&project_id).await.unwrap();
    assert_eq!(rows.len(), 1);
}

#[tokio::test]
async fn test_upsert_rejects_negative_counts() {
    let db = setup().await;
    let (_, project_id) = user_with_project(&db, "negative").await;

    let mut input = AgentMetricUpsert::empty("broken");
    input.total_runs = -1;

    let err = db.metrics_storage.upsert(&project_id, &input).await.unwrap_err();
    assert!(matches!(err, StorageError::Sqlx(_)));
    assert!(db.metrics_storage.list_for_project(&project_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_metrics_ordered_by_agent_name_and_delete_publishes() {
    let db = setup().await;
    let (_, project_id) = user_with_project(&db, "ordering").await;

    for name in ["zeta", "alpha", "mid"] {
        db.metrics_storage
            .upsert(&project_id, &AgentMetricUpsert::empty(name))
            .await
            .unwrap();
    }

    let rows = db.metrics_storage.list_for_project(&project_id).await.unwrap();
    let names: Vec<&str> = rows.iter().map(|m| m.agent_name.as_str()).collect();
    assert_eq!(names, vec!["alpha", "mid", "zeta"]);

    let mut rx = db.change_feed.subscribe();
    assert!(db.metrics_storage.delete(&project_id, &rows[0].id).await.unwrap());
    match rx.recv().await.unwrap() {
        MetricChange::Delete { id, project_id: pid } => {
            assert_eq!(id, rows[0].id);
            assert_eq!(pid, project_id);
        }
        other => panic!("unexpected change: {:?}", other),
    }
}

#[tokio::test]
async fn test_project_delete_cascades() {
    let db = setup().await;
    let (user_id, project_id) = user_with_project(&db, "cascade").await;

    let metric = db
        .metrics_storage
        .upsert(&project_id, &AgentMetricUpsert::empty("a"))
        .await
        .unwrap();
    db.memory_storage
        .append(
            &project_id,
            MemoryEntryInput {
                entity_name: "a".to_string(),
                entity_type: "agent".to_string(),
                observation: "ran".to_string(),
                metadata: None,
            },
        )
        .await
        .unwrap();

    let mut rx = db.change_feed.subscribe();
    assert!(db.project_storage.delete_owned(&user_id, &project_id).await.unwrap());

    match rx.try_recv().unwrap() {
        MetricChange::Delete { id, project_id: pid } => {
            assert_eq!(id, metric.id);
            assert_eq!(pid, project_id);
        }
        other => panic!("unexpected change: {:?}", other),
    }

    let metrics: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM agent_metrics")
        .fetch_one(&db.pool)
        .await
        .unwrap();
    let memories: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM memory_entries")
        .fetch_one(&db.pool)
        .await
        .unwrap();
    assert_eq!((metrics, memories), (0, 0));
}

#[tokio::test]
async fn test_memory_listing_filters_and_limits() {
    let db = setup().await;
    let (_, project_id) = user_with_project(&db, "memory").await;

    for i in 0..5 {
        let entity_type = if i % 2 == 0 { "agent" } else { "file" };
        db.memory_storage
            .append(
                &project_id,
                MemoryEntryInput {
                    entity_name: format!("entity-{}", i),
                    entity_type: entity_type.to_string(),
                    observation: format!("observation {}", i),
                    metadata: Some(json!({"index": i})),
                },
            )
            .await
            .unwrap();
    }

    let all = db
        .memory_storage
        .list(&project_id, &MemoryQuery::default())
        .await
        .unwrap();
    assert_eq!(all.len(), 5);
    assert_eq!(all[0].entity_name, "entity-4");
    assert_eq!(all[4].entity_name, "entity-0");

    let agents = db
        .memory_storage
        .list(
            &project_id,
            &MemoryQuery {
                entity_type: Some("agent".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(agents.len(), 3);

    let limited = db
        .memory_storage
        .list(
            &project_id,
            &MemoryQuery {
                limit: 2,
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(limited.len(), 2);
}

#[tokio::test]
async fn test_memory_append_validates_input() {
    let db = setup().await;
    let (_, project_id) = user_with_project(&db, "invalid").await;

    let err = db
        .memory_storage
        .append(
            &project_id,
            MemoryEntryInput {
                entity_name: "x".to_string(),
                entity_type: "agent".to_string(),
                observation: "  ".to_string(),
                metadata: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::Validation(_)));

    let err = db
        .memory_storage
        .append(
            &project_id,
            MemoryEntryInput {
                entity_name: "x".to_string(),
                entity_type: "agent".to_string(),
                observation: "ok".to_string(),
                metadata: Some(json!([1, 2])),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::Validation(_)));
}

#[tokio::test]
async fn test_file_backed_database() {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = temp_dir.path().join("nested").join("agentboard.db");

    let db = DbState::init_with_path(Some(path.clone()), 8).await.unwrap();
    db.user_storage
        .resolve_identity("idp|file", Some("f@example.com"))
        .await
        .unwrap();
    drop(db);

    let reopened = DbState::init_with_path(Some(path), 8).await.unwrap();
    assert!(reopened
        .user_storage
        .find_by_subject("idp|file")
        .await
        .unwrap()
        .is_some());
}
