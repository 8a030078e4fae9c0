//! End-to-end batch workflows against a mock server.

use serde_json::json;
use vikunja_batch::{BatchError, BatchOptions, Orchestrator, TaskInput};
use vikunja_client::ApiClient;
use vikunja_config::{ConfigStore, ProjectConfig, SortStrategy, SortStrategyConfig};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn orchestrator_for(server: &MockServer, dir: &tempfile::TempDir) -> Orchestrator {
    let client = ApiClient::new(&server.uri(), "test-token").unwrap();
    let store = ConfigStore::new(dir.path().join("config.yaml"));
    Orchestrator::new(client, store)
}

async fn mock_empty_labels(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/v1/labels"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(server)
        .await;
}

async fn mock_create_task(server: &MockServer, project_id: i64, title: &str, id: i64) {
    Mock::given(method("PUT"))
        .and(path(format!("/api/v1/projects/{project_id}/tasks")))
        .and(body_partial_json(json!({ "title": title })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "id": id, "title": title })),
        )
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn wires_forward_refs_between_batch_members() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    mock_empty_labels(&server).await;
    mock_create_task(&server, 1, "Design", 10).await;
    mock_create_task(&server, 1, "Build", 11).await;
    Mock::given(method("PUT"))
        .and(path("/api/v1/tasks/11/relations"))
        .and(body_partial_json(
            json!({ "other_task_id": 10, "relation_kind": "blocked" }),
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let orchestrator = orchestrator_for(&server, &dir);
    let tasks = vec![
        TaskInput {
            title: "Design".to_string(),
            task_ref: Some("design".to_string()),
            ..Default::default()
        },
        TaskInput {
            title: "Build".to_string(),
            blocked_by: vec!["design".to_string()],
            ..Default::default()
        },
    ];
    let report = orchestrator
        .batch_create(1, tasks, &BatchOptions::default())
        .await
        .unwrap();

    assert_eq!(report.created, 2);
    assert_eq!(report.relations_created, 1);
    assert!(report.errors.is_empty(), "{:?}", report.errors);
}

#[tokio::test]
async fn unknown_ref_is_reported_without_a_relation_call() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    mock_empty_labels(&server).await;
    mock_create_task(&server, 1, "Build", 11).await;
    Mock::given(method("PUT"))
        .and(path("/api/v1/tasks/11/relations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let orchestrator = orchestrator_for(&server, &dir);
    let tasks = vec![TaskInput {
        title: "Build".to_string(),
        blocked_by: vec!["ghost".to_string()],
        ..Default::default()
    }];
    let report = orchestrator
        .batch_create(1, tasks, &BatchOptions::default())
        .await
        .unwrap();

    assert_eq!(report.created, 1);
    assert_eq!(report.relations_created, 0);
    assert_eq!(report.errors.len(), 1);
    assert!(report.errors[0].contains("Unknown ref 'ghost'"));
}

#[tokio::test]
async fn missing_labels_are_created_from_the_palette_and_attached() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    mock_empty_labels(&server).await;
    Mock::given(method("PUT"))
        .and(path("/api/v1/labels"))
        .and(body_partial_json(
            json!({ "title": "urgent", "hex_color": "#3498db" }),
        ))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "id": 9, "title": "urgent" })),
        )
        .expect(1)
        .mount(&server)
        .await;
    mock_create_task(&server, 1, "Fix oven", 21).await;
    Mock::given(method("PUT"))
        .and(path("/api/v1/tasks/21/labels"))
        .and(body_partial_json(json!({ "label_id": 9 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let orchestrator = orchestrator_for(&server, &dir);
    let tasks = vec![TaskInput {
        title: "Fix oven".to_string(),
        labels: vec!["urgent".to_string()],
        ..Default::default()
    }];
    let report = orchestrator
        .batch_create(1, tasks, &BatchOptions::default())
        .await
        .unwrap();

    assert_eq!(report.labels_created, vec!["urgent"]);
    assert!(report.errors.is_empty(), "{:?}", report.errors);
}

#[tokio::test]
async fn default_bucket_and_due_date_sort_are_applied() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    mock_empty_labels(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/v1/projects/1/views"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 7, "title": "Kanban", "view_kind": "kanban" },
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/projects/1/views/7/buckets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 70, "title": "Backlog" },
        ])))
        .mount(&server)
        .await;
    mock_create_task(&server, 1, "Design", 1).await;
    mock_create_task(&server, 1, "Build", 2).await;
    Mock::given(method("POST"))
        .and(path("/api/v1/projects/1/views/7/buckets/70/tasks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(2)
        .mount(&server)
        .await;
    // Both tasks in the bucket are the ones just created, so the ladder
    // starts empty and positions come out gapped from the start.
    Mock::given(method("GET"))
        .and(path("/api/v1/projects/1/views/7/tasks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": 70,
                "title": "Backlog",
                "tasks": [
                    { "id": 1, "title": "Design", "position": 65536.0 },
                    { "id": 2, "title": "Build", "position": 65537.0 },
                ],
            },
        ])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/tasks/1/position"))
        .and(body_partial_json(
            json!({ "project_view_id": 7, "position": 1000.0 }),
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/tasks/2/position"))
        .and(body_partial_json(
            json!({ "project_view_id": 7, "position": 2000.0 }),
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let orchestrator = orchestrator_for(&server, &dir);
    orchestrator
        .store()
        .set(
            1,
            ProjectConfig {
                default_bucket: Some("Backlog".to_string()),
                sort_strategy: SortStrategyConfig {
                    default: SortStrategy::DueDate,
                    ..Default::default()
                },
                ..Default::default()
            },
        )
        .unwrap();

    let tasks = vec![
        TaskInput {
            title: "Design".to_string(),
            due_date: Some("2025-01-10T00:00:00Z".to_string()),
            ..Default::default()
        },
        // Undated, so it sorts after the dated task.
        TaskInput {
            title: "Build".to_string(),
            ..Default::default()
        },
    ];
    let report = orchestrator
        .batch_create(1, tasks, &BatchOptions::default())
        .await
        .unwrap();

    assert_eq!(report.created, 2);
    assert!(report.errors.is_empty(), "{:?}", report.errors);
}

#[tokio::test]
async fn kanban_failure_skips_placement_but_still_creates_tasks() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    mock_empty_labels(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/v1/projects/1/views"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;
    mock_create_task(&server, 1, "Design", 1).await;

    let orchestrator = orchestrator_for(&server, &dir);
    let tasks = vec![TaskInput {
        title: "Design".to_string(),
        bucket: Some("Backlog".to_string()),
        ..Default::default()
    }];
    let report = orchestrator
        .batch_create(1, tasks, &BatchOptions::default())
        .await
        .unwrap();

    assert_eq!(report.created, 1);
    assert_eq!(report.errors.len(), 1);
    assert!(report.errors[0].contains("Failed to get kanban view"));
}

#[tokio::test]
async fn sort_bucket_reassigns_gapped_positions() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    Mock::given(method("GET"))
        .and(path("/api/v1/projects/1/views/7/buckets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 70, "title": "Backlog" },
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/projects/1/views/7/tasks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": 70,
                "title": "Backlog",
                "tasks": [
                    { "id": 2, "title": "Later", "due_date": "2025-02-01T00:00:00Z", "position": 500.0 },
                    { "id": 1, "title": "Sooner", "due_date": "2025-01-01T00:00:00Z", "position": 600.0 },
                ],
            },
        ])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/tasks/1/position"))
        .and(body_partial_json(json!({ "position": 1000.0 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/tasks/2/position"))
        .and(body_partial_json(json!({ "position": 2000.0 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let orchestrator = orchestrator_for(&server, &dir);
    orchestrator
        .store()
        .set(
            1,
            ProjectConfig {
                sort_strategy: SortStrategyConfig {
                    default: SortStrategy::DueDate,
                    ..Default::default()
                },
                ..Default::default()
            },
        )
        .unwrap();

    let report = orchestrator.sort_bucket(1, 7, 70).await.unwrap();
    assert_eq!(report.sorted, 2);
    assert_eq!(report.strategy, "due_date");
    assert_eq!(report.tasks[0].task_id, 1);
    assert!(report.errors.is_empty(), "{:?}", report.errors);
}

#[tokio::test]
async fn sort_bucket_aborts_when_bucket_listing_fails() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    Mock::given(method("GET"))
        .and(path("/api/v1/projects/1/views/7/buckets"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;
    // Without the bucket name the manual override cannot be consulted,
    // so nothing may be repositioned.
    Mock::given(method("GET"))
        .and(path("/api/v1/projects/1/views/7/tasks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let orchestrator = orchestrator_for(&server, &dir);
    orchestrator
        .store()
        .set(
            1,
            ProjectConfig {
                sort_strategy: SortStrategyConfig {
                    default: SortStrategy::DueDate,
                    buckets: [("Backlog".to_string(), SortStrategy::Manual)]
                        .into_iter()
                        .collect(),
                },
                ..Default::default()
            },
        )
        .unwrap();

    let report = orchestrator.sort_bucket(1, 7, 70).await.unwrap();
    assert_eq!(report.sorted, 0);
    assert!(report.tasks.is_empty());
    assert!(report.strategy.is_empty());
    assert_eq!(report.errors.len(), 1);
    assert!(report.errors[0].contains("Failed to list buckets"));
}

#[tokio::test]
async fn sort_bucket_reports_unknown_bucket() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    Mock::given(method("GET"))
        .and(path("/api/v1/projects/1/views/7/buckets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 70, "title": "Backlog" },
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/projects/1/views/7/tasks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let orchestrator = orchestrator_for(&server, &dir);
    orchestrator
        .store()
        .set(
            1,
            ProjectConfig {
                sort_strategy: SortStrategyConfig {
                    default: SortStrategy::DueDate,
                    ..Default::default()
                },
                ..Default::default()
            },
        )
        .unwrap();

    let report = orchestrator.sort_bucket(1, 7, 99).await.unwrap();
    assert_eq!(report.sorted, 0);
    assert_eq!(report.errors, vec!["Bucket 99 not found"]);
}

#[tokio::test]
async fn sort_bucket_refuses_manual_buckets() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    Mock::given(method("GET"))
        .and(path("/api/v1/projects/1/views/7/buckets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 70, "title": "Backlog" },
        ])))
        .mount(&server)
        .await;

    let orchestrator = orchestrator_for(&server, &dir);
    orchestrator.store().set(1, ProjectConfig::default()).unwrap();

    let report = orchestrator.sort_bucket(1, 7, 70).await.unwrap();
    assert_eq!(report.sorted, 0);
    assert_eq!(report.strategy, "manual");
    assert_eq!(report.errors.len(), 1);
}

#[tokio::test]
async fn template_lookup_failures_are_fatal() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let orchestrator = orchestrator_for(&server, &dir);

    // No configuration at all.
    let err = orchestrator
        .create_from_template(1, "sourdough", "2025-06-10T08:00:00Z", &[], "", None)
        .await
        .unwrap_err();
    assert!(matches!(err, BatchError::MissingProjectConfig(1)));

    // Configuration exists but lacks the template.
    orchestrator.store().set(1, ProjectConfig::default()).unwrap();
    let err = orchestrator
        .create_from_template(1, "sourdough", "2025-06-10T08:00:00Z", &[], "", None)
        .await
        .unwrap_err();
    assert!(matches!(err, BatchError::TemplateNotFound { .. }));
}

#[tokio::test]
async fn setup_without_buckets_never_touches_the_kanban_view() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    Mock::given(method("GET"))
        .and(path("/api/v1/projects/1/views"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/labels"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/v1/labels"))
        .and(body_partial_json(json!({ "title": "baking" })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "id": 10, "title": "baking" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let orchestrator = orchestrator_for(&server, &dir);
    let labels = vec![vikunja_batch::LabelSpec {
        name: "baking".to_string(),
        color: None,
    }];
    let report = orchestrator
        .setup_project(1, &[], &labels, Vec::new())
        .await
        .unwrap();

    assert_eq!(report.labels_created, vec!["baking"]);
    assert!(report.buckets_created.is_empty());
    assert!(report.errors.is_empty(), "{:?}", report.errors);
}

#[tokio::test]
async fn setup_project_creates_only_what_is_missing() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    Mock::given(method("GET"))
        .and(path("/api/v1/projects/1/views"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 7, "title": "Kanban", "view_kind": "kanban" },
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/projects/1/views/7/buckets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 70, "title": "Backlog" },
        ])))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/v1/projects/1/views/7/buckets"))
        .and(body_partial_json(json!({ "title": "Doing" })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "id": 71, "title": "Doing" })),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/labels"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 9, "title": "urgent" },
        ])))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/v1/labels"))
        .and(body_partial_json(
            json!({ "title": "baking", "hex_color": "#2ecc71" }),
        ))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "id": 10, "title": "baking" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let orchestrator = orchestrator_for(&server, &dir);
    let buckets = vec!["Backlog".to_string(), "Doing".to_string()];
    let labels = vec![
        vikunja_batch::LabelSpec {
            name: "urgent".to_string(),
            color: None,
        },
        vikunja_batch::LabelSpec {
            name: "baking".to_string(),
            color: Some("#2ecc71".to_string()),
        },
    ];
    let report = orchestrator
        .setup_project(1, &buckets, &labels, Vec::new())
        .await
        .unwrap();

    assert_eq!(report.buckets_created, vec!["Doing"]);
    assert_eq!(report.labels_created, vec!["baking"]);
    assert!(report.tasks.is_none());
    assert!(report.errors.is_empty(), "{:?}", report.errors);
}
