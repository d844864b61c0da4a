// ABOUTME: Client tests against a mocked Agentboard server
// ABOUTME: REST envelopes, error mapping, and the reconnecting metrics subscription

use std::time::Duration;

use agentboard_client::{
    subscribe_metrics, ClientError, ConnectionStatus, DashboardClient, MemoryFilter,
    ReconnectPolicy,
};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN: &str = "session-token";

fn metric(id: &str, agent_name: &str, total_runs: i64) -> Value {
    json!({
        "id": id,
        "project_id": "p1",
        "agent_name": agent_name,
        "total_runs": total_runs,
        "successful_runs": total_runs,
        "failed_runs": 0,
        "success_rate": 1.0,
        "avg_duration_seconds": 2.5,
        "last_run": null,
        "findings": {},
        "trend": "stable",
        "updated_at": "2026-01-01T00:00:00.000000Z"
    })
}

fn client(server: &MockServer) -> DashboardClient {
    DashboardClient::new(server.uri(), TOKEN).unwrap()
}

fn fast_policy() -> ReconnectPolicy {
    ReconnectPolicy {
        initial_delay: Duration::from_millis(20),
        max_delay: Duration::from_millis(100),
        multiplier: 2.0,
        jitter: 0.0,
        idle_timeout: Duration::from_millis(300),
    }
}

async fn wait_for_stream_opens(server: &MockServer, expected: usize) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    loop {
        let opens = server
            .received_requests()
            .await
            .unwrap()
            .iter()
            .filter(|r| r.url.path() == "/api/metrics/stream")
            .count();
        if opens >= expected {
            return;
        }
        assert!(tokio::time::Instant::now() < deadline, "only {} stream opens", opens);
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}

#[tokio::test]
async fn test_list_metrics_sends_token_and_project() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/metrics"))
        .and(query_param("projectId", "p1"))
        .and(header("authorization", "Bearer session-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "metrics": [metric("m1", "reviewer", 3)],
            "project_id": "p1"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let metrics = client(&server).list_metrics("p1").await.unwrap();
    assert_eq!(metrics.len(), 1);
    assert_eq!(metrics[0].agent_name, "reviewer");
}

#[tokio::test]
async fn test_memory_filters_become_query_params() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/memory"))
        .and(query_param("projectId", "p1"))
        .and(query_param("entity_type", "agent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "memories": [{
                "id": "e1",
                "project_id": "p1",
                "entity_name": "reviewer",
                "entity_type": "agent",
                "observation": "found X",
                "metadata": {},
                "created_at": "2026-01-01T00:00:00.000000Z"
            }],
            "project_id": "p1"
        })))
        .mount(&server)
        .await;

    let filter = MemoryFilter {
        entity_name: None,
        entity_type: Some("agent".to_string()),
    };
    let memories = client(&server).list_memories("p1", &filter).await.unwrap();
    assert_eq!(memories[0].observation, "found X");
}

#[tokio::test]
async fn test_error_mapping() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/projects/p1/sync"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "Connect a GitHub account before syncing",
            "code": "GITHUB_NOT_CONNECTED",
            "request_id": "r1"
        })))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/projects/gone"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": "Project not found or access denied",
            "code": "NOT_FOUND",
            "request_id": "r2"
        })))
        .mount(&server)
        .await;

    let client = client(&server);
    match client.sync_project("p1").await.unwrap_err() {
        ClientError::Api { status, code, .. } => {
            assert_eq!(status, 400);
            assert_eq!(code, "GITHUB_NOT_CONNECTED");
        }
        other => panic!("unexpected error: {other:?}"),
    }

    let err = client.delete_project("gone").await.unwrap_err();
    assert!(matches!(err, ClientError::NotFound(_)));
    assert!(err.is_terminal());
}

#[tokio::test]
async fn test_sync_summary_decodes() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/projects/p1/sync"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "synced_agents": 1,
            "total_agents": 2,
            "errors": ["b: total_runs must be non-negative"],
            "last_synced_at": "2026-01-01T00:00:00.000000Z"
        })))
        .mount(&server)
        .await;

    let summary = client(&server).sync_project("p1").await.unwrap();
    assert_eq!(summary.synced_agents, 1);
    assert_eq!(summary.errors.unwrap().len(), 1);
}

#[tokio::test]
async fn test_subscription_applies_stream_events() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/metrics"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "metrics": [metric("m1", "a", 1), metric("m3", "c", 1)],
            "project_id": "p1"
        })))
        .mount(&server)
        .await;

    let body = format!(
        ": keep-alive\n\nevent: insert\ndata: {}\n\nevent: delete\ndata: {}\n\n",
        metric("m2", "b", 1),
        json!({"id": "m3"})
    );
    Mock::given(method("GET"))
        .and(path("/api/metrics/stream"))
        .and(query_param("projectId", "p1"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/event-stream")
                .set_body_string(body),
        )
        .mount(&server)
        .await;

    // Slow retries keep the post-stream state observable
    let policy = ReconnectPolicy {
        initial_delay: Duration::from_secs(30),
        max_delay: Duration::from_secs(30),
        ..fast_policy()
    };
    let subscription = subscribe_metrics(client(&server), "p1", policy);
    let mut snapshots = subscription.snapshots();

    let snapshot = tokio::time::timeout(
        Duration::from_secs(5),
        snapshots.wait_for(|s| {
            s.metrics.iter().map(|m| m.agent_name.as_str()).collect::<Vec<_>>() == ["a", "b"]
        }),
    )
    .await
    .expect("timed out waiting for applied events")
    .unwrap()
    .clone();

    assert_eq!(snapshot.metrics[1].id, "m2");
    subscription.close();
}

#[tokio::test]
async fn test_subscription_reconnects_after_close() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/metrics"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "metrics": [],
            "project_id": "p1"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/metrics/stream"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/event-stream")
                .set_body_string(""),
        )
        .mount(&server)
        .await;

    let subscription = subscribe_metrics(client(&server), "p1", fast_policy());
    let mut snapshots = subscription.snapshots();

    tokio::time::timeout(
        Duration::from_secs(5),
        snapshots.wait_for(|s| matches!(s.status, ConnectionStatus::Reconnecting { .. })),
    )
    .await
    .expect("subscription did not retry")
    .unwrap();

    wait_for_stream_opens(&server, 2).await;
    assert!(!matches!(subscription.latest().status, ConnectionStatus::Ended(_)));
}

#[tokio::test]
async fn test_subscription_reconnects_when_stream_goes_silent() {
    // Headers arrive, then the body stalls well past the idle timeout
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let stream_url = format!("http://{}", listener.local_addr().unwrap());
    let opens = std::sync::Arc::new(std::sync::atomic::AtomicUsize::new(0));
    let counter = opens.clone();
    tokio::spawn(async move {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        loop {
            let (mut socket, _) = listener.accept().await.unwrap();
            let counter = counter.clone();
            tokio::spawn(async move {
                let mut buf = vec![0u8; 8192];
                let mut read = 0;
                while !buf[..read].windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut buf[read..]).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => read += n,
                    }
                }
                let request = String::from_utf8_lossy(&buf[..read]).to_string();
                let target = request.split_whitespace().nth(1).unwrap_or("/").to_string();

                if target.starts_with("/api/metrics/stream") {
                    counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                    let _ = socket
                        .write_all(
                            b"HTTP/1.1 200 OK\r\ncontent-type: text/event-stream\r\ntransfer-encoding: chunked\r\n\r\n",
                        )
                        .await;
                    tokio::time::sleep(Duration::from_secs(30)).await;
                } else {
                    let body = r#"{"metrics":[],"project_id":"p1"}"#;
                    let response = format!(
                        "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                        body.len(),
                        body
                    );
                    let _ = socket.write_all(response.as_bytes()).await;
                }
            });
        }
    });

    let client = DashboardClient::new(stream_url, TOKEN).unwrap();
    let subscription = subscribe_metrics(client, "p1", fast_policy());

    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while opens.load(std::sync::atomic::Ordering::SeqCst) < 2 {
        assert!(tokio::time::Instant::now() < deadline, "stalled stream was never replaced");
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert!(!matches!(subscription.latest().status, ConnectionStatus::Ended(_)));
}

#[tokio::test]
async fn test_subscription_ends_on_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/metrics/stream"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": "Project not found or access denied",
            "code": "NOT_FOUND",
            "request_id": "r"
        })))
        .mount(&server)
        .await;

    let subscription = subscribe_metrics(client(&server), "other", fast_policy());
    let mut snapshots = subscription.snapshots();

    let snapshot = tokio::time::timeout(
        Duration::from_secs(5),
        snapshots.wait_for(|s| matches!(s.status, ConnectionStatus::Ended(_))),
    )
    .await
    .expect("subscription did not end")
    .unwrap()
    .clone();

    match snapshot.status {
        ConnectionStatus::Ended(message) => assert!(message.contains("Project not found")),
        other => panic!("unexpected status: {other:?}"),
    }
}
