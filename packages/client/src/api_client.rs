// ABOUTME: HTTP API client for the Agentboard server
// ABOUTME: Typed wrappers over the REST endpoints plus the raw metrics event stream

use std::time::Duration;

use agentboard_core::{AgentMetric, MaskedUser, MemoryEntry, Project};
use chrono::{DateTime, Utc};
use reqwest::{header, Client, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use crate::error::{ClientError, ClientResult};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Outcome of a server-side sync
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SyncSummary {
    pub success: bool,
    pub synced_agents: usize,
    pub total_agents: usize,
    #[serde(default)]
    pub errors: Option<Vec<String>>,
    pub last_synced_at: DateTime<Utc>,
}

/// Exact-match narrowing applied by the server
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryFilter {
    pub entity_name: Option<String>,
    pub entity_type: Option<String>,
}

#[derive(Deserialize)]
struct ProjectsEnvelope {
    projects: Vec<Project>,
}

#[derive(Deserialize)]
struct ProjectEnvelope {
    project: Project,
}

#[derive(Deserialize)]
struct MetricsEnvelope {
    metrics: Vec<AgentMetric>,
}

#[derive(Deserialize)]
struct MemoriesEnvelope {
    memories: Vec<MemoryEntry>,
}

#[derive(Deserialize)]
struct UserEnvelope {
    user: MaskedUser,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
    code: Option<String>,
}

/// Authenticated client for one Agentboard server
#[derive(Clone)]
pub struct DashboardClient {
    http_client: Client,
    base_url: String,
    token: String,
}

impl std::fmt::Debug for DashboardClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DashboardClient")
            .field("base_url", &self.base_url)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

impl DashboardClient {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> ClientResult<Self> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(ClientError::Configuration(
                "session token must not be empty".to_string(),
            ));
        }

        // No overall timeout here: the event stream stays open indefinitely
        let http_client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| ClientError::Configuration(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.trim().to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: reqwest::Method, path: &str) -> RequestBuilder {
        self.http_client
            .request(method, format!("{}{}", self.base_url, path))
            .bearer_auth(&self.token)
    }

    async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> ClientResult<T> {
        let response = builder.timeout(REQUEST_TIMEOUT).send().await?;
        let response = check_status(response).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))
    }

    /// Check server health
    pub async fn health_check(&self) -> ClientResult<bool> {
        let response = self
            .http_client
            .get(format!("{}/api/health", self.base_url))
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;
        Ok(response.status().is_success())
    }

    pub async fn list_projects(&self) -> ClientResult<Vec<Project>> {
        let envelope: ProjectsEnvelope = self
            .send_json(self.request(reqwest::Method::GET, "/api/projects"))
            .await?;
        Ok(envelope.projects)
    }

    pub async fn create_project(&self, name: &str, github_repo: Option<&str>) -> ClientResult<Project> {
        let body = json!({ "name": name, "github_repo": github_repo });
        let envelope: ProjectEnvelope = self
            .send_json(self.request(reqwest::Method::POST, "/api/projects").json(&body))
            .await?;
        Ok(envelope.project)
    }

    pub async fn delete_project(&self, project_id: &str) -> ClientResult<()> {
        let _: Value = self
            .send_json(self.request(reqwest::Method::DELETE, &format!("/api/projects/{}", project_id)))
            .await?;
        Ok(())
    }

    pub async fn sync_project(&self, project_id: &str) -> ClientResult<SyncSummary> {
        self.send_json(
            self.request(reqwest::Method::POST, &format!("/api/projects/{}/sync", project_id)),
        )
        .await
    }

    /// Current metrics for a project, ordered by agent name
    pub async fn list_metrics(&self, project_id: &str) -> ClientResult<Vec<AgentMetric>> {
        let envelope: MetricsEnvelope = self
            .send_json(
                self.request(reqwest::Method::GET, "/api/metrics")
                    .query(&[("projectId", project_id)]),
            )
            .await?;
        Ok(envelope.metrics)
    }

    pub async fn list_memories(
        &self,
        project_id: &str,
        filter: &MemoryFilter,
    ) -> ClientResult<Vec<MemoryEntry>> {
        let mut query = vec![("projectId", project_id)];
        if let Some(name) = filter.entity_name.as_deref() {
            query.push(("entity_name", name));
        }
        if let Some(kind) = filter.entity_type.as_deref() {
            query.push(("entity_type", kind));
        }

        let envelope: MemoriesEnvelope = self
            .send_json(self.request(reqwest::Method::GET, "/api/memory").query(&query))
            .await?;
        Ok(envelope.memories)
    }

    pub async fn current_user(&self) -> ClientResult<MaskedUser> {
        let envelope: UserEnvelope = self
            .send_json(self.request(reqwest::Method::GET, "/api/users/me"))
            .await?;
        Ok(envelope.user)
    }

    pub async fn connect_github(&self, username: Option<&str>, token: &str) -> ClientResult<MaskedUser> {
        let body = json!({ "username": username, "token": token });
        let envelope: UserEnvelope = self
            .send_json(self.request(reqwest::Method::PUT, "/api/users/me/github").json(&body))
            .await?;
        Ok(envelope.user)
    }

    pub async fn disconnect_github(&self) -> ClientResult<MaskedUser> {
        let envelope: UserEnvelope = self
            .send_json(self.request(reqwest::Method::DELETE, "/api/users/me/github"))
            .await?;
        Ok(envelope.user)
    }

    /// Open the live metrics stream; the response body is an SSE byte stream
    pub async fn open_metrics_stream(&self, project_id: &str) -> ClientResult<Response> {
        debug!("Opening metrics stream for project {}", project_id);
        let response = self
            .request(reqwest::Method::GET, "/api/metrics/stream")
            .query(&[("projectId", project_id)])
            .header(header::ACCEPT, "text/event-stream")
            .send()
            .await?;
        check_status(response).await
    }
}

async fn check_status(response: Response) -> ClientResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let parsed = serde_json::from_str::<ErrorBody>(&body).ok();
    let message = parsed
        .as_ref()
        .and_then(|b| b.error.clone())
        .unwrap_or_else(|| status.to_string());
    let code = parsed
        .and_then(|b| b.code)
        .unwrap_or_else(|| "UNKNOWN".to_string());

    Err(match status {
        StatusCode::UNAUTHORIZED => ClientError::Unauthorized(message),
        StatusCode::NOT_FOUND => ClientError::NotFound(message),
        _ => ClientError::Api {
            status: status.as_u16(),
            code,
            message,
        },
    })
}
