// ABOUTME: GitHub REST client for reading agent data from connected repositories
// ABOUTME: Fetches and decodes the metrics file, repository info, and repository listings

use std::time::Duration;

use agentboard_core::{truncate, CLAUDE_DIR, METRICS_FILE_PATH};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use reqwest::{header, Client, RequestBuilder, Response, StatusCode};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{GitHubError, GitHubResult};
use crate::types::{AgentStats, ContentFile, RepoInfo, RepoSummary};

const USER_AGENT: &str = "agentboard";
const ACCEPT: &str = "application/vnd.github+json";
const API_VERSION: &str = "2022-11-28";
const REPOS_PER_PAGE: &str = "100";

/// Source of agent statistics for a repository
#[async_trait]
pub trait MetricsSource: Send + Sync {
    /// `Ok(None)` when the file is absent or unreadable as metrics
    async fn fetch_agent_stats(
        &self,
        token: &str,
        owner: &str,
        repo: &str,
    ) -> GitHubResult<Option<AgentStats>>;
}

#[derive(Clone)]
pub struct GitHubClient {
    http_client: Client,
    base_url: String,
}

impl GitHubClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> GitHubResult<Self> {
        let http_client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| GitHubError::Configuration(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn get(&self, token: &str, path: &str) -> RequestBuilder {
        self.http_client
            .get(format!("{}{}", self.base_url, path))
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .header(header::ACCEPT, ACCEPT)
            .header("X-GitHub-Api-Version", API_VERSION)
    }

    /// Whether the repository has a `.claude/` directory
    pub async fn has_claude_directory(&self, token: &str, owner: &str, repo: &str) -> GitHubResult<bool> {
        let response = self
            .get(token, &format!("/repos/{}/{}/contents/{}", owner, repo, CLAUDE_DIR))
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            _ => Err(status_error(response).await),
        }
    }

    pub async fn get_repo_info(&self, token: &str, owner: &str, repo: &str) -> GitHubResult<Option<RepoInfo>> {
        let response = self
            .get(token, &format!("/repos/{}/{}", owner, repo))
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => response
                .json::<RepoInfo>()
                .await
                .map(Some)
                .map_err(|e| GitHubError::InvalidResponse(e.to_string())),
            StatusCode::NOT_FOUND => Ok(None),
            _ => Err(status_error(response).await),
        }
    }

    /// Repositories visible to the token owner, most recently updated first
    pub async fn list_user_repos(&self, token: &str) -> GitHubResult<Vec<RepoSummary>> {
        let response = self
            .get(token, "/user/repos")
            .query(&[
                ("visibility", "all"),
                ("sort", "updated"),
                ("per_page", REPOS_PER_PAGE),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(status_error(response).await);
        }

        response
            .json::<Vec<RepoSummary>>()
            .await
            .map_err(|e| GitHubError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl MetricsSource for GitHubClient {
    async fn fetch_agent_stats(
        &self,
        token: &str,
        owner: &str,
        repo: &str,
    ) -> GitHubResult<Option<AgentStats>> {
        debug!("Fetching {} from {}/{}", METRICS_FILE_PATH, owner, repo);

        let response = self
            .get(token, &format!("/repos/{}/{}/contents/{}", owner, repo, METRICS_FILE_PATH))
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => {}
            StatusCode::NOT_FOUND => {
                debug!("Metrics file not present in {}/{}", owner, repo);
                return Ok(None);
            }
            _ => return Err(status_error(response).await),
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| GitHubError::InvalidResponse(e.to_string()))?;

        Ok(decode_metrics_body(body, owner, repo))
    }
}

/// Decode a contents API body into agent stats; anything unusable is treated as absent
fn decode_metrics_body(body: Value, owner: &str, repo: &str) -> Option<AgentStats> {
    // Directory listings come back as arrays
    let file: ContentFile = match serde_json::from_value(body) {
        Ok(file) => file,
        Err(_) => {
            debug!("Metrics path in {}/{} is not a file", owner, repo);
            return None;
        }
    };

    let content = file.content?;
    if file.encoding.as_deref().is_some_and(|e| e != "base64") {
        warn!("Metrics file in {}/{} has unsupported encoding", owner, repo);
        return None;
    }

    // GitHub wraps base64 content at 60 columns
    let compact: String = content.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = match STANDARD.decode(compact) {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!("Metrics file in {}/{} is not valid base64: {}", owner, repo, e);
            return None;
        }
    };

    let text = match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(_) => {
            warn!("Metrics file in {}/{} is not UTF-8", owner, repo);
            return None;
        }
    };

    match serde_json::from_str::<AgentStats>(&text) {
        Ok(stats) => Some(stats),
        Err(e) => {
            warn!("Metrics file in {}/{} is not valid JSON: {}", owner, repo, e);
            None
        }
    }
}

async fn status_error(response: Response) -> GitHubError {
    let status = response.status();
    let rate_limited = is_rate_limited(&response);
    let message = response
        .text()
        .await
        .ok()
        .and_then(|body| {
            serde_json::from_str::<Value>(&body)
                .ok()
                .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
                .or(Some(body))
        })
        .map(|m| truncate(&m, 200))
        .unwrap_or_else(|| status.to_string());

    match status {
        StatusCode::UNAUTHORIZED => GitHubError::Unauthorized(message),
        StatusCode::FORBIDDEN if !rate_limited => GitHubError::Unauthorized(message),
        _ => GitHubError::Http {
            status: status.as_u16(),
            message,
        },
    }
}

/// Primary and secondary rate limits; GitHub signals both with 403 or 429
fn is_rate_limited(response: &Response) -> bool {
    let headers = response.headers();
    response.status() == StatusCode::TOO_MANY_REQUESTS
        || headers.contains_key(header::RETRY_AFTER)
        || headers
            .get("x-ratelimit-remaining")
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.trim() == "0")
}
