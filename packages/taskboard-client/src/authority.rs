/// HTTP implementation of the move authority.
///
/// A move is persisted as a status change on the task
/// (`PUT /api/tasks/{taskId}`); the authoritative board is every task of the
/// project (`GET /api/projects/{projectId}/tasks`, all pages) grouped by status.
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::{RequestBuilder, Url};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use taskboard_core::{AuthorityError, Board, MoveAuthority, Task, TaskStatus};

use crate::api::{classify, ApiEnvelope, Pagination, StatusUpdate};
use crate::config::ClientConfig;

/// Characters left unescaped in a path segment (RFC 3986 unreserved).
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("No project configured (set projectId in the config or pass --project)")]
    MissingProject,

    #[error("Invalid API URL {url}: {reason}")]
    InvalidApiUrl { url: String, reason: String },

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

pub struct HttpAuthority {
    client: reqwest::Client,
    api_url: String,
    project_id: String,
    token: Option<String>,
    page_size: u32,
}

impl HttpAuthority {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let project_id = config
            .project_id
            .clone()
            .filter(|id| !id.trim().is_empty())
            .ok_or(ClientError::MissingProject)?;

        let api_url = config.api_url.trim_end_matches('/').to_string();
        let parsed = Url::parse(&api_url).map_err(|e| ClientError::InvalidApiUrl {
            url: api_url.clone(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ClientError::InvalidApiUrl {
                url: api_url,
                reason: format!("unsupported scheme {}", parsed.scheme()),
            });
        }

        Ok(Self {
            client: reqwest::Client::builder().build()?,
            api_url,
            project_id,
            token: config.token.clone().filter(|t| !t.is_empty()),
            page_size: config.page_size.max(1),
        })
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    fn token(&self) -> Result<&str, AuthorityError> {
        self.token.as_deref().ok_or_else(|| {
            AuthorityError::AuthorityUnavailable("no access token configured".to_string())
        })
    }

    fn url(&self, segments: &[&str]) -> String {
        let mut url = self.api_url.clone();
        for segment in segments {
            url.push('/');
            url.extend(utf8_percent_encode(segment, PATH_SEGMENT));
        }
        url
    }

    /// Send a request and unwrap the response envelope.
    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<(T, Option<Pagination>), AuthorityError> {
        let response = request
            .send()
            .await
            .map_err(|e| AuthorityError::NetworkFailure(e.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AuthorityError::NetworkFailure(e.to_string()))?;

        let envelope: ApiEnvelope<serde_json::Value> = match serde_json::from_str(&body) {
            Ok(envelope) => envelope,
            Err(_) if status.is_success() => {
                return Err(AuthorityError::NetworkFailure(format!(
                    "undecodable response body (HTTP {})",
                    status
                )))
            }
            Err(_) => return Err(classify(status, None)),
        };

        if !status.is_success() || !envelope.success {
            return Err(classify(status, envelope.error.as_ref()));
        }

        let data = envelope.data.unwrap_or(serde_json::Value::Null);
        let data = serde_json::from_value(data).map_err(|e| {
            AuthorityError::NetworkFailure(format!("unexpected response data: {}", e))
        })?;
        Ok((data, envelope.pagination))
    }

    /// Every task of the project, following pagination to the last page.
    pub async fn fetch_tasks(&self) -> Result<Vec<Task>, AuthorityError> {
        let token = self.token()?;
        let url = self.url(&["api", "projects", &self.project_id, "tasks"]);
        let mut tasks: Vec<Task> = Vec::new();
        let mut seen: HashMap<String, usize> = HashMap::new();
        let mut page: u32 = 1;

        loop {
            let request = self
                .client
                .get(&url)
                .bearer_auth(token)
                .query(&[("page", page), ("limit", self.page_size)]);
            let (batch, pagination): (Vec<Task>, _) = self.send(request).await?;
            let fetched = batch.len();
            for task in batch {
                match seen.get(&task.id) {
                    // rows shift between offset pages when a status changes mid-fetch
                    Some(&index) => {
                        log::warn!(
                            target: "taskboard.http",
                            "Task {} returned again on page {}; keeping the later copy",
                            task.id,
                            page
                        );
                        tasks[index] = task;
                    }
                    None => {
                        seen.insert(task.id.clone(), tasks.len());
                        tasks.push(task);
                    }
                }
            }

            let more = match pagination {
                Some(p) => page < p.total_pages,
                None => false,
            };
            if !more || fetched == 0 {
                break;
            }
            page += 1;
        }

        log::debug!(
            target: "taskboard.http",
            "Fetched {} tasks for project {} ({} page(s))",
            tasks.len(),
            self.project_id,
            page
        );
        Ok(tasks)
    }
}

impl MoveAuthority<Task> for HttpAuthority {
    async fn commit_move(&self, item_id: &str, column_id: &str) -> Result<(), AuthorityError> {
        let status = TaskStatus::from_column_id(column_id).ok_or_else(|| {
            AuthorityError::AuthorityRejected(format!("column {} has no task status", column_id))
        })?;
        let token = self.token()?;

        let request = self
            .client
            .put(self.url(&["api", "tasks", item_id]))
            .bearer_auth(token)
            .json(&StatusUpdate { status });
        let (_task, _): (serde_json::Value, _) = self.send(request).await?;

        log::info!(
            target: "taskboard.http",
            "Task {} status set to {}",
            item_id,
            status.as_str()
        );
        Ok(())
    }

    async fn fetch_board(&self) -> Result<Board<Task>, AuthorityError> {
        Ok(Board::from_tasks(self.fetch_tasks().await?))
    }
}
