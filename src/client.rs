//! HTTP client for the repository analysis backend
//!
//! This module provides the typed request layer used by the CLI, the interactive
//! shell and the MCP server. The backend itself (cloning, parsing, search, AI
//! answering) is an external service reached over four REST endpoints.

use crate::config::{BackendConfig, Config};
use crate::error::{AnalyzerError, ApiError, ValidationError};
use crate::types::*;

use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;

/// Operations offered by the analysis backend
///
/// `AnalyzerClient` is the HTTP implementation; the poller and the session only
/// depend on this trait.
#[async_trait]
pub trait AnalyzerApi: Send + Sync {
    /// `GET /`
    async fn health(&self) -> Result<HealthResponse, ApiError>;

    /// `POST /repositories`
    async fn create_repository(
        &self,
        github_url: &str,
    ) -> Result<CreateRepositoryResponse, ApiError>;

    /// `GET /repositories/{repo_id}`
    async fn get_repository(&self, repo_id: &str) -> Result<Repository, ApiError>;

    /// `GET /repositories/{repo_id}/search?q={query}`
    async fn search(&self, repo_id: &str, query: &str) -> Result<SearchResponse, ApiError>;

    /// `POST /repositories/{repo_id}/ask`
    async fn ask(&self, repo_id: &str, question: &str) -> Result<AskResponse, ApiError>;

    /// `POST /query`
    async fn query(&self, repo_id: &str, query: &str) -> Result<QueryResponse, ApiError>;

    /// Fetch a repository and fail unless its analysis is ready
    async fn ensure_ready(&self, repo_id: &str) -> Result<Repository, AnalyzerError> {
        let repository = self.get_repository(repo_id).await?;
        if !repository.status.is_ready() {
            return Err(ValidationError::RepositoryNotReady {
                status: repository.status.to_string(),
            }
            .into());
        }
        Ok(repository)
    }
}

#[async_trait]
impl<T: AnalyzerApi + ?Sized> AnalyzerApi for Arc<T> {
    async fn health(&self) -> Result<HealthResponse, ApiError> {
        (**self).health().await
    }

    async fn create_repository(
        &self,
        github_url: &str,
    ) -> Result<CreateRepositoryResponse, ApiError> {
        (**self).create_repository(github_url).await
    }

    async fn get_repository(&self, repo_id: &str) -> Result<Repository, ApiError> {
        (**self).get_repository(repo_id).await
    }

    async fn search(&self, repo_id: &str, query: &str) -> Result<SearchResponse, ApiError> {
        (**self).search(repo_id, query).await
    }

    async fn ask(&self, repo_id: &str, question: &str) -> Result<AskResponse, ApiError> {
        (**self).ask(repo_id, question).await
    }

    async fn query(&self, repo_id: &str, query: &str) -> Result<QueryResponse, ApiError> {
        (**self).query(repo_id, query).await
    }
}

/// Main client for talking to the analysis backend
///
/// # Example
///
/// ```no_run
/// use repo_analyzer::client::{AnalyzerApi, AnalyzerClient};
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let client = AnalyzerClient::new()?;
///
///     let created = client
///         .create_repository("https://github.com/username/repository")
///         .await?;
///     let repository = client.get_repository(&created.repo_id).await?;
///     println!("{} is {}", repository.github_url, repository.status);
///
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct AnalyzerClient {
    http: reqwest::Client,
    base_url: Url,
    timeout_secs: u64,
    config: Arc<Config>,
}

impl AnalyzerClient {
    /// Create a client from the default configuration sources
    pub fn new() -> Result<Self, AnalyzerError> {
        let config = Config::new()?;
        Self::with_config(config)
    }

    /// Create a client with custom configuration
    pub fn with_config(config: Config) -> Result<Self, AnalyzerError> {
        config.validate()?;

        let BackendConfig {
            base_url,
            timeout_secs,
        } = &config.backend;

        let base_url =
            Url::parse(base_url).map_err(|e| ApiError::InvalidUrl(format!("{}: {}", base_url, e)))?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(*timeout_secs))
            .user_agent(concat!("repo-analyzer/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AnalyzerError::other(format!("Failed to build HTTP client: {}", e)))?;

        tracing::debug!("Analyzer backend: {}", base_url);

        Ok(Self {
            http,
            base_url,
            timeout_secs: *timeout_secs,
            config: Arc::new(config),
        })
    }

    /// Backend base URL
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Configuration the client was built with
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Build an endpoint URL below the base URL; each segment is percent-encoded
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn send_error(&self, err: reqwest::Error) -> ApiError {
        if err.is_timeout() {
            ApiError::Timeout(self.timeout_secs)
        } else {
            err.into()
        }
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        what: &str,
    ) -> Result<T, ApiError> {
        let response = request.send().await.map_err(|e| self.send_error(e))?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ErrorDetail>(&body)
                .map(|d| d.detail)
                .unwrap_or_else(|_| what.to_string());
            return Err(ApiError::NotFound(detail));
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!("{} failed with HTTP {}", what, status.as_u16());
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await.map_err(|e| self.send_error(e))?;
        serde_json::from_slice(&bytes)
            .map_err(|e| ApiError::Decode(format!("{} response: {}", what, e)))
    }
}

#[async_trait]
impl AnalyzerApi for AnalyzerClient {
    async fn health(&self) -> Result<HealthResponse, ApiError> {
        let url = self.endpoint(&[""])?;
        tracing::debug!("GET {}", url);
        self.execute(self.http.get(url), "health check").await
    }

    async fn create_repository(
        &self,
        github_url: &str,
    ) -> Result<CreateRepositoryResponse, ApiError> {
        let url = self.endpoint(&["repositories"])?;
        tracing::info!("Submitting repository {}", github_url);
        let body = CreateRepositoryRequest {
            github_url: github_url.trim().to_string(),
        };
        self.execute(self.http.post(url).json(&body), "repository submission")
            .await
    }

    async fn get_repository(&self, repo_id: &str) -> Result<Repository, ApiError> {
        let url = self.endpoint(&["repositories", repo_id])?;
        tracing::debug!("GET {}", url);
        self.execute(self.http.get(url), &format!("repository {}", repo_id))
            .await
    }

    async fn search(&self, repo_id: &str, query: &str) -> Result<SearchResponse, ApiError> {
        let url = self.endpoint(&["repositories", repo_id, "search"])?;
        tracing::debug!("GET {} q={:?}", url, query);
        self.execute(
            self.http.get(url).query(&[("q", query)]),
            &format!("repository {}", repo_id),
        )
        .await
    }

    async fn ask(&self, repo_id: &str, question: &str) -> Result<AskResponse, ApiError> {
        let url = self.endpoint(&["repositories", repo_id, "ask"])?;
        tracing::debug!("POST {}", url);
        let body = AskRequest {
            question: question.to_string(),
        };
        self.execute(
            self.http.post(url).json(&body),
            &format!("repository {}", repo_id),
        )
        .await
    }

    async fn query(&self, repo_id: &str, query: &str) -> Result<QueryResponse, ApiError> {
        let url = self.endpoint(&["query"])?;
        tracing::debug!("POST {}", url);
        let body = QueryRequest {
            query: query.to_string(),
            repo_id: repo_id.to_string(),
        };
        self.execute(self.http.post(url).json(&body), "query").await
    }
}
