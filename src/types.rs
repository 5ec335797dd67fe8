use crate::error::ValidationError;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Analysis state reported by the backend
///
/// Unknown values are preserved verbatim so newer backends keep working.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RepositoryStatus {
    Created,
    Processing,
    Cloning,
    Parsing,
    Ready,
    Error,
    Other(String),
}

impl RepositoryStatus {
    /// Wire representation of the status
    pub fn as_str(&self) -> &str {
        match self {
            RepositoryStatus::Created => "created",
            RepositoryStatus::Processing => "processing",
            RepositoryStatus::Cloning => "cloning",
            RepositoryStatus::Parsing => "parsing",
            RepositoryStatus::Ready => "ready",
            RepositoryStatus::Error => "error",
            RepositoryStatus::Other(raw) => raw,
        }
    }

    /// Ready and error end a polling loop
    pub fn is_terminal(&self) -> bool {
        matches!(self, RepositoryStatus::Ready | RepositoryStatus::Error)
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, RepositoryStatus::Ready)
    }
}

impl From<String> for RepositoryStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "created" => RepositoryStatus::Created,
            "processing" => RepositoryStatus::Processing,
            "cloning" => RepositoryStatus::Cloning,
            "parsing" => RepositoryStatus::Parsing,
            "ready" => RepositoryStatus::Ready,
            "error" => RepositoryStatus::Error,
            _ => RepositoryStatus::Other(raw),
        }
    }
}

impl From<RepositoryStatus> for String {
    fn from(status: RepositoryStatus) -> Self {
        match status {
            RepositoryStatus::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for RepositoryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body of `POST /repositories`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRepositoryRequest {
    pub github_url: String,
}

/// Response from `POST /repositories`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRepositoryResponse {
    /// Backend-assigned repository id (e.g. "repo_1")
    pub repo_id: String,
    pub status: RepositoryStatus,
}

/// A file discovered in the analyzed repository
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileEntry {
    /// Path relative to the repository root
    pub path: String,
    /// Size in bytes
    pub size: u64,
    /// Extension including the leading dot, empty when none
    #[serde(default)]
    pub extension: String,
}

/// Repository record returned by `GET /repositories/{id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Repository {
    pub id: String,
    pub github_url: String,
    pub status: RepositoryStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_elements_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<FileEntry>,
}

/// A function or class extracted by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeElement {
    /// "function", "class", ...
    #[serde(rename = "type")]
    pub element_type: String,
    pub name: String,
    pub file_path: String,
    pub start_line: u64,
    pub end_line: u64,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub docstring: String,
    pub language: String,
}

/// Response from `GET /repositories/{id}/search`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub results: Vec<CodeElement>,
}

/// Body of `POST /repositories/{id}/ask`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskRequest {
    pub question: String,
}

/// Response from `POST /repositories/{id}/ask`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AskResponse {
    #[serde(default)]
    pub answer: String,
}

/// Body of the legacy `POST /query` endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRequest {
    pub query: String,
    pub repo_id: String,
}

/// Response from the legacy `POST /query` endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResponse {
    pub query: String,
    #[serde(default)]
    pub response: String,
    #[serde(default)]
    pub relevant_files: Vec<String>,
}

/// Response from `GET /`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub message: String,
}

/// Error body the backend attaches to 4xx responses
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorDetail {
    pub detail: String,
}

/// Request to submit a repository for analysis
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AnalyzeRequest {
    /// Repository URL, e.g. "https://github.com/username/repository"
    pub github_url: String,
    /// Wait until analysis is ready or failed (default: true)
    #[serde(default = "default_wait")]
    pub wait: bool,
}

fn default_wait() -> bool {
    true
}

/// Request addressing a single analyzed repository
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RepositoryRequest {
    /// Backend repository id returned by analyze_repository
    pub repo_id: String,
}

/// Request to search code elements of an analyzed repository
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SearchRequest {
    /// Backend repository id
    pub repo_id: String,
    /// Text matched against function, class and code content
    #[serde(default)]
    pub query: String,
}

/// Request to ask a free-text question about an analyzed repository
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AskQuestionRequest {
    /// Backend repository id
    pub repo_id: String,
    /// e.g. "What does this codebase do?"
    pub question: String,
}

/// Request for the legacy query endpoint
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct LegacyQueryRequest {
    /// Backend repository id
    pub repo_id: String,
    /// Query text
    pub query: String,
}

/// Check that a repository URL is an absolute http(s) URL with a host
pub fn validate_github_url(url: &str) -> Result<(), ValidationError> {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Empty("repository URL".to_string()));
    }

    let parsed = reqwest::Url::parse(trimmed).map_err(|e| ValidationError::InvalidUrl {
        url: trimmed.to_string(),
        reason: e.to_string(),
    })?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ValidationError::InvalidUrl {
            url: trimmed.to_string(),
            reason: format!("scheme must be http or https, got '{}'", parsed.scheme()),
        });
    }

    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(ValidationError::InvalidUrl {
            url: trimmed.to_string(),
            reason: "missing host".to_string(),
        });
    }

    Ok(())
}

fn require_non_empty(value: &str, what: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Empty(what.to_string()));
    }
    Ok(())
}

impl AnalyzeRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_github_url(&self.github_url)
    }
}

impl RepositoryRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_non_empty(&self.repo_id, "repository id")
    }
}

impl SearchRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_non_empty(&self.repo_id, "repository id")
    }
}

impl AskQuestionRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_non_empty(&self.repo_id, "repository id")?;
        require_non_empty(&self.question, "question")
    }
}

impl LegacyQueryRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_non_empty(&self.repo_id, "repository id")?;
        require_non_empty(&self.query, "query")
    }
}
