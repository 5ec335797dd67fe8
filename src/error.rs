/// Centralized error types for repo-analyzer using thiserror
///
/// Provides domain-specific error types for better error handling and user-facing messages.
use thiserror::Error;

/// Main error type for the analyzer front end
#[derive(Error, Debug)]
pub enum AnalyzerError {
    #[error("Backend error: {0}")]
    Api(#[from] ApiError),

    #[error("Polling error: {0}")]
    Poll(#[from] PollError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

/// Errors returned while talking to the analysis backend over HTTP
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Failed to connect to backend: {0}")]
    Connection(String),

    #[error("Backend request timed out after {0} seconds")]
    Timeout(u64),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Backend returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to decode backend response: {0}")]
    Decode(String),

    #[error("Invalid backend URL: {0}")]
    InvalidUrl(String),

    #[error("Request failed: {0}")]
    Request(String),
}

/// Errors that end a status polling loop early
#[derive(Error, Debug)]
pub enum PollError {
    #[error("Repository did not reach a final state after {attempts} attempts (last status: {last_status})")]
    Exhausted { attempts: u32, last_status: String },

    #[error("Status request failed after {attempts} attempts: {source}")]
    Request {
        attempts: u32,
        #[source]
        source: ApiError,
    },

    #[error("Polling was cancelled")]
    Cancelled,
}

/// Errors related to configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration file: {0}")]
    LoadFailed(String),

    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),

    #[error("Invalid configuration value for '{key}': {reason}")]
    InvalidValue { key: String, reason: String },

    #[error("Failed to save configuration: {0}")]
    SaveFailed(String),

    #[error("Configuration file not found: {0}")]
    FileNotFound(String),
}

/// Errors related to input validation
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Empty {0}")]
    Empty(String),

    #[error("Invalid repository URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("No repository has been submitted yet")]
    NoRepository,

    #[error("Repository is not ready for analysis (status: {status})")]
    RepositoryNotReady { status: String },
}

// Conversion from anyhow::Error to AnalyzerError
impl From<anyhow::Error> for AnalyzerError {
    fn from(err: anyhow::Error) -> Self {
        AnalyzerError::Other(format!("{:#}", err))
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() {
            ApiError::Connection(err.to_string())
        } else if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Request(err.to_string())
        }
    }
}

// Helper methods for AnalyzerError
impl AnalyzerError {
    /// Create a new error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        AnalyzerError::Other(msg.into())
    }

    /// Convert to a user-facing error string suitable for terminal and MCP output
    pub fn to_user_string(&self) -> String {
        format!("{}", self)
    }

    /// Check if this is a user error (validation, missing repository) vs system error
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            AnalyzerError::Validation(_)
                | AnalyzerError::Api(ApiError::NotFound(_))
                | AnalyzerError::Config(ConfigError::InvalidValue { .. })
        )
    }

    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            AnalyzerError::Api(api) => api.is_retryable(),
            AnalyzerError::Poll(PollError::Request { source, .. }) => source.is_retryable(),
            AnalyzerError::Io(_) => true,
            _ => false,
        }
    }
}

impl ApiError {
    /// Transport failures and 5xx responses may succeed on a later attempt
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::Connection(_) | ApiError::Timeout(_) => true,
            ApiError::Status { status, .. } => *status >= 500,
            _ => false,
        }
    }
}
