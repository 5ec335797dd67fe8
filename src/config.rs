/// Configuration system for repo-analyzer
///
/// Supports loading from multiple sources with priority:
/// CLI args > Environment variables > Config file > Defaults
use crate::error::{AnalyzerError, ConfigError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable overriding `backend.base_url`
pub const ENV_BASE_URL: &str = "REPO_ANALYZER_URL";
/// Environment variable overriding `backend.timeout_secs`
pub const ENV_TIMEOUT_SECS: &str = "REPO_ANALYZER_TIMEOUT_SECS";
/// Environment variable overriding `polling.interval_ms`
pub const ENV_POLL_INTERVAL_MS: &str = "REPO_ANALYZER_POLL_INTERVAL_MS";
/// Environment variable overriding `polling.max_attempts`
pub const ENV_POLL_MAX_ATTEMPTS: &str = "REPO_ANALYZER_POLL_MAX_ATTEMPTS";
/// Any value disables colored output (see https://no-color.org)
pub const ENV_NO_COLOR: &str = "NO_COLOR";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Analysis backend connection
    #[serde(default)]
    pub backend: BackendConfig,

    /// Status polling behaviour
    #[serde(default)]
    pub polling: PollingConfig,

    /// Terminal rendering
    #[serde(default)]
    pub display: DisplayConfig,
}

/// Analysis backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the analysis API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Polling configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollingConfig {
    /// Delay between status requests in milliseconds
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    /// Upper bound on status requests before giving up
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Failed status requests in a row that stop polling (1 = stop at the first failure)
    #[serde(default = "default_max_consecutive_errors")]
    pub max_consecutive_errors: u32,
}

/// Display configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Colorize terminal output
    #[serde(default = "default_color")]
    pub color: bool,

    /// Number of files listed under "Sample Files"
    #[serde(default = "default_file_preview_limit")]
    pub file_preview_limit: usize,

    /// Characters of code shown per search result
    #[serde(default = "default_code_preview_chars")]
    pub code_preview_chars: usize,
}

// Default value functions
fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_interval_ms() -> u64 {
    1000
}

fn default_max_attempts() -> u32 {
    600
}

fn default_max_consecutive_errors() -> u32 {
    1
}

fn default_color() -> bool {
    true
}

fn default_file_preview_limit() -> usize {
    20
}

fn default_code_preview_chars() -> usize {
    300
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            max_attempts: default_max_attempts(),
            max_consecutive_errors: default_max_consecutive_errors(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            color: default_color(),
            file_preview_limit: default_file_preview_limit(),
            code_preview_chars: default_code_preview_chars(),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn from_file(path: &Path) -> Result<Self, AnalyzerError> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()).into());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::LoadFailed(format!("Failed to read config file: {}", e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| ConfigError::ParseFailed(format!("Invalid TOML: {}", e)))?;

        Ok(config)
    }

    /// Load configuration from default location or create default
    pub fn load_or_default() -> Result<Self, AnalyzerError> {
        let config_path = crate::paths::PlatformPaths::default_config_path();

        if config_path.exists() {
            tracing::info!("Loading config from: {}", config_path.display());
            Self::from_file(&config_path)
        } else {
            tracing::debug!("No config file found, using defaults");
            Ok(Self::default())
        }
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<(), AnalyzerError> {
        // Create parent directory if needed
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                ConfigError::SaveFailed(format!("Failed to create config directory: {}", e))
            })?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::SaveFailed(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| ConfigError::SaveFailed(format!("Failed to write config file: {}", e)))?;

        tracing::info!("Saved config to: {}", path.display());
        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), AnalyzerError> {
        match reqwest::Url::parse(&self.backend.base_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            Ok(url) => {
                return Err(invalid(
                    "backend.base_url",
                    format!("scheme must be http or https, got '{}'", url.scheme()),
                ));
            }
            Err(e) => {
                return Err(invalid(
                    "backend.base_url",
                    format!("'{}' is not a valid URL: {}", self.backend.base_url, e),
                ));
            }
        }

        if self.backend.timeout_secs == 0 {
            return Err(invalid("backend.timeout_secs", "must be greater than 0"));
        }

        if self.polling.interval_ms == 0 {
            return Err(invalid("polling.interval_ms", "must be greater than 0"));
        }

        if self.polling.max_attempts == 0 {
            return Err(invalid("polling.max_attempts", "must be greater than 0"));
        }

        if self.polling.max_consecutive_errors == 0 {
            return Err(invalid(
                "polling.max_consecutive_errors",
                "must be greater than 0",
            ));
        }

        if self.display.file_preview_limit == 0 {
            return Err(invalid("display.file_preview_limit", "must be greater than 0"));
        }

        if self.display.code_preview_chars == 0 {
            return Err(invalid("display.code_preview_chars", "must be greater than 0"));
        }

        Ok(())
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary key lookup; unparseable numbers are ignored
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_BASE_URL) {
            self.backend.base_url = url;
        }

        if let Some(timeout) = lookup(ENV_TIMEOUT_SECS)
            && let Ok(secs) = timeout.parse()
        {
            self.backend.timeout_secs = secs;
        }

        if let Some(interval) = lookup(ENV_POLL_INTERVAL_MS)
            && let Ok(ms) = interval.parse()
        {
            self.polling.interval_ms = ms;
        }

        if let Some(attempts) = lookup(ENV_POLL_MAX_ATTEMPTS)
            && let Ok(n) = attempts.parse()
        {
            self.polling.max_attempts = n;
        }

        if lookup(ENV_NO_COLOR).is_some_and(|v| !v.is_empty()) {
            self.display.color = false;
        }
    }

    /// Create a new Config with defaults and environment overrides
    pub fn new() -> Result<Self, AnalyzerError> {
        let mut config = Self::load_or_default()?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Load from an explicit file (when given) and apply environment overrides
    ///
    /// The result is not validated. Callers apply their own overrides first
    /// and then call [`Config::validate`].
    pub fn load(path: Option<&Path>) -> Result<Self, AnalyzerError> {
        Self::load_with(path, |key| std::env::var(key).ok())
    }

    pub fn load_with<F>(path: Option<&Path>, lookup: F) -> Result<Self, AnalyzerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::load_or_default()?,
        };
        config.apply_overrides_from(lookup);
        Ok(config)
    }
}

fn invalid(key: &str, reason: impl Into<String>) -> AnalyzerError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        reason: reason.into(),
    }
    .into()
}
