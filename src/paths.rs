/// Platform-specific locations for repo-analyzer files
///
/// Resolves directories through the `dirs` crate, which follows the XDG Base
/// Directory specification on Linux and the native conventions on macOS and Windows.
use std::path::PathBuf;

/// Directory name used under the platform config directory
pub const APP_DIR_NAME: &str = "repo-analyzer";

/// Platform-agnostic path utilities
pub struct PlatformPaths;

impl PlatformPaths {
    /// Get the appropriate config directory for the current platform
    ///
    /// - Windows: %APPDATA%
    /// - macOS: ~/Library/Application Support
    /// - Linux/Unix: $XDG_CONFIG_HOME or ~/.config
    ///
    /// Falls back to the current directory when no home directory is known.
    pub fn config_dir() -> PathBuf {
        dirs::config_dir().unwrap_or_else(|| PathBuf::from("."))
    }

    /// Returns: {config_dir}/repo-analyzer
    pub fn project_config_dir() -> PathBuf {
        Self::config_dir().join(APP_DIR_NAME)
    }

    /// Returns: {config_dir}/repo-analyzer/config.toml
    pub fn default_config_path() -> PathBuf {
        Self::project_config_dir().join("config.toml")
    }
}
