//! # Repo Analyzer - Terminal and MCP Front End for Repository Analysis
//!
//! A Rust client for a repository analysis service. Submit a GitHub repository
//! URL, follow the analysis while the backend clones and parses it, then search
//! the extracted functions and classes or ask free-text questions about the code.
//!
//! ## Overview
//!
//! The analysis itself (cloning, parsing, indexing, AI answers) runs in an
//! external HTTP backend. This crate is the request and display layer on top of
//! it, exposed three ways: one-shot CLI commands, an interactive shell, and an
//! MCP server for AI assistants.
//!
//! ## Key Features
//!
//! - **Typed Backend Client**: `reqwest` client for the four repository endpoints plus the legacy `/query`
//! - **Status Polling**: Fixed-interval polling until `ready` or `error`, with cancellation
//! - **Ready Gating**: Search and questions are refused until analysis is ready
//! - **Terminal Rendering**: Status labels, file samples, search results and AI answers
//! - **MCP Protocol**: 5 tools and 3 prompts for AI assistant integration
//!
//! ## Architecture
//!
//! ```text
//!   CLI / Shell            MCP Client
//!        |                     | stdio
//!  AnalysisSession     AnalyzerMcpServer
//!        |                     |
//!        +---- StatusPoller ---+
//!                  |
//!            AnalyzerClient  --HTTP-->  analysis backend
//! ```
//!
//! ## Modules
//!
//! - [`client`]: HTTP client and the [`client::AnalyzerApi`] trait
//! - [`poller`]: Status polling until a terminal state
//! - [`session`]: Current repository, search results and answer
//! - [`render`]: Terminal text for repositories, results and answers
//! - [`shell`]: Interactive command loop
//! - [`cli`]: Command line arguments and dispatch
//! - [`mcp_server`]: MCP protocol server with tools and prompts
//! - [`config`]: Configuration management with environment variable support
//! - [`types`]: Backend wire types and MCP request types with JSON schema
//! - [`error`]: Error types
//! - [`paths`]: Platform config locations
//!
//! ## Usage Example
//!
//! ```no_run
//! use repo_analyzer::client::AnalyzerClient;
//! use repo_analyzer::poller::{NoopObserver, StatusPoller};
//! use repo_analyzer::session::AnalysisSession;
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = AnalyzerClient::new()?;
//!     let mut session = AnalysisSession::new(client, StatusPoller::default());
//!
//!     session
//!         .submit(
//!             "https://github.com/username/repository",
//!             &NoopObserver,
//!             &CancellationToken::new(),
//!         )
//!         .await?;
//!
//!     for element in session.search("parse").await? {
//!         println!("{} {}:{}", element.name, element.file_path, element.start_line);
//!     }
//!
//!     Ok(())
//! }
//! ```

/// Command line arguments and command dispatch
pub mod cli;

/// HTTP client for the analysis backend
pub mod client;

/// Configuration management with environment variable overrides
pub mod config;

/// Error types and utilities
pub mod error;

/// MCP server implementation with tools and prompts
pub mod mcp_server;

/// Platform-specific config paths
pub mod paths;

/// Status polling until analysis finishes
pub mod poller;

/// Spinner shown while polling
pub mod progress;

/// Terminal rendering
pub mod render;

/// Page-style analysis session state
pub mod session;

/// Interactive shell
pub mod shell;

/// Backend wire types and MCP request types with JSON schema definitions
pub mod types;

#[cfg(test)]
mod test_support;

pub use client::{AnalyzerApi, AnalyzerClient};
pub use error::AnalyzerError;
pub use session::AnalysisSession;
