use crate::client::{AnalyzerApi, AnalyzerClient};
use crate::poller::{PollObserver, StatusPoller};
use crate::types::*;

use anyhow::{Context, Result};
use async_trait::async_trait;
use rmcp::{
    ErrorData as McpError, Peer, RoleServer, ServerHandler, ServiceExt,
    handler::server::{router::prompt::PromptRouter, tool::ToolRouter, wrapper::Parameters},
    model::*,
    prompt, prompt_handler, prompt_router,
    service::RequestContext,
    tool, tool_handler, tool_router,
};
use serde::Serialize;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[derive(Clone)]
pub struct AnalyzerMcpServer {
    client: Arc<AnalyzerClient>,
    tool_router: ToolRouter<Self>,
    prompt_router: PromptRouter<Self>,
}

/// Progress value reported for a status while waiting on analysis
pub(crate) fn progress_for(status: &RepositoryStatus) -> f64 {
    match status {
        RepositoryStatus::Cloning => 30.0,
        RepositoryStatus::Parsing => 60.0,
        RepositoryStatus::Ready | RepositoryStatus::Error => 100.0,
        _ => 10.0,
    }
}

/// Forwards polling snapshots to the MCP client as progress notifications
struct ProgressReporter {
    peer: Option<Peer<RoleServer>>,
    progress_token: Option<ProgressToken>,
}

impl ProgressReporter {
    async fn report(&self, status: &RepositoryStatus) {
        if let (Some(peer), Some(token)) = (&self.peer, &self.progress_token) {
            let _ = peer
                .notify_progress(ProgressNotificationParam {
                    progress_token: token.clone(),
                    progress: progress_for(status),
                    total: Some(100.0),
                    message: Some(crate::render::status_label(status).to_string()),
                })
                .await;
        }
    }
}

#[async_trait]
impl PollObserver for ProgressReporter {
    async fn on_update(&self, repository: &Repository, _attempt: u32) {
        self.report(&repository.status).await;
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|e| format!("Serialization failed: {}", e))
}

impl AnalyzerMcpServer {
    /// Create a new analyzer MCP server with default configuration
    pub fn new() -> Result<Self> {
        let client = AnalyzerClient::new().context("Failed to create analyzer client")?;
        Self::with_client(Arc::new(client))
    }

    /// Create a new analyzer MCP server with an existing client
    pub fn with_client(client: Arc<AnalyzerClient>) -> Result<Self> {
        Ok(Self {
            client,
            tool_router: Self::tool_router(),
            prompt_router: Self::prompt_router(),
        })
    }

    /// Get the underlying client
    pub fn client(&self) -> &AnalyzerClient {
        &self.client
    }

    /// Submit a repository and optionally wait for its analysis to finish
    pub(crate) async fn do_analyze(
        &self,
        req: AnalyzeRequest,
        peer: Option<Peer<RoleServer>>,
        progress_token: Option<ProgressToken>,
        cancel: &CancellationToken,
    ) -> Result<String, String> {
        req.validate().map_err(|e| e.to_string())?;

        let created = self
            .client
            .create_repository(&req.github_url)
            .await
            .map_err(|e| format!("{:#}", e))?;

        if !req.wait {
            return to_json(&created);
        }

        let reporter = ProgressReporter {
            peer,
            progress_token,
        };
        reporter.report(&created.status).await;

        let poller = StatusPoller::from_config(&self.client.config().polling);
        let outcome = poller
            .poll_until_done(
                self.client.as_ref(),
                &created.repo_id,
                &reporter,
                cancel,
            )
            .await
            .map_err(|e| format!("{:#}", e))?;

        to_json(&outcome.repository)
    }
}

#[tool_router(router = tool_router)]
impl AnalyzerMcpServer {
    #[tool(
        description = "Submit a GitHub repository for analysis. Waits until the backend has cloned and parsed it (status ready or error) unless wait is false, reporting progress along the way."
    )]
    async fn analyze_repository(
        &self,
        context: RequestContext<RoleServer>,
        Parameters(req): Parameters<AnalyzeRequest>,
    ) -> Result<String, String> {
        let progress_token = context.meta.get_progress_token();
        self.do_analyze(req, Some(context.peer.clone()), progress_token, &context.ct)
            .await
    }

    #[tool(description = "Get the analysis status, counts and file list of a submitted repository")]
    async fn get_repository(
        &self,
        Parameters(req): Parameters<RepositoryRequest>,
    ) -> Result<String, String> {
        req.validate().map_err(|e| e.to_string())?;

        let repository = self
            .client
            .get_repository(req.repo_id.trim())
            .await
            .map_err(|e| format!("{:#}", e))?;

        to_json(&repository)
    }

    #[tool(description = "Search functions and classes of an analyzed repository by name or code content")]
    async fn search_code(
        &self,
        Parameters(req): Parameters<SearchRequest>,
    ) -> Result<String, String> {
        req.validate().map_err(|e| e.to_string())?;

        self.client
            .ensure_ready(&req.repo_id)
            .await
            .map_err(|e| e.to_user_string())?;

        let response = self
            .client
            .search(&req.repo_id, &req.query)
            .await
            .map_err(|e| format!("{:#}", e))?;

        to_json(&response)
    }

    #[tool(description = "Ask a free-text question about an analyzed repository and get an AI answer")]
    async fn ask_question(
        &self,
        Parameters(req): Parameters<AskQuestionRequest>,
    ) -> Result<String, String> {
        req.validate().map_err(|e| e.to_string())?;

        self.client
            .ensure_ready(&req.repo_id)
            .await
            .map_err(|e| e.to_user_string())?;

        let response = self
            .client
            .ask(&req.repo_id, &req.question)
            .await
            .map_err(|e| format!("{:#}", e))?;

        to_json(&response)
    }

    #[tool(description = "Query a repository through the legacy /query endpoint")]
    async fn query_codebase(
        &self,
        Parameters(req): Parameters<LegacyQueryRequest>,
    ) -> Result<String, String> {
        req.validate().map_err(|e| e.to_string())?;

        let response = self
            .client
            .query(&req.repo_id, &req.query)
            .await
            .map_err(|e| format!("{:#}", e))?;

        to_json(&response)
    }
}

// Prompts for slash commands
#[prompt_router]
impl AnalyzerMcpServer {
    #[prompt(
        name = "analyze",
        description = "Analyze a GitHub repository (clone, parse and wait until ready)"
    )]
    async fn analyze_prompt(
        &self,
        Parameters(args): Parameters<serde_json::Value>,
    ) -> Result<GetPromptResult, McpError> {
        let url = args.get("github_url").and_then(|v| v.as_str()).unwrap_or("");

        let messages = vec![PromptMessage::new_text(
            PromptMessageRole::User,
            format!(
                "Please analyze the GitHub repository '{}' and summarize the file and code element counts once it is ready.",
                url
            ),
        )];

        Ok(GetPromptResult {
            description: Some(format!("Analyze repository {}", url)),
            messages,
        })
    }

    #[prompt(
        name = "search",
        description = "Search functions and classes of an analyzed repository"
    )]
    async fn search_prompt(
        &self,
        Parameters(args): Parameters<serde_json::Value>,
    ) -> Result<Vec<PromptMessage>, McpError> {
        let repo_id = args.get("repo_id").and_then(|v| v.as_str()).unwrap_or("");
        let query = args.get("query").and_then(|v| v.as_str()).unwrap_or("");

        Ok(vec![PromptMessage::new_text(
            PromptMessageRole::User,
            format!("Please search repository '{}' for: {}", repo_id, query),
        )])
    }

    #[prompt(
        name = "ask",
        description = "Ask a question about an analyzed repository"
    )]
    async fn ask_prompt(
        &self,
        Parameters(args): Parameters<serde_json::Value>,
    ) -> Result<Vec<PromptMessage>, McpError> {
        let repo_id = args.get("repo_id").and_then(|v| v.as_str()).unwrap_or("");
        let question = args
            .get("question")
            .and_then(|v| v.as_str())
            .unwrap_or("What does this codebase do?");

        Ok(vec![PromptMessage::new_text(
            PromptMessageRole::User,
            format!("About repository '{}': {}", repo_id, question),
        )])
    }
}

#[tool_handler(router = self.tool_router)]
#[prompt_handler]
impl ServerHandler for AnalyzerMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::default(),
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_prompts()
                .build(),
            server_info: Implementation {
                name: "repo-analyzer".into(),
                title: Some("Repo Analyzer - GitHub Repository Analysis".into()),
                version: env!("CARGO_PKG_VERSION").into(),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Analyze GitHub repositories through a remote analysis backend. \
                Use analyze_repository to submit a URL and wait until it is ready, \
                then search_code and ask_question with the returned repository id."
                    .into(),
            ),
        }
    }
}

impl AnalyzerMcpServer {
    pub async fn serve_stdio(self) -> Result<()> {
        tracing::info!("Starting repo-analyzer MCP server");

        let transport = rmcp::transport::io::stdio();

        self.serve(transport).await?.waiting().await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests;
