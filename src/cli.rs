//! Command line interface
//!
//! Argument definitions (clap derive) and the command dispatcher used by the
//! `repo-analyzer` binary.

use crate::client::{AnalyzerApi, AnalyzerClient};
use crate::config::Config;
use crate::mcp_server::AnalyzerMcpServer;
use crate::paths::PlatformPaths;
use crate::poller::StatusPoller;
use crate::progress::SpinnerObserver;
use crate::render::Renderer;
use crate::session::AnalysisSession;
use crate::shell::Shell;
use crate::types::{RepositoryStatus, SearchResponse, validate_github_url};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Parser)]
#[command(
    name = "repo-analyzer",
    version,
    about = "Submit GitHub repositories for analysis, search their code and ask questions"
)]
pub struct Cli {
    /// Path to a config file (default: {config_dir}/repo-analyzer/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Base URL of the analysis backend
    #[arg(long, global = true, env = "REPO_ANALYZER_URL")]
    pub base_url: Option<String>,

    /// Print raw JSON instead of formatted text
    #[arg(long, global = true)]
    pub json: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Submit a repository and wait until its analysis finishes
    Analyze {
        /// e.g. https://github.com/username/repository
        url: String,

        /// Print the submission result without waiting
        #[arg(long)]
        no_wait: bool,
    },

    /// Show the status of a submitted repository
    Status { repo_id: String },

    /// Search functions and classes of a ready repository
    Search {
        repo_id: String,
        query: Vec<String>,
    },

    /// Ask a question about a ready repository
    Ask {
        repo_id: String,
        #[arg(required = true)]
        question: Vec<String>,
    },

    /// Query through the legacy /query endpoint
    Query {
        repo_id: String,
        #[arg(required = true)]
        query: Vec<String>,
    },

    /// Check that the backend is reachable
    Health,

    /// Start the interactive shell
    Shell {
        /// Repository to analyze right away
        url: Option<String>,
    },

    /// Run the MCP server over stdio
    Serve,

    /// Show or create the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Show version and build information
    Version,
}

#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration
    Show,

    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

impl Cli {
    /// Effective configuration: file, then environment, then command line flags
    pub fn resolve_config(&self) -> Result<Config> {
        let mut config = Config::load(self.config.as_deref())?;

        if let Some(base_url) = &self.base_url {
            config.backend.base_url = base_url.clone();
        }
        if self.no_color {
            config.display.color = false;
        }

        config.validate()?;
        Ok(config)
    }
}

/// Output mode shared by all commands
struct Output {
    json: bool,
    renderer: Renderer,
}

impl Output {
    fn emit<T: Serialize>(&self, value: &T, text: impl FnOnce(&Renderer) -> String) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            let text = text(&self.renderer);
            if !text.is_empty() {
                println!("{}", text.trim_end());
            }
        }
        Ok(())
    }
}

/// Error message with its causes, skipping causes already spelled out by their wrapper
pub fn error_report(err: &anyhow::Error) -> String {
    let mut report = String::new();
    for cause in err.chain() {
        let message = cause.to_string();
        if report.contains(&message) {
            continue;
        }
        if !report.is_empty() {
            report.push_str(": ");
        }
        report.push_str(&message);
    }
    report
}

fn status_exit_code(status: &RepositoryStatus) -> ExitCode {
    if *status == RepositoryStatus::Error {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

/// Cancellation token cancelled on Ctrl-C
fn interrupt_token() -> CancellationToken {
    let cancel = CancellationToken::new();
    let guard = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupted");
            guard.cancel();
        }
    });
    cancel
}

/// Run the parsed command line
pub async fn run(cli: Cli) -> Result<ExitCode> {
    match &cli.command {
        Commands::Version => {
            println!("repo-analyzer {}", env!("CARGO_PKG_VERSION"));
            println!("Built: {}", env!("BUILD_TIMESTAMP"));
            println!("Commit: {}", env!("GIT_COMMIT_HASH"));
            return Ok(ExitCode::SUCCESS);
        }
        Commands::Config {
            action: ConfigAction::Init { force },
        } => {
            let path = cli
                .config
                .clone()
                .unwrap_or_else(PlatformPaths::default_config_path);
            if path.exists() && !force {
                bail!(
                    "Config file already exists at {} (use --force to overwrite)",
                    path.display()
                );
            }
            Config::default().save(&path)?;
            println!("Wrote default configuration to {}", path.display());
            return Ok(ExitCode::SUCCESS);
        }
        _ => {}
    }

    let mut config = cli.resolve_config()?;
    if !std::io::stdout().is_terminal() {
        config.display.color = false;
    }

    let output = Output {
        json: cli.json,
        renderer: Renderer::from_config(&config.display),
    };
    let show_progress = !cli.json && std::io::stderr().is_terminal();
    let poller = StatusPoller::from_config(&config.polling);

    if let Commands::Config {
        action: ConfigAction::Show,
    } = &cli.command
    {
        if cli.json {
            println!("{}", serde_json::to_string_pretty(&config)?);
        } else {
            print!("{}", toml::to_string_pretty(&config)?);
        }
        return Ok(ExitCode::SUCCESS);
    }

    let client = AnalyzerClient::with_config(config)?;

    match cli.command {
        Commands::Analyze { url, no_wait } => {
            if no_wait {
                validate_github_url(&url)?;
                let created = client.create_repository(&url).await?;
                output.emit(&created, |_| {
                    format!(
                        "Submitted {} as {} ({})",
                        url.trim(),
                        created.repo_id,
                        created.status
                    )
                })?;
                return Ok(ExitCode::SUCCESS);
            }

            let mut session = AnalysisSession::new(client, poller);
            let spinner = SpinnerObserver::new(show_progress);
            let result = session.submit(&url, &spinner, &interrupt_token()).await;
            spinner.finish();

            let outcome = result.context("Repository analysis did not complete")?;
            output.emit(&outcome.repository, |r| {
                r.render_repository(&outcome.repository)
            })?;
            Ok(status_exit_code(&outcome.repository.status))
        }

        Commands::Status { repo_id } => {
            let repository = client.get_repository(repo_id.trim()).await?;
            output.emit(&repository, |r| r.render_repository(&repository))?;
            Ok(status_exit_code(&repository.status))
        }

        Commands::Search { repo_id, query } => {
            let query = query.join(" ");
            let mut session = AnalysisSession::new(client, poller);
            session.attach(&repo_id).await?;
            let results = session.search(&query).await?.to_vec();

            let response = SearchResponse { results };
            output.emit(&response, |r| {
                r.render_search_results(&query, &response.results)
            })?;
            Ok(ExitCode::SUCCESS)
        }

        Commands::Ask { repo_id, question } => {
            let question = question.join(" ");
            let mut session = AnalysisSession::new(client, poller);
            session.attach(&repo_id).await?;

            let result = session.ask(&question).await.map(|_| ());
            let answer = crate::types::AskResponse {
                answer: session.answer().to_string(),
            };
            output.emit(&answer, |r| r.render_answer(&answer.answer))?;
            result?;
            Ok(ExitCode::SUCCESS)
        }

        Commands::Query { repo_id, query } => {
            let response = client.query(repo_id.trim(), &query.join(" ")).await?;
            output.emit(&response, |r| r.render_query_response(&response))?;
            Ok(ExitCode::SUCCESS)
        }

        Commands::Health => {
            let health = client.health().await.with_context(|| {
                format!("Backend at {} is not reachable", client.base_url())
            })?;
            output.emit(&health, |_| health.message.clone())?;
            Ok(ExitCode::SUCCESS)
        }

        Commands::Shell { url } => {
            let renderer = output.renderer.clone();
            let mut shell = Shell::new(AnalysisSession::new(client, poller), renderer)
                .with_progress(std::io::stderr().is_terminal());
            shell.run(url).await?;
            Ok(ExitCode::SUCCESS)
        }

        Commands::Serve => {
            let server = AnalyzerMcpServer::with_client(Arc::new(client))?;
            server.serve_stdio().await?;
            Ok(ExitCode::SUCCESS)
        }

        Commands::Version | Commands::Config { .. } => Ok(ExitCode::SUCCESS),
    }
}
