//! Interactive analysis shell
//!
//! A line-oriented stand-in for the single analysis page: submit a URL, watch
//! the status, then search and ask questions once the repository is ready.

use crate::client::AnalyzerApi;
use crate::error::{AnalyzerError, ValidationError};
use crate::progress::SpinnerObserver;
use crate::render::Renderer;
use crate::session::AnalysisSession;

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;

/// A parsed shell input line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Analyze(String),
    Attach(String),
    Status,
    Search(String),
    Ask(String),
    Help,
    Quit,
    Empty,
    /// Recognised command with a missing argument, holds the usage hint
    Usage(&'static str),
    Unknown(String),
}

/// Parse one line of shell input
///
/// A bare `http(s)://` URL is treated as `analyze <url>`.
pub fn parse_shell_command(line: &str) -> ShellCommand {
    let line = line.trim();
    if line.is_empty() {
        return ShellCommand::Empty;
    }

    if line.starts_with("http://") || line.starts_with("https://") {
        return ShellCommand::Analyze(line.to_string());
    }

    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    match word.to_lowercase().as_str() {
        "analyze" | "a" if rest.is_empty() => ShellCommand::Usage("analyze <github-url>"),
        "analyze" | "a" => ShellCommand::Analyze(rest.to_string()),
        "attach" if rest.is_empty() => ShellCommand::Usage("attach <repo-id>"),
        "attach" => ShellCommand::Attach(rest.to_string()),
        "status" | "st" => ShellCommand::Status,
        "search" | "s" => ShellCommand::Search(rest.to_string()),
        "ask" if rest.is_empty() => ShellCommand::Usage("ask <question>"),
        "ask" => ShellCommand::Ask(rest.to_string()),
        "help" | "h" | "?" => ShellCommand::Help,
        "quit" | "exit" | "q" => ShellCommand::Quit,
        _ => ShellCommand::Unknown(word.to_string()),
    }
}

pub const HELP_TEXT: &str = "\
Commands:
  analyze <url>    Submit a GitHub repository and wait for analysis
  attach <id>      Load an already submitted repository
  status           Refresh and show the current repository
  search <query>   Search functions and classes
  ask <question>   Ask the AI about the codebase
  help             Show this help
  quit             Leave the shell";

/// Interactive shell over an [`AnalysisSession`]
pub struct Shell<A: AnalyzerApi> {
    session: AnalysisSession<A>,
    renderer: Renderer,
    show_progress: bool,
}

impl<A: AnalyzerApi> Shell<A> {
    pub fn new(session: AnalysisSession<A>, renderer: Renderer) -> Self {
        Self {
            session,
            renderer,
            show_progress: true,
        }
    }

    /// Draw a spinner while polling (on by default)
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn session(&self) -> &AnalysisSession<A> {
        &self.session
    }

    /// Run one command and return the text to print, `None` to leave the shell
    pub async fn execute(
        &mut self,
        command: ShellCommand,
        cancel: &CancellationToken,
    ) -> Option<String> {
        let output = match command {
            ShellCommand::Quit => return None,
            ShellCommand::Empty => String::new(),
            ShellCommand::Help => HELP_TEXT.to_string(),
            ShellCommand::Usage(usage) => format!("Usage: {}", usage),
            ShellCommand::Unknown(word) => {
                format!("Unknown command '{}'. Type 'help' for commands.", word)
            }
            ShellCommand::Analyze(url) => {
                let spinner = SpinnerObserver::new(self.show_progress);
                let result = self.session.submit(&url, &spinner, cancel).await;
                spinner.finish();

                let mut out = self
                    .session
                    .repository()
                    .map(|r| self.renderer.render_repository(r))
                    .unwrap_or_default();
                if let Err(e) = result {
                    out.push_str(&error_text(&e));
                }
                out
            }
            ShellCommand::Attach(repo_id) => match self.session.attach(&repo_id).await {
                Ok(repository) => self.renderer.render_repository(repository),
                Err(e) => error_text(&e),
            },
            ShellCommand::Status => match self.session.refresh().await {
                Ok(repository) => self.renderer.render_repository(repository),
                Err(AnalyzerError::Validation(ValidationError::NoRepository)) => {
                    self.renderer.idle_hint()
                }
                Err(e) => error_text(&e),
            },
            ShellCommand::Search(query) => match self.session.search(&query).await {
                Ok(results) => {
                    let text = self.renderer.render_search_results(&query, results);
                    if text.is_empty() {
                        "Enter a search query.".to_string()
                    } else {
                        text
                    }
                }
                Err(e) => error_text(&e),
            },
            ShellCommand::Ask(question) => {
                let result = self.session.ask(&question).await.map(|_| ());
                let mut out = self.renderer.render_answer(self.session.answer());
                if let Err(e) = result {
                    tracing::debug!("ask failed: {}", e);
                    if out.is_empty() {
                        out = error_text(&e);
                    }
                }
                out
            }
        };

        Some(output)
    }

    /// Read commands from the terminal until `quit` or end of input
    pub async fn run(&mut self, initial_url: Option<String>) -> Result<()> {
        println!("{}", self.renderer.idle_hint());
        println!("Type 'help' for commands.");

        if let Some(url) = initial_url
            && let Some(output) = self.execute_interruptible(ShellCommand::Analyze(url)).await
        {
            print_block(&output);
        }

        loop {
            let line = tokio::task::spawn_blocking(|| {
                dialoguer::Input::<String>::new()
                    .with_prompt("repo-analyzer")
                    .allow_empty(true)
                    .interact_text()
            })
            .await
            .context("Input task failed")?;

            let line = match line {
                Ok(line) => line,
                Err(dialoguer::Error::IO(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                    break;
                }
                Err(e) => return Err(e).context("Failed to read input"),
            };

            match self.execute_interruptible(parse_shell_command(&line)).await {
                Some(output) => print_block(&output),
                None => break,
            }
        }

        Ok(())
    }

    async fn execute_interruptible(&mut self, command: ShellCommand) -> Option<String> {
        let cancel = CancellationToken::new();
        let guard = cancel.clone();
        let interrupt = tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                guard.cancel();
            }
        });

        let output = self.execute(command, &cancel).await;
        interrupt.abort();
        output
    }
}

fn error_text(err: &AnalyzerError) -> String {
    format!("Error: {}", err.to_user_string())
}

fn print_block(text: &str) {
    if !text.is_empty() {
        println!("{}", text.trim_end());
    }
}
