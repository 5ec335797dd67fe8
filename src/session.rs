//! Front-end session state
//!
//! Holds what the user is currently looking at: the submitted repository, the
//! last search and the last AI answer. Search and questions are only allowed
//! once the backend reports the repository as ready.

use crate::client::AnalyzerApi;
use crate::error::{AnalyzerError, ValidationError};
use crate::poller::{PollObserver, PollOutcome, StatusPoller};
use crate::types::{CodeElement, Repository, validate_github_url};

use async_trait::async_trait;
use std::sync::Mutex;
use tokio_util::sync::CancellationToken;

/// Answer shown when the question endpoint fails
pub const ASK_ERROR_MESSAGE: &str = "Sorry, there was an error processing your question.";

/// Session against one analysis backend
pub struct AnalysisSession<A: AnalyzerApi> {
    api: A,
    poller: StatusPoller,
    repository: Option<Repository>,
    search_query: String,
    search_results: Vec<CodeElement>,
    answer: String,
}

impl<A: AnalyzerApi> AnalysisSession<A> {
    pub fn new(api: A, poller: StatusPoller) -> Self {
        Self {
            api,
            poller,
            repository: None,
            search_query: String::new(),
            search_results: Vec::new(),
            answer: String::new(),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Repository currently on display
    pub fn repository(&self) -> Option<&Repository> {
        self.repository.as_ref()
    }

    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    pub fn search_results(&self) -> &[CodeElement] {
        &self.search_results
    }

    /// Last AI answer, empty when none
    pub fn answer(&self) -> &str {
        &self.answer
    }

    /// True when search and questions are available
    pub fn is_ready(&self) -> bool {
        self.repository
            .as_ref()
            .is_some_and(|r| r.status.is_ready())
    }

    /// Submit a repository URL and poll until its analysis finishes
    ///
    /// Clears the previous repository, search results and answer before sending.
    /// Every snapshot is stored in the session and forwarded to `observer`.
    pub async fn submit<O>(
        &mut self,
        github_url: &str,
        observer: &O,
        cancel: &CancellationToken,
    ) -> Result<PollOutcome, AnalyzerError>
    where
        O: PollObserver + ?Sized,
    {
        validate_github_url(github_url)?;

        self.repository = None;
        self.search_query.clear();
        self.search_results.clear();
        self.answer.clear();

        let created = self.api.create_repository(github_url).await?;
        tracing::info!(
            "Repository {} accepted as {} ({})",
            github_url.trim(),
            created.repo_id,
            created.status
        );

        self.follow(&created.repo_id, observer, cancel).await
    }

    /// Adopt an existing backend repository without resubmitting it
    pub async fn attach(&mut self, repo_id: &str) -> Result<&Repository, AnalyzerError> {
        if repo_id.trim().is_empty() {
            return Err(ValidationError::Empty("repository id".to_string()).into());
        }

        let repository = self.api.get_repository(repo_id.trim()).await?;
        self.search_query.clear();
        self.search_results.clear();
        self.answer.clear();
        Ok(self.repository.insert(repository))
    }

    /// Poll an already-submitted repository, recording snapshots in the session
    pub async fn follow<O>(
        &mut self,
        repo_id: &str,
        observer: &O,
        cancel: &CancellationToken,
    ) -> Result<PollOutcome, AnalyzerError>
    where
        O: PollObserver + ?Sized,
    {
        let recorder = RecordingObserver {
            latest: Mutex::new(None),
            inner: observer,
        };

        let result = self
            .poller
            .poll_until_done(&self.api, repo_id, &recorder, cancel)
            .await;

        let latest = recorder.take_latest();
        if latest.is_some() {
            self.repository = latest;
        }

        Ok(result?)
    }

    /// Re-fetch the current repository once
    pub async fn refresh(&mut self) -> Result<&Repository, AnalyzerError> {
        let repo_id = self
            .repository
            .as_ref()
            .map(|r| r.id.clone())
            .ok_or(ValidationError::NoRepository)?;

        let repository = self.api.get_repository(&repo_id).await?;
        Ok(self.repository.insert(repository))
    }

    fn ready_repo_id(&self) -> Result<String, ValidationError> {
        let repository = self
            .repository
            .as_ref()
            .ok_or(ValidationError::NoRepository)?;

        if !repository.status.is_ready() {
            return Err(ValidationError::RepositoryNotReady {
                status: repository.status.to_string(),
            });
        }

        Ok(repository.id.clone())
    }

    /// Search code elements of the current repository
    ///
    /// On failure the results are cleared and the error is returned.
    pub async fn search(&mut self, query: &str) -> Result<&[CodeElement], AnalyzerError> {
        let repo_id = self.ready_repo_id()?;
        self.search_query = query.to_string();

        match self.api.search(&repo_id, query).await {
            Ok(response) => {
                tracing::debug!("Search {:?} returned {} results", query, response.results.len());
                self.search_results = response.results;
                Ok(&self.search_results)
            }
            Err(e) => {
                tracing::error!("Search error: {}", e);
                self.search_results.clear();
                Err(e.into())
            }
        }
    }

    /// Ask a free-text question about the current repository
    ///
    /// On failure the stored answer becomes [`ASK_ERROR_MESSAGE`] and the error is returned.
    pub async fn ask(&mut self, question: &str) -> Result<&str, AnalyzerError> {
        let repo_id = self.ready_repo_id()?;
        if question.trim().is_empty() {
            return Err(ValidationError::Empty("question".to_string()).into());
        }

        self.answer.clear();

        match self.api.ask(&repo_id, question).await {
            Ok(response) => {
                self.answer = response.answer;
                Ok(&self.answer)
            }
            Err(e) => {
                tracing::error!("AI query error: {}", e);
                self.answer = ASK_ERROR_MESSAGE.to_string();
                Err(e.into())
            }
        }
    }
}

/// Keeps the newest snapshot while forwarding updates to the caller's observer
struct RecordingObserver<'a, O: ?Sized> {
    latest: Mutex<Option<Repository>>,
    inner: &'a O,
}

impl<O: ?Sized> RecordingObserver<'_, O> {
    fn take_latest(&self) -> Option<Repository> {
        self.latest.lock().ok().and_then(|mut guard| guard.take())
    }
}

#[async_trait]
impl<'a, O> PollObserver for RecordingObserver<'a, O>
where
    O: PollObserver + ?Sized,
{
    async fn on_update(&self, repository: &Repository, attempt: u32) {
        if let Ok(mut guard) = self.latest.lock() {
            *guard = Some(repository.clone());
        }
        self.inner.on_update(repository, attempt).await;
    }
}
