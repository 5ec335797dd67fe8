//! In-memory backend used by unit tests

use crate::client::AnalyzerApi;
use crate::error::ApiError;
use crate::types::*;

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

pub(crate) const TEST_URL: &str = "https://github.com/octocat/hello-world";

pub(crate) fn repository(status: RepositoryStatus) -> Repository {
    Repository {
        id: "repo_1".to_string(),
        github_url: TEST_URL.to_string(),
        status,
        file_count: None,
        code_elements_count: None,
        error: None,
        files: vec![],
    }
}

pub(crate) fn code_element(name: &str) -> CodeElement {
    CodeElement {
        element_type: "function".to_string(),
        name: name.to_string(),
        file_path: "services/repo_service.py".to_string(),
        start_line: 12,
        end_line: 21,
        code: format!("def {}(self):\n    pass", name),
        docstring: String::new(),
        language: "python".to_string(),
    }
}

/// Backend that replays scripted responses and records calls
pub(crate) struct FakeBackend {
    statuses: Mutex<VecDeque<Result<RepositoryStatus, ApiError>>>,
    search_results: Mutex<Option<Result<Vec<CodeElement>, ApiError>>>,
    answer: Mutex<Option<Result<String, ApiError>>>,
    calls: Mutex<Vec<String>>,
}

impl FakeBackend {
    pub(crate) fn new(statuses: Vec<Result<RepositoryStatus, ApiError>>) -> Self {
        Self {
            statuses: Mutex::new(statuses.into()),
            search_results: Mutex::new(None),
            answer: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn with_search(self, results: Result<Vec<CodeElement>, ApiError>) -> Self {
        self.script_search(results);
        self
    }

    pub(crate) fn script_search(&self, results: Result<Vec<CodeElement>, ApiError>) {
        *self.search_results.lock().unwrap() = Some(results);
    }

    pub(crate) fn with_answer(self, answer: Result<String, ApiError>) -> Self {
        *self.answer.lock().unwrap() = Some(answer);
        self
    }

    pub(crate) fn push_status(&self, status: Result<RepositoryStatus, ApiError>) {
        self.statuses.lock().unwrap().push_back(status);
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn count(&self, prefix: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl AnalyzerApi for FakeBackend {
    async fn health(&self) -> Result<HealthResponse, ApiError> {
        self.record("health".to_string());
        Ok(HealthResponse {
            message: "Repo Analyzer API is running".to_string(),
        })
    }

    async fn create_repository(
        &self,
        github_url: &str,
    ) -> Result<CreateRepositoryResponse, ApiError> {
        self.record(format!("create {}", github_url));
        Ok(CreateRepositoryResponse {
            repo_id: "repo_1".to_string(),
            status: RepositoryStatus::Created,
        })
    }

    async fn get_repository(&self, repo_id: &str) -> Result<Repository, ApiError> {
        self.record(format!("get {}", repo_id));
        let next = self
            .statuses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(RepositoryStatus::Processing));
        next.map(repository)
    }

    async fn search(&self, repo_id: &str, query: &str) -> Result<SearchResponse, ApiError> {
        self.record(format!("search {} {}", repo_id, query));
        let scripted = self.search_results.lock().unwrap().take();
        match scripted {
            Some(Ok(results)) => Ok(SearchResponse { results }),
            Some(Err(e)) => Err(e),
            None => Ok(SearchResponse::default()),
        }
    }

    async fn ask(&self, repo_id: &str, question: &str) -> Result<AskResponse, ApiError> {
        self.record(format!("ask {} {}", repo_id, question));
        let scripted = self.answer.lock().unwrap().take();
        match scripted {
            Some(Ok(answer)) => Ok(AskResponse { answer }),
            Some(Err(e)) => Err(e),
            None => Ok(AskResponse::default()),
        }
    }

    async fn query(&self, repo_id: &str, query: &str) -> Result<QueryResponse, ApiError> {
        self.record(format!("query {} {}", repo_id, query));
        Ok(QueryResponse {
            query: query.to_string(),
            response: "This is a placeholder response".to_string(),
            relevant_files: vec![],
        })
    }
}
