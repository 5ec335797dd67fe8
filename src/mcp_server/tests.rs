use super::*;
use crate::config::Config;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// Helper to create a server backed by a mock analysis API
async fn create_test_server() -> (AnalyzerMcpServer, MockServer) {
    let backend = MockServer::start().await;
    let mut config = Config::default();
    config.backend.base_url = backend.uri();
    config.polling.interval_ms = 5;
    config.polling.max_attempts = 20;
    let client = AnalyzerClient::with_config(config).unwrap();
    let server = AnalyzerMcpServer::with_client(Arc::new(client)).unwrap();
    (server, backend)
}

fn repository_json(status: &str) -> serde_json::Value {
    json!({
        "id": "repo_1",
        "github_url": "https://github.com/octocat/hello-world",
        "status": status,
        "file_count": 3,
        "code_elements_count": 7
    })
}

async fn mount_repository(backend: &MockServer, status: &str) {
    Mock::given(method("GET"))
        .and(path("/repositories/repo_1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(repository_json(status)))
        .mount(backend)
        .await;
}

async fn mount_create(backend: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/repositories"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"repo_id": "repo_1", "status": "created"})),
        )
        .expect(1)
        .mount(backend)
        .await;
}

#[tokio::test]
async fn test_get_info() {
    let (server, _backend) = create_test_server().await;

    let info = server.get_info();

    assert_eq!(info.server_info.name, "repo-analyzer");
    assert!(info.server_info.title.is_some());
    assert_eq!(info.server_info.version, env!("CARGO_PKG_VERSION"));
    assert!(info.capabilities.tools.is_some());
    assert!(info.capabilities.prompts.is_some());

    let instructions = info.instructions.as_deref().unwrap();
    assert!(instructions.contains("analyze_repository"));
    assert!(instructions.contains("search_code"));
    assert!(instructions.contains("ask_question"));
}

#[tokio::test]
async fn test_client_accessor() {
    let (server, backend) = create_test_server().await;
    assert_eq!(
        server.client().base_url().as_str(),
        format!("{}/", backend.uri())
    );
}

#[test]
fn test_progress_for_statuses() {
    assert_eq!(progress_for(&RepositoryStatus::Created), 10.0);
    assert_eq!(progress_for(&RepositoryStatus::Processing), 10.0);
    assert_eq!(progress_for(&RepositoryStatus::Cloning), 30.0);
    assert_eq!(progress_for(&RepositoryStatus::Parsing), 60.0);
    assert_eq!(progress_for(&RepositoryStatus::Ready), 100.0);
    assert_eq!(progress_for(&RepositoryStatus::Error), 100.0);
}

// ===== Tool Handler Tests =====

#[tokio::test]
async fn test_analyze_without_wait_returns_created() {
    let (server, backend) = create_test_server().await;
    mount_create(&backend).await;

    let req = AnalyzeRequest {
        github_url: "https://github.com/octocat/hello-world".to_string(),
        wait: false,
    };
    let output = server
        .do_analyze(req, None, None, &CancellationToken::new())
        .await
        .unwrap();

    let value: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(value["repo_id"], "repo_1");
    assert_eq!(value["status"], "created");
}

#[tokio::test]
async fn test_analyze_waits_for_ready() {
    let (server, backend) = create_test_server().await;
    mount_create(&backend).await;

    // First two polls report parsing, later ones ready
    Mock::given(method("GET"))
        .and(path("/repositories/repo_1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(repository_json("parsing")))
        .up_to_n_times(2)
        .with_priority(1)
        .mount(&backend)
        .await;
    mount_repository(&backend, "ready").await;

    let req = AnalyzeRequest {
        github_url: "https://github.com/octocat/hello-world".to_string(),
        wait: true,
    };
    let output = server
        .do_analyze(req, None, None, &CancellationToken::new())
        .await
        .unwrap();

    let repository: Repository = serde_json::from_str(&output).unwrap();
    assert_eq!(repository.status, RepositoryStatus::Ready);
    assert_eq!(repository.code_elements_count, Some(7));
}

#[tokio::test]
async fn test_analyze_rejects_invalid_url() {
    let (server, _backend) = create_test_server().await;

    let req = AnalyzeRequest {
        github_url: "ftp://github.com/a/b".to_string(),
        wait: true,
    };
    let err = server
        .do_analyze(req, None, None, &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(err.contains("scheme must be http or https"));
}

#[tokio::test]
async fn test_analyze_reports_poll_failure() {
    let (server, backend) = create_test_server().await;
    mount_create(&backend).await;
    Mock::given(method("GET"))
        .and(path("/repositories/repo_1"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&backend)
        .await;

    let req = AnalyzeRequest {
        github_url: "https://github.com/octocat/hello-world".to_string(),
        wait: true,
    };
    let err = server
        .do_analyze(req, None, None, &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(err.contains("503"));
}

#[tokio::test]
async fn test_analyze_stops_when_request_cancelled() {
    let (server, backend) = create_test_server().await;
    mount_create(&backend).await;
    mount_repository(&backend, "parsing").await;

    let cancel = CancellationToken::new();
    cancel.cancel();

    let req = AnalyzeRequest {
        github_url: "https://github.com/octocat/hello-world".to_string(),
        wait: true,
    };
    let err = server
        .do_analyze(req, None, None, &cancel)
        .await
        .unwrap_err();
    assert!(err.contains("cancelled"));
}

#[tokio::test]
async fn test_tool_get_repository() {
    let (server, backend) = create_test_server().await;
    mount_repository(&backend, "cloning").await;

    let output = server
        .get_repository(Parameters(RepositoryRequest {
            repo_id: "repo_1".to_string(),
        }))
        .await
        .unwrap();
    assert!(output.contains("\"cloning\""));
}

#[tokio::test]
async fn test_tool_get_repository_not_found() {
    let (server, backend) = create_test_server().await;
    Mock::given(method("GET"))
        .and(path("/repositories/repo_404"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({"detail": "Repository not found"})),
        )
        .mount(&backend)
        .await;

    let err = server
        .get_repository(Parameters(RepositoryRequest {
            repo_id: "repo_404".to_string(),
        }))
        .await
        .unwrap_err();
    assert!(err.contains("Repository not found"));
}

#[tokio::test]
async fn test_tool_search_code_requires_ready() {
    let (server, backend) = create_test_server().await;
    mount_repository(&backend, "parsing").await;
    Mock::given(method("GET"))
        .and(path("/repositories/repo_1/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
        .expect(0)
        .mount(&backend)
        .await;

    let err = server
        .search_code(Parameters(SearchRequest {
            repo_id: "repo_1".to_string(),
            query: "parse".to_string(),
        }))
        .await
        .unwrap_err();
    assert!(err.contains("not ready"));
}

#[tokio::test]
async fn test_tool_search_code() {
    let (server, backend) = create_test_server().await;
    mount_repository(&backend, "ready").await;
    Mock::given(method("GET"))
        .and(path("/repositories/repo_1/search"))
        .and(query_param("q", "parse"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{
                "type": "class",
                "name": "CodeParser",
                "file_path": "parsers/code_parser.py",
                "start_line": 5,
                "end_line": 40,
                "code": "class CodeParser:",
                "docstring": "",
                "language": "python"
            }]
        })))
        .mount(&backend)
        .await;

    let output = server
        .search_code(Parameters(SearchRequest {
            repo_id: "repo_1".to_string(),
            query: "parse".to_string(),
        }))
        .await
        .unwrap();

    let response: SearchResponse = serde_json::from_str(&output).unwrap();
    assert_eq!(response.results.len(), 1);
    assert_eq!(response.results[0].element_type, "class");
}

#[tokio::test]
async fn test_tool_ask_question_validation_failure() {
    let (server, _backend) = create_test_server().await;

    let err = server
        .ask_question(Parameters(AskQuestionRequest {
            repo_id: "repo_1".to_string(),
            question: "  ".to_string(),
        }))
        .await
        .unwrap_err();
    assert!(err.contains("question"));
}

#[tokio::test]
async fn test_tool_ask_question() {
    let (server, backend) = create_test_server().await;
    mount_repository(&backend, "ready").await;
    Mock::given(method("POST"))
        .and(path("/repositories/repo_1/ask"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"answer": "A FastAPI service."})),
        )
        .mount(&backend)
        .await;

    let output = server
        .ask_question(Parameters(AskQuestionRequest {
            repo_id: "repo_1".to_string(),
            question: "What does this codebase do?".to_string(),
        }))
        .await
        .unwrap();
    assert!(output.contains("A FastAPI service."));
}

#[tokio::test]
async fn test_tool_query_codebase() {
    let (server, backend) = create_test_server().await;
    Mock::given(method("POST"))
        .and(path("/query"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "query": "auth",
            "response": "This is a placeholder response",
            "relevant_files": []
        })))
        .mount(&backend)
        .await;

    let output = server
        .query_codebase(Parameters(LegacyQueryRequest {
            repo_id: "repo_1".to_string(),
            query: "auth".to_string(),
        }))
        .await
        .unwrap();
    assert!(output.contains("placeholder"));
}

// ===== Prompt Handler Tests =====

#[tokio::test]
async fn test_prompt_analyze_with_url() {
    let (server, _backend) = create_test_server().await;

    let args = json!({"github_url": "https://github.com/octocat/hello-world"});
    let result = server.analyze_prompt(Parameters(args)).await.unwrap();

    assert!(result.description.is_some());
    assert!(!result.messages.is_empty());
    let debug_str = format!("{:?}", result.messages[0].content);
    assert!(debug_str.contains("octocat/hello-world"));
}

#[tokio::test]
async fn test_prompt_search() {
    let (server, _backend) = create_test_server().await;

    let args = json!({"repo_id": "repo_1", "query": "models"});
    let messages = server.search_prompt(Parameters(args)).await.unwrap();

    let debug_str = format!("{:?}", messages[0].content);
    assert!(debug_str.contains("repo_1"));
    assert!(debug_str.contains("models"));
}

#[tokio::test]
async fn test_prompt_ask_default_question() {
    let (server, _backend) = create_test_server().await;

    let messages = server.ask_prompt(Parameters(json!({}))).await.unwrap();

    let debug_str = format!("{:?}", messages[0].content);
    assert!(debug_str.contains("What does this codebase do?"));
}
