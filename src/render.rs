//! Terminal rendering of repositories, search results and answers

use crate::config::DisplayConfig;
use crate::types::{CodeElement, QueryResponse, Repository, RepositoryStatus};

use colored::{ColoredString, Colorize};
use std::fmt::Write;

/// Hint shown before any repository has been submitted
pub const IDLE_HINT: &str = "Enter a GitHub repository URL to get started";

const NO_CODE_PREVIEW: &str = "No code preview available...";

/// Human-readable label for a status
pub fn status_label(status: &RepositoryStatus) -> &str {
    match status {
        RepositoryStatus::Cloning => "Cloning repository...",
        RepositoryStatus::Parsing => "Parsing code...",
        RepositoryStatus::Ready => "Ready for analysis",
        RepositoryStatus::Error => "Error occurred",
        other => other.as_str(),
    }
}

/// Size in kilobytes with one decimal, e.g. `1.5KB`
pub fn format_size_kb(bytes: u64) -> String {
    format!("{:.1}KB", bytes as f64 / 1024.0)
}

/// Builds display text from backend records
#[derive(Debug, Clone)]
pub struct Renderer {
    color: bool,
    file_preview_limit: usize,
    code_preview_chars: usize,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::from_config(&DisplayConfig::default())
    }
}

impl Renderer {
    pub fn from_config(config: &DisplayConfig) -> Self {
        Self {
            color: config.color,
            file_preview_limit: config.file_preview_limit,
            code_preview_chars: config.code_preview_chars,
        }
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    fn paint(&self, text: &str, style: fn(&str) -> ColoredString) -> String {
        if self.color {
            style(text).to_string()
        } else {
            text.to_string()
        }
    }

    fn heading(&self, text: &str) -> String {
        self.paint(text, |t| t.bold())
    }

    fn status(&self, status: &RepositoryStatus) -> String {
        let label = status_label(status);
        match status {
            RepositoryStatus::Ready => self.paint(label, |t| t.green()),
            RepositoryStatus::Error => self.paint(label, |t| t.red()),
            _ => self.paint(label, |t| t.yellow()),
        }
    }

    /// Truncated code body for a search result
    pub fn code_preview(&self, code: &str) -> String {
        if code.is_empty() {
            return NO_CODE_PREVIEW.to_string();
        }
        let mut preview: String = code.chars().take(self.code_preview_chars).collect();
        preview.push_str("...");
        preview
    }

    pub fn idle_hint(&self) -> String {
        self.paint(IDLE_HINT, |t| t.dimmed())
    }

    /// Repository status panel
    pub fn render_repository(&self, repository: &Repository) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", self.heading("Repository Status"));
        let _ = writeln!(out, "URL: {}", repository.github_url);
        let _ = writeln!(out, "Status: {}", self.status(&repository.status));

        if let Some(count) = repository.file_count
            && count > 0
        {
            let _ = writeln!(out, "Files Found: {}", count);
        }

        if let Some(count) = repository.code_elements_count
            && count > 0
        {
            let _ = writeln!(out, "Code Elements: {} functions/classes found", count);
        }

        if let Some(error) = &repository.error
            && !error.is_empty()
        {
            let _ = writeln!(out, "{}", self.paint(&format!("Error: {}", error), |t| t.red()));
        }

        if !repository.files.is_empty() {
            let _ = writeln!(out);
            let _ = writeln!(out, "{}", self.heading("Sample Files:"));
            for file in repository.files.iter().take(self.file_preview_limit) {
                let _ = writeln!(
                    out,
                    "  {}  {}",
                    file.path,
                    self.paint(&format_size_kb(file.size), |t| t.dimmed())
                );
            }
            if repository.files.len() > self.file_preview_limit {
                let _ = writeln!(
                    out,
                    "  ... and {} more files",
                    repository.files.len() - self.file_preview_limit
                );
            }
        }

        out
    }

    fn render_element(&self, out: &mut String, element: &CodeElement) {
        let _ = writeln!(
            out,
            "{}  [{}] [{}]",
            self.heading(&element.name),
            element.element_type,
            element.language
        );
        let _ = writeln!(
            out,
            "  {}",
            self.paint(
                &format!("{}:{}", element.file_path, element.start_line),
                |t| t.cyan()
            )
        );
        if !element.docstring.is_empty() {
            let _ = writeln!(out, "  {}", self.paint(&element.docstring, |t| t.italic()));
        }
        for line in self.code_preview(&element.code).lines() {
            let _ = writeln!(out, "    {}", line);
        }
    }

    /// Search results, or a no-results line when a query matched nothing
    ///
    /// Returns an empty string when there is nothing to show.
    pub fn render_search_results(&self, query: &str, results: &[CodeElement]) -> String {
        let mut out = String::new();

        if results.is_empty() {
            if !query.is_empty() {
                let _ = writeln!(out, "No results found for \"{}\"", query);
            }
            return out;
        }

        let _ = writeln!(
            out,
            "{}",
            self.heading(&format!("Search Results ({})", results.len()))
        );
        for element in results {
            let _ = writeln!(out);
            self.render_element(&mut out, element);
        }
        out
    }

    /// AI answer block; empty when there is no answer
    pub fn render_answer(&self, answer: &str) -> String {
        if answer.is_empty() {
            return String::new();
        }
        format!("{}\n{}\n", self.heading("AI Response:"), answer)
    }

    /// Legacy `/query` response
    pub fn render_query_response(&self, response: &QueryResponse) -> String {
        let mut out = self.render_answer(&response.response);
        if !response.relevant_files.is_empty() {
            let _ = writeln!(out, "{}", self.heading("Relevant Files:"));
            for file in &response.relevant_files {
                let _ = writeln!(out, "  {}", file);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{code_element, repository};
    use crate::types::FileEntry;

    fn plain() -> Renderer {
        Renderer::default().with_color(false)
    }

    fn files(n: usize) -> Vec<FileEntry> {
        (0..n)
            .map(|i| FileEntry {
                path: format!("src/file_{}.py", i),
                size: 1536,
                extension: ".py".to_string(),
            })
            .collect()
    }

    #[test]
    fn test_status_labels() {
        assert_eq!(status_label(&RepositoryStatus::Cloning), "Cloning repository...");
        assert_eq!(status_label(&RepositoryStatus::Parsing), "Parsing code...");
        assert_eq!(status_label(&RepositoryStatus::Ready), "Ready for analysis");
        assert_eq!(status_label(&RepositoryStatus::Error), "Error occurred");
        assert_eq!(status_label(&RepositoryStatus::Processing), "processing");
        assert_eq!(
            status_label(&RepositoryStatus::Other("indexing".to_string())),
            "indexing"
        );
    }

    #[test]
    fn test_format_size_kb() {
        assert_eq!(format_size_kb(1536), "1.5KB");
        assert_eq!(format_size_kb(0), "0.0KB");
        assert_eq!(format_size_kb(100), "0.1KB");
    }

    #[test]
    fn test_repository_hides_zero_counts() {
        let mut repo = repository(RepositoryStatus::Parsing);
        repo.file_count = Some(0);
        repo.code_elements_count = Some(0);

        let text = plain().render_repository(&repo);
        assert!(text.contains("URL: https://github.com/octocat/hello-world"));
        assert!(text.contains("Status: Parsing code..."));
        assert!(!text.contains("Files Found"));
        assert!(!text.contains("Code Elements"));
        assert!(!text.contains("Sample Files"));
    }

    #[test]
    fn test_repository_ready_with_counts() {
        let mut repo = repository(RepositoryStatus::Ready);
        repo.file_count = Some(15);
        repo.code_elements_count = Some(42);
        repo.files = files(3);

        let text = plain().render_repository(&repo);
        assert!(text.contains("Status: Ready for analysis"));
        assert!(text.contains("Files Found: 15"));
        assert!(text.contains("Code Elements: 42 functions/classes found"));
        assert!(text.contains("Sample Files:"));
        assert!(text.contains("src/file_0.py  1.5KB"));
        assert!(!text.contains("more files"));
    }

    #[test]
    fn test_repository_error_line() {
        let mut repo = repository(RepositoryStatus::Error);
        repo.error = Some("Failed to clone repository".to_string());

        let text = plain().render_repository(&repo);
        assert!(text.contains("Status: Error occurred"));
        assert!(text.contains("Error: Failed to clone repository"));
    }

    #[test]
    fn test_repository_empty_error_hidden() {
        let mut repo = repository(RepositoryStatus::Error);
        repo.error = Some(String::new());

        let text = plain().render_repository(&repo);
        assert!(text.contains("Status: Error occurred"));
        assert!(!text.contains("Error:"));
    }

    #[test]
    fn test_sample_files_truncated() {
        let mut repo = repository(RepositoryStatus::Ready);
        repo.files = files(25);

        let text = plain().render_repository(&repo);
        assert!(text.contains("src/file_19.py"));
        assert!(!text.contains("src/file_20.py"));
        assert!(text.contains("... and 5 more files"));
    }

    #[test]
    fn test_code_preview() {
        let renderer = plain();
        assert_eq!(renderer.code_preview(""), "No code preview available...");
        assert_eq!(renderer.code_preview("def f(): pass"), "def f(): pass...");

        let long = "x".repeat(400);
        let preview = renderer.code_preview(&long);
        assert_eq!(preview.chars().count(), 303);
        assert!(preview.ends_with("..."));
    }

    #[test]
    fn test_code_preview_counts_characters() {
        let renderer = Renderer::from_config(&DisplayConfig {
            color: false,
            file_preview_limit: 20,
            code_preview_chars: 2,
        });
        assert_eq!(renderer.code_preview("äöü"), "äö...");
    }

    #[test]
    fn test_search_results() {
        let mut element = code_element("clone_repository");
        element.docstring = "Clone a repository from GitHub".to_string();
        let results = vec![element, code_element("parse_repository")];

        let text = plain().render_search_results("repository", &results);
        assert!(text.contains("Search Results (2)"));
        assert!(text.contains("clone_repository  [function] [python]"));
        assert!(text.contains("services/repo_service.py:12"));
        assert!(text.contains("Clone a repository from GitHub"));
        assert!(text.contains("def parse_repository(self):"));
    }

    #[test]
    fn test_search_no_results() {
        let renderer = plain();
        assert_eq!(
            renderer.render_search_results("missing", &[]),
            "No results found for \"missing\"\n"
        );
        assert!(renderer.render_search_results("", &[]).is_empty());
    }

    #[test]
    fn test_answer_only_when_present() {
        let renderer = plain();
        assert!(renderer.render_answer("").is_empty());
        assert_eq!(
            renderer.render_answer("It parses code."),
            "AI Response:\nIt parses code.\n"
        );
    }

    #[test]
    fn test_query_response_lists_files() {
        let response = QueryResponse {
            query: "auth".to_string(),
            response: "This is a placeholder response".to_string(),
            relevant_files: vec!["auth.py".to_string()],
        };
        let text = plain().render_query_response(&response);
        assert!(text.contains("AI Response:"));
        assert!(text.contains("Relevant Files:"));
        assert!(text.contains("  auth.py"));
    }

    #[test]
    fn test_idle_hint_plain() {
        assert_eq!(plain().idle_hint(), IDLE_HINT);
    }
}
