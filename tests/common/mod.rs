//! Common test utilities: temp directories and a mock Custom Search API
#![allow(dead_code)]

use rankcheck::search::providers::{GoogleCseExecutor, GoogleCseOptions};
use serde_json::{json, Value};
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::MockServer;

/// Path the mock API is served under
pub const CSE_PATH: &str = "/customsearch/v1";

/// Test fixture for the result log and settings files
pub struct TestFixture {
    /// Temporary directory that gets cleaned up automatically
    pub temp_dir: TempDir,
}

impl TestFixture {
    /// Create a new test fixture with a temporary directory
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        Self { temp_dir }
    }

    /// Get the path to the temporary directory
    pub fn path(&self) -> PathBuf {
        self.temp_dir.path().to_path_buf()
    }

    /// Create a test file with given content
    pub fn create_file(&self, name: &str, content: &str) -> PathBuf {
        let filepath = self.path().join(name);
        std::fs::write(&filepath, content).expect("Failed to write test file");
        filepath
    }

    /// Read file content
    pub fn read_file(&self, name: &str) -> String {
        let filepath = self.path().join(name);
        std::fs::read_to_string(&filepath).expect("Failed to read test file")
    }

    /// Check if file exists
    pub fn file_exists(&self, name: &str) -> bool {
        self.path().join(name).exists()
    }
}

/// Endpoint URL of the mock API
pub fn endpoint(server: &MockServer) -> String {
    format!("{}{}", server.uri(), CSE_PATH)
}

/// Executor pointed at the mock API, with a short timeout
pub fn executor(server: &MockServer) -> GoogleCseExecutor {
    GoogleCseExecutor::new(GoogleCseOptions {
        endpoint: endpoint(server),
        timeout: Duration::from_secs(2),
        accept_invalid_certs: false,
        proxy: None,
    })
    .expect("Failed to build executor")
}

/// A Custom Search response body with one item per link
pub fn cse_body(links: &[&str]) -> Value {
    let items: Vec<Value> = links
        .iter()
        .enumerate()
        .map(|(i, link)| {
            json!({
                "kind": "customsearch#result",
                "title": format!("Result {}", i + 1),
                "link": link,
                "displayLink": link,
                "snippet": format!("Snippet {}", i + 1),
            })
        })
        .collect();

    json!({
        "kind": "customsearch#search",
        "searchInformation": { "totalResults": "1000" },
        "items": items,
    })
}

/// `count` unrelated links numbered from `first`
pub fn filler_links(first: usize, count: usize) -> Vec<String> {
    (first..first + count)
        .map(|i| format!("https://site{}.example.org/page", i))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_creation() {
        let fixture = TestFixture::new();
        assert!(fixture.path().exists());
    }

    #[test]
    fn test_create_and_read_file() {
        let fixture = TestFixture::new();
        fixture.create_file("test.txt", "hello world");
        assert_eq!(fixture.read_file("test.txt"), "hello world");
    }

    #[test]
    fn test_cse_body_items() {
        let body = cse_body(&["https://a.com/", "https://b.com/"]);
        assert_eq!(body["items"].as_array().unwrap().len(), 2);
        assert_eq!(body["items"][1]["link"], "https://b.com/");
    }
}
