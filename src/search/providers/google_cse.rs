use crate::search::{Credential, ExecutorResult, QueryExecutor, RawItem, SearchRequest};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::time::Duration;

/// Google Custom Search JSON API endpoint
pub const DEFAULT_ENDPOINT: &str = "https://www.googleapis.com/customsearch/v1";

/// Longest error body kept in a transient error detail
const MAX_ERROR_BODY: usize = 200;

/// Settings for the Google CSE executor, fixed for a whole session
#[derive(Debug, Clone)]
pub struct GoogleCseOptions {
    pub endpoint: String,
    pub timeout: Duration,
    /// Skip TLS certificate validation. On by default since the API is often
    /// reached through a local intercepting proxy.
    pub accept_invalid_certs: bool,
    /// Forward proxy as `host:port` (or a full proxy URL)
    pub proxy: Option<String>,
}

impl Default for GoogleCseOptions {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: Duration::from_secs(10),
            accept_invalid_certs: true,
            proxy: None,
        }
    }
}

/// Google Custom Search API executor
///
/// Free tier: 100 queries/day per key, at most 10 results per query.
/// Documentation: https://developers.google.com/custom-search/v1/reference/rest/v1/cse/list
pub struct GoogleCseExecutor {
    client: reqwest::Client,
    endpoint: String,
}

#[derive(Debug, Deserialize)]
struct CseResponse {
    items: Option<Vec<CseItem>>,
}

#[derive(Debug, Deserialize)]
struct CseItem {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    snippet: String,
}

impl GoogleCseExecutor {
    pub fn new(options: GoogleCseOptions) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .timeout(options.timeout)
            .danger_accept_invalid_certs(options.accept_invalid_certs);

        if let Some(proxy) = options.proxy.as_deref() {
            let proxy_url = proxy_url(proxy);
            let proxy = reqwest::Proxy::all(&proxy_url)
                .with_context(|| format!("Invalid proxy address: {}", proxy_url))?;
            builder = builder.proxy(proxy);
        }

        let client = builder.build().context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            endpoint: options.endpoint,
        })
    }

    /// Classify a completed HTTP response.
    async fn classify(response: reqwest::Response) -> ExecutorResult {
        let status = response.status();

        if status.as_u16() == 429 {
            return ExecutorResult::QuotaExceeded;
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let body = crate::logging::redact_secrets(&truncate(&body, MAX_ERROR_BODY));
            return ExecutorResult::TransientError(format!("HTTP {}: {}", status, body));
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => return ExecutorResult::TransientError(format!("Failed to read response body: {}", e)),
        };

        match serde_json::from_str::<CseResponse>(&body) {
            Ok(CseResponse { items: None }) => ExecutorResult::Empty,
            Ok(CseResponse { items: Some(items) }) => ExecutorResult::Success(
                items
                    .into_iter()
                    .map(|item| RawItem {
                        title: item.title,
                        link: item.link,
                        snippet: item.snippet,
                    })
                    .collect(),
            ),
            Err(e) => ExecutorResult::TransientError(format!("Malformed JSON response: {}", e)),
        }
    }
}

#[async_trait::async_trait]
impl QueryExecutor for GoogleCseExecutor {
    async fn execute(&self, request: &SearchRequest, credential: &Credential) -> ExecutorResult {
        tracing::debug!(
            query = %request.query,
            start = request.start,
            num = request.num,
            country = %request.country,
            key = %credential.display_key(),
            "performing google cse request"
        );

        let start = request.start.to_string();
        let num = request.num.to_string();

        let response = self
            .client
            .get(&self.endpoint)
            .header("Accept", "application/json")
            .query(&[
                ("q", request.query.as_str()),
                ("start", start.as_str()),
                ("num", num.as_str()),
                ("gl", request.country.as_str()),
                ("key", credential.api_key.as_str()),
                ("cx", credential.search_engine_id.as_str()),
            ])
            .send()
            .await;

        let result = match response {
            Ok(response) => Self::classify(response).await,
            Err(e) if e.is_timeout() => ExecutorResult::TransientError("request timed out".to_string()),
            // reqwest errors carry the full URL, which includes the key.
            Err(e) => ExecutorResult::TransientError(crate::logging::redact_secrets(
                &e.without_url().to_string(),
            )),
        };

        match &result {
            ExecutorResult::Success(items) => {
                tracing::debug!(result_count = items.len(), "google cse request completed")
            }
            other => tracing::debug!(outcome = ?other, "google cse request failed"),
        }

        result
    }
}

/// Normalize a `host:port` proxy into a URL, leaving explicit URLs untouched.
fn proxy_url(proxy: &str) -> String {
    if proxy.contains("://") {
        proxy.to_string()
    } else {
        format!("http://{}", proxy)
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_chars).collect();
    out.push_str("...");
    out
}
