use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Google API keys, paired by position with `search_engine_ids`
    #[serde(default)]
    pub api_keys: Vec<String>,

    /// Programmable Search Engine ids (`cx`)
    #[serde(default)]
    pub search_engine_ids: Vec<String>,

    /// Search API endpoint
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Pause between successful pages, in milliseconds
    #[serde(default = "default_page_delay_ms")]
    pub page_delay_ms: u64,

    /// Skip TLS certificate validation (needed behind intercepting proxies)
    #[serde(default = "default_accept_invalid_certs")]
    pub accept_invalid_certs: bool,

    /// Write a debug log file
    #[serde(default)]
    pub debug: bool,

    /// Debug log location, file or directory. Supports `~`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug_log_path: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug_log_rotation: Option<DebugLogRotation>,

    /// How many rotated log files to keep (default 7, 0 keeps all)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug_log_keep: Option<usize>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_keys: Vec::new(),
            search_engine_ids: Vec::new(),
            endpoint: default_endpoint(),
            timeout_secs: default_timeout_secs(),
            page_delay_ms: default_page_delay_ms(),
            accept_invalid_certs: default_accept_invalid_certs(),
            debug: false,
            debug_log_path: None,
            debug_log_rotation: None,
            debug_log_keep: None,
        }
    }
}

/// Debug log rotation policy
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DebugLogRotation {
    /// A single file, appended across runs
    None,
    /// One file per day
    Daily,
}

fn default_endpoint() -> String {
    crate::search::providers::google_cse::DEFAULT_ENDPOINT.to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_page_delay_ms() -> u64 {
    1000
}

fn default_accept_invalid_certs() -> bool {
    true
}
