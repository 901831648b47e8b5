/// An (api key, search engine id) pair authorizing one search API account
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    pub api_key: String,
    pub search_engine_id: String,
}

impl Credential {
    pub fn new(api_key: impl Into<String>, search_engine_id: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            search_engine_id: search_engine_id.into(),
        }
    }

    /// API key safe to print: Google keys are masked, anything else keeps
    /// only its first four characters.
    pub fn display_key(&self) -> String {
        let redacted = crate::logging::redact_secrets(&self.api_key);
        if redacted != self.api_key {
            return redacted;
        }
        let prefix: String = self.api_key.chars().take(4).collect();
        format!("{prefix}***")
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("api_key", &self.display_key())
            .field("search_engine_id", &self.search_engine_id)
            .finish()
    }
}

/// Credential configuration errors, raised before any search begins
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    #[error("the number of API keys ({keys}) and search engine ids ({ids}) must match")]
    CountMismatch { keys: usize, ids: usize },

    #[error("no API keys configured")]
    NoCredentials,
}

/// Ordered credentials with a cursor that wraps from last back to first.
///
/// Credentials are never removed: one that hit its quota on a page is
/// simply reached again once the cursor cycles around.
#[derive(Debug, Clone)]
pub struct CredentialPool {
    credentials: Vec<Credential>,
    cursor: usize,
}

impl CredentialPool {
    /// Pair keys and ids by position.
    pub fn new(api_keys: Vec<String>, search_engine_ids: Vec<String>) -> Result<Self, ConfigurationError> {
        if api_keys.len() != search_engine_ids.len() {
            return Err(ConfigurationError::CountMismatch {
                keys: api_keys.len(),
                ids: search_engine_ids.len(),
            });
        }
        if api_keys.is_empty() {
            return Err(ConfigurationError::NoCredentials);
        }

        let credentials = api_keys
            .into_iter()
            .zip(search_engine_ids)
            .map(|(key, id)| Credential::new(key, id))
            .collect();

        Ok(Self {
            credentials,
            cursor: 0,
        })
    }

    /// Next credential in cyclic order.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> &Credential {
        let idx = self.cursor;
        self.cursor = (self.cursor + 1) % self.credentials.len();
        &self.credentials[idx]
    }

    pub fn len(&self) -> usize {
        self.credentials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.credentials.is_empty()
    }
}
