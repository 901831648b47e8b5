pub mod credentials;
pub mod providers;
pub mod resolver;
pub mod tracker;

pub use credentials::{ConfigurationError, Credential, CredentialPool};
pub use tracker::{RankTracker, SearchEvent, TrackerOptions};

/// Query executor abstraction - issues one page request with one credential
#[async_trait::async_trait]
pub trait QueryExecutor: Send + Sync {
    /// Fetch a single page of results. Failures are classified, never raised.
    async fn execute(&self, request: &SearchRequest, credential: &Credential) -> ExecutorResult;
}

/// One page request. Only the credential varies between attempts for a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    /// Search keyword (`q`)
    pub query: String,
    /// 1-based offset of the first result (`start`)
    pub start: usize,
    /// Page size, at most 10 (`num`)
    pub num: usize,
    /// Country code (`gl`)
    pub country: String,
}

/// A raw result item as returned by the search API, before a position is assigned
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawItem {
    pub title: String,
    pub link: String,
    pub snippet: String,
}

/// Classified outcome of a single executor call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutorResult {
    /// HTTP 200 with an `items` array (possibly empty)
    Success(Vec<RawItem>),
    /// HTTP 429, the credential's quota is spent
    QuotaExceeded,
    /// Network failure, timeout, unexpected status or malformed body
    TransientError(String),
    /// HTTP 200 with no `items` field
    Empty,
}

/// A collected result with its global 1-based position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultItem {
    pub title: String,
    pub link: String,
    pub snippet: String,
    pub position: usize,
}

/// Why a search stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// The target domain was found
    Matched,
    /// Collected items reached the requested result count
    BudgetReached,
    /// Every page offset was fetched without reaching the budget
    PagesExhausted,
    /// Every credential failed for one page
    CredentialsExhausted,
}

/// Accumulated result of a search.
///
/// Grows page by page and is sealed exactly once; after sealing no further
/// items are accepted.
#[derive(Debug, Clone, Default)]
pub struct SearchOutcome {
    items: Vec<ResultItem>,
    matched: Option<usize>,
    termination: Option<Termination>,
}

impl SearchOutcome {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a raw item with the next global position.
    ///
    /// Returns `None` if the outcome is already sealed.
    pub fn push(&mut self, raw: RawItem) -> Option<&ResultItem> {
        if self.is_sealed() {
            return None;
        }
        let position = self.items.len() + 1;
        self.items.push(ResultItem {
            title: raw.title,
            link: raw.link,
            snippet: raw.snippet,
            position,
        });
        self.items.last()
    }

    /// Seal with a match at the most recently pushed item.
    pub fn seal_matched(&mut self) {
        if self.is_sealed() || self.items.is_empty() {
            return;
        }
        self.matched = Some(self.items.len() - 1);
        self.termination = Some(Termination::Matched);
    }

    /// Seal without a match. Has no effect on an already sealed outcome.
    pub fn seal(&mut self, termination: Termination) {
        if self.is_sealed() || termination == Termination::Matched {
            return;
        }
        self.termination = Some(termination);
    }

    pub fn is_sealed(&self) -> bool {
        self.termination.is_some()
    }

    pub fn termination(&self) -> Option<Termination> {
        self.termination
    }

    pub fn items(&self) -> &[ResultItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn matched_position(&self) -> Option<usize> {
        self.matched_item().map(|item| item.position)
    }

    pub fn matched_link(&self) -> Option<&str> {
        self.matched_item().map(|item| item.link.as_str())
    }

    fn matched_item(&self) -> Option<&ResultItem> {
        self.matched.and_then(|idx| self.items.get(idx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(link: &str) -> RawItem {
        RawItem {
            title: "title".to_string(),
            link: link.to_string(),
            snippet: String::new(),
        }
    }

    #[test]
    fn test_positions_are_sequential() {
        let mut outcome = SearchOutcome::new();
        outcome.push(raw("https://a.com/"));
        outcome.push(raw("https://b.com/"));
        let third = outcome.push(raw("https://c.com/")).unwrap().position;
        assert_eq!(third, 3);
        assert_eq!(
            outcome.items().iter().map(|i| i.position).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
    }

    #[test]
    fn test_seal_matched_records_last_item() {
        let mut outcome = SearchOutcome::new();
        outcome.push(raw("https://a.com/"));
        outcome.push(raw("https://b.com/page"));
        outcome.seal_matched();

        assert_eq!(outcome.termination(), Some(Termination::Matched));
        assert_eq!(outcome.matched_position(), Some(2));
        assert_eq!(outcome.matched_link(), Some("https://b.com/page"));
    }

    #[test]
    fn test_sealed_outcome_rejects_items() {
        let mut outcome = SearchOutcome::new();
        outcome.push(raw("https://a.com/"));
        outcome.seal(Termination::BudgetReached);

        assert!(outcome.push(raw("https://b.com/")).is_none());
        assert_eq!(outcome.len(), 1);
    }

    #[test]
    fn test_first_seal_wins() {
        let mut outcome = SearchOutcome::new();
        outcome.push(raw("https://a.com/"));
        outcome.seal(Termination::CredentialsExhausted);
        outcome.seal_matched();
        outcome.seal(Termination::BudgetReached);

        assert_eq!(outcome.termination(), Some(Termination::CredentialsExhausted));
        assert_eq!(outcome.matched_position(), None);
    }

    #[test]
    fn test_seal_matched_on_empty_outcome_is_ignored() {
        let mut outcome = SearchOutcome::new();
        outcome.seal_matched();
        assert!(!outcome.is_sealed());
    }
}
