//! Rotation and retry controller.
//!
//! Drives a [`QueryExecutor`] page by page, rotating through the
//! [`CredentialPool`] whenever a credential fails, and stops as soon as the
//! target domain shows up. The [`SearchOutcome`] seal is the only termination
//! signal: every loop checks it rather than returning from the middle.

use crate::search::resolver::host_matches;
use crate::search::{
    CredentialPool, ExecutorResult, QueryExecutor, RawItem, SearchOutcome, SearchRequest, Termination,
};
use std::time::Duration;
use tokio::sync::mpsc;

/// Maximum page size accepted by the search API
pub const PAGE_SIZE: usize = 10;

/// Per-session search parameters
#[derive(Debug, Clone)]
pub struct TrackerOptions {
    /// Result budget: stop once this many items were collected
    pub results: usize,
    /// Country code passed as `gl`
    pub country: String,
    /// Courtesy pause between successful pages
    pub page_delay: Duration,
}

impl Default for TrackerOptions {
    fn default() -> Self {
        Self {
            results: 50,
            country: "us".to_string(),
            page_delay: Duration::from_secs(1),
        }
    }
}

/// Why a single credential attempt did not produce a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptFailure {
    QuotaExceeded,
    Transient(String),
    Empty,
}

/// Progress notifications, emitted as the search runs.
///
/// This is UI-agnostic: the CLI narrates them, tests can collect them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchEvent {
    /// A page is about to be requested
    PageStarted { start: usize, num: usize },
    /// One credential failed for the current page
    AttemptFailed {
        start: usize,
        key: String,
        failure: AttemptFailure,
    },
    /// A page was served and its items collected
    PageCollected { start: usize, count: usize },
    /// The target domain was found
    Matched { position: usize, link: String },
    /// Every credential failed for one page
    CredentialsExhausted { start: usize },
}

/// Resolves the position of a domain for a keyword.
pub struct RankTracker<'a, E: QueryExecutor + ?Sized> {
    executor: &'a E,
    pool: &'a mut CredentialPool,
    options: TrackerOptions,
    events: Option<mpsc::UnboundedSender<SearchEvent>>,
}

impl<'a, E: QueryExecutor + ?Sized> RankTracker<'a, E> {
    pub fn new(executor: &'a E, pool: &'a mut CredentialPool, options: TrackerOptions) -> Self {
        Self {
            executor,
            pool,
            options,
            events: None,
        }
    }

    /// Send progress events to `tx`. The channel closes when the tracker is dropped.
    pub fn with_events(mut self, tx: mpsc::UnboundedSender<SearchEvent>) -> Self {
        self.events = Some(tx);
        self
    }

    /// Search `keyword` until `target_domain` is found or the search ends.
    ///
    /// The returned outcome is always sealed.
    pub async fn run(&mut self, keyword: &str, target_domain: &str) -> SearchOutcome {
        let budget = self.options.results;
        let mut outcome = SearchOutcome::new();
        let mut offsets = page_offsets(budget);
        let mut first_page = true;

        tracing::info!(
            keyword = %keyword,
            domain = %target_domain,
            country = %self.options.country,
            results = budget,
            credentials = self.pool.len(),
            "starting rank search"
        );

        while !outcome.is_sealed() {
            let Some(start) = offsets.next() else {
                outcome.seal(Termination::PagesExhausted);
                break;
            };

            if !first_page && !self.options.page_delay.is_zero() {
                tokio::time::sleep(self.options.page_delay).await;
            }
            first_page = false;

            let request = SearchRequest {
                query: keyword.to_string(),
                start,
                num: PAGE_SIZE.min(budget - outcome.len()),
                country: self.options.country.clone(),
            };
            self.emit(SearchEvent::PageStarted {
                start,
                num: request.num,
            });

            match self.fetch_page(&request).await {
                Some(items) => {
                    let collected = self.collect(&mut outcome, items, target_domain);
                    if !outcome.is_sealed() {
                        self.emit(SearchEvent::PageCollected {
                            start,
                            count: collected,
                        });
                        if outcome.len() >= budget {
                            outcome.seal(Termination::BudgetReached);
                        }
                    }
                }
                None => {
                    tracing::warn!(start, "all credentials failed for page");
                    self.emit(SearchEvent::CredentialsExhausted { start });
                    outcome.seal(Termination::CredentialsExhausted);
                }
            }
        }

        tracing::info!(
            termination = ?outcome.termination(),
            collected = outcome.len(),
            position = ?outcome.matched_position(),
            "rank search finished"
        );

        outcome
    }

    /// Try each credential once for this page. `None` means all of them failed.
    async fn fetch_page(&mut self, request: &SearchRequest) -> Option<Vec<RawItem>> {
        for attempt in 1..=self.pool.len() {
            let credential = self.pool.next().clone();
            let failure = match self.executor.execute(request, &credential).await {
                ExecutorResult::Success(items) => {
                    tracing::debug!(
                        start = request.start,
                        attempt,
                        count = items.len(),
                        "page served"
                    );
                    return Some(items);
                }
                ExecutorResult::QuotaExceeded => {
                    tracing::warn!(key = %credential.display_key(), start = request.start, "quota exceeded");
                    AttemptFailure::QuotaExceeded
                }
                ExecutorResult::TransientError(detail) => {
                    tracing::warn!(
                        key = %credential.display_key(),
                        start = request.start,
                        error = %detail,
                        "search request failed"
                    );
                    AttemptFailure::Transient(detail)
                }
                ExecutorResult::Empty => {
                    tracing::warn!(key = %credential.display_key(), start = request.start, "no items in response");
                    AttemptFailure::Empty
                }
            };

            self.emit(SearchEvent::AttemptFailed {
                start: request.start,
                key: credential.display_key(),
                failure,
            });
        }

        None
    }

    /// Append items to the outcome, sealing at the first match.
    ///
    /// Returns how many items were collected from this page.
    fn collect(&self, outcome: &mut SearchOutcome, items: Vec<RawItem>, target_domain: &str) -> usize {
        let mut collected = 0;
        for raw in items {
            if outcome.is_sealed() {
                break;
            }
            let Some(item) = outcome.push(raw) else {
                break;
            };
            collected += 1;

            if host_matches(&item.link, target_domain) {
                let event = SearchEvent::Matched {
                    position: item.position,
                    link: item.link.clone(),
                };
                outcome.seal_matched();
                tracing::info!(position = ?outcome.matched_position(), "target domain found");
                self.emit(event);
            }
        }
        collected
    }

    fn emit(&self, event: SearchEvent) {
        if let Some(tx) = &self.events {
            let _ = tx.send(event);
        }
    }
}

/// Page start offsets: 1, 11, 21, ... up to the result budget.
pub fn page_offsets(results: usize) -> impl Iterator<Item = usize> {
    (1..=results).step_by(PAGE_SIZE)
}
