use std::sync::Arc;

use tokio::sync::Mutex;

use crate::book::Book;
use crate::catalog::CatalogClient;
use crate::error::FetchError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    /// The search ran and replaced the held results.
    Completed { found: usize },
    /// No request was issued: the keyword was empty after trimming, or a
    /// search is already in flight. Previous results are untouched.
    Skipped,
}

#[derive(Debug, Default)]
struct SearchState {
    results: Vec<Book>,
    is_loading: bool,
}

/// Single-shot keyword search against the catalog. No debounce here: the
/// caller decides when to submit.
#[derive(Debug, Clone)]
pub struct SearchController {
    client: CatalogClient,
    state: Arc<Mutex<SearchState>>,
}

impl SearchController {
    pub fn new(client: CatalogClient) -> Self {
        Self {
            client,
            state: Arc::new(Mutex::new(SearchState::default())),
        }
    }

    /// Run one search. The keyword is trimmed and percent-encoded; a
    /// trimmed-empty keyword skips without touching previous results. On
    /// success the result list is replaced wholesale; the loading flag
    /// clears on every completion path.
    pub async fn search(&self, keyword: &str) -> Result<SearchOutcome, FetchError> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            tracing::debug!("empty search keyword; skipping request");
            return Ok(SearchOutcome::Skipped);
        }

        let url = {
            let mut state = self.state.lock().await;
            if state.is_loading {
                return Ok(SearchOutcome::Skipped);
            }
            state.is_loading = true;
            self.client.search_url(keyword)
        };

        let result = self.client.fetch_page(url.as_str()).await;

        let mut state = self.state.lock().await;
        state.is_loading = false;
        match result {
            Ok(page) => {
                state.results = page.books;
                tracing::debug!(keyword, found = state.results.len(), "search completed");
                Ok(SearchOutcome::Completed {
                    found: state.results.len(),
                })
            }
            Err(err) => {
                tracing::warn!(keyword, error = %err, "search fetch failed");
                Err(err)
            }
        }
    }

    pub async fn results(&self) -> Vec<Book> {
        self.state.lock().await.results.clone()
    }

    pub async fn is_loading(&self) -> bool {
        self.state.lock().await.is_loading
    }
}
