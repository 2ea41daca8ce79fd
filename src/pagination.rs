use std::sync::Arc;

use tokio::sync::Mutex;

use crate::book::Book;
use crate::catalog::CatalogClient;
use crate::error::FetchError;

/// Catalog page size. Page-numbered requests return up to this many books.
pub const PAGE_SIZE: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchNext {
    /// A page was fetched and its books appended.
    Fetched { appended: usize },
    /// No request was issued: a fetch is already in flight, or the catalog
    /// reported no further pages.
    Skipped,
}

#[derive(Debug)]
struct PageState {
    items: Vec<Book>,
    is_loading: bool,
    has_more_pages: bool,
    next_url: Option<String>,
    current_page: u32,
}

impl PageState {
    fn reset(&mut self) {
        // `is_loading` is deliberately left alone: an in-flight fetch keeps
        // its single-flight claim across a reset.
        self.items.clear();
        self.current_page = 1;
        self.next_url = None;
        self.has_more_pages = true;
    }
}

impl Default for PageState {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            is_loading: false,
            has_more_pages: true,
            next_url: None,
            current_page: 1,
        }
    }
}

/// Cursor over the main book list. Handles are cheap clones sharing one
/// state; all mutation happens under the state lock, so completions apply
/// in arrival order.
#[derive(Debug, Clone)]
pub struct PaginationController {
    client: CatalogClient,
    state: Arc<Mutex<PageState>>,
}

impl PaginationController {
    pub fn new(client: CatalogClient) -> Self {
        Self {
            client,
            state: Arc::new(Mutex::new(PageState::default())),
        }
    }

    /// Fetch the next page and append its books. Skips without a request
    /// while a fetch is in flight or after the catalog reports exhaustion.
    /// On failure the error is logged and returned, and state is left as if
    /// the call had not started (the loading flag always clears).
    pub async fn fetch_next(&self) -> Result<FetchNext, FetchError> {
        let request_url = {
            let mut state = self.state.lock().await;
            if state.is_loading || !state.has_more_pages {
                return Ok(FetchNext::Skipped);
            }
            state.is_loading = true;
            match &state.next_url {
                Some(next) => next.clone(),
                None => self.client.page_url(state.current_page).to_string(),
            }
        };

        let result = self.client.fetch_page(&request_url).await;

        let mut state = self.state.lock().await;
        state.is_loading = false;
        match result {
            Ok(page) => {
                let appended = page.books.len();
                state.items.extend(page.books);
                state.has_more_pages = page.next_url.is_some();
                state.next_url = page.next_url;
                state.current_page += 1;
                tracing::debug!(
                    appended,
                    total = state.items.len(),
                    has_more = state.has_more_pages,
                    "book page fetched"
                );
                Ok(FetchNext::Fetched { appended })
            }
            Err(err) => {
                tracing::warn!(url = %request_url, error = %err, "book page fetch failed");
                Err(err)
            }
        }
    }

    /// Reset the cursor and fetch page one, replacing accumulated items.
    /// Does not cancel an in-flight `fetch_next`; a racing completion still
    /// applies when it arrives (last writer wins).
    pub async fn refresh(&self) -> Result<FetchNext, FetchError> {
        self.state.lock().await.reset();
        self.fetch_next().await
    }

    pub async fn items(&self) -> Vec<Book> {
        self.state.lock().await.items.clone()
    }

    pub async fn is_loading(&self) -> bool {
        self.state.lock().await.is_loading
    }

    pub async fn has_more_pages(&self) -> bool {
        self.state.lock().await.has_more_pages
    }

    pub async fn current_page(&self) -> u32 {
        self.state.lock().await.current_page
    }
}
