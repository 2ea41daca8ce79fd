use std::sync::Arc;

use tokio::sync::Mutex;

use crate::book::Book;
use crate::catalog::CatalogClient;
use crate::error::FetchError;

/// Fetches a set of books by id in one round trip and holds the latest
/// result set. Each call replaces the held set entirely. Logically distinct
/// consumers (favorites, tracking) must each construct their own instance
/// so result sets never mix.
#[derive(Debug, Clone)]
pub struct BatchFetchController {
    client: CatalogClient,
    books: Arc<Mutex<Vec<Book>>>,
}

impl BatchFetchController {
    pub fn new(client: CatalogClient) -> Self {
        Self {
            client,
            books: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// One GET with the ids joined as a comma-separated filter. The id set
    /// is issued as given; callers decide whether an empty set is worth a
    /// request, since the server's behavior for an empty filter is
    /// undefined. On failure the held set is left untouched.
    pub async fn fetch_by_ids(&self, ids: &[u64]) -> Result<Vec<Book>, FetchError> {
        let url = self.client.ids_url(ids);

        match self.client.fetch_page(url.as_str()).await {
            Ok(page) => {
                let mut books = self.books.lock().await;
                *books = page.books;
                Ok(books.clone())
            }
            Err(err) => {
                tracing::warn!(url = %url, error = %err, "batch book fetch failed");
                Err(err)
            }
        }
    }

    /// Drop the held result set without a request. Used when the id set a
    /// consumer would fetch is empty.
    pub async fn clear(&self) {
        self.books.lock().await.clear();
    }

    pub async fn books(&self) -> Vec<Book> {
        self.books.lock().await.clone()
    }
}
