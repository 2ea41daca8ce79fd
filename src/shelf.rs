use std::sync::Arc;

use tokio::sync::Mutex;

use crate::batch::BatchFetchController;
use crate::book::Book;
use crate::catalog::CatalogClient;
use crate::error::ShelfError;
use crate::library::Library;

#[derive(Debug, Default)]
struct ShelfFlags {
    has_fetched_favorites: bool,
    has_fetched_tracking: bool,
}

/// Assembles the shelf: reads favorite/tracking ids from the library and
/// batch-fetches their books through two independent controllers, so the
/// two result sets never mix. The refreshes are independent and may
/// complete in either order.
#[derive(Clone)]
pub struct ShelfController {
    library: Library,
    favorites: BatchFetchController,
    tracking: BatchFetchController,
    flags: Arc<Mutex<ShelfFlags>>,
}

impl ShelfController {
    pub fn new(client: CatalogClient, library: Library) -> Self {
        Self {
            library,
            favorites: BatchFetchController::new(client.clone()),
            tracking: BatchFetchController::new(client),
            flags: Arc::new(Mutex::new(ShelfFlags::default())),
        }
    }

    /// Re-fetch the favorite books. An empty favorite set skips the catalog
    /// request entirely (its behavior for an empty id filter is undefined)
    /// and clears the held books.
    pub async fn refresh_favorites(&self) -> Result<Vec<Book>, ShelfError> {
        let ids = self.library.favorite_ids().await?;
        let books = if ids.is_empty() {
            self.favorites.clear().await;
            Vec::new()
        } else {
            self.favorites.fetch_by_ids(&ids).await?
        };
        self.flags.lock().await.has_fetched_favorites = true;
        Ok(books)
    }

    /// Re-fetch the tracked books. Same empty-set guard as favorites.
    pub async fn refresh_tracking(&self) -> Result<Vec<Book>, ShelfError> {
        let ids = self.library.tracking_ids().await?;
        let books = if ids.is_empty() {
            self.tracking.clear().await;
            Vec::new()
        } else {
            self.tracking.fetch_by_ids(&ids).await?
        };
        self.flags.lock().await.has_fetched_tracking = true;
        Ok(books)
    }

    pub async fn favorite_books(&self) -> Vec<Book> {
        self.favorites.books().await
    }

    pub async fn tracking_books(&self) -> Vec<Book> {
        self.tracking.books().await
    }

    pub async fn has_fetched_favorites(&self) -> bool {
        self.flags.lock().await.has_fetched_favorites
    }

    pub async fn has_fetched_tracking(&self) -> bool {
        self.flags.lock().await.has_fetched_tracking
    }

    pub fn library(&self) -> &Library {
        &self.library
    }
}
