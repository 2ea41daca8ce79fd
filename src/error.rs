use thiserror::Error;

/// Failures raised by catalog fetches. Per-record decode failures are not
/// represented here: they are logged and dropped without failing the page.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("catalog request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("invalid catalog response: {0}")]
    InvalidResponse(String),
}

/// Failures raised by the local library store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("library store io: {0}")]
    Io(#[from] std::io::Error),

    #[error("library record encoding: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Shelf operations touch both the store and the catalog.
#[derive(Debug, Error)]
pub enum ShelfError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
