use std::time::Duration;

use anyhow::Context as _;
use serde::Deserialize;
use url::Url;

use crate::book::Book;
use crate::error::FetchError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(100);

/// One decoded catalog page: the books that survived per-record decoding
/// plus the server-provided cursor to the next page, if any.
#[derive(Debug, Clone)]
pub struct CatalogPage {
    pub books: Vec<Book>,
    pub next_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PageEnvelope {
    next: Option<String>,
    results: Vec<serde_json::Value>,
}

/// HTTP client for the remote book catalog. Issues single paged/filtered
/// GETs and decodes the page envelope; retry policy belongs to callers.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    http: reqwest::Client,
    books_url: Url,
}

impl CatalogClient {
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        let mut base = base_url.trim_end_matches('/').to_owned();
        base.push('/');
        let base = Url::parse(&base)
            .with_context(|| format!("parse catalog base url: {base_url}"))?;
        let books_url = base
            .join("books/")
            .with_context(|| format!("resolve books endpoint under: {base}"))?;

        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("build catalog http client")?;

        Ok(Self { http, books_url })
    }

    pub fn page_url(&self, page: u32) -> Url {
        let mut url = self.books_url.clone();
        url.query_pairs_mut().append_pair("page", &page.to_string());
        url
    }

    pub fn ids_url(&self, ids: &[u64]) -> Url {
        let csv = ids
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(",");
        let mut url = self.books_url.clone();
        url.query_pairs_mut().append_pair("ids", &csv);
        url
    }

    pub fn search_url(&self, keyword: &str) -> Url {
        let mut url = self.books_url.clone();
        url.query_pairs_mut().append_pair("search", keyword);
        url
    }

    /// Fetch and decode one catalog page. The response must be 2xx with a
    /// `{results: [...], next: ...}` body; anything else is
    /// `FetchError::InvalidResponse`. Elements of `results` are decoded
    /// independently: a record that fails to decode is logged and dropped,
    /// and never fails the page.
    pub async fn fetch_page(&self, url: &str) -> Result<CatalogPage, FetchError> {
        let response = self.http.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::InvalidResponse(format!(
                "server returned {status} for {url}"
            )));
        }

        let body = response.text().await?;
        let envelope: PageEnvelope = serde_json::from_str(&body)
            .map_err(|err| FetchError::InvalidResponse(format!("bad page envelope: {err}")))?;

        let mut books = Vec::with_capacity(envelope.results.len());
        for raw in envelope.results {
            let record_id = raw.get("id").and_then(serde_json::Value::as_u64);
            match serde_json::from_value::<Book>(raw) {
                Ok(book) => books.push(book),
                Err(err) => {
                    tracing::warn!(record_id, error = %err, "dropping undecodable catalog record");
                }
            }
        }

        Ok(CatalogPage {
            books,
            next_url: envelope.next,
        })
    }
}
