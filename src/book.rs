use serde::Deserialize;

/// One catalog book, reconstructed whole from a single catalog JSON object.
/// Every non-`Option` field is required: a record missing any of them fails
/// to decode and is dropped by the caller, never defaulted.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Book {
    pub id: u64,
    pub title: String,
    pub authors: Vec<Author>,
    pub subjects: Vec<String>,
    pub bookshelves: Vec<String>,
    pub languages: Vec<String>,
    pub copyright: bool,
    pub media_type: String,
    pub formats: Formats,
    pub download_count: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Author {
    pub name: String,
    pub birth_year: Option<i32>,
    pub death_year: Option<i32>,
}

/// Known download formats. The catalog keys this map by MIME type; a key
/// may be absent or null, both of which decode to `None`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Formats {
    #[serde(rename = "text/html")]
    pub text_html: Option<String>,
    #[serde(rename = "application/epub+zip")]
    pub epub_zip: Option<String>,
    #[serde(rename = "application/x-mobipocket-ebook")]
    pub mobipocket: Option<String>,
    #[serde(rename = "application/rdf+xml")]
    pub rdf_xml: Option<String>,
    #[serde(rename = "image/jpeg")]
    pub image_jpeg: Option<String>,
    #[serde(rename = "text/plain; charset=us-ascii")]
    pub plain_text: Option<String>,
    #[serde(rename = "application/octet-stream")]
    pub octet_stream: Option<String>,
}

impl Book {
    /// URL of the cached HTML rendition the document viewer loads for a
    /// reading session. The cache serves an images build per book id.
    pub fn reading_url(&self) -> String {
        format!(
            "https://www.gutenberg.org/cache/epub/{id}/pg{id}-images.html",
            id = self.id
        )
    }

    pub fn author_names(&self) -> Vec<&str> {
        self.authors.iter().map(|author| author.name.as_str()).collect()
    }
}
