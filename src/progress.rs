use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::library::{Library, TrackingRecord};

/// Embedded document renderer, seen from the host side. Implementations
/// load a URL and honor programmatic scrolls; events flow back to the host
/// as [`ViewerEvent`]s.
#[async_trait]
pub trait DocumentViewer: Send {
    async fn load(&mut self, url: &str) -> anyhow::Result<()>;
    async fn scroll_to_fraction(&mut self, percent: f64) -> anyhow::Result<()>;
}

/// Messages the viewer posts back to the host while a document is open.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ViewerEvent {
    Scroll {
        scroll_offset: f64,
        content_height: f64,
        viewport_height: f64,
    },
    Debug {
        message: String,
    },
    Error {
        message: String,
    },
}

/// Scroll fraction as a percentage of the scrollable range, clamped to
/// `[0, 100]`. `None` when the scrollable range is not positive; such an
/// event is invalid and must be discarded.
fn scroll_fraction(scroll_offset: f64, content_height: f64, viewport_height: f64) -> Option<f64> {
    let scrollable = content_height - viewport_height;
    if scrollable <= 0.0 {
        return None;
    }
    Some(((scroll_offset / scrollable) * 100.0).clamp(0.0, 100.0))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// The book has no tracking record; all viewer events are ignored.
    Idle,
    /// Progress is accumulated in memory and persisted at close.
    Tracking,
}

/// One open reading session for one book, bridging viewer scroll events to
/// the persisted tracking record. Progress updates are in-memory only;
/// the record is written once, at [`close`](ReadingSession::close).
pub struct ReadingSession {
    library: Library,
    book_id: u64,
    state: SessionState,
    progress: f64,
}

impl ReadingSession {
    /// Open a session for a book. A book with a tracking record resumes at
    /// its saved progress; one without stays idle, since progress is only
    /// persisted for books explicitly marked as tracking.
    pub async fn open(library: Library, book_id: u64) -> Result<Self, StoreError> {
        let (state, progress) = match library.tracking_for_book(book_id).await? {
            Some(record) => (SessionState::Tracking, record.progress),
            None => (SessionState::Idle, 0.0),
        };
        tracing::debug!(book_id, ?state, progress, "reading session opened");
        Ok(Self {
            library,
            book_id,
            state,
            progress,
        })
    }

    /// Point the viewer at the document and, for a resumed session, scroll
    /// it to the saved position before any events are expected.
    pub async fn attach_viewer(
        &self,
        viewer: &mut dyn DocumentViewer,
        url: &str,
    ) -> anyhow::Result<()> {
        viewer.load(url).await?;
        if self.state == SessionState::Tracking {
            viewer.scroll_to_fraction(self.progress).await?;
        }
        Ok(())
    }

    /// Apply one viewer event. Everything is ignored while idle. A scroll
    /// event with a non-positive scrollable range is discarded and surfaced
    /// as a diagnostic, never applied to progress.
    pub fn handle_event(&mut self, event: ViewerEvent) {
        if self.state != SessionState::Tracking {
            return;
        }
        match event {
            ViewerEvent::Scroll {
                scroll_offset,
                content_height,
                viewport_height,
            } => match scroll_fraction(scroll_offset, content_height, viewport_height) {
                Some(percent) => self.progress = percent,
                None => {
                    tracing::warn!(
                        book_id = self.book_id,
                        content_height,
                        viewport_height,
                        "discarding scroll event with non-positive scrollable range"
                    );
                }
            },
            ViewerEvent::Debug { message } => {
                tracing::debug!(book_id = self.book_id, %message, "viewer debug");
            }
            ViewerEvent::Error { message } => {
                tracing::warn!(book_id = self.book_id, %message, "viewer error");
            }
        }
    }

    /// Start tracking this book: creates the record at progress zero and
    /// begins accepting scroll events. No-op when already tracking.
    pub async fn start_tracking(&mut self) -> Result<(), StoreError> {
        if self.state == SessionState::Tracking {
            return Ok(());
        }
        let record = self.library.start_tracking(self.book_id).await?;
        self.progress = record.progress;
        self.state = SessionState::Tracking;
        Ok(())
    }

    /// Close the session, writing the final progress to the tracking record
    /// in one batched persist. Returns the updated record, or `None` for an
    /// idle session. A store failure propagates: the progress must not be
    /// reported as saved when the write failed.
    pub async fn close(self) -> Result<Option<TrackingRecord>, StoreError> {
        if self.state != SessionState::Tracking {
            return Ok(None);
        }
        let record = self.library.save_progress(self.book_id, self.progress).await?;
        tracing::debug!(book_id = self.book_id, progress = self.progress, "reading progress saved");
        Ok(record)
    }

    pub fn book_id(&self) -> u64 {
        self.book_id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn progress(&self) -> f64 {
        self.progress
    }
}
