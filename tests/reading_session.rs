use std::sync::Arc;

use async_trait::async_trait;
use gutenshelf::library::{Library, LocalFsLibraryStore, TrackingStatus};
use gutenshelf::progress::{DocumentViewer, ReadingSession, SessionState, ViewerEvent};

fn library_in(dir: &tempfile::TempDir) -> Library {
    Library::new(Arc::new(LocalFsLibraryStore::new(dir.path())))
}

fn scroll(offset: f64, content: f64, viewport: f64) -> ViewerEvent {
    ViewerEvent::Scroll {
        scroll_offset: offset,
        content_height: content,
        viewport_height: viewport,
    }
}

#[derive(Default)]
struct ScriptedViewer {
    calls: Vec<String>,
}

#[async_trait]
impl DocumentViewer for ScriptedViewer {
    async fn load(&mut self, url: &str) -> anyhow::Result<()> {
        self.calls.push(format!("load {url}"));
        Ok(())
    }

    async fn scroll_to_fraction(&mut self, percent: f64) -> anyhow::Result<()> {
        self.calls.push(format!("scroll {percent}"));
        Ok(())
    }
}

#[tokio::test]
async fn idle_session_ignores_events_and_persists_nothing() {
    let dir = tempfile::TempDir::new().unwrap();
    let library = library_in(&dir);

    let mut session = ReadingSession::open(library.clone(), 84).await.unwrap();
    assert_eq!(session.state(), SessionState::Idle);

    session.handle_event(scroll(400.0, 1000.0, 200.0));
    assert_eq!(session.progress(), 0.0);

    assert!(session.close().await.unwrap().is_none());
    assert!(library.tracking_for_book(84).await.unwrap().is_none());
}

#[tokio::test]
async fn tracked_session_accumulates_and_persists_once_on_close() {
    let dir = tempfile::TempDir::new().unwrap();
    let library = library_in(&dir);
    library.start_tracking(84).await.unwrap();

    let mut session = ReadingSession::open(library.clone(), 84).await.unwrap();
    assert_eq!(session.state(), SessionState::Tracking);

    session.handle_event(scroll(100.0, 1000.0, 200.0));
    session.handle_event(scroll(400.0, 1000.0, 200.0));
    // In-memory only until close.
    assert_eq!(library.tracking_for_book(84).await.unwrap().unwrap().progress, 0.0);

    let record = session.close().await.unwrap().unwrap();
    assert_eq!(record.progress, 50.0);
    assert_eq!(record.status, TrackingStatus::Reading);
    assert_eq!(library.tracking_for_book(84).await.unwrap().unwrap().progress, 50.0);
}

#[tokio::test]
async fn session_resumes_saved_progress_and_positions_viewer() {
    let dir = tempfile::TempDir::new().unwrap();
    let library = library_in(&dir);
    library.start_tracking(84).await.unwrap();
    library.save_progress(84, 62.5).await.unwrap();

    let session = ReadingSession::open(library, 84).await.unwrap();
    assert_eq!(session.progress(), 62.5);

    let mut viewer = ScriptedViewer::default();
    session
        .attach_viewer(&mut viewer, "https://www.gutenberg.org/cache/epub/84/pg84-images.html")
        .await
        .unwrap();
    assert_eq!(
        viewer.calls,
        vec![
            "load https://www.gutenberg.org/cache/epub/84/pg84-images.html".to_owned(),
            "scroll 62.5".to_owned(),
        ]
    );
}

#[tokio::test]
async fn idle_session_does_not_position_viewer() {
    let dir = tempfile::TempDir::new().unwrap();
    let library = library_in(&dir);

    let session = ReadingSession::open(library, 84).await.unwrap();
    let mut viewer = ScriptedViewer::default();
    session
        .attach_viewer(&mut viewer, "https://www.gutenberg.org/cache/epub/84/pg84-images.html")
        .await
        .unwrap();

    assert_eq!(viewer.calls.len(), 1);
    assert!(viewer.calls[0].starts_with("load "));
}

#[tokio::test]
async fn degenerate_scroll_range_is_discarded() {
    let dir = tempfile::TempDir::new().unwrap();
    let library = library_in(&dir);
    library.start_tracking(84).await.unwrap();

    let mut session = ReadingSession::open(library, 84).await.unwrap();
    session.handle_event(scroll(400.0, 1000.0, 200.0));
    assert_eq!(session.progress(), 50.0);

    // Content exactly fits the viewport: scrollable range is zero.
    session.handle_event(scroll(10.0, 200.0, 200.0));
    assert_eq!(session.progress(), 50.0);

    session.handle_event(scroll(10.0, 100.0, 200.0));
    assert_eq!(session.progress(), 50.0);
}

#[tokio::test]
async fn diagnostics_do_not_touch_progress() {
    let dir = tempfile::TempDir::new().unwrap();
    let library = library_in(&dir);
    library.start_tracking(84).await.unwrap();

    let mut session = ReadingSession::open(library, 84).await.unwrap();
    session.handle_event(scroll(400.0, 1000.0, 200.0));
    session.handle_event(ViewerEvent::Debug {
        message: "progress script initialized".to_owned(),
    });
    session.handle_event(ViewerEvent::Error {
        message: "total height is zero or negative".to_owned(),
    });

    assert_eq!(session.progress(), 50.0);
}

#[tokio::test]
async fn start_tracking_mid_session_is_idempotent() {
    let dir = tempfile::TempDir::new().unwrap();
    let library = library_in(&dir);

    let mut session = ReadingSession::open(library.clone(), 84).await.unwrap();
    assert_eq!(session.state(), SessionState::Idle);

    session.start_tracking().await.unwrap();
    session.start_tracking().await.unwrap();
    assert_eq!(session.state(), SessionState::Tracking);
    assert_eq!(library.tracking_records().await.unwrap().len(), 1);

    session.handle_event(scroll(800.0, 1000.0, 200.0));
    let record = session.close().await.unwrap().unwrap();
    assert_eq!(record.progress, 100.0);
    assert_eq!(record.status, TrackingStatus::Finished);
}

#[tokio::test]
async fn viewer_events_round_trip_through_jsonl() {
    let line = r#"{"type":"scroll","scroll_offset":400.0,"content_height":1000.0,"viewport_height":200.0}"#;
    let event: ViewerEvent = serde_json::from_str(line).unwrap();
    assert_eq!(event, scroll(400.0, 1000.0, 200.0));

    let debug: ViewerEvent =
        serde_json::from_str(r#"{"type":"debug","message":"page loaded"}"#).unwrap();
    assert_eq!(
        debug,
        ViewerEvent::Debug {
            message: "page loaded".to_owned()
        }
    );
}
