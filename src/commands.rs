use std::sync::Arc;

use anyhow::Context as _;

use crate::book::Book;
use crate::catalog::CatalogClient;
use crate::cli::{FavoriteArgs, ListArgs, ReadArgs, SearchArgs, ShelfArgs, TrackingArgs};
use crate::library::{Library, LocalFsLibraryStore, TrackingStatus};
use crate::pagination::{FetchNext, PaginationController};
use crate::progress::{ReadingSession, SessionState, ViewerEvent};
use crate::search::{SearchController, SearchOutcome};
use crate::shelf::ShelfController;

fn open_library(dir: &str) -> Library {
    Library::new(Arc::new(LocalFsLibraryStore::new(dir)))
}

fn print_books(books: &[Book]) {
    for book in books {
        let authors = book.author_names().join(", ");
        let authors = if authors.is_empty() {
            "unknown author".to_owned()
        } else {
            authors
        };
        println!(
            "{:>6}  {} by {} ({} downloads)",
            book.id, book.title, authors, book.download_count
        );
    }
}

pub async fn books_list(args: ListArgs) -> anyhow::Result<()> {
    let client = CatalogClient::new(&args.base_url).context("build catalog client")?;
    let controller = PaginationController::new(client);

    for _ in 0..args.pages {
        match controller.fetch_next().await.context("fetch book page")? {
            FetchNext::Fetched { .. } => {}
            FetchNext::Skipped => break,
        }
    }

    let items = controller.items().await;
    print_books(&items);
    println!(
        "{} books; more pages: {}",
        items.len(),
        controller.has_more_pages().await
    );
    Ok(())
}

pub async fn books_search(args: SearchArgs) -> anyhow::Result<()> {
    let client = CatalogClient::new(&args.base_url).context("build catalog client")?;
    let controller = SearchController::new(client);

    match controller
        .search(&args.keyword)
        .await
        .context("search catalog")?
    {
        SearchOutcome::Completed { found } => {
            print_books(&controller.results().await);
            println!("{found} results for {:?}", args.keyword.trim());
        }
        SearchOutcome::Skipped => println!("empty keyword; nothing searched"),
    }
    Ok(())
}

pub async fn shelf_show(args: ShelfArgs) -> anyhow::Result<()> {
    let client = CatalogClient::new(&args.base_url).context("build catalog client")?;
    let library = open_library(&args.library);
    let shelf = ShelfController::new(client, library.clone());

    let favorites = shelf
        .refresh_favorites()
        .await
        .context("fetch favorite books")?;
    let tracking = shelf
        .refresh_tracking()
        .await
        .context("fetch tracked books")?;

    println!("Favorites ({}):", favorites.len());
    print_books(&favorites);

    println!("Tracking ({}):", tracking.len());
    let records = library.tracking_records().await.context("read tracking records")?;
    for book in &tracking {
        let progress = records
            .iter()
            .find(|record| record.book_id == book.id)
            .map(|record| record.progress)
            .unwrap_or(0.0);
        println!("{:>6}  {} at {progress:.1}%", book.id, book.title);
    }
    Ok(())
}

pub async fn favorite_add(args: FavoriteArgs) -> anyhow::Result<()> {
    let library = open_library(&args.library);
    let added = library
        .add_favorite(args.book_id)
        .await
        .context("add favorite")?;
    if added {
        println!("book {} added to favorites", args.book_id);
    } else {
        println!("book {} is already a favorite", args.book_id);
    }
    Ok(())
}

pub async fn favorite_remove(args: FavoriteArgs) -> anyhow::Result<()> {
    let library = open_library(&args.library);
    let removed = library
        .remove_favorite(args.book_id)
        .await
        .context("remove favorite")?;
    if removed {
        println!("book {} removed from favorites", args.book_id);
    } else {
        println!("book {} was not a favorite", args.book_id);
    }
    Ok(())
}

pub async fn tracking_start(args: TrackingArgs) -> anyhow::Result<()> {
    let library = open_library(&args.library);
    let record = library
        .start_tracking(args.book_id)
        .await
        .context("start tracking")?;
    println!(
        "tracking book {} from {:.1}%",
        record.book_id, record.progress
    );
    Ok(())
}

/// Replay viewer events from a JSONL file through a reading session. Stands
/// in for the embedded viewer: one event per line, persisted once at close.
pub async fn read(args: ReadArgs) -> anyhow::Result<()> {
    let client = CatalogClient::new(&args.base_url).context("build catalog client")?;
    let library = open_library(&args.library);

    let page = client
        .fetch_page(client.ids_url(&[args.book_id]).as_str())
        .await
        .context("fetch book metadata")?;
    let book = page
        .books
        .first()
        .with_context(|| format!("book {} not found in catalog", args.book_id))?;
    println!("{} ({})", book.title, book.reading_url());

    let mut session = ReadingSession::open(library, args.book_id)
        .await
        .context("open reading session")?;
    match session.state() {
        SessionState::Tracking => println!("resuming at {:.1}%", session.progress()),
        SessionState::Idle => println!("book {} is not being tracked", args.book_id),
    }

    let events = std::fs::read_to_string(&args.events)
        .with_context(|| format!("read viewer events: {}", args.events))?;
    for (index, line) in events.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let event: ViewerEvent = serde_json::from_str(line)
            .with_context(|| format!("parse viewer event at line {}", index + 1))?;
        session.handle_event(event);
    }

    match session.close().await.context("save reading progress")? {
        Some(record) => {
            let status = match record.status {
                TrackingStatus::Reading => "reading",
                TrackingStatus::Finished => "finished",
            };
            println!("progress saved: {:.1}% ({status})", record.progress);
        }
        None => println!("no tracking record; progress not saved"),
    }
    Ok(())
}
