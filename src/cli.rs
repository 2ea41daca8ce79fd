use clap::{Args, Parser, Subcommand};

pub const DEFAULT_CATALOG_URL: &str = "https://gutendex.com";
pub const DEFAULT_LIBRARY_DIR: &str = ".gutenshelf";

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    Books {
        #[command(subcommand)]
        command: BooksCommand,
    },
    Shelf {
        #[command(subcommand)]
        command: ShelfCommand,
    },
    Favorite {
        #[command(subcommand)]
        command: FavoriteCommand,
    },
    Tracking {
        #[command(subcommand)]
        command: TrackingCommand,
    },
    Read(ReadArgs),
}

#[derive(Debug, Subcommand)]
pub enum BooksCommand {
    List(ListArgs),
    Search(SearchArgs),
}

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Base URL of the book catalog API.
    #[arg(long, default_value = DEFAULT_CATALOG_URL)]
    pub base_url: String,

    /// Number of catalog pages to fetch.
    #[arg(long, default_value_t = 1)]
    pub pages: u32,
}

#[derive(Debug, Args)]
pub struct SearchArgs {
    /// Base URL of the book catalog API.
    #[arg(long, default_value = DEFAULT_CATALOG_URL)]
    pub base_url: String,

    /// Search keyword (matched against titles and author names).
    #[arg(long)]
    pub keyword: String,
}

#[derive(Debug, Subcommand)]
pub enum ShelfCommand {
    Show(ShelfArgs),
}

#[derive(Debug, Args)]
pub struct ShelfArgs {
    /// Base URL of the book catalog API.
    #[arg(long, default_value = DEFAULT_CATALOG_URL)]
    pub base_url: String,

    /// Library store directory.
    #[arg(long, default_value = DEFAULT_LIBRARY_DIR)]
    pub library: String,
}

#[derive(Debug, Subcommand)]
pub enum FavoriteCommand {
    Add(FavoriteArgs),
    Remove(FavoriteArgs),
}

#[derive(Debug, Args)]
pub struct FavoriteArgs {
    /// Library store directory.
    #[arg(long, default_value = DEFAULT_LIBRARY_DIR)]
    pub library: String,

    /// Catalog id of the book.
    #[arg(long)]
    pub book_id: u64,
}

#[derive(Debug, Subcommand)]
pub enum TrackingCommand {
    Start(TrackingArgs),
}

#[derive(Debug, Args)]
pub struct TrackingArgs {
    /// Library store directory.
    #[arg(long, default_value = DEFAULT_LIBRARY_DIR)]
    pub library: String,

    /// Catalog id of the book.
    #[arg(long)]
    pub book_id: u64,
}

#[derive(Debug, Args)]
pub struct ReadArgs {
    /// Base URL of the book catalog API.
    #[arg(long, default_value = DEFAULT_CATALOG_URL)]
    pub base_url: String,

    /// Library store directory.
    #[arg(long, default_value = DEFAULT_LIBRARY_DIR)]
    pub library: String,

    /// Catalog id of the book to read.
    #[arg(long)]
    pub book_id: u64,

    /// Path to a JSONL file of viewer events to replay through the session.
    #[arg(long)]
    pub events: String,
}
