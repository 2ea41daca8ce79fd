use std::process::ExitCode;

use anyhow::Context as _;
use clap::Parser as _;

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(err) = try_main().await {
        eprintln!("{err:#}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

async fn try_main() -> anyhow::Result<()> {
    gutenshelf::logging::init().context("init logging")?;

    let cli = gutenshelf::cli::Cli::parse();
    tracing::debug!(?cli, "parsed cli");

    match cli.command {
        gutenshelf::cli::Command::Books {
            command: gutenshelf::cli::BooksCommand::List(args),
        } => {
            gutenshelf::commands::books_list(args).await.context("books list")?;
        }
        gutenshelf::cli::Command::Books {
            command: gutenshelf::cli::BooksCommand::Search(args),
        } => {
            gutenshelf::commands::books_search(args)
                .await
                .context("books search")?;
        }
        gutenshelf::cli::Command::Shelf {
            command: gutenshelf::cli::ShelfCommand::Show(args),
        } => {
            gutenshelf::commands::shelf_show(args).await.context("shelf show")?;
        }
        gutenshelf::cli::Command::Favorite {
            command: gutenshelf::cli::FavoriteCommand::Add(args),
        } => {
            gutenshelf::commands::favorite_add(args)
                .await
                .context("favorite add")?;
        }
        gutenshelf::cli::Command::Favorite {
            command: gutenshelf::cli::FavoriteCommand::Remove(args),
        } => {
            gutenshelf::commands::favorite_remove(args)
                .await
                .context("favorite remove")?;
        }
        gutenshelf::cli::Command::Tracking {
            command: gutenshelf::cli::TrackingCommand::Start(args),
        } => {
            gutenshelf::commands::tracking_start(args)
                .await
                .context("tracking start")?;
        }
        gutenshelf::cli::Command::Read(args) => {
            gutenshelf::commands::read(args).await.context("read")?;
        }
    }

    Ok(())
}
