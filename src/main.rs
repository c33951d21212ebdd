mod cli;
mod config;
mod corpus;
mod error;
mod export;
mod extract;
mod identity;
mod index;
mod parser;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::commands::extract::ExtractOptions;
use crate::cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing - only show warnings by default, use RUST_LOG=info for more detail
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init { force } => {
            cli::commands::init::run(force).await?;
        }
        Commands::Extract {
            path,
            chapter,
            chapter_number,
            book,
            concurrency,
            dry_run,
            corpus,
        } => {
            let options = ExtractOptions {
                path,
                chapter,
                chapter_number,
                book,
                concurrency,
                dry_run,
            };
            cli::commands::extract::run(options, corpus).await?;
        }
        Commands::Add {
            book,
            chapter,
            from_file,
            subject,
            corpus,
        } => {
            cli::commands::add::run(book, chapter, from_file, subject, corpus).await?;
        }
        Commands::Locate {
            question_id,
            book,
            chapter,
            corpus,
        } => {
            cli::commands::locate::run(question_id, book, chapter, corpus).await?;
        }
        Commands::Show {
            book,
            chapter,
            subject,
            corpus,
        } => {
            cli::commands::show::run(book, chapter, subject, corpus).await?;
        }
        Commands::Stats { non_mcq, corpus } => {
            cli::commands::stats::run(non_mcq, corpus).await?;
        }
        Commands::Index {
            export,
            query,
            rebuild,
            corpus,
        } => {
            cli::commands::index::run(export, query, rebuild, corpus).await?;
        }
    }

    Ok(())
}
