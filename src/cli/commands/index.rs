use anyhow::{Context, Result};
use console::{Emoji, style};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Duration;

use crate::cli::CorpusArgs;
use crate::index::IndexService;

use super::{open_store, truncate};

static CHART: Emoji<'_, '_> = Emoji("📊 ", "");
static SEARCH: Emoji<'_, '_> = Emoji("🔍 ", "");
static CHECK: Emoji<'_, '_> = Emoji("✅ ", "[OK] ");
static DATABASE: Emoji<'_, '_> = Emoji("💾 ", "");

pub async fn run(
    export: Option<PathBuf>,
    query: Option<String>,
    rebuild: bool,
    corpus: CorpusArgs,
) -> Result<()> {
    println!();
    println!("{}", style(" MCQ Corpus - Index ").bold().reverse());
    println!();

    let (_, store) = open_store(corpus.corpus_dir)?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner().template(&format!("{}{{spinner:.green}} {{msg}}", DATABASE))?,
    );
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner.set_message(format!("Scanning {}...", store.dir().display()));

    let service = IndexService::build(store).context("Failed to build index")?;
    let index = if rebuild {
        spinner.set_message("Rebuilding index...");
        service.rebuild().context("Failed to rebuild index")?
    } else {
        service.get()
    };
    spinner.finish_and_clear();
    if rebuild {
        println!("{}Index rebuilt from scratch", CHECK);
        println!();
    }

    println!("{}Index Overview", CHART);
    println!();
    for (label, count) in [
        ("Books:      ", index.books.len()),
        ("Chapters:   ", index.chapters.len()),
        ("Topics:     ", index.topics.len()),
        ("Definitions:", index.definitions.len()),
        ("Questions:  ", index.questions.len()),
    ] {
        println!(
            "  {} {} {}",
            style("•").cyan(),
            label,
            style(count).green().bold()
        );
    }

    if let Some(query) = query {
        println!();
        println!("{}Searching for {}...", SEARCH, style(&query).cyan());
        let results = index.search(&query);
        if results.is_empty() {
            println!();
            println!("{}", style("No matches found.").yellow());
        } else {
            for topic in &results.topics {
                println!(
                    "  {} {} {}",
                    style("topic").magenta(),
                    style(&topic.title).bold(),
                    style(format!("[{}]", topic.category)).dim()
                );
            }
            for definition in &results.definitions {
                println!(
                    "  {} {} {}",
                    style("term ").blue(),
                    style(&definition.term).bold(),
                    style(format!("({} examples)", definition.examples.len())).dim()
                );
            }
            for question in &results.questions {
                println!(
                    "  {} {} {}",
                    style("q    ").green(),
                    style(&question.id).dim(),
                    truncate(&question.question, 80)
                );
            }
        }
    }

    if let Some(path) = export {
        crate::export::export_index_json(&index, &path)?;
        println!();
        println!("{}Exported to {}", CHECK, style(path.display()).cyan());
    }

    println!();
    Ok(())
}
