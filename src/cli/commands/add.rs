use anyhow::{Context, Result};
use console::{Emoji, style};
use std::fs;
use std::path::PathBuf;

use crate::cli::CorpusArgs;
use crate::corpus::{self, CorpusFile, CorpusStore};
use crate::identity::{self, BookIdentity, ChapterIdentity};

use super::open_store;

static CHECK: Emoji<'_, '_> = Emoji("✅ ", "[OK] ");
static LINK: Emoji<'_, '_> = Emoji("🔗 ", "");
static PLUS: Emoji<'_, '_> = Emoji("➕ ", "+ ");
static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "[!] ");

pub async fn run(
    book: String,
    chapter: String,
    from_file: PathBuf,
    subject: Option<String>,
    corpus: CorpusArgs,
) -> Result<()> {
    println!();
    println!("{}", style(" MCQ Corpus - Add Questions ").bold().reverse());
    println!();

    let (_, store) = open_store(corpus.corpus_dir)?;

    println!(
        "{}Importing from {}...",
        LINK,
        style(from_file.display()).cyan()
    );
    let content = fs::read_to_string(&from_file)
        .with_context(|| format!("Failed to read file: {}", from_file.display()))?;
    let questions = corpus::questions_from_json(&content, &from_file).with_context(
        || "Failed to parse JSON. Expected a question object, an array of them, or a corpus file",
    )?;

    if questions.is_empty() {
        println!("{}{}", WARN, style("No questions to add.").yellow());
        return Ok(());
    }
    println!(
        "{}Found {} questions to add",
        CHECK,
        style(questions.len()).green().bold()
    );

    let subject = subject.as_deref();
    let (book_identity, chapter_identity) = target_identity(&store, subject, &book, &chapter);
    let fresh = CorpusFile::new(&book_identity, &chapter_identity);

    let outcome = match store.resolve_file(subject, &book, &chapter) {
        Some(path) => store.append_to(&path, fresh, &questions)?,
        None => store.append(&book_identity, &chapter_identity, &questions)?,
    };

    if outcome.reset {
        println!(
            "{}{} was unreadable and has been started fresh",
            WARN,
            style(outcome.path.display()).yellow()
        );
    }
    println!(
        "{}Added {} questions to {} ({} total)",
        PLUS,
        style(outcome.appended).green().bold(),
        style(outcome.path.display()).cyan(),
        style(outcome.total).green()
    );
    println!();

    Ok(())
}

/// Header identity for a chapter that may not exist yet. Registered book ids
/// keep their registry names; anything else is filed under its resolved prefix.
fn target_identity(
    store: &CorpusStore,
    subject: Option<&str>,
    book: &str,
    chapter: &str,
) -> (BookIdentity, ChapterIdentity) {
    let registry = store.registry();
    let book_slug = book.trim().to_lowercase();
    let book_identity = identity::by_id(&book_slug).unwrap_or_else(|| BookIdentity {
        book_id: book_slug.clone(),
        book_name: book_slug.clone(),
        source: book_slug.clone(),
        slug_prefix: registry.resolve_book_slug(subject, &book_slug),
    });
    let chapter_identity = ChapterIdentity::from_title(chapter, "N/A", &book_identity, registry);
    (book_identity, chapter_identity)
}
