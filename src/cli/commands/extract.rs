use anyhow::{Context, Result};
use console::{Emoji, style};
use futures::future::join_all;
use indicatif::{HumanDuration, ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tracing::{info, warn};

use crate::cli::CorpusArgs;
use crate::corpus::CorpusStore;
use crate::error::CorpusError;
use crate::extract::{Extraction, QuestionExtractor};
use crate::identity::{self, BookIdentity, ChapterIdentity};
use crate::parser::{self, DocumentReader, RawDocument};

use super::open_store;

static LOOKING_GLASS: Emoji<'_, '_> = Emoji("🔍 ", "");
static PAPER: Emoji<'_, '_> = Emoji("📄 ", "");
static BOOK: Emoji<'_, '_> = Emoji("📚 ", "");
static SPARKLE: Emoji<'_, '_> = Emoji("✨ ", "");
static CHECK: Emoji<'_, '_> = Emoji("✅ ", "[OK] ");
static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "[!] ");
static DATABASE: Emoji<'_, '_> = Emoji("💾 ", "");

/// Options for one extraction run
pub struct ExtractOptions {
    pub path: PathBuf,
    pub chapter: String,
    pub chapter_number: String,
    pub book: Option<String>,
    pub concurrency: Option<usize>,
    pub dry_run: bool,
}

#[derive(Default)]
struct RunTotals {
    documents: usize,
    questions: usize,
    non_mcq: usize,
    unanswered: usize,
    unrecognised: usize,
    failed: usize,
    files: Vec<PathBuf>,
}

pub async fn run(options: ExtractOptions, corpus: CorpusArgs) -> Result<()> {
    let started = Instant::now();

    println!();
    println!("{}", style(" MCQ Corpus - Question Extraction ").bold().reverse());
    println!();

    let (config, store) = open_store(corpus.corpus_dir)?;

    let forced_book = match options.book.as_deref() {
        Some(book_id) => Some(
            identity::by_id(book_id).ok_or_else(|| CorpusError::UnknownBook(book_id.to_string()))?,
        ),
        None => None,
    };
    let concurrency = options.concurrency.unwrap_or(config.concurrency).max(1);

    println!("{}Source: {}", PAPER, style(options.path.display()).cyan());
    println!("{}Corpus: {}", DATABASE, style(store.dir().display()).cyan());
    println!("{}Chapter: {}", BOOK, style(&options.chapter).cyan());
    if let Some(book) = &forced_book {
        println!("{}Book: {}", BOOK, style(&book.book_name).cyan());
    }
    if concurrency > 1 {
        println!("{}Concurrency: {}", SPARKLE, style(concurrency).cyan());
    }
    if options.dry_run {
        println!("{}Mode: {}", WARN, style("dry run (nothing is written)").yellow());
    }
    println!();

    print!("{}Scanning for documents... ", LOOKING_GLASS);
    let documents = parser::collect_documents(&options.path);
    println!(
        "{}",
        style(format!("found {}", documents.len())).green().bold()
    );

    if documents.is_empty() {
        println!();
        println!(
            "{}",
            style("No supported documents found (.pdf, .md, .txt, .html)").yellow()
        );
        return Ok(());
    }

    let pb = ProgressBar::new(documents.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(&format!(
                "{}{{spinner:.green}} [{{elapsed_precise}}] {{bar:40.cyan/blue}} {{pos}}/{{len}} {{msg}}",
                PAPER
            ))?
            .progress_chars("━━╸━"),
    );
    pb.enable_steady_tick(Duration::from_millis(100));

    let extractor = QuestionExtractor::new(config.min_block_len, config.min_question_len);
    let semaphore = Arc::new(Semaphore::new(concurrency));

    let tasks = documents.iter().cloned().map(|doc_path| {
        let semaphore = Arc::clone(&semaphore);
        let pb = pb.clone();
        async move {
            let result = extract_document(doc_path, extractor, semaphore).await;
            pb.inc(1);
            result
        }
    });
    let results = join_all(tasks).await;
    pb.finish_and_clear();

    // Writes stay on this task, in input order: one writer per corpus file.
    let mut totals = RunTotals::default();
    for (doc_path, result) in documents.iter().zip(results) {
        let (doc, extraction) = match result {
            Ok(extracted) => extracted,
            Err(e) => {
                warn!("Skipping {}: {:#}", doc_path.display(), e);
                totals.failed += 1;
                continue;
            }
        };

        let book = forced_book
            .clone()
            .unwrap_or_else(|| identity::classify(&doc.stem));
        if book.is_unknown() {
            warn!(
                "Could not identify the book for {}; pass --book to file it explicitly",
                doc.file_name
            );
            totals.unrecognised += 1;
            continue;
        }

        totals.documents += 1;
        if let Err(e) = record_document(&store, &options, &book, &doc, &extraction, &mut totals) {
            warn!("{:#}", e);
            totals.failed += 1;
        }
    }

    print_summary(&options, &totals, started);
    Ok(())
}

async fn extract_document(
    path: PathBuf,
    extractor: QuestionExtractor,
    semaphore: Arc<Semaphore>,
) -> Result<(RawDocument, Extraction)> {
    let _permit = semaphore
        .acquire_owned()
        .await
        .context("Extraction pool closed")?;

    tokio::task::spawn_blocking(move || -> Result<(RawDocument, Extraction)> {
        let doc = DocumentReader::new()
            .read(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let extraction = extractor.extract(&doc.text);
        info!(
            "{}: {} questions from {} blocks ({} skipped)",
            doc.file_name,
            extraction.questions.len(),
            extraction.blocks,
            extraction.skipped
        );
        Ok((doc, extraction))
    })
    .await
    .context("Extraction task failed")?
}

fn record_document(
    store: &CorpusStore,
    options: &ExtractOptions,
    book: &BookIdentity,
    doc: &RawDocument,
    extraction: &Extraction,
    totals: &mut RunTotals,
) -> Result<()> {
    let questions = &extraction.questions;
    let non_mcq = questions.len() - extraction.mcq_count();
    let unanswered = questions
        .iter()
        .filter(|q| q.is_mcq() && q.answer.is_empty())
        .count();

    totals.questions += questions.len();
    totals.non_mcq += non_mcq;
    totals.unanswered += unanswered;

    if questions.is_empty() {
        println!(
            "{}{} {}",
            WARN,
            style(&doc.file_name).dim(),
            style("no questions found").yellow()
        );
        return Ok(());
    }

    let chapter = ChapterIdentity::from_title(
        &options.chapter,
        &options.chapter_number,
        book,
        store.registry(),
    );

    if options.dry_run {
        println!(
            "{}{} → {} ({} questions, {} non-MCQ)",
            CHECK,
            style(&doc.file_name).dim(),
            style(store.file_for(book, &chapter).display()).cyan(),
            style(questions.len()).green().bold(),
            non_mcq
        );
        return Ok(());
    }

    let outcome = store
        .append(book, &chapter, questions)
        .with_context(|| format!("Failed to write questions from {}", doc.file_name))?;

    if outcome.reset {
        println!(
            "{}{} was unreadable and has been started fresh",
            WARN,
            style(outcome.path.display()).yellow()
        );
    }
    println!(
        "{}{} → {} (+{}, {} total)",
        CHECK,
        style(&doc.file_name).dim(),
        style(outcome.path.display()).cyan(),
        style(outcome.appended).green().bold(),
        outcome.total
    );
    if !totals.files.contains(&outcome.path) {
        totals.files.push(outcome.path);
    }
    Ok(())
}

fn print_summary(options: &ExtractOptions, totals: &RunTotals, started: Instant) {
    println!();
    println!("{}Extraction Summary:", SPARKLE);
    println!(
        "  {} Documents processed: {}",
        style("•").cyan(),
        style(totals.documents).green().bold()
    );
    println!(
        "  {} Questions extracted: {}",
        style("•").cyan(),
        style(totals.questions).green().bold()
    );
    println!(
        "  {} Non-MCQ records:     {}",
        style("•").cyan(),
        style(totals.non_mcq).yellow()
    );
    println!(
        "  {} Without an answer:   {}",
        style("•").cyan(),
        style(totals.unanswered).yellow()
    );
    if !options.dry_run {
        println!(
            "  {} Corpus files written: {}",
            style("•").cyan(),
            style(totals.files.len()).green().bold()
        );
    }
    if totals.unrecognised > 0 {
        println!(
            "  {} Unrecognised books:  {}",
            style("•").cyan(),
            style(totals.unrecognised).red()
        );
    }
    if totals.failed > 0 {
        println!(
            "  {} Unreadable files:    {}",
            style("•").cyan(),
            style(totals.failed).red()
        );
    }

    println!();
    println!(
        "{}Done in {}",
        SPARKLE,
        style(HumanDuration(started.elapsed())).green().bold()
    );
}
