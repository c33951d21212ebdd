use anyhow::Result;
use console::{Emoji, style};

use crate::cli::CorpusArgs;

use super::locate::print_question;
use super::open_store;

static BOOK: Emoji<'_, '_> = Emoji("📚 ", "");
static CHART: Emoji<'_, '_> = Emoji("📊 ", "");

pub async fn run(
    book: String,
    chapter: String,
    subject: Option<String>,
    corpus: CorpusArgs,
) -> Result<()> {
    let (_, store) = open_store(corpus.corpus_dir)?;
    let (path, file) = store.read_chapter(subject.as_deref(), &book, &chapter)?;

    println!();
    println!(
        "{}{} - {}",
        BOOK,
        style(&file.book_name).bold(),
        style(&file.chapter_title).cyan().bold()
    );
    println!("  {}", style(path.display()).dim());
    println!(
        "{}{} questions ({} non-MCQ)",
        CHART,
        style(file.questions.len()).green().bold(),
        style(file.non_mcq_count()).yellow()
    );
    println!();

    for question in &file.questions {
        print_question(question);
        println!();
    }

    Ok(())
}
