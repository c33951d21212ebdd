use anyhow::Result;
use console::{Emoji, style};

use crate::cli::CorpusArgs;
use crate::corpus::QuestionLocator;
use crate::extract::ExtractedQuestion;

use super::open_store;

static SEARCH: Emoji<'_, '_> = Emoji("🔍 ", "");
static TARGET: Emoji<'_, '_> = Emoji("🎯 ", "");

pub async fn run(
    question_id: String,
    book: Option<String>,
    chapter: Option<String>,
    corpus: CorpusArgs,
) -> Result<()> {
    let (_, store) = open_store(corpus.corpus_dir)?;

    println!("{}Locating question {}...", SEARCH, style(&question_id).cyan());
    if let Some(book) = &book {
        println!("  Book: {}", style(book).cyan());
    }
    if let Some(chapter) = &chapter {
        println!("  Chapter: {}", style(chapter).cyan());
    }

    let locator = QuestionLocator::new(&store);
    match locator
        .locate(&question_id, book.as_deref(), chapter.as_deref())
        .found()
    {
        Some(located) => {
            println!();
            println!(
                "{}Found in {} at position {}",
                TARGET,
                style(located.file_path.display()).cyan(),
                style(located.index + 1).green().bold()
            );
            println!("  {} {}", style("matched by").dim(), style(located.tier).yellow());
            println!();
            print_question(&located.question);
        }
        None => {
            println!();
            println!("{}", style("No matching question found.").yellow());
        }
    }

    Ok(())
}

pub(crate) fn print_question(question: &ExtractedQuestion) {
    println!(
        "  {} {}",
        style(format!("Q{}.", question.question_number)).cyan().bold(),
        question.question
    );
    for option in &question.options {
        let is_answer = question
            .answer_letter()
            .is_some_and(|letter| option.starts_with(&format!("({letter})")));
        if is_answer {
            println!("      {}", style(option).green().bold());
        } else {
            println!("      {}", option);
        }
    }
    if question.answer.is_empty() {
        if question.is_mcq() {
            println!("    {} {}", style("→").dim(), style("no answer recorded").yellow());
        }
    } else {
        println!(
            "    {} Answer: {}",
            style("→").dim(),
            style(&question.answer).green().bold()
        );
    }
    if !question.explanation.is_empty() {
        println!("    {} {}", style("→").dim(), style(&question.explanation).dim());
    }
}
