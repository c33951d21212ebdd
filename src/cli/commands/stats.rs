use anyhow::Result;
use console::{Emoji, style};

use crate::cli::CorpusArgs;

use super::{open_store, truncate};

static CHART: Emoji<'_, '_> = Emoji("📊 ", "");
static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "[!] ");
static TROPHY: Emoji<'_, '_> = Emoji("🏆 ", "");

pub async fn run(non_mcq: bool, corpus: CorpusArgs) -> Result<()> {
    println!();
    println!("{}", style(" MCQ Corpus - Statistics ").bold().reverse());
    println!();

    let (_, store) = open_store(corpus.corpus_dir)?;
    let summaries = store.summaries()?;

    if summaries.is_empty() {
        println!(
            "{}",
            style(format!("No corpus files in {}", store.dir().display())).yellow()
        );
        return Ok(());
    }

    println!("{}Chapters", CHART);
    println!();
    for summary in &summaries {
        let non_mcq_note = if summary.non_mcq.is_empty() {
            String::new()
        } else {
            format!(" ({} non-MCQ)", summary.non_mcq.len())
        };
        println!(
            "  {} {} {} {}{}",
            style("•").cyan(),
            style(&summary.file_name).bold(),
            style(format!("{} / {}", summary.book_name, summary.chapter_title)).dim(),
            style(summary.question_count).green().bold(),
            style(non_mcq_note).yellow()
        );
        if !summary.duplicate_numbers.is_empty() {
            println!(
                "      {}duplicate question numbers: {}",
                WARN,
                style(summary.duplicate_numbers.join(", ")).yellow()
            );
        }
    }

    let total_questions: usize = summaries.iter().map(|s| s.question_count).sum();
    let total_non_mcq: usize = summaries.iter().map(|s| s.non_mcq.len()).sum();

    println!();
    println!("{}Totals", TROPHY);
    println!(
        "  {} Files:     {}",
        style("•").cyan(),
        style(summaries.len()).green().bold()
    );
    println!(
        "  {} Questions: {}",
        style("•").cyan(),
        style(total_questions).green().bold()
    );
    println!(
        "  {} Non-MCQ:   {}",
        style("•").cyan(),
        style(total_non_mcq).yellow()
    );

    if non_mcq && total_non_mcq > 0 {
        println!();
        println!("{}Non-MCQ questions", WARN);
        for summary in summaries.iter().filter(|s| !s.non_mcq.is_empty()) {
            println!();
            println!("  {}", style(&summary.file_name).bold());
            for (position, text) in &summary.non_mcq {
                println!(
                    "    {} {}",
                    style(format!("#{position}")).cyan(),
                    truncate(text, 80)
                );
            }
        }
    }

    println!();
    Ok(())
}
