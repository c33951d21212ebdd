pub mod commands;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "mcqcorpus")]
#[command(author = "MCQ Corpus Team")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Extract multiple-choice questions from study material into a JSON corpus", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Shared by every command that reads or writes the corpus
#[derive(Args, Debug, Clone)]
pub struct CorpusArgs {
    /// Corpus directory (defaults to `corpus_dir` from the config file)
    #[arg(long, env = "MCQCORPUS_CORPUS_DIR")]
    pub corpus_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a default configuration file
    Init {
        /// Force overwrite existing configuration
        #[arg(short, long, default_value = "false")]
        force: bool,
    },

    /// Extract questions from document(s) into the corpus
    #[command(long_about = "Extract questions from document(s) into the corpus.\n\n\
        Supported inputs: .pdf, .txt, .md, .markdown, .html, .htm.\n\
        The book is classified from each file name unless --book is given.\n\
        Documents that match no known book are skipped with a warning.\n\n\
        Questions are appended to {book-prefix}-{chapter-slug}.json in the\n\
        corpus directory; existing questions are never overwritten.")]
    Extract {
        /// Path to document(s) or directory
        #[arg(required = true)]
        path: PathBuf,

        /// Chapter title the questions are filed under
        #[arg(short, long, default_value = "Revision Questions")]
        chapter: String,

        /// Chapter number written to the corpus file header
        #[arg(long, default_value = "N/A")]
        chapter_number: String,

        /// Book id to use instead of classifying each file name (e.g. ic-joshi)
        #[arg(short, long)]
        book: Option<String>,

        /// Number of documents extracted in parallel
        #[arg(short = 'j', long)]
        concurrency: Option<usize>,

        /// Extract and report without writing to the corpus
        #[arg(long, default_value = "false")]
        dry_run: bool,

        #[command(flatten)]
        corpus: CorpusArgs,
    },

    /// Append questions from a JSON file to a chapter
    Add {
        /// Book slug (e.g. ic-joshi, oxford)
        #[arg(short, long)]
        book: String,

        /// Chapter slug (e.g. jet-streams)
        #[arg(short, long)]
        chapter: String,

        /// JSON file holding one question or an array of questions
        #[arg(short, long)]
        from_file: PathBuf,

        /// Subject slug used to disambiguate loose book slugs
        #[arg(short, long)]
        subject: Option<String>,

        #[command(flatten)]
        corpus: CorpusArgs,
    },

    /// Find a question by id
    Locate {
        /// Question id (e.g. 12, q12, ic-joshi-jet-streams-q3)
        question_id: String,

        /// Book slug hint
        #[arg(short, long)]
        book: Option<String>,

        /// Chapter slug hint
        #[arg(short, long)]
        chapter: Option<String>,

        #[command(flatten)]
        corpus: CorpusArgs,
    },

    /// Print the questions of one chapter
    Show {
        /// Book slug
        #[arg(short, long)]
        book: String,

        /// Chapter slug
        #[arg(short, long)]
        chapter: String,

        /// Subject slug used to disambiguate loose book slugs
        #[arg(short, long)]
        subject: Option<String>,

        #[command(flatten)]
        corpus: CorpusArgs,
    },

    /// Show per-chapter question counts
    Stats {
        /// List every non-MCQ question
        #[arg(long, default_value = "false")]
        non_mcq: bool,

        #[command(flatten)]
        corpus: CorpusArgs,
    },

    /// Build the topic/definition/question index
    Index {
        /// Write the index as JSON to this file
        #[arg(short, long)]
        export: Option<PathBuf>,

        /// Search the index for a term
        #[arg(short, long)]
        query: Option<String>,

        /// Re-scan the corpus and swap in a fresh snapshot before querying
        #[arg(long, default_value = "false")]
        rebuild: bool,

        #[command(flatten)]
        corpus: CorpusArgs,
    },
}
