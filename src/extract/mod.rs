//! Text-to-question extraction.
//!
//! A document's text goes through [`normalize_text`], is cut into candidate
//! blocks by the [`QuestionSegmenter`], and each block is handed to the
//! option and answer extractors. Nothing here fails: blocks that yield no
//! usable question are logged and skipped.

pub mod answer;
pub mod normalize;
pub mod options;
pub mod segmenter;
pub mod strategy;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub use normalize::normalize_text;
pub use segmenter::QuestionSegmenter;

use answer::{document_tail, extract_answer};
use options::{ANSWER_LINE, extract_options};
use strategy::{Strategy, first_success};

pub const MCQ: &str = "MCQ";
pub const NON_MCQ: &str = "Non-MCQ";

static NUMBER_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:\d+\.|Q\d+[.:)]?|Question\s+\d+[.:)]?|\(\d+\))\s*")
        .expect("valid number prefix regex")
});

static DOTTED_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+)\.").expect("valid number regex"));
static Q_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^Q(\d+)").expect("valid q-number regex"));
static WORD_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^Question\s+(\d+)").expect("valid question-number regex"));
static PAREN_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\((\d+)\)").expect("valid paren-number regex"));

const NUMBER_STRATEGIES: [Strategy<str, String>; 4] = [
    Strategy {
        name: "dotted",
        run: dotted_number,
    },
    Strategy {
        name: "q-prefixed",
        run: q_number,
    },
    Strategy {
        name: "question-word",
        run: word_number,
    },
    Strategy {
        name: "parenthesised",
        run: paren_number,
    },
];

/// One question record, in the shape stored in corpus files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedQuestion {
    pub question_number: String,
    pub question: String,
    pub question_type: String,
    pub options: Vec<String>,
    /// Lowercase option letter, or empty when no valid answer was found.
    pub answer: String,
    pub solution: String,
    pub explanation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl ExtractedQuestion {
    pub fn is_mcq(&self) -> bool {
        self.options.len() >= 2
    }

    pub fn answer_letter(&self) -> Option<char> {
        let mut chars = self.answer.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if ('a'..='f').contains(&c) => Some(c),
            _ => None,
        }
    }
}

/// Outcome of extracting one document.
#[derive(Debug, Default)]
pub struct Extraction {
    pub questions: Vec<ExtractedQuestion>,
    pub blocks: usize,
    pub skipped: usize,
}

impl Extraction {
    pub fn mcq_count(&self) -> usize {
        self.questions.iter().filter(|q| q.is_mcq()).count()
    }
}

/// Runs the whole block pipeline over a document's text.
#[derive(Debug, Clone, Copy)]
pub struct QuestionExtractor {
    segmenter: QuestionSegmenter,
    min_question_len: usize,
}

impl QuestionExtractor {
    pub fn new(min_block_len: usize, min_question_len: usize) -> Self {
        Self {
            segmenter: QuestionSegmenter::new(min_block_len),
            min_question_len,
        }
    }

    pub fn extract(&self, raw: &str) -> Extraction {
        let text = normalize_text(raw);
        let tail = document_tail(&text);
        let blocks = self.segmenter.segment(&text);

        let mut extraction = Extraction {
            blocks: blocks.len(),
            ..Default::default()
        };

        for block in &blocks {
            let fallback_number = extraction.questions.len() + 1;
            match self.parse_block(block, &tail, fallback_number) {
                Some(question) => extraction.questions.push(question),
                None => extraction.skipped += 1,
            }
        }

        extraction
    }

    fn parse_block(&self, block: &str, tail: &str, fallback_number: usize) -> Option<ExtractedQuestion> {
        let numbered = first_success(&NUMBER_STRATEGIES, block).map(|(_, n)| n);

        let Some(option_set) = extract_options(block) else {
            return self.non_mcq(block, numbered, fallback_number);
        };
        let question_number = numbered.unwrap_or_else(|| fallback_number.to_string());
        debug!(
            "Question {}: {} options via {}",
            question_number,
            option_set.options.len(),
            option_set.strategy
        );

        let question = question_text(&block[..option_set.start]);
        if question.chars().count() < self.min_question_len {
            warn!(
                "Skipping question {}: no usable question text in block starting {:?}",
                question_number,
                preview(block)
            );
            return None;
        }

        let options: Vec<String> = option_set.options.iter().map(|o| o.formatted()).collect();

        let (answer, solution) = match extract_answer(block, tail) {
            Some(found) => match option_set.options.iter().find(|o| o.letter == found.letter) {
                Some(option) => {
                    debug!(
                        "Question {}: answer {} via {}{}",
                        question_number,
                        found.letter,
                        found.strategy,
                        if found.from_tail { " (document tail)" } else { "" }
                    );
                    (found.letter.to_string(), option.formatted())
                }
                None => {
                    warn!(
                        "Question {}: answer '{}' is outside its {} options, leaving it empty",
                        question_number,
                        found.letter,
                        options.len()
                    );
                    (String::new(), String::new())
                }
            },
            None => {
                debug!("Question {}: no answer found", question_number);
                (String::new(), String::new())
            }
        };

        Some(ExtractedQuestion {
            question_number,
            question,
            question_type: MCQ.to_string(),
            options,
            answer,
            solution,
            explanation: String::new(),
            id: None,
        })
    }

    /// Blocks with fewer than two options are kept as non-MCQ records as long
    /// as their first line reads like a question; the running counter numbers
    /// them when the block carries no number of its own.
    fn non_mcq(&self, block: &str, numbered: Option<String>, fallback_number: usize) -> Option<ExtractedQuestion> {
        let question_number = numbered.unwrap_or_else(|| fallback_number.to_string());
        let first_line = block.lines().next().unwrap_or_default();
        let question = collapse_whitespace(&NUMBER_PREFIX.replace(first_line.trim(), ""));
        if question.chars().count() < self.min_question_len {
            warn!("Skipping block without question text: {:?}", preview(block));
            return None;
        }

        debug!("Question {}: fewer than two options, stored as non-MCQ", question_number);
        Some(ExtractedQuestion {
            question_number,
            question,
            question_type: NON_MCQ.to_string(),
            options: Vec::new(),
            answer: String::new(),
            solution: String::new(),
            explanation: String::new(),
            id: None,
        })
    }
}

fn question_text(head: &str) -> String {
    let kept: Vec<&str> = head
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !ANSWER_LINE.is_match(line))
        .collect();
    let joined = kept.join(" ");
    collapse_whitespace(&NUMBER_PREFIX.replace(&joined, ""))
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn preview(block: &str) -> String {
    block.chars().take(40).collect()
}

fn dotted_number(block: &str) -> Option<String> {
    capture_digits(&DOTTED_NUMBER, block)
}

fn q_number(block: &str) -> Option<String> {
    capture_digits(&Q_NUMBER, block)
}

fn word_number(block: &str) -> Option<String> {
    capture_digits(&WORD_NUMBER, block)
}

fn paren_number(block: &str) -> Option<String> {
    capture_digits(&PAREN_NUMBER, block)
}

fn capture_digits(re: &Regex, block: &str) -> Option<String> {
    re.captures(block.trim_start())
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}
