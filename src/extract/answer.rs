use once_cell::sync::Lazy;
use regex::Regex;

use super::strategy::{Strategy, first_success};

// The trailing `\b` keeps words like "because" from reading as answer `b`.
static CORRECT_ANSWER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)Correct\s+Answer[:\s]+\(?([a-f])\b").expect("valid correct answer regex")
});
static ANSWER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bAnswer[:\s]+\(?([a-f])\b").expect("valid answer regex"));
static KEY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bKey[:\s]+\(?([a-f])\b").expect("valid key regex"));
static SOLUTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bSolution[:\s]+\(?([a-f])\b").expect("valid solution regex"));

const TAIL_LINES: usize = 5;

const STRATEGIES: [Strategy<str, char>; 4] = [
    Strategy {
        name: "correct-answer",
        run: correct_answer,
    },
    Strategy {
        name: "answer",
        run: answer,
    },
    Strategy {
        name: "key",
        run: key,
    },
    Strategy {
        name: "solution",
        run: solution,
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerMatch {
    /// Lowercase option letter.
    pub letter: char,
    pub strategy: &'static str,
    /// Found in the document tail rather than the question block.
    pub from_tail: bool,
}

/// Look for the answer letter in the block, then in the document tail.
///
/// `tail` is produced once per document by [`document_tail`]; answer keys
/// printed after the last question end up there.
pub fn extract_answer(block: &str, tail: &str) -> Option<AnswerMatch> {
    if let Some((strategy, letter)) = first_success(&STRATEGIES, block) {
        return Some(AnswerMatch {
            letter,
            strategy,
            from_tail: false,
        });
    }

    first_success(&STRATEGIES, tail).map(|(strategy, letter)| AnswerMatch {
        letter,
        strategy,
        from_tail: true,
    })
}

/// The last few non-empty lines of a document joined by spaces.
pub fn document_tail(text: &str) -> String {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();
    let from = lines.len().saturating_sub(TAIL_LINES);
    lines[from..].join(" ")
}

fn correct_answer(text: &str) -> Option<char> {
    capture_letter(&CORRECT_ANSWER, text)
}

fn answer(text: &str) -> Option<char> {
    capture_letter(&ANSWER, text)
}

fn key(text: &str) -> Option<char> {
    capture_letter(&KEY, text)
}

fn solution(text: &str) -> Option<char> {
    capture_letter(&SOLUTION, text)
}

fn capture_letter(re: &Regex, text: &str) -> Option<char> {
    re.captures(text)?
        .get(1)?
        .as_str()
        .chars()
        .next()
        .map(|c| c.to_ascii_lowercase())
}
