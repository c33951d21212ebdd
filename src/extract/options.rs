//! Answer option recovery.
//!
//! Papers format options in every way imaginable. Four strategies are tried
//! in order and the first that finds at least two options wins:
//!
//! 1. `(a) text` bracketed letters
//! 2. `A) text` / `A. text` delimited letters
//! 3. `A text` bare letters (easily fooled by prose, so tried late)
//! 4. line scan, where an optional-bracket marker starts an option and any
//!    unmarked line continues the current one
//!
//! Only `a`-`f` are option letters.

use once_cell::sync::Lazy;
use regex::Regex;

use super::strategy::{Strategy, first_success};

static BRACKETED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?im)^\(([a-f])\)[ \t]*").expect("valid bracketed regex"));
static DELIMITED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?im)^([a-f])[.)][ \t]*").expect("valid delimited regex"));
static BARE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?im)^([a-f])[ \t]+").expect("valid bare regex"));
static LINE_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\(?([a-f])\)?[.)]\s*(.+)$").expect("valid line marker regex"));

/// Lines that close an option: answer keys and solutions.
pub(crate) static ANSWER_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:correct\s+)?(?:answer|key|solution)\b").expect("valid answer line regex")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedOption {
    pub letter: char,
    pub text: String,
}

impl ExtractedOption {
    /// Corpus representation, e.g. `(b) Bar`.
    pub fn formatted(&self) -> String {
        format!("({}) {}", self.letter, self.text)
    }
}

/// Options recovered from a block, plus where the first one starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionSet {
    pub options: Vec<ExtractedOption>,
    /// Byte offset of the first option marker; the question text precedes it.
    pub start: usize,
    pub strategy: &'static str,
}

type Found = (Vec<ExtractedOption>, usize);

const STRATEGIES: [Strategy<str, Found>; 4] = [
    Strategy {
        name: "bracketed",
        run: bracketed,
    },
    Strategy {
        name: "delimited",
        run: delimited,
    },
    Strategy {
        name: "bare-letter",
        run: bare_letter,
    },
    Strategy {
        name: "line-scan",
        run: line_scan,
    },
];

/// Extract options from one question block, or `None` if fewer than two are found.
pub fn extract_options(block: &str) -> Option<OptionSet> {
    first_success(&STRATEGIES, block).map(|(strategy, (options, start))| OptionSet {
        options,
        start,
        strategy,
    })
}

fn bracketed(block: &str) -> Option<Found> {
    scan_markers(block, &BRACKETED)
}

fn delimited(block: &str) -> Option<Found> {
    scan_markers(block, &DELIMITED)
}

fn bare_letter(block: &str) -> Option<Found> {
    scan_markers(block, &BARE)
}

/// Option text runs from a marker to the next marker of the same style,
/// stopping early at a blank line or an answer line.
fn scan_markers(block: &str, marker: &Regex) -> Option<Found> {
    let found: Vec<(usize, usize, char)> = marker
        .captures_iter(block)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let letter = caps.get(1)?.as_str().chars().next()?.to_ascii_lowercase();
            Some((whole.start(), whole.end(), letter))
        })
        .collect();

    if found.len() < 2 {
        return None;
    }

    let mut options = Vec::with_capacity(found.len());
    for (i, &(_, text_start, letter)) in found.iter().enumerate() {
        let text_end = found.get(i + 1).map(|next| next.0).unwrap_or(block.len());
        let text = option_body(&block[text_start..text_end]);
        if !text.is_empty() {
            options.push(ExtractedOption { letter, text });
        }
    }

    if options.len() >= 2 {
        Some((options, found[0].0))
    } else {
        None
    }
}

fn option_body(segment: &str) -> String {
    let mut lines = segment.split('\n');
    let mut parts: Vec<&str> = Vec::new();
    if let Some(first) = lines.next() {
        parts.push(first.trim());
    }
    for line in lines {
        let line = line.trim();
        if line.is_empty() || ANSWER_LINE.is_match(line) {
            break;
        }
        parts.push(line);
    }
    parts
        .into_iter()
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn line_scan(block: &str) -> Option<Found> {
    let mut options: Vec<ExtractedOption> = Vec::new();
    let mut start = None;
    let mut offset = 0;

    for raw_line in block.split('\n') {
        let line_start = offset;
        offset += raw_line.len() + 1;

        let line = raw_line.trim();
        if line.is_empty() || ANSWER_LINE.is_match(line) {
            continue;
        }

        if let Some(caps) = LINE_MARKER.captures(line) {
            let letter = caps[1]
                .chars()
                .next()
                .map(|c| c.to_ascii_lowercase())
                .unwrap_or('a');
            options.push(ExtractedOption {
                letter,
                text: caps[2].trim().to_string(),
            });
            start.get_or_insert(line_start);
        } else if let Some(current) = options.last_mut() {
            current.text.push(' ');
            current.text.push_str(line);
        }
    }

    match start {
        Some(start) if options.len() >= 2 => Some((options, start)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(set: &OptionSet) -> Vec<String> {
        set.options.iter().map(|o| o.formatted()).collect()
    }

    #[test]
    fn test_bracketed_options_in_order() {
        let block = "1. What is X?\n(a) Foo\n(b) Bar\n(c) Baz\n(d) Qux\nAnswer: (b)";
        let set = extract_options(block).unwrap();
        assert_eq!(set.strategy, "bracketed");
        assert_eq!(texts(&set), vec!["(a) Foo", "(b) Bar", "(c) Baz", "(d) Qux"]);
        assert_eq!(&block[..set.start], "1. What is X?\n");
    }

    #[test]
    fn test_bracketed_uppercase_is_lowercased() {
        let set = extract_options("Q1 Pick one\n(A) First\n(B) Second").unwrap();
        assert_eq!(texts(&set), vec!["(a) First", "(b) Second"]);
    }

    #[test]
    fn test_bracketed_continuation_lines() {
        let block = "3. Long options\n(a) The first option\nwraps here\n(b) Short";
        let set = extract_options(block).unwrap();
        assert_eq!(texts(&set), vec!["(a) The first option wraps here", "(b) Short"]);
    }

    #[test]
    fn test_delimited_options() {
        let block = "4. Which is a gas?\nA) Oxygen\nB) Iron\nC. Copper";
        let set = extract_options(block).unwrap();
        assert_eq!(set.strategy, "delimited");
        assert_eq!(texts(&set), vec!["(a) Oxygen", "(b) Iron", "(c) Copper"]);
    }

    #[test]
    fn test_bare_letter_options() {
        let block = "5. Which is a gas?\nA Oxygen\nB Iron";
        let set = extract_options(block).unwrap();
        assert_eq!(set.strategy, "bare-letter");
        assert_eq!(texts(&set), vec!["(a) Oxygen", "(b) Iron"]);
    }

    #[test]
    fn test_line_scan_mixed_markers() {
        let block = "6. Mixed styles here\n(a) Foo\nb) Bar\ncontinued";
        let set = extract_options(block).unwrap();
        assert_eq!(set.strategy, "line-scan");
        assert_eq!(texts(&set), vec!["(a) Foo", "(b) Bar continued"]);
    }

    #[test]
    fn test_letters_beyond_f_ignored() {
        assert!(extract_options("7. Odd\n(g) Foo\n(h) Bar").is_none());
    }

    #[test]
    fn test_single_option_is_none() {
        assert!(extract_options("8. Describe the jet stream.\n(a) Only one").is_none());
    }

    #[test]
    fn test_answer_line_not_part_of_last_option() {
        let set = extract_options("9. Q text\n(a) Foo\n(b) Bar\nCorrect Answer: b").unwrap();
        assert_eq!(set.options[1].text, "Bar");
    }
}
