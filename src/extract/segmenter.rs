use once_cell::sync::Lazy;
use regex::Regex;

/// Question boundary styles, most common first.
///
/// Each pattern matches the newline that precedes a boundary; the block is
/// cut there and the newline itself is dropped.
static BOUNDARIES: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    [
        ("numbered", r"\n\d+\.\s"),
        ("q-prefixed", r"(?i)\nQ\d+"),
        ("question-word", r"(?i)\nQuestion\s+\d+"),
        ("parenthesised", r"\n\(\d+\)"),
    ]
    .into_iter()
    .map(|(name, pattern)| (name, Regex::new(pattern).expect("valid boundary regex")))
    .collect()
});

/// Splits normalised text into one block per candidate question.
#[derive(Debug, Clone, Copy)]
pub struct QuestionSegmenter {
    min_block_len: usize,
}

impl QuestionSegmenter {
    pub fn new(min_block_len: usize) -> Self {
        Self { min_block_len }
    }

    /// Apply every boundary pattern to every block produced so far, then drop
    /// blocks too short to hold a question (headers, page numbers).
    pub fn segment(&self, text: &str) -> Vec<String> {
        let mut blocks = vec![text.to_string()];

        for (_, boundary) in BOUNDARIES.iter() {
            blocks = blocks
                .iter()
                .flat_map(|block| split_before(block, boundary))
                .collect();
        }

        blocks
            .into_iter()
            .map(|b| b.trim().to_string())
            .filter(|b| b.chars().count() >= self.min_block_len)
            .collect()
    }
}

fn split_before(block: &str, boundary: &Regex) -> Vec<String> {
    let mut parts = Vec::new();
    let mut last = 0;
    for found in boundary.find_iter(block) {
        parts.push(block[last..found.start()].to_string());
        // Skip the leading newline; the boundary text opens the next block.
        last = found.start() + 1;
    }
    parts.push(block[last..].to_string());
    parts
}
