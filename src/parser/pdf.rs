use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

static PAGE_NUMBER_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(?:page\s+)?\d+(?:\s+of\s+\d+)?$").expect("valid page regex"));

/// Extract text from a PDF file
pub fn extract_text(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read PDF file: {}", path.display()))?;

    let text = pdf_extract::extract_text_from_mem(&bytes)
        .with_context(|| format!("Failed to extract text from PDF: {}", path.display()))?;

    Ok(clean_pdf_text(&text))
}

/// Strip extraction artifacts: form feeds, NULs, BOMs and bare page numbers.
///
/// Blank lines are kept; they end an option's text during extraction.
fn clean_pdf_text(text: &str) -> String {
    text.replace('\u{c}', "\n")
        .replace('\u{0}', "")
        .replace('\u{FEFF}', "")
        .lines()
        .map(|line| line.trim())
        .filter(|line| !PAGE_NUMBER_LINE.is_match(line))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_pdf_text() {
        let dirty = "  1. What is X?  \n(a) Foo\u{0}\n\u{c}Page 3\n(b) Bar\n12\n\n2. Next question";
        let clean = clean_pdf_text(dirty);
        assert_eq!(clean, "1. What is X?\n(a) Foo\n\n(b) Bar\n\n2. Next question");
    }

    #[test]
    fn test_page_of_total_removed() {
        assert_eq!(clean_pdf_text("Page 2 of 10\nText"), "Text");
    }
}
