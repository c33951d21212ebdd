use once_cell::sync::Lazy;
use regex::Regex;

static INLINE_WHITESPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[ \t\u{00A0}]+").expect("valid whitespace regex"));
static BLANK_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").expect("valid newline regex"));

/// Clean raw document text before segmentation.
///
/// Line endings become `\n`, runs of spaces/tabs collapse to one space,
/// every line is trimmed (option and number markers are matched at line
/// start), and more than one blank line collapses to a single blank line.
pub fn normalize_text(raw: &str) -> String {
    let unified = raw
        .replace("\r\n", "\n")
        .replace('\r', "\n")
        .replace('\u{0}', "")
        .replace('\u{FEFF}', "");

    let lines: Vec<String> = unified
        .lines()
        .map(|line| INLINE_WHITESPACE.replace_all(line, " ").trim().to_string())
        .collect();

    BLANK_RUN
        .replace_all(&lines.join("\n"), "\n\n")
        .trim()
        .to_string()
}
