use anyhow::{Context, Result};
use scraper::{ElementRef, Html, Selector};
use std::path::Path;

/// Extract text from an HTML file
pub fn extract_text(path: &Path) -> Result<String> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read HTML file: {}", path.display()))?;

    Ok(html_to_text(&content))
}

/// Convert HTML to plain text, one line per block element
fn html_to_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut text = String::new();

    // Prefer the main content when the page marks it
    for selector_str in ["main", "article", "body", "html"] {
        if let Ok(selector) = Selector::parse(selector_str) {
            if let Some(element) = document.select(&selector).next() {
                extract_element_text(&element, &mut text);
                break;
            }
        }
    }

    clean_html_text(&text)
}

fn extract_element_text(element: &ElementRef, out: &mut String) {
    for node in element.children() {
        if let Some(text) = node.value().as_text() {
            out.push_str(text);
        } else if let Some(child) = ElementRef::wrap(node) {
            let tag = child.value().name();
            if matches!(tag, "script" | "style" | "noscript") {
                continue;
            }
            if tag == "br" {
                out.push('\n');
                continue;
            }

            let block = matches!(
                tag,
                "p" | "div" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "li" | "tr" | "ol" | "ul" | "table"
            );
            if block {
                out.push('\n');
            }
            extract_element_text(&child, out);
            if block {
                out.push('\n');
            }
        }
    }
}

fn clean_html_text(text: &str) -> String {
    text.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}
