mod html;
mod markdown;
mod pdf;
mod text;

use anyhow::Result;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A source document's text, ready for extraction
#[derive(Debug, Clone)]
pub struct RawDocument {
    pub path: PathBuf,
    pub file_name: String,
    /// File name without extension; used to classify the book
    pub stem: String,
    pub text: String,
}

/// Reads supported document types into plain text
#[derive(Debug, Default, Clone, Copy)]
pub struct DocumentReader;

impl DocumentReader {
    pub fn new() -> Self {
        Self
    }

    pub fn read(&self, path: &Path) -> Result<RawDocument> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        let text = match extension.as_str() {
            "pdf" => pdf::extract_text(path)?,
            "txt" => text::extract_text(path)?,
            "md" | "markdown" => markdown::extract_text(path)?,
            "html" | "htm" => html::extract_text(path)?,
            _ => anyhow::bail!("Unsupported file type: {}", extension),
        };

        Ok(RawDocument {
            path: path.to_path_buf(),
            file_name: path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default(),
            stem: path
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_default(),
            text,
        })
    }
}

/// Supported documents under `path` (or `path` itself), sorted.
pub fn collect_documents(path: &Path) -> Vec<PathBuf> {
    let mut documents = Vec::new();

    if path.is_file() {
        if is_supported_file(path) {
            documents.push(path.to_path_buf());
        }
    } else if path.is_dir() {
        for entry in WalkDir::new(path)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let entry_path = entry.path();
            if entry_path.is_file() && is_supported_file(entry_path) {
                documents.push(entry_path.to_path_buf());
            }
        }
    }

    documents.sort();
    documents
}

pub fn is_supported_file(path: &Path) -> bool {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase());
    matches!(
        extension.as_deref(),
        Some("pdf" | "txt" | "md" | "markdown" | "html" | "htm")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_read_text_document() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("IC-Joshi-Revision.txt");
        fs::write(&path, "1. What is X?\n(a) Foo\n(b) Bar").unwrap();

        let doc = DocumentReader::new().read(&path).unwrap();
        assert_eq!(doc.file_name, "IC-Joshi-Revision.txt");
        assert_eq!(doc.stem, "IC-Joshi-Revision");
        assert!(doc.text.contains("(b) Bar"));
    }

    #[test]
    fn test_unsupported_extension() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("paper.docx");
        fs::write(&path, "x").unwrap();
        assert!(DocumentReader::new().read(&path).is_err());
    }

    #[test]
    fn test_collect_documents_sorted_and_filtered() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("b.txt"), "x").unwrap();
        fs::write(dir.path().join("a.MD"), "x").unwrap();
        fs::write(dir.path().join("nested").join("c.html"), "x").unwrap();
        fs::write(dir.path().join("skip.json"), "{}").unwrap();

        let docs = collect_documents(dir.path());
        let names: Vec<String> = docs
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.MD", "b.txt", "c.html"]);
    }

    #[test]
    fn test_collect_single_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("one.txt");
        fs::write(&path, "x").unwrap();
        assert_eq!(collect_documents(&path), vec![path]);
    }
}
