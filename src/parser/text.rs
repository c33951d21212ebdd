use anyhow::{Context, Result};
use std::path::Path;

/// Extract text from a plain text file
pub fn extract_text(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read text file: {}", path.display()))?;

    // Exam papers exported from old word processors are not always valid UTF-8
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_extract_text() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "1. What is the tropopause?").unwrap();

        let text = extract_text(file.path()).unwrap();
        assert!(text.contains("What is the tropopause?"));
    }

    #[test]
    fn test_invalid_utf8_is_replaced() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"Answer: (b)\xff").unwrap();

        let text = extract_text(file.path()).unwrap();
        assert!(text.starts_with("Answer: (b)"));
    }
}
