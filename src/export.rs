use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::index::CorpusIndex;

/// Export an index snapshot to a pretty-printed JSON file
pub fn export_index_json(index: &CorpusIndex, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let file =
        File::create(path).with_context(|| format!("Failed to create file: {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    serde_json::to_writer_pretty(&mut writer, index).context("Failed to write JSON")?;
    writer.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{BookEntry, ChapterEntry};
    use tempfile::tempdir;

    #[test]
    fn test_export_index_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out").join("index.json");

        let index = CorpusIndex {
            chapters: vec![ChapterEntry {
                id: "ic-joshi-jet-streams".into(),
                book_id: "practice-book-ic-joshi".into(),
                name: "Jet Streams".into(),
                file_name: "ic-joshi-jet-streams.json".into(),
                question_count: 3,
            }],
            books: vec![BookEntry {
                id: "practice-book-ic-joshi".into(),
                name: "IC Joshi".into(),
                subject: "General".into(),
            }],
            ..Default::default()
        };

        export_index_json(&index, &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(value["chapters"][0]["question_count"], 3);
        assert_eq!(value["books"][0]["subject"], "General");
        assert!(value["topics"].as_array().unwrap().is_empty());
    }
}
