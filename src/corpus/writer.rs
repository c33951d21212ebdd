//! Merge-append into corpus files.
//!
//! Appends never truncate: existing questions stay first, new ones follow in
//! the order given, and nothing is deduplicated. The file is rewritten via a
//! sibling `.json.tmp` and a rename so readers never see half a file.
//!
//! There is no locking. Two processes appending to the same chapter can both
//! read the old file and the later rename drops the other's questions; keep
//! one writer per file.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::CorpusFile;
use crate::error::{CorpusError, Result};
use crate::extract::ExtractedQuestion;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppendOutcome {
    pub path: PathBuf,
    pub appended: usize,
    pub total: usize,
    /// The existing file could not be parsed and was started over.
    pub reset: bool,
}

/// Append `questions` to the file at `path`.
///
/// `fresh` supplies the header when the file does not exist yet or has to be
/// reset; an existing, readable file keeps its own header.
pub fn append(path: &Path, fresh: CorpusFile, questions: &[ExtractedQuestion]) -> Result<AppendOutcome> {
    let (mut file, reset) = if path.exists() {
        let bytes = fs::read(path).map_err(|e| CorpusError::io(path, e))?;
        let parsed = String::from_utf8(bytes)
            .map_err(|e| e.to_string())
            .and_then(|content| CorpusFile::from_json(&content, path).map_err(|e| e.to_string()));
        match parsed {
            Ok(existing) => (existing, false),
            Err(e) => {
                warn!(
                    "Corpus file {} is unreadable ({}); starting it over, previous questions are discarded",
                    path.display(),
                    e
                );
                (fresh, true)
            }
        }
    } else {
        (fresh, false)
    };

    file.questions.extend_from_slice(questions);
    write_atomic(path, &file)?;

    info!(
        "Wrote {} questions to {} ({} new)",
        file.questions.len(),
        path.display(),
        questions.len()
    );

    Ok(AppendOutcome {
        path: path.to_path_buf(),
        appended: questions.len(),
        total: file.questions.len(),
        reset,
    })
}

fn write_atomic(path: &Path, file: &CorpusFile) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| CorpusError::io(parent, e))?;
    }

    let tmp = path.with_extension("json.tmp");
    {
        let handle = File::create(&tmp).map_err(|e| CorpusError::io(&tmp, e))?;
        let mut writer = BufWriter::new(handle);
        serde_json::to_writer_pretty(&mut writer, file).map_err(|e| CorpusError::parse(&tmp, e))?;
        writer.flush().map_err(|e| CorpusError::io(&tmp, e))?;
    }
    fs::rename(&tmp, path).map_err(|e| CorpusError::io(path, e))
}
