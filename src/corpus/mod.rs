//! Corpus files: one JSON document per (book, chapter).
//!
//! Files written over the years use different field names for the same
//! thing. Everything read from disk goes through [`CorpusFile::from_json`],
//! which folds those variants into [`ExtractedQuestion`]; everything written
//! uses the canonical shape.

pub mod locator;
pub mod writer;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::{CorpusError, Result};
use crate::extract::{ExtractedQuestion, MCQ, NON_MCQ};
use crate::identity::slug::fold_spelling;
use crate::identity::{BookIdentity, ChapterIdentity, SlugAliasRegistry};

pub use locator::{LocateOutcome, QuestionLocator};
pub use writer::AppendOutcome;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusFile {
    pub book_name: String,
    pub chapter_number: String,
    pub chapter_title: String,
    pub chapter_slug: String,
    pub source: String,
    pub questions: Vec<ExtractedQuestion>,
}

impl CorpusFile {
    /// Empty corpus file for a freshly extracted chapter.
    pub fn new(book: &BookIdentity, chapter: &ChapterIdentity) -> Self {
        Self {
            book_name: book.book_name.clone(),
            chapter_number: chapter.number.clone(),
            chapter_title: chapter.title.clone(),
            chapter_slug: chapter.slug.clone(),
            source: book.source.clone(),
            questions: Vec::new(),
        }
    }

    /// Parse a corpus file, accepting historical field variants.
    pub fn from_json(content: &str, path: &Path) -> Result<Self> {
        let value: Value =
            serde_json::from_str(content).map_err(|e| CorpusError::parse(path, e))?;

        let questions = value
            .get("questions")
            .and_then(Value::as_array)
            .ok_or_else(|| CorpusError::MissingQuestions {
                path: path.to_path_buf(),
            })?;

        let header = |name: &str| value.get(name).and_then(scalar_string).unwrap_or_default();

        Ok(Self {
            book_name: header("book_name"),
            chapter_number: header("chapter_number"),
            chapter_title: header("chapter_title"),
            chapter_slug: header("chapter_slug"),
            source: header("source"),
            questions: questions
                .iter()
                .enumerate()
                .map(|(i, q)| adapt_question(q, i))
                .collect(),
        })
    }

    pub fn non_mcq_count(&self) -> usize {
        self.questions.iter().filter(|q| !q.is_mcq()).count()
    }

    /// `question_number`s that occur more than once, in first-seen order.
    pub fn duplicate_numbers(&self) -> Vec<String> {
        let mut seen: HashMap<&str, usize> = HashMap::new();
        let mut duplicates = Vec::new();
        for q in &self.questions {
            let count = seen.entry(q.question_number.as_str()).or_insert(0);
            *count += 1;
            if *count == 2 {
                duplicates.push(q.question_number.clone());
            }
        }
        duplicates
    }
}

/// Questions submitted for appending: one record, an array of records, or a
/// whole corpus file. Records go through the same adapter as corpus files.
pub fn questions_from_json(content: &str, path: &Path) -> Result<Vec<ExtractedQuestion>> {
    let value: Value = serde_json::from_str(content).map_err(|e| CorpusError::parse(path, e))?;
    match &value {
        Value::Array(items) => Ok(items
            .iter()
            .enumerate()
            .map(|(i, q)| adapt_question(q, i))
            .collect()),
        Value::Object(map) if map.contains_key("questions") => {
            Ok(CorpusFile::from_json(content, path)?.questions)
        }
        Value::Object(_) => Ok(vec![adapt_question(&value, 0)]),
        _ => Err(CorpusError::MissingQuestions {
            path: path.to_path_buf(),
        }),
    }
}

fn adapt_question(value: &Value, position: usize) -> ExtractedQuestion {
    let field = |names: &[&str]| {
        names
            .iter()
            .find_map(|name| value.get(*name).and_then(scalar_string))
            .filter(|s| !s.is_empty())
    };

    let id = field(&["id"]);
    let question_number = field(&["question_number"])
        .or_else(|| id.clone())
        .unwrap_or_else(|| (position + 1).to_string());

    let options: Vec<String> = value
        .get("options")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .map(|o| scalar_string(o).unwrap_or_else(|| o.to_string()))
                .collect()
        })
        .unwrap_or_default();

    let solution = field(&["solution"]).unwrap_or_default();
    let answer = field(&["answer"])
        .map(|a| a.to_lowercase())
        .or_else(|| single_letter(&solution))
        .unwrap_or_default();

    let question_type = field(&["question_type"]).unwrap_or_else(|| {
        let kind = if options.len() >= 2 { MCQ } else { NON_MCQ };
        kind.to_string()
    });

    ExtractedQuestion {
        question_number,
        question: field(&["question", "question_text", "text"]).unwrap_or_default(),
        question_type,
        options,
        answer,
        solution,
        explanation: field(&["explanation"]).unwrap_or_default(),
        id,
    }
}

fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn single_letter(text: &str) -> Option<String> {
    let mut chars = text.trim().chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_alphabetic() => Some(c.to_ascii_lowercase().to_string()),
        _ => None,
    }
}

/// Per-file counts for `stats`.
#[derive(Debug, Clone)]
pub struct ChapterSummary {
    pub file_name: String,
    pub book_name: String,
    pub chapter_title: String,
    pub question_count: usize,
    /// (1-based position, question text) of every question with fewer than two options.
    pub non_mcq: Vec<(usize, String)>,
    pub duplicate_numbers: Vec<String>,
}

/// The corpus directory plus the alias registry used to find files in it.
#[derive(Debug, Clone)]
pub struct CorpusStore {
    dir: PathBuf,
    registry: SlugAliasRegistry,
}

impl CorpusStore {
    pub fn new(dir: impl Into<PathBuf>, registry: SlugAliasRegistry) -> Self {
        Self {
            dir: dir.into(),
            registry,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn registry(&self) -> &SlugAliasRegistry {
        &self.registry
    }

    /// All corpus files, sorted by name. A missing directory is an empty corpus.
    pub fn list_files(&self) -> Result<Vec<PathBuf>> {
        if !self.dir.exists() {
            debug!("Corpus directory {} does not exist", self.dir.display());
            return Ok(Vec::new());
        }

        let entries = fs::read_dir(&self.dir).map_err(|e| CorpusError::io(&self.dir, e))?;
        let mut files: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "json"))
            .collect();
        files.sort();
        Ok(files)
    }

    pub fn read(&self, path: &Path) -> Result<CorpusFile> {
        let content = fs::read_to_string(path).map_err(|e| CorpusError::io(path, e))?;
        CorpusFile::from_json(&content, path)
    }

    /// Where a freshly extracted chapter is written.
    pub fn file_for(&self, book: &BookIdentity, chapter: &ChapterIdentity) -> PathBuf {
        self.dir
            .join(format!("{}-{}.json", book.slug_prefix, chapter.slug))
    }

    /// Find the file holding a chapter, tolerating loose book slugs,
    /// chapter aliases and spelling variants.
    pub fn resolve_file(
        &self,
        subject: Option<&str>,
        book_slug: &str,
        chapter_slug: &str,
    ) -> Option<PathBuf> {
        let book = book_slug.trim().to_lowercase();
        let prefix = match subject {
            Some(subject) => self.registry.resolve_book_slug(Some(subject), &book),
            None => self.registry.book_prefix(&book),
        };

        let raw_chapter = chapter_slug.trim().to_lowercase();
        let mut chapter = self.registry.resolve_slug(&prefix, &raw_chapter);
        if chapter == raw_chapter {
            chapter = self.registry.resolve_slug(&book, &raw_chapter);
        }

        if chapter.is_empty() {
            let path = self.dir.join(format!("{prefix}.json"));
            return path.exists().then_some(path);
        }

        let mut prefixes = vec![prefix.clone()];
        prefixes.extend(self.registry.alternative_prefixes(&book, &prefix));
        for candidate in &prefixes {
            let path = self.dir.join(format!("{candidate}-{chapter}.json"));
            if path.exists() {
                debug!("Resolved {}/{} to {}", book, chapter, path.display());
                return Some(path);
            }
        }

        let wanted = fold_spelling(&chapter);
        let files = self.list_files().ok()?;
        let found = files.into_iter().find(|path| {
            path.file_stem()
                .and_then(|s| s.to_str())
                .map(|stem| stem_matches_chapter(&fold_spelling(&stem.to_lowercase()), &wanted))
                .unwrap_or(false)
        });
        if let Some(path) = &found {
            debug!("Resolved {}/{} by filename scan to {}", book, chapter, path.display());
        }
        found
    }

    /// Read the corpus file for a book and chapter slug.
    pub fn read_chapter(
        &self,
        subject: Option<&str>,
        book_slug: &str,
        chapter_slug: &str,
    ) -> Result<(PathBuf, CorpusFile)> {
        let path = self
            .resolve_file(subject, book_slug, chapter_slug)
            .ok_or_else(|| CorpusError::ChapterNotFound {
                book: book_slug.to_string(),
                chapter: chapter_slug.to_string(),
            })?;
        let file = self.read(&path)?;
        Ok((path, file))
    }

    /// Append questions to the chapter's corpus file, creating it if needed.
    ///
    /// Not safe against concurrent writers to the same file: two appends
    /// racing on one chapter can lose questions. Callers must serialise
    /// writes per file.
    pub fn append(
        &self,
        book: &BookIdentity,
        chapter: &ChapterIdentity,
        questions: &[ExtractedQuestion],
    ) -> Result<AppendOutcome> {
        writer::append(&self.file_for(book, chapter), CorpusFile::new(book, chapter), questions)
    }

    /// Append to an already resolved file, keeping its header.
    pub fn append_to(
        &self,
        path: &Path,
        fresh: CorpusFile,
        questions: &[ExtractedQuestion],
    ) -> Result<AppendOutcome> {
        writer::append(path, fresh, questions)
    }

    /// One summary per readable corpus file; unreadable files are logged and skipped.
    pub fn summaries(&self) -> Result<Vec<ChapterSummary>> {
        let mut summaries = Vec::new();
        for path in self.list_files()? {
            let file = match self.read(&path) {
                Ok(file) => file,
                Err(e) => {
                    warn!("Skipping {}: {}", path.display(), e);
                    continue;
                }
            };

            let non_mcq = file
                .questions
                .iter()
                .enumerate()
                .filter(|(_, q)| !q.is_mcq())
                .map(|(i, q)| (i + 1, q.question.clone()))
                .collect();

            summaries.push(ChapterSummary {
                file_name: file_name(&path),
                book_name: file.book_name.clone(),
                chapter_title: file.chapter_title.clone(),
                question_count: file.questions.len(),
                duplicate_numbers: file.duplicate_numbers(),
                non_mcq,
            });
        }
        Ok(summaries)
    }
}

pub(crate) fn stem_matches_chapter(stem: &str, chapter: &str) -> bool {
    stem == chapter
        || stem.ends_with(&format!("-{chapter}"))
        || stem.contains(&format!("-{chapter}-"))
}

pub(crate) fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    fn store(dir: &Path) -> CorpusStore {
        CorpusStore::new(dir, SlugAliasRegistry::builtin())
    }

    const CANONICAL: &str = r#"{
        "book_name": "IC Joshi",
        "chapter_number": "3",
        "chapter_title": "Atmosphere",
        "chapter_slug": "atmosphere",
        "source": "ic-joshi",
        "questions": [
            {"question_number": "1", "question": "What is X?", "question_type": "MCQ",
             "options": ["(a) Foo", "(b) Bar"], "answer": "b", "solution": "(b) Bar", "explanation": ""}
        ]
    }"#;

    #[test]
    fn test_canonical_file_parses() {
        let file = CorpusFile::from_json(CANONICAL, Path::new("x.json")).unwrap();
        assert_eq!(file.book_name, "IC Joshi");
        assert_eq!(file.questions.len(), 1);
        assert_eq!(file.questions[0].answer_letter(), Some('b'));
        assert_eq!(file.questions[0].id, None);
    }

    #[test]
    fn test_adapter_accepts_field_variants() {
        let content = r#"{
            "book_name": "Oxford", "chapter_number": 7, "chapter_title": "Air Law",
            "questions": [
                {"id": 42, "question_text": "Variant one?", "options": ["(a) A", "(b) B"], "solution": "B"},
                {"text": "Variant two?", "question_number": 9, "answer": "C ", "options": ["(a) A", 3]},
                {"question": "Variant three?"}
            ]
        }"#;
        let file = CorpusFile::from_json(content, Path::new("x.json")).unwrap();
        assert_eq!(file.chapter_number, "7");
        assert_eq!(file.chapter_slug, "");

        let first = &file.questions[0];
        assert_eq!(first.question, "Variant one?");
        assert_eq!(first.question_number, "42");
        assert_eq!(first.id.as_deref(), Some("42"));
        assert_eq!(first.answer, "b");
        assert_eq!(first.question_type, MCQ);

        let second = &file.questions[1];
        assert_eq!(second.question, "Variant two?");
        assert_eq!(second.question_number, "9");
        assert_eq!(second.answer, "c");
        assert_eq!(second.options, vec!["(a) A", "3"]);

        let third = &file.questions[2];
        assert_eq!(third.question_number, "3");
        assert_eq!(third.question_type, NON_MCQ);
        assert!(third.answer.is_empty());
    }

    #[test]
    fn test_missing_questions_array_is_error() {
        let err = CorpusFile::from_json(r#"{"book_name": "x"}"#, Path::new("x.json")).unwrap_err();
        assert!(matches!(err, CorpusError::MissingQuestions { .. }));
        let err = CorpusFile::from_json("not json", Path::new("x.json")).unwrap_err();
        assert!(matches!(err, CorpusError::Parse { .. }));
    }

    #[test]
    fn test_duplicate_numbers() {
        let content = r#"{"questions": [
            {"question_number": "1", "question": "a"},
            {"question_number": "2", "question": "b"},
            {"question_number": "1", "question": "c"},
            {"question_number": "1", "question": "d"}
        ]}"#;
        let file = CorpusFile::from_json(content, Path::new("x.json")).unwrap();
        assert_eq!(file.duplicate_numbers(), vec!["1"]);
    }

    #[test]
    fn test_list_files_sorted_json_only() {
        let dir = tempdir().unwrap();
        write(dir.path(), "b.json", CANONICAL);
        write(dir.path(), "a.json", CANONICAL);
        write(dir.path(), "notes.txt", "x");
        let files = store(dir.path()).list_files().unwrap();
        let names: Vec<String> = files.iter().map(|p| file_name(p)).collect();
        assert_eq!(names, vec!["a.json", "b.json"]);
    }

    #[test]
    fn test_list_files_missing_dir_is_empty() {
        let dir = tempdir().unwrap();
        let store = store(&dir.path().join("nope"));
        assert!(store.list_files().unwrap().is_empty());
    }

    #[test]
    fn test_resolve_direct_and_loose_prefix() {
        let dir = tempdir().unwrap();
        let direct = write(dir.path(), "ic-joshi-atmosphere.json", CANONICAL);
        let oxford = write(dir.path(), "oxford-air-law.json", CANONICAL);
        let store = store(dir.path());

        assert_eq!(store.resolve_file(None, "ic-joshi", "atmosphere"), Some(direct));
        assert_eq!(store.resolve_file(None, "cae-oxford", "air-law"), Some(oxford));
        assert_eq!(store.resolve_file(None, "ic-joshi", "nonexistent"), None);
    }

    #[test]
    fn test_resolve_chapter_override() {
        let dir = tempdir().unwrap();
        let merged = write(dir.path(), "ic-joshi-cat-and-mountain-waves.json", CANONICAL);
        let store = store(dir.path());
        assert_eq!(store.resolve_file(None, "ic-joshi", "mountain-waves"), Some(merged));
    }

    #[test]
    fn test_resolve_alternative_prefixes() {
        let dir = tempdir().unwrap();
        let legacy = write(dir.path(), "cae-oxford-meteorology-basics.json", CANONICAL);
        let perf = write(dir.path(), "performance-take-off.json", CANONICAL);
        let store = store(dir.path());

        assert_eq!(store.resolve_file(None, "cae-oxford", "meteorology-basics"), Some(legacy));
        assert_eq!(
            store.resolve_file(None, "mass-and-balance", "take-off"),
            Some(perf)
        );
    }

    #[test]
    fn test_resolve_subject_context() {
        let dir = tempdir().unwrap();
        let met = write(dir.path(), "cae-oxford-winds.json", CANONICAL);
        let store = store(dir.path());
        assert_eq!(store.resolve_file(Some("meteorology"), "cae-oxford", "winds"), Some(met));
    }

    #[test]
    fn test_resolve_by_scan_with_spelling_variants() {
        let dir = tempdir().unwrap();
        let file = write(
            dir.path(),
            "rk-bali-international-organisations.json",
            CANONICAL,
        );
        let store = store(dir.path());
        assert_eq!(
            store.resolve_file(None, "air-regulations", "international-organizations"),
            Some(file)
        );
    }

    #[test]
    fn test_read_chapter_not_found() {
        let dir = tempdir().unwrap();
        let err = store(dir.path())
            .read_chapter(None, "ic-joshi", "missing")
            .unwrap_err();
        assert!(matches!(err, CorpusError::ChapterNotFound { .. }));
    }

    #[test]
    fn test_summaries_skip_unreadable() {
        let dir = tempdir().unwrap();
        write(dir.path(), "a.json", CANONICAL);
        write(dir.path(), "broken.json", "{");
        let summaries = store(dir.path()).summaries().unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].question_count, 1);
        assert!(summaries[0].non_mcq.is_empty());
    }

    #[test]
    fn test_questions_from_json_shapes() {
        let path = Path::new("new.json");

        let array = r#"[{"question_text": "What is A?", "options": ["(a) x", "(b) y"], "answer": "A"},
                        {"text": "What is B?", "question_number": 7}]"#;
        let questions = questions_from_json(array, path).unwrap();
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].question_number, "1");
        assert_eq!(questions[0].answer, "a");
        assert_eq!(questions[1].question_number, "7");
        assert_eq!(questions[1].question_type, NON_MCQ);

        let single = r#"{"question": "What is C?", "solution": "c"}"#;
        let questions = questions_from_json(single, path).unwrap();
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].answer, "c");

        assert_eq!(questions_from_json(CANONICAL, path).unwrap().len(), 1);
        assert!(questions_from_json("42", path).is_err());
    }
}
