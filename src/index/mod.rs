//! Searchable index over the whole corpus.
//!
//! [`CorpusIndex`] is a pure function of the corpus directory at scan time.
//! [`IndexService`] owns the current snapshot: a rebuild scans into a fresh
//! index without holding any lock and then swaps it in, so readers see
//! either the old snapshot or the new one. Concurrent rebuilds are allowed;
//! the last one to finish wins.

pub mod terms;

use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::{Arc, RwLock};
use tracing::{info, warn};

use crate::corpus::{CorpusFile, CorpusStore, file_name};
use crate::error::Result;
use crate::identity::normalize_slug;

#[derive(Debug, Clone, Serialize)]
pub struct Topic {
    pub id: String,
    pub title: String,
    pub aliases: Vec<String>,
    pub book_id: String,
    pub chapter_id: String,
    pub category: String,
    pub file_name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Definition {
    pub id: String,
    pub term: String,
    pub simple_explanation: String,
    pub detailed_explanation: String,
    pub examples: Vec<String>,
    pub book_id: String,
    pub chapter_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuestionRecord {
    pub id: String,
    pub question: String,
    pub answer: String,
    pub explanation: String,
    pub options: Vec<String>,
    pub book_id: String,
    pub chapter_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChapterEntry {
    pub id: String,
    pub book_id: String,
    pub name: String,
    pub file_name: String,
    pub question_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct BookEntry {
    pub id: String,
    pub name: String,
    pub subject: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CorpusIndex {
    pub topics: Vec<Topic>,
    pub definitions: Vec<Definition>,
    pub questions: Vec<QuestionRecord>,
    pub chapters: Vec<ChapterEntry>,
    pub books: Vec<BookEntry>,
}

/// Matches from [`CorpusIndex::search`].
#[derive(Debug, Default)]
pub struct SearchResults<'a> {
    pub topics: Vec<&'a Topic>,
    pub definitions: Vec<&'a Definition>,
    pub questions: Vec<&'a QuestionRecord>,
}

impl SearchResults<'_> {
    pub fn is_empty(&self) -> bool {
        self.topics.is_empty() && self.definitions.is_empty() && self.questions.is_empty()
    }
}

impl CorpusIndex {
    /// Scan every corpus file, in filename order. Unreadable files are skipped.
    pub fn build(store: &CorpusStore) -> Result<Self> {
        let mut builder = IndexBuilder::default();
        for path in store.list_files()? {
            match store.read(&path) {
                Ok(file) => builder.add_file(&path, &file),
                Err(e) => warn!("Skipping {} while indexing: {}", path.display(), e),
            }
        }

        let index = builder.index;
        info!(
            "Indexed {} chapters: {} topics, {} definitions, {} questions",
            index.chapters.len(),
            index.topics.len(),
            index.definitions.len(),
            index.questions.len()
        );
        Ok(index)
    }

    /// Case-insensitive substring search over titles, aliases, terms and question text.
    pub fn search(&self, text: &str) -> SearchResults<'_> {
        let needle = text.trim().to_lowercase();
        if needle.is_empty() {
            return SearchResults::default();
        }
        let hit = |s: &str| s.to_lowercase().contains(&needle);

        SearchResults {
            topics: self
                .topics
                .iter()
                .filter(|t| hit(&t.title) || t.aliases.iter().any(|a| hit(a)))
                .collect(),
            definitions: self.definitions.iter().filter(|d| hit(&d.term)).collect(),
            questions: self.questions.iter().filter(|q| hit(&q.question)).collect(),
        }
    }
}

#[derive(Default)]
struct IndexBuilder {
    index: CorpusIndex,
    definition_by_term: HashMap<&'static str, usize>,
    seen_books: HashSet<String>,
}

impl IndexBuilder {
    fn add_file(&mut self, path: &Path, file: &CorpusFile) {
        let book_name = non_empty_or(&file.book_name, "Unknown Book");
        let chapter_title = non_empty_or(&file.chapter_title, "Unknown Chapter");
        let book_id = book_id(book_name);
        let chapter_id = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        let file_name = file_name(path);

        if self.seen_books.insert(book_name.to_string()) {
            self.index.books.push(BookEntry {
                id: book_id.clone(),
                name: book_name.to_string(),
                subject: terms::subject(book_name).to_string(),
            });
        }

        self.index.chapters.push(ChapterEntry {
            id: chapter_id.clone(),
            book_id: book_id.clone(),
            name: chapter_title.to_string(),
            file_name: file_name.clone(),
            question_count: file.questions.len(),
        });

        let mut aliases = vec![chapter_title.to_lowercase()];
        aliases.extend(terms::extract_terms(chapter_title).into_iter().map(String::from));
        self.index.topics.push(Topic {
            id: format!("topic-{chapter_id}"),
            title: chapter_title.to_string(),
            aliases,
            book_id: book_id.clone(),
            chapter_id: chapter_id.clone(),
            category: terms::category(book_name, chapter_title).to_string(),
            file_name,
        });

        for (i, q) in file.questions.iter().enumerate() {
            let answer_text = if q.solution.is_empty() { &q.answer } else { &q.solution };

            self.index.questions.push(QuestionRecord {
                id: format!("{chapter_id}-q{}", i + 1),
                question: q.question.clone(),
                answer: answer_text.clone(),
                explanation: q.explanation.clone(),
                options: q.options.clone(),
                book_id: book_id.clone(),
                chapter_id: chapter_id.clone(),
            });

            let searchable = format!("{} {}", q.question, answer_text);
            for term in terms::extract_terms(&searchable) {
                match self.definition_by_term.get(term) {
                    Some(&pos) => {
                        let examples = &mut self.index.definitions[pos].examples;
                        if !examples.contains(&q.question) {
                            examples.push(q.question.clone());
                        }
                    }
                    None => {
                        self.definition_by_term
                            .insert(term, self.index.definitions.len());
                        let detailed = if answer_text.is_empty() {
                            format!("Related to {chapter_title}. See practice questions for details.")
                        } else {
                            answer_text.clone()
                        };
                        self.index.definitions.push(Definition {
                            id: format!("definition-{}", normalize_slug(term)),
                            term: term.to_string(),
                            simple_explanation: format!(
                                "Definition extracted from {chapter_title} chapter."
                            ),
                            detailed_explanation: detailed,
                            examples: vec![q.question.clone()],
                            book_id: book_id.clone(),
                            chapter_id: chapter_id.clone(),
                        });
                    }
                }
            }
        }
    }
}

/// Whitespace runs become `-` and the rest is lowercased as is; underscores
/// and punctuation survive, so ids stay stable for existing consumers.
fn book_id(book_name: &str) -> String {
    let joined = book_name.split_whitespace().collect::<Vec<_>>().join("-");
    format!("practice-book-{}", joined.to_lowercase())
}

fn non_empty_or<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.trim().is_empty() { fallback } else { value }
}

/// Owns the current index snapshot for the lifetime of the process.
pub struct IndexService {
    store: CorpusStore,
    current: RwLock<Arc<CorpusIndex>>,
}

impl IndexService {
    /// Scan the corpus once and keep the result.
    pub fn build(store: CorpusStore) -> Result<Self> {
        let index = CorpusIndex::build(&store)?;
        Ok(Self {
            store,
            current: RwLock::new(Arc::new(index)),
        })
    }

    /// Re-scan the corpus and swap the new snapshot in. Readers holding the
    /// previous snapshot keep it until they drop it.
    pub fn rebuild(&self) -> Result<Arc<CorpusIndex>> {
        let fresh = Arc::new(CorpusIndex::build(&self.store)?);
        let mut current = self.current.write().unwrap_or_else(|e| e.into_inner());
        *current = Arc::clone(&fresh);
        Ok(fresh)
    }

    pub fn get(&self) -> Arc<CorpusIndex> {
        let current = self.current.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&current)
    }
}
