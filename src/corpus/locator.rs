//! Find one question from a loosely structured identifier.
//!
//! Identifiers come from links and chat transcripts and rarely agree on a
//! format. The locator runs a fixed sequence of tiers and the first hit
//! wins. Tiers 1-5 need both a book and a chapter hint; later tiers widen
//! the search until every corpus file has been scanned. A miss is
//! [`LocateOutcome::NotFound`], never an error.

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::{CorpusFile, CorpusStore, stem_matches_chapter};
use crate::extract::ExtractedQuestion;
use crate::extract::strategy::{Strategy, first_success};
use crate::identity::slug::fold_spelling;

static PREFIXED_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^question-(.+-.+)-(\d+)$").expect("valid prefixed id regex"));
static SCOPED_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(.+?)-(q)?(\d+)$").expect("valid scoped id regex"));
static BARE_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d+)$").expect("valid bare id regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocatorTier {
    HintedId,
    HintedNumber,
    HintedNumericSuffix,
    HintedParsedId,
    HintedPosition,
    ChapterSearch,
    ParsedIdFile,
    FullScan,
}

impl LocatorTier {
    pub fn description(&self) -> &'static str {
        match self {
            LocatorTier::HintedId => "exact id in hinted file",
            LocatorTier::HintedNumber => "exact question number in hinted file",
            LocatorTier::HintedNumericSuffix => "numeric suffix in hinted file",
            LocatorTier::HintedParsedId => "parsed identifier position in hinted file",
            LocatorTier::HintedPosition => "1-based position in hinted file",
            LocatorTier::ChapterSearch => "chapter slug search",
            LocatorTier::ParsedIdFile => "file named by the identifier",
            LocatorTier::FullScan => "full corpus scan",
        }
    }
}

impl fmt::Display for LocatorTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let number = match self {
            LocatorTier::HintedId => "1",
            LocatorTier::HintedNumber => "2",
            LocatorTier::HintedNumericSuffix => "3",
            LocatorTier::HintedParsedId => "4",
            LocatorTier::HintedPosition => "5",
            LocatorTier::ChapterSearch => "6",
            LocatorTier::ParsedIdFile => "6b",
            LocatorTier::FullScan => "7",
        };
        write!(f, "Tier {} ({})", number, self.description())
    }
}

#[derive(Debug, Clone)]
pub struct LocatedQuestion {
    pub file_path: PathBuf,
    pub question: ExtractedQuestion,
    /// 0-based position within the file.
    pub index: usize,
    pub tier: LocatorTier,
}

#[derive(Debug, Clone)]
pub enum LocateOutcome {
    Found(LocatedQuestion),
    NotFound,
}

impl LocateOutcome {
    pub fn found(self) -> Option<LocatedQuestion> {
        match self {
            LocateOutcome::Found(located) => Some(located),
            LocateOutcome::NotFound => None,
        }
    }
}

/// Structure recovered from a question identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedQuestionId {
    /// `question-{book}-{chapter}-{n}`; `scope` is `{book}-{chapter}`.
    Prefixed { scope: String, number: usize },
    /// `{book}-{chapter}-q{n}`, `{book}-{chapter}-{n}` or `{chapter}-q{n}`.
    Scoped {
        scope: String,
        number: usize,
        q_marked: bool,
    },
    Bare(usize),
}

impl ParsedQuestionId {
    fn number(&self) -> usize {
        match self {
            ParsedQuestionId::Prefixed { number, .. }
            | ParsedQuestionId::Scoped { number, .. }
            | ParsedQuestionId::Bare(number) => *number,
        }
    }

    /// `{book}-{chapter}` part, when the identifier names both.
    fn book_and_chapter(&self) -> Option<&str> {
        match self {
            ParsedQuestionId::Prefixed { scope, .. } => Some(scope),
            ParsedQuestionId::Scoped { scope, .. } if scope.contains('-') => Some(scope),
            _ => None,
        }
    }
}

pub fn parse_question_id(question_id: &str) -> Option<ParsedQuestionId> {
    let id = question_id.trim();

    if let Some(caps) = PREFIXED_ID.captures(id) {
        return Some(ParsedQuestionId::Prefixed {
            scope: caps[1].to_string(),
            number: caps[2].parse().ok()?,
        });
    }
    if let Some(caps) = BARE_ID.captures(id) {
        return Some(ParsedQuestionId::Bare(caps[1].parse().ok()?));
    }
    if let Some(caps) = SCOPED_ID.captures(id) {
        return Some(ParsedQuestionId::Scoped {
            scope: caps[1].to_string(),
            number: caps[3].parse().ok()?,
            q_marked: caps.get(2).is_some(),
        });
    }
    None
}

/// Everything a tier needs, loaded once per lookup.
struct LocateContext<'a> {
    store: &'a CorpusStore,
    question_id: String,
    numeric_id: String,
    parsed: Option<ParsedQuestionId>,
    book: Option<String>,
    chapter: Option<String>,
    hinted: Option<(PathBuf, CorpusFile)>,
}

type Tiers<'a> = [Strategy<LocateContext<'a>, LocatedQuestion>; 8];

fn tiers<'a>() -> Tiers<'a> {
    [
        Strategy {
            name: "hinted-id",
            run: hinted_id,
        },
        Strategy {
            name: "hinted-number",
            run: hinted_number,
        },
        Strategy {
            name: "hinted-numeric-suffix",
            run: hinted_numeric_suffix,
        },
        Strategy {
            name: "hinted-parsed-id",
            run: hinted_parsed_id,
        },
        Strategy {
            name: "hinted-position",
            run: hinted_position,
        },
        Strategy {
            name: "chapter-search",
            run: chapter_search,
        },
        Strategy {
            name: "parsed-id-file",
            run: parsed_id_file,
        },
        Strategy {
            name: "full-scan",
            run: full_scan,
        },
    ]
}

/// Read-only lookups against a corpus directory. Safe to share across threads.
pub struct QuestionLocator<'a> {
    store: &'a CorpusStore,
}

impl<'a> QuestionLocator<'a> {
    pub fn new(store: &'a CorpusStore) -> Self {
        Self { store }
    }

    pub fn locate(
        &self,
        question_id: &str,
        book_hint: Option<&str>,
        chapter_hint: Option<&str>,
    ) -> LocateOutcome {
        let question_id = question_id.trim().to_string();
        if question_id.is_empty() {
            return LocateOutcome::NotFound;
        }

        let book = non_empty(book_hint);
        let chapter = non_empty(chapter_hint);
        let hinted = match (&book, &chapter) {
            (Some(book), Some(chapter)) => self
                .store
                .resolve_file(None, book, chapter)
                .and_then(|path| read_logged(self.store, &path).map(|file| (path, file))),
            _ => None,
        };

        let context = LocateContext {
            store: self.store,
            numeric_id: numeric_suffix(&question_id),
            parsed: parse_question_id(&question_id),
            question_id,
            book,
            chapter,
            hinted,
        };

        match first_success(&tiers(), &context) {
            Some((name, located)) => {
                debug!(
                    "Located {} via {} in {} at {}",
                    context.question_id,
                    name,
                    located.file_path.display(),
                    located.index
                );
                LocateOutcome::Found(located)
            }
            None => {
                debug!("Question {} not found", context.question_id);
                LocateOutcome::NotFound
            }
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(|v| v.trim().to_lowercase())
        .filter(|v| !v.is_empty())
}

/// `q23` and `Q-23` both become `23`.
fn numeric_suffix(question_id: &str) -> String {
    let without_q = question_id
        .strip_prefix(['q', 'Q'])
        .unwrap_or(question_id);
    without_q.chars().filter(|c| c.is_ascii_digit()).collect()
}

fn read_logged(store: &CorpusStore, path: &Path) -> Option<CorpusFile> {
    match store.read(path) {
        Ok(file) => Some(file),
        Err(e) => {
            warn!("Skipping {}: {}", path.display(), e);
            None
        }
    }
}

fn found(path: &Path, file: &CorpusFile, index: usize, tier: LocatorTier) -> Option<LocatedQuestion> {
    file.questions.get(index).map(|question| LocatedQuestion {
        file_path: path.to_path_buf(),
        question: question.clone(),
        index,
        tier,
    })
}

fn find_in(
    path: &Path,
    file: &CorpusFile,
    tier: LocatorTier,
    matches: impl Fn(&ExtractedQuestion) -> bool,
) -> Option<LocatedQuestion> {
    let index = file.questions.iter().position(matches)?;
    found(path, file, index, tier)
}

fn id_matches(q: &ExtractedQuestion, question_id: &str) -> bool {
    q.id.as_deref().is_some_and(|id| id == question_id)
}

fn hinted_id(ctx: &LocateContext<'_>) -> Option<LocatedQuestion> {
    let (path, file) = ctx.hinted.as_ref()?;
    find_in(path, file, LocatorTier::HintedId, |q| id_matches(q, &ctx.question_id))
}

fn hinted_number(ctx: &LocateContext<'_>) -> Option<LocatedQuestion> {
    let (path, file) = ctx.hinted.as_ref()?;
    find_in(path, file, LocatorTier::HintedNumber, |q| {
        q.question_number == ctx.question_id
    })
}

fn hinted_numeric_suffix(ctx: &LocateContext<'_>) -> Option<LocatedQuestion> {
    let (path, file) = ctx.hinted.as_ref()?;
    if ctx.numeric_id.is_empty() {
        return None;
    }
    find_in(path, file, LocatorTier::HintedNumericSuffix, |q| {
        q.question_number == ctx.numeric_id
    })
}

fn hinted_parsed_id(ctx: &LocateContext<'_>) -> Option<LocatedQuestion> {
    let (path, file) = ctx.hinted.as_ref()?;
    match ctx.parsed.as_ref()? {
        ParsedQuestionId::Bare(_) => None,
        parsed => found(path, file, parsed.number().checked_sub(1)?, LocatorTier::HintedParsedId),
    }
}

fn hinted_position(ctx: &LocateContext<'_>) -> Option<LocatedQuestion> {
    let (path, file) = ctx.hinted.as_ref()?;
    match ctx.parsed.as_ref()? {
        ParsedQuestionId::Bare(n) => found(path, file, n.checked_sub(1)?, LocatorTier::HintedPosition),
        _ => None,
    }
}

fn chapter_search(ctx: &LocateContext<'_>) -> Option<LocatedQuestion> {
    let chapter = match (&ctx.book, &ctx.chapter, &ctx.parsed) {
        (None, Some(chapter), _) => chapter.clone(),
        (
            _,
            _,
            Some(ParsedQuestionId::Scoped {
                scope,
                q_marked: true,
                ..
            }),
        ) => scope.to_lowercase(),
        _ => return None,
    };
    let wanted = fold_spelling(&chapter);

    let files = ctx.store.list_files().ok()?;
    for path in files {
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        let stem = fold_spelling(&stem.to_lowercase());
        if !(stem_matches_chapter(&stem, &wanted) || stem.contains(&wanted)) {
            continue;
        }
        let Some(file) = read_logged(ctx.store, &path) else {
            continue;
        };
        let hit = find_in(&path, &file, LocatorTier::ChapterSearch, |q| {
            id_matches(q, &ctx.question_id)
                || q.question_number == ctx.question_id
                || (!ctx.numeric_id.is_empty() && q.question_number == ctx.numeric_id)
        });
        if hit.is_some() {
            return hit;
        }
    }
    None
}

/// The identifier names its own file; try each `{book}-{chapter}` split.
fn parsed_id_file(ctx: &LocateContext<'_>) -> Option<LocatedQuestion> {
    let parsed = ctx.parsed.as_ref()?;
    let scope = parsed.book_and_chapter()?.to_lowercase();
    let number = parsed.number();

    let path = scope
        .match_indices('-')
        .map(|(i, _)| (&scope[..i], &scope[i + 1..]))
        .filter(|(book, chapter)| !book.is_empty() && !chapter.is_empty())
        .find_map(|(book, chapter)| ctx.store.resolve_file(None, book, chapter))?;
    let file = read_logged(ctx.store, &path)?;

    let wanted = number.to_string();
    find_in(&path, &file, LocatorTier::ParsedIdFile, |q| {
        q.question_number == wanted || id_matches(q, &ctx.question_id)
    })
    .or_else(|| found(&path, &file, number.checked_sub(1)?, LocatorTier::ParsedIdFile))
}

fn full_scan(ctx: &LocateContext<'_>) -> Option<LocatedQuestion> {
    let files = ctx.store.list_files().ok()?;
    for path in files {
        let Some(file) = read_logged(ctx.store, &path) else {
            continue;
        };
        let hit = find_in(&path, &file, LocatorTier::FullScan, |q| {
            id_matches(q, &ctx.question_id)
                || q.question_number == ctx.question_id
                || (!ctx.numeric_id.is_empty() && q.question_number == ctx.numeric_id)
        });
        if hit.is_some() {
            return hit;
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::SlugAliasRegistry;
    use serde_json::json;
    use std::fs;
    use tempfile::{TempDir, tempdir};

    fn write_chapter(dir: &Path, name: &str, questions: serde_json::Value) {
        let content = json!({
            "book_name": "MET_IC_Joshi_7 Edition",
            "chapter_number": "1",
            "chapter_title": "Atmosphere",
            "chapter_slug": "atmosphere",
            "source": "ic-joshi",
            "questions": questions,
        });
        fs::write(dir.join(name), content.to_string()).unwrap();
    }

    fn numbered(numbers: &[&str]) -> serde_json::Value {
        serde_json::Value::Array(
            numbers
                .iter()
                .map(|n| json!({"question_number": n, "question": format!("Question {n}?")}))
                .collect(),
        )
    }

    fn corpus() -> (TempDir, CorpusStore) {
        let dir = tempdir().unwrap();
        let store = CorpusStore::new(dir.path(), SlugAliasRegistry::builtin());
        (dir, store)
    }

    #[test]
    fn test_parse_question_id_formats() {
        assert_eq!(
            parse_question_id("question-ic-joshi-atmosphere-3"),
            Some(ParsedQuestionId::Prefixed {
                scope: "ic-joshi-atmosphere".into(),
                number: 3
            })
        );
        assert_eq!(
            parse_question_id("aerodrome-met-reports-q23"),
            Some(ParsedQuestionId::Scoped {
                scope: "aerodrome-met-reports".into(),
                number: 23,
                q_marked: true
            })
        );
        assert_eq!(
            parse_question_id("ic-joshi-atmosphere-7"),
            Some(ParsedQuestionId::Scoped {
                scope: "ic-joshi-atmosphere".into(),
                number: 7,
                q_marked: false
            })
        );
        assert_eq!(parse_question_id(" 12 "), Some(ParsedQuestionId::Bare(12)));
        assert_eq!(parse_question_id("abc"), None);
    }

    #[test]
    fn test_numeric_suffix() {
        assert_eq!(numeric_suffix("q23"), "23");
        assert_eq!(numeric_suffix("Q-7"), "7");
        assert_eq!(numeric_suffix("abc"), "");
    }

    #[test]
    fn test_tier_two_exact_number_not_substring() {
        let (dir, store) = corpus();
        write_chapter(dir.path(), "ic-joshi-atmosphere.json", numbered(&["15", "5", "25"]));

        let located = QuestionLocator::new(&store)
            .locate("5", Some("ic-joshi"), Some("atmosphere"))
            .found()
            .unwrap();
        assert_eq!(located.index, 1);
        assert_eq!(located.tier, LocatorTier::HintedNumber);
    }

    #[test]
    fn test_tier_one_exact_id() {
        let (dir, store) = corpus();
        write_chapter(
            dir.path(),
            "ic-joshi-atmosphere.json",
            json!([
                {"question_number": "abc-1", "question": "First?"},
                {"id": "abc-1", "question_number": "2", "question": "Second?"}
            ]),
        );

        let located = QuestionLocator::new(&store)
            .locate("abc-1", Some("ic-joshi"), Some("atmosphere"))
            .found()
            .unwrap();
        assert_eq!(located.index, 1);
        assert_eq!(located.tier, LocatorTier::HintedId);
    }

    #[test]
    fn test_tier_three_numeric_suffix() {
        let (dir, store) = corpus();
        write_chapter(dir.path(), "ic-joshi-atmosphere.json", numbered(&["22", "23"]));

        let located = QuestionLocator::new(&store)
            .locate("q23", Some("ic-joshi"), Some("atmosphere"))
            .found()
            .unwrap();
        assert_eq!(located.index, 1);
        assert_eq!(located.tier, LocatorTier::HintedNumericSuffix);
    }

    #[test]
    fn test_tier_four_parsed_position() {
        let (dir, store) = corpus();
        write_chapter(dir.path(), "ic-joshi-atmosphere.json", numbered(&["a", "b", "c"]));

        let located = QuestionLocator::new(&store)
            .locate("question-x-y-3", Some("ic-joshi"), Some("atmosphere"))
            .found()
            .unwrap();
        assert_eq!(located.index, 2);
        assert_eq!(located.tier, LocatorTier::HintedParsedId);
    }

    #[test]
    fn test_tier_five_positional_fallback() {
        let (dir, store) = corpus();
        let numbers: Vec<String> = (11..=20).map(|n| n.to_string()).collect();
        let refs: Vec<&str> = numbers.iter().map(String::as_str).collect();
        write_chapter(dir.path(), "ic-joshi-atmosphere.json", numbered(&refs));

        let located = QuestionLocator::new(&store)
            .locate("5", Some("ic-joshi"), Some("atmosphere"))
            .found()
            .unwrap();
        assert_eq!(located.index, 4);
        assert_eq!(located.tier, LocatorTier::HintedPosition);
        assert_eq!(located.question.question_number, "15");
    }

    #[test]
    fn test_tier_six_chapter_hint_only() {
        let (dir, store) = corpus();
        write_chapter(dir.path(), "rk-bali-air-law.json", numbered(&["1", "2"]));
        write_chapter(dir.path(), "ic-joshi-atmosphere.json", numbered(&["1", "2"]));

        let located = QuestionLocator::new(&store)
            .locate("2", None, Some("atmosphere"))
            .found()
            .unwrap();
        assert!(located.file_path.ends_with("ic-joshi-atmosphere.json"));
        assert_eq!(located.tier, LocatorTier::ChapterSearch);
    }

    #[test]
    fn test_tier_six_chapter_only_identifier() {
        let (dir, store) = corpus();
        write_chapter(dir.path(), "oxford-aerodrome-met-reports.json", numbered(&["22", "23"]));

        let located = QuestionLocator::new(&store)
            .locate("aerodrome-met-reports-q23", None, None)
            .found()
            .unwrap();
        assert_eq!(located.index, 1);
        assert_eq!(located.tier, LocatorTier::ChapterSearch);
    }

    #[test]
    fn test_parsed_identifier_file() {
        let (dir, store) = corpus();
        write_chapter(dir.path(), "ic-joshi-atmosphere.json", numbered(&["x", "y", "z"]));
        write_chapter(dir.path(), "rk-bali-air-law.json", numbered(&["1", "2", "3"]));

        let located = QuestionLocator::new(&store)
            .locate("question-ic-joshi-atmosphere-2", None, None)
            .found()
            .unwrap();
        assert!(located.file_path.ends_with("ic-joshi-atmosphere.json"));
        assert_eq!(located.index, 1);
        assert_eq!(located.tier, LocatorTier::ParsedIdFile);
    }

    #[test]
    fn test_full_scan() {
        let (dir, store) = corpus();
        write_chapter(dir.path(), "a.json", numbered(&["1", "2"]));
        write_chapter(
            dir.path(),
            "b.json",
            json!([{"id": "pyq-2023-17", "question": "Session question?"}]),
        );

        let located = QuestionLocator::new(&store)
            .locate("pyq-2023-17", None, None)
            .found()
            .unwrap();
        assert!(located.file_path.ends_with("b.json"));
        assert_eq!(located.tier, LocatorTier::FullScan);
    }

    #[test]
    fn test_not_found() {
        let (dir, store) = corpus();
        write_chapter(dir.path(), "ic-joshi-atmosphere.json", numbered(&["1", "2"]));
        let locator = QuestionLocator::new(&store);

        assert!(matches!(
            locator.locate("nothing-here", Some("ic-joshi"), Some("atmosphere")),
            LocateOutcome::NotFound
        ));
        assert!(matches!(locator.locate("", None, None), LocateOutcome::NotFound));
        assert!(matches!(
            locator.locate("99", Some("ic-joshi"), Some("atmosphere")),
            LocateOutcome::NotFound
        ));
    }

    #[test]
    fn test_missing_corpus_dir_not_found() {
        let dir = tempdir().unwrap();
        let store = CorpusStore::new(dir.path().join("missing"), SlugAliasRegistry::builtin());
        assert!(matches!(
            QuestionLocator::new(&store).locate("5", Some("ic-joshi"), Some("atmosphere")),
            LocateOutcome::NotFound
        ));
    }
}
