//! Slug normalisation and alias resolution.
//!
//! Chapter and book slugs arrive from many hands: titles typed by editors,
//! legacy URLs, filenames produced by older extraction runs. All of the known
//! disagreements live in one [`SlugAliasRegistry`], built once at startup and
//! passed by reference to whatever needs to resolve a slug.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeMap, HashMap};

static PAREN_ACRONYM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\(([^)]+)\)").expect("valid acronym regex"));
static NON_ALNUM_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9]+").expect("valid separator regex"));

/// Turn a free-text title into a URL-safe slug.
///
/// A parenthesised acronym is kept as its own token: `"Air Traffic (ATC)"`
/// becomes `"air-traffic-atc"`.
pub fn normalize_slug(title: &str) -> String {
    let lowered = title.to_lowercase();
    let with_acronyms = PAREN_ACRONYM.replace_all(&lowered, |caps: &regex::Captures| {
        format!("-{}", caps[1].to_lowercase())
    });
    let hyphenated = NON_ALNUM_RUN.replace_all(&with_acronyms, "-");
    hyphenated.trim_matches('-').to_string()
}

/// British/American spelling pairs folded together when comparing filenames.
const SPELLING_VARIANTS: &[(&str, &str)] = &[
    ("organisation", "organization"),
    ("pressurisation", "pressurization"),
    ("licencing", "licensing"),
];

/// Fold known spelling variants to a single form so slugs compare equal.
pub fn fold_spelling(slug: &str) -> String {
    let mut folded = slug.to_string();
    for (british, american) in SPELLING_VARIANTS {
        folded = folded.replace(british, american);
    }
    folded
}

/// Book slug whose canonical prefix depends on the subject it is browsed under.
#[derive(Debug, Clone)]
struct SubjectRule {
    book_slug: String,
    subject_slug: String,
    prefix_for_subject: String,
    prefix_otherwise: String,
}

/// Every known slug inconsistency, in one place.
#[derive(Debug, Clone, Default)]
pub struct SlugAliasRegistry {
    /// book slug -> (raw chapter slug -> canonical chapter slug)
    chapter_overrides: HashMap<String, HashMap<String, String>>,
    /// loose book slug -> canonical file prefix
    book_prefixes: HashMap<String, String>,
    subject_rules: Vec<SubjectRule>,
    /// canonical prefix or loose slug -> other prefixes worth trying on disk
    fallback_prefixes: HashMap<String, Vec<String>>,
}

impl SlugAliasRegistry {
    /// Registry preloaded with the aliases the corpus is known to need.
    pub fn builtin() -> Self {
        let mut registry = Self::default();

        let chapter_overrides: &[(&str, &[(&str, &str)])] = &[
            (
                "ic-joshi",
                &[
                    ("clear-air-turbulence", "cat-and-mountain-waves"),
                    ("mountain-waves", "cat-and-mountain-waves"),
                ],
            ),
            (
                "operational-procedures",
                &[
                    ("cs-ops-general-requirements", "eu-ops-general-requirements"),
                    ("pressurisation-failure", "pressurization-failure"),
                ],
            ),
            (
                "rk-bali",
                &[
                    ("personnel-licensing", "personnel-licencing"),
                    ("airworthiness", "airworthiness-of-aircraft"),
                    (
                        "environmental-procedures-and-hazards-general-aspects",
                        "special-operational-procedures-and-hazards-general-aspects",
                    ),
                ],
            ),
        ];
        for (book, overrides) in chapter_overrides {
            for (raw, canonical) in overrides.iter() {
                registry.add_chapter_override(book, raw, canonical);
            }
        }

        let book_prefixes = [
            ("air-law", "oxford"),
            ("human-performance-and-limitations", "human-performance"),
            ("oxford", "oxford"),
            ("cae-oxford", "oxford"),
            ("rk-bali", "rk-bali"),
            ("ic-joshi", "ic-joshi"),
            ("general-navigation", "cae-oxford-general-navigation"),
            ("cae-oxford-general-navigation", "cae-oxford-general-navigation"),
            ("cae-oxford-flight-planning", "cae-oxford-flight-planning"),
            ("cae-oxford-flight-planning-monitoring", "cae-oxford-flight-planning"),
            ("cae-oxford-performance", "cae-oxford-performance"),
            ("cae-oxford-radio-navigation", "cae-oxford-radio-navigation"),
            ("cae-oxford-powerplant", "cae-oxford-powerplant"),
            ("powerplant", "cae-oxford-powerplant"),
            ("cae-oxford-principles-of-flight", "cae-oxford-principles-of-flight"),
            ("principles-of-flight", "cae-oxford-principles-of-flight"),
            ("cae-oxford-navigation", "cae-oxford-navigation"),
            ("operational-procedures", "operational-procedures"),
            ("instrument-2014", "instrument"),
            ("instrument", "instrument"),
            ("cae-oxford-meteorology", "cae-oxford"),
            ("cae-oxford-radio-telephony", "cae-oxford"),
            ("mass-and-balance-and-performance", "mass-and-balance-and-performance"),
            ("mass-and-balance", "mass-and-balance-and-performance"),
        ];
        for (loose, canonical) in book_prefixes {
            registry.add_book_prefix(loose, canonical);
        }

        registry.subject_rules.push(SubjectRule {
            book_slug: "cae-oxford".to_string(),
            subject_slug: "meteorology".to_string(),
            prefix_for_subject: "cae-oxford".to_string(),
            prefix_otherwise: "oxford".to_string(),
        });

        registry
            .fallback_prefixes
            .insert("cae-oxford".to_string(), vec!["cae-oxford".to_string()]);
        registry.fallback_prefixes.insert(
            "mass-and-balance-and-performance".to_string(),
            vec!["mass-and-balance".to_string(), "performance".to_string()],
        );

        registry
    }

    pub fn add_chapter_override(&mut self, book_slug: &str, raw: &str, canonical: &str) {
        self.chapter_overrides
            .entry(book_slug.to_lowercase())
            .or_default()
            .insert(raw.to_lowercase(), canonical.to_lowercase());
    }

    pub fn add_book_prefix(&mut self, loose: &str, canonical: &str) {
        self.book_prefixes
            .insert(loose.to_lowercase(), canonical.to_lowercase());
    }

    /// Merge user-supplied aliases over the current tables.
    pub fn extend(
        &mut self,
        chapters: &BTreeMap<String, BTreeMap<String, String>>,
        books: &BTreeMap<String, String>,
    ) {
        for (book, overrides) in chapters {
            for (raw, canonical) in overrides {
                self.add_chapter_override(book, raw, canonical);
            }
        }
        for (loose, canonical) in books {
            self.add_book_prefix(loose, canonical);
        }
    }

    /// Resolve a raw chapter slug to the one its corpus file is stored under.
    pub fn resolve_slug(&self, book_slug: &str, raw_slug: &str) -> String {
        let normalized = raw_slug.to_lowercase();
        self.chapter_overrides
            .get(&book_slug.to_lowercase())
            .and_then(|overrides| overrides.get(&normalized))
            .cloned()
            .unwrap_or(normalized)
    }

    /// Resolve a loose book slug to its file prefix, honouring subject context.
    pub fn resolve_book_slug(&self, subject_slug: Option<&str>, book_slug: &str) -> String {
        let book = book_slug.to_lowercase();
        if let Some(subject) = subject_slug {
            let subject = subject.to_lowercase();
            if let Some(rule) = self.subject_rules.iter().find(|r| r.book_slug == book) {
                return if rule.subject_slug == subject {
                    rule.prefix_for_subject.clone()
                } else {
                    rule.prefix_otherwise.clone()
                };
            }
        }
        self.book_prefix(&book)
    }

    /// Loose-to-canonical prefix lookup without subject context.
    pub fn book_prefix(&self, book_slug: &str) -> String {
        let book = book_slug.to_lowercase();
        self.book_prefixes.get(&book).cloned().unwrap_or(book)
    }

    /// Prefixes to try when `{prefix}-{chapter}.json` does not exist.
    pub fn alternative_prefixes(&self, book_slug: &str, prefix: &str) -> Vec<String> {
        let book = book_slug.to_lowercase();
        let mut alternatives: Vec<String> = Vec::new();
        for key in [book.as_str(), prefix] {
            if let Some(extra) = self.fallback_prefixes.get(key) {
                for candidate in extra {
                    if candidate != prefix && !alternatives.contains(candidate) {
                        alternatives.push(candidate.clone());
                    }
                }
            }
        }
        if book != prefix && !alternatives.contains(&book) {
            alternatives.push(book);
        }
        alternatives
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_basic() {
        assert_eq!(normalize_slug("Direction, Latitude and Longitude"), "direction-latitude-and-longitude");
        assert_eq!(normalize_slug("  The 1 in 60 Rule  "), "the-1-in-60-rule");
        assert_eq!(normalize_slug("Lambert's Conformal Chart - 2"), "lambert-s-conformal-chart-2");
    }

    #[test]
    fn test_normalize_keeps_acronym_token() {
        assert_eq!(normalize_slug("Clear Air Turbulence (CAT)"), "clear-air-turbulence-cat");
        assert_eq!(normalize_slug("Time (1)"), "time-1");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let inputs = [
            "Great Circles, Rhumb Lines & Directions on the Earth",
            "Airborne Collision Avoidance (ACAS) -- II",
            "---already-a-slug---",
            "",
            "Ünïcode Title (Ä)",
        ];
        for input in inputs {
            let once = normalize_slug(input);
            assert_eq!(normalize_slug(&once), once, "not idempotent for {:?}", input);
        }
    }

    #[test]
    fn test_resolve_slug_override() {
        let registry = SlugAliasRegistry::builtin();
        assert_eq!(registry.resolve_slug("ic-joshi", "Clear-Air-Turbulence"), "cat-and-mountain-waves");
        assert_eq!(registry.resolve_slug("ic-joshi", "mountain-waves"), "cat-and-mountain-waves");
        assert_eq!(registry.resolve_slug("rk-bali", "personnel-licensing"), "personnel-licencing");
    }

    #[test]
    fn test_resolve_slug_passthrough_is_lowercased() {
        let registry = SlugAliasRegistry::builtin();
        assert_eq!(registry.resolve_slug("ic-joshi", "Atmosphere"), "atmosphere");
        assert_eq!(registry.resolve_slug("no-such-book", "mountain-waves"), "mountain-waves");
    }

    #[test]
    fn test_resolve_slug_is_pure() {
        let registry = SlugAliasRegistry::builtin();
        let first = registry.resolve_slug("operational-procedures", "cs-ops-general-requirements");
        for _ in 0..3 {
            assert_eq!(
                registry.resolve_slug("operational-procedures", "cs-ops-general-requirements"),
                first
            );
        }
        assert_eq!(first, "eu-ops-general-requirements");
    }

    #[test]
    fn test_resolve_book_slug_subject_disambiguation() {
        let registry = SlugAliasRegistry::builtin();
        assert_eq!(registry.resolve_book_slug(Some("meteorology"), "cae-oxford"), "cae-oxford");
        assert_eq!(registry.resolve_book_slug(Some("air-law"), "cae-oxford"), "oxford");
        assert_eq!(registry.resolve_book_slug(None, "cae-oxford"), "oxford");
    }

    #[test]
    fn test_resolve_book_slug_table_and_passthrough() {
        let registry = SlugAliasRegistry::builtin();
        assert_eq!(registry.resolve_book_slug(None, "Mass-And-Balance"), "mass-and-balance-and-performance");
        assert_eq!(registry.resolve_book_slug(Some("navigation"), "powerplant"), "cae-oxford-powerplant");
        assert_eq!(registry.resolve_book_slug(None, "brand-new-book"), "brand-new-book");
    }

    #[test]
    fn test_extend_overrides_builtin() {
        let mut registry = SlugAliasRegistry::builtin();
        let mut chapters = BTreeMap::new();
        chapters.insert(
            "ic-joshi".to_string(),
            BTreeMap::from([("jetstreams".to_string(), "jet-streams".to_string())]),
        );
        let books = BTreeMap::from([("joshi".to_string(), "ic-joshi".to_string())]);
        registry.extend(&chapters, &books);

        assert_eq!(registry.resolve_slug("ic-joshi", "jetstreams"), "jet-streams");
        assert_eq!(registry.resolve_slug("ic-joshi", "mountain-waves"), "cat-and-mountain-waves");
        assert_eq!(registry.book_prefix("joshi"), "ic-joshi");
    }

    #[test]
    fn test_alternative_prefixes() {
        let registry = SlugAliasRegistry::builtin();
        assert_eq!(registry.alternative_prefixes("cae-oxford", "oxford"), vec!["cae-oxford"]);
        assert_eq!(
            registry.alternative_prefixes("mass-and-balance", "mass-and-balance-and-performance"),
            vec!["mass-and-balance", "performance"]
        );
        assert!(registry.alternative_prefixes("ic-joshi", "ic-joshi").is_empty());
    }

    #[test]
    fn test_fold_spelling() {
        assert_eq!(fold_spelling("international-organisations"), "international-organizations");
        assert_eq!(fold_spelling("international-organizations"), "international-organizations");
        assert_eq!(fold_spelling("pressurisation-failure"), "pressurization-failure");
    }
}
