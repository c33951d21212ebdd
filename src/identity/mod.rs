//! Book identity classification.
//!
//! Source documents rarely carry structured metadata, so the book a paper
//! belongs to is inferred from its filename or title. The registry below is
//! matched top to bottom and the first entry with a matching pattern wins.
//! Several patterns overlap (`performance` also appears in flight planning
//! titles, `navigation` in radio navigation titles); the order of
//! [`BOOK_REGISTRY`] is the precedence.

pub mod slug;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

pub use slug::{SlugAliasRegistry, normalize_slug};

/// Canonical identity of a source book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookIdentity {
    pub book_id: String,
    pub book_name: String,
    pub source: String,
    pub slug_prefix: String,
}

impl BookIdentity {
    /// Sentinel returned when no registry entry matches.
    pub fn unknown() -> Self {
        Self {
            book_id: UNKNOWN_BOOK_ID.to_string(),
            book_name: "Unknown Book".to_string(),
            source: "unknown".to_string(),
            slug_prefix: "unknown".to_string(),
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.book_id == UNKNOWN_BOOK_ID
    }
}

pub const UNKNOWN_BOOK_ID: &str = "unknown";

/// Chapter a batch of extracted questions is filed under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterIdentity {
    pub title: String,
    pub slug: String,
    pub number: String,
}

impl ChapterIdentity {
    /// Derive the chapter slug from its title, then apply the book's alias overrides.
    pub fn from_title(
        title: &str,
        number: &str,
        book: &BookIdentity,
        registry: &SlugAliasRegistry,
    ) -> Self {
        let slug = registry.resolve_slug(&book.slug_prefix, &normalize_slug(title));
        Self {
            title: title.trim().to_string(),
            slug,
            number: number.to_string(),
        }
    }
}

struct RegistryEntry {
    book_id: &'static str,
    patterns: &'static [&'static str],
    book_name: &'static str,
    source: &'static str,
    slug_prefix: &'static str,
}

const BOOK_REGISTRY: &[RegistryEntry] = &[
    RegistryEntry {
        book_id: "ic-joshi",
        patterns: &[r"ic-joshi", r"icjoshi"],
        book_name: "MET_IC_Joshi_7 Edition",
        source: "ic-joshi",
        slug_prefix: "ic-joshi",
    },
    RegistryEntry {
        book_id: "cae-oxford-meteorology",
        patterns: &[r"cae.*meteorology", r"oxford.*meteorology", r"meteorology.*oxford"],
        book_name: "CAE Oxford Meteorology",
        source: "cae-oxford",
        slug_prefix: "cae-oxford",
    },
    RegistryEntry {
        book_id: "cae-oxford-air-regulations",
        patterns: &[
            r"cae.*air.*regulation",
            r"oxford.*air.*regulation",
            r"air.*regulation.*oxford",
        ],
        book_name: "CAE Oxford Air Regulations",
        source: "cae-oxford",
        slug_prefix: "cae-oxford-air-regulations",
    },
    RegistryEntry {
        book_id: "cae-oxford-navigation",
        patterns: &[r"cae.*navigation", r"oxford.*navigation", r"navigation.*oxford"],
        book_name: "CAE Oxford Navigation",
        source: "cae-oxford",
        slug_prefix: "cae-oxford-navigation",
    },
    RegistryEntry {
        book_id: "cae-oxford-general-navigation",
        patterns: &[
            r"cae.*general.*navigation",
            r"oxford.*general.*navigation",
            r"general.*navigation.*oxford",
            r"general.*navigation",
        ],
        book_name: "CAE Oxford General Navigation",
        source: "cae-oxford",
        slug_prefix: "cae-oxford-general-navigation",
    },
    RegistryEntry {
        book_id: "cae-oxford-flight-planning",
        patterns: &[r"flight.*planning", r"flight.*monitoring"],
        book_name: "CAE Oxford Flight Planning & Monitoring",
        source: "cae-oxford",
        slug_prefix: "cae-oxford-flight-planning",
    },
    RegistryEntry {
        book_id: "cae-oxford-performance",
        patterns: &[r"performance"],
        book_name: "CAE Oxford Performance",
        source: "cae-oxford",
        slug_prefix: "cae-oxford-performance",
    },
    RegistryEntry {
        book_id: "cae-oxford-radio-navigation",
        patterns: &[r"radio.*navigation"],
        book_name: "CAE Oxford Radio Navigation",
        source: "cae-oxford",
        slug_prefix: "cae-oxford-radio-navigation",
    },
    RegistryEntry {
        book_id: "cae-oxford-powerplant",
        patterns: &[r"powerplant"],
        book_name: "CAE Oxford Powerplant",
        source: "cae-oxford",
        slug_prefix: "cae-oxford-powerplant",
    },
    RegistryEntry {
        book_id: "cae-oxford-principles-of-flight",
        patterns: &[r"principles.*of.*flight"],
        book_name: "CAE Oxford Principles of Flight",
        source: "cae-oxford",
        slug_prefix: "cae-oxford-principles-of-flight",
    },
    RegistryEntry {
        book_id: "rk-bali",
        patterns: &[r"rk.*bali", r"rkbali"],
        book_name: "RK Bali",
        source: "rk-bali",
        slug_prefix: "rk-bali",
    },
    RegistryEntry {
        book_id: "operational-procedures",
        patterns: &[r"operational.*procedure", r"ops.*procedure"],
        book_name: "Operational Procedures",
        source: "operational-procedures",
        slug_prefix: "operational-procedures",
    },
    RegistryEntry {
        book_id: "instrument",
        patterns: &[r"instrument", r"afcs"],
        book_name: "Instrument",
        source: "instrument",
        slug_prefix: "instrument",
    },
];

/// Compiled registry, in declaration order.
static COMPILED_REGISTRY: Lazy<Vec<(&'static RegistryEntry, Vec<Regex>)>> = Lazy::new(|| {
    BOOK_REGISTRY
        .iter()
        .map(|entry| {
            let patterns = entry
                .patterns
                .iter()
                .map(|p| Regex::new(&format!("(?i){}", p)).expect("registry pattern is valid"))
                .collect();
            (entry, patterns)
        })
        .collect()
});

impl From<&RegistryEntry> for BookIdentity {
    fn from(entry: &RegistryEntry) -> Self {
        Self {
            book_id: entry.book_id.to_string(),
            book_name: entry.book_name.to_string(),
            source: entry.source.to_string(),
            slug_prefix: entry.slug_prefix.to_string(),
        }
    }
}

/// Classify a filename or title against the book registry.
///
/// Returns [`BookIdentity::unknown`] when nothing matches; callers decide
/// whether that means "skip" or "ask for an explicit book".
pub fn classify(name: &str) -> BookIdentity {
    for (entry, patterns) in COMPILED_REGISTRY.iter() {
        if patterns.iter().any(|p| p.is_match(name)) {
            return BookIdentity::from(*entry);
        }
    }
    BookIdentity::unknown()
}

/// Look up a registry entry by its book id.
pub fn by_id(book_id: &str) -> Option<BookIdentity> {
    let wanted = book_id.trim().to_lowercase();
    BOOK_REGISTRY
        .iter()
        .find(|e| e.book_id == wanted)
        .map(BookIdentity::from)
}
