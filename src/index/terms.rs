//! Domain vocabulary and the keyword rules built on it.

/// Terms recognised in question text, in reporting order.
pub const VOCABULARY: &[&str] = &[
    "VOR",
    "DME",
    "ILS",
    "GPS",
    "RNAV",
    "ADF",
    "SSR",
    "ACAS",
    "GNSS",
    "Airwash",
    "Pressure Gradient",
    "Isobar",
    "Tropopause",
    "Jet Stream",
    "Airworthiness",
    "Certificate",
    "Licensing",
    "Air Traffic Control",
    "Separation",
    "Airspace",
    "Approach",
    "Departure",
    "Holding",
    "Stress",
    "Hypoxia",
    "Fatigue",
    "Circadian",
    "GAS Syndrome",
    "Wind",
    "Temperature",
    "Humidity",
    "Cloud",
    "Thunderstorm",
    "Turbulence",
    "Icing",
    "Visibility",
    "Altimetry",
    "Density",
];

/// Vocabulary terms occurring in `text`, case-insensitive substring match.
pub fn extract_terms(text: &str) -> Vec<&'static str> {
    if text.is_empty() {
        return Vec::new();
    }
    let lower = text.to_lowercase();
    VOCABULARY
        .iter()
        .copied()
        .filter(|term| lower.contains(&term.to_lowercase()))
        .collect()
}

/// Broad subject of a book, from its name.
pub fn subject(book_name: &str) -> &'static str {
    let book = book_name.to_lowercase();
    if book.contains("meteorology") {
        "Meteorology"
    } else if book.contains("air law") || book.contains("air regulations") {
        "Air Regulations"
    } else if book.contains("human performance") {
        "Human Performance"
    } else if book.contains("navigation") {
        "Navigation"
    } else if book.contains("performance") {
        "Performance"
    } else if book.contains("instrument") {
        "Instruments"
    } else {
        "General"
    }
}

/// Topic category; chapter keywords can pull a chapter into a subject its
/// book name does not mention.
pub fn category(book_name: &str, chapter_title: &str) -> &'static str {
    let book = book_name.to_lowercase();
    let chapter = chapter_title.to_lowercase();
    let any = |haystack: &str, needles: &[&str]| needles.iter().any(|n| haystack.contains(n));

    if book.contains("meteorology") || any(&chapter, &["wind", "pressure", "cloud"]) {
        "Meteorology"
    } else if any(&book, &["air law", "air regulations"])
        || any(&chapter, &["airworthiness", "licensing"])
    {
        "Air Regulations"
    } else if book.contains("human performance") || any(&chapter, &["stress", "fatigue"]) {
        "Human Performance"
    } else if book.contains("navigation") || any(&chapter, &["vor", "dme", "gps"]) {
        "Navigation"
    } else if book.contains("performance") || chapter.contains("performance") {
        "Performance"
    } else if book.contains("instrument") || chapter.contains("instrument") {
        "Instruments"
    } else {
        "General"
    }
}
