//! Scalar field normalizers
//!
//! Every function here is total: malformed or missing input maps to a
//! default value (0, 0.0, false, empty string) instead of an error.

use regex::Regex;
use std::sync::LazyLock;

/// Currency marks stripped before a price is parsed. `Â` shows up when a
/// UTF-8 pound sign has been decoded as Latin-1 somewhere upstream.
const CURRENCY_MARKS: &[char] = &['£', '€', '$', '¥', 'Â'];

const RATING_WORDS: [&str; 5] = ["One", "Two", "Three", "Four", "Five"];

/// Phrases that mark an availability text as in stock
const IN_STOCK_PHRASES: &[&str] = &["in stock", "en stock"];

static PARENTHESIZED_STOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\((\d+)\s*(?:available|disponibles?)?\)")
        .expect("Failed to compile stock regex")
});

static BARE_STOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+)\s+(?:available|disponibles?)").expect("Failed to compile stock regex")
});

/// Converts a displayed price such as `"£47.82"` to a number
///
/// Currency symbols and whitespace are removed first. Empty, absent,
/// unparseable and negative inputs all yield `0.0`.
///
/// # Examples
///
/// ```
/// use book_harvester::normalize::parse_price;
///
/// assert_eq!(parse_price(Some("£47.82")), 47.82);
/// assert_eq!(parse_price(Some("")), 0.0);
/// assert_eq!(parse_price(None), 0.0);
/// ```
pub fn parse_price(text: Option<&str>) -> f64 {
    let Some(text) = text else {
        return 0.0;
    };

    let cleaned: String = text
        .chars()
        .filter(|c| !c.is_whitespace() && !CURRENCY_MARKS.contains(c))
        .collect();

    match cleaned.parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 => value,
        _ => 0.0,
    }
}

/// Maps a star-rating class attribute (`"star-rating Three"`) to 1..=5
///
/// Returns 0 when no token names a rating.
pub fn parse_star_rating(class_text: Option<&str>) -> u8 {
    class_text
        .and_then(rating_position)
        .map(|index| index as u8 + 1)
        .unwrap_or(0)
}

/// Returns the rating word found in a star-rating class attribute
///
/// This is the textual form (`"Three"`) computed alongside the number during
/// extraction. Returns `None` for unrated input.
pub fn star_rating_word(class_text: Option<&str>) -> Option<&'static str> {
    class_text
        .and_then(rating_position)
        .map(|index| RATING_WORDS[index])
}

fn rating_position(class_text: &str) -> Option<usize> {
    class_text
        .split_whitespace()
        .find_map(|token| RATING_WORDS.iter().position(|word| *word == token))
}

/// Extracts the number of copies from an availability text
///
/// Looks for a parenthesized count such as `"(22 available)"` or
/// `"(3 disponibles)"` first, then a bare `"22 available"`. Returns 0 when
/// neither pattern matches.
pub fn parse_stock_count(availability_text: Option<&str>) -> u32 {
    let Some(text) = availability_text else {
        return 0;
    };

    PARENTHESIZED_STOCK
        .captures(text)
        .or_else(|| BARE_STOCK.captures(text))
        .and_then(|caps| caps.get(1))
        .and_then(|count| count.as_str().parse::<u32>().ok())
        .unwrap_or(0)
}

/// Returns true iff the availability text contains a stock-positive phrase
pub fn is_in_stock(availability_text: &str) -> bool {
    let lowered = availability_text.to_lowercase();
    IN_STOCK_PHRASES
        .iter()
        .any(|phrase| lowered.contains(phrase))
}

/// Parses a review count cell; anything other than plain digits is 0
pub fn parse_count(text: &str) -> u32 {
    let trimmed = text.trim();
    if trimmed.is_empty() || !trimmed.chars().all(|c| c.is_ascii_digit()) {
        return 0;
    }
    trimmed.parse().unwrap_or(0)
}

/// Trims every fragment, drops the empty ones and joins the rest with one space
///
/// Used for texts spread across several text nodes, such as the availability
/// paragraph that wraps its text around an icon element.
pub fn join_text_fragments<'a, I>(fragments: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    fragments
        .into_iter()
        .map(str::trim)
        .filter(|fragment| !fragment.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Collapses internal runs of whitespace to single spaces and trims the ends
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
