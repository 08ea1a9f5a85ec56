//! HTML parsers for the three catalog page kinds
//!
//! Each parser takes the page body and the URL it was served from (the base
//! for relative links) and returns typed records. Parsing never fails: a
//! page that lacks an expected element yields empty fields or no records.

mod category;
mod detail;
mod listing;

pub use category::parse_categories;
pub use detail::parse_detail_page;
pub use listing::{parse_listing_page, ListingPage};

use scraper::{ElementRef, Selector};

/// Compiles a selector known to be valid at build time
fn css(selector: &'static str) -> Selector {
    Selector::parse(selector).expect("Failed to compile selector")
}

/// First match of `selector` below `element`
fn first<'a>(element: ElementRef<'a>, selector: &Selector) -> Option<ElementRef<'a>> {
    element.select(selector).next()
}

/// Trimmed text of the first match, or an empty string
fn first_text(element: ElementRef<'_>, selector: &Selector) -> String {
    first(element, selector)
        .map(|e| e.text().collect::<String>().trim().to_string())
        .unwrap_or_default()
}

/// Attribute of the first match, or an empty string
fn first_attr(element: ElementRef<'_>, selector: &Selector, attr: &str) -> String {
    first(element, selector)
        .and_then(|e| e.value().attr(attr))
        .map(|value| value.trim().to_string())
        .unwrap_or_default()
}
