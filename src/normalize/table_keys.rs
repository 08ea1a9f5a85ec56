//! Product information table normalization
//!
//! The detail page carries a two-column table whose headers come in English
//! or French depending on the catalog edition. Headers are mapped onto one
//! internal vocabulary so downstream code never sees the source language.

use super::fields::parse_price;
use std::collections::BTreeMap;

/// Known headers and their canonical keys
const KNOWN_HEADERS: &[(&str, &str)] = &[
    ("UPC", "code_upc"),
    ("Code UPC", "code_upc"),
    ("Product Type", "type_produit"),
    ("Type de produit", "type_produit"),
    ("Price (excl. tax)", "prix_hors_taxe"),
    ("Prix (hors taxes)", "prix_hors_taxe"),
    ("Price (incl. tax)", "prix_avec_taxe"),
    ("Prix (TTC)", "prix_avec_taxe"),
    ("Tax", "taxe"),
    ("Impôt", "taxe"),
    ("Availability", "disponibilite_tableau"),
    ("Disponibilité", "disponibilite_tableau"),
    ("Number of reviews", "nombre_avis"),
    ("Nombre d'avis", "nombre_avis"),
];

/// Keys always dropped from the attribute map; the record carries them elsewhere
pub const REDUNDANT_KEYS: &[&str] = &["prix_hors_taxe", "prix_avec_taxe", "disponibilite_tableau"];

pub const KEY_UPC: &str = "code_upc";
pub const KEY_PRODUCT_TYPE: &str = "type_produit";
pub const KEY_TAX: &str = "taxe";
pub const KEY_REVIEW_COUNT: &str = "nombre_avis";

const ZERO_WIDTH_SPACE: char = '\u{200b}';

/// Maps a raw table header to its canonical key
///
/// Zero-width spaces (present in some French headers) and surrounding
/// whitespace are ignored. Unknown headers are lower-cased with spaces
/// replaced by underscores.
///
/// # Examples
///
/// ```
/// use book_harvester::normalize::canonicalize_table_key;
///
/// assert_eq!(canonicalize_table_key("UPC"), "code_upc");
/// assert_eq!(canonicalize_table_key("Nombre d'avis"), "nombre_avis");
/// assert_eq!(canonicalize_table_key("Page Count"), "page_count");
/// ```
pub fn canonicalize_table_key(raw_header: &str) -> String {
    let cleaned: String = raw_header
        .chars()
        .filter(|c| *c != ZERO_WIDTH_SPACE)
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    if let Some((_, key)) = KNOWN_HEADERS
        .iter()
        .find(|(header, _)| header.eq_ignore_ascii_case(&cleaned))
    {
        return (*key).to_string();
    }

    cleaned.to_lowercase().replace(' ', "_")
}

/// Normalized content of a product information table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributeTable {
    /// Canonical key → trimmed cell text, redundant keys removed
    pub attributes: BTreeMap<String, String>,

    /// `<key>_numerique` → parsed price for every remaining key containing "prix"
    pub derived_prices: BTreeMap<String, f64>,
}

impl AttributeTable {
    /// Builds the table from raw `(header, value)` rows in page order
    ///
    /// When two rows canonicalize to the same key the later one wins.
    pub fn from_rows<I, H, V>(rows: I) -> Self
    where
        I: IntoIterator<Item = (H, V)>,
        H: AsRef<str>,
        V: AsRef<str>,
    {
        let mut attributes = BTreeMap::new();

        for (header, value) in rows {
            let key = canonicalize_table_key(header.as_ref());
            if key.is_empty() || REDUNDANT_KEYS.contains(&key.as_str()) {
                continue;
            }
            attributes.insert(key, value.as_ref().trim().to_string());
        }

        let derived_prices = attributes
            .iter()
            .filter(|(key, _)| key.contains("prix"))
            .map(|(key, value)| (format!("{}_numerique", key), parse_price(Some(value))))
            .collect();

        Self {
            attributes,
            derived_prices,
        }
    }

    /// Returns the cell for a canonical key, if present
    pub fn get(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }
}
