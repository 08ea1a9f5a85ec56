//! URL handling module for Book-Harvester
//!
//! Scraped links are a mix of absolute addresses, `../`-style paths relative
//! to the current page and root-relative paths. Everything stored in a record
//! goes through [`resolve_url`] first.

mod resolve;

pub use resolve::{file_name_from_url, is_absolute, parse_base_url, resolve_url};
