//! Field normalizers
//!
//! Pure functions turning scraped text into typed values. None of them fail:
//! bad input degrades to a default so extraction code never branches on
//! parse errors.

mod fields;
mod table_keys;

pub use fields::{
    collapse_whitespace, is_in_stock, join_text_fragments, parse_count, parse_price,
    parse_star_rating, parse_stock_count, star_rating_word,
};
pub use table_keys::{
    canonicalize_table_key, AttributeTable, KEY_PRODUCT_TYPE, KEY_REVIEW_COUNT, KEY_TAX, KEY_UPC,
    REDUNDANT_KEYS,
};
