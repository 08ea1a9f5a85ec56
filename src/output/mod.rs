//! Output module for reporting on stored books
//!
//! This module handles:
//! - Aggregate views by category (average price, ranking by item count)
//! - Printing library statistics for the `stats` command

pub mod stats;

pub use stats::{
    average_price_by_category, category_ranking, load_statistics, print_statistics,
    CategoryRanking, LibraryStatistics, PriceByCategory,
};
