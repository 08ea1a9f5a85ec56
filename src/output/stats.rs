//! Aggregate views over stored books
//!
//! Both views group by category name, ignoring case. Books with an empty
//! category are left out of both views.

use crate::records::StoredBook;
use crate::storage::{BookStore, StorageResult};
use serde::Serialize;

/// Average price of the priced books in one category
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceByCategory {
    pub category: String,
    /// Rounded to 2 decimals
    pub average_price: f64,
    pub item_count: u64,
}

/// One row of the category ranking by item count
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryRanking {
    /// 1-based position
    pub rank: u32,
    pub category: String,
    pub item_count: u64,
    /// Share of all categorized books, rounded to 2 decimals
    pub percentage_of_total: f64,
}

/// Both aggregate views plus the store size
#[derive(Debug, Clone)]
pub struct LibraryStatistics {
    pub total_books: u64,
    pub average_prices: Vec<PriceByCategory>,
    pub ranking: Vec<CategoryRanking>,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Groups books by category, keeping categories in discovery order
///
/// Names are compared ignoring case and padding, the same way category
/// lookups match. Each group is labelled with its first-seen spelling.
fn group_by_category<'a, F>(books: &'a [StoredBook], mut keep: F) -> Vec<(&'a str, Vec<&'a StoredBook>)>
where
    F: FnMut(&StoredBook) -> bool,
{
    let mut groups: Vec<(String, &str, Vec<&StoredBook>)> = Vec::new();

    for stored in books {
        let category = stored.book.category.trim();
        if category.is_empty() || !keep(stored) {
            continue;
        }
        let key = category.to_lowercase();
        match groups.iter_mut().find(|(existing, _, _)| *existing == key) {
            Some((_, _, members)) => members.push(stored),
            None => groups.push((key, category, vec![stored])),
        }
    }

    groups
        .into_iter()
        .map(|(_, label, members)| (label, members))
        .collect()
}

/// Computes the average price per category
///
/// Books priced at zero are treated as unpriced and excluded. The result is
/// sorted by average price, highest first.
pub fn average_price_by_category(books: &[StoredBook]) -> Vec<PriceByCategory> {
    let mut averages: Vec<PriceByCategory> = group_by_category(books, |stored| stored.book.price > 0.0)
        .into_iter()
        .map(|(category, members)| {
            let total: f64 = members.iter().map(|stored| stored.book.price).sum();
            PriceByCategory {
                category: category.to_string(),
                average_price: round2(total / members.len() as f64),
                item_count: members.len() as u64,
            }
        })
        .collect();

    averages.sort_by(|a, b| b.average_price.total_cmp(&a.average_price));
    averages
}

/// Ranks categories by item count, largest first
///
/// Ties keep discovery order. Percentages are relative to the number of
/// categorized books.
pub fn category_ranking(books: &[StoredBook]) -> Vec<CategoryRanking> {
    let mut counts: Vec<(&str, u64)> = group_by_category(books, |_| true)
        .into_iter()
        .map(|(category, members)| (category, members.len() as u64))
        .collect();

    let total: u64 = counts.iter().map(|(_, count)| count).sum();
    counts.sort_by(|a, b| b.1.cmp(&a.1));

    counts
        .into_iter()
        .enumerate()
        .map(|(position, (category, item_count))| CategoryRanking {
            rank: position as u32 + 1,
            category: category.to_string(),
            item_count,
            percentage_of_total: round2(item_count as f64 * 100.0 / total as f64),
        })
        .collect()
}

/// Loads every book from the store and computes both views
pub fn load_statistics(store: &dyn BookStore) -> StorageResult<LibraryStatistics> {
    let books = store.get_all()?;

    Ok(LibraryStatistics {
        total_books: books.len() as u64,
        average_prices: average_price_by_category(&books),
        ranking: category_ranking(&books),
    })
}

/// Prints statistics to stdout
pub fn print_statistics(stats: &LibraryStatistics) {
    println!("=== Library Statistics ===\n");

    println!("Overview:");
    println!("  Total books: {}", stats.total_books);
    println!("  Categories: {}", stats.ranking.len());
    println!();

    if stats.ranking.is_empty() {
        println!("No categorized books stored yet.");
        return;
    }

    println!("Categories by Item Count:");
    for row in &stats.ranking {
        println!(
            "  {:>3}. {}: {} ({:.2}%)",
            row.rank, row.category, row.item_count, row.percentage_of_total
        );
    }
    println!();

    println!("Average Price by Category:");
    for row in &stats.average_prices {
        println!(
            "  {}: {:.2} over {} books",
            row.category, row.average_price, row.item_count
        );
    }
}
