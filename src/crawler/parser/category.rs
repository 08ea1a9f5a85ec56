use super::css;
use crate::records::Category;
use crate::url::resolve_url;
use scraper::{Html, Selector};
use std::sync::LazyLock;
use url::Url;

static CATEGORY_LINKS: LazyLock<Selector> =
    LazyLock::new(|| css("div.side_categories ul li ul li a"));

/// Extracts every category link from the catalog's side navigation
///
/// Links are returned in page order. Entries without a name or an `href`
/// are skipped.
///
/// # Arguments
///
/// * `html` - Body of the start page
/// * `page_url` - URL the page was served from
pub fn parse_categories(html: &str, page_url: &Url) -> Vec<Category> {
    let document = Html::parse_document(html);

    document
        .select(&CATEGORY_LINKS)
        .filter_map(|link| {
            let name = link.text().collect::<String>().trim().to_string();
            let href = link.value().attr("href")?.trim().to_string();
            if name.is_empty() || href.is_empty() {
                tracing::debug!("Skipping category link without name or href");
                return None;
            }
            Some(Category {
                name,
                url_absolute: resolve_url(&href, page_url),
                url_relative: href,
            })
        })
        .collect()
}
