use super::{css, first, first_attr, first_text};
use crate::normalize::{
    is_in_stock, join_text_fragments, parse_count, parse_price, parse_star_rating,
    parse_stock_count, star_rating_word, AttributeTable, KEY_PRODUCT_TYPE, KEY_REVIEW_COUNT,
    KEY_TAX, KEY_UPC,
};
use crate::records::{BookRecord, DEFAULT_DESCRIPTION, DEFAULT_PRODUCT_TYPE};
use crate::url::{file_name_from_url, resolve_url};
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;
use url::Url;

static BREADCRUMB_ITEMS: LazyLock<Selector> = LazyLock::new(|| css("ul.breadcrumb li"));
static TITLE: LazyLock<Selector> = LazyLock::new(|| css("div.product_main h1"));
static PRICE: LazyLock<Selector> = LazyLock::new(|| css("div.product_main p.price_color"));
static STAR_RATING: LazyLock<Selector> = LazyLock::new(|| css("div.product_main p.star-rating"));
static AVAILABILITY: LazyLock<Selector> =
    LazyLock::new(|| css("div.product_main p.instock.availability"));
static DESCRIPTION_AFTER_MARKER: LazyLock<Selector> =
    LazyLock::new(|| css("div#product_description + p"));
static HEADINGS: LazyLock<Selector> = LazyLock::new(|| css("h2"));
static ARTICLE_PARAGRAPHS: LazyLock<Selector> = LazyLock::new(|| css("article.product_page p"));
static GALLERY_IMAGE: LazyLock<Selector> = LazyLock::new(|| css("div#product_gallery img"));
static ACTIVE_IMAGE: LazyLock<Selector> = LazyLock::new(|| css("div.item.active img"));
static TABLE_ROWS: LazyLock<Selector> = LazyLock::new(|| css("table.table-striped tr"));
static ROW_HEADER: LazyLock<Selector> = LazyLock::new(|| css("th"));
static ROW_VALUE: LazyLock<Selector> = LazyLock::new(|| css("td"));

/// Paragraphs shorter than this are not taken as a fallback description
const MIN_FALLBACK_DESCRIPTION_CHARS: usize = 50;

/// Extracts and normalizes a detail page into a [`BookRecord`]
///
/// # Arguments
///
/// * `html` - Body of the detail page
/// * `page_url` - URL the page was served from; stored as `url_page`
/// * `fallback_category` - Category from the listing stage, used when the
///   breadcrumb is too short to name one
pub fn parse_detail_page(html: &str, page_url: &Url, fallback_category: &str) -> BookRecord {
    let document = Html::parse_document(html);
    let root = document.root_element();

    let breadcrumb: Vec<String> = root
        .select(&BREADCRUMB_ITEMS)
        .map(|li| li.text().collect::<String>().trim().to_string())
        .filter(|text| !text.is_empty())
        .collect();

    let category = match breadcrumb.len() {
        n if n >= 2 => breadcrumb[n - 2].clone(),
        _ => fallback_category.trim().to_string(),
    };

    let title = first_text(root, &TITLE);
    let price_text = first_text(root, &PRICE);

    let star_class = first_attr(root, &STAR_RATING, "class");
    let star_rating = parse_star_rating(Some(&star_class));
    tracing::trace!(
        "Rating for {}: {}",
        page_url,
        star_rating_word(Some(&star_class)).unwrap_or("none")
    );

    let availability = first(root, &AVAILABILITY)
        .map(|p| join_text_fragments(p.text()))
        .unwrap_or_default();

    let image_src = {
        let gallery = first_attr(root, &GALLERY_IMAGE, "src");
        if gallery.is_empty() {
            first_attr(root, &ACTIVE_IMAGE, "src")
        } else {
            gallery
        }
    };
    let image_url = resolve_url(&image_src, page_url);
    let image_filename = file_name_from_url(&image_url);

    let table = AttributeTable::from_rows(root.select(&TABLE_ROWS).filter_map(|row| {
        let header = first(row, &ROW_HEADER)?.text().collect::<String>();
        let value = first(row, &ROW_VALUE)?.text().collect::<String>();
        if header.trim().is_empty() || value.trim().is_empty() {
            return None;
        }
        Some((header, value))
    }));

    let review_count = table.get(KEY_REVIEW_COUNT).map(parse_count).unwrap_or(0);
    let product_type = table
        .get(KEY_PRODUCT_TYPE)
        .filter(|value| !value.is_empty())
        .unwrap_or(DEFAULT_PRODUCT_TYPE)
        .to_string();

    BookRecord {
        url_page: page_url.to_string(),
        category,
        full_title: title.clone(),
        title,
        price: parse_price(Some(&price_text)),
        star_rating,
        review_count,
        in_stock: is_in_stock(&availability),
        stock_quantity: parse_stock_count(Some(&availability)),
        description: extract_description(root),
        image_url,
        image_filename,
        image_alt: first_attr(root, &GALLERY_IMAGE, "alt"),
        breadcrumb,
        upc: table.get(KEY_UPC).unwrap_or_default().to_string(),
        product_type,
        tax: parse_price(table.get(KEY_TAX)),
        number_of_reviews: review_count,
        attributes: table.attributes,
        derived_prices: table.derived_prices,
    }
}

/// Finds the description, trying progressively looser locations
fn extract_description(root: ElementRef<'_>) -> String {
    let after_marker = first(root, &DESCRIPTION_AFTER_MARKER).map(element_text);

    let after_heading = || {
        root.select(&HEADINGS)
            .filter(|h2| h2.text().any(|text| text.contains("Description")))
            .find_map(|h2| {
                h2.next_siblings()
                    .filter_map(ElementRef::wrap)
                    .find(|sibling| sibling.value().name() == "p")
            })
            .map(element_text)
    };

    let long_paragraph = || {
        root.select(&ARTICLE_PARAGRAPHS)
            .map(element_text)
            .find(|text| text.chars().count() > MIN_FALLBACK_DESCRIPTION_CHARS)
    };

    after_marker
        .filter(|text| !text.is_empty())
        .or_else(|| after_heading().filter(|text| !text.is_empty()))
        .or_else(long_paragraph)
        .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string())
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}
