use super::{css, first, first_attr, first_text};
use crate::normalize::join_text_fragments;
use crate::records::ListingRecord;
use crate::url::resolve_url;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;
use url::Url;

static PRODUCT_POD: LazyLock<Selector> = LazyLock::new(|| css("article.product_pod"));
static TITLE_LINK: LazyLock<Selector> = LazyLock::new(|| css("h3 a"));
static PRICE: LazyLock<Selector> = LazyLock::new(|| css("p.price_color"));
static STAR_RATING: LazyLock<Selector> = LazyLock::new(|| css("p.star-rating"));
static IMAGE: LazyLock<Selector> = LazyLock::new(|| css("div.image_container a img"));
static AVAILABILITY: LazyLock<Selector> = LazyLock::new(|| css("p.instock.availability"));
static NEXT_PAGE: LazyLock<Selector> = LazyLock::new(|| css("ul.pager li.next a"));

/// Availability text used when a card has none
pub const UNKNOWN_AVAILABILITY: &str = "Availability unknown";

/// Items found on one listing page plus the link to the following page
#[derive(Debug, Clone, PartialEq)]
pub struct ListingPage {
    pub records: Vec<ListingRecord>,
    /// Absolute URL of the next page, if the pager has one
    pub next_page: Option<String>,
}

/// Extracts the product cards and the next-page link from a listing page
///
/// # Arguments
///
/// * `html` - Body of the listing page
/// * `page_url` - URL the page was served from
/// * `category` - Category name carried onto every record
pub fn parse_listing_page(html: &str, page_url: &Url, category: &str) -> ListingPage {
    let document = Html::parse_document(html);

    let records = document
        .select(&PRODUCT_POD)
        .map(|pod| parse_product_pod(pod, page_url, category))
        .collect();

    let next_page = first(document.root_element(), &NEXT_PAGE)
        .and_then(|link| link.value().attr("href"))
        .map(|href| resolve_url(href, page_url))
        .filter(|url| !url.is_empty());

    ListingPage { records, next_page }
}

fn parse_product_pod(pod: ElementRef<'_>, page_url: &Url, category: &str) -> ListingRecord {
    let availability_text = first(pod, &AVAILABILITY)
        .map(|p| join_text_fragments(p.text()))
        .filter(|text| !text.is_empty())
        .unwrap_or_else(|| UNKNOWN_AVAILABILITY.to_string());

    ListingRecord {
        category: category.to_string(),
        title: first_attr(pod, &TITLE_LINK, "title"),
        price_text: first_text(pod, &PRICE),
        star_class: first_attr(pod, &STAR_RATING, "class"),
        image_url: resolve_url(&first_attr(pod, &IMAGE, "src"), page_url),
        detail_url: resolve_url(&first_attr(pod, &TITLE_LINK, "href"), page_url),
        availability_text,
    }
}
