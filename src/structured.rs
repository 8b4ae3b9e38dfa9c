use crate::markdown::blocks::{CARD_BODY, CARD_TEXT, CARD_TITLE_LINK};
use crate::resolve::resolve_against;
use scraper::{ElementRef, Html, Selector};
use std::collections::BTreeMap;
use url::Url;

/// One extracted item: field name to value
pub type Fields = BTreeMap<String, String>;

/// Extraction name to the items it produced, in document order
pub type StructuredData = BTreeMap<String, Vec<Fields>>;

/// A named, site-specific rule turning recurring markup into field mappings.
pub trait StructuredExtractor: Send + Sync {
    /// Key the items are stored under in [`StructuredData`]
    fn name(&self) -> &str;

    fn extract(&self, doc: &Html, base: &Url) -> Vec<Fields>;
}

/// Blog-style cards: a `.card-body` with an `h2.card-title a` link and an
/// `h4.card-text` description. Stored as `blog_posts` with the fields
/// `title`, `link` and `description`.
#[derive(Debug, Default, Clone, Copy)]
pub struct CardExtractor;

impl StructuredExtractor for CardExtractor {
    fn name(&self) -> &str {
        "blog_posts"
    }

    fn extract(&self, doc: &Html, base: &Url) -> Vec<Fields> {
        doc.select(&CARD_BODY)
            .map(|card| {
                let href = card
                    .select(&CARD_TITLE_LINK)
                    .next()
                    .and_then(|a| a.value().attr("href"))
                    .unwrap_or_default();

                let mut fields = Fields::new();
                fields.insert("title".to_string(), joined_text(card, &CARD_TITLE_LINK));
                fields.insert("link".to_string(), resolve_against(base, href));
                fields.insert("description".to_string(), joined_text(card, &CARD_TEXT));
                fields
            })
            .collect()
    }
}

/// Text of every match of `selector` inside `root`, concatenated and trimmed
fn joined_text(root: ElementRef, selector: &Selector) -> String {
    root.select(selector)
        .flat_map(|e| e.text())
        .collect::<String>()
        .trim()
        .to_string()
}

/// Runs every extractor against `doc`.
pub fn extract_all(
    extractors: &[Box<dyn StructuredExtractor>],
    doc: &Html,
    base: &Url,
) -> StructuredData {
    extractors
        .iter()
        .map(|extractor| (extractor.name().to_string(), extractor.extract(doc, base)))
        .collect()
}
