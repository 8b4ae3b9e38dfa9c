use crate::resolve::resolve_against;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use std::collections::BTreeMap;
use url::Url;

/// Normalized page metadata, keyed as the keys appear in the source markup.
pub type Metadata = BTreeMap<String, String>;

pub const TITLE: &str = "title";
pub const DESCRIPTION: &str = "description";
pub const KEYWORDS: &str = "keywords";
pub const AUTHOR: &str = "author";
pub const CANONICAL_URL: &str = "canonical_url";
pub const FAVICON_URL: &str = "favicon_url";

static META: Lazy<Selector> = Lazy::new(|| Selector::parse("meta").unwrap());
static TITLE_TAG: Lazy<Selector> = Lazy::new(|| Selector::parse("title").unwrap());
static CANONICAL: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"link[rel="canonical"]"#).unwrap());
static ICON: Lazy<Selector> = Lazy::new(|| Selector::parse(r#"link[rel="icon"]"#).unwrap());
static SHORTCUT_ICON: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"link[rel="shortcut icon"]"#).unwrap());

/// Harvests metadata from a parsed document without modifying it.
///
/// Every `meta` element carrying a `content` attribute is indexed by its
/// `name`, or by its `property` when there is no name, so both standard and
/// open-graph style tags end up in the map. Later tags overwrite earlier ones.
/// `title` is always present and holds the first `title` element's text with
/// surrounding whitespace trimmed; canonical and favicon links are made absolute
/// against `base`.
pub fn extract(doc: &Html, base: &Url) -> Metadata {
    let mut metadata = Metadata::new();

    for meta in doc.select(&META) {
        let element = meta.value();
        let Some(content) = element.attr("content").filter(|c| !c.is_empty()) else {
            continue;
        };
        let key = element
            .attr("name")
            .filter(|n| !n.is_empty())
            .or_else(|| element.attr("property").filter(|p| !p.is_empty()));
        if let Some(key) = key {
            metadata.insert(key.to_string(), content.to_string());
        }
    }

    let title = doc
        .select(&TITLE_TAG)
        .next()
        .map(|t| t.text().collect::<String>().trim().to_string())
        .unwrap_or_default();
    metadata.insert(TITLE.to_string(), title);

    if let Some(href) = first_href(doc, &CANONICAL) {
        metadata.insert(CANONICAL_URL.to_string(), resolve_against(base, href));
    }

    if let Some(href) = first_href(doc, &ICON).or_else(|| first_href(doc, &SHORTCUT_ICON)) {
        metadata.insert(FAVICON_URL.to_string(), resolve_against(base, href));
    }

    ::log::debug!("Extracted {} metadata entries", metadata.len());
    metadata
}

fn first_href<'a>(doc: &'a Html, selector: &Selector) -> Option<&'a str> {
    doc.select(selector)
        .next()
        .and_then(|link| link.value().attr("href"))
        .filter(|href| !href.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract_from(html: &str) -> Metadata {
        let doc = Html::parse_document(html);
        extract(&doc, &Url::parse("https://site.test/blog/post").unwrap())
    }

    #[test]
    fn test_title_always_present() {
        let metadata = extract_from("<html><body><p>no head</p></body></html>");
        assert_eq!(metadata.get(TITLE).map(String::as_str), Some(""));
        assert_eq!(metadata.len(), 1);
    }

    #[test]
    fn test_first_title_wins() {
        let metadata =
            extract_from("<html><head><title> First </title><title>Second</title></head></html>");
        assert_eq!(metadata[TITLE], "First");
    }

    #[test]
    fn test_name_and_property_meta() {
        let metadata = extract_from(
            r#"<html><head>
                <meta name="description" content="About things">
                <meta property="og:title" content="OG Title">
                <meta name="author" property="article:author" content="Ada">
                <meta name="keywords">
                <meta charset="utf-8">
            </head></html>"#,
        );
        assert_eq!(metadata[DESCRIPTION], "About things");
        assert_eq!(metadata["og:title"], "OG Title");
        assert_eq!(metadata[AUTHOR], "Ada");
        assert!(!metadata.contains_key("article:author"));
        assert!(!metadata.contains_key(KEYWORDS));
    }

    #[test]
    fn test_last_meta_wins_and_keys_are_case_sensitive() {
        let metadata = extract_from(
            r#"<html><head>
                <meta name="description" content="first">
                <meta name="description" content="second">
                <meta name="Description" content="upper">
            </head></html>"#,
        );
        assert_eq!(metadata[DESCRIPTION], "second");
        assert_eq!(metadata["Description"], "upper");
    }

    #[test]
    fn test_canonical_and_favicon_resolved() {
        let metadata = extract_from(
            r#"<html><head>
                <link rel="canonical" href="/blog/post">
                <link rel="icon" href="favicon.png">
                <link rel="shortcut icon" href="/legacy.ico">
            </head></html>"#,
        );
        assert_eq!(metadata[CANONICAL_URL], "https://site.test/blog/post");
        assert_eq!(metadata[FAVICON_URL], "https://site.test/blog/favicon.png");
    }

    #[test]
    fn test_favicon_falls_back_to_shortcut_icon() {
        let metadata =
            extract_from(r#"<html><head><link rel="shortcut icon" href="/legacy.ico"></head></html>"#);
        assert_eq!(metadata[FAVICON_URL], "https://site.test/legacy.ico");
    }
}
