use crate::error::ExtractError;
use scraper::Html;
use std::io::Cursor;
use url::Url;

/// Boilerplate removal step applied before serialization when readability is enabled.
pub trait Cleaner: Send + Sync {
    /// Returns the cleaned HTML for `html`, or an error when no readable
    /// content could be isolated.
    fn clean(&self, html: &str, base: &Url) -> Result<String, ExtractError>;
}

/// [`Cleaner`] backed by the Mozilla readability port.
#[derive(Debug, Default, Clone, Copy)]
pub struct ReadabilityCleaner;

impl Cleaner for ReadabilityCleaner {
    fn clean(&self, html: &str, base: &Url) -> Result<String, ExtractError> {
        let mut cursor = Cursor::new(html.as_bytes());
        readability::extractor::extract(&mut cursor, base)
            .map(|product| product.content)
            .map_err(|e| ExtractError::Isolation(format!("{:?}", e)))
    }
}

/// The working tree chosen for a page together with the HTML it was parsed from.
#[derive(Debug)]
pub struct Isolated {
    pub tree: Html,
    pub effective_html: String,
    /// Whether the tree is the cleaned variant
    pub cleaned: bool,
}

/// Parses a full HTML document.
///
/// The HTML5 parser recovers from any malformed markup, so the only document
/// that cannot yield a usable tree is one with no markup at all.
pub fn parse_document(html: &str) -> Result<Html, ExtractError> {
    if html.trim().is_empty() {
        return Err(ExtractError::Parse("document is empty".to_string()));
    }
    Ok(Html::parse_document(html))
}

/// Chooses the tree to serialize from.
///
/// With `enabled` false this is the tree parsed from `raw_html`. Otherwise the
/// cleaned HTML is parsed and returned; if cleaning or parsing its output
/// fails, the raw tree is returned instead. Only a failure to parse
/// `raw_html` itself is an error.
pub fn isolate(
    raw_html: &str,
    base: &Url,
    enabled: bool,
    cleaner: &dyn Cleaner,
) -> Result<Isolated, ExtractError> {
    if enabled {
        match cleaner
            .clean(raw_html, base)
            .and_then(|cleaned| parse_document(&cleaned).map(|tree| (tree, cleaned)))
        {
            Ok((tree, effective_html)) => {
                ::log::debug!("Readability applied for: {}", base);
                return Ok(Isolated {
                    tree,
                    effective_html,
                    cleaned: true,
                });
            }
            Err(e) => {
                ::log::warn!("Readability failed for {}: {}. Using raw HTML.", base, e);
            }
        }
    }

    Ok(Isolated {
        tree: parse_document(raw_html)?,
        effective_html: raw_html.to_string(),
        cleaned: false,
    })
}
