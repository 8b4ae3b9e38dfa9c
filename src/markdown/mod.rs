//! Markdown serialization of an isolated content tree.
//!
//! Serialization happens in two steps: [`blocks::classify`] turns the tree
//! into a sequence of typed [`Block`]s in a fixed class order, and rendering
//! folds that sequence into the output buffer after the metadata header.
//! The class order means output is not in document order; in particular all
//! headings of one level are grouped together.

pub mod blocks;


pub use blocks::{Block, parse_srcset};

use crate::config::ExtractionConfig;
use crate::metadata::{AUTHOR, CANONICAL_URL, DESCRIPTION, KEYWORDS, Metadata, TITLE};
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use std::fmt::Write;

static NON_CONTENT: Lazy<Selector> =
    Lazy::new(|| Selector::parse("nav, footer, script, style, noscript").unwrap());

/// Output of [`serialize`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Serialized {
    pub markdown: String,
    /// Numbered citations, rendered by [`append_references`]. Nothing fills
    /// this yet.
    pub references: Vec<String>,
}

/// Serializes `doc` to Markdown.
///
/// Non-content elements are removed from `doc` first. Removal is idempotent,
/// so serializing the same tree again yields identical output.
pub fn serialize(doc: &mut Html, metadata: &Metadata, config: &ExtractionConfig) -> Serialized {
    let mut markdown = String::new();
    render_header(metadata, &mut markdown);

    strip_non_content(doc);

    for block in blocks::classify(doc, config.base_url()) {
        block.render(&mut markdown);
    }

    Serialized {
        markdown,
        references: Vec::new(),
    }
}

/// Detaches `nav`, `footer`, `script`, `style` and `noscript` elements from `doc`.
pub fn strip_non_content(doc: &mut Html) {
    let ids: Vec<_> = doc.select(&NON_CONTENT).map(|e| e.id()).collect();
    ::log::trace!("Stripping {} non-content elements", ids.len());
    for id in ids {
        if let Some(mut node) = doc.tree.get_mut(id) {
            node.detach();
        }
    }
}

/// Writes the metadata header and the `---` separator.
pub fn render_header(metadata: &Metadata, out: &mut String) {
    let field = |key: &str| metadata.get(key).filter(|v| !v.is_empty());

    if let Some(title) = field(TITLE) {
        let _ = write!(out, "# {}\n\n", title);
    }
    if let Some(description) = field(DESCRIPTION) {
        let _ = write!(out, "> {}\n\n", description);
    }
    if let Some(keywords) = field(KEYWORDS) {
        let _ = write!(out, "**Keywords:** {}\n\n", keywords);
    }
    if let Some(author) = field(AUTHOR) {
        let _ = write!(out, "**Author:** {}\n\n", author);
    }
    if let Some(canonical) = field(CANONICAL_URL) {
        let _ = write!(out, "**Canonical URL:** {}\n\n", canonical);
    }
    out.push_str("---\n\n");
}

/// Appends a `**References:**` section, one `[n] ref` line per entry.
pub fn append_references(markdown: &mut String, references: &[String]) {
    if references.is_empty() {
        return;
    }
    markdown.push_str("\n\n**References:**\n");
    for (i, reference) in references.iter().enumerate() {
        let _ = writeln!(markdown, "[{}] {}", i + 1, reference);
    }
}
