use crate::resolve::resolve_against;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use std::fmt::Write;
use url::Url;

/// One unit of Markdown output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Heading { level: usize, text: String },
    Paragraph(String),
    UnorderedList(Vec<String>),
    OrderedList(Vec<String>),
    CodeBlock { language: Option<String>, code: String },
    InlineCode(String),
    Quote(String),
    Table {
        header: Option<Vec<String>>,
        rows: Vec<Vec<String>>,
    },
    /// A `.card-body` section: its title links then its descriptions
    Card {
        links: Vec<(String, String)>,
        descriptions: Vec<String>,
    },
    Image { alt: String, src: String },
    ImageLink(String),
    AudioLink(String),
    VideoLink(String),
}

fn selector(css: &str) -> Selector {
    Selector::parse(css).unwrap()
}

static HEADINGS: Lazy<[Selector; 6]> = Lazy::new(|| {
    [
        selector("h1"),
        selector("h2"),
        selector("h3"),
        selector("h4"),
        selector("h5"),
        selector("h6"),
    ]
});
static PARAGRAPH: Lazy<Selector> = Lazy::new(|| selector("p"));
static UL: Lazy<Selector> = Lazy::new(|| selector("ul"));
static OL: Lazy<Selector> = Lazy::new(|| selector("ol"));
static LI: Lazy<Selector> = Lazy::new(|| selector("li"));
static PRE_CODE: Lazy<Selector> = Lazy::new(|| selector("pre code"));
static CODE: Lazy<Selector> = Lazy::new(|| selector("code"));
static BLOCKQUOTE: Lazy<Selector> = Lazy::new(|| selector("blockquote"));
static TABLE: Lazy<Selector> = Lazy::new(|| selector("table"));
static THEAD_ROW: Lazy<Selector> = Lazy::new(|| selector("thead tr"));
static TBODY_ROW: Lazy<Selector> = Lazy::new(|| selector("tbody tr"));
static TH: Lazy<Selector> = Lazy::new(|| selector("th"));
static TD: Lazy<Selector> = Lazy::new(|| selector("td"));
pub(crate) static CARD_BODY: Lazy<Selector> = Lazy::new(|| selector(".card-body"));
pub(crate) static CARD_TITLE_LINK: Lazy<Selector> = Lazy::new(|| selector("h2.card-title a"));
pub(crate) static CARD_TEXT: Lazy<Selector> = Lazy::new(|| selector("h4.card-text"));
static IMG: Lazy<Selector> = Lazy::new(|| selector("img"));
static PICTURE_SOURCE: Lazy<Selector> = Lazy::new(|| selector("picture source"));
static IMG_SRCSET: Lazy<Selector> = Lazy::new(|| selector("img[srcset]"));
static AUDIO: Lazy<Selector> = Lazy::new(|| selector("audio source, audio"));
static VIDEO: Lazy<Selector> = Lazy::new(|| selector("video source, video"));

/// Classifies the content of `doc` into blocks.
///
/// Blocks come out grouped by element class, in the order they are emitted:
/// headings (all `h1`s, then all `h2`s, ...), paragraphs, unordered lists,
/// ordered lists, code blocks, inline code, blockquotes, tables, card
/// sections and finally media. Within a class, document order is kept.
pub fn classify(doc: &Html, base: &Url) -> Vec<Block> {
    let mut blocks = Vec::new();

    for (i, heading) in HEADINGS.iter().enumerate() {
        blocks.extend(doc.select(heading).map(|h| Block::Heading {
            level: i + 1,
            text: trimmed_text(h),
        }));
    }

    blocks.extend(
        doc.select(&PARAGRAPH)
            .map(trimmed_text)
            .filter(|text| !text.is_empty())
            .map(Block::Paragraph),
    );

    blocks.extend(doc.select(&UL).map(|ul| Block::UnorderedList(list_items(ul))));
    blocks.extend(doc.select(&OL).map(|ol| Block::OrderedList(list_items(ol))));

    blocks.extend(doc.select(&PRE_CODE).map(|code| Block::CodeBlock {
        language: code_language(code),
        code: trimmed_text(code),
    }));
    blocks.extend(
        doc.select(&CODE)
            .filter(|code| parent_name(*code) != Some("pre"))
            .map(|code| Block::InlineCode(trimmed_text(code))),
    );

    blocks.extend(
        doc.select(&BLOCKQUOTE)
            .map(|quote| Block::Quote(trimmed_text(quote))),
    );

    blocks.extend(doc.select(&TABLE).map(table_block));

    blocks.extend(doc.select(&CARD_BODY).map(|card| Block::Card {
        links: card
            .select(&CARD_TITLE_LINK)
            .map(|link| {
                let href = link.value().attr("href").unwrap_or_default();
                (trimmed_text(link), resolve_against(base, href))
            })
            .collect(),
        descriptions: card.select(&CARD_TEXT).map(trimmed_text).collect(),
    }));

    blocks.extend(media(doc, base));

    ::log::trace!("Classified {} blocks", blocks.len());
    blocks
}

fn media(doc: &Html, base: &Url) -> Vec<Block> {
    let mut blocks = Vec::new();

    for img in doc.select(&IMG) {
        if let Some(src) = img.value().attr("src") {
            blocks.push(Block::Image {
                alt: img.value().attr("alt").unwrap_or_default().to_string(),
                src: resolve_against(base, src),
            });
        }
    }

    for element in doc.select(&PICTURE_SOURCE).chain(doc.select(&IMG_SRCSET)) {
        if let Some(srcset) = element.value().attr("srcset") {
            blocks.extend(
                parse_srcset(srcset)
                    .into_iter()
                    .map(|url| Block::ImageLink(resolve_against(base, url))),
            );
        }
    }

    blocks.extend(
        doc.select(&AUDIO)
            .filter_map(|e| e.value().attr("src"))
            .map(|src| Block::AudioLink(resolve_against(base, src))),
    );
    blocks.extend(
        doc.select(&VIDEO)
            .filter_map(|e| e.value().attr("src"))
            .map(|src| Block::VideoLink(resolve_against(base, src))),
    );

    blocks
}

/// Candidate URLs of a `srcset` attribute, descriptors dropped.
pub fn parse_srcset(srcset: &str) -> Vec<&str> {
    srcset
        .split(',')
        .filter_map(|candidate| candidate.split_whitespace().next())
        .collect()
}

fn table_block(table: ElementRef) -> Block {
    let header = table.select(&THEAD_ROW).next().map(|row| {
        row.select(&TH).map(trimmed_text).collect::<Vec<_>>()
    });
    let rows = table
        .select(&TBODY_ROW)
        .map(|row| row.select(&TD).map(trimmed_text).collect())
        .collect();
    Block::Table { header, rows }
}

fn list_items(list: ElementRef) -> Vec<String> {
    list.select(&LI).map(trimmed_text).collect()
}

/// Language named by a `language-*` class on the code element's parent.
fn code_language(code: ElementRef) -> Option<String> {
    let parent = code.parent().and_then(ElementRef::wrap)?;
    parent
        .value()
        .classes()
        .find_map(|class| class.strip_prefix("language-"))
        .map(str::to_string)
}

fn parent_name(element: ElementRef) -> Option<&str> {
    element
        .parent()
        .and_then(ElementRef::wrap)
        .map(|parent| parent.value().name())
}

fn trimmed_text(element: ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

impl Block {
    /// Appends this block's Markdown to `out`.
    pub fn render(&self, out: &mut String) {
        match self {
            Block::Heading { level, text } => {
                let _ = write!(out, "{} {}\n\n", "#".repeat(*level), text);
            }
            Block::Paragraph(text) => {
                let _ = write!(out, "{}\n\n", text);
            }
            Block::UnorderedList(items) => {
                out.push('\n');
                for item in items {
                    let _ = writeln!(out, "* {}", item);
                }
                out.push('\n');
            }
            Block::OrderedList(items) => {
                out.push('\n');
                for (i, item) in items.iter().enumerate() {
                    let _ = writeln!(out, "{}. {}", i + 1, item);
                }
                out.push('\n');
            }
            Block::CodeBlock { language, code } => {
                let _ = write!(
                    out,
                    "```{}\n{}\n```\n\n",
                    language.as_deref().unwrap_or_default(),
                    code
                );
            }
            Block::InlineCode(code) => {
                let _ = write!(out, "`{}`", code);
            }
            Block::Quote(text) => {
                let _ = write!(out, "> {}\n\n", text);
            }
            Block::Table { header, rows } => {
                out.push('\n');
                if let Some(cells) = header {
                    out.push('|');
                    for cell in cells {
                        let _ = write!(out, "{}|", cell);
                    }
                    out.push_str("\n|");
                    for _ in cells {
                        out.push_str("---|");
                    }
                    out.push('\n');
                }
                for row in rows {
                    out.push('|');
                    for cell in row {
                        let _ = write!(out, "{}|", cell);
                    }
                    out.push('\n');
                }
                out.push('\n');
            }
            Block::Card {
                links,
                descriptions,
            } => {
                for (title, link) in links {
                    let _ = write!(out, "## [{}]({})\n\n", title, link);
                }
                for description in descriptions {
                    let _ = write!(out, "{}\n\n", description);
                }
            }
            Block::Image { alt, src } => {
                let _ = write!(out, "![{}]({})\n\n", alt, src);
            }
            Block::ImageLink(url) => {
                let _ = write!(out, "[Image Link]({})\n\n", url);
            }
            Block::AudioLink(url) => {
                let _ = write!(out, "[Audio Link]({})\n\n", url);
            }
            Block::VideoLink(url) => {
                let _ = write!(out, "[Video Link]({})\n\n", url);
            }
        }
    }
}
