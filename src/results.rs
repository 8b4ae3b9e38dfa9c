use crate::metadata::Metadata;
use crate::structured::StructuredData;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// The extraction result for one page of a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRecord {
    /// Normalized URL of the page, the cache key
    pub url: String,

    /// Serialized and filtered Markdown
    pub markdown: String,

    /// Title, description, canonical/favicon URLs and raw meta pairs
    pub metadata: Metadata,

    /// Items produced by the structured extractors, by extractor name
    #[serde(default)]
    pub structured_data: StructuredData,

    /// Screenshot written by the rendering service, if requested
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screenshot_path: Option<PathBuf>,

    /// HTML the Markdown was serialized from
    pub raw_content: String,
}

impl PageRecord {
    /// Title of the page; empty when the page has none
    pub fn title(&self) -> &str {
        self.metadata
            .get(crate::metadata::TITLE)
            .map(String::as_str)
            .unwrap_or_default()
    }
}
