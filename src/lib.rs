//! Turns fetched web pages into clean, deterministic Markdown records.
//!
//! The extraction pipeline lives in [`pipeline::Extractor`]: content
//! isolation ([`isolate`]), metadata harvesting ([`metadata`]), Markdown
//! serialization ([`markdown`]), short-paragraph filtering ([`heuristics`])
//! and structured extraction ([`structured`]), with a run-scoped
//! [`cache::ResultCache`] in front. [`Pages`] drives a crawl that feeds the
//! pipeline and yields records as they are produced.

pub mod cache;
pub mod config;
pub mod crawlers;
pub mod error;
pub mod filter;
pub mod heuristics;
pub mod isolate;
pub mod markdown;
pub mod metadata;
pub mod pipeline;
pub mod render;
pub mod resolve;
pub mod results;
pub mod structured;
pub mod utils;

// Re-export commonly used types for convenience
pub use config::{CrawlConfig, ExtractionConfig};
pub use error::ExtractError;
pub use pipeline::Extractor;
pub use results::PageRecord;

use std::path::Path;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Builder for a crawl that yields a [`PageRecord`] per page
pub struct Pages {
    config: CrawlConfig,
    extractor: Option<Extractor>,
}

impl Pages {
    /// Create a builder crawling from `start_url` with default settings
    pub fn new(start_url: &str) -> Self {
        Self {
            config: CrawlConfig::new(start_url),
            extractor: None,
        }
    }

    /// Replace the whole configuration, keeping the start URL
    pub fn with_config(mut self, config: CrawlConfig) -> Self {
        let start_url = std::mem::take(&mut self.config.start_url);
        self.config = CrawlConfig { start_url, ..config };
        self
    }

    /// Load configuration from a JSON file
    pub fn with_config_file(
        self,
        path: impl AsRef<Path>,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let config = CrawlConfig::from_file(path)?;
        Ok(self.with_config(config))
    }

    /// Load configuration from a JSON string
    pub fn with_config_str(self, json: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let config = CrawlConfig::from_json(json)?;
        Ok(self.with_config(config))
    }

    /// Set the maximum number of pages processed at once
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.config.max_concurrency = max_concurrency;
        self
    }

    /// Set how many links away from the start page the crawl goes
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.config.max_depth = max_depth;
        self
    }

    /// Use a custom extractor, e.g. with additional structured extractors
    pub fn with_extractor(mut self, extractor: Extractor) -> Self {
        self.extractor = Some(extractor);
        self
    }

    pub fn config(&self) -> &CrawlConfig {
        &self.config
    }

    /// Start the crawler and get a receiver for records
    pub async fn generate(
        self,
    ) -> Result<mpsc::Receiver<Arc<PageRecord>>, Box<dyn std::error::Error + Send + Sync>> {
        let mut config = self.config;

        // Override the WebDriver URL with an environment variable if provided
        if let Ok(webdriver_url) = std::env::var("WEBDRIVER_URL") {
            if !webdriver_url.is_empty() {
                config.webdriver_url = webdriver_url;
            }
        }

        crawlers::web::start_with_extractor(&config, self.extractor.unwrap_or_default()).await
    }
}
