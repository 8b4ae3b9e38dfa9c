use crate::cache::ResultCache;
use crate::config::ExtractionConfig;
use crate::error::ExtractError;
use crate::heuristics;
use crate::isolate::{self, Cleaner, Isolated, ReadabilityCleaner};
use crate::markdown::{Serialized, append_references, serialize};
use crate::metadata::{self, Metadata};
use crate::render::Renderer;
use crate::resolve::normalize_url;
use crate::results::PageRecord;
use crate::structured::{self, CardExtractor, StructuredData, StructuredExtractor};
use std::sync::Arc;

/// Everything produced from a page's HTML before collaborators are involved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transformed {
    pub markdown: String,
    pub metadata: Metadata,
    pub structured_data: StructuredData,
    /// HTML the Markdown was serialized from
    pub effective_html: String,
}

/// Turns fetched pages into [`PageRecord`]s, at most once per URL.
///
/// One `Extractor` is shared by all workers of a run.
pub struct Extractor {
    cache: ResultCache,
    cleaner: Box<dyn Cleaner>,
    extractors: Vec<Box<dyn StructuredExtractor>>,
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new()
    }
}

impl Extractor {
    /// Extractor using readability for isolation and the card extractor
    pub fn new() -> Self {
        Self {
            cache: ResultCache::new(),
            cleaner: Box::new(ReadabilityCleaner),
            extractors: vec![Box::new(CardExtractor)],
        }
    }

    /// Replace the readability step
    pub fn with_cleaner(mut self, cleaner: impl Cleaner + 'static) -> Self {
        self.cleaner = Box::new(cleaner);
        self
    }

    /// Add a structured extractor
    pub fn with_extractor(mut self, extractor: impl StructuredExtractor + 'static) -> Self {
        self.extractors.push(Box::new(extractor));
        self
    }

    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    /// Processes one page.
    ///
    /// `html` is the fetched or rendered document for `url`. A URL already in
    /// the cache returns the stored record without looking at `html`. Errors
    /// concern this page only and are logged before being returned.
    pub async fn process<R: Renderer>(
        &self,
        url: &str,
        html: &str,
        config: &ExtractionConfig,
        renderer: &R,
    ) -> Result<Arc<PageRecord>, ExtractError> {
        let key = normalize_url(url);

        let result = if config.cache() {
            self.cache
                .get_or_try_compute(&key, || self.build_record(&key, html, config, renderer))
                .await
        } else {
            self.build_record(&key, html, config, renderer)
                .await
                .map(Arc::new)
        };

        if let Err(e) = &result {
            ::log::error!("No record for {}: {}", url, e);
        }
        result
    }

    async fn build_record<R: Renderer>(
        &self,
        url: &str,
        html: &str,
        config: &ExtractionConfig,
        renderer: &R,
    ) -> Result<PageRecord, ExtractError> {
        let Transformed {
            markdown,
            metadata,
            structured_data,
            effective_html,
        } = self.transform(html, config)?;

        let screenshot_path = if config.screenshots() {
            let path = renderer.screenshot(url).await?;
            ::log::info!("Screenshot saved: {}", path.display());
            Some(path)
        } else {
            None
        };

        Ok(PageRecord {
            url: url.to_string(),
            markdown,
            metadata,
            structured_data,
            screenshot_path,
            raw_content: effective_html,
        })
    }

    /// Runs the synchronous part of the pipeline: isolation, metadata,
    /// serialization, filtering and structured extraction.
    pub fn transform(
        &self,
        html: &str,
        config: &ExtractionConfig,
    ) -> Result<Transformed, ExtractError> {
        let base = config.base_url();
        let Isolated {
            mut tree,
            effective_html,
            ..
        } = isolate::isolate(html, base, config.readability(), self.cleaner.as_ref())?;

        let metadata = metadata::extract(&tree, base);

        let Serialized {
            mut markdown,
            references,
        } = serialize(&mut tree, &metadata, config);
        if config.heuristics() {
            markdown = heuristics::filter(&markdown);
        }
        append_references(&mut markdown, &references);

        let structured_data = structured::extract_all(&self.extractors, &tree, base);

        Ok(Transformed {
            markdown,
            metadata,
            structured_data,
            effective_html,
        })
    }
}
