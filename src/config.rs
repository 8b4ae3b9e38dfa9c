use crate::error::ExtractError;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use url::Url;

/// Per-request extraction settings.
///
/// Built once through [`ExtractionConfig::new`] and the `with_*` methods, then
/// handed through the pipeline unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionConfig {
    base_url: Url,
    readability: bool,
    heuristics: bool,
    dynamic_rendering: bool,
    screenshots: bool,
    cache: bool,
}

impl ExtractionConfig {
    /// Create a configuration for pages resolved against `base_url`.
    ///
    /// All optional stages start disabled except the result cache.
    pub fn new(base_url: &str) -> Result<Self, ExtractError> {
        let base_url = Url::parse(base_url).map_err(|source| ExtractError::InvalidUrl {
            url: base_url.to_string(),
            source,
        })?;
        Ok(Self {
            base_url,
            readability: false,
            heuristics: false,
            dynamic_rendering: false,
            screenshots: false,
            cache: true,
        })
    }

    pub fn with_readability(mut self, enabled: bool) -> Self {
        self.readability = enabled;
        self
    }

    pub fn with_heuristics(mut self, enabled: bool) -> Self {
        self.heuristics = enabled;
        self
    }

    /// Marks the source HTML as coming from the rendering service.
    /// Extraction itself behaves the same either way.
    pub fn with_dynamic_rendering(mut self, enabled: bool) -> Self {
        self.dynamic_rendering = enabled;
        self
    }

    pub fn with_screenshots(mut self, enabled: bool) -> Self {
        self.screenshots = enabled;
        self
    }

    pub fn with_cache(mut self, enabled: bool) -> Self {
        self.cache = enabled;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn readability(&self) -> bool {
        self.readability
    }

    pub fn heuristics(&self) -> bool {
        self.heuristics
    }

    pub fn dynamic_rendering(&self) -> bool {
        self.dynamic_rendering
    }

    pub fn screenshots(&self) -> bool {
        self.screenshots
    }

    pub fn cache(&self) -> bool {
        self.cache
    }
}

/// Configuration for a crawl run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlConfig {
    /// URL to start crawling from
    pub start_url: String,

    /// Maximum number of pages processed at once
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// Link depth below the start page that is still visited
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Whether to allow crawling external domains/sites
    #[serde(default)]
    pub allow_external: bool,

    /// Regex patterns for URLs to include
    #[serde(default)]
    pub include_patterns: Vec<String>,

    /// Regex patterns for URLs to exclude
    #[serde(default)]
    pub exclude_patterns: Vec<String>,

    /// URL for the WebDriver instance
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,

    /// Directory screenshots are written to
    #[serde(default = "default_screenshot_dir")]
    pub screenshot_dir: PathBuf,

    /// Isolate the main content with readability before serializing
    #[serde(default)]
    pub readability: bool,

    /// Drop short paragraphs from the Markdown
    #[serde(default)]
    pub heuristics: bool,

    /// Fetch pages through the WebDriver instead of a plain HTTP GET
    #[serde(default)]
    pub dynamic_rendering: bool,

    /// Capture a screenshot of every page
    #[serde(default)]
    pub screenshots: bool,

    /// Reuse records for URLs already processed in this run
    #[serde(default = "default_cache")]
    pub cache: bool,
}

impl CrawlConfig {
    /// Create a new configuration with default values
    pub fn new(start_url: &str) -> Self {
        Self {
            start_url: start_url.to_string(),
            max_concurrency: default_max_concurrency(),
            max_depth: default_max_depth(),
            allow_external: false,
            include_patterns: Vec::new(),
            exclude_patterns: Vec::new(),
            webdriver_url: default_webdriver_url(),
            screenshot_dir: default_screenshot_dir(),
            readability: false,
            heuristics: false,
            dynamic_rendering: false,
            screenshots: false,
            cache: default_cache(),
        }
    }

    /// Load configuration from a file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn Error>> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;
        Self::from_json(&contents)
    }

    /// Load configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self, Box<dyn Error>> {
        let config: Self = serde_json::from_str(json)?;
        Ok(config)
    }

    /// Extraction settings for a page of this crawl
    pub fn extraction_config(&self, page_url: &str) -> Result<ExtractionConfig, ExtractError> {
        Ok(ExtractionConfig::new(page_url)?
            .with_readability(self.readability)
            .with_heuristics(self.heuristics)
            .with_dynamic_rendering(self.dynamic_rendering)
            .with_screenshots(self.screenshots)
            .with_cache(self.cache))
    }

    /// Whether any stage needs the WebDriver
    pub fn needs_renderer(&self) -> bool {
        self.dynamic_rendering || self.screenshots
    }
}

fn default_max_concurrency() -> usize {
    5
}

fn default_max_depth() -> usize {
    2
}

fn default_webdriver_url() -> String {
    "http://localhost:4444".to_string()
}

fn default_screenshot_dir() -> PathBuf {
    PathBuf::from("./screenshots")
}

fn default_cache() -> bool {
    true
}
