use crate::config::CrawlConfig;
use regex::Regex;
use url::Url;

/// Asset extensions never handed to the extractor
const ASSET_PATTERN: &str = r"(?i)\.(jpg|jpeg|png|gif|webp|css|js|ico|svg|woff|woff2|ttf|eot|pdf|zip|mp3|mp4)$";

/// Decides which discovered links belong to a crawl
#[derive(Debug)]
pub struct UrlFilter {
    /// Host links must stay on, unless external hosts are allowed
    required_host: Option<String>,
    include_regexes: Vec<Regex>,
    exclude_regexes: Vec<Regex>,
}

impl UrlFilter {
    /// Builds the filter for a crawl rooted at `root_url`
    pub fn new(root_url: &Url, config: &CrawlConfig) -> Result<Self, regex::Error> {
        let include_regexes = config
            .include_patterns
            .iter()
            .map(|pattern| Regex::new(pattern))
            .collect::<Result<Vec<_>, _>>()?;

        let mut exclude_regexes = vec![Regex::new(ASSET_PATTERN)?];
        for pattern in &config.exclude_patterns {
            exclude_regexes.push(Regex::new(pattern)?);
        }

        Ok(Self {
            required_host: if config.allow_external {
                None
            } else {
                root_url.host_str().map(str::to_string)
            },
            include_regexes,
            exclude_regexes,
        })
    }

    /// Determine if a URL should be crawled based on all filtering rules
    pub fn should_crawl(&self, url: &Url) -> bool {
        if !matches!(url.scheme(), "http" | "https") {
            return false;
        }

        if let Some(host) = &self.required_host {
            if url.host_str() != Some(host.as_str()) {
                return false;
            }
        }

        // Exclusions take precedence
        let url_str = url.as_str();
        if self.exclude_regexes.iter().any(|re| re.is_match(url_str)) {
            return false;
        }

        self.include_regexes.is_empty() || self.include_regexes.iter().any(|re| re.is_match(url_str))
    }
}
