use clap::Parser;
use std::path::PathBuf;
use yield_markdown::CrawlConfig;

#[derive(Parser, Debug)]
#[command(name = "yield-markdown")]
#[command(about = "Crawler that turns web pages into clean Markdown")]
#[command(version)]
pub struct Args {
    /// URL to start crawling from
    pub uri: String,

    /// JSON crawl configuration file; flags below override it
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Number of pages processed concurrently
    #[arg(short, long)]
    pub concurrency: Option<usize>,

    /// How many links away from the start page to follow
    #[arg(short = 'd', long)]
    pub max_depth: Option<usize>,

    /// Isolate the main content with readability
    #[arg(long)]
    pub readability: bool,

    /// Drop paragraphs of five words or fewer
    #[arg(long)]
    pub heuristics: bool,

    /// Render pages through WebDriver so scripts run
    #[arg(long)]
    pub js: bool,

    /// Capture a screenshot of every page
    #[arg(long)]
    pub screenshots: bool,

    /// Process every page even if its URL was already seen in this run
    #[arg(long)]
    pub no_cache: bool,

    /// Write one Markdown file per page here instead of printing to stdout
    #[arg(short, long)]
    pub out_dir: Option<PathBuf>,
}

impl Args {
    /// Loads the configuration file, if any, and applies the flags on top
    pub fn crawl_config(&self) -> Result<CrawlConfig, Box<dyn std::error::Error>> {
        let mut config = match &self.config {
            Some(path) => CrawlConfig::from_file(path)?,
            None => CrawlConfig::new(&self.uri),
        };
        config.start_url = self.uri.clone();

        if let Some(concurrency) = self.concurrency {
            config.max_concurrency = concurrency;
        }
        if let Some(max_depth) = self.max_depth {
            config.max_depth = max_depth;
        }
        config.readability |= self.readability;
        config.heuristics |= self.heuristics;
        config.dynamic_rendering |= self.js;
        config.screenshots |= self.screenshots;
        if self.no_cache {
            config.cache = false;
        }
        Ok(config)
    }
}
