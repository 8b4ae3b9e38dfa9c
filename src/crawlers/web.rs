use crate::config::CrawlConfig;
use crate::filter::UrlFilter;
use crate::pipeline::Extractor;
use crate::render::{Renderer, WebDriverRenderer};
use crate::resolve::{normalize_url, resolve_against};
use crate::results::PageRecord;
use crate::utils::calculate_timeout;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use std::collections::{HashSet, VecDeque};
use std::error::Error;
use std::sync::Arc;
use tokio::sync::{Mutex, Notify, mpsc};
use url::Url;

type BoxError = Box<dyn Error + Send + Sync>;

static LINKS: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").unwrap());

/// A URL waiting to be visited and its link distance from the start page
#[derive(Debug, Clone, PartialEq, Eq)]
struct Task {
    url: String,
    depth: usize,
}

#[derive(Debug, Default)]
struct Frontier {
    queue: VecDeque<Task>,
    /// Normalized URLs ever queued
    seen: HashSet<String>,
    /// Tasks taken by a worker and not finished yet
    in_flight: usize,
}

/// State shared by all workers of one crawl
struct Shared {
    config: CrawlConfig,
    filter: UrlFilter,
    frontier: Mutex<Frontier>,
    wake: Notify,
    extractor: Extractor,
    renderer: WebDriverRenderer,
    http: reqwest::Client,
}

/// Starts a crawl and returns a receiver that yields a record per extracted page.
///
/// Pages that fail to fetch or extract are logged and skipped. The channel
/// closes once no page is queued and no worker is busy.
pub async fn start(config: &CrawlConfig) -> Result<mpsc::Receiver<Arc<PageRecord>>, BoxError> {
    start_with_extractor(config, Extractor::new()).await
}

/// Like [`start`] with a custom [`Extractor`]
pub async fn start_with_extractor(
    config: &CrawlConfig,
    extractor: Extractor,
) -> Result<mpsc::Receiver<Arc<PageRecord>>, BoxError> {
    ::log::info!("Starting web crawler for: {}", config.start_url);

    let root_url = Url::parse(&config.start_url)?;
    let filter = UrlFilter::new(&root_url, config)?;

    let mut frontier = Frontier::default();
    let start = normalize_url(root_url.as_str());
    frontier.seen.insert(start.clone());
    frontier.queue.push_back(Task {
        url: start,
        depth: 0,
    });

    let shared = Arc::new(Shared {
        config: config.clone(),
        filter,
        frontier: Mutex::new(frontier),
        wake: Notify::new(),
        extractor,
        renderer: WebDriverRenderer::new(&config.webdriver_url, &config.screenshot_dir),
        http: reqwest::Client::builder()
            .user_agent(concat!("yield-markdown/", env!("CARGO_PKG_VERSION")))
            .build()?,
    });

    let (result_tx, result_rx) = mpsc::channel::<Arc<PageRecord>>(100);

    let workers: Vec<_> = (0..config.max_concurrency.max(1))
        .map(|worker_id| tokio::spawn(worker_loop(worker_id, Arc::clone(&shared), result_tx.clone())))
        .collect();

    // Drop the original sender so the channel closes with the last worker
    drop(result_tx);

    tokio::spawn(async move {
        for worker in workers {
            if let Err(e) = worker.await {
                ::log::error!("Worker task failed: {}", e);
            }
        }
        ::log::info!("All workers have completed");
        shared.renderer.close().await;
    });

    Ok(result_rx)
}

async fn worker_loop(worker_id: usize, shared: Arc<Shared>, result_tx: mpsc::Sender<Arc<PageRecord>>) {
    ::log::debug!("Worker {} starting processing loop", worker_id);

    while let Some(task) = next_task(&shared).await {
        ::log::info!("Worker {} visiting: {}", worker_id, task.url);
        let (record, links) = visit(&shared, &task).await;
        finish_task(&shared, &task, links).await;

        if let Some(record) = record {
            if result_tx.send(record).await.is_err() {
                ::log::warn!("Worker {} stopping: result receiver dropped", worker_id);
                break;
            }
        }
    }

    ::log::debug!("Worker {} completed processing loop", worker_id);
}

/// Waits for the next queued task; `None` once the crawl is finished
async fn next_task(shared: &Shared) -> Option<Task> {
    loop {
        // Registered before inspecting the queue so a wake-up in between is not lost
        let woken = shared.wake.notified();
        {
            let mut frontier = shared.frontier.lock().await;
            if let Some(task) = frontier.queue.pop_front() {
                frontier.in_flight += 1;
                return Some(task);
            }
            if frontier.in_flight == 0 {
                shared.wake.notify_waiters();
                return None;
            }
        }
        woken.await;
    }
}

/// Marks `task` done and queues the links it produced
async fn finish_task(shared: &Shared, task: &Task, links: Vec<String>) {
    let mut frontier = shared.frontier.lock().await;
    frontier.in_flight -= 1;

    for link in links {
        if frontier.seen.insert(link.clone()) {
            ::log::debug!("Queuing link for crawling: {}", link);
            frontier.queue.push_back(Task {
                url: link,
                depth: task.depth + 1,
            });
        }
    }

    shared.wake.notify_waiters();
}

/// Fetches and extracts one page, returning its record and the links to follow
async fn visit(shared: &Shared, task: &Task) -> (Option<Arc<PageRecord>>, Vec<String>) {
    let html = match fetch(shared, &task.url).await {
        Ok(html) => html,
        Err(e) => {
            ::log::error!("Failed to fetch {}: {}", task.url, e);
            return (None, Vec::new());
        }
    };

    let links = if task.depth < shared.config.max_depth {
        discover_links(&html, &task.url, &shared.filter)
    } else {
        Vec::new()
    };

    let record = match shared.config.extraction_config(&task.url) {
        Ok(extraction) => shared
            .extractor
            .process(&task.url, &html, &extraction, &shared.renderer)
            .await
            .ok(),
        Err(e) => {
            ::log::error!("Cannot extract {}: {}", task.url, e);
            None
        }
    };

    (record, links)
}

/// Retrieves the page HTML, through the renderer when dynamic rendering is on
async fn fetch(shared: &Shared, url: &str) -> Result<String, BoxError> {
    if shared.config.dynamic_rendering {
        return Ok(shared.renderer.render(url).await?);
    }

    let response = shared
        .http
        .get(url)
        .timeout(calculate_timeout(30_000, url.len()))
        .send()
        .await?
        .error_for_status()?;

    let is_html = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_none_or(|content_type| content_type.contains("html"));
    if !is_html {
        return Err(format!("{} is not an HTML document", url).into());
    }

    Ok(response.text().await?)
}

/// In-scope, normalized links of a page
fn discover_links(html: &str, page_url: &str, filter: &UrlFilter) -> Vec<String> {
    let Ok(base) = Url::parse(page_url) else {
        return Vec::new();
    };
    let doc = Html::parse_document(html);

    let links: Vec<String> = doc
        .select(&LINKS)
        .filter_map(|a| a.value().attr("href"))
        .filter_map(|href| Url::parse(&resolve_against(&base, href)).ok())
        .filter(|url| filter.should_crawl(url))
        .map(|url| normalize_url(url.as_str()))
        .collect();

    ::log::debug!("Found {} crawlable links in {}", links.len(), page_url);
    links
}
