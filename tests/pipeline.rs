use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use url::Url;
use yield_markdown::isolate::Cleaner;
use yield_markdown::render::{NoRenderer, Renderer};
use yield_markdown::{ExtractError, ExtractionConfig, Extractor};

const SIMPLE: &str = "<html><head><title>T</title></head><body><p>one two three four five six</p></body></html>";

struct FailingCleaner;

impl Cleaner for FailingCleaner {
    fn clean(&self, _html: &str, _base: &Url) -> Result<String, ExtractError> {
        Err(ExtractError::Isolation("nothing readable".to_string()))
    }
}

struct ArticleCleaner;

impl Cleaner for ArticleCleaner {
    fn clean(&self, _html: &str, _base: &Url) -> Result<String, ExtractError> {
        Ok("<div><h2>Article</h2><p>The main readable body of the page.</p></div>".to_string())
    }
}

#[derive(Default)]
struct FakeRenderer {
    screenshots: AtomicUsize,
}

impl Renderer for FakeRenderer {
    async fn render(&self, _url: &str) -> Result<String, ExtractError> {
        Ok(SIMPLE.to_string())
    }

    async fn screenshot(&self, _url: &str) -> Result<PathBuf, ExtractError> {
        self.screenshots.fetch_add(1, Ordering::SeqCst);
        Ok(PathBuf::from("screenshots/e.test.png"))
    }
}

fn config() -> ExtractionConfig {
    ExtractionConfig::new("https://e.test").unwrap()
}

#[tokio::test]
async fn test_end_to_end_simple_page() {
    let extractor = Extractor::new();
    let record = extractor
        .process("https://e.test", SIMPLE, &config(), &NoRenderer)
        .await
        .unwrap();

    assert!(record.markdown.starts_with("# T\n\n---\n\n"), "{:?}", record.markdown);
    assert!(record.markdown.contains("one two three four five six\n\n"));
    assert_eq!(record.url, "https://e.test/");
    assert_eq!(record.title(), "T");
    assert_eq!(record.raw_content, SIMPLE);
    assert_eq!(record.screenshot_path, None);
    assert!(record.structured_data["blog_posts"].is_empty());
}

#[tokio::test]
async fn test_cached_record_is_returned_for_same_url() {
    let extractor = Extractor::new();
    let first = extractor
        .process("https://e.test/page", SIMPLE, &config(), &NoRenderer)
        .await
        .unwrap();
    let second = extractor
        .process(
            "https://e.test/page#section",
            "<html><body><p>different</p></body></html>",
            &config(),
            &NoRenderer,
        )
        .await
        .unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(extractor.cache().len().await, 1);
}

#[tokio::test]
async fn test_cache_disabled_recomputes() {
    let extractor = Extractor::new();
    let config = config().with_cache(false);
    let first = extractor
        .process("https://e.test/page", SIMPLE, &config, &NoRenderer)
        .await
        .unwrap();
    let second = extractor
        .process("https://e.test/page", SIMPLE, &config, &NoRenderer)
        .await
        .unwrap();

    assert!(!Arc::ptr_eq(&first, &second));
    assert_eq!(first, second);
    assert!(extractor.cache().is_empty().await);
}

#[tokio::test]
async fn test_readability_failure_falls_back_to_raw_html() {
    let config = config().with_readability(true);
    let with_fallback = Extractor::new()
        .with_cleaner(FailingCleaner)
        .transform(SIMPLE, &config)
        .unwrap();
    let without_readability = Extractor::new()
        .transform(SIMPLE, &config.clone().with_readability(false))
        .unwrap();

    assert_eq!(with_fallback, without_readability);
    assert_eq!(with_fallback.effective_html, SIMPLE);
}

#[tokio::test]
async fn test_cleaned_html_is_serialized_and_retained() {
    let extractor = Extractor::new().with_cleaner(ArticleCleaner);
    let record = extractor
        .process(
            "https://e.test/article",
            SIMPLE,
            &config().with_readability(true),
            &NoRenderer,
        )
        .await
        .unwrap();

    // The cleaned document has no head, so there is no title to show
    assert!(record.markdown.starts_with("---\n\n## Article\n\n"));
    assert!(record.markdown.contains("The main readable body of the page.\n\n"));
    assert!(!record.markdown.contains("one two three"));
    assert!(record.raw_content.starts_with("<div><h2>Article</h2>"));
    assert_eq!(record.title(), "");
}

const ARTICLE_PAGE: &str = r#"<html><head><title>Field notes</title></head><body>
    <nav><a href="/">Home</a> <a href="/archive">Archive</a></nav>
    <div class="sidebar" id="sidebar"><p>Subscribe today</p></div>
    <article>
      <h1>Field notes</h1>
      <p>The river rose overnight, flooding the lower meadow, and by morning the footbridge
         was under a foot of brown water, which meant the long way round through the woods.</p>
      <p>We counted herons along the bank, seven in all, standing in the shallows, patient
         and still, while the current carried branches, leaves, and the odd plank downstream.</p>
      <p>By afternoon the water had started to fall, slowly, leaving a line of silt on the
         fence posts, and the sheep came back down from the ridge to graze near the gate.</p>
    </article>
</body></html>"#;

#[tokio::test]
async fn test_readability_isolates_article_content() {
    let extractor = Extractor::new();
    let record = extractor
        .process(
            "https://e.test/notes",
            ARTICLE_PAGE,
            &config().with_readability(true),
            &NoRenderer,
        )
        .await
        .unwrap();

    assert!(record.markdown.contains("We counted herons along the bank"), "{}", record.markdown);
    assert!(record.markdown.contains("the sheep came back down from the ridge"));
    assert!(!record.markdown.contains("Subscribe today"), "{}", record.markdown);
    assert!(!record.markdown.contains("Archive"));
    assert_ne!(record.raw_content, ARTICLE_PAGE);
    assert!(!record.raw_content.contains("Subscribe today"));
}

#[tokio::test]
async fn test_heuristics_drop_short_units() {
    let html = "<html><head><title>T</title></head><body>\
                <p>one two three four five</p>\
                <p>one two three four five six</p></body></html>";
    let record = Extractor::new()
        .process("https://e.test/h", html, &config().with_heuristics(true), &NoRenderer)
        .await
        .unwrap();

    assert_eq!(record.markdown, "one two three four five six\n\n");
}

#[tokio::test]
async fn test_empty_document_yields_no_record_and_is_not_cached() {
    let extractor = Extractor::new();
    let result = extractor
        .process("https://e.test/empty", "  ", &config(), &NoRenderer)
        .await;
    assert!(matches!(result, Err(ExtractError::Parse(_))));
    assert!(extractor.cache().get("https://e.test/empty").await.is_none());

    // A sibling page is unaffected
    let record = extractor
        .process("https://e.test/other", SIMPLE, &config(), &NoRenderer)
        .await
        .unwrap();
    assert_eq!(record.title(), "T");
}

#[tokio::test]
async fn test_screenshot_path_recorded() {
    let renderer = FakeRenderer::default();
    let extractor = Extractor::new();
    let config = config().with_screenshots(true);

    let record = extractor
        .process("https://e.test/shot", SIMPLE, &config, &renderer)
        .await
        .unwrap();
    assert_eq!(
        record.screenshot_path,
        Some(PathBuf::from("screenshots/e.test.png"))
    );

    extractor
        .process("https://e.test/shot", SIMPLE, &config, &renderer)
        .await
        .unwrap();
    assert_eq!(renderer.screenshots.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_screenshot_failure_fails_the_page() {
    let result = Extractor::new()
        .process(
            "https://e.test/shot",
            SIMPLE,
            &config().with_screenshots(true),
            &NoRenderer,
        )
        .await;
    assert!(matches!(result, Err(ExtractError::Render { .. })));
}

#[tokio::test]
async fn test_rendered_html_goes_through_the_same_pipeline() {
    let renderer = FakeRenderer::default();
    let html = renderer.render("https://e.test").await.unwrap();
    let config = config().with_dynamic_rendering(true);
    let record = Extractor::new()
        .process("https://e.test", &html, &config, &renderer)
        .await
        .unwrap();
    assert!(record.markdown.starts_with("# T\n\n---\n\n"));
}

#[tokio::test]
async fn test_metadata_and_cards_end_to_end() {
    let html = r#"<html><head>
            <title>Blog</title>
            <meta name="description" content="Posts">
            <meta property="og:type" content="website">
            <link rel="canonical" href="/blog">
            <link rel="icon" href="/favicon.ico">
        </head><body>
            <nav><a href="/">Home</a></nav>
            <div class="card-body">
              <h2 class="card-title"><a href="/blog/first">First</a></h2>
              <h4 class="card-text">Intro post</h4>
            </div>
        </body></html>"#;
    let record = Extractor::new()
        .process("https://e.test/blog?page=1", html, &config(), &NoRenderer)
        .await
        .unwrap();

    assert_eq!(record.metadata["description"], "Posts");
    assert_eq!(record.metadata["og:type"], "website");
    assert_eq!(record.metadata["canonical_url"], "https://e.test/blog");
    assert_eq!(record.metadata["favicon_url"], "https://e.test/favicon.ico");
    assert!(record.markdown.starts_with(
        "# Blog\n\n> Posts\n\n**Canonical URL:** https://e.test/blog\n\n---\n\n"
    ));
    assert!(record
        .markdown
        .contains("## [First](https://e.test/blog/first)\n\nIntro post\n\n"));

    let posts = &record.structured_data["blog_posts"];
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0]["link"], "https://e.test/blog/first");
    assert_eq!(posts[0]["description"], "Intro post");
}
