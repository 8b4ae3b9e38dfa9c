use clap::Parser;
use std::path::Path;
use yield_markdown::utils::sanitize_filename;
use yield_markdown::{PageRecord, Pages};

mod args;
use args::Args;

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::init();

    let args = Args::parse();

    ::log::info!("Starting crawler for URI: {}", args.uri);

    let config = match args.crawl_config() {
        Ok(config) => config,
        Err(e) => {
            ::log::error!("Invalid configuration: {}", e);
            return;
        }
    };

    if config.needs_renderer() {
        println!("Note: rendering and screenshots require a WebDriver server (e.g., ChromeDriver).");
        println!(
            "Set WEBDRIVER_URL environment variable if not using the default http://localhost:4444"
        );
    }

    let mut rx = match Pages::new(&args.uri).with_config(config).generate().await {
        Ok(rx) => rx,
        Err(e) => {
            ::log::error!("Failed to start crawler: {}", e);
            return;
        }
    };

    let mut pages_processed = 0;
    let start_time = std::time::Instant::now();

    while let Some(page) = rx.recv().await {
        pages_processed += 1;
        if let Err(e) = write_page(&page, args.out_dir.as_deref()) {
            ::log::error!("Failed to write {}: {}", page.url, e);
        }
    }

    ::log::info!(
        "Crawling complete - processed {} pages in {:.2} seconds",
        pages_processed,
        start_time.elapsed().as_secs_f64()
    );
}

/// Writes a record's Markdown to `out_dir`, or to stdout when there is none
fn write_page(page: &PageRecord, out_dir: Option<&Path>) -> std::io::Result<()> {
    match out_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let path = dir.join(format!("{}.md", sanitize_filename(&page.url)));
            std::fs::write(&path, &page.markdown)?;
            ::log::info!("Wrote {} to {}", page.url, path.display());
        }
        None => {
            println!("<!-- {} -->", page.url);
            println!("{}", page.markdown);
        }
    }
    Ok(())
}
