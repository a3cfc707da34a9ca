use std::path::Path;

use anyhow::Context;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use crate::error::ScrapeError;
use crate::extract;
use crate::fetch::{BrowserFetcher, PageFetcher};
use crate::sink::{CsvSink, ProductRecord};
use crate::sitemap;

/// Outcome counts for one run.
pub struct RunStats {
    pub total: usize,
    pub saved: usize,
    pub skipped: usize,
}

/// Full pipeline: browser up, scrape everything, browser down.
///
/// The browser session is released on every exit path, including a fatal
/// sitemap or sink failure; a close failure is logged but never masks the
/// run's own result.
pub async fn run(
    sitemap_url: &str,
    output: &Path,
    limit: Option<usize>,
) -> anyhow::Result<RunStats> {
    let fetcher = BrowserFetcher::launch()
        .await
        .context("failed to launch headless browser")?;

    let result = drive(&fetcher, sitemap_url, output, limit).await;

    if let Err(e) = fetcher.close().await {
        warn!("Browser did not shut down cleanly: {}", e);
    }

    result
}

/// Discover product URLs, then render → extract → append, one URL at a time.
///
/// Page-level failures skip that URL and keep going; sitemap and output-file
/// failures abort. On a sitemap failure the output file has already been
/// created and holds the header row alone.
async fn drive<F: PageFetcher>(
    fetcher: &F,
    sitemap_url: &str,
    output: &Path,
    limit: Option<usize>,
) -> anyhow::Result<RunStats> {
    let sink = CsvSink::create(output).context("failed to initialize output file")?;

    let locations = sitemap::fetch_sitemap(sitemap_url).await?;
    let mut urls = sitemap::filter_product_urls(locations);
    info!("Product pages after filtering: {}", urls.len());

    if let Some(n) = limit {
        urls.truncate(n);
    }

    let pb = ProgressBar::new(urls.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} ({per_sec}, eta {eta})")?
            .progress_chars("=> "),
    );

    let mut stats = RunStats {
        total: urls.len(),
        saved: 0,
        skipped: 0,
    };

    for url in &urls {
        match scrape_one(fetcher, url).await {
            Ok(record) => {
                sink.append(&record).context("failed to write output row")?;
                info!("Saved: {}", record.name);
                stats.saved += 1;
            }
            Err(e) => {
                warn!("Skipping {}: {}", url, e);
                stats.skipped += 1;
            }
        }
        pb.inc(1);
    }

    pb.finish_and_clear();
    Ok(stats)
}

async fn scrape_one<F: PageFetcher>(
    fetcher: &F,
    url: &str,
) -> Result<ProductRecord, ScrapeError> {
    let markup = fetcher.fetch(url).await?;
    extract::extract_product(&markup, url)
}
