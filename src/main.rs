mod error;
mod extract;
mod fetch;
mod pipeline;
mod sink;
mod sitemap;

use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;

#[derive(Parser)]
#[command(
    name = "product_scraper",
    about = "Sitemap-driven e-commerce product scraper"
)]
struct Cli {
    /// URL of the XML sitemap listing the site's pages
    url: String,

    /// CSV file the extracted products are written to
    #[arg(short, long, default_value = "products.csv")]
    output: PathBuf,

    /// Max product pages to scrape (default: all)
    #[arg(short = 'n', long)]
    limit: Option<usize>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let stats = pipeline::run(&cli.url, &cli.output, cli.limit).await?;

    println!(
        "Done: {} pages ({} saved, {} skipped) -> {}",
        stats.total,
        stats.saved,
        stats.skipped,
        cli.output.display()
    );

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("Finished in {}", format_duration(elapsed));
    }

    Ok(())
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else {
        format!("{}m {}s", secs / 60, secs % 60)
    }
}
