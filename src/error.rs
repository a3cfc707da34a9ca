use thiserror::Error;

/// Everything that can go wrong between the sitemap and the CSV.
///
/// Sitemap-level and sink-level variants abort the run; page-level variants
/// (`Render`, `MissingJsonLd`, `Json`, `MissingField`) are caught by the
/// driver, logged with the offending URL, and the next URL is processed.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("sitemap fetch failed for {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("unexpected HTTP status {status} from {url}")]
    Status { status: u16, url: String },

    #[error("sitemap XML parse error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("browser launch failed: {0}")]
    BrowserLaunch(String),

    #[error("browser error: {0}")]
    Browser(#[from] chromiumoxide::error::CdpError),

    #[error("failed to render {url}: {reason}")]
    Render { url: String, reason: String },

    #[error("no application/ld+json script block in page")]
    MissingJsonLd,

    #[error("structured data is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("structured data missing required field {path}")]
    MissingField { path: &'static str },

    #[error("output write failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV write failed: {0}")]
    Csv(#[from] csv::Error),
}
