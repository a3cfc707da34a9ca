use tracing::info;

use crate::error::ScrapeError;

/// Path marker that distinguishes product pages from everything else the
/// sitemap lists (category pages, brand pages, editorial content).
pub const PRODUCT_PATTERN: &str = "/buy-";

/// Fetch the sitemap and return every `<loc>` it lists, in document order.
///
/// One GET, one attempt. A transport failure, a non-2xx status, or a body
/// that is not well-formed XML all abort the run: without the sitemap there
/// is nothing to scrape.
pub async fn fetch_sitemap(url: &str) -> Result<Vec<String>, ScrapeError> {
    info!("Fetching sitemap: {}", url);
    let client = reqwest::Client::new();

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|source| ScrapeError::Fetch {
            url: url.to_string(),
            source,
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(ScrapeError::Status {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }

    let xml = response
        .text()
        .await
        .map_err(|source| ScrapeError::Fetch {
            url: url.to_string(),
            source,
        })?;

    let locations = parse_urlset(&xml)?;
    info!("Total URLs in sitemap: {}", locations.len());
    Ok(locations)
}

/// Keep only product-page locations, preserving sitemap order.
pub fn filter_product_urls(locations: Vec<String>) -> Vec<String> {
    locations
        .into_iter()
        .filter(|loc| loc.contains(PRODUCT_PATTERN))
        .collect()
}

/// Parse a urlset XML document and return all `<url><loc>` values.
fn parse_urlset(xml: &str) -> Result<Vec<String>, ScrapeError> {
    let mut reader = quick_xml::Reader::from_str(xml);
    let mut locations = Vec::new();
    let mut in_url = false;
    let mut in_loc = false;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            quick_xml::events::Event::Start(e) => match e.name().as_ref() {
                b"url" => in_url = true,
                b"loc" if in_url => in_loc = true,
                _ => {}
            },
            quick_xml::events::Event::Text(e) if in_loc => {
                let loc = e.unescape().map_err(quick_xml::Error::from)?;
                locations.push(loc.into_owned());
            }
            quick_xml::events::Event::End(e) => match e.name().as_ref() {
                b"loc" => in_loc = false,
                b"url" => in_url = false,
                _ => {}
            },
            quick_xml::events::Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(locations)
}
