use scraper::{Html, Selector};
use serde_json::Value;

use crate::error::ScrapeError;
use crate::sink::ProductRecord;

const CATEGORY_FALLBACK: &str = "N/A";

/// Pull a product record out of rendered page markup.
///
/// The product schema lives in the first `application/ld+json` script block.
/// A record is only built when `name`, `offers.price`, `offers.priceCurrency`
/// and `brand.name` all resolve; any lookup failure on a required path means
/// the page yields nothing and the caller moves on. `category` is optional
/// and falls back to `"N/A"`.
pub fn extract_product(html: &str, product_url: &str) -> Result<ProductRecord, ScrapeError> {
    let doc = Html::parse_document(html);
    let selector = Selector::parse(r#"script[type="application/ld+json"]"#)
        .expect("static selector is valid");

    let script = doc
        .select(&selector)
        .next()
        .ok_or(ScrapeError::MissingJsonLd)?;
    let json_text: String = script.text().collect();

    let data: Value = serde_json::from_str(&json_text)?;

    let name = required(&data, "name")?;
    let price = required(&data, "offers.price")?;
    let currency = required(&data, "offers.priceCurrency")?;
    let brand = required(&data, "brand.name")?;
    let category = scalar_string(&data, "category")
        .unwrap_or_else(|| CATEGORY_FALLBACK.to_string());

    Ok(ProductRecord {
        product_url: product_url.to_string(),
        name,
        price,
        currency,
        brand,
        category,
    })
}

/// Resolve a dotted path to a non-empty scalar, or fail with the path name.
fn required(data: &Value, path: &'static str) -> Result<String, ScrapeError> {
    scalar_string(data, path).ok_or(ScrapeError::MissingField { path })
}

/// Walk a dotted path and render the leaf as text.
///
/// Sites are inconsistent about scalar types (`"price": "19.99"` vs
/// `"price": 19.99`), so both strings and numbers are accepted, verbatim.
/// Empty strings, objects, arrays, booleans and nulls all count as absent.
fn scalar_string(data: &Value, path: &str) -> Option<String> {
    let mut node = data;
    for key in path.split('.') {
        node = node.get(key)?;
    }
    match node {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(json: &str) -> String {
        format!(
            r#"<html><head><title>p</title>
            <script type="application/ld+json">{}</script>
            </head><body><h1>product</h1></body></html>"#,
            json
        )
    }

    const FULL: &str = r#"{"name":"Widget","offers":{"price":"19.99","priceCurrency":"USD"},"brand":{"name":"Acme"},"category":"Tools"}"#;

    #[test]
    fn full_record() {
        let record = extract_product(&page(FULL), "https://shop.example/buy-widget").unwrap();
        assert_eq!(record.product_url, "https://shop.example/buy-widget");
        assert_eq!(record.name, "Widget");
        assert_eq!(record.price, "19.99");
        assert_eq!(record.currency, "USD");
        assert_eq!(record.brand, "Acme");
        assert_eq!(record.category, "Tools");
    }

    #[test]
    fn numeric_price_kept_verbatim() {
        let json = r#"{"name":"Widget","offers":{"price":19.99,"priceCurrency":"USD"},"brand":{"name":"Acme"}}"#;
        let record = extract_product(&page(json), "u").unwrap();
        assert_eq!(record.price, "19.99");
    }

    #[test]
    fn missing_category_falls_back() {
        let json = r#"{"name":"Widget","offers":{"price":"19.99","priceCurrency":"USD"},"brand":{"name":"Acme"}}"#;
        let record = extract_product(&page(json), "u").unwrap();
        assert_eq!(record.category, "N/A");
    }

    #[test]
    fn no_script_block() {
        let err = extract_product("<html><body>plain page</body></html>", "u").unwrap_err();
        assert!(matches!(err, ScrapeError::MissingJsonLd));
    }

    #[test]
    fn invalid_json() {
        let err = extract_product(&page("{not json"), "u").unwrap_err();
        assert!(matches!(err, ScrapeError::Json(_)));
    }

    #[test]
    fn each_required_path_reported() {
        let cases = [
            (
                r#"{"offers":{"price":"1","priceCurrency":"USD"},"brand":{"name":"A"}}"#,
                "name",
            ),
            (
                r#"{"name":"W","offers":{"priceCurrency":"USD"},"brand":{"name":"A"}}"#,
                "offers.price",
            ),
            (
                r#"{"name":"W","offers":{"price":"1"},"brand":{"name":"A"}}"#,
                "offers.priceCurrency",
            ),
            (r#"{"name":"W","offers":{"price":"1","priceCurrency":"USD"}}"#, "brand.name"),
        ];
        for (json, expected) in cases {
            let err = extract_product(&page(json), "u").unwrap_err();
            match err {
                ScrapeError::MissingField { path } => assert_eq!(path, expected),
                other => panic!("expected MissingField, got {other:?}"),
            }
        }
    }

    #[test]
    fn empty_required_string_is_missing() {
        let json = r#"{"name":"","offers":{"price":"1","priceCurrency":"USD"},"brand":{"name":"A"}}"#;
        let err = extract_product(&page(json), "u").unwrap_err();
        assert!(matches!(err, ScrapeError::MissingField { path: "name" }));
    }

    #[test]
    fn non_scalar_required_field_is_missing() {
        let json = r#"{"name":["W"],"offers":{"price":"1","priceCurrency":"USD"},"brand":{"name":"A"}}"#;
        let err = extract_product(&page(json), "u").unwrap_err();
        assert!(matches!(err, ScrapeError::MissingField { path: "name" }));
    }

    #[test]
    fn first_script_block_wins() {
        let html = format!(
            r#"<html><head>
            <script type="application/ld+json">{}</script>
            <script type="application/ld+json">{{"name":"Other"}}</script>
            </head></html>"#,
            FULL
        );
        let record = extract_product(&html, "u").unwrap();
        assert_eq!(record.name, "Widget");
    }

    #[test]
    fn non_ld_scripts_ignored() {
        let html = format!(
            r#"<html><head>
            <script type="text/javascript">var x = 1;</script>
            <script type="application/ld+json">{}</script>
            </head></html>"#,
            FULL
        );
        let record = extract_product(&html, "u").unwrap();
        assert_eq!(record.name, "Widget");
    }

    #[test]
    fn realistic_fixture_page() {
        let html = std::fs::read_to_string("tests/fixtures/product_page.html").unwrap();
        let record =
            extract_product(&html, "https://shop.example/buy-suede-chelsea-boots").unwrap();
        assert_eq!(record.name, "Suede Chelsea Boots");
        assert_eq!(record.price, "349.00");
        assert_eq!(record.currency, "AED");
        assert_eq!(record.brand, "Steve Madden");
        assert_eq!(record.category, "Shoes");
    }
}
