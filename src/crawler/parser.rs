//! HTML parser for extracting links and assets
//!
//! This module only reads markup. References come back exactly as written in
//! the document; resolving them against the page is the caller's job so a
//! malformed reference can be dropped without losing the rest of the page.

use scraper::{ElementRef, Html, Selector};

/// Kind of same-page resource a mirrored page depends on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    Image,
    Stylesheet,
    Script,
    Icon,
    Media,
}

/// An asset reference found on a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRef {
    pub kind: AssetKind,
    pub reference: String,
}

/// Selectors for asset references and the attribute holding the reference
const ASSET_SELECTORS: &[(&str, &str, AssetKind)] = &[
    ("img[src]", "src", AssetKind::Image),
    ("link[rel~='stylesheet'][href]", "href", AssetKind::Stylesheet),
    ("script[src]", "src", AssetKind::Script),
    ("link[rel~='icon'][href]", "href", AssetKind::Icon),
    ("source[src]", "src", AssetKind::Media),
];

/// Extracted information from an HTML page
#[derive(Debug, Clone, Default)]
pub struct ParsedPage {
    /// Navigation references (unresolved)
    pub links: Vec<String>,

    /// Asset references (unresolved)
    pub assets: Vec<AssetRef>,
}

/// Parses HTML content and extracts links and assets
///
/// # Link Extraction Rules
///
/// **Links:**
/// - `<a href="...">` tags, except those carrying `download`
/// - `<link rel="canonical" href="...">`
///
/// **Assets:**
/// - `<img src>`, `<link rel="stylesheet" href>`, `<script src>`
/// - `<link rel="icon" href>`, `<source src>`
///
/// # Example
///
/// ```
/// use site_mirror::crawler::parse_page;
///
/// let html = r#"<html><head><link rel="stylesheet" href="/s.css"></head>
///               <body><a href="/page">Link</a></body></html>"#;
/// let parsed = parse_page(html);
/// assert_eq!(parsed.links, vec!["/page".to_string()]);
/// assert_eq!(parsed.assets[0].reference, "/s.css");
/// ```
pub fn parse_page(html: &str) -> ParsedPage {
    let document = Html::parse_document(html);

    ParsedPage {
        links: extract_links(&document),
        assets: extract_assets(&document),
    }
}

/// Collects every `href` and `src` value in the document
///
/// Used when rewriting a page for offline browsing.
pub fn attribute_references(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let mut values = Vec::new();

    for (selector, attr) in [("[href]", "href"), ("[src]", "src")] {
        if let Ok(selector) = Selector::parse(selector) {
            values.extend(
                document
                    .select(&selector)
                    .filter_map(|element| element.value().attr(attr))
                    .map(|value| value.trim().to_string()),
            );
        }
    }

    values
}

fn extract_links(document: &Html) -> Vec<String> {
    let mut links = Vec::new();

    if let Ok(a_selector) = Selector::parse("a[href]") {
        links.extend(
            document
                .select(&a_selector)
                .filter(|element| element.value().attr("download").is_none())
                .filter_map(|element| attr_value(element, "href")),
        );
    }

    if let Ok(canonical_selector) = Selector::parse("link[rel='canonical'][href]") {
        links.extend(
            document
                .select(&canonical_selector)
                .filter_map(|element| attr_value(element, "href")),
        );
    }

    links
}

fn extract_assets(document: &Html) -> Vec<AssetRef> {
    let mut assets = Vec::new();

    for (selector, attr, kind) in ASSET_SELECTORS {
        let Ok(selector) = Selector::parse(selector) else {
            continue;
        };
        assets.extend(
            document
                .select(&selector)
                .filter_map(|element| attr_value(element, attr))
                .map(|reference| AssetRef {
                    kind: *kind,
                    reference,
                }),
        );
    }

    assets
}

fn attr_value(element: ElementRef<'_>, attr: &str) -> Option<String> {
    element
        .value()
        .attr(attr)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}
