//! Rewrites internal references so a mirrored page browses offline
//!
//! Every quoted `href`/`src` attribute inside a tag whose value resolves to
//! the root's origin is replaced by the relative path between the two mirror
//! targets. Text content, comments and `<script>`/`<style>` bodies are copied
//! as they are, and so are unquoted attribute values.

use crate::crawler::parser::attribute_references;
use crate::url::{map_mirror_path, relative_link, resolve_in_scope};
use std::collections::HashMap;
use url::Url;

/// Attributes whose quoted values are rewritten
const REWRITTEN_ATTRIBUTES: &[&str] = &["href", "src"];

/// Elements whose content is text, not markup
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// Rewrites same-origin references in `html` to local relative paths
///
/// # Example
///
/// ```
/// use site_mirror::crawler::rewrite_links;
/// use url::Url;
///
/// let root = Url::parse("https://example.com/").unwrap();
/// let page = Url::parse("https://example.com/catalogue/page-2/").unwrap();
/// let html = r#"<link rel="stylesheet" href="/static/style.css">"#;
/// assert_eq!(
///     rewrite_links(html, &page, &root),
///     r#"<link rel="stylesheet" href="../../static/style.css">"#
/// );
/// ```
pub fn rewrite_links(html: &str, page_url: &Url, root: &Url) -> String {
    let replacements = build_replacements(html, page_url, root);
    if replacements.is_empty() {
        return html.to_string();
    }
    rewrite_attributes(html, &replacements)
}

fn build_replacements(html: &str, page_url: &Url, root: &Url) -> HashMap<String, String> {
    let page_target = map_mirror_path(page_url, root);
    let mut replacements = HashMap::new();

    for reference in attribute_references(html) {
        if replacements.contains_key(&reference) {
            continue;
        }
        let Ok(Some(url)) = resolve_in_scope(page_url, &reference, root) else {
            continue;
        };

        let mut local = relative_link(&page_target, &map_mirror_path(&url, root));
        if let Some((_, fragment)) = reference.split_once('#') {
            local.push('#');
            local.push_str(fragment);
        }
        replacements.insert(reference, local);
    }

    replacements
}

fn rewrite_attributes(html: &str, replacements: &HashMap<String, String>) -> String {
    let lower = html.to_ascii_lowercase();
    let bytes = lower.as_bytes();
    let mut out = String::with_capacity(html.len());
    let mut copied = 0;
    let mut pos = 0;

    while let Some(offset) = lower[pos..].find('<') {
        let tag_start = pos + offset;

        if lower[tag_start..].starts_with("<!--") {
            pos = lower[tag_start..]
                .find("-->")
                .map_or(lower.len(), |end| tag_start + end + 3);
            continue;
        }

        let Some(tag_end) = find_tag_end(bytes, tag_start) else {
            break;
        };

        let mut i = tag_start + 1;
        while i < tag_end {
            if bytes[i] == b'"' || bytes[i] == b'\'' {
                i = skip_quoted(bytes, i).min(tag_end);
                continue;
            }
            let Some((start, end)) = quoted_value_at(bytes, i).filter(|&(_, end)| end < tag_end)
            else {
                i += 1;
                continue;
            };

            let key = html[start..end].replace("&amp;", "&");
            if let Some(local) = replacements.get(key.trim()) {
                out.push_str(&html[copied..start]);
                out.push_str(local);
                copied = end;
            }
            i = end + 1;
        }

        pos = tag_end + 1;
        if let Some(element) = raw_text_element(bytes, tag_start) {
            let closing = format!("</{}", element);
            pos = lower[pos..].find(&closing).map_or(lower.len(), |end| pos + end);
        }
    }

    out.push_str(&html[copied..]);
    out
}

/// Index of the `>` closing the tag opened at `start`, ignoring quoted `>`
fn find_tag_end(bytes: &[u8], start: usize) -> Option<usize> {
    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'>' => return Some(i),
            b'"' | b'\'' => i = skip_quoted(bytes, i),
            _ => i += 1,
        }
    }
    None
}

/// Position just past the quote closing the one at `open`
fn skip_quoted(bytes: &[u8], open: usize) -> usize {
    let quote = bytes[open];
    bytes[open + 1..]
        .iter()
        .position(|&b| b == quote)
        .map_or(bytes.len(), |len| open + len + 2)
}

/// Name of a `<script>`/`<style>` element opened at `start`, whose text is never rewritten
fn raw_text_element(bytes: &[u8], start: usize) -> Option<&'static str> {
    RAW_TEXT_ELEMENTS.iter().copied().find(|name| {
        let rest = &bytes[start + 1..];
        rest.starts_with(name.as_bytes())
            && rest
                .get(name.len())
                .map_or(true, |&b| b.is_ascii_whitespace() || b == b'>' || b == b'/')
    })
}

/// Returns the byte span of a quoted attribute value whose name starts at `pos`
fn quoted_value_at(bytes: &[u8], pos: usize) -> Option<(usize, usize)> {
    if pos == 0 || !bytes[pos - 1].is_ascii_whitespace() {
        return None;
    }

    let name = REWRITTEN_ATTRIBUTES
        .iter()
        .find(|name| bytes[pos..].starts_with(name.as_bytes()))?;

    let mut i = skip_whitespace(bytes, pos + name.len());
    if bytes.get(i) != Some(&b'=') {
        return None;
    }
    i = skip_whitespace(bytes, i + 1);

    let quote = *bytes.get(i)?;
    if quote != b'"' && quote != b'\'' {
        return None;
    }

    let start = i + 1;
    let len = bytes[start..].iter().position(|&b| b == quote)?;
    Some((start, start + len))
}

fn skip_whitespace(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() && bytes[i].is_ascii_whitespace() {
        i += 1;
    }
    i
}
