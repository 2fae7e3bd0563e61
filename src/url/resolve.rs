use crate::UrlError;
use url::Url;

/// Reference prefixes that never point at a fetchable document
const SKIPPED_SCHEMES: &[&str] = &["javascript:", "mailto:", "tel:", "data:"];

/// Resolves a reference taken from an `href`/`src` attribute against the page
/// it was found on
///
/// # Resolution Rules
///
/// 1. Trim surrounding whitespace; empty and fragment-only references are
///    same-page anchors and rejected as unsupported
/// 2. `javascript:`, `mailto:`, `tel:` and `data:` references are rejected
/// 3. Join against the base per RFC 3986 (absolute references replace the
///    base, `..`/`./`/`/`/`//` forms are resolved)
/// 4. Only HTTP(S) results with a host are accepted
/// 5. The fragment is dropped; scheme and host come out lowercase from
///    parsing, and the path keeps its trailing slash exactly as written
///
/// # Returns
///
/// * `Ok(Url)` - Absolute, normalized URL
/// * `Err(UrlError::Malformed)` - The reference does not form a URL
/// * `Err(UrlError::Unsupported)` - The reference is valid but not fetchable
///
/// # Examples
///
/// ```
/// use site_mirror::url::resolve;
/// use url::Url;
///
/// let base = Url::parse("https://site/a/b/").unwrap();
/// assert_eq!(resolve(&base, "../c").unwrap().as_str(), "https://site/a/c");
/// ```
pub fn resolve(base: &Url, reference: &str) -> Result<Url, UrlError> {
    let reference = reference.trim();

    if reference.is_empty() || reference.starts_with('#') {
        return Err(UrlError::Unsupported(format!(
            "same-page reference '{}'",
            reference
        )));
    }

    let lowered = reference.to_ascii_lowercase();
    if SKIPPED_SCHEMES.iter().any(|s| lowered.starts_with(s)) {
        return Err(UrlError::Unsupported(reference.to_string()));
    }

    let url = base
        .join(reference)
        .map_err(|e| UrlError::Malformed(format!("'{}': {}", reference, e)))?;

    normalize(url)
}

fn normalize(mut url: Url) -> Result<Url, UrlError> {
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::Unsupported(format!(
            "scheme '{}' in {}",
            url.scheme(),
            url
        )));
    }

    if url.host_str().is_none() {
        return Err(UrlError::MissingHost(url.to_string()));
    }

    url.set_fragment(None);
    Ok(url)
}
