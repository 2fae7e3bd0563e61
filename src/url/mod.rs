//! URL handling module for Site-Mirror
//!
//! This module provides reference resolution, the same-origin check that
//! scopes the mirror, and the mapping from site URLs to local paths.

mod mirror_path;
mod origin;
mod resolve;

// Re-export main functions
pub use mirror_path::{map_mirror_path, relative_link, MirrorTarget, INDEX_FILENAME};
pub use origin::same_origin;
pub use resolve::resolve;

use crate::UrlError;
use url::Url;

/// Resolves a reference and keeps it only when it stays on the root's origin
///
/// Malformed and unsupported references are reported as errors; a valid
/// reference to another origin yields `Ok(None)`.
pub fn resolve_in_scope(base: &Url, reference: &str, root: &Url) -> Result<Option<Url>, UrlError> {
    let url = resolve(base, reference)?;
    Ok(same_origin(root, &url).then_some(url))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_in_scope_keeps_same_origin() {
        let root = Url::parse("https://example.com/").unwrap();
        let page = Url::parse("https://example.com/a/").unwrap();

        let url = resolve_in_scope(&page, "b.html", &root).unwrap();
        assert_eq!(url.unwrap().as_str(), "https://example.com/a/b.html");
    }

    #[test]
    fn test_resolve_in_scope_drops_other_origin() {
        let root = Url::parse("https://example.com/").unwrap();
        let page = Url::parse("https://example.com/a/").unwrap();

        assert!(resolve_in_scope(&page, "https://other.com/x", &root)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_resolve_in_scope_reports_malformed() {
        let root = Url::parse("https://example.com/").unwrap();
        assert!(matches!(
            resolve_in_scope(&root, "http://[::1", &root),
            Err(UrlError::Malformed(_))
        ));
    }
}
