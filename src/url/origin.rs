use url::Url;

/// Checks whether two URLs share scheme, host and port
///
/// Default ports are made explicit before comparing, so
/// `https://example.com/` and `https://example.com:443/` are the same origin.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use site_mirror::url::same_origin;
///
/// let root = Url::parse("https://example.com/").unwrap();
/// assert!(same_origin(&root, &Url::parse("https://EXAMPLE.com:443/a.css").unwrap()));
/// assert!(!same_origin(&root, &Url::parse("http://example.com/").unwrap()));
/// ```
pub fn same_origin(a: &Url, b: &Url) -> bool {
    a.origin().is_tuple() && a.origin() == b.origin()
}
