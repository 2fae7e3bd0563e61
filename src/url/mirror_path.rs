use std::path::{Path, PathBuf};
use url::Url;

/// Filename given to directory-style URLs
pub const INDEX_FILENAME: &str = "index.html";

/// Local location of a mirrored URL, relative to the output directory
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MirrorTarget {
    /// Directory below the output root (empty for the root itself)
    pub directory: PathBuf,

    /// File written inside `directory`
    pub filename: String,
}

impl MirrorTarget {
    /// Path of the file relative to the output directory
    pub fn relative_path(&self) -> PathBuf {
        self.directory.join(&self.filename)
    }

    /// Absolute location below `output_dir`
    pub fn path_under(&self, output_dir: &Path) -> PathBuf {
        output_dir.join(self.relative_path())
    }

    /// Site URL whose path matches this file's place in the mirror
    ///
    /// Relative links written by the rewriter resolve correctly against it.
    pub fn local_url(&self, root: &Url) -> Result<Url, url::ParseError> {
        let mut path = String::from(".");
        for segment in self.directory_segments().iter().chain([&self.filename]) {
            path.push('/');
            path.push_str(&urlencoding::encode(segment));
        }
        root.join(&path)
    }

    fn directory_segments(&self) -> Vec<String> {
        self.directory
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect()
    }
}

/// Maps a site URL to its mirror location
///
/// # Mapping Rules
///
/// 1. Take the URL path relative to the root's directory; a same-origin URL
///    outside that directory keeps its full path
/// 2. If the final segment contains a dot it is the filename, everything
///    before it is the directory
/// 3. Otherwise the whole relative path is the directory and the filename is
///    `index.html`
///
/// Query strings and fragments never influence the result. Segments are
/// percent-decoded; `.`/`..` and separator characters cannot escape the
/// output directory.
///
/// # Examples
///
/// ```
/// use site_mirror::url::map_mirror_path;
/// use std::path::Path;
/// use url::Url;
///
/// let root = Url::parse("https://books.toscrape.com/").unwrap();
/// let url = Url::parse("https://books.toscrape.com/catalogue/page-2/").unwrap();
/// let target = map_mirror_path(&url, &root);
/// assert_eq!(target.directory, Path::new("catalogue/page-2"));
/// assert_eq!(target.filename, "index.html");
/// ```
pub fn map_mirror_path(url: &Url, root: &Url) -> MirrorTarget {
    let relative = relative_path(url.path(), root.path());
    let parts: Vec<&str> = relative.split('/').collect();

    let (dir_parts, filename) = match parts.split_last() {
        Some((last, rest)) if !last.is_empty() && last.contains('.') => {
            match sanitize_segment(last) {
                Some(name) => (rest, name),
                None => (rest, INDEX_FILENAME.to_string()),
            }
        }
        _ => (&parts[..], INDEX_FILENAME.to_string()),
    };

    let directory = dir_parts
        .iter()
        .filter_map(|segment| sanitize_segment(segment))
        .collect::<PathBuf>();

    MirrorTarget {
        directory,
        filename,
    }
}

/// Builds the relative link that leads from one mirrored file to another
///
/// The result always uses `/` separators so it can be placed in markup.
pub fn relative_link(from: &MirrorTarget, to: &MirrorTarget) -> String {
    let from_dirs = from.directory_segments();
    let to_dirs = to.directory_segments();

    let common = from_dirs
        .iter()
        .zip(to_dirs.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<&str> = Vec::new();
    parts.extend(std::iter::repeat("..").take(from_dirs.len() - common));
    parts.extend(to_dirs[common..].iter().map(String::as_str));
    parts.push(&to.filename);
    parts.join("/")
}

fn relative_path<'a>(path: &'a str, root_path: &str) -> &'a str {
    let root_dir = match root_path.rfind('/') {
        Some(idx) => &root_path[..=idx],
        None => "/",
    };

    path.strip_prefix(root_dir)
        .unwrap_or_else(|| path.trim_start_matches('/'))
}

fn sanitize_segment(segment: &str) -> Option<String> {
    if segment.is_empty() {
        return None;
    }

    let decoded = urlencoding::decode(segment)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| segment.to_string());

    match decoded.as_str() {
        "" | "." | ".." => None,
        _ => Some(decoded.replace(['/', '\\'], "_")),
    }
}
