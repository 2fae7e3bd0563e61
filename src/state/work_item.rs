use std::fmt;
use url::Url;

/// What a queued URL is being processed for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Role {
    /// Fetch the page and follow its links
    Discover,

    /// Mirror the page and its assets
    Page,

    /// Mirror a single asset referenced by `owner`
    Asset { owner: Url },
}

/// A pending URL queued to one of the worker pools
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    pub url: Url,
    pub role: Role,
}

impl WorkItem {
    pub fn discover(url: Url) -> Self {
        Self {
            url,
            role: Role::Discover,
        }
    }

    pub fn page(url: Url) -> Self {
        Self {
            url,
            role: Role::Page,
        }
    }

    pub fn asset(url: Url, owner: Url) -> Self {
        Self {
            url,
            role: Role::Asset { owner },
        }
    }

    /// The page this item was found on, if it is an asset
    pub fn owner(&self) -> Option<&Url> {
        match &self.role {
            Role::Asset { owner } => Some(owner),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Discover => write!(f, "discover"),
            Self::Page => write!(f, "page"),
            Self::Asset { .. } => write!(f, "asset"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_owner() {
        let page = Url::parse("https://example.com/a/").unwrap();
        let img = Url::parse("https://example.com/a/img.png").unwrap();

        let item = WorkItem::asset(img, page.clone());
        assert_eq!(item.owner(), Some(&page));
        assert_eq!(item.role.to_string(), "asset");

        assert_eq!(WorkItem::page(page.clone()).owner(), None);
        assert_eq!(WorkItem::discover(page).role.to_string(), "discover");
    }
}
