#![forbid(unsafe_code)]

//! Same-page hash resolution for navigation anchors.
//!
//! Navigation anchors may be written as bare fragments (`#about`), as
//! relative page links (`./index.html#about`, `../#about`) or as absolute
//! URLs. An anchor is a same-page link when its resolved path matches the
//! current page after trailing-slash normalization (`/` and `/index.html`
//! are the same page).

use std::borrow::Cow;

use url::Url;

use crate::error::Result;

const INDEX_DOCUMENT: &str = "index.html";

/// Append the index document to directory paths.
#[must_use]
pub fn normalize_path(path: &str) -> Cow<'_, str> {
    if path.ends_with('/') {
        Cow::Owned(format!("{path}{INDEX_DOCUMENT}"))
    } else {
        Cow::Borrowed(path)
    }
}

/// Percent-decode a fragment.
///
/// Yields `None` for a `%` not followed by two hex digits and for escapes
/// that decode to invalid UTF-8.
#[must_use]
pub fn decode_fragment(fragment: &str) -> Option<String> {
    let bytes = fragment.as_bytes();
    let well_formed = bytes.iter().enumerate().all(|(i, &b)| {
        b != b'%'
            || bytes
                .get(i + 1..i + 3)
                .is_some_and(|hex| hex.iter().all(u8::is_ascii_hexdigit))
    });
    if !well_formed {
        return None;
    }
    urlencoding::decode(fragment).ok().map(Cow::into_owned)
}

/// Whether an href points at the blog index or a blog post.
#[must_use]
pub fn is_blog_href(href: &str) -> bool {
    href.contains("blog.html") || href.contains("/blog/")
}

/// The URL of the page the behaviors run on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLocation {
    url: Url,
}

impl PageLocation {
    /// Parse the page's absolute URL (`location.href`).
    pub fn parse(href: &str) -> Result<Self> {
        Ok(Self {
            url: Url::parse(href)?,
        })
    }

    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    #[must_use]
    pub fn path(&self) -> &str {
        self.url.path()
    }

    /// Decoded id named by the page's own fragment, if any.
    #[must_use]
    pub fn hash_id(&self) -> Option<String> {
        self.url
            .fragment()
            .filter(|f| !f.is_empty())
            .and_then(decode_fragment)
    }

    /// Whether `other` addresses this page (ignoring query and fragment).
    #[must_use]
    pub fn is_same_page(&self, other: &Url) -> bool {
        normalize_path(other.path()) == normalize_path(self.path())
    }

    #[must_use]
    pub fn is_home_page(&self) -> bool {
        normalize_path(self.path()) == normalize_path("/index.html")
    }

    #[must_use]
    pub fn is_blog_page(&self) -> bool {
        self.path().contains("/blog/") || normalize_path(self.path()) == "/blog.html"
    }

    /// Resolve an href against this page.
    #[must_use]
    pub fn resolve(&self, href: &str) -> Option<Url> {
        self.url.join(href).ok()
    }

    /// Decoded target id of a same-page hash link.
    ///
    /// Returns `None` for links to other pages, links without a fragment,
    /// and fragments with malformed percent escapes. An href that does not
    /// resolve as a URL is still accepted when it is a bare `#fragment`.
    #[must_use]
    pub fn hash_target(&self, href: Option<&str>) -> Option<String> {
        let href = href.filter(|h| !h.is_empty())?;
        match self.resolve(href) {
            Some(url) => {
                if !self.is_same_page(&url) {
                    return None;
                }
                url.fragment()
                    .filter(|f| !f.is_empty())
                    .and_then(decode_fragment)
            }
            None => href
                .strip_prefix('#')
                .filter(|f| !f.is_empty())
                .and_then(decode_fragment),
        }
    }

    /// Raw `#fragment` of a same-page hash link, for pushing onto history.
    #[must_use]
    pub fn same_page_hash(&self, href: Option<&str>) -> Option<String> {
        let href = href.filter(|h| !h.is_empty())?;
        match self.resolve(href) {
            Some(url) => {
                if !self.is_same_page(&url) {
                    return None;
                }
                url.fragment()
                    .filter(|f| !f.is_empty())
                    .map(|f| format!("#{f}"))
            }
            None => href.starts_with('#').then(|| href.to_owned()),
        }
    }

    /// Rewrite a bare `#fragment` nav link so it navigates to the home page.
    ///
    /// Returns the new href, or `None` when the link should be left alone
    /// (this is the home page, the href is not a bare fragment, or it is
    /// just `#`).
    #[must_use]
    pub fn rewrite_hash_link(&self, href: &str) -> Option<String> {
        if href == "#" || !href.starts_with('#') || self.is_home_page() {
            return None;
        }
        let base = if self.path().contains("/blog/") {
            "../"
        } else {
            "./"
        };
        Some(format!("{base}{INDEX_DOCUMENT}{href}"))
    }
}
