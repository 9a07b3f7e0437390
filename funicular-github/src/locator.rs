//! Recover an issue's coordinates from a card's content URL

use std::borrow::Cow;
use std::sync::OnceLock;

use regex::Regex;

static ISSUE_PATH: OnceLock<Regex> = OnceLock::new();

fn issue_path() -> &'static Regex {
    ISSUE_PATH.get_or_init(|| {
        Regex::new(r"^/repos/(?P<owner>[^/]+)/(?P<repository>[^/]+)/issues/(?P<number>[0-9]+)")
            .unwrap()
    })
}

/// Owner, repository and number of an issue
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IssueLocator {
    pub owner: String,
    pub repository: String,
    pub number: u64,
}

impl IssueLocator {
    /// Match a REST path against `/repos/{owner}/{repo}/issues/{number}`
    ///
    /// The pattern is anchored at the start only, so trailing segments
    /// such as `/comments` are accepted. A number too large for `u64`
    /// cannot name a real issue and is treated as no match.
    pub fn from_path(path: &str) -> Option<Self> {
        let captures = issue_path().captures(path)?;
        let number = captures["number"].parse().ok()?;

        Some(Self {
            owner: captures["owner"].to_string(),
            repository: captures["repository"].to_string(),
            number,
        })
    }
}

impl std::fmt::Display for IssueLocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}#{}", self.owner, self.repository, self.number)
    }
}

/// The path component of a content URL
///
/// Strings that are not absolute URLs are treated as a bare path with any
/// query or fragment removed.
pub(crate) fn content_path(content_url: &str) -> Cow<'_, str> {
    match url::Url::parse(content_url) {
        Ok(url) => Cow::Owned(url.path().to_string()),
        Err(_) => {
            let end = content_url.find(['?', '#']).unwrap_or(content_url.len());
            Cow::Borrowed(&content_url[..end])
        }
    }
}
