//! Pull-based traversal of paginated listings
//!
//! Nothing is requested until the first call to `next`, and a further page
//! is only requested once the buffered items run out.

use octocrab::{Octocrab, Page};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::{Card, Issue, IssueLocator, Result, Session};

/// Items of a REST listing, fetched a page at a time
pub struct Paged<'a, T> {
    client: &'a Octocrab,
    route: Option<String>,
    page: Option<Page<T>>,
    items: std::vec::IntoIter<T>,
}

impl<'a, T: DeserializeOwned> Paged<'a, T> {
    pub(crate) fn new(client: &'a Octocrab, route: String) -> Self {
        Self {
            client,
            route: Some(route),
            page: None,
            items: Vec::new().into_iter(),
        }
    }

    /// Next item, fetching another page when needed
    pub async fn next(&mut self) -> Result<Option<T>> {
        loop {
            if let Some(item) = self.items.next() {
                return Ok(Some(item));
            }

            let page = match (self.route.take(), self.page.take()) {
                (Some(route), _) => {
                    debug!(%route, "Fetching first page");
                    Some(self.client.get::<Page<T>, _, ()>(route, None).await?)
                }
                (None, Some(previous)) if previous.next.is_some() => {
                    debug!(next = ?previous.next, "Fetching next page");
                    self.client.get_page::<T>(&previous.next).await?
                }
                _ => None,
            };

            let Some(mut page) = page else {
                return Ok(None);
            };
            self.items = std::mem::take(&mut page.items).into_iter();
            self.page = Some(page);
        }
    }

    /// First item matching `predicate`, stopping as soon as it is found
    pub async fn find(&mut self, mut predicate: impl FnMut(&T) -> bool) -> Result<Option<T>> {
        while let Some(item) = self.next().await? {
            if predicate(&item) {
                return Ok(Some(item));
            }
        }
        Ok(None)
    }

    /// Drain the remaining items
    pub async fn all(mut self) -> Result<Vec<T>> {
        let mut items = Vec::new();
        while let Some(item) = self.next().await? {
            items.push(item);
        }
        Ok(items)
    }
}

impl<T> std::fmt::Debug for Paged<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Paged")
            .field("route", &self.route)
            .field("buffered", &self.items.len())
            .finish_non_exhaustive()
    }
}

/// Issues behind the cards of a column
///
/// Cards without a content URL, or whose URL is not an issue, are skipped.
/// Each issue is fetched only when `next` reaches its card.
#[derive(Debug)]
pub struct Issues<'a> {
    session: &'a Session,
    cards: Paged<'a, Card>,
}

impl<'a> Issues<'a> {
    pub(crate) fn new(session: &'a Session, cards: Paged<'a, Card>) -> Self {
        Self { session, cards }
    }

    pub async fn next(&mut self) -> Result<Option<Issue>> {
        while let Some(card) = self.cards.next().await? {
            let Some(content_url) = card.content_url() else {
                continue;
            };

            let parsed_path = crate::locator::content_path(content_url);
            match IssueLocator::from_path(&parsed_path) {
                Some(locator) => return self.session.issue(&locator).await.map(Some),
                None => {
                    debug!(
                        content_url,
                        parsed_path = %parsed_path,
                        "Could not parse issue info from content url"
                    );
                }
            }
        }

        Ok(None)
    }

    /// Drain the remaining issues
    pub async fn all(mut self) -> Result<Vec<Issue>> {
        let mut issues = Vec::new();
        while let Some(issue) = self.next().await? {
            issues.push(issue);
        }
        Ok(issues)
    }
}
