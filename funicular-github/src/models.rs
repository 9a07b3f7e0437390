//! The slices of GitHub's REST resources the exporter reads
//!
//! Only the fields funicular uses are modelled; anything else in the
//! response is ignored.

use serde::Deserialize;

/// A GitHub organization
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Organization {
    /// Organization name as used in URLs
    pub login: String,
    pub id: u64,
}

/// A classic project board
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Project {
    pub id: u64,
    /// The number shown in the board URL, e.g. `/orgs/acme/projects/11`
    pub number: u64,
    pub name: String,
}

/// A named lane within a project
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Column {
    pub id: u64,
    pub name: String,
}

/// An item in a column
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Card {
    pub id: u64,
    /// REST URL of the issue or pull request the card points to; absent
    /// for note cards
    #[serde(default)]
    pub content_url: Option<String>,
}

impl Card {
    /// The content URL, treating an empty string as absent
    pub fn content_url(&self) -> Option<&str> {
        self.content_url.as_deref().filter(|url| !url.is_empty())
    }
}

/// Issue label
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Label {
    pub name: String,
}

/// A GitHub issue
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Issue {
    pub number: u64,
    pub title: String,
    /// Issue body/description
    #[serde(default)]
    pub body: Option<String>,
    /// Browser URL of the issue
    pub html_url: String,
    /// Labels in the order GitHub returns them
    #[serde(default)]
    pub labels: Vec<Label>,
}

impl Issue {
    /// Names of the issue's labels
    pub fn label_names(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(|label| label.name.as_str())
    }
}
