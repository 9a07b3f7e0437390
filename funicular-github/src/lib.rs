//! Funicular GitHub - Walk a GitHub classic project board
//!
//! This crate authenticates as a GitHub App installation and resolves
//! organization → project → column → card → issue, yielding cards and
//! issues lazily so that nothing is fetched before it is needed.

mod error;
mod locator;
mod models;
mod paged;
mod refs;
mod session;

pub use error::{Error, Result};
pub use locator::IssueLocator;
pub use models::{Card, Column, Issue, Label, Organization, Project};
pub use paged::{Issues, Paged};
pub use refs::{ColumnRef, OrganizationRef, ProjectRef};
pub use session::Session;
