//! Funicular Core - Shared configuration for the funicular exporter
//!
//! This crate loads the settings needed to export a GitHub project board:
//! App installation credentials, the target organization and project, and
//! where the CSV should be written.

pub mod config;
pub mod credentials;
pub mod error;

pub use config::{Config, ExportConfig, ExportSettings, GitHubConfig, Overrides};
pub use credentials::AppCredentials;
pub use error::{Error, Result};
