//! Configuration management for funicular
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (FUNICULAR_*)
//! 3. Config file (~/.config/funicular/config.toml)
//!
//! There are no defaults for the required settings; anything still missing
//! once every source has been merged is reported by [`Config::settings`].

use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{AppCredentials, Error, Result};

/// GitHub App authentication settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct GitHubConfig {
    /// The id of the GitHub App used for authentication
    pub app_id: Option<u64>,

    /// The id of the App's installation in the organization
    pub installation_id: Option<u64>,

    /// Path to the App's PEM-encoded private key
    pub private_key_file: Option<PathBuf>,
}

/// What to export and where to write it
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Organization housing the project
    pub organization: Option<String>,

    /// Project number, e.g. 11 for https://github.com/orgs/acme/projects/11
    pub project: Option<u64>,

    /// CSV destination; standard output when unset
    pub output_file: Option<PathBuf>,
}

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// GitHub App configuration
    pub github: GitHubConfig,

    /// Export target configuration
    pub export: ExportConfig,
}

/// Values supplied on the command line
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub app_id: Option<u64>,
    pub installation_id: Option<u64>,
    pub private_key_file: Option<PathBuf>,
    pub output_file: Option<PathBuf>,
    pub organization: Option<String>,
    pub project: Option<u64>,
}

/// Fully resolved settings for one export run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSettings {
    pub app_id: u64,
    pub installation_id: u64,
    pub private_key_file: PathBuf,
    pub organization: String,
    pub project: u64,
    pub output_file: Option<PathBuf>,
}

impl ExportSettings {
    /// Read the private key and bundle it with the App identifiers
    pub fn credentials(&self) -> Result<AppCredentials> {
        AppCredentials::load(self.app_id, self.installation_id, &self.private_key_file)
    }
}

impl Config {
    /// Load configuration from the default config file location
    ///
    /// Returns an empty config if the file doesn't exist
    pub fn load() -> Result<Self> {
        if let Some(path) = Self::default_config_path() {
            if path.exists() {
                return Self::load_from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(Error::Io)?;
        toml::from_str(&contents).map_err(|e| {
            Error::Config(format!("Failed to parse {}: {}", path.display(), e))
        })
    }

    /// Get the default config file path
    ///
    /// Returns `~/.config/funicular/config.toml` on Unix
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("funicular").join("config.toml"))
    }

    /// Apply environment variable overrides
    ///
    /// Supported variables:
    /// - FUNICULAR_APP_ID
    /// - FUNICULAR_INSTALLATION_ID
    /// - FUNICULAR_PRIVATE_KEY_FILE
    /// - FUNICULAR_ORGANIZATION
    /// - FUNICULAR_PROJECT
    /// - FUNICULAR_OUTPUT_FILE
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_vars(|name| std::env::var(name).ok())
    }

    fn with_vars(mut self, var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(app_id) = parse_var(&var, "FUNICULAR_APP_ID")? {
            self.github.app_id = Some(app_id);
        }
        if let Some(installation_id) = parse_var(&var, "FUNICULAR_INSTALLATION_ID")? {
            self.github.installation_id = Some(installation_id);
        }
        if let Some(path) = var("FUNICULAR_PRIVATE_KEY_FILE") {
            self.github.private_key_file = Some(PathBuf::from(path));
        }
        if let Some(organization) = var("FUNICULAR_ORGANIZATION") {
            self.export.organization = Some(organization);
        }
        if let Some(project) = parse_var(&var, "FUNICULAR_PROJECT")? {
            self.export.project = Some(project);
        }
        if let Some(path) = var("FUNICULAR_OUTPUT_FILE") {
            self.export.output_file = Some(PathBuf::from(path));
        }

        Ok(self)
    }

    /// Apply CLI flag overrides
    pub fn with_cli_overrides(mut self, overrides: Overrides) -> Self {
        if overrides.app_id.is_some() {
            self.github.app_id = overrides.app_id;
        }
        if overrides.installation_id.is_some() {
            self.github.installation_id = overrides.installation_id;
        }
        if overrides.private_key_file.is_some() {
            self.github.private_key_file = overrides.private_key_file;
        }
        if overrides.organization.is_some() {
            self.export.organization = overrides.organization;
        }
        if overrides.project.is_some() {
            self.export.project = overrides.project;
        }
        if overrides.output_file.is_some() {
            self.export.output_file = overrides.output_file;
        }

        self
    }

    /// Load configuration with all overrides applied
    ///
    /// An explicitly named config file must exist; the default one may not.
    /// Priority: CLI > env > config file
    pub fn load_with_overrides(config_path: Option<&Path>, overrides: Overrides) -> Result<Self> {
        let config = match config_path {
            Some(path) => Self::load_from_file(path)?,
            None => Self::load()?,
        };

        Ok(config.with_env_overrides()?.with_cli_overrides(overrides))
    }

    /// Check that every required setting is present
    pub fn settings(&self) -> Result<ExportSettings> {
        Ok(ExportSettings {
            app_id: self.github.app_id.ok_or(Error::MissingSetting("--app-id"))?,
            installation_id: self
                .github
                .installation_id
                .ok_or(Error::MissingSetting("--installation-id"))?,
            private_key_file: self
                .github
                .private_key_file
                .clone()
                .ok_or(Error::MissingSetting("--private-key-file"))?,
            organization: self
                .export
                .organization
                .clone()
                .ok_or(Error::MissingSetting("--organization"))?,
            project: self.export.project.ok_or(Error::MissingSetting("--project"))?,
            output_file: self.export.output_file.clone(),
        })
    }
}

fn parse_var<T>(var: impl Fn(&str) -> Option<String>, name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match var(name) {
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e))),
        None => Ok(None),
    }
}
