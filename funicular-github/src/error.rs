//! Error types for GitHub operations

use thiserror::Error;

/// Result type for GitHub operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during GitHub operations
///
/// Only the two lookup failures are classified here. Everything else the
/// API client reports is carried through untouched in [`Error::Api`].
#[derive(Error, Debug)]
pub enum Error {
    /// GitHub API error
    #[error("GitHub API error: {0}")]
    Api(#[from] octocrab::Error),

    /// Authentication error
    #[error("GitHub authentication error: {0}")]
    Auth(String),

    /// No project with the requested number in the organization
    #[error("Project #{number} not found in organization {organization}")]
    ProjectNotFound { organization: String, number: u64 },

    /// No column with the requested name in the project
    #[error("Column {name:?} not found in project #{project}")]
    ColumnNotFound { project: u64, name: String },
}

impl Error {
    /// Whether this is one of the "not found" lookup failures
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Error::ProjectNotFound { .. } | Error::ColumnNotFound { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_kinds() {
        let project = Error::ProjectNotFound {
            organization: "acme".to_string(),
            number: 11,
        };
        let column = Error::ColumnNotFound {
            project: 11,
            name: "Done".to_string(),
        };
        assert!(project.is_not_found());
        assert!(column.is_not_found());
        assert!(!Error::Auth("bad key".to_string()).is_not_found());
    }

    #[test]
    fn test_messages() {
        let err = Error::ColumnNotFound {
            project: 3,
            name: "In Progress".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Column \"In Progress\" not found in project #3"
        );
    }
}
