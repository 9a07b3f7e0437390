//! References that name a resource or already hold it
//!
//! Lookups accept either form; [`crate::Session`] resolves a reference to a
//! handle before using it.

use crate::{Column, Organization, Project};

/// An organization by name or handle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrganizationRef {
    Name(String),
    Handle(Organization),
}

impl From<&str> for OrganizationRef {
    fn from(name: &str) -> Self {
        OrganizationRef::Name(name.to_string())
    }
}

impl From<String> for OrganizationRef {
    fn from(name: String) -> Self {
        OrganizationRef::Name(name)
    }
}

impl From<Organization> for OrganizationRef {
    fn from(organization: Organization) -> Self {
        OrganizationRef::Handle(organization)
    }
}

impl From<&Organization> for OrganizationRef {
    fn from(organization: &Organization) -> Self {
        OrganizationRef::Handle(organization.clone())
    }
}

/// A project by number within an organization, or a handle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectRef {
    Number {
        organization: OrganizationRef,
        number: u64,
    },
    Handle(Project),
}

impl ProjectRef {
    pub fn number(organization: impl Into<OrganizationRef>, number: u64) -> Self {
        ProjectRef::Number {
            organization: organization.into(),
            number,
        }
    }
}

impl From<Project> for ProjectRef {
    fn from(project: Project) -> Self {
        ProjectRef::Handle(project)
    }
}

impl From<&Project> for ProjectRef {
    fn from(project: &Project) -> Self {
        ProjectRef::Handle(project.clone())
    }
}

/// A column by name within a project, or a handle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnRef {
    Name { project: ProjectRef, name: String },
    Handle(Column),
}

impl ColumnRef {
    pub fn named(project: impl Into<ProjectRef>, name: impl Into<String>) -> Self {
        ColumnRef::Name {
            project: project.into(),
            name: name.into(),
        }
    }
}

impl From<Column> for ColumnRef {
    fn from(column: Column) -> Self {
        ColumnRef::Handle(column)
    }
}

impl From<&Column> for ColumnRef {
    fn from(column: &Column) -> Self {
        ColumnRef::Handle(column.clone())
    }
}
