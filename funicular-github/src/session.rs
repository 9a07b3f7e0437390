//! Authenticated access to GitHub and the project lookups built on it

use funicular_core::AppCredentials;
use octocrab::models::{AppId, InstallationId};
use octocrab::Octocrab;
use tracing::{debug, info};

use crate::{
    Card, Column, ColumnRef, Error, Issue, IssueLocator, Issues, Organization, OrganizationRef,
    Paged, Project, ProjectRef, Result,
};

/// A GitHub API session scoped to one App installation
pub struct Session {
    client: Octocrab,
}

impl Session {
    /// Log in as the App installation described by `credentials`
    ///
    /// The installation token is requested immediately, so bad credentials
    /// fail here rather than on the first lookup.
    pub async fn authenticate(credentials: &AppCredentials) -> Result<Self> {
        let key = jsonwebtoken::EncodingKey::from_rsa_pem(credentials.private_key_pem())
            .map_err(|e| Error::Auth(format!("Invalid private key: {}", e)))?;

        let app = Octocrab::builder()
            .app(AppId(credentials.app_id), key)
            .build()
            .map_err(|e| Error::Auth(format!("Failed to create GitHub client: {}", e)))?;

        let (client, _token) = app
            .installation_and_token(InstallationId(credentials.installation_id))
            .await?;

        info!(
            app_id = credentials.app_id,
            installation_id = credentials.installation_id,
            "Authenticated as GitHub App installation"
        );

        Ok(Self { client })
    }

    /// Wrap an already configured client
    pub fn with_client(client: Octocrab) -> Self {
        Self { client }
    }

    /// Fetch an organization by name
    pub async fn organization(&self, name: &str) -> Result<Organization> {
        debug!(organization = name, "Fetching organization");

        let organization = self
            .client
            .get::<Organization, _, ()>(format!("/orgs/{}", name), None)
            .await?;
        Ok(organization)
    }

    /// Find the project with the given number in an organization
    ///
    /// The organization's projects are scanned in order and the first
    /// matching number wins.
    pub async fn project(
        &self,
        organization: impl Into<OrganizationRef>,
        number: u64,
    ) -> Result<Project> {
        let organization = self.resolve_organization(organization.into()).await?;
        debug!(organization = %organization.login, number, "Looking up project");

        self.projects(&organization)
            .find(|project| project.number == number)
            .await?
            .ok_or(Error::ProjectNotFound {
                organization: organization.login,
                number,
            })
    }

    /// Find the column with the given name in a project
    ///
    /// First matching name wins.
    pub async fn column(&self, project: impl Into<ProjectRef>, name: &str) -> Result<Column> {
        let project = self.resolve_project(project.into()).await?;
        debug!(project = project.number, column = name, "Looking up column");

        self.columns(&project)
            .find(|column| column.name == name)
            .await?
            .ok_or_else(|| Error::ColumnNotFound {
                project: project.number,
                name: name.to_string(),
            })
    }

    /// Projects of an organization
    pub fn projects(&self, organization: &Organization) -> Paged<'_, Project> {
        Paged::new(&self.client, format!("/orgs/{}/projects", organization.login))
    }

    /// Columns of a project in board order
    pub fn columns(&self, project: &Project) -> Paged<'_, Column> {
        Paged::new(&self.client, format!("/projects/{}/columns", project.id))
    }

    /// Cards of a column in board order
    pub async fn cards(&self, column: impl Into<ColumnRef>) -> Result<Paged<'_, Card>> {
        let column = self.resolve_column(column.into()).await?;
        Ok(Paged::new(
            &self.client,
            format!("/projects/columns/{}/cards", column.id),
        ))
    }

    /// Issues referenced by the cards of a column
    pub async fn issues(&self, column: impl Into<ColumnRef>) -> Result<Issues<'_>> {
        let cards = self.cards(column).await?;
        Ok(Issues::new(self, cards))
    }

    /// Fetch a single issue
    pub async fn issue(&self, locator: &IssueLocator) -> Result<Issue> {
        debug!(issue = %locator, "Fetching issue");

        let issue = self
            .client
            .get::<Issue, _, ()>(
                format!(
                    "/repos/{}/{}/issues/{}",
                    locator.owner, locator.repository, locator.number
                ),
                None,
            )
            .await?;
        Ok(issue)
    }

    async fn resolve_organization(&self, organization: OrganizationRef) -> Result<Organization> {
        match organization {
            OrganizationRef::Name(name) => self.organization(&name).await,
            OrganizationRef::Handle(organization) => Ok(organization),
        }
    }

    async fn resolve_project(&self, project: ProjectRef) -> Result<Project> {
        match project {
            ProjectRef::Number {
                organization,
                number,
            } => self.project(organization, number).await,
            ProjectRef::Handle(project) => Ok(project),
        }
    }

    async fn resolve_column(&self, column: ColumnRef) -> Result<Column> {
        match column {
            ColumnRef::Name { project, name } => self.column(project, &name).await,
            ColumnRef::Handle(column) => Ok(column),
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use std::sync::{Arc, Mutex};
    use wiremock::matchers::{method, path, query_param, query_param_is_missing};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn session_for(server: &MockServer) -> Session {
        let client = Octocrab::builder()
            .base_uri(server.uri())
            .unwrap()
            .build()
            .unwrap();
        Session::with_client(client)
    }

    async fn mount_json(server: &MockServer, route: &str, body: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(server)
            .await;
    }

    fn issue_json(number: u64, title: &str) -> serde_json::Value {
        json!({
            "number": number,
            "title": title,
            "body": "details",
            "html_url": format!("https://github.com/acme/widgets/issues/{}", number),
            "labels": [{"name": "bug"}],
        })
    }

    async fn mount_board(server: &MockServer) {
        mount_json(server, "/orgs/acme", json!({"login": "acme", "id": 1})).await;
        mount_json(
            server,
            "/orgs/acme/projects",
            json!([
                {"id": 100, "number": 1, "name": "Roadmap"},
                {"id": 101, "number": 2, "name": "Sprint"},
            ]),
        )
        .await;
        mount_json(
            server,
            "/projects/101/columns",
            json!([
                {"id": 5, "name": "To do"},
                {"id": 6, "name": "Done"},
            ]),
        )
        .await;
    }

    #[tokio::test]
    async fn test_project_by_number() {
        let server = MockServer::start().await;
        mount_board(&server).await;
        let session = session_for(&server);

        let project = session.project("acme", 2).await.unwrap();
        assert_eq!(project.id, 101);
        assert_eq!(project.name, "Sprint");
    }

    #[tokio::test]
    async fn test_project_not_found() {
        let server = MockServer::start().await;
        mount_board(&server).await;
        let session = session_for(&server);

        let err = session.project("acme", 9).await.unwrap_err();
        assert!(matches!(
            err,
            Error::ProjectNotFound { ref organization, number: 9 } if organization == "acme"
        ));
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_project_with_organization_handle_skips_lookup() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/orgs/acme"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;
        mount_json(
            &server,
            "/orgs/acme/projects",
            json!([{"id": 100, "number": 1, "name": "Roadmap"}]),
        )
        .await;
        let session = session_for(&server);

        let organization = Organization {
            login: "acme".to_string(),
            id: 1,
        };
        let project = session.project(&organization, 1).await.unwrap();
        assert_eq!(project.id, 100);
    }

    #[tokio::test]
    async fn test_missing_organization_is_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/orgs/nobody"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "message": "Not Found",
                "documentation_url": "https://docs.github.com/rest",
            })))
            .mount(&server)
            .await;
        let session = session_for(&server);

        let err = session.project("nobody", 1).await.unwrap_err();
        assert!(matches!(err, Error::Api(_)));
        assert!(!err.is_not_found());
    }

    #[tokio::test]
    async fn test_column_by_name() {
        let server = MockServer::start().await;
        mount_board(&server).await;
        let session = session_for(&server);

        let column = session
            .column(ProjectRef::number("acme", 2), "Done")
            .await
            .unwrap();
        assert_eq!(column.id, 6);
    }

    #[tokio::test]
    async fn test_column_not_found() {
        let server = MockServer::start().await;
        mount_board(&server).await;
        let session = session_for(&server);

        let project = session.project("acme", 2).await.unwrap();
        let err = session.column(&project, "Blocked").await.unwrap_err();
        assert!(matches!(
            err,
            Error::ColumnNotFound { project: 2, ref name } if name == "Blocked"
        ));
    }

    #[tokio::test]
    async fn test_cards_follow_pagination() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/projects/columns/5/cards"))
            .and(query_param_is_missing("page"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header(
                        "link",
                        format!(
                            "<{}/projects/columns/5/cards?page=2>; rel=\"next\"",
                            server.uri()
                        )
                        .as_str(),
                    )
                    .set_body_json(json!([{"id": 1}, {"id": 2}])),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/projects/columns/5/cards"))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 3}])))
            .mount(&server)
            .await;
        let session = session_for(&server);

        let column = Column {
            id: 5,
            name: "To do".to_string(),
        };
        let cards = session.cards(&column).await.unwrap().all().await.unwrap();
        let ids: Vec<u64> = cards.iter().map(|card| card.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_issues_resolve_card_content() {
        let server = MockServer::start().await;
        mount_board(&server).await;
        mount_json(
            &server,
            "/projects/columns/6/cards",
            json!([
                {"id": 1, "content_url": "https://api.github.com/repos/acme/widgets/issues/42"},
                {"id": 2, "note": "just a note"},
                {"id": 3, "content_url": "https://api.github.com/repos/acme/widgets/pulls/43"},
                {"id": 4, "content_url": "https://api.github.com/repos/acme/gadgets/issues/7"},
            ]),
        )
        .await;
        mount_json(&server, "/repos/acme/widgets/issues/42", issue_json(42, "Fix bug")).await;
        mount_json(&server, "/repos/acme/gadgets/issues/7", issue_json(7, "Polish")).await;
        let session = session_for(&server);

        let issues = session
            .issues(ColumnRef::named(ProjectRef::number("acme", 2), "Done"))
            .await
            .unwrap()
            .all()
            .await
            .unwrap();

        let titles: Vec<&str> = issues.iter().map(|issue| issue.title.as_str()).collect();
        assert_eq!(titles, vec!["Fix bug", "Polish"]);
    }

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl CapturedLogs {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    #[tokio::test]
    async fn test_unparsable_card_url_is_logged_and_skipped() {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let server = MockServer::start().await;
        mount_json(
            &server,
            "/projects/columns/6/cards",
            json!([
                {"id": 1, "note": "just a note"},
                {"id": 2, "content_url": "https://api.github.com/repos/acme/widgets/pulls/43"},
            ]),
        )
        .await;
        let session = session_for(&server);

        let column = Column {
            id: 6,
            name: "Done".to_string(),
        };
        let issues = session.issues(column).await.unwrap().all().await.unwrap();
        assert!(issues.is_empty());

        let output = logs.contents();
        let skipped: Vec<&str> = output
            .lines()
            .filter(|line| line.contains("Could not parse issue info from content url"))
            .collect();
        assert_eq!(skipped.len(), 1, "logs were: {}", output);
        assert!(skipped[0].contains("DEBUG"));
        assert!(skipped[0]
            .contains("content_url=\"https://api.github.com/repos/acme/widgets/pulls/43\""));
        assert!(skipped[0].contains("parsed_path=/repos/acme/widgets/pulls/43"));
    }

    #[tokio::test]
    async fn test_issues_are_fetched_on_demand() {
        let server = MockServer::start().await;
        mount_json(
            &server,
            "/projects/columns/6/cards",
            json!([
                {"id": 1, "content_url": "https://api.github.com/repos/acme/widgets/issues/1"},
                {"id": 2, "content_url": "https://api.github.com/repos/acme/widgets/issues/2"},
            ]),
        )
        .await;
        mount_json(&server, "/repos/acme/widgets/issues/1", issue_json(1, "First")).await;
        Mock::given(method("GET"))
            .and(path("/repos/acme/widgets/issues/2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(issue_json(2, "Second")))
            .expect(0)
            .mount(&server)
            .await;
        let session = session_for(&server);

        let column = Column {
            id: 6,
            name: "Done".to_string(),
        };
        let mut issues = session.issues(column).await.unwrap();
        let first = issues.next().await.unwrap().unwrap();
        assert_eq!(first.title, "First");
    }

    #[tokio::test]
    async fn test_empty_column_yields_nothing() {
        let server = MockServer::start().await;
        mount_json(&server, "/projects/columns/6/cards", json!([])).await;
        let session = session_for(&server);

        let column = Column {
            id: 6,
            name: "Done".to_string(),
        };
        let mut issues = session.issues(column).await.unwrap();
        assert!(issues.next().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_authenticate_rejects_bad_key() {
        let credentials = AppCredentials::new(1, 2, "not a pem");
        let err = Session::authenticate(&credentials).await.unwrap_err();
        assert!(matches!(err, Error::Auth(_)));
    }
}
