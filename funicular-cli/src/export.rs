//! Export driver - write one CSV row per issue on the project board

use std::fs::File;
use std::io::Write;

use anyhow::Context;
use funicular_core::ExportSettings;
use funicular_github::{Column, Issue, Session};
use tracing::debug;

/// Header row, always written first
pub const HEADER: [&str; 4] = [
    "project column",
    "issue title",
    "issue description",
    "labels",
];

/// Placed between the issue body and its URL in the description field
pub const DESCRIPTION_SEPARATOR: &str = "\n\n---\n\n";

/// Written in place of the body when an issue has none
pub const MISSING_BODY: &str = "None";

/// One CSV record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRow {
    pub project_column: String,
    pub issue_title: String,
    pub issue_description: String,
    pub labels: String,
}

impl ExportRow {
    pub fn new(column: &Column, issue: &Issue) -> Self {
        Self {
            project_column: column.name.clone(),
            issue_title: issue.title.clone(),
            issue_description: format!(
                "{}{}{}",
                issue.body.as_deref().unwrap_or(MISSING_BODY),
                DESCRIPTION_SEPARATOR,
                issue.html_url
            ),
            labels: join_labels(issue.label_names()),
        }
    }

    fn fields(&self) -> [&str; 4] {
        [
            &self.project_column,
            &self.issue_title,
            &self.issue_description,
            &self.labels,
        ]
    }
}

/// `'a';'b'` - label names are not escaped, so a name containing `'` or
/// `;` cannot be split back out reliably. Downstream consumers rely on
/// this exact shape.
fn join_labels<'a>(names: impl Iterator<Item = &'a str>) -> String {
    names
        .map(|name| format!("'{}'", name))
        .collect::<Vec<_>>()
        .join(";")
}

/// CSV sink with every field quoted
pub struct CsvExport<W: Write> {
    writer: csv::Writer<W>,
    rows: usize,
}

impl<W: Write> CsvExport<W> {
    /// Wrap `out` and write the header row
    pub fn new(out: W) -> anyhow::Result<Self> {
        let mut writer = csv::WriterBuilder::new()
            .quote_style(csv::QuoteStyle::Always)
            .terminator(csv::Terminator::CRLF)
            .from_writer(out);

        writer.write_record(HEADER)?;
        writer.flush()?;

        Ok(Self { writer, rows: 0 })
    }

    /// Write a row and flush it through to the sink
    pub fn write(&mut self, row: &ExportRow) -> anyhow::Result<()> {
        self.writer.write_record(row.fields())?;
        self.writer.flush()?;
        self.rows += 1;
        Ok(())
    }

    /// Number of data rows written
    pub fn rows(&self) -> usize {
        self.rows
    }
}

/// What an export produced
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportSummary {
    pub columns: usize,
    pub rows: usize,
}

/// Walk every column of the project and write its issues to `out`
///
/// The header is written before the project is looked up, and each row as
/// soon as its issue arrives, so a failure part-way leaves the rows
/// written so far in place.
pub async fn export_project<W: Write>(
    session: &Session,
    organization: &str,
    project: u64,
    out: W,
) -> anyhow::Result<ExportSummary> {
    let mut csv = CsvExport::new(out)?;
    let project = session.project(organization, project).await?;
    let mut summary = ExportSummary::default();

    let mut columns = session.columns(&project);
    while let Some(column) = columns.next().await? {
        debug!(column = %column.name, "Exporting column");
        summary.columns += 1;

        let mut issues = session.issues(&column).await?;
        while let Some(issue) = issues.next().await? {
            csv.write(&ExportRow::new(&column, &issue))?;
        }
    }

    summary.rows = csv.rows();
    Ok(summary)
}

/// Authenticate, open the output and export the configured project
pub async fn run(settings: &ExportSettings) -> anyhow::Result<ExportSummary> {
    let credentials = settings
        .credentials()
        .context("Failed to load GitHub App credentials")?;
    let session = Session::authenticate(&credentials).await?;

    let out: Box<dyn Write> = match &settings.output_file {
        Some(path) => Box::new(
            File::create(path)
                .with_context(|| format!("Failed to open {}", path.display()))?,
        ),
        None => Box::new(std::io::stdout().lock()),
    };

    export_project(&session, &settings.organization, settings.project, out).await
}
