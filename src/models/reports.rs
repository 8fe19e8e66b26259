//! Reports and their salaries.

use crate::store::entity::{Entity, Table, int, opt_bool, opt_text, text};
use rusqlite::Row;
use rusqlite::types::Value;
use serde::Serialize;

/// Delimiter legacy payloads use to pack a title in front of the body.
pub const LEGACY_TITLE_DELIMITER: &str = "@\n\t\n@";

/// Title and body of a report, kept apart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportText {
    pub title: Option<String>,
    pub body: String,
}

impl ReportText {
    pub fn new(title: Option<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.filter(|t| !t.trim().is_empty()),
            body: body.into(),
        }
    }

    /// Derive title and body from the wire fields.
    ///
    /// A non-blank explicit title is used as is and the body is what follows
    /// the delimiter. Without an explicit title the text before the delimiter
    /// becomes the title. When the delimiter is missing both sides fall back
    /// to the whole text.
    pub fn from_wire(explicit_title: Option<&str>, text: &str) -> Self {
        let (before, after) = match text.split_once(LEGACY_TITLE_DELIMITER) {
            Some((b, a)) => (b, a),
            None => (text, text),
        };

        let title = match explicit_title {
            Some(t) if !t.trim().is_empty() => t.to_string(),
            _ => before.to_string(),
        };

        Self {
            title: Some(title),
            body: after.to_string(),
        }
    }

    pub fn title_or_empty(&self) -> &str {
        self.title.as_deref().unwrap_or("")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub id: String,
    pub date: String,
    pub text: String,
    pub title: Option<String>,
    pub archived: Option<bool>,
    pub reporter_id: String,
    pub implementer_id: String,
}

impl Report {
    pub fn content(&self) -> ReportText {
        ReportText::from_wire(self.title.as_deref(), &self.text)
    }
}

impl Entity for Report {
    const TABLE: Table = Table::Reports;
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "date",
        "text",
        "title",
        "archived",
        "reporter_id",
        "implementer_id",
    ];
    const PRIMARY_KEY: &'static [&'static str] = &["id"];

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            date: row.get("date")?,
            text: row.get("text")?,
            title: row.get("title")?,
            archived: row.get("archived")?,
            reporter_id: row.get("reporter_id")?,
            implementer_id: row.get("implementer_id")?,
        })
    }

    fn to_values(&self) -> Vec<Value> {
        vec![
            text(&self.id),
            text(&self.date),
            text(&self.text),
            opt_text(self.title.as_deref()),
            opt_bool(self.archived),
            text(&self.reporter_id),
            text(&self.implementer_id),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportSalary {
    pub report_id: String,
    pub count: i64,
    pub description: Option<String>,
    pub approver_id: Option<String>,
    pub approving_date: Option<String>,
}

impl Entity for ReportSalary {
    const TABLE: Table = Table::ReportSalaries;
    const COLUMNS: &'static [&'static str] = &[
        "report_id",
        "count",
        "description",
        "approver_id",
        "approving_date",
    ];
    const PRIMARY_KEY: &'static [&'static str] = &["report_id"];

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            report_id: row.get("report_id")?,
            count: row.get("count")?,
            description: row.get("description")?,
            approver_id: row.get("approver_id")?,
            approving_date: row.get("approving_date")?,
        })
    }

    fn to_values(&self) -> Vec<Value> {
        vec![
            text(&self.report_id),
            int(self.count),
            opt_text(self.description.as_deref()),
            opt_text(self.approver_id.as_deref()),
            opt_text(self.approving_date.as_deref()),
        ]
    }
}

/// A report ready for display: derived title/body plus its salary, if any.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportView {
    pub report: Report,
    pub content: ReportText,
    pub salary: Option<ReportSalary>,
}

impl ReportView {
    pub fn new(report: Report, salary: Option<ReportSalary>) -> Self {
        let content = report.content();
        Self {
            report,
            content,
            salary,
        }
    }
}
