use crate::models::reports::{Report, ReportSalary, ReportText};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssigneesDto {
    pub reporter_id: String,
    pub implementer_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportDto {
    pub id: String,
    pub assignees: AssigneesDto,
    pub date: String,
    pub text: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub archived: Option<bool>,
}

impl ReportDto {
    pub fn to_entity(&self) -> Report {
        Report {
            id: self.id.clone(),
            date: self.date.clone(),
            text: self.text.clone(),
            title: self.name.clone(),
            archived: self.archived,
            reporter_id: self.assignees.reporter_id.clone(),
            implementer_id: self.assignees.implementer_id.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSalaryDto {
    pub report_id: String,
    pub count: i64,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub approver_id: Option<String>,
    #[serde(default)]
    pub approving_date: Option<String>,
}

impl ReportSalaryDto {
    pub fn to_entity(&self) -> ReportSalary {
        ReportSalary {
            report_id: self.report_id.clone(),
            count: self.count,
            description: self.description.clone(),
            approver_id: self.approver_id.clone(),
            approving_date: self.approving_date.clone(),
        }
    }
}

/// Body of a new report. Title and text always travel as separate fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub text: String,
}

impl From<&ReportText> for ReportRequest {
    fn from(content: &ReportText) -> Self {
        Self {
            name: content.title.clone(),
            text: content.body.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSalaryRequest {
    pub count: i64,
    #[serde(default)]
    pub description: Option<String>,
}
