use super::SyncContext;
use crate::errors::AppResult;
use crate::models::reports::{Report, ReportSalary, ReportText, ReportView};
use crate::remote::ReportsApi;
use crate::remote::models::reports::{
    ReportDto, ReportRequest, ReportSalaryDto, ReportSalaryRequest,
};
use crate::resource::Resource;
use crate::store::entity::{Table, text};
use crate::store::live::LiveQuery;
use crate::store::{Criteria, like, load_by_id, load_where};
use rusqlite::Connection;
use rusqlite::types::Value;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::warn;

/// Keep only salaries whose report is in `known`.
///
/// Servers have been seen returning salaries for reports the same user
/// cannot list; writing those would break the foreign key.
pub fn filter_salaries(
    salaries: &[ReportSalaryDto],
    known: &HashSet<String>,
) -> (Vec<ReportSalary>, usize) {
    let kept: Vec<ReportSalary> = salaries
        .iter()
        .filter(|s| known.contains(&s.report_id))
        .map(ReportSalaryDto::to_entity)
        .collect();
    let dropped = salaries.len() - kept.len();
    (kept, dropped)
}

fn views(conn: &Connection, reports: Vec<Report>) -> AppResult<Vec<ReportView>> {
    let mut salaries: HashMap<String, ReportSalary> = load_where::<ReportSalary>(
        conn,
        "1 = 1",
        Vec::new(),
    )?
    .into_iter()
    .map(|s| (s.report_id.clone(), s))
    .collect();

    Ok(reports
        .into_iter()
        .map(|r| {
            let salary = salaries.remove(&r.id);
            ReportView::new(r, salary)
        })
        .collect())
}

fn search(conn: &Connection, extra: Option<&str>, params: Vec<Value>) -> AppResult<Vec<ReportView>> {
    let clause = match extra {
        Some(cond) => format!("(text LIKE ?1 OR title LIKE ?1) AND {cond} ORDER BY date DESC"),
        None => "(text LIKE ?1 OR title LIKE ?1) ORDER BY date DESC".to_string(),
    };
    let reports = load_where::<Report>(conn, &clause, params)?;
    views(conn, reports)
}

const REPORT_TABLES: &[Table] = &[Table::Reports, Table::ReportSalaries];

#[derive(Clone)]
pub struct ReportsRepository {
    ctx: SyncContext,
    api: Arc<dyn ReportsApi>,
    updated_at_least_once: Arc<AtomicBool>,
}

impl ReportsRepository {
    pub fn new(ctx: SyncContext, api: Arc<dyn ReportsApi>) -> Self {
        Self {
            ctx,
            api,
            updated_at_least_once: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn scoped(&self) -> Self {
        self.scoped_in(&self.ctx.scoped())
    }

    pub(crate) fn scoped_in(&self, ctx: &SyncContext) -> Self {
        Self {
            ctx: ctx.clone(),
            api: Arc::clone(&self.api),
            updated_at_least_once: Arc::clone(&self.updated_at_least_once),
        }
    }

    /// Whether a full report list has been synced since start or the last
    /// [`clear_reports`](Self::clear_reports).
    pub fn reports_updated_at_least_once(&self) -> bool {
        self.updated_at_least_once.load(Ordering::Acquire)
    }

    // ---------------------------------------------------------------------
    // Sync
    // ---------------------------------------------------------------------

    /// Every report visible to the user plus that user's salaries, filtered
    /// against the reports just fetched. Both requests finish before
    /// anything is written.
    pub async fn update_reports(
        &self,
        user_id: &str,
        sorted_by: Option<&str>,
    ) -> Resource<Vec<ReportDto>> {
        self.ctx
            .try_update("sync_reports", user_id, async {
                let dtos = self.ctx.call(self.api.get_reports(sorted_by)).await?;
                let salaries = self.ctx.call(self.api.get_report_salaries(user_id)).await?;

                let fetched: HashSet<String> = dtos.iter().map(|d| d.id.clone()).collect();
                self.write_reports(user_id, &dtos, &salaries, &fetched)?;
                self.updated_at_least_once.store(true, Ordering::Release);
                Ok(dtos)
            })
            .await
    }

    /// Reports about one employee plus salaries, filtered against every
    /// cached report and the ones just fetched.
    pub async fn update_user_reports(
        &self,
        user_id: &str,
        begin: Option<&str>,
        end: Option<&str>,
    ) -> Resource<Vec<ReportDto>> {
        self.ctx
            .try_update("sync_user_reports", user_id, async {
                let dtos = self
                    .ctx
                    .call(self.api.get_reports_of_employee(user_id, begin, end))
                    .await?;
                let salaries = self.ctx.call(self.api.get_report_salaries(user_id)).await?;

                let mut known = self.ctx.store().ids::<Report>()?;
                known.extend(dtos.iter().map(|d| d.id.clone()));
                self.write_reports(user_id, &dtos, &salaries, &known)?;
                Ok(dtos)
            })
            .await
    }

    /// Reports and their salaries in one transaction.
    fn write_reports(
        &self,
        user_id: &str,
        reports: &[ReportDto],
        salaries: &[ReportSalaryDto],
        known: &HashSet<String>,
    ) -> AppResult<()> {
        let rows: Vec<Report> = reports.iter().map(ReportDto::to_entity).collect();
        let (kept, dropped) = filter_salaries(salaries, known);
        if dropped > 0 {
            warn!(user_id, dropped, "report salaries reference unknown reports, skipped");
        }
        self.ctx.store().batch(|b| {
            b.upsert(&rows)?;
            b.upsert(&kept)?;
            Ok(())
        })
    }

    pub async fn update_report_salaries(&self, user_id: &str) -> Resource<Vec<ReportSalary>> {
        self.ctx
            .try_update("sync_report_salaries", user_id, async {
                let known = self.ctx.store().ids::<Report>()?;
                self.write_salaries_for(user_id, &known).await
            })
            .await
    }

    /// Salaries restricted to an explicit set of report ids.
    pub async fn update_report_salaries_for(
        &self,
        user_id: &str,
        report_ids: &HashSet<String>,
    ) -> Resource<Vec<ReportSalary>> {
        self.ctx
            .try_update(
                "sync_report_salaries",
                user_id,
                self.write_salaries_for(user_id, report_ids),
            )
            .await
    }

    async fn write_salaries_for(
        &self,
        user_id: &str,
        known: &HashSet<String>,
    ) -> AppResult<Vec<ReportSalary>> {
        let dtos = self.ctx.call(self.api.get_report_salaries(user_id)).await?;
        let (kept, dropped) = filter_salaries(&dtos, known);
        if dropped > 0 {
            warn!(user_id, dropped, "report salaries reference unknown reports, skipped");
        }
        self.ctx.store().upsert(&kept)?;
        Ok(kept)
    }

    pub async fn update_report(&self, report_id: &str) -> Resource<ReportDto> {
        self.ctx
            .try_update("sync_report", report_id, async {
                let dto = self.ctx.call(self.api.get_report(report_id)).await?;
                self.ctx.store().upsert(&[dto.to_entity()])?;
                Ok(dto)
            })
            .await
    }

    /// Create a report; the server's copy is cached right away.
    pub async fn create_report(
        &self,
        implementer_id: Option<&str>,
        content: &ReportText,
    ) -> Resource<ReportDto> {
        let request = ReportRequest::from(content);
        self.ctx
            .try_update("create_report", implementer_id.unwrap_or("self"), async {
                let dto = self
                    .ctx
                    .call(self.api.create_report(implementer_id, &request))
                    .await?;
                self.ctx.store().upsert(&[dto.to_entity()])?;
                Ok(dto)
            })
            .await
    }

    /// Update a salary on the server. The returned salary is cached only when
    /// its report is.
    pub async fn edit_report_salary(
        &self,
        report_id: &str,
        request: &ReportSalaryRequest,
    ) -> Resource<ReportSalaryDto> {
        self.ctx
            .try_update("edit_report_salary", report_id, async {
                let dto = self
                    .ctx
                    .call(self.api.update_report_salary(report_id, request))
                    .await?;
                let known = self.ctx.store().ids::<Report>()?;
                let (kept, dropped) = filter_salaries(std::slice::from_ref(&dto), &known);
                if dropped > 0 {
                    warn!(report_id, "edited salary belongs to an uncached report");
                }
                self.ctx.store().upsert(&kept)?;
                Ok(dto)
            })
            .await
    }

    /// Drop every cached report, salaries first.
    pub fn clear_reports(&self) -> AppResult<()> {
        self.ctx.store().batch(|b| {
            b.delete::<ReportSalary>(&Criteria::All)?;
            b.delete::<Report>(&Criteria::All)?;
            Ok(())
        })?;
        self.updated_at_least_once.store(false, Ordering::Release);
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Reads
    // ---------------------------------------------------------------------

    pub fn get_reports(&self) -> LiveQuery<Vec<ReportView>> {
        self.ctx.store().observe(REPORT_TABLES, |conn| {
            let reports = load_where::<Report>(conn, "1 = 1 ORDER BY date DESC", Vec::new())?;
            views(conn, reports)
        })
    }

    pub fn search_reports(&self, query: &str) -> LiveQuery<Vec<ReportView>> {
        let pattern = like(query);
        self.ctx.store().observe(REPORT_TABLES, move |conn| {
            search(conn, None, vec![pattern.clone()])
        })
    }

    /// Matching reports where `user_id` is the implementer.
    pub fn search_reports_about_user(
        &self,
        query: &str,
        user_id: &str,
    ) -> LiveQuery<Vec<ReportView>> {
        let params = vec![like(query), text(user_id)];
        self.ctx.store().observe(REPORT_TABLES, move |conn| {
            search(conn, Some("implementer_id = ?2"), params.clone())
        })
    }

    /// Matching reports filed by `user_id`.
    pub fn search_reports_from_user(
        &self,
        query: &str,
        user_id: &str,
    ) -> LiveQuery<Vec<ReportView>> {
        let params = vec![like(query), text(user_id)];
        self.ctx.store().observe(REPORT_TABLES, move |conn| {
            search(conn, Some("reporter_id = ?2"), params.clone())
        })
    }

    pub fn get_report(&self, report_id: &str) -> LiveQuery<Option<ReportView>> {
        let id = report_id.to_string();
        self.ctx.store().observe(REPORT_TABLES, move |conn| {
            let Some(report) = load_by_id::<Report>(conn, text(&id))? else {
                return Ok(None);
            };
            let salary = load_by_id::<ReportSalary>(conn, text(&id))?;
            Ok(Some(ReportView::new(report, salary)))
        })
    }
}
