//! REST implementation of every client trait, built on [`reqwest`].

use super::models::devices::{DeviceCreateRequest, DeviceDto, DeviceEditRequest, EquipmentTypeDto};
use super::models::events::{
    EventDetailDto, EventDto, EventRoleDto, EventSalaryDto, EventTypeDto, InvitationDto,
    UserEventDto,
};
use super::models::purchases::{
    PageDto, PurchaseCreateRequest, PurchaseDto, PurchaseResolveRequest,
};
use super::models::reports::{ReportDto, ReportRequest, ReportSalaryDto, ReportSalaryRequest};
use super::models::users::{
    PropertyTypeDto, UserDto, UserEditRequest, UserPropertyDto, UserPropertyEditRequest,
};
use super::{DevicesApi, EventsApi, PurchasesApi, ReportsApi, UsersApi};
use crate::errors::{AppError, AppResult};
use crate::models::purchases::{PageQuery, PurchaseStatus};
use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

type Query = Vec<(&'static str, String)>;

/// HTTP client for one ITLab deployment.
pub struct RestClient {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl RestClient {
    /// * `base_url` - deployment root, e.g. `https://dev.manage.rtuitlab.dev`.
    pub fn new(base_url: &str, token: Option<String>, timeout: Duration) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Config(format!("cannot build HTTP client: {e}")))?;
        Ok(Self::with_client(client, base_url, token))
    }

    /// Reuse an existing [`reqwest::Client`] (shared connection pool).
    pub fn with_client(client: reqwest::Client, base_url: &str, token: Option<String>) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        debug!(%method, %url, "remote request");
        let builder = self.client.request(method, url);
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: Query) -> AppResult<T> {
        let response = self.request(Method::GET, path).query(&query).send().await?;
        Self::parse_response(response).await
    }

    async fn send_json<B, T>(&self, method: Method, path: &str, query: Query, body: &B) -> AppResult<T>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .request(method, path)
            .query(&query)
            .json(body)
            .send()
            .await?;
        Self::parse_response(response).await
    }

    async fn send_empty(&self, method: Method, path: &str) -> AppResult<()> {
        let response = self.request(method, path).send().await?;
        Self::ensure_success(response).await?;
        Ok(())
    }

    // ---- private helpers ----

    async fn ensure_success(response: Response) -> AppResult<Response> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(AppError::Http {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    async fn parse_response<T: DeserializeOwned>(response: Response) -> AppResult<T> {
        let response = Self::ensure_success(response).await?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

fn range(begin: Option<&str>, end: Option<&str>, keys: (&'static str, &'static str)) -> Query {
    let mut q = Vec::new();
    if let Some(b) = begin {
        q.push((keys.0, b.to_string()));
    }
    if let Some(e) = end {
        q.push((keys.1, e.to_string()));
    }
    q
}

#[async_trait]
impl EventsApi for RestClient {
    async fn get_events(&self, begin: Option<&str>, end: Option<&str>) -> AppResult<Vec<EventDto>> {
        self.get("/api/event", range(begin, end, ("begin", "end")))
            .await
    }

    async fn get_event(&self, event_id: &str) -> AppResult<EventDetailDto> {
        self.get(&format!("/api/event/{event_id}"), Vec::new()).await
    }

    async fn get_event_salary(&self, event_id: &str) -> AppResult<EventSalaryDto> {
        self.get(&format!("/api/salary/v1/event/{event_id}"), Vec::new())
            .await
    }

    async fn get_user_events(
        &self,
        user_id: &str,
        begin: Option<&str>,
        end: Option<&str>,
    ) -> AppResult<Vec<UserEventDto>> {
        self.get(
            &format!("/api/event/user/{user_id}"),
            range(begin, end, ("begin", "end")),
        )
        .await
    }

    async fn get_event_roles(&self) -> AppResult<Vec<EventRoleDto>> {
        self.get("/api/EventRole", Vec::new()).await
    }

    async fn get_event_types(&self) -> AppResult<Vec<EventTypeDto>> {
        self.get("/api/EventType", vec![("all", "true".to_string())])
            .await
    }

    async fn get_invitations(&self) -> AppResult<Vec<InvitationDto>> {
        self.get("/api/event/applications/invitations", Vec::new())
            .await
    }

    async fn apply_for_place(&self, place_id: &str, role_id: &str) -> AppResult<()> {
        self.send_empty(
            Method::POST,
            &format!("/api/event/applications/wish/{place_id}/{role_id}"),
        )
        .await
    }

    async fn accept_invitation(&self, place_id: &str) -> AppResult<()> {
        self.send_empty(
            Method::POST,
            &format!("/api/event/applications/invitations/{place_id}/accept"),
        )
        .await
    }

    async fn reject_invitation(&self, place_id: &str) -> AppResult<()> {
        self.send_empty(
            Method::POST,
            &format!("/api/event/applications/invitations/{place_id}/reject"),
        )
        .await
    }
}

#[async_trait]
impl ReportsApi for RestClient {
    async fn get_reports(&self, sorted_by: Option<&str>) -> AppResult<Vec<ReportDto>> {
        let query = sorted_by
            .map(|s| vec![("sorted_by", s.to_string())])
            .unwrap_or_default();
        self.get("/api/reports/v1/reports", query).await
    }

    async fn get_reports_of_employee(
        &self,
        employee_id: &str,
        begin: Option<&str>,
        end: Option<&str>,
    ) -> AppResult<Vec<ReportDto>> {
        self.get(
            &format!("/api/reports/v1/reports/employee/{employee_id}"),
            range(begin, end, ("dateBegin", "dateEnd")),
        )
        .await
    }

    async fn get_report(&self, report_id: &str) -> AppResult<ReportDto> {
        self.get(&format!("/api/reports/v1/reports/{report_id}"), Vec::new())
            .await
    }

    async fn create_report(
        &self,
        implementer_id: Option<&str>,
        request: &ReportRequest,
    ) -> AppResult<ReportDto> {
        let query = implementer_id
            .map(|id| vec![("implementer", id.to_string())])
            .unwrap_or_default();
        self.send_json(Method::POST, "/api/reports/v1/reports", query, request)
            .await
    }

    async fn get_report_salaries(&self, user_id: &str) -> AppResult<Vec<ReportSalaryDto>> {
        self.get(&format!("/api/salary/v1/report/user/{user_id}"), Vec::new())
            .await
    }

    async fn update_report_salary(
        &self,
        report_id: &str,
        request: &ReportSalaryRequest,
    ) -> AppResult<ReportSalaryDto> {
        self.send_json(
            Method::PUT,
            &format!("/api/salary/v1/report/{report_id}"),
            Vec::new(),
            request,
        )
        .await
    }
}

#[async_trait]
impl UsersApi for RestClient {
    async fn get_users(&self) -> AppResult<Vec<UserDto>> {
        self.get("/api/user", vec![("count", "-1".to_string())])
            .await
    }

    async fn get_user(&self, user_id: &str) -> AppResult<UserDto> {
        self.get(&format!("/api/user/{user_id}"), Vec::new()).await
    }

    async fn get_property_types(&self) -> AppResult<Vec<PropertyTypeDto>> {
        self.get("/api/account/property/type", Vec::new()).await
    }

    async fn edit_user_info(&self, request: &UserEditRequest) -> AppResult<UserDto> {
        self.send_json(Method::PUT, "/api/account", Vec::new(), request)
            .await
    }

    async fn edit_user_property(
        &self,
        request: &UserPropertyEditRequest,
    ) -> AppResult<UserPropertyDto> {
        self.send_json(Method::PUT, "/api/account/property", Vec::new(), request)
            .await
    }
}

#[async_trait]
impl DevicesApi for RestClient {
    async fn get_devices(&self) -> AppResult<Vec<DeviceDto>> {
        self.get("/api/equipment", Vec::new()).await
    }

    async fn get_user_devices(&self, user_id: &str) -> AppResult<Vec<DeviceDto>> {
        self.get(&format!("/api/equipment/user/{user_id}"), Vec::new())
            .await
    }

    async fn get_device(&self, device_id: &str) -> AppResult<DeviceDto> {
        self.get(&format!("/api/equipment/{device_id}"), Vec::new())
            .await
    }

    async fn get_equipment_types(&self) -> AppResult<Vec<EquipmentTypeDto>> {
        self.get("/api/EquipmentType", Vec::new()).await
    }

    async fn create_device(&self, request: &DeviceCreateRequest) -> AppResult<DeviceDto> {
        self.send_json(Method::POST, "/api/equipment", Vec::new(), request)
            .await
    }

    async fn edit_device(&self, request: &DeviceEditRequest) -> AppResult<DeviceDto> {
        self.send_json(Method::PUT, "/api/equipment", Vec::new(), request)
            .await
    }

    async fn assign_owner(&self, device_id: &str, user_id: &str) -> AppResult<DeviceDto> {
        self.send_json(
            Method::POST,
            &format!("/api/equipment/user/{user_id}"),
            Vec::new(),
            &serde_json::json!({ "id": device_id }),
        )
        .await
    }

    async fn pick_up(&self, device_id: &str) -> AppResult<DeviceDto> {
        self.send_json(
            Method::DELETE,
            "/api/equipment/user",
            Vec::new(),
            &serde_json::json!({ "id": device_id }),
        )
        .await
    }

    async fn delete_device(&self, device_id: &str) -> AppResult<()> {
        self.send_empty(Method::DELETE, &format!("/api/equipment/{device_id}"))
            .await
    }
}

#[async_trait]
impl PurchasesApi for RestClient {
    async fn get_purchases(&self, query: &PageQuery) -> AppResult<PageDto<PurchaseDto>> {
        let f = &query.filter;
        let mut q: Query = vec![
            ("page", query.page.to_string()),
            ("size", query.size.to_string()),
            ("sort", format!("{},{}", f.sort_by.as_str(), f.direction.as_str())),
        ];
        if let Some(start) = &f.start_date {
            q.push(("purchaseStartDate", start.clone()));
        }
        if let Some(end) = &f.end_date {
            q.push(("purchaseEndDate", end.clone()));
        }
        if let Some(status) = f.status {
            q.push(("status", status.as_str().to_string()));
        }
        self.get("/api/purchases", q).await
    }

    async fn get_purchase(&self, purchase_id: i64) -> AppResult<PurchaseDto> {
        self.get(&format!("/api/purchases/{purchase_id}"), Vec::new())
            .await
    }

    async fn create_purchase(&self, request: &PurchaseCreateRequest) -> AppResult<PurchaseDto> {
        self.send_json(Method::POST, "/api/purchases", Vec::new(), request)
            .await
    }

    async fn resolve_purchase(
        &self,
        purchase_id: i64,
        status: PurchaseStatus,
    ) -> AppResult<PurchaseDto> {
        self.send_json(
            Method::POST,
            &format!("/api/purchases/{purchase_id}/solution"),
            Vec::new(),
            &PurchaseResolveRequest { status },
        )
        .await
    }

    async fn delete_purchase(&self, purchase_id: i64) -> AppResult<()> {
        self.send_empty(Method::DELETE, &format!("/api/purchases/{purchase_id}"))
            .await
    }
}
