//! Remote resource clients.
//!
//! One async trait per resource family. Repositories only see these traits,
//! so tests swap the HTTP client for an in-process mock.

pub mod handler;
pub mod http;
pub mod models;

use crate::errors::AppResult;
use crate::models::purchases::{PageQuery, PurchaseStatus};
use async_trait::async_trait;
use models::devices::{DeviceCreateRequest, DeviceDto, DeviceEditRequest, EquipmentTypeDto};
use models::events::{
    EventDetailDto, EventDto, EventRoleDto, EventSalaryDto, EventTypeDto, InvitationDto,
    UserEventDto,
};
use models::purchases::{PageDto, PurchaseCreateRequest, PurchaseDto};
use models::reports::{ReportDto, ReportRequest, ReportSalaryDto, ReportSalaryRequest};
use models::users::{
    PropertyTypeDto, UserDto, UserEditRequest, UserPropertyDto, UserPropertyEditRequest,
};

pub use handler::ResponseHandler;
pub use http::RestClient;

#[async_trait]
pub trait EventsApi: Send + Sync {
    async fn get_events(&self, begin: Option<&str>, end: Option<&str>) -> AppResult<Vec<EventDto>>;

    async fn get_event(&self, event_id: &str) -> AppResult<EventDetailDto>;

    async fn get_event_salary(&self, event_id: &str) -> AppResult<EventSalaryDto>;

    async fn get_user_events(
        &self,
        user_id: &str,
        begin: Option<&str>,
        end: Option<&str>,
    ) -> AppResult<Vec<UserEventDto>>;

    async fn get_event_roles(&self) -> AppResult<Vec<EventRoleDto>>;

    async fn get_event_types(&self) -> AppResult<Vec<EventTypeDto>>;

    async fn get_invitations(&self) -> AppResult<Vec<InvitationDto>>;

    async fn apply_for_place(&self, place_id: &str, role_id: &str) -> AppResult<()>;

    async fn accept_invitation(&self, place_id: &str) -> AppResult<()>;

    async fn reject_invitation(&self, place_id: &str) -> AppResult<()>;
}

#[async_trait]
pub trait ReportsApi: Send + Sync {
    async fn get_reports(&self, sorted_by: Option<&str>) -> AppResult<Vec<ReportDto>>;

    async fn get_reports_of_employee(
        &self,
        employee_id: &str,
        begin: Option<&str>,
        end: Option<&str>,
    ) -> AppResult<Vec<ReportDto>>;

    async fn get_report(&self, report_id: &str) -> AppResult<ReportDto>;

    async fn create_report(
        &self,
        implementer_id: Option<&str>,
        request: &ReportRequest,
    ) -> AppResult<ReportDto>;

    async fn get_report_salaries(&self, user_id: &str) -> AppResult<Vec<ReportSalaryDto>>;

    async fn update_report_salary(
        &self,
        report_id: &str,
        request: &ReportSalaryRequest,
    ) -> AppResult<ReportSalaryDto>;
}

#[async_trait]
pub trait UsersApi: Send + Sync {
    async fn get_users(&self) -> AppResult<Vec<UserDto>>;

    async fn get_user(&self, user_id: &str) -> AppResult<UserDto>;

    async fn get_property_types(&self) -> AppResult<Vec<PropertyTypeDto>>;

    async fn edit_user_info(&self, request: &UserEditRequest) -> AppResult<UserDto>;

    async fn edit_user_property(
        &self,
        request: &UserPropertyEditRequest,
    ) -> AppResult<UserPropertyDto>;
}

#[async_trait]
pub trait DevicesApi: Send + Sync {
    async fn get_devices(&self) -> AppResult<Vec<DeviceDto>>;

    async fn get_user_devices(&self, user_id: &str) -> AppResult<Vec<DeviceDto>>;

    async fn get_device(&self, device_id: &str) -> AppResult<DeviceDto>;

    async fn get_equipment_types(&self) -> AppResult<Vec<EquipmentTypeDto>>;

    async fn create_device(&self, request: &DeviceCreateRequest) -> AppResult<DeviceDto>;

    async fn edit_device(&self, request: &DeviceEditRequest) -> AppResult<DeviceDto>;

    async fn assign_owner(&self, device_id: &str, user_id: &str) -> AppResult<DeviceDto>;

    async fn pick_up(&self, device_id: &str) -> AppResult<DeviceDto>;

    async fn delete_device(&self, device_id: &str) -> AppResult<()>;
}

#[async_trait]
pub trait PurchasesApi: Send + Sync {
    async fn get_purchases(&self, query: &PageQuery) -> AppResult<PageDto<PurchaseDto>>;

    async fn get_purchase(&self, purchase_id: i64) -> AppResult<PurchaseDto>;

    async fn create_purchase(&self, request: &PurchaseCreateRequest) -> AppResult<PurchaseDto>;

    async fn resolve_purchase(
        &self,
        purchase_id: i64,
        status: PurchaseStatus,
    ) -> AppResult<PurchaseDto>;

    async fn delete_purchase(&self, purchase_id: i64) -> AppResult<()>;
}

/// Everything the repositories need from the server.
pub trait RemoteApi: EventsApi + ReportsApi + UsersApi + DevicesApi + PurchasesApi {}

impl<T> RemoteApi for T where T: EventsApi + ReportsApi + UsersApi + DevicesApi + PurchasesApi {}
