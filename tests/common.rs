#![allow(dead_code)]
use assert_cmd::{Command, cargo_bin_cmd};
use async_trait::async_trait;
use itlab_sync::app::{App, AppSettings};
use itlab_sync::errors::{AppError, AppResult};
use itlab_sync::models::purchases::{PageQuery, PurchaseStatus};
use itlab_sync::remote::models::devices::{
    DeviceCreateRequest, DeviceDto, DeviceEditRequest, EquipmentTypeDto,
};
use itlab_sync::remote::models::events::{
    EventDetailDto, EventDto, EventRoleDto, EventSalaryDto, EventTypeDto, InvitationDto, PlaceDto,
    ShiftDto, UserEventDto,
};
use itlab_sync::remote::models::purchases::{
    PageDto, PurchaseCreateRequest, PurchaseDto, PurchaseSolutionDto,
};
use itlab_sync::remote::models::reports::{
    AssigneesDto, ReportDto, ReportRequest, ReportSalaryDto, ReportSalaryRequest,
};
use itlab_sync::remote::models::users::{
    PropertyTypeDto, UserDto, UserEditRequest, UserPropertyDto, UserPropertyEditRequest,
};
use itlab_sync::remote::{DevicesApi, EventsApi, PurchasesApi, ReportsApi, UsersApi};
use itlab_sync::store::CacheStore;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

pub fn itlab() -> Command {
    cargo_bin_cmd!("itlab-sync")
}

/// A cache file inside a fresh temp dir. Keep the dir alive for the test.
pub fn temp_store() -> (TempDir, CacheStore) {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("cache.sqlite");
    let store = CacheStore::open(&path.to_string_lossy()).expect("open store");
    (dir, store)
}

pub fn settings() -> AppSettings {
    AppSettings {
        user_id: Some("u1".to_string()),
        page_size: 2,
        max_concurrent_requests: 4,
    }
}

pub fn app_with(remote: &Arc<MockRemote>) -> (TempDir, App) {
    let (dir, store) = temp_store();
    (dir, App::with_remote(store, Arc::clone(remote), settings()))
}

// ---------------------------------------------------------------------------
// Sample payloads
// ---------------------------------------------------------------------------

pub fn event_type(id: &str) -> EventTypeDto {
    EventTypeDto {
        id: id.to_string(),
        title: format!("type {id}"),
        description: None,
    }
}

pub fn role(id: &str) -> EventRoleDto {
    EventRoleDto {
        id: id.to_string(),
        title: format!("role {id}"),
        description: None,
    }
}

pub fn event(id: &str, type_id: &str, begin: &str) -> EventDto {
    EventDto {
        id: id.to_string(),
        title: format!("Event {id}"),
        address: "Vernadsky 78".to_string(),
        event_type: event_type(type_id),
        begin_time: begin.to_string(),
        end_time: begin.replace("T10", "T18"),
    }
}

/// Event with shift `s1` holding places `p1` and `p2`.
pub fn event_detail(id: &str) -> EventDetailDto {
    EventDetailDto {
        id: id.to_string(),
        title: format!("Event {id}"),
        description: "hackathon".to_string(),
        address: "Vernadsky 78".to_string(),
        event_type: event_type("t1"),
        begin_time: "2026-03-01T10:00:00.000Z".to_string(),
        end_time: "2026-03-01T18:00:00.000Z".to_string(),
        shifts: vec![ShiftDto {
            id: "s1".to_string(),
            begin_time: "2026-03-01T10:00:00.000Z".to_string(),
            end_time: "2026-03-01T14:00:00.000Z".to_string(),
            description: None,
            places: vec![
                PlaceDto {
                    id: "p1".to_string(),
                    target_participants_count: 3,
                    description: None,
                },
                PlaceDto {
                    id: "p2".to_string(),
                    target_participants_count: 2,
                    description: Some("stage".to_string()),
                },
            ],
        }],
    }
}

pub fn user_event(id: &str, role_id: &str) -> UserEventDto {
    UserEventDto {
        id: id.to_string(),
        title: format!("Event {id}"),
        address: String::new(),
        begin_time: "2026-03-01T10:00:00.000Z".to_string(),
        end_time: "2026-03-01T18:00:00.000Z".to_string(),
        event_type: event_type("t1"),
        role: role(role_id),
    }
}

pub fn invitation(place_id: &str, event_id: &str) -> InvitationDto {
    InvitationDto {
        place_id: place_id.to_string(),
        event_id: event_id.to_string(),
        event_title: format!("Event {event_id}"),
        event_type: event_type("t1"),
        role: role("r1"),
        begin_time: "2026-03-01T10:00:00.000Z".to_string(),
        end_time: "2026-03-01T18:00:00.000Z".to_string(),
    }
}

pub fn user(id: &str) -> UserDto {
    UserDto {
        id: id.to_string(),
        first_name: "Ivan".to_string(),
        last_name: format!("Petrov-{id}"),
        middle_name: None,
        email: format!("{id}@rtuitlab.dev"),
        phone_number: None,
        properties: vec![UserPropertyDto {
            id: format!("prop-{id}"),
            value: "@ivan".to_string(),
            status: None,
            user_property_type: PropertyTypeDto {
                id: "vk".to_string(),
                title: "VK".to_string(),
                description: None,
                is_locked: false,
            },
        }],
    }
}

pub fn report(id: &str, reporter: &str, implementer: &str, text: &str) -> ReportDto {
    ReportDto {
        id: id.to_string(),
        assignees: AssigneesDto {
            reporter_id: reporter.to_string(),
            implementer_id: implementer.to_string(),
        },
        date: "2026-02-10T09:00:00.000Z".to_string(),
        text: text.to_string(),
        name: None,
        archived: None,
    }
}

pub fn report_salary(report_id: &str, count: i64) -> ReportSalaryDto {
    ReportSalaryDto {
        report_id: report_id.to_string(),
        count,
        description: None,
        approver_id: None,
        approving_date: None,
    }
}

pub fn equipment_type(id: &str) -> EquipmentTypeDto {
    EquipmentTypeDto {
        id: id.to_string(),
        title: format!("Laptop {id}"),
        short_title: None,
        description: None,
    }
}

pub fn device(id: &str, number: i64, owner: Option<&str>) -> DeviceDto {
    DeviceDto {
        id: id.to_string(),
        serial_number: Some(format!("SN-{id}")),
        description: None,
        number,
        equipment_type: equipment_type("eq1"),
        owner_id: owner.map(str::to_string),
        parent_id: None,
        children: Vec::new(),
    }
}

pub fn purchase(id: i64, status: PurchaseStatus) -> PurchaseDto {
    PurchaseDto {
        id,
        name: format!("Item {id}"),
        price: 10.5 * id as f64,
        quantity: 1,
        purchase_date: format!("2026-01-{:02}T00:00:00.000Z", (id % 28) + 1),
        description: None,
        purchaser_id: "u1".to_string(),
        solution: PurchaseSolutionDto {
            status,
            solver_id: None,
            date: None,
        },
    }
}

// ---------------------------------------------------------------------------
// In-process server
// ---------------------------------------------------------------------------

/// Canned server. Every call is recorded; `offline` makes every call fail
/// like an unreachable host; `down` does the same for single operations;
/// `delay` holds every call for a while.
#[derive(Default)]
pub struct MockRemote {
    pub offline: AtomicBool,
    pub down: Mutex<Vec<String>>,
    pub delay: Mutex<Option<Duration>>,
    pub calls: Mutex<Vec<String>>,

    pub events: Mutex<Vec<EventDto>>,
    pub event_details: Mutex<HashMap<String, EventDetailDto>>,
    pub event_salaries: Mutex<HashMap<String, EventSalaryDto>>,
    pub user_events: Mutex<Vec<UserEventDto>>,
    pub event_roles: Mutex<Vec<EventRoleDto>>,
    pub event_types: Mutex<Vec<EventTypeDto>>,
    pub invitations: Mutex<Vec<InvitationDto>>,

    pub reports: Mutex<Vec<ReportDto>>,
    pub report_salaries: Mutex<Vec<ReportSalaryDto>>,
    pub last_report_request: Mutex<Option<ReportRequest>>,

    pub users: Mutex<Vec<UserDto>>,
    pub property_types: Mutex<Vec<PropertyTypeDto>>,

    pub devices: Mutex<Vec<DeviceDto>>,
    pub equipment_types: Mutex<Vec<EquipmentTypeDto>>,

    /// Page `n` (1-based) is `purchase_pages[n - 1]`; past the end is empty.
    pub purchase_pages: Mutex<Vec<Vec<PurchaseDto>>>,
}

fn snapshot<T: Clone>(m: &Mutex<T>) -> T {
    m.lock().unwrap().clone()
}

impl MockRemote {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn take_down(&self, op: &str) {
        self.down.lock().unwrap().push(op.to_string());
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    pub fn calls(&self) -> Vec<String> {
        snapshot(&self.calls)
    }

    pub fn count_calls(&self, op: &str) -> usize {
        self.calls().iter().filter(|c| c.as_str() == op).count()
    }

    async fn gate(&self, op: &str) -> AppResult<()> {
        self.calls.lock().unwrap().push(op.to_string());
        let delay = *self.delay.lock().unwrap();
        if let Some(d) = delay {
            tokio::time::sleep(d).await;
        }
        if self.offline.load(Ordering::SeqCst) || self.down.lock().unwrap().iter().any(|d| d == op)
        {
            return Err(AppError::Transport("connection refused".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl EventsApi for MockRemote {
    async fn get_events(&self, _begin: Option<&str>, _end: Option<&str>) -> AppResult<Vec<EventDto>> {
        self.gate("get_events").await?;
        Ok(snapshot(&self.events))
    }

    async fn get_event(&self, event_id: &str) -> AppResult<EventDetailDto> {
        self.gate("get_event").await?;
        snapshot(&self.event_details)
            .remove(event_id)
            .ok_or_else(|| AppError::Http {
                status: 404,
                body: event_id.to_string(),
            })
    }

    async fn get_event_salary(&self, event_id: &str) -> AppResult<EventSalaryDto> {
        self.gate("get_event_salary").await?;
        snapshot(&self.event_salaries)
            .remove(event_id)
            .ok_or_else(|| AppError::Http {
                status: 404,
                body: event_id.to_string(),
            })
    }

    async fn get_user_events(
        &self,
        _user_id: &str,
        _begin: Option<&str>,
        _end: Option<&str>,
    ) -> AppResult<Vec<UserEventDto>> {
        self.gate("get_user_events").await?;
        Ok(snapshot(&self.user_events))
    }

    async fn get_event_roles(&self) -> AppResult<Vec<EventRoleDto>> {
        self.gate("get_event_roles").await?;
        Ok(snapshot(&self.event_roles))
    }

    async fn get_event_types(&self) -> AppResult<Vec<EventTypeDto>> {
        self.gate("get_event_types").await?;
        Ok(snapshot(&self.event_types))
    }

    async fn get_invitations(&self) -> AppResult<Vec<InvitationDto>> {
        self.gate("get_invitations").await?;
        Ok(snapshot(&self.invitations))
    }

    async fn apply_for_place(&self, _place_id: &str, _role_id: &str) -> AppResult<()> {
        self.gate("apply_for_place").await
    }

    async fn accept_invitation(&self, _place_id: &str) -> AppResult<()> {
        self.gate("accept_invitation").await
    }

    async fn reject_invitation(&self, _place_id: &str) -> AppResult<()> {
        self.gate("reject_invitation").await
    }
}

#[async_trait]
impl ReportsApi for MockRemote {
    async fn get_reports(&self, _sorted_by: Option<&str>) -> AppResult<Vec<ReportDto>> {
        self.gate("get_reports").await?;
        Ok(snapshot(&self.reports))
    }

    async fn get_reports_of_employee(
        &self,
        employee_id: &str,
        _begin: Option<&str>,
        _end: Option<&str>,
    ) -> AppResult<Vec<ReportDto>> {
        self.gate("get_reports_of_employee").await?;
        Ok(snapshot(&self.reports)
            .into_iter()
            .filter(|r| r.assignees.implementer_id == employee_id)
            .collect())
    }

    async fn get_report(&self, report_id: &str) -> AppResult<ReportDto> {
        self.gate("get_report").await?;
        snapshot(&self.reports)
            .into_iter()
            .find(|r| r.id == report_id)
            .ok_or_else(|| AppError::Http {
                status: 404,
                body: report_id.to_string(),
            })
    }

    async fn create_report(
        &self,
        implementer_id: Option<&str>,
        request: &ReportRequest,
    ) -> AppResult<ReportDto> {
        self.gate("create_report").await?;
        *self.last_report_request.lock().unwrap() = Some(request.clone());
        let mut dto = report("created", "u1", implementer_id.unwrap_or("u1"), &request.text);
        dto.name = request.name.clone();
        Ok(dto)
    }

    async fn get_report_salaries(&self, _user_id: &str) -> AppResult<Vec<ReportSalaryDto>> {
        self.gate("get_report_salaries").await?;
        Ok(snapshot(&self.report_salaries))
    }

    async fn update_report_salary(
        &self,
        report_id: &str,
        request: &ReportSalaryRequest,
    ) -> AppResult<ReportSalaryDto> {
        self.gate("update_report_salary").await?;
        let mut dto = report_salary(report_id, request.count);
        dto.description = request.description.clone();
        Ok(dto)
    }
}

#[async_trait]
impl UsersApi for MockRemote {
    async fn get_users(&self) -> AppResult<Vec<UserDto>> {
        self.gate("get_users").await?;
        Ok(snapshot(&self.users))
    }

    async fn get_user(&self, user_id: &str) -> AppResult<UserDto> {
        self.gate("get_user").await?;
        snapshot(&self.users)
            .into_iter()
            .find(|u| u.id == user_id)
            .ok_or_else(|| AppError::Http {
                status: 404,
                body: user_id.to_string(),
            })
    }

    async fn get_property_types(&self) -> AppResult<Vec<PropertyTypeDto>> {
        self.gate("get_property_types").await?;
        Ok(snapshot(&self.property_types))
    }

    async fn edit_user_info(&self, request: &UserEditRequest) -> AppResult<UserDto> {
        self.gate("edit_user_info").await?;
        let mut dto = user("u1");
        if let Some(first) = &request.first_name {
            dto.first_name = first.clone();
        }
        Ok(dto)
    }

    async fn edit_user_property(
        &self,
        request: &UserPropertyEditRequest,
    ) -> AppResult<UserPropertyDto> {
        self.gate("edit_user_property").await?;
        let mut dto = user("u1").properties.remove(0);
        dto.id = request.id.clone();
        dto.value = request.value.clone();
        Ok(dto)
    }
}

#[async_trait]
impl DevicesApi for MockRemote {
    async fn get_devices(&self) -> AppResult<Vec<DeviceDto>> {
        self.gate("get_devices").await?;
        Ok(snapshot(&self.devices))
    }

    async fn get_user_devices(&self, user_id: &str) -> AppResult<Vec<DeviceDto>> {
        self.gate("get_user_devices").await?;
        Ok(snapshot(&self.devices)
            .into_iter()
            .filter(|d| d.owner_id.as_deref() == Some(user_id))
            .collect())
    }

    async fn get_device(&self, device_id: &str) -> AppResult<DeviceDto> {
        self.gate("get_device").await?;
        snapshot(&self.devices)
            .into_iter()
            .find(|d| d.id == device_id)
            .ok_or_else(|| AppError::Http {
                status: 404,
                body: device_id.to_string(),
            })
    }

    async fn get_equipment_types(&self) -> AppResult<Vec<EquipmentTypeDto>> {
        self.gate("get_equipment_types").await?;
        Ok(snapshot(&self.equipment_types))
    }

    async fn create_device(&self, request: &DeviceCreateRequest) -> AppResult<DeviceDto> {
        self.gate("create_device").await?;
        let mut dto = device("created", 99, None);
        dto.equipment_type = equipment_type(&request.equipment_type_id);
        dto.serial_number = request.serial_number.clone();
        Ok(dto)
    }

    async fn edit_device(&self, request: &DeviceEditRequest) -> AppResult<DeviceDto> {
        self.gate("edit_device").await?;
        let mut dto = device(&request.id, 1, None);
        dto.description = request.description.clone();
        Ok(dto)
    }

    async fn assign_owner(&self, device_id: &str, user_id: &str) -> AppResult<DeviceDto> {
        self.gate("assign_owner").await?;
        Ok(device(device_id, 1, Some(user_id)))
    }

    async fn pick_up(&self, device_id: &str) -> AppResult<DeviceDto> {
        self.gate("pick_up").await?;
        Ok(device(device_id, 1, None))
    }

    async fn delete_device(&self, _device_id: &str) -> AppResult<()> {
        self.gate("delete_device").await
    }
}

#[async_trait]
impl PurchasesApi for MockRemote {
    async fn get_purchases(&self, query: &PageQuery) -> AppResult<PageDto<PurchaseDto>> {
        self.gate("get_purchases").await?;
        let pages = snapshot(&self.purchase_pages);
        let content = (query.page as usize)
            .checked_sub(1)
            .and_then(|i| pages.get(i).cloned())
            .unwrap_or_default();
        Ok(PageDto {
            content,
            number: query.page,
            size: query.size,
            total_elements: pages.iter().map(Vec::len).sum::<usize>() as u64,
            total_pages: pages.len() as u32,
        })
    }

    async fn get_purchase(&self, purchase_id: i64) -> AppResult<PurchaseDto> {
        self.gate("get_purchase").await?;
        snapshot(&self.purchase_pages)
            .into_iter()
            .flatten()
            .find(|p| p.id == purchase_id)
            .ok_or_else(|| AppError::Http {
                status: 404,
                body: purchase_id.to_string(),
            })
    }

    async fn create_purchase(&self, request: &PurchaseCreateRequest) -> AppResult<PurchaseDto> {
        self.gate("create_purchase").await?;
        let mut dto = purchase(500, PurchaseStatus::Await);
        dto.name = request.name.clone();
        Ok(dto)
    }

    async fn resolve_purchase(
        &self,
        purchase_id: i64,
        status: PurchaseStatus,
    ) -> AppResult<PurchaseDto> {
        self.gate("resolve_purchase").await?;
        Ok(purchase(purchase_id, status))
    }

    async fn delete_purchase(&self, _purchase_id: i64) -> AppResult<()> {
        self.gate("delete_purchase").await
    }
}
