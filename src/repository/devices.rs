use super::SyncContext;
use super::users::write_users;
use crate::errors::AppResult;
use crate::models::devices::{Device, DeviceView, EquipmentType};
use crate::remote::models::devices::{
    DeviceCreateRequest, DeviceDto, DeviceEditRequest, EquipmentTypeDto,
};
use crate::remote::{DevicesApi, UsersApi};
use crate::resource::Resource;
use crate::store::entity::{Table, text};
use crate::store::live::LiveQuery;
use crate::store::{Criteria, like, load_all, load_where};
use rusqlite::Connection;
use rusqlite::types::Value;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::warn;

fn device_views(conn: &Connection, devices: Vec<Device>) -> AppResult<Vec<DeviceView>> {
    let types: HashMap<String, EquipmentType> = load_all::<EquipmentType>(conn)?
        .into_iter()
        .map(|t| (t.id.clone(), t))
        .collect();

    let mut children: HashMap<String, Vec<Device>> = HashMap::new();
    for d in load_where::<Device>(conn, "parent_id IS NOT NULL ORDER BY number", Vec::new())? {
        if let Some(parent) = d.parent_id.clone() {
            children.entry(parent).or_default().push(d);
        }
    }

    Ok(devices
        .into_iter()
        .filter_map(|device| {
            let equipment_type = types.get(&device.type_id)?.clone();
            let children = children.remove(&device.id).unwrap_or_default();
            Some(DeviceView {
                device,
                equipment_type,
                children,
            })
        })
        .collect())
}

fn observe_where(
    ctx: &SyncContext,
    clause: &'static str,
    params: Vec<Value>,
) -> LiveQuery<Vec<DeviceView>> {
    ctx.store()
        .observe(&[Table::Devices, Table::EquipmentTypes], move |conn| {
            let devices = load_where::<Device>(conn, clause, params.clone())?;
            device_views(conn, devices)
        })
}

#[derive(Clone)]
pub struct DevicesRepository {
    ctx: SyncContext,
    api: Arc<dyn DevicesApi>,
    users: Arc<dyn UsersApi>,
}

impl DevicesRepository {
    pub fn new(ctx: SyncContext, api: Arc<dyn DevicesApi>, users: Arc<dyn UsersApi>) -> Self {
        Self { ctx, api, users }
    }

    pub fn scoped(&self) -> Self {
        self.scoped_in(&self.ctx.scoped())
    }

    pub(crate) fn scoped_in(&self, ctx: &SyncContext) -> Self {
        Self {
            ctx: ctx.clone(),
            api: Arc::clone(&self.api),
            users: Arc::clone(&self.users),
        }
    }

    // ---------------------------------------------------------------------
    // Sync
    // ---------------------------------------------------------------------

    /// Write a device payload: equipment types, owners missing from the
    /// cache, then the devices themselves in one transaction.
    async fn store_devices(&self, dtos: &[DeviceDto]) -> AppResult<usize> {
        let flat: Vec<&DeviceDto> = dtos.iter().flat_map(|d| d.flatten()).collect();
        let types: Vec<EquipmentType> = flat.iter().map(|d| d.equipment_type.to_entity()).collect();
        let mut devices: Vec<Device> = dtos.iter().flat_map(DeviceDto::entities).collect();

        let owners = devices.iter().filter_map(|d| d.owner_id.clone());
        let missing = self
            .ctx
            .fetch_missing_users(self.users.as_ref(), owners.collect::<Vec<_>>())
            .await?;

        // A parent that is neither in this payload nor cached would fail the
        // deferred check at commit.
        let cached = self.ctx.store().ids::<Device>()?;
        let incoming: HashSet<String> = devices.iter().map(|d| d.id.clone()).collect();
        let mut detached = 0usize;
        for d in &mut devices {
            if let Some(parent) = &d.parent_id
                && !incoming.contains(parent)
                && !cached.contains(parent)
            {
                d.parent_id = None;
                detached += 1;
            }
        }
        if detached > 0 {
            warn!(detached, "devices reference unknown parents, stored without parent");
        }

        self.ctx.store().batch(|b| {
            b.upsert(&types)?;
            write_users(b, &missing)?;
            b.upsert(&devices)
        })
    }

    pub async fn update_devices(&self) -> Resource<Vec<DeviceDto>> {
        self.ctx
            .try_update("sync_devices", "devices", async {
                let dtos = self.ctx.call(self.api.get_devices()).await?;
                self.store_devices(&dtos).await?;
                Ok(dtos)
            })
            .await
    }

    pub async fn update_user_devices(&self, user_id: &str) -> Resource<Vec<DeviceDto>> {
        self.ctx
            .try_update("sync_user_devices", user_id, async {
                let dtos = self.ctx.call(self.api.get_user_devices(user_id)).await?;
                self.store_devices(&dtos).await?;
                Ok(dtos)
            })
            .await
    }

    pub async fn fetch_device(&self, device_id: &str) -> Resource<DeviceDto> {
        self.ctx
            .try_update("sync_device", device_id, async {
                let dto = self.ctx.call(self.api.get_device(device_id)).await?;
                self.store_devices(std::slice::from_ref(&dto)).await?;
                Ok(dto)
            })
            .await
    }

    pub async fn update_equipment_types(&self) -> Resource<Vec<EquipmentTypeDto>> {
        self.ctx
            .try_update("sync_equipment_types", "equipment_types", async {
                let dtos = self.ctx.call(self.api.get_equipment_types()).await?;
                let rows: Vec<EquipmentType> =
                    dtos.iter().map(EquipmentTypeDto::to_entity).collect();
                self.ctx.store().upsert(&rows)?;
                Ok(dtos)
            })
            .await
    }

    pub async fn create_device(&self, request: &DeviceCreateRequest) -> Resource<DeviceDto> {
        self.ctx
            .try_update(
                "create_device",
                &request.equipment_type_id,
                self.ctx.call(self.api.create_device(request)),
            )
            .await
    }

    pub async fn edit_device(&self, request: &DeviceEditRequest) -> Resource<DeviceDto> {
        self.ctx
            .try_update(
                "edit_device",
                &request.id,
                self.ctx.call(self.api.edit_device(request)),
            )
            .await
    }

    pub async fn assign_owner(&self, device_id: &str, user_id: &str) -> Resource<DeviceDto> {
        self.ctx
            .try_update(
                "assign_owner",
                device_id,
                self.ctx.call(self.api.assign_owner(device_id, user_id)),
            )
            .await
    }

    /// Take a device back from its owner.
    pub async fn pick_up(&self, device_id: &str) -> Resource<DeviceDto> {
        self.ctx
            .try_update(
                "pick_up",
                device_id,
                self.ctx.call(self.api.pick_up(device_id)),
            )
            .await
    }

    /// Delete on the server, then locally. Children lose their parent first.
    pub async fn delete_device(&self, device_id: &str) -> Resource<()> {
        self.ctx
            .try_update("delete_device", device_id, async {
                self.ctx.call(self.api.delete_device(device_id)).await?;
                self.ctx.store().batch(|b| {
                    b.execute(
                        Table::Devices,
                        "UPDATE devices SET parent_id = NULL WHERE parent_id = ?1",
                        vec![text(device_id)],
                    )?;
                    b.delete::<Device>(&Criteria::ids([text(device_id)]))
                })?;
                Ok(())
            })
            .await
    }

    // ---------------------------------------------------------------------
    // Reads
    // ---------------------------------------------------------------------

    pub fn get_devices(&self) -> LiveQuery<Vec<DeviceView>> {
        observe_where(&self.ctx, "1 = 1 ORDER BY number", Vec::new())
    }

    pub fn search_devices(&self, query: &str) -> LiveQuery<Vec<DeviceView>> {
        observe_where(
            &self.ctx,
            "serial_number LIKE ?1 OR description LIKE ?1
             OR type_id IN (SELECT id FROM equipment_types WHERE title LIKE ?1)
             ORDER BY number",
            vec![like(query)],
        )
    }

    /// Devices nobody holds.
    pub fn get_free_devices(&self) -> LiveQuery<Vec<DeviceView>> {
        observe_where(&self.ctx, "owner_id IS NULL ORDER BY number", Vec::new())
    }

    pub fn get_user_devices(&self, user_id: &str) -> LiveQuery<Vec<DeviceView>> {
        observe_where(&self.ctx, "owner_id = ?1 ORDER BY number", vec![text(user_id)])
    }

    pub fn get_device(&self, device_id: &str) -> LiveQuery<Option<DeviceView>> {
        observe_where(&self.ctx, "id = ?1", vec![text(device_id)]).map(|mut v| v.pop())
    }

    pub fn get_equipment_types(&self) -> LiveQuery<Vec<EquipmentType>> {
        self.ctx
            .store()
            .observe(&[Table::EquipmentTypes], |conn| {
                load_where::<EquipmentType>(conn, "1 = 1 ORDER BY title", Vec::new())
            })
    }
}
