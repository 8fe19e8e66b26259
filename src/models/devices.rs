use crate::store::entity::{Entity, Table, int, opt_text, text};
use rusqlite::Row;
use rusqlite::types::Value;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EquipmentType {
    pub id: String,
    pub title: String,
    pub short_title: Option<String>,
    pub description: Option<String>,
}

impl Entity for EquipmentType {
    const TABLE: Table = Table::EquipmentTypes;
    const COLUMNS: &'static [&'static str] = &["id", "title", "short_title", "description"];
    const PRIMARY_KEY: &'static [&'static str] = &["id"];

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            title: row.get("title")?,
            short_title: row.get("short_title")?,
            description: row.get("description")?,
        })
    }

    fn to_values(&self) -> Vec<Value> {
        vec![
            text(&self.id),
            text(&self.title),
            opt_text(self.short_title.as_deref()),
            opt_text(self.description.as_deref()),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Device {
    pub id: String,
    pub serial_number: Option<String>,
    pub description: Option<String>,
    pub number: i64,
    pub type_id: String,
    pub owner_id: Option<String>,
    pub parent_id: Option<String>,
}

impl Entity for Device {
    const TABLE: Table = Table::Devices;
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "serial_number",
        "description",
        "number",
        "type_id",
        "owner_id",
        "parent_id",
    ];
    const PRIMARY_KEY: &'static [&'static str] = &["id"];

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            serial_number: row.get("serial_number")?,
            description: row.get("description")?,
            number: row.get("number")?,
            type_id: row.get("type_id")?,
            owner_id: row.get("owner_id")?,
            parent_id: row.get("parent_id")?,
        })
    }

    fn to_values(&self) -> Vec<Value> {
        vec![
            text(&self.id),
            opt_text(self.serial_number.as_deref()),
            opt_text(self.description.as_deref()),
            int(self.number),
            text(&self.type_id),
            opt_text(self.owner_id.as_deref()),
            opt_text(self.parent_id.as_deref()),
        ]
    }
}

/// A device with its type and the children derived from `parent_id`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceView {
    pub device: Device,
    pub equipment_type: EquipmentType,
    pub children: Vec<Device>,
}
