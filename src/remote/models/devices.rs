use crate::models::devices::{Device, EquipmentType};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentTypeDto {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub short_title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl EquipmentTypeDto {
    pub fn to_entity(&self) -> EquipmentType {
        EquipmentType {
            id: self.id.clone(),
            title: self.title.clone(),
            short_title: self.short_title.clone(),
            description: self.description.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceDto {
    pub id: String,
    #[serde(default)]
    pub serial_number: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub number: i64,
    pub equipment_type: EquipmentTypeDto,
    #[serde(default)]
    pub owner_id: Option<String>,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub children: Vec<DeviceDto>,
}

impl DeviceDto {
    pub fn to_entity(&self) -> Device {
        Device {
            id: self.id.clone(),
            serial_number: self.serial_number.clone(),
            description: self.description.clone(),
            number: self.number,
            type_id: self.equipment_type.id.clone(),
            owner_id: self.owner_id.clone(),
            parent_id: self.parent_id.clone(),
        }
    }

    /// This device followed by every nested child, depth first.
    pub fn flatten(&self) -> Vec<&DeviceDto> {
        let mut out = vec![self];
        for child in &self.children {
            out.extend(child.flatten());
        }
        out
    }

    /// Rows for this device and its nested children. A child without an
    /// explicit parent is attached to the device it was nested in.
    pub fn entities(&self) -> Vec<Device> {
        let mut out = vec![self.to_entity()];
        for child in &self.children {
            let mut rows = child.entities();
            if let Some(first) = rows.first_mut()
                && first.parent_id.is_none()
            {
                first.parent_id = Some(self.id.clone());
            }
            out.extend(rows);
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceCreateRequest {
    pub equipment_type_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceEditRequest {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub equipment_type_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
}
