use crate::models::users::{PropertyType, User, UserProperty};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyTypeDto {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_locked: bool,
}

impl PropertyTypeDto {
    pub fn to_entity(&self) -> PropertyType {
        PropertyType {
            id: self.id.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            is_locked: self.is_locked,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPropertyDto {
    pub id: String,
    pub value: String,
    #[serde(default)]
    pub status: Option<String>,
    pub user_property_type: PropertyTypeDto,
}

impl UserPropertyDto {
    pub fn to_entity(&self, user_id: &str) -> UserProperty {
        UserProperty {
            id: self.id.clone(),
            user_id: user_id.to_string(),
            type_id: self.user_property_type.id.clone(),
            value: self.value.clone(),
            status: self.status.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub middle_name: Option<String>,
    pub email: String,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub properties: Vec<UserPropertyDto>,
}

impl UserDto {
    pub fn to_entity(&self) -> User {
        User {
            id: self.id.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            middle_name: self.middle_name.clone(),
            email: self.email.clone(),
            phone_number: self.phone_number.clone(),
        }
    }

    pub fn property_types(&self) -> Vec<PropertyType> {
        self.properties
            .iter()
            .map(|p| p.user_property_type.to_entity())
            .collect()
    }

    pub fn properties(&self) -> Vec<UserProperty> {
        self.properties
            .iter()
            .map(|p| p.to_entity(&self.id))
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserEditRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub middle_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPropertyEditRequest {
    pub id: String,
    pub value: String,
}
