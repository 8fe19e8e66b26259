//! Users, their typed properties and the property type lookup.

use crate::store::entity::{Entity, Table, boolean, opt_text, text};
use rusqlite::Row;
use rusqlite::types::Value;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub middle_name: Option<String>,
    pub email: String,
    pub phone_number: Option<String>,
}

impl User {
    pub fn full_name(&self) -> String {
        let mut parts = vec![self.last_name.as_str(), self.first_name.as_str()];
        if let Some(m) = self.middle_name.as_deref()
            && !m.is_empty()
        {
            parts.push(m);
        }
        parts
            .into_iter()
            .filter(|p| !p.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Entity for User {
    const TABLE: Table = Table::Users;
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "first_name",
        "last_name",
        "middle_name",
        "email",
        "phone_number",
    ];
    const PRIMARY_KEY: &'static [&'static str] = &["id"];

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            first_name: row.get("first_name")?,
            last_name: row.get("last_name")?,
            middle_name: row.get("middle_name")?,
            email: row.get("email")?,
            phone_number: row.get("phone_number")?,
        })
    }

    fn to_values(&self) -> Vec<Value> {
        vec![
            text(&self.id),
            text(&self.first_name),
            text(&self.last_name),
            opt_text(self.middle_name.as_deref()),
            text(&self.email),
            opt_text(self.phone_number.as_deref()),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PropertyType {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub is_locked: bool,
}

impl Entity for PropertyType {
    const TABLE: Table = Table::PropertyTypes;
    const COLUMNS: &'static [&'static str] = &["id", "title", "description", "is_locked"];
    const PRIMARY_KEY: &'static [&'static str] = &["id"];

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            title: row.get("title")?,
            description: row.get("description")?,
            is_locked: row.get("is_locked")?,
        })
    }

    fn to_values(&self) -> Vec<Value> {
        vec![
            text(&self.id),
            text(&self.title),
            opt_text(self.description.as_deref()),
            boolean(self.is_locked),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserProperty {
    pub id: String,
    pub user_id: String,
    pub type_id: String,
    pub value: String,
    pub status: Option<String>,
}

impl Entity for UserProperty {
    const TABLE: Table = Table::UserProperties;
    const COLUMNS: &'static [&'static str] = &["id", "user_id", "type_id", "value", "status"];
    const PRIMARY_KEY: &'static [&'static str] = &["id"];

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            type_id: row.get("type_id")?,
            value: row.get("value")?,
            status: row.get("status")?,
        })
    }

    fn to_values(&self) -> Vec<Value> {
        vec![
            text(&self.id),
            text(&self.user_id),
            text(&self.type_id),
            text(&self.value),
            opt_text(self.status.as_deref()),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertyWithType {
    pub property: UserProperty,
    pub property_type: PropertyType,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserWithProperties {
    pub user: User,
    pub properties: Vec<PropertyWithType>,
}

impl UserWithProperties {
    /// Value of the first property whose type title matches, ignoring case.
    pub fn property(&self, type_title: &str) -> Option<&str> {
        self.properties
            .iter()
            .find(|p| p.property_type.title.eq_ignore_ascii_case(type_title))
            .map(|p| p.property.value.as_str())
    }
}
