//! Event family rows: lookups, events, event detail children, salaries,
//! participation and invitations.

use crate::store::entity::{Entity, Table, int, opt_text, text};
use rusqlite::Row;
use rusqlite::types::Value;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventType {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
}

impl Entity for EventType {
    const TABLE: Table = Table::EventTypes;
    const COLUMNS: &'static [&'static str] = &["id", "title", "description"];
    const PRIMARY_KEY: &'static [&'static str] = &["id"];

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            title: row.get("title")?,
            description: row.get("description")?,
        })
    }

    fn to_values(&self) -> Vec<Value> {
        vec![
            text(&self.id),
            text(&self.title),
            opt_text(self.description.as_deref()),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventRole {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
}

impl Entity for EventRole {
    const TABLE: Table = Table::EventRoles;
    const COLUMNS: &'static [&'static str] = &["id", "title", "description"];
    const PRIMARY_KEY: &'static [&'static str] = &["id"];

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            title: row.get("title")?,
            description: row.get("description")?,
        })
    }

    fn to_values(&self) -> Vec<Value> {
        vec![
            text(&self.id),
            text(&self.title),
            opt_text(self.description.as_deref()),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Event {
    pub id: String,
    pub title: String,
    pub address: String,
    pub type_id: String,
    pub begin_time: String, // ISO-8601
    pub end_time: String,   // ISO-8601
}

impl Entity for Event {
    const TABLE: Table = Table::Events;
    const COLUMNS: &'static [&'static str] =
        &["id", "title", "address", "type_id", "begin_time", "end_time"];
    const PRIMARY_KEY: &'static [&'static str] = &["id"];

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            title: row.get("title")?,
            address: row.get("address")?,
            type_id: row.get("type_id")?,
            begin_time: row.get("begin_time")?,
            end_time: row.get("end_time")?,
        })
    }

    fn to_values(&self) -> Vec<Value> {
        vec![
            text(&self.id),
            text(&self.title),
            text(&self.address),
            text(&self.type_id),
            text(&self.begin_time),
            text(&self.end_time),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventDetail {
    pub event_id: String,
    pub description: String,
}

impl Entity for EventDetail {
    const TABLE: Table = Table::EventDetails;
    const COLUMNS: &'static [&'static str] = &["event_id", "description"];
    const PRIMARY_KEY: &'static [&'static str] = &["event_id"];

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            event_id: row.get("event_id")?,
            description: row.get("description")?,
        })
    }

    fn to_values(&self) -> Vec<Value> {
        vec![text(&self.event_id), text(&self.description)]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Shift {
    pub id: String,
    pub event_id: String,
    pub begin_time: String,
    pub end_time: String,
    pub description: Option<String>,
}

impl Entity for Shift {
    const TABLE: Table = Table::Shifts;
    const COLUMNS: &'static [&'static str] =
        &["id", "event_id", "begin_time", "end_time", "description"];
    const PRIMARY_KEY: &'static [&'static str] = &["id"];

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            event_id: row.get("event_id")?,
            begin_time: row.get("begin_time")?,
            end_time: row.get("end_time")?,
            description: row.get("description")?,
        })
    }

    fn to_values(&self) -> Vec<Value> {
        vec![
            text(&self.id),
            text(&self.event_id),
            text(&self.begin_time),
            text(&self.end_time),
            opt_text(self.description.as_deref()),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Place {
    pub id: String,
    pub shift_id: String,
    pub target_participants_count: i64,
    pub description: Option<String>,
}

impl Entity for Place {
    const TABLE: Table = Table::Places;
    const COLUMNS: &'static [&'static str] =
        &["id", "shift_id", "target_participants_count", "description"];
    const PRIMARY_KEY: &'static [&'static str] = &["id"];

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            shift_id: row.get("shift_id")?,
            target_participants_count: row.get("target_participants_count")?,
            description: row.get("description")?,
        })
    }

    fn to_values(&self) -> Vec<Value> {
        vec![
            text(&self.id),
            text(&self.shift_id),
            int(self.target_participants_count),
            opt_text(self.description.as_deref()),
        ]
    }
}

/// Salary attached to an event, a shift or a place; `owner_id` is the key of
/// whichever row it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Salary {
    pub owner_id: String,
    pub count: i64,
    pub description: Option<String>,
}

impl Salary {
    fn from_row_keyed(row: &Row<'_>, key: &str) -> rusqlite::Result<Self> {
        Ok(Self {
            owner_id: row.get(key)?,
            count: row.get("count")?,
            description: row.get("description")?,
        })
    }

    fn values(&self) -> Vec<Value> {
        vec![
            text(&self.owner_id),
            int(self.count),
            opt_text(self.description.as_deref()),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventSalary(pub Salary);

impl Entity for EventSalary {
    const TABLE: Table = Table::EventSalaries;
    const COLUMNS: &'static [&'static str] = &["event_id", "count", "description"];
    const PRIMARY_KEY: &'static [&'static str] = &["event_id"];

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Salary::from_row_keyed(row, "event_id").map(Self)
    }

    fn to_values(&self) -> Vec<Value> {
        self.0.values()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShiftSalary(pub Salary);

impl Entity for ShiftSalary {
    const TABLE: Table = Table::ShiftSalaries;
    const COLUMNS: &'static [&'static str] = &["shift_id", "count", "description"];
    const PRIMARY_KEY: &'static [&'static str] = &["shift_id"];

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Salary::from_row_keyed(row, "shift_id").map(Self)
    }

    fn to_values(&self) -> Vec<Value> {
        self.0.values()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlaceSalary(pub Salary);

impl Entity for PlaceSalary {
    const TABLE: Table = Table::PlaceSalaries;
    const COLUMNS: &'static [&'static str] = &["place_id", "count", "description"];
    const PRIMARY_KEY: &'static [&'static str] = &["place_id"];

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Salary::from_row_keyed(row, "place_id").map(Self)
    }

    fn to_values(&self) -> Vec<Value> {
        self.0.values()
    }
}

/// A user's participation in an event with an assigned role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserEvent {
    pub event_id: String,
    pub user_id: String,
    pub role_id: String,
}

impl Entity for UserEvent {
    const TABLE: Table = Table::UserEvents;
    const COLUMNS: &'static [&'static str] = &["event_id", "user_id", "role_id"];
    const PRIMARY_KEY: &'static [&'static str] = &["event_id", "user_id"];

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            event_id: row.get("event_id")?,
            user_id: row.get("user_id")?,
            role_id: row.get("role_id")?,
        })
    }

    fn to_values(&self) -> Vec<Value> {
        vec![
            text(&self.event_id),
            text(&self.user_id),
            text(&self.role_id),
        ]
    }
}

/// Pending offer to take a role at a place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Invitation {
    pub place_id: String,
    pub event_id: String,
    pub event_title: String,
    pub type_id: String,
    pub role_id: String,
    pub begin_time: String,
    pub end_time: String,
}

impl Entity for Invitation {
    const TABLE: Table = Table::Invitations;
    const COLUMNS: &'static [&'static str] = &[
        "place_id",
        "event_id",
        "event_title",
        "type_id",
        "role_id",
        "begin_time",
        "end_time",
    ];
    const PRIMARY_KEY: &'static [&'static str] = &["place_id"];

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            place_id: row.get("place_id")?,
            event_id: row.get("event_id")?,
            event_title: row.get("event_title")?,
            type_id: row.get("type_id")?,
            role_id: row.get("role_id")?,
            begin_time: row.get("begin_time")?,
            end_time: row.get("end_time")?,
        })
    }

    fn to_values(&self) -> Vec<Value> {
        vec![
            text(&self.place_id),
            text(&self.event_id),
            text(&self.event_title),
            text(&self.type_id),
            text(&self.role_id),
            text(&self.begin_time),
            text(&self.end_time),
        ]
    }
}

// ---------------------------------------------------------------------------
// Read models assembled from several tables
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventWithType {
    pub event: Event,
    pub event_type: EventType,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaceWithSalary {
    pub place: Place,
    pub salary: Option<Salary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShiftWithPlaces {
    pub shift: Shift,
    pub salary: Option<Salary>,
    pub places: Vec<PlaceWithSalary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventDetailView {
    pub event: Event,
    pub event_type: EventType,
    pub description: Option<String>,
    pub salary: Option<Salary>,
    pub shifts: Vec<ShiftWithPlaces>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserEventView {
    pub event: Event,
    pub event_type: EventType,
    pub role: EventRole,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvitationView {
    pub invitation: Invitation,
    pub event_type: EventType,
    pub role: EventRole,
}
