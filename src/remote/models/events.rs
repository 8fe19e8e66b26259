//! Event family payloads and their conversion to cached rows.

use crate::models::events::{
    Event, EventDetail, EventRole, EventSalary, EventType, Invitation, Place, PlaceSalary, Salary,
    Shift, ShiftSalary, UserEvent,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventTypeDto {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl EventTypeDto {
    pub fn to_entity(&self) -> EventType {
        EventType {
            id: self.id.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRoleDto {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl EventRoleDto {
    pub fn to_entity(&self) -> EventRole {
        EventRole {
            id: self.id.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
        }
    }
}

/// Compact event as returned by the event list endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDto {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub address: String,
    pub event_type: EventTypeDto,
    pub begin_time: String,
    pub end_time: String,
}

impl EventDto {
    pub fn to_entity(&self) -> Event {
        Event {
            id: self.id.clone(),
            title: self.title.clone(),
            address: self.address.clone(),
            type_id: self.event_type.id.clone(),
            begin_time: self.begin_time.clone(),
            end_time: self.end_time.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceDto {
    pub id: String,
    pub target_participants_count: i64,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftDto {
    pub id: String,
    pub begin_time: String,
    pub end_time: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub places: Vec<PlaceDto>,
}

/// Full event with its shifts and places.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDetailDto {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub address: String,
    pub event_type: EventTypeDto,
    pub begin_time: String,
    pub end_time: String,
    #[serde(default)]
    pub shifts: Vec<ShiftDto>,
}

impl EventDetailDto {
    pub fn to_event(&self) -> Event {
        Event {
            id: self.id.clone(),
            title: self.title.clone(),
            address: self.address.clone(),
            type_id: self.event_type.id.clone(),
            begin_time: self.begin_time.clone(),
            end_time: self.end_time.clone(),
        }
    }

    pub fn to_detail(&self) -> EventDetail {
        EventDetail {
            event_id: self.id.clone(),
            description: self.description.clone(),
        }
    }

    pub fn shifts(&self) -> Vec<Shift> {
        self.shifts
            .iter()
            .map(|s| Shift {
                id: s.id.clone(),
                event_id: self.id.clone(),
                begin_time: s.begin_time.clone(),
                end_time: s.end_time.clone(),
                description: s.description.clone(),
            })
            .collect()
    }

    pub fn places(&self) -> Vec<Place> {
        self.shifts
            .iter()
            .flat_map(|s| {
                s.places.iter().map(move |p| Place {
                    id: p.id.clone(),
                    shift_id: s.id.clone(),
                    target_participants_count: p.target_participants_count,
                    description: p.description.clone(),
                })
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftSalaryDto {
    pub shift_id: String,
    pub count: i64,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceSalaryDto {
    pub place_id: String,
    pub count: i64,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSalaryDto {
    pub event_id: String,
    pub count: i64,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub shift_salaries: Vec<ShiftSalaryDto>,
    #[serde(default)]
    pub place_salaries: Vec<PlaceSalaryDto>,
}

impl EventSalaryDto {
    pub fn event_salary(&self) -> EventSalary {
        EventSalary(Salary {
            owner_id: self.event_id.clone(),
            count: self.count,
            description: self.description.clone(),
        })
    }

    pub fn shift_salaries(&self) -> Vec<ShiftSalary> {
        self.shift_salaries
            .iter()
            .map(|s| {
                ShiftSalary(Salary {
                    owner_id: s.shift_id.clone(),
                    count: s.count,
                    description: s.description.clone(),
                })
            })
            .collect()
    }

    pub fn place_salaries(&self) -> Vec<PlaceSalary> {
        self.place_salaries
            .iter()
            .map(|p| {
                PlaceSalary(Salary {
                    owner_id: p.place_id.clone(),
                    count: p.count,
                    description: p.description.clone(),
                })
            })
            .collect()
    }
}

/// An event the user takes part in, with the role they hold there.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserEventDto {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub address: String,
    pub begin_time: String,
    pub end_time: String,
    pub event_type: EventTypeDto,
    pub role: EventRoleDto,
}

impl UserEventDto {
    pub fn to_event(&self) -> Event {
        Event {
            id: self.id.clone(),
            title: self.title.clone(),
            address: self.address.clone(),
            type_id: self.event_type.id.clone(),
            begin_time: self.begin_time.clone(),
            end_time: self.end_time.clone(),
        }
    }

    pub fn to_user_event(&self, user_id: &str) -> UserEvent {
        UserEvent {
            event_id: self.id.clone(),
            user_id: user_id.to_string(),
            role_id: self.role.id.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvitationDto {
    pub place_id: String,
    pub event_id: String,
    pub event_title: String,
    pub event_type: EventTypeDto,
    pub role: EventRoleDto,
    pub begin_time: String,
    pub end_time: String,
}

impl InvitationDto {
    pub fn to_entity(&self) -> Invitation {
        Invitation {
            place_id: self.place_id.clone(),
            event_id: self.event_id.clone(),
            event_title: self.event_title.clone(),
            type_id: self.event_type.id.clone(),
            role_id: self.role.id.clone(),
            begin_time: self.begin_time.clone(),
            end_time: self.end_time.clone(),
        }
    }
}
