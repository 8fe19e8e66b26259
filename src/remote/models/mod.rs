//! Wire payloads (camelCase JSON) grouped by resource family.

pub mod devices;
pub mod events;
pub mod purchases;
pub mod reports;
pub mod users;
