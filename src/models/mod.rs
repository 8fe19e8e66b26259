//! Cached row types, one module per resource family.

pub mod devices;
pub mod events;
pub mod purchases;
pub mod reports;
pub mod users;
