//! Table catalogue and the `Entity` mapping every cached row type implements.

use rusqlite::Row;
use rusqlite::types::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Table {
    EventTypes,
    EventRoles,
    Events,
    EventDetails,
    Shifts,
    Places,
    EventSalaries,
    ShiftSalaries,
    PlaceSalaries,
    Users,
    PropertyTypes,
    UserProperties,
    UserEvents,
    Invitations,
    Reports,
    ReportSalaries,
    EquipmentTypes,
    Devices,
    Purchases,
}

impl Table {
    pub const ALL: &'static [Table] = &[
        Table::EventTypes,
        Table::EventRoles,
        Table::Events,
        Table::EventDetails,
        Table::Shifts,
        Table::Places,
        Table::EventSalaries,
        Table::ShiftSalaries,
        Table::PlaceSalaries,
        Table::Users,
        Table::PropertyTypes,
        Table::UserProperties,
        Table::UserEvents,
        Table::Invitations,
        Table::Reports,
        Table::ReportSalaries,
        Table::EquipmentTypes,
        Table::Devices,
        Table::Purchases,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Table::EventTypes => "event_types",
            Table::EventRoles => "event_roles",
            Table::Events => "events",
            Table::EventDetails => "event_details",
            Table::Shifts => "shifts",
            Table::Places => "places",
            Table::EventSalaries => "event_salaries",
            Table::ShiftSalaries => "shift_salaries",
            Table::PlaceSalaries => "place_salaries",
            Table::Users => "users",
            Table::PropertyTypes => "property_types",
            Table::UserProperties => "user_properties",
            Table::UserEvents => "user_events",
            Table::Invitations => "invitations",
            Table::Reports => "reports",
            Table::ReportSalaries => "report_salaries",
            Table::EquipmentTypes => "equipment_types",
            Table::Devices => "devices",
            Table::Purchases => "purchases",
        }
    }
}

/// A row type mirrored in the cache.
///
/// `COLUMNS` and `to_values` must list the same columns in the same order;
/// `from_row` reads by column name.
pub trait Entity: Sized + Send + Sync + 'static {
    const TABLE: Table;
    const COLUMNS: &'static [&'static str];
    const PRIMARY_KEY: &'static [&'static str];

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;

    fn to_values(&self) -> Vec<Value>;

    fn select_sql() -> String {
        format!("SELECT {} FROM {}", Self::COLUMNS.join(", "), Self::TABLE.name())
    }
}

/// `INSERT ... ON CONFLICT(pk) DO UPDATE` overwriting every non-key column.
pub(crate) fn upsert_sql<T: Entity>() -> String {
    let cols = T::COLUMNS.join(", ");
    let placeholders = (1..=T::COLUMNS.len())
        .map(|i| format!("?{i}"))
        .collect::<Vec<_>>()
        .join(", ");
    let pk = T::PRIMARY_KEY.join(", ");

    let updates: Vec<String> = T::COLUMNS
        .iter()
        .filter(|c| !T::PRIMARY_KEY.contains(c))
        .map(|c| format!("{c} = excluded.{c}"))
        .collect();

    let conflict = if updates.is_empty() {
        "DO NOTHING".to_string()
    } else {
        format!("DO UPDATE SET {}", updates.join(", "))
    };

    format!(
        "INSERT INTO {} ({cols}) VALUES ({placeholders}) ON CONFLICT({pk}) {conflict}",
        T::TABLE.name()
    )
}

// ---------------------------------------------------------------------------
// Value helpers used by the `to_values` implementations
// ---------------------------------------------------------------------------

pub(crate) fn text(s: &str) -> Value {
    Value::Text(s.to_string())
}

pub(crate) fn opt_text(s: Option<&str>) -> Value {
    s.map(text).unwrap_or(Value::Null)
}

pub(crate) fn int(i: i64) -> Value {
    Value::Integer(i)
}

pub(crate) fn opt_int(i: Option<i64>) -> Value {
    i.map(Value::Integer).unwrap_or(Value::Null)
}

pub(crate) fn real(f: f64) -> Value {
    Value::Real(f)
}

pub(crate) fn boolean(b: bool) -> Value {
    Value::Integer(i64::from(b))
}

pub(crate) fn opt_bool(b: Option<bool>) -> Value {
    b.map(boolean).unwrap_or(Value::Null)
}
