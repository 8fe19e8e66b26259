use crate::errors::{AppError, AppResult};
use rusqlite::{Connection, OptionalExtension};
use tracing::{debug, info};

/// A schema step, applied once and recorded in the `log` table.
struct Migration {
    version: &'static str,
    description: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: "20240901_0001_events",
        description: "Event lookup tables, events, details, shifts and places",
        sql: r#"
        CREATE TABLE IF NOT EXISTS event_types (
            id          TEXT PRIMARY KEY NOT NULL,
            title       TEXT NOT NULL,
            description TEXT
        );

        CREATE TABLE IF NOT EXISTS event_roles (
            id          TEXT PRIMARY KEY NOT NULL,
            title       TEXT NOT NULL,
            description TEXT
        );

        CREATE TABLE IF NOT EXISTS events (
            id         TEXT PRIMARY KEY NOT NULL,
            title      TEXT NOT NULL,
            address    TEXT NOT NULL DEFAULT '',
            type_id    TEXT NOT NULL REFERENCES event_types(id),
            begin_time TEXT NOT NULL,
            end_time   TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_events_type ON events(type_id);
        CREATE INDEX IF NOT EXISTS idx_events_begin ON events(begin_time);

        CREATE TABLE IF NOT EXISTS event_details (
            event_id    TEXT PRIMARY KEY NOT NULL REFERENCES events(id),
            description TEXT NOT NULL DEFAULT ''
        );

        CREATE TABLE IF NOT EXISTS shifts (
            id          TEXT PRIMARY KEY NOT NULL,
            event_id    TEXT NOT NULL REFERENCES events(id),
            begin_time  TEXT NOT NULL,
            end_time    TEXT NOT NULL,
            description TEXT
        );
        CREATE INDEX IF NOT EXISTS idx_shifts_event ON shifts(event_id);

        CREATE TABLE IF NOT EXISTS places (
            id                        TEXT PRIMARY KEY NOT NULL,
            shift_id                  TEXT NOT NULL REFERENCES shifts(id),
            target_participants_count INTEGER NOT NULL DEFAULT 0,
            description               TEXT
        );
        CREATE INDEX IF NOT EXISTS idx_places_shift ON places(shift_id);
        "#,
    },
    Migration {
        version: "20240901_0002_salaries",
        description: "Event, shift and place salaries",
        sql: r#"
        CREATE TABLE IF NOT EXISTS event_salaries (
            event_id    TEXT PRIMARY KEY NOT NULL REFERENCES events(id),
            count       INTEGER NOT NULL,
            description TEXT
        );

        CREATE TABLE IF NOT EXISTS shift_salaries (
            shift_id    TEXT PRIMARY KEY NOT NULL REFERENCES shifts(id),
            count       INTEGER NOT NULL,
            description TEXT
        );

        CREATE TABLE IF NOT EXISTS place_salaries (
            place_id    TEXT PRIMARY KEY NOT NULL REFERENCES places(id),
            count       INTEGER NOT NULL,
            description TEXT
        );
        "#,
    },
    Migration {
        version: "20240915_0003_users",
        description: "Users, property types and user properties",
        sql: r#"
        CREATE TABLE IF NOT EXISTS users (
            id           TEXT PRIMARY KEY NOT NULL,
            first_name   TEXT NOT NULL DEFAULT '',
            last_name    TEXT NOT NULL DEFAULT '',
            middle_name  TEXT,
            email        TEXT NOT NULL DEFAULT '',
            phone_number TEXT
        );

        CREATE TABLE IF NOT EXISTS property_types (
            id          TEXT PRIMARY KEY NOT NULL,
            title       TEXT NOT NULL,
            description TEXT,
            is_locked   INTEGER NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS user_properties (
            id      TEXT PRIMARY KEY NOT NULL,
            user_id TEXT NOT NULL REFERENCES users(id),
            type_id TEXT NOT NULL REFERENCES property_types(id),
            value   TEXT NOT NULL DEFAULT '',
            status  TEXT
        );
        CREATE INDEX IF NOT EXISTS idx_user_properties_user ON user_properties(user_id);
        CREATE INDEX IF NOT EXISTS idx_user_properties_type ON user_properties(type_id);
        "#,
    },
    Migration {
        version: "20240915_0004_participation",
        description: "User events and invitations",
        sql: r#"
        CREATE TABLE IF NOT EXISTS user_events (
            event_id TEXT NOT NULL REFERENCES events(id),
            user_id  TEXT NOT NULL REFERENCES users(id),
            role_id  TEXT NOT NULL REFERENCES event_roles(id),
            PRIMARY KEY (event_id, user_id)
        );
        CREATE INDEX IF NOT EXISTS idx_user_events_user ON user_events(user_id);
        CREATE INDEX IF NOT EXISTS idx_user_events_role ON user_events(role_id);

        CREATE TABLE IF NOT EXISTS invitations (
            place_id    TEXT PRIMARY KEY NOT NULL,
            event_id    TEXT NOT NULL,
            event_title TEXT NOT NULL,
            type_id     TEXT NOT NULL REFERENCES event_types(id),
            role_id     TEXT NOT NULL REFERENCES event_roles(id),
            begin_time  TEXT NOT NULL,
            end_time    TEXT NOT NULL
        );
        "#,
    },
    Migration {
        version: "20241002_0005_reports",
        description: "Reports and report salaries",
        sql: r#"
        CREATE TABLE IF NOT EXISTS reports (
            id             TEXT PRIMARY KEY NOT NULL,
            date           TEXT NOT NULL,
            text           TEXT NOT NULL DEFAULT '',
            title          TEXT,
            archived       INTEGER,
            reporter_id    TEXT NOT NULL,
            implementer_id TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_reports_reporter ON reports(reporter_id);
        CREATE INDEX IF NOT EXISTS idx_reports_implementer ON reports(implementer_id);

        CREATE TABLE IF NOT EXISTS report_salaries (
            report_id      TEXT PRIMARY KEY NOT NULL REFERENCES reports(id),
            count          INTEGER NOT NULL,
            description    TEXT,
            approver_id    TEXT,
            approving_date TEXT
        );
        "#,
    },
    Migration {
        version: "20241020_0006_devices",
        description: "Equipment types and devices",
        sql: r#"
        CREATE TABLE IF NOT EXISTS equipment_types (
            id          TEXT PRIMARY KEY NOT NULL,
            title       TEXT NOT NULL,
            short_title TEXT,
            description TEXT
        );

        CREATE TABLE IF NOT EXISTS devices (
            id            TEXT PRIMARY KEY NOT NULL,
            serial_number TEXT,
            description   TEXT,
            number        INTEGER NOT NULL DEFAULT 0,
            type_id       TEXT NOT NULL REFERENCES equipment_types(id),
            owner_id      TEXT REFERENCES users(id),
            parent_id     TEXT REFERENCES devices(id) DEFERRABLE INITIALLY DEFERRED
        );
        CREATE INDEX IF NOT EXISTS idx_devices_type ON devices(type_id);
        CREATE INDEX IF NOT EXISTS idx_devices_owner ON devices(owner_id);
        CREATE INDEX IF NOT EXISTS idx_devices_parent ON devices(parent_id);
        "#,
    },
    Migration {
        version: "20241105_0007_purchases",
        description: "Purchases",
        sql: r#"
        CREATE TABLE IF NOT EXISTS purchases (
            id            INTEGER PRIMARY KEY NOT NULL,
            name          TEXT NOT NULL,
            price         REAL NOT NULL DEFAULT 0,
            quantity      INTEGER NOT NULL DEFAULT 1,
            purchase_date TEXT NOT NULL,
            description   TEXT,
            purchaser_id  TEXT NOT NULL,
            status        TEXT NOT NULL,
            solver_id     TEXT,
            solution_date TEXT
        );
        CREATE INDEX IF NOT EXISTS idx_purchases_date ON purchases(purchase_date);
        "#,
    },
];

/// Ensure that the `log` table exists with the modern schema.
fn ensure_log_table(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS log (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            date      TEXT NOT NULL,
            operation TEXT NOT NULL,
            target    TEXT DEFAULT '',
            message   TEXT NOT NULL
        );
        "#,
    )?;
    Ok(())
}

fn is_applied(conn: &Connection, version: &str) -> rusqlite::Result<bool> {
    let mut chk = conn.prepare_cached(
        "SELECT 1 FROM log
         WHERE operation = 'migration_applied' AND target = ?1
         LIMIT 1",
    )?;
    Ok(chk.query_row([version], |_| Ok(())).optional()?.is_some())
}

/// Versions already recorded in the log table, oldest first.
pub fn applied_versions(conn: &Connection) -> AppResult<Vec<String>> {
    ensure_log_table(conn)?;
    let mut stmt = conn.prepare(
        "SELECT target FROM log WHERE operation = 'migration_applied' ORDER BY id ASC",
    )?;
    let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

/// Public entry point: run all pending migrations.
///
/// Each step runs in its own transaction together with its log marker, so a
/// failed step leaves no partial schema behind.
pub fn run_pending_migrations(conn: &mut Connection) -> AppResult<usize> {
    ensure_log_table(conn)?;

    let mut applied = 0;
    for m in MIGRATIONS {
        if is_applied(conn, m.version)? {
            debug!(version = m.version, "migration already applied");
            continue;
        }

        let tx = conn.transaction()?;
        tx.execute_batch(m.sql)
            .map_err(|e| AppError::Migration(format!("{}: {}", m.version, e)))?;
        tx.execute(
            "INSERT INTO log (date, operation, target, message)
             VALUES (?1, 'migration_applied', ?2, ?3)",
            rusqlite::params![chrono::Local::now().to_rfc3339(), m.version, m.description],
        )?;
        tx.commit()?;

        info!(version = m.version, "migration applied: {}", m.description);
        applied += 1;
    }

    Ok(applied)
}

/// Most recent schema version known to this build.
pub fn latest_version() -> &'static str {
    MIGRATIONS
        .last()
        .map(|m| m.version)
        .unwrap_or("none")
}
