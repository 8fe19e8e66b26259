mod common;

use common::itlab;
use predicates::prelude::*;
use predicates::str::contains;
use std::path::Path;
use tempfile::tempdir;

fn init(home: &Path, db: &Path) {
    itlab()
        .env("ITLAB_SYNC_HOME", home)
        .args(["--db", db.to_str().unwrap(), "init"])
        .assert()
        .success()
        .stdout(contains("Database initialized"));
}

#[test]
fn test_init_creates_config_and_database() {
    let home = tempdir().unwrap();
    let db = home.path().join("cache.sqlite");
    init(home.path(), &db);

    assert!(db.exists());
    assert!(home.path().join("itlab-sync.conf").exists());
}

#[test]
fn test_db_info_lists_cached_tables() {
    let home = tempdir().unwrap();
    let db = home.path().join("cache.sqlite");
    init(home.path(), &db);

    itlab()
        .env("ITLAB_SYNC_HOME", home.path())
        .args(["--db", db.to_str().unwrap(), "db", "--info", "--check"])
        .assert()
        .success()
        .stdout(contains("Cache database"))
        .stdout(contains("events"))
        .stdout(contains("Integrity check passed"));
}

#[test]
fn test_config_print_and_check() {
    let home = tempdir().unwrap();
    let db = home.path().join("cache.sqlite");
    init(home.path(), &db);

    itlab()
        .env("ITLAB_SYNC_HOME", home.path())
        .args(["config", "--print"])
        .assert()
        .success()
        .stdout(contains("base_url"))
        .stdout(contains("cache.sqlite"));

    itlab()
        .env("ITLAB_SYNC_HOME", home.path())
        .args(["config", "--check"])
        .assert()
        .success()
        .stderr(contains("access_token"));
}

#[test]
fn test_log_records_init() {
    let home = tempdir().unwrap();
    let db = home.path().join("cache.sqlite");
    init(home.path(), &db);

    itlab()
        .env("ITLAB_SYNC_HOME", home.path())
        .args(["--db", db.to_str().unwrap(), "log", "--print"])
        .assert()
        .success()
        .stdout(contains("init"))
        .stdout(contains("migration_applied"));
}

#[test]
fn test_list_on_empty_cache() {
    let home = tempdir().unwrap();
    let db = home.path().join("cache.sqlite");
    init(home.path(), &db);

    for target in ["events", "users", "devices", "purchases"] {
        itlab()
            .env("ITLAB_SYNC_HOME", home.path())
            .args(["--db", db.to_str().unwrap(), "list", target])
            .assert()
            .success()
            .stdout(contains("Nothing cached"));
    }
}

#[test]
fn test_clear_reports() {
    let home = tempdir().unwrap();
    let db = home.path().join("cache.sqlite");
    init(home.path(), &db);

    itlab()
        .env("ITLAB_SYNC_HOME", home.path())
        .args(["--db", db.to_str().unwrap(), "clear", "--reports"])
        .assert()
        .success()
        .stdout(contains("Cached reports removed"));
}

#[test]
fn test_sync_single_event_requires_id() {
    let home = tempdir().unwrap();
    let db = home.path().join("cache.sqlite");
    init(home.path(), &db);

    itlab()
        .env("ITLAB_SYNC_HOME", home.path())
        .args(["--db", db.to_str().unwrap(), "sync", "event"])
        .assert()
        .failure()
        .stderr(contains("--id is required"));
}

#[test]
fn test_sync_rejects_bad_dates() {
    let home = tempdir().unwrap();
    let db = home.path().join("cache.sqlite");
    init(home.path(), &db);

    itlab()
        .env("ITLAB_SYNC_HOME", home.path())
        .args([
            "--db",
            db.to_str().unwrap(),
            "sync",
            "events",
            "--begin",
            "yesterday",
        ])
        .assert()
        .failure();
}

#[test]
fn test_db_migrate_reports_applied_migrations() {
    let home = tempdir().unwrap();
    let db = home.path().join("fresh.sqlite");

    itlab()
        .env("ITLAB_SYNC_HOME", home.path())
        .args(["--db", db.to_str().unwrap(), "db", "--migrate"])
        .assert()
        .success()
        .stdout(contains("Migration completed"))
        .stdout(contains("(0 applied)").not());

    itlab()
        .env("ITLAB_SYNC_HOME", home.path())
        .args(["--db", db.to_str().unwrap(), "db", "--migrate"])
        .assert()
        .success()
        .stdout(contains("(0 applied)"));
}
