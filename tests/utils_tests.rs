use itlab_sync::config::Config;
use itlab_sync::errors::AppError;
use itlab_sync::utils::date::{parse_bound, parse_optional_bound, short};
use itlab_sync::utils::files::{download_url, extract_file_ids};
use itlab_sync::utils::table::{MAX_CELL_WIDTH, Table};
use tempfile::tempdir;

#[test]
fn test_download_url_ignores_trailing_slash() {
    assert_eq!(
        download_url("https://manage.rtuitlab.dev/", "abc_1"),
        "https://manage.rtuitlab.dev/download/abc_1"
    );
    assert_eq!(
        download_url("https://manage.rtuitlab.dev", "abc_1"),
        "https://manage.rtuitlab.dev/download/abc_1"
    );
}

#[test]
fn test_extract_file_ids_keeps_order_without_duplicates() {
    let md = "see ![a](https://x/download/f2) and [b](/download/f1)\n\
              again ![a](https://x/download/f2) and /download/f-3";
    assert_eq!(extract_file_ids(md), vec!["f2", "f1", "f-3"]);
    assert!(extract_file_ids("no links here").is_empty());
}

#[test]
fn test_parse_bound_accepts_bare_dates() {
    assert_eq!(parse_bound("2024-03-01").unwrap(), "2024-03-01T00:00:00.000Z");
    assert_eq!(parse_bound("  2024-03-01 ").unwrap(), "2024-03-01T00:00:00.000Z");
}

#[test]
fn test_parse_bound_normalizes_offsets_to_utc() {
    assert_eq!(
        parse_bound("2024-03-01T10:30:00+03:00").unwrap(),
        "2024-03-01T07:30:00.000Z"
    );
}

#[test]
fn test_parse_bound_rejects_garbage() {
    let err = parse_bound("01/03/2024").unwrap_err();
    assert!(matches!(err, AppError::InvalidDate(s) if s == "01/03/2024"));

    assert_eq!(parse_optional_bound(None).unwrap(), None);
    assert!(parse_optional_bound(Some("tomorrow")).is_err());
}

#[test]
fn test_short_dates() {
    assert_eq!(short("2024-03-01T07:30:00.000Z"), "2024-03-01 07:30");
    assert_eq!(short("not a date"), "not a date");
}

#[test]
fn test_table_render_aligns_columns() {
    let mut t = Table::new(&["ID", "NAME"]);
    assert!(t.is_empty());
    t.add_row(vec!["1".into(), "Ivan".into()]);
    t.add_row(vec!["22".into()]);

    let out = t.render();
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines[0], "ID NAME ");
    assert_eq!(lines[1], "-- ---- ");
    assert_eq!(lines[2], "1  Ivan ");
    assert_eq!(lines[3], "22      ");
}

#[test]
fn test_table_flattens_and_truncates_cells() {
    let mut t = Table::new(&["TEXT"]);
    t.add_row(vec!["line one\nline two".into()]);
    t.add_row(vec!["x".repeat(MAX_CELL_WIDTH + 10)]);

    assert_eq!(t.rows[0][0], "line one line two");
    assert_eq!(t.rows[1][0].chars().count(), MAX_CELL_WIDTH);
    assert!(t.rows[1][0].ends_with('…'));
    assert_eq!(t.columns[0].width, MAX_CELL_WIDTH);
}

#[test]
fn test_config_defaults_when_file_missing() {
    let dir = tempdir().unwrap();
    let cfg = Config::load_from(&dir.path().join("missing.conf")).unwrap();
    assert_eq!(cfg.page_size, 10);
    assert_eq!(cfg.max_concurrent_requests, 4);
    assert!(cfg.access_token.is_none());
}

#[test]
fn test_config_partial_file_and_roundtrip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("itlab-sync.conf");
    std::fs::write(&path, "base_url: http://localhost:5000\npage_size: 25\n").unwrap();

    let mut cfg = Config::load_from(&path).unwrap();
    assert_eq!(cfg.base_url, "http://localhost:5000");
    assert_eq!(cfg.page_size, 25);
    assert_eq!(cfg.worker_threads, 2);

    cfg.access_token = Some("token".into());
    cfg.user_id = Some("u1".into());
    cfg.save_to(&path).unwrap();
    assert_eq!(Config::load_from(&path).unwrap(), cfg);
}

#[test]
fn test_config_problems() {
    let ok = Config {
        access_token: Some("t".into()),
        ..Config::default()
    };
    assert!(ok.problems().is_empty());

    let bad = Config {
        base_url: "manage.rtuitlab.dev".into(),
        page_size: 0,
        ..Config::default()
    };
    let problems = bad.problems();
    assert!(problems.iter().any(|p| p.contains("base_url")));
    assert!(problems.iter().any(|p| p.contains("page_size")));
    assert!(problems.iter().any(|p| p.contains("access_token")));
}

#[test]
fn test_invalid_yaml_is_a_config_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("broken.conf");
    std::fs::write(&path, "page_size: [not, a, number]\n").unwrap();
    assert!(matches!(Config::load_from(&path), Err(AppError::Config(_))));
}
