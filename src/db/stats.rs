use crate::db::migrate::{applied_versions, latest_version};
use crate::errors::AppResult;
use crate::store::CacheStore;
use crate::store::entity::Table;
use crate::ui::messages::header;
use crate::utils::colors::{CYAN, GREEN, GREY, RESET, YELLOW};
use std::fs;

pub fn print_db_info(store: &CacheStore) -> AppResult<()> {
    println!();
    header("Cache database");

    //
    // 1) FILE SIZE
    //
    let db_path = store.path();
    let file_size = fs::metadata(db_path).map(|m| m.len()).unwrap_or(0);
    let file_mb = (file_size as f64) / (1024.0 * 1024.0);

    println!("{}• File:{} {}{}{}", CYAN, RESET, YELLOW, db_path, RESET);
    println!("{}• Size:{} {:.2} MB", CYAN, RESET, file_mb);

    //
    // 2) SCHEMA
    //
    let applied = store.query(applied_versions)?;
    let current = applied.last().map(String::as_str).unwrap_or("none");
    println!(
        "{}• Schema:{} {} (latest {}, {} applied)",
        CYAN,
        RESET,
        current,
        latest_version(),
        applied.len()
    );

    //
    // 3) ROWS PER TABLE
    //
    println!("{}• Cached rows:{}", CYAN, RESET);
    let width = Table::ALL.iter().map(|t| t.name().len()).max().unwrap_or(10);
    for table in Table::ALL {
        let count = store.count(*table)?;
        let color = if count > 0 { GREEN } else { GREY };
        println!(
            "    {:<width$} {}{}{}",
            table.name(),
            color,
            count,
            RESET,
            width = width
        );
    }

    println!();
    Ok(())
}
