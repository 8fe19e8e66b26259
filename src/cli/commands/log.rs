use crate::cli::parser::Commands;
use crate::config::Config;
use crate::db::log::{LogEntry, load_log};
use crate::errors::AppResult;
use crate::store::CacheStore;
use ansi_term::Colour;
use regex::Regex;
use std::sync::LazyLock;

const OP_WIDTH: usize = 60;

static ANSI: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\x1B\[[0-9;]*[mK]").expect("ansi pattern is valid"));

fn strip_ansi(s: &str) -> String {
    ANSI.replace_all(s, "").into_owned()
}

/// Colour of an operation name in the log listing
fn color_for_operation(op: &str) -> Colour {
    match op {
        "migration_applied" => Colour::Purple,
        "init" => Colour::RGB(255, 153, 51),
        other if other.starts_with("sync_") => Colour::Green,
        other if other.starts_with("delete_") || other.starts_with("reject_") => Colour::Red,
        other if other.starts_with("create_")
            || other.starts_with("edit_")
            || other.starts_with("resolve_") =>
        {
            Colour::Yellow
        }
        _ => Colour::White,
    }
}

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if matches!(cmd, Commands::Log { print: true }) {
        let store = CacheStore::open(&cfg.database)?;
        let entries = store.query(|conn| load_log(conn, None))?;
        print_log(&entries);
    }

    Ok(())
}

fn print_log(entries: &[LogEntry]) {
    if entries.is_empty() {
        println!("📜 Internal log is empty.");
        return;
    }

    let id_w = entries
        .iter()
        .map(|e| e.id.to_string().len())
        .max()
        .unwrap_or(1);
    let date_w = entries.iter().map(|e| e.date.len()).max().unwrap_or(10);

    println!("📜 Internal log:\n");

    for e in entries {
        let color = color_for_operation(&e.operation);

        let visible = if e.target.is_empty() {
            e.operation.clone()
        } else {
            format!("{} ({})", e.operation, e.target)
        };
        let visible = if visible.chars().count() > OP_WIDTH {
            let mut s: String = visible.chars().take(OP_WIDTH - 3).collect();
            s.push_str("...");
            s
        } else {
            visible
        };

        // Only the operation word is coloured.
        let colored = match visible.split_once(' ') {
            Some((op, rest)) => format!("{} {}", color.paint(op), rest),
            None => color.paint(visible.as_str()).to_string(),
        };
        let padding = " ".repeat(OP_WIDTH.saturating_sub(strip_ansi(&colored).chars().count()));

        let message = if e.message.starts_with("failed") {
            Colour::Red.paint(e.message.as_str()).to_string()
        } else {
            e.message.clone()
        };

        println!(
            "{:>id_w$}: {:<date_w$} | {}{} => {}",
            e.id,
            e.date,
            colored,
            padding,
            message,
            id_w = id_w,
            date_w = date_w
        );
    }
}
