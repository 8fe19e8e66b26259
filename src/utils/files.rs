//! File references inside report and event texts.
//!
//! Files are stored as opaque ids; the server serves them from
//! `{base-url}/download/{fileId}`.

use regex::Regex;
use std::sync::LazyLock;

static DOWNLOAD_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/download/([A-Za-z0-9_-]+)").expect("download link pattern is valid")
});

pub fn download_url(base_url: &str, file_id: &str) -> String {
    format!("{}/download/{}", base_url.trim_end_matches('/'), file_id)
}

/// Ids of every file linked from a markdown text, in order of appearance,
/// without duplicates.
pub fn extract_file_ids(markdown: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for cap in DOWNLOAD_LINK.captures_iter(markdown) {
        let id = cap[1].to_string();
        if !out.contains(&id) {
            out.push(id);
        }
    }
    out
}
