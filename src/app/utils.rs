// src/app/utils.rs
use itertools::Itertools;

use crate::app::types::{MovieDetail, NOT_AVAILABLE};

fn present(s: &str) -> Option<&str> {
    let s = s.trim();
    (!s.is_empty() && s != NOT_AVAILABLE).then_some(s)
}

/// "Title (Year)", or just the title when the year is missing.
pub(crate) fn title_line(title: &str, year: &str) -> String {
    match present(year) {
        Some(y) => format!("{title} ({y})"),
        None => title.to_string(),
    }
}

/// Year • Rated • Runtime, skipping whatever the service left out.
pub(crate) fn detail_meta_line(d: &MovieDetail) -> String {
    [d.year.as_str(), d.rated.as_str(), d.runtime.as_str()]
        .into_iter()
        .filter_map(present)
        .join("  •  ")
}

/// Field value for display; "-" when the service had nothing.
pub(crate) fn or_dash(s: &str) -> &str {
    present(s).unwrap_or("-")
}
