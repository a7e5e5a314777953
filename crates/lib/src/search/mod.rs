//! Restaurant search provider (Hot Pepper Gourmet API).

mod hotpepper;

pub use hotpepper::{format_coordinate, HotPepperClient, SearchError, SearchQuery, Shop, ADDRESS_MAX_CHARS};

/// First `max` Unicode code points of `s`.
pub fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}
