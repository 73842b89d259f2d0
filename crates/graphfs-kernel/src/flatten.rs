//! Flat storage keys for backup and recycle areas.
//!
//! A relative path becomes a single file name: each component has `%`
//! escaped as `%25`, then components are joined with `%2F`. The mapping is
//! reversible, so two different relative paths never share a key, and keys
//! stay readable (`pages%2Fnote.md`).

use std::path::{Component, Path};

const SEPARATOR: &str = "%2F";
const PERCENT: &str = "%25";

/// Flatten a relative path into one file name.
///
/// Only normal components contribute; roots, prefixes and `.` are dropped.
pub fn flatten_key(relative: &Path) -> String {
    relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().replace('%', PERCENT)),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join(SEPARATOR)
}
