//! Divergence check between disk content and the caller's last-known content.
//!
//! Advisory only. The answer decides whether a backup is taken, never
//! whether the write proceeds.

/// Decode raw disk bytes into comparable text.
///
/// Binary content cannot be compared and yields `None`.
pub fn decode_text(bytes: Vec<u8>) -> Option<String> {
    String::from_utf8(bytes).ok()
}

/// True if `disk` and `last_known` differ beyond leading/trailing whitespace.
///
/// When either side is missing the answer is unknown, which counts as not
/// diverged: no backup is taken for binary or absent content.
pub fn has_diverged(disk: Option<&str>, last_known: Option<&str>) -> bool {
    match (disk, last_known) {
        (Some(disk), Some(known)) => disk.trim() != known.trim(),
        _ => false,
    }
}
