//! Raw filesystem value types.
//!
//! These are transient values: produced per call by a [`RawFs`](super::RawFs)
//! backend and never persisted by the gateway.

use serde::{Deserialize, Serialize};
use std::time::SystemTime;

/// Kind of a filesystem entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// Regular file.
    File,
    /// Directory.
    Dir,
    /// Symbolic link (only reported when links are not followed).
    Symlink,
}

impl EntryKind {
    /// Returns true if this is a regular file.
    pub fn is_file(&self) -> bool {
        matches!(self, EntryKind::File)
    }

    /// Returns true if this is a directory.
    pub fn is_dir(&self) -> bool {
        matches!(self, EntryKind::Dir)
    }

    /// Returns true if this is a symbolic link.
    pub fn is_symlink(&self) -> bool {
        matches!(self, EntryKind::Symlink)
    }
}

/// File metadata as returned by `stat`.
///
/// Timestamps travel as milliseconds since the Unix epoch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileStat {
    /// File, directory, or (only from `stat_entry`) symlink.
    pub kind: EntryKind,
    /// Size in bytes (0 for directories on most platforms).
    pub size: u64,
    /// Last modification time.
    #[serde(with = "epoch_millis")]
    pub modified_at: SystemTime,
    /// Creation time, or the modification time where the platform has no birth time.
    #[serde(with = "epoch_millis")]
    pub created_at: SystemTime,
}

impl FileStat {
    /// Returns true if this is a regular file.
    pub fn is_file(&self) -> bool {
        self.kind.is_file()
    }

    /// Returns true if this is a directory.
    pub fn is_dir(&self) -> bool {
        self.kind.is_dir()
    }

    /// Build a stat from std metadata (follows symlinks if `meta` did).
    pub fn from_metadata(meta: &std::fs::Metadata) -> Self {
        let file_type = meta.file_type();
        let kind = if file_type.is_symlink() {
            EntryKind::Symlink
        } else if file_type.is_dir() {
            EntryKind::Dir
        } else {
            EntryKind::File
        };
        let modified_at = meta.modified().unwrap_or(SystemTime::UNIX_EPOCH);

        Self {
            kind,
            size: meta.len(),
            modified_at,
            created_at: meta.created().unwrap_or(modified_at),
        }
    }
}

/// Directory entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirEntry {
    /// Entry name (not full path).
    pub name: String,
    /// Entry type, without following symlinks.
    pub kind: EntryKind,
}

impl DirEntry {
    /// Create a new directory entry.
    pub fn new(name: impl Into<String>, kind: EntryKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    /// Hidden entries start with a dot.
    pub fn is_hidden(&self) -> bool {
        self.name.starts_with('.')
    }
}

mod epoch_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::{Duration, SystemTime, UNIX_EPOCH};

    pub fn serialize<S: Serializer>(time: &SystemTime, s: S) -> Result<S::Ok, S::Error> {
        let millis = time
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        s.serialize_u64(millis)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<SystemTime, D::Error> {
        let millis = u64::deserialize(d)?;
        Ok(UNIX_EPOCH + Duration::from_millis(millis))
    }
}
