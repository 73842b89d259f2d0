//! Backup area for superseded file content.
//!
//! When a write detects that the file on disk changed behind the caller's
//! back, the old disk content is copied here before being overwritten. The
//! area is flat: one file per flattened relative path, last write wins.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{GatewayError, GatewayResult};
use crate::flatten::flatten_key;
use crate::vfs::RawFs;

/// A saved copy of superseded content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackupRecord {
    /// Where the copy was written.
    pub path: PathBuf,
    /// Flattened key (the file name inside the backup area).
    pub key: String,
}

/// Write `content` verbatim into `backup_root` under the flattened key of `relative`.
///
/// The backup directory is created on demand; creation is idempotent so
/// concurrent writers can race on it.
pub async fn write_backup(
    fs: &dyn RawFs,
    backup_root: &Path,
    relative: &Path,
    content: &str,
) -> GatewayResult<BackupRecord> {
    fs.create_dir_all(backup_root)
        .await
        .map_err(|e| GatewayError::backup_failed(backup_root, e))?;

    let key = flatten_key(relative);
    let path = backup_root.join(&key);

    fs.write(&path, content.as_bytes())
        .await
        .map_err(|e| GatewayError::backup_failed(&path, e))?;

    tracing::info!(
        source = %relative.display(),
        backup = %path.display(),
        bytes = content.len(),
        "saved backup of diverged content"
    );

    Ok(BackupRecord { path, key })
}
