//! Soft delete into a flat recycle area.
//!
//! Unlink never erases data: the file is moved under the recycle root with
//! its flattened relative path as the name. Deleting the same path again
//! replaces the previous entry. Directories are refused outright. A symlink
//! is recycled as a link; its target is left alone.

use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{GatewayError, GatewayResult};
use crate::flatten::flatten_key;
use crate::probe;
use crate::vfs::RawFs;

/// A file moved into the recycle area.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecycleRecord {
    /// New location of the file.
    pub path: PathBuf,
    /// Flattened key (the file name inside the recycle area).
    pub key: String,
}

/// Move the file at `absolute` into `recycle_root`.
///
/// `relative` is the path used for the flattened key.
pub async fn recycle(
    fs: &dyn RawFs,
    recycle_root: &Path,
    absolute: &Path,
    relative: &Path,
) -> GatewayResult<RecycleRecord> {
    match probe::stat_entry(fs, absolute).await? {
        None => return Err(GatewayError::not_found(absolute)),
        Some(stat) if stat.is_dir() => {
            tracing::warn!(path = %absolute.display(), "refusing to delete directory");
            return Err(GatewayError::dangerous(absolute));
        }
        Some(_) => {}
    }

    fs.create_dir_all(recycle_root)
        .await
        .map_err(|e| GatewayError::io("create recycle area", recycle_root, e))?;

    let key = flatten_key(relative);
    let path = recycle_root.join(&key);

    match fs.rename(absolute, &path).await {
        Ok(()) => {}
        // rename() replaces on unix; elsewhere clear the old entry and retry once.
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
            fs.remove_file(&path)
                .await
                .map_err(|e| GatewayError::io("replace recycled file", &path, e))?;
            fs.rename(absolute, &path)
                .await
                .map_err(|e| GatewayError::io("recycle", absolute, e))?;
        }
        Err(e) => return Err(GatewayError::io("recycle", absolute, e)),
    }

    tracing::info!(
        from = %absolute.display(),
        to = %path.display(),
        "moved file to recycle area"
    );

    Ok(RecycleRecord { path, key })
}
