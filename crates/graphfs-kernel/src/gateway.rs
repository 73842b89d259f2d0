//! The file gateway: the only entry point external callers use.
//!
//! Every operation resolves its paths through the [`RootScope`] first and only
//! then touches the [`RawFs`]. Writes additionally run the compare/backup
//! protocol:
//!
//! ```text
//! Resolving → Probing → (Comparing → BackingUp)? → Committing → Done
//!     └───────────┴────────────┴───────────┴────────→ Rejected
//! ```
//!
//! The compare step is best-effort. There is no lock between reading the
//! disk content and committing the new content, so a concurrent external
//! edit inside that window is not detected.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::backup::{self, BackupRecord};
use crate::cache::{DocumentCache, MemoryDocumentCache};
use crate::config::{DEFAULT_BACKUP_DIR, DEFAULT_RECYCLE_DIR, GatewayConfig};
use crate::conflict;
use crate::error::{GatewayError, GatewayResult};
use crate::guard::{ResolvedPath, RootScope};
use crate::probe;
use crate::recycle::{self, RecycleRecord};
use crate::vfs::{FileStat, LocalFs, RawFs};
use crate::walk;

/// A write as issued by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteRequest {
    /// Target path, relative to the root or absolute.
    pub path: String,
    /// New content.
    pub content: String,
    /// What the caller believes is on disk right now.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_known_content: Option<String>,
    /// Write without reading or backing up the previous content.
    #[serde(default)]
    pub skip_compare: bool,
    /// Don't update the modification-time record.
    #[serde(default)]
    pub skip_metadata_update: bool,
    /// Repository whose backup area receives backups (defaults to the root).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo_root: Option<String>,
}

impl WriteRequest {
    /// Create a plain write of `content` to `path`.
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
            ..Default::default()
        }
    }

    /// Set the last-known content.
    pub fn with_last_known(mut self, content: impl Into<String>) -> Self {
        self.last_known_content = Some(content.into());
        self
    }

    /// Set the repository root for backups.
    pub fn with_repo_root(mut self, repo_root: impl Into<String>) -> Self {
        self.repo_root = Some(repo_root.into());
        self
    }

    /// Skip the compare/backup step.
    pub fn skip_compare(mut self) -> Self {
        self.skip_compare = true;
        self
    }

    /// Skip the modification-time record update.
    pub fn skip_metadata_update(mut self) -> Self {
        self.skip_metadata_update = true;
        self
    }
}

/// Stages of a write, used for logging where a write stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum WriteStage {
    Resolving,
    Probing,
    Comparing,
    BackingUp,
    Committing,
    Done,
}

/// One entry of [`FileGateway::list_with_content`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileWithContent {
    /// Path relative to the listed directory.
    pub path: String,
    /// Text content.
    pub content: String,
    /// Metadata at read time.
    pub stat: FileStat,
}

/// Root-scoped file operations with conflict backups and soft delete.
pub struct FileGateway {
    scope: RootScope,
    fs: Arc<dyn RawFs>,
    cache: Arc<dyn DocumentCache>,
    backup_dir: PathBuf,
    recycle_dir: PathBuf,
}

impl std::fmt::Debug for FileGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileGateway")
            .field("root", &self.scope.root())
            .field("backup_dir", &self.backup_dir)
            .field("recycle_dir", &self.recycle_dir)
            .finish_non_exhaustive()
    }
}

impl FileGateway {
    /// Create a gateway over the local filesystem with default areas.
    pub fn new(scope: RootScope) -> Self {
        Self {
            scope,
            fs: Arc::new(LocalFs::new()),
            cache: Arc::new(MemoryDocumentCache::new()),
            backup_dir: PathBuf::from(DEFAULT_BACKUP_DIR),
            recycle_dir: PathBuf::from(DEFAULT_RECYCLE_DIR),
        }
    }

    /// Create a gateway from loaded configuration.
    pub fn from_config(config: &GatewayConfig) -> GatewayResult<Self> {
        Ok(Self::new(config.scope()?)
            .with_backup_dir(&config.backup_dir)
            .with_recycle_dir(&config.recycle_dir))
    }

    /// Use a different raw filesystem.
    pub fn with_fs(mut self, fs: Arc<dyn RawFs>) -> Self {
        self.fs = fs;
        self
    }

    /// Use a different last-known content source.
    pub fn with_cache(mut self, cache: Arc<dyn DocumentCache>) -> Self {
        self.cache = cache;
        self
    }

    /// Set the backup area, relative to each repository root.
    pub fn with_backup_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.backup_dir = dir.into();
        self
    }

    /// Set the recycle area, relative to each repository root.
    pub fn with_recycle_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.recycle_dir = dir.into();
        self
    }

    /// The root scope.
    pub fn scope(&self) -> &RootScope {
        &self.scope
    }

    /// The document cache.
    pub fn cache(&self) -> &Arc<dyn DocumentCache> {
        &self.cache
    }

    fn resolve(&self, path: &str) -> GatewayResult<ResolvedPath> {
        self.scope.resolve(path)
    }

    fn resolve_repo(&self, repo_root: Option<&str>) -> GatewayResult<ResolvedPath> {
        self.resolve(repo_root.unwrap_or(""))
    }

    // ========================================================================
    // Directories
    // ========================================================================

    /// Create a directory. An existing entry is not an error.
    pub async fn mkdir(&self, path: &str) -> GatewayResult<()> {
        let target = self.resolve(path)?;
        match self.fs.create_dir(target.as_path()).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Ok(()),
            Err(e) => Err(GatewayError::io("mkdir", target.as_path(), e)),
        }
    }

    /// Create a directory and any missing parents.
    pub async fn mkdir_recursive(&self, path: &str) -> GatewayResult<()> {
        let target = self.resolve(path)?;
        self.fs
            .create_dir_all(target.as_path())
            .await
            .map_err(|e| GatewayError::io("mkdir", target.as_path(), e))
    }

    /// Recursively list files below `dir` (hidden entries and symlinks excluded).
    pub async fn list(&self, dir: &str) -> GatewayResult<Vec<String>> {
        let target = self.resolve(dir)?;
        walk::list_files(&*self.fs, target.as_path())
            .await
            .map_err(|e| match e.kind() {
                io::ErrorKind::NotFound => GatewayError::not_found(target.as_path()),
                _ => GatewayError::io("list", target.as_path(), e),
            })
    }

    /// Like [`list`](Self::list), with each file's content and metadata.
    ///
    /// Files that are not UTF-8 or disappear while listing are skipped.
    pub async fn list_with_content(&self, dir: &str) -> GatewayResult<Vec<FileWithContent>> {
        let target = self.resolve(dir)?;
        let paths = self.list(dir).await?;
        let mut files = Vec::with_capacity(paths.len());

        for path in paths {
            let full = target.as_path().join(&path);
            let bytes = match self.fs.read(&full).await {
                Ok(bytes) => bytes,
                Err(e) => {
                    tracing::warn!(path = %full.display(), "skipping unreadable file: {e}");
                    continue;
                }
            };
            let Some(content) = conflict::decode_text(bytes) else {
                tracing::warn!(path = %full.display(), "skipping non-UTF-8 file");
                continue;
            };
            let stat = match self.fs.stat(&full).await {
                Ok(stat) => stat,
                Err(e) => {
                    tracing::warn!(path = %full.display(), "skipping file without metadata: {e}");
                    continue;
                }
            };
            files.push(FileWithContent {
                path,
                content,
                stat,
            });
        }

        Ok(files)
    }

    /// Directory watching is not available on this backend.
    pub async fn watch_dir(&self, dir: &str) -> GatewayResult<()> {
        self.resolve(dir)?;
        Err(GatewayError::unsupported("watch_dir"))
    }

    /// Directory watching is not available on this backend.
    pub async fn unwatch_dir(&self, dir: &str) -> GatewayResult<()> {
        self.resolve(dir)?;
        Err(GatewayError::unsupported("unwatch_dir"))
    }

    // ========================================================================
    // Files
    // ========================================================================

    /// Get metadata, or `None` if nothing exists at `path`.
    pub async fn stat(&self, path: &str) -> GatewayResult<Option<FileStat>> {
        let target = self.resolve(path)?;
        probe::stat(&*self.fs, target.as_path()).await
    }

    /// Read a text file and remember its content as last known.
    pub async fn read_file(&self, path: &str) -> GatewayResult<String> {
        let target = self.resolve(path)?;
        let bytes = self
            .fs
            .read(target.as_path())
            .await
            .map_err(|e| GatewayError::read_failed(target.as_path(), e))?;
        let text = String::from_utf8(bytes).map_err(|e| {
            GatewayError::read_failed(
                target.as_path(),
                io::Error::new(io::ErrorKind::InvalidData, e),
            )
        })?;

        self.cache.remember(target.as_path(), &text);
        Ok(text)
    }

    /// Write a file, backing up the disk content first if it diverged from
    /// what the caller last saw.
    pub async fn write_file(&self, request: WriteRequest) -> GatewayResult<FileStat> {
        let mut stage = WriteStage::Resolving;
        let result = self.run_write(&request, &mut stage).await;
        match &result {
            Ok(stat) => tracing::debug!(
                path = %request.path,
                stage = %WriteStage::Done,
                size = stat.size,
                "write committed"
            ),
            Err(e) => tracing::debug!(path = %request.path, %stage, "write rejected: {e}"),
        }
        result
    }

    async fn run_write(
        &self,
        request: &WriteRequest,
        stage: &mut WriteStage,
    ) -> GatewayResult<FileStat> {
        let target = self.resolve(&request.path)?;
        let repo = self.resolve_repo(request.repo_root.as_deref())?;
        let path = target.as_path();

        *stage = WriteStage::Probing;
        let existing = probe::stat(&*self.fs, path).await?;
        if existing.is_none() {
            if let Some(parent) = path.parent() {
                self.fs
                    .create_dir_all(parent)
                    .await
                    .map_err(|e| GatewayError::write_failed(parent, e))?;
            }
        }

        let existed_as_file = existing.as_ref().is_some_and(FileStat::is_file);
        if request.skip_compare {
            tracing::trace!(path = %path.display(), "compare skipped");
        } else if existed_as_file {
            *stage = WriteStage::Comparing;
            let disk = match self.fs.read(path).await {
                Ok(bytes) => conflict::decode_text(bytes),
                Err(e) => {
                    tracing::warn!(path = %path.display(), "could not read current content, comparing as empty: {e}");
                    Some(String::new())
                }
            };
            let known = request
                .last_known_content
                .clone()
                .or_else(|| self.cache.last_known(path))
                .unwrap_or_default();

            if conflict::has_diverged(disk.as_deref(), Some(&known)) {
                if let Some(disk) = disk.filter(|d| !d.is_empty()) {
                    *stage = WriteStage::BackingUp;
                    let area = repo.as_path().join(&self.backup_dir);
                    let relative = target.relative_to(&repo);
                    if let Err(e) = backup::write_backup(&*self.fs, &area, &relative, &disk).await
                    {
                        tracing::warn!(path = %path.display(), "backup failed, continuing write: {e}");
                    }
                }
            }
        }

        *stage = WriteStage::Committing;
        self.fs
            .write(path, request.content.as_bytes())
            .await
            .map_err(|e| GatewayError::write_failed(path, e))?;
        let stat = self
            .fs
            .stat(path)
            .await
            .map_err(|e| GatewayError::probe_failed(path, e))?;

        self.cache.remember(path, &request.content);
        if !request.skip_metadata_update {
            self.cache.record_modified(path, stat.modified_at);
        }
        Ok(stat)
    }

    /// Move a file into the recycle area of `repo_root`. Directories are refused.
    ///
    /// A symlink is recycled as the link itself.
    pub async fn unlink_file(&self, repo_root: &str, path: &str) -> GatewayResult<RecycleRecord> {
        let repo = self.resolve(repo_root)?;
        let target = self.scope.resolve_entry(path)?;
        if target.is_root() {
            return Err(GatewayError::dangerous(target.as_path()));
        }

        let area = repo.as_path().join(&self.recycle_dir);
        let record = recycle::recycle(
            &*self.fs,
            &area,
            target.as_path(),
            &target.relative_to(&repo),
        )
        .await?;

        self.cache.forget(target.as_path());
        Ok(record)
    }

    /// Rename, creating the destination's parent directories as needed.
    ///
    /// Symlinks are moved as links. The source's cached state moves with it.
    pub async fn rename(&self, old_path: &str, new_path: &str) -> GatewayResult<()> {
        let from = self.scope.resolve_entry(old_path)?;
        let to = self.scope.resolve_entry(new_path)?;
        if from.is_root() {
            return Err(GatewayError::dangerous(from.as_path()));
        }

        self.ensure_parent(&to).await?;
        self.fs
            .rename(from.as_path(), to.as_path())
            .await
            .map_err(|e| GatewayError::io("rename", from.as_path(), e))?;

        let carried = self.cache.last_known(from.as_path());
        self.cache.forget(from.as_path());
        self.cache.forget(to.as_path());
        if let Some(content) = carried {
            self.cache.remember(to.as_path(), &content);
        }
        Ok(())
    }

    /// Copy, replacing any existing destination without confirmation.
    pub async fn copy_file(&self, old_path: &str, new_path: &str) -> GatewayResult<()> {
        let from = self.resolve(old_path)?;
        let to = self.resolve(new_path)?;
        self.ensure_parent(&to).await?;
        self.fs
            .copy(from.as_path(), to.as_path())
            .await
            .map_err(|e| GatewayError::io("copy", from.as_path(), e))
    }

    /// Back up `disk_content` for `path` if it diverges from `new_content`.
    ///
    /// Best-effort: only an out-of-scope path is reported as an error; a
    /// failed backup is logged and yields `Ok(None)`.
    pub async fn backup_db_file(
        &self,
        repo_root: &str,
        path: &str,
        disk_content: &str,
        new_content: &str,
    ) -> GatewayResult<Option<BackupRecord>> {
        let repo = self.resolve(repo_root)?;
        let target = self.resolve(path)?;

        if disk_content.is_empty()
            || !conflict::has_diverged(Some(disk_content), Some(new_content))
        {
            return Ok(None);
        }

        let area = repo.as_path().join(&self.backup_dir);
        match backup::write_backup(&*self.fs, &area, &target.relative_to(&repo), disk_content)
            .await
        {
            Ok(record) => Ok(Some(record)),
            Err(e) => {
                tracing::warn!(path = %target.as_path().display(), "{e}");
                Ok(None)
            }
        }
    }

    async fn ensure_parent(&self, target: &ResolvedPath) -> GatewayResult<()> {
        if let Some(parent) = target.as_path().parent() {
            self.fs
                .create_dir_all(parent)
                .await
                .map_err(|e| GatewayError::io("create parent", parent, e))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    use crate::vfs::DirEntry;

    /// Counts calls and can be told to fail reads.
    #[derive(Default)]
    struct RecordingFs {
        calls: AtomicUsize,
        reads: AtomicUsize,
        fail_reads: bool,
    }

    impl RecordingFs {
        fn failing_reads() -> Self {
            Self {
                fail_reads: true,
                ..Default::default()
            }
        }

        fn touch(&self) {
            self.calls.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl RawFs for RecordingFs {
        async fn stat(&self, path: &Path) -> io::Result<FileStat> {
            self.touch();
            LocalFs.stat(path).await
        }
        async fn stat_entry(&self, path: &Path) -> io::Result<FileStat> {
            self.touch();
            LocalFs.stat_entry(path).await
        }
        async fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
            self.touch();
            self.reads.fetch_add(1, Ordering::SeqCst);
            if self.fail_reads {
                return Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"));
            }
            LocalFs.read(path).await
        }
        async fn read_dir(&self, path: &Path) -> io::Result<Vec<DirEntry>> {
            self.touch();
            LocalFs.read_dir(path).await
        }
        async fn write(&self, path: &Path, data: &[u8]) -> io::Result<()> {
            self.touch();
            LocalFs.write(path, data).await
        }
        async fn create_dir(&self, path: &Path) -> io::Result<()> {
            self.touch();
            LocalFs.create_dir(path).await
        }
        async fn create_dir_all(&self, path: &Path) -> io::Result<()> {
            self.touch();
            LocalFs.create_dir_all(path).await
        }
        async fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
            self.touch();
            LocalFs.rename(from, to).await
        }
        async fn copy(&self, from: &Path, to: &Path) -> io::Result<()> {
            self.touch();
            LocalFs.copy(from, to).await
        }
        async fn remove_file(&self, path: &Path) -> io::Result<()> {
            self.touch();
            LocalFs.remove_file(path).await
        }
    }

    fn setup_with(fs: Arc<RecordingFs>) -> (FileGateway, TempDir) {
        let dir = TempDir::new().unwrap();
        let gateway = FileGateway::new(RootScope::new(dir.path()).unwrap()).with_fs(fs);
        (gateway, dir)
    }

    fn backup_path(dir: &TempDir, key: &str) -> PathBuf {
        dir.path().join(DEFAULT_BACKUP_DIR).join(key)
    }

    #[tokio::test]
    async fn test_out_of_scope_does_no_io() {
        let fs = Arc::new(RecordingFs::default());
        let (gateway, _dir) = setup_with(fs.clone());
        let evil = "../../etc/passwd";

        assert!(matches!(gateway.read_file(evil).await, Err(GatewayError::OutOfScope { .. })));
        assert!(gateway.write_file(WriteRequest::new(evil, "x")).await.is_err());
        assert!(gateway.stat(evil).await.is_err());
        assert!(gateway.mkdir(evil).await.is_err());
        assert!(gateway.mkdir_recursive(evil).await.is_err());
        assert!(gateway.list(evil).await.is_err());
        assert!(gateway.list_with_content(evil).await.is_err());
        assert!(gateway.unlink_file("", evil).await.is_err());
        assert!(gateway.rename("a.md", evil).await.is_err());
        assert!(gateway.copy_file(evil, "a.md").await.is_err());
        assert!(gateway.backup_db_file("", evil, "a", "b").await.is_err());
        assert!(gateway.watch_dir(evil).await.is_err());

        assert_eq!(fs.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_skip_compare_never_reads() {
        let fs = Arc::new(RecordingFs::default());
        let (gateway, dir) = setup_with(fs.clone());
        std::fs::write(dir.path().join("a.md"), "A\n").unwrap();

        let request = WriteRequest::new("a.md", "C").with_last_known("B").skip_compare();
        gateway.write_file(request).await.unwrap();

        assert_eq!(fs.reads.load(Ordering::SeqCst), 0);
        assert!(!dir.path().join(DEFAULT_BACKUP_DIR).exists());
        assert_eq!(std::fs::read_to_string(dir.path().join("a.md")).unwrap(), "C");
    }

    #[tokio::test]
    async fn test_read_failure_during_compare_still_writes() {
        let fs = Arc::new(RecordingFs::failing_reads());
        let (gateway, dir) = setup_with(fs.clone());
        std::fs::write(dir.path().join("a.md"), "A").unwrap();

        let stat = gateway
            .write_file(WriteRequest::new("a.md", "C").with_last_known("B"))
            .await
            .unwrap();

        assert_eq!(stat.size, 1);
        assert_eq!(fs.reads.load(Ordering::SeqCst), 1);
        // Empty disk content has nothing worth preserving.
        assert!(!dir.path().join(DEFAULT_BACKUP_DIR).exists());
        assert_eq!(std::fs::read_to_string(dir.path().join("a.md")).unwrap(), "C");
    }

    #[tokio::test]
    async fn test_last_known_falls_back_to_cache() {
        let (gateway, dir) = setup_with(Arc::new(RecordingFs::default()));
        std::fs::write(dir.path().join("a.md"), "first draft").unwrap();

        // Reading primes the cache with what is on disk.
        gateway.read_file("a.md").await.unwrap();
        std::fs::write(dir.path().join("a.md"), "edited elsewhere").unwrap();

        gateway.write_file(WriteRequest::new("a.md", "mine")).await.unwrap();

        assert_eq!(
            std::fs::read_to_string(backup_path(&dir, "a.md")).unwrap(),
            "edited elsewhere"
        );
    }

    #[tokio::test]
    async fn test_cache_in_sync_means_no_backup() {
        let (gateway, dir) = setup_with(Arc::new(RecordingFs::default()));

        gateway.write_file(WriteRequest::new("a.md", "v1")).await.unwrap();
        gateway.write_file(WriteRequest::new("a.md", "v2")).await.unwrap();

        assert!(!dir.path().join(DEFAULT_BACKUP_DIR).exists());
        assert_eq!(std::fs::read_to_string(dir.path().join("a.md")).unwrap(), "v2");
    }

    #[tokio::test]
    async fn test_metadata_record() {
        let (gateway, dir) = setup_with(Arc::new(RecordingFs::default()));
        let a = gateway.scope().root().join("a.md");
        let b = gateway.scope().root().join("b.md");

        let stat = gateway.write_file(WriteRequest::new("a.md", "x")).await.unwrap();
        assert_eq!(gateway.cache().modified_at(&a), Some(stat.modified_at));

        gateway
            .write_file(WriteRequest::new("b.md", "y").skip_metadata_update())
            .await
            .unwrap();
        assert!(gateway.cache().modified_at(&b).is_none());
        assert_eq!(gateway.cache().last_known(&b).as_deref(), Some("y"));
        drop(dir);
    }

    #[tokio::test]
    async fn test_backup_goes_to_repo_root() {
        let (gateway, dir) = setup_with(Arc::new(RecordingFs::default()));
        let page = dir.path().join("graphs/alice/pages/a.md");
        std::fs::create_dir_all(page.parent().unwrap()).unwrap();
        std::fs::write(&page, "disk").unwrap();

        gateway
            .write_file(
                WriteRequest::new("graphs/alice/pages/a.md", "new")
                    .with_last_known("stale")
                    .with_repo_root("graphs/alice"),
            )
            .await
            .unwrap();

        let backup = dir
            .path()
            .join("graphs/alice")
            .join(DEFAULT_BACKUP_DIR)
            .join("pages%2Fa.md");
        assert_eq!(std::fs::read_to_string(backup).unwrap(), "disk");
    }

    #[tokio::test]
    async fn test_backup_failure_does_not_block_write() {
        let (gateway, dir) = setup_with(Arc::new(RecordingFs::default()));
        // A file where the backup area's parent directory should be.
        std::fs::write(dir.path().join(".graphfs"), "in the way").unwrap();
        std::fs::write(dir.path().join("a.md"), "A").unwrap();

        gateway
            .write_file(WriteRequest::new("a.md", "C").with_last_known("B"))
            .await
            .unwrap();
        assert_eq!(std::fs::read_to_string(dir.path().join("a.md")).unwrap(), "C");
    }

    #[tokio::test]
    async fn test_write_to_directory_fails() {
        let (gateway, dir) = setup_with(Arc::new(RecordingFs::default()));
        std::fs::create_dir(dir.path().join("pages")).unwrap();

        let err = gateway
            .write_file(WriteRequest::new("pages", "x"))
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::WriteFailed { .. }));
    }

    #[tokio::test]
    async fn test_root_cannot_be_unlinked_or_renamed() {
        let fs = Arc::new(RecordingFs::default());
        let (gateway, _dir) = setup_with(fs.clone());

        assert!(matches!(
            gateway.unlink_file("", "").await,
            Err(GatewayError::DangerousOperation(_))
        ));
        assert!(matches!(
            gateway.rename(".", "moved").await,
            Err(GatewayError::DangerousOperation(_))
        ));
        assert_eq!(fs.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_rename_carries_cached_content() {
        let (gateway, dir) = setup_with(Arc::new(RecordingFs::default()));
        let root = gateway.scope().root().to_path_buf();

        gateway.write_file(WriteRequest::new("a.md", "mine")).await.unwrap();
        std::fs::write(dir.path().join("b.md"), "old b").unwrap();
        gateway.read_file("b.md").await.unwrap();

        gateway.rename("a.md", "b.md").await.unwrap();

        assert!(gateway.cache().last_known(&root.join("a.md")).is_none());
        assert_eq!(
            gateway.cache().last_known(&root.join("b.md")).as_deref(),
            Some("mine")
        );
    }

    #[tokio::test]
    async fn test_watch_is_unsupported() {
        let (gateway, _dir) = setup_with(Arc::new(RecordingFs::default()));
        assert!(matches!(
            gateway.watch_dir("").await,
            Err(GatewayError::Unsupported(_))
        ));
        assert!(matches!(
            gateway.unwatch_dir("pages").await,
            Err(GatewayError::Unsupported(_))
        ));
    }
}
