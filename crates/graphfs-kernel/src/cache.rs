//! Caller-side document cache.
//!
//! The write path needs to know what the caller last saw on disk. Requests
//! may carry it explicitly; when they don't, the gateway asks a
//! [`DocumentCache`]. The cache also holds the modification-time record that
//! successful writes update.
//!
//! [`MemoryDocumentCache`] is bounded and evicts the least recently used
//! document. Embedders that already track document state can plug in their
//! own implementation with [`FileGateway::with_cache`](crate::FileGateway::with_cache).

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{Instant, SystemTime};

use parking_lot::RwLock;

/// Default maximum cached documents.
pub const DEFAULT_MAX_CACHED: usize = 1024;

/// Out-of-band source of last-known content and modification times.
pub trait DocumentCache: Send + Sync {
    /// Content the caller last saw for `path`, if known.
    fn last_known(&self, path: &Path) -> Option<String>;

    /// Remember `content` as what is now on disk for `path`.
    fn remember(&self, path: &Path, content: &str);

    /// Record the modification time observed after a write.
    fn record_modified(&self, path: &Path, modified_at: SystemTime);

    /// Last recorded modification time for `path`.
    fn modified_at(&self, path: &Path) -> Option<SystemTime>;

    /// Drop everything known about `path` (it was deleted or moved away).
    fn forget(&self, path: &Path);
}

#[derive(Debug, Clone)]
struct CachedDoc {
    content: Option<String>,
    modified_at: Option<SystemTime>,
    /// Last access time for LRU eviction.
    last_access: Instant,
}

impl CachedDoc {
    fn new() -> Self {
        Self {
            content: None,
            modified_at: None,
            last_access: Instant::now(),
        }
    }
}

/// In-memory [`DocumentCache`] keyed by absolute path.
#[derive(Debug)]
pub struct MemoryDocumentCache {
    docs: RwLock<HashMap<PathBuf, CachedDoc>>,
    max_cached: usize,
}

impl Default for MemoryDocumentCache {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_MAX_CACHED)
    }
}

impl MemoryDocumentCache {
    /// Create an empty cache holding up to [`DEFAULT_MAX_CACHED`] documents.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty cache holding up to `max_cached` documents (at least one).
    pub fn with_capacity(max_cached: usize) -> Self {
        Self {
            docs: RwLock::new(HashMap::new()),
            max_cached: max_cached.max(1),
        }
    }

    /// Number of cached documents.
    pub fn len(&self) -> usize {
        self.docs.read().len()
    }

    /// True if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.docs.read().is_empty()
    }

    fn update(&self, path: &Path, apply: impl FnOnce(&mut CachedDoc)) {
        let mut docs = self.docs.write();
        if !docs.contains_key(path) {
            self.evict_if_needed(&mut docs);
        }
        let doc = docs.entry(path.to_path_buf()).or_insert_with(CachedDoc::new);
        doc.last_access = Instant::now();
        apply(doc);
    }

    /// Evict oldest entries until there is room for one more.
    fn evict_if_needed(&self, docs: &mut HashMap<PathBuf, CachedDoc>) {
        while docs.len() >= self.max_cached {
            let oldest = docs
                .iter()
                .min_by_key(|(_, d)| d.last_access)
                .map(|(k, _)| k.clone());

            match oldest {
                Some(key) => {
                    tracing::trace!(path = %key.display(), "evicting cached document");
                    docs.remove(&key);
                }
                None => break,
            }
        }
    }
}

impl DocumentCache for MemoryDocumentCache {
    fn last_known(&self, path: &Path) -> Option<String> {
        let mut docs = self.docs.write();
        let doc = docs.get_mut(path)?;
        doc.last_access = Instant::now();
        doc.content.clone()
    }

    fn remember(&self, path: &Path, content: &str) {
        self.update(path, |doc| doc.content = Some(content.to_string()));
    }

    fn record_modified(&self, path: &Path, modified_at: SystemTime) {
        self.update(path, |doc| doc.modified_at = Some(modified_at));
    }

    fn modified_at(&self, path: &Path) -> Option<SystemTime> {
        self.docs.read().get(path).and_then(|d| d.modified_at)
    }

    fn forget(&self, path: &Path) {
        self.docs.write().remove(path);
    }
}
