//! Root scope containment.
//!
//! Every caller-supplied path is resolved here before any I/O. A path is
//! accepted only if it equals the root or lies below it, compared component
//! by component after lexical normalization and after following symlinks in
//! its parent directories.
//!
//! The last component is never resolved: a symlink names itself, so moving
//! or deleting it touches the link and not its target. Operations that read
//! or write through the link use [`RootScope::resolve`], which additionally
//! requires the link's final target to stay inside the root.

use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};

use crate::error::{GatewayError, GatewayResult};

/// The directory boundary all operations are confined to.
///
/// Built once from configuration and immutable afterwards. Gateways take it
/// by value, so several scopes can coexist in one process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootScope {
    root: PathBuf,
}

/// A caller path that passed the scope check.
///
/// Derived per call and never cached: the input is untrusted every time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    absolute: PathBuf,
    relative: PathBuf,
}

impl RootScope {
    /// Create a scope rooted at `root`.
    ///
    /// Relative roots are taken from the current directory. The root is
    /// canonicalized when it exists (e.g. macOS `/tmp` → `/private/tmp`).
    pub fn new(root: impl Into<PathBuf>) -> GatewayResult<Self> {
        let root: PathBuf = root.into();
        let root = if root.is_absolute() {
            root
        } else {
            std::env::current_dir()
                .map_err(|e| GatewayError::io("resolve root", &root, e))?
                .join(root)
        };
        let root = normalize(&root);
        let root = dunce::canonicalize(&root).unwrap_or(root);
        Ok(Self { root })
    }

    /// Get the root path.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a path that will be followed (read, write, stat, list).
    ///
    /// If the entry is a symlink, its final target must be inside the root too.
    pub fn resolve(&self, user_path: &str) -> GatewayResult<ResolvedPath> {
        let resolved = self.resolve_entry(user_path)?;

        let followed = follow_links(resolved.as_path());
        if !followed.is_some_and(|target| is_within(&target, &self.root)) {
            tracing::warn!(path = user_path, root = %self.root.display(), "symlink target escapes root");
            return Err(GatewayError::out_of_scope(user_path, &self.root));
        }

        Ok(resolved)
    }

    /// Resolve a path naming the entry itself (unlink, rename).
    ///
    /// A final symlink is not followed, so its target is irrelevant.
    pub fn resolve_entry(&self, user_path: &str) -> GatewayResult<ResolvedPath> {
        let candidate = Path::new(user_path);
        let joined = if candidate.is_absolute() {
            candidate.to_path_buf()
        } else {
            self.root.join(candidate)
        };

        let real = realize_entry(&normalize(&joined));

        if !is_within(&real, &self.root) {
            tracing::warn!(path = user_path, root = %self.root.display(), "path escapes root");
            return Err(GatewayError::out_of_scope(user_path, &self.root));
        }

        let relative = strip_root(&real, &self.root);
        Ok(ResolvedPath {
            absolute: real,
            relative,
        })
    }
}

impl ResolvedPath {
    /// The normalized absolute path.
    pub fn as_path(&self) -> &Path {
        &self.absolute
    }

    /// The path relative to the root (empty for the root itself).
    pub fn relative(&self) -> &Path {
        &self.relative
    }

    /// True if this is the root itself.
    pub fn is_root(&self) -> bool {
        self.relative.as_os_str().is_empty()
    }

    /// The path relative to `base` if it lies below it, else relative to the root.
    pub fn relative_to(&self, base: &ResolvedPath) -> PathBuf {
        if is_within(&self.absolute, &base.absolute) {
            strip_root(&self.absolute, &base.absolute)
        } else {
            self.relative.clone()
        }
    }
}

impl AsRef<Path> for ResolvedPath {
    fn as_ref(&self) -> &Path {
        &self.absolute
    }
}

/// Collapse `.` and `..` without touching the filesystem.
///
/// A `..` at the top of an absolute path stays there, like the OS does.
pub fn normalize(path: &Path) -> PathBuf {
    let mut result = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(p) => result.push(p.as_os_str()),
            Component::RootDir => result.push(Component::RootDir.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                if matches!(result.components().next_back(), Some(Component::Normal(_))) {
                    result.pop();
                } else if !result.has_root() {
                    result.push("..");
                }
            }
            Component::Normal(s) => result.push(s),
        }
    }
    result
}

/// Symlink hops followed before giving up (matches Linux `MAXSYMLINKS`).
const MAX_LINK_HOPS: usize = 40;

/// Canonicalize the parent directory, keeping the last component as given.
fn realize_entry(path: &Path) -> PathBuf {
    match (path.parent(), path.file_name()) {
        (Some(parent), Some(name)) => realize(parent).join(name),
        _ => realize(path),
    }
}

/// Where `path` ends up after following any chain of final symlinks.
///
/// Dangling links resolve to where their target would be created. `None` on a
/// link loop or an unreadable link.
fn follow_links(path: &Path) -> Option<PathBuf> {
    let mut current = path.to_path_buf();
    for _ in 0..MAX_LINK_HOPS {
        match std::fs::symlink_metadata(&current) {
            Ok(meta) if meta.file_type().is_symlink() => {}
            _ => return Some(current),
        }
        let link = std::fs::read_link(&current).ok()?;
        let base = current.parent().map(Path::to_path_buf).unwrap_or_default();
        current = realize_entry(&normalize(&base.join(link)));
    }
    None
}

/// Canonicalize the deepest existing ancestor and re-append the rest.
fn realize(path: &Path) -> PathBuf {
    let mut existing = path;
    let mut tail: Vec<OsString> = Vec::new();
    loop {
        if let Ok(real) = dunce::canonicalize(existing) {
            let mut out = real;
            for name in tail.iter().rev() {
                out.push(name);
            }
            return out;
        }
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                tail.push(name.to_os_string());
                existing = parent;
            }
            _ => return path.to_path_buf(),
        }
    }
}

#[cfg(not(windows))]
fn is_within(path: &Path, root: &Path) -> bool {
    path.starts_with(root)
}

// NTFS is case-insensitive.
#[cfg(windows)]
fn is_within(path: &Path, root: &Path) -> bool {
    let path = path.to_string_lossy().to_lowercase();
    let root = root.to_string_lossy().to_lowercase();
    Path::new(&path).starts_with(Path::new(&root))
}

fn strip_root(path: &Path, root: &Path) -> PathBuf {
    // is_within() passed, so the component count of root is a valid prefix.
    path.components()
        .skip(root.components().count())
        .collect()
}
