//! Recursive file listing.

use std::io;
use std::path::{Path, PathBuf};

use crate::vfs::RawFs;

/// List every file below `dir`, as `/`-separated paths relative to `dir`.
///
/// Hidden entries (leading `.`) and symlinks are skipped, and hidden
/// directories are not descended into. A failure to read `dir` itself is an
/// error; a subdirectory that vanishes mid-walk is logged and skipped.
pub async fn list_files(fs: &dyn RawFs, dir: &Path) -> io::Result<Vec<String>> {
    let mut files = Vec::new();
    let mut pending = vec![PathBuf::new()];

    while let Some(rel) = pending.pop() {
        let entries = match fs.read_dir(&dir.join(&rel)).await {
            Ok(entries) => entries,
            Err(e) if rel.as_os_str().is_empty() => return Err(e),
            Err(e) => {
                tracing::warn!(dir = %dir.join(&rel).display(), "skipping unreadable directory: {e}");
                continue;
            }
        };

        for entry in entries {
            if entry.is_hidden() || entry.kind.is_symlink() {
                continue;
            }
            let child = rel.join(&entry.name);
            if entry.kind.is_dir() {
                pending.push(child);
            } else {
                files.push(to_slash(&child));
            }
        }
    }

    files.sort();
    Ok(files)
}

/// Join path components with `/` regardless of host convention.
pub fn to_slash(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vfs::LocalFs;
    use tempfile::TempDir;

    fn populate(root: &Path) {
        for (path, content) in [
            ("pages/a.md", "a"),
            ("pages/nested/b.md", "b"),
            ("journals/2024_01_01.md", "j"),
            ("top.md", "t"),
            (".hidden.md", "h"),
            (".git/config", "g"),
            ("pages/.draft.md", "d"),
        ] {
            let full = root.join(path);
            std::fs::create_dir_all(full.parent().unwrap()).unwrap();
            std::fs::write(full, content).unwrap();
        }
    }

    #[tokio::test]
    async fn test_lists_recursively_without_hidden() {
        let dir = TempDir::new().unwrap();
        populate(dir.path());

        let files = list_files(&LocalFs, dir.path()).await.unwrap();
        assert_eq!(
            files,
            vec![
                "journals/2024_01_01.md",
                "pages/a.md",
                "pages/nested/b.md",
                "top.md",
            ]
        );
    }

    #[tokio::test]
    async fn test_paths_are_relative_to_listed_dir() {
        let dir = TempDir::new().unwrap();
        populate(dir.path());

        let files = list_files(&LocalFs, &dir.path().join("pages")).await.unwrap();
        assert_eq!(files, vec!["a.md", "nested/b.md"]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_symlinks_are_skipped() {
        let dir = TempDir::new().unwrap();
        populate(dir.path());
        std::os::unix::fs::symlink(dir.path().join("top.md"), dir.path().join("alias.md"))
            .unwrap();
        std::os::unix::fs::symlink(dir.path().join("pages"), dir.path().join("pages-link"))
            .unwrap();

        let files = list_files(&LocalFs, dir.path()).await.unwrap();
        assert!(!files.iter().any(|f| f.starts_with("alias") || f.starts_with("pages-link")));
    }

    #[tokio::test]
    async fn test_missing_dir_is_error() {
        let dir = TempDir::new().unwrap();
        let err = list_files(&LocalFs, &dir.path().join("nope")).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
