//! Gateway configuration.
//!
//! Loaded once at startup from a RON file and immutable afterwards:
//!
//! ```ron
//! (
//!     root: "~/graphs",
//!     backup_dir: ".graphfs/bak",
//!     recycle_dir: ".graphfs/recycle",
//!     socket: Some("/run/user/1000/graphfs.sock"),
//! )
//! ```
//!
//! `backup_dir` and `recycle_dir` are relative to the repository root of each
//! operation. Every field is optional.

use std::path::{Component, Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::error::GatewayResult;
use crate::guard::RootScope;

/// Default backup area, relative to a repository root.
pub const DEFAULT_BACKUP_DIR: &str = ".graphfs/bak";

/// Default recycle area, relative to a repository root.
pub const DEFAULT_RECYCLE_DIR: &str = ".graphfs/recycle";

/// Process-wide gateway configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Directory every operation is confined to.
    pub root: PathBuf,
    /// Backup area, relative to the repository root.
    pub backup_dir: PathBuf,
    /// Recycle area, relative to the repository root.
    pub recycle_dir: PathBuf,
    /// Unix socket the server listens on.
    pub socket: Option<PathBuf>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            backup_dir: PathBuf::from(DEFAULT_BACKUP_DIR),
            recycle_dir: PathBuf::from(DEFAULT_RECYCLE_DIR),
            socket: None,
        }
    }
}

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("RON parse error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("invalid config: {0}")]
    Invalid(String),
}

impl GatewayConfig {
    /// Default config file location (`~/.config/graphfs/config.ron` on Linux).
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("graphfs").join("config.ron"))
    }

    /// Parse a RON document, expanding `~` and validating area paths.
    pub fn from_ron_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = ron::from_str(text)?;
        config.finish()
    }

    /// Load from `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ron_str(&text)
    }

    /// Load from `path`, or the default location when `None`.
    ///
    /// A missing file at the default location yields defaults; an explicitly
    /// named file must exist.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = path {
            return Self::load(path);
        }
        match Self::default_path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => {
                tracing::info!("No config file found, using defaults");
                Self::default().finish()
            }
        }
    }

    /// Build the root scope for this configuration.
    pub fn scope(&self) -> GatewayResult<RootScope> {
        RootScope::new(&self.root)
    }

    fn finish(mut self) -> Result<Self, ConfigError> {
        self.root = expand(&self.root);
        self.socket = self.socket.as_deref().map(expand);
        check_area("backup_dir", &self.backup_dir)?;
        check_area("recycle_dir", &self.recycle_dir)?;
        Ok(self)
    }
}

fn expand(path: &Path) -> PathBuf {
    PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).as_ref())
}

/// Areas must stay inside the repository they belong to.
fn check_area(field: &str, path: &Path) -> Result<(), ConfigError> {
    let mut normal = 0;
    for component in path.components() {
        match component {
            Component::Normal(_) => normal += 1,
            Component::CurDir => {}
            _ => {
                return Err(ConfigError::Invalid(format!(
                    "{field} must be a relative path without '..': {}",
                    path.display()
                )));
            }
        }
    }
    if normal == 0 {
        return Err(ConfigError::Invalid(format!("{field} must not be empty")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GatewayConfig::from_ron_str("()").unwrap();
        assert_eq!(config.backup_dir, PathBuf::from(DEFAULT_BACKUP_DIR));
        assert_eq!(config.recycle_dir, PathBuf::from(DEFAULT_RECYCLE_DIR));
        assert!(config.socket.is_none());
    }

    #[test]
    fn test_full_document() {
        let config = GatewayConfig::from_ron_str(
            r#"(
                root: "/graphs",
                backup_dir: "bak",
                recycle_dir: "trash/files",
                socket: Some("/tmp/graphfs.sock"),
            )"#,
        )
        .unwrap();
        assert_eq!(config.root, PathBuf::from("/graphs"));
        assert_eq!(config.backup_dir, PathBuf::from("bak"));
        assert_eq!(config.recycle_dir, PathBuf::from("trash/files"));
        assert_eq!(config.socket, Some(PathBuf::from("/tmp/graphfs.sock")));
    }

    #[test]
    fn test_tilde_expands() {
        let config = GatewayConfig::from_ron_str(r#"(root: "~/graphs")"#).unwrap();
        assert!(!config.root.to_string_lossy().starts_with('~'));
        assert!(config.root.ends_with("graphs"));
    }

    #[test]
    fn test_escaping_area_rejected() {
        for doc in [
            r#"(backup_dir: "../outside")"#,
            r#"(recycle_dir: "/abs/recycle")"#,
            r#"(backup_dir: "")"#,
        ] {
            assert!(
                matches!(GatewayConfig::from_ron_str(doc), Err(ConfigError::Invalid(_))),
                "accepted {doc}"
            );
        }
    }

    #[test]
    fn test_bad_ron() {
        assert!(matches!(
            GatewayConfig::from_ron_str("(root: )"),
            Err(ConfigError::Ron(_))
        ));
    }

    #[test]
    fn test_load_missing_explicit_file() {
        let err = GatewayConfig::load_or_default(Some(Path::new("/nonexistent/graphfs.ron")))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
