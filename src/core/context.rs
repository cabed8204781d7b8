//! Run context: root-vs-user path selection, resolved once at process start.

use std::env;
use std::path::{Path, PathBuf};

use crate::core::errors::{FkError, Result};

/// File name of the configuration file in both scopes.
pub const CONFIG_FILE_NAME: &str = "filekeeper.yaml";

/// Immutable description of where this run reads and writes its state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunContext {
    /// Whether the process runs with an effective uid of 0.
    pub is_root: bool,
    /// Default configuration file location.
    pub config_file: PathBuf,
    /// Default activity log location written into generated configs.
    pub log_file: PathBuf,
    /// Directory that receives generated systemd units.
    pub systemd_dir: PathBuf,
}

impl RunContext {
    /// Detect the context from the current process credentials and `$HOME`.
    pub fn detect() -> Result<Self> {
        let is_root = effective_uid_is_root();
        if is_root {
            return Ok(Self::system());
        }
        let home = env::var_os("HOME")
            .filter(|h| !h.is_empty())
            .map(PathBuf::from)
            .ok_or_else(|| FkError::Environment {
                details: "HOME is not set; cannot resolve user configuration paths".to_string(),
            })?;
        Ok(Self::user(&home))
    }

    /// Build a context explicitly. `home` is ignored in root scope.
    #[must_use]
    pub fn new(is_root: bool, home: &Path) -> Self {
        if is_root {
            Self::system()
        } else {
            Self::user(home)
        }
    }

    fn system() -> Self {
        Self {
            is_root: true,
            config_file: PathBuf::from("/etc/filekeeper").join(CONFIG_FILE_NAME),
            log_file: PathBuf::from("/var/log/filekeeper.log"),
            systemd_dir: PathBuf::from("/etc/systemd/system"),
        }
    }

    fn user(home: &Path) -> Self {
        Self {
            is_root: false,
            config_file: home.join(".config").join(CONFIG_FILE_NAME),
            log_file: home
                .join(".local")
                .join("share")
                .join("filekeeper")
                .join("filekeeper.log"),
            systemd_dir: home.join(".config").join("systemd").join("user"),
        }
    }

    /// Human label for the configuration scope.
    #[must_use]
    pub const fn scope_label(&self) -> &'static str {
        if self.is_root {
            "System config (root)"
        } else {
            "User config"
        }
    }
}

#[cfg(unix)]
fn effective_uid_is_root() -> bool {
    nix::unistd::Uid::effective().is_root()
}

#[cfg(not(unix))]
fn effective_uid_is_root() -> bool {
    false
}
