//! Configuration system: YAML file + env var overrides + commented example generation.

#![allow(missing_docs)]

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::context::RunContext;
use crate::core::errors::{FkError, Result};

/// Full FileKeeper configuration model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,
    pub directories: Vec<DirectoryPolicy>,
    pub security: SecurityPolicy,
}

/// Program-wide switches.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GeneralConfig {
    /// Master switch; a disabled config only runs with `--force`. Absent means off.
    pub enabled: bool,
    pub logging: LoggingConfig,
}

/// Activity log settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    pub enabled: bool,
    /// One of `debug`, `info`, `warn`, `error`.
    pub level: String,
    pub file: PathBuf,
}

/// Retention rules for one directory tree.
///
/// `path` and `retention_period` must be present; everything else defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DirectoryPolicy {
    pub path: PathBuf,
    /// `30d`, `24h`, `90m`, or any `<n><unit>` sequence.
    pub retention_period: String,
    /// Shell glob applied to base names; empty matches everything.
    #[serde(default)]
    pub file_pattern: String,
    #[serde(default)]
    pub exclude_subdirs: bool,
    #[serde(default)]
    pub remove_empty_dirs: bool,
}

/// Deletion safety settings shared by every directory policy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct SecurityPolicy {
    /// Report candidates without touching the filesystem.
    pub dry_run: bool,
    pub secure_delete: SecureDeleteConfig,
}

/// Overwrite-before-unlink settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SecureDeleteConfig {
    pub enabled: bool,
    /// Overwrite passes; 0 degenerates to a plain unlink.
    pub passes: u32,
    /// Rename entries to random names right before removal.
    pub obfuscate_filenames: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: "info".to_string(),
            file: PathBuf::from("/var/log/filekeeper.log"),
        }
    }
}

impl Default for SecureDeleteConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            passes: 3,
            obfuscate_filenames: false,
        }
    }
}

impl DirectoryPolicy {
    /// Policy with the given root and retention and every optional field defaulted.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, retention_period: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            retention_period: retention_period.into(),
            file_pattern: String::new(),
            exclude_subdirs: false,
            remove_empty_dirs: false,
        }
    }
}

impl Config {
    /// Default configuration for the given run context, as written by `--init`.
    #[must_use]
    pub fn default_for(ctx: &RunContext) -> Self {
        let mut cfg = Self::default();
        cfg.general.enabled = true;
        cfg.general.logging.file.clone_from(&ctx.log_file);
        cfg.directories = vec![DirectoryPolicy {
            path: PathBuf::from("/path/to/dir1"),
            retention_period: "30d".to_string(),
            file_pattern: "*.log".to_string(),
            exclude_subdirs: false,
            remove_empty_dirs: true,
        }];
        cfg
    }

    /// Load and decode a config file, then apply env overrides.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(FkError::MissingConfig {
                path: path.to_path_buf(),
            });
        }
        let raw = fs::read_to_string(path).map_err(|source| FkError::io(path, source))?;
        let mut cfg = Self::from_yaml_str(&raw)?;
        cfg.apply_env_overrides_from(env_var)?;
        Ok(cfg)
    }

    /// Decode config text without touching the environment.
    pub fn from_yaml_str(raw: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(raw)?)
    }

    fn apply_env_overrides_from<F>(&mut self, mut lookup: F) -> Result<()>
    where
        F: FnMut(&str) -> Option<String>,
    {
        if let Some(raw) = lookup("FILEKEEPER_ENABLED") {
            self.general.enabled = parse_env_bool("FILEKEEPER_ENABLED", &raw)?;
        }
        if let Some(raw) = lookup("FILEKEEPER_LOG_ENABLED") {
            self.general.logging.enabled = parse_env_bool("FILEKEEPER_LOG_ENABLED", &raw)?;
        }
        if let Some(raw) = lookup("FILEKEEPER_LOG_LEVEL") {
            self.general.logging.level = raw;
        }
        if let Some(raw) = lookup("FILEKEEPER_LOG_FILE") {
            self.general.logging.file = PathBuf::from(raw);
        }
        if let Some(raw) = lookup("FILEKEEPER_DRY_RUN") {
            self.security.dry_run = parse_env_bool("FILEKEEPER_DRY_RUN", &raw)?;
        }
        if let Some(raw) = lookup("FILEKEEPER_SECURE_DELETE_ENABLED") {
            self.security.secure_delete.enabled =
                parse_env_bool("FILEKEEPER_SECURE_DELETE_ENABLED", &raw)?;
        }
        if let Some(raw) = lookup("FILEKEEPER_SECURE_DELETE_PASSES") {
            self.security.secure_delete.passes =
                parse_env_u32("FILEKEEPER_SECURE_DELETE_PASSES", &raw)?;
        }
        if let Some(raw) = lookup("FILEKEEPER_OBFUSCATE_FILENAMES") {
            self.security.secure_delete.obfuscate_filenames =
                parse_env_bool("FILEKEEPER_OBFUSCATE_FILENAMES", &raw)?;
        }
        Ok(())
    }
}

/// Commented example configuration. Decodes to [`Config::default_for`].
#[must_use]
pub fn example_config_text(ctx: &RunContext) -> String {
    let log_file = yaml_quoted(&ctx.log_file.to_string_lossy());
    format!(
        r#"# General settings
general:
  # Enable/disable program operation
  enabled: true
  # Logging settings
  logging:
    # Enable/disable logging
    enabled: true
    # Logging level (debug, info, warn, error)
    level: "info"
    # Path to log file
    file: {log_file}

# List of directories to process
directories:
  - path: "/path/to/dir1"
    # File retention period (format: 30d, 24h, 60m)
    retention_period: "30d"
    # File matching pattern (optional)
    file_pattern: "*.log"
    # Exclude subdirectories?
    exclude_subdirs: false
    # Remove empty directories?
    remove_empty_dirs: true

# Security settings
security:
  # Dry run mode: only output files that would be deleted without actual deletion
  dry_run: false
  # Secure deletion settings (for HDD)
  secure_delete:
    # Enable/disable secure deletion
    enabled: false
    # Number of passes for data overwrite
    passes: 3
    # Rename files and directories to random names before removing them
    obfuscate_filenames: false
"#
    )
}

/// Write the example config, creating parent directories as needed.
pub fn write_example_config(path: &Path, ctx: &RunContext) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|source| FkError::io(parent, source))?;
    }
    fs::write(path, example_config_text(ctx)).map_err(|source| FkError::io(path, source))
}

/// Double-quoted YAML scalar.
fn yaml_quoted(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() + 2);
    out.push('"');
    for c in raw.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

fn env_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|raw| !raw.trim().is_empty())
}

fn parse_env_bool(name: &str, raw: &str) -> Result<bool> {
    raw.parse::<bool>().map_err(|error| FkError::ConfigParse {
        context: "env",
        details: format!("{name}={raw:?}: {error}"),
    })
}

fn parse_env_u32(name: &str, raw: &str) -> Result<u32> {
    raw.parse::<u32>().map_err(|error| FkError::ConfigParse {
        context: "env",
        details: format!("{name}={raw:?}: {error}"),
    })
}
