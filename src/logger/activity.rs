//! Typed activity events and the severity-filtered sink handed to the sweeper.
//!
//! Every sweep decision is expressed as an [`ActivityEvent`], converted to a
//! [`LogEntry`], and appended to the JSONL log when it meets the configured
//! minimum severity.

#![allow(missing_docs)]

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::core::config::LoggingConfig;
use crate::logger::jsonl::{EventType, JsonlConfig, JsonlWriter, LogEntry, Severity};

/// Whether a record concerns a regular file or a directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

impl EntryKind {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Directory => "directory",
        }
    }
}

/// Sweep phase identifiers used in completion records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepPhase {
    Files,
    EmptyDirectories,
}

impl SweepPhase {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Files => "files",
            Self::EmptyDirectories => "empty_directories",
        }
    }
}

/// Events emitted during a retention run.
#[derive(Debug, Clone)]
pub enum ActivityEvent {
    RunStarted {
        version: String,
        config_path: PathBuf,
        dry_run: bool,
    },
    RunFinished {
        policies: usize,
        failed_policies: usize,
    },
    SweepStarted {
        root: PathBuf,
    },
    CutoffComputed {
        root: PathBuf,
        retention: String,
        cutoff: SystemTime,
    },
    EntrySkipped {
        path: PathBuf,
        reason: String,
    },
    PatternError {
        path: PathBuf,
        pattern: String,
        message: String,
    },
    TraversalError {
        path: PathBuf,
        message: String,
    },
    WouldDelete {
        path: PathBuf,
        kind: EntryKind,
        modified: Option<SystemTime>,
    },
    Deleted {
        path: PathBuf,
        kind: EntryKind,
        secure: bool,
    },
    DeletionFailed {
        path: PathBuf,
        kind: EntryKind,
        error_code: String,
        message: String,
    },
    OverwritePass {
        path: PathBuf,
        pass: u32,
        passes: u32,
    },
    Obfuscated {
        from: PathBuf,
        to: PathBuf,
    },
    PruneStarted {
        root: PathBuf,
    },
    PhaseCompleted {
        root: PathBuf,
        phase: SweepPhase,
        summary: String,
    },
    PolicyFailed {
        root: PathBuf,
        error_code: String,
        message: String,
    },
}

impl ActivityEvent {
    /// Severity this event is recorded at.
    #[must_use]
    pub const fn severity(&self) -> Severity {
        match self {
            Self::EntrySkipped { .. } | Self::OverwritePass { .. } => Severity::Debug,
            Self::PatternError { .. } | Self::TraversalError { .. } => Severity::Warning,
            Self::DeletionFailed { .. } | Self::PolicyFailed { .. } => Severity::Error,
            _ => Severity::Info,
        }
    }

    /// Convert into a serializable log entry.
    #[must_use]
    pub fn into_entry(self) -> LogEntry {
        let severity = self.severity();
        match self {
            Self::RunStarted {
                version,
                config_path,
                dry_run,
            } => {
                let mut e = LogEntry::new(EventType::RunStart, severity);
                e.path = Some(display(&config_path));
                e.details = Some(if dry_run {
                    format!("filekeeper v{version} (dry-run: no files will be deleted)")
                } else {
                    format!("filekeeper v{version}")
                });
                e
            }
            Self::RunFinished {
                policies,
                failed_policies,
            } => {
                let mut e = LogEntry::new(EventType::RunFinish, severity);
                e.ok = Some(failed_policies == 0);
                e.details = Some(format!(
                    "processed {policies} directories, {failed_policies} failed"
                ));
                e
            }
            Self::SweepStarted { root } => {
                let mut e = LogEntry::new(EventType::SweepStart, severity);
                e.path = Some(display(&root));
                e
            }
            Self::CutoffComputed {
                root,
                retention,
                cutoff,
            } => {
                let mut e = LogEntry::new(EventType::Cutoff, severity);
                e.path = Some(display(&root));
                e.retention = Some(retention);
                e.cutoff = Some(format_rfc3339(cutoff));
                e
            }
            Self::EntrySkipped { path, reason } => {
                let mut e = LogEntry::new(EventType::EntrySkip, severity);
                e.path = Some(display(&path));
                e.details = Some(reason);
                e
            }
            Self::PatternError {
                path,
                pattern,
                message,
            } => {
                let mut e = LogEntry::new(EventType::EntrySkip, severity);
                e.path = Some(display(&path));
                e.pattern = Some(pattern);
                e.ok = Some(false);
                e.error_code = Some("FK-2002".to_string());
                e.error_message = Some(message);
                e
            }
            Self::TraversalError { path, message } => {
                let mut e = LogEntry::new(EventType::EntrySkip, severity);
                e.path = Some(display(&path));
                e.ok = Some(false);
                e.error_code = Some("FK-3002".to_string());
                e.error_message = Some(message);
                e
            }
            Self::WouldDelete {
                path,
                kind,
                modified,
            } => {
                let mut e = LogEntry::new(EventType::DryRunMatch, severity);
                e.path = Some(display(&path));
                e.modified = modified.map(format_rfc3339);
                e.details = Some(format!("would delete {}", kind.label()));
                e
            }
            Self::Deleted { path, kind, secure } => {
                let event = match kind {
                    EntryKind::File => EventType::FileDelete,
                    EntryKind::Directory => EventType::DirectoryRemove,
                };
                let mut e = LogEntry::new(event, severity);
                e.path = Some(display(&path));
                e.ok = Some(true);
                if secure {
                    e.details = Some("secure delete".to_string());
                }
                e
            }
            Self::DeletionFailed {
                path,
                kind,
                error_code,
                message,
            } => {
                let mut e = LogEntry::new(EventType::DeleteFailed, severity);
                e.path = Some(display(&path));
                e.ok = Some(false);
                e.error_code = Some(error_code);
                e.error_message = Some(message);
                e.details = Some(kind.label().to_string());
                e
            }
            Self::OverwritePass { path, pass, passes } => {
                let mut e = LogEntry::new(EventType::OverwritePass, severity);
                e.path = Some(display(&path));
                e.pass = Some(pass);
                e.passes = Some(passes);
                e
            }
            Self::Obfuscated { from, to } => {
                let mut e = LogEntry::new(EventType::Obfuscate, severity);
                e.path = Some(display(&from));
                e.target = Some(display(&to));
                e
            }
            Self::PruneStarted { root } => {
                let mut e = LogEntry::new(EventType::PruneStart, severity);
                e.path = Some(display(&root));
                e
            }
            Self::PhaseCompleted {
                root,
                phase,
                summary,
            } => {
                let mut e = LogEntry::new(EventType::PhaseComplete, severity);
                e.path = Some(display(&root));
                e.details = Some(format!("{}: {summary}", phase.label()));
                e
            }
            Self::PolicyFailed {
                root,
                error_code,
                message,
            } => {
                let mut e = LogEntry::new(EventType::Error, severity);
                e.path = Some(display(&root));
                e.ok = Some(false);
                e.error_code = Some(error_code);
                e.error_message = Some(message);
                e
            }
        }
    }
}

/// Severity-filtered activity sink. Owns the JSONL writer, if any.
pub struct ActivityLogger {
    writer: Option<JsonlWriter>,
    min_severity: Severity,
}

impl ActivityLogger {
    /// Build a logger from the `general.logging` section.
    pub fn from_config(config: &LoggingConfig) -> Self {
        if !config.enabled {
            return Self::discard();
        }
        let writer = JsonlWriter::open(JsonlConfig {
            path: config.file.clone(),
            ..JsonlConfig::default()
        });
        Self {
            writer: Some(writer),
            min_severity: Severity::from_level_name(&config.level),
        }
    }

    /// Logger writing to `path` at the given threshold.
    pub fn to_file(path: impl Into<PathBuf>, min_severity: Severity) -> Self {
        Self {
            writer: Some(JsonlWriter::open(JsonlConfig {
                path: path.into(),
                ..JsonlConfig::default()
            })),
            min_severity,
        }
    }

    /// Logger that drops everything.
    #[must_use]
    pub const fn discard() -> Self {
        Self {
            writer: None,
            min_severity: Severity::Error,
        }
    }

    /// Whether events at `severity` would be written.
    #[must_use]
    pub fn enabled_for(&self, severity: Severity) -> bool {
        self.writer.is_some() && severity >= self.min_severity
    }

    /// Record an event if it meets the threshold.
    pub fn log(&mut self, event: ActivityEvent) {
        if !self.enabled_for(event.severity()) {
            return;
        }
        let entry = event.into_entry();
        if let Some(w) = self.writer.as_mut() {
            w.write_entry(&entry);
        }
    }

    /// Flush buffered lines to the file.
    pub fn flush(&mut self) {
        if let Some(w) = self.writer.as_mut() {
            w.flush();
        }
    }
}

/// Format a timestamp as RFC 3339 (UTC, second precision).
#[must_use]
pub fn format_rfc3339(ts: SystemTime) -> String {
    chrono::DateTime::<chrono::Utc>::from(ts).to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
}

fn display(path: &Path) -> String {
    path.to_string_lossy().to_string()
}
