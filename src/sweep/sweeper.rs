//! Two-phase retention sweep over one directory policy.
//!
//! Phase A walks the tree and retires files whose modification time is
//! strictly before the cutoff. Phase B, when enabled, collects every
//! directory below the root in one walk and removes the empty ones in
//! reverse discovery order, so children always go before their parents.
//! The root itself is never evaluated or removed.

#![allow(missing_docs)]

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::core::config::{DirectoryPolicy, SecurityPolicy};
use crate::core::errors::{FkError, Result};
use crate::logger::activity::{
    ActivityEvent, ActivityLogger, EntryKind, SweepPhase, format_rfc3339,
};
use crate::sweep::duration::parse_retention_period;
use crate::sweep::empty::is_dir_empty;
use crate::sweep::obfuscate::{obfuscate_directory, obfuscate_file};
use crate::sweep::overwrite::secure_delete;
use crate::sweep::pattern::FilePattern;
use crate::sweep::walker::{Visit, WalkControl, WalkEntry, walk};

// ──────────────────── report ────────────────────

/// Why an entry was left alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    PatternMismatch,
    InvalidPattern,
    TooRecent,
    ExcludedSubdirectory,
    NotEmpty,
    Unreadable,
}

impl SkipReason {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::PatternMismatch => "pattern mismatch",
            Self::InvalidPattern => "invalid pattern",
            Self::TooRecent => "too recent",
            Self::ExcludedSubdirectory => "excluded subdirectory",
            Self::NotEmpty => "directory not empty",
            Self::Unreadable => "entry unreadable",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryOutcome {
    Skipped(SkipReason),
    WouldDelete,
    Deleted,
    DeletionFailed(String),
}

#[derive(Debug, Clone)]
pub struct EntryRecord {
    pub path: PathBuf,
    pub kind: EntryKind,
    pub outcome: EntryOutcome,
}

/// Everything one sweep decided, in decision order.
#[derive(Debug, Clone)]
pub struct SweepReport {
    pub root: PathBuf,
    pub cutoff: SystemTime,
    pub entries: Vec<EntryRecord>,
}

impl SweepReport {
    fn new(root: PathBuf, cutoff: SystemTime) -> Self {
        Self {
            root,
            cutoff,
            entries: Vec::new(),
        }
    }

    fn record(&mut self, path: &Path, kind: EntryKind, outcome: EntryOutcome) {
        self.entries.push(EntryRecord {
            path: path.to_path_buf(),
            kind,
            outcome,
        });
    }

    #[must_use]
    pub fn deleted(&self) -> usize {
        self.count(|o| matches!(o, EntryOutcome::Deleted))
    }

    #[must_use]
    pub fn would_delete(&self) -> usize {
        self.count(|o| matches!(o, EntryOutcome::WouldDelete))
    }

    #[must_use]
    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, EntryOutcome::DeletionFailed(_)))
    }

    #[must_use]
    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, EntryOutcome::Skipped(_)))
    }

    /// Latest outcome recorded for `path`.
    #[must_use]
    pub fn outcome_of(&self, path: &Path) -> Option<&EntryOutcome> {
        self.entries
            .iter()
            .rev()
            .find(|r| r.path == path)
            .map(|r| &r.outcome)
    }

    fn count(&self, pred: impl Fn(&EntryOutcome) -> bool) -> usize {
        self.entries.iter().filter(|r| pred(&r.outcome)).count()
    }

    fn summary_since(&self, start: usize) -> String {
        let slice = &self.entries[start.min(self.entries.len())..];
        let n = |pred: fn(&EntryOutcome) -> bool| slice.iter().filter(|r| pred(&r.outcome)).count();
        format!(
            "{} deleted, {} would delete, {} failed, {} skipped",
            n(|o| matches!(o, EntryOutcome::Deleted)),
            n(|o| matches!(o, EntryOutcome::WouldDelete)),
            n(|o| matches!(o, EntryOutcome::DeletionFailed(_))),
            n(|o| matches!(o, EntryOutcome::Skipped(_))),
        )
    }
}

// ──────────────────── sweeper ────────────────────

/// Applies one [`SecurityPolicy`] to any number of directory policies.
pub struct RetentionSweeper<'a> {
    security: &'a SecurityPolicy,
    logger: &'a mut ActivityLogger,
    echo: bool,
}

struct FilePhase<'p> {
    policy: &'p DirectoryPolicy,
    pattern: std::result::Result<FilePattern, String>,
    cutoff: SystemTime,
}

impl<'a> RetentionSweeper<'a> {
    pub fn new(security: &'a SecurityPolicy, logger: &'a mut ActivityLogger) -> Self {
        Self {
            security,
            logger,
            echo: true,
        }
    }

    /// Suppress the stdout echo of dry-run candidates.
    #[must_use]
    pub const fn quiet(mut self) -> Self {
        self.echo = false;
        self
    }

    /// Sweep `policy` with the cutoff taken from the current clock.
    pub fn sweep(&mut self, policy: &DirectoryPolicy) -> Result<SweepReport> {
        self.sweep_at(policy, SystemTime::now())
    }

    /// Sweep `policy` as if the clock read `now`.
    ///
    /// Returns `Err` only for an unparseable retention period or an unusable
    /// root. Per-entry failures are logged and recorded in the report.
    pub fn sweep_at(&mut self, policy: &DirectoryPolicy, now: SystemTime) -> Result<SweepReport> {
        let root = policy.path.clone();
        self.logger.log(ActivityEvent::SweepStarted { root: root.clone() });

        let retention = parse_retention_period(&policy.retention_period)?;
        let cutoff = now
            .checked_sub(retention)
            .ok_or_else(|| FkError::InvalidRetention {
                value: policy.retention_period.clone(),
                details: "cutoff precedes the representable clock range".to_string(),
            })?;
        self.logger.log(ActivityEvent::CutoffComputed {
            root: root.clone(),
            retention: policy.retention_period.clone(),
            cutoff,
        });

        let phase = FilePhase {
            policy,
            pattern: FilePattern::compile(&policy.file_pattern).map_err(|e| e.to_string()),
            cutoff,
        };

        let mut report = SweepReport::new(root.clone(), cutoff);
        walk(&root, |visit| self.visit_file_phase(&phase, visit, &mut report))?;
        self.logger.log(ActivityEvent::PhaseCompleted {
            root: root.clone(),
            phase: SweepPhase::Files,
            summary: report.summary_since(0),
        });

        if policy.remove_empty_dirs {
            let start = report.entries.len();
            self.prune_empty_directories(policy, &mut report)?;
            self.logger.log(ActivityEvent::PhaseCompleted {
                root,
                phase: SweepPhase::EmptyDirectories,
                summary: report.summary_since(start),
            });
        }

        self.logger.flush();
        Ok(report)
    }

    fn visit_file_phase(
        &mut self,
        phase: &FilePhase<'_>,
        visit: Visit<'_>,
        report: &mut SweepReport,
    ) -> WalkControl {
        let entry = match visit {
            Visit::Entry(entry) => entry,
            Visit::Error { path, error } => {
                self.traversal_error(path, error);
                report.record(path, EntryKind::File, EntryOutcome::Skipped(SkipReason::Unreadable));
                return WalkControl::Continue;
            }
        };

        if entry.is_root() {
            return WalkControl::Continue;
        }
        if entry.is_dir() {
            if phase.policy.exclude_subdirs {
                self.skip(report, &entry.path, EntryKind::Directory, SkipReason::ExcludedSubdirectory);
                return WalkControl::SkipDir;
            }
            return WalkControl::Continue;
        }

        self.evaluate_file(phase, entry, report);
        WalkControl::Continue
    }

    fn evaluate_file(&mut self, phase: &FilePhase<'_>, entry: &WalkEntry, report: &mut SweepReport) {
        let path = entry.path.as_path();
        match &phase.pattern {
            Err(message) => {
                self.logger.log(ActivityEvent::PatternError {
                    path: path.to_path_buf(),
                    pattern: phase.policy.file_pattern.clone(),
                    message: message.clone(),
                });
                report.record(path, EntryKind::File, EntryOutcome::Skipped(SkipReason::InvalidPattern));
                return;
            }
            Ok(pattern) => {
                let name = path.file_name().unwrap_or(path.as_os_str());
                if !pattern.matches(name) {
                    self.skip(report, path, EntryKind::File, SkipReason::PatternMismatch);
                    return;
                }
            }
        }

        let modified = match entry.metadata.modified() {
            Ok(t) => t,
            Err(e) => {
                self.traversal_error(path, &FkError::io(path, e));
                report.record(path, EntryKind::File, EntryOutcome::Skipped(SkipReason::Unreadable));
                return;
            }
        };
        if modified >= phase.cutoff {
            self.skip(report, path, EntryKind::File, SkipReason::TooRecent);
            return;
        }

        if self.security.dry_run {
            self.logger.log(ActivityEvent::WouldDelete {
                path: path.to_path_buf(),
                kind: EntryKind::File,
                modified: Some(modified),
            });
            if self.echo {
                println!(
                    "Would delete file: {} (modified: {})",
                    path.display(),
                    format_rfc3339(modified)
                );
            }
            report.record(path, EntryKind::File, EntryOutcome::WouldDelete);
            return;
        }

        let outcome = match self.delete_file(path, &entry.metadata) {
            Ok(secure) => {
                self.logger.log(ActivityEvent::Deleted {
                    path: path.to_path_buf(),
                    kind: EntryKind::File,
                    secure,
                });
                EntryOutcome::Deleted
            }
            Err(err) => self.deletion_failed(path, EntryKind::File, &err),
        };
        report.record(path, EntryKind::File, outcome);
    }

    /// Returns whether the content was overwritten before unlinking.
    fn delete_file(&mut self, path: &Path, metadata: &fs::Metadata) -> Result<bool> {
        let target = if self.security.secure_delete.obfuscate_filenames {
            let renamed = obfuscate_file(path)?;
            self.logger.log(ActivityEvent::Obfuscated {
                from: path.to_path_buf(),
                to: renamed.clone(),
            });
            renamed
        } else {
            path.to_path_buf()
        };

        // Only regular files are overwritten; a symlink is unlinked, never its target.
        let secure = &self.security.secure_delete;
        if secure.enabled && metadata.is_file() {
            secure_delete(&target, secure.passes, self.logger)?;
            Ok(true)
        } else {
            fs::remove_file(&target).map_err(|e| FkError::io(&target, e))?;
            Ok(false)
        }
    }

    fn prune_empty_directories(
        &mut self,
        policy: &DirectoryPolicy,
        report: &mut SweepReport,
    ) -> Result<()> {
        self.logger.log(ActivityEvent::PruneStarted {
            root: policy.path.clone(),
        });

        let mut directories: Vec<PathBuf> = Vec::new();
        walk(&policy.path, |visit| match visit {
            Visit::Entry(entry) if entry.is_dir() && !entry.is_root() => {
                directories.push(entry.path.clone());
                if policy.exclude_subdirs {
                    WalkControl::SkipDir
                } else {
                    WalkControl::Continue
                }
            }
            Visit::Entry(_) => WalkControl::Continue,
            Visit::Error { path, error } => {
                self.traversal_error(path, error);
                WalkControl::Continue
            }
        })?;

        for dir in directories.iter().rev() {
            if policy.exclude_subdirs {
                self.logger.log(ActivityEvent::EntrySkipped {
                    path: dir.clone(),
                    reason: SkipReason::ExcludedSubdirectory.label().to_string(),
                });
                continue;
            }
            self.evaluate_directory(dir, report);
        }
        Ok(())
    }

    fn evaluate_directory(&mut self, dir: &Path, report: &mut SweepReport) {
        match is_dir_empty(dir) {
            Err(err) => {
                self.traversal_error(dir, &err);
                report.record(dir, EntryKind::Directory, EntryOutcome::Skipped(SkipReason::Unreadable));
                return;
            }
            Ok(false) => {
                self.skip(report, dir, EntryKind::Directory, SkipReason::NotEmpty);
                return;
            }
            Ok(true) => {}
        }

        if self.security.dry_run {
            self.logger.log(ActivityEvent::WouldDelete {
                path: dir.to_path_buf(),
                kind: EntryKind::Directory,
                modified: None,
            });
            if self.echo {
                println!("Would remove empty directory: {}", dir.display());
            }
            report.record(dir, EntryKind::Directory, EntryOutcome::WouldDelete);
            return;
        }

        let outcome = match self.remove_directory(dir) {
            Ok(()) => {
                self.logger.log(ActivityEvent::Deleted {
                    path: dir.to_path_buf(),
                    kind: EntryKind::Directory,
                    secure: false,
                });
                EntryOutcome::Deleted
            }
            Err(err) => self.deletion_failed(dir, EntryKind::Directory, &err),
        };
        report.record(dir, EntryKind::Directory, outcome);
    }

    fn remove_directory(&mut self, dir: &Path) -> Result<()> {
        let target = if self.security.secure_delete.obfuscate_filenames {
            let renamed = obfuscate_directory(dir)?;
            self.logger.log(ActivityEvent::Obfuscated {
                from: dir.to_path_buf(),
                to: renamed.clone(),
            });
            renamed
        } else {
            dir.to_path_buf()
        };
        fs::remove_dir(&target).map_err(|e| FkError::io(&target, e))
    }

    fn skip(&mut self, report: &mut SweepReport, path: &Path, kind: EntryKind, reason: SkipReason) {
        self.logger.log(ActivityEvent::EntrySkipped {
            path: path.to_path_buf(),
            reason: reason.label().to_string(),
        });
        report.record(path, kind, EntryOutcome::Skipped(reason));
    }

    fn traversal_error(&mut self, path: &Path, error: &FkError) {
        self.logger.log(ActivityEvent::TraversalError {
            path: path.to_path_buf(),
            message: error.to_string(),
        });
    }

    fn deletion_failed(&mut self, path: &Path, kind: EntryKind, err: &FkError) -> EntryOutcome {
        self.logger.log(ActivityEvent::DeletionFailed {
            path: path.to_path_buf(),
            kind,
            error_code: err.code().to_string(),
            message: err.to_string(),
        });
        EntryOutcome::DeletionFailed(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::jsonl::Severity;
    use filetime::{FileTime, set_file_mtime};
    use std::time::Duration;

    const DAY: Duration = Duration::from_secs(86_400);

    fn backdate(path: &Path, age: Duration) {
        let when = SystemTime::now() - age;
        set_file_mtime(path, FileTime::from_system_time(when)).unwrap();
    }

    fn policy(root: &Path, pattern: &str) -> DirectoryPolicy {
        let mut p = DirectoryPolicy::new(root, "7d");
        p.file_pattern = pattern.to_string();
        p
    }

    fn live() -> SecurityPolicy {
        SecurityPolicy::default()
    }

    fn dry() -> SecurityPolicy {
        SecurityPolicy {
            dry_run: true,
            ..SecurityPolicy::default()
        }
    }

    fn run(security: &SecurityPolicy, policy: &DirectoryPolicy) -> Result<SweepReport> {
        let mut logger = ActivityLogger::discard();
        RetentionSweeper::new(security, &mut logger).quiet().sweep(policy)
    }

    fn old_and_new(root: &Path) -> (PathBuf, PathBuf) {
        let old = root.join("old.log");
        let new = root.join("new.log");
        fs::write(&old, b"old").unwrap();
        fs::write(&new, b"new").unwrap();
        backdate(&old, DAY * 10);
        (old, new)
    }

    #[test]
    fn dry_run_reports_only_old_file() {
        let tmp = tempfile::tempdir().unwrap();
        let (old, new) = old_and_new(tmp.path());

        let report = run(&dry(), &policy(tmp.path(), "*.log")).unwrap();
        assert!(old.exists());
        assert!(new.exists());
        assert_eq!(report.would_delete(), 1);
        assert_eq!(report.outcome_of(&old), Some(&EntryOutcome::WouldDelete));
        assert_eq!(
            report.outcome_of(&new),
            Some(&EntryOutcome::Skipped(SkipReason::TooRecent))
        );
    }

    #[test]
    fn live_run_removes_only_old_file() {
        let tmp = tempfile::tempdir().unwrap();
        let (old, new) = old_and_new(tmp.path());

        let report = run(&live(), &policy(tmp.path(), "*.log")).unwrap();
        assert!(!old.exists());
        assert!(new.exists());
        assert_eq!(report.deleted(), 1);
        assert_eq!(report.failed(), 0);
    }

    #[test]
    fn pattern_mismatch_is_kept() {
        let tmp = tempfile::tempdir().unwrap();
        let keep = tmp.path().join("old.txt");
        fs::write(&keep, b"x").unwrap();
        backdate(&keep, DAY * 30);

        let report = run(&live(), &policy(tmp.path(), "*.log")).unwrap();
        assert!(keep.exists());
        assert_eq!(
            report.outcome_of(&keep),
            Some(&EntryOutcome::Skipped(SkipReason::PatternMismatch))
        );
    }

    #[test]
    fn empty_pattern_matches_all_files() {
        let tmp = tempfile::tempdir().unwrap();
        let a = tmp.path().join("a.bin");
        let b = tmp.path().join("b");
        fs::write(&a, b"x").unwrap();
        fs::write(&b, b"y").unwrap();
        backdate(&a, DAY * 8);
        backdate(&b, DAY * 8);

        let report = run(&live(), &policy(tmp.path(), "")).unwrap();
        assert_eq!(report.deleted(), 2);
    }

    #[test]
    fn excluded_subdirectories_are_never_evaluated() {
        let tmp = tempfile::tempdir().unwrap();
        let sub = tmp.path().join("sub");
        fs::create_dir(&sub).unwrap();
        let nested = sub.join("ancient.log");
        fs::write(&nested, b"x").unwrap();
        backdate(&nested, DAY * 365);

        let mut p = policy(tmp.path(), "*.log");
        p.exclude_subdirs = true;
        p.remove_empty_dirs = true;
        let report = run(&live(), &p).unwrap();

        assert!(nested.exists());
        assert!(sub.exists());
        assert!(report.outcome_of(&nested).is_none());
        assert_eq!(
            report.outcome_of(&sub),
            Some(&EntryOutcome::Skipped(SkipReason::ExcludedSubdirectory))
        );
    }

    #[test]
    fn emptied_subdirectory_is_pruned_in_the_same_sweep() {
        let tmp = tempfile::tempdir().unwrap();
        let sub = tmp.path().join("sub");
        fs::create_dir(&sub).unwrap();
        let only = sub.join("old.log");
        fs::write(&only, b"x").unwrap();
        backdate(&only, DAY * 10);

        let mut p = policy(tmp.path(), "*.log");
        p.remove_empty_dirs = true;
        let report = run(&live(), &p).unwrap();

        assert!(!only.exists());
        assert!(!sub.exists());
        assert!(tmp.path().exists(), "root must survive");
        assert_eq!(report.outcome_of(&sub), Some(&EntryOutcome::Deleted));
    }

    #[test]
    fn subdirectory_is_kept_without_prune_flag() {
        let tmp = tempfile::tempdir().unwrap();
        let sub = tmp.path().join("sub");
        fs::create_dir(&sub).unwrap();
        let only = sub.join("old.log");
        fs::write(&only, b"x").unwrap();
        backdate(&only, DAY * 10);

        run(&live(), &policy(tmp.path(), "*.log")).unwrap();
        assert!(!only.exists());
        assert!(sub.exists());
    }

    #[test]
    fn nested_empty_directories_go_children_first() {
        let tmp = tempfile::tempdir().unwrap();
        let deep = tmp.path().join("a/b/c");
        fs::create_dir_all(&deep).unwrap();

        let mut p = policy(tmp.path(), "");
        p.remove_empty_dirs = true;
        let report = run(&live(), &p).unwrap();

        assert!(!tmp.path().join("a").exists());
        let order: Vec<_> = report
            .entries
            .iter()
            .filter(|r| r.kind == EntryKind::Directory)
            .map(|r| r.path.strip_prefix(tmp.path()).unwrap().to_path_buf())
            .collect();
        assert_eq!(
            order,
            vec![
                PathBuf::from("a/b/c"),
                PathBuf::from("a/b"),
                PathBuf::from("a")
            ]
        );
    }

    #[test]
    fn empty_root_is_never_removed() {
        let tmp = tempfile::tempdir().unwrap();
        let mut p = policy(tmp.path(), "");
        p.remove_empty_dirs = true;
        let report = run(&live(), &p).unwrap();
        assert!(tmp.path().exists());
        assert!(report.entries.is_empty());
    }

    #[test]
    fn dry_run_prune_reports_empty_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let empty = tmp.path().join("empty");
        fs::create_dir(&empty).unwrap();

        let mut p = policy(tmp.path(), "");
        p.remove_empty_dirs = true;
        let report = run(&dry(), &p).unwrap();
        assert!(empty.exists());
        assert_eq!(report.outcome_of(&empty), Some(&EntryOutcome::WouldDelete));
    }

    #[test]
    fn secure_delete_removes_candidate() {
        let tmp = tempfile::tempdir().unwrap();
        let (old, new) = old_and_new(tmp.path());
        let mut security = live();
        security.secure_delete.enabled = true;
        security.secure_delete.passes = 3;

        let report = run(&security, &policy(tmp.path(), "*.log")).unwrap();
        assert!(!old.exists());
        assert!(new.exists());
        assert_eq!(report.deleted(), 1);
    }

    #[test]
    fn obfuscation_leaves_no_trace_of_original_name() {
        let tmp = tempfile::tempdir().unwrap();
        let (old, new) = old_and_new(tmp.path());
        let empty = tmp.path().join("drafts");
        fs::create_dir(&empty).unwrap();
        let mut security = live();
        security.secure_delete.obfuscate_filenames = true;

        let mut p = policy(tmp.path(), "*.log");
        p.remove_empty_dirs = true;
        let report = run(&security, &p).unwrap();

        assert!(!old.exists());
        assert!(!empty.exists());
        let remaining: Vec<_> = fs::read_dir(tmp.path())
            .unwrap()
            .map(|e| e.unwrap().path())
            .collect();
        assert_eq!(remaining, vec![new]);
        assert_eq!(report.deleted(), 2);
    }

    #[test]
    fn second_sweep_is_a_no_op() {
        let tmp = tempfile::tempdir().unwrap();
        let sub = tmp.path().join("sub");
        fs::create_dir(&sub).unwrap();
        let f = sub.join("old.log");
        fs::write(&f, b"x").unwrap();
        backdate(&f, DAY * 10);
        let mut p = policy(tmp.path(), "*.log");
        p.remove_empty_dirs = true;

        let first = run(&live(), &p).unwrap();
        assert_eq!(first.deleted(), 2);
        let second = run(&live(), &p).unwrap();
        assert_eq!(second.deleted(), 0);
        assert_eq!(second.failed(), 0);
    }

    #[test]
    fn bad_retention_is_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        let mut p = policy(tmp.path(), "");
        p.retention_period = "seven days".to_string();
        let err = run(&live(), &p).unwrap_err();
        assert_eq!(err.code(), "FK-2001");
    }

    #[test]
    fn missing_root_is_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        let err = run(&live(), &policy(&tmp.path().join("absent"), "")).unwrap_err();
        assert!(err.is_sweep_fatal());
        assert_eq!(err.code(), "FK-2003");
    }

    #[test]
    fn unrepresentable_cutoff_is_invalid_retention() {
        let tmp = tempfile::tempdir().unwrap();
        let mut p = policy(tmp.path(), "");
        p.retention_period = format!("{}d", u64::MAX / 86_400);
        let mut logger = ActivityLogger::discard();
        let security = live();
        let err = RetentionSweeper::new(&security, &mut logger)
            .quiet()
            .sweep_at(&p, SystemTime::UNIX_EPOCH)
            .unwrap_err();
        assert_eq!(err.code(), "FK-2001");
    }

    #[test]
    fn malformed_pattern_skips_every_file() {
        let tmp = tempfile::tempdir().unwrap();
        let (old, _new) = old_and_new(tmp.path());
        let log = tmp.path().join("activity.log");

        let mut logger = ActivityLogger::to_file(&log, Severity::Warning);
        let security = live();
        let report = RetentionSweeper::new(&security, &mut logger)
            .quiet()
            .sweep(&policy(tmp.path(), "[unterminated"))
            .unwrap();
        drop(logger);

        assert!(old.exists());
        assert_eq!(
            report.outcome_of(&old),
            Some(&EntryOutcome::Skipped(SkipReason::InvalidPattern))
        );
        let text = fs::read_to_string(&log).unwrap();
        assert!(text.contains("FK-2002"));
    }

    #[test]
    fn cutoff_boundary_is_strict() {
        let tmp = tempfile::tempdir().unwrap();
        let f = tmp.path().join("edge.log");
        fs::write(&f, b"x").unwrap();
        let now = SystemTime::now();
        let exact = now - DAY * 7;
        set_file_mtime(&f, FileTime::from_system_time(exact)).unwrap();
        let stamped = fs::metadata(&f).unwrap().modified().unwrap();

        let security = live();
        let mut logger = ActivityLogger::discard();
        let report = RetentionSweeper::new(&security, &mut logger)
            .quiet()
            .sweep_at(&policy(tmp.path(), "*.log"), stamped + DAY * 7)
            .unwrap();
        assert!(f.exists());
        assert_eq!(
            report.outcome_of(&f),
            Some(&EntryOutcome::Skipped(SkipReason::TooRecent))
        );
    }

    #[cfg(unix)]
    #[test]
    fn symlink_candidate_is_unlinked_not_overwritten() {
        let tmp = tempfile::tempdir().unwrap();
        let outside = tempfile::tempdir().unwrap();
        let target = outside.path().join("precious.log");
        fs::write(&target, b"keep me").unwrap();
        let link = tmp.path().join("link.log");
        std::os::unix::fs::symlink(&target, &link).unwrap();
        filetime::set_symlink_file_times(
            &link,
            FileTime::from_system_time(SystemTime::now() - DAY * 30),
            FileTime::from_system_time(SystemTime::now() - DAY * 30),
        )
        .unwrap();

        let mut security = live();
        security.secure_delete.enabled = true;
        security.secure_delete.passes = 2;
        run(&security, &policy(tmp.path(), "*.log")).unwrap();

        assert!(fs::symlink_metadata(&link).is_err());
        assert_eq!(fs::read(&target).unwrap(), b"keep me");
    }

    #[test]
    fn failed_rename_leaves_entry_and_sweep_continues() {
        let tmp = tempfile::tempdir().unwrap();
        // The random stem plus this extension exceeds the 255-byte name limit.
        let stubborn = tmp.path().join(format!("x.{}", "e".repeat(240)));
        let sibling = tmp.path().join("z.log");
        fs::write(&stubborn, b"a").unwrap();
        fs::write(&sibling, b"b").unwrap();
        backdate(&stubborn, DAY * 10);
        backdate(&sibling, DAY * 10);

        let mut security = live();
        security.secure_delete.obfuscate_filenames = true;
        let report = run(&security, &policy(tmp.path(), "")).unwrap();

        assert_eq!(report.failed(), 1);
        assert!(matches!(
            report.outcome_of(&stubborn),
            Some(EntryOutcome::DeletionFailed(_))
        ));
        assert!(stubborn.exists(), "entry must survive a failed rename");
        assert_eq!(report.outcome_of(&sibling), Some(&EntryOutcome::Deleted));
        assert!(!sibling.exists());
    }

    #[cfg(unix)]
    #[test]
    fn unlink_failure_is_recorded_and_siblings_still_go() {
        use std::os::unix::fs::PermissionsExt;

        if nix::unistd::Uid::effective().is_root() {
            // Directory permissions do not bind root.
            return;
        }
        let tmp = tempfile::tempdir().unwrap();
        let locked = tmp.path().join("locked");
        fs::create_dir(&locked).unwrap();
        let pinned = locked.join("old.log");
        let free = tmp.path().join("old.log");
        fs::write(&pinned, b"a").unwrap();
        fs::write(&free, b"b").unwrap();
        backdate(&pinned, DAY * 10);
        backdate(&free, DAY * 10);
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o555)).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("activity.jsonl");
        let mut logger = ActivityLogger::to_file(&log_path, Severity::Debug);
        let mut pol = policy(tmp.path(), "*.log");
        pol.remove_empty_dirs = true;
        let result = RetentionSweeper::new(&live(), &mut logger).quiet().sweep(&pol);
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
        let report = result.unwrap();

        assert_eq!(report.failed(), 1);
        assert!(matches!(
            report.outcome_of(&pinned),
            Some(EntryOutcome::DeletionFailed(_))
        ));
        assert!(pinned.exists());
        assert_eq!(report.outcome_of(&free), Some(&EntryOutcome::Deleted));
        assert_eq!(
            report.outcome_of(&locked),
            Some(&EntryOutcome::Skipped(SkipReason::NotEmpty))
        );

        drop(logger);
        let text = fs::read_to_string(&log_path).unwrap();
        assert!(text.contains("\"delete_failed\""));
        assert!(text.contains("FK-3002"));
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_root_is_swept_through_the_link() {
        let tmp = tempfile::tempdir().unwrap();
        let real = tmp.path().join("data");
        fs::create_dir(&real).unwrap();
        let (old, new) = old_and_new(&real);
        let link = tmp.path().join("logs");
        std::os::unix::fs::symlink(&real, &link).unwrap();

        let report = run(&live(), &policy(&link, "*.log")).unwrap();
        assert_eq!(report.deleted(), 1);
        assert!(!old.exists());
        assert!(new.exists());
        assert!(fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
    }
}
