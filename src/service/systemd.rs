//! systemd oneshot service + daily timer generation and installation.
//!
//! Scheduling is left to systemd: the timer fires daily and the service runs a
//! single sweep over the configured policies, then exits.

#![allow(missing_docs)]

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::errors::{FkError, Result};

/// Unit name for the oneshot service.
pub const SERVICE_UNIT_NAME: &str = "filekeeper.service";
/// Unit name for the daily timer.
pub const TIMER_UNIT_NAME: &str = "filekeeper.timer";

const DOCUMENTATION_URL: &str = "https://github.com/ykargin/filekeeper";
const SYSTEM_BINARY: &str = "/usr/local/bin/filekeeper";
const USER_BINARY: &str = "filekeeper";

/// Files written by [`SystemdUnits::install`] and the commands that activate them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledUnits {
    pub service_path: PathBuf,
    pub timer_path: PathBuf,
    /// Shell commands the operator runs to enable the timer.
    pub activation_commands: Vec<String>,
}

/// Generator for the service/timer pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SystemdUnits {
    /// Whether the units target the per-user manager (`systemctl --user`).
    pub user_scope: bool,
}

impl SystemdUnits {
    #[must_use]
    pub const fn new(user_scope: bool) -> Self {
        Self { user_scope }
    }

    /// Generate the `filekeeper.service` content.
    #[must_use]
    pub fn service_file(&self) -> String {
        let mut unit = String::with_capacity(512);

        writeln!(unit, "[Unit]").ok();
        writeln!(
            unit,
            "Description=FileKeeper - Scheduled file cleanup based on retention policy"
        )
        .ok();
        writeln!(unit, "Documentation={DOCUMENTATION_URL}").ok();
        writeln!(unit).ok();

        writeln!(unit, "[Service]").ok();
        writeln!(unit, "Type=oneshot").ok();
        if self.user_scope {
            writeln!(unit, "ExecStart={USER_BINARY}").ok();
        } else {
            writeln!(unit, "ExecStart={SYSTEM_BINARY}").ok();
            writeln!(unit).ok();
            writeln!(unit, "# Security settings - adjust as needed").ok();
            writeln!(unit, "ProtectSystem=strict").ok();
            writeln!(unit, "ProtectHome=read-only").ok();
            writeln!(unit, "PrivateTmp=true").ok();
            writeln!(unit, "NoNewPrivileges=true").ok();
        }
        writeln!(unit).ok();

        writeln!(unit, "[Install]").ok();
        if self.user_scope {
            writeln!(unit, "WantedBy=default.target").ok();
        } else {
            writeln!(unit, "WantedBy=multi-user.target").ok();
        }

        unit
    }

    /// Generate the `filekeeper.timer` content. Identical for both scopes.
    #[must_use]
    pub fn timer_file(&self) -> String {
        let mut unit = String::with_capacity(256);

        writeln!(unit, "[Unit]").ok();
        writeln!(unit, "Description=Run FileKeeper daily to clean up old files").ok();
        writeln!(unit, "Documentation={DOCUMENTATION_URL}").ok();
        writeln!(unit).ok();

        writeln!(unit, "[Timer]").ok();
        writeln!(unit, "OnCalendar=daily").ok();
        writeln!(unit, "Persistent=true").ok();
        writeln!(unit, "RandomizedDelaySec=1hour").ok();
        writeln!(unit).ok();

        writeln!(unit, "[Install]").ok();
        writeln!(unit, "WantedBy=timers.target").ok();

        unit
    }

    /// `systemctl` invocations that load and start the timer.
    #[must_use]
    pub fn activation_commands(&self) -> Vec<String> {
        let prefix = if self.user_scope {
            "systemctl --user"
        } else {
            "systemctl"
        };
        vec![
            format!("{prefix} daemon-reload"),
            format!("{prefix} enable --now {TIMER_UNIT_NAME}"),
        ]
    }

    /// Write both unit files into `dir`, creating it if needed.
    ///
    /// Does not run `systemctl`; the returned commands are for the operator.
    pub fn install(&self, dir: &Path) -> Result<InstalledUnits> {
        fs::create_dir_all(dir).map_err(|e| FkError::io(dir, e))?;

        let service_path = dir.join(SERVICE_UNIT_NAME);
        fs::write(&service_path, self.service_file())
            .map_err(|e| FkError::io(&service_path, e))?;

        let timer_path = dir.join(TIMER_UNIT_NAME);
        fs::write(&timer_path, self.timer_file()).map_err(|e| FkError::io(&timer_path, e))?;

        Ok(InstalledUnits {
            service_path,
            timer_path,
            activation_commands: self.activation_commands(),
        })
    }
}

/// Printable templates for `--systemd-template-only` (system-scope variants).
#[must_use]
pub fn render_templates() -> String {
    let units = SystemdUnits::new(false);
    let mut out = String::with_capacity(1024);
    writeln!(out, "# FileKeeper Service File ({SERVICE_UNIT_NAME})").ok();
    writeln!(
        out,
        "# Save to /etc/systemd/system/ (for system-wide) or ~/.config/systemd/user/ (for user)"
    )
    .ok();
    writeln!(out).ok();
    out.push_str(&units.service_file());
    writeln!(out).ok();
    writeln!(out, "# FileKeeper Timer File ({TIMER_UNIT_NAME})").ok();
    writeln!(
        out,
        "# Save to /etc/systemd/system/ (for system-wide) or ~/.config/systemd/user/ (for user)"
    )
    .ok();
    writeln!(out).ok();
    out.push_str(&units.timer_file());
    out
}
