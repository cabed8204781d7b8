//! Convenience re-exports for library consumers.
//!
//! ```rust,no_run
//! use filekeeper::prelude::*;
//! ```

// Core
pub use crate::core::config::{Config, DirectoryPolicy, SecurityPolicy};
pub use crate::core::context::RunContext;
pub use crate::core::errors::{FkError, Result};

// Logger
pub use crate::logger::activity::{ActivityEvent, ActivityLogger, EntryKind};
pub use crate::logger::jsonl::Severity;

// Sweep
pub use crate::sweep::duration::parse_retention_period;
pub use crate::sweep::sweeper::{EntryOutcome, RetentionSweeper, SkipReason, SweepReport};

// Service
pub use crate::service::systemd::SystemdUnits;
