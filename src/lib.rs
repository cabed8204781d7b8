#![forbid(unsafe_code)]

//! FileKeeper — retires files and directories that have outlived an
//! age-based retention policy.
//!
//! A run loads a [`core::config::Config`], then sweeps each configured
//! directory in two phases: files older than the cutoff are removed (or
//! reported, in dry-run mode), optionally after a multi-pass overwrite and a
//! rename to a random name; then empty directories are pruned bottom-up.
//! Every decision is appended to a JSONL activity log.
//!
//! # Library usage
//!
//! ```rust,no_run
//! use filekeeper::prelude::*;
//!
//! # fn main() -> Result<()> {
//! let config = Config::load(std::path::Path::new("/etc/filekeeper/filekeeper.yaml"))?;
//! let mut logger = ActivityLogger::from_config(&config.general.logging);
//! for policy in &config.directories {
//!     let report = RetentionSweeper::new(&config.security, &mut logger).sweep(policy)?;
//!     println!("{}: {} deleted", policy.path.display(), report.deleted());
//! }
//! # Ok(())
//! # }
//! ```

pub mod prelude;

pub mod core;
pub mod logger;
pub mod service;
pub mod sweep;
