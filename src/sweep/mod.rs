//! Retention sweep engine: duration parsing, filtering, deletion, pruning.

pub mod duration;
pub mod empty;
pub mod obfuscate;
pub mod overwrite;
pub mod pattern;
pub mod sweeper;
pub mod walker;
