//! Core types: errors, configuration, run context.

pub mod config;
pub mod context;
pub mod errors;
