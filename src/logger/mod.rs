//! Activity logging: typed sweep events written as append-only JSONL.

pub mod activity;
pub mod jsonl;
