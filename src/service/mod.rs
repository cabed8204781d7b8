//! Service-manager integration.

pub mod systemd;
