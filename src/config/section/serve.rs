//! `[serve]` section configuration.
//!
//! Contains settings for the ephemeral render server used during a build.
//!
//! # Example
//!
//! ```toml
//! [serve]
//! interface = "127.0.0.1"     # Network interface (loopback only by default)
//! port = 3000                 # Fixed port; omit (or 0) for an OS-assigned free port
//! workers = 4                 # Request handler threads
//! ```
//!
//! A free port lets several builds run side by side. A fixed port keeps the
//! legacy behavior of always rendering on the same address.

use std::net::{IpAddr, Ipv4Addr};

use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, FieldPath};

/// Port selection for the render server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortPolicy {
    /// Let the OS pick an unused port.
    Free,
    /// Bind exactly this port.
    Fixed(u16),
}

impl PortPolicy {
    pub const fn port(self) -> u16 {
        match self {
            Self::Free => 0,
            Self::Fixed(port) => port,
        }
    }
}

/// Render server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServeConfig {
    /// Network interface to bind.
    pub interface: IpAddr,

    /// Fixed port; `None` or `0` selects a free port.
    pub port: Option<u16>,

    /// Number of request handler threads.
    pub workers: usize,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            interface: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: None,
            workers: 4,
        }
    }
}

impl ServeConfig {
    pub const FIELD_WORKERS: FieldPath = FieldPath::new("serve.workers");

    pub fn port_policy(&self) -> PortPolicy {
        match self.port {
            None | Some(0) => PortPolicy::Free,
            Some(port) => PortPolicy::Fixed(port),
        }
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.workers == 0 {
            diag.error(Self::FIELD_WORKERS, "at least one worker is required");
        }
    }
}
