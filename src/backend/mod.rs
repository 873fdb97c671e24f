//! Power-management services reachable over the system D-Bus.
//!
//! This module provides the concrete [`PowerBackend`](crate::traits::PowerBackend)
//! implementation.  Nothing outside this module should reference logind or
//! ConsoleKit directly.

pub mod login;

use log::warn;

/// Which session manager to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// systemd-logind (`org.freedesktop.login1`).
    Logind,
    /// ConsoleKit2 (`org.freedesktop.ConsoleKit`).
    ConsoleKit,
}

impl BackendKind {
    /// Interpret the `backend` setting.  Unknown or unsupported names are
    /// logged and yield `None`, which means "use shell commands".
    pub fn from_config(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "" | "none" => None,
            "logind" | "systemd" => Some(BackendKind::Logind),
            "consolekit" => Some(BackendKind::ConsoleKit),
            "hal" => {
                warn!("the HAL backend is no longer supported, using shell commands");
                None
            }
            other => {
                warn!("unknown backend {:?}, using shell commands", other);
                None
            }
        }
    }

    /// Well-known bus name of the service.
    pub fn destination(self) -> &'static str {
        match self {
            BackendKind::Logind => "org.freedesktop.login1",
            BackendKind::ConsoleKit => "org.freedesktop.ConsoleKit",
        }
    }

    /// Object path of the manager object.
    pub fn path(self) -> &'static str {
        match self {
            BackendKind::Logind => "/org/freedesktop/login1",
            BackendKind::ConsoleKit => "/org/freedesktop/ConsoleKit/Manager",
        }
    }

    /// Interface exposing the `Can*` queries and power methods.
    pub fn interface(self) -> &'static str {
        match self {
            BackendKind::Logind => "org.freedesktop.login1.Manager",
            BackendKind::ConsoleKit => "org.freedesktop.ConsoleKit.Manager",
        }
    }
}
