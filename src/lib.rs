//! **boxlogout**: a logout and power menu for lightweight window-manager
//! sessions.
//!
//! On launch the dialog reads an INI config, covers one monitor with a
//! translucent (or, without a compositor, faded-screenshot) backdrop and
//! shows a row of icon buttons.  Clicking one runs a shell command or asks
//! the system login manager to power off, reboot or sleep, then exits.
//!
//! # Architecture
//!
//! The crate is organised around two core traits:
//!
//! * [`traits::ShellRunner`]: starts user-configured command lines.
//! * [`traits::PowerBackend`]: asks a power-management service what it can
//!   do and tells it to do it.
//!
//! [`executor::Executor`] and [`dispatch::Dispatcher`] only depend on
//! these abstractions.  Concrete implementations live in [`shell`]
//! (`/bin/sh`) and [`backend`] (logind / ConsoleKit over D-Bus); the GTK4
//! window lives in [`ui`].

pub mod action;
pub mod backdrop;
pub mod backend;
pub mod color;
pub mod config;
pub mod dispatch;
pub mod executor;
pub mod ini;
pub mod shell;
pub mod theme;
pub mod traits;
pub mod ui;
