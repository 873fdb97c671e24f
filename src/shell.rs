//! [`ShellRunner`] that hands command lines to `/bin/sh`.
//!
//! Command strings come straight from the config file and are passed to
//! the shell unescaped, so whoever can write the config can run anything
//! as the session user.

use crate::traits::ShellRunner;
use log::debug;
use std::process::{Command, Stdio};

/// Spawns `sh -c <cmdline>` and forgets about the child.
#[derive(Debug, Clone)]
pub struct SystemShell {
    shell: String,
}

/// Errors that can occur when starting a command.
#[derive(Debug, thiserror::Error)]
pub enum ShellError {
    #[error("empty command")]
    Empty,
    #[error("failed to spawn {cmdline:?}: {source}")]
    Spawn {
        cmdline: String,
        #[source]
        source: std::io::Error,
    },
}

impl Default for SystemShell {
    fn default() -> Self {
        Self::new("/bin/sh")
    }
}

impl SystemShell {
    /// Use `shell` (invoked as `<shell> -c <cmdline>`) to run commands.
    pub fn new(shell: impl Into<String>) -> Self {
        Self {
            shell: shell.into(),
        }
    }
}

impl ShellRunner for SystemShell {
    type Error = ShellError;

    fn spawn(&self, cmdline: &str) -> Result<(), ShellError> {
        if cmdline.trim().is_empty() {
            return Err(ShellError::Empty);
        }
        debug!("executing command: {}", cmdline);
        Command::new(&self.shell)
            .arg("-c")
            .arg(cmdline)
            .stdin(Stdio::null())
            .spawn()
            .map(drop)
            .map_err(|source| ShellError::Spawn {
                cmdline: cmdline.to_string(),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_command_is_rejected() {
        let shell = SystemShell::default();
        assert!(matches!(shell.spawn(""), Err(ShellError::Empty)));
        assert!(matches!(shell.spawn("   "), Err(ShellError::Empty)));
    }

    #[test]
    fn missing_shell_reports_spawn_error() {
        let shell = SystemShell::new("/nonexistent/shell");
        let err = shell.spawn("true").unwrap_err();
        assert!(matches!(err, ShellError::Spawn { .. }));
        assert!(err.to_string().contains("\"true\""));
    }

    #[test]
    fn runs_through_sh() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("ran");
        let shell = SystemShell::default();
        shell
            .spawn(&format!("touch '{}'", marker.display()))
            .unwrap();

        // The child is not awaited; poll briefly for its side effect.
        for _ in 0..200 {
            if marker.exists() {
                break;
            }
            std::thread::sleep(std::time::Duration::from_millis(10));
        }
        assert!(marker.exists());
    }
}
