//! Core traits that decouple the dialog from the operating system.
//!
//! The [`Executor`](crate::executor::Executor) only talks to these
//! abstractions: it never spawns a process or opens a bus connection
//! itself.  Concrete implementations live in [`shell`](crate::shell) and
//! [`backend`](crate::backend); tests use recording doubles.

use crate::action::Action;

/// Something that can run a user-configured shell command line.
pub trait ShellRunner {
    /// The error type produced when a command cannot be started.
    type Error: std::error::Error + 'static;

    /// Start `cmdline` and return without waiting for it.
    ///
    /// The exit status is never observed.
    fn spawn(&self, cmdline: &str) -> Result<(), Self::Error>;
}

/// A system power-management service (logind, ConsoleKit, …).
///
/// Only [`Action::Restart`], [`Action::Shutdown`], [`Action::Suspend`],
/// [`Action::Hibernate`] and [`Action::SafeSuspend`] are routed through a
/// backend; see [`handles`].
pub trait PowerBackend {
    /// The error type produced by this backend.
    type Error: std::error::Error + 'static;

    /// Ask the service whether `action` may be performed right now.
    fn supports(&self, action: Action) -> Result<bool, Self::Error>;

    /// Perform `action`.  Called at most once per process.
    fn invoke(&self, action: Action) -> Result<(), Self::Error>;
}

/// Whether `action` goes through a [`PowerBackend`] when one is configured.
pub fn handles(action: Action) -> bool {
    matches!(
        action,
        Action::Restart
            | Action::Shutdown
            | Action::Suspend
            | Action::Hibernate
            | Action::SafeSuspend
    )
}


#[cfg(test)]
mod tests {
    use super::mock::*;
    use super::*;

    #[test]
    fn backend_handles_only_power_actions() {
        let routed: Vec<Action> = Action::ALL.into_iter().filter(|a| handles(*a)).collect();
        assert_eq!(
            routed,
            vec![
                Action::Restart,
                Action::Shutdown,
                Action::Suspend,
                Action::Hibernate,
                Action::SafeSuspend,
            ]
        );
    }

    #[test]
    fn mock_shell_records_spawns() {
        let shell = MockShell::default();
        shell.spawn("reboot").unwrap();
        assert_eq!(*shell.spawned.borrow(), vec!["reboot".to_string()]);
    }

    #[test]
    fn mock_backend_reports_unsupported() {
        let backend = MockBackend {
            unsupported: vec![Action::Hibernate],
            ..Default::default()
        };
        assert!(backend.supports(Action::Suspend).unwrap());
        assert!(!backend.supports(Action::Hibernate).unwrap());
        assert_eq!(backend.queried.borrow().len(), 2);
    }
}
