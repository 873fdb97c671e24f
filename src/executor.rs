//! Turns a button activation into shell commands or backend calls.
//!
//! The dialog has exactly two states, [`SessionState::Visible`] and
//! [`SessionState::Terminated`].  The first activation performs its action
//! and moves to `Terminated`; every later activation is ignored.  Nothing
//! that happens while performing an action is retried or reported back to
//! the user; failures only reach the log.

use crate::action::Action;
use crate::config::{Commands, Settings};
use crate::traits::{self, PowerBackend, ShellRunner};
use log::{debug, error, info, warn};
use std::cell::Cell;

/// Lifecycle of the dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// The window is up and waiting for input.
    Visible,
    /// An action ran (or the window was closed); the event loop should end.
    Terminated,
}

/// Performs actions through a [`ShellRunner`] and an optional
/// [`PowerBackend`].
pub struct Executor<S: ShellRunner, B: PowerBackend> {
    commands: Commands,
    lock_on_suspend: bool,
    lock_on_hibernate: bool,
    shell: S,
    backend: Option<B>,
    state: Cell<SessionState>,
}

impl<S: ShellRunner, B: PowerBackend> Executor<S, B> {
    pub fn new(commands: Commands, settings: &Settings, shell: S, backend: Option<B>) -> Self {
        Self {
            commands,
            lock_on_suspend: settings.lock_on_suspend,
            lock_on_hibernate: settings.lock_on_hibernate,
            shell,
            backend,
            state: Cell::new(SessionState::Visible),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state.get()
    }

    pub fn shell(&self) -> &S {
        &self.shell
    }

    pub fn backend(&self) -> Option<&B> {
        self.backend.as_ref()
    }

    /// End the session without performing any action (window closed).
    pub fn terminate(&self) -> SessionState {
        self.state.set(SessionState::Terminated);
        SessionState::Terminated
    }

    /// Perform `action`.
    ///
    /// `hide` is called before anything runs for the sleep actions
    /// (suspend, hibernate, safesuspend) so the dialog is gone when the
    /// machine wakes up again.
    pub fn activate(&self, action: Action, hide: impl FnOnce()) -> SessionState {
        if self.state.get() == SessionState::Terminated {
            debug!("ignoring {}: session already terminated", action);
            return SessionState::Terminated;
        }
        self.state.set(SessionState::Terminated);
        info!("activated {}", action);

        if action.hides_window() {
            hide();
        }

        match action {
            Action::Cancel => {}
            Action::Logout | Action::Lock | Action::Switch => self.run_command(action),
            Action::Restart | Action::Shutdown | Action::SafeSuspend => self.run_power(action),
            Action::Suspend => {
                if self.lock_on_suspend {
                    self.run_command(Action::Lock);
                }
                self.run_power(action);
            }
            Action::Hibernate => {
                if self.lock_on_hibernate {
                    self.run_command(Action::Lock);
                }
                self.run_power(action);
            }
        }

        SessionState::Terminated
    }

    /// Route a power action to the backend if there is one, else to its
    /// shell command.
    fn run_power(&self, action: Action) {
        match &self.backend {
            Some(backend) if traits::handles(action) => {
                if let Err(e) = backend.invoke(action) {
                    error!("backend failed to {}: {}", action, e);
                }
            }
            _ => self.run_command(action),
        }
    }

    fn run_command(&self, action: Action) {
        let Some(cmdline) = self.commands.get(action) else {
            return;
        };
        if cmdline.trim().is_empty() {
            warn!("no command configured for {}", action);
            return;
        }
        if let Err(e) = self.shell.spawn(cmdline) {
            error!("failed to run command for {}: {}", action, e);
        }
    }
}
