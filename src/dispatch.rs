//! Maps window-manager and input events onto actions.
//!
//! The toolkit layer translates its own signals into [`WindowEvent`]s and
//! feeds them to [`Dispatcher::handle`].  The key type `K` is whatever the
//! toolkit uses for key symbols; the dispatcher only needs to compare them.

use crate::action::Action;
use crate::executor::{Executor, SessionState};
use crate::traits::{PowerBackend, ShellRunner};
use log::{debug, warn};
use std::cell::Cell;

/// Events the dialog reacts to.
#[derive(Debug, Clone, PartialEq)]
pub enum WindowEvent<K> {
    /// The window was closed or destroyed.
    Destroyed,
    /// A key was pressed.  Must already be lowercased by the caller.
    KeyPressed(K),
    /// The window entered or left fullscreen.
    FullscreenChanged(bool),
    /// A button was clicked.
    Clicked(Action),
}

/// Shortcut table with key names already resolved to key symbols.
#[derive(Debug, Clone, PartialEq)]
pub struct Keymap<K> {
    bindings: Vec<(K, Action)>,
}

impl<K> Default for Keymap<K> {
    fn default() -> Self {
        Self {
            bindings: Vec::new(),
        }
    }
}

impl<K: PartialEq> Keymap<K> {
    /// Resolve configured `(action, key name)` pairs with `lookup`.
    ///
    /// `lookup` should return the lowercased key symbol for a name, or
    /// `None` if the name does not denote a key; such bindings are dropped.
    pub fn resolve(shortcuts: &[(Action, String)], lookup: impl Fn(&str) -> Option<K>) -> Self {
        let bindings = shortcuts
            .iter()
            .filter_map(|(action, name)| match lookup(name) {
                Some(key) => Some((key, *action)),
                None => {
                    warn!("shortcut {:?} for {} is not a known key, ignoring", name, action);
                    None
                }
            })
            .collect();
        Self { bindings }
    }

    /// Actions bound to `key`, in config order.
    pub fn actions_for<'a>(&'a self, key: &'a K) -> impl Iterator<Item = Action> + 'a {
        self.bindings
            .iter()
            .filter(move |(k, _)| k == key)
            .map(|(_, action)| *action)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

/// Transient window flags.
#[derive(Debug, Default)]
pub struct WindowState {
    pub fullscreen: Cell<bool>,
}

/// Routes [`WindowEvent`]s to the [`Executor`].
pub struct Dispatcher<S: ShellRunner, B: PowerBackend, K> {
    executor: Executor<S, B>,
    keymap: Keymap<K>,
    window: WindowState,
}

impl<S: ShellRunner, B: PowerBackend, K: PartialEq> Dispatcher<S, B, K> {
    pub fn new(executor: Executor<S, B>, keymap: Keymap<K>) -> Self {
        Self {
            executor,
            keymap,
            window: WindowState::default(),
        }
    }

    pub fn window_state(&self) -> &WindowState {
        &self.window
    }

    pub fn state(&self) -> SessionState {
        self.executor.state()
    }

    pub fn executor(&self) -> &Executor<S, B> {
        &self.executor
    }

    /// Handle one event.  `hide` hides the window; it is only called by
    /// actions that need the screen clear.
    ///
    /// Returns the session state after the event; once it is
    /// [`SessionState::Terminated`] the caller should stop its event loop.
    pub fn handle(&self, event: WindowEvent<K>, hide: impl Fn()) -> SessionState {
        match event {
            WindowEvent::Destroyed => {
                debug!("window destroyed");
                self.executor.terminate()
            }
            WindowEvent::KeyPressed(key) => {
                let mut state = self.executor.state();
                for action in self.keymap.actions_for(&key) {
                    debug!("shortcut matched {}", action);
                    state = self.executor.activate(action, &hide);
                }
                state
            }
            WindowEvent::FullscreenChanged(fullscreen) => {
                self.window.fullscreen.set(fullscreen);
                self.executor.state()
            }
            WindowEvent::Clicked(action) => self.executor.activate(action, &hide),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Commands, Settings};
    use crate::traits::mock::{MockBackend, MockShell};

    fn lowercase(name: &str) -> Option<char> {
        let mut chars = name.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Some(c.to_ascii_lowercase()),
            _ => None,
        }
    }

    fn dispatcher(shortcuts: &[(Action, String)]) -> Dispatcher<MockShell, MockBackend, char> {
        let exec = Executor::new(Commands::default(), &Settings::default(), MockShell::default(), None);
        Dispatcher::new(exec, Keymap::resolve(shortcuts, lowercase))
    }

    fn spawned(d: &Dispatcher<MockShell, MockBackend, char>) -> Vec<String> {
        d.executor().shell().spawned.borrow().clone()
    }

    #[test]
    fn keymap_drops_unknown_keys() {
        let shortcuts = vec![
            (Action::Lock, "L".to_string()),
            (Action::Cancel, "Escape".to_string()),
        ];
        let keymap = Keymap::resolve(&shortcuts, lowercase);
        assert_eq!(keymap.len(), 1);
        assert_eq!(keymap.actions_for(&'l').collect::<Vec<_>>(), vec![Action::Lock]);
        assert_eq!(keymap.actions_for(&'x').count(), 0);
    }

    #[test]
    fn key_press_activates_bound_action() {
        let d = dispatcher(&[(Action::Lock, "k".to_string())]);
        assert_eq!(d.handle(WindowEvent::KeyPressed('k'), || {}), SessionState::Terminated);
        assert_eq!(spawned(&d), vec!["xdg-screensaver lock"]);
    }

    #[test]
    fn unbound_key_is_ignored() {
        let d = dispatcher(&[(Action::Lock, "k".to_string())]);
        assert_eq!(d.handle(WindowEvent::KeyPressed('q'), || {}), SessionState::Visible);
        assert!(spawned(&d).is_empty());
    }

    #[test]
    fn key_bound_twice_only_runs_first_action() {
        let d = dispatcher(&[
            (Action::Logout, "x".to_string()),
            (Action::Shutdown, "X".to_string()),
        ]);
        d.handle(WindowEvent::KeyPressed('x'), || {});
        assert_eq!(spawned(&d), vec!["openbox --exit"]);
    }

    #[test]
    fn destroy_terminates_without_action() {
        let d = dispatcher(&[]);
        assert_eq!(d.handle(WindowEvent::Destroyed, || {}), SessionState::Terminated);
        d.handle(WindowEvent::Clicked(Action::Shutdown), || {});
        assert!(spawned(&d).is_empty());
    }

    #[test]
    fn fullscreen_flag_is_tracked() {
        let d = dispatcher(&[]);
        assert!(!d.window_state().fullscreen.get());
        assert_eq!(d.handle(WindowEvent::FullscreenChanged(true), || {}), SessionState::Visible);
        assert!(d.window_state().fullscreen.get());
        d.handle(WindowEvent::FullscreenChanged(false), || {});
        assert!(!d.window_state().fullscreen.get());
    }

    #[test]
    fn click_hides_for_suspend() {
        let d = dispatcher(&[]);
        let hidden = Cell::new(0);
        d.handle(WindowEvent::Clicked(Action::Suspend), || hidden.set(hidden.get() + 1));
        assert_eq!(hidden.get(), 1);
        assert_eq!(d.state(), SessionState::Terminated);
    }
}
