//! The fixed vocabulary of buttons the dialog can show.
//!
//! Config files refer to actions by their lowercase name (`"shutdown"`,
//! `"safesuspend"`, …).  [`Action::parse`] is the only place that maps
//! those strings onto the enum.

use std::fmt;

/// Every button the dialog knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Cancel,
    Logout,
    Restart,
    Shutdown,
    Suspend,
    Hibernate,
    SafeSuspend,
    Lock,
    Switch,
}

impl Action {
    /// The default button row, in display order.
    pub const ALL: [Action; 9] = [
        Action::Cancel,
        Action::Logout,
        Action::Restart,
        Action::Shutdown,
        Action::Suspend,
        Action::Hibernate,
        Action::SafeSuspend,
        Action::Lock,
        Action::Switch,
    ];

    /// Parse a config name (case-insensitive, surrounding whitespace ignored).
    pub fn parse(s: &str) -> Option<Action> {
        let normalized = s.trim().to_ascii_lowercase();
        Action::ALL
            .into_iter()
            .find(|action| action.name() == normalized)
    }

    /// Name used in config files and theme asset file names.
    pub fn name(self) -> &'static str {
        match self {
            Action::Cancel => "cancel",
            Action::Logout => "logout",
            Action::Restart => "restart",
            Action::Shutdown => "shutdown",
            Action::Suspend => "suspend",
            Action::Hibernate => "hibernate",
            Action::SafeSuspend => "safesuspend",
            Action::Lock => "lock",
            Action::Switch => "switch",
        }
    }

    /// Text shown under the button icon.
    pub fn label(self) -> &'static str {
        match self {
            Action::Cancel => "Cancel",
            Action::Logout => "Log Out",
            Action::Restart => "Restart",
            Action::Shutdown => "Shut Down",
            Action::Suspend => "Suspend",
            Action::Hibernate => "Hibernate",
            Action::SafeSuspend => "Safe Suspend",
            Action::Lock => "Lock",
            Action::Switch => "Switch User",
        }
    }

    /// Freedesktop icon name used when the button theme has no asset.
    pub fn fallback_icon(self) -> &'static str {
        match self {
            Action::Cancel => "window-close",
            Action::Logout => "system-log-out",
            Action::Restart => "system-reboot",
            Action::Shutdown => "system-shutdown",
            Action::Suspend | Action::SafeSuspend => "system-suspend",
            Action::Hibernate => "system-hibernate",
            Action::Lock => "system-lock-screen",
            Action::Switch => "system-users",
        }
    }

    /// Whether activating this action hides the window before running
    /// anything, so the screen is clean when the machine sleeps.
    pub fn hides_window(self) -> bool {
        matches!(
            self,
            Action::Suspend | Action::Hibernate | Action::SafeSuspend
        )
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(Action::parse("Shutdown"), Some(Action::Shutdown));
        assert_eq!(Action::parse("  safesuspend "), Some(Action::SafeSuspend));
        assert_eq!(Action::parse("SWITCH"), Some(Action::Switch));
    }

    #[test]
    fn parse_rejects_unknown_names() {
        assert_eq!(Action::parse("reboot"), None);
        assert_eq!(Action::parse(""), None);
        assert_eq!(Action::parse("safe-suspend"), None);
    }

    #[test]
    fn display_matches_config_name() {
        for action in Action::ALL {
            assert_eq!(Action::parse(&action.to_string()), Some(action));
        }
    }

    #[test]
    fn only_sleep_actions_hide_the_window() {
        let hiding: Vec<Action> = Action::ALL
            .into_iter()
            .filter(|a| a.hides_window())
            .collect();
        assert_eq!(
            hiding,
            vec![Action::Suspend, Action::Hibernate, Action::SafeSuspend]
        );
    }
}
