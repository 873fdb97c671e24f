//! Application configuration.
//!
//! The configuration is an INI file with four sections.  Every section and
//! every key is optional; anything missing or malformed falls back to a
//! compiled-in default with a warning in the log.
//!
//! # Example
//!
//! ```ini
//! [settings]
//! backend = logind
//! monitor = 0
//! disable_lock_on = suspend
//!
//! [looks]
//! opacity = 70
//! bgcolor = #1d1f21
//! buttontheme = oxygen
//! buttons = cancel, logout, restart, shutdown, suspend, lock
//!
//! [shortcuts]
//! cancel = Escape
//! shutdown = S
//!
//! [commands]
//! logout = openbox --exit
//! lock = i3lock -c 000000
//! ```

use crate::action::Action;
use crate::backend::BackendKind;
use crate::color::Color;
use crate::ini::Ini;
use crate::traits::{self, PowerBackend};
use log::{debug, warn};
use std::path::Path;

/// Default backdrop opacity, in percent.
pub const DEFAULT_OPACITY: u8 = 50;
/// Default button theme name.
pub const DEFAULT_THEME: &str = "default";

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    pub settings: Settings,
    pub looks: Looks,
    /// `(action, key name)` pairs in file order.
    pub shortcuts: Vec<(Action, String)>,
    pub commands: Commands,
}

/// The `[settings]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Power-management service to use instead of shell commands.
    pub backend: Option<BackendKind>,
    /// Index of the monitor to show the dialog on.  Clamped at runtime.
    pub monitor: usize,
    /// Run the lock command before suspending.
    pub lock_on_suspend: bool,
    /// Run the lock command before hibernating.
    pub lock_on_hibernate: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            backend: None,
            monitor: 0,
            lock_on_suspend: true,
            lock_on_hibernate: true,
        }
    }
}

/// The `[looks]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct Looks {
    /// Backdrop opacity in percent (`0..=100`).
    pub opacity: u8,
    pub button_theme: String,
    pub bgcolor: Color,
    /// Requested buttons with unknown names and duplicates removed.
    ///
    /// May be empty; [`Config::buttons`] turns this into the final row.
    pub buttons: Vec<Action>,
}

impl Default for Looks {
    fn default() -> Self {
        Self {
            opacity: DEFAULT_OPACITY,
            button_theme: DEFAULT_THEME.to_string(),
            bgcolor: Color::BLACK,
            buttons: Action::ALL.to_vec(),
        }
    }
}

/// Shell command for every action that has one.
///
/// [`Commands::default`] holds the built-in commands; the `[commands]`
/// section overrides them one field at a time through [`Commands::set`].
#[derive(Debug, Clone, PartialEq)]
pub struct Commands {
    pub logout: String,
    pub restart: String,
    pub shutdown: String,
    pub suspend: String,
    pub hibernate: String,
    pub safesuspend: String,
    pub lock: String,
    pub switch: String,
}

impl Default for Commands {
    fn default() -> Self {
        Self {
            logout: "openbox --exit".into(),
            restart: "reboot".into(),
            shutdown: "shutdown -h now".into(),
            suspend: "systemctl suspend".into(),
            hibernate: "systemctl hibernate".into(),
            safesuspend: "systemctl hybrid-sleep".into(),
            lock: "xdg-screensaver lock".into(),
            switch: "dm-tool switch-to-greeter".into(),
        }
    }
}

impl Commands {
    /// The command for `action`, or `None` for [`Action::Cancel`].
    pub fn get(&self, action: Action) -> Option<&str> {
        let cmd = match action {
            Action::Cancel => return None,
            Action::Logout => &self.logout,
            Action::Restart => &self.restart,
            Action::Shutdown => &self.shutdown,
            Action::Suspend => &self.suspend,
            Action::Hibernate => &self.hibernate,
            Action::SafeSuspend => &self.safesuspend,
            Action::Lock => &self.lock,
            Action::Switch => &self.switch,
        };
        Some(cmd.as_str())
    }

    /// Override the command for `action`.  Returns `false` for
    /// [`Action::Cancel`], which has no command.
    pub fn set(&mut self, action: Action, cmdline: impl Into<String>) -> bool {
        let slot = match action {
            Action::Cancel => return false,
            Action::Logout => &mut self.logout,
            Action::Restart => &mut self.restart,
            Action::Shutdown => &mut self.shutdown,
            Action::Suspend => &mut self.suspend,
            Action::Hibernate => &mut self.hibernate,
            Action::SafeSuspend => &mut self.safesuspend,
            Action::Lock => &mut self.lock,
            Action::Switch => &mut self.switch,
        };
        *slot = cmdline.into();
        true
    }
}

/// Error from loading a configuration file.
#[derive(Debug, thiserror::Error)]
#[error("failed to read {path}: {source}")]
pub struct ConfigError {
    path: String,
    #[source]
    source: std::io::Error,
}

impl Config {
    /// Load configuration from the INI file at `path`.
    ///
    /// Only I/O errors are reported; bad values are replaced by defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError {
            path: path.display().to_string(),
            source,
        })?;
        Ok(Self::from_ini(&Ini::parse(&contents)))
    }

    /// Build a configuration from an already parsed INI document.
    pub fn from_ini(ini: &Ini) -> Self {
        let config = Self {
            settings: parse_settings(ini),
            looks: parse_looks(ini),
            shortcuts: parse_shortcuts(ini),
            commands: parse_commands(ini),
        };
        debug!("loaded config: {:?}", config);
        config
    }

    /// The final button row, taking the backend's capabilities into account.
    ///
    /// See [`resolve_buttons`].
    pub fn buttons<B: PowerBackend>(&self, backend: Option<&B>) -> Vec<Action> {
        resolve_buttons(&self.looks.buttons, backend)
    }
}

/// Drop the backend-handled actions `backend` cannot perform, and fall back
/// to [`Action::ALL`] if nothing is left.
pub fn resolve_buttons<B: PowerBackend>(requested: &[Action], backend: Option<&B>) -> Vec<Action> {
    let buttons: Vec<Action> = requested
        .iter()
        .copied()
        .filter(|&action| {
            let Some(backend) = backend else { return true };
            if !traits::handles(action) {
                return true;
            }
            match backend.supports(action) {
                Ok(true) => true,
                Ok(false) => {
                    warn!("can't {}, disabling button", action);
                    false
                }
                Err(e) => {
                    warn!("capability check for {} failed ({}), disabling button", action, e);
                    false
                }
            }
        })
        .collect();

    if buttons.is_empty() {
        warn!("no valid buttons found, resetting to defaults");
        Action::ALL.to_vec()
    } else {
        debug!("validated button list: {:?}", buttons);
        buttons
    }
}

/// Parse a comma-separated button list, dropping unknown names and
/// duplicates.  `default` (or an empty string) selects every button.
pub fn parse_button_list(list: &str) -> Vec<Action> {
    let trimmed = list.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("default") {
        return Action::ALL.to_vec();
    }

    let mut buttons = Vec::new();
    for name in trimmed.split(',').map(str::trim).filter(|n| !n.is_empty()) {
        match Action::parse(name) {
            Some(action) if buttons.contains(&action) => {
                warn!("button {} listed more than once, ignoring repeat", action);
            }
            Some(action) => buttons.push(action),
            None => warn!("button {} is not a valid button name, removing", name),
        }
    }
    buttons
}

//  Section parsers

fn parse_settings(ini: &Ini) -> Settings {
    let mut settings = Settings::default();

    if let Some(name) = ini.get("settings", "backend") {
        settings.backend = BackendKind::from_config(name);
    }

    if let Some(raw) = ini.get("settings", "monitor") {
        match raw.parse::<usize>() {
            Ok(monitor) => settings.monitor = monitor,
            Err(_) => warn!("monitor {:?} is not a valid monitor index, using 0", raw),
        }
    }

    if let Some(raw) = ini.get("settings", "disable_lock_on") {
        let disabled: Vec<String> = raw
            .split(',')
            .map(|s| s.trim().to_ascii_lowercase())
            .filter(|s| !s.is_empty())
            .collect();
        for name in &disabled {
            if name != "suspend" && name != "hibernate" {
                warn!("disable_lock_on: unknown action {:?}", name);
            }
        }
        settings.lock_on_suspend = !disabled.iter().any(|s| s == "suspend");
        settings.lock_on_hibernate = !disabled.iter().any(|s| s == "hibernate");
    }

    settings
}

fn parse_looks(ini: &Ini) -> Looks {
    let mut looks = Looks::default();

    if let Some(raw) = ini.get("looks", "opacity") {
        match raw.parse::<i64>() {
            Ok(value) if (0..=100).contains(&value) => looks.opacity = value as u8,
            Ok(value) => {
                let clamped = value.clamp(0, 100) as u8;
                warn!("opacity {} out of range, clamping to {}", value, clamped);
                looks.opacity = clamped;
            }
            Err(_) => warn!(
                "opacity {:?} is not a number, using {}",
                raw, DEFAULT_OPACITY
            ),
        }
    }

    if let Some(theme) = ini.get("looks", "buttontheme").filter(|t| !t.is_empty()) {
        looks.button_theme = theme.to_string();
    }

    if let Some(raw) = ini.get("looks", "bgcolor") {
        match Color::parse(raw) {
            Ok(color) => {
                debug!("background color {}", color);
                looks.bgcolor = color;
            }
            Err(_) => warn!("color {} is not a valid color, defaulting to black", raw),
        }
    }

    if let Some(list) = ini.get("looks", "buttons") {
        looks.buttons = parse_button_list(list);
    }

    looks
}

fn parse_shortcuts(ini: &Ini) -> Vec<(Action, String)> {
    ini.items("shortcuts")
        .iter()
        .filter_map(|(name, key)| {
            let Some(action) = Action::parse(name) else {
                warn!("shortcut for unknown button {:?}, ignoring", name);
                return None;
            };
            if key.is_empty() {
                warn!("shortcut for {} has no key, ignoring", action);
                return None;
            }
            debug!("shortcut: {} -> {}", action, key);
            Some((action, key.clone()))
        })
        .collect()
}

fn parse_commands(ini: &Ini) -> Commands {
    let mut commands = Commands::default();
    for (name, cmdline) in ini.items("commands") {
        match Action::parse(name) {
            Some(action) if commands.set(action, cmdline.as_str()) => {
                debug!("command for {} set to {:?}", action, cmdline);
            }
            _ => warn!("no command can be set for {:?}, ignoring", name),
        }
    }
    commands
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::mock::MockBackend;
    use std::io::Write;

    fn parse(text: &str) -> Config {
        Config::from_ini(&Ini::parse(text))
    }

    #[test]
    fn empty_config_uses_defaults() {
        let cfg = parse("");
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.looks.opacity, 50);
        assert_eq!(cfg.looks.button_theme, "default");
        assert_eq!(cfg.looks.bgcolor, Color::BLACK);
        assert_eq!(cfg.settings.monitor, 0);
        assert!(cfg.settings.lock_on_suspend);
        assert!(cfg.settings.lock_on_hibernate);
        assert_eq!(cfg.settings.backend, None);
        assert!(cfg.shortcuts.is_empty());
    }

    #[test]
    fn full_config() {
        let cfg = parse(
            "[settings]\nbackend = logind\nmonitor = 2\ndisable_lock_on = hibernate\n\
             [looks]\nopacity = 80\nbuttontheme = oxygen\nbgcolor = #102030\n\
             buttons = logout, shutdown\n\
             [shortcuts]\ncancel = Escape\nshutdown = S\n\
             [commands]\nlock = i3lock\n",
        );
        assert_eq!(cfg.settings.backend, Some(BackendKind::Logind));
        assert_eq!(cfg.settings.monitor, 2);
        assert!(cfg.settings.lock_on_suspend);
        assert!(!cfg.settings.lock_on_hibernate);
        assert_eq!(cfg.looks.opacity, 80);
        assert_eq!(cfg.looks.button_theme, "oxygen");
        assert_eq!(cfg.looks.bgcolor, Color::rgb(0x10, 0x20, 0x30));
        assert_eq!(cfg.looks.buttons, vec![Action::Logout, Action::Shutdown]);
        assert_eq!(
            cfg.shortcuts,
            vec![
                (Action::Cancel, "Escape".to_string()),
                (Action::Shutdown, "S".to_string())
            ]
        );
        assert_eq!(cfg.commands.lock, "i3lock");
        assert_eq!(cfg.commands.shutdown, Commands::default().shutdown);
    }

    #[test]
    fn bogus_color_falls_back_to_black() {
        let cfg = parse("[looks]\nbgcolor = definitely-not-a-color\n");
        assert_eq!(cfg.looks.bgcolor, Color::BLACK);
    }

    #[test]
    fn css_color_names_and_rgba_are_accepted() {
        let cfg = parse("[looks]\nbgcolor = darkslategray\n");
        assert_eq!(cfg.looks.bgcolor, Color::rgb(47, 79, 79));
        let cfg = parse("[looks]\nbgcolor = rgba(0, 0, 0, 0.8)\n");
        assert_eq!(cfg.looks.bgcolor, Color::BLACK);
    }

    #[test]
    fn indented_keys_are_read_separately() {
        let cfg = parse("[looks]\n  opacity = 70\n  buttons = cancel, lock\n");
        assert_eq!(cfg.looks.opacity, 70);
        assert_eq!(cfg.looks.buttons, vec![Action::Cancel, Action::Lock]);
    }

    #[test]
    fn opacity_is_clamped_or_defaulted() {
        assert_eq!(parse("[looks]\nopacity = 250\n").looks.opacity, 100);
        assert_eq!(parse("[looks]\nopacity = -4\n").looks.opacity, 0);
        assert_eq!(parse("[looks]\nopacity = lots\n").looks.opacity, DEFAULT_OPACITY);
    }

    #[test]
    fn bad_monitor_defaults_to_zero() {
        assert_eq!(parse("[settings]\nmonitor = -1\n").settings.monitor, 0);
        assert_eq!(parse("[settings]\nmonitor = left\n").settings.monitor, 0);
    }

    #[test]
    fn disable_lock_on_both() {
        let cfg = parse("[settings]\ndisable_lock_on = Suspend , hibernate\n");
        assert!(!cfg.settings.lock_on_suspend);
        assert!(!cfg.settings.lock_on_hibernate);
    }

    #[test]
    fn disable_lock_on_suspend_only() {
        let cfg = parse("[settings]\ndisable_lock_on = suspend\n");
        assert!(!cfg.settings.lock_on_suspend);
        assert!(cfg.settings.lock_on_hibernate);
    }

    #[test]
    fn unknown_backend_is_ignored() {
        assert_eq!(parse("[settings]\nbackend = HAL\n").settings.backend, None);
        assert_eq!(parse("[settings]\nbackend = upower\n").settings.backend, None);
        assert_eq!(
            parse("[settings]\nbackend = ConsoleKit\n").settings.backend,
            Some(BackendKind::ConsoleKit)
        );
    }

    #[test]
    fn button_list_drops_unknown_and_duplicates() {
        assert_eq!(
            parse_button_list("cancel, frobnicate, Logout, cancel,,lock"),
            vec![Action::Cancel, Action::Logout, Action::Lock]
        );
    }

    #[test]
    fn button_list_default_keyword() {
        assert_eq!(parse_button_list("default"), Action::ALL.to_vec());
        assert_eq!(parse_button_list(""), Action::ALL.to_vec());
    }

    #[test]
    fn all_invalid_buttons_reset_to_defaults() {
        let cfg = parse("[looks]\nbuttons = foo, bar\n");
        assert!(cfg.looks.buttons.is_empty());
        assert_eq!(cfg.buttons(None::<&MockBackend>), Action::ALL.to_vec());
    }

    #[test]
    fn empty_button_list_resets_to_defaults() {
        assert_eq!(resolve_buttons(&[], None::<&MockBackend>), Action::ALL.to_vec());
    }

    #[test]
    fn backend_drops_unsupported_buttons() {
        let backend = MockBackend {
            unsupported: vec![Action::Hibernate],
            failing: vec![Action::SafeSuspend],
            ..Default::default()
        };
        let buttons = resolve_buttons(&Action::ALL, Some(&backend));
        assert_eq!(
            buttons,
            vec![
                Action::Cancel,
                Action::Logout,
                Action::Restart,
                Action::Shutdown,
                Action::Suspend,
                Action::Lock,
                Action::Switch,
            ]
        );
        // Only power actions are asked about.
        assert_eq!(backend.queried.borrow().len(), 5);
    }

    #[test]
    fn backend_rejecting_everything_resets_to_defaults() {
        let backend = MockBackend {
            unsupported: vec![Action::Suspend, Action::Hibernate],
            ..Default::default()
        };
        let buttons = resolve_buttons(&[Action::Suspend, Action::Hibernate], Some(&backend));
        assert_eq!(buttons, Action::ALL.to_vec());
    }

    #[test]
    fn command_override_replaces_default() {
        let cfg = parse("[commands]\nshutdown = poweroff --force\ncancel = echo\nbogus = x\n");
        assert_eq!(cfg.commands.get(Action::Shutdown), Some("poweroff --force"));
        assert_eq!(cfg.commands.get(Action::Cancel), None);
        assert_eq!(cfg.commands.restart, "reboot");
    }

    #[test]
    fn shortcuts_for_unknown_buttons_are_dropped() {
        let cfg = parse("[shortcuts]\nfly = F\nlock = \nlogout = L\n");
        assert_eq!(cfg.shortcuts, vec![(Action::Logout, "L".to_string())]);
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[looks]\nopacity = 30").unwrap();
        let cfg = Config::load(file.path()).unwrap();
        assert_eq!(cfg.looks.opacity, 30);
    }

    #[test]
    fn load_missing_file_is_an_error() {
        let err = Config::load(Path::new("/nonexistent/boxlogout.conf")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/boxlogout.conf"));
    }
}
