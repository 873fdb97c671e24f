//! Entry point for the **boxlogout** dialog.
//!
//! Loads the config, connects to the power backend if one is configured,
//! and hands everything to the GTK front-end.  When the `ui-gtk` feature
//! is disabled there is nothing to show and the binary exits with an
//! error.

use boxlogout::backend::login::LoginBackend;
use boxlogout::backend::BackendKind;
use boxlogout::config::Config;
use boxlogout::executor::Executor;
use boxlogout::shell::SystemShell;
use boxlogout::theme::{self, ThemeDirs};
use clap::Parser;
use log::{error, info, warn};
use std::path::{Path, PathBuf};

/// Logout and power menu for window-manager sessions.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Config file to use instead of the default search path.
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Load button themes from ./data/themes (for running from a checkout).
    #[arg(short, long)]
    local: bool,

    /// Directory holding system button themes.
    #[arg(long, value_name = "DIR", conflicts_with = "local")]
    theme_prefix: Option<PathBuf>,
}

/// Resolve the config directory (`$XDG_CONFIG_HOME/boxlogout`).
fn config_dir() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME").unwrap_or_else(|_| {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
        format!("{}/.config", home)
    });
    PathBuf::from(base).join("boxlogout")
}

/// First existing config file: the user's, then the system-wide one.
fn default_config_path() -> Option<PathBuf> {
    [
        config_dir().join("boxlogout.conf"),
        PathBuf::from("/etc/boxlogout.conf"),
    ]
    .into_iter()
    .find(|p| p.is_file())
}

/// Load the config from `explicit` or the default locations, falling back
/// to compiled-in defaults.
fn load_config(explicit: Option<&Path>) -> Config {
    let path = match explicit {
        Some(p) => p.to_path_buf(),
        None => match default_config_path() {
            Some(p) => p,
            None => {
                info!("no config file found, using defaults");
                return Config::default();
            }
        },
    };

    match Config::load(&path) {
        Ok(cfg) => {
            info!("loaded config from {}", path.display());
            cfg
        }
        Err(e) => {
            warn!("{}, using defaults", e);
            Config::default()
        }
    }
}

fn connect_backend(kind: Option<BackendKind>) -> Option<LoginBackend> {
    let kind = kind?;
    match LoginBackend::connect(kind) {
        Ok(backend) => {
            info!("power actions go through {:?}", backend.kind());
            Some(backend)
        }
        Err(e) => {
            warn!("{:?} backend unavailable ({}), using shell commands", kind, e);
            None
        }
    }
}

//  Main

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref());
    let backend = connect_backend(config.settings.backend);
    let buttons = config.buttons(backend.as_ref());

    let prefix = match (&cli.theme_prefix, cli.local) {
        (Some(dir), _) => dir.clone(),
        (None, true) => PathBuf::from(theme::LOCAL_PREFIX),
        (None, false) => PathBuf::from(theme::SYSTEM_PREFIX),
    };
    let theme_dir = ThemeDirs::new(prefix).resolve(&config.looks.button_theme);

    let executor = Executor::new(
        config.commands.clone(),
        &config.settings,
        SystemShell::default(),
        backend,
    );

    start_ui(executor, &config, buttons, theme_dir);
}

//  Front-end

#[cfg(feature = "ui-gtk")]
fn start_ui(
    executor: Executor<SystemShell, LoginBackend>,
    config: &Config,
    buttons: Vec<boxlogout::action::Action>,
    theme_dir: PathBuf,
) {
    use boxlogout::ui::gtk::{run_main_loop, UiOptions};

    let options = UiOptions {
        looks: config.looks.clone(),
        buttons,
        theme_dir,
        monitor: config.settings.monitor,
        shortcuts: config.shortcuts.clone(),
        css_path: Some(config_dir().join("style.css")),
    };

    if let Err(e) = run_main_loop(executor, options) {
        error!("{}", e);
        std::process::exit(1);
    }
}

#[cfg(not(feature = "ui-gtk"))]
fn start_ui(
    _executor: Executor<SystemShell, LoginBackend>,
    _config: &Config,
    _buttons: Vec<boxlogout::action::Action>,
    _theme_dir: PathBuf,
) {
    error!("boxlogout was built without the `ui-gtk` feature; nothing to show");
    std::process::exit(1);
}
