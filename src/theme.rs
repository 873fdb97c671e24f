//! Button theme lookup.
//!
//! A theme is a directory of per-button icons named after the action
//! (`shutdown.svg`, `lock.png`, …).  The user's `~/.themes` is searched
//! before the system prefix.

use crate::action::Action;
use log::{info, warn};
use std::path::{Path, PathBuf};

/// Theme used when the configured one cannot be found.
pub const FALLBACK_THEME: &str = "foom";

/// Subdirectory of a theme that holds our icons.
const THEME_SUBDIR: &str = "boxlogout";

/// System-wide theme prefix.
pub const SYSTEM_PREFIX: &str = "/usr/share/themes";

/// Theme prefix used with `--local`, relative to the working directory.
pub const LOCAL_PREFIX: &str = "./data/themes";

/// Where to look for themes.
#[derive(Debug, Clone, PartialEq)]
pub struct ThemeDirs {
    /// `~/.themes`, if a home directory is known.
    pub user: Option<PathBuf>,
    /// System (or local) prefix.
    pub prefix: PathBuf,
}

impl ThemeDirs {
    /// Search `$HOME/.themes` and then `prefix`.
    pub fn new(prefix: impl Into<PathBuf>) -> Self {
        Self {
            user: std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".themes")),
            prefix: prefix.into(),
        }
    }

    /// Resolve the icon directory for `theme`.
    ///
    /// A user theme wins if it exists.  Otherwise the prefix is used; if
    /// the theme is not there either, [`FALLBACK_THEME`] is used instead.
    pub fn resolve(&self, theme: &str) -> PathBuf {
        if let Some(user) = &self.user {
            let dir = user.join(theme).join(THEME_SUBDIR);
            if dir.is_dir() {
                info!("using user theme at {}", dir.display());
                return dir;
            }
        }

        let dir = self.prefix.join(theme).join(THEME_SUBDIR);
        if dir.is_dir() {
            return dir;
        }

        warn!("button theme {} not found, reverting to {}", theme, FALLBACK_THEME);
        self.prefix.join(FALLBACK_THEME).join(THEME_SUBDIR)
    }
}

/// Where a button's icon comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum Icon {
    /// An image file from the theme.
    File(PathBuf),
    /// A freedesktop icon name, for themes missing the asset.
    Named(&'static str),
}

/// Icon for `action` in theme directory `dir`: SVG preferred, PNG next,
/// freedesktop icon name as last resort.
pub fn icon_for(dir: &Path, action: Action) -> Icon {
    for ext in ["svg", "png"] {
        let path = dir.join(format!("{}.{}", action.name(), ext));
        if path.is_file() {
            return Icon::File(path);
        }
    }
    warn!(
        "no icon for {} in {}, using {}",
        action,
        dir.display(),
        action.fallback_icon()
    );
    Icon::Named(action.fallback_icon())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn make_theme(root: &Path, name: &str) -> PathBuf {
        let dir = root.join(name).join(THEME_SUBDIR);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn user_theme_wins() {
        let user = tempfile::tempdir().unwrap();
        let system = tempfile::tempdir().unwrap();
        let user_dir = make_theme(user.path(), "oxygen");
        make_theme(system.path(), "oxygen");

        let dirs = ThemeDirs {
            user: Some(user.path().to_path_buf()),
            prefix: system.path().to_path_buf(),
        };
        assert_eq!(dirs.resolve("oxygen"), user_dir);
    }

    #[test]
    fn system_theme_when_no_user_theme() {
        let user = tempfile::tempdir().unwrap();
        let system = tempfile::tempdir().unwrap();
        let system_dir = make_theme(system.path(), "oxygen");

        let dirs = ThemeDirs {
            user: Some(user.path().to_path_buf()),
            prefix: system.path().to_path_buf(),
        };
        assert_eq!(dirs.resolve("oxygen"), system_dir);
    }

    #[test]
    fn missing_theme_falls_back() {
        let system = tempfile::tempdir().unwrap();
        let dirs = ThemeDirs {
            user: None,
            prefix: system.path().to_path_buf(),
        };
        assert_eq!(
            dirs.resolve("nope"),
            system.path().join(FALLBACK_THEME).join(THEME_SUBDIR)
        );
    }

    #[test]
    fn svg_preferred_over_png() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("lock.png"), b"png").unwrap();
        fs::write(dir.path().join("lock.svg"), b"<svg/>").unwrap();
        fs::write(dir.path().join("logout.png"), b"png").unwrap();

        assert_eq!(
            icon_for(dir.path(), Action::Lock),
            Icon::File(dir.path().join("lock.svg"))
        );
        assert_eq!(
            icon_for(dir.path(), Action::Logout),
            Icon::File(dir.path().join("logout.png"))
        );
    }

    #[test]
    fn missing_icon_uses_named_fallback() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(
            icon_for(dir.path(), Action::Shutdown),
            Icon::Named("system-shutdown")
        );
    }
}
