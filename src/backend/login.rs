//! [`PowerBackend`] implementation backed by a login manager on the system
//! bus.
//!
//! systemd-logind and ConsoleKit2 expose the same manager API:
//! `CanPowerOff`, `CanReboot`, `CanSuspend`, `CanHibernate` and
//! `CanHybridSleep` return `"yes"`, `"no"`, `"challenge"` or `"na"`, and
//! the matching method performs the action.  Both are driven through one
//! proxy definition whose destination, path and interface are chosen by
//! [`BackendKind`].

use super::BackendKind;
use crate::action::Action;
use crate::traits::PowerBackend;
use log::{debug, info};
use zbus::blocking::Connection;
use zbus::proxy;

#[proxy(
    interface = "org.freedesktop.login1.Manager",
    default_service = "org.freedesktop.login1",
    default_path = "/org/freedesktop/login1"
)]
trait Manager {
    fn can_power_off(&self) -> zbus::Result<String>;
    fn can_reboot(&self) -> zbus::Result<String>;
    fn can_suspend(&self) -> zbus::Result<String>;
    fn can_hibernate(&self) -> zbus::Result<String>;
    fn can_hybrid_sleep(&self) -> zbus::Result<String>;

    fn power_off(&self, interactive: bool) -> zbus::Result<()>;
    fn reboot(&self, interactive: bool) -> zbus::Result<()>;
    fn suspend(&self, interactive: bool) -> zbus::Result<()>;
    fn hibernate(&self, interactive: bool) -> zbus::Result<()>;
    fn hybrid_sleep(&self, interactive: bool) -> zbus::Result<()>;
}

/// Errors that can occur when talking to the login manager.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("D-Bus error: {0}")]
    Bus(#[from] zbus::Error),
    #[error("{0} is not handled by the power backend")]
    Unhandled(Action),
}

/// Login-manager-backed power backend.
pub struct LoginBackend {
    kind: BackendKind,
    manager: ManagerProxyBlocking<'static>,
}

impl LoginBackend {
    /// Connect to the system bus and make sure the service answers.
    ///
    /// Any failure here means the caller should fall back to shell
    /// commands.
    pub fn connect(kind: BackendKind) -> Result<Self, BackendError> {
        let connection = Connection::system()?;
        let manager = ManagerProxyBlocking::builder(&connection)
            .destination(kind.destination())?
            .path(kind.path())?
            .interface(kind.interface())?
            .build()?;

        // Probe once so a missing service is detected at startup rather
        // than when a button is clicked.
        let probe = manager.can_power_off()?;
        info!("{:?} backend available (CanPowerOff = {})", kind, probe);

        Ok(Self { kind, manager })
    }

    pub fn kind(&self) -> BackendKind {
        self.kind
    }
}

/// Whether a `Can*` answer allows the action.  `"challenge"` means the
/// user will be asked to authenticate, which is still possible.
fn capability_allows(answer: &str) -> bool {
    matches!(answer, "yes" | "challenge")
}

impl PowerBackend for LoginBackend {
    type Error = BackendError;

    fn supports(&self, action: Action) -> Result<bool, BackendError> {
        let answer = match action {
            Action::Shutdown => self.manager.can_power_off()?,
            Action::Restart => self.manager.can_reboot()?,
            Action::Suspend => self.manager.can_suspend()?,
            Action::Hibernate => self.manager.can_hibernate()?,
            Action::SafeSuspend => self.manager.can_hybrid_sleep()?,
            other => return Err(BackendError::Unhandled(other)),
        };
        debug!("{:?}: can {} = {}", self.kind, action, answer);
        Ok(capability_allows(&answer))
    }

    fn invoke(&self, action: Action) -> Result<(), BackendError> {
        info!("{:?}: requesting {}", self.kind, action);
        match action {
            Action::Shutdown => self.manager.power_off(true)?,
            Action::Restart => self.manager.reboot(true)?,
            Action::Suspend => self.manager.suspend(true)?,
            Action::Hibernate => self.manager.hibernate(true)?,
            Action::SafeSuspend => self.manager.hybrid_sleep(true)?,
            other => return Err(BackendError::Unhandled(other)),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capability_answers() {
        assert!(capability_allows("yes"));
        assert!(capability_allows("challenge"));
        assert!(!capability_allows("no"));
        assert!(!capability_allows("na"));
        assert!(!capability_allows(""));
    }

    #[test]
    fn unhandled_error_names_the_action() {
        let err = BackendError::Unhandled(Action::Lock);
        assert_eq!(err.to_string(), "lock is not handled by the power backend");
    }
}
