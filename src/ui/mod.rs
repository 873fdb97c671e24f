//! Toolkit front-end.
//!
//! When the `ui-gtk` feature is enabled, [`gtk::run_main_loop`] builds the
//! dialog window and runs the GLib main loop on the calling thread, and
//! [`capture`] grabs the screen for the fade backdrop on X11.

#[cfg(feature = "ui-gtk")]
pub mod capture;
#[cfg(feature = "ui-gtk")]
pub mod gtk;
