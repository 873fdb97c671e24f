//! GTK4 dialog window that runs on the **main thread**.
//!
//! # Widget tree
//!
//! ```text
//! window.boxlogout               (layer-shell overlay or fullscreen)
//! └ gtk4::Overlay.backdrop     (solid color via CSS, or…)
//!     ├ gtk4::Picture          (…the faded screenshot, no compositor)
//!     └ .button-row            (centered, horizontal)
//!         └ .action-button   × N
//!             ├ button       (icon)
//!             └ label
//! ```
//!
//! # CSS selectors
//!
//! | Selector               | Targets                                |
//! |------------------------|----------------------------------------|
//! | `window.boxlogout`     | The dialog window (keep transparent)   |
//! | `.backdrop`            | Full-monitor background                |
//! | `.button-row`          | Container holding the buttons          |
//! | `.action-button`       | One icon + label column                |
//! | `.action-<name>`       | A specific button, e.g. `.action-lock` |
//!
//! The backdrop color is generated from the config; a user stylesheet is
//! loaded on top of the built-in one.

use crate::action::Action;
use crate::backdrop::{self, Strategy};
use crate::config::Looks;
use crate::dispatch::{Dispatcher, Keymap, WindowEvent};
use crate::executor::{Executor, SessionState};
use crate::theme::{self, Icon};
use crate::traits::{PowerBackend, ShellRunner};
use crate::ui::capture::{self, Region};
use gtk4::prelude::*;
use gtk4::{gdk, glib};
use gtk4_layer_shell::{Edge, LayerShell};
use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use std::rc::Rc;

//  Layout constants

const MIN_WIDTH: i32 = 620;
const MIN_HEIGHT: i32 = 200;
const BUTTON_SPACING: i32 = 10;
const ICON_SIZE: i32 = 96;

//  Default CSS

const DEFAULT_CSS: &str = r#"
window.boxlogout,
window.boxlogout.background {
    background-color: transparent;
    background: none;
}

.button-row button {
    background: none;
    border: none;
    box-shadow: none;
    padding: 4px;
}

.button-row button:hover {
    background-color: rgba(0, 0, 0, 0.4);
}

.button-row label {
    color: white;
}
"#;

/// Everything the window needs besides the executor.
#[derive(Debug, Clone)]
pub struct UiOptions {
    pub looks: Looks,
    /// Final button row.
    pub buttons: Vec<Action>,
    /// Resolved icon directory.
    pub theme_dir: PathBuf,
    /// Requested monitor index (clamped here).
    pub monitor: usize,
    pub shortcuts: Vec<(Action, String)>,
    /// Optional user stylesheet.
    pub css_path: Option<PathBuf>,
}

/// Fatal errors while bringing up the window.
#[derive(Debug, thiserror::Error)]
pub enum UiError {
    #[error("failed to initialise GTK: {0}")]
    Init(#[from] glib::BoolError),
    #[error("no display available")]
    NoDisplay,
    #[error("display has no monitors")]
    NoMonitor,
}

type GtkDispatcher<S, B> = Dispatcher<S, B, gdk::Key>;

//  Public API

/// Build the dialog and run the GLib main loop on the **current** thread
/// until an action runs or the window is closed.
pub fn run_main_loop<S, B>(executor: Executor<S, B>, options: UiOptions) -> Result<(), UiError>
where
    S: ShellRunner + 'static,
    B: PowerBackend + 'static,
{
    gtk4::init()?;
    info!("GTK4 initialised on main thread");

    let display = gdk::Display::default().ok_or(UiError::NoDisplay)?;
    let monitor = select_monitor(&display, options.monitor)?;

    let composited = display.is_composited();
    let supports_alpha = display.is_rgba();
    let mut strategy = Strategy::choose(
        composited,
        supports_alpha,
        options.looks.bgcolor,
        options.looks.opacity,
    );
    debug!(
        "composited: {}, alpha: {}, backdrop: {:?}",
        composited, supports_alpha, strategy
    );

    let keymap = Keymap::resolve(&options.shortcuts, |name| {
        gdk::Key::from_name(name).map(|key| key.to_lower())
    });
    info!("{} shortcut(s) bound", keymap.len());

    let dispatcher: Rc<GtkDispatcher<S, B>> = Rc::new(Dispatcher::new(executor, keymap));

    let main_loop = glib::MainLoop::new(None, false);

    //  Window
    let window = gtk4::Window::new();
    window.set_title(Some("Log Out"));
    window.set_decorated(false);
    window.set_size_request(MIN_WIDTH, MIN_HEIGHT);
    window.add_css_class("boxlogout");
    window.remove_css_class("background");
    place_window(&window, &monitor);

    //  Backdrop
    let root = gtk4::Overlay::new();
    root.add_css_class("backdrop");
    window.set_child(Some(&root));

    if let Strategy::Faded { opacity } = strategy {
        match faded_screenshot(&monitor, opacity) {
            Ok(picture) => root.set_child(Some(&picture)),
            Err(e) => {
                warn!("screen capture failed ({}), using a solid backdrop", e);
                strategy = Strategy::opaque(options.looks.bgcolor);
            }
        }
    }
    if root.child().is_none() {
        let filler = gtk4::Box::new(gtk4::Orientation::Vertical, 0);
        filler.set_hexpand(true);
        filler.set_vexpand(true);
        root.set_child(Some(&filler));
    }

    //  Buttons
    let row = gtk4::Box::new(gtk4::Orientation::Horizontal, BUTTON_SPACING);
    row.add_css_class("button-row");
    row.set_halign(gtk4::Align::Center);
    row.set_valign(gtk4::Align::Center);
    root.add_overlay(&row);

    for &action in &options.buttons {
        row.append(&action_button(
            action,
            &options.theme_dir,
            &dispatcher,
            &window,
            &main_loop,
        ));
    }

    load_css(&strategy, &options.css_path);
    connect_window_events(&window, &dispatcher, &main_loop);

    window.present();
    info!("dialog shown with {} button(s)", options.buttons.len());

    main_loop.run();
    info!("GLib main loop exited");
    Ok(())
}

//  Window setup

fn select_monitor(display: &gdk::Display, requested: usize) -> Result<gdk::Monitor, UiError> {
    let monitors = display.monitors();
    let count = monitors.n_items() as usize;
    let index = backdrop::clamp_monitor(requested, count);
    if index != requested {
        warn!(
            "monitor {} does not exist ({} available), using {}",
            requested, count, index
        );
    }
    monitors
        .item(index as u32)
        .and_downcast::<gdk::Monitor>()
        .ok_or(UiError::NoMonitor)
}

/// Cover `monitor`: a layer-shell overlay where the compositor supports
/// it, a fullscreen window everywhere else.
fn place_window(window: &gtk4::Window, monitor: &gdk::Monitor) {
    if gtk4_layer_shell::is_supported() {
        window.init_layer_shell();
        window.set_layer(gtk4_layer_shell::Layer::Overlay);
        window.set_namespace("boxlogout");
        window.set_keyboard_mode(gtk4_layer_shell::KeyboardMode::Exclusive);
        window.set_monitor(Some(monitor));
        for edge in [Edge::Left, Edge::Right, Edge::Top, Edge::Bottom] {
            window.set_anchor(edge, true);
        }
        debug!("using layer-shell overlay");
    } else {
        window.fullscreen_on_monitor(monitor);
        debug!("using fullscreen window");
    }
}

fn connect_window_events<S, B>(
    window: &gtk4::Window,
    dispatcher: &Rc<GtkDispatcher<S, B>>,
    main_loop: &glib::MainLoop,
) where
    S: ShellRunner + 'static,
    B: PowerBackend + 'static,
{
    {
        let dispatcher = dispatcher.clone();
        let main_loop = main_loop.clone();
        window.connect_close_request(move |_| {
            dispatcher.handle(WindowEvent::Destroyed, || {});
            main_loop.quit();
            glib::Propagation::Proceed
        });
    }

    {
        let dispatcher = dispatcher.clone();
        window.connect_fullscreened_notify(move |w| {
            dispatcher.handle(WindowEvent::FullscreenChanged(w.is_fullscreen()), || {});
        });
    }

    let keys = gtk4::EventControllerKey::new();
    {
        let dispatcher = dispatcher.clone();
        let main_loop = main_loop.clone();
        let win = window.clone();
        keys.connect_key_pressed(move |_, key, _, _| {
            debug!("keypress: {:?}", key.name());
            let state = dispatcher.handle(WindowEvent::KeyPressed(key.to_lower()), || {
                win.set_visible(false)
            });
            if state == SessionState::Terminated {
                main_loop.quit();
                return glib::Propagation::Stop;
            }
            glib::Propagation::Proceed
        });
    }
    window.add_controller(keys);
}

fn action_button<S, B>(
    action: Action,
    theme_dir: &Path,
    dispatcher: &Rc<GtkDispatcher<S, B>>,
    window: &gtk4::Window,
    main_loop: &glib::MainLoop,
) -> gtk4::Box
where
    S: ShellRunner + 'static,
    B: PowerBackend + 'static,
{
    let column = gtk4::Box::new(gtk4::Orientation::Vertical, 4);
    column.add_css_class("action-button");
    column.add_css_class(&format!("action-{}", action.name()));

    let image = match theme::icon_for(theme_dir, action) {
        Icon::File(path) => gtk4::Image::from_file(path),
        Icon::Named(name) => gtk4::Image::from_icon_name(name),
    };
    image.set_pixel_size(ICON_SIZE);

    let button = gtk4::Button::new();
    button.set_child(Some(&image));
    button.set_has_frame(false);
    button.set_focusable(false);
    button.set_focus_on_click(false);
    button.set_tooltip_text(Some(action.label()));
    {
        let dispatcher = dispatcher.clone();
        let main_loop = main_loop.clone();
        let win = window.clone();
        button.connect_clicked(move |_| {
            let state = dispatcher.handle(WindowEvent::Clicked(action), || win.set_visible(false));
            if state == SessionState::Terminated {
                main_loop.quit();
            }
        });
    }
    column.append(&button);

    let label = gtk4::Label::new(Some(action.label()));
    column.append(&label);

    column
}

//  Faded backdrop

/// Capture the monitor area, darken it and wrap it in a picture widget.
fn faded_screenshot(monitor: &gdk::Monitor, opacity: u8) -> Result<gtk4::Picture, capture::CaptureError> {
    let geometry = monitor.geometry();
    let scale = monitor.scale_factor().max(1);
    let region = Region {
        x: geometry.x() * scale,
        y: geometry.y() * scale,
        width: (geometry.width() * scale).max(0) as u32,
        height: (geometry.height() * scale).max(0) as u32,
    };

    let mut shot = capture::capture_root(region)?;
    debug!("rendering fade at opacity {}", opacity);
    backdrop::fade(&mut shot.rgb, opacity);

    let stride = shot.stride();
    let texture = gdk::MemoryTexture::new(
        shot.width as i32,
        shot.height as i32,
        gdk::MemoryFormat::R8g8b8,
        &glib::Bytes::from_owned(shot.rgb),
        stride,
    );
    let picture = gtk4::Picture::for_paintable(&texture);
    picture.set_can_shrink(true);
    picture.set_hexpand(true);
    picture.set_vexpand(true);
    Ok(picture)
}

//  CSS loading

fn load_css(strategy: &Strategy, css_path: &Option<PathBuf>) {
    let provider = gtk4::CssProvider::new();

    let mut css = DEFAULT_CSS.to_string();
    if let Some(backdrop_css) = strategy.css() {
        css.push_str(&backdrop_css);
    }

    match css_path.as_ref().filter(|p| p.exists()) {
        Some(p) => match std::fs::read_to_string(p) {
            Ok(content) => {
                info!("user CSS: {} ({} bytes)", p.display(), content.len());
                css.push_str(&content);
            }
            Err(e) => warn!("CSS read failed ({}): {}, using built-in only", p.display(), e),
        },
        None => debug!("no user CSS, using built-in default"),
    }

    #[allow(deprecated)]
    provider.load_from_data(&css);

    if let Some(display) = gdk::Display::default() {
        gtk4::style_context_add_provider_for_display(
            &display,
            &provider,
            gtk4::STYLE_PROVIDER_PRIORITY_APPLICATION,
        );
    } else {
        warn!("no GDK display, CSS will not be applied");
    }
}
