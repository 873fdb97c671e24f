//! What to paint behind the button row.
//!
//! With a compositor the window is simply filled with the background
//! color at the configured opacity.  Without one, true transparency is
//! impossible, so the current screen contents are captured once, darkened
//! with [`fade`] and painted as a static image instead.

use crate::color::Color;

/// How the backdrop is rendered.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Strategy {
    /// Fill with `color` at `alpha` (`0.0..=1.0`).
    Solid { color: Color, alpha: f64 },
    /// Capture the screen under the window and darken it by `opacity`.
    Faded { opacity: u8 },
}

impl Strategy {
    /// Pick a strategy for a display with the given capabilities.
    ///
    /// `opacity` is the configured percentage (`0..=100`).
    pub fn choose(composited: bool, supports_alpha: bool, color: Color, opacity: u8) -> Self {
        match (composited, supports_alpha) {
            (true, true) => Strategy::Solid {
                color,
                alpha: f64::from(opacity.min(100)) / 100.0,
            },
            (true, false) => Strategy::opaque(color),
            (false, _) => Strategy::Faded { opacity },
        }
    }

    /// Solid, fully opaque fill.  Used when a screen capture fails.
    pub fn opaque(color: Color) -> Self {
        Strategy::Solid { color, alpha: 1.0 }
    }

    /// Stylesheet painting a [`Strategy::Solid`] backdrop on `.backdrop`.
    /// Returns `None` for [`Strategy::Faded`], which is painted with an
    /// image instead.
    pub fn css(&self) -> Option<String> {
        match self {
            Strategy::Solid { color, alpha } => Some(format!(
                ".backdrop {{ background-color: rgba({}, {}, {}, {:.2}); }}\n",
                color.r, color.g, color.b, alpha
            )),
            Strategy::Faded { .. } => None,
        }
    }
}

/// Darken one channel: `floor(value * opacity / 255)`.
///
/// The divisor is 255 even though opacity is a percentage, so an opacity
/// of 50 keeps about a fifth of the original brightness.
pub fn fade_channel(value: u8, opacity: u8) -> u8 {
    (u32::from(value) * u32::from(opacity) / 255) as u8
}

/// Darken packed RGB (or any 8-bit channel) pixel data in place.
pub fn fade(pixels: &mut [u8], opacity: u8) {
    for p in pixels.iter_mut() {
        *p = fade_channel(*p, opacity);
    }
}

/// Clamp a configured monitor index to the monitors that exist.
///
/// Out-of-range indices select the last monitor; with no monitors at all
/// the result is 0.
pub fn clamp_monitor(requested: usize, n_monitors: usize) -> usize {
    requested.min(n_monitors.saturating_sub(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fade_matches_reference_value() {
        assert_eq!(fade_channel(200, 50), 39);
    }

    #[test]
    fn fade_edges() {
        assert_eq!(fade_channel(255, 255), 255);
        assert_eq!(fade_channel(255, 0), 0);
        assert_eq!(fade_channel(0, 100), 0);
        assert_eq!(fade_channel(255, 100), 100);
    }

    #[test]
    fn fade_whole_buffer() {
        let mut px = vec![200, 100, 0, 255, 51, 10];
        fade(&mut px, 50);
        assert_eq!(px, vec![39, 19, 0, 50, 10, 1]);
    }

    #[test]
    fn monitor_index_clamps_to_last() {
        assert_eq!(clamp_monitor(0, 2), 0);
        assert_eq!(clamp_monitor(1, 2), 1);
        assert_eq!(clamp_monitor(2, 2), 1);
        assert_eq!(clamp_monitor(9, 3), 2);
        assert_eq!(clamp_monitor(3, 0), 0);
    }

    #[test]
    fn strategy_by_display_capabilities() {
        let c = Color::rgb(1, 2, 3);
        assert_eq!(
            Strategy::choose(true, true, c, 50),
            Strategy::Solid { color: c, alpha: 0.5 }
        );
        assert_eq!(Strategy::choose(true, false, c, 50), Strategy::opaque(c));
        assert_eq!(Strategy::choose(false, true, c, 70), Strategy::Faded { opacity: 70 });
    }

    #[test]
    fn solid_css() {
        let css = Strategy::choose(true, true, Color::rgb(16, 32, 48), 25)
            .css()
            .unwrap();
        assert_eq!(css, ".backdrop { background-color: rgba(16, 32, 48, 0.25); }\n");
        assert!(Strategy::Faded { opacity: 10 }.css().is_none());
    }
}
