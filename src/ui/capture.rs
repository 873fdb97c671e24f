//! Root-window screen capture over X11.
//!
//! Used once at startup, when there is no compositor, to build the faded
//! backdrop.  Only 32-bit-per-pixel Z-pixmaps (the format of every common
//! 24/32-bit visual) are supported.

use log::debug;
use x11rb::connection::Connection;
use x11rb::protocol::xproto::{ConnectionExt, ImageFormat, ImageOrder};

/// Screen rectangle to capture, in device pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// Captured pixels as tightly packed 8-bit RGB rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Capture {
    pub width: u32,
    pub height: u32,
    pub rgb: Vec<u8>,
}

impl Capture {
    /// Bytes per row of [`Capture::rgb`].
    pub fn stride(&self) -> usize {
        self.width as usize * 3
    }
}

/// Errors that can occur while capturing the screen.
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("cannot connect to the X server: {0}")]
    Connect(#[from] x11rb::errors::ConnectError),
    #[error("X11 connection error: {0}")]
    Connection(#[from] x11rb::errors::ConnectionError),
    #[error("X11 request failed: {0}")]
    Reply(#[from] x11rb::errors::ReplyError),
    #[error("unsupported image format: depth {depth}, {bits_per_pixel} bits per pixel")]
    Format { depth: u8, bits_per_pixel: u8 },
    #[error("image data too short: expected {expected} bytes, got {actual}")]
    ShortData { expected: usize, actual: usize },
    #[error("empty capture region")]
    Empty,
}

/// Grab `region` of the root window of the default screen.
pub fn capture_root(region: Region) -> Result<Capture, CaptureError> {
    if region.width == 0 || region.height == 0 {
        return Err(CaptureError::Empty);
    }
    let width = region.width.min(u32::from(u16::MAX));
    let height = region.height.min(u32::from(u16::MAX));

    let (conn, screen_num) = x11rb::connect(None)?;
    let setup = conn.setup();
    let root = setup.roots[screen_num].root;

    let reply = conn
        .get_image(
            ImageFormat::Z_PIXMAP,
            root,
            region.x as i16,
            region.y as i16,
            width as u16,
            height as u16,
            !0,
        )?
        .reply()?;

    let bits_per_pixel = setup
        .pixmap_formats
        .iter()
        .find(|f| f.depth == reply.depth)
        .map(|f| f.bits_per_pixel)
        .unwrap_or(0);
    debug!(
        "captured {}x{} at ({}, {}), depth {}, {} bpp",
        width, height, region.x, region.y, reply.depth, bits_per_pixel
    );

    let rgb = zpixmap_to_rgb(
        &reply.data,
        width,
        height,
        reply.depth,
        bits_per_pixel,
        setup.image_byte_order,
    )?;
    Ok(Capture { width, height, rgb })
}

/// Convert 32-bpp Z-pixmap data (`XRGB` words in `order`) to packed RGB.
pub fn zpixmap_to_rgb(
    data: &[u8],
    width: u32,
    height: u32,
    depth: u8,
    bits_per_pixel: u8,
    order: ImageOrder,
) -> Result<Vec<u8>, CaptureError> {
    if bits_per_pixel != 32 {
        return Err(CaptureError::Format {
            depth,
            bits_per_pixel,
        });
    }
    let pixels = width as usize * height as usize;
    let expected = pixels * 4;
    if data.len() < expected {
        return Err(CaptureError::ShortData {
            expected,
            actual: data.len(),
        });
    }

    let mut rgb = Vec::with_capacity(pixels * 3);
    for px in data[..expected].chunks_exact(4) {
        if order == ImageOrder::LSB_FIRST {
            // B G R X
            rgb.extend_from_slice(&[px[2], px[1], px[0]]);
        } else {
            // X R G B
            rgb.extend_from_slice(&[px[1], px[2], px[3]]);
        }
    }
    Ok(rgb)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lsb_first_is_bgrx() {
        let data = [10, 20, 30, 0, 1, 2, 3, 255];
        let rgb = zpixmap_to_rgb(&data, 2, 1, 24, 32, ImageOrder::LSB_FIRST).unwrap();
        assert_eq!(rgb, vec![30, 20, 10, 3, 2, 1]);
    }

    #[test]
    fn msb_first_is_xrgb() {
        let data = [0, 30, 20, 10];
        let rgb = zpixmap_to_rgb(&data, 1, 1, 24, 32, ImageOrder::MSB_FIRST).unwrap();
        assert_eq!(rgb, vec![30, 20, 10]);
    }

    #[test]
    fn other_pixel_sizes_are_rejected() {
        let err = zpixmap_to_rgb(&[0; 8], 2, 2, 16, 16, ImageOrder::LSB_FIRST).unwrap_err();
        assert!(matches!(err, CaptureError::Format { depth: 16, bits_per_pixel: 16 }));
    }

    #[test]
    fn short_data_is_rejected() {
        let err = zpixmap_to_rgb(&[0; 7], 2, 1, 24, 32, ImageOrder::LSB_FIRST).unwrap_err();
        assert!(matches!(err, CaptureError::ShortData { expected: 8, actual: 7 }));
    }

    #[test]
    fn empty_region_is_rejected_before_connecting() {
        let region = Region { x: 0, y: 0, width: 0, height: 10 };
        assert!(matches!(capture_root(region), Err(CaptureError::Empty)));
    }
}
