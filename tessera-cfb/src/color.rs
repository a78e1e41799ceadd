//! Pixel color codec
//!
//! Converts between the 8-bit-per-channel RGBA drawing API and a panel's
//! native pixel word. The mono formats collapse to one of two sentinel words
//! and are lossy by design; every other format round-trips exactly for
//! values already quantized to its bit depth.

use tessera_display::PixelFormat;

/// 8-bit-per-channel color with alpha
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const BLACK: Self = Self::new(0x00, 0x00, 0x00, 0x00);
    pub const WHITE: Self = Self::new(0xFF, 0xFF, 0xFF, 0xFF);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// The mono "off" test: all four channels exactly zero
    const fn is_off(self) -> bool {
        self.r == 0 && self.g == 0 && self.b == 0 && self.a == 0
    }
}

/// Pack an RGBA color into the panel's native pixel word.
pub fn rgba_to_color(format: PixelFormat, c: Rgba) -> u32 {
    match format {
        PixelFormat::Mono01 => {
            if c.is_off() {
                0x0000_0000
            } else {
                0x00FF_FFFF
            }
        }
        PixelFormat::Mono10 => {
            if c.is_off() {
                0x00FF_FFFF
            } else {
                0x0000_0000
            }
        }
        PixelFormat::Rgb565 => {
            let packed = ((c.r as u16 & 0xF8) << 8) | ((c.g as u16 & 0xFC) << 3) | (c.b as u16 >> 3);
            // stored big-endian on the wire
            packed.to_be() as u32
        }
        PixelFormat::Bgr565 => {
            ((c.b as u32 & 0xF8) << 8) | ((c.g as u32 & 0xFC) << 3) | (c.r as u32 >> 3)
        }
        PixelFormat::Rgb888 => {
            0xFF00_0000 | ((c.r as u32) << 16) | ((c.g as u32) << 8) | c.b as u32
        }
        PixelFormat::Argb8888 => {
            ((c.a as u32) << 24) | ((c.r as u32) << 16) | ((c.g as u32) << 8) | c.b as u32
        }
    }
}

/// Unpack a native pixel word back into RGBA. Exact inverse of
/// [`rgba_to_color`] except for the two lossy mono formats.
pub fn color_to_rgba(format: PixelFormat, color: u32) -> Rgba {
    match format {
        PixelFormat::Mono01 => {
            if color == 0 {
                Rgba::BLACK
            } else {
                Rgba::WHITE
            }
        }
        PixelFormat::Mono10 => {
            if color == 0 {
                Rgba::WHITE
            } else {
                Rgba::BLACK
            }
        }
        PixelFormat::Rgb565 => {
            let c = u16::from_be(color as u16);
            Rgba::new(
                ((c >> 8) & 0xF8) as u8,
                ((c >> 3) & 0xFC) as u8,
                ((c << 3) & 0xF8) as u8,
                0xFF,
            )
        }
        PixelFormat::Bgr565 => Rgba::new(
            ((color << 3) & 0xF8) as u8,
            ((color >> 3) & 0xFC) as u8,
            ((color >> 8) & 0xF8) as u8,
            0xFF,
        ),
        PixelFormat::Rgb888 => {
            Rgba::new((color >> 16) as u8, (color >> 8) as u8, color as u8, 0xFF)
        }
        PixelFormat::Argb8888 => Rgba::new(
            (color >> 16) as u8,
            (color >> 8) as u8,
            color as u8,
            (color >> 24) as u8,
        ),
    }
}

/// Store one pixel's native color word into `buf`.
///
/// 1/2/4-byte formats use native-endian stores done as byte copies (no
/// alignment assumption); the 3-byte format writes an explicit big-endian
/// triplet.
pub(crate) fn set_color_bytes(buf: &mut [u8], bpp: usize, color: u32) {
    match bpp {
        1 => buf[0] = color as u8,
        2 => buf[0..2].copy_from_slice(&(color as u16).to_ne_bytes()),
        3 => {
            buf[0] = (color >> 16) as u8;
            buf[1] = (color >> 8) as u8;
            buf[2] = color as u8;
        }
        4 => buf[0..4].copy_from_slice(&color.to_ne_bytes()),
        _ => {}
    }
}

/// Flip the bit order of a byte.
///
/// Panels and fonts disagree on whether bit 7 or bit 0 is the first pixel of
/// a tile; this is the single reconciliation point.
pub const fn byte_reverse(b: u8) -> u8 {
    b.reverse_bits()
}
