//! Pixel formats and panel layout capabilities

use bitflags::bitflags;

/// Native pixel encodings supported by the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PixelFormat {
    /// 1 bit per pixel, 0 = black, 1 = white
    Mono01,
    /// 1 bit per pixel, 0 = white, 1 = black
    Mono10,
    /// 16-bit 5-6-5, stored big-endian
    Rgb565,
    /// 16-bit 5-6-5 with red and blue swapped, stored native-endian
    Bgr565,
    /// 24-bit RGB triplet
    Rgb888,
    /// 32-bit ARGB word
    Argb8888,
}

impl PixelFormat {
    /// Storage bytes per pixel (1 for the packed mono formats)
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::Mono01 | PixelFormat::Mono10 => 1,
            PixelFormat::Rgb565 | PixelFormat::Bgr565 => 2,
            PixelFormat::Rgb888 => 3,
            PixelFormat::Argb8888 => 4,
        }
    }

    /// Pixels sharing one storage byte along the tiling axis
    pub const fn pixels_per_tile(self) -> usize {
        match self {
            PixelFormat::Mono01 | PixelFormat::Mono10 => 8,
            _ => 1,
        }
    }

    /// Whether this is a 1-bit-per-pixel format
    pub const fn is_mono(self) -> bool {
        matches!(self, PixelFormat::Mono01 | PixelFormat::Mono10)
    }

    /// Bytes needed to back a `width` x `height` region in this format
    pub const fn buffer_size(self, width: u16, height: u16) -> usize {
        width as usize * height as usize * self.bytes_per_pixel() / self.pixels_per_tile()
    }
}

bitflags! {
    /// Panel memory layout flags reported alongside the pixel format
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ScreenInfo: u8 {
        /// 1-bit pixels are packed 8-per-byte along the Y axis
        const MONO_VTILED = 1 << 0;
        /// Bit 7 of a tile byte is the topmost pixel of the tile
        const MONO_MSB_FIRST = 1 << 1;
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for ScreenInfo {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "ScreenInfo({=u8:b})", self.bits());
    }
}
