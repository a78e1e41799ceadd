//! Display backend trait
//!
//! Defines the interface the rendering engine uses to talk to panel drivers.

use crate::format::{PixelFormat, ScreenInfo};

/// Display backend errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayError {
    /// Communication error with the panel
    Communication,
    /// Region outside the panel or misaligned for the panel's tiling
    InvalidCoordinates,
    /// Panel not initialized or asleep
    NotReady,
}

/// Static properties of a panel, queried once at session setup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Capabilities {
    /// Horizontal resolution in pixels
    pub x_resolution: u16,
    /// Vertical resolution in pixels
    pub y_resolution: u16,
    /// Pixel encoding the panel currently expects
    pub pixel_format: PixelFormat,
    /// Memory layout flags
    pub screen_info: ScreenInfo,
}

/// Layout of a pixel buffer handed to [`DisplayBackend::write`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BufferDescriptor {
    /// Number of buffer bytes the write consumes
    pub buf_size: usize,
    /// Region width in pixels
    pub width: u16,
    /// Region height in pixels
    pub height: u16,
    /// Row stride in pixels, `>= width`
    pub pitch: u16,
}

/// Display backend trait
///
/// Provides a hardware-agnostic interface for pushing composited pixel data
/// to a panel. `write` may block on the underlying bus transaction; no
/// timeout or cancellation is modeled at this layer.
pub trait DisplayBackend {
    /// Query the panel's resolution, pixel format, and layout flags
    fn capabilities(&self) -> Capabilities;

    /// Write a rectangular region of pixel data at `(x, y)`
    ///
    /// For vertically tiled mono panels, `y` and `desc.height` are multiples
    /// of the tile height. A non-zero status is treated as fatal for the
    /// whole flush by the renderer.
    fn write(&mut self, x: u16, y: u16, desc: &BufferDescriptor, buf: &[u8])
        -> Result<(), DisplayError>;
}
