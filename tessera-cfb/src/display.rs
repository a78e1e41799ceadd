//! Display session and the deferred render driver
//!
//! A [`Display`] owns the backend handle, the transfer buffer, the font
//! catalog, and the command queue. The transfer buffer's size picks the mode:
//! a buffer covering the whole screen runs immediate, anything smaller runs
//! deferred with tile-by-tile replay at finalize time.

use heapless::{String, Vec};
use tessera_display::{
    BufferDescriptor, DisplayBackend, DisplayError, PixelFormat, ScreenInfo,
};

use crate::color::{rgba_to_color, Rgba};
use crate::command::{execute_command, Command, Settings};
use crate::fb::{fill_bytes, Framebuffer};
use crate::font::Font;

/// Rendering engine errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CfbError {
    /// Session parameters are unusable: transfer buffer smaller than one
    /// tile, zero command capacity in deferred mode, or a mono panel that is
    /// not vertically tiled
    InvalidConfig,
    /// The command queue or a copied text payload is full; nothing was
    /// appended
    CommandOverflow,
    /// Font index outside the catalog
    InvalidFontIndex,
    /// The backend rejected a region write
    Backend(DisplayError),
}

impl From<DisplayError> for CfbError {
    fn from(e: DisplayError) -> Self {
        CfbError::Backend(e)
    }
}

/// Transfer buffer storage
enum PixelBuf<'a> {
    Borrowed(&'a mut [u8]),
    #[cfg(feature = "alloc")]
    Owned(alloc::boxed::Box<[u8]>),
}

impl PixelBuf<'_> {
    fn as_mut_slice(&mut self) -> &mut [u8] {
        match self {
            PixelBuf::Borrowed(b) => b,
            #[cfg(feature = "alloc")]
            PixelBuf::Owned(b) => b,
        }
    }

    fn len(&self) -> usize {
        match self {
            PixelBuf::Borrowed(b) => b.len(),
            #[cfg(feature = "alloc")]
            PixelBuf::Owned(b) => b.len(),
        }
    }
}

/// One rendering session over a panel
///
/// `CMDS` is the deferred-mode command queue capacity. Immediate-mode
/// sessions never queue and may use `CMDS = 0`.
///
/// All operations take `&mut self`; a session is single-threaded and
/// non-reentrant, and the only blocking point is the backend write.
pub struct Display<'a, D: DisplayBackend, const CMDS: usize> {
    dev: D,
    buf: PixelBuf<'a>,
    fonts: &'a [Font<'a>],
    format: PixelFormat,
    screen_info: ScreenInfo,
    res: (u16, u16),
    settings: Settings,
    queue: Vec<Command<'a>, CMDS>,
    immediate: bool,
}

impl<'a, D: DisplayBackend, const CMDS: usize> Display<'a, D, CMDS> {
    /// Start a session over a caller-supplied transfer buffer.
    ///
    /// The buffer must hold at least one tile of pixels. If it covers the
    /// whole screen the session runs immediate; otherwise it runs deferred
    /// and `CMDS` must be non-zero. The buffer is filled with the background
    /// color up front.
    pub fn new(dev: D, buf: &'a mut [u8], fonts: &'a [Font<'a>]) -> Result<Self, CfbError> {
        Self::build(dev, PixelBuf::Borrowed(buf), fonts)
    }

    /// Start an immediate-mode session over a heap-allocated full-screen
    /// buffer sized from the panel's capabilities.
    #[cfg(feature = "alloc")]
    pub fn new_owned(dev: D, fonts: &'a [Font<'a>]) -> Result<Self, CfbError> {
        let caps = dev.capabilities();
        let size = caps
            .pixel_format
            .buffer_size(caps.x_resolution, caps.y_resolution);
        let buf = alloc::vec![0u8; size].into_boxed_slice();
        Self::build(dev, PixelBuf::Owned(buf), fonts)
    }

    fn build(dev: D, buf: PixelBuf<'a>, fonts: &'a [Font<'a>]) -> Result<Self, CfbError> {
        let caps = dev.capabilities();
        let format = caps.pixel_format;
        let ppt = format.pixels_per_tile();
        if format.is_mono()
            && (!caps.screen_info.contains(ScreenInfo::MONO_VTILED)
                || caps.y_resolution as usize % ppt != 0)
        {
            return Err(CfbError::InvalidConfig);
        }
        if buf.len() < format.buffer_size(1, ppt as u16) {
            return Err(CfbError::InvalidConfig);
        }
        let immediate = buf.len() >= format.buffer_size(caps.x_resolution, caps.y_resolution);
        if !immediate && CMDS == 0 {
            return Err(CfbError::InvalidConfig);
        }
        let settings = Settings {
            fg: rgba_to_color(format, Rgba::WHITE),
            bg: rgba_to_color(format, Rgba::BLACK),
            font_idx: 0,
            kerning: 0,
        };
        let mut this = Self {
            dev,
            buf,
            fonts,
            format,
            screen_info: caps.screen_info,
            res: (caps.x_resolution, caps.y_resolution),
            settings,
            queue: Vec::new(),
            immediate,
        };
        fill_bytes(this.buf.as_mut_slice(), format, settings.bg);
        Ok(this)
    }

    /// Record one command.
    ///
    /// Immediate mode executes it against the live buffer on the spot;
    /// deferred mode queues it for the next finalize.
    pub fn append(&mut self, cmd: Command<'a>) -> Result<(), CfbError> {
        if self.immediate {
            let (w, h) = self.res;
            let size = self.format.buffer_size(w, h);
            let mut fb = Framebuffer::new(
                self.format,
                self.screen_info,
                (0, 0),
                self.res,
                w,
                h,
                &mut self.buf.as_mut_slice()[..size],
            );
            execute_command(&cmd, &mut fb, self.fonts, &mut self.settings);
            Ok(())
        } else {
            self.queue.push(cmd).map_err(|_| CfbError::CommandOverflow)
        }
    }

    /// Fill the screen with the background color.
    pub fn fill(&mut self) -> Result<(), CfbError> {
        self.append(Command::Fill)
    }

    /// Set one pixel to the foreground color.
    pub fn draw_point(&mut self, x: i16, y: i16) -> Result<(), CfbError> {
        self.append(Command::DrawPoint { x, y })
    }

    /// Draw a line between two points, inclusive.
    pub fn draw_line(&mut self, x0: i16, y0: i16, x1: i16, y1: i16) -> Result<(), CfbError> {
        self.append(Command::DrawLine { x0, y0, x1, y1 })
    }

    /// Draw a rectangle outline.
    pub fn draw_rect(&mut self, x: i16, y: i16, width: u16, height: u16) -> Result<(), CfbError> {
        self.append(Command::DrawRect {
            x,
            y,
            width,
            height,
        })
    }

    /// Draw text, clipping at the right edge. The text is copied and must
    /// fit [`MAX_TEXT_LEN`](crate::MAX_TEXT_LEN); use
    /// [`draw_text_ref`](Self::draw_text_ref) for longer strings the caller
    /// keeps alive.
    pub fn draw_text(&mut self, text: &str, x: i16, y: i16) -> Result<(), CfbError> {
        let text = String::try_from(text).map_err(|_| CfbError::CommandOverflow)?;
        self.append(Command::DrawText { x, y, text })
    }

    /// Draw text, wrapping at the right edge. Copies like
    /// [`draw_text`](Self::draw_text).
    pub fn print(&mut self, text: &str, x: i16, y: i16) -> Result<(), CfbError> {
        let text = String::try_from(text).map_err(|_| CfbError::CommandOverflow)?;
        self.append(Command::Print { x, y, text })
    }

    /// Draw text aliasing caller memory, clipping at the right edge.
    pub fn draw_text_ref(&mut self, text: &'a str, x: i16, y: i16) -> Result<(), CfbError> {
        self.append(Command::DrawTextRef { x, y, text })
    }

    /// Draw text aliasing caller memory, wrapping at the right edge.
    pub fn print_ref(&mut self, text: &'a str, x: i16, y: i16) -> Result<(), CfbError> {
        self.append(Command::PrintRef { x, y, text })
    }

    /// Bitwise-complement a rectangle's pixels.
    pub fn invert_area(&mut self, x: i16, y: i16, width: u16, height: u16) -> Result<(), CfbError> {
        self.append(Command::InvertArea {
            x,
            y,
            width,
            height,
        })
    }

    /// Bitwise-complement the whole screen.
    pub fn invert(&mut self) -> Result<(), CfbError> {
        self.append(Command::InvertArea {
            x: 0,
            y: 0,
            width: self.res.0,
            height: self.res.1,
        })
    }

    /// Exchange foreground and background colors.
    pub fn swap_fg_bg(&mut self) -> Result<(), CfbError> {
        self.append(Command::SwapFgBg)
    }

    /// Select the active font. The index is validated against the catalog
    /// here, not at replay time.
    pub fn set_font(&mut self, index: u8) -> Result<(), CfbError> {
        if index as usize >= self.fonts.len() {
            return Err(CfbError::InvalidFontIndex);
        }
        self.append(Command::SetFont { index })
    }

    /// Set the extra horizontal advance between glyphs.
    pub fn set_kerning(&mut self, kerning: i8) -> Result<(), CfbError> {
        self.append(Command::SetKerning { kerning })
    }

    /// Set the foreground color.
    pub fn set_fg_color(&mut self, color: Rgba) -> Result<(), CfbError> {
        self.append(Command::SetFgColor { color })
    }

    /// Set the background color.
    pub fn set_bg_color(&mut self, color: Rgba) -> Result<(), CfbError> {
        self.append(Command::SetBgColor { color })
    }

    /// Render and push the whole screen.
    pub fn finalize(&mut self) -> Result<(), CfbError> {
        self.finalize_area(0, 0, self.res.0, self.res.1)
    }

    /// Render and push one region of the screen.
    ///
    /// The region is clamped to the screen and its Y range widened to tile
    /// boundaries. In deferred mode the queued commands are replayed per
    /// tile from the session's settings baseline; the queue survives, so the
    /// same frame can be finalized again. A backend failure aborts
    /// immediately and tiles already written stay written.
    pub fn finalize_area(
        &mut self,
        x: i16,
        y: i16,
        width: u16,
        height: u16,
    ) -> Result<(), CfbError> {
        let x0 = (x as i32).max(0);
        let y0 = (y as i32).max(0);
        let x1 = (x as i32 + width as i32).min(self.res.0 as i32);
        let y1 = (y as i32 + height as i32).min(self.res.1 as i32);
        if x0 >= x1 || y0 >= y1 {
            return Ok(());
        }
        // widen to whole tiles; tiled panels have tile-multiple heights
        let ppt = self.format.pixels_per_tile() as i32;
        let y0 = y0 / ppt * ppt;
        let y1 = (y1 + ppt - 1) / ppt * ppt;
        self.process(x0 as u16, y0 as u16, x1 as u16, y1 as u16)
    }

    /// Reset the frame.
    ///
    /// Queued settings commands are folded into the session baseline before
    /// the queue is dropped, so colors, font, and kerning behave as if the
    /// frame had been finalized. The live buffer is refilled with the
    /// background; with `clear_display` the background is also pushed to the
    /// whole panel.
    pub fn clear(&mut self, clear_display: bool) -> Result<(), CfbError> {
        let format = self.format;
        for cmd in &self.queue {
            if cmd.is_setting() {
                self.settings.apply(cmd, format);
            }
        }
        self.queue.clear();
        fill_bytes(self.buf.as_mut_slice(), format, self.settings.bg);
        if clear_display {
            self.process(0, 0, self.res.0, self.res.1)?;
        }
        Ok(())
    }

    /// Push a tile-aligned, clamped, non-empty region.
    fn process(&mut self, x0: u16, y0: u16, x1: u16, y1: u16) -> Result<(), CfbError> {
        let (w, h) = (x1 - x0, y1 - y0);
        let ppt = self.format.pixels_per_tile();
        let bpp = self.format.bytes_per_pixel();

        if self.immediate {
            // the live buffer already holds the frame; push the region with
            // the full screen width as pitch
            let pitch_bytes = self.res.0 as usize * bpp;
            let start = (y0 as usize / ppt) * pitch_bytes + x0 as usize * bpp;
            let rows = h as usize / ppt;
            let len = (rows - 1) * pitch_bytes + w as usize * bpp;
            let desc = BufferDescriptor {
                buf_size: len,
                width: w,
                height: h,
                pitch: self.res.0,
            };
            let buf = self.buf.as_mut_slice();
            self.dev.write(x0, y0, &desc, &buf[start..start + len])?;
            return Ok(());
        }

        let (tw, th) = self.tile_extent(w, h);
        let mut ty = y0;
        while ty < y1 {
            let th_cur = th.min(y1 - ty);
            let mut tx = x0;
            while tx < x1 {
                let tw_cur = tw.min(x1 - tx);
                let size = self.format.buffer_size(tw_cur, th_cur);
                let buf = self.buf.as_mut_slice();
                let mut s = self.settings;
                {
                    let mut fb = Framebuffer::new(
                        self.format,
                        self.screen_info,
                        (tx as i16, ty as i16),
                        self.res,
                        tw_cur,
                        th_cur,
                        &mut buf[..size],
                    );
                    fb.fill(s.bg);
                    for cmd in &self.queue {
                        execute_command(cmd, &mut fb, self.fonts, &mut s);
                    }
                }
                let desc = BufferDescriptor {
                    buf_size: size,
                    width: tw_cur,
                    height: th_cur,
                    pitch: tw_cur,
                };
                self.dev.write(tx, ty, &desc, &buf[..size])?;
                tx += tw_cur;
            }
            ty += th_cur;
        }
        Ok(())
    }

    /// Largest tile shape for a region, given the transfer buffer.
    ///
    /// The whole region if it fits; otherwise full-width bands of as many
    /// tile rows as fit; otherwise one tile row tall and as wide as fits.
    fn tile_extent(&self, w: u16, h: u16) -> (u16, u16) {
        let cap = self.buf.len();
        if self.format.buffer_size(w, h) <= cap {
            return (w, h);
        }
        let ppt = self.format.pixels_per_tile();
        let bpp = self.format.bytes_per_pixel();
        let band = w as usize * bpp;
        let bands = cap / band;
        if bands > 0 {
            (w, ((bands * ppt).min(h as usize)) as u16)
        } else {
            (((cap / bpp) as u16).min(w), ppt as u16)
        }
    }

    /// Screen resolution in pixels.
    pub fn resolution(&self) -> (u16, u16) {
        self.res
    }

    /// The panel's pixel encoding.
    pub fn pixel_format(&self) -> PixelFormat {
        self.format
    }

    /// Pixels per storage byte along the tiling axis.
    pub fn pixels_per_tile(&self) -> usize {
        self.format.pixels_per_tile()
    }

    /// Addressable character columns (one per pixel column).
    pub fn cols(&self) -> u16 {
        self.res.0
    }

    /// Addressable rows: tile rows for vertically tiled mono panels, pixel
    /// rows otherwise.
    pub fn rows(&self) -> u16 {
        if self.format.is_mono() && self.screen_info.contains(ScreenInfo::MONO_VTILED) {
            self.res.1 / self.format.pixels_per_tile() as u16
        } else {
            self.res.1
        }
    }

    /// Number of fonts in the catalog.
    pub fn font_count(&self) -> usize {
        self.fonts.len()
    }

    /// `(width, height)` of the font at `index`, if present.
    pub fn font_metrics(&self, index: u8) -> Option<(u8, u8)> {
        self.fonts
            .get(index as usize)
            .map(|f| (f.width(), f.height()))
    }

    /// Commands waiting for the next finalize. Always zero in immediate
    /// mode.
    pub fn pending_commands(&self) -> usize {
        self.queue.len()
    }

    /// Whether commands execute on append instead of being queued.
    pub fn is_immediate(&self) -> bool {
        self.immediate
    }

    /// End the session and hand the backend back.
    pub fn release(self) -> D {
        self.dev
    }
}
