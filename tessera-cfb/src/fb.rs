//! Tile framebuffer and primitive drawing routines
//!
//! A [`Framebuffer`] is one rendering target: the whole screen in immediate
//! mode, or a single tile of it during deferred replay. Primitives take
//! full-screen coordinates and clip against the tile's extent, so the same
//! command sequence can be replayed against any tile position.

use tessera_display::{PixelFormat, ScreenInfo};

use crate::color::{byte_reverse, set_color_bytes};

/// One rendering target backed by raw pixel storage
#[derive(Debug)]
pub struct Framebuffer<'a> {
    pub(crate) format: PixelFormat,
    pub(crate) screen_info: ScreenInfo,
    /// This tile's origin in full-screen coordinates
    pub(crate) pos: (i16, i16),
    /// Full-screen resolution, invariant for the session lifetime
    pub(crate) res: (u16, u16),
    /// Drawable extent of this tile
    pub(crate) width: u16,
    pub(crate) height: u16,
    /// Pixel storage, exactly `format.buffer_size(width, height)` bytes
    pub(crate) buf: &'a mut [u8],
}

impl<'a> Framebuffer<'a> {
    pub(crate) fn new(
        format: PixelFormat,
        screen_info: ScreenInfo,
        pos: (i16, i16),
        res: (u16, u16),
        width: u16,
        height: u16,
        buf: &'a mut [u8],
    ) -> Self {
        debug_assert!(buf.len() >= format.buffer_size(width, height));
        Self {
            format,
            screen_info,
            pos,
            res,
            width,
            height,
            buf,
        }
    }

    fn msb_first(&self) -> bool {
        self.screen_info.contains(ScreenInfo::MONO_MSB_FIRST)
    }

    /// Set or clear a single pixel. Out-of-tile coordinates are ignored.
    ///
    /// A zero foreground word clears the pixel; this is what renders white
    /// on inverted-polarity (mono10) panels.
    pub(crate) fn draw_point(&mut self, x: i16, y: i16, fg: u32) {
        let x = x as i32 - self.pos.0 as i32;
        let y = y as i32 - self.pos.1 as i32;
        if x < 0 || x >= self.width as i32 || y < 0 || y >= self.height as i32 {
            return;
        }
        let (x, y) = (x as usize, y as usize);
        let pitch = self.width as usize;
        if self.format.is_mono() {
            let mut m = 1u8 << (y % 8);
            if self.msb_first() {
                m = byte_reverse(m);
            }
            let idx = (y / 8) * pitch + x;
            if fg != 0 {
                self.buf[idx] |= m;
            } else {
                self.buf[idx] &= !m;
            }
        } else {
            let bpp = self.format.bytes_per_pixel();
            let idx = (y * pitch + x) * bpp;
            set_color_bytes(&mut self.buf[idx..idx + bpp], bpp, fg);
        }
    }

    /// Integer Bresenham line covering all eight octants.
    pub(crate) fn draw_line(&mut self, x0: i16, y0: i16, x1: i16, y1: i16, fg: u32) {
        let (mut x0, mut y0) = (x0 as i32, y0 as i32);
        let (x1, y1) = (x1 as i32, y1 as i32);
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;

        loop {
            self.draw_point(x0 as i16, y0 as i16, fg);
            if x0 == x1 && y0 == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x0 += sx;
            }
            if e2 <= dx {
                err += dx;
                y0 += sy;
            }
        }
    }

    /// Rectangle outline: four lines through two opposite corners.
    pub(crate) fn draw_rect(&mut self, x: i16, y: i16, width: u16, height: u16, fg: u32) {
        if width == 0 || height == 0 {
            return;
        }
        let clamp = |v: i32| v.clamp(i16::MIN as i32, i16::MAX as i32) as i16;
        let x1 = clamp(x as i32 + width as i32 - 1);
        let y1 = clamp(y as i32 + height as i32 - 1);
        self.draw_line(x, y, x1, y, fg);
        self.draw_line(x1, y, x1, y1, fg);
        self.draw_line(x1, y1, x, y1, fg);
        self.draw_line(x, y1, x, y, fg);
    }

    /// Bitwise-complement the pixels inside a rectangle.
    ///
    /// For tiled mono the per-byte mask covers only the rows inside
    /// `[y, y+height)`, so bits of a straddled tile byte outside the
    /// rectangle keep their value.
    pub(crate) fn invert_area(&mut self, x: i16, y: i16, width: u16, height: u16) {
        let x0 = (x as i32 - self.pos.0 as i32).max(0);
        let y0 = (y as i32 - self.pos.1 as i32).max(0);
        let x1 = (x as i32 + width as i32 - self.pos.0 as i32).min(self.width as i32);
        let y1 = (y as i32 + height as i32 - self.pos.1 as i32).min(self.height as i32);
        if x0 >= x1 || y0 >= y1 {
            return;
        }
        let pitch = self.width as usize;

        if self.format.is_mono() {
            for t in (y0 / 8)..=((y1 - 1) / 8) {
                let row_base = t * 8;
                let lo = (y0.max(row_base) - row_base) as u16;
                let hi = (y1.min(row_base + 8) - row_base) as u16;
                let mut mask = (((1u16 << hi) - (1u16 << lo)) & 0xFF) as u8;
                if self.msb_first() {
                    mask = byte_reverse(mask);
                }
                let row = t as usize * pitch;
                for cx in x0 as usize..x1 as usize {
                    self.buf[row + cx] ^= mask;
                }
            }
        } else {
            let bpp = self.format.bytes_per_pixel();
            for cy in y0 as usize..y1 as usize {
                let row = cy * pitch * bpp;
                for b in &mut self.buf[row + x0 as usize * bpp..row + x1 as usize * bpp] {
                    *b = !*b;
                }
            }
        }
    }

    /// Fill the whole tile with one native color word.
    pub(crate) fn fill(&mut self, color: u32) {
        fill_bytes(self.buf, self.format, color);
    }
}

/// Fill raw pixel storage with one native color word, with no tile geometry
/// involved. Also used on the session's live buffer at init and clear.
pub(crate) fn fill_bytes(buf: &mut [u8], format: PixelFormat, color: u32) {
    if format.is_mono() {
        buf.fill(if color != 0 { 0xFF } else { 0x00 });
        return;
    }
    match format.bytes_per_pixel() {
        1 => buf.fill(color as u8),
        2 => {
            let px = (color as u16).to_ne_bytes();
            for chunk in buf.chunks_exact_mut(2) {
                chunk.copy_from_slice(&px);
            }
        }
        4 => {
            let px = color.to_ne_bytes();
            for chunk in buf.chunks_exact_mut(4) {
                chunk.copy_from_slice(&px);
            }
        }
        _ => {
            // 3-byte format has no aligned fast path
            let px = [(color >> 16) as u8, (color >> 8) as u8, color as u8];
            for (i, b) in buf.iter_mut().enumerate() {
                *b = px[i % 3];
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{color_to_rgba, rgba_to_color, Rgba};

    fn mono_fb(buf: &mut [u8], width: u16, height: u16, msb: bool) -> Framebuffer<'_> {
        let mut info = ScreenInfo::MONO_VTILED;
        if msb {
            info |= ScreenInfo::MONO_MSB_FIRST;
        }
        Framebuffer::new(
            PixelFormat::Mono01,
            info,
            (0, 0),
            (width, height),
            width,
            height,
            buf,
        )
    }

    fn color_fb(buf: &mut [u8], format: PixelFormat, width: u16, height: u16) -> Framebuffer<'_> {
        Framebuffer::new(
            format,
            ScreenInfo::empty(),
            (0, 0),
            (width, height),
            width,
            height,
            buf,
        )
    }

    fn get_word(fb: &Framebuffer<'_>, x: usize, y: usize) -> u32 {
        let pitch = fb.width as usize;
        if fb.format.is_mono() {
            let mut m = 1u8 << (y % 8);
            if fb.screen_info.contains(ScreenInfo::MONO_MSB_FIRST) {
                m = byte_reverse(m);
            }
            if fb.buf[(y / 8) * pitch + x] & m != 0 {
                0x00FF_FFFF
            } else {
                0
            }
        } else {
            let bpp = fb.format.bytes_per_pixel();
            let idx = (y * pitch + x) * bpp;
            match bpp {
                2 => u16::from_ne_bytes([fb.buf[idx], fb.buf[idx + 1]]) as u32,
                3 => {
                    ((fb.buf[idx] as u32) << 16)
                        | ((fb.buf[idx + 1] as u32) << 8)
                        | fb.buf[idx + 2] as u32
                        | 0xFF00_0000
                }
                _ => u32::from_ne_bytes([
                    fb.buf[idx],
                    fb.buf[idx + 1],
                    fb.buf[idx + 2],
                    fb.buf[idx + 3],
                ]),
            }
        }
    }

    #[test]
    fn test_draw_point_mono_lsb_bit_position() {
        let mut buf = [0u8; 16]; // 8x16 mono
        let mut fb = mono_fb(&mut buf, 8, 16, false);
        fb.draw_point(3, 5, 0x00FF_FFFF);
        assert_eq!(fb.buf[3], 1 << 5);
        fb.draw_point(2, 11, 0x00FF_FFFF);
        assert_eq!(fb.buf[8 + 2], 1 << 3);
        // zero word clears
        fb.draw_point(3, 5, 0);
        assert_eq!(fb.buf[3], 0);
    }

    #[test]
    fn test_draw_point_mono_msb_bit_position() {
        let mut buf = [0u8; 8];
        let mut fb = mono_fb(&mut buf, 8, 8, true);
        fb.draw_point(0, 0, 0x00FF_FFFF);
        assert_eq!(fb.buf[0], 0x80); // topmost row is bit 7
        fb.draw_point(1, 7, 0x00FF_FFFF);
        assert_eq!(fb.buf[1], 0x01);
    }

    #[test]
    fn test_draw_point_outside_tile_is_ignored() {
        let mut buf = [0u8; 8];
        let mut fb = mono_fb(&mut buf, 8, 8, false);
        fb.draw_point(-1, 0, !0);
        fb.draw_point(8, 0, !0);
        fb.draw_point(0, -1, !0);
        fb.draw_point(0, 8, !0);
        assert_eq!(buf, [0u8; 8]);
    }

    #[test]
    fn test_draw_point_respects_tile_origin() {
        let mut buf = [0u8; 8]; // an 8x8 tile at (8, 8) of a 16x16 screen
        let mut fb = Framebuffer::new(
            PixelFormat::Mono01,
            ScreenInfo::MONO_VTILED,
            (8, 8),
            (16, 16),
            8,
            8,
            &mut buf,
        );
        fb.draw_point(0, 0, !0); // outside this tile
        fb.draw_point(9, 10, !0); // tile-local (1, 2)
        assert_eq!(fb.buf[0], 0);
        assert_eq!(fb.buf[1], 1 << 2);
    }

    #[test]
    fn test_draw_point_rgb565_bytes() {
        let mut buf = [0u8; 32];
        let mut fb = color_fb(&mut buf, PixelFormat::Rgb565, 4, 4);
        let red = rgba_to_color(PixelFormat::Rgb565, Rgba::new(0xF8, 0, 0, 0xFF));
        fb.draw_point(1, 1, red);
        let idx = (1 * 4 + 1) * 2;
        assert_eq!(&fb.buf[idx..idx + 2], &[0xF8, 0x00]);
    }

    #[test]
    fn test_draw_line_diagonal() {
        let mut buf = [0u8; 8];
        let mut fb = mono_fb(&mut buf, 8, 8, false);
        fb.draw_line(0, 0, 7, 7, !0);
        for n in 0..8 {
            assert_eq!(fb.buf[n], 1 << n, "column {n}");
        }
    }

    #[test]
    fn test_draw_line_octants_hit_endpoints() {
        let ends = [
            (7, 1),
            (7, 7),
            (1, 7),
            (-5, 7),
            (-5, 1),
            (-5, -5),
            (1, -5),
            (7, -5),
        ];
        for (ex, ey) in ends {
            let mut buf = [0u8; 8];
            let mut fb = mono_fb(&mut buf, 8, 8, false);
            fb.draw_line(1, 1, ex, ey, !0);
            assert_ne!(get_word(&fb, 1, 1), 0, "start of line to ({ex},{ey})");
            if (0..8).contains(&ex) && (0..8).contains(&ey) {
                assert_ne!(get_word(&fb, ex as usize, ey as usize), 0);
            }
        }
    }

    #[test]
    fn test_draw_rect_outline_only() {
        let mut buf = [0u8; 8];
        let mut fb = mono_fb(&mut buf, 8, 8, false);
        fb.draw_rect(1, 1, 6, 6, !0);
        for x in 0..8usize {
            for y in 0..8usize {
                let on_edge = (1..7).contains(&x)
                    && (1..7).contains(&y)
                    && (x == 1 || x == 6 || y == 1 || y == 6);
                assert_eq!(get_word(&fb, x, y) != 0, on_edge, "({x},{y})");
            }
        }
    }

    #[test]
    fn test_invert_area_mono_subbyte_rows() {
        let mut buf = [0u8; 16]; // 8x16
        let mut fb = mono_fb(&mut buf, 8, 16, false);
        fb.buf.fill(0xAA);
        fb.invert_area(0, 3, 8, 7); // rows 3..10 straddle a tile boundary
        for col in 0..8usize {
            // rows 3..8 of the first byte flipped: 0xAA ^ 0xF8
            assert_eq!(fb.buf[col], 0xAA ^ 0xF8);
            // rows 8..10 are bits 0..2 of the second byte
            assert_eq!(fb.buf[8 + col], 0xAA ^ 0x03);
        }
    }

    #[test]
    fn test_invert_area_mono_idempotent() {
        let mut buf = [0u8; 16];
        for (i, b) in buf.iter_mut().enumerate() {
            *b = (i as u8).wrapping_mul(37) ^ 0x5C;
        }
        let original = buf;
        let mut fb = mono_fb(&mut buf, 8, 16, false);
        fb.invert_area(2, 3, 5, 9);
        fb.invert_area(2, 3, 5, 9);
        assert_eq!(buf, original);
    }

    #[test]
    fn test_invert_area_mono_msb_first_mask_reversed() {
        let mut buf = [0u8; 8];
        let mut fb = mono_fb(&mut buf, 8, 8, true);
        fb.invert_area(0, 0, 8, 3); // top three rows
        assert_eq!(fb.buf[0], 0xE0); // bits 7..5 with MSB-first ordering
    }

    #[test]
    fn test_invert_area_color_idempotent() {
        let mut buf = [0u8; 48]; // 4x4 rgb888
        for (i, b) in buf.iter_mut().enumerate() {
            *b = i as u8;
        }
        let original = buf;
        let mut fb = color_fb(&mut buf, PixelFormat::Rgb888, 4, 4);
        fb.invert_area(1, 1, 2, 2);
        fb.invert_area(1, 1, 2, 2);
        assert_eq!(buf, original);
    }

    #[test]
    fn test_invert_area_color_flips_whole_pixels() {
        let mut buf = [0u8; 32]; // 4x4 rgb565
        let mut fb = color_fb(&mut buf, PixelFormat::Rgb565, 4, 4);
        fb.invert_area(1, 0, 1, 1);
        assert_eq!(&fb.buf[0..2], &[0x00, 0x00]);
        assert_eq!(&fb.buf[2..4], &[0xFF, 0xFF]);
        assert_eq!(&fb.buf[4..6], &[0x00, 0x00]);
    }

    #[test]
    fn test_fill_readback_every_format() {
        let cases = [
            (PixelFormat::Mono01, Rgba::WHITE),
            (PixelFormat::Mono01, Rgba::BLACK),
            (PixelFormat::Mono10, Rgba::BLACK),
            (PixelFormat::Rgb565, Rgba::new(0xF8, 0x40, 0x18, 0xFF)),
            (PixelFormat::Bgr565, Rgba::new(0x08, 0x84, 0xF8, 0xFF)),
            (PixelFormat::Rgb888, Rgba::new(0x12, 0x34, 0x56, 0xFF)),
            (PixelFormat::Argb8888, Rgba::new(0x9A, 0xBC, 0xDE, 0x7F)),
        ];
        for (format, c) in cases {
            let mut buf = [0u8; 256]; // 8x8 worst case = 256 bytes
            let size = format.buffer_size(8, 8);
            let info = if format.is_mono() {
                ScreenInfo::MONO_VTILED
            } else {
                ScreenInfo::empty()
            };
            let mut fb =
                Framebuffer::new(format, info, (0, 0), (8, 8), 8, 8, &mut buf[..size]);
            let word = rgba_to_color(format, c);
            fb.fill(word);
            for x in 0..8 {
                for y in 0..8 {
                    if format.is_mono() {
                        // the stored bit equals the word's truthiness
                        assert_eq!(get_word(&fb, x, y) != 0, word != 0, "{format:?}");
                    } else {
                        let got = color_to_rgba(format, get_word(&fb, x, y));
                        assert_eq!(got, c, "{format:?} at ({x},{y})");
                    }
                }
            }
        }
    }
}
