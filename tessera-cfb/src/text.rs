//! Glyph rasterization
//!
//! Two paths, selected per glyph:
//!
//! - a byte-at-a-time blit for vertically tiled mono panels drawing
//!   vertically packed fonts, working on 8-row tile bytes,
//! - a per-pixel path for everything else (packed color formats, and
//!   horizontally packed fonts on any panel).
//!
//! Both paths clip to the current tile and always report the font's nominal
//! advance width; layout is the caller's concern, not the rasterizer's.

use tessera_display::ScreenInfo;

use crate::color::{byte_reverse, set_color_bytes};
use crate::fb::Framebuffer;
use crate::font::{Font, FontCaps};

/// Draw one string at `(x, y)` in full-screen coordinates.
///
/// With `wrap`, the cursor moves to the left edge and down one glyph height
/// whenever the next glyph would cross the right screen edge (the `print`
/// behavior); without it the string runs off the edge and clips (`text`).
pub(crate) fn draw_text(
    fb: &mut Framebuffer<'_>,
    font: &Font<'_>,
    text: &str,
    x: i16,
    y: i16,
    wrap: bool,
    fg: u32,
    bg: u32,
    kerning: i8,
) {
    let mut pos_x = x as i32;
    let mut pos_y = y as i32;
    for c in text.chars() {
        if wrap && pos_x + font.width() as i32 > fb.res.0 as i32 {
            pos_x = 0;
            pos_y += font.height() as i32;
        }
        let advance = draw_char(fb, font, c, pos_x, pos_y, fg, bg);
        pos_x += advance as i32 + kerning as i32;
    }
}

/// Draw one glyph cell. Returns the nominal advance width regardless of how
/// much was visible.
pub(crate) fn draw_char(
    fb: &mut Framebuffer<'_>,
    font: &Font<'_>,
    c: char,
    x: i32,
    y: i32,
    fg: u32,
    bg: u32,
) -> u8 {
    let w = font.width() as i32;
    let h = font.height() as i32;
    // tile-local coordinates
    let lx = x - fb.pos.0 as i32;
    let ly = y - fb.pos.1 as i32;
    if lx + w <= 0 || lx >= fb.width as i32 || ly + h <= 0 || ly >= fb.height as i32 {
        return font.width();
    }
    let glyph = match font.glyph(c) {
        Some(g) => g,
        // characters outside the font's range render as blank cells
        None => return font.width(),
    };

    if fb.format.is_mono() && font.caps().contains(FontCaps::MONO_VPACKED) {
        draw_char_vtmono(fb, font, glyph, lx, ly, fg != 0, bg != 0);
    } else {
        draw_char_color(fb, font, glyph, lx, ly, fg, bg);
    }
    font.width()
}

/// Tiled monochrome blit.
///
/// Per glyph column, the current and next glyph bytes form a 16-bit window
/// shifted by the sub-tile offset (`y % 8`); exactly 8 bits land in each
/// destination tile byte, masked to the rows inside `[y, y+height)` so the
/// top-partial, interior, and bottom-partial tile bytes leave neighboring
/// content alone. Glyph bytes are bit-reversed when the font's bit order
/// disagrees with the internal row order; destination bytes are reconciled
/// against the screen's declared order the same way.
fn draw_char_vtmono(
    fb: &mut Framebuffer<'_>,
    font: &Font<'_>,
    glyph: &[u8],
    x: i32,
    y: i32,
    fg_on: bool,
    bg_on: bool,
) {
    let font_msb = font.caps().contains(FontCaps::MSB_FIRST);
    let screen_msb = fb.screen_info.contains(ScreenInfo::MONO_MSB_FIRST);
    let h = font.height() as i32;
    let glyph_tiles = (h + 7) / 8;
    let pitch = fb.width as usize;

    // canonical order: bit n of a tile byte is pixel row n within the tile
    let shift = y.rem_euclid(8) as u32;
    let first_tile = y.div_euclid(8);
    let last_tile = (y + h - 1).div_euclid(8);

    for g_x in 0..font.width() as i32 {
        let fb_x = x + g_x;
        if fb_x < 0 || fb_x >= fb.width as i32 {
            continue;
        }

        for t in first_tile..=last_tile {
            let row_base = t * 8;
            // rows of this tile byte covered by both the glyph and the tile
            let lo = y.max(row_base).max(0);
            let hi = (y + h).min(row_base + 8).min(fb.height as i32);
            if lo >= hi {
                continue;
            }

            let gt = t - first_tile;
            let cur = canonical_glyph_byte(font, glyph, g_x as usize, gt - 1, glyph_tiles, font_msb);
            let next = canonical_glyph_byte(font, glyph, g_x as usize, gt, glyph_tiles, font_msb);
            let window = (cur as u16) | ((next as u16) << 8);
            let val = (window >> (8 - shift)) as u8;
            let mask = (((1u16 << (hi - row_base)) - (1u16 << (lo - row_base))) & 0xFF) as u8;

            let idx = t as usize * pitch + fb_x as usize;
            let mut byte = fb.buf[idx];
            if screen_msb {
                byte = byte_reverse(byte);
            }
            // glyph bits take the foreground polarity, the rest of the
            // masked rows take the background polarity
            let fg_bits = if fg_on { val } else { 0 };
            let bg_bits = if bg_on { !val } else { 0 };
            byte = (byte & !mask) | ((fg_bits | bg_bits) & mask);
            if screen_msb {
                byte = byte_reverse(byte);
            }
            fb.buf[idx] = byte;
        }
    }
}

/// Glyph column byte in canonical (LSB = top row) order; tiles outside the
/// glyph read as zero.
fn canonical_glyph_byte(
    font: &Font<'_>,
    glyph: &[u8],
    col: usize,
    tile: i32,
    glyph_tiles: i32,
    font_msb: bool,
) -> u8 {
    if tile < 0 || tile >= glyph_tiles {
        return 0;
    }
    let b = font.glyph_byte(glyph, col, tile as usize);
    if font_msb {
        byte_reverse(b)
    } else {
        b
    }
}

/// Per-pixel path for packed color formats and horizontally packed fonts.
fn draw_char_color(
    fb: &mut Framebuffer<'_>,
    font: &Font<'_>,
    glyph: &[u8],
    x: i32,
    y: i32,
    fg: u32,
    bg: u32,
) {
    let bpp = fb.format.bytes_per_pixel();
    let pitch = fb.width as usize;
    for g_y in 0..font.height() as usize {
        let fb_y = y + g_y as i32;
        if fb_y < 0 || fb_y >= fb.height as i32 {
            continue;
        }
        for g_x in 0..font.width() as usize {
            let fb_x = x + g_x as i32;
            if fb_x < 0 || fb_x >= fb.width as i32 {
                continue;
            }
            let on = font.glyph_bit(glyph, g_x, g_y);
            let color = if on { fg } else { bg };
            if fb.format.is_mono() {
                // horizontally packed font on a tiled mono panel
                fb.draw_point(
                    fb_x as i16 + fb.pos.0,
                    fb_y as i16 + fb.pos.1,
                    color,
                );
            } else {
                let idx = (fb_y as usize * pitch + fb_x as usize) * bpp;
                set_color_bytes(&mut fb.buf[idx..idx + bpp], bpp, color);
            }
        }
    }
}
