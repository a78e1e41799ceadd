//! Drawing command model
//!
//! Every drawing or settings call on a display session becomes one
//! [`Command`]. In deferred mode the commands accumulate in a queue and are
//! replayed once per tile; in immediate mode they execute on the spot. The
//! settings commands mutate the [`Settings`] threaded through a replay, so a
//! color change mid-sequence affects only the commands after it.

use heapless::String;
use tessera_display::PixelFormat;

use crate::color::{rgba_to_color, Rgba};
use crate::fb::Framebuffer;
use crate::font::Font;
use crate::text::draw_text;

/// Longest text payload a copying text/print command can carry.
///
/// The `*_ref` variants alias caller memory instead and have no length
/// limit.
pub const MAX_TEXT_LEN: usize = 32;

/// Mutable graphics state that commands implicitly read and modify
///
/// Colors are stored as native pixel words for the session's format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Settings {
    /// Foreground color word
    pub fg: u32,
    /// Background color word
    pub bg: u32,
    /// Index into the session's font catalog
    pub font_idx: u8,
    /// Extra horizontal advance between glyphs, in pixels
    pub kerning: i8,
}

impl Settings {
    /// Apply a settings command without touching any pixels. Drawing
    /// commands are ignored.
    pub(crate) fn apply(&mut self, cmd: &Command<'_>, format: PixelFormat) {
        match cmd {
            Command::SwapFgBg => core::mem::swap(&mut self.fg, &mut self.bg),
            Command::SetFont { index } => self.font_idx = *index,
            Command::SetKerning { kerning } => self.kerning = *kerning,
            Command::SetFgColor { color } => self.fg = rgba_to_color(format, *color),
            Command::SetBgColor { color } => self.bg = rgba_to_color(format, *color),
            _ => {}
        }
    }
}

/// One queued drawing or settings-change operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command<'a> {
    /// Fill the target with the background color
    Fill,
    /// Set a single pixel to the foreground color
    DrawPoint { x: i16, y: i16 },
    /// Line between two points, inclusive
    DrawLine { x0: i16, y0: i16, x1: i16, y1: i16 },
    /// Rectangle outline from a corner and an extent
    DrawRect {
        x: i16,
        y: i16,
        width: u16,
        height: u16,
    },
    /// Text with a copied payload, clipping at the right edge
    DrawText {
        x: i16,
        y: i16,
        text: String<MAX_TEXT_LEN>,
    },
    /// Text with a copied payload, wrapping at the right edge
    Print {
        x: i16,
        y: i16,
        text: String<MAX_TEXT_LEN>,
    },
    /// Text aliasing caller memory, clipping at the right edge
    DrawTextRef { x: i16, y: i16, text: &'a str },
    /// Text aliasing caller memory, wrapping at the right edge
    PrintRef { x: i16, y: i16, text: &'a str },
    /// Bitwise-complement a rectangle's pixels
    InvertArea {
        x: i16,
        y: i16,
        width: u16,
        height: u16,
    },
    /// Exchange foreground and background colors
    SwapFgBg,
    /// Select the active font by catalog index
    SetFont { index: u8 },
    /// Set the inter-glyph advance adjustment
    SetKerning { kerning: i8 },
    /// Set the foreground color
    SetFgColor { color: Rgba },
    /// Set the background color
    SetBgColor { color: Rgba },
}

impl Command<'_> {
    /// Settings commands survive a clear; drawing commands do not.
    pub fn is_setting(&self) -> bool {
        matches!(
            self,
            Command::SwapFgBg
                | Command::SetFont { .. }
                | Command::SetKerning { .. }
                | Command::SetFgColor { .. }
                | Command::SetBgColor { .. }
        )
    }
}

/// Apply one command to a tile, threading the draw settings through.
pub(crate) fn execute_command(
    cmd: &Command<'_>,
    fb: &mut Framebuffer<'_>,
    fonts: &[Font<'_>],
    s: &mut Settings,
) {
    match cmd {
        Command::Fill => fb.fill(s.bg),
        Command::DrawPoint { x, y } => fb.draw_point(*x, *y, s.fg),
        Command::DrawLine { x0, y0, x1, y1 } => fb.draw_line(*x0, *y0, *x1, *y1, s.fg),
        Command::DrawRect {
            x,
            y,
            width,
            height,
        } => fb.draw_rect(*x, *y, *width, *height, s.fg),
        Command::DrawText { x, y, text } => text_command(fb, fonts, s, text, *x, *y, false),
        Command::Print { x, y, text } => text_command(fb, fonts, s, text, *x, *y, true),
        Command::DrawTextRef { x, y, text } => text_command(fb, fonts, s, text, *x, *y, false),
        Command::PrintRef { x, y, text } => text_command(fb, fonts, s, text, *x, *y, true),
        Command::InvertArea {
            x,
            y,
            width,
            height,
        } => fb.invert_area(*x, *y, *width, *height),
        _ => s.apply(cmd, fb.format),
    }
}

fn text_command(
    fb: &mut Framebuffer<'_>,
    fonts: &[Font<'_>],
    s: &Settings,
    text: &str,
    x: i16,
    y: i16,
    wrap: bool,
) {
    // a font index with no catalog entry renders nothing; set_font rejects
    // bad indices up front, this covers an empty catalog
    if let Some(font) = fonts.get(s.font_idx as usize) {
        draw_text(fb, font, text, x, y, wrap, s.fg, s.bg, s.kerning);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_display::ScreenInfo;

    fn settings() -> Settings {
        Settings {
            fg: rgba_to_color(PixelFormat::Mono01, Rgba::WHITE),
            bg: rgba_to_color(PixelFormat::Mono01, Rgba::BLACK),
            font_idx: 0,
            kerning: 0,
        }
    }

    #[test]
    fn test_is_setting_partition() {
        let settings_cmds = [
            Command::SwapFgBg,
            Command::SetFont { index: 1 },
            Command::SetKerning { kerning: 2 },
            Command::SetFgColor { color: Rgba::WHITE },
            Command::SetBgColor { color: Rgba::BLACK },
        ];
        for cmd in &settings_cmds {
            assert!(cmd.is_setting(), "{cmd:?}");
        }
        let drawing_cmds = [
            Command::Fill,
            Command::DrawPoint { x: 0, y: 0 },
            Command::InvertArea {
                x: 0,
                y: 0,
                width: 1,
                height: 1,
            },
        ];
        for cmd in &drawing_cmds {
            assert!(!cmd.is_setting(), "{cmd:?}");
        }
    }

    #[test]
    fn test_apply_swap_and_colors() {
        let mut s = settings();
        let (fg, bg) = (s.fg, s.bg);
        s.apply(&Command::SwapFgBg, PixelFormat::Mono01);
        assert_eq!((s.fg, s.bg), (bg, fg));

        s.apply(
            &Command::SetFgColor { color: Rgba::BLACK },
            PixelFormat::Mono01,
        );
        assert_eq!(s.fg, 0);
        s.apply(
            &Command::SetBgColor { color: Rgba::WHITE },
            PixelFormat::Mono01,
        );
        assert_eq!(s.bg, 0x00FF_FFFF);
    }

    #[test]
    fn test_apply_ignores_drawing_commands() {
        let mut s = settings();
        let before = s;
        s.apply(&Command::Fill, PixelFormat::Mono01);
        s.apply(&Command::DrawPoint { x: 1, y: 1 }, PixelFormat::Mono01);
        assert_eq!(s, before);
    }

    #[test]
    fn test_execute_settings_side_effects_during_replay() {
        let mut buf = [0u8; 8];
        let mut fb = Framebuffer::new(
            PixelFormat::Mono01,
            ScreenInfo::MONO_VTILED,
            (0, 0),
            (8, 8),
            8,
            8,
            &mut buf,
        );
        let mut s = settings();
        // swap makes fg the off word, so the point clears instead of sets
        fb.buf.fill(0xFF);
        execute_command(&Command::SwapFgBg, &mut fb, &[], &mut s);
        execute_command(&Command::DrawPoint { x: 0, y: 0 }, &mut fb, &[], &mut s);
        assert_eq!(buf[0], 0xFE);
    }

    #[test]
    fn test_fill_uses_background_word() {
        let mut buf = [0u8; 8];
        let mut fb = Framebuffer::new(
            PixelFormat::Mono01,
            ScreenInfo::MONO_VTILED,
            (0, 0),
            (8, 8),
            8,
            8,
            &mut buf,
        );
        let mut s = settings();
        s.bg = 0x00FF_FFFF;
        execute_command(&Command::Fill, &mut fb, &[], &mut s);
        assert_eq!(buf, [0xFFu8; 8]);
    }

    #[test]
    fn test_text_with_empty_catalog_is_a_no_op() {
        let mut buf = [0u8; 8];
        let mut fb = Framebuffer::new(
            PixelFormat::Mono01,
            ScreenInfo::MONO_VTILED,
            (0, 0),
            (8, 8),
            8,
            8,
            &mut buf,
        );
        let mut s = settings();
        execute_command(
            &Command::DrawTextRef {
                x: 0,
                y: 0,
                text: "hi",
            },
            &mut fb,
            &[],
            &mut s,
        );
        assert_eq!(buf, [0u8; 8]);
    }
}
