//! Font descriptors and glyph access
//!
//! Fonts are read-only bitmaps supplied by the caller when the display
//! session is created; there is no global registry. A font covers one
//! contiguous character range and stores its glyphs either vertically packed
//! (each byte is a column of 8 rows) or horizontally packed (each byte is a
//! row of 8 columns).

use bitflags::bitflags;

bitflags! {
    /// Glyph bitmap layout flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct FontCaps: u8 {
        /// Glyph bytes are columns of 8 vertically adjacent pixels
        const MONO_VPACKED = 1 << 0;
        /// Glyph bytes are rows of 8 horizontally adjacent pixels
        const MONO_HPACKED = 1 << 1;
        /// Bit 7 of a glyph byte is the first (topmost or leftmost) pixel
        const MSB_FIRST = 1 << 2;
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for FontCaps {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "FontCaps({=u8:b})", self.bits());
    }
}

/// A fixed-cell bitmap font
#[derive(Debug, Clone, Copy)]
pub struct Font<'a> {
    width: u8,
    height: u8,
    first_char: u8,
    last_char: u8,
    data: &'a [u8],
    caps: FontCaps,
}

impl<'a> Font<'a> {
    /// Describe a font over a packed glyph table.
    ///
    /// `data` holds `last_char - first_char + 1` glyphs of
    /// [`bytes_per_glyph`](Self::bytes_per_glyph) bytes each.
    pub const fn new(
        width: u8,
        height: u8,
        first_char: u8,
        last_char: u8,
        data: &'a [u8],
        caps: FontCaps,
    ) -> Self {
        Self {
            width,
            height,
            first_char,
            last_char,
            data,
            caps,
        }
    }

    /// Nominal advance width of every glyph
    pub const fn width(&self) -> u8 {
        self.width
    }

    /// Glyph cell height
    pub const fn height(&self) -> u8 {
        self.height
    }

    /// First character covered by this font
    pub const fn first_char(&self) -> u8 {
        self.first_char
    }

    /// Last character covered by this font (inclusive)
    pub const fn last_char(&self) -> u8 {
        self.last_char
    }

    pub const fn caps(&self) -> FontCaps {
        self.caps
    }

    /// Storage bytes per glyph for this packing
    pub const fn bytes_per_glyph(&self) -> usize {
        if self.caps.contains(FontCaps::MONO_VPACKED) {
            self.width as usize * ((self.height as usize + 7) / 8)
        } else {
            ((self.width as usize + 7) / 8) * self.height as usize
        }
    }

    /// Glyph bitmap for `c`, or `None` when the character is outside this
    /// font's range. Callers render out-of-range characters as blank cells.
    pub fn glyph(&self, c: char) -> Option<&'a [u8]> {
        let code = u32::from(c);
        if code < u32::from(self.first_char) || code > u32::from(self.last_char) {
            return None;
        }
        let per_glyph = self.bytes_per_glyph();
        let offset = (code - u32::from(self.first_char)) as usize * per_glyph;
        self.data.get(offset..offset + per_glyph)
    }

    /// Raw column byte `tile` (counting 8-row tiles from the glyph top) of
    /// column `col`. Only meaningful for vertically packed fonts; the tiled
    /// blit path never runs for horizontally packed ones.
    pub(crate) fn glyph_byte(&self, glyph: &[u8], col: usize, tile: usize) -> u8 {
        debug_assert!(self.caps.contains(FontCaps::MONO_VPACKED));
        let idx = col * ((self.height as usize + 7) / 8) + tile;
        glyph.get(idx).copied().unwrap_or(0)
    }

    /// Test one glyph pixel, honoring packing direction and bit order.
    pub(crate) fn glyph_bit(&self, glyph: &[u8], x: usize, y: usize) -> bool {
        let (idx, bit) = if self.caps.contains(FontCaps::MONO_VPACKED) {
            (x * ((self.height as usize + 7) / 8) + y / 8, y % 8)
        } else {
            (y * ((self.width as usize + 7) / 8) + x / 8, x % 8)
        };
        let byte = match glyph.get(idx) {
            Some(b) => *b,
            None => return false,
        };
        let bit = if self.caps.contains(FontCaps::MSB_FIRST) {
            7 - bit
        } else {
            bit
        };
        byte & (1 << bit) != 0
    }
}
