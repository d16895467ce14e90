//! Terminal cell: the fundamental unit of the ring buffer.
//!
//! Each cell stores one code point plus the attributes and colors that were
//! current when it was written. This models the terminal's internal state
//! rather than the rendering pipeline: resolving a cell to concrete RGB
//! values happens on query, against a caller-supplied [`Palette`].

use bitflags::bitflags;

use crate::style::{Palette, StyleState};

bitflags! {
    /// Per-cell text attribute flags.
    ///
    /// Bit values match the classic VT100/xterm attribute set; gaps are
    /// reserved. `INVERSE` swaps fg/bg at resolve time, `BOLD` and `DIM`
    /// adjust palette-indexed colors only.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Attrib: u8 {
        const BOLD      = 0x01;
        const DIM       = 0x02;
        const ITALIC    = 0x04;
        const UNDERLINE = 0x08;
        const INVERSE   = 0x20;
        const STRIKEOUT = 0x80;
    }
}

/// Foreground or background color of a cell.
///
/// Either an index into the xterm 256-color palette or a direct 24-bit RGB
/// value. Palette colors are reinterpreted through a caller-supplied
/// [`Palette`] and are brightened by `BOLD` / darkened by `DIM`; RGB colors
/// are never adjusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    /// Index into the xterm 256-color palette (0-255).
    Indexed(u8),
    /// Direct 24-bit color.
    Rgb(u8, u8, u8),
}

impl Color {
    /// Build an RGB color from a packed `0x00RRGGBB` value.
    #[must_use]
    pub fn from_packed(rgb: u32) -> Self {
        Color::Rgb((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8)
    }

    /// Whether this color is a palette index (as opposed to direct RGB).
    #[must_use]
    pub fn is_palette(&self) -> bool {
        matches!(self, Color::Indexed(_))
    }

    /// Resolve to a packed `0x00RRGGBB` value.
    ///
    /// Palette indices 0-7 are promoted to their bright counterparts (8-15)
    /// under `BOLD`; `DIM` halves each channel after lookup. RGB colors pass
    /// through unchanged.
    #[must_use]
    pub fn resolve(&self, attrib: Attrib, palette: &Palette) -> u32 {
        match *self {
            Color::Rgb(r, g, b) => pack_rgb(r, g, b),
            Color::Indexed(i) => {
                let i = if attrib.contains(Attrib::BOLD) && i < 8 {
                    i + 8
                } else {
                    i
                };
                let rgb = palette.get(i);
                if attrib.contains(Attrib::DIM) {
                    dim_rgb(rgb)
                } else {
                    rgb
                }
            }
        }
    }
}

/// Pack RGB channels into `0x00RRGGBB`.
#[must_use]
pub fn pack_rgb(r: u8, g: u8, b: u8) -> u32 {
    (u32::from(r) << 16) | (u32::from(g) << 8) | u32::from(b)
}

fn dim_rgb(rgb: u32) -> u32 {
    (rgb >> 1) & 0x007f_7f7f
}

/// A single cell in the ring buffer.
///
/// A blank cell is a single space with no attributes. The stored code point
/// always encodes to between 1 and 4 UTF-8 bytes (see [`Cell::len_utf8`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    content: char,
    attrib: Attrib,
    fg: Color,
    bg: Color,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            content: ' ',
            attrib: Attrib::empty(),
            fg: Color::Indexed(7),
            bg: Color::Indexed(0),
        }
    }
}

impl Cell {
    /// Create a cell holding `ch` with the pen's current attributes/colors.
    #[must_use]
    pub fn from_style(ch: char, style: &StyleState) -> Self {
        Self {
            content: ch,
            attrib: style.attrib(),
            fg: style.fg(),
            bg: style.bg(),
        }
    }

    /// Create a blank cell: a space carrying the pen's colors but no
    /// attributes. Used when clearing rows and exposing new ones.
    #[must_use]
    pub fn blank(style: &StyleState) -> Self {
        Self {
            content: ' ',
            attrib: Attrib::empty(),
            fg: style.fg(),
            bg: style.bg(),
        }
    }

    /// The code point stored in this cell.
    #[must_use]
    pub fn content(&self) -> char {
        self.content
    }

    /// Number of bytes the stored code point occupies in UTF-8 (1-4).
    #[must_use]
    pub fn len_utf8(&self) -> usize {
        self.content.len_utf8()
    }

    /// The attribute flags recorded when this cell was written.
    #[must_use]
    pub fn attrib(&self) -> Attrib {
        self.attrib
    }

    /// Foreground color as written (before palette resolution).
    #[must_use]
    pub fn fg(&self) -> Color {
        self.fg
    }

    /// Background color as written (before palette resolution).
    #[must_use]
    pub fn bg(&self) -> Color {
        self.bg
    }

    /// Whether this cell holds exactly `c`.
    #[must_use]
    pub fn is_char(&self, c: char) -> bool {
        self.content == c
    }

    /// Replace the content and restyle from the pen.
    pub fn set_char(&mut self, ch: char, style: &StyleState) {
        *self = Self::from_style(ch, style);
    }

    /// Reset to a blank space carrying the pen's colors.
    pub fn clear(&mut self, style: &StyleState) {
        *self = Self::blank(style);
    }

    /// Resolved foreground color (`0x00RRGGBB`), honoring `INVERSE` swap and
    /// `BOLD`/`DIM` palette adjustment.
    #[must_use]
    pub fn fg_color(&self, palette: &Palette) -> u32 {
        if self.attrib.contains(Attrib::INVERSE) {
            self.bg.resolve(self.attrib, palette)
        } else {
            self.fg.resolve(self.attrib, palette)
        }
    }

    /// Resolved background color (`0x00RRGGBB`), honoring `INVERSE` swap.
    #[must_use]
    pub fn bg_color(&self, palette: &Palette) -> u32 {
        if self.attrib.contains(Attrib::INVERSE) {
            self.fg.resolve(self.attrib, palette)
        } else {
            self.bg.resolve(self.attrib, palette)
        }
    }
}
