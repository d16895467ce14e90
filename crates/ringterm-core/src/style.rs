//! Pen state: the attributes and colors applied to newly written cells.
//!
//! One [`StyleState`] lives in the engine and is mutated continuously by SGR
//! sequences and the color/attribute setters. A second pair of default
//! colors is kept alongside the current pair so `SGR 0` (and `SGR 39`/`49`)
//! can restore them.

use crate::cell::{Attrib, Color, pack_rgb};

/// The xterm 256-color palette, resolved to packed `0x00RRGGBB` values.
///
/// Slots 0-15 are the standard + bright ANSI colors, 16-231 the 6x6x6 color
/// cube, 232-255 the grayscale ramp. Callers may overwrite individual slots
/// to retheme palette-indexed cells without touching stored content.
#[derive(Debug, Clone)]
pub struct Palette {
    colors: [u32; 256],
}

/// Standard xterm values for the 16 ANSI colors.
const ANSI16: [u32; 16] = [
    0x000000, 0xcd0000, 0x00cd00, 0xcdcd00, 0x0000ee, 0xcd00cd, 0x00cdcd, 0xe5e5e5, 0x7f7f7f,
    0xff0000, 0x00ff00, 0xffff00, 0x5c5cff, 0xff00ff, 0x00ffff, 0xffffff,
];

impl Default for Palette {
    fn default() -> Self {
        let mut colors = [0u32; 256];
        colors[..16].copy_from_slice(&ANSI16);
        // 6x6x6 cube: levels 0, 95, 135, 175, 215, 255.
        const LEVELS: [u8; 6] = [0, 95, 135, 175, 215, 255];
        for r in 0..6 {
            for g in 0..6 {
                for b in 0..6 {
                    let idx = 16 + 36 * r + 6 * g + b;
                    colors[idx] = pack_rgb(LEVELS[r], LEVELS[g], LEVELS[b]);
                }
            }
        }
        // Grayscale ramp: 8, 18, 28, .. 238.
        for i in 0..24 {
            let v = (8 + 10 * i) as u8;
            colors[232 + i] = pack_rgb(v, v, v);
        }
        Self { colors }
    }
}

impl Palette {
    /// Look up a palette slot.
    #[must_use]
    pub fn get(&self, idx: u8) -> u32 {
        self.colors[idx as usize]
    }

    /// Overwrite a palette slot with a packed `0x00RRGGBB` value.
    pub fn set(&mut self, idx: u8, rgb: u32) {
        self.colors[idx as usize] = rgb & 0x00ff_ffff;
    }
}

/// Current pen state used for new writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StyleState {
    attrib: Attrib,
    fg: Color,
    bg: Color,
    defaultfg: Color,
    defaultbg: Color,
}

impl Default for StyleState {
    fn default() -> Self {
        Self {
            attrib: Attrib::empty(),
            fg: Color::Indexed(7),
            bg: Color::Indexed(0),
            defaultfg: Color::Indexed(7),
            defaultbg: Color::Indexed(0),
        }
    }
}

impl StyleState {
    /// Current attribute flags.
    #[must_use]
    pub fn attrib(&self) -> Attrib {
        self.attrib
    }

    /// Replace the attribute flags wholesale.
    pub fn set_attrib(&mut self, val: Attrib) {
        self.attrib = val;
    }

    /// Current foreground color.
    #[must_use]
    pub fn fg(&self) -> Color {
        self.fg
    }

    /// Current background color.
    #[must_use]
    pub fn bg(&self) -> Color {
        self.bg
    }

    /// Set the current foreground color.
    pub fn set_fg(&mut self, val: Color) {
        self.fg = val;
    }

    /// Set the current background color.
    pub fn set_bg(&mut self, val: Color) {
        self.bg = val;
    }

    /// Default foreground restored by `SGR 0` / `SGR 39`.
    #[must_use]
    pub fn defaultfg(&self) -> Color {
        self.defaultfg
    }

    /// Default background restored by `SGR 0` / `SGR 49`.
    #[must_use]
    pub fn defaultbg(&self) -> Color {
        self.defaultbg
    }

    /// Change the default foreground (does not touch the current pen color).
    pub fn set_defaultfg(&mut self, val: Color) {
        self.defaultfg = val;
    }

    /// Change the default background (does not touch the current pen color).
    pub fn set_defaultbg(&mut self, val: Color) {
        self.defaultbg = val;
    }

    /// `SGR 0`: clear all attributes and restore default colors.
    pub fn sgr_reset(&mut self) {
        self.attrib = Attrib::empty();
        self.fg = self.defaultfg;
        self.bg = self.defaultbg;
    }

    fn onoff(&mut self, flag: bool, a: Attrib) {
        if flag {
            self.attrib.insert(a);
        } else {
            self.attrib.remove(a);
        }
    }

    /// `SGR 1` / `SGR 22`.
    pub fn sgr_bold(&mut self, val: bool) {
        self.onoff(val, Attrib::BOLD);
    }

    /// `SGR 2` / `SGR 22`.
    pub fn sgr_dim(&mut self, val: bool) {
        self.onoff(val, Attrib::DIM);
    }

    /// `SGR 3` / `SGR 23`.
    pub fn sgr_italic(&mut self, val: bool) {
        self.onoff(val, Attrib::ITALIC);
    }

    /// `SGR 4` / `SGR 24`.
    pub fn sgr_underline(&mut self, val: bool) {
        self.onoff(val, Attrib::UNDERLINE);
    }

    /// `SGR 7` / `SGR 27`.
    pub fn sgr_inverse(&mut self, val: bool) {
        self.onoff(val, Attrib::INVERSE);
    }

    /// `SGR 9` / `SGR 29`.
    pub fn sgr_strike(&mut self, val: bool) {
        self.onoff(val, Attrib::STRIKEOUT);
    }

    /// Apply a full `CSI ... m` parameter list to the pen.
    ///
    /// An empty list is `SGR 0`. Unsupported parameters are consumed and
    /// ignored so the rest of the list still applies. Extended color forms
    /// `38;2;r;g;b`, `48;2;r;g;b`, `38;5;n` and `48;5;n` consume their
    /// arguments; a truncated extended form aborts the remainder of the
    /// list, matching the sequence already having been consumed.
    pub fn apply_sgr_params(&mut self, params: &[u32]) {
        if params.is_empty() {
            self.sgr_reset();
            return;
        }
        let mut i = 0;
        while i < params.len() {
            match params[i] {
                0 => self.sgr_reset(),
                1 => self.sgr_bold(true),
                2 => self.sgr_dim(true),
                3 => self.sgr_italic(true),
                4 => self.sgr_underline(true),
                5 | 6 | 8 => {} // blink/conceal not supported
                7 => self.sgr_inverse(true),
                9 => self.sgr_strike(true),
                21 => self.sgr_underline(true), // double underline drawn as single
                22 => {
                    self.sgr_bold(false);
                    self.sgr_dim(false);
                }
                23 => self.sgr_italic(false),
                24 => self.sgr_underline(false),
                25 | 28 => {}
                27 => self.sgr_inverse(false),
                29 => self.sgr_strike(false),
                30..=37 => self.fg = Color::Indexed((params[i] - 30) as u8),
                39 => self.fg = self.defaultfg,
                40..=47 => self.bg = Color::Indexed((params[i] - 40) as u8),
                49 => self.bg = self.defaultbg,
                90..=97 => self.fg = Color::Indexed((params[i] - 90 + 8) as u8),
                100..=107 => self.bg = Color::Indexed((params[i] - 100 + 8) as u8),
                38 | 48 => {
                    let Some((color, used)) = extended_color(&params[i + 1..]) else {
                        return;
                    };
                    if params[i] == 38 {
                        self.fg = color;
                    } else {
                        self.bg = color;
                    }
                    i += used;
                }
                _ => {}
            }
            i += 1;
        }
    }
}

/// Decode the tail of a `38`/`48` extended color: `2;r;g;b` or `5;n`.
///
/// Returns the color and the number of parameters consumed.
fn extended_color(rest: &[u32]) -> Option<(Color, usize)> {
    match rest.first()? {
        2 => {
            if rest.len() < 4 {
                return None;
            }
            let (r, g, b) = (rest[1].min(255), rest[2].min(255), rest[3].min(255));
            Some((Color::Rgb(r as u8, g as u8, b as u8), 4))
        }
        5 => {
            let n = *rest.get(1)?;
            Some((Color::Indexed(n.min(255) as u8), 2))
        }
        _ => None,
    }
}
