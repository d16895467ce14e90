//! Composition root: owns the ring, cursor, pen, parser, reassembler and
//! selection, and turns a byte stream into grid mutations.
//!
//! The write path is `append*` -> UTF-8 reassembly -> per-character
//! dispatch. Each completed character is either handed to the escape
//! parser, handled as a control character, or written at the cursor with
//! the current pen. Render backends read back through the query methods
//! and the `modified` flag; the engine itself never draws and never blocks.

use std::fmt;
use std::fmt::Write as _;

use bitflags::bitflags;
use unicode_width::UnicodeWidthChar;

use crate::cell::{Attrib, Cell, Color, pack_rgb};
use crate::cursor::CursorPos;
use crate::escape::{EscapeSeq, ParseResult};
use crate::ring::{RingBuffer, RingError};
use crate::selection::Selection;
use crate::style::{Palette, StyleState};
use crate::utf8::{PartialUtf8, is_continuation, utf8_len};

/// `print_fmt` scratch cap in bytes; longer output is truncated.
const PRINTF_MAX: usize = 1024;

/// Glyph written for undecodable or unknown input when `show_unknown` is on.
const UNKNOWN_CHAR: char = '¿';

bitflags! {
    /// Line-ending translation applied to ingested CR/LF characters.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct OutFlags: u8 {
        /// CR also feeds the line.
        const CR_TO_LF  = 0x01;
        /// LF only returns the carriage.
        const LF_TO_CR  = 0x02;
        /// LF returns the carriage and feeds the line.
        const LF_TO_CRLF = 0x04;
    }
}

impl OutFlags {
    /// No translation: CR returns the carriage, LF feeds the line.
    pub const OFF: OutFlags = OutFlags::empty();
}

/// How the external driver should schedule redraws.
///
/// The engine only maintains the `modified` flag; any timers live in the
/// driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RedrawStyle {
    /// Driver never redraws on writes; it repaints on its own schedule.
    NoRedraw,
    /// Driver polls `take_modified()` at most once per `redraw_rate`.
    #[default]
    RateLimited,
    /// Driver redraws after every write call.
    PerWrite,
}

/// Pixel margins around the grid, consumed by the render backend only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Margins {
    pub left: usize,
    pub right: usize,
    pub top: usize,
    pub bottom: usize,
}

impl Default for Margins {
    fn default() -> Self {
        Self {
            left: 3,
            right: 3,
            top: 3,
            bottom: 3,
        }
    }
}

fn default_tabstops(cols: usize) -> Vec<bool> {
    (0..cols).map(|c| c > 0 && c % 8 == 0).collect()
}

/// The terminal-emulation engine.
pub struct Terminal {
    ring: RingBuffer,
    cursor: CursorPos,
    pen: StyleState,
    escseq: EscapeSeq,
    partial: PartialUtf8,
    selection: Selection,
    tabstops: Vec<bool>,
    ansi: bool,
    show_unknown: bool,
    oflags: OutFlags,
    last_char: Option<char>,
    skip_continuation: bool,
    modified: bool,
    redraw_style: RedrawStyle,
    redraw_rate: f32,
    margins: Margins,
    cursor_fg: u32,
    cursor_bg: u32,
}

impl Terminal {
    /// Create an engine with a blank display and empty scrollback.
    pub fn new(disp_rows: usize, disp_cols: usize, hist_rows: usize) -> Result<Self, RingError> {
        let pen = StyleState::default();
        let ring = RingBuffer::new(disp_rows, disp_cols, hist_rows, &pen)?;
        Ok(Self {
            ring,
            cursor: CursorPos::default(),
            pen,
            escseq: EscapeSeq::default(),
            partial: PartialUtf8::default(),
            selection: Selection::default(),
            tabstops: default_tabstops(disp_cols),
            ansi: true,
            show_unknown: false,
            oflags: OutFlags::OFF,
            last_char: None,
            skip_continuation: false,
            modified: false,
            redraw_style: RedrawStyle::default(),
            redraw_rate: 0.10,
            margins: Margins::default(),
            cursor_fg: pack_rgb(0xff, 0xff, 0xf0),
            cursor_bg: pack_rgb(0x00, 0xd0, 0x00),
        })
    }

    // --- write path -------------------------------------------------------

    /// Append text, interpreting escape sequences when `ansi` is enabled.
    pub fn append(&mut self, s: &str) {
        for ch in s.chars() {
            self.print_char(ch);
        }
    }

    /// Append raw bytes, reassembling UTF-8 sequences split across calls.
    pub fn append_bytes(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.append_byte(b);
        }
    }

    /// Append bytes known to be ASCII, bypassing UTF-8 reassembly.
    pub fn append_ascii(&mut self, s: &str) {
        for b in s.bytes() {
            self.print_char(char::from(b));
        }
    }

    /// Formatted write, truncated at 1024 bytes.
    ///
    /// `append` has no such limit; this cap mirrors the fixed scratch
    /// buffer a printf-style entry point implies.
    pub fn print_fmt(&mut self, args: fmt::Arguments<'_>) {
        let mut s = String::new();
        let _ = s.write_fmt(args);
        if s.len() > PRINTF_MAX {
            let mut end = PRINTF_MAX;
            while !s.is_char_boundary(end) {
                end -= 1;
            }
            s.truncate(end);
        }
        self.append(&s);
    }

    fn append_byte(&mut self, b: u8) {
        if self.skip_continuation {
            if is_continuation(b) {
                return;
            }
            self.skip_continuation = false;
        }
        if self.partial.buflen() == 0 {
            match utf8_len(b) {
                Some(1) => {
                    self.print_char(char::from(b));
                    return;
                }
                Some(_) => {}
                None => {
                    self.unknown_char();
                    self.skip_continuation = true;
                    return;
                }
            }
        } else if !is_continuation(b) {
            // Sequence cut short; the new byte starts over.
            self.partial.clear();
            self.unknown_char();
            self.append_byte(b);
            return;
        }
        if !self.partial.append(b) {
            self.unknown_char();
            self.skip_continuation = true;
            return;
        }
        if self.partial.is_complete() {
            let ch = self.partial.complete_char();
            self.partial.clear();
            match ch {
                Some(c) => self.print_char(c),
                None => self.unknown_char(),
            }
        }
    }

    /// Handle one complete character: escape parsing, control handling, or
    /// a styled write at the cursor.
    pub fn print_char(&mut self, ch: char) {
        if self.ansi {
            if self.escseq.parse_in_progress() {
                self.handle_escseq_char(ch);
                return;
            }
            if ch == '\x1b' {
                self.escseq.parse(0x1b);
                return;
            }
        }
        if ch < ' ' || ch == '\x7f' {
            self.handle_ctrl(ch as u8);
            return;
        }
        self.handle_printable(ch);
    }

    fn handle_escseq_char(&mut self, ch: char) {
        if !ch.is_ascii() {
            self.escseq.reset();
            self.handle_printable(ch);
            return;
        }
        match self.escseq.parse(ch as u8) {
            ParseResult::Success => {}
            ParseResult::Completed => {
                self.dispatch_escseq();
                self.escseq.reset();
            }
            // The offending character goes back through ground handling.
            ParseResult::Fail => self.print_char(ch),
        }
    }

    fn handle_ctrl(&mut self, b: u8) {
        match b {
            0x0d => self.handle_cr(),
            0x0a => self.handle_lf(),
            0x09 => self.tab_right(),
            0x08 => self.cursor.left(1),
            0x07 => {} // BEL
            _ => self.unknown_char(),
        }
    }

    fn handle_cr(&mut self) {
        if self.oflags.contains(OutFlags::CR_TO_LF) {
            self.handle_lf();
            return;
        }
        self.cursor.set_col(0);
    }

    fn handle_lf(&mut self) {
        if self.oflags.contains(OutFlags::LF_TO_CR) {
            self.cursor.set_col(0);
            return;
        }
        if self.oflags.contains(OutFlags::LF_TO_CRLF) {
            self.cursor.set_col(0);
        }
        self.cursor_down_scroll(1);
    }

    fn tab_right(&mut self) {
        let cols = self.ring.disp_cols();
        let mut col = self.cursor.col() + 1;
        while col < cols && !self.tabstops[col] {
            col += 1;
        }
        self.cursor.set_col(col.min(cols - 1));
    }

    fn handle_printable(&mut self, ch: char) {
        // Zero-width code points (combining marks) occupy no cell.
        if UnicodeWidthChar::width(ch) == Some(0) {
            return;
        }
        let cols = self.ring.disp_cols();
        if self.cursor.col() >= cols {
            // Deferred wrap from a write into the last column.
            self.cursor.set_col(0);
            self.cursor_down_scroll(1);
        }
        let (row, col) = (self.cursor.row(), self.cursor.col());
        if let Some(cell) = self.ring.disp_cell_mut(row, col) {
            cell.set_char(ch, &self.pen);
        }
        self.last_char = Some(ch);
        self.cursor.right(1);
        self.modified = true;
    }

    /// Write one glyph at an explicit display position with the current
    /// pen. Never moves the cursor, never wraps, never scrolls.
    pub fn plot_char(&mut self, ch: char, drow: usize, dcol: usize) {
        debug_assert!(
            drow < self.ring.disp_rows() && dcol < self.ring.disp_cols(),
            "plot_char position ({drow},{dcol}) out of range"
        );
        if let Some(cell) = self.ring.disp_cell_mut(drow, dcol) {
            cell.set_char(ch, &self.pen);
            self.modified = true;
        }
    }

    fn unknown_char(&mut self) {
        if self.show_unknown {
            self.handle_printable(UNKNOWN_CHAR);
        }
    }

    // --- scrolling --------------------------------------------------------

    fn cursor_down_scroll(&mut self, n: usize) {
        self.cursor.down(n);
        let max = self.ring.disp_rows() - 1;
        if self.cursor.row() > max {
            let overflow = self.cursor.row() - max;
            self.scroll_up(overflow);
            self.cursor.set_row(max);
        }
    }

    fn scroll_up(&mut self, n: usize) {
        self.ring.scroll(n as isize, &self.pen);
        self.selection.scroll(n);
        self.modified = true;
    }

    fn scroll_down(&mut self, n: usize) {
        self.ring.scroll(-(n as isize), &self.pen);
        self.selection.clear();
        self.modified = true;
    }

    // --- escape dispatch --------------------------------------------------

    fn dispatch_escseq(&mut self) {
        if self.escseq.is_csi() {
            self.dispatch_csi();
        } else {
            self.dispatch_esc();
        }
    }

    fn dispatch_esc(&mut self) {
        match self.escseq.esc_mode() {
            b'7' => self.save_cursor(),
            b'8' => self.restore_cursor(),
            b'c' => self.reset_terminal(),
            b'H' => {
                let col = self.cursor.col();
                if let Some(stop) = self.tabstops.get_mut(col) {
                    *stop = true;
                }
            }
            _mode => {
                #[cfg(feature = "tracing")]
                tracing::trace!(mode = char::from(_mode).to_string(), "unhandled escape");
            }
        }
    }

    fn dispatch_csi(&mut self) {
        // DEC private sequences (e.g. CSI ? 25 h) are consumed untouched.
        if self.escseq.private_marker().is_some() {
            #[cfg(feature = "tracing")]
            tracing::trace!(
                mode = char::from(self.escseq.esc_mode()).to_string(),
                "private csi consumed"
            );
            return;
        }
        let rows = self.ring.disp_rows();
        let cols = self.ring.disp_cols();
        match self.escseq.esc_mode() {
            b'A' => {
                let n = self.escseq.defvalmax(1, rows as u32) as usize;
                self.cursor.up(n);
            }
            b'B' => {
                let n = self.escseq.defvalmax(1, rows as u32) as usize;
                self.cursor.down(n);
                self.cursor.set_row(self.cursor.row().min(rows - 1));
            }
            b'C' => {
                let n = self.escseq.defvalmax(1, cols as u32) as usize;
                self.cursor.right(n);
                self.cursor.set_col(self.cursor.col().min(cols - 1));
            }
            b'D' => {
                let n = self.escseq.defvalmax(1, cols as u32) as usize;
                self.cursor.left(n);
            }
            b'H' | b'f' => {
                let r = self.escseq.val(0).clamp(1, rows as u32) as usize - 1;
                let c = self.escseq.val(1).clamp(1, cols as u32) as usize - 1;
                self.cursor.to(r, c);
            }
            b'J' => match self.escseq.val(0) {
                0 => self.clear_eod(),
                1 => self.clear_sod(),
                2 => self.clear_screen(true),
                3 => self.clear_history(),
                _ => {}
            },
            b'K' => match self.escseq.val(0) {
                0 => self.clear_eol(),
                1 => self.clear_sol(),
                2 => self.clear_line(),
                _ => {}
            },
            b'S' => {
                let n = self.escseq.defvalmax(1, rows as u32) as usize;
                self.scroll_up(n);
            }
            b'T' => {
                let n = self.escseq.defvalmax(1, rows as u32) as usize;
                self.scroll_down(n);
            }
            b'@' => {
                let n = self.escseq.defvalmax(1, cols as u32) as usize;
                self.ring
                    .insert_chars(self.cursor.row(), self.cursor.col().min(cols - 1), n, &self.pen);
                self.modified = true;
            }
            b'P' => {
                let n = self.escseq.defvalmax(1, cols as u32) as usize;
                self.ring
                    .delete_chars(self.cursor.row(), self.cursor.col().min(cols - 1), n, &self.pen);
                self.modified = true;
            }
            b'L' => {
                let n = self.escseq.defvalmax(1, rows as u32) as usize;
                self.ring.insert_rows(self.cursor.row(), n, &self.pen);
                self.modified = true;
            }
            b'M' => {
                let n = self.escseq.defvalmax(1, rows as u32) as usize;
                self.ring.delete_rows(self.cursor.row(), n, &self.pen);
                self.modified = true;
            }
            b'b' => {
                let n = self.escseq.defvalmax(1, u32::from(u16::MAX)) as usize;
                if let Some(ch) = self.last_char {
                    for _ in 0..n {
                        self.handle_printable(ch);
                    }
                }
            }
            b'm' => {
                let vals: Vec<u32> = self.escseq.vals().to_vec();
                self.pen.apply_sgr_params(&vals);
            }
            b's' => self.save_cursor(),
            b'u' => self.restore_cursor(),
            b'g' => match self.escseq.val(0) {
                0 => {
                    let col = self.cursor.col();
                    if let Some(stop) = self.tabstops.get_mut(col) {
                        *stop = false;
                    }
                }
                3 => self.tabstops.iter_mut().for_each(|s| *s = false),
                _ => {}
            },
            // Scroll regions are not supported; consume and ignore.
            b'r' => {}
            _mode => {
                #[cfg(feature = "tracing")]
                tracing::trace!(mode = char::from(_mode).to_string(), "unhandled csi");
            }
        }
    }

    fn save_cursor(&mut self) {
        self.escseq.save_cursor(self.cursor.row(), self.cursor.col());
    }

    fn restore_cursor(&mut self) {
        let (row, col) = self.escseq.restore_cursor();
        self.cursor.to(
            row.min(self.ring.disp_rows() - 1),
            col.min(self.ring.disp_cols() - 1),
        );
    }

    // --- clear operations -------------------------------------------------

    /// Blank from the cursor to the end of the display.
    pub fn clear_eod(&mut self) {
        self.clear_eol();
        let rows = self.ring.disp_rows();
        if self.cursor.row() + 1 < rows {
            self.ring
                .clear_disp_rows(self.cursor.row() + 1, rows - 1, &self.pen);
        }
        self.modified = true;
    }

    /// Blank from the start of the display through the cursor.
    pub fn clear_sod(&mut self) {
        if self.cursor.row() > 0 {
            self.ring
                .clear_disp_rows(0, self.cursor.row() - 1, &self.pen);
        }
        self.clear_sol();
        self.modified = true;
    }

    /// Blank from the cursor to the end of its row.
    pub fn clear_eol(&mut self) {
        let col = self.cursor.col().min(self.ring.disp_cols());
        let row = self.cursor.row();
        for cell in &mut self.ring.disp_row_mut(row)[col..] {
            cell.clear(&self.pen);
        }
        self.modified = true;
    }

    /// Blank from the start of the cursor's row through the cursor.
    pub fn clear_sol(&mut self) {
        let col = self.cursor.col().min(self.ring.disp_cols() - 1);
        let row = self.cursor.row();
        for cell in &mut self.ring.disp_row_mut(row)[..=col] {
            cell.clear(&self.pen);
        }
        self.modified = true;
    }

    /// Blank the cursor's row.
    pub fn clear_line(&mut self) {
        let row = self.cursor.row();
        self.clear_line_row(row);
    }

    /// Blank one display row.
    pub fn clear_line_row(&mut self, drow: usize) {
        for cell in self.ring.disp_row_mut(drow) {
            cell.clear(&self.pen);
        }
        self.modified = true;
    }

    /// Blank the display. With `scroll_to_hist` the visible rows scroll
    /// into scrollback instead of being destroyed. Cursor is unaffected.
    pub fn clear_screen(&mut self, scroll_to_hist: bool) {
        if scroll_to_hist {
            let rows = self.ring.disp_rows();
            self.scroll_up(rows);
        } else {
            self.ring.clear_disp(&self.pen);
        }
        self.modified = true;
    }

    /// [`clear_screen`](Self::clear_screen) plus cursor home.
    pub fn clear_screen_home(&mut self, scroll_to_hist: bool) {
        self.clear_screen(scroll_to_hist);
        self.cursor.home();
    }

    /// Drop all scrollback. The display is untouched.
    pub fn clear_history(&mut self) {
        self.ring.clear_hist(&self.pen);
        self.modified = true;
    }

    /// Full reset: default pen, blank display and history, cursor home,
    /// parser and selection cleared, tab stops restored.
    pub fn reset_terminal(&mut self) {
        self.pen.sgr_reset();
        self.ring.clear_disp(&self.pen);
        self.ring.clear_hist(&self.pen);
        self.cursor.home();
        self.escseq.reset();
        self.partial.clear();
        self.skip_continuation = false;
        self.selection.clear();
        self.tabstops = default_tabstops(self.ring.disp_cols());
        self.last_char = None;
        self.modified = true;
    }

    /// Move the cursor to the top-left corner.
    pub fn cursor_home(&mut self) {
        self.cursor.home();
    }

    // --- queries ----------------------------------------------------------

    /// Cursor display row.
    #[must_use]
    pub fn cursor_row(&self) -> usize {
        self.cursor.row()
    }

    /// Cursor display column. May equal `display_columns()` transiently
    /// after a write into the last column, before the deferred wrap.
    #[must_use]
    pub fn cursor_col(&self) -> usize {
        self.cursor.col()
    }

    /// History capacity in rows.
    #[must_use]
    pub fn history_rows(&self) -> usize {
        self.ring.hist_rows()
    }

    /// Populated history rows.
    #[must_use]
    pub fn history_use(&self) -> usize {
        self.ring.hist_use()
    }

    /// Visible display rows.
    #[must_use]
    pub fn display_rows(&self) -> usize {
        self.ring.disp_rows()
    }

    /// Visible display columns.
    #[must_use]
    pub fn display_columns(&self) -> usize {
        self.ring.disp_cols()
    }

    /// Total ring rows (`history_rows + display_rows`).
    #[must_use]
    pub fn ring_rows(&self) -> usize {
        self.ring.ring_rows()
    }

    /// Read access to the ring for render backends.
    #[must_use]
    pub fn ring(&self) -> &RingBuffer {
        &self.ring
    }

    /// Current pen state.
    #[must_use]
    pub fn style(&self) -> &StyleState {
        &self.pen
    }

    /// Code point at a display position.
    #[must_use]
    pub fn utf8_char_at_disp(&self, drow: usize, dcol: usize) -> Option<char> {
        self.ring.disp_cell(drow, dcol).map(Cell::content)
    }

    /// Code point at a ring-relative position (history + display).
    #[must_use]
    pub fn utf8_char_at_glob(&self, grow: usize, gcol: usize) -> Option<char> {
        self.ring.ring_cell(grow, gcol).map(Cell::content)
    }

    /// Cell at a display position.
    #[must_use]
    pub fn cell_at_disp(&self, drow: usize, dcol: usize) -> Option<&Cell> {
        self.ring.disp_cell(drow, dcol)
    }

    /// The visible buffer as a string, rows separated by `\n`, each row
    /// padded to the full display width. With `lines_below_cursor` false
    /// the dump stops at the cursor's row.
    #[must_use]
    pub fn text(&self, lines_below_cursor: bool) -> String {
        let rows = self.ring.disp_rows();
        let last = if lines_below_cursor {
            rows - 1
        } else {
            self.cursor.row().min(rows - 1)
        };
        let mut out = String::with_capacity((last + 1) * (self.ring.disp_cols() + 1));
        for drow in 0..=last {
            if drow > 0 {
                out.push('\n');
            }
            for cell in self.ring.disp_row(drow) {
                out.push(cell.content());
            }
        }
        out
    }

    // --- selection --------------------------------------------------------

    /// Begin a selection at a press on a ring-relative cell; `char_right`
    /// is true when the press hit the right half of the glyph. Returns
    /// true when an existing selection was cleared.
    pub fn start_selection(&mut self, grow: usize, gcol: usize, char_right: bool) -> bool {
        let cleared = self.selection.start_push(grow, gcol, char_right);
        if cleared {
            self.modified = true;
        }
        cleared
    }

    /// Extend the selection on drag. Returns true when it changed.
    pub fn extend_selection(&mut self, grow: usize, gcol: usize, char_right: bool) -> bool {
        let changed = self.selection.extend(grow, gcol, char_right);
        if changed {
            self.modified = true;
        }
        changed
    }

    /// Finalize the selection on release.
    pub fn end_selection(&mut self) {
        self.selection.end_push();
    }

    /// Drop the selection. Returns true when one existed.
    pub fn clear_selection(&mut self) -> bool {
        let had = self.selection.clear();
        if had {
            self.modified = true;
        }
        had
    }

    /// Whether a selection exists.
    #[must_use]
    pub fn is_selection(&self) -> bool {
        self.selection.is_selection()
    }

    /// Selection endpoints in ring coordinates, normalized start <= end.
    #[must_use]
    pub fn get_selection(&self) -> Option<(usize, usize, usize, usize)> {
        self.selection.get_selection()
    }

    /// Whether a ring-relative cell lies inside the selection.
    #[must_use]
    pub fn is_inside_selection(&self, grow: usize, gcol: usize) -> bool {
        self.selection.is_inside(grow, gcol)
    }

    /// Selected text, rows joined by `\n`, trailing blanks trimmed from
    /// all but the last row.
    #[must_use]
    pub fn selection_text(&self) -> String {
        let Some((srow, scol, erow, ecol)) = self.selection.get_selection() else {
            return String::new();
        };
        let cols = self.ring.disp_cols();
        let erow = erow.min(self.ring.ring_rows() - 1);
        let mut out = String::new();
        for grow in srow..=erow {
            let row = self.ring.ring_row(grow);
            let c0 = if grow == srow { scol.min(cols - 1) } else { 0 };
            let c1 = if grow == erow { ecol.min(cols - 1) } else { cols - 1 };
            let line: String = row[c0..=c1].iter().map(Cell::content).collect();
            if grow != erow {
                out.push_str(line.trim_end());
                out.push('\n');
            } else {
                out.push_str(&line);
            }
        }
        out
    }

    /// Select the word (or blank run) at a ring-relative cell.
    pub fn select_word(&mut self, grow: usize, gcol: usize) {
        let cols = self.ring.disp_cols();
        let gcol = gcol.min(cols - 1);
        let row = self.ring.ring_row(grow);
        let in_blank = row[gcol].is_char(' ');
        let mut c0 = gcol;
        while c0 > 0 && row[c0 - 1].is_char(' ') == in_blank {
            c0 -= 1;
        }
        let mut c1 = gcol;
        while c1 + 1 < cols && row[c1 + 1].is_char(' ') == in_blank {
            c1 += 1;
        }
        self.selection.select(grow, c0, grow, c1);
        self.modified = true;
    }

    /// Select an entire ring-relative row.
    pub fn select_line(&mut self, grow: usize) {
        self.selection
            .select(grow, 0, grow, self.ring.disp_cols() - 1);
        self.modified = true;
    }

    // --- configuration ----------------------------------------------------

    /// Whether escape sequences are interpreted.
    #[must_use]
    pub fn ansi(&self) -> bool {
        self.ansi
    }

    /// Enable or disable escape interpretation. Any sequence in progress
    /// is abandoned.
    pub fn set_ansi(&mut self, val: bool) {
        self.ansi = val;
        self.escseq.reset();
    }

    /// Current CR/LF translation flags.
    #[must_use]
    pub fn output_translate(&self) -> OutFlags {
        self.oflags
    }

    /// Set CR/LF translation flags.
    pub fn set_output_translate(&mut self, flags: OutFlags) {
        self.oflags = flags;
    }

    /// Whether undecodable input renders a placeholder glyph.
    #[must_use]
    pub fn show_unknown(&self) -> bool {
        self.show_unknown
    }

    /// Enable or disable the placeholder glyph for undecodable input.
    pub fn set_show_unknown(&mut self, val: bool) {
        self.show_unknown = val;
    }

    /// Rows the display considers occupied: the deepest of the cursor row
    /// and the last row holding any non-blank cell.
    fn used_disp_rows(&self) -> usize {
        let rows = self.ring.disp_rows();
        let mut used = self.cursor.row() + 1;
        for drow in (0..rows).rev() {
            if drow + 1 <= used {
                break;
            }
            if self.ring.disp_row(drow).iter().any(|c| !c.is_char(' ')) {
                used = drow + 1;
                break;
            }
        }
        used
    }

    fn resize(&mut self, rows: usize, cols: usize, hist: usize) -> Result<(), RingError> {
        let used = self.used_disp_rows();
        let pushed = self.ring.resize(rows, cols, hist, used, &self.pen)?;
        self.cursor.to(
            self.cursor.row().saturating_sub(pushed).min(rows - 1),
            self.cursor.col().min(cols),
        );
        self.selection.clear();
        self.tabstops = default_tabstops(cols);
        self.modified = true;
        Ok(())
    }

    /// Change the scrollback capacity, preserving the newest history.
    pub fn set_history_rows(&mut self, hist_rows: usize) -> Result<(), RingError> {
        self.resize(self.ring.disp_rows(), self.ring.disp_cols(), hist_rows)
    }

    /// Change the visible row count. Rows that no longer fit scroll into
    /// history and the cursor follows its line.
    pub fn set_display_rows(&mut self, disp_rows: usize) -> Result<(), RingError> {
        self.resize(disp_rows, self.ring.disp_cols(), self.ring.hist_rows())
    }

    /// Change the visible column count. Content truncates, never rewraps.
    pub fn set_display_columns(&mut self, disp_cols: usize) -> Result<(), RingError> {
        self.resize(self.ring.disp_rows(), disp_cols, self.ring.hist_rows())
    }

    /// Change display rows and columns together.
    pub fn resize_display(&mut self, disp_rows: usize, disp_cols: usize) -> Result<(), RingError> {
        self.resize(disp_rows, disp_cols, self.ring.hist_rows())
    }

    /// Set the pen foreground to a direct RGB color (`0x00RRGGBB`).
    pub fn set_text_fg_color(&mut self, rgb: u32) {
        self.pen.set_fg(Color::from_packed(rgb));
    }

    /// Set the pen background to a direct RGB color (`0x00RRGGBB`).
    pub fn set_text_bg_color(&mut self, rgb: u32) {
        self.pen.set_bg(Color::from_packed(rgb));
    }

    /// Set the pen foreground to a palette index.
    pub fn set_text_fg_color_xterm(&mut self, idx: u8) {
        self.pen.set_fg(Color::Indexed(idx));
    }

    /// Set the pen background to a palette index.
    pub fn set_text_bg_color_xterm(&mut self, idx: u8) {
        self.pen.set_bg(Color::Indexed(idx));
    }

    /// Set the default foreground restored by `SGR 0` / `ESC c`.
    pub fn set_text_fg_color_default(&mut self, rgb: u32) {
        self.pen.set_defaultfg(Color::from_packed(rgb));
    }

    /// Set the default background restored by `SGR 0` / `ESC c`.
    pub fn set_text_bg_color_default(&mut self, rgb: u32) {
        self.pen.set_defaultbg(Color::from_packed(rgb));
    }

    /// Replace the pen's attribute flags.
    pub fn set_text_attrib(&mut self, attrib: Attrib) {
        self.pen.set_attrib(attrib);
    }

    /// Set the selection foreground color.
    pub fn set_selection_fg_color(&mut self, rgb: u32) {
        self.selection.set_selection_fg(rgb);
    }

    /// Set the selection background color.
    pub fn set_selection_bg_color(&mut self, rgb: u32) {
        self.selection.set_selection_bg(rgb);
    }

    /// Selection foreground color.
    #[must_use]
    pub fn selection_fg_color(&self) -> u32 {
        self.selection.selection_fg()
    }

    /// Selection background color.
    #[must_use]
    pub fn selection_bg_color(&self) -> u32 {
        self.selection.selection_bg()
    }

    /// Cursor glyph foreground color.
    #[must_use]
    pub fn cursor_fg_color(&self) -> u32 {
        self.cursor_fg
    }

    /// Cursor glyph background color.
    #[must_use]
    pub fn cursor_bg_color(&self) -> u32 {
        self.cursor_bg
    }

    /// Set the cursor glyph foreground color.
    pub fn set_cursor_fg_color(&mut self, rgb: u32) {
        self.cursor_fg = rgb;
    }

    /// Set the cursor glyph background color.
    pub fn set_cursor_bg_color(&mut self, rgb: u32) {
        self.cursor_bg = rgb;
    }

    /// Pixel margins around the grid.
    #[must_use]
    pub fn margins(&self) -> Margins {
        self.margins
    }

    /// Set the pixel margins around the grid.
    pub fn set_margins(&mut self, margins: Margins) {
        self.margins = margins;
    }

    /// Current redraw scheduling policy.
    #[must_use]
    pub fn redraw_style(&self) -> RedrawStyle {
        self.redraw_style
    }

    /// Set the redraw scheduling policy.
    pub fn set_redraw_style(&mut self, style: RedrawStyle) {
        self.redraw_style = style;
    }

    /// Minimum seconds between rate-limited redraws.
    #[must_use]
    pub fn redraw_rate(&self) -> f32 {
        self.redraw_rate
    }

    /// Set the minimum seconds between rate-limited redraws.
    pub fn set_redraw_rate(&mut self, rate: f32) {
        self.redraw_rate = rate.max(0.0);
    }

    /// Whether content changed since the last [`take_modified`](Self::take_modified).
    #[must_use]
    pub fn modified(&self) -> bool {
        self.modified
    }

    /// Clear and return the modified flag; the external redraw driver
    /// calls this once per render pass.
    pub fn take_modified(&mut self) -> bool {
        std::mem::take(&mut self.modified)
    }

    /// Resolved fg/bg (`0x00RRGGBB`) for a display cell against `palette`,
    /// honoring selection colors when the cell is selected.
    #[must_use]
    pub fn resolve_disp_colors(
        &self,
        drow: usize,
        dcol: usize,
        palette: &Palette,
    ) -> Option<(u32, u32)> {
        let cell = self.ring.disp_cell(drow, dcol)?;
        let grow = self.ring.hist_rows() + drow;
        if self.is_inside_selection(grow, dcol) {
            Some((self.selection.selection_fg(), self.selection.selection_bg()))
        } else {
            Some((cell.fg_color(palette), cell.bg_color(palette)))
        }
    }
}

/// `printf`-style convenience over [`Terminal::print_fmt`].
#[macro_export]
macro_rules! term_printf {
    ($term:expr, $($arg:tt)*) => {
        $term.print_fmt(core::format_args!($($arg)*))
    };
}
