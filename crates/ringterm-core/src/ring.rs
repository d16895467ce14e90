//! Circular row store holding scrollback history and the visible display.
//!
//! One flat allocation of `ring_rows = hist_rows + disp_rows` rows rotates
//! under an `offset`; scrolling is offset arithmetic, never a row copy. At
//! any instant the ring is partitioned into the history region (capacity
//! `hist_rows`, of which `hist_use` are populated) followed circularly by
//! the display region (`disp_rows`, always fully populated).
//!
//! Three coordinate systems address the same cells:
//! - ring-relative: `0..ring_rows`, 0 = top of history capacity
//! - history-relative: `0..hist_rows`, only the last `hist_use` populated
//! - display-relative: `0..disp_rows`, the visible screen
//!
//! All resolve through modular arithmetic over `offset`. Row and cell
//! references are invalidated by `scroll` and `resize`.

use std::fmt;

use crate::cell::Cell;
use crate::style::StyleState;

/// Upper bound on any single ring dimension.
pub const MAX_RING_DIM: usize = 65_535;

/// Construction and resize failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RingError {
    /// Zero display dimension, or a dimension above [`MAX_RING_DIM`].
    BadDimensions {
        disp_rows: usize,
        disp_cols: usize,
        hist_rows: usize,
    },
}

impl fmt::Display for RingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            RingError::BadDimensions {
                disp_rows,
                disp_cols,
                hist_rows,
            } => write!(
                f,
                "bad ring dimensions: display {disp_rows}x{disp_cols}, history {hist_rows}"
            ),
        }
    }
}

impl std::error::Error for RingError {}

fn validate(disp_rows: usize, disp_cols: usize, hist_rows: usize) -> Result<(), RingError> {
    if disp_rows == 0
        || disp_cols == 0
        || disp_rows > MAX_RING_DIM
        || disp_cols > MAX_RING_DIM
        || hist_rows > MAX_RING_DIM
    {
        return Err(RingError::BadDimensions {
            disp_rows,
            disp_cols,
            hist_rows,
        });
    }
    Ok(())
}

/// The circular history + display row store.
#[derive(Debug, Clone)]
pub struct RingBuffer {
    cells: Vec<Cell>,
    ring_rows: usize,
    ring_cols: usize,
    hist_rows: usize,
    hist_use: usize,
    disp_rows: usize,
    offset: usize,
}

impl RingBuffer {
    /// Allocate a ring of `disp_rows + hist_rows` rows by `disp_cols`
    /// columns, all cells blanked with `style`'s colors.
    pub fn new(
        disp_rows: usize,
        disp_cols: usize,
        hist_rows: usize,
        style: &StyleState,
    ) -> Result<Self, RingError> {
        validate(disp_rows, disp_cols, hist_rows)?;
        let ring_rows = hist_rows + disp_rows;
        Ok(Self {
            cells: vec![Cell::blank(style); ring_rows * disp_cols],
            ring_rows,
            ring_cols: disp_cols,
            hist_rows,
            hist_use: 0,
            disp_rows,
            offset: 0,
        })
    }

    /// Total rows in the ring (`hist_rows + disp_rows`).
    #[must_use]
    pub fn ring_rows(&self) -> usize {
        self.ring_rows
    }

    /// Columns per row (same for every region).
    #[must_use]
    pub fn ring_cols(&self) -> usize {
        self.ring_cols
    }

    /// History capacity in rows.
    #[must_use]
    pub fn hist_rows(&self) -> usize {
        self.hist_rows
    }

    /// Populated history rows (`0..=hist_rows`).
    #[must_use]
    pub fn hist_use(&self) -> usize {
        self.hist_use
    }

    /// Visible display rows.
    #[must_use]
    pub fn disp_rows(&self) -> usize {
        self.disp_rows
    }

    /// Visible display columns.
    #[must_use]
    pub fn disp_cols(&self) -> usize {
        self.ring_cols
    }

    /// Current rotation offset.
    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Physical row index where the history region starts.
    #[must_use]
    pub fn hist_srow(&self) -> usize {
        self.offset % self.ring_rows
    }

    /// Physical row index of the last history row.
    #[must_use]
    pub fn hist_erow(&self) -> usize {
        (self.offset + self.hist_rows + self.ring_rows - 1) % self.ring_rows
    }

    /// Physical row index where the populated part of history starts.
    #[must_use]
    pub fn hist_use_srow(&self) -> usize {
        (self.offset + self.hist_rows - self.hist_use) % self.ring_rows
    }

    /// Physical row index where the display region starts.
    #[must_use]
    pub fn disp_srow(&self) -> usize {
        (self.offset + self.hist_rows) % self.ring_rows
    }

    /// Physical row index of the last display row.
    #[must_use]
    pub fn disp_erow(&self) -> usize {
        (self.offset + self.hist_rows + self.disp_rows - 1) % self.ring_rows
    }

    fn phys_row(&self, phys: usize) -> &[Cell] {
        let start = phys * self.ring_cols;
        &self.cells[start..start + self.ring_cols]
    }

    fn phys_row_mut(&mut self, phys: usize) -> &mut [Cell] {
        let start = phys * self.ring_cols;
        &mut self.cells[start..start + self.ring_cols]
    }

    fn clamp_drow(&self, drow: usize) -> usize {
        debug_assert!(drow < self.disp_rows, "display row {drow} out of range");
        drow.min(self.disp_rows - 1)
    }

    /// Row by ring-relative index (`0..ring_rows`, 0 = top of history).
    #[must_use]
    pub fn ring_row(&self, grow: usize) -> &[Cell] {
        debug_assert!(grow < self.ring_rows, "ring row {grow} out of range");
        let grow = grow.min(self.ring_rows - 1);
        self.phys_row((self.offset + grow) % self.ring_rows)
    }

    /// Row by history-relative index (`0..hist_rows`, 0 = oldest capacity).
    #[must_use]
    pub fn hist_row(&self, hrow: usize) -> &[Cell] {
        debug_assert!(hrow < self.hist_rows, "history row {hrow} out of range");
        let hrow = hrow.min(self.hist_rows.saturating_sub(1));
        self.phys_row((self.offset + hrow) % self.ring_rows)
    }

    /// Populated history row (`0..hist_use`, 0 = oldest populated).
    #[must_use]
    pub fn hist_use_row(&self, hurow: usize) -> &[Cell] {
        debug_assert!(hurow < self.hist_use, "history row {hurow} not populated");
        let hurow = hurow.min(self.hist_use.saturating_sub(1));
        self.phys_row((self.hist_use_srow() + hurow) % self.ring_rows)
    }

    /// Display row (`0..disp_rows`).
    #[must_use]
    pub fn disp_row(&self, drow: usize) -> &[Cell] {
        let drow = self.clamp_drow(drow);
        self.phys_row((self.disp_srow() + drow) % self.ring_rows)
    }

    /// Mutable display row (`0..disp_rows`).
    pub fn disp_row_mut(&mut self, drow: usize) -> &mut [Cell] {
        let drow = self.clamp_drow(drow);
        let phys = (self.disp_srow() + drow) % self.ring_rows;
        self.phys_row_mut(phys)
    }

    /// Cell at a display position, `None` when out of range.
    #[must_use]
    pub fn disp_cell(&self, drow: usize, dcol: usize) -> Option<&Cell> {
        if drow >= self.disp_rows || dcol >= self.ring_cols {
            return None;
        }
        Some(&self.disp_row(drow)[dcol])
    }

    /// Mutable cell at a display position, `None` when out of range.
    pub fn disp_cell_mut(&mut self, drow: usize, dcol: usize) -> Option<&mut Cell> {
        if drow >= self.disp_rows || dcol >= self.ring_cols {
            return None;
        }
        Some(&mut self.disp_row_mut(drow)[dcol])
    }

    /// Cell at a ring-relative position, `None` when out of range.
    #[must_use]
    pub fn ring_cell(&self, grow: usize, gcol: usize) -> Option<&Cell> {
        if grow >= self.ring_rows || gcol >= self.ring_cols {
            return None;
        }
        Some(&self.ring_row(grow)[gcol])
    }

    fn blank_disp_row(&mut self, drow: usize, style: &StyleState) {
        for cell in self.disp_row_mut(drow) {
            cell.clear(style);
        }
    }

    /// Blank a display row range, inclusive.
    pub fn clear_disp_rows(&mut self, srow: usize, erow: usize, style: &StyleState) {
        let srow = self.clamp_drow(srow);
        let erow = self.clamp_drow(erow);
        for drow in srow..=erow {
            self.blank_disp_row(drow, style);
        }
    }

    /// Blank the entire display region.
    pub fn clear_disp(&mut self, style: &StyleState) {
        self.clear_disp_rows(0, self.disp_rows - 1, style);
    }

    /// Drop all scrollback: blank history rows and zero `hist_use`.
    pub fn clear_hist(&mut self, style: &StyleState) {
        for hrow in 0..self.hist_rows {
            let phys = (self.offset + hrow) % self.ring_rows;
            for cell in self.phys_row_mut(phys) {
                cell.clear(style);
            }
        }
        self.hist_use = 0;
    }

    /// Scroll the display by `n` rows.
    ///
    /// Positive `n` scrolls content up: the top `n` display rows rotate
    /// into history (`hist_use` grows, capped at capacity, oldest rows
    /// discarded once full) and `n` blank rows appear at the bottom.
    ///
    /// Negative `n` scrolls content down: up to `hist_use` rows are pulled
    /// back out of history unchanged; any revealed top rows beyond the
    /// populated history come up blank.
    pub fn scroll(&mut self, n: isize, style: &StyleState) {
        if n > 0 {
            let n = (n as usize).min(self.disp_rows);
            self.offset = (self.offset + n) % self.ring_rows;
            self.hist_use = (self.hist_use + n).min(self.hist_rows);
            for drow in self.disp_rows - n..self.disp_rows {
                self.blank_disp_row(drow, style);
            }
        } else if n < 0 {
            let n = n.unsigned_abs().min(self.disp_rows);
            self.offset = (self.offset + self.ring_rows - n) % self.ring_rows;
            let pulled = n.min(self.hist_use);
            self.hist_use -= pulled;
            for drow in 0..n - pulled {
                self.blank_disp_row(drow, style);
            }
        }
        #[cfg(feature = "tracing")]
        tracing::trace!(
            n,
            offset = self.offset,
            hist_use = self.hist_use,
            "ring scroll"
        );
    }

    fn copy_disp_row(&mut self, src_drow: usize, dst_drow: usize) {
        let cols = self.ring_cols;
        let src = (self.disp_srow() + src_drow) % self.ring_rows * cols;
        let dst = (self.disp_srow() + dst_drow) % self.ring_rows * cols;
        self.cells.copy_within(src..src + cols, dst);
    }

    /// Insert `n` blank cells at `(drow, dcol)`, shifting the rest of the
    /// row right. Cells pushed past the last column are dropped.
    pub fn insert_chars(&mut self, drow: usize, dcol: usize, n: usize, style: &StyleState) {
        let drow = self.clamp_drow(drow);
        let cols = self.ring_cols;
        if dcol >= cols || n == 0 {
            return;
        }
        let n = n.min(cols - dcol);
        let row = self.disp_row_mut(drow);
        row.copy_within(dcol..cols - n, dcol + n);
        for cell in &mut row[dcol..dcol + n] {
            cell.clear(style);
        }
    }

    /// Delete `n` cells at `(drow, dcol)`, shifting the rest of the row
    /// left and blanking the vacated tail.
    pub fn delete_chars(&mut self, drow: usize, dcol: usize, n: usize, style: &StyleState) {
        let drow = self.clamp_drow(drow);
        let cols = self.ring_cols;
        if dcol >= cols || n == 0 {
            return;
        }
        let n = n.min(cols - dcol);
        let row = self.disp_row_mut(drow);
        row.copy_within(dcol + n..cols, dcol);
        for cell in &mut row[cols - n..] {
            cell.clear(style);
        }
    }

    /// Insert `n` blank rows at display row `drow`, pushing rows below it
    /// down. Rows pushed past the bottom of the display are dropped.
    pub fn insert_rows(&mut self, drow: usize, n: usize, style: &StyleState) {
        let drow = self.clamp_drow(drow);
        let n = n.min(self.disp_rows - drow);
        if n == 0 {
            return;
        }
        for r in (drow + n..self.disp_rows).rev() {
            self.copy_disp_row(r - n, r);
        }
        for r in drow..drow + n {
            self.blank_disp_row(r, style);
        }
    }

    /// Delete `n` rows at display row `drow`, pulling rows below it up and
    /// blanking the vacated bottom rows.
    pub fn delete_rows(&mut self, drow: usize, n: usize, style: &StyleState) {
        let drow = self.clamp_drow(drow);
        let n = n.min(self.disp_rows - drow);
        if n == 0 {
            return;
        }
        for r in drow..self.disp_rows - n {
            self.copy_disp_row(r + n, r);
        }
        for r in self.disp_rows - n..self.disp_rows {
            self.blank_disp_row(r, style);
        }
    }

    /// Reallocate to new dimensions, preserving the most recent rows.
    ///
    /// `used_disp` is how many top display rows the caller considers
    /// occupied (typically cursor row + 1); trailing blank rows below it
    /// are not preserved. Content is kept bottom-aligned: occupied display
    /// rows stay in the display if they fit, overflowing top rows move
    /// into history, and the newest history fills backward from the
    /// display boundary. Columns truncate, never rewrap.
    ///
    /// Returns the number of previously visible rows pushed into history,
    /// so the caller can shift its cursor up by the same amount. On error
    /// the ring is untouched.
    pub fn resize(
        &mut self,
        disp_rows: usize,
        disp_cols: usize,
        hist_rows: usize,
        used_disp: usize,
        style: &StyleState,
    ) -> Result<usize, RingError> {
        validate(disp_rows, disp_cols, hist_rows)?;
        let used_disp = used_disp.min(self.disp_rows);
        let new_ring_rows = hist_rows + disp_rows;
        let mut cells = vec![Cell::blank(style); new_ring_rows * disp_cols];
        let copy_cols = self.ring_cols.min(disp_cols);

        // Source rows oldest-first: populated history, then occupied display.
        let src_total = self.hist_use + used_disp;
        let disp_keep = used_disp.min(disp_rows);
        let pushed = used_disp - disp_keep;
        let hist_src = src_total - disp_keep;
        let hist_keep = hist_src.min(hist_rows);

        let src_row = |i: usize| -> &[Cell] {
            if i < self.hist_use {
                self.hist_use_row(i)
            } else {
                self.disp_row(i - self.hist_use)
            }
        };
        for k in 0..hist_keep {
            let src = src_row(hist_src - hist_keep + k);
            let dst = (hist_rows - hist_keep + k) * disp_cols;
            cells[dst..dst + copy_cols].copy_from_slice(&src[..copy_cols]);
        }
        for k in 0..disp_keep {
            let src = src_row(hist_src + k);
            let dst = (hist_rows + k) * disp_cols;
            cells[dst..dst + copy_cols].copy_from_slice(&src[..copy_cols]);
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(
            disp_rows,
            disp_cols,
            hist_rows,
            hist_keep,
            pushed,
            "ring resize"
        );

        self.cells = cells;
        self.ring_rows = new_ring_rows;
        self.ring_cols = disp_cols;
        self.disp_rows = disp_rows;
        self.hist_rows = hist_rows;
        self.hist_use = hist_keep;
        self.offset = 0;
        Ok(pushed)
    }
}
