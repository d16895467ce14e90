#![forbid(unsafe_code)]

//! Host-agnostic terminal emulation engine over a unified ring buffer.
//!
//! `ringterm-core` is the platform-independent terminal model at the heart of
//! RingTerm. It owns the scrollback-plus-display cell store, escape-sequence
//! parsing, cursor positioning, and mouse selection geometry, all without any
//! host I/O dependencies.
//!
//! # Primary responsibilities
//!
//! - **Ring buffer**: one contiguous cell array holding history and display,
//!   addressed through a rotating offset so scrolling never copies rows.
//! - **Cell**: one code point + attributes and colors captured at write time.
//! - **Escape parser**: incremental ESC/CSI state machine that accepts input
//!   byte by byte and survives sequences split across writes.
//! - **UTF-8 reassembly**: multi-byte sequences split across writes are
//!   buffered and completed before they reach the grid.
//! - **Cursor**: row/column tracking with deferred wrap at the right edge.
//! - **Selection**: half-cell-precision drag selection in global ring
//!   coordinates, tracking content as it scrolls.
//!
//! # Design principles
//!
//! - **No I/O**: all types are pure data + logic; the host adapter supplies
//!   bytes and renders from queries.
//! - **Deterministic**: identical byte sequences always produce identical
//!   state, regardless of how the bytes are chunked.
//! - **`#![forbid(unsafe_code)]`**: safety enforced at compile time.

pub mod cell;
pub mod cursor;
pub mod engine;
pub mod escape;
pub mod ring;
pub mod selection;
pub mod style;
pub mod utf8;

pub use cell::{Attrib, Cell, Color, pack_rgb};
pub use cursor::CursorPos;
pub use engine::{Margins, OutFlags, RedrawStyle, Terminal};
pub use escape::{EscapeSeq, ParseResult};
pub use ring::{MAX_RING_DIM, RingBuffer, RingError};
pub use selection::{Selection, SelectionState};
pub use style::{Palette, StyleState};
pub use utf8::{PartialUtf8, is_continuation, utf8_len};
