//! End-to-end behavior tests driving [`Terminal`] through its public byte
//! ingest API, the way a host adapter would.

use ringterm_core::{Attrib, Color, OutFlags, Palette, Terminal, term_printf};

fn term(rows: usize, cols: usize, hist: usize) -> Terminal {
    Terminal::new(rows, cols, hist).unwrap()
}

/// Display text with per-row trailing blanks and trailing blank rows removed.
fn screen(term: &Terminal) -> String {
    let mut out: String = term
        .text(true)
        .lines()
        .map(|l| l.trim_end())
        .collect::<Vec<_>>()
        .join("\n");
    while out.ends_with('\n') {
        out.pop();
    }
    out
}

#[test]
fn crlf_splits_lines() {
    let mut t = term(4, 10, 10);
    t.append("Hello\r\nWorld");
    assert_eq!(screen(&t), "Hello\nWorld");
    assert_eq!((t.cursor_row(), t.cursor_col()), (1, 5));
}

#[test]
fn lf_alone_keeps_column() {
    let mut t = term(4, 10, 10);
    t.append("ab\ncd");
    assert_eq!(screen(&t), "ab\n  cd");
    assert_eq!((t.cursor_row(), t.cursor_col()), (1, 4));
}

#[test]
fn sgr_red_applies_to_following_text() {
    let mut t = term(4, 10, 10);
    t.append("Hello\r\n\x1b[31mWorld");
    let plain = t.cell_at_disp(0, 0).unwrap();
    assert_eq!(plain.fg(), Color::Indexed(7));
    let red = t.cell_at_disp(1, 0).unwrap();
    assert_eq!(red.fg(), Color::Indexed(1));
    assert!(red.fg().is_palette());
    assert_eq!(red.attrib(), Attrib::empty());
}

#[test]
fn sgr_truecolor_foreground() {
    let mut t = term(2, 10, 0);
    t.append("\x1b[38;2;10;20;30mX");
    let cell = t.cell_at_disp(0, 0).unwrap();
    assert_eq!(cell.fg(), Color::Rgb(10, 20, 30));
    assert!(!cell.fg().is_palette());
}

#[test]
fn sgr_reset_restores_defaults() {
    let mut t = term(2, 10, 0);
    t.append("\x1b[1;4;31ma\x1b[0mb");
    let a = t.cell_at_disp(0, 0).unwrap();
    assert!(a.attrib().contains(Attrib::BOLD | Attrib::UNDERLINE));
    assert_eq!(a.fg(), Color::Indexed(1));
    let b = t.cell_at_disp(0, 1).unwrap();
    assert_eq!(b.attrib(), Attrib::empty());
    assert_eq!(b.fg(), Color::Indexed(7));
}

#[test]
fn bold_red_resolves_to_bright_red() {
    let mut t = term(2, 10, 0);
    t.append("\x1b[1;31mX");
    let palette = Palette::default();
    let (fg, _bg) = t.resolve_disp_colors(0, 0, &palette).unwrap();
    assert_eq!(fg, palette.get(9));
}

#[test]
fn long_line_wraps_to_next_row() {
    let mut t = term(4, 10, 10);
    t.append(&"A".repeat(15));
    assert_eq!(t.text(true).lines().next().unwrap(), "AAAAAAAAAA");
    assert_eq!(screen(&t).lines().nth(1).unwrap(), "AAAAA");
    assert_eq!((t.cursor_row(), t.cursor_col()), (1, 5));
}

#[test]
fn wrap_is_deferred_until_next_glyph() {
    let mut t = term(4, 10, 10);
    t.append(&"A".repeat(10));
    // Cursor rests past the last column without wrapping yet.
    assert_eq!((t.cursor_row(), t.cursor_col()), (0, 10));
    t.append("B");
    assert_eq!((t.cursor_row(), t.cursor_col()), (1, 1));
    assert_eq!(t.utf8_char_at_disp(1, 0), Some('B'));
}

#[test]
fn wrap_at_bottom_scrolls_into_history() {
    let mut t = term(2, 5, 10);
    t.append("aaaaabbbbbccccc");
    assert_eq!(screen(&t), "bbbbb\nccccc");
    assert_eq!(t.history_use(), 1);
    let newest_hist = t.history_rows() - 1;
    assert_eq!(t.utf8_char_at_glob(newest_hist, 0), Some('a'));
}

#[test]
fn escape_split_across_appends() {
    let mut t = term(2, 10, 0);
    t.append("\x1b[3");
    t.append("1mRed");
    assert_eq!(screen(&t), "Red");
    assert_eq!(t.cell_at_disp(0, 0).unwrap().fg(), Color::Indexed(1));
}

#[test]
fn utf8_split_across_append_bytes() {
    let mut t = term(2, 10, 0);
    t.append_bytes(&[0xE2, 0x82]);
    t.append_bytes(&[0xAC]);
    assert_eq!(t.utf8_char_at_disp(0, 0), Some('€'));
    assert_eq!(t.cursor_col(), 1);
}

#[test]
fn invalid_byte_renders_placeholder_when_enabled() {
    let mut t = term(2, 10, 0);
    t.set_show_unknown(true);
    t.append_bytes(&[0xFF, b'x']);
    assert_eq!(t.utf8_char_at_disp(0, 0), Some('¿'));
    assert_eq!(t.utf8_char_at_disp(0, 1), Some('x'));
}

#[test]
fn combining_mark_occupies_no_cell() {
    let mut t = term(2, 10, 0);
    t.append("e\u{0301}x");
    assert_eq!(t.utf8_char_at_disp(0, 0), Some('e'));
    assert_eq!(t.utf8_char_at_disp(0, 1), Some('x'));
    assert_eq!(t.cursor_col(), 2);
}

#[test]
fn scroll_up_then_down_round_trips() {
    let mut t = term(3, 10, 10);
    t.append("one\r\ntwo\r\nthree");
    let before = screen(&t);
    t.append("\x1b[2S");
    assert_eq!(t.history_use(), 2);
    assert_eq!(screen(&t), "three");
    t.append("\x1b[2T");
    assert_eq!(t.history_use(), 0);
    assert_eq!(screen(&t), before);
}

#[test]
fn history_evicts_oldest_at_capacity() {
    let mut t = term(2, 5, 2);
    t.append("r0\r\nr1\r\nr2\r\nr3\r\nr4");
    assert_eq!(t.history_use(), 2);
    // Newest two scrolled-out rows survive; older ones are gone.
    assert_eq!(t.utf8_char_at_glob(1, 1), Some('2'));
    assert_eq!(t.utf8_char_at_glob(0, 1), Some('1'));
}

#[test]
fn ed2_scrolls_display_into_history() {
    let mut t = term(3, 10, 10);
    t.append("one\r\ntwo\r\nthree");
    t.append("\x1b[2J");
    assert_eq!(screen(&t), "");
    assert_eq!(t.history_use(), 3);
    // Cursor stays put; a second clear leaves the display blank.
    assert_eq!(t.cursor_row(), 2);
    t.append("\x1b[2J");
    assert_eq!(screen(&t), "");
}

#[test]
fn ed3_drops_scrollback_only() {
    let mut t = term(2, 5, 5);
    t.append("a\r\nb\r\nc");
    assert_eq!(t.history_use(), 1);
    t.append("\x1b[3J");
    assert_eq!(t.history_use(), 0);
    assert_eq!(screen(&t), "b\nc");
}

#[test]
fn cursor_position_and_relative_moves() {
    let mut t = term(5, 10, 0);
    t.append("\x1b[2;3Hx");
    assert_eq!(t.utf8_char_at_disp(1, 2), Some('x'));
    t.append("\x1b[A\x1b[2Dy");
    assert_eq!(t.utf8_char_at_disp(0, 1), Some('y'));
    // Missing params default to 1 / home.
    t.append("\x1b[Hz");
    assert_eq!(t.utf8_char_at_disp(0, 0), Some('z'));
}

#[test]
fn cursor_moves_clamp_at_edges() {
    let mut t = term(3, 5, 0);
    t.append("\x1b[99A\x1b[99D");
    assert_eq!((t.cursor_row(), t.cursor_col()), (0, 0));
    t.append("\x1b[99B\x1b[99C");
    assert_eq!((t.cursor_row(), t.cursor_col()), (2, 4));
    t.append("\x1b[99;99H");
    assert_eq!((t.cursor_row(), t.cursor_col()), (2, 4));
}

#[test]
fn el_variants_clear_parts_of_line() {
    let mut t = term(2, 5, 0);
    t.append("abcde\x1b[1;3H\x1b[K");
    assert_eq!(screen(&t), "ab");
    t.append("\x1b[1;1Hxyz\x1b[1;2H\x1b[1K");
    assert_eq!(t.utf8_char_at_disp(0, 0), Some(' '));
    assert_eq!(t.utf8_char_at_disp(0, 1), Some(' '));
    assert_eq!(t.utf8_char_at_disp(0, 2), Some('z'));
    t.append("\x1b[2K");
    assert_eq!(screen(&t), "");
}

#[test]
fn ich_and_dch_edit_within_row() {
    let mut t = term(2, 5, 0);
    t.append("abcde\x1b[1;2H\x1b[2@");
    assert_eq!(screen(&t), "a  bc");
    t.append("\x1b[2P");
    assert_eq!(screen(&t), "abc");
}

#[test]
fn il_and_dl_shift_rows() {
    let mut t = term(3, 5, 0);
    t.append("aa\r\nbb\r\ncc\x1b[1;1H\x1b[L");
    assert_eq!(screen(&t), "\naa\nbb");
    t.append("\x1b[M");
    assert_eq!(screen(&t), "aa\nbb");
}

#[test]
fn rep_repeats_last_printed_char() {
    let mut t = term(2, 10, 0);
    t.append("ab\x1b[3b");
    assert_eq!(screen(&t), "abbbb");
}

#[test]
fn save_restore_cursor_esc_and_csi() {
    let mut t = term(5, 10, 0);
    t.append("\x1b[3;4H\x1b7\x1b[1;1H\x1b8");
    assert_eq!((t.cursor_row(), t.cursor_col()), (2, 3));
    t.append("\x1b[2;2H\x1b[s\x1b[4;4H\x1b[u");
    assert_eq!((t.cursor_row(), t.cursor_col()), (1, 1));
}

#[test]
fn tab_stops_every_eight_by_default() {
    let mut t = term(2, 20, 0);
    t.append("\tX");
    assert_eq!(t.utf8_char_at_disp(0, 8), Some('X'));
    t.append("\tY");
    assert_eq!(t.utf8_char_at_disp(0, 16), Some('Y'));
}

#[test]
fn cleared_tab_stops_jump_to_last_column() {
    let mut t = term(2, 20, 0);
    t.append("\x1b[3g\r\tX");
    assert_eq!(t.utf8_char_at_disp(0, 19), Some('X'));
}

#[test]
fn hts_sets_a_custom_stop() {
    let mut t = term(2, 20, 0);
    t.append("\x1b[3g\x1b[1;4H\x1bH\r\tX");
    assert_eq!(t.utf8_char_at_disp(0, 3), Some('X'));
}

#[test]
fn private_csi_sequences_are_consumed() {
    let mut t = term(2, 10, 0);
    t.append("\x1b[?25h\x1b[?1049lX");
    assert_eq!(screen(&t), "X");
}

#[test]
fn unknown_csi_final_is_ignored() {
    let mut t = term(2, 10, 0);
    t.append("\x1b[5qX");
    assert_eq!(screen(&t), "X");
}

#[test]
fn ris_resets_pen_grid_and_cursor() {
    let mut t = term(3, 10, 5);
    t.append("\x1b[1;31mhello\r\nworld\x1bc");
    assert_eq!(screen(&t), "");
    assert_eq!((t.cursor_row(), t.cursor_col()), (0, 0));
    assert_eq!(t.history_use(), 0);
    t.append("x");
    let cell = t.cell_at_disp(0, 0).unwrap();
    assert_eq!(cell.fg(), Color::Indexed(7));
    assert_eq!(cell.attrib(), Attrib::empty());
}

#[test]
fn ansi_disabled_prints_sequences_literally() {
    let mut t = term(2, 10, 0);
    t.set_ansi(false);
    t.append("\x1b[31mX");
    assert_eq!(screen(&t), "[31mX");
}

#[test]
fn lf_to_crlf_translation() {
    let mut t = term(3, 10, 0);
    t.set_output_translate(OutFlags::LF_TO_CRLF);
    t.append("ab\ncd");
    assert_eq!(screen(&t), "ab\ncd");
}

#[test]
fn lf_to_cr_translation() {
    let mut t = term(3, 10, 0);
    t.set_output_translate(OutFlags::LF_TO_CR);
    t.append("ab\ncd");
    assert_eq!(screen(&t), "cd");
    assert_eq!(t.cursor_row(), 0);
}

#[test]
fn cr_to_lf_translation() {
    let mut t = term(3, 10, 0);
    t.set_output_translate(OutFlags::CR_TO_LF);
    t.append("a\rb");
    assert_eq!(t.utf8_char_at_disp(1, 1), Some('b'));
}

#[test]
fn plot_char_writes_without_moving_cursor() {
    let mut t = term(3, 10, 0);
    t.append("ab");
    t.plot_char('Z', 2, 5);
    assert_eq!(t.utf8_char_at_disp(2, 5), Some('Z'));
    assert_eq!((t.cursor_row(), t.cursor_col()), (0, 2));
}

#[test]
fn printf_macro_formats_through_engine() {
    let mut t = term(2, 20, 0);
    term_printf!(t, "x={} y={}", 42, "ok");
    assert_eq!(screen(&t), "x=42 y=ok");
}

#[test]
fn text_without_lines_below_cursor_stops_at_cursor_row() {
    let mut t = term(4, 10, 0);
    t.append("aa\r\nbb");
    t.plot_char('Z', 3, 0);
    assert_eq!(t.text(false).lines().count(), 2);
    assert_eq!(t.text(true).lines().count(), 4);
}

#[test]
fn drag_selection_yields_text() {
    let mut t = term(3, 10, 5);
    t.append("hello you\r\nworld");
    let g0 = t.history_rows();
    assert!(!t.start_selection(g0, 0, false));
    assert!(t.extend_selection(g0 + 1, 4, true));
    t.end_selection();
    assert_eq!(t.selection_text(), "hello you\nworld");
}

#[test]
fn selection_spans_history_and_display() {
    let mut t = term(2, 5, 5);
    t.append("one\r\ntwo\r\nsix");
    assert_eq!(t.history_use(), 1);
    let hist_newest = t.history_rows() - 1;
    t.start_selection(hist_newest, 0, false);
    t.extend_selection(t.history_rows(), 2, true);
    t.end_selection();
    assert_eq!(t.selection_text(), "one\ntwo");
}

#[test]
fn selection_tracks_scrolling_content() {
    let mut t = term(3, 10, 10);
    t.append("alpha\r\nbeta\r\ngamma");
    t.select_word(t.history_rows(), 2);
    assert_eq!(t.selection_text(), "alpha");
    t.append("\r\ndelta");
    // The selected row moved one ring row up into history.
    let (srow, _, _, _) = t.get_selection().unwrap();
    assert_eq!(srow, t.history_rows() - 1);
    assert_eq!(t.selection_text(), "alpha");
}

#[test]
fn select_line_and_word() {
    let mut t = term(2, 10, 0);
    t.append("foo bar");
    let g0 = t.history_rows();
    t.select_word(g0, 5);
    assert_eq!(t.selection_text(), "bar");
    t.select_word(g0, 3);
    assert_eq!(t.selection_text(), " ");
    t.select_line(g0);
    assert_eq!(t.selection_text(), "foo bar   ");
}

#[test]
fn shrinking_display_pushes_rows_into_history() {
    let mut t = term(4, 10, 10);
    t.append("r0\r\nr1\r\nr2");
    assert_eq!(t.cursor_row(), 2);
    t.set_display_rows(2).unwrap();
    assert_eq!(screen(&t), "r1\nr2");
    assert_eq!(t.history_use(), 1);
    assert_eq!((t.cursor_row(), t.cursor_col()), (1, 2));
}

#[test]
fn narrowing_columns_truncates_rows() {
    let mut t = term(2, 10, 5);
    t.append("abcdef");
    t.set_display_columns(3).unwrap();
    assert_eq!(screen(&t), "abc");
    assert_eq!(t.display_columns(), 3);
}

#[test]
fn growing_history_keeps_content() {
    let mut t = term(2, 5, 1);
    t.append("a\r\nb\r\nc");
    assert_eq!(t.history_use(), 1);
    t.set_history_rows(8).unwrap();
    assert_eq!(t.history_rows(), 8);
    assert_eq!(t.history_use(), 1);
    assert_eq!(screen(&t), "b\nc");
    assert_eq!(t.utf8_char_at_glob(7, 0), Some('a'));
}

#[test]
fn resize_rejects_zero_display() {
    let mut t = term(2, 5, 1);
    assert!(t.set_display_rows(0).is_err());
    assert!(t.resize_display(2, 0).is_err());
    assert_eq!(t.display_rows(), 2);
}

#[test]
fn modified_flag_tracks_writes() {
    let mut t = term(2, 5, 0);
    assert!(!t.modified());
    t.append("x");
    assert!(t.take_modified());
    assert!(!t.modified());
    t.append("\x1b[31m");
    // Pen changes alone do not touch the grid.
    assert!(!t.modified());
}

#[test]
fn selected_cells_resolve_to_selection_colors() {
    let mut t = term(2, 5, 0);
    t.append("ab");
    t.select_line(t.history_rows());
    let palette = Palette::default();
    let (fg, bg) = t.resolve_disp_colors(0, 0, &palette).unwrap();
    assert_eq!(fg, t.selection_fg_color());
    assert_eq!(bg, t.selection_bg_color());
    let (fg2, _) = t.resolve_disp_colors(1, 0, &palette).unwrap();
    assert_eq!(fg2, palette.get(7));
}
