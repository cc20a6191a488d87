//! ESC/POS (Epson) customer displays
//!
//! No atomic line write: rows are rewritten by homing the cursor and
//! stepping down with line feeds. The cursor is hidden during the rewrite
//! so it does not flicker across the screen.

use charlcd_core::{CapacityError, CellSize};

use super::common::{self, esc_upload_glyphs, esc_upload_size};
use super::{PosProtocol, PosState};
use crate::error::ProtocolError;
use crate::writer::CommandWriter;

const MAX_WIDTH: usize = 20;
const MAX_HEIGHT: usize = 4;
const DEFAULT_BRIGHTNESS: u8 = 4;

mod cmd {
    pub const INIT: [u8; 2] = [0x1B, 0x40];
    /// Followed by 0 (off) or 1 (on)
    pub const CURSOR_STATE: [u8; 2] = [0x1F, 0x43];
    /// Followed by 1-based x then y
    pub const CURSOR_POSITION: [u8; 2] = [0x1F, 0x24];
    pub const HOME: [u8; 1] = [0x0B];
    pub const DOWN: [u8; 1] = [0x0A];
    /// Followed by 1..=4
    pub const BRIGHTNESS: [u8; 2] = [0x1F, 0x58];
}

fn show(w: &mut CommandWriter<'_>, visible: bool) -> Result<(), CapacityError> {
    w.extend(&cmd::CURSOR_STATE)?;
    w.push(u8::from(visible))
}

fn place(w: &mut CommandWriter<'_>, x: u8, y: u8) -> Result<(), CapacityError> {
    w.extend(&cmd::CURSOR_POSITION)?;
    w.extend(&[x, y])
}

pub struct Epson;

impl PosProtocol for Epson {
    fn name(&self) -> &'static str {
        "epson"
    }

    fn required_buffer_size(&self, state: &PosState) -> usize {
        let (w, h) = (state.width(), state.height());
        // One addressing command per row, both cursor toggles, a position
        // and a brightness change
        let full_update = (cmd::CURSOR_POSITION.len() + 2) * h
            + w * h
            + (cmd::CURSOR_POSITION.len() + 2)
            + 2 * (cmd::CURSOR_STATE.len() + 1)
            + cmd::BRIGHTNESS.len()
            + 1;
        let init = cmd::INIT.len() + esc_upload_size(state.custom_chars);
        full_update.max(init)
    }

    fn init(&self, state: &mut PosState, buf: &mut [u8]) -> Result<usize, ProtocolError> {
        state.check_size(MAX_WIDTH, MAX_HEIGHT)?;
        common::reserve_glyphs(state, self.name(), Some(CellSize::POS));
        state.misc.confirm_backlight(true);
        state.misc.confirm_brightness(DEFAULT_BRIGHTNESS);

        let mut w = CommandWriter::new(buf);
        w.extend(&cmd::INIT)?;
        esc_upload_glyphs(&mut w, state)?;
        Ok(w.finish())
    }

    fn flush(&self, state: &mut PosState, buf: &mut [u8]) -> Result<usize, ProtocolError> {
        let mut w = CommandWriter::new(buf);
        let changed = state.frame.lines_changed();

        common::hide_cursor_for_rows(&mut w, &mut state.misc, changed, show)?;
        common::walk_rows(&mut w, &state.frame, changed, &cmd::HOME, &cmd::DOWN)?;
        common::reconcile_cursor(&mut w, &mut state.misc, show, place)?;

        let level = common::brightness_level(&state.misc);
        if let Some(level) = state.misc.brightness_change(level) {
            w.extend(&cmd::BRIGHTNESS)?;
            w.push(level)?;
            state.misc.confirm_brightness(level);
        }
        Ok(w.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use charlcd_core::{CursorStyle, Geometry};

    fn state(width: usize, height: usize, chars: usize) -> (PosState, Vec<u8>) {
        let state = PosState::new(Geometry::new(width, height, CellSize::POS), chars).unwrap();
        let size = Epson.required_buffer_size(&state);
        (state, vec![0u8; size])
    }

    #[test]
    fn test_init_without_glyphs() {
        let (mut state, mut buf) = state(20, 2, 0);
        let n = Epson.init(&mut state, &mut buf).unwrap();
        assert_eq!(&buf[..n], &[0x1B, 0x40]);
    }

    #[test]
    fn test_init_uploads_bar_glyphs() {
        let (mut state, mut buf) = state(20, 2, 11);
        let n = Epson.init(&mut state, &mut buf).unwrap();
        assert_eq!(&buf[..7], &[0x1B, 0x40, 0x1B, 0x26, 0x01, 0xDF, 0xDF + 10]);
        // First glyph: one lit column
        assert_eq!(&buf[7..13], &[0x05, 0x7F, 0, 0, 0, 0]);
        assert_eq!(&buf[n - 3..n], &[0x1B, 0x25, 0x01]);
        assert_eq!(n, 2 + 5 + 11 * 6 + 3);
    }

    #[test]
    fn test_glyphs_need_pos_cells() {
        let mut state = PosState::new(Geometry::new(20, 2, CellSize::HD44780), 11).unwrap();
        let mut buf = vec![0u8; Epson.required_buffer_size(&state)];
        let n = Epson.init(&mut state, &mut buf).unwrap();
        assert_eq!(n, 2);
        assert_eq!(state.custom_chars, 0);
        assert!(Epson.custom_char_code(&state, 0).is_err());
    }

    #[test]
    fn test_rows_walk_down_from_home() {
        let (mut state, mut buf) = state(4, 4, 0);
        Epson.init(&mut state, &mut buf).unwrap();
        state.frame.write(1, 2, b"ab");
        state.frame.write(1, 4, b"cd");
        let n = Epson.flush(&mut state, &mut buf).unwrap();
        assert_eq!(
            &buf[..n],
            &[0x0B, 0x0A, b'a', b'b', b' ', b' ', 0x0A, b'c', b'd', b' ', b' ']
        );
    }

    #[test]
    fn test_idle_flush_is_empty() {
        let (mut state, mut buf) = state(20, 2, 0);
        Epson.init(&mut state, &mut buf).unwrap();
        assert_eq!(Epson.flush(&mut state, &mut buf).unwrap(), 0);
    }

    #[test]
    fn test_cursor_hidden_during_rewrite() {
        let (mut state, mut buf) = state(2, 1, 0);
        Epson.init(&mut state, &mut buf).unwrap();
        state.misc.desired.cursor = CursorStyle::On;
        state.misc.desired.cursor_x = 2;
        let n = Epson.flush(&mut state, &mut buf).unwrap();
        assert_eq!(&buf[..n], &[0x1F, 0x43, 0x01, 0x1F, 0x24, 0x02, 0x01]);

        state.frame.write(1, 1, b"hi");
        let n = Epson.flush(&mut state, &mut buf).unwrap();
        assert_eq!(
            &buf[..n],
            &[
                0x1F, 0x43, 0x00, // hide
                0x0B, b'h', b'i', // row
                0x1F, 0x43, 0x01, // show again
                0x1F, 0x24, 0x02, 0x01, // position is unknown after showing
            ]
        );
    }

    #[test]
    fn test_brightness_follows_backlight() {
        let (mut state, mut buf) = state(20, 2, 0);
        Epson.init(&mut state, &mut buf).unwrap();
        state.misc.desired.backlight = false;
        let n = Epson.flush(&mut state, &mut buf).unwrap();
        assert_eq!(&buf[..n], &[0x1F, 0x58, 0x01]);

        state.misc.desired.backlight = true;
        state.misc.desired.brightness = 500;
        let n = Epson.flush(&mut state, &mut buf).unwrap();
        assert_eq!(&buf[..n], &[0x1F, 0x58, 0x02]);
    }

    #[test]
    fn test_custom_char_codes() {
        let (mut state, mut buf) = state(20, 2, 4);
        Epson.init(&mut state, &mut buf).unwrap();
        assert_eq!(Epson.custom_char_code(&state, 0), Ok(0xDF));
        assert_eq!(Epson.custom_char_code(&state, 3), Ok(0xE2));
        assert_eq!(
            Epson.custom_char_code(&state, 4),
            Err(CapacityError::GlyphIndex {
                index: 4,
                capacity: 4
            })
        );
    }
}
