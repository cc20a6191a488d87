//! Logic Controls customer displays
//!
//! Single-byte commands, no custom glyphs. Rows are rewritten by moving to
//! the top left once and stepping down with line feeds.

use charlcd_core::CapacityError;

use super::common::{self, convert_brightness};
use super::{PosProtocol, PosState};
use crate::error::ProtocolError;
use crate::writer::CommandWriter;

const MAX_WIDTH: usize = 20;
const MAX_HEIGHT: usize = 2;
const DEFAULT_BRIGHTNESS: u8 = 0xFF;

mod cmd {
    pub const INIT: [u8; 2] = [0x1F, 0x11];
    pub const DOWN: [u8; 1] = [0x0A];
    pub const CURSOR_ON: [u8; 1] = [0x13];
    pub const CURSOR_OFF: [u8; 1] = [0x14];
    /// Followed by the linear cursor offset
    pub const MOVE: [u8; 1] = [0x10];
    pub const BRIGHTNESS: [u8; 1] = [0x04];
}

/// Brightness byte for the 1..=4 scale
fn level_code(level: u8) -> u8 {
    match level {
        2 => 0x40,
        3 => 0x60,
        4 => 0xFF,
        _ => 0x20,
    }
}

/// Linear cursor offset for a 1-based position
///
/// Row one maps to `x - 1` and later rows to `0x13 + x`. The two branches
/// are not symmetric (0x13 + x is 0x14 + (x - 1)); kept as observed on
/// hardware, not confirmed against vendor documentation.
fn cursor_offset(x: u8, y: u8) -> u8 {
    if y > 1 {
        0x13u8.wrapping_add(x)
    } else {
        x.wrapping_sub(1)
    }
}

fn show(w: &mut CommandWriter<'_>, visible: bool) -> Result<(), CapacityError> {
    w.extend(if visible {
        &cmd::CURSOR_ON
    } else {
        &cmd::CURSOR_OFF
    })
}

fn place(w: &mut CommandWriter<'_>, x: u8, y: u8) -> Result<(), CapacityError> {
    w.extend(&cmd::MOVE)?;
    w.push(cursor_offset(x, y))
}

pub struct LogicControls;

impl PosProtocol for LogicControls {
    fn name(&self) -> &'static str {
        "logic controls"
    }

    fn required_buffer_size(&self, state: &PosState) -> usize {
        cmd::MOVE.len()
            + 1
            + cmd::DOWN.len()
            + state.width() * MAX_HEIGHT
            + cmd::CURSOR_ON.len()
            + cmd::CURSOR_OFF.len()
            + cmd::MOVE.len()
            + 1
            + cmd::BRIGHTNESS.len()
            + 1
    }

    fn init(&self, state: &mut PosState, buf: &mut [u8]) -> Result<usize, ProtocolError> {
        state.check_size(MAX_WIDTH, MAX_HEIGHT)?;
        common::reserve_glyphs(state, self.name(), None);
        state.misc.confirm_backlight(true);
        state.misc.confirm_brightness(DEFAULT_BRIGHTNESS);

        let mut w = CommandWriter::new(buf);
        w.extend(&cmd::INIT)?;
        Ok(w.finish())
    }

    fn flush(&self, state: &mut PosState, buf: &mut [u8]) -> Result<usize, ProtocolError> {
        let mut w = CommandWriter::new(buf);
        let changed = state.frame.lines_changed();

        common::hide_cursor_for_rows(&mut w, &mut state.misc, changed, show)?;
        common::walk_rows(&mut w, &state.frame, changed, &[cmd::MOVE[0], 0x00], &cmd::DOWN)?;
        common::reconcile_cursor(&mut w, &mut state.misc, show, place)?;

        let level = if state.misc.desired.backlight {
            level_code(convert_brightness(state.misc.desired.brightness))
        } else {
            level_code(1)
        };
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
    use charlcd_core::{CellSize, CursorStyle, Geometry};

    fn state(width: usize) -> (PosState, Vec<u8>) {
        let state = PosState::new(Geometry::new(width, 2, CellSize::POS), 0).unwrap();
        let size = LogicControls.required_buffer_size(&state);
        (state, vec![0u8; size])
    }

    #[test]
    fn test_cursor_offsets() {
        assert_eq!(cursor_offset(1, 1), 0x00);
        assert_eq!(cursor_offset(20, 1), 0x13);
        assert_eq!(cursor_offset(1, 2), 0x14);
        assert_eq!(cursor_offset(20, 2), 0x27);
    }

    #[test]
    fn test_init() {
        let (mut state, mut buf) = state(20);
        let n = LogicControls.init(&mut state, &mut buf).unwrap();
        assert_eq!(&buf[..n], &[0x1F, 0x11]);
    }

    #[test]
    fn test_no_custom_chars() {
        let mut state = PosState::new(Geometry::new(20, 2, CellSize::POS), 8).unwrap();
        let mut buf = vec![0u8; LogicControls.required_buffer_size(&state)];
        LogicControls.init(&mut state, &mut buf).unwrap();
        assert!(LogicControls.custom_char_code(&state, 0).is_err());
        assert!(!state.glyphs.has_hbar());
    }

    #[test]
    fn test_both_rows() {
        let (mut state, mut buf) = state(2);
        LogicControls.init(&mut state, &mut buf).unwrap();
        state.frame.write(1, 1, b"ab");
        state.frame.write(1, 2, b"cd");
        let n = LogicControls.flush(&mut state, &mut buf).unwrap();
        assert_eq!(&buf[..n], &[0x10, 0x00, b'a', b'b', b'c', b'd']);
    }

    #[test]
    fn test_second_row_cursor() {
        let (mut state, mut buf) = state(20);
        LogicControls.init(&mut state, &mut buf).unwrap();
        state.misc.desired.cursor = CursorStyle::Block;
        state.misc.desired.cursor_x = 3;
        state.misc.desired.cursor_y = 2;
        let n = LogicControls.flush(&mut state, &mut buf).unwrap();
        assert_eq!(&buf[..n], &[0x13, 0x10, 0x16]);
    }

    #[test]
    fn test_brightness_levels() {
        let (mut state, mut buf) = state(20);
        LogicControls.init(&mut state, &mut buf).unwrap();
        assert_eq!(LogicControls.flush(&mut state, &mut buf).unwrap(), 0);

        state.misc.desired.brightness = 600;
        let n = LogicControls.flush(&mut state, &mut buf).unwrap();
        assert_eq!(&buf[..n], &[0x04, 0x40]);

        state.misc.desired.backlight = false;
        let n = LogicControls.flush(&mut state, &mut buf).unwrap();
        assert_eq!(&buf[..n], &[0x04, 0x20]);
    }
}
