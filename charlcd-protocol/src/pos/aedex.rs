//! AEDEX customer displays
//!
//! Line-oriented and stateless: no cursor, brightness or glyph commands.
//! A 20-column display can have both lines replaced in one command.

use super::common;
use super::{PosProtocol, PosState};
use crate::error::ProtocolError;
use crate::writer::CommandWriter;

/// Longest character stream one command accepts
const MAX_STREAM: usize = 40;
const MAX_HEIGHT: usize = 2;
/// Width at which the both-lines command lines up with the display
const BOTH_LINES_WIDTH: usize = 20;

mod cmd {
    /// Change the attention code to NUL SOH
    pub const ATTENTION: [u8; 6] = [0x21, 0x23, 0x38, 0x20, 0x20, 0x0D];
    pub const BOTH_LINES: [u8; 3] = [0x20, 0x20, 0x39];
    pub const UPPER_LINE: [u8; 3] = [0x20, 0x20, 0x31];
    pub const LOWER_LINE: [u8; 3] = [0x20, 0x20, 0x32];
    pub const END_LINE: [u8; 1] = [0x0D];
}

pub struct Aedex;

impl PosProtocol for Aedex {
    fn name(&self) -> &'static str {
        "aedex"
    }

    fn required_buffer_size(&self, _state: &PosState) -> usize {
        cmd::UPPER_LINE.len() + cmd::LOWER_LINE.len() + 2 * cmd::END_LINE.len() + 2 * MAX_STREAM
    }

    fn init(&self, state: &mut PosState, buf: &mut [u8]) -> Result<usize, ProtocolError> {
        state.check_size(MAX_STREAM, MAX_HEIGHT)?;
        common::reserve_glyphs(state, self.name(), None);

        let mut w = CommandWriter::new(buf);
        w.extend(&cmd::ATTENTION)?;
        w.extend(&cmd::BOTH_LINES)?;
        w.push(b' ')?;
        w.extend(&cmd::END_LINE)?;
        Ok(w.finish())
    }

    fn flush(&self, state: &mut PosState, buf: &mut [u8]) -> Result<usize, ProtocolError> {
        let mut w = CommandWriter::new(buf);
        let changed = state.frame.lines_changed();
        let frame = &state.frame;

        if changed.count() == 2 && frame.width() == BOTH_LINES_WIDTH {
            w.extend(&cmd::BOTH_LINES)?;
            w.extend(frame.rows(0..2))?;
            w.extend(&cmd::END_LINE)?;
        } else {
            for row in changed.iter() {
                let start = if row == 0 {
                    &cmd::UPPER_LINE
                } else {
                    &cmd::LOWER_LINE
                };
                w.extend(start)?;
                w.extend(frame.row(row))?;
                w.extend(&cmd::END_LINE)?;
            }
        }
        Ok(w.finish())
    }
}
