//! CD5220 customer displays
//!
//! Two lines, each replaced atomically by its own command, so the cursor
//! can stay visible while rows change.

use charlcd_core::{CapacityError, CellSize};

use super::common::{self, esc_upload_glyphs, esc_upload_size};
use super::{PosProtocol, PosState};
use crate::error::ProtocolError;
use crate::writer::CommandWriter;

const MAX_WIDTH: usize = 20;
const MAX_HEIGHT: usize = 2;
const DEFAULT_BRIGHTNESS: u8 = 4;

mod cmd {
    pub const INIT: [u8; 2] = [0x1B, 0x40];
    pub const CURSOR_STATE: [u8; 2] = [0x1B, 0x5F];
    pub const CURSOR_POSITION: [u8; 2] = [0x1B, 0x6C];
    pub const UPPER_LINE: [u8; 3] = [0x1B, 0x51, 0x41];
    pub const LOWER_LINE: [u8; 3] = [0x1B, 0x51, 0x42];
    pub const END_LINE: [u8; 1] = [0x0D];
    pub const BRIGHTNESS: [u8; 2] = [0x1B, 0x2A];
}

fn show(w: &mut CommandWriter<'_>, visible: bool) -> Result<(), CapacityError> {
    w.extend(&cmd::CURSOR_STATE)?;
    w.push(u8::from(visible))
}

fn place(w: &mut CommandWriter<'_>, x: u8, y: u8) -> Result<(), CapacityError> {
    w.extend(&cmd::CURSOR_POSITION)?;
    w.extend(&[x, y])
}

pub struct Cd5220;

impl PosProtocol for Cd5220 {
    fn name(&self) -> &'static str {
        "cd5220"
    }

    fn required_buffer_size(&self, state: &PosState) -> usize {
        let width = state.width();
        let full_update = cmd::UPPER_LINE.len()
            + cmd::LOWER_LINE.len()
            + 2 * (width + cmd::END_LINE.len())
            + cmd::CURSOR_POSITION.len()
            + 2
            + cmd::CURSOR_STATE.len()
            + 1
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

        for row in changed.iter() {
            let start = if row == 0 {
                &cmd::UPPER_LINE
            } else {
                &cmd::LOWER_LINE
            };
            w.extend(start)?;
            w.extend(state.frame.row(row))?;
            w.extend(&cmd::END_LINE)?;
        }
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
