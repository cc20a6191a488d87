//! Encoding shared by several vendors

use charlcd_core::glyph::GLYPH_COLUMNS;
use charlcd_core::{CapacityError, CellSize, FrameBuffer, LineMask, MiscState};

use super::PosState;
use crate::writer::CommandWriter;

/// Code of custom glyph 0
pub const CUSTOM_START: u8 = 0xDF;

/// ESC/POS style glyph upload and activation (CD5220, Epson)
const ESC_UPLOAD: [u8; 3] = [0x1B, 0x26, 0x01];
const ESC_RENDER: [u8; 3] = [0x1B, 0x25, 0x01];
/// Columns announced before each uploaded glyph
const ESC_GLYPH_WIDTH: u8 = GLYPH_COLUMNS as u8;

/// Promille to the 1..=4 scale used by most vendors; never zero
pub fn convert_brightness(promille: u16) -> u8 {
    match promille.min(1000) / 250 {
        0 => 1,
        level => level as u8,
    }
}

/// Level for the current desired state; backlight off means dimmest
pub(crate) fn brightness_level(misc: &MiscState) -> u8 {
    if misc.desired.backlight {
        convert_brightness(misc.desired.brightness)
    } else {
        1
    }
}

pub(crate) fn custom_char_code(state: &PosState, index: usize) -> Result<u8, CapacityError> {
    if index < state.custom_chars {
        Ok(CUSTOM_START + index as u8)
    } else {
        Err(CapacityError::GlyphIndex {
            index,
            capacity: state.custom_chars,
        })
    }
}

/// Drop glyph support the vendor cannot honour, then reserve bar glyphs
pub(crate) fn reserve_glyphs(state: &mut PosState, vendor: &str, glyph_cell: Option<CellSize>) {
    if state.custom_chars > 0 {
        match glyph_cell {
            None => {
                log::warn!("{}: custom characters not supported, disabled", vendor);
                state.custom_chars = 0;
            }
            Some(cell) if cell != state.cell => {
                log::warn!(
                    "{}: custom characters need {}x{} cells, disabled",
                    vendor,
                    cell.width,
                    cell.height
                );
                state.custom_chars = 0;
            }
            Some(_) => {}
        }
    }
    state.glyphs = charlcd_core::glyph::BarGlyphs::allocate(state.custom_chars, state.cell);
}

/// Upload every reserved glyph and make the set active
pub(crate) fn esc_upload_glyphs(
    w: &mut CommandWriter<'_>,
    state: &PosState,
) -> Result<(), CapacityError> {
    let reserved = state.glyphs.reserved();
    if reserved == 0 {
        return Ok(());
    }
    w.extend(&ESC_UPLOAD)?;
    w.push(CUSTOM_START)?;
    w.push(CUSTOM_START + (reserved - 1) as u8)?;
    for bitmap in state.glyphs.column_bitmaps() {
        w.push(ESC_GLYPH_WIDTH)?;
        w.extend(&bitmap)?;
    }
    w.extend(&ESC_RENDER)
}

/// Worst case of [`esc_upload_glyphs`] for `custom_chars` slots
pub(crate) const fn esc_upload_size(custom_chars: usize) -> usize {
    ESC_UPLOAD.len() + 2 + (1 + GLYPH_COLUMNS) * custom_chars + ESC_RENDER.len()
}

/// Rewrite changed rows for vendors without line addressing: go to the
/// first row once, then step down with `down` before each changed row.
pub(crate) fn walk_rows(
    w: &mut CommandWriter<'_>,
    frame: &FrameBuffer,
    changed: LineMask,
    first: &[u8],
    down: &[u8],
) -> Result<(), CapacityError> {
    let mut next_row = None;
    for row in changed.iter() {
        let at = match next_row {
            Some(at) => at,
            None => {
                w.extend(first)?;
                0
            }
        };
        w.repeat(down, row - at)?;
        w.extend(frame.row(row))?;
        next_row = Some(row + 1);
    }
    Ok(())
}

/// Cursor visibility, then position while visible
///
/// `show(w, visible)` and `place(w, x, y)` encode the vendor commands.
pub(crate) fn reconcile_cursor(
    w: &mut CommandWriter<'_>,
    misc: &mut MiscState,
    show: impl Fn(&mut CommandWriter<'_>, bool) -> Result<(), CapacityError>,
    place: impl Fn(&mut CommandWriter<'_>, u8, u8) -> Result<(), CapacityError>,
) -> Result<(), CapacityError> {
    if let Some(visible) = misc.cursor_visibility_change() {
        show(w, visible)?;
        misc.confirm_cursor_visible(visible);
    }
    if let Some((x, y)) = misc.cursor_position_change() {
        place(w, x, y)?;
        misc.confirm_cursor_position((x, y));
    }
    Ok(())
}

/// Hide a visible cursor before rows are rewritten character by character
pub(crate) fn hide_cursor_for_rows(
    w: &mut CommandWriter<'_>,
    misc: &mut MiscState,
    changed: LineMask,
    show: impl Fn(&mut CommandWriter<'_>, bool) -> Result<(), CapacityError>,
) -> Result<(), CapacityError> {
    if !changed.is_empty() && misc.confirmed.cursor_visible {
        show(w, false)?;
        misc.confirm_cursor_visible(false);
    }
    Ok(())
}
