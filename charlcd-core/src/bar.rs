//! Bar graph rendering into a frame buffer
//!
//! Glyph bars resolve to pixel precision through a caller-supplied mapping
//! from lit pixels to a character code. ASCII bars are the fallback for
//! devices without spare glyph slots.

use crate::framebuffer::FrameBuffer;

/// Horizontal bar growing right from (`x`, `y`), `len` cells at 1000 promille
///
/// `glyph(p)` returns the character for a cell with `p` lit columns,
/// `1 <= p <= cell_width`.
pub fn hbar(
    fb: &mut FrameBuffer,
    x: i32,
    y: i32,
    len: usize,
    promille: u16,
    cell_width: u8,
    mut glyph: impl FnMut(u8) -> u8,
) {
    let cell = i64::from(cell_width);
    let right = fb.width() as i64;
    let mut remaining = lit_pixels(len, promille, cell);
    for pos in 0..len {
        let col = i64::from(x) + pos as i64;
        if remaining <= 0 || col > right {
            break;
        }
        if remaining >= cell {
            fb.put(col as i32, y, glyph(cell_width));
        } else {
            fb.put(col as i32, y, glyph(remaining as u8));
            break;
        }
        remaining -= cell;
    }
}

/// Vertical bar growing up from (`x`, `y`), `len` cells at 1000 promille
pub fn vbar(
    fb: &mut FrameBuffer,
    x: i32,
    y: i32,
    len: usize,
    promille: u16,
    cell_height: u8,
    mut glyph: impl FnMut(u8) -> u8,
) {
    let cell = i64::from(cell_height);
    let mut remaining = lit_pixels(len, promille, cell);
    for pos in 0..len {
        let row = i64::from(y) - pos as i64;
        if remaining <= 0 || row < 1 {
            break;
        }
        if remaining >= cell {
            fb.put(x, row as i32, glyph(cell_height));
        } else {
            fb.put(x, row as i32, glyph(remaining as u8));
            break;
        }
        remaining -= cell;
    }
}

fn lit_pixels(len: usize, promille: u16, cell: i64) -> i64 {
    let len = i64::try_from(len).unwrap_or(i64::MAX);
    len.saturating_mul(2 * cell)
        .saturating_add(1)
        .saturating_mul(i64::from(promille.min(1000)))
        / 2000
}

fn coarse_pixels(len: usize, promille: u16, cell: u8) -> i64 {
    let step = (1000 / usize::from(cell).saturating_mul(len).max(1)).max(1) as i64;
    i64::from(promille.min(1000)) / step
}

/// Horizontal bar drawn with `=` (full) and `-` (partial) cells
pub fn ascii_hbar(fb: &mut FrameBuffer, x: i32, y: i32, len: usize, promille: u16, cell_width: u8) {
    if x <= 0 || y <= 0 || y as usize > fb.height() {
        return;
    }
    let cell = i64::from(cell_width);
    let mut pixels = coarse_pixels(len, promille, cell_width);
    for pos in 0..len {
        let col = i64::from(x) + pos as i64;
        if col > fb.width() as i64 {
            return;
        }
        if pixels >= cell * 2 / 3 {
            fb.put(col as i32, y, b'=');
        } else if pixels > cell / 3 {
            fb.put(col as i32, y, b'-');
            break;
        }
        pixels -= cell;
    }
}

/// Vertical bar drawn with `-`, `=` and `%` cells of increasing height
pub fn ascii_vbar(fb: &mut FrameBuffer, x: i32, y: i32, len: usize, promille: u16, cell_height: u8) {
    const MAP: [u8; 8] = [b' ', b' ', b'-', b'-', b'=', b'=', b'%', b'%'];

    if x <= 0 || y <= 0 || x as usize > fb.width() {
        return;
    }
    let cell = i64::from(cell_height);
    let mut pixels = coarse_pixels(len, promille, cell_height);
    for pos in 0..len {
        let row = i64::from(y) - pos as i64;
        if row <= 0 {
            return;
        }
        if pixels >= cell {
            fb.put(x, row as i32, b'%');
        } else if pixels > 0 {
            fb.put(x, row as i32, MAP[(pixels as usize).min(MAP.len() - 1)]);
            break;
        }
        pixels -= cell;
    }
}
