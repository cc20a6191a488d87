//! Custom glyph allocation and bitmaps
//!
//! Devices with programmable characters get bar graph glyphs from a bounded
//! table. Allocation is greedy and deterministic: horizontal bars take
//! `cell.width` slots first, vertical bars take `cell.height - 1` slots next,
//! and a kind that does not fit is simply left out (callers fall back to
//! ASCII).
//!
//! Two bitmap layouts are produced:
//!
//! - column-major, one byte per pixel column, used by POS displays
//! - row-major, one byte per pixel row, used by HD44780 CGRAM

use crate::config::CellSize;

/// Largest custom glyph table on any supported device
pub const MAX_CUSTOM_CHARS: usize = 32;

/// Columns in a POS glyph upload
pub const GLYPH_COLUMNS: usize = 5;

/// Rows in one HD44780 CGRAM slot
pub const CGRAM_ROWS: usize = 8;

/// Which bar kinds got glyph slots
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BarGlyphs {
    cell: CellSize,
    hbar: bool,
    vbar: bool,
}

impl BarGlyphs {
    /// No glyphs reserved
    pub const fn none(cell: CellSize) -> Self {
        Self {
            cell,
            hbar: false,
            vbar: false,
        }
    }

    /// Reserve bar glyphs out of `capacity` slots
    pub fn allocate(capacity: usize, cell: CellSize) -> Self {
        let mut remaining = capacity.min(MAX_CUSTOM_CHARS);
        let hbar_slots = usize::from(cell.width);
        let vbar_slots = usize::from(cell.height.saturating_sub(1));

        let hbar = hbar_slots > 0 && remaining >= hbar_slots;
        if hbar {
            remaining -= hbar_slots;
        }
        let vbar = vbar_slots > 0 && remaining >= vbar_slots;

        Self { cell, hbar, vbar }
    }

    pub const fn has_hbar(&self) -> bool {
        self.hbar
    }

    pub const fn has_vbar(&self) -> bool {
        self.vbar
    }

    fn hbar_slots(&self) -> usize {
        if self.hbar {
            usize::from(self.cell.width)
        } else {
            0
        }
    }

    fn vbar_slots(&self) -> usize {
        if self.vbar {
            usize::from(self.cell.height.saturating_sub(1))
        } else {
            0
        }
    }

    /// Slots in use
    pub fn reserved(&self) -> usize {
        self.hbar_slots() + self.vbar_slots()
    }

    /// Slot holding a horizontal bar `pixels` wide (1..=cell width)
    pub fn hbar_index(&self, pixels: u8) -> Option<usize> {
        (self.hbar && (1..=self.cell.width).contains(&pixels)).then(|| usize::from(pixels) - 1)
    }

    /// Slot holding a vertical bar `pixels` high (1..cell height)
    pub fn vbar_index(&self, pixels: u8) -> Option<usize> {
        (self.vbar && pixels >= 1 && pixels < self.cell.height)
            .then(|| self.hbar_slots() + usize::from(pixels) - 1)
    }

    /// Column bitmaps for every reserved slot, in slot order
    pub fn column_bitmaps(&self) -> impl Iterator<Item = [u8; GLYPH_COLUMNS]> + '_ {
        let hbars = (1..=self.cell.width)
            .filter(move |_| self.hbar)
            .map(column_hbar);
        let vbars = (1..self.cell.height)
            .filter(move |_| self.vbar)
            .map(column_vbar);
        hbars.chain(vbars)
    }
}

/// Horizontal bar glyph, `pixels` columns lit from the left
pub fn column_hbar(pixels: u8) -> [u8; GLYPH_COLUMNS] {
    let mut columns = [0u8; GLYPH_COLUMNS];
    for column in columns.iter_mut().take(usize::from(pixels)) {
        *column = 0x7F;
    }
    columns
}

/// Vertical bar glyph, `pixels` rows lit in every column
pub fn column_vbar(pixels: u8) -> [u8; GLYPH_COLUMNS] {
    let bits = if pixels >= 8 {
        0xFF
    } else {
        (1u8 << pixels) - 1
    };
    [bits; GLYPH_COLUMNS]
}

/// Horizontal bar glyph for CGRAM, `pixels` columns lit from the left
pub fn row_hbar(pixels: u8, cell: CellSize) -> [u8; CGRAM_ROWS] {
    let unlit = cell.width.saturating_sub(pixels).min(8);
    let row = !((1u16 << unlit) - 1) as u8;
    let mut rows = [0u8; CGRAM_ROWS];
    for r in rows.iter_mut().take(usize::from(cell.height)) {
        *r = row;
    }
    rows
}

/// Vertical bar glyph for CGRAM, bottom `pixels` rows lit
pub fn row_vbar(pixels: u8, cell: CellSize) -> [u8; CGRAM_ROWS] {
    let height = usize::from(cell.height).min(CGRAM_ROWS);
    let lit = usize::from(pixels).min(height);
    let mut rows = [0u8; CGRAM_ROWS];
    rows[height - lit..height].fill(0xFF);
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocation_both() {
        let glyphs = BarGlyphs::allocate(12, CellSize::POS);
        assert!(glyphs.has_hbar());
        assert!(glyphs.has_vbar());
        assert_eq!(glyphs.reserved(), 11);
        assert_eq!(glyphs.hbar_index(1), Some(0));
        assert_eq!(glyphs.hbar_index(5), Some(4));
        assert_eq!(glyphs.vbar_index(1), Some(5));
        assert_eq!(glyphs.vbar_index(6), Some(10));
        assert_eq!(glyphs.vbar_index(7), None);
    }

    #[test]
    fn test_allocation_hbar_only() {
        let glyphs = BarGlyphs::allocate(6, CellSize::POS);
        assert!(glyphs.has_hbar());
        assert!(!glyphs.has_vbar());
        assert_eq!(glyphs.vbar_index(1), None);
    }

    #[test]
    fn test_allocation_degrades_silently() {
        let glyphs = BarGlyphs::allocate(4, CellSize::POS);
        assert!(!glyphs.has_hbar());
        assert!(!glyphs.has_vbar());
        assert_eq!(glyphs.reserved(), 0);
        // Deterministic for equal inputs
        assert_eq!(BarGlyphs::allocate(4, CellSize::POS), glyphs);
    }

    #[test]
    fn test_vbar_without_hbar() {
        // Five slots: hbar needs 5 and wins, vbar gets nothing
        let glyphs = BarGlyphs::allocate(5, CellSize::POS);
        assert!(glyphs.has_hbar());
        assert!(!glyphs.has_vbar());
    }

    #[test]
    fn test_column_bitmaps() {
        assert_eq!(column_hbar(2), [0x7F, 0x7F, 0, 0, 0]);
        assert_eq!(column_vbar(3), [0x07; 5]);
        let glyphs = BarGlyphs::allocate(32, CellSize::POS);
        assert_eq!(glyphs.column_bitmaps().count(), 11);
    }

    #[test]
    fn test_row_bitmaps() {
        let hbar = row_hbar(1, CellSize::HD44780);
        assert_eq!(hbar[0] & 0x1F, 0x10);
        assert_eq!(row_hbar(5, CellSize::HD44780)[7] & 0x1F, 0x1F);

        let vbar = row_vbar(2, CellSize::HD44780);
        assert_eq!(vbar, [0, 0, 0, 0, 0, 0, 0xFF, 0xFF]);
    }
}
