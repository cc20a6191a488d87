//! Diff engine
//!
//! A [`FrameBuffer`] holds what the caller wants on screen plus a backing
//! store with what was last sent. [`FrameBuffer::lines_changed`] reports the
//! rows that differ and commits them to the backing store in the same call,
//! so a row is reported exactly once per change.
//!
//! Coordinates taken by the write operations are 1-based, matching the
//! addressing used by every caller. Out-of-range writes are clipped.

use alloc::vec;
use alloc::vec::Vec;
use core::ops::Range;

use crate::error::InitError;

/// Widest supported surface
pub const MAX_WIDTH: usize = 200;

/// Tallest supported surface (one bit per row in a [`LineMask`])
pub const MAX_HEIGHT: usize = 32;

/// Set of rows, bit `r` for 0-based row `r`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LineMask(u32);

impl LineMask {
    pub const EMPTY: Self = Self(0);

    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Every row of a `height`-row surface
    pub const fn all(height: usize) -> Self {
        if height >= 32 {
            Self(u32::MAX)
        } else {
            Self((1u32 << height) - 1)
        }
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn contains(self, row: usize) -> bool {
        row < 32 && self.0 & (1 << row) != 0
    }

    pub fn insert(&mut self, row: usize) {
        if row < 32 {
            self.0 |= 1 << row;
        }
    }

    pub const fn count(self) -> u32 {
        self.0.count_ones()
    }

    /// Rows in ascending order
    pub fn iter(self) -> impl Iterator<Item = usize> {
        (0..32).filter(move |&row| self.contains(row))
    }
}

/// Character grid with a backing store of the last transmitted contents
#[derive(Debug, Clone)]
pub struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<u8>,
    backing: Vec<u8>,
    forced: LineMask,
}

impl FrameBuffer {
    /// Create a blank surface; both grids start filled with spaces
    pub fn new(width: usize, height: usize) -> Result<Self, InitError> {
        if !(1..=MAX_WIDTH).contains(&width) || !(1..=MAX_HEIGHT).contains(&height) {
            return Err(InitError::UnsupportedGeometry { width, height });
        }
        Ok(Self {
            width,
            height,
            cells: vec![b' '; width * height],
            backing: vec![b' '; width * height],
            forced: LineMask::EMPTY,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Place bytes starting at column `x`, row `y` (1-based), clipped to the
    /// surface. Bytes left of column 1 are skipped, not shifted.
    pub fn write(&mut self, x: i32, y: i32, text: &[u8]) {
        let Some(row) = self.row_index(y) else {
            return;
        };
        let start = row * self.width;
        for (offset, &byte) in text.iter().enumerate() {
            let col = i64::from(x) - 1 + offset as i64;
            if col < 0 {
                continue;
            }
            let col = col as usize;
            if col >= self.width {
                break;
            }
            self.cells[start + col] = byte;
        }
    }

    /// Place a single byte at column `x`, row `y` (1-based)
    pub fn put(&mut self, x: i32, y: i32, byte: u8) {
        self.write(x, y, &[byte]);
    }

    /// Fill the surface with spaces; the backing store is untouched
    pub fn clear(&mut self) {
        self.cells.fill(b' ');
    }

    /// Report every row on the next [`Self::lines_changed`] call, changed
    /// or not
    pub fn invalidate(&mut self) {
        self.forced = LineMask::all(self.height);
    }

    /// Report `rows` on the next [`Self::lines_changed`] call. Used when a
    /// committed row never reached the device.
    pub fn invalidate_rows(&mut self, rows: LineMask) {
        self.forced = LineMask(self.forced.0 | (rows.0 & LineMask::all(self.height).0));
    }

    /// Rows the next [`Self::lines_changed`] call will report, without
    /// committing them
    pub fn pending(&self) -> LineMask {
        let mut mask = self.forced;
        for row in 0..self.height {
            let span = self.span(row);
            if self.cells[span.clone()] != self.backing[span] {
                mask.insert(row);
            }
        }
        mask
    }

    /// Rows that differ from the backing store; those rows are committed
    pub fn lines_changed(&mut self) -> LineMask {
        let mut mask = core::mem::take(&mut self.forced);
        for row in 0..self.height {
            let span = self.span(row);
            if mask.contains(row) || self.cells[span.clone()] != self.backing[span.clone()] {
                self.backing[span.clone()].copy_from_slice(&self.cells[span]);
                mask.insert(row);
            }
        }
        mask
    }

    /// Contents of 0-based row `row`
    pub fn row(&self, row: usize) -> &[u8] {
        &self.cells[self.span(row)]
    }

    /// Contiguous contents of 0-based rows `rows`
    pub fn rows(&self, rows: Range<usize>) -> &[u8] {
        &self.cells[rows.start * self.width..rows.end * self.width]
    }

    /// Whole surface, row-major
    pub fn cells(&self) -> &[u8] {
        &self.cells
    }

    /// Byte at column `x`, row `y` (1-based)
    pub fn get(&self, x: usize, y: usize) -> Option<u8> {
        if x == 0 || x > self.width || y == 0 || y > self.height {
            return None;
        }
        Some(self.cells[(y - 1) * self.width + (x - 1)])
    }

    fn row_index(&self, y: i32) -> Option<usize> {
        if y < 1 || y as usize > self.height {
            None
        } else {
            Some(y as usize - 1)
        }
    }

    fn span(&self, row: usize) -> Range<usize> {
        row * self.width..(row + 1) * self.width
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_new_is_blank_and_clean() {
        let mut fb = FrameBuffer::new(20, 2).unwrap();
        assert!(fb.cells().iter().all(|&c| c == b' '));
        assert!(fb.lines_changed().is_empty());
    }

    #[test]
    fn test_rejects_bad_geometry() {
        assert!(FrameBuffer::new(0, 2).is_err());
        assert!(FrameBuffer::new(20, 0).is_err());
        assert!(FrameBuffer::new(201, 2).is_err());
        assert!(FrameBuffer::new(20, 33).is_err());
        assert!(FrameBuffer::new(200, 32).is_ok());
    }

    #[test]
    fn test_write_clips() {
        let mut fb = FrameBuffer::new(5, 2).unwrap();
        fb.write(-1, 1, b"abcdefgh");
        assert_eq!(fb.row(0), b"cdefg");
        fb.write(4, 2, b"xyz");
        assert_eq!(fb.row(1), b"   xy");
        fb.write(1, 3, b"nope");
        fb.write(1, 0, b"nope");
        assert_eq!(fb.row(0), b"cdefg");
    }

    #[test]
    fn test_hello_world() {
        let mut fb = FrameBuffer::new(20, 2).unwrap();
        fb.write(1, 1, b"HELLO");
        fb.write(1, 2, b"WORLD");
        assert_eq!(fb.lines_changed(), LineMask::from_bits(0b11));
        assert_eq!(fb.row(0), b"HELLO               ");
        // Second flush with no change
        assert!(fb.lines_changed().is_empty());
    }

    #[test]
    fn test_only_touched_row_reported() {
        let mut fb = FrameBuffer::new(20, 4).unwrap();
        fb.write(3, 3, b"x");
        assert_eq!(fb.lines_changed().iter().collect::<alloc::vec::Vec<_>>(), [2]);
    }

    #[test]
    fn test_clear_then_write_marks_all_rows() {
        let mut fb = FrameBuffer::new(4, 3).unwrap();
        for y in 1..=3 {
            fb.write(1, y, b"aaaa");
        }
        fb.lines_changed();
        fb.clear();
        for y in 1..=3 {
            fb.write(1, y, b"bbbb");
        }
        assert_eq!(fb.lines_changed(), LineMask::all(3));
    }

    #[test]
    fn test_rewrite_same_content_not_reported() {
        let mut fb = FrameBuffer::new(4, 2).unwrap();
        fb.write(1, 1, b"same");
        fb.lines_changed();
        fb.clear();
        fb.write(1, 1, b"same");
        assert!(fb.lines_changed().is_empty());
    }

    #[test]
    fn test_invalidate_forces_rows() {
        let mut fb = FrameBuffer::new(4, 2).unwrap();
        fb.invalidate();
        assert_eq!(fb.lines_changed(), LineMask::all(2));
        assert!(fb.lines_changed().is_empty());
    }

    #[test]
    fn test_failed_row_reported_again() {
        let mut fb = FrameBuffer::new(8, 3).unwrap();
        fb.write(1, 2, b"x");
        assert_eq!(fb.pending(), LineMask::from_bits(0b010));
        assert_eq!(fb.lines_changed(), LineMask::from_bits(0b010));
        assert!(fb.pending().is_empty());

        fb.invalidate_rows(LineMask::from_bits(0b010));
        assert_eq!(fb.pending(), LineMask::from_bits(0b010));
        assert_eq!(fb.lines_changed(), LineMask::from_bits(0b010));
        assert!(fb.lines_changed().is_empty());
    }

    #[test]
    fn test_invalidate_rows_ignores_rows_past_height() {
        let mut fb = FrameBuffer::new(8, 2).unwrap();
        fb.invalidate_rows(LineMask::from_bits(0b1100));
        assert!(fb.lines_changed().is_empty());
    }

    #[test]
    fn test_line_mask_all() {
        assert_eq!(LineMask::all(2).bits(), 0b11);
        assert_eq!(LineMask::all(32).bits(), u32::MAX);
        assert_eq!(LineMask::all(32).count(), 32);
    }

    proptest! {
        #[test]
        fn prop_reported_rows_match_differences(
            writes in proptest::collection::vec((1i32..=8, 1i32..=4, 0u8..4), 0..24)
        ) {
            let mut fb = FrameBuffer::new(8, 4).unwrap();
            fb.write(1, 1, b"seed");
            fb.lines_changed();
            let before: alloc::vec::Vec<u8> = fb.cells().to_vec();

            for (x, y, byte) in writes {
                fb.put(x, y, b'a' + byte);
            }
            let after: alloc::vec::Vec<u8> = fb.cells().to_vec();
            let mask = fb.lines_changed();

            for row in 0..4 {
                let span = row * 8..(row + 1) * 8;
                prop_assert_eq!(mask.contains(row), before[span.clone()] != after[span]);
            }
            prop_assert!(fb.lines_changed().is_empty());
        }
    }
}
