//! Geometry configuration types
//!
//! Sizes arrive from configuration as `"WxH"` strings (e.g. `"20x4"`);
//! [`parse_size`] turns them into numbers and the drivers validate the
//! result against their own limits.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::InitError;
use crate::framebuffer::{MAX_HEIGHT, MAX_WIDTH};

/// Pixel dimensions of one character cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CellSize {
    pub width: u8,
    pub height: u8,
}

impl CellSize {
    /// The usual HD44780 5x8 font
    pub const HD44780: Self = Self {
        width: 5,
        height: 8,
    };

    /// POS customer displays upload 5x7 glyphs
    pub const POS: Self = Self {
        width: 5,
        height: 7,
    };
}

impl Default for CellSize {
    fn default() -> Self {
        Self::HD44780
    }
}

/// Text grid plus cell size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Geometry {
    /// Columns
    pub width: usize,
    /// Rows
    pub height: usize,
    /// Character cell
    #[cfg_attr(feature = "serde", serde(default))]
    pub cell: CellSize,
}

impl Geometry {
    pub const fn new(width: usize, height: usize, cell: CellSize) -> Self {
        Self {
            width,
            height,
            cell,
        }
    }

    /// Reject sizes beyond `max_width` x `max_height` (and the global frame
    /// buffer limits)
    pub fn check(&self, max_width: usize, max_height: usize) -> Result<(), InitError> {
        let fits = (1..=max_width.min(MAX_WIDTH)).contains(&self.width)
            && (1..=max_height.min(MAX_HEIGHT)).contains(&self.height);
        if fits {
            Ok(())
        } else {
            Err(InitError::UnsupportedGeometry {
                width: self.width,
                height: self.height,
            })
        }
    }
}

/// Parse a `"WxH"` size string
pub fn parse_size(text: &str) -> Option<(usize, usize)> {
    let (w, h) = text.trim().split_once(['x', 'X'])?;
    let width = w.trim().parse().ok()?;
    let height = h.trim().parse().ok()?;
    Some((width, height))
}
