//! Display operation set
//!
//! Every driver exposes the same operations to the host loop. Drawing calls
//! only touch in-memory state; [`CharDisplay::flush`] is the single point
//! where bytes reach the device.

use crate::config::CellSize;
use crate::error::DisplayError;
use crate::keys::KeyMask;
use crate::state::CursorStyle;

/// Trait for character-cell displays
pub trait CharDisplay {
    /// Columns
    fn width(&self) -> usize;

    /// Rows
    fn height(&self) -> usize;

    /// Character cell in pixels
    fn cell_size(&self) -> CellSize;

    /// Place text at 1-based column `x`, row `y`; clipped to the surface
    fn write(&mut self, x: i32, y: i32, text: &[u8]);

    /// Place one character
    fn put_char(&mut self, x: i32, y: i32, byte: u8) {
        self.write(x, y, &[byte]);
    }

    /// Blank the surface
    fn clear(&mut self);

    /// Request backlight on or off
    fn set_backlight(&mut self, on: bool);

    /// Request contrast, 0..=1000 promille; ignored by hardware without it
    fn set_contrast(&mut self, promille: u16);

    /// Request brightness, 0..=1000 promille; ignored by hardware without it
    fn set_brightness(&mut self, _promille: u16) {}

    /// Request cursor position (1-based) and style
    fn set_cursor(&mut self, _x: u8, _y: u8, _style: CursorStyle) {}

    /// Horizontal bar growing right, `len` cells long at 1000 promille
    fn hbar(&mut self, x: i32, y: i32, len: usize, promille: u16);

    /// Vertical bar growing up, `len` cells long at 1000 promille
    fn vbar(&mut self, x: i32, y: i32, len: usize, promille: u16);

    /// Push all pending changes to the device
    ///
    /// Transport failures do not stop the flush; their count is returned as
    /// [`DisplayError::Transport`] once everything has been attempted.
    fn flush(&mut self) -> Result<(), DisplayError>;

    /// Currently pressed keys, `None` without a keypad or without input
    fn scan_keys(&mut self) -> Option<KeyMask>;

    /// Release the device; calling it again does nothing
    fn close(&mut self);
}

impl<T: CharDisplay + ?Sized> CharDisplay for alloc::boxed::Box<T> {
    fn width(&self) -> usize {
        (**self).width()
    }

    fn height(&self) -> usize {
        (**self).height()
    }

    fn cell_size(&self) -> CellSize {
        (**self).cell_size()
    }

    fn write(&mut self, x: i32, y: i32, text: &[u8]) {
        (**self).write(x, y, text)
    }

    fn put_char(&mut self, x: i32, y: i32, byte: u8) {
        (**self).put_char(x, y, byte)
    }

    fn clear(&mut self) {
        (**self).clear()
    }

    fn set_backlight(&mut self, on: bool) {
        (**self).set_backlight(on)
    }

    fn set_contrast(&mut self, promille: u16) {
        (**self).set_contrast(promille)
    }

    fn set_brightness(&mut self, promille: u16) {
        (**self).set_brightness(promille)
    }

    fn set_cursor(&mut self, x: u8, y: u8, style: CursorStyle) {
        (**self).set_cursor(x, y, style)
    }

    fn hbar(&mut self, x: i32, y: i32, len: usize, promille: u16) {
        (**self).hbar(x, y, len, promille)
    }

    fn vbar(&mut self, x: i32, y: i32, len: usize, promille: u16) {
        (**self).vbar(x, y, len, promille)
    }

    fn flush(&mut self) -> Result<(), DisplayError> {
        (**self).flush()
    }

    fn scan_keys(&mut self) -> Option<KeyMask> {
        (**self).scan_keys()
    }

    fn close(&mut self) {
        (**self).close()
    }
}
