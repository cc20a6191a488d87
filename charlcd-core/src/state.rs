//! Desired vs. confirmed device state
//!
//! Callers change the *desired* copy at any time. A flush compares it with
//! the *confirmed* copy (what was last encoded for the device), emits
//! commands only for fields that differ, and confirms exactly the fields it
//! encoded. `None` in the confirmed copy means "unknown" and always forces a
//! command.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Cursor appearance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum CursorStyle {
    #[default]
    Off,
    On,
    Block,
    Underline,
}

impl CursorStyle {
    pub const fn is_visible(self) -> bool {
        !matches!(self, CursorStyle::Off)
    }
}

/// State requested by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DesiredState {
    /// 1-based column
    pub cursor_x: u8,
    /// 1-based row
    pub cursor_y: u8,
    pub cursor: CursorStyle,
    /// 0..=1000
    pub brightness: u16,
    pub backlight: bool,
}

impl Default for DesiredState {
    fn default() -> Self {
        Self {
            cursor_x: 1,
            cursor_y: 1,
            cursor: CursorStyle::Off,
            brightness: 1000,
            backlight: true,
        }
    }
}

/// State last encoded for the device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ConfirmedState {
    pub cursor_position: Option<(u8, u8)>,
    pub cursor_visible: bool,
    /// Device-specific level, not promille
    pub brightness: Option<u8>,
    pub backlight: Option<bool>,
}

/// Both copies of the device misc state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MiscState {
    pub desired: DesiredState,
    pub confirmed: ConfirmedState,
}

impl MiscState {
    /// Target visibility if it differs from the device
    pub fn cursor_visibility_change(&self) -> Option<bool> {
        let wanted = self.desired.cursor.is_visible();
        (wanted != self.confirmed.cursor_visible).then_some(wanted)
    }

    /// Record a visibility command. Showing the cursor makes its position
    /// unknown again.
    pub fn confirm_cursor_visible(&mut self, visible: bool) {
        if visible && !self.confirmed.cursor_visible {
            self.confirmed.cursor_position = None;
        }
        self.confirmed.cursor_visible = visible;
    }

    /// Position to send; only while the cursor is visible on the device
    pub fn cursor_position_change(&self) -> Option<(u8, u8)> {
        if !self.confirmed.cursor_visible {
            return None;
        }
        let wanted = (self.desired.cursor_x, self.desired.cursor_y);
        (self.confirmed.cursor_position != Some(wanted)).then_some(wanted)
    }

    pub fn confirm_cursor_position(&mut self, position: (u8, u8)) {
        self.confirmed.cursor_position = Some(position);
    }

    /// `level` if the device is not known to be at it
    pub fn brightness_change(&self, level: u8) -> Option<u8> {
        (self.confirmed.brightness != Some(level)).then_some(level)
    }

    pub fn confirm_brightness(&mut self, level: u8) {
        self.confirmed.brightness = Some(level);
    }

    pub fn backlight_change(&self) -> Option<bool> {
        let wanted = self.desired.backlight;
        (self.confirmed.backlight != Some(wanted)).then_some(wanted)
    }

    pub fn confirm_backlight(&mut self, on: bool) {
        self.confirmed.backlight = Some(on);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_showing_cursor_forgets_position() {
        let mut state = MiscState::default();
        state.confirm_cursor_visible(true);
        state.confirm_cursor_position((3, 1));
        state.confirm_cursor_visible(false);
        state.confirm_cursor_visible(true);
        assert_eq!(state.confirmed.cursor_position, None);
    }

    #[test]
    fn test_position_only_while_visible() {
        let mut state = MiscState::default();
        state.desired.cursor_x = 5;
        assert_eq!(state.cursor_position_change(), None);

        state.desired.cursor = CursorStyle::Block;
        assert_eq!(state.cursor_visibility_change(), Some(true));
        state.confirm_cursor_visible(true);
        assert_eq!(state.cursor_position_change(), Some((5, 1)));
        state.confirm_cursor_position((5, 1));
        assert_eq!(state.cursor_position_change(), None);
    }

    #[test]
    fn test_unknown_brightness_forces_command() {
        let mut state = MiscState::default();
        assert_eq!(state.brightness_change(4), Some(4));
        state.confirm_brightness(4);
        assert_eq!(state.brightness_change(4), None);
        assert_eq!(state.brightness_change(1), Some(1));
    }
}
