//! HD44780 driver configuration

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use charlcd_core::{CellSize, Geometry};

/// Controller addressing model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Model {
    /// Rows at DDRAM 0x00, 0x40, 0x00+width, 0x40+width
    #[default]
    Standard,
    /// KS0073 four-line mode, rows at multiples of the line address
    Extended,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Hd44780Config {
    pub geometry: Geometry,
    pub model: Model,
    /// DDRAM distance between rows in extended mode
    pub line_address: u8,
    /// The transport can switch a backlight
    pub backlight: bool,
    /// Poll the transport for keys
    pub keypad: bool,
    /// Keep the bottom pixel row of custom characters (it doubles as the
    /// underline cursor row)
    pub lastline: bool,
    /// Multiplies every controller pause, for slow clones
    pub delay_multiplier: u32,
}

impl Default for Hd44780Config {
    fn default() -> Self {
        Self {
            geometry: Geometry::new(20, 4, CellSize::HD44780),
            model: Model::Standard,
            line_address: 0x20,
            backlight: false,
            keypad: false,
            lastline: true,
            delay_multiplier: 1,
        }
    }
}
