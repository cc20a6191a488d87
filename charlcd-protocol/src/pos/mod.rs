//! POS customer display command sets
//!
//! Each vendor backend implements [`PosProtocol`]. Backends hold no state
//! of their own; everything that changes between flushes lives in
//! [`PosState`], so one backend value can serve any number of displays.
//!
//! Custom glyphs use the top of the character set: logical index `i` is
//! shown as `0xDF + i`.

mod aedex;
mod cd5220;
mod common;
mod epson;
mod logic_controls;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use charlcd_core::glyph::{BarGlyphs, MAX_CUSTOM_CHARS};
use charlcd_core::{CapacityError, Geometry, InitError, MiscState};
use charlcd_core::{CellSize, FrameBuffer};

use crate::error::ProtocolError;

pub use aedex::Aedex;
pub use cd5220::Cd5220;
pub use common::{convert_brightness, CUSTOM_START};
pub use epson::Epson;
pub use logic_controls::LogicControls;

/// Everything a backend reads and updates while encoding
#[derive(Debug, Clone)]
pub struct PosState {
    pub frame: FrameBuffer,
    pub cell: CellSize,
    /// Glyph slots the caller asked for; lowered to 0 by `init` when the
    /// vendor cannot upload glyphs of this cell size
    pub custom_chars: usize,
    /// Bar glyphs reserved by `init`
    pub glyphs: BarGlyphs,
    pub misc: MiscState,
}

impl PosState {
    pub fn new(geometry: Geometry, custom_chars: usize) -> Result<Self, InitError> {
        if custom_chars > MAX_CUSTOM_CHARS {
            return Err(InitError::InvalidSetting);
        }
        Ok(Self {
            frame: FrameBuffer::new(geometry.width, geometry.height)?,
            cell: geometry.cell,
            custom_chars,
            glyphs: BarGlyphs::none(geometry.cell),
            misc: MiscState::default(),
        })
    }

    pub fn width(&self) -> usize {
        self.frame.width()
    }

    pub fn height(&self) -> usize {
        self.frame.height()
    }

    fn check_size(&self, max_width: usize, max_height: usize) -> Result<(), InitError> {
        Geometry::new(self.width(), self.height(), self.cell).check(max_width, max_height)
    }
}

/// One vendor command set
pub trait PosProtocol {
    fn name(&self) -> &'static str;

    /// Upper bound for any single `init` or `flush` output with this state
    fn required_buffer_size(&self, state: &PosState) -> usize;

    /// Encode the power-up sequence and reserve bar glyphs
    fn init(&self, state: &mut PosState, buf: &mut [u8]) -> Result<usize, ProtocolError>;

    /// Encode changed rows and pending cursor/brightness state
    fn flush(&self, state: &mut PosState, buf: &mut [u8]) -> Result<usize, ProtocolError>;

    /// Character code showing custom glyph `index`
    fn custom_char_code(&self, state: &PosState, index: usize) -> Result<u8, CapacityError> {
        common::custom_char_code(state, index)
    }
}

/// Supported command sets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Emulation {
    #[default]
    #[cfg_attr(feature = "serde", serde(alias = "AEDEX"))]
    Aedex,
    #[cfg_attr(feature = "serde", serde(alias = "CD5220"))]
    Cd5220,
    #[cfg_attr(feature = "serde", serde(alias = "Epson"))]
    Epson,
    #[cfg_attr(feature = "serde", serde(alias = "Logic Controls"))]
    LogicControls,
}

impl Emulation {
    /// Match a configured type name on its first three letters, ignoring
    /// case ("AEDEX", "cd5220", "Epson", "Logic Controls", ...)
    pub fn from_name(name: &str) -> Option<Self> {
        let prefix = name.trim().get(..3)?;
        [
            ("aed", Emulation::Aedex),
            ("cd5", Emulation::Cd5220),
            ("eps", Emulation::Epson),
            ("log", Emulation::LogicControls),
        ]
        .into_iter()
        .find(|(key, _)| prefix.eq_ignore_ascii_case(key))
        .map(|(_, emulation)| emulation)
    }

    fn backend(self) -> &'static dyn PosProtocol {
        match self {
            Emulation::Aedex => &Aedex,
            Emulation::Cd5220 => &Cd5220,
            Emulation::Epson => &Epson,
            Emulation::LogicControls => &LogicControls,
        }
    }
}

impl PosProtocol for Emulation {
    fn name(&self) -> &'static str {
        self.backend().name()
    }

    fn required_buffer_size(&self, state: &PosState) -> usize {
        self.backend().required_buffer_size(state)
    }

    fn init(&self, state: &mut PosState, buf: &mut [u8]) -> Result<usize, ProtocolError> {
        self.backend().init(state, buf)
    }

    fn flush(&self, state: &mut PosState, buf: &mut [u8]) -> Result<usize, ProtocolError> {
        self.backend().flush(state, buf)
    }

    fn custom_char_code(&self, state: &PosState, index: usize) -> Result<u8, CapacityError> {
        self.backend().custom_char_code(state, index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use charlcd_core::CursorStyle;
    use proptest::prelude::*;

    const ALL: [Emulation; 4] = [
        Emulation::Aedex,
        Emulation::Cd5220,
        Emulation::Epson,
        Emulation::LogicControls,
    ];

    fn max_size(emulation: Emulation) -> (usize, usize) {
        match emulation {
            Emulation::Aedex => (40, 2),
            Emulation::Cd5220 | Emulation::LogicControls => (20, 2),
            Emulation::Epson => (20, 4),
        }
    }

    #[test]
    fn test_from_name() {
        assert_eq!(Emulation::from_name("AEDEX"), Some(Emulation::Aedex));
        assert_eq!(Emulation::from_name("cd5220"), Some(Emulation::Cd5220));
        assert_eq!(Emulation::from_name("Epson"), Some(Emulation::Epson));
        assert_eq!(
            Emulation::from_name("Logic Controls"),
            Some(Emulation::LogicControls)
        );
        assert_eq!(Emulation::from_name("Ultimate"), None);
        assert_eq!(Emulation::from_name("ep"), None);
    }

    #[test]
    fn test_too_many_custom_chars() {
        let geometry = Geometry::new(20, 2, CellSize::POS);
        assert_eq!(
            PosState::new(geometry, 33).err(),
            Some(InitError::InvalidSetting)
        );
    }

    #[test]
    fn test_oversize_rejected() {
        for emulation in ALL {
            let (w, h) = max_size(emulation);
            let mut state = PosState::new(Geometry::new(w + 1, h, CellSize::POS), 0).unwrap();
            let mut buf = [0u8; 512];
            assert!(matches!(
                emulation.init(&mut state, &mut buf),
                Err(ProtocolError::Init(InitError::UnsupportedGeometry { .. }))
            ));
        }
    }

    proptest! {
        /// Init and a worst-case flush always fit the announced size
        #[test]
        fn prop_buffer_size_is_sound(
            which in 0usize..4,
            w in 1usize..=40,
            h in 1usize..=4,
            chars in 0usize..=32,
            fill in any::<u8>(),
            x in 1u8..=40,
            y in 1u8..=4,
            brightness in 0u16..=1000,
            backlight in any::<bool>(),
        ) {
            let emulation = ALL[which];
            let (max_w, max_h) = max_size(emulation);
            let geometry = Geometry::new(w.min(max_w), h.min(max_h), CellSize::POS);
            let mut state = PosState::new(geometry, chars).unwrap();
            let size = emulation.required_buffer_size(&state);
            let mut buf = vec![0u8; size];

            emulation.init(&mut state, &mut buf).unwrap();

            // Cursor visible on the device, every row dirty, new position
            // and brightness pending
            state.misc.desired.cursor = CursorStyle::Block;
            emulation.flush(&mut state, &mut buf).unwrap();
            for row in 1..=geometry.height {
                let text = vec![fill; geometry.width];
                state.frame.write(1, row as i32, &text);
            }
            state.frame.invalidate();
            state.misc.desired.cursor_x = x;
            state.misc.desired.cursor_y = y;
            state.misc.desired.brightness = brightness;
            state.misc.desired.backlight = backlight;

            let written = emulation.flush(&mut state, &mut buf).unwrap();
            prop_assert!(written <= size);
        }
    }
}
