//! Protocol codegen errors

use core::fmt;

use charlcd_core::{CapacityError, DisplayError, InitError};

/// Encoding could not produce a command stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ProtocolError {
    /// The display cannot be driven with this configuration
    Init(InitError),
    /// A bound (glyph table or output buffer) would be exceeded
    Capacity(CapacityError),
}

impl From<InitError> for ProtocolError {
    fn from(err: InitError) -> Self {
        ProtocolError::Init(err)
    }
}

impl From<CapacityError> for ProtocolError {
    fn from(err: CapacityError) -> Self {
        ProtocolError::Capacity(err)
    }
}

impl From<ProtocolError> for DisplayError {
    fn from(err: ProtocolError) -> Self {
        match err {
            ProtocolError::Init(e) => DisplayError::Init(e),
            ProtocolError::Capacity(e) => DisplayError::Capacity(e),
        }
    }
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolError::Init(err) => fmt::Display::fmt(err, f),
            ProtocolError::Capacity(err) => fmt::Display::fmt(err, f),
        }
    }
}
