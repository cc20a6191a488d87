//! Error taxonomy
//!
//! Three classes with different handling:
//!
//! - [`InitError`] is fatal for one driver instance.
//! - [`TransportError`] is logged and tolerated; a flush keeps going.
//! - [`CapacityError`] is returned to the caller immediately.

use core::fmt;

/// Driver construction failed; the instance is unusable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InitError {
    /// Device node, port or line could not be opened
    ChannelOpen,
    /// A required signal line is missing or mapped twice
    InvalidPinMapping,
    /// Requested size is zero or exceeds what the device supports
    UnsupportedGeometry { width: usize, height: usize },
    /// A configuration value is out of range
    InvalidSetting,
    /// The initialization sequence could not be written
    Transport(TransportError),
}

/// A single bus transaction failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransportError {
    /// Write to the device failed
    Write,
    /// Read from the device failed
    Read,
    /// Operation not available on this bus
    Unsupported,
}

/// A bounded resource would be exceeded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CapacityError {
    /// Custom glyph index outside the supported range
    GlyphIndex { index: usize, capacity: usize },
    /// Encoded command would not fit the output buffer
    BufferOverflow { needed: usize, capacity: usize },
}

/// Error surfaced by a [`crate::CharDisplay`] operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayError {
    /// Device could not be (re)initialized
    Init(InitError),
    /// Some writes of a flush failed; the rest were still attempted
    Transport { failures: u32 },
    /// Encoding exceeded a bound
    Capacity(CapacityError),
}

impl From<TransportError> for InitError {
    fn from(err: TransportError) -> Self {
        InitError::Transport(err)
    }
}

impl From<InitError> for DisplayError {
    fn from(err: InitError) -> Self {
        DisplayError::Init(err)
    }
}

impl From<CapacityError> for DisplayError {
    fn from(err: CapacityError) -> Self {
        DisplayError::Capacity(err)
    }
}

impl fmt::Display for InitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InitError::ChannelOpen => f.write_str("cannot open device channel"),
            InitError::InvalidPinMapping => f.write_str("invalid signal line mapping"),
            InitError::UnsupportedGeometry { width, height } => {
                write!(f, "unsupported display size {}x{}", width, height)
            }
            InitError::InvalidSetting => f.write_str("configuration value out of range"),
            InitError::Transport(err) => write!(f, "init sequence failed: {}", err),
        }
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::Write => f.write_str("write failed"),
            TransportError::Read => f.write_str("read failed"),
            TransportError::Unsupported => f.write_str("operation not supported"),
        }
    }
}

impl fmt::Display for CapacityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CapacityError::GlyphIndex { index, capacity } => {
                write!(f, "custom char {} out of range (capacity {})", index, capacity)
            }
            CapacityError::BufferOverflow { needed, capacity } => {
                write!(f, "command needs {} bytes, buffer holds {}", needed, capacity)
            }
        }
    }
}

impl fmt::Display for DisplayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayError::Init(err) => fmt::Display::fmt(err, f),
            DisplayError::Transport { failures } => write!(f, "{} write(s) failed", failures),
            DisplayError::Capacity(err) => fmt::Display::fmt(err, f),
        }
    }
}
