//! Hardware-agnostic rendering core for character-cell displays
//!
//! This crate contains everything that does not depend on a bus or a vendor
//! command set:
//!
//! - Diff engine (frame buffer plus backing store)
//! - Desired vs. confirmed device state (cursor, brightness, backlight)
//! - Custom glyph allocation and bitmap generation
//! - Bar graph rendering
//! - Key masks
//! - Error taxonomy and rate-limited failure reporting
//! - Geometry configuration
//! - The [`CharDisplay`] operation set every driver implements

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

extern crate alloc;

pub mod bar;
pub mod config;
pub mod error;
pub mod framebuffer;
pub mod glyph;
pub mod keys;
pub mod report;
pub mod state;
pub mod traits;

pub use config::{CellSize, Geometry};
pub use error::{CapacityError, DisplayError, InitError, TransportError};
pub use framebuffer::{FrameBuffer, LineMask};
pub use keys::{Key, KeyMask};
pub use report::FailureReporter;
pub use state::{CursorStyle, MiscState};
pub use traits::CharDisplay;
