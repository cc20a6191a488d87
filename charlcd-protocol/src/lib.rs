//! Command generation for serial point-of-sale customer displays
//!
//! ```text
//!   PosDisplay ──> PosState (frame, glyphs, misc state)
//!       │              │
//!       │              v
//!       │         Emulation ──> AEDEX | CD5220 | Epson | Logic Controls
//!       │              │
//!       │              v
//!       │        CommandWriter ──> [u8; required_buffer_size]
//!       v
//!     UART
//! ```
//!
//! Backends never touch the serial port. They encode into a caller-owned
//! buffer whose size they announce up front; overrunning it is an error,
//! never a silent truncation.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

extern crate alloc;

pub mod display;
pub mod error;
pub mod pos;
pub mod writer;

pub use display::{PosConfig, PosDisplay};
pub use error::ProtocolError;
pub use pos::{Emulation, PosProtocol, PosState};
pub use writer::CommandWriter;
