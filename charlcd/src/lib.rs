//! Character-cell displays on Linux
//!
//! One TOML table picks the driver and connection; [`open`] wires the
//! matching device handles, transport and driver together and hands back a
//! [`CharDisplay`].
//!
//! ```toml
//! driver = "hd44780"
//! connection = "i2c"
//! device = "/dev/i2c-1"
//! address = 0x27
//! size = "20x4"
//! backlight = true
//! ```
//!
//! ```text
//!   Config ──► open() ──► charlcd-hal-linux handles
//!                              │
//!                 ┌────────────┴────────────┐
//!                 ▼                         ▼
//!      transport + Hd44780          PosDisplay (serial)
//!                 └────────────┬────────────┘
//!                              ▼
//!                  Box<dyn CharDisplay + Send>
//! ```

#![deny(unsafe_code)]

pub mod config;
pub mod error;
mod open;

pub use charlcd_core::{CharDisplay, CursorStyle, DisplayError, Key, KeyMask};
pub use config::{Config, Connection, GpioLines, Hd44780Settings, PosSettings};
pub use error::OpenError;
pub use open::{open, BoxedDisplay};
