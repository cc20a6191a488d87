//! HD44780 bus protocol core
//!
//! ```text
//! ┌──────────────┐   write/flush   ┌──────────────┐  send(rs, byte)  ┌───────────┐
//! │ host loop    │ ──────────────▶ │  Hd44780     │ ───────────────▶ │ Transport │
//! └──────────────┘                 │  FrameBuffer │                  └───────────┘
//!                                  │  CGRAM cache │
//!                                  └──────────────┘
//! ```

pub mod cmd;
mod config;
mod driver;
mod init;
mod transport;

pub use config::{Hd44780Config, Model};
pub use driver::{GlyphMode, Hd44780, CGRAM_SLOTS, MAX_HEIGHT, MAX_WIDTH};
pub use init::InitPhase;
pub use transport::{strobe_byte, strobe_nibble, BusWidth, NibbleBus, RegisterSelect, Transport};
