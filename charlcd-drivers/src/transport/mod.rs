//! Transport backends
//!
//! Each backend owns its bus handle and implements
//! [`crate::hd44780::Transport`]. The backend is chosen by configuration;
//! nothing is probed.

pub mod gpio;
pub mod i2c;
pub mod lis2;
pub mod parallel;
pub mod piplate;
pub mod spi;

pub use gpio::{Gpio4Bit, GpioPins};
pub use i2c::{Dialect, I2cExpander, I2cExpanderConfig, LineMap};
pub use lis2::{Lis2Serial, SerialDialect};
pub use parallel::Parallel8Bit;
pub use piplate::PiPlate;
pub use spi::SpiKs0073;

/// Pause between enable edges when none is configured
pub const DEFAULT_PULSE_US: u32 = 1;
