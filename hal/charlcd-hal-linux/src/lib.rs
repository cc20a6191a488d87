//! Linux implementations of the charlcd hardware traits
//!
//! | Trait | Implementation | Device |
//! |---|---|---|
//! | `OutputPin` | [`SysfsLine`] | `/sys/class/gpio/gpioN` |
//! | `OutputPin` | [`FileSwitch`] | any file taking `1`/`0` |
//! | `I2cBus` | [`I2cDevice`] | `/dev/i2c-N` |
//! | `SpiBus` | [`SpiDevice`] | `/dev/spidevB.C` |
//! | `UartTx`, `UartRx` | [`SerialUart`] | `/dev/ttyS*`, `/dev/ttyUSB*` |
//! | `ParallelPort` | [`DevPort`] | `/dev/port` plus a lock file |
//!
//! Every handle releases its device when dropped.

#![deny(unsafe_code)]

pub mod error;
pub mod gpio;
pub mod i2c;
pub mod parport;
pub mod serial;
pub mod spi;

pub use error::HalError;
pub use gpio::{FileSwitch, SysfsLine};
pub use i2c::I2cDevice;
pub use linux_embedded_hal::Delay;
pub use parport::{DevPort, PortGuard, DEFAULT_LOCK_PATH};
pub use serial::SerialUart;
pub use spi::SpiDevice;
