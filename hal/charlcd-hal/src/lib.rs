//! charlcd Hardware Abstraction Layer
//!
//! This crate defines the bus traits that display transports are written
//! against. Host implementations (Linux sysfs, i2c-dev, spidev, serial ports,
//! `/dev/port`) live in `charlcd-hal-linux`; tests use in-memory mocks.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  charlcd-drivers / charlcd-protocol     │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  charlcd-hal (this crate - traits)      │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ charlcd-hal-  │       │  test mocks   │
//! │    linux      │       │               │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::OutputPin`] - Digital output lines
//! - [`uart::UartTx`], [`uart::UartRx`] - Serial communication
//! - [`i2c::I2cBus`] - I2C bus operations
//! - [`spi::SpiBus`] - SPI bus operations
//! - [`parport::ParallelPort`] - PC parallel port with scoped, locked access
//! - [`DelayNs`] - Blocking pauses (re-exported from `embedded-hal`)

#![no_std]
#![deny(unsafe_code)]

pub mod gpio;
pub mod i2c;
pub mod parport;
pub mod spi;
pub mod uart;

// Re-export key traits at crate root for convenience
pub use embedded_hal::delay::DelayNs;
pub use gpio::OutputPin;
pub use i2c::I2cBus;
pub use parport::{ParallelPort, PortAccess};
pub use spi::SpiBus;
pub use uart::{UartRx, UartTx};
