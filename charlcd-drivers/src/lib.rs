//! HD44780 driver implementations
//!
//! This crate provides the HD44780 bus protocol core and the transports it
//! runs over:
//!
//! - 8-bit PC parallel port
//! - 4-bit GPIO lines
//! - 4-bit I2C port expanders (PCF8574, PCA9554)
//! - MCP23017 keypad/backlight board
//! - KS0073 serial SPI
//! - LIS2 / MPlay serial

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

extern crate alloc;

pub mod hd44780;
pub mod transport;

#[cfg(test)]
pub(crate) mod mock;

pub use hd44780::{Hd44780, Hd44780Config, Model, RegisterSelect, Transport};
