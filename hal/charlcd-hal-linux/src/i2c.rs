//! i2c-dev adapter

use std::path::Path;

use charlcd_hal::I2cBus;
use embedded_hal::i2c::{Error as _, I2c};
use linux_embedded_hal::I2cdev;

use crate::error::HalError;

/// An `/dev/i2c-N` bus
pub struct I2cDevice {
    bus: I2cdev,
}

impl I2cDevice {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, HalError> {
        let path = path.as_ref();
        let bus = I2cdev::new(path).map_err(|e| HalError::OpenBus {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        log::info!("i2c: opened {}", path.display());
        Ok(Self { bus })
    }
}

impl I2cBus for I2cDevice {
    type Error = HalError;

    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), HalError> {
        I2c::write(&mut self.bus, address, data).map_err(|e| HalError::I2c(e.kind()))
    }

    fn write_read(
        &mut self,
        address: u8,
        write_data: &[u8],
        read_buf: &mut [u8],
    ) -> Result<(), HalError> {
        I2c::write_read(&mut self.bus, address, write_data, read_buf)
            .map_err(|e| HalError::I2c(e.kind()))
    }
}
